/// Swapchain - presentable images, acquisition and presentation

use ash::vk;
use ember_engine::ember::render::{AcquireOutcome, Extent2D, SwapchainStatus};
use ember_engine::ember::{Error, Result};
use ember_engine::{engine_debug, engine_error};

use crate::vulkan_context::vk_error;
use crate::vulkan_device::QueueFamilies;

/// Pick the surface format: sRGB BGRA, then sRGB RGBA, then whatever comes first
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    let preferred = [vk::Format::B8G8R8A8_SRGB, vk::Format::R8G8B8A8_SRGB];
    preferred
        .iter()
        .find_map(|&format| {
            formats.iter().copied().find(|f| {
                f.format == format && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
            })
        })
        .or_else(|| formats.first().copied())
}

/// MAILBOX when available, FIFO (always supported) otherwise
pub fn choose_present_mode(modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    if modes.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else {
        vk::PresentModeKHR::FIFO
    }
}

/// Surface extent, or the window size clamped to the surface limits when the
/// surface lets the swapchain decide (`current_extent.width == u32::MAX`)
///
/// Zero-area when the window is minimized, in which case no swapchain may be
/// created.
pub fn choose_extent(capabilities: &vk::SurfaceCapabilitiesKHR, window: Extent2D) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }
    if window.is_empty() {
        return vk::Extent2D::default();
    }
    vk::Extent2D {
        width: window.width.clamp(
            capabilities.min_image_extent.width,
            capabilities.max_image_extent.width,
        ),
        height: window.height.clamp(
            capabilities.min_image_extent.height,
            capabilities.max_image_extent.height,
        ),
    }
}

/// One image more than the minimum, capped by the maximum (0 = no maximum)
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let image_count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 {
        image_count.min(capabilities.max_image_count)
    } else {
        image_count
    }
}

fn is_empty_extent(extent: vk::Extent2D) -> bool {
    extent.width == 0 || extent.height == 0
}

/// Extent a swapchain created now for `surface` would get
pub fn surface_extent(
    physical_device: vk::PhysicalDevice,
    surface_loader: &ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    window_extent: Extent2D,
) -> Result<Extent2D> {
    let capabilities = unsafe {
        surface_loader.get_physical_device_surface_capabilities(physical_device, surface)
    }
    .map_err(|e| vk_error("Failed to get surface capabilities", e))?;
    let extent = choose_extent(&capabilities, window_extent);
    Ok(Extent2D::new(extent.width, extent.height))
}

/// Vulkan swapchain
///
/// Owns the `VkSwapchainKHR` handle only. Image views, render passes and
/// framebuffers derived from the images belong to the frame resources and
/// must be gone before [`recreate`](Swapchain::recreate) or
/// [`destroy`](Swapchain::destroy).
pub struct Swapchain {
    loader: ash::khr::swapchain::Device,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    format: vk::SurfaceFormatKHR,
    extent: vk::Extent2D,
}

impl Swapchain {
    /// Create a swapchain for `surface`
    pub fn new(
        instance: &ash::Instance,
        device: &ash::Device,
        physical_device: vk::PhysicalDevice,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        families: &QueueFamilies,
        window_extent: Extent2D,
    ) -> Result<Self> {
        let loader = ash::khr::swapchain::Device::new(instance, device);
        let mut swapchain = Self {
            loader,
            swapchain: vk::SwapchainKHR::null(),
            images: Vec::new(),
            format: vk::SurfaceFormatKHR::default(),
            extent: vk::Extent2D::default(),
        };
        swapchain.build(physical_device, surface_loader, surface, families, window_extent)?;
        Ok(swapchain)
    }

    /// Replace the swapchain with one matching the current surface
    ///
    /// The old swapchain is handed to the driver as `old_swapchain` and
    /// destroyed once the new one exists.
    pub fn recreate(
        &mut self,
        physical_device: vk::PhysicalDevice,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        families: &QueueFamilies,
        window_extent: Extent2D,
    ) -> Result<()> {
        self.build(physical_device, surface_loader, surface, families, window_extent)
    }

    fn build(
        &mut self,
        physical_device: vk::PhysicalDevice,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        families: &QueueFamilies,
        window_extent: Extent2D,
    ) -> Result<()> {
        unsafe {
            let capabilities = surface_loader
                .get_physical_device_surface_capabilities(physical_device, surface)
                .map_err(|e| {
                    engine_error!("ember::vulkan", "Failed to get surface capabilities: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface capabilities: {:?}", e))
                })?;

            let formats = surface_loader
                .get_physical_device_surface_formats(physical_device, surface)
                .map_err(|e| {
                    engine_error!("ember::vulkan", "Failed to query surface formats: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface formats: {:?}", e))
                })?;

            let format = choose_surface_format(&formats).ok_or_else(|| {
                engine_error!("ember::vulkan", "Surface reports no formats");
                Error::InitializationFailed("Surface reports no formats".to_string())
            })?;

            let present_modes = surface_loader
                .get_physical_device_surface_present_modes(physical_device, surface)
                .map_err(|e| {
                    engine_error!("ember::vulkan", "Failed to query present modes: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get present modes: {:?}", e))
                })?;
            let present_mode = choose_present_mode(&present_modes);

            let extent = choose_extent(&capabilities, window_extent);
            if is_empty_extent(extent) {
                engine_error!("ember::vulkan", "Cannot build a swapchain for a zero-area surface");
                return Err(Error::SwapchainOutOfDate);
            }
            let image_count = choose_image_count(&capabilities);

            let shared_families = [families.graphics, families.present];
            let old_swapchain = self.swapchain;
            let mut create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(surface)
                .min_image_count(image_count)
                .image_format(format.format)
                .image_color_space(format.color_space)
                .image_extent(extent)
                .image_array_layers(1)
                .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_DST)
                .pre_transform(capabilities.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(present_mode)
                .clipped(true)
                .old_swapchain(old_swapchain);

            create_info = if families.graphics != families.present {
                create_info
                    .image_sharing_mode(vk::SharingMode::CONCURRENT)
                    .queue_family_indices(&shared_families)
            } else {
                create_info.image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            };

            let swapchain = self
                .loader
                .create_swapchain(&create_info, None)
                .map_err(|e| {
                    engine_error!("ember::vulkan", "Failed to create swapchain: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create swapchain: {:?}", e))
                })?;

            if old_swapchain != vk::SwapchainKHR::null() {
                self.loader.destroy_swapchain(old_swapchain, None);
            }
            self.swapchain = swapchain;

            self.images = self.loader.get_swapchain_images(swapchain).map_err(|e| {
                engine_error!("ember::vulkan", "Failed to get swapchain images: {:?}", e);
                Error::InitializationFailed(format!("Failed to get swapchain images: {:?}", e))
            })?;
            self.format = format;
            self.extent = extent;

            engine_debug!(
                "ember::vulkan",
                "Swapchain: {} images, {}x{}, {:?}, {:?}",
                self.images.len(),
                extent.width,
                extent.height,
                format.format,
                present_mode
            );
            Ok(())
        }
    }

    pub fn images(&self) -> &[vk::Image] {
        &self.images
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn format(&self) -> vk::Format {
        self.format.format
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.extent
    }

    /// Acquire the next image, firing `signal` when it is ready (no timeout)
    pub fn acquire_next_image(&self, signal: vk::Semaphore) -> Result<AcquireOutcome> {
        let result = unsafe {
            self.loader
                .acquire_next_image(self.swapchain, u64::MAX, signal, vk::Fence::null())
        };
        match result {
            Ok((index, suboptimal)) => Ok(AcquireOutcome::Image { index, suboptimal }),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
            Err(e) => Err(vk_error("Failed to acquire next swapchain image", e)),
        }
    }

    /// Queue `image_index` for presentation on `queue` after `wait` fires
    pub fn present(&self, queue: vk::Queue, image_index: u32, wait: vk::Semaphore) -> Result<SwapchainStatus> {
        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let wait_semaphores = [wait];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        match unsafe { self.loader.queue_present(queue, &present_info) } {
            Ok(false) => Ok(SwapchainStatus::Optimal),
            Ok(true) | Err(vk::Result::SUBOPTIMAL_KHR) => Ok(SwapchainStatus::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(SwapchainStatus::OutOfDate),
            Err(e) => Err(vk_error("Failed to present swapchain image", e)),
        }
    }

    /// Destroy the swapchain handle (idempotent)
    pub fn destroy(&mut self) {
        if self.swapchain != vk::SwapchainKHR::null() {
            unsafe {
                self.loader.destroy_swapchain(self.swapchain, None);
            }
            self.swapchain = vk::SwapchainKHR::null();
            self.images.clear();
        }
    }
}

#[cfg(test)]
#[path = "vulkan_swapchain_tests.rs"]
mod tests;
