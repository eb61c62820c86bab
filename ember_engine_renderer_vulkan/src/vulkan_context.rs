/// VulkanContext - instance, device, queues and swapchain behind `RenderContext`
///
/// Setup order is instance, debug messenger, surface, physical device,
/// logical device, swapchain, then one command pool per submitting queue
/// (graphics, compute). A failure at any step tears down what was already
/// created, newest first. `Drop` walks the same list in the same order.

use ash::vk;
use ember_engine::ember::render::{
    AcquireOutcome, ClearValue, Config, Extent2D, PipelineStage, QueueType, RenderContext,
    SubmitDesc, SwapchainStatus, ValidationStats,
};
use ember_engine::ember::{Error, Result};
use ember_engine::{engine_error, engine_info, engine_trace};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle};
use scopeguard::{guard, ScopeGuard};
use std::ffi::CString;

use crate::vulkan_device::{create_logical_device, pick_physical_device, QueueFamilies};
use crate::vulkan_swapchain::Swapchain;

type DebugMessenger = (ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT);

/// Map a failed Vulkan call to an engine error
///
/// Memory exhaustion and device loss get their own variants, everything else
/// becomes `BackendError`. Nothing is logged here: setup paths log at the
/// call site, steady-state failures are logged by the frame orchestrator.
pub fn vk_error(what: &str, result: vk::Result) -> Error {
    match result {
        vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
            Error::OutOfMemory
        }
        vk::Result::ERROR_DEVICE_LOST => Error::DeviceLost,
        vk::Result::ERROR_OUT_OF_DATE_KHR => Error::SwapchainOutOfDate,
        other => Error::BackendError(format!("{}: {:?}", what, other)),
    }
}

/// Same as [`vk_error`], logged at error level (object creation)
fn vk_creation_error(what: &str, result: vk::Result) -> Error {
    engine_error!("ember::vulkan", "{}: {:?}", what, result);
    vk_error(what, result)
}

/// Convert engine pipeline stages to Vulkan stage flags
pub fn pipeline_stage_to_vk(stage: PipelineStage) -> vk::PipelineStageFlags {
    let pairs = [
        (PipelineStage::TOP_OF_PIPE, vk::PipelineStageFlags::TOP_OF_PIPE),
        (PipelineStage::VERTEX_INPUT, vk::PipelineStageFlags::VERTEX_INPUT),
        (PipelineStage::VERTEX_SHADER, vk::PipelineStageFlags::VERTEX_SHADER),
        (PipelineStage::FRAGMENT_SHADER, vk::PipelineStageFlags::FRAGMENT_SHADER),
        (
            PipelineStage::COLOR_ATTACHMENT_OUTPUT,
            vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
        ),
        (PipelineStage::COMPUTE_SHADER, vk::PipelineStageFlags::COMPUTE_SHADER),
        (PipelineStage::TRANSFER, vk::PipelineStageFlags::TRANSFER),
        (PipelineStage::BOTTOM_OF_PIPE, vk::PipelineStageFlags::BOTTOM_OF_PIPE),
    ];
    pairs
        .iter()
        .filter(|(engine, _)| stage.contains(*engine))
        .fold(vk::PipelineStageFlags::empty(), |flags, (_, vk_stage)| flags | *vk_stage)
}

/// Convert an engine clear value
pub fn clear_value_to_vk(value: ClearValue) -> vk::ClearValue {
    match value {
        ClearValue::Color(float32) => vk::ClearValue {
            color: vk::ClearColorValue { float32 },
        },
        ClearValue::DepthStencil { depth, stencil } => vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue { depth, stencil },
        },
    }
}

fn make_version((major, minor, patch): (u32, u32, u32)) -> u32 {
    vk::make_api_version(0, major, minor, patch)
}

fn create_instance(
    entry: &ash::Entry,
    display: RawDisplayHandle,
    config: &Config,
    validation: bool,
) -> Result<ash::Instance> {
    let app_name = CString::new(config.app_name.as_str()).map_err(|_| {
        engine_error!("ember::vulkan", "Application name contains a NUL byte");
        Error::InvalidConfig("application name contains a NUL byte".to_string())
    })?;
    let (major, minor) = config.min_api_version;

    let app_info = vk::ApplicationInfo::default()
        .application_name(&app_name)
        .application_version(make_version(config.app_version))
        .engine_name(c"Ember")
        .engine_version(make_version((0, 1, 0)))
        .api_version(vk::make_api_version(0, major, minor, 0));

    let mut extension_names = ash_window::enumerate_required_extensions(display)
        .map_err(|e| {
            engine_error!("ember::vulkan", "Failed to get required extensions: {}", e);
            Error::InitializationFailed(format!("Failed to get required extensions: {}", e))
        })?
        .to_vec();

    let layer_names = if validation {
        extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
        vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
    } else {
        vec![]
    };

    let create_info = vk::InstanceCreateInfo::default()
        .application_info(&app_info)
        .enabled_layer_names(&layer_names)
        .enabled_extension_names(&extension_names);

    unsafe { entry.create_instance(&create_info, None) }.map_err(|e| {
        engine_error!("ember::vulkan", "Failed to create Vulkan instance: {:?}", e);
        Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
    })
}

#[cfg(feature = "vulkan-validation")]
fn create_debug_messenger(
    entry: &ash::Entry,
    instance: &ash::Instance,
    config: &Config,
    validation: bool,
) -> Result<Option<DebugMessenger>> {
    if !validation {
        return Ok(None);
    }
    crate::vulkan_debug::create_debug_messenger(entry, instance, config.debug_severity).map(Some)
}

#[cfg(not(feature = "vulkan-validation"))]
fn create_debug_messenger(
    _entry: &ash::Entry,
    _instance: &ash::Instance,
    _config: &Config,
    _validation: bool,
) -> Result<Option<DebugMessenger>> {
    Ok(None)
}

fn destroy_debug_messenger(messenger: Option<DebugMessenger>) {
    if let Some((loader, messenger)) = messenger {
        // Stop forwarding before the messenger goes away
        #[cfg(feature = "vulkan-validation")]
        crate::vulkan_debug::cleanup_debug_config();
        unsafe {
            loader.destroy_debug_utils_messenger(messenger, None);
        }
    }
}

fn create_command_pool(device: &ash::Device, family: u32, name: &str) -> Result<vk::CommandPool> {
    let create_info = vk::CommandPoolCreateInfo::default()
        .queue_family_index(family)
        .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

    unsafe { device.create_command_pool(&create_info, None) }.map_err(|e| {
        engine_error!("ember::vulkan", "Failed to create {} command pool: {:?}", name, e);
        Error::InitializationFailed(format!("Failed to create {} command pool: {:?}", name, e))
    })
}

/// Vulkan implementation of [`RenderContext`]
pub struct VulkanContext {
    /// Vulkan loader (must outlive the instance)
    _entry: ash::Entry,
    instance: ash::Instance,
    debug_messenger: Option<DebugMessenger>,

    surface_loader: ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,

    physical_device: vk::PhysicalDevice,
    device_name: String,
    device: ash::Device,

    families: QueueFamilies,
    graphics_queue: vk::Queue,
    compute_queue: vk::Queue,
    present_queue: vk::Queue,
    transfer_queue: vk::Queue,

    swapchain: Swapchain,
    /// Size requested for the next swapchain (window client area)
    window_extent: Extent2D,

    /// Pools for the per-frame command buffers (RESET_COMMAND_BUFFER)
    graphics_pool: vk::CommandPool,
    compute_pool: vk::CommandPool,
}

impl VulkanContext {
    /// Create the full context for `window`
    ///
    /// # Arguments
    ///
    /// * `window` - Window the surface is created for
    /// * `window_extent` - Client area size, used when the surface lets the swapchain pick its size
    /// * `config` - Renderer configuration
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(
        window: &W,
        window_extent: Extent2D,
        config: &Config,
    ) -> Result<Self> {
        let entry = unsafe { ash::Entry::load() }.map_err(|e| {
            engine_error!("ember::vulkan", "Failed to load Vulkan library: {:?}", e);
            Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
        })?;

        let display_handle = window.display_handle().map_err(|e| {
            engine_error!("ember::vulkan", "Failed to get display handle: {}", e);
            Error::InitializationFailed(format!("Failed to get display handle: {}", e))
        })?;
        let window_handle = window.window_handle().map_err(|e| {
            engine_error!("ember::vulkan", "Failed to get window handle: {}", e);
            Error::InitializationFailed(format!("Failed to get window handle: {}", e))
        })?;

        let validation = cfg!(feature = "vulkan-validation") && config.enable_validation;
        if config.enable_validation && !validation {
            engine_info!(
                "ember::vulkan",
                "Validation requested but the vulkan-validation feature is disabled"
            );
        }

        let instance = create_instance(&entry, display_handle.as_raw(), config, validation)?;
        let instance = guard(instance, |instance| unsafe { instance.destroy_instance(None) });

        let debug_messenger = create_debug_messenger(&entry, &instance, config, validation)?;
        let debug_messenger = guard(debug_messenger, destroy_debug_messenger);

        let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);
        let surface = unsafe {
            ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
        }
        .map_err(|e| {
            engine_error!("ember::vulkan", "Failed to create surface: {:?}", e);
            Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
        })?;
        let surface = guard(surface, |surface| unsafe { surface_loader.destroy_surface(surface, None) });

        let selected = pick_physical_device(&instance, &surface_loader, *surface, config)?;
        let device = create_logical_device(&instance, &selected)?;
        let device = guard(device, |device| unsafe { device.destroy_device(None) });

        let families = selected.families;
        let (graphics_queue, compute_queue, present_queue, transfer_queue) = unsafe {
            (
                device.get_device_queue(families.graphics, 0),
                device.get_device_queue(families.compute, 0),
                device.get_device_queue(families.present, 0),
                device.get_device_queue(families.transfer, 0),
            )
        };

        let swapchain = Swapchain::new(
            &instance,
            &device,
            selected.physical_device,
            &surface_loader,
            *surface,
            &families,
            window_extent,
        )?;
        let swapchain = guard(swapchain, |mut swapchain| swapchain.destroy());

        let graphics_pool = create_command_pool(&device, families.graphics, "graphics")?;
        let graphics_pool = guard(graphics_pool, |pool| unsafe { device.destroy_command_pool(pool, None) });
        let compute_pool = create_command_pool(&device, families.compute, "compute")?;
        let compute_pool = guard(compute_pool, |pool| unsafe { device.destroy_command_pool(pool, None) });

        // Setup succeeded: disarm the guards, newest first
        let compute_pool = ScopeGuard::into_inner(compute_pool);
        let graphics_pool = ScopeGuard::into_inner(graphics_pool);
        let swapchain = ScopeGuard::into_inner(swapchain);
        let device = ScopeGuard::into_inner(device);
        let surface = ScopeGuard::into_inner(surface);
        let debug_messenger = ScopeGuard::into_inner(debug_messenger);
        let instance = ScopeGuard::into_inner(instance);

        engine_info!(
            "ember::vulkan",
            "Vulkan context ready on {} ({} swapchain images)",
            selected.name,
            swapchain.image_count()
        );

        Ok(Self {
            _entry: entry,
            instance,
            debug_messenger,
            surface_loader,
            surface,
            physical_device: selected.physical_device,
            device_name: selected.name,
            device,
            families,
            graphics_queue,
            compute_queue,
            present_queue,
            transfer_queue,
            swapchain,
            window_extent,
            graphics_pool,
            compute_pool,
        })
    }

    /// Name of the selected GPU
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    pub fn queue_families(&self) -> QueueFamilies {
        self.families
    }

    /// Queue handle for a queue role
    pub fn queue(&self, queue: QueueType) -> vk::Queue {
        match queue {
            QueueType::Graphics => self.graphics_queue,
            QueueType::Compute => self.compute_queue,
            QueueType::Present => self.present_queue,
            QueueType::Transfer => self.transfer_queue,
        }
    }

    pub fn swapchain_format(&self) -> vk::Format {
        self.swapchain.format()
    }

    /// Record the window size the next swapchain recreation should target
    pub fn set_window_extent(&mut self, extent: Extent2D) {
        self.window_extent = extent;
    }

    /// Validation messages seen since the debug messenger was installed
    pub fn validation_stats(&self) -> ValidationStats {
        #[cfg(feature = "vulkan-validation")]
        if self.debug_messenger.is_some() {
            return crate::vulkan_debug::get_validation_stats();
        }
        ValidationStats::default()
    }

    fn command_pool(&self, queue: QueueType) -> Result<vk::CommandPool> {
        match queue {
            QueueType::Graphics => Ok(self.graphics_pool),
            QueueType::Compute => Ok(self.compute_pool),
            other => {
                engine_error!("ember::vulkan", "No command pool for {:?} queue", other);
                Err(Error::InvalidResource(format!("no command pool for {:?} queue", other)))
            }
        }
    }
}

impl RenderContext for VulkanContext {
    type CommandBuffer = vk::CommandBuffer;
    type Semaphore = vk::Semaphore;
    type Fence = vk::Fence;
    type ImageView = vk::ImageView;
    type RenderPass = vk::RenderPass;
    type Framebuffer = vk::Framebuffer;

    // ===== SWAPCHAIN =====

    fn image_count(&self) -> usize {
        self.swapchain.image_count()
    }

    fn extent(&self) -> Extent2D {
        let extent = self.swapchain.extent();
        Extent2D::new(extent.width, extent.height)
    }

    fn acquire_next_image(&self, signal: vk::Semaphore) -> Result<AcquireOutcome> {
        self.swapchain.acquire_next_image(signal)
    }

    fn present(&self, image_index: u32, wait: vk::Semaphore) -> Result<SwapchainStatus> {
        self.swapchain.present(self.present_queue, image_index, wait)
    }

    fn surface_extent(&self) -> Result<Extent2D> {
        crate::vulkan_swapchain::surface_extent(
            self.physical_device,
            &self.surface_loader,
            self.surface,
            self.window_extent,
        )
    }

    fn recreate_swapchain(&mut self) -> Result<()> {
        unsafe { self.device.device_wait_idle() }.map_err(|e| {
            engine_error!("ember::vulkan", "Failed to wait idle before swapchain recreate: {:?}", e);
            vk_error("Failed to wait idle before swapchain recreate", e)
        })?;

        self.swapchain.recreate(
            self.physical_device,
            &self.surface_loader,
            self.surface,
            &self.families,
            self.window_extent,
        )
    }

    // ===== OBJECT CREATION =====

    fn create_semaphore(&self) -> Result<vk::Semaphore> {
        let create_info = vk::SemaphoreCreateInfo::default();
        unsafe { self.device.create_semaphore(&create_info, None) }
            .map_err(|e| vk_creation_error("Failed to create semaphore", e))
    }

    fn create_fence(&self, signaled: bool) -> Result<vk::Fence> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let create_info = vk::FenceCreateInfo::default().flags(flags);
        unsafe { self.device.create_fence(&create_info, None) }
            .map_err(|e| vk_creation_error("Failed to create fence", e))
    }

    fn allocate_command_buffer(&self, queue: QueueType) -> Result<vk::CommandBuffer> {
        let pool = self.command_pool(queue)?;
        let allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);

        let buffers = unsafe { self.device.allocate_command_buffers(&allocate_info) }
            .map_err(|e| vk_creation_error("Failed to allocate command buffer", e))?;
        buffers.into_iter().next().ok_or_else(|| {
            engine_error!("ember::vulkan", "Driver returned no command buffer");
            Error::BackendError("Driver returned no command buffer".to_string())
        })
    }

    fn create_image_view(&self, image_index: usize) -> Result<vk::ImageView> {
        let image = match self.swapchain.images().get(image_index) {
            Some(&image) => image,
            None => {
                engine_error!(
                    "ember::vulkan",
                    "Swapchain image {} out of range (count: {})",
                    image_index,
                    self.swapchain.image_count()
                );
                return Err(Error::InvalidResource(format!(
                    "swapchain image {} out of range",
                    image_index
                )));
            }
        };

        let create_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(self.swapchain.format())
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        unsafe { self.device.create_image_view(&create_info, None) }
            .map_err(|e| vk_creation_error("Failed to create swapchain image view", e))
    }

    fn create_render_pass(&self) -> Result<vk::RenderPass> {
        let attachments = [vk::AttachmentDescription::default()
            .format(self.swapchain.format())
            .samples(vk::SampleCountFlags::TYPE_1)
            .load_op(vk::AttachmentLoadOp::CLEAR)
            .store_op(vk::AttachmentStoreOp::STORE)
            .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
            .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)];

        let color_refs = [vk::AttachmentReference {
            attachment: 0,
            layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        }];

        let subpasses = [vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs)];

        // The layout transition must wait for the acquire semaphore, which
        // the graphics submit waits on at color attachment output
        let dependencies = [vk::SubpassDependency::default()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
            .src_access_mask(vk::AccessFlags::empty())
            .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE)];

        let create_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        unsafe { self.device.create_render_pass(&create_info, None) }
            .map_err(|e| vk_creation_error("Failed to create swapchain render pass", e))
    }

    fn create_framebuffer(
        &self,
        render_pass: vk::RenderPass,
        view: vk::ImageView,
    ) -> Result<vk::Framebuffer> {
        let extent = self.swapchain.extent();
        let attachments = [view];
        let create_info = vk::FramebufferCreateInfo::default()
            .render_pass(render_pass)
            .attachments(&attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);

        unsafe { self.device.create_framebuffer(&create_info, None) }
            .map_err(|e| vk_creation_error("Failed to create swapchain framebuffer", e))
    }

    // ===== OBJECT DESTRUCTION =====

    fn destroy_semaphore(&self, semaphore: vk::Semaphore) {
        unsafe { self.device.destroy_semaphore(semaphore, None) }
    }

    fn destroy_fence(&self, fence: vk::Fence) {
        unsafe { self.device.destroy_fence(fence, None) }
    }

    fn free_command_buffer(&self, queue: QueueType, command_buffer: vk::CommandBuffer) {
        if let Ok(pool) = self.command_pool(queue) {
            unsafe { self.device.free_command_buffers(pool, &[command_buffer]) }
        }
    }

    fn destroy_image_view(&self, view: vk::ImageView) {
        unsafe { self.device.destroy_image_view(view, None) }
    }

    fn destroy_render_pass(&self, render_pass: vk::RenderPass) {
        unsafe { self.device.destroy_render_pass(render_pass, None) }
    }

    fn destroy_framebuffer(&self, framebuffer: vk::Framebuffer) {
        unsafe { self.device.destroy_framebuffer(framebuffer, None) }
    }

    // ===== SYNCHRONIZATION =====

    fn wait_for_fence(&self, fence: vk::Fence) -> Result<()> {
        unsafe { self.device.wait_for_fences(&[fence], true, u64::MAX) }
            .map_err(|e| vk_error("Failed to wait for fence", e))
    }

    fn reset_fence(&self, fence: vk::Fence) -> Result<()> {
        unsafe { self.device.reset_fences(&[fence]) }.map_err(|e| vk_error("Failed to reset fence", e))
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe { self.device.device_wait_idle() }.map_err(|e| vk_error("Failed to wait idle", e))
    }

    // ===== RECORDING =====

    fn reset_command_buffer(&self, command_buffer: vk::CommandBuffer) -> Result<()> {
        unsafe {
            self.device
                .reset_command_buffer(command_buffer, vk::CommandBufferResetFlags::empty())
        }
        .map_err(|e| vk_error("Failed to reset command buffer", e))
    }

    fn begin_command_buffer(&self, command_buffer: vk::CommandBuffer) -> Result<()> {
        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        unsafe { self.device.begin_command_buffer(command_buffer, &begin_info) }
            .map_err(|e| vk_error("Failed to begin command buffer", e))
    }

    fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) -> Result<()> {
        unsafe { self.device.end_command_buffer(command_buffer) }
            .map_err(|e| vk_error("Failed to end command buffer", e))
    }

    fn cmd_begin_render_pass(
        &self,
        command_buffer: vk::CommandBuffer,
        render_pass: vk::RenderPass,
        framebuffer: vk::Framebuffer,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        let clear_values: Vec<vk::ClearValue> =
            clear_values.iter().copied().map(clear_value_to_vk).collect();

        let begin_info = vk::RenderPassBeginInfo::default()
            .render_pass(render_pass)
            .framebuffer(framebuffer)
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent: self.swapchain.extent(),
            })
            .clear_values(&clear_values);

        unsafe {
            self.device
                .cmd_begin_render_pass(command_buffer, &begin_info, vk::SubpassContents::INLINE);
        }
        Ok(())
    }

    fn cmd_end_render_pass(&self, command_buffer: vk::CommandBuffer) -> Result<()> {
        unsafe { self.device.cmd_end_render_pass(command_buffer) };
        Ok(())
    }

    // ===== SUBMISSION =====

    fn submit(&self, queue: QueueType, desc: &SubmitDesc<'_, Self>) -> Result<()> {
        let wait_semaphores: Vec<vk::Semaphore> = desc.wait.iter().map(|(s, _)| *s).collect();
        let wait_stages: Vec<vk::PipelineStageFlags> = desc
            .wait
            .iter()
            .map(|(_, stage)| pipeline_stage_to_vk(*stage))
            .collect();

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(desc.command_buffers)
            .signal_semaphores(desc.signal);

        engine_trace!(
            "ember::vulkan",
            "Submitting {} command buffer(s) to {:?} queue",
            desc.command_buffers.len(),
            queue
        );

        unsafe {
            self.device.queue_submit(
                self.queue(queue),
                &[submit_info],
                desc.fence.unwrap_or(vk::Fence::null()),
            )
        }
        .map_err(|e| vk_error("Failed to submit commands to GPU queue", e))
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        unsafe {
            // Wait for device to finish
            self.device.device_wait_idle().ok();

            self.device.destroy_command_pool(self.compute_pool, None);
            self.device.destroy_command_pool(self.graphics_pool, None);
            self.swapchain.destroy();
            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);
        }

        // Debug messenger BEFORE the instance
        destroy_debug_messenger(self.debug_messenger.take());

        unsafe {
            self.instance.destroy_instance(None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_context_tests.rs"]
mod tests;
