/// Physical device selection and logical device creation

use ash::vk;
use ember_engine::ember::render::Config;
use ember_engine::ember::{Error, Result};
use ember_engine::{engine_debug, engine_error, engine_info};
use std::ffi::CStr;

/// Extensions enabled only when the device supports them
pub const OPTIONAL_DEVICE_EXTENSIONS: [&CStr; 3] = [
    ash::khr::shader_float_controls::NAME,
    ash::khr::spirv_1_4::NAME,
    ash::ext::mesh_shader::NAME,
];

/// Queue family index per queue role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilies {
    pub graphics: u32,
    pub compute: u32,
    pub present: u32,
    pub transfer: u32,
}

impl QueueFamilies {
    /// Distinct family indices, ascending (one `VkDeviceQueueCreateInfo` each)
    pub fn unique(&self) -> Vec<u32> {
        let mut families = vec![self.graphics, self.compute, self.present, self.transfer];
        families.sort_unstable();
        families.dedup();
        families
    }
}

fn has(props: &vk::QueueFamilyProperties, flags: vk::QueueFlags) -> bool {
    props.queue_count > 0 && props.queue_flags.contains(flags)
}

fn first_family<F>(families: &[vk::QueueFamilyProperties], pred: F) -> Option<u32>
where
    F: Fn(u32, &vk::QueueFamilyProperties) -> bool,
{
    families
        .iter()
        .enumerate()
        .find(|(i, props)| pred(*i as u32, props))
        .map(|(i, _)| i as u32)
}

/// Pick a family for each queue role
///
/// - graphics: first family with GRAPHICS
/// - present: the graphics family when it can present, else the first that can
/// - compute: a compute family without GRAPHICS, falling back to the graphics family
/// - transfer: a TRANSFER family with neither GRAPHICS nor COMPUTE; when
///   `require_dedicated_transfer` is false, any non-graphics TRANSFER family
///   and finally the graphics family are accepted
///
/// Returns `None` when a role cannot be satisfied.
pub fn select_queue_families<P>(
    families: &[vk::QueueFamilyProperties],
    present_support: P,
    require_dedicated_transfer: bool,
) -> Option<QueueFamilies>
where
    P: Fn(u32) -> bool,
{
    let graphics = first_family(families, |_, p| has(p, vk::QueueFlags::GRAPHICS))?;

    let present = if present_support(graphics) {
        graphics
    } else {
        first_family(families, |i, p| p.queue_count > 0 && present_support(i))?
    };

    let compute = first_family(families, |_, p| {
        has(p, vk::QueueFlags::COMPUTE) && !p.queue_flags.contains(vk::QueueFlags::GRAPHICS)
    })
    .unwrap_or(graphics);

    let dedicated_transfer = first_family(families, |_, p| {
        has(p, vk::QueueFlags::TRANSFER)
            && !p.queue_flags.intersects(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE)
    });

    let transfer = match dedicated_transfer {
        Some(index) => index,
        None if require_dedicated_transfer => return None,
        None => first_family(families, |_, p| {
            has(p, vk::QueueFlags::TRANSFER) && !p.queue_flags.contains(vk::QueueFlags::GRAPHICS)
        })
        .unwrap_or(graphics),
    };

    Some(QueueFamilies {
        graphics,
        compute,
        present,
        transfer,
    })
}

/// Whether `api_version` is at least `(major, minor)`
pub fn meets_api_version(api_version: u32, (major, minor): (u32, u32)) -> bool {
    let have = (vk::api_version_major(api_version), vk::api_version_minor(api_version));
    have >= (major, minor)
}

/// Extensions to enable: the swapchain plus every supported optional one
pub fn device_extensions(available: &[&CStr]) -> Option<Vec<&'static CStr>> {
    if !available.contains(&ash::khr::swapchain::NAME) {
        return None;
    }
    let mut enabled = vec![ash::khr::swapchain::NAME];
    enabled.extend(
        OPTIONAL_DEVICE_EXTENSIONS
            .iter()
            .copied()
            .filter(|name| available.contains(name)),
    );
    Some(enabled)
}

/// A physical device that satisfies every requirement
pub struct SelectedDevice {
    pub physical_device: vk::PhysicalDevice,
    pub families: QueueFamilies,
    pub extensions: Vec<&'static CStr>,
    pub name: String,
}

/// Pick the first physical device suitable for `surface`
pub fn pick_physical_device(
    instance: &ash::Instance,
    surface_loader: &ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    config: &Config,
) -> Result<SelectedDevice> {
    let physical_devices = unsafe { instance.enumerate_physical_devices() }.map_err(|e| {
        engine_error!("ember::vulkan", "Failed to enumerate physical devices: {:?}", e);
        Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
    })?;

    for physical_device in physical_devices {
        let properties = unsafe { instance.get_physical_device_properties(physical_device) };
        let name = properties
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "<unnamed>".to_string());

        if !meets_api_version(properties.api_version, config.min_api_version) {
            engine_debug!("ember::vulkan", "Skipping {}: API version too old", name);
            continue;
        }

        let queue_props =
            unsafe { instance.get_physical_device_queue_family_properties(physical_device) };
        let families = select_queue_families(
            &queue_props,
            |index| unsafe {
                surface_loader
                    .get_physical_device_surface_support(physical_device, index, surface)
                    .unwrap_or(false)
            },
            config.require_dedicated_transfer_queue,
        );
        let families = match families {
            Some(families) => families,
            None => {
                engine_debug!("ember::vulkan", "Skipping {}: missing queue families", name);
                continue;
            }
        };

        let available = match unsafe {
            instance.enumerate_device_extension_properties(physical_device)
        } {
            Ok(available) => available,
            Err(e) => {
                engine_debug!("ember::vulkan", "Skipping {}: cannot list extensions: {:?}", name, e);
                continue;
            }
        };
        let available_names: Vec<&CStr> = available
            .iter()
            .filter_map(|ext| ext.extension_name_as_c_str().ok())
            .collect();
        let extensions = match device_extensions(&available_names) {
            Some(extensions) => extensions,
            None => {
                engine_debug!("ember::vulkan", "Skipping {}: no swapchain support", name);
                continue;
            }
        };

        engine_info!("ember::vulkan", "Selected GPU: {} ({:?})", name, families);
        return Ok(SelectedDevice {
            physical_device,
            families,
            extensions,
            name,
        });
    }

    engine_error!("ember::vulkan", "No suitable Vulkan GPU found");
    Err(Error::InitializationFailed("No suitable Vulkan GPU found".to_string()))
}

/// Create the logical device with one queue per distinct family
pub fn create_logical_device(instance: &ash::Instance, selected: &SelectedDevice) -> Result<ash::Device> {
    let queue_priorities = [1.0];
    let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = selected
        .families
        .unique()
        .into_iter()
        .map(|family| {
            vk::DeviceQueueCreateInfo::default()
                .queue_family_index(family)
                .queue_priorities(&queue_priorities)
        })
        .collect();

    let extension_names: Vec<*const std::os::raw::c_char> =
        selected.extensions.iter().map(|name| name.as_ptr()).collect();

    let device_create_info = vk::DeviceCreateInfo::default()
        .queue_create_infos(&queue_create_infos)
        .enabled_extension_names(&extension_names);

    unsafe {
        instance
            .create_device(selected.physical_device, &device_create_info, None)
            .map_err(|e| {
                engine_error!("ember::vulkan", "Failed to create logical device: {:?}", e);
                Error::InitializationFailed(format!("Failed to create device: {:?}", e))
            })
    }
}

#[cfg(test)]
#[path = "vulkan_device_tests.rs"]
mod tests;
