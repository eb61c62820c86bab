/*!
# Ember Engine - Vulkan Backend

Vulkan implementation of the Ember frame protocol, built on `ash`.

`VulkanContext` implements `RenderContext` over a real device: instance,
surface, physical device selection, four queues, swapchain and the command
pools the per-frame command buffers come from. `Window` ties a `winit`
window, the context and a `Renderer` together for the application loop.

## Features

- `vulkan-validation`: Khronos validation layer and a debug messenger that
  forwards messages to the engine logger
- `shader-compiler`: GLSL to SPIR-V compilation through `shaderc`
*/

// Vulkan implementation modules
mod vulkan_context;
mod vulkan_device;
mod vulkan_swapchain;
mod vulkan_shader;
#[cfg(feature = "vulkan-validation")]
mod vulkan_debug;
mod window;

// Main ember namespace module
pub mod ember {
    pub use crate::vulkan_context::{vk_error, VulkanContext};
    pub use crate::vulkan_device::QueueFamilies;
    pub use crate::window::Window;

    // Shader helpers
    pub use crate::vulkan_shader::{create_shader_module, shader_stage_to_vk};
    #[cfg(feature = "shader-compiler")]
    pub use crate::vulkan_shader::compile_glsl;

    // Validation layer statistics
    #[cfg(feature = "vulkan-validation")]
    pub use crate::vulkan_debug::{
        get_validation_stats, print_validation_stats_report, reset_validation_stats,
    };
}
