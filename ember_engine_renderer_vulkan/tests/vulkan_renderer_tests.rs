//! Integration tests for the Vulkan backend
//!
//! These tests drive `VulkanContext` and `Renderer` on a real device.
//! All tests require a GPU and are marked with #[ignore].
//!
//! Run with: cargo test --test vulkan_renderer_tests -- --ignored

use ember_engine::ember::render::{Config, Extent2D, FrameStatus, QueueType, RenderContext, Renderer};
use ember_engine::ember::Error;
use ember_engine_renderer_vulkan::ember::VulkanContext;
use winit::event_loop::EventLoop;
use winit::window::Window;

/// Helper to create a test window for Vulkan
#[allow(deprecated)]
fn create_test_window() -> (Window, EventLoop<()>) {
    let event_loop = EventLoop::new().unwrap();
    let window_attrs = Window::default_attributes()
        .with_title("Ember Vulkan Test")
        .with_inner_size(winit::dpi::LogicalSize::new(800, 600))
        .with_visible(false); // Hidden window for tests
    let window = event_loop.create_window(window_attrs).unwrap();
    (window, event_loop)
}

/// Config accepted by any device with a graphics queue
fn test_config() -> Config {
    Config {
        enable_validation: false,
        require_dedicated_transfer_queue: false,
        ..Config::default()
    }
}

fn create_context(window: &Window) -> VulkanContext {
    VulkanContext::new(window, Extent2D::new(800, 600), &test_config()).unwrap()
}

// ============================================================================
// CONTEXT TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_context_creation() {
    let (window, _event_loop) = create_test_window();
    let context = create_context(&window);

    assert!(!context.device_name().is_empty());
    assert!(context.image_count() >= 2);
    assert!(!context.extent().is_empty());
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_context_queues() {
    let (window, _event_loop) = create_test_window();
    let context = create_context(&window);

    let families = context.queue_families();
    assert!(families.unique().contains(&families.graphics));
    for queue in [QueueType::Graphics, QueueType::Compute, QueueType::Present, QueueType::Transfer] {
        assert_ne!(context.queue(queue), ash::vk::Queue::null());
    }
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_rejects_unreachable_api_version() {
    let (window, _event_loop) = create_test_window();
    let config = Config {
        min_api_version: (99, 0),
        ..test_config()
    };

    let result = VulkanContext::new(&window, Extent2D::new(800, 600), &config);
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_rejects_nul_in_app_name() {
    let (window, _event_loop) = create_test_window();
    let config = Config {
        app_name: "bad\0name".to_string(),
        ..test_config()
    };

    let result = VulkanContext::new(&window, Extent2D::new(800, 600), &config);
    assert!(matches!(result, Err(Error::InvalidConfig(_))));
}

// ============================================================================
// FRAME TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
fn test_vulkan_renderer_runs_frames() {
    let (window, _event_loop) = create_test_window();
    let mut renderer = Renderer::new(create_context(&window), &test_config()).unwrap();

    let mut submitted = 0;
    for _ in 0..10 {
        match renderer.start_frame().unwrap() {
            FrameStatus::Ready => {
                assert!(renderer.graphics_command_buffer().is_some());
                assert!(renderer.compute_command_buffer().is_some());
                assert!(renderer.current_framebuffer().is_some());
                renderer.submit_frame().unwrap();
                submitted += 1;
            }
            FrameStatus::Skipped => continue,
        }
    }

    assert!(submitted > 0);
    assert!(!renderer.is_recording());
    assert!(renderer.frame_index() < renderer.frame_count());
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_double_start_frame_fails() {
    let (window, _event_loop) = create_test_window();
    let mut renderer = Renderer::new(create_context(&window), &test_config()).unwrap();

    while renderer.start_frame().unwrap() != FrameStatus::Ready {}
    assert!(matches!(renderer.start_frame(), Err(Error::InvalidFrameState(_))));

    renderer.submit_frame().unwrap();
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_recreate_swapchain() {
    let (window, _event_loop) = create_test_window();
    let mut renderer = Renderer::new(create_context(&window), &test_config()).unwrap();

    renderer.context_mut().set_window_extent(Extent2D::new(640, 480));
    renderer.recreate_swapchain().unwrap();

    assert_eq!(renderer.frame_index(), 0);
    assert_eq!(renderer.frame_count(), renderer.context().image_count());

    while renderer.start_frame().unwrap() != FrameStatus::Ready {}
    renderer.submit_frame().unwrap();
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_renderer_destroy() {
    let (window, _event_loop) = create_test_window();
    let mut renderer = Renderer::new(create_context(&window), &test_config()).unwrap();

    renderer.destroy();
    renderer.destroy();

    assert!(renderer.is_destroyed());
    assert!(renderer.start_frame().is_err());
}

// ============================================================================
// SHADER TESTS
// ============================================================================

/// `#version 450` compute shader with an empty main, as SPIR-V 1.0
const NOOP_COMPUTE_SPIRV: &[u32] = &[
    0x0723_0203, 0x0001_0000, 0x0008_000b, 0x0000_0006, 0x0000_0000,
    0x0002_0011, 0x0000_0001, 0x0006_000b, 0x0000_0001, 0x4c53_4c47,
    0x6474_732e, 0x3035_342e, 0x0000_0000, 0x0003_000e, 0x0000_0000,
    0x0000_0001, 0x0005_000f, 0x0000_0005, 0x0000_0004, 0x6e69_616d,
    0x0000_0000, 0x0006_0010, 0x0000_0004, 0x0000_0011, 0x0000_0001,
    0x0000_0001, 0x0000_0001, 0x0002_0013, 0x0000_0002, 0x0003_0021,
    0x0000_0003, 0x0000_0002, 0x0005_0036, 0x0000_0002, 0x0000_0004,
    0x0000_0000, 0x0000_0003, 0x0002_00f8, 0x0000_0005, 0x0001_00fd,
    0x0001_0038,
];

#[test]
#[ignore] // Requires GPU
fn test_vulkan_create_shader_module() {
    let (window, _event_loop) = create_test_window();
    let context = create_context(&window);

    let module = context.create_shader_module(NOOP_COMPUTE_SPIRV).unwrap();
    assert_ne!(module, ash::vk::ShaderModule::null());
    context.destroy_shader_module(module);
}

#[test]
#[ignore] // Requires GPU
fn test_vulkan_empty_shader_module_fails() {
    let (window, _event_loop) = create_test_window();
    let context = create_context(&window);

    assert!(matches!(context.create_shader_module(&[]), Err(Error::InvalidResource(_))));
}
