/// Unit tests for swapchain parameter selection

use super::*;

fn surface_format(format: vk::Format) -> vk::SurfaceFormatKHR {
    vk::SurfaceFormatKHR {
        format,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }
}

fn capabilities(min: u32, max: u32, current: vk::Extent2D) -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
        min_image_count: min,
        max_image_count: max,
        current_extent: current,
        min_image_extent: vk::Extent2D { width: 1, height: 1 },
        max_image_extent: vk::Extent2D { width: 4096, height: 2048 },
        ..Default::default()
    }
}

#[test]
fn test_surface_format_prefers_bgra_srgb() {
    let formats = [
        surface_format(vk::Format::R8G8B8A8_UNORM),
        surface_format(vk::Format::R8G8B8A8_SRGB),
        surface_format(vk::Format::B8G8R8A8_SRGB),
    ];
    assert_eq!(choose_surface_format(&formats).unwrap().format, vk::Format::B8G8R8A8_SRGB);
}

#[test]
fn test_surface_format_fallbacks() {
    let formats = [
        surface_format(vk::Format::B8G8R8A8_UNORM),
        surface_format(vk::Format::R8G8B8A8_SRGB),
    ];
    assert_eq!(choose_surface_format(&formats).unwrap().format, vk::Format::R8G8B8A8_SRGB);

    let formats = [surface_format(vk::Format::A2B10G10R10_UNORM_PACK32)];
    assert_eq!(
        choose_surface_format(&formats).unwrap().format,
        vk::Format::A2B10G10R10_UNORM_PACK32
    );

    assert!(choose_surface_format(&[]).is_none());
}

#[test]
fn test_srgb_format_needs_srgb_color_space() {
    let formats = [
        vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_SRGB,
            color_space: vk::ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT,
        },
        surface_format(vk::Format::R8G8B8A8_SRGB),
    ];
    assert_eq!(choose_surface_format(&formats).unwrap().format, vk::Format::R8G8B8A8_SRGB);
}

#[test]
fn test_present_mode() {
    assert_eq!(
        choose_present_mode(&[vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX]),
        vk::PresentModeKHR::MAILBOX
    );
    assert_eq!(
        choose_present_mode(&[vk::PresentModeKHR::IMMEDIATE, vk::PresentModeKHR::FIFO]),
        vk::PresentModeKHR::FIFO
    );
}

#[test]
fn test_extent_uses_surface_extent() {
    let caps = capabilities(2, 3, vk::Extent2D { width: 800, height: 600 });
    assert_eq!(
        choose_extent(&caps, Extent2D::new(1280, 720)),
        vk::Extent2D { width: 800, height: 600 }
    );
}

#[test]
fn test_extent_clamps_window_size() {
    let caps = capabilities(2, 3, vk::Extent2D { width: u32::MAX, height: u32::MAX });
    assert_eq!(
        choose_extent(&caps, Extent2D::new(1280, 720)),
        vk::Extent2D { width: 1280, height: 720 }
    );
    assert_eq!(
        choose_extent(&caps, Extent2D::new(8000, 5000)),
        vk::Extent2D { width: 4096, height: 2048 }
    );
}

#[test]
fn test_minimized_surface_has_empty_extent() {
    // Surface reports its own (zero) size
    let caps = capabilities(2, 3, vk::Extent2D { width: 0, height: 0 });
    assert!(is_empty_extent(choose_extent(&caps, Extent2D::new(0, 0))));
    assert!(is_empty_extent(choose_extent(&caps, Extent2D::new(800, 600))));

    // Swapchain decides: a minimized window must not be clamped up to 1x1
    let caps = capabilities(2, 3, vk::Extent2D { width: u32::MAX, height: u32::MAX });
    assert!(is_empty_extent(choose_extent(&caps, Extent2D::new(0, 0))));
    assert!(is_empty_extent(choose_extent(&caps, Extent2D::new(800, 0))));
    assert!(!is_empty_extent(choose_extent(&caps, Extent2D::new(800, 600))));
}

#[test]
fn test_image_count() {
    let current = vk::Extent2D { width: 1, height: 1 };
    assert_eq!(choose_image_count(&capabilities(2, 8, current)), 3);
    assert_eq!(choose_image_count(&capabilities(2, 2, current)), 2);
    assert_eq!(choose_image_count(&capabilities(3, 0, current)), 4);
}
