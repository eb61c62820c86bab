/// Unit tests for FrameResources, driven by the mock context

use crate::error::Error;
use crate::renderer::mock_context::{MockContext, MockEvent};
use crate::renderer::{FrameResources, RenderContext};

// Per slot: view, render pass, framebuffer, 2 command buffers, 3 semaphores, 2 fences
const OBJECTS_PER_SLOT: usize = 10;

#[test]
fn test_creates_one_slot_per_image() {
    for n in 1..=4 {
        let ctx = MockContext::new(n);
        let gpu = ctx.gpu();
        let mut frames = FrameResources::new(&ctx).unwrap();

        assert_eq!(frames.len(), n);
        assert!(!frames.is_empty());
        assert_eq!(frames.object_count(), n * OBJECTS_PER_SLOT);
        assert_eq!(gpu.live_objects(), n * OBJECTS_PER_SLOT);

        frames.destroy(&ctx);
        assert_eq!(gpu.live_objects(), 0);
        assert!(gpu.violations().is_empty(), "{:?}", gpu.violations());
    }
}

#[test]
fn test_slots_hold_distinct_objects() {
    let ctx = MockContext::new(3);
    let mut frames = FrameResources::new(&ctx).unwrap();

    let slots = frames.slots();
    for (i, a) in slots.iter().enumerate() {
        assert_ne!(a.image_available, a.render_finished);
        assert_ne!(a.render_finished, a.compute_finished);
        assert_ne!(a.graphics_fence, a.compute_fence);
        assert_ne!(a.graphics_command_buffer, a.compute_command_buffer);
        for b in &slots[i + 1..] {
            assert_ne!(a.framebuffer, b.framebuffer);
            assert_ne!(a.graphics_fence, b.graphics_fence);
            assert_ne!(a.image_available, b.image_available);
        }
    }

    frames.destroy(&ctx);
}

#[test]
fn test_fences_start_signaled() {
    let ctx = MockContext::new(2);
    let gpu = ctx.gpu();
    let mut frames = FrameResources::new(&ctx).unwrap();

    for slot in frames.slots() {
        ctx.wait_for_fence(slot.graphics_fence).unwrap();
        ctx.wait_for_fence(slot.compute_fence).unwrap();
    }
    assert!(gpu.violations().is_empty());

    frames.destroy(&ctx);
}

#[test]
fn test_zero_images_is_setup_failure() {
    let ctx = MockContext::new(0);
    let gpu = ctx.gpu();

    let result = FrameResources::new(&ctx);
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
    assert_eq!(gpu.live_objects(), 0);
}

#[test]
fn test_failure_rolls_back_everything() {
    // Fail at every possible creation step of a 2-slot setup
    for failing in 0..2 * OBJECTS_PER_SLOT {
        let ctx = MockContext::new(2);
        let gpu = ctx.gpu();
        gpu.fail_nth_creation(failing);

        let result = FrameResources::new(&ctx);

        assert!(matches!(result, Err(Error::OutOfMemory)), "step {}", failing);
        assert_eq!(gpu.live_objects(), 0, "leak when failing at step {}", failing);
        assert!(gpu.violations().is_empty(), "step {}: {:?}", failing, gpu.violations());
    }
}

#[test]
fn test_device_lost_during_setup_is_initialization_failure() {
    let ctx = MockContext::new(2);
    ctx.gpu().set_device_lost(true);

    match FrameResources::new(&ctx) {
        Err(Error::InitializationFailed(message)) => assert!(message.contains("Device lost")),
        Err(other) => panic!("unexpected error {:?}", other),
        Ok(_) => panic!("setup should fail on a lost device"),
    }
}

#[test]
fn test_destroy_waits_idle_and_is_idempotent() {
    let ctx = MockContext::new(2);
    let gpu = ctx.gpu();
    let mut frames = FrameResources::new(&ctx).unwrap();
    gpu.clear_events();

    frames.destroy(&ctx);
    frames.destroy(&ctx);

    let waits = gpu.events().iter().filter(|e| **e == MockEvent::WaitIdle).count();
    assert_eq!(waits, 1);
    assert_eq!(frames.len(), 0);
    assert_eq!(frames.object_count(), 0);
    assert!(gpu.violations().is_empty(), "{:?}", gpu.violations());
}
