/// Unit tests for the Vulkan conversions (no GPU required)

use super::*;

#[test]
fn test_vk_error_mapping() {
    assert_eq!(vk_error("alloc", vk::Result::ERROR_OUT_OF_HOST_MEMORY), Error::OutOfMemory);
    assert_eq!(vk_error("alloc", vk::Result::ERROR_OUT_OF_DEVICE_MEMORY), Error::OutOfMemory);
    assert_eq!(vk_error("submit", vk::Result::ERROR_DEVICE_LOST), Error::DeviceLost);
    assert_eq!(
        vk_error("submit", vk::Result::ERROR_OUT_OF_DATE_KHR),
        Error::SwapchainOutOfDate
    );

    match vk_error("Failed to reset fence", vk::Result::ERROR_UNKNOWN) {
        Error::BackendError(message) => {
            assert!(message.starts_with("Failed to reset fence: "));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_device_lost_is_fatal() {
    assert!(!vk_error("wait", vk::Result::ERROR_DEVICE_LOST).is_recoverable());
    assert!(vk_error("present", vk::Result::ERROR_OUT_OF_DATE_KHR).is_recoverable());
}

#[test]
fn test_pipeline_stage_conversion() {
    assert_eq!(
        pipeline_stage_to_vk(PipelineStage::VERTEX_INPUT),
        vk::PipelineStageFlags::VERTEX_INPUT
    );
    assert_eq!(
        pipeline_stage_to_vk(PipelineStage::COLOR_ATTACHMENT_OUTPUT | PipelineStage::COMPUTE_SHADER),
        vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT | vk::PipelineStageFlags::COMPUTE_SHADER
    );
    assert_eq!(pipeline_stage_to_vk(PipelineStage::empty()), vk::PipelineStageFlags::empty());
    assert_eq!(
        pipeline_stage_to_vk(PipelineStage::all()),
        vk::PipelineStageFlags::TOP_OF_PIPE
            | vk::PipelineStageFlags::VERTEX_INPUT
            | vk::PipelineStageFlags::VERTEX_SHADER
            | vk::PipelineStageFlags::FRAGMENT_SHADER
            | vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
            | vk::PipelineStageFlags::COMPUTE_SHADER
            | vk::PipelineStageFlags::TRANSFER
            | vk::PipelineStageFlags::BOTTOM_OF_PIPE
    );
}

#[test]
fn test_clear_value_conversion() {
    let color = clear_value_to_vk(ClearValue::Color([0.1, 0.2, 0.3, 1.0]));
    assert_eq!(unsafe { color.color.float32 }, [0.1, 0.2, 0.3, 1.0]);

    let depth = clear_value_to_vk(ClearValue::DepthStencil { depth: 1.0, stencil: 7 });
    let depth_stencil = unsafe { depth.depth_stencil };
    assert_eq!(depth_stencil.depth, 1.0);
    assert_eq!(depth_stencil.stencil, 7);
}

#[test]
fn test_make_version() {
    let version = make_version((1, 2, 3));
    assert_eq!(vk::api_version_major(version), 1);
    assert_eq!(vk::api_version_minor(version), 2);
    assert_eq!(vk::api_version_patch(version), 3);
}
