//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone, std::error::Error).

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("vkQueueSubmit failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("vkQueueSubmit failed"));
}

#[test]
fn test_out_of_memory_display() {
    assert_eq!(format!("{}", Error::OutOfMemory), "Out of memory");
}

#[test]
fn test_initialization_failed_display() {
    let err = Error::InitializationFailed("Window creation failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Initialization failed"));
    assert!(display.contains("Window creation failed"));
}

#[test]
fn test_steady_state_variants_display() {
    assert_eq!(format!("{}", Error::DeviceLost), "Device lost");
    assert_eq!(format!("{}", Error::SwapchainOutOfDate), "Swapchain out of date");

    let err = Error::InvalidFrameState("submit_frame without start_frame".to_string());
    assert!(format!("{}", err).contains("submit_frame without start_frame"));
}

#[test]
fn test_invalid_config_display() {
    let err = Error::InvalidConfig("width must be non-zero".to_string());
    assert_eq!(format!("{}", err), "Invalid configuration: width must be non-zero");
}

// ============================================================================
// ERROR CLASSIFICATION
// ============================================================================

#[test]
fn test_only_out_of_date_is_recoverable() {
    assert!(Error::SwapchainOutOfDate.is_recoverable());

    assert!(!Error::DeviceLost.is_recoverable());
    assert!(!Error::OutOfMemory.is_recoverable());
    assert!(!Error::BackendError("x".to_string()).is_recoverable());
    assert!(!Error::InitializationFailed("x".to_string()).is_recoverable());
    assert!(!Error::InvalidFrameState("x".to_string()).is_recoverable());
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::OutOfMemory;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_debug() {
    let debug = format!("{:?}", Error::BackendError("test".to_string()));
    assert!(debug.contains("BackendError"));

    let debug = format!("{:?}", Error::DeviceLost);
    assert!(debug.contains("DeviceLost"));
}

#[test]
fn test_error_clone_and_eq() {
    let err1 = Error::InvalidResource("queue".to_string());
    let err2 = err1.clone();
    assert_eq!(err1, err2);
    assert_ne!(err1, Error::OutOfMemory);
}

#[test]
fn test_result_propagation() {
    fn fails() -> Result<u32> {
        Err(Error::DeviceLost)
    }

    fn propagates() -> Result<u32> {
        let value = fails()?;
        Ok(value + 1)
    }

    assert_eq!(propagates(), Err(Error::DeviceLost));
}
