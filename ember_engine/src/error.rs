//! Error types for the Ember engine
//!
//! This module defines the error types used throughout the engine,
//! covering setup, steady-state frame submission and protocol misuse.

use std::fmt;

/// Result type for Ember engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Ember engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Backend-specific error (Vulkan call failed, etc.)
    BackendError(String),

    /// Out of host or GPU memory
    OutOfMemory,

    /// Invalid resource (wrong queue for a command pool, bad image index, etc.)
    InvalidResource(String),

    /// Initialization failed (window, device, swapchain, frame resources)
    InitializationFailed(String),

    /// The logical device was lost; the render loop cannot continue
    DeviceLost,

    /// The swapchain no longer matches the surface and must be recreated
    SwapchainOutOfDate,

    /// `start_frame` / `submit_frame` called out of order
    InvalidFrameState(String),

    /// Rejected configuration value
    InvalidConfig(String),
}

impl Error {
    /// Whether the render loop can keep going after this error
    ///
    /// Only swapchain staleness is recoverable (by recreating the swapchain).
    /// Everything else aborts the loop.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::SwapchainOutOfDate)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::DeviceLost => write!(f, "Device lost"),
            Error::SwapchainOutOfDate => write!(f, "Swapchain out of date"),
            Error::InvalidFrameState(msg) => write!(f, "Invalid frame state: {}", msg),
            Error::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
