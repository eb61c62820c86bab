/// Window configuration

use crate::error::{Error, Result};

/// Largest window dimension accepted by `validate`
pub const MAX_WINDOW_DIMENSION: u32 = 16384;

/// Immutable description of the window to open
///
/// In fullscreen, a zero `width` or `height` means "use the monitor size".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    /// Window title (default "EmberEngine")
    pub title: String,
    /// Client area width in pixels (default 1280)
    pub width: u32,
    /// Client area height in pixels (default 720)
    pub height: u32,
    /// Borderless fullscreen on the current monitor (default false)
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "EmberEngine".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
        }
    }
}

impl WindowConfig {
    /// Validated windowed configuration
    pub fn windowed(title: impl Into<String>, width: u32, height: u32) -> Result<Self> {
        let config = Self {
            title: title.into(),
            width,
            height,
            fullscreen: false,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validated fullscreen configuration sized to the monitor
    pub fn fullscreen(title: impl Into<String>) -> Result<Self> {
        let config = Self {
            title: title.into(),
            width: 0,
            height: 0,
            fullscreen: true,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration can be turned into a window
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidConfig("window title must not be empty".to_string()));
        }
        if !self.fullscreen && (self.width == 0 || self.height == 0) {
            return Err(Error::InvalidConfig(format!(
                "windowed size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > MAX_WINDOW_DIMENSION || self.height > MAX_WINDOW_DIMENSION {
            return Err(Error::InvalidConfig(format!(
                "window size {}x{} exceeds {}",
                self.width, self.height, MAX_WINDOW_DIMENSION
            )));
        }
        Ok(())
    }

    /// Fullscreen with no explicit size
    pub fn uses_monitor_size(&self) -> bool {
        self.fullscreen && (self.width == 0 || self.height == 0)
    }
}

#[cfg(test)]
#[path = "window_config_tests.rs"]
mod tests;
