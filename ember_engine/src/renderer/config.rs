/// Renderer configuration

/// Validation layer verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugSeverity {
    ErrorsOnly,
    ErrorsAndWarnings,
    All,
}

/// Validation message counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub errors: u32,
    pub warnings: u32,
    pub info: u32,
    pub verbose: u32,
}

impl ValidationStats {
    pub fn total(&self) -> u32 {
        self.errors + self.warnings + self.info + self.verbose
    }
}

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Enable validation/debug layers (needs the `vulkan-validation` backend feature)
    pub enable_validation: bool,
    /// Verbosity of forwarded validation messages
    pub debug_severity: DebugSeverity,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
    /// Minimum device API version (major, minor)
    pub min_api_version: (u32, u32),
    /// Refuse devices without a transfer-only queue family
    pub require_dedicated_transfer_queue: bool,
    /// Background color the frame render pass clears to
    pub clear_color: [f32; 4],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            debug_severity: DebugSeverity::ErrorsAndWarnings,
            app_name: "Ember Application".to_string(),
            app_version: (1, 0, 0),
            min_api_version: (1, 1),
            require_dedicated_transfer_queue: true,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}
