/// Renderer module - frame protocol types and traits

// Module declarations
pub mod types;
pub mod config;
pub mod render_context;
pub mod frame_resources;
pub mod frame_orchestrator;
pub mod renderer;
pub mod mock_context;

// Re-export everything from renderer.rs
pub use renderer::*;

// Re-export from other modules
pub use types::*;
pub use config::*;
pub use render_context::*;
pub use frame_resources::*;
pub use frame_orchestrator::*;
