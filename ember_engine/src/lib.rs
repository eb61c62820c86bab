/*!
# Ember Engine

Backend-agnostic core of the Ember frame orchestration engine.

The crate drives the per-frame GPU protocol: wait on the fences of the slot
about to be reused, acquire a swapchain image, hand open compute and graphics
command buffers to the caller, then submit compute, submit graphics behind
both semaphores and present. Backends (Vulkan) implement the `RenderContext`
trait; `MockContext` implements it in memory for tests.

## Architecture

- **RenderContext**: device, queues and swapchain the protocol runs on
- **FrameResources**: per-frame-in-flight command buffers, semaphores, fences
- **FrameOrchestrator**: the `start_frame` / `submit_frame` state machine
- **Renderer**: owner of the three above, with swapchain recreation
- **Engine**: process-wide logging facility
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod renderer;
pub mod shader;
pub mod window_config;

// Main ember namespace module
pub mod ember {
    // Error types
    pub use crate::error::{Error, Result};

    // Logging facility
    pub use crate::engine::Engine;

    // Owner of the frame protocol
    pub use crate::renderer::{Renderer, FrameStatus};

    // Window configuration
    pub use crate::window_config::WindowConfig;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Render sub-module with all frame protocol types
    pub mod render {
        pub use crate::renderer::*;
    }

    // Shader sub-module
    pub mod shader {
        pub use crate::shader::*;
    }
}
