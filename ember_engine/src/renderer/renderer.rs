/// Renderer - owner of the render context, the frame resources and the orchestrator

use crate::error::{Error, Result};
use crate::renderer::{
    AcquireOutcome, Config, FrameFailure, FrameOrchestrator, FrameResources, RenderContext,
    SwapchainStatus,
};
use crate::{engine_debug, engine_error, engine_info, engine_warn};

/// What `start_frame` produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// A frame is open: record into the command buffers, then call `submit_frame`
    Ready,
    /// The swapchain was out of date, or cannot be rebuilt while the surface
    /// has no area; no frame is open and `submit_frame` must not be called
    /// this iteration
    Skipped,
}

/// Top-level renderer
///
/// Exclusively owns the `RenderContext` and lends it to the frame resources
/// and the orchestrator for each call. Frame resources are released before
/// the context, on `destroy()` or on drop.
///
/// # Example
///
/// ```no_run
/// use ember_engine::ember::render::{Config, FrameStatus, Renderer};
/// use ember_engine::ember::render::mock_context::MockContext;
///
/// let mut renderer = Renderer::new(MockContext::new(3), &Config::default())?;
/// for _ in 0..10 {
///     if renderer.start_frame()? == FrameStatus::Ready {
///         // record into renderer.graphics_command_buffer() ...
///         renderer.submit_frame()?;
///     }
/// }
/// # Ok::<(), ember_engine::ember::Error>(())
/// ```
pub struct Renderer<C: RenderContext> {
    frames: FrameResources<C>,
    orchestrator: FrameOrchestrator,
    context: C,
    // Frame resources no longer match a usable swapchain
    swapchain_stale: bool,
    destroyed: bool,
}

impl<C: RenderContext> Renderer<C> {
    /// Create the frame resources for `context` and take ownership of it
    pub fn new(context: C, config: &Config) -> Result<Self> {
        let frames = FrameResources::new(&context).map_err(|err| {
            engine_error!("ember::Renderer", "Failed to create frame resources: {}", err);
            err
        })?;

        engine_info!(
            "ember::Renderer",
            "Renderer ready with {} frames in flight ({}x{})",
            frames.len(),
            context.extent().width,
            context.extent().height
        );

        Ok(Self {
            frames,
            orchestrator: FrameOrchestrator::new(config.clear_color),
            context,
            swapchain_stale: false,
            destroyed: false,
        })
    }

    /// Open the next frame
    ///
    /// Blocks until the slot at `frame_index` is free again. An out-of-date
    /// swapchain is rebuilt on the spot and reported as `FrameStatus::Skipped`.
    /// While the surface has no area (minimized window) the rebuild is
    /// deferred and every call returns `Skipped` without touching the GPU.
    ///
    /// After a failed frame every call returns that frame's error; see
    /// [`failure`](Self::failure).
    pub fn start_frame(&mut self) -> Result<FrameStatus> {
        self.ensure_alive()?;
        if let Some(failure) = self.orchestrator.failure() {
            return Err(failure.error.clone());
        }

        if self.swapchain_stale {
            self.recreate_swapchain()?;
            if self.swapchain_stale {
                return Ok(FrameStatus::Skipped);
            }
        }

        match self.orchestrator.start_frame(&self.context, &self.frames)? {
            AcquireOutcome::Image { .. } => Ok(FrameStatus::Ready),
            AcquireOutcome::OutOfDate => {
                engine_warn!("ember::Renderer", "Swapchain out of date on acquire, skipping frame");
                self.recreate_swapchain()?;
                Ok(FrameStatus::Skipped)
            }
        }
    }

    /// Submit and present the open frame
    ///
    /// When acquire or present reported a suboptimal or out-of-date
    /// swapchain, it is rebuilt after the present.
    pub fn submit_frame(&mut self) -> Result<SwapchainStatus> {
        self.ensure_alive()?;

        let status = self.orchestrator.submit_frame(&self.context, &self.frames)?;
        if status.needs_recreate() {
            engine_debug!("ember::Renderer", "Swapchain reported {:?} on present", status);
            self.recreate_swapchain()?;
        }
        Ok(status)
    }

    /// Rebuild the swapchain and every frame slot derived from it
    ///
    /// Waits for the device to go idle, releases the frame resources,
    /// recreates the swapchain, creates frame resources for the new image
    /// count and restarts at `frame_index` 0. This also recovers from a
    /// recorded frame failure when the device itself is still usable.
    ///
    /// When the surface has no area the current resources are kept and the
    /// rebuild is retried by the next `start_frame`.
    pub fn recreate_swapchain(&mut self) -> Result<()> {
        self.ensure_alive()?;
        if self.orchestrator.is_recording() {
            return Err(Error::InvalidFrameState(
                "cannot recreate the swapchain while a frame is open".to_string(),
            ));
        }

        let surface = self.context.surface_extent().map_err(|err| {
            engine_error!("ember::Renderer", "Failed to query the surface extent: {}", err);
            err
        })?;
        if surface.is_empty() {
            if !self.swapchain_stale {
                engine_info!("ember::Renderer", "Surface has no area, deferring swapchain recreation");
            }
            self.swapchain_stale = true;
            return Ok(());
        }

        // Stays set if anything below fails, so the next start_frame retries
        self.swapchain_stale = true;
        self.frames.destroy(&self.context);
        self.context.recreate_swapchain().map_err(|err| {
            engine_error!("ember::Renderer", "Failed to recreate swapchain: {}", err);
            err
        })?;
        self.frames = FrameResources::new(&self.context).map_err(|err| {
            engine_error!("ember::Renderer", "Failed to rebuild frame resources: {}", err);
            err
        })?;
        self.orchestrator.reset();
        self.swapchain_stale = false;

        engine_info!(
            "ember::Renderer",
            "Swapchain recreated with {} images ({}x{})",
            self.frames.len(),
            self.context.extent().width,
            self.context.extent().height
        );
        Ok(())
    }

    fn ensure_alive(&self) -> Result<()> {
        if self.destroyed {
            Err(Error::InvalidFrameState("renderer has been destroyed".to_string()))
        } else {
            Ok(())
        }
    }

    /// Graphics command buffer of the open frame, with the render pass begun
    pub fn graphics_command_buffer(&self) -> Option<C::CommandBuffer> {
        self.open_slot().map(|slot| slot.graphics_command_buffer)
    }

    /// Compute command buffer of the open frame
    pub fn compute_command_buffer(&self) -> Option<C::CommandBuffer> {
        self.open_slot().map(|slot| slot.compute_command_buffer)
    }

    /// Framebuffer of the image acquired for the open frame
    pub fn current_framebuffer(&self) -> Option<C::Framebuffer> {
        self.open_image().map(|slot| slot.framebuffer)
    }

    /// Render pass of the image acquired for the open frame
    ///
    /// Pipelines bound inside the frame must be compatible with it.
    pub fn current_render_pass(&self) -> Option<C::RenderPass> {
        self.open_image().map(|slot| slot.render_pass)
    }

    fn open_slot(&self) -> Option<&crate::renderer::FrameSlot<C>> {
        if self.orchestrator.is_recording() {
            self.frames.slot(self.orchestrator.frame_index())
        } else {
            None
        }
    }

    fn open_image(&self) -> Option<&crate::renderer::FrameSlot<C>> {
        if self.orchestrator.is_recording() {
            self.frames.slot(self.orchestrator.current_image_index() as usize)
        } else {
            None
        }
    }

    pub fn frame_index(&self) -> usize {
        self.orchestrator.frame_index()
    }

    pub fn current_image_index(&self) -> u32 {
        self.orchestrator.current_image_index()
    }

    /// Number of frames in flight (`N`)
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_recording(&self) -> bool {
        self.orchestrator.is_recording()
    }

    /// Error that stopped the frame loop, and the step it happened in
    pub fn failure(&self) -> Option<&FrameFailure> {
        self.orchestrator.failure()
    }

    /// Whether a swapchain rebuild is waiting for the surface to regain area
    pub fn is_swapchain_stale(&self) -> bool {
        self.swapchain_stale
    }

    pub fn frames(&self) -> &FrameResources<C> {
        &self.frames
    }

    pub fn set_clear_color(&mut self, clear_color: [f32; 4]) {
        self.orchestrator.set_clear_color(clear_color);
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// Mutable access to the context
    ///
    /// The swapchain must only be rebuilt through `Renderer::recreate_swapchain`.
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Wait for the device to go idle and release the frame resources
    ///
    /// Safe to call more than once; later calls do nothing. The renderer
    /// refuses new frames afterwards.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.frames.destroy(&self.context);
        self.orchestrator.reset();
        engine_info!("ember::Renderer", "Renderer destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl<C: RenderContext> Drop for Renderer<C> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
