/// Frame Orchestrator - the per-frame acquire / record / submit / present protocol

use std::fmt;

use crate::error::{Error, Result};
use crate::renderer::{
    AcquireOutcome, ClearValue, FrameResources, FrameSlot, PipelineStage, QueueType,
    RenderContext, SubmitDesc, SwapchainStatus,
};
use crate::{engine_error, engine_trace};

/// Where the orchestrator is within the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// No frame open; `start_frame` may be called
    Idle,
    /// Blocked on the fences of the slot about to be reused
    WaitingOnFences,
    /// Waiting for the presentation engine to hand out an image
    Acquiring,
    /// Command buffers are open for the caller
    Recording,
    SubmittedCompute,
    SubmittedGraphics,
    Presenting,
    /// A GPU call failed mid-frame; see [`FrameOrchestrator::failure`]
    Failed,
}

/// The error that stopped the frame loop and the step it happened in
///
/// Once a frame has failed, the slot's fences may have been reset with no
/// submission left to signal them, so the slot cannot be reused until the
/// frame resources are rebuilt.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameFailure {
    pub state: FrameState,
    pub frame_index: usize,
    pub error: Error,
}

impl fmt::Display for FrameFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {} failed while {:?}: {}",
            self.frame_index, self.state, self.error
        )
    }
}

/// Drives `start_frame` / `submit_frame` over borrowed frame resources
///
/// The orchestrator never creates or destroys GPU objects. It only holds the
/// two indices of the protocol: `frame_index` picks the slot whose sync
/// objects are used, `current_image_index` the swapchain image that was
/// acquired for this frame.
#[derive(Debug)]
pub struct FrameOrchestrator {
    frame_index: usize,
    current_image_index: u32,
    state: FrameState,
    clear_color: [f32; 4],
    acquired_suboptimal: bool,
    failure: Option<FrameFailure>,
}

impl FrameOrchestrator {
    pub fn new(clear_color: [f32; 4]) -> Self {
        Self {
            frame_index: 0,
            current_image_index: 0,
            state: FrameState::Idle,
            clear_color,
            acquired_suboptimal: false,
            failure: None,
        }
    }

    /// Slot whose synchronization objects the next (or current) frame uses
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Swapchain image acquired by the last successful `start_frame`
    pub fn current_image_index(&self) -> u32 {
        self.current_image_index
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Whether command buffers are currently open for recording
    pub fn is_recording(&self) -> bool {
        self.state == FrameState::Recording
    }

    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn set_clear_color(&mut self, clear_color: [f32; 4]) {
        self.clear_color = clear_color;
    }

    /// Failure that put the orchestrator in `FrameState::Failed`, if any
    pub fn failure(&self) -> Option<&FrameFailure> {
        self.failure.as_ref()
    }

    /// Forget all progress, used after the frame resources were rebuilt
    ///
    /// Also clears a recorded failure: the rebuilt slots carry fresh fences.
    pub fn reset(&mut self) {
        self.frame_index = 0;
        self.current_image_index = 0;
        self.state = FrameState::Idle;
        self.acquired_suboptimal = false;
        self.failure = None;
    }

    fn stored_failure(&self) -> Result<()> {
        match &self.failure {
            Some(failure) => Err(failure.error.clone()),
            None => Ok(()),
        }
    }

    /// Enter `FrameState::Failed`, remembering where `error` happened
    fn fail(&mut self, call: &str, error: &Error) {
        let failure = FrameFailure {
            state: self.state,
            frame_index: self.frame_index,
            error: error.clone(),
        };
        engine_error!("ember::FrameOrchestrator", "{} failed: {}", call, failure);
        self.failure = Some(failure);
        self.state = FrameState::Failed;
    }

    /// Open a frame
    ///
    /// Waits for (then resets) the graphics and compute fences of the slot at
    /// `frame_index`, acquires the next image, resets and begins both command
    /// buffers and begins the render pass on the acquired image's framebuffer.
    ///
    /// Returns `AcquireOutcome::OutOfDate` when the swapchain could not hand
    /// out an image. No frame is open afterwards and the slot's fences are
    /// left unsignaled, so the frame resources must be rebuilt before the
    /// next call.
    ///
    /// Any failure is terminal: the orchestrator enters `FrameState::Failed`
    /// and every later call returns the same error without touching the GPU,
    /// until [`reset`](Self::reset).
    pub fn start_frame<C: RenderContext>(
        &mut self,
        ctx: &C,
        frames: &FrameResources<C>,
    ) -> Result<AcquireOutcome> {
        self.stored_failure()?;
        if self.state != FrameState::Idle {
            return Err(Error::InvalidFrameState(format!(
                "start_frame called while the previous frame is {:?}",
                self.state
            )));
        }
        let slot = frames.slot(self.frame_index).ok_or_else(|| {
            Error::InvalidFrameState(format!(
                "no frame slot {} ({} slots available)",
                self.frame_index,
                frames.len()
            ))
        })?;

        let result = self.open_frame(ctx, frames, slot);
        match &result {
            Ok(AcquireOutcome::Image { .. }) => self.state = FrameState::Recording,
            Ok(AcquireOutcome::OutOfDate) => self.state = FrameState::Idle,
            Err(err) => self.fail("start_frame", err),
        }
        result
    }

    fn open_frame<C: RenderContext>(
        &mut self,
        ctx: &C,
        frames: &FrameResources<C>,
        slot: &FrameSlot<C>,
    ) -> Result<AcquireOutcome> {
        self.state = FrameState::WaitingOnFences;
        ctx.wait_for_fence(slot.graphics_fence)?;
        ctx.reset_fence(slot.graphics_fence)?;
        ctx.wait_for_fence(slot.compute_fence)?;
        ctx.reset_fence(slot.compute_fence)?;

        self.state = FrameState::Acquiring;
        let (image_index, suboptimal) = match ctx.acquire_next_image(slot.image_available)? {
            AcquireOutcome::Image { index, suboptimal } => (index, suboptimal),
            AcquireOutcome::OutOfDate => return Ok(AcquireOutcome::OutOfDate),
        };
        let target = frames.slot(image_index as usize).ok_or_else(|| {
            Error::BackendError(format!(
                "acquired image {} but only {} framebuffers exist",
                image_index,
                frames.len()
            ))
        })?;
        self.current_image_index = image_index;
        self.acquired_suboptimal = suboptimal;

        ctx.reset_command_buffer(slot.graphics_command_buffer)?;
        ctx.reset_command_buffer(slot.compute_command_buffer)?;

        ctx.begin_command_buffer(slot.graphics_command_buffer)?;
        ctx.cmd_begin_render_pass(
            slot.graphics_command_buffer,
            target.render_pass,
            target.framebuffer,
            &[ClearValue::Color(self.clear_color)],
        )?;
        ctx.begin_command_buffer(slot.compute_command_buffer)?;

        engine_trace!(
            "ember::FrameOrchestrator",
            "Frame {} recording into image {}",
            self.frame_index,
            image_index
        );
        Ok(AcquireOutcome::Image { index: image_index, suboptimal })
    }

    /// Close, submit and present the open frame
    ///
    /// Compute is submitted first and signals `compute_finished`; graphics
    /// waits on it at vertex input and on `image_available` at color
    /// attachment output, then signals `render_finished` which present waits
    /// on. `frame_index` advances once present has been issued, whatever the
    /// swapchain status. A failed call is terminal as in `start_frame`.
    ///
    /// The returned status is `Suboptimal` when either acquire or present
    /// reported it, so the caller knows to rebuild the swapchain.
    pub fn submit_frame<C: RenderContext>(
        &mut self,
        ctx: &C,
        frames: &FrameResources<C>,
    ) -> Result<SwapchainStatus> {
        self.stored_failure()?;
        if self.state != FrameState::Recording {
            return Err(Error::InvalidFrameState(format!(
                "submit_frame called without an open frame (state {:?})",
                self.state
            )));
        }
        let slot = frames.slot(self.frame_index).ok_or_else(|| {
            Error::InvalidFrameState(format!(
                "no frame slot {} ({} slots available)",
                self.frame_index,
                frames.len()
            ))
        })?;

        if let Err(err) = self.submit_work(ctx, slot) {
            self.fail("submit_frame", &err);
            return Err(err);
        }

        self.state = FrameState::Presenting;
        let status = match ctx.present(self.current_image_index, slot.render_finished) {
            Ok(status) => status,
            Err(err) => {
                // render_finished may stay signaled with nobody waiting on it
                self.fail("present", &err);
                return Err(err);
            }
        };
        self.frame_index = (self.frame_index + 1) % frames.len();
        self.state = FrameState::Idle;

        if status == SwapchainStatus::Optimal && self.acquired_suboptimal {
            Ok(SwapchainStatus::Suboptimal)
        } else {
            Ok(status)
        }
    }

    fn submit_work<C: RenderContext>(&mut self, ctx: &C, slot: &FrameSlot<C>) -> Result<()> {
        ctx.end_command_buffer(slot.compute_command_buffer)?;
        ctx.cmd_end_render_pass(slot.graphics_command_buffer)?;
        ctx.end_command_buffer(slot.graphics_command_buffer)?;

        ctx.submit(
            QueueType::Compute,
            &SubmitDesc {
                command_buffers: &[slot.compute_command_buffer],
                wait: &[],
                signal: &[slot.compute_finished],
                fence: Some(slot.compute_fence),
            },
        )?;
        self.state = FrameState::SubmittedCompute;

        ctx.submit(
            QueueType::Graphics,
            &SubmitDesc {
                command_buffers: &[slot.graphics_command_buffer],
                wait: &[
                    (slot.compute_finished, PipelineStage::VERTEX_INPUT),
                    (slot.image_available, PipelineStage::COLOR_ATTACHMENT_OUTPUT),
                ],
                signal: &[slot.render_finished],
                fence: Some(slot.graphics_fence),
            },
        )?;
        self.state = FrameState::SubmittedGraphics;

        Ok(())
    }
}

impl Default for FrameOrchestrator {
    fn default() -> Self {
        Self::new([0.0, 0.0, 0.0, 1.0])
    }
}

#[cfg(test)]
#[path = "frame_orchestrator_tests.rs"]
mod tests;
