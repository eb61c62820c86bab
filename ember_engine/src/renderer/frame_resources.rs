/// Frame Resources - per-frame-in-flight command buffers and sync objects

use crate::error::{Error, Result};
use crate::renderer::{QueueType, RenderContext};
use crate::{engine_debug, engine_warn};

/// The GPU objects owned by one frame in flight
///
/// Slot `i` also carries the image view, render pass and framebuffer of
/// swapchain image `i`. The synchronization objects are picked by
/// `frame_index`, the framebuffer by the acquired image index, and the two
/// do not have to match.
pub struct FrameSlot<C: RenderContext> {
    pub graphics_command_buffer: C::CommandBuffer,
    pub compute_command_buffer: C::CommandBuffer,
    /// Fired by the presentation engine once the acquired image is ready
    pub image_available: C::Semaphore,
    /// Fired by the graphics submission, consumed by present
    pub render_finished: C::Semaphore,
    /// Fired by the compute submission, consumed by the graphics submission
    pub compute_finished: C::Semaphore,
    pub graphics_fence: C::Fence,
    pub compute_fence: C::Fence,
    pub render_pass: C::RenderPass,
    pub framebuffer: C::Framebuffer,
    pub image_view: C::ImageView,
}

/// Every object created by `FrameResources`, in creation order
enum GpuObject<C: RenderContext> {
    ImageView(C::ImageView),
    RenderPass(C::RenderPass),
    Framebuffer(C::Framebuffer),
    CommandBuffer(QueueType, C::CommandBuffer),
    Semaphore(C::Semaphore),
    Fence(C::Fence),
}

/// Frame slots sized to the swapchain image count
///
/// Objects are released in strict reverse-creation order after a device
/// idle-wait, both on teardown and when setup fails halfway.
pub struct FrameResources<C: RenderContext> {
    slots: Vec<FrameSlot<C>>,
    created: Vec<GpuObject<C>>,
}

impl<C: RenderContext> FrameResources<C> {
    /// Create one slot per swapchain image
    ///
    /// On failure everything created so far is destroyed before the error
    /// is returned. Exhaustion is reported as `Error::OutOfMemory`, anything
    /// else as `Error::InitializationFailed`.
    pub fn new(ctx: &C) -> Result<Self> {
        let count = ctx.image_count();
        if count == 0 {
            return Err(Error::InitializationFailed(
                "swapchain reports zero presentable images".to_string(),
            ));
        }

        let mut resources = Self {
            slots: Vec::with_capacity(count),
            created: Vec::new(),
        };

        match resources.create_slots(ctx, count) {
            Ok(slots) => {
                resources.slots = slots;
                engine_debug!(
                    "ember::FrameResources",
                    "Created {} frame slots ({} GPU objects)",
                    count,
                    resources.created.len()
                );
                Ok(resources)
            }
            Err(err) => {
                engine_warn!(
                    "ember::FrameResources",
                    "Frame resource setup failed after {} objects, rolling back: {}",
                    resources.created.len(),
                    err
                );
                resources.destroy(ctx);
                Err(match err {
                    Error::OutOfMemory => Error::OutOfMemory,
                    other => Error::InitializationFailed(format!(
                        "Failed to create frame resources: {}",
                        other
                    )),
                })
            }
        }
    }

    fn create_slots(&mut self, ctx: &C, count: usize) -> Result<Vec<FrameSlot<C>>> {
        let mut views = Vec::with_capacity(count);
        for image in 0..count {
            let view = ctx.create_image_view(image)?;
            self.created.push(GpuObject::ImageView(view));
            views.push(view);
        }

        let mut render_passes = Vec::with_capacity(count);
        for _ in 0..count {
            let render_pass = ctx.create_render_pass()?;
            self.created.push(GpuObject::RenderPass(render_pass));
            render_passes.push(render_pass);
        }

        let mut framebuffers = Vec::with_capacity(count);
        for (render_pass, view) in render_passes.iter().zip(&views) {
            let framebuffer = ctx.create_framebuffer(*render_pass, *view)?;
            self.created.push(GpuObject::Framebuffer(framebuffer));
            framebuffers.push(framebuffer);
        }

        let graphics_buffers = self.allocate_command_buffers(ctx, QueueType::Graphics, count)?;
        let compute_buffers = self.allocate_command_buffers(ctx, QueueType::Compute, count)?;

        let mut slots = Vec::with_capacity(count);
        for i in 0..count {
            let render_finished = self.semaphore(ctx)?;
            let image_available = self.semaphore(ctx)?;
            let graphics_fence = self.signaled_fence(ctx)?;
            let compute_finished = self.semaphore(ctx)?;
            let compute_fence = self.signaled_fence(ctx)?;

            slots.push(FrameSlot {
                graphics_command_buffer: graphics_buffers[i],
                compute_command_buffer: compute_buffers[i],
                image_available,
                render_finished,
                compute_finished,
                graphics_fence,
                compute_fence,
                render_pass: render_passes[i],
                framebuffer: framebuffers[i],
                image_view: views[i],
            });
        }

        Ok(slots)
    }

    fn allocate_command_buffers(
        &mut self,
        ctx: &C,
        queue: QueueType,
        count: usize,
    ) -> Result<Vec<C::CommandBuffer>> {
        let mut buffers = Vec::with_capacity(count);
        for _ in 0..count {
            let command_buffer = ctx.allocate_command_buffer(queue)?;
            self.created.push(GpuObject::CommandBuffer(queue, command_buffer));
            buffers.push(command_buffer);
        }
        Ok(buffers)
    }

    fn semaphore(&mut self, ctx: &C) -> Result<C::Semaphore> {
        let semaphore = ctx.create_semaphore()?;
        self.created.push(GpuObject::Semaphore(semaphore));
        Ok(semaphore)
    }

    // Signaled so the first wait on every slot returns at once
    fn signaled_fence(&mut self, ctx: &C) -> Result<C::Fence> {
        let fence = ctx.create_fence(true)?;
        self.created.push(GpuObject::Fence(fence));
        Ok(fence)
    }

    /// Wait for the device to go idle, then release every object in reverse
    ///
    /// Calling it again, or on resources whose setup already rolled back, is a no-op.
    pub fn destroy(&mut self, ctx: &C) {
        self.slots.clear();
        if self.created.is_empty() {
            return;
        }

        if let Err(err) = ctx.wait_idle() {
            engine_warn!(
                "ember::FrameResources",
                "wait_idle failed before releasing frame resources: {}",
                err
            );
        }

        let released = self.created.len();
        while let Some(object) = self.created.pop() {
            match object {
                GpuObject::Fence(fence) => ctx.destroy_fence(fence),
                GpuObject::Semaphore(semaphore) => ctx.destroy_semaphore(semaphore),
                GpuObject::CommandBuffer(queue, command_buffer) => {
                    ctx.free_command_buffer(queue, command_buffer)
                }
                GpuObject::Framebuffer(framebuffer) => ctx.destroy_framebuffer(framebuffer),
                GpuObject::RenderPass(render_pass) => ctx.destroy_render_pass(render_pass),
                GpuObject::ImageView(view) => ctx.destroy_image_view(view),
            }
        }

        engine_debug!("ember::FrameResources", "Released {} GPU objects", released);
    }

    /// Number of frame slots (`N`)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Option<&FrameSlot<C>> {
        self.slots.get(index)
    }

    pub fn slots(&self) -> &[FrameSlot<C>] {
        &self.slots
    }

    /// Number of live GPU objects owned by these resources
    pub fn object_count(&self) -> usize {
        self.created.len()
    }
}

impl<C: RenderContext> Drop for FrameResources<C> {
    fn drop(&mut self) {
        if !self.created.is_empty() {
            engine_warn!(
                "ember::FrameResources",
                "{} GPU objects dropped without destroy(), they are leaked",
                self.created.len()
            );
        }
    }
}

#[cfg(test)]
#[path = "frame_resources_tests.rs"]
mod tests;
