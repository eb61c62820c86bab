/// RenderContext trait - the device, queues and swapchain the frame protocol drives

use std::fmt;
use std::hash::Hash;

use crate::error::Result;
use crate::renderer::{AcquireOutcome, ClearValue, Extent2D, PipelineStage, QueueType, SwapchainStatus};

/// One queue submission
///
/// Mirrors a single `VkSubmitInfo`: the command buffers run after every
/// `wait` semaphore has fired (each at its own stage), then every `signal`
/// semaphore fires, then `fence` is signaled for the CPU.
pub struct SubmitDesc<'a, C: RenderContext + ?Sized> {
    pub command_buffers: &'a [C::CommandBuffer],
    pub wait: &'a [(C::Semaphore, PipelineStage)],
    pub signal: &'a [C::Semaphore],
    pub fence: Option<C::Fence>,
}

/// GPU context consumed by the frame protocol
///
/// Bundles the logical device, its four queues and the swapchain. The value
/// is owned by the top-level application object; `FrameResources` and
/// `FrameOrchestrator` only borrow it. Handles are plain copyable ids whose
/// lifetime is managed by whoever created them.
///
/// Every method except [`recreate_swapchain`](RenderContext::recreate_swapchain)
/// takes `&self`: the protocol is single-threaded and GPU handles are
/// externally synchronized by that thread.
pub trait RenderContext {
    type CommandBuffer: Copy + Eq + Hash + fmt::Debug;
    type Semaphore: Copy + Eq + Hash + fmt::Debug;
    type Fence: Copy + Eq + Hash + fmt::Debug;
    type ImageView: Copy + Eq + Hash + fmt::Debug;
    type RenderPass: Copy + Eq + Hash + fmt::Debug;
    type Framebuffer: Copy + Eq + Hash + fmt::Debug;

    // ===== SWAPCHAIN =====

    /// Number of presentable images (`N`)
    fn image_count(&self) -> usize;

    /// Size of the presentable images
    fn extent(&self) -> Extent2D;

    /// Acquire the next presentable image, firing `signal` once it is ready
    ///
    /// Blocks without timeout until the presentation engine hands out an image.
    fn acquire_next_image(&self, signal: Self::Semaphore) -> Result<AcquireOutcome>;

    /// Queue `image_index` for presentation after `wait` fires
    fn present(&self, image_index: u32, wait: Self::Semaphore) -> Result<SwapchainStatus>;

    /// Extent a swapchain built right now would get
    ///
    /// Empty while the window is minimized; no swapchain can be created then.
    fn surface_extent(&self) -> Result<Extent2D>;

    /// Rebuild the swapchain for the current surface
    ///
    /// Callers must have destroyed every object derived from the old images
    /// (views, framebuffers), waited for the device to go idle and checked
    /// that [`surface_extent`](RenderContext::surface_extent) is not empty.
    fn recreate_swapchain(&mut self) -> Result<()>;

    // ===== OBJECT CREATION =====

    fn create_semaphore(&self) -> Result<Self::Semaphore>;

    /// Create a fence, optionally already signaled
    fn create_fence(&self, signaled: bool) -> Result<Self::Fence>;

    /// Allocate a primary command buffer from the pool of `queue`
    fn allocate_command_buffer(&self, queue: QueueType) -> Result<Self::CommandBuffer>;

    /// Create a color view of swapchain image `image_index`
    fn create_image_view(&self, image_index: usize) -> Result<Self::ImageView>;

    /// Create a single-subpass render pass targeting the swapchain format
    fn create_render_pass(&self) -> Result<Self::RenderPass>;

    /// Create a framebuffer over `view`, sized to the swapchain extent
    fn create_framebuffer(
        &self,
        render_pass: Self::RenderPass,
        view: Self::ImageView,
    ) -> Result<Self::Framebuffer>;

    // ===== OBJECT DESTRUCTION =====

    fn destroy_semaphore(&self, semaphore: Self::Semaphore);
    fn destroy_fence(&self, fence: Self::Fence);
    fn free_command_buffer(&self, queue: QueueType, command_buffer: Self::CommandBuffer);
    fn destroy_image_view(&self, view: Self::ImageView);
    fn destroy_render_pass(&self, render_pass: Self::RenderPass);
    fn destroy_framebuffer(&self, framebuffer: Self::Framebuffer);

    // ===== SYNCHRONIZATION =====

    /// Block the calling thread until `fence` is signaled (no timeout)
    fn wait_for_fence(&self, fence: Self::Fence) -> Result<()>;

    /// Return `fence` to the unsignaled state
    fn reset_fence(&self, fence: Self::Fence) -> Result<()>;

    /// Block until every queue is idle
    fn wait_idle(&self) -> Result<()>;

    // ===== RECORDING =====

    fn reset_command_buffer(&self, command_buffer: Self::CommandBuffer) -> Result<()>;
    fn begin_command_buffer(&self, command_buffer: Self::CommandBuffer) -> Result<()>;
    fn end_command_buffer(&self, command_buffer: Self::CommandBuffer) -> Result<()>;

    /// Begin `render_pass` on `framebuffer` with inline subpass contents
    fn cmd_begin_render_pass(
        &self,
        command_buffer: Self::CommandBuffer,
        render_pass: Self::RenderPass,
        framebuffer: Self::Framebuffer,
        clear_values: &[ClearValue],
    ) -> Result<()>;

    fn cmd_end_render_pass(&self, command_buffer: Self::CommandBuffer) -> Result<()>;

    // ===== SUBMISSION =====

    /// Submit work to `queue`
    fn submit(&self, queue: QueueType, desc: &SubmitDesc<'_, Self>) -> Result<()>;
}
