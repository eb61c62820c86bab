/// Plain value types shared by the frame protocol and its backends

use bitflags::bitflags;

/// Queue families the engine submits to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueType {
    /// Graphics work (render passes, draws)
    Graphics,
    /// Compute dispatches
    Compute,
    /// Presentation to the surface
    Present,
    /// Transfer-only uploads
    Transfer,
}

impl QueueType {
    /// All queue types, in the order the device context resolves them
    pub const ALL: [QueueType; 4] = [
        QueueType::Graphics,
        QueueType::Compute,
        QueueType::Present,
        QueueType::Transfer,
    ];
}

/// 2D extent in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A zero-area extent (minimized window)
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Clear value for an attachment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    /// Color clear value (RGBA)
    Color([f32; 4]),
    /// Depth/stencil clear value
    DepthStencil { depth: f32, stencil: u32 },
}

bitflags! {
    /// Pipeline stages a submission waits at before consuming a semaphore
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PipelineStage: u32 {
        const TOP_OF_PIPE = 1 << 0;
        const VERTEX_INPUT = 1 << 1;
        const VERTEX_SHADER = 1 << 2;
        const FRAGMENT_SHADER = 1 << 3;
        const COLOR_ATTACHMENT_OUTPUT = 1 << 4;
        const COMPUTE_SHADER = 1 << 5;
        const TRANSFER = 1 << 6;
        const BOTTOM_OF_PIPE = 1 << 7;
    }
}

/// Swapchain health reported by acquire and present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapchainStatus {
    /// Swapchain matches the surface
    Optimal,
    /// Still presentable, but should be recreated soon
    Suboptimal,
    /// Unusable until recreated
    OutOfDate,
}

impl SwapchainStatus {
    /// Whether the swapchain should be rebuilt after this result
    pub fn needs_recreate(self) -> bool {
        !matches!(self, SwapchainStatus::Optimal)
    }
}

/// Result of a swapchain image acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// An image was acquired; the signal semaphore fires once it is ready
    Image { index: u32, suboptimal: bool },
    /// No image was acquired and the signal semaphore will not fire
    OutOfDate,
}
