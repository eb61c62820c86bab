/// Mock render context (no GPU required)
///
/// Implements `RenderContext` over slotmap handles and checks every call
/// against the Vulkan synchronization rules the frame protocol relies on.
/// Rule violations never panic: they are recorded and can be inspected
/// through a [`MockGpu`] handle, which stays usable after the context itself
/// has been moved into a `Renderer` and can be sent to another thread to
/// complete GPU work with a delay.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rustc_hash::FxHashSet;
use slotmap::{new_key_type, SlotMap};

use crate::{engine_error, engine_warn};
use crate::error::{Error, Result};
use crate::renderer::{
    AcquireOutcome, ClearValue, Extent2D, PipelineStage, QueueType, RenderContext, SubmitDesc,
    SwapchainStatus,
};

new_key_type! {
    pub struct MockCommandBuffer;
    pub struct MockSemaphore;
    pub struct MockFence;
    pub struct MockImageView;
    pub struct MockRenderPass;
    pub struct MockFramebuffer;
}

/// When submitted work completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMode {
    /// Every submission completes before `submit` returns
    Immediate,
    /// Submissions stay pending until completed through `MockGpu`
    Manual,
}

/// One observable call on the mock, in call order
#[derive(Debug, Clone, PartialEq)]
pub enum MockEvent {
    WaitFence(MockFence),
    ResetFence(MockFence),
    Acquire { image: u32, signal: MockSemaphore },
    AcquireOutOfDate,
    ResetCommandBuffer(MockCommandBuffer),
    BeginCommandBuffer(MockCommandBuffer),
    EndCommandBuffer(MockCommandBuffer),
    BeginRenderPass {
        command_buffer: MockCommandBuffer,
        render_pass: MockRenderPass,
        framebuffer: MockFramebuffer,
        clear_values: Vec<ClearValue>,
    },
    EndRenderPass(MockCommandBuffer),
    Submit {
        queue: QueueType,
        command_buffers: Vec<MockCommandBuffer>,
        waits: Vec<(MockSemaphore, PipelineStage)>,
        signals: Vec<MockSemaphore>,
        fence: Option<MockFence>,
    },
    Complete { queue: QueueType, fence: Option<MockFence> },
    Present { image: u32, wait: MockSemaphore },
    WaitIdle,
    RecreateSwapchain { image_count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandBufferState {
    Initial,
    Recording,
    Executable,
    Pending,
}

struct CommandBufferRecord {
    queue: QueueType,
    state: CommandBufferState,
    in_render_pass: bool,
}

struct SemaphoreRecord {
    signal_pending: bool,
    // Submission that will fire it; `None` for the presentation engine
    signaler: Option<u64>,
}

struct FenceRecord {
    signaled: bool,
    in_flight: bool,
}

struct FramebufferRecord {
    render_pass: MockRenderPass,
}

struct Submission {
    id: u64,
    queue: QueueType,
    command_buffers: Vec<MockCommandBuffer>,
    depends_on: Vec<u64>,
    fence: Option<MockFence>,
}

fn queue_slot(queue: QueueType) -> usize {
    match queue {
        QueueType::Graphics => 0,
        QueueType::Compute => 1,
        QueueType::Present => 2,
        QueueType::Transfer => 3,
    }
}

struct MockState {
    mode: CompletionMode,
    image_count: usize,
    extent: Extent2D,
    surface_extent: Extent2D,
    next_image: u32,
    held_images: FxHashSet<u32>,

    command_buffers: SlotMap<MockCommandBuffer, CommandBufferRecord>,
    semaphores: SlotMap<MockSemaphore, SemaphoreRecord>,
    fences: SlotMap<MockFence, FenceRecord>,
    image_views: SlotMap<MockImageView, usize>,
    render_passes: SlotMap<MockRenderPass, ()>,
    framebuffers: SlotMap<MockFramebuffer, FramebufferRecord>,

    pending: VecDeque<Submission>,
    next_submission: u64,
    last_on_queue: [Option<u64>; 4],
    in_flight: [usize; 4],
    max_in_flight: [usize; 4],

    events: Vec<MockEvent>,
    violations: Vec<String>,

    creations: usize,
    fail_creation_at: Option<usize>,
    acquire_results: VecDeque<SwapchainStatus>,
    acquire_order: VecDeque<u32>,
    present_results: VecDeque<SwapchainStatus>,
    recreate_image_count: Option<usize>,
    recreate_count: usize,
    device_lost: bool,
    wait_timeout: Duration,
}

impl MockState {
    fn new(image_count: usize, mode: CompletionMode) -> Self {
        Self {
            mode,
            image_count,
            extent: Extent2D::new(1280, 720),
            surface_extent: Extent2D::new(1280, 720),
            next_image: 0,
            held_images: FxHashSet::default(),
            command_buffers: SlotMap::with_key(),
            semaphores: SlotMap::with_key(),
            fences: SlotMap::with_key(),
            image_views: SlotMap::with_key(),
            render_passes: SlotMap::with_key(),
            framebuffers: SlotMap::with_key(),
            pending: VecDeque::new(),
            next_submission: 0,
            last_on_queue: [None; 4],
            in_flight: [0; 4],
            max_in_flight: [0; 4],
            events: Vec::new(),
            violations: Vec::new(),
            creations: 0,
            fail_creation_at: None,
            acquire_results: VecDeque::new(),
            acquire_order: VecDeque::new(),
            present_results: VecDeque::new(),
            recreate_image_count: None,
            recreate_count: 0,
            device_lost: false,
            wait_timeout: Duration::from_secs(5),
        }
    }

    fn violation(&mut self, message: String) {
        engine_warn!("ember::mock", "Synchronization rule violated: {}", message);
        self.violations.push(message);
    }

    fn check_device(&self) -> Result<()> {
        if self.device_lost {
            Err(Error::DeviceLost)
        } else {
            Ok(())
        }
    }

    fn next_creation(&mut self, what: &str) -> Result<()> {
        self.check_device()?;
        let index = self.creations;
        self.creations += 1;
        if self.fail_creation_at == Some(index) {
            self.fail_creation_at = None;
            engine_error!("ember::mock", "Injected failure creating {} (#{})", what, index);
            return Err(Error::OutOfMemory);
        }
        Ok(())
    }

    fn live_objects(&self) -> usize {
        self.command_buffers.len()
            + self.semaphores.len()
            + self.fences.len()
            + self.image_views.len()
            + self.render_passes.len()
            + self.framebuffers.len()
    }

    /// Consume a pending signal, returning the submission that produces it
    fn consume_wait(&mut self, semaphore: MockSemaphore, user: &str) -> Option<u64> {
        match self.semaphores.get_mut(semaphore) {
            Some(record) if record.signal_pending => {
                record.signal_pending = false;
                record.signaler.take()
            }
            Some(_) => {
                self.violation(format!(
                    "{} waits on {:?} which has no pending signal",
                    user, semaphore
                ));
                None
            }
            None => {
                self.violation(format!("{} waits on destroyed {:?}", user, semaphore));
                None
            }
        }
    }

    fn command_buffer_state(&mut self, command_buffer: MockCommandBuffer, call: &str) -> Result<CommandBufferState> {
        match self.command_buffers.get(command_buffer) {
            Some(record) => Ok(record.state),
            None => {
                self.violation(format!("{} on freed {:?}", call, command_buffer));
                Err(Error::InvalidResource(format!("{:?}", command_buffer)))
            }
        }
    }

    fn set_command_buffer_state(&mut self, command_buffer: MockCommandBuffer, state: CommandBufferState) {
        if let Some(record) = self.command_buffers.get_mut(command_buffer) {
            record.state = state;
            if state == CommandBufferState::Initial {
                record.in_render_pass = false;
            }
        }
    }

    /// Complete a submission, and first everything it depends on
    fn complete(&mut self, id: u64) -> bool {
        let Some(position) = self.pending.iter().position(|s| s.id == id) else {
            return false;
        };
        let Some(submission) = self.pending.remove(position) else {
            return false;
        };
        for dependency in &submission.depends_on {
            self.complete(*dependency);
        }

        for command_buffer in &submission.command_buffers {
            if let Some(record) = self.command_buffers.get_mut(*command_buffer) {
                if record.state == CommandBufferState::Pending {
                    record.state = CommandBufferState::Executable;
                }
            }
        }
        if let Some(fence) = submission.fence {
            if let Some(record) = self.fences.get_mut(fence) {
                record.signaled = true;
                record.in_flight = false;
            }
        }
        self.in_flight[queue_slot(submission.queue)] -= 1;
        self.events.push(MockEvent::Complete {
            queue: submission.queue,
            fence: submission.fence,
        });
        true
    }

    fn complete_all(&mut self) -> usize {
        let mut completed = 0;
        while let Some(id) = self.pending.front().map(|s| s.id) {
            if self.complete(id) {
                completed += 1;
            }
        }
        completed
    }

    fn destroy_violation<T>(&mut self, removed: Option<T>, what: String) {
        if removed.is_none() {
            self.violation(format!("double destroy of {}", what));
        }
    }
}

struct MockShared {
    state: Mutex<MockState>,
    completed: Condvar,
}

impl MockShared {
    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `RenderContext` backed by an in-memory GPU model
pub struct MockContext {
    shared: Arc<MockShared>,
}

impl MockContext {
    /// Mock swapchain of `image_count` images whose GPU work completes immediately
    pub fn new(image_count: usize) -> Self {
        Self::with_mode(image_count, CompletionMode::Immediate)
    }

    pub fn with_mode(image_count: usize, mode: CompletionMode) -> Self {
        Self {
            shared: Arc::new(MockShared {
                state: Mutex::new(MockState::new(image_count, mode)),
                completed: Condvar::new(),
            }),
        }
    }

    /// Inspection and control handle sharing this context's state
    pub fn gpu(&self) -> MockGpu {
        MockGpu { shared: self.shared.clone() }
    }
}

/// Shared handle to a mock context's GPU state
#[derive(Clone)]
pub struct MockGpu {
    shared: Arc<MockShared>,
}

impl MockGpu {
    /// All calls recorded so far
    pub fn events(&self) -> Vec<MockEvent> {
        self.shared.lock().events.clone()
    }

    pub fn clear_events(&self) {
        self.shared.lock().events.clear();
    }

    /// Synchronization rule violations recorded so far
    pub fn violations(&self) -> Vec<String> {
        self.shared.lock().violations.clone()
    }

    /// Objects created and not yet destroyed
    pub fn live_objects(&self) -> usize {
        self.shared.lock().live_objects()
    }

    pub fn live_fences(&self) -> usize {
        self.shared.lock().fences.len()
    }

    pub fn live_command_buffers(&self) -> usize {
        self.shared.lock().command_buffers.len()
    }

    /// Number of creation calls seen so far, failed ones included
    pub fn creation_count(&self) -> usize {
        self.shared.lock().creations
    }

    pub fn pending_submissions(&self) -> usize {
        self.shared.lock().pending.len()
    }

    /// Submissions on `queue` not completed yet
    pub fn in_flight(&self, queue: QueueType) -> usize {
        self.shared.lock().in_flight[queue_slot(queue)]
    }

    /// Highest number of simultaneously pending submissions seen on `queue`
    pub fn max_in_flight(&self, queue: QueueType) -> usize {
        self.shared.lock().max_in_flight[queue_slot(queue)]
    }

    pub fn recreate_count(&self) -> usize {
        self.shared.lock().recreate_count
    }

    pub fn image_count(&self) -> usize {
        self.shared.lock().image_count
    }

    /// Complete every pending submission and wake blocked fence waits
    pub fn complete_all(&self) -> usize {
        let completed = self.shared.lock().complete_all();
        self.shared.completed.notify_all();
        completed
    }

    /// Complete the oldest pending submission on `queue`
    ///
    /// Submissions it waits on complete first. Returns `false` when nothing
    /// was pending on that queue.
    pub fn complete_next(&self, queue: QueueType) -> bool {
        let completed = {
            let mut state = self.shared.lock();
            match state.pending.iter().find(|s| s.queue == queue).map(|s| s.id) {
                Some(id) => state.complete(id),
                None => false,
            }
        };
        self.shared.completed.notify_all();
        completed
    }

    /// Complete the `n`th pending submission (oldest first)
    pub fn complete_pending_at(&self, n: usize) -> bool {
        let completed = {
            let mut state = self.shared.lock();
            match state.pending.get(n).map(|s| s.id) {
                Some(id) => state.complete(id),
                None => false,
            }
        };
        self.shared.completed.notify_all();
        completed
    }

    /// Make the `n`th creation call from now fail with `Error::OutOfMemory`
    pub fn fail_nth_creation(&self, n: usize) {
        let mut state = self.shared.lock();
        state.fail_creation_at = Some(state.creations + n);
    }

    /// Result reported by the next acquire that has no earlier queued result
    pub fn queue_acquire_result(&self, status: SwapchainStatus) {
        self.shared.lock().acquire_results.push_back(status);
    }

    /// Force the image index of an upcoming acquire
    pub fn queue_acquire_image(&self, image: u32) {
        self.shared.lock().acquire_order.push_back(image);
    }

    pub fn queue_present_result(&self, status: SwapchainStatus) {
        self.shared.lock().present_results.push_back(status);
    }

    /// Image count the swapchain gets on its next recreation
    pub fn set_image_count_on_recreate(&self, image_count: usize) {
        self.shared.lock().recreate_image_count = Some(image_count);
    }

    /// Surface size the next recreation builds for; empty means minimized
    pub fn set_surface_extent(&self, extent: Extent2D) {
        self.shared.lock().surface_extent = extent;
    }

    /// Make every fallible call fail with `Error::DeviceLost`
    pub fn set_device_lost(&self, lost: bool) {
        self.shared.lock().device_lost = lost;
    }

    /// How long a fence wait blocks before it is reported as a deadlock
    pub fn set_wait_timeout(&self, timeout: Duration) {
        self.shared.lock().wait_timeout = timeout;
    }
}

impl RenderContext for MockContext {
    type CommandBuffer = MockCommandBuffer;
    type Semaphore = MockSemaphore;
    type Fence = MockFence;
    type ImageView = MockImageView;
    type RenderPass = MockRenderPass;
    type Framebuffer = MockFramebuffer;

    fn image_count(&self) -> usize {
        self.shared.lock().image_count
    }

    fn extent(&self) -> Extent2D {
        self.shared.lock().extent
    }

    fn acquire_next_image(&self, signal: MockSemaphore) -> Result<AcquireOutcome> {
        let mut state = self.shared.lock();
        state.check_device()?;

        let already_pending = match state.semaphores.get(signal) {
            Some(record) => record.signal_pending,
            None => {
                state.violation(format!("acquire signals destroyed {:?}", signal));
                return Err(Error::InvalidResource(format!("{:?}", signal)));
            }
        };

        let status = state.acquire_results.pop_front().unwrap_or(SwapchainStatus::Optimal);
        if status == SwapchainStatus::OutOfDate {
            state.events.push(MockEvent::AcquireOutOfDate);
            return Ok(AcquireOutcome::OutOfDate);
        }

        if already_pending {
            state.violation(format!("acquire signals {:?} which already has a pending signal", signal));
        }

        let count = state.image_count as u32;
        let image = match state.acquire_order.pop_front() {
            Some(image) => Some(image),
            None => (0..count)
                .map(|k| (state.next_image + k) % count.max(1))
                .find(|image| !state.held_images.contains(image)),
        };
        let Some(image) = image else {
            state.violation("acquire with every swapchain image already held".to_string());
            return Err(Error::BackendError("no presentable image available".to_string()));
        };
        if image >= count || !state.held_images.insert(image) {
            state.violation(format!("image {} acquired while unavailable", image));
        }
        state.next_image = (image + 1) % count.max(1);

        if let Some(record) = state.semaphores.get_mut(signal) {
            record.signal_pending = true;
            record.signaler = None;
        }
        state.events.push(MockEvent::Acquire { image, signal });

        Ok(AcquireOutcome::Image {
            index: image,
            suboptimal: status == SwapchainStatus::Suboptimal,
        })
    }

    fn present(&self, image_index: u32, wait: MockSemaphore) -> Result<SwapchainStatus> {
        let mut state = self.shared.lock();
        state.check_device()?;

        state.consume_wait(wait, "present");
        if !state.held_images.remove(&image_index) {
            state.violation(format!("present of image {} which was not acquired", image_index));
        }
        state.events.push(MockEvent::Present { image: image_index, wait });

        Ok(state.present_results.pop_front().unwrap_or(SwapchainStatus::Optimal))
    }

    fn surface_extent(&self) -> Result<Extent2D> {
        let state = self.shared.lock();
        state.check_device()?;
        Ok(state.surface_extent)
    }

    fn recreate_swapchain(&mut self) -> Result<()> {
        let mut state = self.shared.lock();
        state.check_device()?;

        if state.surface_extent.is_empty() {
            let message = format!("swapchain recreated for an empty {:?} surface", state.surface_extent);
            state.violation(message.clone());
            return Err(Error::BackendError(message));
        }

        if !state.image_views.is_empty() || !state.framebuffers.is_empty() {
            let message = format!(
                "swapchain recreated with {} views and {} framebuffers alive",
                state.image_views.len(),
                state.framebuffers.len()
            );
            state.violation(message);
        }
        if !state.pending.is_empty() {
            let message = format!("swapchain recreated with {} submissions pending", state.pending.len());
            state.violation(message);
        }

        if let Some(image_count) = state.recreate_image_count.take() {
            state.image_count = image_count;
        }
        state.extent = state.surface_extent;
        state.held_images.clear();
        state.next_image = 0;
        state.recreate_count += 1;
        let image_count = state.image_count;
        state.events.push(MockEvent::RecreateSwapchain { image_count });
        Ok(())
    }

    fn create_semaphore(&self) -> Result<MockSemaphore> {
        let mut state = self.shared.lock();
        state.next_creation("semaphore")?;
        Ok(state.semaphores.insert(SemaphoreRecord {
            signal_pending: false,
            signaler: None,
        }))
    }

    fn create_fence(&self, signaled: bool) -> Result<MockFence> {
        let mut state = self.shared.lock();
        state.next_creation("fence")?;
        Ok(state.fences.insert(FenceRecord { signaled, in_flight: false }))
    }

    fn allocate_command_buffer(&self, queue: QueueType) -> Result<MockCommandBuffer> {
        let mut state = self.shared.lock();
        state.next_creation("command buffer")?;
        Ok(state.command_buffers.insert(CommandBufferRecord {
            queue,
            state: CommandBufferState::Initial,
            in_render_pass: false,
        }))
    }

    fn create_image_view(&self, image_index: usize) -> Result<MockImageView> {
        let mut state = self.shared.lock();
        state.next_creation("image view")?;
        if image_index >= state.image_count {
            let message = format!(
                "image view for image {} of a {}-image swapchain",
                image_index, state.image_count
            );
            state.violation(message.clone());
            return Err(Error::InvalidResource(message));
        }
        Ok(state.image_views.insert(image_index))
    }

    fn create_render_pass(&self) -> Result<MockRenderPass> {
        let mut state = self.shared.lock();
        state.next_creation("render pass")?;
        Ok(state.render_passes.insert(()))
    }

    fn create_framebuffer(&self, render_pass: MockRenderPass, view: MockImageView) -> Result<MockFramebuffer> {
        let mut state = self.shared.lock();
        state.next_creation("framebuffer")?;
        if !state.render_passes.contains_key(render_pass) || !state.image_views.contains_key(view) {
            let message = format!("framebuffer over destroyed {:?} / {:?}", render_pass, view);
            state.violation(message.clone());
            return Err(Error::InvalidResource(message));
        }
        Ok(state.framebuffers.insert(FramebufferRecord { render_pass }))
    }

    fn destroy_semaphore(&self, semaphore: MockSemaphore) {
        let mut state = self.shared.lock();
        let removed = state.semaphores.remove(semaphore);
        state.destroy_violation(removed, format!("{:?}", semaphore));
    }

    fn destroy_fence(&self, fence: MockFence) {
        let mut state = self.shared.lock();
        if state.fences.get(fence).is_some_and(|f| f.in_flight) {
            state.violation(format!("{:?} destroyed while in flight", fence));
        }
        let removed = state.fences.remove(fence);
        state.destroy_violation(removed, format!("{:?}", fence));
    }

    fn free_command_buffer(&self, queue: QueueType, command_buffer: MockCommandBuffer) {
        let mut state = self.shared.lock();
        if let Some((owner, buffer_state)) = state.command_buffers.get(command_buffer).map(|r| (r.queue, r.state)) {
            if owner != queue {
                state.violation(format!(
                    "{:?} freed to the {:?} pool but allocated from {:?}",
                    command_buffer, queue, owner
                ));
            }
            if buffer_state == CommandBufferState::Pending {
                state.violation(format!("{:?} freed while pending", command_buffer));
            }
        }
        let removed = state.command_buffers.remove(command_buffer);
        state.destroy_violation(removed, format!("{:?}", command_buffer));
    }

    fn destroy_image_view(&self, view: MockImageView) {
        let mut state = self.shared.lock();
        let removed = state.image_views.remove(view);
        state.destroy_violation(removed, format!("{:?}", view));
    }

    fn destroy_render_pass(&self, render_pass: MockRenderPass) {
        let mut state = self.shared.lock();
        let removed = state.render_passes.remove(render_pass);
        state.destroy_violation(removed, format!("{:?}", render_pass));
    }

    fn destroy_framebuffer(&self, framebuffer: MockFramebuffer) {
        let mut state = self.shared.lock();
        let removed = state.framebuffers.remove(framebuffer);
        state.destroy_violation(removed, format!("{:?}", framebuffer));
    }

    fn wait_for_fence(&self, fence: MockFence) -> Result<()> {
        let mut state = self.shared.lock();
        state.check_device()?;
        state.events.push(MockEvent::WaitFence(fence));

        let deadline = Instant::now() + state.wait_timeout;
        loop {
            let (signaled, in_flight) = match state.fences.get(fence) {
                Some(record) => (record.signaled, record.in_flight),
                None => {
                    state.violation(format!("wait on destroyed {:?}", fence));
                    return Err(Error::InvalidResource(format!("{:?}", fence)));
                }
            };
            if signaled {
                return Ok(());
            }
            if !in_flight {
                state.violation(format!("wait on unsignaled {:?} that was never submitted", fence));
                return Err(Error::BackendError(format!("{:?} can never signal", fence)));
            }

            let now = Instant::now();
            if now >= deadline {
                state.violation(format!("wait on {:?} timed out", fence));
                return Err(Error::BackendError(format!("timed out waiting for {:?}", fence)));
            }
            let (guard, _) = self
                .shared
                .completed
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
        }
    }

    fn reset_fence(&self, fence: MockFence) -> Result<()> {
        let mut state = self.shared.lock();
        state.check_device()?;
        state.events.push(MockEvent::ResetFence(fence));

        match state.fences.get(fence).map(|f| f.in_flight) {
            Some(true) => {
                state.violation(format!("{:?} reset while in flight", fence));
                Ok(())
            }
            Some(false) => {
                if let Some(record) = state.fences.get_mut(fence) {
                    record.signaled = false;
                }
                Ok(())
            }
            None => {
                state.violation(format!("reset of destroyed {:?}", fence));
                Err(Error::InvalidResource(format!("{:?}", fence)))
            }
        }
    }

    fn wait_idle(&self) -> Result<()> {
        let mut state = self.shared.lock();
        state.check_device()?;
        state.complete_all();
        state.events.push(MockEvent::WaitIdle);
        drop(state);
        self.shared.completed.notify_all();
        Ok(())
    }

    fn reset_command_buffer(&self, command_buffer: MockCommandBuffer) -> Result<()> {
        let mut state = self.shared.lock();
        state.check_device()?;
        state.events.push(MockEvent::ResetCommandBuffer(command_buffer));

        if state.command_buffer_state(command_buffer, "reset")? == CommandBufferState::Pending {
            state.violation(format!("{:?} reset while its submission is pending", command_buffer));
        }
        state.set_command_buffer_state(command_buffer, CommandBufferState::Initial);
        Ok(())
    }

    fn begin_command_buffer(&self, command_buffer: MockCommandBuffer) -> Result<()> {
        let mut state = self.shared.lock();
        state.check_device()?;
        state.events.push(MockEvent::BeginCommandBuffer(command_buffer));

        match state.command_buffer_state(command_buffer, "begin")? {
            CommandBufferState::Recording => {
                state.violation(format!("{:?} begun while already recording", command_buffer))
            }
            CommandBufferState::Pending => {
                state.violation(format!("{:?} begun while pending", command_buffer))
            }
            _ => {}
        }
        state.set_command_buffer_state(command_buffer, CommandBufferState::Recording);
        Ok(())
    }

    fn end_command_buffer(&self, command_buffer: MockCommandBuffer) -> Result<()> {
        let mut state = self.shared.lock();
        state.check_device()?;
        state.events.push(MockEvent::EndCommandBuffer(command_buffer));

        if state.command_buffer_state(command_buffer, "end")? != CommandBufferState::Recording {
            state.violation(format!("{:?} ended while not recording", command_buffer));
        }
        if state.command_buffers.get(command_buffer).is_some_and(|r| r.in_render_pass) {
            state.violation(format!("{:?} ended inside a render pass", command_buffer));
        }
        state.set_command_buffer_state(command_buffer, CommandBufferState::Executable);
        Ok(())
    }

    fn cmd_begin_render_pass(
        &self,
        command_buffer: MockCommandBuffer,
        render_pass: MockRenderPass,
        framebuffer: MockFramebuffer,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        let mut state = self.shared.lock();
        state.check_device()?;
        state.events.push(MockEvent::BeginRenderPass {
            command_buffer,
            render_pass,
            framebuffer,
            clear_values: clear_values.to_vec(),
        });

        if state.command_buffer_state(command_buffer, "begin render pass")? != CommandBufferState::Recording {
            state.violation(format!("render pass begun on {:?} outside recording", command_buffer));
        }
        match state.framebuffers.get(framebuffer).map(|f| f.render_pass) {
            Some(owner) if owner != render_pass => state.violation(format!(
                "{:?} begun on {:?} created for {:?}",
                render_pass, framebuffer, owner
            )),
            Some(_) => {}
            None => state.violation(format!("render pass begun on destroyed {:?}", framebuffer)),
        }
        if state.command_buffers.get(command_buffer).is_some_and(|r| r.in_render_pass) {
            state.violation(format!("nested render pass on {:?}", command_buffer));
        } else if let Some(record) = state.command_buffers.get_mut(command_buffer) {
            record.in_render_pass = true;
        }
        Ok(())
    }

    fn cmd_end_render_pass(&self, command_buffer: MockCommandBuffer) -> Result<()> {
        let mut state = self.shared.lock();
        state.check_device()?;
        state.events.push(MockEvent::EndRenderPass(command_buffer));

        state.command_buffer_state(command_buffer, "end render pass")?;
        let was_open = match state.command_buffers.get_mut(command_buffer) {
            Some(record) => std::mem::replace(&mut record.in_render_pass, false),
            None => false,
        };
        if !was_open {
            state.violation(format!("render pass ended on {:?} without one open", command_buffer));
        }
        Ok(())
    }

    fn submit(&self, queue: QueueType, desc: &SubmitDesc<'_, Self>) -> Result<()> {
        let mut state = self.shared.lock();
        state.check_device()?;

        let id = state.next_submission;
        state.next_submission += 1;

        for command_buffer in desc.command_buffers {
            let buffer = state.command_buffers.get(*command_buffer).map(|r| (r.queue, r.state));
            match buffer {
                Some((owner, CommandBufferState::Executable)) if owner == queue => {}
                Some((owner, CommandBufferState::Executable)) => state.violation(format!(
                    "{:?} from the {:?} pool submitted to {:?}",
                    command_buffer, owner, queue
                )),
                Some((_, buffer_state)) => state.violation(format!(
                    "{:?} submitted in state {:?}",
                    command_buffer, buffer_state
                )),
                None => state.violation(format!("submit of freed {:?}", command_buffer)),
            }
        }

        let mut depends_on = Vec::new();
        let user = format!("{:?} submission", queue);
        for (semaphore, _) in desc.wait {
            if let Some(signaler) = state.consume_wait(*semaphore, &user) {
                depends_on.push(signaler);
            }
        }
        if let Some(previous) = state.last_on_queue[queue_slot(queue)] {
            depends_on.push(previous);
        }

        for semaphore in desc.signal {
            match state.semaphores.get_mut(*semaphore) {
                Some(record) if !record.signal_pending => {
                    record.signal_pending = true;
                    record.signaler = Some(id);
                }
                Some(_) => state.violation(format!(
                    "{:?} signaled while a previous signal is still pending",
                    semaphore
                )),
                None => state.violation(format!("submit signals destroyed {:?}", semaphore)),
            }
        }

        if let Some(fence) = desc.fence {
            match state.fences.get_mut(fence) {
                Some(record) if !record.signaled && !record.in_flight => record.in_flight = true,
                Some(_) => state.violation(format!("submit with {:?} not reset", fence)),
                None => state.violation(format!("submit with destroyed {:?}", fence)),
            }
        }

        for command_buffer in desc.command_buffers {
            if let Some(record) = state.command_buffers.get_mut(*command_buffer) {
                record.state = CommandBufferState::Pending;
            }
        }

        state.pending.push_back(Submission {
            id,
            queue,
            command_buffers: desc.command_buffers.to_vec(),
            depends_on,
            fence: desc.fence,
        });
        state.last_on_queue[queue_slot(queue)] = Some(id);
        let slot = queue_slot(queue);
        state.in_flight[slot] += 1;
        state.max_in_flight[slot] = state.max_in_flight[slot].max(state.in_flight[slot]);

        state.events.push(MockEvent::Submit {
            queue,
            command_buffers: desc.command_buffers.to_vec(),
            waits: desc.wait.to_vec(),
            signals: desc.signal.to_vec(),
            fence: desc.fence,
        });

        if state.mode == CompletionMode::Immediate {
            state.complete(id);
        }
        drop(state);
        self.shared.completed.notify_all();
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_context_tests.rs"]
mod tests;
