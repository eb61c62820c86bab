/// Window - a winit window with its Vulkan context and renderer
///
/// The event loop is pumped by [`Window::update`] instead of owning the
/// thread, so the application keeps the classic
/// `while !should_close() { update(); start_frame(); ...; submit_frame(); }`
/// loop.

use ember_engine::ember::render::{Config, Extent2D};
use ember_engine::ember::{Error, Renderer, Result, WindowConfig};
use ember_engine::{engine_debug, engine_error, engine_info};
use std::time::Duration;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Fullscreen, WindowId};

use crate::vulkan_context::VulkanContext;

/// Window events collected while pumping
#[derive(Debug, Default)]
struct EventState {
    close_requested: bool,
    resized: Option<PhysicalSize<u32>>,
}

impl ApplicationHandler for EventState {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => self.close_requested = true,
            WindowEvent::Resized(size) => self.resized = Some(size),
            _ => {}
        }
    }
}

/// Application window owning the renderer
pub struct Window {
    // Field order is drop order: renderer (and its context) before the window
    renderer: Renderer<VulkanContext>,
    window: winit::window::Window,
    event_loop: EventLoop<()>,
    events: EventState,
    config: WindowConfig,
}

impl Window {
    /// Open the window, then create the Vulkan context and the renderer on it
    ///
    /// # Arguments
    ///
    /// * `config` - Window configuration (validated first)
    /// * `renderer_config` - Renderer configuration
    #[allow(deprecated)]
    pub fn new(config: WindowConfig, renderer_config: Config) -> Result<Self> {
        config.validate().map_err(|e| {
            engine_error!("ember::window", "Rejected window configuration: {}", e);
            e
        })?;

        let event_loop = EventLoop::new().map_err(|e| {
            engine_error!("ember::window", "Failed to create event loop: {}", e);
            Error::InitializationFailed(format!("Failed to create event loop: {}", e))
        })?;

        let mut attributes = winit::window::Window::default_attributes().with_title(config.title.clone());
        if !config.uses_monitor_size() {
            attributes = attributes.with_inner_size(PhysicalSize::new(config.width, config.height));
        }
        if config.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = event_loop.create_window(attributes).map_err(|e| {
            engine_error!("ember::window", "Failed to create window: {}", e);
            Error::InitializationFailed(format!("Failed to create window: {}", e))
        })?;

        let extent = initial_extent(&window, &config);
        let context = VulkanContext::new(&window, extent, &renderer_config)?;
        let renderer = Renderer::new(context, &renderer_config)?;

        engine_info!(
            "ember::window",
            "Window \"{}\" opened ({}x{}{})",
            config.title,
            extent.width,
            extent.height,
            if config.fullscreen { ", fullscreen" } else { "" }
        );

        Ok(Self {
            renderer,
            window,
            event_loop,
            events: EventState::default(),
            config,
        })
    }

    /// Whether the user asked to close the window
    pub fn should_close(&self) -> bool {
        self.events.close_requested
    }

    /// Process pending window events without blocking
    pub fn update(&mut self) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.events);
        if let PumpStatus::Exit(code) = status {
            engine_debug!("ember::window", "Event loop exited with code {}", code);
            self.events.close_requested = true;
        }

        if let Some(size) = self.events.resized.take() {
            // Picked up by the next swapchain recreation
            self.renderer
                .context_mut()
                .set_window_extent(Extent2D::new(size.width, size.height));
        }
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        let config = WindowConfig {
            title: title.to_string(),
            ..self.config.clone()
        };
        config.validate()?;
        self.window.set_title(title);
        self.config = config;
        Ok(())
    }

    /// Current client area size in pixels
    pub fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    /// Request a new client area size
    ///
    /// The platform may adjust or ignore the request; the swapchain picks the
    /// new size up on its next recreation.
    pub fn set_size(&mut self, width: u32, height: u32) -> Result<()> {
        let config = WindowConfig {
            width,
            height,
            fullscreen: false,
            ..self.config.clone()
        };
        config.validate()?;

        if let Some(size) = self.window.request_inner_size(PhysicalSize::new(width, height)) {
            self.renderer
                .context_mut()
                .set_window_extent(Extent2D::new(size.width, size.height));
        }
        self.config.width = width;
        self.config.height = height;
        Ok(())
    }

    pub fn is_fullscreen(&self) -> bool {
        self.window.fullscreen().is_some()
    }

    /// Switch between borderless fullscreen on the current monitor and windowed
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        let mode = fullscreen.then_some(Fullscreen::Borderless(None));
        self.window.set_fullscreen(mode);
        self.config.fullscreen = fullscreen;
    }

    /// Size of the monitor the window is on, if known
    pub fn fullscreen_size(&self) -> Option<(u32, u32)> {
        self.window.current_monitor().map(|monitor| {
            let size = monitor.size();
            (size.width, size.height)
        })
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn renderer(&self) -> &Renderer<VulkanContext> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut Renderer<VulkanContext> {
        &mut self.renderer
    }

    /// Underlying winit window
    pub fn winit_window(&self) -> &winit::window::Window {
        &self.window
    }
}

/// Size the swapchain should start with
///
/// A fullscreen window may report a zero size before the compositor maps it;
/// fall back to the monitor, then to the configured size.
fn initial_extent(window: &winit::window::Window, config: &WindowConfig) -> Extent2D {
    let size = window.inner_size();
    if size.width > 0 && size.height > 0 {
        return Extent2D::new(size.width, size.height);
    }
    window
        .current_monitor()
        .map(|monitor| Extent2D::new(monitor.size().width, monitor.size().height))
        .filter(|extent| !extent.is_empty())
        .unwrap_or_else(|| {
            let defaults = WindowConfig::default();
            Extent2D::new(
                if config.width > 0 { config.width } else { defaults.width },
                if config.height > 0 { config.height } else { defaults.height },
            )
        })
}
