//! Ember demo - opens a window and runs the frame loop until it is closed
//!
//! The render pass clears to a slowly cycling color; nothing else is drawn.

use ember_engine::ember::log::LogSeverity;
use ember_engine::ember::render::{Config, FrameStatus};
use ember_engine::ember::{Engine, Result, WindowConfig};
use ember_engine::{engine_error, engine_info};
use ember_engine_renderer_vulkan::ember::Window;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

fn run() -> Result<()> {
    let window_config = WindowConfig::windowed("Ember Demo", 800, 600)?;
    let config = Config {
        app_name: "Ember Demo".to_string(),
        enable_validation: cfg!(feature = "vulkan-validation"),
        require_dedicated_transfer_queue: false,
        ..Config::default()
    };

    let mut window = Window::new(window_config, config)?;
    let started = Instant::now();
    let mut frames: u64 = 0;

    while !window.should_close() {
        window.update();
        if window.should_close() {
            break;
        }

        let t = started.elapsed().as_secs_f32();
        let renderer = window.renderer_mut();
        renderer.set_clear_color([
            0.5 + 0.5 * t.sin(),
            0.5 + 0.5 * (t + 2.0).sin(),
            0.5 + 0.5 * (t + 4.0).sin(),
            1.0,
        ]);

        match renderer.start_frame()? {
            FrameStatus::Ready => {
                renderer.submit_frame()?;
                frames += 1;
            }
            FrameStatus::Skipped => {
                // Minimized: nothing to present until the window is restored
                if renderer.is_swapchain_stale() {
                    thread::sleep(Duration::from_millis(16));
                }
            }
        }
    }

    let seconds = started.elapsed().as_secs_f64();
    engine_info!(
        "ember::demo",
        "{} frames in {:.1}s ({:.0} fps)",
        frames,
        seconds,
        frames as f64 / seconds.max(f64::EPSILON)
    );

    window.renderer_mut().destroy();

    #[cfg(feature = "vulkan-validation")]
    ember_engine_renderer_vulkan::ember::print_validation_stats_report();

    Ok(())
}

fn main() -> ExitCode {
    Engine::set_min_severity(LogSeverity::Debug);

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            engine_error!("ember::demo", "Demo failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
