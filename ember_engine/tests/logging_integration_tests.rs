//! Integration tests for Engine logging system
//!
//! These tests verify the logging facility and the entries the frame
//! protocol emits through it. No GPU required.
//!
//! Run with: cargo test --test logging_integration_tests

use ember_engine::ember::Engine;
use ember_engine::ember::log::{DefaultLogger, Logger, LogEntry, LogSeverity};
use ember_engine::ember::render::mock_context::MockContext;
use ember_engine::ember::render::{Config, FrameStatus, Renderer, SwapchainStatus};
use ember_engine::ember::Error;
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// TEST LOGGER IMPLEMENTATION
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogger {
    fn new() -> (Self, Arc<Mutex<Vec<LogEntry>>>) {
        let entries = Arc::new(Mutex::new(Vec::new()));
        (Self { entries: entries.clone() }, entries)
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn messages(entries: &Arc<Mutex<Vec<LogEntry>>>, severity: LogSeverity) -> Vec<String> {
    entries
        .lock()
        .unwrap()
        .iter()
        .filter(|e| e.severity == severity)
        .map(|e| e.message.clone())
        .collect()
}

// ============================================================================
// LOGGING TESTS
// ============================================================================

#[test]
#[serial]
fn test_integration_custom_logger() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    Engine::log(LogSeverity::Info, "test::module", "Test info message".to_string());
    Engine::log(LogSeverity::Warn, "test::module", "Test warning message".to_string());
    Engine::log(LogSeverity::Error, "test::module", "Test error message".to_string());

    let captured_entries = entries.lock().unwrap();
    assert_eq!(captured_entries.len(), 3);

    assert_eq!(captured_entries[0].severity, LogSeverity::Info);
    assert_eq!(captured_entries[0].message, "Test info message");
    assert_eq!(captured_entries[1].severity, LogSeverity::Warn);
    assert_eq!(captured_entries[2].severity, LogSeverity::Error);
    assert!(captured_entries.iter().all(|e| e.source == "test::module"));

    drop(captured_entries);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_error_logging_with_location() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    Engine::log_detailed(
        LogSeverity::Error,
        "test::error",
        "Critical error occurred".to_string(),
        "test_file.rs",
        42,
    );

    let captured_entries = entries.lock().unwrap();
    assert_eq!(captured_entries.len(), 1);

    let entry = &captured_entries[0];
    assert_eq!(entry.severity, LogSeverity::Error);
    assert_eq!(entry.file, Some("test_file.rs"));
    assert_eq!(entry.line, Some(42));
    assert!(DefaultLogger::format_plain(entry).ends_with("Critical error occurred (test_file.rs:42)"));

    drop(captured_entries);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_logger_reset() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    Engine::log(LogSeverity::Info, "test", "Message 1".to_string());
    assert_eq!(entries.lock().unwrap().len(), 1);

    // Goes to the default logger, not captured
    Engine::reset_logger();
    Engine::log(LogSeverity::Info, "test", "Message 2".to_string());

    assert_eq!(entries.lock().unwrap().len(), 1);
}

#[test]
#[serial]
fn test_integration_logging_different_severities() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);
    Engine::set_min_severity(LogSeverity::Trace);

    Engine::log(LogSeverity::Trace, "test", "Trace message".to_string());
    Engine::log(LogSeverity::Debug, "test", "Debug message".to_string());
    Engine::log(LogSeverity::Info, "test", "Info message".to_string());
    Engine::log(LogSeverity::Warn, "test", "Warn message".to_string());
    Engine::log(LogSeverity::Error, "test", "Error message".to_string());

    let severities: Vec<LogSeverity> = entries.lock().unwrap().iter().map(|e| e.severity).collect();
    assert_eq!(
        severities,
        vec![
            LogSeverity::Trace,
            LogSeverity::Debug,
            LogSeverity::Info,
            LogSeverity::Warn,
            LogSeverity::Error,
        ]
    );

    Engine::set_min_severity(LogSeverity::Info);
    Engine::reset_logger();
}

// ============================================================================
// FRAME PROTOCOL LOGGING
// ============================================================================

#[test]
#[serial]
fn test_integration_renderer_lifecycle_is_logged() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    {
        let mut renderer = Renderer::new(MockContext::new(2), &Config::default()).unwrap();
        renderer.start_frame().unwrap();
        renderer.submit_frame().unwrap();
    }

    let info = messages(&entries, LogSeverity::Info);
    assert!(info.iter().any(|m| m.contains("Renderer ready with 2 frames in flight")));
    assert!(info.iter().any(|m| m == "Renderer destroyed"));
    assert!(messages(&entries, LogSeverity::Error).is_empty());

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_out_of_date_is_logged_as_warning() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    let ctx = MockContext::new(2);
    ctx.gpu().queue_acquire_result(SwapchainStatus::OutOfDate);
    let mut renderer = Renderer::new(ctx, &Config::default()).unwrap();
    assert_eq!(renderer.start_frame().unwrap(), FrameStatus::Skipped);

    let warnings = messages(&entries, LogSeverity::Warn);
    assert!(warnings.iter().any(|m| m.contains("out of date")));
    assert!(messages(&entries, LogSeverity::Info).iter().any(|m| m.contains("Swapchain recreated")));

    drop(renderer);
    Engine::reset_logger();
}

#[test]
#[serial]
fn test_integration_fatal_error_is_logged_once_with_location() {
    let (test_logger, entries) = TestLogger::new();
    Engine::set_logger(test_logger);

    let ctx = MockContext::new(2);
    let gpu = ctx.gpu();
    let mut renderer = Renderer::new(ctx, &Config::default()).unwrap();
    renderer.start_frame().unwrap();
    gpu.set_device_lost(true);

    assert_eq!(renderer.submit_frame().unwrap_err(), Error::DeviceLost);

    let captured = entries.lock().unwrap();
    let errors: Vec<&LogEntry> = captured.iter().filter(|e| e.severity == LogSeverity::Error).collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].source, "ember::FrameOrchestrator");
    assert!(errors[0].message.contains("Device lost"));
    assert!(errors[0].file.is_some());
    drop(captured);

    gpu.set_device_lost(false);
    drop(renderer);
    Engine::reset_logger();
}
