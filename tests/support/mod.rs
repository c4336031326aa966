#![allow(dead_code)]

use async_trait::async_trait;
use browser_computer::{ComputerConfig, ComputerError, Dimensions, Driver, MouseButton};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// PNG signature followed by the IHDR chunk header.
pub const PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
];

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Launch(String, Dimensions),
    Close,
    Capture,
    Move(i64, i64),
    Click(i64, i64, MouseButton, u32),
    Down(MouseButton),
    Up(MouseButton),
    Key(String),
    Type(String),
    Eval(String),
}

#[derive(Clone, Default)]
pub struct RecordingDriver {
    calls: Arc<Mutex<Vec<Call>>>,
    pub fail_launch: bool,
    pub fail_action: Option<&'static str>,
    /// Calls of `fail_action` that succeed before it starts failing.
    pub fail_after: usize,
    hits: Arc<AtomicUsize>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_launch() -> Self {
        Self { fail_launch: true, ..Self::default() }
    }

    pub fn failing(action: &'static str) -> Self {
        Self { fail_action: Some(action), ..Self::default() }
    }

    pub fn failing_after(action: &'static str, successes: usize) -> Self {
        Self { fail_action: Some(action), fail_after: successes, ..Self::default() }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls after launch, without the lifecycle entries.
    pub fn actions(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Launch(..) | Call::Close))
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, action: &'static str, call: Call) -> Result<(), ComputerError> {
        self.calls.lock().unwrap().push(call);
        if self.fail_action == Some(action)
            && self.hits.fetch_add(1, Ordering::SeqCst) >= self.fail_after
        {
            return Err(ComputerError::Backend { action, reason: "page closed".into() });
        }
        Ok(())
    }
}

#[async_trait]
impl Driver for RecordingDriver {
    async fn launch(&mut self, cfg: &ComputerConfig) -> Result<(), ComputerError> {
        self.calls.lock().unwrap().push(Call::Launch(cfg.start_url.clone(), cfg.dimensions));
        if self.fail_launch {
            return Err(ComputerError::SessionStart("navigate: net::ERR_NAME_NOT_RESOLVED".into()));
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ComputerError> {
        self.calls.lock().unwrap().push(Call::Close);
        Ok(())
    }

    async fn capture_png(&self) -> Result<Vec<u8>, ComputerError> {
        self.record("screenshot", Call::Capture)?;
        Ok(PNG.to_vec())
    }

    async fn mouse_move(&self, x: i64, y: i64) -> Result<(), ComputerError> {
        self.record("move", Call::Move(x, y))
    }

    async fn mouse_click(
        &self,
        x: i64,
        y: i64,
        button: MouseButton,
        click_count: u32,
    ) -> Result<(), ComputerError> {
        self.record("click", Call::Click(x, y, button, click_count))
    }

    async fn mouse_down(&self, button: MouseButton) -> Result<(), ComputerError> {
        self.record("mouse down", Call::Down(button))
    }

    async fn mouse_up(&self, button: MouseButton) -> Result<(), ComputerError> {
        self.record("mouse up", Call::Up(button))
    }

    async fn key_press(&self, key: &str) -> Result<(), ComputerError> {
        self.record("keypress", Call::Key(key.to_string()))
    }

    async fn type_text(&self, text: &str) -> Result<(), ComputerError> {
        self.record("type", Call::Type(text.to_string()))
    }

    async fn evaluate(&self, script: &str) -> Result<(), ComputerError> {
        self.record("evaluate", Call::Eval(script.to_string()))
    }
}

pub const DEFAULT_DIMS: Dimensions = Dimensions { width: 1280, height: 800 };

pub fn config() -> ComputerConfig {
    ComputerConfig {
        start_url: "https://example.com/".into(),
        connect_url: None,
        headless: true,
        ..ComputerConfig::default()
    }
}
