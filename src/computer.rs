//! The computer capability surface and its local implementation.
//!
//! [`Computer`] is what an orchestrating runtime drives: a fixed environment
//! and viewport plus pointer, keyboard and capture operations. [`LocalComputer`]
//! implements it over any [`Driver`], translating key names and composing
//! scroll and drag gestures from backend primitives.

use crate::action::{Action, MouseButton, Point};
use crate::browser::ChromiumDriver;
use crate::config::{ComputerConfig, Dimensions, Environment};
use crate::driver::Driver;
use crate::error::ComputerError;
use crate::keymap;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{debug, info, warn};

#[async_trait]
pub trait Computer: Send + Sync {
    fn environment(&self) -> Environment;
    fn dimensions(&self) -> Dimensions;

    /// Base64 PNG of the visible viewport.
    async fn screenshot(&self) -> Result<String, ComputerError>;
    async fn click(&self, x: i64, y: i64, button: MouseButton) -> Result<(), ComputerError>;
    async fn double_click(&self, x: i64, y: i64) -> Result<(), ComputerError>;
    async fn scroll(&self, x: i64, y: i64, dx: i64, dy: i64) -> Result<(), ComputerError>;
    async fn type_text(&self, text: &str) -> Result<(), ComputerError>;
    async fn wait(&self) -> Result<(), ComputerError>;
    async fn move_to(&self, x: i64, y: i64) -> Result<(), ComputerError>;
    async fn keypress(&self, keys: &[String]) -> Result<(), ComputerError>;
    async fn drag(&self, path: &[Point]) -> Result<(), ComputerError>;

    async fn perform(&self, action: &Action) -> Result<(), ComputerError> {
        match action {
            Action::Click { x, y, button } => self.click(*x, *y, *button).await,
            Action::DoubleClick { x, y } => self.double_click(*x, *y).await,
            Action::Scroll { x, y, dx, dy } => self.scroll(*x, *y, *dx, *dy).await,
            Action::TypeText { text } => self.type_text(text).await,
            Action::Wait => self.wait().await,
            Action::Move { x, y } => self.move_to(*x, *y).await,
            Action::KeyPress { keys } => self.keypress(keys).await,
            Action::Drag { path } => self.drag(path).await,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionState {
    Idle,
    Running,
    Stopped,
}

/// A [`Computer`] backed by a single page of a [`Driver`].
///
/// Not safe for concurrent use: callers issue one operation at a time and
/// await it before the next.
pub struct LocalComputer<D = ChromiumDriver> {
    driver: D,
    config: ComputerConfig,
    state: SessionState,
}

impl LocalComputer<ChromiumDriver> {
    pub fn chromium(config: ComputerConfig) -> Self {
        Self::new(ChromiumDriver::new(), config)
    }
}

impl<D: Driver> LocalComputer<D> {
    pub fn new(driver: D, config: ComputerConfig) -> Self {
        Self { driver, config, state: SessionState::Idle }
    }

    pub fn config(&self) -> &ComputerConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::Running
    }

    /// Launches the backend and opens the start page. Not retried; on failure
    /// anything partially acquired is released before returning.
    pub async fn start(&mut self) -> Result<(), ComputerError> {
        if self.state == SessionState::Running {
            return Ok(());
        }
        let dims = self.config.dimensions;
        info!(width = dims.width, height = dims.height, url = %self.config.start_url, "starting computer session");
        if let Err(e) = self.driver.launch(&self.config).await {
            if let Err(close_err) = self.driver.close().await {
                warn!(error = %close_err, "cleanup after failed start");
            }
            return Err(e);
        }
        self.state = SessionState::Running;
        Ok(())
    }

    /// Releases the session. Safe to call repeatedly and before `start`.
    pub async fn stop(&mut self) {
        if self.state != SessionState::Running {
            debug!("stop on inactive computer session");
            return;
        }
        self.state = SessionState::Stopped;
        match self.driver.close().await {
            Ok(()) => info!("computer session stopped"),
            Err(e) => warn!(error = %e, "computer session stopped with errors"),
        }
    }

    fn live(&self) -> &D {
        assert!(
            self.state == SessionState::Running,
            "computer used outside start()/stop()"
        );
        &self.driver
    }
}

#[async_trait]
impl<D: Driver> Computer for LocalComputer<D> {
    fn environment(&self) -> Environment {
        self.config.environment
    }

    fn dimensions(&self) -> Dimensions {
        self.config.dimensions
    }

    async fn screenshot(&self) -> Result<String, ComputerError> {
        let png = self.live().capture_png().await?;
        debug!(bytes = png.len(), "screenshot");
        Ok(STANDARD.encode(png))
    }

    async fn click(&self, x: i64, y: i64, button: MouseButton) -> Result<(), ComputerError> {
        debug!(x, y, button = button.as_str(), "click");
        self.live().mouse_click(x, y, button, 1).await
    }

    async fn double_click(&self, x: i64, y: i64) -> Result<(), ComputerError> {
        debug!(x, y, "double click");
        self.live().mouse_click(x, y, MouseButton::Left, 2).await
    }

    async fn scroll(&self, x: i64, y: i64, dx: i64, dy: i64) -> Result<(), ComputerError> {
        debug!(x, y, dx, dy, "scroll");
        let driver = self.live();
        driver.mouse_move(x, y).await?;
        driver.evaluate(&format!("window.scrollBy({dx}, {dy})")).await
    }

    async fn type_text(&self, text: &str) -> Result<(), ComputerError> {
        debug!(chars = text.chars().count(), "type");
        self.live().type_text(text).await
    }

    async fn wait(&self) -> Result<(), ComputerError> {
        tokio::time::sleep(self.config.wait_interval).await;
        Ok(())
    }

    async fn move_to(&self, x: i64, y: i64) -> Result<(), ComputerError> {
        debug!(x, y, "move");
        self.live().mouse_move(x, y).await
    }

    async fn keypress(&self, keys: &[String]) -> Result<(), ComputerError> {
        debug!(?keys, "keypress");
        let driver = self.live();
        for key in keys {
            driver.key_press(keymap::translate(key)).await?;
        }
        Ok(())
    }

    async fn drag(&self, path: &[Point]) -> Result<(), ComputerError> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(());
        };
        debug!(points = path.len(), "drag");
        let driver = self.live();
        driver.mouse_move(first.x, first.y).await?;
        driver.mouse_down(MouseButton::Left).await?;
        for p in rest {
            if let Err(e) = driver.mouse_move(p.x, p.y).await {
                // Leave the pointer released so the session stays usable.
                if let Err(up_err) = driver.mouse_up(MouseButton::Left).await {
                    warn!(error = %up_err, "release after failed drag");
                }
                return Err(e);
            }
        }
        driver.mouse_up(MouseButton::Left).await
    }
}

/// Starts a [`LocalComputer`], runs `body` against it, and stops it on every
/// exit path: success, error, or panic (the panic resumes after cleanup).
///
/// ```no_run
/// # use browser_computer::{with_computer, ChromiumDriver, Computer, ComputerConfig, ComputerError};
/// # async fn demo() -> Result<(), ComputerError> {
/// let shot = with_computer(ChromiumDriver::new(), ComputerConfig::default(), |c| {
///     Box::pin(async move { c.screenshot().await })
/// })
/// .await?;
/// # Ok(()) }
/// ```
pub async fn with_computer<D, T, E, F>(driver: D, config: ComputerConfig, body: F) -> Result<T, E>
where
    D: Driver,
    E: From<ComputerError>,
    F: for<'a> FnOnce(&'a LocalComputer<D>) -> BoxFuture<'a, Result<T, E>>,
{
    let mut computer = LocalComputer::new(driver, config);
    computer.start().await?;
    let outcome = AssertUnwindSafe(body(&computer)).catch_unwind().await;
    computer.stop().await;
    match outcome {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
