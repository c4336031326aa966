use crate::action::MouseButton;
use crate::config::ComputerConfig;
use crate::error::ComputerError;
use async_trait::async_trait;

/// Backend primitives a [`LocalComputer`](crate::computer::LocalComputer) is built from.
///
/// Coordinates are absolute viewport pixels. Key names are backend tokens
/// (`"Control"`, `"Enter"`, `"a"`), already translated by the key map.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Acquire the backend runtime, open a page sized to `cfg.dimensions`
    /// and navigate to `cfg.start_url`. Errors are `SessionStart`.
    async fn launch(&mut self, cfg: &ComputerConfig) -> Result<(), ComputerError>;

    /// Release whatever `launch` acquired, newest first. Must be a no-op when
    /// nothing is held.
    async fn close(&mut self) -> Result<(), ComputerError>;

    /// PNG bytes of the visible viewport.
    async fn capture_png(&self) -> Result<Vec<u8>, ComputerError>;

    async fn mouse_move(&self, x: i64, y: i64) -> Result<(), ComputerError>;

    /// Move to (x, y) then press and release `button` `click_count` times.
    async fn mouse_click(
        &self,
        x: i64,
        y: i64,
        button: MouseButton,
        click_count: u32,
    ) -> Result<(), ComputerError>;

    async fn mouse_down(&self, button: MouseButton) -> Result<(), ComputerError>;

    async fn mouse_up(&self, button: MouseButton) -> Result<(), ComputerError>;

    async fn key_press(&self, key: &str) -> Result<(), ComputerError>;

    /// One keystroke per character.
    async fn type_text(&self, text: &str) -> Result<(), ComputerError>;

    async fn evaluate(&self, script: &str) -> Result<(), ComputerError>;
}
