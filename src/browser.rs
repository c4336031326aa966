use crate::action::MouseButton;
use crate::config::ComputerConfig;
use crate::driver::Driver;
use crate::error::ComputerError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as OxideBrowser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
    DispatchMouseEventType, MouseButton as CdpButton,
};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use nanoid::nanoid;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, Default)]
struct Pointer {
    x: f64,
    y: f64,
    held: Option<MouseButton>,
}

/// [`Driver`] over a Chromium instance speaking the DevTools protocol.
#[derive(Default)]
pub struct ChromiumDriver {
    browser: Option<OxideBrowser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
    profile_dir: Option<PathBuf>,
    owns_browser: bool,
    pointer: Mutex<Pointer>,
}

impl ChromiumDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn page(&self) -> &Page {
        self.page
            .as_ref()
            .expect("chromium page used before launch() completed")
    }

    async fn browser_config(&mut self, cfg: &ComputerConfig) -> Result<BrowserConfig, ComputerError> {
        let mut builder = BrowserConfig::builder()
            .window_size(cfg.dimensions.width, cfg.dimensions.height);
        if !cfg.headless {
            builder = builder.with_head();
        }
        // A fresh profile per launch avoids the ProcessSingleton lock when
        // Chromium is restarted quickly or several sessions run side by side.
        let profile_dir = std::env::temp_dir()
            .join(format!("browser-computer-{}-{}", std::process::id(), nanoid!(8)));
        tokio::fs::create_dir_all(&profile_dir)
            .await
            .map_err(ComputerError::start("profile dir"))?;
        self.profile_dir = Some(profile_dir.clone());
        builder
            .user_data_dir(profile_dir)
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .build()
            .map_err(ComputerError::start("browser config"))
    }

    async fn send_mouse(
        &self,
        action: &'static str,
        params: Result<DispatchMouseEventParams, String>,
    ) -> Result<(), ComputerError> {
        let params = params.map_err(ComputerError::backend(action))?;
        self.page()
            .execute(params)
            .await
            .map_err(ComputerError::backend(action))?;
        Ok(())
    }

    async fn send_key(
        &self,
        action: &'static str,
        def: &KeyDef,
    ) -> Result<(), ComputerError> {
        let down_kind = if def.text.is_some() {
            DispatchKeyEventType::KeyDown
        } else {
            DispatchKeyEventType::RawKeyDown
        };
        for (kind, with_text) in [(down_kind, true), (DispatchKeyEventType::KeyUp, false)] {
            let params = def
                .event(kind, with_text)
                .map_err(ComputerError::backend(action))?;
            self.page()
                .execute(params)
                .await
                .map_err(ComputerError::backend(action))?;
        }
        Ok(())
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        // The browser kills its own child process on drop; the handler task
        // would otherwise outlive a cancelled session.
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }
}

#[async_trait]
impl Driver for ChromiumDriver {
    async fn launch(&mut self, cfg: &ComputerConfig) -> Result<(), ComputerError> {
        let (browser, mut handler) = match &cfg.connect_url {
            Some(ws) => {
                self.owns_browser = false;
                OxideBrowser::connect(ws.as_str())
                    .await
                    .map_err(ComputerError::start("connect"))?
            }
            None => {
                self.owns_browser = true;
                let bcfg = self.browser_config(cfg).await?;
                OxideBrowser::launch(bcfg)
                    .await
                    .map_err(ComputerError::start("launch"))?
            }
        };
        self.handler = Some(tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "devtools handler error");
                }
            }
        }));

        let browser = self.browser.insert(browser);
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(ComputerError::start("new page"))?;
        self.page = Some(page.clone());

        if let Some(ua) = &cfg.user_agent {
            page.set_user_agent(ua.clone())
                .await
                .map_err(ComputerError::start("user agent"))?;
        }
        let metrics = SetDeviceMetricsOverrideParams::builder()
            .width(cfg.dimensions.width as i64)
            .height(cfg.dimensions.height as i64)
            .device_scale_factor(1.0)
            .mobile(false)
            .build()
            .map_err(ComputerError::start("viewport"))?;
        page.execute(metrics)
            .await
            .map_err(ComputerError::start("viewport"))?;

        page.goto(cfg.start_url.as_str())
            .await
            .map_err(ComputerError::start("navigate"))?;
        page.wait_for_navigation()
            .await
            .map_err(ComputerError::start("navigate"))?;
        info!(url = %cfg.start_url, attached = !self.owns_browser, "chromium page ready");
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ComputerError> {
        let mut first_err = None;
        if let Some(page) = self.page.take() {
            // An owned browser takes its pages down with it.
            if !self.owns_browser {
                if let Err(e) = page.close().await {
                    first_err.get_or_insert(ComputerError::backend("close page")(e));
                }
            }
        }
        if let Some(mut browser) = self.browser.take() {
            if self.owns_browser {
                if let Err(e) = browser.close().await {
                    first_err.get_or_insert(ComputerError::backend("close browser")(e));
                }
                if let Err(e) = browser.wait().await {
                    first_err.get_or_insert(ComputerError::backend("close browser")(e));
                }
            }
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
            let _ = handler.await;
        }
        if let Some(dir) = self.profile_dir.take() {
            if let Err(e) = tokio::fs::remove_dir_all(&dir).await {
                debug!(dir = %dir.display(), error = %e, "profile dir not removed");
            }
        }
        *self.pointer.lock().await = Pointer::default();
        first_err.map_or(Ok(()), Err)
    }

    async fn capture_png(&self) -> Result<Vec<u8>, ComputerError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(false)
            .build();
        self.page()
            .screenshot(params)
            .await
            .map_err(ComputerError::backend("screenshot"))
    }

    async fn mouse_move(&self, x: i64, y: i64) -> Result<(), ComputerError> {
        let mut pointer = self.pointer.lock().await;
        let mut cmd = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseMoved)
            .x(x as f64)
            .y(y as f64);
        // Moves while a button is held must carry it, or drag handlers never fire.
        if let Some(held) = pointer.held {
            cmd = cmd.button(cdp_button(held)).buttons(buttons_mask(held));
        }
        self.send_mouse("move", cmd.build()).await?;
        pointer.x = x as f64;
        pointer.y = y as f64;
        Ok(())
    }

    async fn mouse_click(
        &self,
        x: i64,
        y: i64,
        button: MouseButton,
        click_count: u32,
    ) -> Result<(), ComputerError> {
        // A click starts from a released pointer, whatever an aborted drag left behind.
        self.pointer.lock().await.held = None;
        self.mouse_move(x, y).await?;
        for count in 1..=click_count as i64 {
            let cmd = DispatchMouseEventParams::builder()
                .x(x as f64)
                .y(y as f64)
                .button(cdp_button(button))
                .click_count(count);
            self.send_mouse(
                "click",
                cmd.clone()
                    .r#type(DispatchMouseEventType::MousePressed)
                    .buttons(buttons_mask(button))
                    .build(),
            )
            .await?;
            self.send_mouse(
                "click",
                cmd.r#type(DispatchMouseEventType::MouseReleased).buttons(0).build(),
            )
            .await?;
        }
        Ok(())
    }

    async fn mouse_down(&self, button: MouseButton) -> Result<(), ComputerError> {
        let mut pointer = self.pointer.lock().await;
        let cmd = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MousePressed)
            .x(pointer.x)
            .y(pointer.y)
            .button(cdp_button(button))
            .buttons(buttons_mask(button))
            .click_count(1);
        self.send_mouse("mouse down", cmd.build()).await?;
        pointer.held = Some(button);
        Ok(())
    }

    async fn mouse_up(&self, button: MouseButton) -> Result<(), ComputerError> {
        let mut pointer = self.pointer.lock().await;
        let cmd = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseReleased)
            .x(pointer.x)
            .y(pointer.y)
            .button(cdp_button(button))
            .buttons(0)
            .click_count(1);
        // Cleared even if the release fails, so later moves stop carrying the button.
        pointer.held = None;
        self.send_mouse("mouse up", cmd.build()).await
    }

    async fn key_press(&self, key: &str) -> Result<(), ComputerError> {
        self.send_key("keypress", &KeyDef::for_key(key)).await
    }

    async fn type_text(&self, text: &str) -> Result<(), ComputerError> {
        for c in text.chars() {
            self.send_key("type", &KeyDef::for_char(c)).await?;
        }
        Ok(())
    }

    async fn evaluate(&self, script: &str) -> Result<(), ComputerError> {
        let eval = EvaluateParams::builder()
            .expression(script)
            .build()
            .map_err(ComputerError::backend("evaluate"))?;
        let resp = self
            .page()
            .execute(eval)
            .await
            .map_err(ComputerError::backend("evaluate"))?;
        if let Some(exception) = &resp.result.exception_details {
            return Err(ComputerError::Backend {
                action: "evaluate",
                reason: exception.text.clone(),
            });
        }
        Ok(())
    }
}

fn cdp_button(button: MouseButton) -> CdpButton {
    match button {
        MouseButton::Left => CdpButton::Left,
        MouseButton::Middle => CdpButton::Middle,
        MouseButton::Right => CdpButton::Right,
    }
}

fn buttons_mask(button: MouseButton) -> i64 {
    match button {
        MouseButton::Left => 1,
        MouseButton::Right => 2,
        MouseButton::Middle => 4,
    }
}

// (key, code, windows virtual key code, text)
const NAMED_KEYS: &[(&str, &str, i64, Option<&str>)] = &[
    ("Enter", "Enter", 13, Some("\r")),
    ("Tab", "Tab", 9, None),
    ("Escape", "Escape", 27, None),
    ("Backspace", "Backspace", 8, None),
    ("Delete", "Delete", 46, None),
    ("Insert", "Insert", 45, None),
    (" ", "Space", 32, Some(" ")),
    ("Shift", "ShiftLeft", 16, None),
    ("Control", "ControlLeft", 17, None),
    ("Alt", "AltLeft", 18, None),
    ("Meta", "MetaLeft", 91, None),
    ("Home", "Home", 36, None),
    ("End", "End", 35, None),
    ("PageUp", "PageUp", 33, None),
    ("PageDown", "PageDown", 34, None),
    ("ArrowLeft", "ArrowLeft", 37, None),
    ("ArrowUp", "ArrowUp", 38, None),
    ("ArrowRight", "ArrowRight", 39, None),
    ("ArrowDown", "ArrowDown", 40, None),
    ("F1", "F1", 112, None),
    ("F2", "F2", 113, None),
    ("F3", "F3", 114, None),
    ("F4", "F4", 115, None),
    ("F5", "F5", 116, None),
    ("F6", "F6", 117, None),
    ("F7", "F7", 118, None),
    ("F8", "F8", 119, None),
    ("F9", "F9", 120, None),
    ("F10", "F10", 121, None),
    ("F11", "F11", 122, None),
    ("F12", "F12", 123, None),
];

#[derive(Clone, Debug, PartialEq)]
struct KeyDef {
    key: String,
    code: Option<String>,
    key_code: Option<i64>,
    text: Option<String>,
}

impl KeyDef {
    fn for_key(key: &str) -> Self {
        if let Some(&(name, code, key_code, text)) =
            NAMED_KEYS.iter().find(|(name, ..)| *name == key)
        {
            return Self {
                key: name.to_string(),
                code: Some(code.to_string()),
                key_code: Some(key_code),
                text: text.map(str::to_string),
            };
        }
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::for_char(c),
            _ => Self { key: key.to_string(), code: None, key_code: None, text: None },
        }
    }

    fn for_char(c: char) -> Self {
        match c {
            ' ' => return Self::for_key(" "),
            '\n' | '\r' => return Self::for_key("Enter"),
            _ => {}
        }
        let (code, key_code) = if c.is_ascii_alphabetic() {
            let upper = c.to_ascii_uppercase();
            (Some(format!("Key{upper}")), Some(upper as i64))
        } else if c.is_ascii_digit() {
            (Some(format!("Digit{c}")), Some(c as i64))
        } else {
            (None, None)
        };
        Self { key: c.to_string(), code, key_code, text: Some(c.to_string()) }
    }

    fn event(
        &self,
        kind: DispatchKeyEventType,
        with_text: bool,
    ) -> Result<DispatchKeyEventParams, String> {
        let mut b = DispatchKeyEventParams::builder().r#type(kind).key(self.key.clone());
        if let Some(code) = &self.code {
            b = b.code(code.clone());
        }
        if let Some(key_code) = self.key_code {
            b = b
                .windows_virtual_key_code(key_code)
                .native_virtual_key_code(key_code);
        }
        if with_text {
            if let Some(text) = &self.text {
                b = b.text(text.clone()).unmodified_text(text.clone());
            }
        }
        b.build()
    }
}
