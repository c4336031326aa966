//! Runs against a real Chromium. `cargo test -- --ignored` with a browser installed.

use base64::{engine::general_purpose::STANDARD, Engine};
use browser_computer::{
    with_computer, ChromiumDriver, Computer, ComputerConfig, ComputerError, LocalComputer,
    MouseButton, Point,
};

fn page_config() -> ComputerConfig {
    ComputerConfig {
        headless: true,
        connect_url: None,
        start_url: "data:text/html,<textarea id=t autofocus style='width:600px;height:300px'></textarea>".into(),
        ..ComputerConfig::default()
    }
}

#[tokio::test]
#[ignore]
async fn screenshot_is_viewport_png() {
    let shot = with_computer(ChromiumDriver::new(), page_config(), |c| {
        Box::pin(async move { c.screenshot().await })
    })
    .await
    .unwrap();
    let png = STANDARD.decode(shot).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
#[ignore]
async fn actions_run_against_live_page() {
    let result: Result<(), ComputerError> = with_computer(ChromiumDriver::new(), page_config(), |c| {
        Box::pin(async move {
            c.click(50, 50, MouseButton::Left).await?;
            c.type_text("hello").await?;
            c.keypress(&["ctrl".to_string(), "a".to_string()]).await?;
            c.scroll(10, 10, 0, 100).await?;
            c.double_click(60, 60).await?;
            c.drag(&[Point { x: 10, y: 10 }, Point { x: 200, y: 120 }]).await?;
            c.move_to(5, 5).await
        })
    })
    .await;
    result.unwrap();
}

#[tokio::test]
#[ignore]
async fn unreachable_start_url_fails_start() {
    let mut computer = LocalComputer::chromium(ComputerConfig {
        start_url: "http://127.0.0.1:1/".into(),
        ..page_config()
    });
    let err = computer.start().await.unwrap_err();
    assert!(matches!(err, ComputerError::SessionStart(_)));
    computer.stop().await;
}
