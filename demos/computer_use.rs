//! Replays computer calls against a local Chromium.
//!
//! Reads one `computer_call` JSON object per line from stdin and prints one
//! `computer_call_output` per line (image data truncated) to stdout:
//!
//! ```bash
//! echo '{"call_id":"1","action":{"type":"keypress","keys":["CTRL","L"]}}' \
//!   | RUST_LOG=debug cargo run --example computer_use
//! ```

use anyhow::{Context, Result};
use browser_computer::{with_computer, ChromiumDriver, ComputerConfig, ComputerTool};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut cfg = ComputerConfig::default();
    if std::env::var("COMPUTER_START_URL").is_err() {
        cfg.start_url = "https://github.com/openai/openai-agents-python".into();
    }

    let handled = with_computer(ChromiumDriver::new(), cfg, |computer| {
        Box::pin(async move {
            info!(url = %computer.config().start_url, "session ready");
            let tool = ComputerTool::new(computer);
            println!("{}", tool.definition());

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let mut handled = 0usize;
            while let Some(line) = lines.next_line().await.context("reading stdin")? {
                if line.trim().is_empty() {
                    continue;
                }
                let call: serde_json::Value =
                    serde_json::from_str(&line).context("computer call is not JSON")?;
                match tool.call_value(call).await {
                    Ok(out) => {
                        let url = &out.output.image_url;
                        println!(
                            "{}",
                            json!({
                                "type": out.r#type,
                                "call_id": out.call_id,
                                "image_url": format!("{}...", &url[..url.len().min(48)]),
                                "image_len": url.len(),
                            })
                        );
                        handled += 1;
                    }
                    // Per-call failures are reported and the session carries on.
                    Err(e) => warn!(error = %e, "computer call failed"),
                }
            }
            Ok::<_, anyhow::Error>(handled)
        })
    })
    .await?;

    info!(handled, "done");
    Ok(())
}
