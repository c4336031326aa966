use crate::action::Action;
use crate::computer::Computer;
use crate::error::ComputerError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// A `computer_call` item as emitted by a computer-use model.
#[derive(Clone, Debug, Deserialize)]
pub struct ComputerCall {
    pub call_id: String,
    pub action: Value,
    #[serde(default)]
    pub pending_safety_checks: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CallAction {
    Screenshot,
    Act(Action),
}

impl CallAction {
    pub fn decode(v: &Value) -> Result<Self, ComputerError> {
        let kind = v
            .get("type")
            .and_then(|x| x.as_str())
            .ok_or_else(|| ComputerError::InvalidCall("action without type".into()))?;
        if kind == "screenshot" {
            return Ok(CallAction::Screenshot);
        }
        serde_json::from_value(v.clone())
            .map(CallAction::Act)
            .map_err(|e| ComputerError::InvalidCall(format!("{kind}: {e}")))
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct InputImage {
    pub r#type: String, // "input_image"
    pub image_url: String,
}

/// Reply to a [`ComputerCall`]: the screen after the action ran.
#[derive(Debug, Serialize, PartialEq)]
pub struct ComputerCallOutput {
    pub r#type: String, // "computer_call_output"
    pub call_id: String,
    pub output: InputImage,
    pub acknowledged_safety_checks: Vec<Value>,
}

/// Binds a [`Computer`] to the hosted computer-use tool protocol.
pub struct ComputerTool<'a> {
    computer: &'a dyn Computer,
}

impl<'a> ComputerTool<'a> {
    pub fn new(computer: &'a dyn Computer) -> Self {
        Self { computer }
    }

    /// Tool descriptor advertised to the model.
    pub fn definition(&self) -> Value {
        let dims = self.computer.dimensions();
        json!({
            "type": "computer_use_preview",
            "display_width": dims.width,
            "display_height": dims.height,
            "environment": self.computer.environment().as_str(),
        })
    }

    /// Runs the call's action (a bare `screenshot` runs nothing), then
    /// captures the screen. Pending safety checks are acknowledged as-is.
    pub async fn call(&self, call: &ComputerCall) -> Result<ComputerCallOutput, ComputerError> {
        let action = CallAction::decode(&call.action)?;
        if let CallAction::Act(action) = &action {
            info!(call_id = %call.call_id, action = action.name(), "computer call");
            self.computer.perform(action).await?;
        }
        let b64 = self.computer.screenshot().await?;
        Ok(ComputerCallOutput {
            r#type: "computer_call_output".into(),
            call_id: call.call_id.clone(),
            output: InputImage {
                r#type: "input_image".into(),
                image_url: format!("data:image/png;base64,{b64}"),
            },
            acknowledged_safety_checks: call.pending_safety_checks.clone(),
        })
    }

    /// Decodes a raw `computer_call` item, then [`call`](Self::call)s it.
    pub async fn call_value(&self, v: Value) -> Result<ComputerCallOutput, ComputerError> {
        let call: ComputerCall = serde_json::from_value(v)
            .map_err(|e| ComputerError::InvalidCall(e.to_string()))?;
        self.call(&call).await
    }
}
