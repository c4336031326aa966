use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// Unrecognized names (`back`, `forward`, `wheel`, ...) become `Left`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "right" => MouseButton::Right,
            "middle" => MouseButton::Middle,
            _ => MouseButton::Left,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MouseButton::Left => "left",
            MouseButton::Middle => "middle",
            MouseButton::Right => "right",
        }
    }
}

impl From<String> for MouseButton {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl From<(i64, i64)> for Point {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

/// One input action, tagged the way computer-use models emit them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Click {
        x: i64,
        y: i64,
        #[serde(default)]
        button: MouseButton,
    },
    DoubleClick {
        x: i64,
        y: i64,
    },
    Scroll {
        x: i64,
        y: i64,
        #[serde(rename = "scroll_x", default)]
        dx: i64,
        #[serde(rename = "scroll_y", default)]
        dy: i64,
    },
    #[serde(rename = "type")]
    TypeText { text: String },
    Wait,
    Move {
        x: i64,
        y: i64,
    },
    #[serde(rename = "keypress")]
    KeyPress { keys: Vec<String> },
    Drag { path: Vec<Point> },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Click { .. } => "click",
            Action::DoubleClick { .. } => "double_click",
            Action::Scroll { .. } => "scroll",
            Action::TypeText { .. } => "type",
            Action::Wait => "wait",
            Action::Move { .. } => "move",
            Action::KeyPress { .. } => "keypress",
            Action::Drag { .. } => "drag",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(v: serde_json::Value) -> Action {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn click_button_falls_back_to_left() {
        assert_eq!(
            decode(json!({"type": "click", "x": 3, "y": 4, "button": "wheel"})),
            Action::Click { x: 3, y: 4, button: MouseButton::Left }
        );
        assert_eq!(
            decode(json!({"type": "click", "x": 3, "y": 4})),
            Action::Click { x: 3, y: 4, button: MouseButton::Left }
        );
        assert_eq!(
            decode(json!({"type": "click", "x": 3, "y": 4, "button": "right"})),
            Action::Click { x: 3, y: 4, button: MouseButton::Right }
        );
    }

    #[test]
    fn scroll_uses_wire_field_names() {
        assert_eq!(
            decode(json!({"type": "scroll", "x": 10, "y": 20, "scroll_x": 0, "scroll_y": -300})),
            Action::Scroll { x: 10, y: 20, dx: 0, dy: -300 }
        );
    }

    #[test]
    fn type_keypress_drag_and_wait() {
        assert_eq!(
            decode(json!({"type": "type", "text": "hello\n"})),
            Action::TypeText { text: "hello\n".into() }
        );
        assert_eq!(
            decode(json!({"type": "keypress", "keys": ["CTRL", "c"]})),
            Action::KeyPress { keys: vec!["CTRL".into(), "c".into()] }
        );
        assert_eq!(
            decode(json!({"type": "drag", "path": [{"x": 1, "y": 2}, {"x": 3, "y": 4}]})),
            Action::Drag { path: vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }] }
        );
        assert_eq!(decode(json!({"type": "wait"})), Action::Wait);
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(serde_json::from_value::<Action>(json!({"type": "teleport"})).is_err());
        assert!(serde_json::from_value::<Action>(json!({"type": "move", "x": 1})).is_err());
    }

    #[test]
    fn names_match_wire_tags() {
        let a = Action::DoubleClick { x: 0, y: 0 };
        assert_eq!(serde_json::to_value(&a).unwrap()["type"], a.name());
        let a = Action::KeyPress { keys: vec![] };
        assert_eq!(serde_json::to_value(&a).unwrap()["type"], a.name());
    }
}
