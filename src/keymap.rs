//! Abstract key names (as emitted by computer-use models) to browser key tokens.

const KEY_MAP: &[(&str, &str)] = &[
    ("alt", "Alt"),
    ("option", "Alt"),
    ("ctrl", "Control"),
    ("control", "Control"),
    ("cmd", "Meta"),
    ("meta", "Meta"),
    ("super", "Meta"),
    ("shift", "Shift"),
    ("enter", "Enter"),
    ("return", "Enter"),
    ("esc", "Escape"),
    ("escape", "Escape"),
    ("tab", "Tab"),
    ("space", " "),
    ("backspace", "Backspace"),
    ("delete", "Delete"),
    ("home", "Home"),
    ("end", "End"),
    ("pageup", "PageUp"),
    ("pagedown", "PageDown"),
    ("up", "ArrowUp"),
    ("arrowup", "ArrowUp"),
    ("down", "ArrowDown"),
    ("arrowdown", "ArrowDown"),
    ("left", "ArrowLeft"),
    ("arrowleft", "ArrowLeft"),
    ("right", "ArrowRight"),
    ("arrowright", "ArrowRight"),
];

/// Looks `key` up case-insensitively. Names not in the table are returned unchanged.
pub fn translate(key: &str) -> &str {
    KEY_MAP
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|(_, token)| *token)
        .unwrap_or(key)
}
