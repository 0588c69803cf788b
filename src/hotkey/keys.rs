//! Modifier sets and virtual-key names.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Platform virtual-key code.
pub type KeyCode = u16;

pub const VK_TAB: KeyCode = 0x09;
pub const VK_RETURN: KeyCode = 0x0D;
pub const VK_ESCAPE: KeyCode = 0x1B;
pub const VK_SPACE: KeyCode = 0x20;
pub const VK_PRIOR: KeyCode = 0x21;
pub const VK_NEXT: KeyCode = 0x22;
pub const VK_END: KeyCode = 0x23;
pub const VK_HOME: KeyCode = 0x24;
pub const VK_LEFT: KeyCode = 0x25;
pub const VK_UP: KeyCode = 0x26;
pub const VK_RIGHT: KeyCode = 0x27;
pub const VK_DOWN: KeyCode = 0x28;
pub const VK_INSERT: KeyCode = 0x2D;
pub const VK_DELETE: KeyCode = 0x2E;
pub const VK_F1: KeyCode = 0x70;

/// One modifier key of a hotkey combination. Serialized by variant name;
/// deserialization also accepts the aliases [`Modifier::parse`] knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Modifier {
    Alt,
    Control,
    Shift,
    Super,
}

impl Modifier {
    pub const ALL: [Modifier; 4] = [
        Modifier::Alt,
        Modifier::Control,
        Modifier::Shift,
        Modifier::Super,
    ];

    pub const fn bit(self) -> u16 {
        match self {
            Modifier::Alt => 0x1,
            Modifier::Control => 0x2,
            Modifier::Shift => 0x4,
            Modifier::Super => 0x8,
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "alt" => Some(Modifier::Alt),
            "ctrl" | "control" => Some(Modifier::Control),
            "shift" => Some(Modifier::Shift),
            "win" | "super" | "meta" => Some(Modifier::Super),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Modifier::Alt => "Alt",
            Modifier::Control => "Ctrl",
            Modifier::Shift => "Shift",
            Modifier::Super => "Win",
        }
    }
}

impl TryFrom<String> for Modifier {
    type Error = AppError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Modifier::parse(&name)
            .ok_or_else(|| AppError::Settings(format!("unknown modifier `{}`", name.trim())))
    }
}

/// A set of modifiers, laid out as the `WM_HOTKEY` low-word bitmask.
///
/// Bits outside the four known modifiers are preserved so that decoding a
/// notification never loses information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(u16);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const ALT: Modifiers = Modifiers(Modifier::Alt.bit());
    pub const CONTROL: Modifiers = Modifiers(Modifier::Control.bit());
    pub const SHIFT: Modifiers = Modifiers(Modifier::Shift.bit());
    pub const SUPER: Modifiers = Modifiers(Modifier::Super.bit());

    pub const fn from_bits(bits: u16) -> Self {
        Modifiers(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, modifier: Modifier) -> bool {
        self.0 & modifier.bit() != 0
    }

    pub const fn with(self, modifier: Modifier) -> Self {
        Modifiers(self.0 | modifier.bit())
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Modifier> {
        Modifier::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

impl FromIterator<Modifier> for Modifiers {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        iter.into_iter().fold(Modifiers::NONE, Modifiers::with)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.iter().map(Modifier::label).collect();
        f.write_str(&labels.join("+"))
    }
}

/// Resolves a key name such as `N`, `f5` or `PageUp` to its virtual-key code.
pub fn parse_key_name(name: &str) -> AppResult<KeyCode> {
    let upper = name.trim().to_ascii_uppercase();
    let code = match upper.as_str() {
        "SPACE" => Some(VK_SPACE),
        "ENTER" | "RETURN" => Some(VK_RETURN),
        "TAB" => Some(VK_TAB),
        "ESC" | "ESCAPE" => Some(VK_ESCAPE),
        "LEFT" => Some(VK_LEFT),
        "UP" => Some(VK_UP),
        "RIGHT" => Some(VK_RIGHT),
        "DOWN" => Some(VK_DOWN),
        "HOME" => Some(VK_HOME),
        "END" => Some(VK_END),
        "PAGEUP" | "PRIOR" => Some(VK_PRIOR),
        "PAGEDOWN" | "NEXT" => Some(VK_NEXT),
        "INSERT" | "INS" => Some(VK_INSERT),
        "DELETE" | "DEL" => Some(VK_DELETE),
        s if s.len() == 1 => s
            .chars()
            .next()
            .filter(char::is_ascii_alphanumeric)
            .map(|ch| ch as KeyCode),
        // Digit keys are also accepted in their `D5` form.
        s if s.len() == 2 && s.starts_with('D') && s.as_bytes()[1].is_ascii_digit() => {
            Some(s.as_bytes()[1] as KeyCode)
        }
        s if s.starts_with('F') => match s[1..].parse::<KeyCode>() {
            Ok(n) if (1..=24).contains(&n) => Some(VK_F1 + n - 1),
            _ => None,
        },
        _ => None,
    };
    code.ok_or_else(|| AppError::UnknownKey(name.trim().to_string()))
}

/// Display name for a virtual-key code, the inverse of [`parse_key_name`].
pub fn key_name(code: KeyCode) -> String {
    match code {
        VK_SPACE => "Space".into(),
        VK_RETURN => "Enter".into(),
        VK_TAB => "Tab".into(),
        VK_ESCAPE => "Escape".into(),
        VK_LEFT => "Left".into(),
        VK_UP => "Up".into(),
        VK_RIGHT => "Right".into(),
        VK_DOWN => "Down".into(),
        VK_HOME => "Home".into(),
        VK_END => "End".into(),
        VK_PRIOR => "PageUp".into(),
        VK_NEXT => "PageDown".into(),
        VK_INSERT => "Insert".into(),
        VK_DELETE => "Delete".into(),
        0x30..=0x39 | 0x41..=0x5A => char::from(code as u8).to_string(),
        c if (VK_F1..VK_F1 + 24).contains(&c) => format!("F{}", c - VK_F1 + 1),
        other => format!("0x{other:02X}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_letters_and_digits() {
        assert_eq!(parse_key_name("N").unwrap(), 0x4E);
        assert_eq!(parse_key_name("n").unwrap(), 0x4E);
        assert_eq!(parse_key_name(" 7 ").unwrap(), 0x37);
        assert_eq!(parse_key_name("D7").unwrap(), 0x37);
    }

    #[test]
    fn parses_function_keys() {
        assert_eq!(parse_key_name("F1").unwrap(), 0x70);
        assert_eq!(parse_key_name("f12").unwrap(), 0x7B);
        assert_eq!(parse_key_name("F24").unwrap(), 0x87);
        assert!(parse_key_name("F25").is_err());
        assert!(parse_key_name("F0").is_err());
    }

    #[test]
    fn parses_named_keys() {
        assert_eq!(parse_key_name("space").unwrap(), VK_SPACE);
        assert_eq!(parse_key_name("Return").unwrap(), VK_RETURN);
        assert_eq!(parse_key_name("PageDown").unwrap(), VK_NEXT);
    }

    #[test]
    fn rejects_unknown_names() {
        let err = parse_key_name("Banana").unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_KEY");
        assert!(parse_key_name("").is_err());
        assert!(parse_key_name("?").is_err());
    }

    #[test]
    fn key_names_invert_parsing() {
        for name in ["N", "7", "F5", "Space", "Enter", "PageUp", "Delete"] {
            assert_eq!(key_name(parse_key_name(name).unwrap()), name);
        }
        assert_eq!(key_name(0xFF), "0xFF");
    }

    #[test]
    fn modifier_bits_match_hotkey_layout() {
        assert_eq!(Modifiers::ALT.bits(), 1);
        assert_eq!(Modifiers::CONTROL.bits(), 2);
        assert_eq!(Modifiers::SHIFT.bits(), 4);
        assert_eq!(Modifiers::SUPER.bits(), 8);
    }

    #[test]
    fn modifiers_display_in_fixed_order() {
        let mods: Modifiers = [Modifier::Super, Modifier::Control].into_iter().collect();
        assert_eq!(mods.to_string(), "Ctrl+Win");
        assert_eq!(Modifiers::NONE.to_string(), "");
    }

    #[test]
    fn modifier_names_are_case_insensitive() {
        assert_eq!(Modifier::parse("WIN"), Some(Modifier::Super));
        assert_eq!(Modifier::parse("ctrl"), Some(Modifier::Control));
        assert_eq!(Modifier::parse("hyper"), None);
    }

    #[test]
    fn modifiers_deserialize_from_aliases_and_serialize_canonically() {
        let mods: Vec<Modifier> = serde_json::from_str(r#"["Win", "ctrl", "Super", "Alt"]"#).unwrap();
        assert_eq!(
            mods,
            vec![Modifier::Super, Modifier::Control, Modifier::Super, Modifier::Alt]
        );
        assert_eq!(
            serde_json::to_string(&[Modifier::Super, Modifier::Control]).unwrap(),
            r#"["Super","Control"]"#
        );

        let err = serde_json::from_str::<Modifier>(r#""Hyper""#).unwrap_err();
        assert!(err.to_string().contains("unknown modifier `Hyper`"));
    }
}
