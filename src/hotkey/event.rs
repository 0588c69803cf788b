use std::fmt;

use super::keys::{key_name, KeyCode, Modifiers};

/// Identifier issued by a registrar; starts at 1 and is never reused.
pub type HotkeyId = u32;

/// A modifier+key combination bound to an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HotkeyBinding {
    pub id: HotkeyId,
    pub modifiers: Modifiers,
    pub key: KeyCode,
}

impl fmt::Display for HotkeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_combination(f, self.modifiers, self.key)
    }
}

/// Raised once per OS hotkey notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPressedEvent {
    pub modifiers: Modifiers,
    pub key: KeyCode,
}

impl KeyPressedEvent {
    /// Decodes a `WM_HOTKEY` payload: low word is the modifier mask, high word the key.
    pub const fn from_payload(payload: u32) -> Self {
        Self {
            modifiers: Modifiers::from_bits((payload & 0xFFFF) as u16),
            key: ((payload >> 16) & 0xFFFF) as KeyCode,
        }
    }

    pub const fn payload(&self) -> u32 {
        ((self.key as u32) << 16) | self.modifiers.bits() as u32
    }
}

impl fmt::Display for KeyPressedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_combination(f, self.modifiers, self.key)
    }
}

fn write_combination(f: &mut fmt::Formatter<'_>, modifiers: Modifiers, key: KeyCode) -> fmt::Result {
    if modifiers.is_empty() {
        f.write_str(&key_name(key))
    } else {
        write!(f, "{}+{}", modifiers, key_name(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_modifier_mask_across_key_range() {
        for m in 0u16..=15 {
            for k in (0u32..=0xFFFF).step_by(97).chain([0xFFFF]) {
                let payload = (k << 16) | m as u32;
                let event = KeyPressedEvent::from_payload(payload);
                assert_eq!(event.modifiers.bits(), m);
                assert_eq!(event.key as u32, k);
            }
        }
    }

    #[test]
    fn payload_matches_notification_layout() {
        let event = KeyPressedEvent {
            modifiers: Modifiers::SUPER,
            key: 'F' as KeyCode,
        };
        assert_eq!(event.payload(), 0x0046_0008);
        assert_eq!(KeyPressedEvent::from_payload(0x0046_0008), event);
    }

    #[test]
    fn displays_as_combination() {
        let binding = HotkeyBinding {
            id: 1,
            modifiers: Modifiers::SUPER,
            key: 'N' as KeyCode,
        };
        assert_eq!(binding.to_string(), "Win+N");

        let bare = KeyPressedEvent {
            modifiers: Modifiers::NONE,
            key: 0x70,
        };
        assert_eq!(bare.to_string(), "F1");
    }
}
