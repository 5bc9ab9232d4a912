use rocket::request::FromParam;

use super::ballot::Digit;

/// A recognised key, from either the on-screen keypad or a physical keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(Digit),
    Confirm,
    Correct,
}

impl Key {
    /// Map a keyboard key name (as in DOM `KeyboardEvent.key`) to a kiosk
    /// key. Anything else is not a kiosk key.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Enter" => Some(Self::Confirm),
            "Backspace" | "Delete" | "Escape" => Some(Self::Correct),
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Digit::try_from(c).ok().map(Self::Digit),
                    _ => None,
                }
            }
        }
    }
}

impl<'a> FromParam<'a> for Key {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        Self::from_name(param).ok_or(param)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_names_map_to_keys() {
        assert_eq!(Key::from_name("Enter"), Some(Key::Confirm));
        for name in ["Backspace", "Delete", "Escape"] {
            assert_eq!(Key::from_name(name), Some(Key::Correct));
        }
        assert_eq!(
            Key::from_name("7"),
            Some(Key::Digit(Digit::try_from('7').unwrap()))
        );
    }

    #[test]
    fn other_keys_are_ignored() {
        for name in ["a", "Tab", "F5", "enter", "12", "", " "] {
            assert_eq!(Key::from_name(name), None, "{name:?}");
        }
    }
}
