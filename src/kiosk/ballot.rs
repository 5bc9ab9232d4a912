use std::fmt::{Display, Formatter};

use rocket::request::FromParam;
use serde::{Deserialize, Serialize};

/// Number of digits in a ballot number.
pub const CODE_LENGTH: usize = 2;

/// A single keypad digit, `0`–`9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digit(u8);

impl Digit {
    pub fn as_char(self) -> char {
        char::from(b'0' + self.0)
    }
}

impl TryFrom<char> for Digit {
    type Error = char;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        c.to_digit(10)
            .filter(|_| c.is_ascii_digit())
            .map(|d| Self(d as u8))
            .ok_or(c)
    }
}

impl<'a> FromParam<'a> for Digit {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        let mut chars = param.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Digit::try_from(c).map_err(|_| param),
            _ => Err(param),
        }
    }
}

/// The digits typed so far for the ballot in progress: never more than
/// [`CODE_LENGTH`] of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BallotNumber(String);

impl BallotNumber {
    /// Append a digit. Returns false, leaving the number unchanged, if it is
    /// already full.
    pub fn push(&mut self, digit: Digit) -> bool {
        if self.is_complete() {
            return false;
        }
        self.0.push(digit.as_char());
        true
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.0.len() >= CODE_LENGTH
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BallotNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
impl BallotNumber {
    /// Build a number by typing the given digits.
    pub fn typed(digits: &str) -> Self {
        let mut number = Self::default();
        for c in digits.chars() {
            number.push(Digit::try_from(c).unwrap());
        }
        number
    }
}
