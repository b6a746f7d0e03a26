//! Arbitrary-width unsigned integers carried as decimal strings.
//!
//! Order amounts, fees, salts and expirations are 256-bit values. They are
//! never converted to a native numeric type: the digits received are the
//! digits forwarded, and they always go out as JSON strings.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Unsigned integer kept as its base-10 digit string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UintString(String);

impl UintString {
    /// Parse a base-10 digit string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the input is empty or contains anything
    /// other than ASCII digits.
    pub fn parse(digits: &str) -> Result<Self, Error> {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Parse(format!(
                "expected unsigned decimal integer, got {digits:?}"
            )));
        }
        Ok(Self(digits.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for UintString {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<u64> for UintString {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for UintString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for UintString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UintString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(UintVisitor)
    }
}

struct UintVisitor;

impl<'de> Visitor<'de> for UintVisitor {
    type Value = UintString;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a decimal string or an unsigned integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        UintString::parse(v).map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(UintString::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(UintString::from)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    // Floats have already lost precision by the time they reach us.
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Err(E::invalid_type(de::Unexpected::Float(v), &self))
    }
}
