use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

macro_rules! string_id_newtype {
    ($name:ident, $empty:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Result<Self, ProtocolError> {
                let raw = raw.into();
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err($empty);
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id_newtype!(SessionId, ProtocolError::EmptySessionId);
string_id_newtype!(VideoId, ProtocolError::EmptyVideoId);

/// Remote processing progress, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(u8);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);
    pub const COMPLETE: Percentage = Percentage(100);

    pub fn new(value: u8) -> Result<Self, ProtocolError> {
        if value > 100 {
            return Err(ProtocolError::ProgressOutOfRange(f64::from(value)));
        }
        Ok(Self(value))
    }

    /// Parses a bare progress body such as `42` or `42.3`. Fractions round up.
    pub fn parse(body: &str) -> Result<Self, ProtocolError> {
        let trimmed = body.trim();
        let raw: f64 = trimmed
            .parse()
            .map_err(|_| ProtocolError::InvalidProgress(trimmed.to_string()))?;
        if !raw.is_finite() || !(0.0..=100.0).contains(&raw) {
            return Err(ProtocolError::ProgressOutOfRange(raw));
        }
        Ok(Self(raw.ceil() as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_complete(self) -> bool {
        self.0 >= 100
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}
