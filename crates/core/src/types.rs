use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// A width/height pair in pixels, written as `WIDTHxHEIGHT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is smaller than the matching side of `min`.
    pub fn falls_short_of(&self, min: &Resolution) -> bool {
        self.width < min.width || self.height < min.height
    }

    /// True when either side is larger than the matching side of `max`.
    pub fn exceeds(&self, max: &Resolution) -> bool {
        self.width > max.width || self.height > max.height
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = ConfigError;

    /// Parse `"300x300"` style strings. Both sides must be plain decimal
    /// digits; signs, spaces around the `x` and extra parts are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ConfigError::Parse(s.to_string());

        let (width, height) = s.trim().split_once('x').ok_or_else(err)?;
        let side = |part: &str| -> Result<u32, ConfigError> {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            part.parse().map_err(|_| err())
        };

        Ok(Resolution::new(side(width)?, side(height)?))
    }
}
