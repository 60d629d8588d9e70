//! Server version token

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `major.minor` version reported by the connected server
///
/// Used to pick between catalog query variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
}

impl ServerVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Whether the server exposes global variables
    pub fn supports_globals(&self) -> bool {
        self.major >= 2
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Error parsing a version string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid server version: {0}")]
pub struct VersionParseError(pub String);

impl FromStr for ServerVersion {
    type Err = VersionParseError;

    /// Accepts `3`, `3.1`, `3.1.0` and banners such as `EdgeDB 3.1+d2023`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s
            .split_whitespace()
            .find(|part| part.starts_with(|c: char| c.is_ascii_digit()))
            .ok_or_else(|| VersionParseError(s.to_string()))?;

        let numeric: String = token
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        let mut parts = numeric.split('.').filter(|p| !p.is_empty());
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| VersionParseError(s.to_string()))?;
        let minor = match parts.next() {
            Some(p) => p.parse().map_err(|_| VersionParseError(s.to_string()))?,
            None => 0,
        };

        Ok(Self { major, minor })
    }
}
