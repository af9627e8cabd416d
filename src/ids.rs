//! Identifiers: request correlation ids and panel namespaces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Request correlation id, a ULID rendered in its canonical 26-char form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RequestId(Ulid);

impl RequestId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Reuse an incoming `x-request-id` when it is a valid ULID.
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or_default()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

impl From<RequestId> for String {
    fn from(id: RequestId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for RequestId {
    type Error = ulid::DecodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Fixed head of every panel id/class prefix.
pub const PANEL_PREFIX_STEM: &str = "___mdbg";

/// Per-response namespace for the panel's CSS ids and classes.
///
/// Three random characters are appended to [`PANEL_PREFIX_STEM`] so the panel
/// never collides with ids the host page already uses.
pub fn panel_prefix() -> String {
    // The tail of a ULID is its random component.
    let id = Ulid::new().to_string().to_ascii_lowercase();
    let tail = &id[id.len() - 3..];
    format!("{}{}", PANEL_PREFIX_STEM, tail)
}
