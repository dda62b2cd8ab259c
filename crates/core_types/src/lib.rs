use serde::{Deserialize, Serialize};
use std::fmt;

/// Settings generation. Bumped exactly when a sanitized preference snapshot differs from the
/// current one; per-element UI state recorded under an older generation is stale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl Generation {
    pub const INITIAL: Generation = Generation(0);

    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dictionary code, trimmed and ASCII-lowercased. Never empty.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DictCode(String);

impl DictCode {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(DictCode(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DictCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DictCode {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DictCode::parse(&value).ok_or("empty dictionary code")
    }
}

impl From<DictCode> for String {
    fn from(code: DictCode) -> Self {
        code.0
    }
}

impl AsRef<str> for DictCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
