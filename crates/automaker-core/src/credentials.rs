use crate::error::{AutomakerError, Result};
use crate::types::{ApiKeys, Credentials};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Keys shorter than this are never partially revealed.
const MIN_MASKABLE_LEN: usize = 8;
const VISIBLE_CHARS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    Google,
    OpenAi,
}

impl Provider {
    pub fn all() -> &'static [Provider] {
        &[Provider::Anthropic, Provider::Google, Provider::OpenAi]
    }

    /// Key name used in `apiKeys`.
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
            Provider::OpenAi => "openai",
        }
    }

    pub fn key(self, keys: &ApiKeys) -> &str {
        match self {
            Provider::Anthropic => &keys.anthropic,
            Provider::Google => &keys.google,
            Provider::OpenAi => &keys.openai,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = AutomakerError;

    fn from_str(s: &str) -> Result<Self> {
        Provider::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| AutomakerError::UnknownProvider(s.to_string()))
    }
}

/// Redacted view of one key: first and last four characters only.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < MIN_MASKABLE_LEN {
        return String::new();
    }
    let head: String = chars[..VISIBLE_CHARS].iter().collect();
    let tail: String = chars[chars.len() - VISIBLE_CHARS..].iter().collect();
    format!("{head}...{tail}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaskedKey {
    pub configured: bool,
    pub masked: String,
}

impl MaskedKey {
    pub fn new(key: &str) -> Self {
        Self {
            configured: !key.is_empty(),
            masked: mask_key(key),
        }
    }
}

/// The only form in which credentials leave the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaskedCredentials {
    pub anthropic: MaskedKey,
    pub google: MaskedKey,
    pub openai: MaskedKey,
}

impl From<&Credentials> for MaskedCredentials {
    fn from(credentials: &Credentials) -> Self {
        let keys = &credentials.api_keys;
        Self {
            anthropic: MaskedKey::new(Provider::Anthropic.key(keys)),
            google: MaskedKey::new(Provider::Google.key(keys)),
            openai: MaskedKey::new(Provider::OpenAi.key(keys)),
        }
    }
}
