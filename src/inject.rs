use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

/// Anchor embedded in the page where the Maps key belongs.
pub const PLACEHOLDER: &str = "YOUR_GOOGLE_MAPS_API_KEY";
/// Used when no key is configured. Same text as the placeholder, so a fallback
/// run leaves the document unchanged.
pub const FALLBACK_KEY: &str = "YOUR_GOOGLE_MAPS_API_KEY";
pub const API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

pub const CONFIRMATION: &str = "✅ Build complete - API keys injected";

#[derive(Clone, PartialEq, Eq)]
pub enum ApiKey {
    Configured(String),
    Fallback,
}

impl ApiKey {
    /// An empty value counts as unset.
    pub fn resolve(value: Option<String>) -> Self {
        match value {
            Some(key) if !key.is_empty() => ApiKey::Configured(key),
            _ => ApiKey::Fallback,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ApiKey::Configured(key) => key,
            ApiKey::Fallback => FALLBACK_KEY,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ApiKey::Fallback)
    }
}

// Keys end up in logs via `Config`'s Debug impl.
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiKey::Configured(_) => f.write_str("Configured(***)"),
            ApiKey::Fallback => f.write_str("Fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    pub replacements: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectReport {
    pub path: PathBuf,
    pub replacements: usize,
    pub used_fallback: bool,
}

#[derive(Debug, Error)]
pub enum InjectError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("no API key configured (set GOOGLE_MAPS_API_KEY or pass --api-key)")]
    MissingKey,
}

/// Replaces every occurrence of [`PLACEHOLDER`] with `value`, verbatim.
pub fn substitute(text: &str, value: &str) -> Substitution {
    let replacements = text.matches(PLACEHOLDER).count();
    if replacements == 0 {
        return Substitution {
            text: text.to_owned(),
            replacements,
        };
    }
    Substitution {
        text: text.replace(PLACEHOLDER, value),
        replacements,
    }
}

/// Reads `path`, substitutes the key and writes the result back in place.
///
/// The file is rewritten even when it contains no placeholder. Nothing is
/// staged or backed up: a failed write leaves whatever the filesystem left.
pub fn inject_file(path: &Path, key: &ApiKey) -> Result<InjectReport, InjectError> {
    let original = fs::read_to_string(path).map_err(|source| InjectError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let substitution = substitute(&original, key.as_str());

    fs::write(path, substitution.text).map_err(|source| InjectError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    if key.is_fallback() && substitution.replacements > 0 {
        warn!(
            path = %path.display(),
            "{} is not set; page still carries the placeholder key",
            API_KEY_ENV
        );
    }
    debug!(
        path = %path.display(),
        replacements = substitution.replacements,
        "placeholder substitution written"
    );

    Ok(InjectReport {
        path: path.to_path_buf(),
        replacements: substitution.replacements,
        used_fallback: key.is_fallback(),
    })
}
