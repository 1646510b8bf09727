//! Tagged storage paths.
//!
//! Every stored path is either a *local* reference (a bare filename
//! resolved against the working directory) or a *remote* reference
//! (`{category}/{name}` on a remote file server). The tag is decided
//! exactly once, when a raw string enters the system; everything
//! downstream carries the [`StoragePath`] value instead of re-sniffing
//! separators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A file reference tagged as local or remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StoragePath {
    /// A bare filename with no directory component.
    Local(String),
    /// `{category}/{name}` on a remote file server. `name` may itself
    /// contain further separators (e.g. nested result directories).
    Remote { category: String, name: String },
}

impl StoragePath {
    /// Build a remote reference directly.
    pub fn remote(category: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Remote {
            category: category.into(),
            name: name.into(),
        }
    }

    /// Build a local reference directly.
    pub fn local(name: impl Into<String>) -> Self {
        Self::Local(name.into())
    }

    /// Classify a raw string. Total: any input produces a value.
    ///
    /// A string containing a separator (`/` or `\`) is remote; backslashes
    /// are normalized to forward slashes and the first segment becomes the
    /// category. Anything else is a local filename.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.replace('\\', "/");
        match normalized.split_once('/') {
            Some((category, name)) if !category.is_empty() => Self::Remote {
                category: category.to_string(),
                name: name.to_string(),
            },
            // A leading separator carries no category; keep the rest as
            // the name under an empty-category remote would be ambiguous,
            // so treat it as a bare filename instead.
            Some((_, name)) => Self::Local(name.to_string()),
            None => Self::Local(normalized),
        }
    }

    /// The final path component, regardless of tag.
    pub fn basename(&self) -> &str {
        let full = match self {
            Self::Local(name) => name.as_str(),
            Self::Remote { name, .. } => name.as_str(),
        };
        full.rsplit('/').next().unwrap_or(full)
    }

    /// True when the value points at a remote file server.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(name) => f.write_str(name),
            Self::Remote { category, name } => write!(f, "{category}/{name}"),
        }
    }
}

impl FromStr for StoragePath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<String> for StoragePath {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<StoragePath> for String {
    fn from(path: StoragePath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_filename_is_local() {
        assert_eq!(StoragePath::parse("clip.mp4"), StoragePath::local("clip.mp4"));
    }

    #[test]
    fn separated_path_is_remote() {
        assert_eq!(
            StoragePath::parse("audio/ref.wav"),
            StoragePath::remote("audio", "ref.wav"),
        );
    }

    #[test]
    fn backslashes_normalize_to_remote() {
        assert_eq!(
            StoragePath::parse(r"model\face.mp4"),
            StoragePath::remote("model", "face.mp4"),
        );
    }

    #[test]
    fn nested_name_keeps_first_segment_as_category() {
        let p = StoragePath::parse("out/2024/abc.mp4");
        assert_eq!(p, StoragePath::remote("out", "2024/abc.mp4"));
        assert_eq!(p.basename(), "abc.mp4");
    }

    #[test]
    fn leading_separator_falls_back_to_local() {
        assert_eq!(StoragePath::parse("/clip.mp4"), StoragePath::local("clip.mp4"));
    }

    #[test]
    fn display_round_trips() {
        for raw in ["clip.mp4", "audio/ref.wav", "out/2024/abc.mp4"] {
            assert_eq!(StoragePath::parse(raw).to_string(), raw);
        }
    }

    #[test]
    fn basename_of_local_is_itself() {
        assert_eq!(StoragePath::local("voice.wav").basename(), "voice.wav");
    }
}
