//! State ID type representing a dot-separated object path

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Characters the host refuses inside an ID segment
const FORBIDDEN_CHARS: &[char] = &['*', '?', '[', ']', '"', '\'', ','];

/// Error type for invalid state IDs
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateIdError {
    #[error("state id cannot be empty")]
    Empty,

    #[error("state id contains an empty segment")]
    EmptySegment,

    #[error("state id segment '{0}' contains invalid characters")]
    InvalidChars(String),
}

/// A hierarchical state/object ID (e.g., "0_userdata.0.Scripte.Heartbeat")
///
/// IDs are a non-empty list of segments joined by `.`. Segments may not be
/// empty and may not contain whitespace or any of `* ? [ ] " ' ,`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateId {
    segments: Vec<String>,
}

impl StateId {
    /// Create a new StateId from its segments
    pub fn new<I, S>(segments: I) -> Result<Self, StateIdError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(StateIdError::Empty);
        }
        for segment in &segments {
            Self::validate_segment(segment)?;
        }
        Ok(Self { segments })
    }

    /// Append a child segment (or a dotted sub-path) to this ID
    pub fn child(&self, path: &str) -> Result<Self, StateIdError> {
        let mut segments = self.segments.clone();
        for segment in path.split('.') {
            Self::validate_segment(segment)?;
            segments.push(segment.to_string());
        }
        Ok(Self { segments })
    }

    /// The last segment, used as the default display name
    pub fn name(&self) -> &str {
        // segments is never empty
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// The parent ID, or None for a single-segment ID
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// All segments in order
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Check whether this ID lies below `other`
    pub fn starts_with(&self, other: &StateId) -> bool {
        self.segments.len() > other.segments.len()
            && self.segments[..other.segments.len()] == other.segments[..]
    }

    fn validate_segment(segment: &str) -> Result<(), StateIdError> {
        if segment.is_empty() {
            return Err(StateIdError::EmptySegment);
        }
        if segment
            .chars()
            .any(|c| c.is_whitespace() || FORBIDDEN_CHARS.contains(&c))
        {
            return Err(StateIdError::InvalidChars(segment.to_string()));
        }
        Ok(())
    }
}

/// Last path segment of a raw ID string
pub fn last_segment(id: &str) -> &str {
    id.rsplit('.').next().unwrap_or(id)
}

impl FromStr for StateId {
    type Err = StateIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(StateIdError::Empty);
        }
        Self::new(s.split('.'))
    }
}

impl TryFrom<String> for StateId {
    type Error = StateIdError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<StateId> for String {
    fn from(id: StateId) -> String {
        id.to_string()
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}
