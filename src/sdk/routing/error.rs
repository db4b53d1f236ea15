use chrono::{DateTime, Utc};
use std::{collections::BTreeMap, error::Error as StdError, fmt, sync::Arc, time::Duration};
use thiserror::Error;

use super::explain::Explain;

/// A raw intersection record or archive that could not be turned into an
/// `Intersection`. These are contract violations by whoever produced the
/// record, not failures reported by the routing service.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// A required field is missing or has the wrong type
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("location must hold exactly 2 values, got {0}")]
    CoordinateArity(usize),

    #[error("{field} index {index} is outside the {len} headings of the intersection")]
    BearingIndexOutOfBounds {
        field: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{entry} entry flags given for {headings} headings")]
    EntryLengthMismatch { entry: usize, headings: usize },

    #[error("impossible to access archive")]
    Io(#[from] std::io::Error),
}

/// Status line and headers of the HTTP response that carried a failure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseMetadata {
    pub status: u16,
    /// Header names are stored lowercased.
    headers: BTreeMap<String, String>,
}

impl ResponseMetadata {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.insert_header(name, value);
        self
    }

    pub fn insert_header(&mut self, name: &str, value: &str) {
        self.headers
            .insert(name.to_ascii_lowercase(), value.trim().to_string());
    }

    /// Looks a header up by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<&reqwest::blocking::Response> for ResponseMetadata {
    fn from(response: &reqwest::blocking::Response) -> Self {
        let mut metadata = Self::new(response.status().as_u16());
        for (name, value) in response.headers() {
            match value.to_str() {
                Ok(value) => metadata.insert_header(name.as_str(), value),
                Err(_) => log::debug!("Skipping non-ASCII header {}", name),
            }
        }
        metadata
    }
}

/// The error that made an `Unknown` failure happen, kept opaque.
///
/// Two causes compare equal when they have the same runtime type and render
/// the same description; their contents are never compared structurally.
#[derive(Clone)]
pub struct Cause {
    kind: &'static str,
    description: String,
    source: Arc<dyn StdError + Send + Sync>,
    explanation: Option<Arc<dyn Explain + Send + Sync>>,
}

impl Cause {
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            kind: std::any::type_name::<E>(),
            description: error.to_string(),
            source: Arc::new(error),
            explanation: None,
        }
    }

    /// Wraps an error that can explain itself, so that its failure reason and
    /// recovery suggestion surface through the `Unknown` error wrapping it.
    pub fn explained<E>(error: E) -> Self
    where
        E: StdError + Explain + Send + Sync + 'static,
    {
        let shared = Arc::new(error);
        Self {
            kind: std::any::type_name::<E>(),
            description: shared.to_string(),
            source: shared.clone(),
            explanation: Some(shared),
        }
    }

    /// Type name of the wrapped error.
    pub fn kind(&self) -> &str {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.source.as_ref()
    }

    pub(crate) fn explanation(&self) -> Option<&(dyn Explain + Send + Sync)> {
        self.explanation.as_deref()
    }
}

impl PartialEq for Cause {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.description == other.description
    }
}

impl Eq for Cause {}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cause")
            .field("kind", &self.kind)
            .field("description", &self.description)
            .finish()
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Why a directions request failed.
///
/// Equality is structural for every kind except `Unknown`, whose cause is
/// compared with the approximation documented on [`Cause`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectionsError {
    /// The server returned an empty body.
    NoData,
    /// The request parameters supplied by the caller are invalid.
    InvalidInput { message: Option<String> },
    /// The body could not be parsed into the expected shape.
    InvalidResponse,
    /// No path exists between the locations for the requested profile.
    UnableToRoute,
    /// The coordinates could not be matched to the road network.
    NoMatches,
    TooManyCoordinates,
    /// A waypoint could not be associated with any roadway.
    UnableToLocate,
    ProfileNotFound,
    RequestTooLarge,
    /// The caller exceeded its request quota within a time window.
    RateLimited {
        interval: Option<Duration>,
        quota: Option<u64>,
        reset_time: Option<DateTime<Utc>>,
    },
    /// Catch-all for server or transport failures that fit no other kind.
    Unknown {
        response: Option<ResponseMetadata>,
        cause: Option<Cause>,
        code: Option<String>,
        message: Option<String>,
    },
}

impl fmt::Display for DirectionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason(&Default::default()))
    }
}

impl StdError for DirectionsError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            DirectionsError::Unknown {
                cause: Some(cause), ..
            } => Some(cause.error()),
            _ => None,
        }
    }
}
