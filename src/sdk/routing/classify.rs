use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;

use super::error::{Cause, DirectionsError, ResponseMetadata};

pub const RATE_LIMIT_INTERVAL_HEADER: &str = "X-Rate-Limit-Interval";
pub const RATE_LIMIT_LIMIT_HEADER: &str = "X-Rate-Limit-Limit";
pub const RATE_LIMIT_RESET_HEADER: &str = "X-Rate-Limit-Reset";

/// Status body the service sends alongside every response.
#[derive(Deserialize, Debug, Default)]
pub struct ServiceStatus {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl DirectionsError {
    /// Maps a failure reported by the service or the transport to its kind.
    ///
    /// A recognised server code wins over the HTTP status, and needs no
    /// response at all: a code read from a body that was decoded elsewhere
    /// still classifies. Without a response, the 413 and 429 kinds cannot
    /// be reached and an unrecognised code is `Unknown` with no response.
    pub fn classify(
        code: Option<&str>,
        message: Option<String>,
        response: Option<ResponseMetadata>,
        cause: Option<Cause>,
    ) -> Self {
        let error = match (code, response.as_ref().map(|r| r.status)) {
            (Some("NoRoute"), _) => DirectionsError::UnableToRoute,
            (Some("NoSegment"), _) => DirectionsError::UnableToLocate,
            (Some("NoMatch"), _) => DirectionsError::NoMatches,
            (Some("TooManyCoordinates"), _) => DirectionsError::TooManyCoordinates,
            (Some("InvalidInput"), _) => DirectionsError::InvalidInput { message },
            (Some("ProfileNotFound"), _) => DirectionsError::ProfileNotFound,
            (_, Some(413)) => DirectionsError::RequestTooLarge,
            (_, Some(429)) => {
                let headers = response.as_ref();
                DirectionsError::RateLimited {
                    interval: headers.and_then(rate_limit_interval),
                    quota: headers.and_then(rate_limit_quota),
                    reset_time: headers.and_then(rate_limit_reset),
                }
            }
            _ => DirectionsError::Unknown {
                response,
                cause,
                code: code.map(str::to_string),
                message,
            },
        };
        log::debug!("Classified failure with code {:?} as {:?}", code, error);
        error
    }

    /// Classifies a complete HTTP response. Returns `None` when the response
    /// does not describe a failure.
    pub fn classify_response(response: ResponseMetadata, body: &[u8]) -> Option<Self> {
        let success = (200..300).contains(&response.status);

        if body.iter().all(u8::is_ascii_whitespace) {
            return if success {
                Some(DirectionsError::NoData)
            } else {
                Some(Self::classify(None, None, Some(response), None))
            };
        }

        match serde_json::from_slice::<ServiceStatus>(body) {
            Ok(status) => {
                if success && matches!(status.code.as_deref(), None | Some("Ok")) {
                    return None;
                }
                Some(Self::classify(
                    status.code.as_deref(),
                    status.message,
                    Some(response),
                    None,
                ))
            }
            Err(_) if success => Some(DirectionsError::InvalidResponse),
            Err(e) => {
                log::debug!("Failure body is not a status object: {}", e);
                Some(Self::classify(None, None, Some(response), None))
            }
        }
    }

    /// Reads the body of a blocking response and classifies it.
    pub fn from_http(response: reqwest::blocking::Response) -> Option<Self> {
        let metadata = ResponseMetadata::from(&response);
        match response.bytes() {
            Ok(body) => Self::classify_response(metadata, &body),
            Err(e) => Some(Self::classify(None, None, Some(metadata), Some(Cause::new(e)))),
        }
    }
}

impl From<reqwest::Error> for DirectionsError {
    fn from(error: reqwest::Error) -> Self {
        let response = error.status().map(|status| ResponseMetadata::new(status.as_u16()));
        Self::classify(None, None, response, Some(Cause::new(error)))
    }
}

fn rate_limit_interval(response: &ResponseMetadata) -> Option<Duration> {
    let value = response.header(RATE_LIMIT_INTERVAL_HEADER)?;
    let parsed = value
        .parse::<f64>()
        .ok()
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok());
    if parsed.is_none() {
        log::warn!("Ignoring unparseable {} header: {}", RATE_LIMIT_INTERVAL_HEADER, value);
    }
    parsed
}

fn rate_limit_quota(response: &ResponseMetadata) -> Option<u64> {
    let value = response.header(RATE_LIMIT_LIMIT_HEADER)?;
    let parsed = value.parse::<u64>().ok();
    if parsed.is_none() {
        log::warn!("Ignoring unparseable {} header: {}", RATE_LIMIT_LIMIT_HEADER, value);
    }
    parsed
}

fn rate_limit_reset(response: &ResponseMetadata) -> Option<DateTime<Utc>> {
    let value = response.header(RATE_LIMIT_RESET_HEADER)?;
    let parsed = value
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    if parsed.is_none() {
        log::warn!("Ignoring unparseable {} header: {}", RATE_LIMIT_RESET_HEADER, value);
    }
    parsed
}
