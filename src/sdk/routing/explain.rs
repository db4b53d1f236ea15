use reqwest::StatusCode;

use super::error::DirectionsError;
use super::locale::LocaleContext;

/// User-facing explanation of a failure: what went wrong and, optionally,
/// what to do about it.
pub trait Explain {
    fn failure_reason(&self, ctx: &LocaleContext) -> Option<String>;

    fn recovery_suggestion(&self, ctx: &LocaleContext) -> Option<String>;
}

impl DirectionsError {
    /// The failure reason. Every kind has one, so unlike the trait method
    /// this never comes back empty.
    pub fn reason(&self, ctx: &LocaleContext) -> String {
        match self {
            DirectionsError::NoData => "The server returned an empty response.".to_string(),
            DirectionsError::InvalidInput { message } => message
                .clone()
                .unwrap_or_else(|| "The request contains invalid parameters.".to_string()),
            DirectionsError::InvalidResponse => {
                "The server returned a response that isn't correctly formatted.".to_string()
            }
            DirectionsError::UnableToRoute => {
                "No route could be found between the specified locations.".to_string()
            }
            DirectionsError::NoMatches => {
                "The specified coordinates could not be matched to the road network.".to_string()
            }
            DirectionsError::TooManyCoordinates => {
                "The request specifies too many coordinates.".to_string()
            }
            DirectionsError::UnableToLocate => {
                "A specified location could not be associated with a roadway or pathway."
                    .to_string()
            }
            DirectionsError::ProfileNotFound => "Unrecognized profile identifier.".to_string(),
            DirectionsError::RequestTooLarge => "The request is too large.".to_string(),
            DirectionsError::RateLimited {
                interval: Some(interval),
                quota: Some(quota),
                ..
            } => format!(
                "More than {} requests have been made with this access token within a period of {}.",
                ctx.format_count(*quota),
                ctx.format_interval(*interval)
            ),
            DirectionsError::RateLimited { .. } => "Too many requests.".to_string(),
            DirectionsError::Unknown {
                response,
                cause,
                message,
                ..
            } => message
                .clone()
                .or_else(|| {
                    cause
                        .as_ref()
                        .and_then(|cause| cause.explanation())
                        .and_then(|explanation| explanation.failure_reason(ctx))
                })
                .unwrap_or_else(|| {
                    status_text(response.as_ref().map_or(-1, |r| i32::from(r.status)))
                }),
        }
    }

    pub fn suggestion(&self, ctx: &LocaleContext) -> Option<String> {
        match self {
            DirectionsError::NoData
            | DirectionsError::InvalidInput { .. }
            | DirectionsError::InvalidResponse => None,
            DirectionsError::UnableToRoute => Some(
                "Make sure it is possible to travel between the locations with the mode of \
                 transportation implied by the profile identifier. For example, it is impossible \
                 to travel by car from one continent to another without either a land bridge or \
                 a ferry connection."
                    .to_string(),
            ),
            DirectionsError::NoMatches => Some(
                "Try again making sure that your tracepoints lie in close proximity to a road \
                 or path."
                    .to_string(),
            ),
            DirectionsError::TooManyCoordinates => {
                Some("Try again with fewer coordinates.".to_string())
            }
            DirectionsError::UnableToLocate => Some(
                "Make sure the locations are close enough to a roadway or pathway. Try removing \
                 the coordinate accuracy of all the waypoints."
                    .to_string(),
            ),
            DirectionsError::ProfileNotFound => Some(
                "Make sure the profile identifier is set to one of the predefined values, such \
                 as driving or walking."
                    .to_string(),
            ),
            DirectionsError::RequestTooLarge => Some(
                "Try specifying fewer waypoints or giving the waypoints shorter names.".to_string(),
            ),
            DirectionsError::RateLimited { reset_time, .. } => reset_time.as_ref().map(|reset| {
                format!("Wait until {} before retrying.", ctx.format_instant(reset))
            }),
            DirectionsError::Unknown { cause, .. } => cause
                .as_ref()
                .and_then(|cause| cause.explanation())
                .and_then(|explanation| explanation.recovery_suggestion(ctx)),
        }
    }
}

impl Explain for DirectionsError {
    fn failure_reason(&self, ctx: &LocaleContext) -> Option<String> {
        Some(self.reason(ctx))
    }

    fn recovery_suggestion(&self, ctx: &LocaleContext) -> Option<String> {
        self.suggestion(ctx)
    }
}

/// Textual rendering of an HTTP status code, falling back to the bare
/// number for codes without a registered reason phrase.
fn status_text(code: i32) -> String {
    u16::try_from(code)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .and_then(|status| status.canonical_reason())
        .map(|reason| reason.to_lowercase())
        .unwrap_or_else(|| format!("HTTP status {}", code))
}
