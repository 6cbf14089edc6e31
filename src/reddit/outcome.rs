use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

use super::types::CommentDetails;

const INVALID_USERNAME: &str = "Invalid username provided";

/// Result of looking up when a user last commented.
///
/// Every variant renders to the text written into the output file.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(DateTime<Utc>),
    /// The user exists but the listing came back empty.
    NoComments,
    /// HTTP 404
    NotFound,
    /// HTTP 429
    RateLimited,
    /// Any other HTTP-layer failure, carrying the transport's message.
    ApiError(String),
    /// Rejected before any request was made.
    InvalidUsername,
    /// Malformed response or anything else that isn't an HTTP failure.
    Unexpected(String),
}

/// Result of looking up the full newest comment.
///
/// Deliberately coarser than [`LookupOutcome`]: 404 and 429 come back as
/// [`DetailsOutcome::ApiError`] like any other HTTP failure.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailsOutcome {
    Found(CommentDetails),
    NoComments,
    ApiError(String),
    InvalidUsername,
    Unexpected(String),
}

/// The seam the batch runner drives. [`super::RedditClient`] is the real implementation.
#[async_trait]
pub trait CommentLookup: Send + Sync {
    async fn last_comment_date(&self, username: &str) -> LookupOutcome;

    async fn last_comment_details(&self, username: &str) -> DetailsOutcome;
}

impl LookupOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, LookupOutcome::Found(_))
    }
}

impl DetailsOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, DetailsOutcome::Found(_))
    }
}

fn render_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Quote a comment body so it stays inside one output line.
fn quote_body(body: &str) -> String {
    let escaped = body
        .replace('"', "\"\"")
        .replace('\r', "")
        .replace('\n', "\\n");
    format!("\"{}\"", escaped)
}

impl fmt::Display for LookupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupOutcome::Found(date) => f.write_str(&render_date(date)),
            LookupOutcome::NoComments => f.write_str("No comments found for this user"),
            LookupOutcome::NotFound => f.write_str("User not found"),
            LookupOutcome::RateLimited => {
                f.write_str("Rate limit exceeded. Please try again later")
            }
            LookupOutcome::ApiError(message) => write!(f, "API Error: {}", message),
            LookupOutcome::InvalidUsername => write!(f, "Unexpected error: {}", INVALID_USERNAME),
            LookupOutcome::Unexpected(message) => write!(f, "Unexpected error: {}", message),
        }
    }
}

impl fmt::Display for DetailsOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailsOutcome::Found(details) => write!(
                f,
                "{},{},{}",
                render_date(&details.date),
                details.comment_id,
                quote_body(&details.body)
            ),
            DetailsOutcome::NoComments => f.write_str("No comments found for this user"),
            DetailsOutcome::ApiError(message) => write!(f, "API Error: {}", message),
            DetailsOutcome::InvalidUsername => {
                write!(f, "Unexpected error: {}", INVALID_USERNAME)
            }
            DetailsOutcome::Unexpected(message) => write!(f, "Unexpected error: {}", message),
        }
    }
}
