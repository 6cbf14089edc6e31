use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};

use crate::config::RedditConfig;
use super::outcome::{CommentLookup, DetailsOutcome, LookupOutcome};
use super::types::{Comment, Listing};

pub struct RedditClient {
    client: Client,
    base_url: Url,
}

/// Why a listing request failed, before it is folded into an outcome.
enum FetchError {
    InvalidUsername,
    /// Non-2xx response.
    Status(StatusCode, String),
    /// Connect, timeout or body read failure.
    Transport(String),
    /// The body was not the listing we expected.
    Malformed(String),
}

impl RedditClient {
    pub fn new(config: &RedditConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid base_url {}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("base_url {} cannot carry a path", config.base_url);
        }

        Ok(Self { client, base_url })
    }

    /// When `username` last commented, with 404 and 429 classified.
    pub async fn last_comment_date(&self, username: &str) -> LookupOutcome {
        match self.fetch_newest(username).await {
            Ok(None) => LookupOutcome::NoComments,
            Ok(Some(comment)) => match comment.created_at() {
                Ok(date) => LookupOutcome::Found(date),
                Err(e) => LookupOutcome::Unexpected(format!("{:#}", e)),
            },
            Err(FetchError::InvalidUsername) => LookupOutcome::InvalidUsername,
            Err(FetchError::Status(StatusCode::NOT_FOUND, _)) => LookupOutcome::NotFound,
            Err(FetchError::Status(StatusCode::TOO_MANY_REQUESTS, _)) => {
                LookupOutcome::RateLimited
            }
            Err(FetchError::Status(_, message)) | Err(FetchError::Transport(message)) => {
                LookupOutcome::ApiError(message)
            }
            Err(FetchError::Malformed(message)) => LookupOutcome::Unexpected(message),
        }
    }

    /// The full newest comment. Every HTTP failure is reported as an API error.
    pub async fn last_comment_details(&self, username: &str) -> DetailsOutcome {
        match self.fetch_newest(username).await {
            Ok(None) => DetailsOutcome::NoComments,
            Ok(Some(comment)) => match comment.into_details() {
                Ok(details) => DetailsOutcome::Found(details),
                Err(e) => DetailsOutcome::Unexpected(format!("{:#}", e)),
            },
            Err(FetchError::InvalidUsername) => DetailsOutcome::InvalidUsername,
            Err(FetchError::Status(_, message)) | Err(FetchError::Transport(message)) => {
                DetailsOutcome::ApiError(message)
            }
            Err(FetchError::Malformed(message)) => DetailsOutcome::Unexpected(message),
        }
    }

    fn comments_url(&self, username: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["user", username, "comments.json"]);
        }
        url
    }

    async fn fetch_newest(&self, username: &str) -> Result<Option<Comment>, FetchError> {
        let username = username.trim();
        if !is_valid_username(username) {
            warn!("Skipping lookup: invalid username {:?}", username);
            return Err(FetchError::InvalidUsername);
        }

        let url = self.comments_url(username);
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .query(&[("limit", "1"), ("sort", "new")])
            .send()
            .await
            .map_err(|e| FetchError::Transport(error_chain(e)))?;

        let status = response.status();
        let response = response.error_for_status().map_err(|e| {
            warn!("Reddit returned {} for u/{}", status, username);
            FetchError::Status(status, error_chain(e))
        })?;

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(error_chain(e)))?;

        let listing: Listing = serde_json::from_slice(&body).map_err(|e| {
            warn!("Malformed listing for u/{}: {}", username, e);
            FetchError::Malformed(e.to_string())
        })?;

        Ok(listing.into_newest())
    }
}

/// Reddit usernames are limited to ASCII letters, digits, `_` and `-`.
fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// reqwest hides the interesting part (refused, timed out, ...) in the source chain.
fn error_chain(e: reqwest::Error) -> String {
    format!("{:#}", anyhow::Error::new(e))
}

#[async_trait]
impl CommentLookup for RedditClient {
    async fn last_comment_date(&self, username: &str) -> LookupOutcome {
        RedditClient::last_comment_date(self, username).await
    }

    async fn last_comment_details(&self, username: &str) -> DetailsOutcome {
        RedditClient::last_comment_details(self, username).await
    }
}
