use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Envelope returned by `/user/{name}/comments.json`.
#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
    pub children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Child {
    pub data: Comment,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    /// Epoch seconds; Reddit sends these as floats.
    pub created_utc: f64,
    pub body: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentDetails {
    pub date: DateTime<Utc>,
    pub body: String,
    pub comment_id: String,
}

impl Listing {
    /// The newest comment, if the user has any. Listings are requested with `sort=new`.
    pub fn into_newest(self) -> Option<Comment> {
        self.data.children.into_iter().next().map(|child| child.data)
    }
}

impl Comment {
    pub fn created_at(&self) -> Result<DateTime<Utc>> {
        let millis = (self.created_utc * 1000.0).trunc();
        if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
            anyhow::bail!("comment timestamp {} is out of range", self.created_utc);
        }

        DateTime::from_timestamp_millis(millis as i64)
            .with_context(|| format!("comment timestamp {} is out of range", self.created_utc))
    }

    pub fn into_details(self) -> Result<CommentDetails> {
        Ok(CommentDetails {
            date: self.created_at()?,
            body: self.body,
            comment_id: self.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_is_first_child() {
        let listing: Listing = serde_json::from_str(
            r#"{"kind":"Listing","data":{"after":null,"children":[
                {"kind":"t1","data":{"created_utc":1700000000.0,"body":"newest","id":"abc","score":3}},
                {"kind":"t1","data":{"created_utc":1600000000.0,"body":"older","id":"def","score":1}}
            ]}}"#,
        )
        .unwrap();

        let comment = listing.into_newest().unwrap();
        assert_eq!(comment.id, "abc");
        assert_eq!(comment.body, "newest");
    }

    #[test]
    fn empty_listing_has_no_newest() {
        let listing: Listing = serde_json::from_str(r#"{"data":{"children":[]}}"#).unwrap();
        assert!(listing.into_newest().is_none());
    }

    #[test]
    fn created_at_is_seconds_times_thousand() {
        let comment = Comment {
            created_utc: 1_700_000_000.0,
            body: String::new(),
            id: "x".to_string(),
        };
        let date = comment.created_at().unwrap();
        assert_eq!(date.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(date.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn fractional_seconds_keep_millis() {
        let comment = Comment {
            created_utc: 1_700_000_000.25,
            body: String::new(),
            id: "x".to_string(),
        };
        assert_eq!(comment.created_at().unwrap().timestamp_millis(), 1_700_000_000_250);
    }

    #[test]
    fn absurd_timestamp_is_an_error() {
        let comment = Comment {
            created_utc: 1e300,
            body: String::new(),
            id: "x".to_string(),
        };
        assert!(comment.created_at().is_err());
    }
}
