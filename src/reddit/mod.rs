pub mod client;
pub mod outcome;
pub mod types;

pub use client::RedditClient;
pub use outcome::CommentLookup;
