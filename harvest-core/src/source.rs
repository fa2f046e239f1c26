//! The seam between the collector and whatever hands out posts.
//!
//! `reddit-client` implements [`CommunitySource`] against the live API; tests
//! implement it with canned posts.

use crate::{CoreError, RemotePost};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// A finite, non-restartable stream of posts, newest first.
///
/// Page fetching happens behind the stream. The first `Err` ends it.
pub type PostStream<'a> = BoxStream<'a, Result<RemotePost, CoreError>>;

#[async_trait]
pub trait CommunitySource: Send + Sync {
    /// Subscriber count of the community. Used as a connectivity probe.
    async fn subscriber_count(&self, community: &str) -> Result<u64, CoreError>;

    /// Newest posts of the community, at most `limit` of them when given.
    fn newest_posts<'a>(&'a self, community: &'a str, limit: Option<usize>) -> PostStream<'a>;
}
