//! Cursor-following pagination over Reddit listings.
//!
//! [`paginate`] turns a page fetcher into a [`PostStream`]. Pages are requested
//! only when the previous one has been drained, and the stream ends when the
//! listing has no `after` cursor, a page comes back empty, the requested count
//! has been handed out, or a fetch fails.

use futures::stream::{self, StreamExt};
use harvest_core::{CoreError, PostStream, RemotePost};
use std::collections::VecDeque;
use std::future::Future;
use tracing::debug;

use crate::api::{RedditListing, RedditPostData};

/// Largest page Reddit serves for listing endpoints.
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub after: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    pub posts: Vec<RemotePost>,
    pub after: Option<String>,
}

impl From<RedditListing<RedditPostData>> for ListingPage {
    fn from(listing: RedditListing<RedditPostData>) -> Self {
        Self {
            posts: listing
                .data
                .children
                .into_iter()
                .map(|child| child.data.into())
                .collect(),
            after: listing.data.after,
        }
    }
}

struct Cursor<F> {
    fetch: F,
    after: Option<String>,
    buffered: VecDeque<RemotePost>,
    remaining: Option<usize>,
    exhausted: bool,
}

impl<F, Fut> Cursor<F>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<ListingPage, CoreError>>,
{
    async fn advance(mut self) -> Result<Option<(RemotePost, Self)>, CoreError> {
        loop {
            if self.remaining == Some(0) {
                return Ok(None);
            }

            if let Some(post) = self.buffered.pop_front() {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                return Ok(Some((post, self)));
            }

            if self.exhausted {
                return Ok(None);
            }

            let request = PageRequest {
                limit: self
                    .remaining
                    .map_or(MAX_PAGE_SIZE, |remaining| remaining.min(MAX_PAGE_SIZE)),
                after: self.after.take(),
            };
            debug!(
                "Fetching listing page (limit {}, after {:?})",
                request.limit, request.after
            );

            let page = (self.fetch)(request).await?;
            self.exhausted = page.after.is_none() || page.posts.is_empty();
            self.after = page.after;
            self.buffered.extend(page.posts);
        }
    }
}

/// Streams posts page by page, handing out at most `limit` of them.
pub fn paginate<'a, F, Fut>(limit: Option<usize>, fetch: F) -> PostStream<'a>
where
    F: FnMut(PageRequest) -> Fut + Send + 'a,
    Fut: Future<Output = Result<ListingPage, CoreError>> + Send + 'a,
{
    let cursor = Cursor {
        fetch,
        after: None,
        buffered: VecDeque::new(),
        remaining: limit,
        exhausted: false,
    };

    stream::try_unfold(cursor, Cursor::advance).boxed()
}
