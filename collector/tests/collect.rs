use async_trait::async_trait;
use collector::Collector;
use futures::stream::{self, StreamExt};
use harvest_core::{
    CommunitySource, CoreError, HarvestFault, PacingPolicy, PostStream, RedditApiError,
    RemotePost, StopReason, SAFETY_CAP,
};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Canned community: a fixed list of posts, optionally failing part way.
struct FakeCommunity {
    reachable: bool,
    posts: Vec<RemotePost>,
    fail_after: Option<usize>,
    requested_limit: Mutex<Option<Option<usize>>>,
}

impl FakeCommunity {
    fn with_posts(count: usize) -> Self {
        Self {
            reachable: true,
            posts: (0..count).map(fake_post).collect(),
            fail_after: None,
            requested_limit: Mutex::new(None),
        }
    }

    fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::with_posts(10)
        }
    }

    fn failing_after(mut self, collected: usize) -> Self {
        self.fail_after = Some(collected);
        self
    }
}

#[async_trait]
impl CommunitySource for FakeCommunity {
    async fn subscriber_count(&self, community: &str) -> Result<u64, CoreError> {
        if self.reachable {
            Ok(1234)
        } else {
            Err(CoreError::RedditApi(RedditApiError::SubredditNotFound {
                subreddit: community.to_string(),
            }))
        }
    }

    fn newest_posts<'a>(&'a self, _community: &'a str, limit: Option<usize>) -> PostStream<'a> {
        *self.requested_limit.lock().unwrap() = Some(limit);

        let mut items: Vec<Result<RemotePost, CoreError>> = self
            .posts
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .map(Ok)
            .collect();

        if let Some(collected) = self.fail_after {
            items.truncate(collected);
            items.push(Err(CoreError::RedditApi(RedditApiError::ServerError {
                status_code: 503,
            })));
        }

        stream::iter(items).boxed()
    }
}

fn fake_post(n: usize) -> RemotePost {
    RemotePost {
        id: format!("p{:05}", n),
        title: format!("Post number {}", n),
        url: format!("https://www.reddit.com/r/blueprint_/comments/p{:05}", n),
        score: n as i64,
        created_utc: 1700000000.0 - n as f64,
        num_comments: (n % 7) as u64,
        is_self: n % 2 == 0,
        subreddit: "Blueprint_".to_string(),
    }
}

fn no_pauses() -> PacingPolicy {
    PacingPolicy {
        every: 50,
        pause: Duration::ZERO,
    }
}

#[tokio::test(start_paused = true)]
async fn test_limit_150_pauses_twice() {
    let collector = Collector::new(FakeCommunity::with_posts(500));
    let started = Instant::now();

    let result = collector.collect("blueprint_", Some(150)).await;

    assert_eq!(result.len(), 150);
    assert_eq!(result.pauses, 2);
    assert!(matches!(result.stop, StopReason::LimitReached));
    assert_eq!(started.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_listing_keeps_platform_order() {
    let collector = Collector::new(FakeCommunity::with_posts(120));

    let result = collector.collect("blueprint_", None).await;

    assert_eq!(result.len(), 120);
    assert_eq!(result.pauses, 2);
    assert!(matches!(result.stop, StopReason::Exhausted));
    let ids: Vec<&str> = result.records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids[0], "p00000");
    assert_eq!(ids[119], "p00119");
    assert!(result.records.iter().all(|r| r.subreddit == "Blueprint_"));
}

#[tokio::test]
async fn test_unreachable_community_returns_empty() {
    let collector = Collector::new(FakeCommunity::unreachable()).with_pacing(no_pauses());

    let result = collector.collect("does_not_exist", None).await;

    assert!(result.is_empty());
    assert!(matches!(
        result.fault(),
        Some(HarvestFault::Connectivity { community, .. }) if community == "does_not_exist"
    ));
    // The listing is never requested when the probe fails.
    assert!(collector.source().requested_limit.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_stream_failure_keeps_partial_records() {
    let source = FakeCommunity::with_posts(200).failing_after(73);
    let collector = Collector::new(source).with_pacing(no_pauses());

    let result = collector.collect("blueprint_", None).await;

    assert_eq!(result.len(), 73);
    assert!(matches!(
        result.fault(),
        Some(HarvestFault::Collection { collected: 73, .. })
    ));
}

#[tokio::test]
async fn test_malformed_post_stops_collection() {
    let mut source = FakeCommunity::with_posts(10);
    source.posts[4].id = String::new();
    let collector = Collector::new(source).with_pacing(no_pauses());

    let result = collector.collect("blueprint_", None).await;

    assert_eq!(result.len(), 4);
    assert!(matches!(
        result.fault(),
        Some(HarvestFault::Collection {
            collected: 4,
            source: CoreError::InvalidPost { .. }
        })
    ));
}

#[tokio::test]
async fn test_safety_cap_is_never_exceeded() {
    let collector =
        Collector::new(FakeCommunity::with_posts(SAFETY_CAP + 50)).with_pacing(no_pauses());

    let result = collector.collect("blueprint_", None).await;

    assert_eq!(result.len(), SAFETY_CAP);
    assert!(matches!(result.stop, StopReason::SafetyCap));
    assert_eq!(
        *collector.source().requested_limit.lock().unwrap(),
        Some(Some(SAFETY_CAP))
    );
}

#[tokio::test]
async fn test_limit_above_safety_cap_is_clamped() {
    let collector =
        Collector::new(FakeCommunity::with_posts(SAFETY_CAP + 50)).with_pacing(no_pauses());

    let result = collector.collect("blueprint_", Some(50_000)).await;

    assert_eq!(result.len(), SAFETY_CAP);
    assert!(matches!(result.stop, StopReason::SafetyCap));
}

#[tokio::test]
async fn test_records_are_flattened() {
    let collector = Collector::new(FakeCommunity::with_posts(3)).with_pacing(no_pauses());

    let result = collector.collect("blueprint_", Some(3)).await;
    let first = &result.records[0];

    assert_eq!(first.id, "p00000");
    assert_eq!(first.title, "Post number 0");
    assert_eq!(first.created_date, "2023-11-14 22:13:20");
    assert!(first.is_self);
    assert!(!result.records[1].is_self);
}
