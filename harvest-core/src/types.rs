use crate::{CoreError, HarvestFault};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Format used for `created_date` and the collection timestamp. Always UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column order of the exported table; matches the field order of [`PostRecord`].
pub const POST_RECORD_FIELDS: [&str; 8] = [
    "title",
    "url",
    "score",
    "created_date",
    "id",
    "num_comments",
    "is_self",
    "subreddit",
];

/// A post as handed over by the platform client.
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePost {
    pub id: String,
    pub title: String,
    pub url: String,
    pub score: i64,
    pub created_utc: f64,
    pub num_comments: u64,
    pub is_self: bool,
    pub subreddit: String,
}

/// One flattened post, ready to be written as a table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub title: String,
    pub url: String,
    pub score: i64,
    pub created_date: String,
    pub id: String,
    pub num_comments: u64,
    pub is_self: bool,
    pub subreddit: String,
}

impl TryFrom<RemotePost> for PostRecord {
    type Error = CoreError;

    fn try_from(post: RemotePost) -> Result<Self, Self::Error> {
        if post.id.trim().is_empty() {
            return Err(CoreError::InvalidPost {
                id: post.id,
                reason: "post has no id".to_string(),
            });
        }

        let created_date =
            format_created_date(post.created_utc).ok_or_else(|| CoreError::InvalidPost {
                id: post.id.clone(),
                reason: format!("created_utc {} is not a valid timestamp", post.created_utc),
            })?;

        Ok(Self {
            title: post.title,
            url: post.url,
            score: post.score,
            created_date,
            id: post.id,
            num_comments: post.num_comments,
            is_self: post.is_self,
            subreddit: post.subreddit,
        })
    }
}

/// Render epoch seconds as `YYYY-MM-DD HH:MM:SS` in UTC, dropping any fraction.
pub fn format_created_date(created_utc: f64) -> Option<String> {
    if !created_utc.is_finite() {
        return None;
    }
    DateTime::from_timestamp(created_utc.floor() as i64, 0)
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
}

/// Inverse of [`format_created_date`]: back to whole epoch seconds.
pub fn parse_created_date(created_date: &str) -> Result<i64, chrono::ParseError> {
    NaiveDateTime::parse_from_str(created_date, TIMESTAMP_FORMAT).map(|dt| dt.and_utc().timestamp())
}

#[derive(Debug)]
pub enum StopReason {
    /// The platform had no more posts to hand out.
    Exhausted,
    /// The caller's limit was reached.
    LimitReached,
    /// The per-run safety cap was reached.
    SafetyCap,
    Fault(HarvestFault),
}

#[derive(Debug)]
pub struct CollectionResult {
    /// Newest first, in the order the platform returned them.
    pub records: Vec<PostRecord>,
    pub pauses: usize,
    pub stop: StopReason,
}

impl CollectionResult {
    pub fn empty(stop: StopReason) -> Self {
        Self {
            records: Vec::new(),
            pauses: 0,
            stop,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn fault(&self) -> Option<&HarvestFault> {
        match &self.stop {
            StopReason::Fault(fault) => Some(fault),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(id: &str, created_utc: f64) -> RemotePost {
        RemotePost {
            id: id.to_string(),
            title: "Blueprint progress".to_string(),
            url: "https://www.reddit.com/r/blueprint_/comments/abc123".to_string(),
            score: 17,
            created_utc,
            num_comments: 4,
            is_self: true,
            subreddit: "Blueprint_".to_string(),
        }
    }

    #[test]
    fn test_epoch_zero_renders_in_utc() {
        assert_eq!(format_created_date(0.0).unwrap(), "1970-01-01 00:00:00");
    }

    #[test]
    fn test_fractional_seconds_are_dropped() {
        assert_eq!(
            format_created_date(1640995200.75).unwrap(),
            "2022-01-01 00:00:00"
        );
    }

    #[test]
    fn test_created_date_parses_back_to_epoch() {
        let record = PostRecord::try_from(remote("abc123", 1700000123.0)).unwrap();
        assert_eq!(parse_created_date(&record.created_date).unwrap(), 1700000123);
    }

    #[test]
    fn test_record_keeps_platform_subreddit_spelling() {
        let record = PostRecord::try_from(remote("abc123", 0.0)).unwrap();
        assert_eq!(record.id, "abc123");
        assert_eq!(record.subreddit, "Blueprint_");
        assert!(record.is_self);
        assert_eq!(record.num_comments, 4);
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let result = PostRecord::try_from(remote("", 0.0));
        assert!(matches!(result, Err(CoreError::InvalidPost { .. })));
    }

    #[test]
    fn test_non_finite_timestamp_is_rejected() {
        let result = PostRecord::try_from(remote("abc123", f64::NAN));
        assert!(matches!(result, Err(CoreError::InvalidPost { ref id, .. }) if id == "abc123"));
    }

    #[test]
    fn test_empty_result_has_no_fault() {
        let result = CollectionResult::empty(StopReason::Exhausted);
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
        assert!(result.fault().is_none());
    }
}
