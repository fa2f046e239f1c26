use harvest_core::{CoreError, RedditApiError, RemotePost};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::auth::REDDIT_API_BASE;
use crate::rate_limiter::{RateLimitConfig, RateLimitStatus, RateLimiter};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    pub subreddit: String,
    #[serde(default)]
    pub url: String,
    pub created_utc: f64,
    pub score: i64,
    pub num_comments: u64,
    pub is_self: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditSubredditData {
    pub display_name: String,
    pub subscribers: Option<u64>,
}

impl From<RedditPostData> for RemotePost {
    fn from(post_data: RedditPostData) -> Self {
        Self {
            id: post_data.id,
            title: post_data.title,
            url: post_data.url,
            score: post_data.score,
            created_utc: post_data.created_utc,
            num_comments: post_data.num_comments,
            is_self: post_data.is_self,
            subreddit: post_data.subreddit,
        }
    }
}

/// Thin wrapper over the OAuth endpoints. Every request waits on the shared
/// rate limiter first.
#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    rate_limiter: Arc<RateLimiter>,
    user_agent: String,
    base_url: String,
}

impl RedditApiClient {
    pub fn new(http_client: Client, user_agent: String) -> Self {
        Self::with_base_url(http_client, user_agent, REDDIT_API_BASE.to_string())
    }

    pub fn with_base_url(http_client: Client, user_agent: String, base_url: String) -> Self {
        let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig::reddit_oauth()));

        Self {
            http_client,
            rate_limiter,
            user_agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: Option<&[(&str, &str)]>,
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let waited = self.rate_limiter.acquire_permit().await;
        debug!(
            "Acquired rate limit permit for {} {} after {:?}",
            method, endpoint, waited
        );

        let mut request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .header("User-Agent", &self.user_agent);

        if let Some(params) = query_params {
            request_builder = request_builder.query(params);
        }

        debug!("Making Reddit API request: {} {}", method, endpoint);
        let response = match request_builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    return Err(CoreError::RedditApi(RedditApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());

        Err(CoreError::RedditApi(status_to_error(
            status,
            endpoint,
            retry_after,
        )))
    }

    pub async fn get_subreddit_info(
        &self,
        access_token: &str,
        subreddit: &str,
    ) -> Result<RedditSubredditData, CoreError> {
        let endpoint = format!("/r/{}/about", subreddit);

        let response = self
            .make_request(Method::GET, &endpoint, access_token, None)
            .await
            .map_err(|e| not_found_as_subreddit(e, subreddit))?;

        let about: RedditListingChild<Value> = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit info: {}", e);
            invalid_about(subreddit)
        })?;

        subreddit_from_about(about, subreddit)
    }

    pub async fn get_new_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        limit: usize,
        after: Option<&str>,
    ) -> Result<RedditListing<RedditPostData>, CoreError> {
        let endpoint = format!("/r/{}/new", subreddit);
        let limit_str = limit.to_string();
        let mut params = vec![("limit", limit_str.as_str()), ("raw_json", "1")];
        if let Some(after_val) = after {
            params.push(("after", after_val));
        }

        let response = self
            .make_request(Method::GET, &endpoint, access_token, Some(params.as_slice()))
            .await
            .map_err(|e| not_found_as_subreddit(e, subreddit))?;

        let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit posts: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}", subreddit),
            })
        })?;

        info!(
            "Retrieved {} posts from r/{}",
            listing.data.children.len(),
            subreddit
        );
        Ok(listing)
    }

    pub async fn get_rate_limit_status(&self) -> RateLimitStatus {
        self.rate_limiter.get_rate_limit_status().await
    }
}

pub(crate) fn status_to_error(
    status: StatusCode,
    endpoint: &str,
    retry_after: Option<u64>,
) -> RedditApiError {
    match status.as_u16() {
        429 => {
            let retry_after = retry_after.unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        401 => RedditApiError::InvalidToken,
        403 => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        404 => RedditApiError::InvalidResponse {
            details: "Resource not found".to_string(),
        },
        code if status.is_server_error() => RedditApiError::ServerError { status_code: code },
        code => RedditApiError::InvalidResponse {
            details: format!("Unexpected status {} for {}", code, endpoint),
        },
    }
}

// Unknown names sometimes come back as an empty search listing instead of a
// 404, so the kind has to be checked before the data is decoded.
fn subreddit_from_about(
    about: RedditListingChild<Value>,
    subreddit: &str,
) -> Result<RedditSubredditData, CoreError> {
    if about.kind != "t5" {
        debug!("r/{} answered with kind {:?}", subreddit, about.kind);
        return Err(CoreError::RedditApi(RedditApiError::SubredditNotFound {
            subreddit: subreddit.to_string(),
        }));
    }

    let data: RedditSubredditData = serde_json::from_value(about.data).map_err(|e| {
        error!("Failed to decode subreddit info: {}", e);
        invalid_about(subreddit)
    })?;
    debug!("Retrieved info for r/{}", data.display_name);
    Ok(data)
}

fn invalid_about(subreddit: &str) -> CoreError {
    CoreError::RedditApi(RedditApiError::InvalidResponse {
        details: format!("Failed to parse info for r/{}", subreddit),
    })
}

fn not_found_as_subreddit(error: CoreError, subreddit: &str) -> CoreError {
    match error {
        CoreError::RedditApi(RedditApiError::InvalidResponse { ref details })
            if details == "Resource not found" =>
        {
            CoreError::RedditApi(RedditApiError::SubredditNotFound {
                subreddit: subreddit.to_string(),
            })
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_api_client_creation() {
        let client = RedditApiClient::new(Client::new(), "test-user-agent/1.0".to_string());
        assert_eq!(client.user_agent(), "test-user-agent/1.0");

        let status = client.get_rate_limit_status().await;
        assert!(status.available_tokens > 0);
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_to_error(StatusCode::TOO_MANY_REQUESTS, "/r/test/new", Some(12)),
            RedditApiError::RateLimitExceeded { retry_after: 12 }
        ));
        assert!(matches!(
            status_to_error(StatusCode::TOO_MANY_REQUESTS, "/r/test/new", None),
            RedditApiError::RateLimitExceeded { retry_after: 60 }
        ));
        assert!(matches!(
            status_to_error(StatusCode::UNAUTHORIZED, "/r/test/new", None),
            RedditApiError::InvalidToken
        ));
        assert!(matches!(
            status_to_error(StatusCode::FORBIDDEN, "/r/test/about", None),
            RedditApiError::Forbidden { ref resource } if resource == "/r/test/about"
        ));
        assert!(matches!(
            status_to_error(StatusCode::BAD_GATEWAY, "/r/test/new", None),
            RedditApiError::ServerError { status_code: 502 }
        ));
    }

    #[test]
    fn test_not_found_becomes_subreddit_not_found() {
        let error = CoreError::RedditApi(status_to_error(
            StatusCode::NOT_FOUND,
            "/r/missing/about",
            None,
        ));
        assert!(matches!(
            not_found_as_subreddit(error, "missing"),
            CoreError::RedditApi(RedditApiError::SubredditNotFound { ref subreddit })
                if subreddit == "missing"
        ));
    }

    #[test]
    fn test_search_listing_about_is_subreddit_not_found() {
        let about: RedditListingChild<Value> = serde_json::from_str(
            r#"{"kind":"Listing","data":{"modhash":"","dist":0,"children":[],"after":null,"before":null}}"#,
        )
        .unwrap();

        assert!(matches!(
            subreddit_from_about(about, "nosuchplace"),
            Err(CoreError::RedditApi(RedditApiError::SubredditNotFound { ref subreddit }))
                if subreddit == "nosuchplace"
        ));
    }

    #[test]
    fn test_t5_about_is_decoded() {
        let about: RedditListingChild<Value> = serde_json::from_str(
            r#"{"kind":"t5","data":{"display_name":"rust","subscribers":321000,"over18":false}}"#,
        )
        .unwrap();

        let data = subreddit_from_about(about, "rust").unwrap();
        assert_eq!(data.display_name, "rust");
        assert_eq!(data.subscribers, Some(321000));
    }

    #[test]
    fn test_reddit_post_conversion() {
        let post_data = RedditPostData {
            id: "test123".to_string(),
            title: "Test Post".to_string(),
            subreddit: "test".to_string(),
            url: "https://reddit.com/r/test/comments/test123".to_string(),
            created_utc: 1640995200.0,
            score: 42,
            num_comments: 5,
            is_self: true,
        };

        let post: RemotePost = post_data.into();
        assert_eq!(post.id, "test123");
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.score, 42);
        assert_eq!(post.created_utc, 1640995200.0);
        assert!(post.is_self);
    }
}
