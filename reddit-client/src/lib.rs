pub mod api;
pub mod auth;
pub mod listing;
pub mod rate_limiter;


pub use api::RedditApiClient;
pub use auth::{
    RedditOAuth2Config, RedditToken, TokenManager, REDDIT_API_BASE, REDDIT_TOKEN_URL,
};
pub use listing::{paginate, ListingPage, PageRequest};

use async_trait::async_trait;
use harvest_core::{CommunitySource, CoreError, Credentials, PostStream};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated handle to the Reddit API.
///
/// Building one performs no network I/O; the first API call fetches the
/// access token.
#[derive(Debug)]
pub struct RedditSession {
    api: RedditApiClient,
    tokens: TokenManager,
}

impl RedditSession {
    pub fn new(credentials: &Credentials, user_agent: &str) -> Result<Self, CoreError> {
        Self::with_config(RedditOAuth2Config::new(credentials, user_agent))
    }

    pub fn with_config(config: RedditOAuth2Config) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let tokens = TokenManager::new(&config, http_client.clone())?;
        let api = RedditApiClient::with_base_url(
            http_client,
            config.user_agent.clone(),
            config.api_base.clone(),
        );

        debug!("Created Reddit session for client {}", config.client_id);
        Ok(Self { api, tokens })
    }

    pub fn user_agent(&self) -> &str {
        self.api.user_agent()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens
            .current_token()
            .await
            .is_some_and(|token| !token.is_expired())
    }

    pub fn api(&self) -> &RedditApiClient {
        &self.api
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    async fn fetch_new_page(
        &self,
        subreddit: &str,
        page: PageRequest,
    ) -> Result<ListingPage, CoreError> {
        let access_token = self.tokens.access_token().await?;
        let listing = self
            .api
            .get_new_posts(&access_token, subreddit, page.limit, page.after.as_deref())
            .await?;
        Ok(listing.into())
    }
}

#[async_trait]
impl CommunitySource for RedditSession {
    async fn subscriber_count(&self, community: &str) -> Result<u64, CoreError> {
        let access_token = self.tokens.access_token().await?;
        let about = self.api.get_subreddit_info(&access_token, community).await?;
        let subscribers = about.subscribers.unwrap_or(0);
        info!("r/{} has {} subscribers", about.display_name, subscribers);
        Ok(subscribers)
    }

    fn newest_posts<'a>(&'a self, community: &'a str, limit: Option<usize>) -> PostStream<'a> {
        paginate(limit, move |page| self.fetch_new_page(community, page))
    }
}
