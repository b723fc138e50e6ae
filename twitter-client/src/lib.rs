pub mod api;

use api::{ApiSettings, TwitterApiClient};
use mood_core::{AppConfig, CoreError, Post, PostSource};
use std::time::Duration;

pub use api::{SearchMeta, SearchResponse, TweetData};

/// Fetches an account's recent posts through the v2 recent-search endpoint.
#[derive(Debug, Clone)]
pub struct TwitterClient {
    api: TwitterApiClient,
}

impl TwitterClient {
    pub fn new(settings: ApiSettings) -> Result<Self, CoreError> {
        Ok(Self {
            api: TwitterApiClient::new(settings)?,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        Self::new(ApiSettings {
            base_url: config.api_base_url.clone(),
            user_agent: config.user_agent.clone(),
            timeout: config.request_timeout_secs.map(Duration::from_secs),
        })
    }

    pub fn api(&self) -> &TwitterApiClient {
        &self.api
    }
}

impl PostSource for TwitterClient {
    async fn fetch_recent_posts(
        &self,
        account: &str,
        credential: &str,
        limit: u32,
    ) -> Result<Vec<Post>, CoreError> {
        let search = self.api.search_recent(credential, account, limit).await?;
        Ok(search.data.into_iter().map(Post::from).collect())
    }
}
