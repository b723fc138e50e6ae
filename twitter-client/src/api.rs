use chrono::{DateTime, Utc};
use mood_core::{ConfigError, CoreError, Post, TwitterApiError};
use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use url::Url;

pub const RECENT_SEARCH_ENDPOINT: &str = "/2/tweets/search/recent";
const TWEET_FIELDS: &str = "created_at,text";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Absent when the search matched nothing.
    #[serde(default)]
    pub data: Vec<TweetData>,
    pub meta: Option<SearchMeta>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetData {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMeta {
    pub result_count: u32,
    pub newest_id: Option<String>,
    pub oldest_id: Option<String>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct TwitterApiClient {
    http_client: Client,
    base_url: Url,
    user_agent: String,
}

impl TwitterApiClient {
    pub fn new(settings: ApiSettings) -> Result<Self, CoreError> {
        let base_url = Url::parse(&settings.base_url).map_err(|_| ConfigError::InvalidValue {
            field: "api_base_url".to_string(),
            value: settings.base_url.clone(),
        })?;

        let mut builder = Client::builder().user_agent(&settings.user_agent);
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        Ok(Self {
            http_client,
            base_url,
            user_agent: settings.user_agent,
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Full recent-search URL for `account`, query string included.
    pub fn search_url(&self, account: &str, max_results: u32) -> Result<Url, CoreError> {
        let endpoint = format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            RECENT_SEARCH_ENDPOINT
        );
        let max_results = max_results.to_string();
        let query = search_query(account);
        let params = [
            ("query", query.as_str()),
            ("tweet.fields", TWEET_FIELDS),
            ("max_results", max_results.as_str()),
        ];

        Url::parse_with_params(&endpoint, &params).map_err(|e| CoreError::InvalidInput {
            message: format!("cannot build search URL: {}", e),
        })
    }

    async fn make_request(&self, url: Url, bearer_token: &str) -> Result<Response, CoreError> {
        let start_time = Instant::now();
        info!("Making Twitter API request: GET {}", RECENT_SEARCH_ENDPOINT);

        let response = match self
            .http_client
            .get(url)
            .bearer_auth(bearer_token)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for GET {}: {}", RECENT_SEARCH_ENDPOINT, e);
                if e.is_timeout() {
                    return Err(CoreError::TwitterApi(TwitterApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        debug!(
            "Twitter API answered {} in {:?}",
            status,
            start_time.elapsed()
        );

        if status != StatusCode::OK {
            error!(
                "Request failed with status: {} for {}",
                status, RECENT_SEARCH_ENDPOINT
            );
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok());
            return Err(CoreError::TwitterApi(status_error(status, retry_after)));
        }

        Ok(response)
    }

    pub async fn search_recent(
        &self,
        bearer_token: &str,
        account: &str,
        max_results: u32,
    ) -> Result<SearchResponse, CoreError> {
        let url = self.search_url(account, max_results)?;
        let response = self.make_request(url, bearer_token).await?;

        let body = response.text().await?;
        let search = parse_search_response(&body)?;

        info!(
            "Retrieved {} posts for {}",
            search.data.len(),
            normalize_handle(account)
        );
        Ok(search)
    }
}

/// Strips surrounding whitespace and a leading `@` from a handle.
pub fn normalize_handle(account: &str) -> &str {
    let account = account.trim();
    account.strip_prefix('@').unwrap_or(account)
}

pub fn search_query(account: &str) -> String {
    format!("from:{}", normalize_handle(account))
}

pub fn parse_search_response(body: &str) -> Result<SearchResponse, CoreError> {
    serde_json::from_str(body).map_err(|e| {
        error!("Failed to parse search response: {}", e);
        CoreError::TwitterApi(TwitterApiError::InvalidResponse {
            details: format!("Failed to parse recent search response: {}", e),
        })
    })
}

/// Maps a non-200 answer to the error the user sees.
pub fn status_error(status: StatusCode, retry_after: Option<&str>) -> TwitterApiError {
    match status.as_u16() {
        401 => TwitterApiError::AuthenticationFailed { status_code: 401 },
        403 => TwitterApiError::Forbidden {
            resource: RECENT_SEARCH_ENDPOINT.to_string(),
        },
        429 => {
            let retry_after = retry_after.and_then(|value| value.trim().parse::<u64>().ok());
            warn!("Rate limited, retry after {:?} seconds", retry_after);
            TwitterApiError::RateLimitExceeded { retry_after }
        }
        code if status.is_server_error() => TwitterApiError::ServerError { status_code: code },
        code => TwitterApiError::RequestFailed { status_code: code },
    }
}

impl From<TweetData> for Post {
    fn from(tweet: TweetData) -> Self {
        Self {
            text: tweet.text,
            created_at: tweet.created_at,
        }
    }
}
