use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::models::{ChangelogEntry, ChangelogPage, SearchPage};
use crate::config::JiraConfig;
use crate::error::FetchError;
use crate::retry::{with_backoff, RetryPolicy};

pub const SEARCH_PAGE_SIZE: u32 = 50;
pub const CHANGELOG_PAGE_SIZE: u32 = 100;

/// Fields requested on every issue search; the optional custom field is
/// appended per run. `key` is always present on the envelope.
const ISSUE_FIELDS: &[&str] = &["summary", "status", "assignee", "priority", "created"];

#[derive(Clone)]
pub struct JiraClient {
    client: Client,
    config: JiraConfig,
    policy: RetryPolicy,
}

impl JiraClient {
    pub fn new(config: JiraConfig) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        let policy = config.retry_policy();
        Ok(Self {
            client,
            config,
            policy,
        })
    }

    /// For testing: shrink backoff delays.
    #[cfg(test)]
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Fetch one page of issues matching `jql`.
    ///
    /// The caller drives the loop: pass back `next_page_token` until the
    /// server reports `is_last` or stops returning a token.
    pub async fn search_page(
        &self,
        jql: &str,
        custom_field: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<SearchPage, FetchError> {
        let url = format!("{}/rest/api/3/search/jql", self.config.base_url);

        let mut fields: Vec<&str> = ISSUE_FIELDS.to_vec();
        if let Some(field) = custom_field {
            fields.push(field);
        }
        let mut params = vec![
            ("jql".to_string(), jql.to_string()),
            ("fields".to_string(), fields.join(",")),
            ("maxResults".to_string(), SEARCH_PAGE_SIZE.to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("nextPageToken".to_string(), token.to_string()));
        }

        self.get_json(&url, &params).await
    }

    /// Fetch the full changelog for one issue, accumulating across
    /// `startAt`/`maxResults` pages.
    ///
    /// Stops on `isLast`, on reaching the reported `total`, or on a short or
    /// empty page (the final page may report fewer items than requested).
    pub async fn fetch_issue_changelog(
        &self,
        issue_key: &str,
    ) -> Result<Vec<ChangelogEntry>, FetchError> {
        let url = format!(
            "{}/rest/api/3/issue/{}/changelog",
            self.config.base_url, issue_key
        );

        let mut start_at: u32 = 0;
        let mut entries = Vec::new();

        loop {
            let params = vec![
                ("startAt".to_string(), start_at.to_string()),
                ("maxResults".to_string(), CHANGELOG_PAGE_SIZE.to_string()),
            ];
            let page: ChangelogPage = self.get_json(&url, &params).await?;

            let fetched = page.values.len() as u32;
            entries.extend(page.values);
            start_at += fetched;

            if page.is_last || fetched < CHANGELOG_PAGE_SIZE || fetched == 0 {
                break;
            }
            if let Some(total) = page.total {
                if start_at >= total {
                    break;
                }
            }
        }

        Ok(entries)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<T, FetchError> {
        with_backoff(&self.policy, || async move {
            let response = self
                .client
                .get(url)
                .query(params)
                .basic_auth(&self.config.email, Some(&self.config.api_token))
                .send()
                .await?;
            classify(response).await
        })
        .await
    }
}

/// Map a response onto the failure taxonomy, or decode its body on success.
async fn classify<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
    let status = response.status();

    if status.is_success() {
        return response.json::<T>().await.map_err(|e| FetchError::Fatal {
            status,
            body: format!("invalid response body: {e}"),
        });
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(FetchError::Auth { status }),
        StatusCode::TOO_MANY_REQUESTS => Err(FetchError::Transient {
            status,
            retry_after: parse_retry_after(&response),
        }),
        s if s.is_server_error() => Err(FetchError::Transient {
            status,
            retry_after: None,
        }),
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(FetchError::Fatal { status, body })
        }
    }
}

fn parse_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
}
