use std::fmt;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tokio_retry::{strategy::ExponentialBackoff, Retry};

use super::store::LeaderboardStore;
use super::types::LeaderboardRow;

/// Marker error for rejected credentials, so main can map it to the auth
/// exit code.
#[derive(Debug)]
pub struct AuthError(pub String);

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for AuthError {}

/// HTTP client for the class sheet bridge.
///
/// The bridge is a thin JSON facade over the shared spreadsheet:
/// `GET {url}/rows` lists rows, `POST {url}/rows` appends one, and
/// `POST {url}/clear` wipes the sheet. Mutations send the bearer token.
pub struct SheetStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl SheetStore {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(concat!("bunkwise/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn rows_url(&self) -> String {
        format!("{}/rows", self.base_url)
    }

    fn clear_url(&self) -> String {
        format!("{}/clear", self.base_url)
    }

    fn describe_error(&self, e: reqwest::Error, action: &str) -> anyhow::Error {
        if let Some(status) = e.status() {
            match status.as_u16() {
                401 => anyhow::Error::new(AuthError(format!(
                    "Sheet bridge rejected the token while trying to {}. \
                     It may be invalid or expired.",
                    action
                ))),
                403 => anyhow!(
                    "Sheet bridge refused to {} (403). You may not have permission, \
                     or the bridge is rate limiting. Wait a few minutes and retry.",
                    action
                ),
                404 => anyhow!(
                    "Sheet bridge endpoint not found while trying to {}. \
                     Check leaderboard.url in your config.",
                    action
                ),
                _ => anyhow!("Sheet bridge error ({}) while trying to {}: {}", status, action, e),
            }
        } else if e.is_timeout() {
            anyhow!("Sheet bridge timed out while trying to {}. Check your connection.", action)
        } else {
            anyhow!("Could not reach the sheet bridge to {}: {}", action, e)
        }
    }
}

impl LeaderboardStore for SheetStore {
    /// Single attempt, deliberately: retrying an append that may have
    /// landed would double-submit.
    async fn append(&self, row: LeaderboardRow) -> Result<()> {
        let mut request = self.client.post(self.rows_url()).json(&row);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        request
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| self.describe_error(e, "submit your result"))?;

        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<LeaderboardRow>> {
        // Retry strategy: exponential backoff with 3 attempts
        let retry_strategy = ExponentialBackoff::from_millis(100)
            .max_delay(Duration::from_secs(5))
            .take(3);

        let rows = Retry::spawn(retry_strategy, || async {
            self.client
                .get(self.rows_url())
                .send()
                .await
                .and_then(|resp| resp.error_for_status())
                .map_err(|e| self.describe_error(e, "read the leaderboard"))?
                .json::<Vec<LeaderboardRow>>()
                .await
                .map_err(|e| anyhow!("Sheet bridge returned malformed rows: {}", e))
        })
        .await?;

        Ok(rows)
    }

    async fn clear(&self) -> Result<()> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| anyhow!("Clearing the leaderboard requires the sheet token."))?;

        self.client
            .post(self.clear_url())
            .bearer_auth(token)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| self.describe_error(e, "clear the leaderboard"))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_from_base() {
        let store = SheetStore::new("https://bridge.example.com/class-2026", None).unwrap();
        assert_eq!(store.rows_url(), "https://bridge.example.com/class-2026/rows");
        assert_eq!(store.clear_url(), "https://bridge.example.com/class-2026/clear");
    }

    #[test]
    fn test_trailing_slash_normalized() {
        let store = SheetStore::new("https://bridge.example.com/class-2026/", None).unwrap();
        assert_eq!(store.rows_url(), "https://bridge.example.com/class-2026/rows");
    }

    #[tokio::test]
    async fn test_clear_without_token_refused_locally() {
        let store = SheetStore::new("https://bridge.example.com/class-2026", None).unwrap();
        let err = store.clear().await.unwrap_err();
        assert!(err.to_string().contains("requires the sheet token"));
    }
}
