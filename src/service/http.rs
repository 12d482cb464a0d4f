//! Shared helpers for the REST integrations.

use reqwest::Response;
use serde::de::DeserializeOwned;

use crate::base::types::Res;

/// Join a base URL and an endpoint path with exactly one slash.
pub fn join_url(base: &str, endpoint: &str) -> String {
    let endpoint = endpoint.trim_start_matches('/');
    let base = base.trim_end_matches('/');
    format!("{base}/{endpoint}")
}

/// Check that the response is successful and deserialize its JSON body.
pub async fn handle_response<T: DeserializeOwned>(response: Response) -> Res<T> {
    let status = response.status();

    if status.is_success() {
        Ok(response.json::<T>().await?)
    } else {
        let url = response.url().to_string();
        let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());

        Err(anyhow::anyhow!("Request to `{url}` failed with status {status}: {error_text}"))
    }
}
