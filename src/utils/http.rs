// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, REFERER};

use crate::error::{AppError, Result};
use crate::models::HeaderProfile;

/// Create an asynchronous HTTP client that presents the given header profile.
pub fn create_async_client(profile: &HeaderProfile, timeout_secs: u64) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, ACCEPT, &profile.accept)?;
    insert_header(&mut headers, ACCEPT_LANGUAGE, &profile.accept_language)?;
    if let Some(referer) = &profile.referer {
        insert_header(&mut headers, REFERER, referer)?;
    }

    let client = reqwest::Client::builder()
        .user_agent(&profile.user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a page body, failing on any non-2xx status.
pub async fn fetch_text_async(client: &reqwest::Client, url: &str) -> Result<String> {
    let text = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(text)
}

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| AppError::config(format!("Invalid value for header {name}: {e}")))?;
    headers.insert(name, value);
    Ok(())
}
