use crate::adapters::http::{parse_retry_after, HttpClient};
use crate::domain::model::{FetchOutcome, Record};
use crate::domain::payload::Payload;
use crate::utils::error::{EtlError, Result};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_LOGGED_BODY_CHARS: usize = 500;

/// `base_url` + `/` + `endpoint`, resolved like a relative link.
pub fn resolve_endpoint_url(base_url: &str, endpoint: &str) -> Result<Url> {
    let base = format!("{}/", base_url.trim_end_matches('/'));
    let invalid = |e: url::ParseError| EtlError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    };

    // 壞掉的端點只讓該端點失敗，不影響其餘端點
    Url::parse(&base).and_then(|base| base.join(endpoint)).map_err(invalid)
}

fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_LOGGED_BODY_CHARS).collect()
}

/// Turns a parsed body into records. Every item must be a JSON object.
///
/// A record is a mapping, so a body like `[1, 2]` is rejected here and the
/// endpoint is reported as failing while extracting, before any transform.
pub fn normalize_payload(body: Value, url: &str) -> Result<Vec<Record>> {
    Payload::classify(body)
        .into_items()
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(Record::new(map)),
            other => Err(EtlError::ParseError {
                url: url.to_string(),
                message: format!("item {} is not a JSON object: {}", index, other),
            }),
        })
        .collect()
}

/// GETs one endpoint and normalizes the body into records.
pub async fn extract(
    client: &HttpClient,
    base_url: &str,
    endpoint: &str,
    auth_headers: &HeaderMap,
) -> Result<FetchOutcome> {
    let url = resolve_endpoint_url(base_url, endpoint)?;
    let url_str = url.to_string();
    tracing::info!("Fetching {}", url_str);

    let request = client
        .get(url)
        .headers(auth_headers.clone())
        .timeout(REQUEST_TIMEOUT);
    let response = client.execute(request).await?;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none");
        tracing::warn!(
            "Rate limited (429). Retry-After={} ({:?})",
            retry_after,
            parse_retry_after(response.headers())
        );
    }

    if !status.is_success() {
        let body = truncate_body(&response.text().await.unwrap_or_default());
        tracing::error!("HTTP error {} for {}: {}", status.as_u16(), url_str, body);
        return Err(EtlError::HttpError {
            status: status.as_u16(),
            url: url_str,
            body,
        });
    }

    let text = response.text().await?;
    let body: Value = serde_json::from_str(&text).map_err(|e| {
        tracing::error!("Failed to parse JSON from {}: {}", url_str, e);
        EtlError::ParseError {
            url: url_str.clone(),
            message: e.to_string(),
        }
    })?;

    let records = normalize_payload(body, &url_str)?;
    Ok(FetchOutcome::new(records, status.as_u16(), url_str))
}
