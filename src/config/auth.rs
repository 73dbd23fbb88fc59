use crate::utils::error::{EtlError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Builds the optional auth header: `{prefix} {key}`, the bare key when the
/// prefix is empty, and nothing at all when there is no key.
pub fn build_auth_headers(api_key: &str, header_name: &str, prefix: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if api_key.is_empty() {
        return Ok(headers);
    }

    let value = if prefix.is_empty() {
        api_key.to_string()
    } else {
        format!("{} {}", prefix, api_key).trim().to_string()
    };

    let name = HeaderName::from_bytes(header_name.as_bytes()).map_err(|e| {
        EtlError::InvalidConfigValueError {
            field: "API_AUTH_HEADER".to_string(),
            value: header_name.to_string(),
            reason: e.to_string(),
        }
    })?;
    let mut value = HeaderValue::from_str(&value).map_err(|e| EtlError::ConfigError {
        message: format!("API key cannot be used as a header value: {}", e),
    })?;
    value.set_sensitive(true);

    headers.insert(name, value);
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixed_key() {
        let headers = build_auth_headers("abc", "Authorization", "Bearer").unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["authorization"], "Bearer abc");
    }

    #[test]
    fn test_bare_key_without_prefix() {
        let headers = build_auth_headers("abc", "X-Api-Key", "").unwrap();
        assert_eq!(headers["x-api-key"], "abc");
    }

    #[test]
    fn test_no_key_no_header() {
        let headers = build_auth_headers("", "Authorization", "Bearer").unwrap();
        assert!(headers.is_empty());
    }

    #[test]
    fn test_invalid_header_name() {
        let result = build_auth_headers("abc", "Bad Header", "Bearer");
        assert!(matches!(
            result,
            Err(EtlError::InvalidConfigValueError { .. })
        ));
    }
}
