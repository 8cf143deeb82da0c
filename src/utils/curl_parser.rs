use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use std::str::FromStr;

use crate::upload::{Endpoint, UploadError};

/// Extracts the target URL and static headers from a request copied as cURL
/// out of a browser's developer tools.
#[derive(Clone, Default)]
pub struct CurlParser;

impl CurlParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, curl_text: &str) -> Result<Endpoint, UploadError> {
        let url = Self::extract_url(curl_text)
            .ok_or_else(|| UploadError::InvalidCurl("could not find the request URL".into()))?;

        let mut headers = HeaderMap::new();
        for line in curl_text.lines() {
            let line = line.trim().trim_end_matches('\\').trim();
            let Some(content) = line
                .strip_prefix("-H ")
                .or_else(|| line.strip_prefix("--header "))
            else {
                continue;
            };
            let content = content.trim().trim_matches(|c| c == '\'' || c == '"');

            let Some((key, value)) = content.split_once(':') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim();

            if let Ok(header_name) = HeaderName::from_str(&key) {
                // The multipart body brings its own framing headers.
                if header_name == CONTENT_TYPE || header_name == CONTENT_LENGTH {
                    continue;
                }
                if let Ok(header_value) = HeaderValue::from_str(value) {
                    headers.insert(header_name, header_value);
                }
            }
        }

        Ok(Endpoint { url, headers })
    }

    fn extract_url(curl_text: &str) -> Option<String> {
        let rest = curl_text.trim_start().strip_prefix("curl")?;
        rest.split_whitespace()
            .map(|token| token.trim_matches(|c| c == '\'' || c == '"'))
            .find(|token| token.starts_with("http://") || token.starts_with("https://"))
            .map(str::to_string)
    }
}
