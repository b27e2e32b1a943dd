use super::disposition::filename_from_disposition;
use super::error::{ApiError, ApiResult};
use super::types::{
    BypassRulesDto, CacheRulesDto, CacheRulesPayload, Download, LegacyLogTail, LogQuery,
    LogSource, ReadResponse, RuleMap, SaveResponse, ValidationResult,
};
use crate::config::ApiConfig;
use reqwest::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE, IF_MATCH};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// HTTP client for the Mamotama admin API.
///
/// Paths passed to the helpers are relative to the configured base, which
/// already contains the API base path (e.g. `http://127.0.0.1:9090/mamotama-api`).
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout: Duration) -> ApiResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|e| ApiError::InvalidBase(format!("{}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()?;

        let api_key = api_key
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from);

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    pub fn from_config(config: &ApiConfig) -> ApiResult<Self> {
        Self::new(
            &config.base_url,
            config.api_key.as_deref(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    /// Read a JSON body, falling back to `{}` when it does not parse, and turn
    /// a non-success status into an error carrying the body's `error` field.
    async fn json_body(response: Response) -> ApiResult<Value> {
        let status = response.status();
        let body = lenient_json(&response.text().await?);

        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        Ok(body)
    }

    fn decode<T: DeserializeOwned>(body: Value) -> ApiResult<T> {
        Ok(serde_json::from_value(body)?)
    }

    pub async fn get_text(&self, path: &str) -> ApiResult<String> {
        debug!(path, "GET text");
        let response = self.request(self.client.get(self.url(path))).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::http(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }

    fn get(&self, path: &str, query: &[(&str, String)]) -> RequestBuilder {
        let builder = self.client.get(self.url(path));
        if query.is_empty() {
            builder
        } else {
            builder.query(query)
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> ApiResult<T> {
        debug!(path, "GET json");
        let response = self.request(self.get(path, query)).send().await?;
        let body = Self::json_body(response).await?;
        Self::decode(body)
    }

    pub async fn post_text(&self, path: &str, body: String) -> ApiResult<()> {
        debug!(path, bytes = body.len(), "POST text");
        let response = self
            .request(
                self.client
                    .post(self.url(path))
                    .header(CONTENT_TYPE, "text/plain")
                    .body(body),
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::http(response.status().as_u16()));
        }

        Ok(())
    }

    /// PUT with an optional `If-Match` precondition.
    pub async fn put_json<T, B>(&self, path: &str, body: &B, if_match: Option<&str>) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(path, if_match, "PUT json");
        let mut builder = self.client.put(self.url(path));
        if let Some(etag) = if_match.filter(|e| !e.is_empty()) {
            builder = builder.header(IF_MATCH, etag);
        }
        let response = self.send_json(builder, body).await?;
        let body = Self::json_body(response).await?;
        Self::decode(body)
    }

    async fn send_json<B: Serialize + ?Sized>(&self, builder: RequestBuilder, body: &B) -> ApiResult<Response> {
        Ok(self.request(builder.json(body)).send().await?)
    }

    /// POST to a `:validate` endpoint. The backend answers 200 or 422 with
    /// `{ok, messages}`; both are results. Anything else is an error.
    pub async fn validate<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<ValidationResult> {
        debug!(path, "POST validate");
        let response = self.send_json(self.client.post(self.url(path)), body).await?;
        let status = response.status();
        let text = response.text().await?;

        if let Ok(result) = serde_json::from_str::<ValidationResult>(&text) {
            return Ok(result);
        }

        Err(error_from_body(status, &lenient_json(&text)))
    }

    pub async fn get_blob(&self, path: &str, query: &[(&str, String)]) -> ApiResult<Download> {
        debug!(path, "GET blob");
        let response = self.request(self.get(path, query)).send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = if text.trim().is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                format!("HTTP {}: {}", status.as_u16(), text.trim())
            };
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        };
        let filename = header(CONTENT_DISPOSITION).and_then(|d| filename_from_disposition(&d));
        let content_type = header(CONTENT_TYPE);
        let blob = response.bytes().await?;

        Ok(Download {
            blob,
            filename,
            content_type,
        })
    }

    // Endpoints

    pub async fn status(&self) -> ApiResult<Value> {
        self.get_json("/status", &[]).await
    }

    /// Legacy `GET /logs`: the last lines of the WAF log as plain strings.
    pub async fn log_tail(&self) -> ApiResult<LegacyLogTail> {
        self.get_json("/logs", &[]).await
    }

    pub async fn read_logs(&self, query: &LogQuery) -> ApiResult<ReadResponse> {
        self.get_json("/logs/read", &query.to_params()).await
    }

    /// `from`/`to` are RFC 3339 timestamps the backend filters `ts` against.
    pub async fn download_logs(&self, src: LogSource, from: Option<&str>, to: Option<&str>) -> ApiResult<Download> {
        let mut params = vec![("src", src.as_str().to_string())];
        if let Some(from) = from {
            params.push(("from", from.to_string()));
        }
        if let Some(to) = to {
            params.push(("to", to.to_string()));
        }
        self.get_blob("/logs/download", &params).await
    }

    pub async fn rules(&self) -> ApiResult<RuleMap> {
        // The backend wraps the map as {"rules": {...}}; accept a bare map too.
        let body: Value = self.get_json("/rules", &[]).await?;
        let map = match body {
            Value::Object(mut obj) => match obj.remove("rules") {
                Some(inner @ Value::Object(_)) => inner,
                Some(other) => {
                    obj.insert("rules".to_string(), other);
                    Value::Object(obj)
                }
                None => Value::Object(obj),
            },
            other => other,
        };
        Self::decode(map)
    }

    pub async fn bypass_raw(&self) -> ApiResult<String> {
        self.get_text("/bypass").await
    }

    pub async fn save_bypass_raw(&self, raw: String) -> ApiResult<()> {
        self.post_text("/bypass", raw).await
    }

    pub async fn bypass_rules(&self) -> ApiResult<BypassRulesDto> {
        self.get_json("/bypass-rules", &[]).await
    }

    pub async fn validate_bypass_rules(&self, raw: &str) -> ApiResult<ValidationResult> {
        self.validate("/bypass-rules:validate", &serde_json::json!({ "raw": raw }))
            .await
    }

    pub async fn save_bypass_rules(&self, raw: &str, etag: Option<&str>) -> ApiResult<SaveResponse> {
        self.put_json("/bypass-rules", &serde_json::json!({ "raw": raw }), etag)
            .await
    }

    pub async fn cache_rules(&self) -> ApiResult<CacheRulesDto> {
        self.get_json("/cache-rules", &[]).await
    }

    pub async fn validate_cache_rules(&self, payload: &CacheRulesPayload) -> ApiResult<ValidationResult> {
        self.validate("/cache-rules:validate", payload).await
    }

    pub async fn save_cache_rules(&self, payload: &CacheRulesPayload, etag: Option<&str>) -> ApiResult<SaveResponse> {
        self.put_json("/cache-rules", payload, etag).await
    }
}

fn lenient_json(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::Object(Default::default()))
}

fn error_from_body(status: StatusCode, body: &Value) -> ApiError {
    let message = body
        .get("error")
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    ApiError::Http {
        status: status.as_u16(),
        message,
    }
}
