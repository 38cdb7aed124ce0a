use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::executor::{Body, Method, RequestDescriptor, RequestExecutor};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

const SUCCESS_CODE: i64 = 200;
const UNAUTHORIZED_CODE: i64 = 401;

/// [`RequestExecutor`] backed by a pooled `reqwest` client.
pub struct HttpExecutor {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpExecutor {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        config
            .validate()
            .map_err(|msg| ApiError::InvalidConfig { message: msg })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::InvalidConfig {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    pub fn with_default_config() -> ApiResult<Self> {
        Self::new(ClientConfig::default())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build(&self, request: RequestDescriptor) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, request.url);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url);

        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        if let Some(params) = request.params {
            builder = builder.query(&drop_nulls(params));
        }

        match request.data {
            Some(Body::Json(data)) => builder.json(&data),
            Some(Body::Form(data)) => builder.form(&drop_nulls(data)),
            None => builder,
        }
    }

    async fn send(&self, request: RequestDescriptor) -> ApiResult<reqwest::Response> {
        debug!("{} {}", request.method, request.url);

        let response = self
            .build(request)
            .send()
            .await
            .map_err(Self::handle_http_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            warn!("Request rejected with {}", status);
            return Err(ApiError::Authentication);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn handle_http_error(err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::ServiceUnavailable {
                message: "Request timeout".to_string(),
            }
        } else if err.is_connect() {
            ApiError::ServiceUnavailable {
                message: "Cannot connect to deployment service".to_string(),
            }
        } else {
            ApiError::Network(err)
        }
    }

    /// Rejects envelopes whose `code` reports a failure; anything else passes through whole.
    fn check_envelope(body: Value) -> ApiResult<Value> {
        let code = match body.get("code").and_then(Value::as_i64) {
            Some(code) => code,
            None => return Ok(body),
        };

        match code {
            SUCCESS_CODE => Ok(body),
            UNAUTHORIZED_CODE => Err(ApiError::Authentication),
            _ => {
                let message = body
                    .get("msg")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string();
                warn!("Server returned code {}: {}", code, message);
                Err(ApiError::Server { code, message })
            }
        }
    }
}

fn is_json_response(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/json"))
        .unwrap_or(false)
}

/// Null entries have no query/form encoding, so they are left out.
fn drop_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            Value::Object(map.into_iter().filter(|(_, v)| !v.is_null()).collect())
        }
        other => other,
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn execute(&self, request: RequestDescriptor) -> ApiResult<Value> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await.map_err(ApiError::Network)?;
        let body = Self::check_envelope(serde_json::from_slice(&bytes)?)?;

        info!("Request completed successfully");
        Ok(body)
    }

    async fn download(&self, request: RequestDescriptor) -> ApiResult<Vec<u8>> {
        let response = self.send(request).await?;
        let is_json = is_json_response(&response);
        let bytes = response.bytes().await.map_err(ApiError::Network)?;

        // a rejected download comes back as a JSON envelope instead of a file
        if is_json {
            Self::check_envelope(serde_json::from_slice(&bytes)?)?;
        }

        info!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
