//! Endpoint wrappers for `/deployment/environment`.
//!
//! Each call builds exactly one [`RequestDescriptor`] and returns whatever the
//! executor yields. Payloads are not validated here; see
//! [`Environment::validate`](crate::types::Environment::validate) for the
//! client-side checks.

use crate::error::{ApiError, ApiResult};
use crate::executor::{RequestDescriptor, RequestExecutor};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;

const ENVIRONMENT_PATH: &str = "/deployment/environment";

pub struct EnvironmentApi<E> {
    executor: E,
}

impl<E: RequestExecutor> EnvironmentApi<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub async fn list_env<Q>(&self, query: &Q) -> ApiResult<Value>
    where
        Q: Serialize + ?Sized,
    {
        let request = RequestDescriptor::get(format!("{}/list", ENVIRONMENT_PATH))
            .with_params(serde_json::to_value(query)?);
        self.executor.execute(request).await
    }

    pub async fn get_env(&self, env_id: impl Display) -> ApiResult<Value> {
        let request = RequestDescriptor::get(item_path(&env_id)?);
        self.executor.execute(request).await
    }

    pub async fn add_env<D>(&self, data: &D) -> ApiResult<Value>
    where
        D: Serialize + ?Sized,
    {
        let request =
            RequestDescriptor::post(ENVIRONMENT_PATH).with_json(serde_json::to_value(data)?);
        self.executor.execute(request).await
    }

    /// `data` must carry the record's `envId`; the server resolves the target from the body.
    pub async fn update_env<D>(&self, data: &D) -> ApiResult<Value>
    where
        D: Serialize + ?Sized,
    {
        let request =
            RequestDescriptor::put(ENVIRONMENT_PATH).with_json(serde_json::to_value(data)?);
        self.executor.execute(request).await
    }

    pub async fn del_env(&self, env_id: impl Display) -> ApiResult<Value> {
        let request = RequestDescriptor::delete(item_path(&env_id)?);
        self.executor.execute(request).await
    }

    /// Deletes several records in one call; the server takes a comma-joined id list.
    pub async fn del_envs<I: Display>(&self, env_ids: &[I]) -> ApiResult<Value> {
        if env_ids.is_empty() {
            return Err(ApiError::Validation {
                field: "envId",
                message: "at least one id is required".to_string(),
            });
        }

        let joined = env_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.del_env(joined).await
    }

    /// Fetches the filtered records as a spreadsheet.
    pub async fn export_env<Q>(&self, query: &Q) -> ApiResult<Vec<u8>>
    where
        Q: Serialize + ?Sized,
    {
        let request = RequestDescriptor::post(format!("{}/export", ENVIRONMENT_PATH))
            .with_form(serde_json::to_value(query)?);
        self.executor.download(request).await
    }
}

/// Dot segments would be collapsed by URL normalization, so they are refused
/// along with the empty id.
fn item_path(env_id: &dyn Display) -> ApiResult<String> {
    let segment = env_id.to_string();
    if matches!(segment.as_str(), "" | "." | "..") {
        return Err(ApiError::Validation {
            field: "envId",
            message: format!("{:?} is not a usable path segment", segment),
        });
    }

    Ok(format!("{}/{}", ENVIRONMENT_PATH, encode_segment(&segment)))
}

/// Percent-encodes `segment` so it stays a single path segment.
fn encode_segment(segment: &str) -> String {
    // byte_serialize writes a space as '+', and a literal '+' as "%2B"
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
