use crate::error::{ApiError, ApiResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const ENV_CODE_MAX_CHARS: usize = 64;
const ENV_NAME_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvStatus {
    #[serde(rename = "0")]
    Normal,
    #[serde(rename = "1")]
    Disabled,
}

/// An environment record as the deployment backend stores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_sort: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EnvStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl Environment {
    pub fn new(env_code: impl Into<String>, env_name: impl Into<String>, env_sort: i32) -> Self {
        Self {
            env_code: Some(env_code.into()),
            env_name: Some(env_name.into()),
            env_sort: Some(env_sort),
            status: Some(EnvStatus::Normal),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, env_id: i64) -> Self {
        self.env_id = Some(env_id);
        self
    }

    pub fn with_status(mut self, status: EnvStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }

    /// Checks the field rules the backend enforces on add and edit.
    pub fn validate(&self) -> ApiResult<()> {
        check_text("envCode", self.env_code.as_deref(), ENV_CODE_MAX_CHARS)?;
        check_text("envName", self.env_name.as_deref(), ENV_NAME_MAX_CHARS)?;

        if self.env_sort.is_none() {
            return Err(ApiError::Validation {
                field: "envSort",
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

fn check_text(field: &'static str, value: Option<&str>, max_chars: usize) -> ApiResult<()> {
    let value = value.unwrap_or_default();
    if value.trim().is_empty() {
        return Err(ApiError::Validation {
            field,
            message: "must not be blank".to_string(),
        });
    }

    if value.chars().count() > max_chars {
        return Err(ApiError::Validation {
            field,
            message: format!("must not exceed {} characters", max_chars),
        });
    }

    Ok(())
}

/// Filters and paging accepted by the list and export endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EnvStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub page_num: u32,
    pub page_size: u32,
}

impl Default for EnvironmentQuery {
    fn default() -> Self {
        Self {
            env_code: None,
            env_name: None,
            status: None,
            begin_time: None,
            end_time: None,
            page_num: 1,
            page_size: 10,
        }
    }
}

impl EnvironmentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env_code(mut self, env_code: impl Into<String>) -> Self {
        self.env_code = Some(env_code.into());
        self
    }

    pub fn with_env_name(mut self, env_name: impl Into<String>) -> Self {
        self.env_name = Some(env_name.into());
        self
    }

    pub fn with_status(mut self, status: EnvStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_time_range(mut self, begin: impl Into<String>, end: impl Into<String>) -> Self {
        self.begin_time = Some(begin.into());
        self.end_time = Some(end.into());
        self
    }

    pub fn with_page(mut self, page_num: u32, page_size: u32) -> Self {
        self.page_num = page_num;
        self.page_size = page_size;
        self
    }
}

/// Paged list envelope returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    #[serde(default = "Vec::new")]
    pub rows: Vec<T>,
    #[serde(default)]
    pub page_num: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub has_next: bool,
}

impl<T: DeserializeOwned> PageResponse<T> {
    pub fn from_value(value: Value) -> ApiResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Single-record envelope returned by the detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T: DeserializeOwned> DataResponse<T> {
    pub fn from_value(value: Value) -> ApiResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}
