pub mod config;
pub mod environment;
pub mod error;
pub mod executor;
pub mod http;
pub mod types;

pub use config::ClientConfig;
pub use environment::EnvironmentApi;
pub use error::{ApiError, ApiResult};
pub use executor::{Body, Method, RequestDescriptor, RequestExecutor};
pub use http::HttpExecutor;
pub use types::{DataResponse, EnvStatus, Environment, EnvironmentQuery, PageResponse};

pub mod prelude {
    pub use crate::config::*;
    pub use crate::environment::*;
    pub use crate::error::*;
    pub use crate::executor::*;
    pub use crate::http::*;
    pub use crate::types::*;
}
