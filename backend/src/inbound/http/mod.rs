//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

use crate::domain::Error;

pub mod error;
pub mod health;
pub mod optimize;
pub mod route_plans;
pub mod state;

pub use error::ApiResult;

/// JSON extractor configuration shared by every handler.
///
/// Malformed or mistyped bodies are reported with the standard error envelope
/// rather than Actix's plain-text default.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use route_optimizer::inbound::http::json_config;
///
/// let _app = App::new().app_data(json_config());
/// ```
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("invalid request body: {err}")).into()
    })
}
