//! Relay routes.

pub mod health;
pub mod oauth;
pub mod profile;

pub use health::{HealthResponse, health_routes};
pub use oauth::{
    CallbackParams, RefreshRequest, authorize_handler, callback_handler, refresh_handler,
};
pub use profile::{ProfileParams, profile_handler};
