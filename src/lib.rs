//! OAuth2 Authorization Code flow demo
//!
//! A thin web app that redirects the browser to an identity provider,
//! exchanges the returned authorization code for an access token, and calls
//! a protected downstream API with the bearer token.
//!
//! # Flow
//! browser -> GET /Home/InvokeApi -> provider /authorize
//! -> GET /Home/InvokeApiCallback?code=... -> POST /oauth/token
//! -> GET downstream API with `Authorization: Bearer <token>` -> rendered page

pub mod auth;
pub mod config;
pub mod server;

pub use auth::{CodeFlowClient, CodeFlowConfig, CodeFlowError};
pub use config::{ConfigError, Settings};
pub use server::{start_server, AppState};
