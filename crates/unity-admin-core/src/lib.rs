//! Core library for the Unity assessment administration console.
//!
//! This crate owns everything between a console view and the remote API:
//!
//! - `auth`: the `SessionStore` holding the bearer credential, its durable
//!   storage backends, and the credential-exchange login call
//! - `api`: the `ApiClient` request pipeline, the error taxonomy, the
//!   one-shot logout sequence and typed resource calls
//! - `navigation`: console routes and the route guard
//! - `models`: request and response types of the remote API
//! - `config`: persisted client configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod navigation;

pub use api::{ApiClient, ApiError, ErrorKind, Navigator, Notifier};
pub use auth::{LoginError, SessionStore, TokenStorage};
pub use config::Config;
pub use navigation::{GuardDecision, Route, RouteGuard};
