//! REST API client module for the assessment platform.
//!
//! This module provides the `ApiClient` request pipeline through which every
//! call to the platform passes. The platform authenticates with a bearer
//! token obtained from `/login/token` and wraps every other response in a
//! `{ code, msg, data }` envelope.

pub mod client;
pub mod envelope;
pub mod error;
pub mod logout;
pub mod resources;

pub use client::{ApiClient, ApiClientBuilder};
pub use envelope::{Envelope, FieldError};
pub use error::{ApiError, ErrorKind};
pub use logout::{LogNotifier, Navigator, Notifier, SESSION_EXPIRED_PROMPT};
