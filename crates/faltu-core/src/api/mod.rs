//! REST API client module for the FaltuAI backend.
//!
//! This module provides the `ApiClient` for submitting stock analyses,
//! roasting resumes, and listing skill assessments.
//!
//! Protected endpoints use JWT bearer token authentication; the token is
//! obtained through the Google OAuth login flow handled by `crate::auth`.

pub mod client;
pub mod error;

pub use client::{ApiClient, JsonJobSource, ResumeUpload};
pub use error::{ApiError, ApiResult, ErrorKind};
