//! Core library for faltu - a client for the FaltuAI backend.
//!
//! This crate provides:
//! - `auth`: the session gate that validates and persists the bearer token
//! - `api`: the `ApiClient` for the FaltuAI REST API
//! - `jobs`: a cancellable poller for long-running server-side jobs
//! - `models`: request and response types for each feature endpoint
//! - `config`: on-disk configuration with environment overrides

pub mod api;
pub mod auth;
pub mod config;
pub mod jobs;
pub mod models;
pub mod utils;
