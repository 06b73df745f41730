//! Lodging API client library
//!
//! An async client for the lodging management API. It attaches bearer
//! tokens, classifies network failures, normalizes error envelopes and
//! coordinates a single shared token refresh across concurrent requests.

pub mod auth;
pub mod envelope;
pub mod error;
pub mod network;
pub mod notify;
pub mod storage;
pub mod transport;

mod client;
mod config;

pub use client::*;
pub use config::*;
pub use error::Error;
