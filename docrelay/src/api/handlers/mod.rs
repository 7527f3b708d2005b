//! HTTP request handlers for all API endpoints.
//!
//! - [`upload`]: multipart upload, storage and analysis with a local fallback
//! - [`content`]: content relay for stored files
//! - [`audio`]: speech synthesis relay
//! - [`health`]: liveness probe and service banner
//! - [`static_assets`]: stored uploads and the prebuilt client bundle
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`], which converts to the matching status code and a
//! `{"error": "..."}` JSON body.

pub mod audio;
pub mod content;
pub mod health;
pub mod static_assets;
pub mod upload;
