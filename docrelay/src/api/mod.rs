//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for every endpoint
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - `GET /`: service banner (omitted when the client bundle is served)
//! - `GET /api/health`: liveness probe
//! - `POST /api/upload`: store a file and have it analysed
//! - `POST /api/get-content`: relay a content request for a stored file
//! - `POST /api/generate-audio`: relay a speech synthesis request
//! - `GET /uploads/*`: stored files
//!
//! All JSON errors have the shape `{"error": "..."}`. OpenAPI documentation is served at
//! `/api/docs`.

pub mod handlers;
pub mod models;
