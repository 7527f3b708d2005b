//! Request and response bodies of the HTTP API.

pub mod audio;
pub mod content;
pub mod health;
pub mod upload;
