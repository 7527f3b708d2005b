//! Static file serving: stored uploads, and the prebuilt client bundle in production.

use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Serve files from the uploads directory; unknown names are a plain 404.
pub fn uploads_service(uploads_dir: &Path) -> ServeDir {
    ServeDir::new(uploads_dir)
}

/// Serve the client bundle, answering unknown paths with `index.html` so client-side routes work
pub fn client_bundle_service(dist_dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(dist_dir).fallback(ServeFile::new(dist_dir.join("index.html")))
}
