//! Content-type inference from file extensions

use codex_refs::extension;

/// Fallback MIME type when the extension is unknown or absent
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Infer a MIME type from a document path.
///
/// Covers the document and source formats that flow through a knowledge
/// repository; anything else falls back to `application/octet-stream`.
pub fn content_type_for_path(path: &str) -> &'static str {
    match extension(path).as_deref() {
        Some("md" | "markdown") => "text/markdown",
        Some("txt") => "text/plain",
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("yaml" | "yml") => "application/yaml",
        Some("toml") => "application/toml",
        Some("xml") => "application/xml",
        Some("pdf") => "application/pdf",
        Some("js") => "text/javascript",
        Some("ts" | "py" | "rs" | "go" | "java" | "rb" | "sh") => "text/plain",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        _ => DEFAULT_CONTENT_TYPE,
    }
}
