//! Wire conventions of the report generation service.
//!
//! Request and response bodies are `pfegen_core::ReportRequest` and
//! `pfegen_core::ReportResult`. The service answers every POST with a JSON
//! body, including on 4xx/5xx (`{"success": false, "error": "..."}`), so the
//! HTTP status alone never decides the outcome.

/// Correlates a client call with server-side logs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Fallback name when a download link carries no usable filename.
pub const DEFAULT_PDF_NAME: &str = "rapport.pdf";

/// Reduce a server-suggested filename to a bare file name, so a download can
/// never escape its target directory.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    if base.is_empty() || base == "." || base == ".." {
        None
    } else {
        Some(base.to_string())
    }
}
