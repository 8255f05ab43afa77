use std::path::Path;

/// Document formats the ingestion pipeline accepts.
pub fn is_supported_document(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    matches!(ext.as_str(), "pdf" | "txt" | "md")
}
