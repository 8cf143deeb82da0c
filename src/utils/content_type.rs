use std::path::Path;

/// Fallback when the extension is unknown.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Guesses a MIME type from a file name's extension.
pub fn detect_content_type(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("csv") => "text/csv",
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("md") => "text/markdown",
        Some("txt" | "log") => "text/plain",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        _ => OCTET_STREAM,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions() {
        assert_eq!(detect_content_type("photo.jpg"), "image/jpeg");
        assert_eq!(detect_content_type("report.pdf"), "application/pdf");
        assert_eq!(detect_content_type("notes.txt"), "text/plain");
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(detect_content_type("IMAGE.PNG"), "image/png");
    }

    #[test]
    fn unknown_falls_back() {
        assert_eq!(detect_content_type("noext"), OCTET_STREAM);
        assert_eq!(detect_content_type("archive.xyz"), OCTET_STREAM);
    }
}
