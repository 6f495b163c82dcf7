//! # Classifier Module
//!
//! Infers a MIME-like type for a file.
//!
//! The extractor only depends on the [`TypeClassifier`] trait, so the lookup
//! can be swapped (e.g. for a test double) without touching metadata,
//! organize or report code.
//!
//! ## Default strategy
//! 1. Look the lowercased extension up in a fixed table
//! 2. Otherwise sniff the first bytes for a few well known signatures
//! 3. Otherwise report [`UNKNOWN_TYPE`]

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Sentinel type for files the classifier cannot identify
pub const UNKNOWN_TYPE: &str = "unknown";

const SNIFF_LEN: usize = 8;

/// Trait for type classifiers
///
/// Implement this trait to plug in another lookup (e.g., for testing).
pub trait TypeClassifier: Send + Sync {
    /// Return the type for `path`, or `None` when it cannot be determined
    fn classify(&self, path: &Path) -> Option<String>;

    /// Like [`classify`](Self::classify) but falls back to [`UNKNOWN_TYPE`]
    fn classify_or_unknown(&self, path: &Path) -> String {
        self.classify(path)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| UNKNOWN_TYPE.to_string())
    }
}

/// Extension table lookup with an optional magic-byte fallback
#[derive(Debug, Clone)]
pub struct ExtensionClassifier {
    sniff_content: bool,
}

impl ExtensionClassifier {
    pub fn new() -> Self {
        Self {
            sniff_content: true,
        }
    }

    /// Enable or disable reading the file header when the extension is unknown
    pub fn with_content_sniffing(mut self, enabled: bool) -> Self {
        self.sniff_content = enabled;
        self
    }

    /// Map a bare extension (no leading dot) to a type
    pub fn from_extension(ext: &str) -> Option<&'static str> {
        let mime = match ext.to_lowercase().as_str() {
            "txt" | "text" | "log" => "text/plain",
            "md" | "markdown" => "text/markdown",
            "csv" => "text/csv",
            "htm" | "html" => "text/html",
            "css" => "text/css",
            "xml" => "application/xml",
            "json" => "application/json",
            "pdf" => "application/pdf",
            "rtf" => "application/rtf",
            "doc" => "application/msword",
            "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "xls" => "application/vnd.ms-excel",
            "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "ppt" => "application/vnd.ms-powerpoint",
            "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            "odt" => "application/vnd.oasis.opendocument.text",
            "epub" => "application/epub+zip",
            "zip" => "application/zip",
            "gz" => "application/gzip",
            "tar" => "application/x-tar",
            "7z" => "application/x-7z-compressed",
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            "bmp" => "image/bmp",
            "tif" | "tiff" => "image/tiff",
            "svg" => "image/svg+xml",
            "heic" | "heif" => "image/heic",
            "mp3" => "audio/mpeg",
            "wav" => "audio/x-wav",
            "flac" => "audio/flac",
            "ogg" => "audio/ogg",
            "mp4" | "m4v" => "video/mp4",
            "mov" => "video/quicktime",
            "avi" => "video/x-msvideo",
            "mkv" => "video/x-matroska",
            "webm" => "video/webm",
            _ => return None,
        };
        Some(mime)
    }

    /// Identify a file from its leading bytes
    pub fn from_signature(header: &[u8]) -> Option<&'static str> {
        if header.starts_with(b"%PDF") {
            Some("application/pdf")
        } else if header.starts_with(&[0x89, b'P', b'N', b'G']) {
            Some("image/png")
        } else if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some("image/jpeg")
        } else if header.starts_with(b"GIF8") {
            Some("image/gif")
        } else if header.starts_with(b"PK\x03\x04") {
            Some("application/zip")
        } else {
            None
        }
    }

    fn sniff(path: &Path) -> Option<&'static str> {
        let mut header = [0u8; SNIFF_LEN];
        let mut file = File::open(path).ok()?;
        let read = file.read(&mut header).ok()?;
        Self::from_signature(&header[..read])
    }
}

impl Default for ExtensionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeClassifier for ExtensionClassifier {
    fn classify(&self, path: &Path) -> Option<String> {
        let by_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension);

        by_extension
            .or_else(|| {
                if self.sniff_content {
                    Self::sniff(path)
                } else {
                    None
                }
            })
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn extension_lookup_ignores_case() {
        assert_eq!(ExtensionClassifier::from_extension("pdf"), Some("application/pdf"));
        assert_eq!(ExtensionClassifier::from_extension("PDF"), Some("application/pdf"));
        assert_eq!(ExtensionClassifier::from_extension("Txt"), Some("text/plain"));
    }

    #[test]
    fn unknown_extension_returns_none() {
        assert_eq!(ExtensionClassifier::from_extension("xyz123"), None);
    }

    #[test]
    fn classify_or_unknown_uses_sentinel() {
        let classifier = ExtensionClassifier::new().with_content_sniffing(false);
        assert_eq!(
            classifier.classify_or_unknown(Path::new("/archive/blob.bin42")),
            UNKNOWN_TYPE
        );
        assert_eq!(
            classifier.classify_or_unknown(Path::new("/archive/notes.txt")),
            "text/plain"
        );
    }

    #[test]
    fn sniffs_pdf_without_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scan_0001");
        let mut file = File::create(&path).unwrap();
        file.write_all(b"%PDF-1.7\n...").unwrap();

        let classifier = ExtensionClassifier::new();
        assert_eq!(classifier.classify(&path), Some("application/pdf".to_string()));

        let no_sniff = ExtensionClassifier::new().with_content_sniffing(false);
        assert_eq!(no_sniff.classify(&path), None);
    }

    #[test]
    fn signature_table() {
        assert_eq!(
            ExtensionClassifier::from_signature(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some("image/jpeg")
        );
        assert_eq!(ExtensionClassifier::from_signature(b"GIF89a"), Some("image/gif"));
        assert_eq!(ExtensionClassifier::from_signature(b"hello"), None);
        assert_eq!(ExtensionClassifier::from_signature(&[]), None);
    }
}
