use std::fmt;

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "m4v", "flv", "webm", "mpeg", "3gp", "m4p", "m2ts", "mts",
    "vob", "ogv",
];

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "svg", "webp", "ico",
];

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "odt", "ods", "odp", "csv",
    "tsv", "epub", "md",
];

/// Coarse classification derived from a file's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Video,
    Image,
    Document,
    Other,
}

impl FileCategory {
    /// Classify an extension (without the dot). Matching ignores case;
    /// unknown and empty extensions are `Other`.
    pub fn from_extension(extension: &str) -> Self {
        let matches = |table: &[&str]| table.iter().any(|ext| ext.eq_ignore_ascii_case(extension));

        if matches(VIDEO_EXTENSIONS) {
            FileCategory::Video
        } else if matches(IMAGE_EXTENSIONS) {
            FileCategory::Image
        } else if matches(DOCUMENT_EXTENSIONS) {
            FileCategory::Document
        } else {
            FileCategory::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileCategory::Video => "video",
            FileCategory::Image => "image",
            FileCategory::Document => "document",
            FileCategory::Other => "other",
        }
    }

    /// Inverse of [`FileCategory::as_str`]; unrecognised labels map to `Other`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "video" => FileCategory::Video,
            "image" => FileCategory::Image,
            "document" => FileCategory::Document,
            _ => FileCategory::Other,
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        assert_eq!(FileCategory::from_extension("mkv"), FileCategory::Video);
        assert_eq!(FileCategory::from_extension("png"), FileCategory::Image);
        assert_eq!(FileCategory::from_extension("md"), FileCategory::Document);
        assert_eq!(FileCategory::from_extension("JPEG"), FileCategory::Image);
    }

    #[test]
    fn test_unknown_and_empty_are_other() {
        assert_eq!(FileCategory::from_extension(""), FileCategory::Other);
        assert_eq!(FileCategory::from_extension("rs"), FileCategory::Other);
        assert_eq!(FileCategory::from_extension(".txt"), FileCategory::Other);
    }

    #[test]
    fn test_label_roundtrip_and_fallback() {
        for category in [
            FileCategory::Video,
            FileCategory::Image,
            FileCategory::Document,
            FileCategory::Other,
        ] {
            assert_eq!(FileCategory::from_label(category.as_str()), category);
        }
        assert_eq!(FileCategory::from_label("audio"), FileCategory::Other);
    }
}
