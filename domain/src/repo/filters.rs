//! Content filters for the repository file walk.
//!
//! The sync only stores text likely to be documentation; binary blobs and
//! source trees are skipped up front so no tool-server round trip is spent
//! on them.

/// Extensions that mark a file as binary.
const BINARY_EXTENSIONS: &[&str] = &[
    // Images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "svg", "webp",
    // Audio
    "mp3", "wav", "ogg", "flac", "aac",
    // Video
    "mp4", "webm", "avi", "mov", "wmv", "flv",
    // Archives
    "zip", "tar", "gz", "bz2", "7z", "rar",
    // Executables
    "exe", "dll", "so", "dylib",
    // Documents and misc binary formats
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "bin", "dat", "db", "sqlite", "pyc",
    "pyo", "o", "class",
];

/// Extensions that mark a file as documentation.
const DOC_EXTENSIONS: &[&str] = &["md", "rst", "txt", "adoc", "asciidoc", "wiki", "org"];

/// Well-known documentation file stems (extension ignored).
const DOC_FILENAMES: &[&str] = &[
    "readme",
    "contributing",
    "changelog",
    "changes",
    "history",
    "license",
    "licence",
    "authors",
    "contributors",
    "maintainers",
    "hacking",
    "install",
    "installation",
    "setup",
    "getting_started",
    "getting-started",
    "guide",
    "faq",
    "help",
    "support",
    "tutorial",
    "howto",
    "how-to",
    "doc",
    "docs",
    "documentation",
];

fn extension(path: &str) -> String {
    std::path::Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn file_stem(path: &str) -> String {
    std::path::Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Whether the path looks like a binary file.
pub fn is_binary_path(path: &str) -> bool {
    BINARY_EXTENSIONS.contains(&extension(path).as_str())
}

/// Whether the path looks like documentation worth storing.
///
/// True for documentation extensions, well-known documentation filenames,
/// and anything under a `docs`/`doc`/`documentation` directory.
pub fn is_documentation_path(path: &str) -> bool {
    if DOC_EXTENSIONS.contains(&extension(path).as_str()) {
        return true;
    }

    if DOC_FILENAMES.contains(&file_stem(path).as_str()) {
        return true;
    }

    path.to_lowercase()
        .split('/')
        .any(|part| matches!(part, "docs" | "doc" | "documentation"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_extensions_detected() {
        assert!(is_binary_path("assets/logo.png"));
        assert!(is_binary_path("dist/app.EXE"));
        assert!(!is_binary_path("src/main.rs"));
        assert!(!is_binary_path("README.md"));
    }

    #[test]
    fn doc_extensions_detected() {
        assert!(is_documentation_path("README.md"));
        assert!(is_documentation_path("notes.txt"));
        assert!(is_documentation_path("manual.adoc"));
    }

    #[test]
    fn doc_filenames_detected_without_extension() {
        assert!(is_documentation_path("LICENSE"));
        assert!(is_documentation_path("CONTRIBUTING"));
        assert!(is_documentation_path("Changelog.old"));
    }

    #[test]
    fn docs_directories_detected() {
        assert!(is_documentation_path("docs/api/client.py"));
        assert!(is_documentation_path("pkg/documentation/overview.html"));
        assert!(!is_documentation_path("src/lib.rs"));
    }
}
