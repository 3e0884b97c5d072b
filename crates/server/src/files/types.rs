//! File type lookup by extension.

use std::path::Path;

/// Extensions previewed as text regardless of content.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "json", "js", "jsx", "ts", "tsx", "mjs", "cjs", "css", "html", "xml",
    "yaml", "yml", "ini", "conf", "py", "rb", "go", "rs", "java", "c", "cpp", "h", "sh", "bash",
    "zsh", "sql", "graphql", "gql", "toml", "env", "gitignore", "eslintrc", "prettierrc", "lock",
    "tsconfig", "dockerfile", "makefile", "proto", "vue", "svelte", "astro", "cs", "kt", "kts",
    "swift", "php", "lua", "scala", "groovy", "clj", "cljs", "cljc", "gradle", "properties",
];

/// Extensions served by the image endpoint.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "svg", "webp", "bmp", "ico"];

/// Whether `ext` (as returned by [`file_extension`]) is a known text type.
pub fn is_text_extension(ext: &str) -> bool {
    TEXT_EXTENSIONS.contains(&ext)
}

/// Whether `ext` (as returned by [`file_extension`]) is a supported image type.
pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}

/// Lowercased extension of `name` without the dot.
///
/// `Dockerfile` and `Makefile` (and their `.suffix` variants) map to
/// `dockerfile` and `makefile`. Dotfiles such as `.gitignore` yield the part
/// after the dot.
pub fn file_extension(name: &str) -> String {
    let lower = name.to_lowercase();

    if lower == "dockerfile" || lower.starts_with("dockerfile.") {
        return "dockerfile".to_string();
    }
    if lower == "makefile" || lower.starts_with("makefile.") {
        return "makefile".to_string();
    }

    match lower.rfind('.') {
        Some(index) => lower[index + 1..].to_string(),
        None => String::new(),
    }
}

/// Whether a preview window should be treated as binary data.
///
/// Known text extensions are never binary. Otherwise the bytes decide: a NUL
/// byte or invalid UTF-8 marks binary, except for a multi-byte character cut
/// at either edge of the window. A window starting at `offset > 0` may begin
/// with up to three continuation bytes of the previous window's last character.
pub fn looks_binary(ext: &str, content: &[u8], offset: u64) -> bool {
    if is_text_extension(ext) {
        return false;
    }
    if content.contains(&0) {
        return true;
    }

    let body = if offset > 0 {
        let leading = content
            .iter()
            .take(3)
            .take_while(|&&b| b & 0xC0 == 0x80)
            .count();
        &content[leading..]
    } else {
        content
    };

    match std::str::from_utf8(body) {
        Ok(_) => false,
        // `error_len` is `None` when the input merely ends mid-character.
        Err(e) => e.error_len().is_some(),
    }
}

/// Content type for a file name, falling back to `application/octet-stream`.
pub fn content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
