//! Markdown document trees.
//!
//! This module handles:
//! - Parsing markdown with comrak
//! - Converting the comrak AST into a typed [`Node`] tree
//! - Walking that tree as a stream of enter/leave events

mod parser;
mod types;

pub use parser::{parse, slugify};
pub use types::{ListKind, Node, NodeKind};

/// Image file extensions that should be rendered inline.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "tiff", "tif"];

/// Prepare file content for rendering based on its extension.
///
/// Image files are wrapped as a markdown image reference so they render as
/// a single-image page. Everything else passes through unchanged.
pub fn prepare_content(file_path: &std::path::Path, content: String) -> String {
    if is_image_file(file_path) {
        return image_markdown(file_path);
    }
    content
}

/// Returns true if the file extension is a recognized image format.
pub fn is_image_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Generate markdown content that displays an image file.
///
/// Uses angle brackets around the URL so filenames with spaces or
/// parentheses are parsed correctly by `CommonMark`.
pub fn image_markdown(path: &std::path::Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    format!("![{name}](<{name}>)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn first_image(node: &Node) -> Option<String> {
        if let NodeKind::Image { destination, .. } = node.kind() {
            return Some(destination.clone());
        }
        node.children().iter().find_map(first_image)
    }

    #[test]
    fn test_prepare_content_passes_markdown_through() {
        let content = "# Hello\nworld".to_string();
        let result = prepare_content(Path::new("README.md"), content.clone());
        assert_eq!(result, content);
    }

    #[test]
    fn test_prepare_content_wraps_png_as_image() {
        let result = prepare_content(Path::new("photo.png"), "binary data".to_string());
        assert!(result.contains("![photo.png](<photo.png>)"));
    }

    #[test]
    fn test_prepare_content_image_extension_case_insensitive() {
        let result = prepare_content(Path::new("photo.PNG"), "data".to_string());
        assert!(result.contains("![photo.PNG]"));
    }

    #[test]
    fn test_image_markdown_with_spaces_parses_as_image() {
        let md = image_markdown(Path::new("image support.png"));
        let doc = parse(&md);
        assert_eq!(first_image(&doc).as_deref(), Some("image support.png"));
    }

    #[test]
    fn test_image_markdown_with_parens_parses_as_image() {
        let md = image_markdown(Path::new("photo (1).jpg"));
        let doc = parse(&md);
        assert_eq!(first_image(&doc).as_deref(), Some("photo (1).jpg"));
    }
}
