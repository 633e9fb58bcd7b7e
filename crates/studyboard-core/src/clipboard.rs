//! Classifying pasted text.

use url::Url;

/// File extensions treated as images when pasted as a URL.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg"];

/// What a paste contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteContent {
    /// An http(s) URL whose path ends in an image extension.
    ImageUrl(Url),
    Text(String),
}

/// Classify pasted text. Query strings and fragments are ignored when
/// checking the extension.
pub fn classify_paste(text: &str) -> PasteContent {
    match image_url(text) {
        Some(url) => PasteContent::ImageUrl(url),
        None => PasteContent::Text(text.to_string()),
    }
}

/// Parse `text` as an image URL.
pub fn image_url(text: &str) -> Option<Url> {
    let url = Url::parse(text.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let last = url.path_segments()?.next_back()?;
    let (_, ext) = last.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(url)
}
