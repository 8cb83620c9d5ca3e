use async_trait::async_trait;

/// Logical folders of uploaded files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileArea {
    Products,
    Reviews,
}

impl FileArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileArea::Products => "products",
            FileArea::Reviews => "reviews",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

/// File received from a client, not yet stored.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    /// Declared content type wins; otherwise the type is guessed from the file name.
    pub fn is_image(&self) -> bool {
        match self.content_type.as_deref() {
            Some(ct) if ct != "application/octet-stream" => ct.starts_with("image/"),
            _ => self
                .file_name
                .as_deref()
                .and_then(|n| mime_guess::from_path(n).first())
                .is_some_and(|m| m.type_() == mime_guess::mime::IMAGE),
        }
    }
}

#[async_trait]
pub trait FileStore: Send + Sync {
    async fn put(&self, area: FileArea, upload: Upload) -> anyhow::Result<StoredObject>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
}

/// `{uuid}.{ext}` where the extension comes from the original name, or from the
/// content type when the name has none.
pub fn object_file_name(original_name: Option<&str>, content_type: Option<&str>) -> String {
    let ext = original_name
        .and_then(|n| std::path::Path::new(n).extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .or_else(|| {
            content_type
                .and_then(|ct| mime_guess::get_mime_extensions_str(ct))
                .and_then(|exts| exts.first())
                .map(|e| e.to_string())
        });
    let id = uuid::Uuid::new_v4();
    match ext {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_detection_prefers_declared_type() {
        let upload = |name: Option<&str>, ct: Option<&str>| Upload {
            file_name: name.map(str::to_string),
            content_type: ct.map(str::to_string),
            bytes: vec![1, 2, 3],
        };
        assert!(upload(Some("a.bin"), Some("image/webp")).is_image());
        assert!(!upload(Some("a.png"), Some("text/plain")).is_image());
        assert!(upload(Some("a.png"), Some("application/octet-stream")).is_image());
        assert!(upload(Some("photo.jpeg"), None).is_image());
        assert!(!upload(Some("notes.txt"), None).is_image());
        assert!(!upload(None, None).is_image());
    }

    #[test]
    fn keeps_safe_extension_from_original_name() {
        let name = object_file_name(Some("Photo.JPG"), None);
        assert!(name.ends_with(".jpg"));
        assert_eq!(name.len(), 36 + 4);
    }

    #[test]
    fn falls_back_to_content_type_extension() {
        let name = object_file_name(Some("blob"), Some("image/png"));
        assert!(name.ends_with(".png"));
        let bare = object_file_name(Some("../../etc/pa ss"), None);
        assert!(!bare.contains('/'));
    }
}
