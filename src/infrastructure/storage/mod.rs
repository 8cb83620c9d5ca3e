use std::path::{Component, Path, PathBuf};

pub mod fs_file_store;
pub mod s3_file_store;

pub use fs_file_store::FsFileStore;
pub use s3_file_store::S3FileStore;

/// Validates an object key such as `products/abc.png` and turns it into a
/// relative path. Absolute keys and `..` segments are rejected.
pub(crate) fn relative_key_path(key: &str) -> anyhow::Result<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(key.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => continue,
            _ => anyhow::bail!("forbidden object key {key:?}"),
        }
    }
    if relative.as_os_str().is_empty() {
        anyhow::bail!("empty object key");
    }
    Ok(relative)
}

pub(crate) fn object_key(area: &str, file_name: &str) -> String {
    format!("{area}/{file_name}")
}

pub(crate) fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_keys_are_rejected() {
        assert!(relative_key_path("../etc/passwd").is_err());
        assert!(relative_key_path("products/../../x").is_err());
        assert!(relative_key_path("").is_err());
        assert_eq!(
            relative_key_path("/products/./a.png").unwrap(),
            PathBuf::from("products/a.png")
        );
    }

    #[test]
    fn urls_join_with_single_slash() {
        assert_eq!(
            public_url("https://cdn.example/", "/reviews/a.png"),
            "https://cdn.example/reviews/a.png"
        );
        assert_eq!(public_url("/api/uploads", "products/b.jpg"), "/api/uploads/products/b.jpg");
    }
}
