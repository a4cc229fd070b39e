use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::{parse_document, render_document, ContentError, ContentStore, PageKey};

/// Flat-file backend: `<root>/<page>.json`.
///
/// Writes go to a uniquely named sibling file which is then renamed over the
/// target, so readers see either the old document or the new one.
#[derive(Debug, Clone)]
pub struct FileContentStore {
    root: PathBuf,
}

impl FileContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the content directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, ContentError> {
        let store = Self::new(root);
        tokio::fs::create_dir_all(&store.root).await?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, page: PageKey) -> PathBuf {
        self.root.join(format!("{page}.json"))
    }
}

#[async_trait]
impl ContentStore for FileContentStore {
    async fn read(&self, page: PageKey) -> Result<Value, ContentError> {
        let path = self.document_path(page);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ContentError::NotFound(page));
            }
            Err(e) => return Err(e.into()),
        };
        parse_document(page, &bytes)
    }

    async fn write(&self, page: PageKey, value: &Value) -> Result<(), ContentError> {
        let rendered = render_document(value)?;
        let target = self.document_path(page);
        let staging = self
            .root
            .join(format!(".{page}.json.{}.tmp", Uuid::new_v4().simple()));

        if let Err(e) = tokio::fs::write(&staging, rendered.as_bytes()).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&staging, &target).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(e.into());
        }

        tracing::debug!(page = %page, bytes = rendered.len(), path = %target.display(), "wrote page content");
        Ok(())
    }

    async fn exists(&self, page: PageKey) -> Result<bool, ContentError> {
        Ok(tokio::fs::try_exists(self.document_path(page)).await?)
    }

    fn backend_name(&self) -> &'static str {
        "files"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::seed_from_dir;
    use serde_json::json;

    fn store() -> (tempfile::TempDir, FileContentStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileContentStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn test_read_missing_document_is_not_found() {
        let (_dir, store) = store();
        let err = store.read(PageKey::About).await.unwrap_err();
        assert!(matches!(err, ContentError::NotFound(PageKey::About)));
    }

    #[tokio::test]
    async fn test_write_then_read_round_trips_every_page() {
        let (_dir, store) = store();
        for page in PageKey::ALL {
            let doc = json!({
                "ar": { "nav": { "home": "الرئيسية" }, "page": page.as_str() },
                "en": {
                    "nav": { "home": "Home" },
                    "services": [
                        { "title": "Strategy", "description": "Plans", "features": ["a", "b"] },
                        { "title": "Audit", "description": "Review", "image": null }
                    ]
                }
            });
            store.write(page, &doc).await.unwrap();
            assert_eq!(store.read(page).await.unwrap(), doc);
        }
    }

    #[tokio::test]
    async fn test_write_replaces_whole_document() {
        let (_dir, store) = store();
        store
            .write(PageKey::Home, &json!({ "en": { "a": 1 }, "ar": { "b": 2 } }))
            .await
            .unwrap();
        store
            .write(PageKey::Home, &json!({ "en": { "c": 3 } }))
            .await
            .unwrap();
        assert_eq!(
            store.read(PageKey::Home).await.unwrap(),
            json!({ "en": { "c": 3 } })
        );
    }

    #[tokio::test]
    async fn test_write_uses_two_space_indent_and_leaves_no_staging_files() {
        let (dir, store) = store();
        store
            .write(PageKey::Contact, &json!({ "en": { "email": "hi@firm.example" } }))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(dir.path().join("contact.json")).unwrap();
        assert_eq!(
            raw,
            "{\n  \"en\": {\n    \"email\": \"hi@firm.example\"\n  }\n}\n"
        );

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, vec!["contact.json".to_string()]);
    }

    #[tokio::test]
    async fn test_read_malformed_file_fails_whole() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("blog.json"), "{\"en\": {\"posts\": [").unwrap();
        let err = store.read(PageKey::Blog).await.unwrap_err();
        assert!(matches!(err, ContentError::MalformedStorage { .. }));
    }

    #[tokio::test]
    async fn test_seed_missing_does_not_overwrite() {
        let (_dir, store) = store();
        let edited = json!({ "en": { "hero": { "title": "Edited" } } });
        store.write(PageKey::Home, &edited).await.unwrap();

        let installed = store
            .seed_missing(PageKey::Home, &json!({ "en": { "hero": { "title": "Seed" } } }))
            .await
            .unwrap();
        assert!(!installed);
        assert_eq!(store.read(PageKey::Home).await.unwrap(), edited);

        let installed = store
            .seed_missing(PageKey::Cases, &json!({ "en": {} }))
            .await
            .unwrap();
        assert!(installed);
    }

    #[tokio::test]
    async fn test_seed_from_dir_installs_available_seeds() {
        let seeds = tempfile::tempdir().unwrap();
        std::fs::write(seeds.path().join("home.json"), "{\"en\": {\"hero\": {}}}").unwrap();
        std::fs::write(seeds.path().join("about.json"), "{\"ar\": {}}").unwrap();

        let (_dir, store) = store();
        let installed = seed_from_dir(&store, seeds.path()).await.unwrap();
        assert_eq!(installed, 2);
        assert_eq!(
            store.read(PageKey::About).await.unwrap(),
            json!({ "ar": {} })
        );
        assert!(!store.exists(PageKey::Blog).await.unwrap());
    }

    #[tokio::test]
    async fn test_open_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("content");
        let store = FileContentStore::open(&nested).await.unwrap();
        assert!(store.root().is_dir());
    }
}
