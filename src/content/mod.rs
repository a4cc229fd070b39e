//! Page content store.
//!
//! Each editable marketing page owns exactly one JSON document, addressed by a
//! [`PageKey`]. Documents are read whole and replaced whole; nothing here looks
//! inside them beyond checking that they are well-formed JSON.

pub mod files;
pub mod pg;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub use files::FileContentStore;
pub use pg::PgContentStore;

/// The closed set of pages whose content is editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageKey {
    Home,
    About,
    Services,
    Cases,
    Blog,
    Contact,
}

impl PageKey {
    pub const ALL: [PageKey; 6] = [
        PageKey::Home,
        PageKey::About,
        PageKey::Services,
        PageKey::Cases,
        PageKey::Blog,
        PageKey::Contact,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PageKey::Home => "home",
            PageKey::About => "about",
            PageKey::Services => "services",
            PageKey::Cases => "cases",
            PageKey::Blog => "blog",
            PageKey::Contact => "contact",
        }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path segment that does not name a page in [`PageKey::ALL`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown page key `{0}`")]
pub struct InvalidPageKey(pub String);

impl FromStr for PageKey {
    type Err = InvalidPageKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageKey::ALL
            .into_iter()
            .find(|page| page.as_str() == s)
            .ok_or_else(|| InvalidPageKey(s.to_string()))
    }
}

/// Returns the fixed page enumeration.
pub fn list_pages() -> &'static [PageKey] {
    &PageKey::ALL
}

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("no stored document for page `{0}`")]
    NotFound(PageKey),

    #[error("stored document for page `{page}` is not valid JSON: {source}")]
    MalformedStorage {
        page: PageKey,
        #[source]
        source: serde_json::Error,
    },

    #[error("content storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("content database query failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to serialize document: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Durable keyed storage for page documents.
///
/// Writes replace the whole document and must never expose a half-written
/// document to a concurrent reader. Concurrent writers race; the last one wins.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Loads the whole document for `page`.
    async fn read(&self, page: PageKey) -> Result<Value, ContentError>;

    /// Replaces the document for `page` with `value`.
    async fn write(&self, page: PageKey, value: &Value) -> Result<(), ContentError>;

    /// Whether a document is stored for `page`, well-formed or not.
    async fn exists(&self, page: PageKey) -> Result<bool, ContentError>;

    /// Short backend label for logs and health output.
    fn backend_name(&self) -> &'static str;

    /// Writes `value` only if nothing is stored for `page` yet.
    /// Returns `true` when a document was installed.
    async fn seed_missing(&self, page: PageKey, value: &Value) -> Result<bool, ContentError> {
        if self.exists(page).await? {
            return Ok(false);
        }
        self.write(page, value).await?;
        Ok(true)
    }
}

/// Serializes a document the way every backend stores it: two-space indent,
/// object keys in insertion order, trailing newline.
pub fn render_document(value: &Value) -> Result<String, ContentError> {
    let mut rendered = serde_json::to_string_pretty(value).map_err(ContentError::Serialize)?;
    rendered.push('\n');
    Ok(rendered)
}

/// Parses stored bytes back into a document, all or nothing.
pub fn parse_document(page: PageKey, bytes: &[u8]) -> Result<Value, ContentError> {
    serde_json::from_slice(bytes).map_err(|source| ContentError::MalformedStorage { page, source })
}

/// Installs the bundled seed document of every page that has nothing stored.
///
/// Seeds are read from `seed_dir/<page>.json`; a page without a seed file is
/// skipped with a warning.
pub async fn seed_from_dir(
    store: &dyn ContentStore,
    seed_dir: &std::path::Path,
) -> Result<usize, ContentError> {
    let mut installed = 0;
    for page in PageKey::ALL {
        let path = seed_dir.join(format!("{page}.json"));
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(page = %page, path = %path.display(), "no seed document for page");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let value = parse_document(page, &bytes)?;
        if store.seed_missing(page, &value).await? {
            tracing::info!(page = %page, backend = store.backend_name(), "seeded page content");
            installed += 1;
        }
    }
    Ok(installed)
}
