//! Flat-file post store: one `<slug>.md` file per post in a content directory.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;

use lingua_core::domain::{Post, is_valid_slug};
use lingua_core::error::RepoError;
use lingua_core::ports::{PostRepository, newest_first};

use super::front_matter;

const EXTENSION: &str = "md";

/// Markdown-with-front-matter store.
///
/// Writes go through a temp file and a rename, and are serialized by a
/// process-wide mutex so the version check and the write happen together.
pub struct FilePostRepository {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePostRepository {
    /// Open a content directory, creating it when missing.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, RepoError> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        tracing::info!(path = %root.display(), "File post store ready");
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// `None` for anything that is not a canonical slug, so lookups never leave the directory.
    fn path_for(&self, slug: &str) -> Option<PathBuf> {
        is_valid_slug(slug).then(|| self.root.join(format!("{}.{}", slug, EXTENSION)))
    }

    async fn read(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let Some(path) = self.path_for(slug) else {
            return Ok(None);
        };
        match fs::read_to_string(&path).await {
            Ok(source) => front_matter::parse(&source, slug).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, post: &Post) -> Result<(), RepoError> {
        let path = self
            .path_for(&post.slug)
            .ok_or_else(|| RepoError::Constraint(format!("invalid slug '{}'", post.slug)))?;
        let tmp = self.root.join(format!(".{}.{}.tmp", post.slug, EXTENSION));

        fs::write(&tmp, front_matter::render(post)?).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for FilePostRepository {
    async fn find_all(&self) -> Result<Vec<Post>, RepoError> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut posts = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_valid_slug(slug) {
                tracing::warn!(path = %path.display(), "Skipping post file with a non-slug name");
                continue;
            }

            // Files may be removed mid-scan or hold non-UTF-8 bytes
            let source = match fs::read_to_string(&path).await {
                Ok(source) => source,
                Err(e) if matches!(e.kind(), ErrorKind::InvalidData | ErrorKind::NotFound) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable post file");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            match front_matter::parse(&source, slug) {
                Ok(post) => posts.push(post),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable post file"),
            }
        }

        newest_first(&mut posts);
        Ok(posts)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        self.read(slug).await
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, RepoError> {
        match self.path_for(slug) {
            Some(path) => Ok(fs::try_exists(path).await?),
            None => Ok(false),
        }
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let _guard = self.write_lock.lock().await;
        if self.slug_exists(&post.slug).await? {
            return Err(RepoError::Constraint(format!(
                "slug '{}' is already in use",
                post.slug
            )));
        }
        self.write(&post).await?;
        tracing::debug!(slug = %post.slug, "Post file written");
        Ok(post)
    }

    async fn update(&self, post: Post, expected_version: u64) -> Result<Post, RepoError> {
        let _guard = self.write_lock.lock().await;
        let stored = self.read(&post.slug).await?.ok_or(RepoError::NotFound)?;
        if stored.version != expected_version {
            return Err(RepoError::StaleVersion {
                expected: expected_version,
            });
        }
        self.write(&post).await?;
        tracing::debug!(slug = %post.slug, version = post.version, "Post file rewritten");
        Ok(post)
    }

    async fn delete(&self, slug: &str, expected_version: Option<u64>) -> Result<(), RepoError> {
        let _guard = self.write_lock.lock().await;
        let stored = self.read(slug).await?.ok_or(RepoError::NotFound)?;
        if let Some(expected) = expected_version {
            if stored.version != expected {
                return Err(RepoError::StaleVersion { expected });
            }
        }
        if let Some(path) = self.path_for(slug) {
            fs::remove_file(path).await?;
        }
        Ok(())
    }
}
