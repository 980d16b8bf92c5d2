use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use super::{Banners, DocumentLocation, Loaded, Repository, RepositoryError, StorageKind};
use crate::node::{Map, Node};

const EXTENSION: &str = "yml";
const BANNER_RULE: &str = "# +----------------------------------------------------+ #";

/// Hierarchical file store: one YAML file per document.
///
/// A document lives at `<root>/<resolved path>/<doc_id>.yml` and the file
/// holds a single top-level section named after the document ID. Header and
/// footer banners are written as comment blocks around that section; they
/// are not read back.
#[derive(Debug, Clone)]
pub struct YamlRepository {
    root: PathBuf,
}

impl YamlRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of the file backing a document.
    pub fn file_path(&self, location: &DocumentLocation) -> PathBuf {
        self.root
            .join(self.resolve_path(location))
            .join(format!("{}.{EXTENSION}", location.doc_id))
    }

    fn render(location: &DocumentLocation, root: &Map, banners: &Banners, path: &Path) -> Result<String, RepositoryError> {
        let mut document = Map::new();
        document.insert(location.doc_id.clone(), root.clone());
        let value: serde_yaml::Value = Node::Map(document).into();
        let body = serde_yaml::to_string(&value).map_err(|source| RepositoryError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

        let mut out = banner_block(&banners.header);
        out.push_str(&body);
        out.push_str(&banner_block(&banners.footer));
        Ok(out)
    }
}

fn banner_block(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut out = format!("{BANNER_RULE}\n");
    for line in lines {
        out.push_str("# ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(BANNER_RULE);
    out.push('\n');
    out
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> RepositoryError {
    let path = path.to_path_buf();
    move |source| RepositoryError::Io { path, source }
}

async fn write_atomic(path: &Path, contents: &str) -> Result<(), RepositoryError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_err(parent))?;
    }

    // Same directory as the target so the rename cannot cross filesystems.
    // Each writer gets its own temp file; concurrent saves race only on the rename.
    let temp_path = path.with_extension(format!("{EXTENSION}.{}.tmp", Uuid::new_v4().simple()));
    let result = write_then_rename(&temp_path, path, contents).await;
    if result.is_err() {
        let _ = tokio::fs::remove_file(&temp_path).await;
    }
    result
}

async fn write_then_rename(temp_path: &Path, path: &Path, contents: &str) -> Result<(), RepositoryError> {
    let mut file = tokio::fs::File::create(temp_path)
        .await
        .map_err(io_err(temp_path))?;
    file.write_all(contents.as_bytes())
        .await
        .map_err(io_err(temp_path))?;
    file.sync_all().await.map_err(io_err(temp_path))?;
    drop(file);

    tokio::fs::rename(temp_path, path).await.map_err(io_err(path))
}

#[async_trait]
impl Repository for YamlRepository {
    fn kind(&self) -> StorageKind {
        StorageKind::File
    }

    async fn load(&self, location: &DocumentLocation) -> Result<Loaded, RepositoryError> {
        let path = self.file_path(location);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no file, first access");
                return Ok(Loaded::missing());
            }
            Err(source) => return Err(RepositoryError::Io { path, source }),
        };

        let value: serde_yaml::Value = serde_yaml::from_str(&text).map_err(|source| RepositoryError::Yaml {
            path: path.clone(),
            source,
        })?;
        let root = match Node::from(value) {
            Node::Null => Map::new(),
            Node::Map(mut document) => match document.remove(&location.doc_id) {
                Some(Node::Map(section)) => section,
                None | Some(Node::Null) => Map::new(),
                Some(other) => {
                    return Err(RepositoryError::Malformed {
                        doc_id: location.doc_id.clone(),
                        reason: format!("section is a {}", other.type_name()),
                    });
                }
            },
            other => {
                return Err(RepositoryError::Malformed {
                    doc_id: location.doc_id.clone(),
                    reason: format!("file root is a {}", other.type_name()),
                });
            }
        };
        Ok(Loaded::found(root))
    }

    async fn save(&self, location: &DocumentLocation, root: &Map, banners: &Banners) -> Result<(), RepositoryError> {
        let path = self.file_path(location);
        let contents = Self::render(location, root, banners, &path)?;
        write_atomic(&path, &contents).await?;
        debug!(path = %path.display(), bytes = contents.len(), "wrote document file");
        Ok(())
    }

    async fn delete(&self, location: &DocumentLocation) -> Result<bool, RepositoryError> {
        let path = self.file_path(location);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(RepositoryError::Io { path, source }),
        }
    }

    async fn list_documents(&self, base_path: &str) -> Result<Vec<String>, RepositoryError> {
        let dir = self.root.join(base_path);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(RepositoryError::Io { path: dir, source }),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| RepositoryError::Io {
                path: dir.clone(),
                source,
            })?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == EXTENSION)
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}
