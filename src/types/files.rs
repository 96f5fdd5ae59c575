//! Uploadable file sets.
//!
//! Create calls accept no file, a single file, or many files. `FileSet` is
//! resolved once at the call boundary into a flat list of [`UploadFile`]
//! parts; multipart encoding only ever sees that canonical form.

use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::defaults;

/// One named part of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    filename: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

impl UploadFile {
    /// An unnamed blob (sent as `upload`).
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: None,
            content_type: None,
            bytes: bytes.into(),
        }
    }

    /// A named file; the content type is guessed from the name.
    pub fn named(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self::new(bytes).with_filename(filename)
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a file from disk, naming the part after the file name.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Ok(Self::named(file_name_of(path), bytes))
    }

    /// Async variant of [`UploadFile::from_path`].
    pub async fn from_path_async(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::named(file_name_of(path), bytes))
    }

    pub fn filename(&self) -> &str {
        self.filename.as_deref().unwrap_or(defaults::upload::FILENAME)
    }

    /// Explicit content type, else a guess from the filename, else
    /// `application/octet-stream`.
    pub fn content_type(&self) -> String {
        if let Some(ct) = &self.content_type {
            return ct.clone();
        }
        self.filename
            .as_deref()
            .and_then(|name| mime_guess::from_path(name).first())
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| defaults::upload::CONTENT_TYPE.to_string())
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| defaults::upload::FILENAME.to_string())
}

/// Zero, one or many files attached to a create call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FileSet {
    #[default]
    None,
    Single(UploadFile),
    Many(Vec<UploadFile>),
}

impl FileSet {
    /// Upload every regular file under `dir`, recursively.
    ///
    /// Part names are paths relative to the parent of `dir` using `/`
    /// separators (`my-skill/SKILL.md`), in lexicographic order.
    pub fn from_dir(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref();
        let root = dir.parent().unwrap_or(dir);
        let mut paths = Vec::new();
        collect_files(dir, &mut paths)?;
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = std::fs::read(&path)?;
            let relative = path.strip_prefix(root).unwrap_or(&path);
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            files.push(UploadFile::named(name, bytes));
        }
        Ok(Self::Many(files))
    }

    /// True when no part would be uploaded.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Single(_) => false,
            Self::Many(files) => files.is_empty(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Single(_) => 1,
            Self::Many(files) => files.len(),
        }
    }

    /// Canonical form: zero or more named byte parts.
    pub fn into_parts(self) -> Vec<UploadFile> {
        match self {
            Self::None => Vec::new(),
            Self::Single(file) => vec![file],
            Self::Many(files) => files,
        }
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(&path, out)?;
        } else if file_type.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

impl From<UploadFile> for FileSet {
    fn from(file: UploadFile) -> Self {
        Self::Single(file)
    }
}

impl From<Vec<UploadFile>> for FileSet {
    fn from(files: Vec<UploadFile>) -> Self {
        Self::Many(files)
    }
}

impl From<Option<UploadFile>> for FileSet {
    fn from(file: Option<UploadFile>) -> Self {
        file.map_or(Self::None, Self::Single)
    }
}
