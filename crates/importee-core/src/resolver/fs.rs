//! Filesystem abstraction for resolution.
//!
//! The resolver only needs four operations, all async so that many
//! resolutions can be in flight on one thread. [`OsFs`] reads from disk via
//! `tokio::fs`; [`MemoryFs`] is an in-memory tree with symlinks and
//! injectable errors for tests and non-disk hosts.

use importee_util::path::normalize;
use std::collections::HashMap;
use std::future::{self, Future};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Maximum symlink hops before a lookup is treated as a loop.
const MAX_SYMLINK_HOPS: u32 = 40;

/// Kind of a filesystem entry, after following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    /// Sockets, fifos, devices.
    Other,
}

impl From<std::fs::FileType> for FileKind {
    fn from(ft: std::fs::FileType) -> Self {
        if ft.is_file() {
            Self::File
        } else if ft.is_dir() {
            Self::Directory
        } else {
            Self::Other
        }
    }
}

/// Filesystem operations used by the resolver.
///
/// Errors follow `std::io` conventions: an absent path is reported as
/// [`io::ErrorKind::NotFound`] (or [`io::ErrorKind::NotADirectory`] when a
/// parent is a file), which the resolver treats as a miss. Every other error
/// is surfaced to the caller.
pub trait FileSystem: Send + Sync {
    /// Kind of the entry at `path`, following symlinks.
    fn stat(&self, path: &Path) -> impl Future<Output = io::Result<FileKind>> + Send;

    /// Read the full contents of a file.
    fn read_file(&self, path: &Path) -> impl Future<Output = io::Result<Vec<u8>>> + Send;

    /// Absolute path with every symlink dereferenced.
    fn realpath(&self, path: &Path) -> impl Future<Output = io::Result<PathBuf>> + Send;

    /// Whether anything exists at `path`.
    fn exists(&self, path: &Path) -> impl Future<Output = io::Result<bool>> + Send {
        async move {
            match self.stat(path).await {
                Ok(_) => Ok(true),
                Err(e) if is_missing(&e) => Ok(false),
                Err(e) => Err(e),
            }
        }
    }
}

/// Whether an error only means the path is not there.
#[must_use]
pub fn is_missing(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// Real filesystem adapter.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl FileSystem for OsFs {
    async fn stat(&self, path: &Path) -> io::Result<FileKind> {
        let meta = tokio::fs::metadata(path).await?;
        Ok(meta.file_type().into())
    }

    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn realpath(&self, path: &Path) -> io::Result<PathBuf> {
        let real = tokio::fs::canonicalize(path).await?;
        // Avoid `\\?\` verbatim prefixes on Windows
        Ok(dunce::simplified(&real).to_path_buf())
    }
}

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
    Symlink(PathBuf),
}

/// In-memory filesystem.
///
/// Paths are absolute and normalized on insert. Parent directories are
/// created implicitly. Symlink targets may be absolute or relative to the
/// link's directory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    nodes: HashMap<PathBuf, Node>,
    errors: HashMap<PathBuf, io::ErrorKind>,
}

impl MemoryFs {
    /// Create an empty filesystem containing only the root.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, creating parent directories.
    pub fn add_file(&mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) {
        let path = normalize(path.as_ref());
        self.add_parents(&path);
        self.nodes.insert(path, Node::File(contents.into()));
    }

    /// Add a directory and its parents.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = normalize(path.as_ref());
        self.add_parents(&path);
        self.nodes.insert(path, Node::Dir);
    }

    /// Add a symlink at `link` pointing to `target`.
    pub fn add_symlink(&mut self, link: impl AsRef<Path>, target: impl Into<PathBuf>) {
        let link = normalize(link.as_ref());
        self.add_parents(&link);
        self.nodes.insert(link, Node::Symlink(target.into()));
    }

    /// Make every lookup that passes through `path` fail with `kind`.
    pub fn fail_with(&mut self, path: impl AsRef<Path>, kind: io::ErrorKind) {
        self.errors.insert(normalize(path.as_ref()), kind);
    }

    /// Builder form of [`MemoryFs::add_file`].
    #[must_use]
    pub fn with_file(mut self, path: impl AsRef<Path>, contents: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, contents);
        self
    }

    /// Builder form of [`MemoryFs::add_dir`].
    #[must_use]
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.add_dir(path);
        self
    }

    /// Builder form of [`MemoryFs::add_symlink`].
    #[must_use]
    pub fn with_symlink(mut self, link: impl AsRef<Path>, target: impl Into<PathBuf>) -> Self {
        self.add_symlink(link, target);
        self
    }

    /// Builder form of [`MemoryFs::fail_with`].
    #[must_use]
    pub fn with_error(mut self, path: impl AsRef<Path>, kind: io::ErrorKind) -> Self {
        self.fail_with(path, kind);
        self
    }

    fn add_parents(&mut self, path: &Path) {
        for parent in path.ancestors().skip(1) {
            if parent.parent().is_none() {
                // Root (or prefix) always exists
                break;
            }
            self.nodes
                .entry(parent.to_path_buf())
                .or_insert(Node::Dir);
        }
    }

    /// Resolve `path` to its real location, following symlinks.
    fn canonicalize(&self, path: &Path, hops: &mut u32) -> io::Result<PathBuf> {
        let mut resolved = PathBuf::new();
        let mut components = path.components().peekable();

        while let Some(component) = components.next() {
            match component {
                Component::Prefix(_) | Component::RootDir => resolved.push(component.as_os_str()),
                Component::CurDir => {}
                Component::ParentDir => {
                    resolved.pop();
                }
                Component::Normal(name) => {
                    let candidate = resolved.join(name);
                    if let Some(kind) = self.errors.get(&candidate) {
                        return Err(io::Error::from(*kind));
                    }

                    match self.nodes.get(&candidate) {
                        None => return Err(io::Error::from(io::ErrorKind::NotFound)),
                        Some(Node::Symlink(target)) => {
                            *hops += 1;
                            if *hops > MAX_SYMLINK_HOPS {
                                return Err(io::Error::other(
                                    "too many levels of symbolic links",
                                ));
                            }
                            let target = if target.is_absolute() {
                                target.clone()
                            } else {
                                resolved.join(target)
                            };
                            resolved = self.canonicalize(&target, hops)?;
                        }
                        Some(Node::File(_)) if components.peek().is_some() => {
                            return Err(io::Error::from(io::ErrorKind::NotADirectory));
                        }
                        Some(_) => resolved = candidate,
                    }
                }
            }
        }

        if !resolved.has_root() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "memory filesystem paths must be absolute",
            ));
        }
        Ok(resolved)
    }

    fn lookup(&self, path: &Path) -> io::Result<(PathBuf, Option<&Node>)> {
        let real = self.canonicalize(path, &mut 0)?;
        // The root has no entry of its own
        let node = self.nodes.get(&real);
        if node.is_none() && real.parent().is_some() {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        Ok((real, node))
    }

    fn stat_sync(&self, path: &Path) -> io::Result<FileKind> {
        match self.lookup(path)?.1 {
            Some(Node::File(_)) => Ok(FileKind::File),
            Some(Node::Dir) | None => Ok(FileKind::Directory),
            Some(Node::Symlink(_)) => Err(io::Error::other("unresolved symlink")),
        }
    }

    fn read_file_sync(&self, path: &Path) -> io::Result<Vec<u8>> {
        match self.lookup(path)?.1 {
            Some(Node::File(bytes)) => Ok(bytes.clone()),
            Some(Node::Dir) | None => Err(io::Error::from(io::ErrorKind::IsADirectory)),
            Some(Node::Symlink(_)) => Err(io::Error::other("unresolved symlink")),
        }
    }
}

impl FileSystem for MemoryFs {
    fn stat(&self, path: &Path) -> impl Future<Output = io::Result<FileKind>> + Send {
        future::ready(self.stat_sync(path))
    }

    fn read_file(&self, path: &Path) -> impl Future<Output = io::Result<Vec<u8>>> + Send {
        future::ready(self.read_file_sync(path))
    }

    fn realpath(&self, path: &Path) -> impl Future<Output = io::Result<PathBuf>> + Send {
        future::ready(self.lookup(path).map(|(real, _)| real))
    }
}
