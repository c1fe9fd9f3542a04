use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

/// What a directory entry is, as far as matching cares
///
/// [`EntryKind::File`] covers every non-directory: regular files, sockets,
/// device nodes and symbolic links to any of those. A symbolic link whose
/// target is a directory counts as a directory, since the walker can
/// descend through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EntryKind {
    Directory,
    File,
}

impl EntryKind {
    pub fn is_dir(self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

/// One entry yielded by a [`DirSource`]
#[derive(Debug, Clone)]
pub struct SourceEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// The directory-reading capability the walker is driven by
///
/// The walker never touches the filesystem directly; it goes through this
/// trait so that the traversal logic can be exercised against an
/// in-memory tree ([`MemDirSource`]) as well as the real filesystem
/// ([`OsDirSource`]).
pub trait DirSource {
    /// List a directory's entries
    ///
    /// `.` and `..` must not be yielded. Entries whose names are not valid
    /// UTF-8 are skipped.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<SourceEntry>>;

    /// Classify a single path, following symbolic links
    ///
    /// Returns [`None`] when the path does not exist (or cannot be
    /// inspected).
    fn entry_kind(&self, path: &Path) -> Option<EntryKind>;
}

/// The real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct OsDirSource;

impl DirSource for OsDirSource {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<SourceEntry>> {
        let path = if path.as_os_str().is_empty() {
            Path::new(".")
        } else {
            path
        };

        let mut entries = Vec::new();

        for entry in fs::read_dir(path)? {
            let entry = entry?;

            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };

            let kind = match entry.file_type() {
                Ok(file_type) if file_type.is_dir() => EntryKind::Directory,

                // Follow symbolic links for the directory check only
                Ok(file_type) if file_type.is_symlink() => {
                    match fs::metadata(entry.path()) {
                        Ok(metadata) if metadata.is_dir() => EntryKind::Directory,
                        _ => EntryKind::File,
                    }
                }

                _ => EntryKind::File,
            };

            entries.push(SourceEntry { name, kind });
        }

        Ok(entries)
    }

    fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        let path = if path.as_os_str().is_empty() {
            Path::new(".")
        } else {
            path
        };

        let metadata = fs::metadata(path).ok()?;

        Some(if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        })
    }
}

/// An in-memory directory tree
///
/// Built from a flat list of paths; a trailing `/` marks an explicitly
/// empty directory, intermediate directories are created implicitly. Used
/// to drive the walker in tests without touching the disk.
#[derive(Debug, Default)]
pub struct MemDirSource {
    dirs: BTreeMap<PathBuf, BTreeMap<String, EntryKind>>,
}

impl MemDirSource {
    pub fn from_paths<'p>(paths: impl IntoIterator<Item = &'p str>) -> Self {
        let mut source = Self::default();
        source.dirs.entry(PathBuf::new()).or_default();

        for path in paths {
            let is_dir_path = path.ends_with('/');
            let segments: Vec<_> = path.split('/').filter(|s| !s.is_empty()).collect();

            let mut current = PathBuf::new();

            for (index, segment) in segments.iter().enumerate() {
                let last = index + 1 == segments.len();

                let kind = if last && !is_dir_path {
                    EntryKind::File
                } else {
                    EntryKind::Directory
                };

                let listing = source.dirs.entry(current.clone()).or_default();
                let entry = listing.entry((*segment).to_owned()).or_insert(kind);

                // A path seen as both file and directory stays a directory
                if kind.is_dir() {
                    *entry = EntryKind::Directory;
                }

                current.push(segment);

                if kind.is_dir() {
                    source.dirs.entry(current.clone()).or_default();
                }
            }
        }

        source
    }

    /// Tree keys are stored without a leading separator
    fn key(path: &Path) -> &Path {
        path.strip_prefix("/").unwrap_or(path)
    }
}

impl DirSource for MemDirSource {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<SourceEntry>> {
        let listing = self
            .dirs
            .get(Self::key(path))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such directory"))?;

        Ok(listing
            .iter()
            .map(|(name, kind)| SourceEntry {
                name: name.clone(),
                kind: *kind,
            })
            .collect())
    }

    fn entry_kind(&self, path: &Path) -> Option<EntryKind> {
        let key = Self::key(path);

        if self.dirs.contains_key(key) {
            return Some(EntryKind::Directory);
        }

        let parent = key.parent()?;
        let name = key.file_name()?.to_str()?;

        self.dirs.get(parent)?.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mem_tree_lists_entries() {
        let source = MemDirSource::from_paths(["a/b.c", "a/d/e.c", "empty/"]);

        let mut root: Vec<_> = source
            .read_dir(Path::new(""))
            .unwrap()
            .into_iter()
            .map(|entry| (entry.name, entry.kind))
            .collect();
        root.sort();

        assert_eq!(
            root,
            [
                ("a".to_owned(), EntryKind::Directory),
                ("empty".to_owned(), EntryKind::Directory),
            ]
        );

        let a: Vec<_> = source
            .read_dir(Path::new("a"))
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(a, ["b.c", "d"]);

        assert!(source.read_dir(Path::new("missing")).is_err());
        assert!(source.read_dir(Path::new("empty")).unwrap().is_empty());
    }

    #[test]
    fn mem_tree_classifies_paths() {
        let source = MemDirSource::from_paths(["a/b.c"]);

        assert_eq!(
            source.entry_kind(Path::new("a")),
            Some(EntryKind::Directory)
        );
        assert_eq!(source.entry_kind(Path::new("a/b.c")), Some(EntryKind::File));
        assert_eq!(source.entry_kind(Path::new("a/missing")), None);
        assert_eq!(
            source.entry_kind(Path::new("")),
            Some(EntryKind::Directory)
        );
    }

    #[test]
    fn mem_tree_accepts_absolute_lookups() {
        let source = MemDirSource::from_paths(["u/a/code/m.c"]);

        assert_eq!(
            source.entry_kind(Path::new("/u/a")),
            Some(EntryKind::Directory)
        );
        assert!(source.read_dir(Path::new("/u/a/code")).is_ok());
    }
}
