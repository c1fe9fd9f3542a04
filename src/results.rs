use std::borrow::Cow;

use crate::{GlobError, flags::Flags};

/// The result container filled by a glob or match operation
///
/// Paths produced by a filesystem walk are owned; paths selected from a
/// caller's candidate list are borrowed from it. The [`Cow`] entries carry
/// that distinction, so dropping the container never frees what it does
/// not own.
#[derive(Debug, Default)]
pub struct GlobResults<'a> {
    paths: Vec<Cow<'a, str>>,

    /// Number of leading slots to install under [`Flags::DOOFFS`]
    reserved: usize,
}

impl<'a> GlobResults<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container with `reserved` leading empty slots
    ///
    /// The slots are installed in front of the matches whenever a call
    /// made with [`Flags::DOOFFS`] (re)initializes the container; they let
    /// a caller prepend its own entries afterwards without shifting.
    pub fn with_slots(reserved: usize) -> Self {
        Self {
            paths: Vec::new(),
            reserved,
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(|path| path.as_ref())
    }

    pub fn as_slice(&self) -> &[Cow<'a, str>] {
        &self.paths
    }

    pub fn reserved_slots(&self) -> usize {
        self.reserved
    }

    /// Collect the paths into a plain vector, mostly for assertions
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_owned).collect()
    }
}

/// One matched path, with the directory bit the finalization step needs
#[derive(Debug)]
struct Hit<'a> {
    path: Cow<'a, str>,
    is_dir: bool,
}

/// Collects matches during a walk and packages them into a
/// [`GlobResults`] at the end
#[derive(Debug, Default)]
pub(crate) struct Assembler<'a> {
    hits: Vec<Hit<'a>>,
}

impl<'a> Assembler<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn push(&mut self, path: Cow<'a, str>, is_dir: bool) -> Result<(), GlobError> {
        self.hits
            .try_reserve(1)
            .map_err(|_| GlobError::NoSpace)?;

        self.hits.push(Hit { path, is_dir });
        Ok(())
    }

    /// Finalize the collected hits into the caller's container
    ///
    /// `fallback` is the pattern to emit as the sole result when nothing
    /// matched (the `NOCHECK`/`NOMAGIC` behavior); it is emitted verbatim,
    /// unmarked. With no hits and no fallback this is
    /// [`GlobError::NoMatch`].
    pub fn finalize(
        mut self,
        fallback: Option<&str>,
        flags: Flags,
        out: &mut GlobResults<'a>,
    ) -> Result<(), GlobError> {
        if self.hits.is_empty() {
            let Some(pattern) = fallback else {
                return Err(GlobError::NoMatch);
            };

            self.push(Cow::Owned(pattern.to_owned()), false)?;
        } else {
            if flags.contains(Flags::MARK) {
                for hit in &mut self.hits {
                    if hit.is_dir && !hit.path.ends_with('/') {
                        hit.path.to_mut().push('/');
                    }
                }
            }

            // Sort by raw bytes, locale-independent; duplicates (e.g. from
            // overlapping brace alternatives) are only suppressed when
            // sorted
            if !flags.contains(Flags::NOSORT) {
                self.hits
                    .sort_by(|a, b| a.path.as_bytes().cmp(b.path.as_bytes()));
                self.hits.dedup_by(|a, b| a.path == b.path);
            }
        }

        if !flags.contains(Flags::APPEND) {
            out.paths.clear();

            if flags.contains(Flags::DOOFFS) {
                out.paths
                    .try_reserve(out.reserved)
                    .map_err(|_| GlobError::NoSpace)?;

                out.paths
                    .extend(std::iter::repeat_n(Cow::Borrowed(""), out.reserved));
            }
        }

        out.paths
            .try_reserve(self.hits.len())
            .map_err(|_| GlobError::NoSpace)?;

        out.paths.extend(self.hits.into_iter().map(|hit| hit.path));
        Ok(())
    }
}
