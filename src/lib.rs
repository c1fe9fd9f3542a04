//! Globlet is a library for expanding shell-style glob patterns into the
//! set of matching filesystem paths, and for matching those same patterns
//! against in-memory path lists without touching the disk.
//!
//! # Examples
//!
//! ```rust
//! use globlet::{Flags, GlobResults, glob};
//!
//! let mut results = GlobResults::new();
//! glob("src/*.rs", Flags::empty(), None, &mut results).unwrap();
//!
//! for path in results.iter() {
//!     println!("{path}");
//! }
//! ```
//!
//! This library should work on any Unix-like platform.
//!
//! # Comparing to [`glob`](https://docs.rs/glob)
//!
//! The well-known glob library compiles each pattern component once and
//! walks from a literal prefix, much like this one, but differs on some
//! opinionated defaults:
//!
//! * Brace alternation (`{a,b}`), extended groups (`!(a|b)` and friends)
//!   and an in-memory matching mode are supported here
//! * `**` only matches whole components, and only under
//!   [`Flags::DOUBLESTAR`]
//! * Malformed syntax is never an error: unmatched braces and unclosed
//!   character classes match themselves literally
//! * The directory-reading layer is a trait, so the walker can be driven
//!   by an in-memory tree
//!
//! # Syntax
//!
//! See [`Pattern`].

#![forbid(unsafe_code)]
#![forbid(unused_must_use)]
#![warn(unused_crate_dependencies)]

mod compiler;
mod flags;
mod fs_walker;
mod parser;
mod paths;
mod pattern;
mod results;
mod scan;
mod segment;
mod strategy;
mod walker;

use std::{borrow::Cow, io, path::Path};

use thiserror::Error;

use crate::{results::Assembler, walker::fallback_pattern};

pub use self::{
    flags::Flags,
    fs_walker::{DirSource, EntryKind, MemDirSource, OsDirSource, SourceEntry},
    pattern::{Pattern, PatternMatchResult},
    results::GlobResults,
    walker::ErrFunc,
};

/// The ways a glob or match operation can fail
///
/// Pattern syntax is never one of them: ambiguous syntax is treated as
/// literal text.
#[derive(Debug, Error)]
pub enum GlobError {
    /// Nothing matched (and neither [`Flags::NOCHECK`] nor
    /// [`Flags::NOMAGIC`] applied)
    #[error("no paths matched the pattern")]
    NoMatch,

    /// Ran out of memory while collecting results
    #[error("out of memory while collecting results")]
    NoSpace,

    /// A directory could not be read and either [`Flags::ERR`] was set or
    /// the error callback requested an abort
    #[error("glob aborted at `{}`: {source}", path.display())]
    Aborted {
        path: std::path::PathBuf,
        source: io::Error,
    },
}

/// Match a pattern against the filesystem, from the current working
/// directory
///
/// Relative patterns yield relative paths; an absolute pattern (leading
/// `/`) walks from the filesystem root and yields absolute paths. Results
/// land in `out` as described by [`Flags`].
///
/// For details on the pattern syntax, see [`Pattern`].
pub fn glob(
    pattern: &str,
    flags: Flags,
    errfunc: Option<ErrFunc<'_>>,
    out: &mut GlobResults<'_>,
) -> Result<(), GlobError> {
    glob_with(&OsDirSource, Path::new(""), pattern, flags, errfunc, out)
}

/// Match a pattern against the filesystem, relative to `base`
///
/// `base` must be absolute, otherwise the call fails with
/// [`GlobError::Aborted`]. Absolute patterns still walk from the
/// filesystem root.
pub fn glob_at(
    base: &Path,
    pattern: &str,
    flags: Flags,
    errfunc: Option<ErrFunc<'_>>,
    out: &mut GlobResults<'_>,
) -> Result<(), GlobError> {
    ensure_absolute(base)?;
    glob_with(&OsDirSource, base, pattern, flags, errfunc, out)
}

/// Match a pattern against an arbitrary [`DirSource`]
///
/// This is the fully injectable form of [`glob`]: directory listings and
/// stats go through `source`, which makes the traversal testable against
/// an in-memory tree ([`MemDirSource`]).
pub fn glob_with(
    source: &dyn DirSource,
    base: &Path,
    pattern: &str,
    flags: Flags,
    errfunc: Option<ErrFunc<'_>>,
    out: &mut GlobResults<'_>,
) -> Result<(), GlobError> {
    walker::run_glob(source, base, pattern, flags, errfunc, out)
}

/// Match a pattern against a list of candidate paths, with no I/O
///
/// Every result borrows from `paths`; the returned set is always a subset
/// of it. Directory-dependent flags ([`Flags::MARK`], [`Flags::ONLYDIR`])
/// have no effect here, since nothing is known about what the candidates
/// point at.
pub fn match_paths<'a>(
    pattern: &str,
    paths: &[&'a str],
    flags: Flags,
    out: &mut GlobResults<'a>,
) -> Result<(), GlobError> {
    let compiled = Pattern::with_flags(pattern, flags)?;

    let mut assembler = Assembler::new();

    for candidate in paths {
        if compiled.is_match(candidate) {
            assembler.push(Cow::Borrowed(*candidate), false)?;
        }
    }

    let fallback = fallback_pattern(assembler.is_empty(), pattern, flags);
    assembler.finalize(fallback, flags, out)
}

/// Match a pattern against a list of candidate paths, relative to `base`
///
/// Relative patterns are anchored at `base` (which must be absolute)
/// before matching; absolute patterns are matched as-is.
pub fn match_paths_at<'a>(
    base: &Path,
    pattern: &str,
    paths: &[&'a str],
    flags: Flags,
    out: &mut GlobResults<'a>,
) -> Result<(), GlobError> {
    ensure_absolute(base)?;

    let Some(base) = base.to_str() else {
        return Err(GlobError::Aborted {
            path: base.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                "base directory is not valid UTF-8",
            ),
        });
    };

    let anchored: Cow<'_, str> = if pattern.starts_with('/') {
        Cow::Borrowed(pattern)
    } else {
        Cow::Owned(format!("{}/{pattern}", base.trim_end_matches('/')))
    };

    let compiled = Pattern::with_flags(&anchored, flags)?;

    let mut assembler = Assembler::new();

    for candidate in paths {
        if compiled.is_match(candidate) {
            assembler.push(Cow::Borrowed(*candidate), false)?;
        }
    }

    let fallback = fallback_pattern(assembler.is_empty(), pattern, flags);
    assembler.finalize(fallback, flags, out)
}

fn ensure_absolute(base: &Path) -> Result<(), GlobError> {
    if base.is_absolute() {
        return Ok(());
    }

    Err(GlobError::Aborted {
        path: base.to_path_buf(),
        source: io::Error::new(
            io::ErrorKind::InvalidInput,
            "base directory must be absolute",
        ),
    })
}
