use std::{
    borrow::Cow,
    io,
    path::{Path, PathBuf},
};

use tracing::trace;

use crate::{
    GlobError,
    compiler::{BracedComponent, BracedPattern},
    flags::Flags,
    fs_walker::{DirSource, EntryKind, SourceEntry},
    paths::unescape,
    pattern::Pattern,
    results::{Assembler, GlobResults},
    scan::has_wildcards,
    segment::match_segment,
};

/// Callback invoked when a directory cannot be opened or read
///
/// Receives the failing path and the error; returning `true` aborts the
/// whole operation with [`GlobError::Aborted`], returning `false` skips
/// the directory and continues ([`Flags::ERR`] aborts regardless).
pub type ErrFunc<'e> = &'e mut dyn FnMut(&Path, &io::Error) -> bool;

/// Run a full glob operation against a directory source
///
/// This is the driver behind [`glob`](crate::glob) and
/// [`glob_at`](crate::glob_at): it compiles the pattern, walks once per
/// compiled variant, and assembles the results into `out`.
pub(crate) fn run_glob(
    source: &dyn DirSource,
    base: &Path,
    pattern: &str,
    flags: Flags,
    mut errfunc: Option<ErrFunc<'_>>,
    out: &mut GlobResults<'_>,
) -> Result<(), GlobError> {
    let compiled = Pattern::with_flags(pattern, flags)?;
    let mut assembler = Assembler::new();

    for variant in compiled.variants() {
        // Absolute patterns walk from the root, wherever the base is
        let (walk_base, emit_prefix) = if variant.is_absolute {
            (PathBuf::from("/"), "/")
        } else {
            (base.to_path_buf(), "")
        };

        let errfunc_ref = reborrow_errfunc(&mut errfunc);

        let mut walker = Walker {
            source,
            base: walk_base,
            emit_prefix,
            flags,
            errfunc: errfunc_ref,
            assembler: &mut assembler,
        };

        walker.run(variant)?;
    }

    let fallback = fallback_pattern(assembler.is_empty(), pattern, flags);
    assembler.finalize(fallback, flags, out)
}

/// Reborrow an optional error callback with a fresh, shorter lifetime
///
/// A plain `errfunc.as_mut().map(|f| &mut **f)` ties the reborrow's
/// lifetime to the outer `Option`'s own lifetime parameter (double `&mut`
/// indirection is invariant), which blocks reborrowing it again on the
/// next loop iteration. Going through a function call sidesteps that by
/// letting the reborrow's lifetime be inferred fresh at each call site.
fn reborrow_errfunc<'s>(errfunc: &'s mut Option<ErrFunc<'_>>) -> Option<ErrFunc<'s>> {
    match errfunc {
        Some(f) => Some(&mut **f),
        None => None,
    }
}

/// The pattern to emit when nothing matched, if any
pub(crate) fn fallback_pattern<'p>(
    nothing_matched: bool,
    pattern: &'p str,
    flags: Flags,
) -> Option<&'p str> {
    let wanted = flags.contains(Flags::NOCHECK)
        || (flags.contains(Flags::NOMAGIC) && !has_wildcards(pattern, flags));

    (nothing_matched && wanted).then_some(pattern)
}

/// One walk over the directory tree, driven by a single compiled pattern
/// variant
struct Walker<'w, 'a, 'e> {
    source: &'w dyn DirSource,

    /// Filesystem anchor the relative path buffer is resolved against
    base: PathBuf,

    /// Prepended to the path buffer when emitting (`/` for absolute
    /// patterns)
    emit_prefix: &'static str,

    flags: Flags,
    errfunc: Option<ErrFunc<'e>>,
    assembler: &'w mut Assembler<'a>,
}

impl Walker<'_, '_, '_> {
    fn run(&mut self, pattern: &BracedPattern) -> Result<(), GlobError> {
        let components = &pattern.components;

        // A pattern with no components (`/` or the empty string) can only
        // name the root itself
        if components.is_empty() {
            if pattern.is_absolute && self.source.entry_kind(Path::new("/")).is_some() {
                self.assembler.push(Cow::Borrowed("/"), true)?;
            }

            return Ok(());
        }

        let states = close_states(components, vec![0]);
        let mut rel = String::new();

        self.walk_dir(components, &states, &mut rel)
    }

    /// Process one directory under every active component state
    ///
    /// `rel` is the shared path buffer holding the directory's path
    /// relative to the walk base; it is restored before returning.
    fn walk_dir(
        &mut self,
        components: &[BracedComponent],
        states: &[usize],
        rel: &mut String,
    ) -> Result<(), GlobError> {
        // Literal shortcut: a single magic-free state needs a stat, not a
        // listing
        if let [only] = states {
            let component = &components[*only];

            if !component.is_recursive
                && component.alternatives.len() == 1
                && !component.alternatives[0].has_magic
            {
                return self.step_literal(components, *only, rel);
            }
        }

        let dir = self.fs_path(rel);

        let entries = match self.source.read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => return self.report(&dir, err),
        };

        for entry in entries {
            if entry.name == "." || entry.name == ".." {
                continue;
            }

            self.walk_entry(components, states, rel, &entry)?;
        }

        Ok(())
    }

    /// Evaluate one directory entry against every active state
    fn walk_entry(
        &mut self,
        components: &[BracedComponent],
        states: &[usize],
        rel: &mut String,
        entry: &SourceEntry,
    ) -> Result<(), GlobError> {
        let hidden = entry.name.starts_with('.');
        let is_dir = entry.kind.is_dir();

        let mut emit = false;
        let mut descend = Vec::new();

        for &state in states {
            let component = &components[state];
            let last = state + 1 == components.len();

            if component.is_recursive {
                // The match-one-or-more branch: the entry is absorbed by
                // `**`. (The match-zero branch is the `state + 1` entry of
                // the state set.) `**` is a wildcard, so the period rule
                // applies to everything it absorbs.
                if self.flags.contains(Flags::PERIOD) && hidden {
                    continue;
                }

                if last {
                    emit = true;
                }

                if is_dir {
                    descend.push(state);
                }

                continue;
            }

            let matched = component
                .alternatives
                .iter()
                .any(|alternative| match_segment(alternative, &entry.name, self.flags));

            if !matched {
                continue;
            }

            if last {
                emit = true;
            } else if is_dir {
                descend.push(state + 1);
            }
        }

        if !emit && descend.is_empty() {
            return Ok(());
        }

        let checkpoint = rel.len();

        if !rel.is_empty() {
            rel.push('/');
        }
        rel.push_str(&entry.name);

        if emit && (is_dir || !self.flags.contains(Flags::ONLYDIR)) {
            self.emit(rel, is_dir)?;
        }

        if !descend.is_empty() {
            let states = close_states(components, descend);
            self.walk_dir(components, &states, rel)?;
        }

        rel.truncate(checkpoint);
        Ok(())
    }

    /// Resolve a magic-free component directly against the filesystem
    ///
    /// A final component is emitted if it exists; an intermediate one is
    /// descended into if it is a directory. Either way, no directory
    /// listing is read.
    fn step_literal(
        &mut self,
        components: &[BracedComponent],
        state: usize,
        rel: &mut String,
    ) -> Result<(), GlobError> {
        let name = unescape(&components[state].alternatives[0].text, self.flags);
        let last = state + 1 == components.len();

        let checkpoint = rel.len();

        if !rel.is_empty() {
            rel.push('/');
        }
        rel.push_str(&name);

        match self.source.entry_kind(&self.fs_path(rel)) {
            Some(kind) if last => {
                if kind.is_dir() || !self.flags.contains(Flags::ONLYDIR) {
                    self.emit(rel, kind.is_dir())?;
                }
            }

            Some(EntryKind::Directory) => {
                let states = close_states(components, vec![state + 1]);
                self.walk_dir(components, &states, rel)?;
            }

            _ => {}
        }

        rel.truncate(checkpoint);
        Ok(())
    }

    fn fs_path(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.base.clone()
        } else {
            self.base.join(rel)
        }
    }

    fn emit(&mut self, rel: &str, is_dir: bool) -> Result<(), GlobError> {
        let path = format!("{}{rel}", self.emit_prefix);

        trace!(%path, "matched");
        self.assembler.push(Cow::Owned(path), is_dir)
    }

    /// Handle a directory read failure: skip or abort
    fn report(&mut self, path: &Path, err: io::Error) -> Result<(), GlobError> {
        let abort_requested = match self.errfunc.as_mut() {
            Some(errfunc) => errfunc(path, &err),
            None => false,
        };

        if abort_requested || self.flags.contains(Flags::ERR) {
            return Err(GlobError::Aborted {
                path: path.to_path_buf(),
                source: err,
            });
        }

        trace!(path = %path.display(), error = %err, "skipping unreadable directory");
        Ok(())
    }
}

/// Close a state set over the match-zero branches of `**`
///
/// Every state sitting on a recursive component also activates the state
/// right after it (`a/**/b` must try `b` in the same directory), chains of
/// `**` included. The result is sorted and free of duplicates.
fn close_states(components: &[BracedComponent], mut states: Vec<usize>) -> Vec<usize> {
    let mut index = 0;

    while index < states.len() {
        let state = states[index];

        if components[state].is_recursive {
            let next = state + 1;

            if next < components.len() && !states.contains(&next) {
                states.push(next);
            }
        }

        index += 1;
    }

    states.sort_unstable();
    states.dedup();
    states
}
