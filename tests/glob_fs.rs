use std::{fs, io, path::Path};

use globlet::{
    DirSource, Flags, GlobError, GlobResults, MemDirSource, SourceEntry, glob_at, glob_with,
    match_paths, match_paths_at,
};
use tempfile::TempDir;

fn make_tree(files: &[&str]) -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");

    for file in files {
        let path = dir.path().join(file);

        if file.ends_with('/') {
            fs::create_dir_all(&path).expect("Failed to create test directory");
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("Failed to create parent directory");
            }

            fs::write(&path, b"").expect("Failed to create test file");
        }
    }

    dir
}

fn glob_tree(dir: &TempDir, pattern: &str, flags: Flags) -> Result<Vec<String>, GlobError> {
    let mut results = GlobResults::new();
    glob_at(dir.path(), pattern, flags, None, &mut results)?;
    Ok(results.to_vec())
}

#[test]
fn cargo_files() {
    let dir = make_tree(&["Cargo.toml", "sub/Cargo.lock", "sub/inner/Cargo.toml"]);

    let results = glob_tree(
        &dir,
        "**/Cargo.{toml,lock}",
        Flags::BRACE | Flags::DOUBLESTAR,
    )
    .unwrap();

    assert_eq!(
        results,
        ["Cargo.toml", "sub/Cargo.lock", "sub/inner/Cargo.toml"]
    );
}

#[test]
fn directory_alternatives() {
    let dir = make_tree(&["src/a.zig", "lib/b.zig", "test/c.zig"]);

    let results = glob_tree(&dir, "{src,lib}/*.zig", Flags::BRACE).unwrap();

    assert_eq!(results, ["lib/b.zig", "src/a.zig"]);
}

#[test]
fn character_class_and_hidden_files() {
    let dir = make_tree(&[".hidden", "visible", "other"]);

    let results = glob_tree(&dir, "[a-z]*", Flags::PERIOD).unwrap();
    assert_eq!(results, ["other", "visible"]);

    // Even without PERIOD, `[a-z]` cannot match a period
    let results = glob_tree(&dir, "[a-z]*", Flags::empty()).unwrap();
    assert_eq!(results, ["other", "visible"]);

    // But a bare `*` swallows hidden entries unless PERIOD forbids it
    let results = glob_tree(&dir, "*", Flags::empty()).unwrap();
    assert_eq!(results, [".hidden", "other", "visible"]);

    let results = glob_tree(&dir, "*", Flags::PERIOD).unwrap();
    assert_eq!(results, ["other", "visible"]);

    // An explicit leading period matches in both modes
    for flags in [Flags::empty(), Flags::PERIOD] {
        let results = glob_tree(&dir, ".*", flags).unwrap();
        assert_eq!(results, [".hidden"]);
    }
}

#[test]
fn recursive_star_absorbs_zero_components() {
    let dir = make_tree(&["a/b", "a/x/b", "a/x/y/b"]);

    let results = glob_tree(&dir, "a/**/b", Flags::DOUBLESTAR).unwrap();

    assert_eq!(results, ["a/b", "a/x/b", "a/x/y/b"]);
}

#[test]
fn doublestar_degrades_to_star_without_the_flag() {
    let dir = make_tree(&["a/b", "a/x/b", "a/x/y/b"]);

    let results = glob_tree(&dir, "a/**/b", Flags::empty()).unwrap();

    assert_eq!(results, ["a/x/b"]);
}

#[test]
fn extended_glob_negation() {
    let dir = make_tree(&["a.c", "a.h", "a.o"]);

    let results = glob_tree(&dir, "a.!(o)", Flags::EXTGLOB).unwrap();

    assert_eq!(results, ["a.c", "a.h"]);
}

#[test]
fn in_memory_matching_does_no_io() {
    let candidates = [
        "/u/a/code/m.c",
        "/u/a/code/s/u.c",
        "/u/a/b/code/n.c",
        "/u/b/doc/r.md",
    ];

    let mut results = GlobResults::new();
    match_paths(
        "/u/**/code/*.c",
        &candidates,
        Flags::DOUBLESTAR,
        &mut results,
    )
    .unwrap();

    assert_eq!(results.to_vec(), ["/u/a/b/code/n.c", "/u/a/code/m.c"]);

    // Every result is one of the candidates, borrowed as-is
    for path in results.iter() {
        assert!(candidates.contains(&path));
    }
}

#[test]
fn in_memory_matching_dedups_when_sorted() {
    let candidates = ["a", "a", "b"];

    let mut results = GlobResults::new();
    match_paths("a", &candidates, Flags::empty(), &mut results).unwrap();
    assert_eq!(results.to_vec(), ["a"]);

    let mut results = GlobResults::new();
    match_paths("a", &candidates, Flags::NOSORT, &mut results).unwrap();
    assert_eq!(results.to_vec(), ["a", "a"]);
}

#[test]
fn match_paths_at_anchors_relative_patterns() {
    let candidates = ["/u/a/code/m.c", "/v/a/code/m.c", "a/code/m.c"];

    let mut results = GlobResults::new();
    match_paths_at(
        Path::new("/u"),
        "*/code/*.c",
        &candidates,
        Flags::empty(),
        &mut results,
    )
    .unwrap();

    assert_eq!(results.to_vec(), ["/u/a/code/m.c"]);
}

#[test]
fn literal_patterns_use_a_direct_stat() {
    let dir = make_tree(&["sub/inner/Cargo.toml"]);

    let results = glob_tree(&dir, "sub/inner/Cargo.toml", Flags::empty()).unwrap();
    assert_eq!(results, ["sub/inner/Cargo.toml"]);

    let results = glob_tree(&dir, "./sub/inner/Cargo.toml", Flags::empty()).unwrap();
    assert_eq!(results, ["./sub/inner/Cargo.toml"]);

    assert!(matches!(
        glob_tree(&dir, "sub/inner/missing", Flags::empty()),
        Err(GlobError::NoMatch)
    ));
}

#[test]
fn nocheck_returns_the_pattern_itself() {
    let dir = make_tree(&["a.c"]);

    assert!(matches!(
        glob_tree(&dir, "*.none", Flags::empty()),
        Err(GlobError::NoMatch)
    ));

    let results = glob_tree(&dir, "*.none", Flags::NOCHECK).unwrap();
    assert_eq!(results, ["*.none"]);
}

#[test]
fn nomagic_only_covers_wildcard_free_patterns() {
    let dir = make_tree(&["a.c"]);

    let results = glob_tree(&dir, "missing.txt", Flags::NOMAGIC).unwrap();
    assert_eq!(results, ["missing.txt"]);

    assert!(matches!(
        glob_tree(&dir, "*.none", Flags::NOMAGIC),
        Err(GlobError::NoMatch)
    ));
}

#[test]
fn mark_flags_directories() {
    let dir = make_tree(&["sub/x", "file"]);

    let results = glob_tree(&dir, "*", Flags::MARK).unwrap();
    assert_eq!(results, ["file", "sub/"]);
}

#[test]
fn onlydir_filters_out_files() {
    let dir = make_tree(&["sub/x", "file"]);

    let results = glob_tree(&dir, "*", Flags::ONLYDIR).unwrap();
    assert_eq!(results, ["sub"]);
}

#[test]
fn globbing_is_idempotent() {
    let dir = make_tree(&["a/b.c", "a/d/e.c", "f.c"]);

    let first = glob_tree(&dir, "**/*.c", Flags::DOUBLESTAR).unwrap();
    let second = glob_tree(&dir, "**/*.c", Flags::DOUBLESTAR).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, ["a/b.c", "a/d/e.c", "f.c"]);
}

#[test]
fn glob_at_requires_an_absolute_base() {
    let mut results = GlobResults::new();

    assert!(matches!(
        glob_at(Path::new("relative"), "*", Flags::empty(), None, &mut results),
        Err(GlobError::Aborted { .. })
    ));
}

#[test]
fn walking_an_in_memory_tree() {
    let source = MemDirSource::from_paths(["u/a/code/m.c", "u/a/code/s/u.c", "u/b/doc/r.md"]);

    let mut results = GlobResults::new();
    glob_with(
        &source,
        Path::new(""),
        "/u/**/code/*.c",
        Flags::DOUBLESTAR,
        None,
        &mut results,
    )
    .unwrap();

    assert_eq!(results.to_vec(), ["/u/a/code/m.c"]);

    let mut results = GlobResults::new();
    glob_with(
        &source,
        Path::new(""),
        "u/*/*",
        Flags::ONLYDIR,
        None,
        &mut results,
    )
    .unwrap();

    assert_eq!(results.to_vec(), ["u/a/code", "u/b/doc"]);
}

/// Serves a [`MemDirSource`] with every directory listing reversed, to
/// make emission order observable
struct ReversedSource(MemDirSource);

impl DirSource for ReversedSource {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<SourceEntry>> {
        let mut entries = self.0.read_dir(path)?;
        entries.reverse();
        Ok(entries)
    }

    fn entry_kind(&self, path: &Path) -> Option<globlet::EntryKind> {
        self.0.entry_kind(path)
    }
}

#[test]
fn nosort_keeps_the_emission_order() {
    let source = ReversedSource(MemDirSource::from_paths(["a", "b", "c"]));

    let mut results = GlobResults::new();
    glob_with(
        &source,
        Path::new(""),
        "*",
        Flags::NOSORT,
        None,
        &mut results,
    )
    .unwrap();
    assert_eq!(results.to_vec(), ["c", "b", "a"]);

    let mut results = GlobResults::new();
    glob_with(&source, Path::new(""), "*", Flags::empty(), None, &mut results).unwrap();
    assert_eq!(results.to_vec(), ["a", "b", "c"]);
}

/// Fails every read of one specific directory
struct FailingSource {
    inner: MemDirSource,
    fail_on: &'static str,
}

impl DirSource for FailingSource {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<SourceEntry>> {
        if path == Path::new(self.fail_on) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }

        self.inner.read_dir(path)
    }

    fn entry_kind(&self, path: &Path) -> Option<globlet::EntryKind> {
        self.inner.entry_kind(path)
    }
}

#[test]
fn unreadable_directories_are_skipped_by_default() {
    let source = FailingSource {
        inner: MemDirSource::from_paths(["a/x", "b/y"]),
        fail_on: "a",
    };

    let mut seen = Vec::new();
    let mut errfunc = |path: &Path, _err: &io::Error| {
        seen.push(path.to_path_buf());
        false
    };

    let mut results = GlobResults::new();
    glob_with(
        &source,
        Path::new(""),
        "*/*",
        Flags::empty(),
        Some(&mut errfunc),
        &mut results,
    )
    .unwrap();

    assert_eq!(results.to_vec(), ["b/y"]);
    assert_eq!(seen, [Path::new("a")]);
}

#[test]
fn err_flag_and_callback_abort_the_walk() {
    let source = FailingSource {
        inner: MemDirSource::from_paths(["a/x", "b/y"]),
        fail_on: "a",
    };

    let mut results = GlobResults::new();
    let outcome = glob_with(
        &source,
        Path::new(""),
        "*/*",
        Flags::ERR,
        None,
        &mut results,
    );
    assert!(matches!(outcome, Err(GlobError::Aborted { .. })));

    let mut errfunc = |_path: &Path, _err: &io::Error| true;

    let mut results = GlobResults::new();
    let outcome = glob_with(
        &source,
        Path::new(""),
        "*/*",
        Flags::empty(),
        Some(&mut errfunc),
        &mut results,
    );
    assert!(matches!(outcome, Err(GlobError::Aborted { path, .. }) if path == Path::new("a")));
}

#[test]
fn append_accumulates_across_calls() {
    let dir = make_tree(&["a.c", "b.h"]);

    let mut results = GlobResults::new();
    glob_at(dir.path(), "*.c", Flags::empty(), None, &mut results).unwrap();
    glob_at(dir.path(), "*.h", Flags::APPEND, None, &mut results).unwrap();

    assert_eq!(results.to_vec(), ["a.c", "b.h"]);
}

#[test]
fn dooffs_reserves_leading_slots() {
    let dir = make_tree(&["a.c"]);

    let mut results = GlobResults::with_slots(2);
    glob_at(dir.path(), "*.c", Flags::DOOFFS, None, &mut results).unwrap();

    assert_eq!(results.to_vec(), ["", "", "a.c"]);
}
