use tracing::trace;

use crate::{
    GlobError,
    compiler::{BracedComponent, BracedPattern},
    flags::Flags,
    parser::split_first_group,
    paths::{expand_tilde, split_segments},
    segment::match_segment,
    strategy::{Strategy, analyze},
};

/// A pattern that can be matched against paths
///
/// # Syntax
///
/// The syntax is that of [Linux' glob](https://man7.org/linux/man-pages/man7/glob.7.html),
/// with the extensions gated behind [`Flags`]:
///
/// * Normal characters behave as expected
/// * `?` matches any single byte
/// * `*` matches any run of bytes, or no byte at all
/// * `[abc]` matches any of `a`, `b` or `c`; `[a-z]` matches a byte range
/// * `[!abc]` and `[^abc]` match any byte except `a`, `b` and `c`
/// * `\x` matches a literal `x` (unless [`Flags::NOESCAPE`] is set)
/// * `{a,b}` matches either alternative (with [`Flags::BRACE`]); groups
///   nest, so `a.{b,{c,d}}` has three expansions
/// * `**` as a whole component matches zero or more whole components
///   (with [`Flags::DOUBLESTAR`]; otherwise it behaves like `*`)
/// * `?(a|b)`, `*(a|b)`, `+(a|b)`, `@(a|b)` and `!(a|b)` are the extended
///   groups (with [`Flags::EXTGLOB`])
///
/// Matches are performed against path segments: no matcher ever crosses a
/// `/`, except for the whole-component `**`. An absolute pattern (leading
/// `/`) only matches absolute paths, and vice versa.
///
/// Malformed syntax is never an error: an unmatched `{`, an unclosed `[`
/// or a dangling group introducer simply match themselves literally.
#[derive(Debug)]
pub struct Pattern {
    flags: Flags,

    /// Compiled pattern variants
    ///
    /// Usually a single entry; more when brace expansion overflowed its
    /// bound and the pattern was split into independent sub-patterns.
    variants: Vec<BracedPattern>,
}

impl Pattern {
    /// Parse a pattern with the default (empty) flag set
    pub fn new(pattern: &str) -> Result<Self, GlobError> {
        Self::with_flags(pattern, Flags::default())
    }

    /// Parse a pattern
    ///
    /// The only possible failure is [`Flags::TILDE_CHECK`] finding no home
    /// directory; every other input compiles.
    pub fn with_flags(pattern: &str, flags: Flags) -> Result<Self, GlobError> {
        let pattern = expand_tilde(pattern, flags)?;

        let mut variants = Vec::new();
        compile_variants(&pattern, flags, &mut variants);

        Ok(Self { flags, variants })
    }

    /// Match the pattern against a path
    ///
    /// The path should be normalized: `.` and `..` segments are compared
    /// literally.
    pub fn is_match(&self, path: &str) -> bool {
        matches!(self.match_against(path), PatternMatchResult::Matched)
    }

    /// Match the pattern against a path, with detail on why it failed
    pub fn match_against(&self, path: &str) -> PatternMatchResult {
        let is_absolute = path.starts_with('/');
        let segments = split_segments(path);

        let mut starved = false;

        for variant in &self.variants {
            if variant.is_absolute && !is_absolute {
                return PatternMatchResult::PathNotAbsolute;
            }

            if !variant.is_absolute && is_absolute {
                return PatternMatchResult::PathIsAbsolute;
            }

            match match_components(&variant.components, &segments, self.flags) {
                PatternMatchResult::Matched => return PatternMatchResult::Matched,
                PatternMatchResult::Starved => starved = true,
                _ => {}
            }
        }

        if starved {
            PatternMatchResult::Starved
        } else {
            PatternMatchResult::NotMatched
        }
    }

    pub(crate) fn variants(&self) -> &[BracedPattern] {
        &self.variants
    }
}

/// Result of a pattern matching against a path
#[derive(Debug, Clone, Copy)]
pub enum PatternMatchResult {
    /// Failed as the provided path is relative while the pattern only
    /// matches absolute paths
    PathNotAbsolute,

    /// Failed as the provided path is absolute while the pattern only
    /// matches relative paths
    PathIsAbsolute,

    /// Pattern matched against the provided path
    Matched,

    /// Pattern did not match against the provided path
    NotMatched,

    /// Pattern did not match against the provided path because of starvation
    /// This means the pattern *may* match against a descendant of the provided path
    Starved,
}

/// Compile a pattern into walkable variants, splitting it whenever brace
/// expansion overflows its bound
fn compile_variants(pattern: &str, flags: Flags, out: &mut Vec<BracedPattern>) {
    match analyze(pattern, flags) {
        Strategy::NoBraces(compiled) | Strategy::SingleWalk(compiled) => out.push(compiled),

        Strategy::Fallback => {
            let variants = split_first_group(pattern, flags)
                .expect("fallback strategy implies a brace group");

            trace!(pattern, count = variants.len(), "split pattern into sub-patterns");

            for variant in variants {
                compile_variants(&variant, flags, out);
            }
        }
    }
}

/// Match a component list against a candidate's segment list
///
/// A recursive `**` component is a two-way branch: either it matches zero
/// components (skip it), or it absorbs one segment and stays in place.
/// Starvation means the path ran out while the pattern still had work to
/// do, so a descendant of the path may yet match.
fn match_components(
    components: &[BracedComponent],
    segments: &[&str],
    flags: Flags,
) -> PatternMatchResult {
    let Some((component, rest)) = components.split_first() else {
        return if segments.is_empty() {
            PatternMatchResult::Matched
        } else {
            PatternMatchResult::NotMatched
        };
    };

    if component.is_recursive {
        // Match-zero branch: behave as if the `**` were absent
        let zero = match_components(rest, segments, flags);

        if matches!(zero, PatternMatchResult::Matched) {
            return PatternMatchResult::Matched;
        }

        // Match-one-or-more branch: absorb one segment and stay in place
        let Some((segment, segments_rest)) = segments.split_first() else {
            // Out of segments, but `**` can always absorb a descendant's
            return PatternMatchResult::Starved;
        };

        // `**` is a wildcard, so the period rule applies to every segment
        // it absorbs
        if flags.contains(Flags::PERIOD) && segment.starts_with('.') {
            return zero;
        }

        return match (zero, match_components(components, segments_rest, flags)) {
            (_, PatternMatchResult::Matched) => PatternMatchResult::Matched,

            (PatternMatchResult::Starved, _) | (_, PatternMatchResult::Starved) => {
                PatternMatchResult::Starved
            }

            _ => PatternMatchResult::NotMatched,
        };
    }

    let Some((segment, segments_rest)) = segments.split_first() else {
        // The path ran out before the pattern did
        return PatternMatchResult::Starved;
    };

    let matched = component
        .alternatives
        .iter()
        .any(|alternative| match_segment(alternative, segment, flags));

    if matched {
        match_components(rest, segments_rest, flags)
    } else {
        PatternMatchResult::NotMatched
    }
}
