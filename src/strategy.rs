use tracing::trace;

use crate::{
    compiler::{BracedPattern, compile},
    flags::Flags,
    parser::parse,
};

/// The traversal shape chosen for one pattern
///
/// Each pattern is analyzed once and assigned the cheapest strategy that
/// can decide its matches.
#[derive(Debug)]
pub(crate) enum Strategy {
    /// No brace group anywhere: the walker is driven on the raw
    /// component list
    NoBraces(BracedPattern),

    /// Braces expanded within bounds: a single walk evaluates every
    /// alternative against each directory entry, instead of one tree walk
    /// per expansion
    SingleWalk(BracedPattern),

    /// The expansion bound was exceeded: the caller must split the
    /// pattern into independent glob calls and union their results
    Fallback,
}

/// Classify a pattern into its traversal strategy
pub(crate) fn analyze(pattern: &str, flags: Flags) -> Strategy {
    let raw = match parse(pattern, flags) {
        Ok(raw) => raw,
        Err(_) => {
            trace!(pattern, "brace expansion overflow, falling back to pattern splitting");
            return Strategy::Fallback;
        }
    };

    let has_braces = raw
        .components
        .iter()
        .any(|component| component.alternatives.is_some());

    let compiled = compile(raw, flags);

    if has_braces {
        let alternatives: usize = compiled
            .components
            .iter()
            .map(|component| component.alternatives.len())
            .sum();

        trace!(
            pattern,
            alternatives,
            recursive = compiled.has_recursive,
            "single-walk strategy"
        );
        Strategy::SingleWalk(compiled)
    } else {
        trace!(pattern, recursive = compiled.has_recursive, "no-braces strategy");
        Strategy::NoBraces(compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_patterns_take_the_no_braces_path() {
        let flags = Flags::BRACE;

        assert!(matches!(analyze("src/*.rs", flags), Strategy::NoBraces(_)));
        assert!(matches!(analyze("a/b/c", flags), Strategy::NoBraces(_)));

        // Braces without the flag are literal text
        assert!(matches!(
            analyze("{a,b}", Flags::empty()),
            Strategy::NoBraces(_)
        ));
    }

    #[test]
    fn braced_patterns_take_the_single_walk_path() {
        let flags = Flags::BRACE;

        match analyze("{src,lib}/*.{zig,rs}", flags) {
            Strategy::SingleWalk(compiled) => {
                assert_eq!(compiled.components[0].alternatives.len(), 2);
                assert_eq!(compiled.components[1].alternatives.len(), 2);
            }
            other => panic!("expected single-walk, got {other:?}"),
        }
    }

    #[test]
    fn overflowing_patterns_fall_back() {
        let pattern = "{a,b}".repeat(17);

        assert!(matches!(
            analyze(&pattern, Flags::BRACE),
            Strategy::Fallback
        ));
    }
}
