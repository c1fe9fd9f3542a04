use crate::{
    flags::Flags,
    parser::{RawComponent, RawPattern},
    scan::first_wildcard,
};

/// A compiled pattern: the component list plus the facts the traversal
/// engine needs up front
#[derive(Debug)]
pub(crate) struct BracedPattern {
    pub is_absolute: bool,

    /// True iff any component is a recursive `**`
    pub has_recursive: bool,

    pub components: Vec<BracedComponent>,
}

/// One slash-separated fragment of a pattern, compiled
#[derive(Debug)]
pub(crate) struct BracedComponent {
    /// One context per brace alternative, in source order
    ///
    /// A component without braces compiles to a single context over its
    /// own text. Never empty.
    pub alternatives: Vec<PatternContext>,

    /// Does this component match zero or more whole path components?
    ///
    /// Only set for a component that is exactly `**` while
    /// [`Flags::DOUBLESTAR`] is active; otherwise `**` degrades to a
    /// segment-level `*`.
    pub is_recursive: bool,
}

/// Precomputed summary of one component alternative
///
/// The goal of this type is to make segment matching faster: the matcher
/// short-circuits on `has_magic`, and the literal prefix/suffix spans let
/// it reject most segments with two slice comparisons before ever entering
/// the backtracker.
#[derive(Debug)]
pub(crate) struct PatternContext {
    pub text: String,

    /// Does the text contain any unescaped wildcard?
    pub has_magic: bool,

    /// Length of the leading literal span (escape-free, wildcard-free)
    pub literal_prefix_len: usize,

    /// Length of the trailing literal span (escape-free, wildcard-free)
    pub literal_suffix_len: usize,

    /// Is the text exactly `*`?
    pub is_pure_star: bool,

    /// Is the text exactly `**`?
    ///
    /// Only meaningful at the component level; down here it matches like
    /// a plain `*`.
    pub is_double_star: bool,

    /// Does the text contain an extended group?
    pub has_ext_group: bool,

    /// Must a leading `.` in the segment be rejected under [`Flags::PERIOD`]?
    ///
    /// Set when the first effective pattern byte is a wildcard: POSIX
    /// requires a leading period to be matched by an explicit `.`.
    pub requires_period_guard: bool,
}

/// Compile a parsed pattern to its final form
pub(crate) fn compile(raw: RawPattern, flags: Flags) -> BracedPattern {
    let RawPattern {
        is_absolute,
        components,
    } = raw;

    let components: Vec<_> = components
        .into_iter()
        .map(|component| compile_component(component, flags))
        .collect();

    BracedPattern {
        is_absolute,
        has_recursive: components.iter().any(|component| component.is_recursive),
        components,
    }
}

/// Compile a parsed component to its final form
fn compile_component(component: RawComponent, flags: Flags) -> BracedComponent {
    let is_recursive = component.is_double_star() && flags.contains(Flags::DOUBLESTAR);

    let RawComponent { text, alternatives } = component;

    let alternatives = match alternatives {
        Some(alternatives) => alternatives
            .into_iter()
            .map(|alternative| PatternContext::new(alternative, flags))
            .collect(),

        None => vec![PatternContext::new(text, flags)],
    };

    BracedComponent {
        alternatives,
        is_recursive,
    }
}

impl PatternContext {
    pub fn new(text: String, flags: Flags) -> Self {
        let bytes = text.as_bytes();

        let has_magic = first_wildcard(bytes, flags).is_some();
        let requires_period_guard = first_wildcard(bytes, flags) == Some(0);

        let (literal_prefix_len, literal_suffix_len) = if has_magic {
            literal_spans(bytes, flags)
        } else {
            (0, 0)
        };

        Self {
            has_magic,
            literal_prefix_len,
            literal_suffix_len,
            is_pure_star: text == "*",
            is_double_star: text == "**",
            has_ext_group: has_ext_group(bytes, flags),
            requires_period_guard,
            text,
        }
    }

    pub fn literal_prefix(&self) -> &[u8] {
        &self.text.as_bytes()[..self.literal_prefix_len]
    }

    pub fn literal_suffix(&self) -> &[u8] {
        let bytes = self.text.as_bytes();
        &bytes[bytes.len() - self.literal_suffix_len..]
    }
}

/// Bytes that end a literal span
///
/// Anything that might be a wildcard, part of a group, or an escape stops
/// the span; the spans are a conservative under-approximation and only
/// ever used to reject segments early.
fn is_span_breaker(byte: u8, flags: Flags) -> bool {
    match byte {
        b'*' | b'?' | b'[' | b']' | b'\\' => true,
        b'(' | b')' | b'|' | b'+' | b'@' | b'!' => flags.contains(Flags::EXTGLOB),
        _ => false,
    }
}

/// Compute the leading and trailing literal spans of a magic component
fn literal_spans(bytes: &[u8], flags: Flags) -> (usize, usize) {
    let prefix = bytes
        .iter()
        .position(|byte| is_span_breaker(*byte, flags))
        .unwrap_or(bytes.len());

    let suffix = bytes
        .iter()
        .rposition(|byte| is_span_breaker(*byte, flags))
        .map(|last| bytes.len() - last - 1)
        .unwrap_or(0);

    (prefix, suffix)
}

/// Does the text contain an unescaped extended-group introducer?
fn has_ext_group(bytes: &[u8], flags: Flags) -> bool {
    if !flags.contains(Flags::EXTGLOB) {
        return false;
    }

    bytes.windows(2).enumerate().any(|(pos, pair)| {
        matches!(pair[0], b'?' | b'*' | b'+' | b'@' | b'!')
            && pair[1] == b'('
            && !crate::scan::is_escaped(bytes, pos, flags)
    })
}
