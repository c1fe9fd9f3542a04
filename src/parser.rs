use crate::{flags::Flags, scan::is_escaped};

/// Upper bound on the number of alternatives a single component may expand
/// into before the expander gives up and reports an overflow
pub(crate) const EXPANSION_LIMIT: usize = 65_536;

/// A parsed raw pattern
///
/// This is intended to be compiled using the [`crate::compiler`] module to
/// improve performance during matching.
#[derive(Debug)]
pub(crate) struct RawPattern {
    /// Does the pattern start with a path separator?
    pub is_absolute: bool,

    /// The slash-separated components, in order
    ///
    /// Empty components (from `a//b` or a trailing slash) are collapsed
    /// away during parsing.
    pub components: Vec<RawComponent>,
}

#[derive(Debug)]
pub(crate) struct RawComponent {
    /// The component's text as written in the pattern
    pub text: String,

    /// The brace-expanded alternatives, in source order
    ///
    /// [`None`] when the component contained no brace group. When present,
    /// the list is non-empty and each alternative is brace-free.
    pub alternatives: Option<Vec<String>>,
}

impl RawComponent {
    /// Is this component the recursive wildcard?
    ///
    /// Only a component that is *exactly* `**` is recursive; `a**b` is an
    /// ordinary component and `**` never takes part in brace expansion.
    pub fn is_double_star(&self) -> bool {
        self.text == "**"
    }
}

/// Sentinel returned when brace expansion would exceed [`EXPANSION_LIMIT`]
///
/// The caller is expected to fall back to splitting the pattern into
/// independent glob calls instead.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExpansionOverflow;

/// Parse a glob pattern string into a [`RawPattern`]
///
/// Parsing never rejects a pattern: ambiguous syntax such as an unmatched
/// `{` is kept as literal text. The only failure is the expansion bound.
pub(crate) fn parse(pattern: &str, flags: Flags) -> Result<RawPattern, ExpansionOverflow> {
    let is_absolute = pattern.starts_with('/');

    let mut components = Vec::new();

    for piece in split_components(pattern, flags) {
        if piece.is_empty() {
            continue;
        }

        let alternatives = if flags.contains(Flags::BRACE)
            && piece != "**"
            && find_group(piece.as_bytes(), flags).is_some()
        {
            let mut alternatives = Vec::new();
            expand_braces(piece, flags, &mut alternatives)?;
            Some(alternatives)
        } else {
            None
        };

        components.push(RawComponent {
            text: piece.to_owned(),
            alternatives,
        });
    }

    Ok(RawPattern {
        is_absolute,
        components,
    })
}

/// Split a pattern on unescaped `/` separators
fn split_components(pattern: &str, flags: Flags) -> Vec<&str> {
    let bytes = pattern.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;

    for (pos, byte) in bytes.iter().enumerate() {
        if *byte == b'/' && !is_escaped(bytes, pos, flags) {
            pieces.push(&pattern[start..pos]);
            start = pos + 1;
        }
    }

    pieces.push(&pattern[start..]);
    pieces
}

/// Find the first brace group that actually closes
///
/// Returns the byte offsets of the opening and closing braces. An
/// unmatched `{` is skipped over so that later, well-formed groups in the
/// same component are still found (e.g. in `a{b{c,d}` the inner group is
/// the one that expands).
fn find_group(bytes: &[u8], flags: Flags) -> Option<(usize, usize)> {
    let mut open_candidates = bytes
        .iter()
        .enumerate()
        .filter(|(pos, byte)| **byte == b'{' && !is_escaped(bytes, *pos, flags))
        .map(|(pos, _)| pos);

    open_candidates.find_map(|open| {
        let mut depth = 1usize;

        for pos in open + 1..bytes.len() {
            if is_escaped(bytes, pos, flags) {
                continue;
            }

            match bytes[pos] {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;

                    if depth == 0 {
                        return Some((open, pos));
                    }
                }
                _ => {}
            }
        }

        None
    })
}

/// Split a brace body on its top-level commas
///
/// Commas nested inside an inner `{…}` and escaped commas are literal.
fn split_alternatives<'p>(body: &'p str, flags: Flags) -> Vec<&'p str> {
    let bytes = body.as_bytes();
    let mut alternatives = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (pos, byte) in bytes.iter().enumerate() {
        if is_escaped(bytes, pos, flags) {
            continue;
        }

        match byte {
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => {
                alternatives.push(&body[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }

    alternatives.push(&body[start..]);
    alternatives
}

/// Rewrite the pattern into one variant per alternative of its first
/// brace group
///
/// Used by the fallback strategy when full expansion would overflow: each
/// returned pattern has that one group replaced by one of its
/// alternatives and is globbed independently. Groups are searched within
/// component boundaries, matching the semantics of [`parse`]. Returns
/// [`None`] when no component contains a group.
pub(crate) fn split_first_group(pattern: &str, flags: Flags) -> Option<Vec<String>> {
    let bytes = pattern.as_bytes();
    let mut start = 0;

    loop {
        let end = bytes[start..]
            .iter()
            .enumerate()
            .position(|(off, byte)| *byte == b'/' && !is_escaped(bytes, start + off, flags))
            .map(|off| start + off)
            .unwrap_or(bytes.len());

        let piece = &pattern[start..end];

        if piece != "**" {
            if let Some((open, close)) = find_group(piece.as_bytes(), flags) {
                let variants = split_alternatives(&piece[open + 1..close], flags)
                    .into_iter()
                    .map(|alternative| {
                        format!(
                            "{}{}{}",
                            &pattern[..start + open],
                            alternative,
                            &pattern[start + close + 1..],
                        )
                    })
                    .collect();

                return Some(variants);
            }
        }

        if end == bytes.len() {
            return None;
        }

        start = end + 1;
    }
}

/// Recursively expand the brace groups of one component into `out`
///
/// Expansion is order-preserving: the alternatives of `{a,b,c}` appear in
/// that relative order. Nested groups are expanded depth-first, so
/// `a.{b,{c,d}}` yields `a.b`, `a.c`, `a.d`.
fn expand_braces(
    component: &str,
    flags: Flags,
    out: &mut Vec<String>,
) -> Result<(), ExpansionOverflow> {
    let Some((open, close)) = find_group(component.as_bytes(), flags) else {
        if out.len() >= EXPANSION_LIMIT {
            return Err(ExpansionOverflow);
        }

        out.push(component.to_owned());
        return Ok(());
    };

    let prefix = &component[..open];
    let suffix = &component[close + 1..];

    for alternative in split_alternatives(&component[open + 1..close], flags) {
        expand_braces(&format!("{prefix}{alternative}{suffix}"), flags, out)?;
    }

    Ok(())
}
