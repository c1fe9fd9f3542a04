//! Matching of a single path segment against a single component pattern
//!
//! Neither side may contain a `/`: crossing directory boundaries is the
//! walker's job, never the matcher's. Matching is total and
//! deterministic, and the group-free backtracker never allocates.

use crate::{compiler::PatternContext, flags::Flags};

/// Match one path segment against one compiled component alternative
pub(crate) fn match_segment(ctx: &PatternContext, segment: &str, flags: Flags) -> bool {
    let pat = ctx.text.as_bytes();
    let txt = segment.as_bytes();

    // A leading period is only ever matched by an explicit leading `.`
    if flags.contains(Flags::PERIOD)
        && ctx.requires_period_guard
        && txt.first() == Some(&b'.')
    {
        return false;
    }

    if !ctx.has_magic {
        return literal_eq(pat, txt, flags);
    }

    // At segment level `**` carries no special meaning: both star forms
    // match any segment
    if ctx.is_pure_star || ctx.is_double_star {
        return true;
    }

    // Reject early unless the literal spans bracket the segment
    if txt.len() < ctx.literal_prefix_len + ctx.literal_suffix_len
        || !txt.starts_with(ctx.literal_prefix())
        || !txt.ends_with(ctx.literal_suffix())
    {
        return false;
    }

    if ctx.has_ext_group {
        match_ext(pat, txt, flags)
    } else {
        match_simple(pat, txt, flags)
    }
}

/// Compare a pattern with no wildcards against a segment, honoring escapes
fn literal_eq(pat: &[u8], txt: &[u8], flags: Flags) -> bool {
    let escapes = flags.escapes();
    let mut p = 0;
    let mut t = 0;

    while p < pat.len() {
        let byte = if escapes && pat[p] == b'\\' && p + 1 < pat.len() {
            p += 1;
            pat[p]
        } else {
            pat[p]
        };

        if t >= txt.len() || txt[t] != byte {
            return false;
        }

        p += 1;
        t += 1;
    }

    t == txt.len()
}

/// Iterative backtracking matcher for components without extended groups
///
/// Keeps a single resume point at the most recent `*`: on a mismatch the
/// star swallows one more byte and matching resumes right after it.
fn match_simple(pat: &[u8], txt: &[u8], flags: Flags) -> bool {
    let escapes = flags.escapes();

    let mut p = 0;
    let mut t = 0;
    let mut star_p = usize::MAX;
    let mut star_t = 0;

    while t < txt.len() {
        if p < pat.len() {
            match pat[p] {
                b'*' => {
                    star_p = p;
                    star_t = t;
                    p += 1;
                    continue;
                }

                b'?' => {
                    p += 1;
                    t += 1;
                    continue;
                }

                b'[' => match match_class(pat, p, txt[t], flags) {
                    // Well-formed class: advance or backtrack
                    Some((true, next_p)) => {
                        p = next_p;
                        t += 1;
                        continue;
                    }
                    Some((false, _)) => {}

                    // Unclosed class: the `[` is an ordinary byte
                    None => {
                        if txt[t] == b'[' {
                            p += 1;
                            t += 1;
                            continue;
                        }
                    }
                },

                b'\\' if escapes && p + 1 < pat.len() => {
                    if pat[p + 1] == txt[t] {
                        p += 2;
                        t += 1;
                        continue;
                    }
                }

                byte => {
                    if byte == txt[t] {
                        p += 1;
                        t += 1;
                        continue;
                    }
                }
            }
        }

        // Mismatch: resume after the last star, one byte further in
        if star_p != usize::MAX {
            p = star_p + 1;
            star_t += 1;
            t = star_t;
        } else {
            return false;
        }
    }

    // Segment consumed; only trailing stars may remain
    while p < pat.len() && pat[p] == b'*' {
        p += 1;
    }

    p == pat.len()
}

/// Match a character class starting at `pat[open]` (which is `[`) against
/// one byte
///
/// Returns the match outcome and the pattern index one past the closing
/// `]`, or [`None`] when the class never closes.
fn match_class(pat: &[u8], open: usize, byte: u8, flags: Flags) -> Option<(bool, usize)> {
    let escapes = flags.escapes();

    let mut i = open + 1;

    let negate = matches!(pat.get(i), Some(&(b'!' | b'^')));
    if negate {
        i += 1;
    }

    let first = i;
    let mut matched = false;

    loop {
        if i >= pat.len() {
            return None;
        }

        // A `]` in first position is a literal member
        if pat[i] == b']' && i > first {
            return Some((matched != negate, i + 1));
        }

        let lo = if escapes && pat[i] == b'\\' && i + 1 < pat.len() {
            i += 1;
            pat[i]
        } else {
            pat[i]
        };

        // `lo-hi` range, unless the `-` is trailing (then it is literal)
        if pat.get(i + 1) == Some(&b'-') && i + 2 < pat.len() && pat[i + 2] != b']' {
            i += 2;

            let hi = if escapes && pat[i] == b'\\' && i + 1 < pat.len() {
                i += 1;
                pat[i]
            } else {
                pat[i]
            };

            if lo <= byte && byte <= hi {
                matched = true;
            }
        } else if byte == lo {
            matched = true;
        }

        i += 1;
    }
}

/// One parsed extended group: `?(a|b)`, `*(a|b)`, `+(a|b)`, `@(a|b)` or
/// `!(a|b)`
struct ExtGroup {
    op: u8,
    /// Byte ranges of the alternatives within the pattern
    alts: Vec<(usize, usize)>,
    /// Pattern index one past the closing `)`
    rest: usize,
}

/// Recursive matcher for components containing extended groups
fn match_ext(pat: &[u8], txt: &[u8], flags: Flags) -> bool {
    match_ext_at(pat, 0, txt, 0, flags)
}

/// Does `pat[p..]` match `txt[t..]`?
fn match_ext_at(pat: &[u8], p: usize, txt: &[u8], t: usize, flags: Flags) -> bool {
    let escapes = flags.escapes();

    if p >= pat.len() {
        return t == txt.len();
    }

    if let Some(group) = parse_group(pat, p, flags) {
        return match_group(pat, &group, txt, t, flags);
    }

    match pat[p] {
        b'*' => {
            let mut next_p = p;
            while next_p < pat.len() && pat[next_p] == b'*' {
                next_p += 1;
            }

            (t..=txt.len()).any(|e| match_ext_at(pat, next_p, txt, e, flags))
        }

        b'?' => t < txt.len() && match_ext_at(pat, p + 1, txt, t + 1, flags),

        b'[' => match match_class(pat, p, *txt.get(t).unwrap_or(&0), flags) {
            Some((matched, next_p)) => {
                t < txt.len() && matched && match_ext_at(pat, next_p, txt, t + 1, flags)
            }
            None => {
                t < txt.len() && txt[t] == b'[' && match_ext_at(pat, p + 1, txt, t + 1, flags)
            }
        },

        b'\\' if escapes && p + 1 < pat.len() => {
            t < txt.len() && txt[t] == pat[p + 1] && match_ext_at(pat, p + 2, txt, t + 1, flags)
        }

        byte => t < txt.len() && txt[t] == byte && match_ext_at(pat, p + 1, txt, t + 1, flags),
    }
}

/// Does one alternative match the whole of `txt[t..e]`?
fn alt_matches(pat: &[u8], alt: (usize, usize), txt: &[u8], flags: Flags) -> bool {
    match_ext_at(&pat[..alt.1], alt.0, txt, 0, flags)
}

/// End positions in `txt` reachable from `t` by matching exactly one of
/// the group's alternatives
fn one_rep_ends<'m>(
    pat: &'m [u8],
    group: &'m ExtGroup,
    txt: &'m [u8],
    t: usize,
    flags: Flags,
) -> impl Iterator<Item = usize> + 'm {
    (t..=txt.len()).filter(move |&e| {
        group
            .alts
            .iter()
            .any(|&alt| alt_matches(pat, alt, &txt[t..e], flags))
    })
}

fn match_group(pat: &[u8], group: &ExtGroup, txt: &[u8], t: usize, flags: Flags) -> bool {
    let rest = group.rest;

    match group.op {
        // Zero or one repetition
        b'?' => {
            match_ext_at(pat, rest, txt, t, flags)
                || one_rep_ends(pat, group, txt, t, flags)
                    .any(|e| match_ext_at(pat, rest, txt, e, flags))
        }

        // Exactly one repetition
        b'@' => one_rep_ends(pat, group, txt, t, flags)
            .any(|e| match_ext_at(pat, rest, txt, e, flags)),

        // Zero or more repetitions
        b'*' => match_reps(pat, group, txt, t, flags),

        // One or more repetitions
        b'+' => one_rep_ends(pat, group, txt, t, flags)
            .any(|e| match_reps(pat, group, txt, e, flags)),

        // Anything the alternatives do not match
        b'!' => (t..=txt.len()).any(|e| {
            let negated = !group
                .alts
                .iter()
                .any(|&alt| alt_matches(pat, alt, &txt[t..e], flags));

            negated && match_ext_at(pat, rest, txt, e, flags)
        }),

        _ => unreachable!("not a group introducer"),
    }
}

/// Match zero or more repetitions of the group's alternatives followed by
/// the rest of the pattern
///
/// Every recursion step must consume at least one byte, which bounds the
/// depth even when an alternative can match the empty string.
fn match_reps(pat: &[u8], group: &ExtGroup, txt: &[u8], t: usize, flags: Flags) -> bool {
    if match_ext_at(pat, group.rest, txt, t, flags) {
        return true;
    }

    one_rep_ends(pat, group, txt, t, flags)
        .filter(|&e| e > t)
        .any(|e| match_reps(pat, group, txt, e, flags))
}

/// Parse an extended group introducer at `pat[p]`
///
/// Returns [`None`] when `pat[p]` does not introduce a group or the group
/// never closes (the introducer then matches as an ordinary token).
fn parse_group(pat: &[u8], p: usize, flags: Flags) -> Option<ExtGroup> {
    if !flags.contains(Flags::EXTGLOB) {
        return None;
    }

    let op = *pat.get(p)?;

    if !matches!(op, b'?' | b'*' | b'+' | b'@' | b'!') || pat.get(p + 1) != Some(&b'(') {
        return None;
    }

    let escapes = flags.escapes();

    let mut alts = Vec::new();
    let mut alt_start = p + 2;
    let mut depth = 1usize;
    let mut i = p + 2;

    while i < pat.len() {
        let byte = pat[i];

        if escapes && byte == b'\\' {
            i += 2;
            continue;
        }

        if matches!(byte, b'?' | b'*' | b'+' | b'@' | b'!') && pat.get(i + 1) == Some(&b'(') {
            depth += 1;
            i += 2;
            continue;
        }

        match byte {
            b')' => {
                depth -= 1;

                if depth == 0 {
                    alts.push((alt_start, i));
                    return Some(ExtGroup { op, alts, rest: i + 1 });
                }
            }

            b'|' if depth == 1 => {
                alts.push((alt_start, i));
                alt_start = i + 1;
            }

            _ => {}
        }

        i += 1;
    }

    None
}
