use memchr::{memchr_iter, memchr3_iter};

use crate::flags::Flags;

/// Does the pattern contain any unescaped wildcard character?
///
/// Wildcards are `*`, `?` and `[`, plus `{` when [`Flags::BRACE`] is set
/// and the `+(`, `@(` and `!(` group introducers when [`Flags::EXTGLOB`]
/// is set (`?(` and `*(` are already covered by `?` and `*`).
///
/// Escaped characters (`\*` and friends) do not count unless
/// [`Flags::NOESCAPE`] disabled escaping.
pub(crate) fn has_wildcards(pattern: &str, flags: Flags) -> bool {
    let bytes = pattern.as_bytes();

    for pos in memchr3_iter(b'*', b'?', b'[', bytes) {
        if !is_escaped(bytes, pos, flags) {
            return true;
        }
    }

    if flags.contains(Flags::BRACE) {
        for pos in memchr_iter(b'{', bytes) {
            if !is_escaped(bytes, pos, flags) {
                return true;
            }
        }
    }

    if flags.contains(Flags::EXTGLOB) {
        for pos in memchr3_iter(b'+', b'@', b'!', bytes) {
            if bytes.get(pos + 1) == Some(&b'(') && !is_escaped(bytes, pos, flags) {
                return true;
            }
        }
    }

    false
}

/// Position of the first unescaped wildcard byte, if any
///
/// This is the scanner's second entry point, used to split a component
/// into its literal prefix and its magic tail.
pub(crate) fn first_wildcard(bytes: &[u8], flags: Flags) -> Option<usize> {
    let mut first = None;

    let mut consider = |pos: usize| {
        if !is_escaped(bytes, pos, flags) && first.is_none_or(|prev| pos < prev) {
            first = Some(pos);
        }
    };

    for pos in memchr3_iter(b'*', b'?', b'[', bytes) {
        consider(pos);
    }

    if flags.contains(Flags::EXTGLOB) {
        for pos in memchr3_iter(b'+', b'@', b'!', bytes) {
            if bytes.get(pos + 1) == Some(&b'(') {
                consider(pos);
            }
        }
    }

    first
}

/// Is the byte at `pos` preceded by an odd run of backslashes?
pub(crate) fn is_escaped(bytes: &[u8], pos: usize, flags: Flags) -> bool {
    if !flags.escapes() {
        return false;
    }

    let mut backslashes = 0;

    while backslashes < pos && bytes[pos - backslashes - 1] == b'\\' {
        backslashes += 1;
    }

    backslashes % 2 == 1
}

/// Reference implementation of [`has_wildcards`]
///
/// Walks the pattern byte by byte, consuming escape pairs as it goes. The
/// vectorized scan must agree with this for every input.
#[cfg(test)]
pub(crate) fn has_wildcards_scalar(pattern: &str, flags: Flags) -> bool {
    let bytes = pattern.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let byte = bytes[i];

        if flags.escapes() && byte == b'\\' {
            i += 2;
            continue;
        }

        match byte {
            b'*' | b'?' | b'[' => return true,

            b'{' if flags.contains(Flags::BRACE) => return true,

            b'+' | b'@' | b'!'
                if flags.contains(Flags::EXTGLOB) && bytes.get(i + 1) == Some(&b'(') =>
            {
                return true;
            }

            _ => {}
        }

        i += 1;
    }

    false
}
