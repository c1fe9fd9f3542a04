use std::borrow::Cow;

use etcetera::home_dir;
use tracing::trace;

use crate::{GlobError, flags::Flags};

/// Expand a leading `~` to the user's home directory
///
/// Only `~` alone and `~/…` are expanded; `~user` forms are kept literal.
/// Without [`Flags::TILDE`] or [`Flags::TILDE_CHECK`] the pattern passes
/// through untouched. When the home directory cannot be determined (or is
/// not valid UTF-8), [`Flags::TILDE_CHECK`] turns that into
/// [`GlobError::NoMatch`] while plain [`Flags::TILDE`] keeps the pattern
/// literal.
pub(crate) fn expand_tilde(pattern: &str, flags: Flags) -> Result<Cow<'_, str>, GlobError> {
    if !flags.intersects(Flags::TILDE | Flags::TILDE_CHECK) {
        return Ok(Cow::Borrowed(pattern));
    }

    let rest = if pattern == "~" {
        Some("")
    } else {
        pattern.strip_prefix("~/")
    };

    let Some(rest) = rest else {
        return Ok(Cow::Borrowed(pattern));
    };

    let home = home_dir()
        .ok()
        .and_then(|home| home.to_str().map(str::to_owned));

    match home {
        Some(home) => {
            trace!(pattern, %home, "expanded leading tilde");

            Ok(Cow::Owned(if rest.is_empty() {
                home
            } else {
                format!("{}/{rest}", home.trim_end_matches('/'))
            }))
        }

        None if flags.contains(Flags::TILDE_CHECK) => Err(GlobError::NoMatch),
        None => Ok(Cow::Borrowed(pattern)),
    }
}

/// Split a candidate path into its segments
///
/// Consecutive separators collapse and a trailing separator is ignored, so
/// `a//b/` yields `["a", "b"]`.
pub(crate) fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Remove the backslash escapes from a pattern component
///
/// Used where a magic-free component is turned back into a path fragment,
/// e.g. by the literal shortcut.
pub(crate) fn unescape(text: &str, flags: Flags) -> Cow<'_, str> {
    if !flags.escapes() || !text.contains('\\') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }

    Cow::Owned(out)
}
