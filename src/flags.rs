use bitflags::bitflags;

bitflags! {
    /// Options controlling how a pattern is interpreted and how results
    /// are produced
    ///
    /// The default (empty) set gives POSIX-ish globbing: backslash escapes
    /// are honored, hidden files are matched like any other, braces are
    /// literal and `**` behaves like `*`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Flags: u32 {
        /// Treat backslash as a literal character instead of an escape
        const NOESCAPE = 1 << 0;

        /// Wildcards do not match a leading `.` of a path segment
        ///
        /// A segment starting with `.` is only matched by a pattern
        /// component that explicitly starts with `.`
        const PERIOD = 1 << 1;

        /// Enable `{a,b}` alternation expansion
        const BRACE = 1 << 2;

        /// If nothing matched, return the pattern itself as the sole result
        const NOCHECK = 1 << 3;

        /// Skip the lexicographic sort of the results
        ///
        /// Without the sort, duplicate suppression is not guaranteed either.
        const NOSORT = 1 << 4;

        /// Append a `/` to results that are directories
        const MARK = 1 << 5;

        /// Like [`Flags::NOCHECK`], but only when the pattern contains no
        /// wildcard characters at all
        const NOMAGIC = 1 << 6;

        /// Expand a leading `~` to the user's home directory
        const TILDE = 1 << 7;

        /// Like [`Flags::TILDE`], but fail with
        /// [`GlobError::NoMatch`](crate::GlobError::NoMatch) when the home
        /// directory cannot be determined
        const TILDE_CHECK = 1 << 8;

        /// Only emit results that are directories
        const ONLYDIR = 1 << 9;

        /// Escalate directory read errors to
        /// [`GlobError::Aborted`](crate::GlobError::Aborted) instead of
        /// skipping the entry
        const ERR = 1 << 10;

        /// `**` matches zero or more whole path components
        ///
        /// When unset, `**` is matched exactly like `*`.
        const DOUBLESTAR = 1 << 11;

        /// Enable the extended groups `?(a|b)`, `*(a|b)`, `+(a|b)`,
        /// `@(a|b)` and `!(a|b)`
        const EXTGLOB = 1 << 12;

        /// Keep the entries already present in the result container
        ///
        /// Without this flag, a fresh call clears the container first
        /// (reserved leading slots are preserved either way).
        const APPEND = 1 << 13;

        /// Honor the container's reserved leading slots
        /// (see [`GlobResults::with_slots`](crate::GlobResults::with_slots))
        const DOOFFS = 1 << 14;
    }
}

impl Flags {
    /// Are backslash escapes active?
    pub(crate) fn escapes(self) -> bool {
        !self.contains(Flags::NOESCAPE)
    }
}
