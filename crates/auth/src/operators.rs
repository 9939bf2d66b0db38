//! Operator allow-list.
//!
//! Operators are accounts allowed to self-bootstrap site access without a
//! pre-existing membership. The list is process-wide configuration, built
//! once at startup and immutable afterwards; it is never persisted.

use std::collections::HashSet;

/// Immutable set of operator emails.
///
/// Matching is case-insensitive: emails are normalized (trimmed, lowercased)
/// at construction and at lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorAllowlist {
    emails: HashSet<String>,
}

impl OperatorAllowlist {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let emails = emails
            .into_iter()
            .map(|e| normalize(e.as_ref()))
            .filter(|e| !e.is_empty())
            .collect();
        Self { emails }
    }

    /// Parse a comma-separated list (the `QUILL_OPERATOR_EMAILS` format).
    pub fn from_csv(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    pub fn contains(&self, email: &str) -> bool {
        self.emails.contains(&normalize(email))
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let ops = OperatorAllowlist::new(["Ops@Example.com"]);
        assert!(ops.contains("ops@example.com"));
        assert!(ops.contains("OPS@EXAMPLE.COM"));
        assert!(!ops.contains("user@example.com"));
    }

    #[test]
    fn csv_parsing_trims_and_skips_empties() {
        let ops = OperatorAllowlist::from_csv(" ops@example.com , root@example.com ,, ");
        assert_eq!(ops.len(), 2);
        assert!(ops.contains("ops@example.com"));
        assert!(ops.contains("root@example.com"));
    }

    #[test]
    fn empty_list_matches_nothing() {
        let ops = OperatorAllowlist::default();
        assert!(ops.is_empty());
        assert!(!ops.contains("ops@example.com"));
    }
}
