//! Reason code -> severity lookup.

use std::collections::HashMap;

use crate::models::Severity;

const DEFAULT_TABLE: &[(&str, Severity)] = &[
    ("spam", Severity::Low),
    ("duplicate", Severity::Low),
    ("other", Severity::Low),
    ("fake", Severity::Medium),
    ("inappropriate", Severity::Medium),
    ("harassment", Severity::Medium),
    ("fake_profile", Severity::Medium),
    ("impersonation", Severity::Medium),
    ("scam", Severity::High),
    ("prohibited", Severity::High),
    ("scammer", Severity::High),
];

/// Severity table injected into the engine. Reason codes match exactly;
/// anything not in the table classifies as low.
#[derive(Debug, Clone)]
pub struct SeverityPolicy {
    table: HashMap<String, Severity>,
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE
                .iter()
                .map(|(reason, severity)| (reason.to_string(), *severity))
                .collect(),
        }
    }
}

impl SeverityPolicy {
    pub fn from_table(table: HashMap<String, Severity>) -> Self {
        Self { table }
    }

    /// Built-in table with `overrides` layered on top.
    pub fn with_overrides(overrides: &HashMap<String, Severity>) -> Self {
        let mut policy = Self::default();
        for (reason, severity) in overrides {
            policy.table.insert(reason.clone(), *severity);
        }
        policy
    }

    pub fn classify(&self, reason: &str) -> Severity {
        self.table
            .get(reason)
            .copied()
            .unwrap_or(Severity::Low)
    }
}
