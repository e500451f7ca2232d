//! Structured warnings collected across a migration run.

mod models;

pub use models::Warning;

/// Collects warnings instead of printing them, so each stage stays testable.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and log it as `[code] message`.
    pub fn warn(&mut self, warning: Warning) {
        log::warn!("[{}] {}", warning.code(), warning);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// Count warnings with the given code.
    pub fn count(&self, code: &str) -> usize {
        self.warnings.iter().filter(|w| w.code() == code).count()
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_and_counts() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn(Warning::EmptyContentTree);
        diagnostics.warn(Warning::NoTopLevelHeading { document: "a".to_string() });
        diagnostics.warn(Warning::NoTopLevelHeading { document: "b".to_string() });

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics.count("no-top-level-heading"), 2);
        assert_eq!(diagnostics.count("empty-content-tree"), 1);
    }

    #[test]
    fn test_warning_serializes_with_kind_tag() {
        let warning = Warning::IntegrityMismatch {
            page: "Home".to_string(),
            source_dir: "attachments/123".into(),
            copied: 2,
            skipped: 1,
            source_count: 4,
        };
        let json = serde_json::to_value(&warning).unwrap();

        assert_eq!(json["kind"], "integrity_mismatch");
        assert_eq!(json["source_count"], 4);
        assert_eq!(json["source_dir"], "attachments/123");
    }
}
