//! Violation reporting types

use std::fmt;

use jsv_core::JsonPointer;

/// A single keyword failure found during validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Location of the offending value within the instance
    pub instance_path: JsonPointer,
    /// Location of the schema node whose keyword failed
    pub schema_path: JsonPointer,
    /// Keyword that failed
    pub keyword: String,
    /// Human-readable description of the failure
    pub message: String,
}

impl Violation {
    /// Create a new violation
    pub fn new(
        instance_path: JsonPointer,
        schema_path: JsonPointer,
        keyword: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            instance_path,
            schema_path,
            keyword: keyword.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{}: [{}] {}",
            self.instance_path, self.keyword, self.message
        )
    }
}

/// Ordered collection of violations from one validation run
///
/// An empty report means the instance satisfied the schema. Violations
/// appear in the order they were discovered, which follows the schema's
/// keyword order and the instance's member order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationReport {
    violations: Vec<Violation>,
}

impl ViolationReport {
    /// Create an empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the instance satisfied the schema
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Number of recorded violations
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Whether the report holds no violations
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Record a violation
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Append every violation from another report
    pub fn extend(&mut self, other: ViolationReport) {
        self.violations.extend(other.violations);
    }

    /// Recorded violations in discovery order
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Iterate over recorded violations
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }
}

impl fmt::Display for ViolationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for violation in &self.violations {
            writeln!(f, "{violation}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_violation() -> Violation {
        Violation::new(
            JsonPointer::parse("/a").expect("pointer"),
            JsonPointer::parse("/properties/a").expect("pointer"),
            "type",
            "Expected integer, found string",
        )
    }

    #[test]
    fn test_empty_report_is_valid() {
        let report = ViolationReport::new();
        assert!(report.is_valid());
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
    }

    #[test]
    fn test_push_invalidates_report() {
        let mut report = ViolationReport::new();
        report.push(sample_violation());

        assert!(!report.is_valid());
        assert_eq!(report.len(), 1);
        assert_eq!(report.violations()[0].keyword, "type");
    }

    #[test]
    fn test_extend_appends_in_order() {
        let mut first = ViolationReport::new();
        first.push(sample_violation());

        let mut second = ViolationReport::new();
        second.push(Violation::new(
            JsonPointer::root(),
            JsonPointer::root(),
            "required",
            "Required member 'b' is missing",
        ));

        first.extend(second);

        assert_eq!(first.len(), 2);
        assert_eq!(first.violations()[0].keyword, "type");
        assert_eq!(first.violations()[1].keyword, "required");
    }

    #[test]
    fn test_violation_display() {
        let violation = sample_violation();
        assert_eq!(
            violation.to_string(),
            "#/a: [type] Expected integer, found string"
        );
    }

    #[test]
    fn test_root_violation_display() {
        let violation = Violation::new(
            JsonPointer::root(),
            JsonPointer::root(),
            "minProperties",
            "Object has 0 members, fewer than minimum 1",
        );
        assert_eq!(
            violation.to_string(),
            "#: [minProperties] Object has 0 members, fewer than minimum 1"
        );
    }

    #[test]
    fn test_report_display_lists_one_violation_per_line() {
        let mut report = ViolationReport::new();
        report.push(sample_violation());
        report.push(Violation::new(
            JsonPointer::root(),
            JsonPointer::root(),
            "required",
            "Required member 'b' is missing",
        ));

        let rendered = report.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("#/a: [type]"));
        assert!(lines[1].starts_with("#: [required]"));
    }
}
