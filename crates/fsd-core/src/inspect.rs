//! Advisory checks on outline indentation.
//!
//! Reports issues without changing how the text is parsed: the layout
//! still runs on the auto-corrected depths. Results feed editor hints.

use crate::outline::{detect_indent_unit, measure_indent};
use serde::Serialize;

/// Severity of an indentation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentSeverity {
    /// Probably not what the author meant.
    Warning,
    /// Cosmetic; the depth was rounded.
    Info,
}

/// A single indentation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndentIssue {
    /// 1-based line number in the original text (blank lines included).
    pub line: usize,
    /// Human-readable message.
    pub text: String,
    /// Short rule identifier (e.g. "depth-jump").
    pub rule: &'static str,
    pub severity: IndentSeverity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndentReport {
    pub indent_unit: usize,
    pub issues: Vec<IndentIssue>,
}

impl IndentReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Inspect outline text and list indentation problems.
#[must_use]
pub fn inspect_feature_structure_indent_input(text: &str) -> IndentReport {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| (i + 1, l))
        .collect();

    let measures: Vec<_> = lines.iter().map(|(_, l)| measure_indent(l)).collect();
    let columns: Vec<usize> = measures.iter().map(|m| m.columns).collect();
    let unit = detect_indent_unit(&columns);

    let mut issues = Vec::new();
    // Number of open ancestors, as the parser tracks it.
    let mut open = 0usize;

    for (pos, ((line, _), m)) in lines.iter().zip(&measures).enumerate() {
        let line = *line;
        if pos == 0 && m.columns > 0 {
            issues.push(IndentIssue {
                line,
                text: "The first line is indented; it should be the unindented root.".to_string(),
                rule: "root-indented",
                severity: IndentSeverity::Warning,
            });
        }
        if m.has_tab && m.has_space {
            issues.push(IndentIssue {
                line,
                text: "Tabs and spaces are mixed in the indentation (a tab counts as 4 spaces)."
                    .to_string(),
                rule: "mixed-indent",
                severity: IndentSeverity::Warning,
            });
        }
        if m.columns % unit != 0 {
            issues.push(IndentIssue {
                line,
                text: format!(
                    "Indent of {} is not a multiple of {unit}; it is rounded down to level {}.",
                    m.columns,
                    m.columns / unit
                ),
                rule: "misaligned-indent",
                severity: IndentSeverity::Info,
            });
        }

        let requested = m.columns / unit;
        if pos > 0 && requested > open {
            issues.push(IndentIssue {
                line,
                text: format!(
                    "Indent jumps {} levels at once; the line is attached one level below its parent.",
                    requested + 1 - open
                ),
                rule: "depth-jump",
                severity: IndentSeverity::Warning,
            });
        }
        let depth = requested.min(open);
        open = depth + 1;
    }

    IndentReport {
        indent_unit: unit,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rules(text: &str) -> Vec<(usize, &'static str)> {
        inspect_feature_structure_indent_input(text)
            .issues
            .iter()
            .map(|i| (i.line, i.rule))
            .collect()
    }

    #[test]
    fn well_formed_outline_is_clean() {
        let report = inspect_feature_structure_indent_input("A\n  B\n    C\n  D\n");
        assert_eq!(report.indent_unit, 2);
        assert!(report.is_clean());
    }

    #[test]
    fn reports_indented_first_line() {
        assert_eq!(rules("  A\nB"), vec![(1, "root-indented")]);
    }

    #[test]
    fn reports_mixed_tabs_and_spaces() {
        assert_eq!(
            rules("A\n  B\n\t C"),
            vec![(3, "mixed-indent"), (3, "misaligned-indent")]
        );
    }

    #[test]
    fn reports_misaligned_indent() {
        assert_eq!(rules("A\n  B\n   C"), vec![(3, "misaligned-indent")]);
    }

    #[test]
    fn reports_depth_jump_with_original_line_numbers() {
        assert_eq!(rules("A\n\n  B\n      C"), vec![(4, "depth-jump")]);
    }

    #[test]
    fn blank_text_reports_default_unit() {
        let report = inspect_feature_structure_indent_input("");
        assert_eq!(report.indent_unit, 2);
        assert!(report.is_clean());
    }
}
