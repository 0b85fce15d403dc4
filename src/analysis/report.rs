//! Analysis Report
//!
//! The collected results for one function. `Display` gives the line-per-result log:
//! ```text
//! Parsed function: x^2 - 4
//! Domain: all real numbers
//! Y-axis intersection: f(0) = -4
//! X-axis intersections (real): -2, 2
//! Range (exact/approx): [-4, +inf)
//! Analysis complete.
//! ```
//! [`AnalysisReport::summary_table`] renders the same results as a two-column table.
use crate::analysis::domain::DomainAnalysis;
use crate::analysis::intersections::Intersections;
use crate::analysis::range::RangeEstimate;
use crate::symbolic::utils::{format_list, format_number};
use std::fmt;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub function: String,
    pub var: String,
    pub domain: DomainAnalysis,
    pub intersections: Intersections,
    pub range: RangeEstimate,
}

#[derive(Debug, PartialEq, Tabled)]
pub struct ReportRow {
    property: &'static str,
    value: String,
}

impl AnalysisReport {
    fn singularities(&self) -> Option<String> {
        if self.domain.exclusions.is_empty() {
            None
        } else {
            Some(format_list(self.domain.exclusions.values()))
        }
    }

    fn y_intercept_text(&self) -> String {
        match &self.intersections.y_intercept {
            Ok(y) => format_number(*y),
            Err(err) => format!("undefined ({})", err),
        }
    }

    fn roots_text(&self) -> String {
        match &self.intersections.roots {
            Ok(roots) if roots.is_empty() => "no real roots detected".to_string(),
            Ok(roots) => format_list(roots),
            Err(failure) => format!("could not be determined ({})", failure),
        }
    }

    pub fn rows(&self) -> Vec<ReportRow> {
        let mut rows = vec![
            ReportRow {
                property: "Function",
                value: self.function.clone(),
            },
            ReportRow {
                property: "Domain",
                value: self.domain.description.clone(),
            },
        ];
        if let Some(singularities) = self.singularities() {
            rows.push(ReportRow {
                property: "Singularities",
                value: singularities,
            });
        }
        rows.push(ReportRow {
            property: "f(0)",
            value: self.y_intercept_text(),
        });
        rows.push(ReportRow {
            property: "Real roots",
            value: self.roots_text(),
        });
        rows.push(ReportRow {
            property: "Range",
            value: self.range.to_string(),
        });
        rows
    }

    pub fn summary_table(&self) -> String {
        let mut table = Table::new(self.rows());
        table.with(Style::modern_rounded());
        table.to_string()
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Parsed function: {}", self.function)?;
        writeln!(f, "{}", self.domain.description)?;
        if let Some(singularities) = self.singularities() {
            writeln!(f, "Detected singularities: {}", singularities)?;
        }
        writeln!(
            f,
            "Y-axis intersection: f(0) = {}",
            self.y_intercept_text()
        )?;
        match &self.intersections.roots {
            Ok(roots) if roots.is_empty() => {
                writeln!(f, "X-axis intersections: no real roots detected.")?
            }
            _ => writeln!(f, "X-axis intersections (real): {}", self.roots_text())?,
        }
        writeln!(f, "Range (exact/approx): {}", self.range)?;
        write!(f, "Analysis complete.")
    }
}
