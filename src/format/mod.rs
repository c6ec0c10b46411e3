//! Output formatting for audit reports (table, JSON, markdown, CSV).

use crate::commands::{AuditReport, LinkCheck};
use crate::config::OutputFormat;

/// Formats audit results for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a full audit report.
    pub fn format_report(&self, report: &AuditReport) -> String {
        let checks = &report.checks;
        if checks.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => self.csv_header(),
                _ => "No products in catalog.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_checks(checks),
            OutputFormat::Table => self.table_checks(checks),
            OutputFormat::Markdown => self.markdown_checks(checks),
            OutputFormat::Csv => self.csv_checks(checks),
        }
    }

    // JSON formatting

    fn json_checks(&self, checks: &[LinkCheck]) -> String {
        serde_json::to_string_pretty(checks).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_checks(&self, checks: &[LinkCheck]) -> String {
        let id_width = checks.iter().map(|c| c.id.chars().count()).max().unwrap_or(0).max(2);
        let status_width = 6;
        let ok_width = 5;
        let avail_width = 12;
        let url_width = 50;

        let mut lines = Vec::new();

        lines.push(format!(
            "{:<id_width$}  {:<status_width$}  {:<ok_width$}  {:<avail_width$}  {:<url_width$}  {}",
            "ID", "Status", "OK", "Availability", "Final URL", "Issues"
        ));
        lines.push(format!(
            "{:-<id_width$}  {:-<status_width$}  {:-<ok_width$}  {:-<avail_width$}  {:-<url_width$}  {:-<20}",
            "", "", "", "", "", ""
        ));

        for check in checks {
            let url = truncate(check.final_url.as_deref().unwrap_or("n/a"), url_width);

            lines.push(format!(
                "{:<id_width$}  {:<status_width$}  {:<ok_width$}  {:<avail_width$}  {:<url_width$}  {}",
                check.id,
                status_str(check),
                check.ok,
                check.availability.to_string(),
                url,
                check.issues_summary()
            ));
        }

        lines.push(String::new());
        lines.push(format!(
            "Total: {} products, {} with issues",
            checks.len(),
            checks.iter().filter(|c| c.has_issues()).count()
        ));

        lines.join("\n")
    }

    // Markdown formatting

    fn markdown_checks(&self, checks: &[LinkCheck]) -> String {
        let mut lines = Vec::new();

        lines.push("| ID | Status | OK | Availability | Final URL | Issues |".to_string());
        lines.push("|----|--------|----|--------------|-----------|--------|".to_string());

        for check in checks {
            let url = match &check.final_url {
                Some(u) => format!("[link]({})", u),
                None => "n/a".to_string(),
            };
            let ok = if check.ok { "✓" } else { "✗" };

            lines.push(format!(
                "| {} | {} | {} | {} | {} | {} |",
                check.id,
                status_str(check),
                ok,
                check.availability,
                url,
                check.issues_summary().replace('|', "\\|")
            ));
        }

        lines.push(String::new());
        lines.push(format!("*{} products checked*", checks.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(&self) -> String {
        "id,status,ok,availability,final_url,issues,link".to_string()
    }

    fn csv_checks(&self, checks: &[LinkCheck]) -> String {
        let mut lines = Vec::new();
        lines.push(self.csv_header());

        for check in checks {
            lines.push(format!(
                "{},{},{},{},{},{},{}",
                Self::csv_escape(&check.id),
                check.status.map(|s| s.to_string()).unwrap_or_default(),
                check.ok,
                check.availability,
                Self::csv_escape(check.final_url.as_deref().unwrap_or_default()),
                Self::csv_escape(&check.issues.join("; ")),
                Self::csv_escape(&check.link)
            ));
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

fn status_str(check: &LinkCheck) -> String {
    check.status.map(|s| s.to_string()).unwrap_or_else(|| "ERR".to_string())
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        format!("{}...", s.chars().take(width - 3).collect::<String>())
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amazon::Availability;

    fn make_check(id: &str, status: Option<u16>, issues: &[&str]) -> LinkCheck {
        LinkCheck {
            id: id.to_string(),
            link: format!("https://amzn.to/{}", id),
            status,
            ok: matches!(status, Some(200..=299)),
            availability: if issues.is_empty() { Availability::InStock } else { Availability::Unavailable },
            final_url: status.map(|_| format!("https://www.amazon.com/dp/{}", id)),
            issues: issues.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn make_report() -> AuditReport {
        AuditReport {
            checks: vec![
                make_check("grab_bar", Some(200), &[]),
                make_check("shower_chair", Some(200), &["Product appears to be unavailable on Amazon"]),
                make_check("reacher", None, &["Request error: timed out", "second, issue"]),
            ],
        }
    }

    #[test]
    fn test_table_format() {
        let output = Formatter::new(OutputFormat::Table).format_report(&make_report());

        assert!(output.contains("ID"));
        assert!(output.contains("Availability"));
        assert!(output.contains("grab_bar"));
        assert!(output.contains("in-stock"));
        assert!(output.contains("ERR"));
        assert!(output.contains("n/a"));
        assert!(output.contains("Request error: timed out; second, issue"));
        assert!(output.contains("Total: 3 products, 2 with issues"));
    }

    #[test]
    fn test_table_rows_aligned() {
        let output = Formatter::new(OutputFormat::Table).format_report(&make_report());
        let lines: Vec<_> = output.lines().collect();
        // Status column starts at the same offset on every row
        let offset = lines[0].find("Status").unwrap();
        assert_eq!(&lines[2][offset..offset + 3], "200");
        assert_eq!(&lines[4][offset..offset + 3], "ERR");
    }

    #[test]
    fn test_json_format() {
        let output = Formatter::new(OutputFormat::Json).format_report(&make_report());
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed.as_array().unwrap().len(), 3);
        assert_eq!(parsed[0]["availability"], "in-stock");
        assert_eq!(parsed[2]["status"], serde_json::Value::Null);
    }

    #[test]
    fn test_markdown_format() {
        let output = Formatter::new(OutputFormat::Markdown).format_report(&make_report());
        assert!(output.contains("| ID | Status |"));
        assert!(output.contains("[link](https://www.amazon.com/dp/grab_bar)"));
        assert!(output.contains("*3 products checked*"));
    }

    #[test]
    fn test_csv_format_escapes() {
        let output = Formatter::new(OutputFormat::Csv).format_report(&make_report());
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines[0], "id,status,ok,availability,final_url,issues,link");
        assert!(lines[3].starts_with("reacher,,false,unavailable,,"));
        assert!(lines[3].contains("\"Request error: timed out; second, issue\""));
    }

    #[test]
    fn test_empty_report() {
        let empty = AuditReport { checks: Vec::new() };
        assert_eq!(Formatter::new(OutputFormat::Json).format_report(&empty), "[]");
        assert_eq!(Formatter::new(OutputFormat::Table).format_report(&empty), "No products in catalog.");
        assert!(Formatter::new(OutputFormat::Csv).format_report(&empty).starts_with("id,"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 10), "abcdefg...");
    }
}
