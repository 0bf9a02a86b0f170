//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::application::services::LoadReport;
use crate::domain::Course;

/// Horizontal rule framing listings and course details.
pub const RULE: &str = "----------------------------------------------------";

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print plain output (no color, for data lines)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// `NUMBER: NAME`, followed by a prerequisite line only when there are prerequisites.
pub fn course_detail(course: &Course) -> String {
    let mut text = course.to_string();
    if course.has_prerequisites() {
        text.push_str(&format!(
            "\nPrerequisites for {}: {}",
            course.course_name,
            course.prerequisites.join(", ")
        ));
    }
    text
}

/// One-line summary of a load.
pub fn load_summary(report: &LoadReport) -> String {
    let mut summary = format!(
        "Loaded {} course(s) from {}",
        report.inserted,
        report.path.display()
    );
    if report.replaced > 0 {
        summary.push_str(&format!(", {} replaced", report.replaced));
    }
    if report.rejected > 0 {
        summary.push_str(&format!(", {} duplicate(s) rejected", report.rejected));
    }
    if !report.skipped_lines.is_empty() {
        let lines: Vec<String> = report.skipped_lines.iter().map(usize::to_string).collect();
        summary.push_str(&format!(", skipped line(s) {}", lines.join(", ")));
    }
    summary
}
