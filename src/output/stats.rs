//! Statistics reporting.

use console::style;

use crate::download::BatchReport;

/// Print the outcome of a list download.
pub fn print_batch_report(report: &BatchReport) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Batch Statistics:").bold());
    for line in batch_report_lines(report) {
        println!("{}", line);
    }
    println!("{}", style("═".repeat(50)).dim());
}

fn batch_report_lines(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![
        format!("  Listed:    {}", report.listed),
        format!("  Skipped:   {} (already done or repeated)", report.skipped),
        format!("  Attempted: {}", report.attempted()),
        format!("  Succeeded: {}", style(report.succeeded).green()),
    ];

    if report.failed() > 0 {
        lines.push(format!("  Failed:    {}", style(report.failed()).red()));
        for (source, reason) in &report.failures {
            lines.push(format!("    {} {}", style(source).dim(), reason));
        }
    }

    lines
}
