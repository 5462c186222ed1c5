//! Console output utilities.

use console::style;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print remediation hints under an error.
pub fn print_hints(hints: &[&str]) {
    for hint in hints {
        eprintln!("  {} {}", style("hint:").dim(), hint);
    }
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     share-dl                                          ║
║     Download videos from share pages                  ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print run summary before work starts.
pub fn print_run_summary(mode: &str, source: &str, output: &str, tools: &[String]) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Mode: {}", mode);
    println!("  Source: {}", source);
    println!("  Output: {}", output);
    println!("  Tools: {}", tools.join(", "));
    println!();
}
