use owo_colors::OwoColorize;

use contextprompt_core::patterns::PATTERN_TABLE_VERSION;
use contextprompt_core::{ExtractionOutcome, PageContext};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "ContextPrompt".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Capture prompt-ready context from rendered pages\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a labelled detail line under a step
pub fn print_detail(label: &str, value: &str) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.bright_white());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print timing information with color coding
pub fn print_timing(label: &str, duration: std::time::Duration) {
    let ms = duration.as_secs_f64() * 1000.0;
    let label = format!("{}:", label);

    if ms < 50.0 {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "fast".dimmed());
    } else if ms < 100.0 {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "moderate".bright_yellow());
    } else {
        eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "slow".bright_red());
    }
}

/// Print which extraction stage answered
pub fn print_extraction_details(outcome: &ExtractionOutcome) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Extraction Details".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    print_detail("Stage", outcome.stage.as_str());
    print_detail("Characters", &outcome.content.chars().count().to_string());
    print_detail("Truncated", if outcome.truncated { "yes" } else { "no" });
    print_detail("Keyword table", &format!("v{}", PATTERN_TABLE_VERSION));
    eprintln!();
}

/// Print a summary of a captured page context
pub fn print_context_details(context: &PageContext) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Capture Details".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    print_detail("Title", &context.title);
    print_detail("Main content", &format!("{} chars", context.main_content.chars().count()));
    if let Some(platform) = &context.platform_name {
        print_detail("Platform", platform);
        print_detail("Chat content", &format!("{} chars", context.chat_content.chars().count()));
        print_detail("Private link", if context.is_private_link { "yes" } else { "no" });
    }
    eprintln!();
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
