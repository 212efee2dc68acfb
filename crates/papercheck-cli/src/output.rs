use std::io::Write;
use std::time::Duration;

use owo_colors::OwoColorize;
use papercheck_core::ValidationResult;
use papercheck_scoring::ScoreReport;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the verdict for one PDF.
pub fn print_validation(
    w: &mut dyn Write,
    file_name: &str,
    result: &ValidationResult,
    color: ColorMode,
) -> std::io::Result<()> {
    match result.reason() {
        None => {
            if color.enabled() {
                writeln!(w, "{} {}", "VALID".green().bold(), file_name)
            } else {
                writeln!(w, "VALID {}", file_name)
            }
        }
        Some(reason) => {
            if color.enabled() {
                writeln!(w, "{} {}", "INVALID".red().bold(), file_name)?;
                writeln!(w, "  {}", reason.dimmed())
            } else {
                writeln!(w, "INVALID {}", file_name)?;
                writeln!(w, "  {}", reason)
            }
        }
    }
}

/// Print a step header while scoring.
pub fn print_step(w: &mut dyn Write, message: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", message.cyan())
    } else {
        writeln!(w, "{}", message)
    }
}

/// Print the final scores and how long they took.
pub fn print_report(
    w: &mut dyn Write,
    report: &ScoreReport,
    elapsed: Duration,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}", report.bold())?;
    } else {
        writeln!(w, "{}", report)?;
    }
    writeln!(w, "Total time taken: {:.2} seconds", elapsed.as_secs_f64())
}
