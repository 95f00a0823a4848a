use crate::client::compile::{CompilationJob, FullOutcome, PreviewOutcome};
use crate::CheckResult;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonError {
    file: String,
    line: usize,
    column: usize,
    word: String,
    suggestions: Vec<String>,
    context: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonOutput {
    files_checked: usize,
    total_errors: usize,
    errors: Vec<JsonError>,
}

pub fn print_errors(
    file_path: &Path,
    result: &CheckResult,
    colored_output: bool,
    format: &OutputFormat,
) {
    match format {
        OutputFormat::Text => print_text_errors(file_path, result, colored_output),
        OutputFormat::Json => print_json_errors(file_path, result),
    }
}

fn print_text_errors(file_path: &Path, result: &CheckResult, colored_output: bool) {
    if result.errors.is_empty() {
        return;
    }

    let file_name = file_path.display().to_string();

    if colored_output {
        println!("\n{}", file_name.bold().underline());
    } else {
        println!("\n{}", file_name);
    }

    for error in &result.errors {
        let line_info = format!("{}:{}", error.line, error.column);

        if colored_output {
            println!(
                "  {} {} {}",
                line_info.blue().bold(),
                error.word.red().bold(),
                format_context(&error.context, &error.word, colored_output)
            );

            if !error.suggestions.is_empty() {
                let suggestions = error
                    .suggestions
                    .iter()
                    .take(5)
                    .map(|s| s.green().to_string())
                    .collect::<Vec<_>>()
                    .join(&", ".dimmed().to_string());
                println!("    {} {}", "→".dimmed(), suggestions);
            }
        } else {
            println!("  {} {} {}", line_info, error.word, &error.context);

            if !error.suggestions.is_empty() {
                let suggestions = error
                    .suggestions
                    .iter()
                    .take(5)
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("    → {}", suggestions);
            }
        }
    }
}

fn print_json_errors(file_path: &Path, result: &CheckResult) {
    let json_errors: Vec<JsonError> = result
        .errors
        .iter()
        .map(|e| JsonError {
            file: file_path.display().to_string(),
            line: e.line,
            column: e.column,
            word: e.word.clone(),
            suggestions: e.suggestions.clone(),
            context: e.context.clone(),
        })
        .collect();

    let output = JsonOutput {
        files_checked: 1,
        total_errors: result.error_count,
        errors: json_errors,
    };

    println!("{}", serde_json::to_string_pretty(&output).unwrap());
}

fn format_context(context: &str, word: &str, colored: bool) -> String {
    if colored {
        context.replace(word, &word.red().bold().to_string())
    } else {
        context.to_string()
    }
}

pub fn print_check_summary(total_errors: usize, files: &[impl AsRef<Path>], colored: bool) {
    println!();
    if total_errors == 0 {
        if colored {
            println!("{}", "✓ No spelling errors found!".green().bold());
        } else {
            println!("✓ No spelling errors found!");
        }
    } else {
        let error_word = if total_errors == 1 { "error" } else { "errors" };
        if colored {
            println!(
                "{} {} {} found in {} {}",
                "✗".red().bold(),
                total_errors.to_string().red().bold(),
                error_word,
                files.len(),
                if files.len() == 1 { "file" } else { "files" }
            );
        } else {
            println!(
                "✗ {} {} found in {} {}",
                total_errors,
                error_word,
                files.len(),
                if files.len() == 1 { "file" } else { "files" }
            );
        }
    }
}

pub fn print_fix_summary(total_fixed: usize, files: &[impl AsRef<Path>], colored: bool) {
    println!();
    if total_fixed == 0 {
        if colored {
            println!("{}", "No corrections needed!".green().bold());
        } else {
            println!("No corrections needed!");
        }
    } else {
        let fix_word = if total_fixed == 1 {
            "correction"
        } else {
            "corrections"
        };
        if colored {
            println!(
                "{} {} {} applied to {} {}",
                "✓".green().bold(),
                total_fixed.to_string().green().bold(),
                fix_word,
                files.len(),
                if files.len() == 1 { "file" } else { "files" }
            );
        } else {
            println!(
                "✓ {} {} applied to {} {}",
                total_fixed,
                fix_word,
                files.len(),
                if files.len() == 1 { "file" } else { "files" }
            );
        }
    }
}

/// Progress bar driven by compilation job status updates.
pub fn compile_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/dim}] {pos}% {msg}")
            .unwrap(),
    );
    pb
}

pub fn update_compile_progress(pb: &ProgressBar, job: &CompilationJob) {
    pb.set_position(job.progress as u64);
    pb.set_message(format!("{:?}", job.status).to_lowercase());
}

pub fn print_preview_outcome(outcome: &PreviewOutcome, colored: bool) {
    if outcome.success {
        let pdf = outcome.pdf.as_deref().unwrap_or("(no pdf path)");
        if colored {
            println!("{} Preview built: {}", "✓".green().bold(), pdf.cyan());
        } else {
            println!("✓ Preview built: {}", pdf);
        }
    } else {
        if colored {
            println!("{}", "✗ Preview compilation failed".red().bold());
        } else {
            println!("✗ Preview compilation failed");
        }
        // Tail of the log is where LaTeX puts the useful part.
        for line in outcome.log.lines().rev().take(15).collect::<Vec<_>>().iter().rev() {
            println!("  {}", line);
        }
    }
}

pub fn print_full_outcome(outcome: &FullOutcome, colored: bool) {
    if colored {
        println!("{} Build complete: {}", "✓".green().bold(), outcome.pdf.cyan());
    } else {
        println!("✓ Build complete: {}", outcome.pdf);
    }
}

pub fn print_busy_notice(colored: bool) {
    if colored {
        println!("{}", "A compilation is already running; request ignored.".yellow());
    } else {
        println!("A compilation is already running; request ignored.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert!(matches!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text)));
        assert!(matches!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json)));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_format_context_plain() {
        assert_eq!(format_context("the qick fox", "qick", false), "the qick fox");
    }
}
