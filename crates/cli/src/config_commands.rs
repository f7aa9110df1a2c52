use {anyhow::Result, clap::Subcommand};

use ely_config::{Diagnostic, Severity};

use crate::settings::{Overrides, Settings};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the merged configuration and report errors/warnings.
    Check,
}

pub fn handle_config(action: ConfigAction, overrides: &Overrides) -> Result<()> {
    match action {
        ConfigAction::Check => check(overrides),
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(overrides: &Overrides) -> Result<()> {
    let settings = Settings::resolve(overrides)?;
    let result = settings.validate();

    if let Some(ref path) = result.config_path {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults and environment.\n");
    }

    let mut diagnostics = result.diagnostics.clone();
    if settings.config.parsed_language().is_none() {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            path: "language".into(),
            message: format!(
                "unknown language code '{}', 'en' will be used",
                settings.config.language
            ),
        });
    }

    for d in &diagnostics {
        eprintln!("  {}", render(d));
    }

    let errors = count(&diagnostics, Severity::Error);
    let warnings = count(&diagnostics, Severity::Warning);

    if !diagnostics.is_empty() {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn render(d: &Diagnostic) -> String {
    let (color, label) = match d.severity {
        Severity::Error => (RED, "error"),
        Severity::Warning => (YELLOW, "warning"),
    };
    if d.path.is_empty() {
        format!("{BOLD}{color}{label}{RESET} {}", d.message)
    } else {
        format!("{BOLD}{color}{label}{RESET} {}: {}", d.path, d.message)
    }
}

fn count(diagnostics: &[Diagnostic], severity: Severity) -> usize {
    diagnostics.iter().filter(|d| d.severity == severity).count()
}
