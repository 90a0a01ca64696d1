//! `validate` command implementation.

use anyhow::{Context, Result};
use dispatcher::DispatchWindow;
use recipients::RecipientSource;
use serde::Serialize;
use tracing::info;

use super::send::load_inputs;
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    sheet_path: String,
    credentials_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<InputSummary>,
}

#[derive(Serialize)]
struct InputSummary {
    rows: usize,
    deliverable_rows: usize,
    credentials: usize,
    authenticated_credentials: usize,
    window: DispatchWindow,
    total_target: u64,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(
        sheet = %args.sheet.display(),
        credentials = %args.credentials.display(),
        "Validating inputs"
    );

    let result = validate_inputs(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Input validation failed")
    }
}

fn validate_inputs(args: &ValidateArgs) -> ValidationResult {
    let sheet_path = args.sheet.display().to_string();
    let credentials_path = args.credentials.display().to_string();
    let invalid = |error: String| ValidationResult {
        valid: false,
        sheet_path: sheet_path.clone(),
        credentials_path: credentials_path.clone(),
        error: Some(error),
        warnings: None,
        summary: None,
    };

    let (credentials, sheet) = match load_inputs(&args.credentials, &args.sheet) {
        Ok(inputs) => inputs,
        Err(e) => return invalid(e.to_string()),
    };
    if credentials.is_empty() {
        return invalid("No delivery credentials configured".to_string());
    }
    if sheet.is_empty() {
        return invalid("Recipient sheet contains no rows".to_string());
    }

    let window = DispatchWindow::normalize(args.min, args.max, sheet.len());
    let mut warnings = Vec::new();
    if window.swapped {
        warnings.push(format!(
            "--min {} exceeds --max {}; the window will be swapped",
            args.min, args.max
        ));
    }
    if args.max > sheet.len() {
        warnings.push(format!(
            "--max {} exceeds the {} rows in the sheet",
            args.max,
            sheet.len()
        ));
    }
    let blank = (window.start_cursor()..window.end_cursor())
        .filter(|&i| sheet.get(i).and_then(|r| r.address()).is_none())
        .count();
    if blank > 0 {
        warnings.push(format!("{} rows in the window have no email and will be skipped", blank));
    }

    ValidationResult {
        valid: true,
        sheet_path,
        credentials_path,
        error: None,
        warnings: (!warnings.is_empty()).then_some(warnings),
        summary: Some(InputSummary {
            rows: sheet.len(),
            deliverable_rows: sheet.deliverable_count(),
            credentials: credentials.len(),
            authenticated_credentials: credentials
                .iter()
                .filter(|c| c.secret().is_some())
                .count(),
            window,
            total_target: window.total_target(),
        }),
    }
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Inputs are valid: {}", result.sheet_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Rows: {}", summary.rows);
            println!("  Deliverable rows: {}", summary.deliverable_rows);
            println!(
                "  Credentials: {} ({} authenticated)",
                summary.credentials, summary.authenticated_credentials
            );
            println!(
                "  Window: rows {}..={} ({} recipients)",
                summary.window.min_index, summary.window.max_index, summary.total_target
            );
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Inputs are invalid: {}", result.sheet_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(dir: &TempDir, min: usize, max: usize) -> ValidateArgs {
        ValidateArgs {
            sheet: dir.path().join("r.csv"),
            credentials: dir.path().join("configurations.json"),
            min,
            max,
            json: true,
        }
    }

    fn write_inputs(dir: &TempDir) -> PathBuf {
        std::fs::write(
            dir.path().join("configurations.json"),
            r#"[{"sender_email": "a@example.com", "smtp_server": "mx", "smtp_port": 587, "sender_password": "pw"}]"#,
        )
        .unwrap();
        let sheet = dir.path().join("r.csv");
        std::fs::write(&sheet, "Email,First_Name\na@example.com,A\n,B\nc@example.com,C\n").unwrap();
        sheet
    }

    #[test]
    fn test_valid_inputs_with_warnings() {
        let dir = TempDir::new().unwrap();
        write_inputs(&dir);

        let result = validate_inputs(&args(&dir, 3, 1));
        assert!(result.valid);
        let summary = result.summary.unwrap();
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.deliverable_rows, 2);
        assert_eq!(summary.authenticated_credentials, 1);
        assert_eq!((summary.window.min_index, summary.window.max_index), (1, 3));
        assert_eq!(summary.total_target, 3);

        let warnings = result.warnings.unwrap();
        assert!(warnings.iter().any(|w| w.contains("swapped")));
        assert!(warnings.iter().any(|w| w.contains("1 rows in the window")));
    }

    #[test]
    fn test_missing_credentials_is_invalid() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("r.csv"), "email\na@example.com\n").unwrap();

        let result = validate_inputs(&args(&dir, 1, 1));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("No delivery credentials"));
    }

    #[test]
    fn test_sheet_without_email_column_is_invalid() {
        let dir = TempDir::new().unwrap();
        write_inputs(&dir);
        std::fs::write(dir.path().join("r.csv"), "name\nAnn\n").unwrap();

        let result = validate_inputs(&args(&dir, 1, 1));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("email"));
    }
}
