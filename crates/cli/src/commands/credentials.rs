//! `credentials` command implementation.

use anyhow::{Context, Result};
use contracts::DeliveryCredential;
use credential_store::CredentialStore;
use serde::Serialize;
use tracing::info;

use crate::cli::{CredentialsAction, CredentialsArgs};

/// Credential listing entry (secret redacted)
#[derive(Serialize)]
struct CredentialEntry<'a> {
    sender_email: &'a str,
    smtp_server: &'a str,
    smtp_port: u16,
    sender_name: Option<&'a str>,
    has_password: bool,
}

impl<'a> From<&'a DeliveryCredential> for CredentialEntry<'a> {
    fn from(credential: &'a DeliveryCredential) -> Self {
        Self {
            sender_email: &credential.sender_email,
            smtp_server: &credential.smtp_server,
            smtp_port: credential.smtp_port,
            sender_name: credential.sender_name.as_deref(),
            has_password: credential.secret().is_some(),
        }
    }
}

/// Execute the `credentials` command
pub fn run_credentials(args: &CredentialsArgs) -> Result<()> {
    let store = CredentialStore::open(&args.credentials).with_context(|| {
        format!(
            "Unsupported credential document {}",
            args.credentials.display()
        )
    })?;

    match &args.action {
        CredentialsAction::Add {
            email,
            server,
            port,
            name,
            password,
        } => {
            let mut credential = DeliveryCredential::new(email.trim(), server.trim(), *port);
            if let Some(name) = name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
                credential = credential.with_name(name);
            }
            if let Some(password) = password.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
                credential = credential.with_password(password);
            }

            let count = store
                .append(credential)
                .with_context(|| format!("Failed to update {}", store.path().display()))?;
            info!(path = %store.path().display(), count, "Credential saved");
            println!("✓ Saved credential for {} ({} configured)", email.trim(), count);
        }
        CredentialsAction::List { json } => {
            let credentials = store
                .load()
                .with_context(|| format!("Failed to load {}", store.path().display()))?;
            let entries: Vec<CredentialEntry<'_>> =
                credentials.iter().map(CredentialEntry::from).collect();

            if *json {
                let json = serde_json::to_string_pretty(&entries)
                    .context("Failed to serialize credentials")?;
                println!("{}", json);
            } else {
                print_entries(&entries);
            }
        }
    }
    Ok(())
}

fn print_entries(entries: &[CredentialEntry<'_>]) {
    if entries.is_empty() {
        println!("No credentials configured");
        return;
    }
    println!("\nCredentials ({}):", entries.len());
    for (slot, entry) in entries.iter().enumerate() {
        println!(
            "  #{} {}{} via {}:{} ({})",
            slot,
            entry.sender_email,
            entry
                .sender_name
                .map(|name| format!(" \"{}\"", name))
                .unwrap_or_default(),
            entry.smtp_server,
            entry.smtp_port,
            if entry.has_password {
                "authenticated"
            } else {
                "unauthenticated"
            }
        );
    }
}
