//! Final job report printing.

use dispatcher::{JobPhase, JobReport};

/// Print a human-readable summary of a finished job
pub fn print_summary(report: &JobReport) {
    println!("\n=== Dispatch Report ===\n");

    let outcome = match report.phase {
        JobPhase::Completed => "completed",
        JobPhase::Stopped => "stopped early",
        other => other.as_str(),
    };
    println!("Outcome: {}", outcome);
    println!(
        "Window:  rows {}..={}{}",
        report.window.min_index,
        report.window.max_index,
        if report.window.swapped {
            " (bounds were swapped)"
        } else {
            ""
        }
    );

    println!("\nRecipients");
    println!("   ├─ Target:    {}", report.window.total_target());
    println!("   ├─ Attempted: {}", report.attempted);
    println!("   ├─ Sent:      {}", report.sent);
    println!("   ├─ Failed:    {}", report.failed);
    println!("   ├─ Skipped:   {}", report.skipped);
    println!("   └─ Cursor:    {}", report.cursor);

    println!("\nAttempts per credential");
    let last = report.attempts_per_credential.len().saturating_sub(1);
    for (slot, attempts) in report.attempts_per_credential.iter().enumerate() {
        let branch = if slot == last { "└─" } else { "├─" };
        println!("   {} #{}: {}", branch, slot, attempts);
    }
    println!();
}
