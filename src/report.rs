//! Console report of the audit table.

use crate::db::BackupRecord;

/// Prints every audit row, oldest first. Read-only.
pub fn display_backups(records: &[BackupRecord]) {
    println!();
    println!("Backup history:");
    println!("{}", "-".repeat(50));

    if records.is_empty() {
        println!("(no backups recorded yet)");
        return;
    }

    for record in records {
        println!("ID: {:>4}  backup date: {}", record.id, record.backup_date);
    }
}
