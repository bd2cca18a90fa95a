//! Seeder class and file naming.

use std::path::{Path, PathBuf};

pub const SEEDER_EXTENSION: &str = "php";

/// Uppercase the first character, leaving the rest untouched.
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Build the seeder class name for a table.
///
/// `user_accounts` becomes `UserAccountsTableSeeder`; prefix and suffix wrap
/// the `Table` part: `AcmeUserAccountsTableV2Seeder`.
pub fn class_name(table: &str, prefix: Option<&str>, suffix: Option<&str>) -> String {
    let base: String = table.split('_').map(ucfirst).collect();
    format!(
        "{}{}Table{}Seeder",
        prefix.unwrap_or(""),
        ucfirst(&base),
        suffix.unwrap_or("")
    )
}

/// Path of the generated seeder file for `class` inside `dir`.
pub fn seeder_path(dir: &Path, class: &str) -> PathBuf {
    dir.join(format!("{}.{}", class, SEEDER_EXTENSION))
}
