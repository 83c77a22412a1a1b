//! Output formatting.

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use serde::Serialize;
use tc_helper::User;

/// Output format options.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table format
    Table,
    /// JSON format
    Json,
    /// Plain text format
    #[default]
    Plain,
}

/// Trait for plain text output.
pub trait PlainPrint {
    /// Print as plain text with formatting.
    fn plain_print(&self);
}

/// Trait for table row generation.
pub trait TableRow {
    /// Get table headers.
    fn headers() -> Vec<&'static str>;
    /// Get row data as strings.
    fn row(&self) -> Vec<String>;
}

/// Print items in plain text format.
pub fn print_plain<T: PlainPrint>(items: &[T]) {
    if items.is_empty() {
        println!("No results");
        return;
    }
    for item in items {
        item.plain_print();
    }
}

/// Print items in the requested format.
pub fn print_table<T: TableRow + Serialize + PlainPrint>(items: Vec<T>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&items).unwrap_or_default());
        }
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results");
                return;
            }
            let mut table = Table::new();
            table.load_preset(UTF8_FULL_CONDENSED);
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(T::headers());
            for item in &items {
                table.add_row(item.row());
            }
            println!("{table}");
        }
        OutputFormat::Plain => {
            print_plain(&items);
        }
    }
}

/// Row for user display.
#[derive(Debug, Serialize)]
pub struct UserRow {
    pub id: String,
    pub handle: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.user_id.to_string(),
            handle: u.handle.clone().unwrap_or_default(),
            name: u.display_name(),
            email: u.email.clone().unwrap_or_default(),
        }
    }
}

impl TableRow for UserRow {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "Handle", "Name", "Email"]
    }
    fn row(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.handle.clone(),
            self.name.clone(),
            self.email.clone(),
        ]
    }
}

impl PlainPrint for UserRow {
    fn plain_print(&self) {
        println!(
            "{} {}",
            format!("[UID: {}]", self.id).cyan(),
            self.handle.bold()
        );
        println!("   {} | {}", self.name, self.email.dimmed());
    }
}
