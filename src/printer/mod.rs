//! PHP array-literal printer for seeder inserts.
//!
//! Rows are first exported in `var_export` layout and then re-indented so the
//! literal lines up inside the seeder's `run()` method:
//!
//! ```text
//! \DB::table('users')->insert(array (
//!             0 =>
//!             array (
//!                 'id' => 1,
//!             ),
//!         ));
//! ```

mod indent;
mod php;

pub use indent::{reindent, scan_line, step, ScanState};
pub use php::{export_float, export_string, export_value};

use crate::source::Row;

/// Nesting level of the insert literal inside the generated class.
pub const DEFAULT_DEPTH: usize = 3;
pub const DEFAULT_INDENT: &str = "    ";
pub const DEFAULT_CHUNK_SIZE: usize = 500;

#[derive(Debug, Clone)]
pub struct PrintOptions {
    /// One indentation step (spaces, a tab, ...)
    pub indent: String,
    /// Emit `0 =>` style index keys
    pub indexed: bool,
    pub depth: usize,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT.to_string(),
            indexed: true,
            depth: DEFAULT_DEPTH,
        }
    }
}

/// Split rows into insert-sized chunks. A size of zero is treated as one.
pub fn chunk_rows(rows: &[Row], size: usize) -> std::slice::Chunks<'_, Row> {
    rows.chunks(size.max(1))
}

/// Export rows as a raw `var_export` style literal.
///
/// In non-indexed mode the numeric keys are left out entirely, which yields
/// a plain list of associative arrays.
pub fn export_rows(rows: &[Row], indexed: bool) -> String {
    let mut out = String::from("array (\n");
    for (i, row) in rows.iter().enumerate() {
        if indexed {
            out.push_str(&format!("  {} => \n", i));
        }
        out.push_str("  array (\n");
        for (column, value) in row.iter() {
            out.push_str("    ");
            out.push_str(&export_string(column));
            out.push_str(" => ");
            out.push_str(&export_value(value));
            out.push_str(",\n");
        }
        out.push_str("  ),\n");
    }
    out.push(')');
    out
}

/// Export and re-indent one chunk.
pub fn print_chunk(rows: &[Row], options: &PrintOptions) -> String {
    reindent(
        &export_rows(rows, options.indexed),
        &options.indent,
        options.depth,
    )
}
