//! Seeder template population.
//!
//! A template is plain text with `{{placeholder}}` tokens. Population is a
//! set of literal replacements; replacement text is never re-scanned for
//! further placeholders.

use crate::error::{Result, SeedError};
use crate::printer::{chunk_rows, export_string, print_chunk, PrintOptions};
use crate::source::Row;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::Path;

/// The template bundled with the binary.
pub const DEFAULT_STUB: &str = include_str!("stubs/seed.stub");

pub const DEFAULT_INSERT_COMMAND: &str = "%s->insert(%s)";

pub const PLACEHOLDER_CLASS: &str = "{{class}}";
pub const PLACEHOLDER_TABLE: &str = "{{table}}";
pub const PLACEHOLDER_TABLE_ACCESSOR: &str = "{{table_accessor}}";
pub const PLACEHOLDER_INSERTS: &str = "{{insert_statements}}";
pub const PLACEHOLDER_PRERUN: &str = "{{prerun_event}}";
pub const PLACEHOLDER_POSTRUN: &str = "{{postrun_event}}";

static HOOK_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\\?[A-Za-z_][A-Za-z0-9_]*(?:\\[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("hook name pattern is valid")
});

/// PHP expression addressing a table, optionally through a named connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableAccessor {
    pub table: String,
    pub connection: Option<String>,
}

impl TableAccessor {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            connection: None,
        }
    }

    pub fn on_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }
}

impl fmt::Display for TableAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.connection {
            Some(ref conn) => write!(
                f,
                "\\DB::connection({})->table({})",
                export_string(conn),
                export_string(&self.table)
            ),
            None => write!(f, "\\DB::table({})", export_string(&self.table)),
        }
    }
}

/// Layout settings shared by every generated snippet.
#[derive(Debug, Clone)]
pub struct TemplateStyle {
    pub indent: String,
    pub newline: String,
    /// Format with two `%s`: table accessor, then the array literal
    pub insert_command: String,
    pub indexed: bool,
}

impl Default for TemplateStyle {
    fn default() -> Self {
        Self {
            indent: crate::printer::DEFAULT_INDENT.to_string(),
            newline: "\n".to_string(),
            insert_command: DEFAULT_INSERT_COMMAND.to_string(),
            indexed: true,
        }
    }
}

impl TemplateStyle {
    fn indent_n(&self, n: usize) -> String {
        self.indent.repeat(n)
    }

    fn print_options(&self) -> PrintOptions {
        PrintOptions {
            indent: self.indent.clone(),
            indexed: self.indexed,
            ..Default::default()
        }
    }

    /// Render one insert statement from the configured command format.
    pub fn insert_statement(&self, accessor: &TableAccessor, literal: &str) -> Result<String> {
        let mut parts = self.insert_command.splitn(3, "%s");
        match (parts.next(), parts.next(), parts.next()) {
            (Some(head), Some(middle), Some(tail)) => Ok(format!(
                "{}{}{}{}{};",
                head, accessor, middle, literal, tail
            )),
            _ => Err(SeedError::InvalidOption(format!(
                "insert command must contain two %s placeholders: {}",
                self.insert_command
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Prerun,
    Postrun,
}

impl HookKind {
    fn failure_message(&self) -> &'static str {
        match self {
            HookKind::Prerun => "Prerun event failed, seed wasn't executed!",
            HookKind::Postrun => "Seed was executed but the postrun event failed!",
        }
    }
}

/// Check that a hook names a PHP class.
pub fn validate_hook(name: &str) -> Result<()> {
    if HOOK_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(SeedError::InvalidHook(name.to_string()))
    }
}

/// Guard snippet that fires the event and aborts the seeder when a listener
/// returns `false`.
pub fn hook_snippet(kind: HookKind, event: &str, style: &TemplateStyle) -> Result<String> {
    validate_hook(event)?;
    let nl = &style.newline;
    Ok(format!(
        "$response = Event::until(new {event}());{nl}{i2}if ($response === false) {{{nl}{i3}throw new Exception(\"{msg}\");{nl}{i2}}}",
        event = event,
        nl = nl,
        i2 = style.indent_n(2),
        i3 = style.indent_n(3),
        msg = kind.failure_message(),
    ))
}

/// A seeder template loaded from disk or the bundled default.
#[derive(Debug, Clone)]
pub struct SeedTemplate {
    text: String,
}

impl Default for SeedTemplate {
    fn default() -> Self {
        Self::from_string(DEFAULT_STUB)
    }
}

impl SeedTemplate {
    pub fn from_string(text: &str) -> Self {
        Self {
            text: text.replace("\r\n", "\n"),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| SeedError::TemplateRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_string(&text))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace every placeholder. Absent hooks become empty strings.
    pub fn populate(&self, seed: &GeneratedSeed, style: &TemplateStyle) -> Result<String> {
        let inserts = seed.insert_statements(style)?;
        let prerun = match seed.prerun {
            Some(ref event) => hook_snippet(HookKind::Prerun, event, style)?,
            None => String::new(),
        };
        let postrun = match seed.postrun {
            Some(ref event) => hook_snippet(HookKind::Postrun, event, style)?,
            None => String::new(),
        };

        let replacements = [
            (PLACEHOLDER_CLASS, seed.class.clone()),
            (PLACEHOLDER_TABLE_ACCESSOR, seed.accessor.to_string()),
            (PLACEHOLDER_TABLE, seed.accessor.table.clone()),
            (PLACEHOLDER_PRERUN, prerun),
            (PLACEHOLDER_POSTRUN, postrun),
            (PLACEHOLDER_INSERTS, inserts),
        ];
        Ok(replace_placeholders(&self.text, &replacements))
    }
}

/// Single-pass literal replacement so substituted text is never re-scanned.
fn replace_placeholders(text: &str, replacements: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let candidate = &rest[open..];
        match replacements
            .iter()
            .find(|(token, _)| candidate.starts_with(token))
        {
            Some((token, value)) => {
                out.push_str(value);
                rest = &candidate[token.len()..];
            }
            None => {
                out.push_str("{{");
                rest = &candidate[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Everything needed to render one seeder class.
#[derive(Debug, Clone)]
pub struct GeneratedSeed {
    pub class: String,
    pub accessor: TableAccessor,
    pub chunks: Vec<Vec<Row>>,
    pub prerun: Option<String>,
    pub postrun: Option<String>,
}

impl GeneratedSeed {
    pub fn new(class: impl Into<String>, accessor: TableAccessor, rows: &[Row], chunk_size: usize) -> Self {
        Self {
            class: class.into(),
            accessor,
            chunks: chunk_rows(rows, chunk_size).map(|c| c.to_vec()).collect(),
            prerun: None,
            postrun: None,
        }
    }

    pub fn with_hooks(mut self, prerun: Option<String>, postrun: Option<String>) -> Self {
        self.prerun = prerun;
        self.postrun = postrun;
        self
    }

    pub fn row_count(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }

    /// One insert per chunk, each on its own line two levels deep.
    pub fn insert_statements(&self, style: &TemplateStyle) -> Result<String> {
        let options = style.print_options();
        let mut inserts = String::new();
        for chunk in &self.chunks {
            inserts.push_str(&style.newline);
            inserts.push_str(&style.indent_n(2));
            let literal = print_chunk(chunk, &options);
            inserts.push_str(&style.insert_statement(&self.accessor, &literal)?);
        }
        Ok(inserts)
    }
}
