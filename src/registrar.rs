//! Registration of generated seeders in the aggregator (`DatabaseSeeder.php`).
//!
//! Calls are inserted into a section delimited by two marker comments:
//!
//! ```php
//! public function run()
//! {
//!     #seeder_start
//!     $this->call(UsersTableSeeder::class);
//!     #seeder_end
//! }
//! ```
//!
//! Markers are located by plain substring search and the file is spliced at
//! those byte offsets. Without a valid section the call is appended to the
//! body of `run()`.

use crate::error::{Result, SeedError};
use crate::storage::FileStore;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_START_MARKER: &str = "#seeder_start";
pub const DEFAULT_END_MARKER: &str = "#seeder_end";

const RUN_METHOD_TOKEN: &str = "run()";

#[derive(Debug, Clone)]
pub struct Registrar {
    pub start_marker: String,
    pub end_marker: String,
    pub indent: String,
    pub newline: String,
}

impl Default for Registrar {
    fn default() -> Self {
        Self {
            start_marker: DEFAULT_START_MARKER.to_string(),
            end_marker: DEFAULT_END_MARKER.to_string(),
            indent: crate::printer::DEFAULT_INDENT.to_string(),
            newline: "\n".to_string(),
        }
    }
}

/// Outcome of a registration on in-memory content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The class was already registered; content is unchanged
    AlreadyPresent,
    /// Inserted between the markers
    InSection(String),
    /// Inserted at the end of `run()`
    InRunMethod(String),
}

impl Registration {
    pub fn content(&self) -> Option<&str> {
        match self {
            Registration::AlreadyPresent => None,
            Registration::InSection(c) | Registration::InRunMethod(c) => Some(c),
        }
    }
}

pub fn call_expression(class: &str) -> String {
    format!("$this->call({}::class)", class)
}

impl Registrar {
    /// Byte range of the text between the markers, if both are present in order.
    fn section(&self, content: &str) -> Option<(usize, usize)> {
        let start = content.find(&self.start_marker)?;
        let after_start = start + self.start_marker.len();
        let end = content[after_start..].find(&self.end_marker)? + after_start;
        Some((after_start, end))
    }

    /// Add a call for `class`, returning the new content.
    ///
    /// Returns `None` when neither a marker section nor a `run()` body exists.
    pub fn register(&self, content: &str, class: &str) -> Option<Registration> {
        let call = call_expression(class);
        if content.contains(&call) {
            return Some(Registration::AlreadyPresent);
        }

        if let Some((_, end)) = self.section(content) {
            let mut out = String::with_capacity(content.len() + call.len() + 16);
            out.push_str(&content[..end]);
            // `#` comments run to end of line, so the call needs a line of its own
            let line_start = content[..end].rfind('\n').map_or(0, |i| i + 1);
            if !content[line_start..end].trim().is_empty() {
                out.push_str(&self.newline);
                out.push_str(&self.indent);
                out.push_str(&self.indent);
            }
            out.push_str(&call);
            out.push(';');
            out.push_str(&self.newline);
            out.push_str(&self.indent);
            out.push_str(&self.indent);
            out.push_str(&content[end..]);
            return Some(Registration::InSection(out));
        }

        let close = run_body_close(content)?;
        let head = content[..close].trim_end();
        let mut out = String::with_capacity(content.len() + call.len() + 16);
        out.push_str(head);
        out.push_str(&self.newline);
        out.push_str(&self.indent);
        out.push_str(&self.indent);
        out.push_str(&call);
        out.push(';');
        out.push_str(&self.newline);
        out.push_str(&self.indent);
        out.push_str(&content[close..]);
        Some(Registration::InRunMethod(out))
    }

    /// Empty the marker section. Content without a section is returned as-is.
    pub fn clean(&self, content: &str) -> String {
        match self.section(content) {
            Some((begin, end)) => {
                let mut out = String::with_capacity(content.len());
                out.push_str(&content[..begin]);
                out.push_str(&self.newline);
                out.push_str(&self.indent);
                out.push_str(&self.indent);
                out.push_str(&content[end..]);
                out
            }
            None => content.to_string(),
        }
    }

    /// Register `class` in the aggregator at `path`.
    ///
    /// Returns whether the file was modified.
    pub fn register_file<F: FileStore>(&self, store: &F, path: &Path, class: &str) -> Result<bool> {
        let content = store.read(path)?;
        let registration = self
            .register(&content, class)
            .ok_or_else(|| SeedError::AggregatorSectionNotFound(path.to_path_buf()))?;

        match registration.content() {
            Some(updated) => {
                debug!(class, aggregator = %path.display(), "registering seeder");
                store.write(path, updated)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Clean the marker section of the aggregator at `path`.
    pub fn clean_file<F: FileStore>(&self, store: &F, path: &Path) -> Result<bool> {
        let content = store.read(path)?;
        let cleaned = self.clean(&content);
        if cleaned == content {
            return Ok(false);
        }
        store.write(path, &cleaned)?;
        Ok(true)
    }
}

/// Offset of the brace closing the `run()` method body.
fn run_body_close(content: &str) -> Option<usize> {
    let signature = content.find(RUN_METHOD_TOKEN)?;
    let after = signature + RUN_METHOD_TOKEN.len();
    let open = content[after..].find('{')? + after;

    let mut depth = 0usize;
    for (offset, ch) in content[open..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}
