//! Seeder generation: table rows in, seeder class file out.

use crate::config::SeederConfig;
use crate::error::{Result, SeedError};
use crate::naming::{class_name, seeder_path};
use crate::registrar::Registrar;
use crate::source::{FetchOptions, RowSource};
use crate::storage::FileStore;
use crate::template::{GeneratedSeed, SeedTemplate, TableAccessor, TemplateStyle};
use std::path::PathBuf;
use tracing::{debug, info};

/// Settings shared by every table of a run.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub output_dir: PathBuf,
    /// Aggregator file
    pub seeder_path: PathBuf,
    /// Register generated classes in the aggregator
    pub register: bool,
    pub chunk_size: usize,
    /// Custom template; the bundled stub is used when None
    pub stub_path: Option<PathBuf>,
    pub style: TemplateStyle,
    pub registrar: Registrar,
    /// Non-default connection the generated seeders should target
    pub connection: Option<String>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::from_config(&SeederConfig::default(), true)
    }
}

impl GeneratorSettings {
    pub fn from_config(config: &SeederConfig, indexed: bool) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            seeder_path: config.seeder_path.clone(),
            register: config.seeder_modification,
            chunk_size: config.chunk_size,
            stub_path: config.stub_path.clone(),
            style: config.template_style(indexed),
            registrar: config.registrar(),
            connection: None,
        }
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn with_register(mut self, register: bool) -> Self {
        self.register = register;
        self
    }

    pub fn with_connection(mut self, connection: Option<String>) -> Self {
        self.connection = connection;
        self
    }

    fn template(&self) -> Result<SeedTemplate> {
        match self.stub_path {
            Some(ref path) => SeedTemplate::load(path),
            None => Ok(SeedTemplate::default()),
        }
    }
}

/// One table to turn into a seeder.
#[derive(Debug, Clone, Default)]
pub struct SeedRequest {
    pub table: String,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub fetch: FetchOptions,
    /// Overrides the configured chunk size
    pub chunk_size: Option<usize>,
    pub prerun: Option<String>,
    pub postrun: Option<String>,
}

impl SeedRequest {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn class_name(&self) -> String {
        class_name(&self.table, self.prefix.as_deref(), self.suffix.as_deref())
    }
}

/// Result of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub table: String,
    pub class_name: String,
    pub path: PathBuf,
    pub rows: usize,
    pub chunks: usize,
    /// Whether the aggregator file was modified
    pub registered: bool,
}

pub struct SeedGenerator<S, F> {
    source: S,
    store: F,
    settings: GeneratorSettings,
}

impl<S: RowSource, F: FileStore> SeedGenerator<S, F> {
    pub fn new(source: S, store: F, settings: GeneratorSettings) -> Self {
        Self {
            source,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Where the seeder for `request` will be written.
    pub fn output_path(&self, request: &SeedRequest) -> PathBuf {
        seeder_path(&self.settings.output_dir, &request.class_name())
    }

    /// Whether a seeder for `request` already exists on disk.
    pub fn output_exists(&self, request: &SeedRequest) -> bool {
        self.store.exists(&self.output_path(request))
    }

    pub fn has_table(&self, table: &str) -> Result<bool> {
        self.source.has_table(table)
    }

    fn accessor(&self, table: &str) -> TableAccessor {
        let accessor = TableAccessor::new(table);
        match self.settings.connection {
            Some(ref conn) => accessor.on_connection(conn.clone()),
            None => accessor,
        }
    }

    /// Generate, write and register the seeder for one table.
    pub fn generate(&self, request: &SeedRequest) -> Result<SeedReport> {
        let table = request.table.as_str();
        if !self.source.has_table(table)? {
            return Err(SeedError::TableNotFound(table.to_string()));
        }

        let rows = self.source.fetch(table, &request.fetch)?;
        debug!(table, rows = rows.len(), "fetched rows");

        let class = request.class_name();
        let chunk_size = request.chunk_size.unwrap_or(self.settings.chunk_size);
        let seed = GeneratedSeed::new(class.clone(), self.accessor(table), &rows, chunk_size)
            .with_hooks(request.prerun.clone(), request.postrun.clone());

        let template = self.settings.template()?;
        let content = template.populate(&seed, &self.settings.style)?;

        let path = self.output_path(request);
        self.store.write(&path, &content)?;
        info!(table, class = %class, path = %path.display(), "wrote seeder");

        let registered = if self.settings.register {
            self.settings
                .registrar
                .register_file(&self.store, &self.settings.seeder_path, &class)?
        } else {
            false
        };

        Ok(SeedReport {
            table: table.to_string(),
            class_name: class,
            path,
            rows: seed.row_count(),
            chunks: seed.chunks.len(),
            registered,
        })
    }

    /// Generate every request in order. A failing table never stops the rest.
    pub fn generate_all(&self, requests: &[SeedRequest]) -> Vec<(String, Result<SeedReport>)> {
        requests
            .iter()
            .map(|request| (request.table.clone(), self.generate(request)))
            .collect()
    }

    /// Remove every registered call from the aggregator's marker section.
    pub fn clean_section(&self) -> Result<bool> {
        self.settings
            .registrar
            .clean_file(&self.store, &self.settings.seeder_path)
    }
}
