//! End-to-end generation tests against an in-memory DuckDB database.

use sql_seeder::generator::{GeneratorSettings, SeedGenerator, SeedRequest};
use sql_seeder::source::{DuckDbSource, FetchOptions, OrderDirection, Row, RowSource};
use sql_seeder::storage::LocalFileStore;
use sql_seeder::{Result, SeedError};
use std::cell::Cell;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const AGGREGATOR: &str = "<?php\n\nnamespace Database\\Seeders;\n\nuse Illuminate\\Database\\Seeder;\n\nclass DatabaseSeeder extends Seeder\n{\n    public function run()\n    {\n        #seeder_start\n        #seeder_end\n    }\n}\n";

fn users_source() -> DuckDbSource {
    let source = DuckDbSource::open_in_memory().unwrap();
    source
        .execute_batch(
            "CREATE TABLE users (id INTEGER, name VARCHAR);
             INSERT INTO users VALUES (1, 'O''Brien');",
        )
        .unwrap();
    source
}

fn settings_in(dir: &Path) -> GeneratorSettings {
    let seeders = dir.join("database").join("seeders");
    fs::create_dir_all(&seeders).unwrap();
    fs::write(seeders.join("DatabaseSeeder.php"), AGGREGATOR).unwrap();

    let mut settings = GeneratorSettings::default().with_output_dir(seeders.clone());
    settings.seeder_path = seeders.join("DatabaseSeeder.php");
    settings
}

#[test]
fn test_generates_seeder_with_exact_insert_block() {
    let temp_dir = TempDir::new().unwrap();
    let generator = SeedGenerator::new(users_source(), LocalFileStore, settings_in(temp_dir.path()));

    let report = generator.generate(&SeedRequest::new("users")).unwrap();
    assert_eq!(report.class_name, "UsersTableSeeder");
    assert_eq!(report.rows, 1);
    assert_eq!(report.chunks, 1);
    assert!(report.registered);
    assert!(report.path.ends_with("UsersTableSeeder.php"));

    let content = fs::read_to_string(&report.path).unwrap();
    assert!(content.contains("class UsersTableSeeder extends Seeder"));
    assert!(content.contains("Auto generated seed file for the users table"));
    assert!(content.contains("        \\DB::table('users')->delete();"));
    assert!(content.contains(
        "        \\DB::table('users')->insert(array (\n            0 => \n            array (\n                'id' => 1,\n                'name' => 'O\\'Brien',\n            ),\n        ));"
    ));
    assert!(!content.contains("{{"));

    let aggregator = fs::read_to_string(&generator.settings().seeder_path).unwrap();
    assert!(aggregator.contains(
        "        #seeder_start\n        $this->call(UsersTableSeeder::class);\n        #seeder_end"
    ));
}

#[test]
fn test_regenerating_registers_once() {
    let temp_dir = TempDir::new().unwrap();
    let generator = SeedGenerator::new(users_source(), LocalFileStore, settings_in(temp_dir.path()));

    let first = generator.generate(&SeedRequest::new("users")).unwrap();
    assert!(first.registered);
    assert!(generator.output_exists(&SeedRequest::new("users")));

    let second = generator.generate(&SeedRequest::new("users")).unwrap();
    assert!(!second.registered);

    let aggregator = fs::read_to_string(&generator.settings().seeder_path).unwrap();
    assert_eq!(aggregator.matches("UsersTableSeeder::class").count(), 1);
}

#[test]
fn test_fetch_options_and_chunking() {
    let source = DuckDbSource::open_in_memory().unwrap();
    source
        .execute_batch(
            "CREATE TABLE posts (id INTEGER, title VARCHAR, secret VARCHAR);
             INSERT INTO posts SELECT i, 'post ' || CAST(i AS VARCHAR), 'hidden' FROM range(1, 8) t(i);",
        )
        .unwrap();

    let temp_dir = TempDir::new().unwrap();
    let generator = SeedGenerator::new(source, LocalFileStore, settings_in(temp_dir.path()));

    let request = SeedRequest {
        fetch: FetchOptions {
            max_rows: Some(5),
            exclude: vec!["secret".to_string()],
            order_by: Some("id".to_string()),
            direction: OrderDirection::Desc,
            where_clause: Some("id > 1".to_string()),
            skip: None,
        },
        chunk_size: Some(2),
        prefix: Some("Acme".to_string()),
        suffix: Some("V2".to_string()),
        ..SeedRequest::new("posts")
    };

    let report = generator.generate(&request).unwrap();
    assert_eq!(report.class_name, "AcmePostsTableV2Seeder");
    assert_eq!(report.rows, 5);
    assert_eq!(report.chunks, 3);

    let content = fs::read_to_string(&report.path).unwrap();
    assert_eq!(content.matches("->insert(").count(), 3);
    assert!(!content.contains("secret"));
    assert!(!content.contains("hidden"));

    // descending from 7, five rows
    let first = content.find("'id' => 7,").unwrap();
    let last = content.find("'id' => 3,").unwrap();
    assert!(first < last);
    assert!(!content.contains("'id' => 2,"));
}

#[test]
fn test_empty_table_has_no_inserts() {
    let source = DuckDbSource::open_in_memory().unwrap();
    source.execute_batch("CREATE TABLE tags (id INTEGER);").unwrap();

    let temp_dir = TempDir::new().unwrap();
    let generator = SeedGenerator::new(source, LocalFileStore, settings_in(temp_dir.path()));

    let report = generator.generate(&SeedRequest::new("tags")).unwrap();
    assert_eq!(report.rows, 0);
    assert_eq!(report.chunks, 0);

    let content = fs::read_to_string(&report.path).unwrap();
    assert!(content.contains("\\DB::table('tags')->delete();"));
    assert!(!content.contains("->insert("));
}

/// Source with one known table that counts fetch calls.
struct CountingSource {
    fetches: Cell<usize>,
}

impl RowSource for CountingSource {
    fn has_table(&self, table: &str) -> Result<bool> {
        Ok(table == "known")
    }

    fn column_listing(&self, _table: &str) -> Result<Vec<String>> {
        Ok(vec!["id".to_string()])
    }

    fn fetch(&self, _table: &str, _options: &FetchOptions) -> Result<Vec<Row>> {
        self.fetches.set(self.fetches.get() + 1);
        Ok(vec![Row::new().with("id", 1i64)])
    }
}

#[test]
fn test_missing_table_fails_before_fetching() {
    let temp_dir = TempDir::new().unwrap();
    let source = CountingSource {
        fetches: Cell::new(0),
    };
    let generator = SeedGenerator::new(&source, LocalFileStore, settings_in(temp_dir.path()));

    let err = generator.generate(&SeedRequest::new("ghosts")).unwrap_err();
    assert!(matches!(err, SeedError::TableNotFound(ref t) if t == "ghosts"));
    assert_eq!(err.to_string(), "Table ghosts was not found.");
    assert_eq!(source.fetches.get(), 0);
    assert!(!generator.output_exists(&SeedRequest::new("ghosts")));
}

#[test]
fn test_generate_all_continues_past_failures() {
    let temp_dir = TempDir::new().unwrap();
    let source = CountingSource {
        fetches: Cell::new(0),
    };
    let generator = SeedGenerator::new(&source, LocalFileStore, settings_in(temp_dir.path()));

    let results = generator.generate_all(&[
        SeedRequest::new("ghosts"),
        SeedRequest::new("known"),
    ]);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, "ghosts");
    assert!(matches!(results[0].1, Err(SeedError::TableNotFound(_))));
    assert_eq!(results[1].0, "known");
    assert!(results[1].1.is_ok());
    assert_eq!(source.fetches.get(), 1);
}

#[test]
fn test_named_connection_in_accessor() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_in(temp_dir.path()).with_connection(Some("legacy".to_string()));
    let generator = SeedGenerator::new(users_source(), LocalFileStore, settings);

    let report = generator.generate(&SeedRequest::new("users")).unwrap();
    let content = fs::read_to_string(&report.path).unwrap();
    assert!(content.contains("\\DB::connection('legacy')->table('users')->delete();"));
    assert!(content.contains("\\DB::connection('legacy')->table('users')->insert(array ("));
    assert!(content.contains("Auto generated seed file for the users table"));
}

#[test]
fn test_hooks_are_rendered() {
    let temp_dir = TempDir::new().unwrap();
    let generator = SeedGenerator::new(users_source(), LocalFileStore, settings_in(temp_dir.path()));

    let request = SeedRequest {
        prerun: Some("App\\Events\\BeforeSeed".to_string()),
        postrun: Some("App\\Events\\AfterSeed".to_string()),
        ..SeedRequest::new("users")
    };
    let report = generator.generate(&request).unwrap();
    let content = fs::read_to_string(&report.path).unwrap();

    let pre = content
        .find("$response = Event::until(new App\\Events\\BeforeSeed());")
        .unwrap();
    let delete = content.find("->delete();").unwrap();
    let post = content
        .find("$response = Event::until(new App\\Events\\AfterSeed());")
        .unwrap();
    assert!(pre < delete && delete < post);
    assert!(content.contains("Prerun event failed, seed wasn't executed!"));
    assert!(content.contains("Seed was executed but the postrun event failed!"));
}

#[test]
fn test_invalid_hook_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let generator = SeedGenerator::new(users_source(), LocalFileStore, settings_in(temp_dir.path()));

    let request = SeedRequest {
        prerun: Some("not a class()".to_string()),
        ..SeedRequest::new("users")
    };
    let err = generator.generate(&request).unwrap_err();
    assert!(matches!(err, SeedError::InvalidHook(_)));
    assert!(!generator.output_exists(&request));
}

#[test]
fn test_missing_custom_stub() {
    let temp_dir = TempDir::new().unwrap();
    let mut settings = settings_in(temp_dir.path());
    settings.stub_path = Some(temp_dir.path().join("missing.stub"));
    let generator = SeedGenerator::new(users_source(), LocalFileStore, settings);

    let err = generator.generate(&SeedRequest::new("users")).unwrap_err();
    assert!(matches!(err, SeedError::TemplateRead { .. }));
}

#[test]
fn test_custom_stub_is_used() {
    let temp_dir = TempDir::new().unwrap();
    let stub = temp_dir.path().join("custom.stub");
    fs::write(&stub, "// {{class}} for {{table}}\r\n{{insert_statements}}\r\n").unwrap();

    let mut settings = settings_in(temp_dir.path());
    settings.stub_path = Some(stub);
    let generator = SeedGenerator::new(users_source(), LocalFileStore, settings);

    let report = generator.generate(&SeedRequest::new("users")).unwrap();
    let content = fs::read_to_string(&report.path).unwrap();
    assert!(content.starts_with("// UsersTableSeeder for users\n\n        \\DB::table('users')->insert("));
    assert!(!content.contains('\r'));
}

#[test]
fn test_unwritable_output_dir() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not-a-dir");
    fs::write(&blocker, "file").unwrap();

    let settings = settings_in(temp_dir.path()).with_output_dir(blocker.join("seeders"));
    let generator = SeedGenerator::new(users_source(), LocalFileStore, settings);

    let err = generator.generate(&SeedRequest::new("users")).unwrap_err();
    assert!(matches!(err, SeedError::Write { .. }));
}

#[test]
fn test_registration_disabled_leaves_aggregator_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let settings = settings_in(temp_dir.path()).with_register(false);
    let generator = SeedGenerator::new(users_source(), LocalFileStore, settings);

    let report = generator.generate(&SeedRequest::new("users")).unwrap();
    assert!(!report.registered);
    assert!(report.path.exists());

    let aggregator = fs::read_to_string(&generator.settings().seeder_path).unwrap();
    assert_eq!(aggregator, AGGREGATOR);
}

#[test]
fn test_clean_section_after_generation() {
    let temp_dir = TempDir::new().unwrap();
    let generator = SeedGenerator::new(users_source(), LocalFileStore, settings_in(temp_dir.path()));

    generator.generate(&SeedRequest::new("users")).unwrap();
    assert!(generator.clean_section().unwrap());

    let aggregator = fs::read_to_string(&generator.settings().seeder_path).unwrap();
    assert_eq!(aggregator, AGGREGATOR);
}
