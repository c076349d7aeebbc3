// Copyright (C) 2024-2025 Fred Clausen and the ratatui project contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! Lint, build and test wrappers for the ClubHub workspace, plus a
//! migration check for the `SQLite` schema.
//!
//! - `cargo xtask ci` runs clippy, rustdoc and rustfmt checks, the build,
//!   the tests and the migration check
//! - `cargo xtask verify-migrations` applies every migration to an
//!   in-memory database, checks the resulting schema, reverts everything
//!   and re-applies it
//!
//! No external database or container is needed.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::{fmt::Debug, io, process::Output, vec};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{eyre::Context, Result};
use diesel::sql_types::{Integer, Text};
use diesel::{QueryableByName, RunQueryDsl, SqliteConnection};
use duct::cmd;
use std::collections::{BTreeMap, BTreeSet};
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

/// Tables the persistence crate expects after all migrations have run.
const EXPECTED_TABLES: [&str; 8] = [
    "activities",
    "activity_responsible_persons",
    "attendance_records",
    "audit_events",
    "notifications",
    "participants",
    "sessions",
    "users",
];

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, migrations)
    CI,

    /// Build every workspace target
    #[command(visible_alias = "b")]
    Build,

    /// Type-check every workspace target
    #[command(visible_alias = "c")]
    Check,

    /// Run clippy, rustdoc and rustfmt checks
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy with warnings denied
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Build the docs of each crate with warnings denied
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check formatting
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Apply clippy suggestions
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Reformat the workspace
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Run unit, integration and doc tests
    #[command(visible_alias = "t")]
    Test,

    /// Apply, revert and re-apply the `SQLite` migrations
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => run_cargo(vec!["build", "--workspace", "--all-targets"]),
            Self::Check => run_cargo(vec!["check", "--workspace", "--all-targets"]),
            Self::Lint => lint(),
            Self::LintClippy => clippy(false),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => run_cargo_nightly(vec!["fmt", "--all", "--check"]),
            Self::FixClippy => clippy(true),
            Self::FixFormatting => run_cargo_nightly(vec!["fmt", "--all"]),
            Self::Test => test(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Everything a pull request has to pass
fn ci() -> Result<()> {
    lint()?;
    run_cargo(vec!["build", "--workspace", "--all-targets"])?;
    test()?;
    verify_migrations()
}

fn lint() -> Result<()> {
    clippy(false)?;
    lint_docs()?;
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Runs clippy over the workspace, applying fixes when `fix` is set
fn clippy(fix: bool) -> Result<()> {
    let mut args: Vec<&str> = vec!["clippy", "--workspace", "--all-targets"];
    if fix {
        args.extend(["--fix", "--allow-dirty", "--allow-staged"]);
    }
    args.extend(["--", "-D", "warnings"]);
    run_cargo(args)
}

/// Builds each crate's docs on nightly with rustdoc warnings denied
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd("cargo", ["doc", "--no-deps", "--package", &package.name])
            .env_remove("CARGO")
            .env("RUSTUP_TOOLCHAIN", "nightly")
            .env("RUSTDOCFLAGS", "-D warnings")
            .run_with_trace()?;
    }

    Ok(())
}

fn test() -> Result<()> {
    run_cargo(vec!["test", "--workspace", "--all-targets"])?;
    // doc tests are not part of --all-targets
    run_cargo(vec!["test", "--workspace", "--doc"])
}

fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // set by cargo when xtask runs as a subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

/// Verify the `SQLite` migrations
///
/// 1. Applies every migration to a fresh in-memory database
/// 2. Checks that the expected tables exist, each has a primary key, and
///    every foreign key points at a known table
/// 3. Reverts all migrations and checks that no tables are left behind
/// 4. Re-applies the migrations and checks the schema is identical to the
///    first pass
///
/// ## Usage
///
/// ```bash
/// cargo xtask verify-migrations
/// ```
fn verify_migrations() -> Result<()> {
    use diesel::Connection;
    use diesel_migrations::{embed_migrations, MigrationHarness};

    const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
        embed_migrations!("../crates/persistence/migrations");

    tracing::info!("Starting migration verification");

    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    tracing::info!("Applying migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to apply migrations: {}", e))?;

    let applied = introspect_sqlite_schema(&mut conn)?;
    check_schema_shape(&applied)?;

    tracing::info!("Reverting all migrations");
    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to revert migrations: {}", e))?;

    let reverted = introspect_sqlite_schema(&mut conn)?;
    if !reverted.tables.is_empty() {
        let leftover: Vec<&String> = reverted.tables.keys().collect();
        return Err(color_eyre::eyre::eyre!(
            "Tables left behind after revert: {:?}",
            leftover
        ));
    }

    tracing::info!("Re-applying migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to re-apply migrations: {}", e))?;

    let reapplied = introspect_sqlite_schema(&mut conn)?;
    compare_schemas(&applied, &reapplied)?;

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    unique_constraints: BTreeSet<UniqueConstraint>,
    indexes: BTreeSet<Index>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    name: String,
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
    to_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct UniqueConstraint {
    columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Index {
    name: String,
    columns: Vec<String>,
}

/// Introspect `SQLite` schema
#[allow(clippy::too_many_lines)]
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    use diesel::RunQueryDsl;

    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Integer)]
        #[allow(dead_code)]
        cid: i32,
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
        #[diesel(sql_type = Text)]
        to: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Integer)]
        #[allow(dead_code)]
        unique: i32,
        #[diesel(sql_type = Text)]
        origin: String,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    // Get all tables
    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name"
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table {
            columns: BTreeMap::new(),
            primary_keys: BTreeSet::new(),
            foreign_keys: BTreeSet::new(),
            unique_constraints: BTreeSet::new(),
            indexes: BTreeSet::new(),
        };

        // Get columns
        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            let normalized_type = normalize_sqlite_type(&col.r#type);
            table_info.columns.insert(
                col.name.clone(),
                Column {
                    name: col.name.clone(),
                    normalized_type,
                    nullable: col.notnull == 0,
                },
            );

            if col.pk > 0 {
                table_info.primary_keys.insert(col.name);
            }
        }

        // Get foreign keys
        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
                to_column: fk.to,
            });
        }

        // Get indexes and unique constraints
        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        for idx in indexes {
            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;

            let column_names: Vec<String> = index_columns.into_iter().map(|c| c.name).collect();

            // If origin is 'u', it's a unique constraint (including sqlite_autoindex_*)
            if idx.origin == "u" {
                table_info.unique_constraints.insert(UniqueConstraint {
                    columns: column_names,
                });
            } else if !idx.name.starts_with("sqlite_autoindex_") {
                // Regular index (skip auto-generated indexes that aren't unique constraints)
                table_info.indexes.insert(Index {
                    name: idx.name,
                    columns: column_names,
                });
            }
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

/// Normalize `SQLite` type to common representation
fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let normalized = sqlite_type.to_uppercase();
    if normalized.contains("INT") {
        "integer".to_string()
    } else if normalized.contains("TEXT")
        || normalized.contains("CHAR")
        || normalized.contains("CLOB")
    {
        "text".to_string()
    } else if normalized.contains("REAL")
        || normalized.contains("FLOA")
        || normalized.contains("DOUB")
    {
        "real".to_string()
    } else if normalized.contains("BLOB") {
        "blob".to_string()
    } else {
        "text".to_string() // Default for SQLite
    }
}

/// Check the applied schema against the tables the persistence crate uses
fn check_schema_shape(schema: &Schema) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    for name in EXPECTED_TABLES {
        if !schema.tables.contains_key(name) {
            errors.push(format!("Missing table '{name}'"));
        }
    }
    for name in schema.tables.keys() {
        if !EXPECTED_TABLES.contains(&name.as_str()) {
            errors.push(format!("Unexpected table '{name}'"));
        }
    }

    for (name, table) in &schema.tables {
        if table.primary_keys.is_empty() {
            errors.push(format!("Table '{name}' has no primary key"));
        }
        for fk in &table.foreign_keys {
            match schema.tables.get(&fk.to_table) {
                Some(target) if target.columns.contains_key(&fk.to_column) => {}
                Some(_) => errors.push(format!(
                    "Foreign key {name}.{} references missing column {}.{}",
                    fk.from_column, fk.to_table, fk.to_column
                )),
                None => errors.push(format!(
                    "Foreign key {name}.{} references missing table '{}'",
                    fk.from_column, fk.to_table
                )),
            }
        }
    }

    if errors.is_empty() {
        tracing::info!(tables = schema.tables.len(), "Schema shape looks correct");
        Ok(())
    } else {
        for error in &errors {
            tracing::error!("{error}");
        }
        Err(color_eyre::eyre::eyre!(
            "Schema check failed with {} error(s)",
            errors.len()
        ))
    }
}

/// Compare the schema from the first migration pass with the re-applied one
fn compare_schemas(first: &Schema, second: &Schema) -> Result<()> {
    if first == second {
        return Ok(());
    }

    let first_names: BTreeSet<&String> = first.tables.keys().collect();
    let second_names: BTreeSet<&String> = second.tables.keys().collect();
    for name in first_names.symmetric_difference(&second_names) {
        tracing::error!("Table '{name}' only exists in one pass");
    }
    for name in first_names.intersection(&second_names) {
        if first.tables.get(*name) != second.tables.get(*name) {
            tracing::error!("Table '{name}' differs after revert and re-apply");
        }
    }

    Err(color_eyre::eyre::eyre!(
        "Schema changed after reverting and re-applying migrations"
    ))
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
