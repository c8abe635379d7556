//! Embedded SQL migrations
//!
//! Each migration is a `(name, sql)` pair compiled in with `include_str!`.
//! Names sort in application order; `000_migrations.sql` bootstraps the
//! `sys_migrations` tracking table and is always applied first.
//!
//! To add a migration, create `NNN_description.sql` next to this file and
//! append it to the list below. Never edit a migration that has shipped.

/// Name of the bootstrap migration shared by both databases
pub const BOOTSTRAP_MIGRATION: &str = "000_migrations.sql";

/// Ledger database migrations (`bankline.duckdb`)
pub const MIGRATIONS: &[(&str, &str)] = &[
    (BOOTSTRAP_MIGRATION, include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];

/// Event log database migrations (`logs.duckdb`)
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    (BOOTSTRAP_MIGRATION, include_str!("logs/000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("logs/001_initial_schema.sql")),
];
