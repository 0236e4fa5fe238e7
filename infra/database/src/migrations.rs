use crate::error::{DatabaseError, DatabaseErrorExt};
use fxhash::FxHashMap;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

const MIGRATIONS_TABLE: &str = "migrations";

/// Schema scripts in application order. Names are the record ids in `migrations`.
const BUILTIN: &[(&str, &str)] = &[
    ("0001_core_tables", include_str!("../schema/0001_core_tables.surql")),
    ("0002_auth_identities", include_str!("../schema/0002_auth_identities.surql")),
];

#[derive(Debug, Clone)]
pub(crate) struct Migration {
    pub name: &'static str,
    pub script: &'static str,
    pub checksum: String,
}

impl Migration {
    pub(crate) fn new(name: &'static str, script: &'static str) -> Self {
        Self { name, script, checksum: checksum(script) }
    }
}

#[derive(Debug, Default)]
pub(crate) struct MigrationReport {
    pub applied: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct AppliedMigration {
    name: String,
    checksum: String,
}

#[derive(Debug)]
pub(crate) struct MigrationRunner {
    db: Surreal<Any>,
    migrations: Vec<Migration>,
}

impl MigrationRunner {
    pub(crate) fn new(db: Surreal<Any>) -> Self {
        let migrations = BUILTIN.iter().map(|(name, script)| Migration::new(name, script)).collect();
        Self { db, migrations }
    }

    pub(crate) async fn run(&self) -> Result<MigrationReport, DatabaseError> {
        let mut report = MigrationReport::default();
        let applied = self.applied_migrations().await?;

        for migration in &self.migrations {
            if let Some(existing) = applied.get(migration.name) {
                ensure_checksum_match(migration, existing)?;
                report.skipped.push(migration.name);
                continue;
            }

            self.apply(migration).await?;
            report.applied.push(migration.name);
        }

        Ok(report)
    }

    async fn apply(&self, migration: &Migration) -> Result<(), DatabaseError> {
        let query = format!(
            "BEGIN TRANSACTION;
            {}
            CREATE type::thing($table, $name) CONTENT {{ checksum: $checksum, applied_at: time::now() }} RETURN NONE;
            COMMIT TRANSACTION;",
            migration.script,
        );

        self.db
            .query(query)
            .bind(("table", MIGRATIONS_TABLE))
            .bind(("name", migration.name))
            .bind(("checksum", migration.checksum.clone()))
            .await
            .context(format!("SQL execution failed at {}", migration.name))?
            .check()
            .map_err(|e| DatabaseError::Migration {
                message: e.to_string().into(),
                context: Some(format!("Applying {}", migration.name).into()),
            })?;

        Ok(())
    }

    async fn applied_migrations(&self) -> Result<FxHashMap<String, String>, DatabaseError> {
        let entries = self
            .db
            .query("SELECT record::id(id) AS name, checksum FROM type::table($table)")
            .bind(("table", MIGRATIONS_TABLE))
            .await
            .context("Loading applied migrations")?
            .take::<Vec<AppliedMigration>>(0)
            .context("Parsing applied migrations")?;

        Ok(entries.into_iter().map(|entry| (entry.name, entry.checksum)).collect())
    }
}

fn checksum(script: &str) -> String {
    hex::encode(Sha256::digest(script.as_bytes()))
}

fn ensure_checksum_match(migration: &Migration, existing: &str) -> Result<(), DatabaseError> {
    if existing != migration.checksum {
        return Err(DatabaseError::Migration {
            message: format!(
                "Checksum mismatch for {} (expected {}, got {})",
                migration.name, existing, migration.checksum
            )
            .into(),
            context: Some("Migration already applied with different checksum".into()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksums_are_stable_hex_digests() {
        let first = Migration::new("0001", "DEFINE TABLE a;");
        let second = Migration::new("0001", "DEFINE TABLE a;");
        assert_eq!(first.checksum, second.checksum);
        assert_eq!(first.checksum.len(), 64);
        assert_ne!(first.checksum, Migration::new("0001", "DEFINE TABLE b;").checksum);
    }

    #[test]
    fn mismatched_checksum_is_rejected() {
        let migration = Migration::new("0001", "DEFINE TABLE a;");
        assert!(ensure_checksum_match(&migration, &migration.checksum.clone()).is_ok());
        let err = ensure_checksum_match(&migration, "deadbeef").unwrap_err();
        assert!(matches!(err, DatabaseError::Migration { .. }));
    }

    #[test]
    fn builtin_migrations_are_ordered() {
        let names: Vec<_> = BUILTIN.iter().map(|(name, _)| *name).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
