//! Shared fixtures for handler tests: a throwaway SQLite store and config.

use crate::{config::Config, db::Database};
use std::collections::HashMap;
use tempfile::TempDir;

/// SQLite file in a temp dir with the schema created. Deleted on drop.
pub struct TestDb {
    pub db: Database,
    _dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("records.db").display()
        );
        let db = Database::new(url, None);
        db.init_schema().await.expect("create schema");

        Self { db, _dir: dir }
    }
}

pub fn config_with(vars: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned()).expect("valid test config")
}
