//! Engine tests

mod concurrency_tests;
mod lifecycle_tests;

use std::collections::BTreeMap;

use tabletkv::protocol::{CreateTableArgs, GetRowArgs, OpenTableArgs, PutRowArgs, Status};
use tabletkv::{Config, Engine, TabletService};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

pub const TABLE: &str = "users";

pub fn setup_temp_engine() -> (TempDir, Engine) {
    setup_temp_engine_with_limit(9000)
}

pub fn setup_temp_engine_with_limit(limit: usize) -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = open_engine(&temp_dir, limit);
    (temp_dir, engine)
}

pub fn open_engine(dir: &TempDir, limit: usize) -> Engine {
    let config = Config::builder()
        .data_dir(dir.path())
        .default_memtable_limit(limit)
        .build();
    Engine::open(config).unwrap()
}

/// Create and open `TABLE`
pub fn create_and_open(engine: &Engine) {
    let reply = engine
        .create_table(CreateTableArgs {
            table_name: TABLE.to_string(),
            column_families: vec!["name".to_string(), "addr".to_string()],
            memtable_limit: None,
        })
        .unwrap();
    assert_eq!(reply.status, Status::Ok);

    let reply = engine
        .open_table(OpenTableArgs {
            table_name: TABLE.to_string(),
        })
        .unwrap();
    assert_eq!(reply.status, Status::Ok);
}

pub fn cols(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn put(engine: &Engine, row: &str, pairs: &[(&str, &str)]) {
    let reply = engine
        .put_row(PutRowArgs {
            table_name: TABLE.to_string(),
            row_key: row.to_string(),
            updated_columns: cols(pairs),
        })
        .unwrap();
    assert_eq!(reply.status, Status::Ok);
}

/// The merged row as a column map
pub fn get(engine: &Engine, row: &str) -> BTreeMap<String, String> {
    let reply = engine
        .get_row(GetRowArgs {
            table_name: TABLE.to_string(),
            row_key: row.to_string(),
        })
        .unwrap();
    assert_eq!(reply.status, Status::Ok);
    serde_json::from_str(&reply.row).unwrap()
}
