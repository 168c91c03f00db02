//! Tests for table lifecycle through the Engine
//!
//! These tests verify:
//! - Close/reopen preserves the table handle
//! - Guards: already open, open on destroy, never-created tables
//! - Every row call on a closed table reports TableNotFound
//! - A table handle taken before a close stays retired after a reopen

use tabletkv::protocol::{
    CloseTableArgs, CreateTableArgs, DestroyTableArgs, GetColumnByRowArgs, GetRowArgs,
    GetRowsArgs, MemTableLimitArgs, OpenTableArgs, PutRowArgs, Status,
};
use tabletkv::{TabletError, TabletService};

use super::{cols, create_and_open, setup_temp_engine, setup_temp_engine_with_limit, TABLE};

fn open_args(name: &str) -> OpenTableArgs {
    OpenTableArgs {
        table_name: name.to_string(),
    }
}

fn close_args(name: &str) -> CloseTableArgs {
    CloseTableArgs {
        table_name: name.to_string(),
    }
}

#[test]
fn test_close_reopen_same_handle() {
    let (_temp, engine) = setup_temp_engine();

    let created = engine
        .create_table(CreateTableArgs {
            table_name: TABLE.to_string(),
            column_families: vec!["name".to_string(), "addr".to_string()],
            memtable_limit: Some(123),
        })
        .unwrap();
    assert_eq!(created.status, Status::Ok);
    let created = created.table_handle.unwrap();
    assert_eq!(created.table_name, TABLE);
    assert_eq!(created.column_families, vec!["name", "addr"]);
    assert_eq!(created.memtable_limit, 123);

    let first = engine.open_table(open_args(TABLE)).unwrap();
    assert_eq!(engine.close_table(close_args(TABLE)).unwrap().status, Status::Ok);
    let second = engine.open_table(open_args(TABLE)).unwrap();

    assert_eq!(first.table_handle.as_ref(), Some(&created));
    assert_eq!(second.table_handle.as_ref(), Some(&created));
}

#[test]
fn test_handle_reflects_limit_change() {
    let (_temp, engine) = setup_temp_engine();
    create_and_open(&engine);

    engine
        .mem_table_limit(MemTableLimitArgs {
            table_name: TABLE.to_string(),
            new_limit_rows: 77,
        })
        .unwrap();
    engine.close_table(close_args(TABLE)).unwrap();

    let reopened = engine.open_table(open_args(TABLE)).unwrap();
    assert_eq!(reopened.table_handle.unwrap().memtable_limit, 77);
}

#[test]
fn test_create_existing_returns_table_exist() {
    let (_temp, engine) = setup_temp_engine();
    create_and_open(&engine);

    let reply = engine
        .create_table(CreateTableArgs {
            table_name: TABLE.to_string(),
            column_families: vec![],
            memtable_limit: None,
        })
        .unwrap();
    assert_eq!(reply.status, Status::TableExist);
    assert!(reply.table_handle.is_none());
}

#[test]
fn test_open_twice_returns_open_by_other() {
    let (_temp, engine) = setup_temp_engine();
    create_and_open(&engine);

    let reply = engine.open_table(open_args(TABLE)).unwrap();
    assert_eq!(reply.status, Status::TableOpenByOther);
    assert!(reply.table_handle.is_none());
}

#[test]
fn test_destroy_open_table_returns_open_by_other() {
    let (_temp, engine) = setup_temp_engine();
    create_and_open(&engine);

    let reply = engine
        .destroy_table(DestroyTableArgs {
            table_name: TABLE.to_string(),
        })
        .unwrap();
    assert_eq!(reply.status, Status::TableOpenByOther);
}

#[test]
fn test_destroy_then_open_is_not_found() {
    let (_temp, engine) = setup_temp_engine();
    create_and_open(&engine);
    engine.close_table(close_args(TABLE)).unwrap();

    let reply = engine
        .destroy_table(DestroyTableArgs {
            table_name: TABLE.to_string(),
        })
        .unwrap();
    assert_eq!(reply.status, Status::Ok);

    assert_eq!(
        engine.open_table(open_args(TABLE)).unwrap().status,
        Status::TableNotFound
    );
}

#[test]
fn test_never_created_table_is_not_found_everywhere() {
    let (_temp, engine) = setup_temp_engine();
    let name = "ghost".to_string();

    assert_eq!(engine.open_table(open_args(&name)).unwrap().status, Status::TableNotFound);
    assert_eq!(engine.close_table(close_args(&name)).unwrap().status, Status::TableNotFound);
    assert_eq!(
        engine
            .destroy_table(DestroyTableArgs { table_name: name.clone() })
            .unwrap()
            .status,
        Status::TableNotFound
    );
    assert_eq!(
        engine
            .mem_table_limit(MemTableLimitArgs {
                table_name: name.clone(),
                new_limit_rows: 1,
            })
            .unwrap()
            .status,
        Status::TableNotFound
    );
    assert_row_calls_not_found(&engine, &name);
    assert_eq!(engine.flush_table(&name).unwrap(), Status::TableNotFound);
}

#[test]
fn test_closed_table_rejects_row_calls() {
    let (_temp, engine) = setup_temp_engine();
    create_and_open(&engine);
    engine.close_table(close_args(TABLE)).unwrap();

    assert_row_calls_not_found(&engine, TABLE);
}

fn assert_row_calls_not_found(engine: &tabletkv::Engine, name: &str) {
    let put = engine
        .put_row(PutRowArgs {
            table_name: name.to_string(),
            row_key: "r".to_string(),
            updated_columns: cols(&[("cf:a", "1")]),
        })
        .unwrap();
    assert_eq!(put.status, Status::TableNotFound);

    let row = engine
        .get_row(GetRowArgs {
            table_name: name.to_string(),
            row_key: "r".to_string(),
        })
        .unwrap();
    assert_eq!(row.status, Status::TableNotFound);

    let rows = engine
        .get_rows(GetRowsArgs {
            table_name: name.to_string(),
            start_row_key: "a".to_string(),
            end_row_key: "z".to_string(),
        })
        .unwrap();
    assert_eq!(rows.status, Status::TableNotFound);
    assert!(rows.rows.is_empty());

    let column = engine
        .get_column_by_row(GetColumnByRowArgs {
            table_name: name.to_string(),
            row_key: "r".to_string(),
            qualified_column_key: "cf:a".to_string(),
        })
        .unwrap();
    assert_eq!(column.status, Status::TableNotFound);
}

#[test]
fn test_close_keeps_unflushed_rows() {
    let (_temp, engine) = setup_temp_engine();
    create_and_open(&engine);
    super::put(&engine, "r1", &[("cf:a", "1")]);

    engine.close_table(close_args(TABLE)).unwrap();
    engine.open_table(open_args(TABLE)).unwrap();

    assert_eq!(super::get(&engine, "r1"), cols(&[("cf:a", "1")]));
}

#[test]
fn test_handle_from_before_close_is_retired() {
    let (_temp, engine) = setup_temp_engine_with_limit(0);
    create_and_open(&engine);
    let stale = engine.catalog().get(TABLE).unwrap();

    engine.close_table(close_args(TABLE)).unwrap();
    engine.open_table(open_args(TABLE)).unwrap();

    assert!(stale.is_closed());
    assert!(matches!(
        stale.put_row("a", &cols(&[("cf:a", "1")])),
        Err(TabletError::TableClosed(_))
    ));
    assert!(matches!(stale.flush(), Err(TabletError::TableClosed(_))));
    assert!(matches!(stale.get_row("a"), Err(TabletError::TableClosed(_))));
    assert!(matches!(
        stale.get_rows("a", "z"),
        Err(TabletError::TableClosed(_))
    ));

    // The reopened instance owns the data log alone
    super::put(&engine, "b", &[("cf:b", "2")]);
    assert_eq!(super::get(&engine, "b"), cols(&[("cf:b", "2")]));
    assert_eq!(engine.catalog().get(TABLE).unwrap().data_log_lines(), 1);
}
