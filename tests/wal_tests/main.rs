//! WAL tests

mod entry_tests;
