// SQLite driver layer
//
// - params: conversion from RowValues to rusqlite values
// - statement: per-call prepared statement, binding and release
// - query: cursor reading into records or typed rows

pub mod params;
pub mod query;
pub mod statement;

pub use params::Params;
pub use query::{build_result_set, build_typed, last_record, last_typed, sqlite_extract_value};
pub use statement::BoundStatement;
