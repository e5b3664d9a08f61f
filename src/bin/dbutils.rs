use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::{Map, Value as JsonValue};
use tracing::error;

use sql_dbutils::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run parameterized SQL against a single database connection")]
struct Args {
    /// JSON configuration file; overrides the connection flags below.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = ":memory:")]
    endpoint: String,
    #[arg(long, default_value = "")]
    database: String,
    #[arg(long, default_value = "sqlite")]
    driver: String,
    #[arg(long, value_enum, default_value = "empty-string")]
    null_policy: NullPolicy,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a mutation and print the affected-row count.
    Exec {
        sql: String,
        #[arg(allow_negative_numbers = true)]
        params: Vec<String>,
    },
    /// Run a query and print one JSON object per row.
    Query {
        sql: String,
        #[arg(allow_negative_numbers = true)]
        params: Vec<String>,
    },
    /// Run several parameterless statements.
    Batch { sql: String },
}

/// Integer, then finite float, then `null`, otherwise text.
fn parse_param(raw: &str) -> RowValues {
    if let Ok(i) = raw.parse::<i64>() {
        RowValues::Int(i)
    } else if let Some(f) = raw.parse::<f64>().ok().filter(|f| f.is_finite()) {
        RowValues::Float(f)
    } else if raw.eq_ignore_ascii_case("null") {
        RowValues::Null
    } else {
        RowValues::Text(raw.to_string())
    }
}

fn record_to_json(record: &RowRecord) -> JsonValue {
    let map: Map<String, JsonValue> = record
        .iter()
        .map(|(column, value)| (column.to_string(), value.to_json()))
        .collect();
    JsonValue::Object(map)
}

fn load_config(args: &Args) -> Result<DbConfig, DbError> {
    match &args.config {
        Some(path) => DbConfig::from_json_file(path),
        None => Ok(DbConfig::builder(args.endpoint.clone(), args.database.clone())
            .driver(args.driver.clone())
            .null_policy(args.null_policy)
            .finish()),
    }
}

/// Run the command and return the lines to print.
fn run(args: &Args) -> Result<Vec<String>, DbError> {
    let mut db = Database::open(load_config(args)?)?;
    let outcome = match &args.command {
        Command::Exec { sql, params } => {
            let params: Vec<RowValues> = params.iter().map(|p| parse_param(p)).collect();
            db.execute(sql, &params)
                .map(|affected| vec![affected.to_string()])
        }
        Command::Query { sql, params } => {
            let params: Vec<RowValues> = params.iter().map(|p| parse_param(p)).collect();
            db.query_many(sql, &params).map(|rows| {
                rows.iter()
                    .map(|row| record_to_json(row).to_string())
                    .collect()
            })
        }
        Command::Batch { sql } => db.execute_batch(sql).map(|()| Vec::new()),
    };
    db.close();
    outcome
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use serde_json::json;
    use sql_dbutils::results::ColumnIndex;

    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn params_parse_in_priority_order() {
        assert_eq!(parse_param("7"), RowValues::Int(7));
        assert_eq!(parse_param("-5"), RowValues::Int(-5));
        assert_eq!(parse_param("2.5"), RowValues::Float(2.5));
        assert_eq!(parse_param("-0.5"), RowValues::Float(-0.5));
        assert_eq!(parse_param("NULL"), RowValues::Null);
        assert_eq!(parse_param("Ana"), RowValues::Text("Ana".into()));
    }

    #[test]
    fn non_finite_words_stay_text() {
        for word in ["NaN", "nan", "inf", "-inf", "Infinity", "INFINITY"] {
            assert_eq!(parse_param(word), RowValues::Text(word.into()), "{word}");
        }
    }

    #[test]
    fn args_parse_query_with_params() {
        let args = args(&["dbutils", "query", "SELECT ?1", "5"]);
        match args.command {
            Command::Query { sql, params } => {
                assert_eq!(sql, "SELECT ?1");
                assert_eq!(params, vec!["5".to_string()]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn args_accept_negative_params() {
        let args = args(&["dbutils", "exec", "INSERT INTO t VALUES (?1, ?2)", "-5", "-1.5"]);
        match args.command {
            Command::Exec { params, .. } => {
                let parsed: Vec<RowValues> = params.iter().map(|p| parse_param(p)).collect();
                assert_eq!(parsed, vec![RowValues::Int(-5), RowValues::Float(-1.5)]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn record_renders_as_json_object() {
        let columns = Arc::new(ColumnIndex::new(vec![
            "id".into(),
            "note".into(),
            "raw".into(),
            "score".into(),
        ]));
        let record = RowRecord::new(
            columns,
            vec![
                RowValues::Int(1),
                RowValues::Null,
                RowValues::Blob(vec![1, 2]),
                RowValues::Float(2.5),
            ],
        );
        assert_eq!(
            record_to_json(&record),
            json!({"id": 1, "note": null, "raw": [1, 2], "score": 2.5})
        );
    }

    #[test]
    fn run_exec_query_and_batch() {
        let dir = tempfile::tempdir().unwrap();
        let endpoint = dir.path().to_str().unwrap();
        let base = ["dbutils", "--endpoint", endpoint, "--database", "cli"];
        let with = |rest: &[&str]| args(&[&base[..], rest].concat());

        let out = run(&with(&["batch", "CREATE TABLE t (id INTEGER, name TEXT);"])).unwrap();
        assert!(out.is_empty());

        let out = run(&with(&["exec", "INSERT INTO t VALUES (?1, ?2)", "-5", "NaN"])).unwrap();
        assert_eq!(out, vec!["1".to_string()]);
        run(&with(&["exec", "INSERT INTO t VALUES (?1, ?2)", "6", "null"])).unwrap();

        let out = run(&with(&["query", "SELECT id, name FROM t ORDER BY id"])).unwrap();
        let rows: Vec<JsonValue> = out
            .iter()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(
            rows,
            vec![
                json!({"id": -5, "name": "NaN"}),
                json!({"id": 6, "name": ""}),
            ]
        );

        let out = run(&with(&[
            "--null-policy",
            "preserve",
            "query",
            "SELECT name FROM t WHERE id = ?1",
            "6",
        ]))
        .unwrap();
        assert_eq!(out, vec![r#"{"name":null}"#.to_string()]);
    }

    #[test]
    fn run_reads_json_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"endpoint": ":memory:"}}"#).unwrap();
        let path = file.path().to_str().unwrap();

        let argv = ["dbutils", "--config", path, "query", "SELECT ?1 AS v", "3"];
        let out = run(&args(&argv)).unwrap();
        assert_eq!(out, vec![r#"{"v":3}"#.to_string()]);
    }

    #[test]
    fn run_reports_statement_errors() {
        let err = run(&args(&["dbutils", "exec", "INSERT INTO missing VALUES (1)"])).unwrap_err();
        assert!(matches!(err, DbError::StatementError(_)));
    }
}
