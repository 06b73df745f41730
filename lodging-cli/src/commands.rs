//! Command implementations.

use std::fs;
use std::path::PathBuf;

use chrono::DateTime;
use chrono::Utc;
use lodging_grid::Column;
use lodging_grid::DataGrid;
use lodging_grid::GridOptions;
use lodging_grid::SortDirection;
use lodging_lib::ClientConfig;
use lodging_lib::LodgingClient;
use lodging_lib::auth::LoginRequest;
use lodging_lib::error::ConfigError;
use lodging_lib::error::StorageError;
use lodging_lib::notify::Notification;
use lodging_lib::storage::CredentialStore;
use lodging_lib::storage::SqliteCredentialStore;
use serde_json::Value;

use crate::cli::FetchArgs;
use crate::cli::LoginArgs;
use crate::cli::ShowArgs;
use crate::cli::TableArgs;

/// Default credential database file.
const DEFAULT_DB: &str = "lodging-credentials.db";

/// Error surfaced to the user by a command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{}", .0.user_message())]
    Client(#[from] lodging_lib::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Input(String),
}

pub async fn run_login(db: Option<PathBuf>, args: LoginArgs) -> Result<(), CommandError> {
    let client = connect(db).await?;
    let mut request = LoginRequest::new(args.email, args.password);
    request.remember_me = args.remember_me;

    client.login(&request).await?;
    println!("Logged in.");
    Ok(())
}

pub async fn run_logout(db: Option<PathBuf>) -> Result<(), CommandError> {
    let client = connect(db).await?;
    client.logout().await?;
    println!("Logged out.");
    Ok(())
}

pub async fn run_status(db: Option<PathBuf>) -> Result<(), CommandError> {
    let store = open_store(db).await?;
    let credentials = store.load().await?;
    if credentials.is_empty() {
        println!("Not logged in.");
        return Ok(());
    }

    let now = Utc::now();
    let state = credentials.expiry_state(now);
    println!(
        "Access token:  {}",
        describe(credentials.access_token.is_some(), credentials.access_expires_at, state.access_expired)
    );
    println!(
        "Refresh token: {}",
        describe(credentials.refresh_token.is_some(), credentials.refresh_expires_at, state.refresh_expired)
    );
    Ok(())
}

pub async fn run_fetch(db: Option<PathBuf>, args: FetchArgs) -> Result<(), CommandError> {
    let client = connect(db).await?;
    let body: Value = client.get_json(&args.path).await?;
    print_table(&body, &args.table)
}

pub fn run_show(args: ShowArgs) -> Result<(), CommandError> {
    let text = fs::read_to_string(&args.file)
        .map_err(|e| CommandError::Input(format!("{}: {}", args.file.display(), e)))?;
    let body: Value = serde_json::from_str(&text)
        .map_err(|e| CommandError::Input(format!("{}: invalid JSON: {}", args.file.display(), e)))?;
    print_table(&body, &args.table)
}

async fn open_store(db: Option<PathBuf>) -> Result<SqliteCredentialStore, CommandError> {
    let path = db.unwrap_or_else(|| PathBuf::from(DEFAULT_DB));
    log::debug!("opening credential store {}", path.display());
    Ok(SqliteCredentialStore::open(&path).await?)
}

async fn connect(db: Option<PathBuf>) -> Result<LodgingClient, CommandError> {
    let config = ClientConfig::from_env()?;
    let store = open_store(db).await?;

    let client = LodgingClient::builder()
        .config(config)
        .store(store)
        .notifier(|n: Notification| eprintln!("[{}] {}", n.level, n.message))
        .build()?;
    Ok(client)
}

fn describe(present: bool, expires_at: Option<DateTime<Utc>>, expired: bool) -> String {
    match (present, expires_at) {
        (false, _) => "none".to_string(),
        (true, None) => "present, no expiry".to_string(),
        (true, Some(at)) if expired => format!("expired at {}", at.to_rfc3339()),
        (true, Some(at)) => format!("valid until {}", at.to_rfc3339()),
    }
}

/// Finds the record array in a response body.
///
/// Without a pointer: the body itself if it is an array, then `data`, then
/// the first array field inside `data`.
fn extract_records<'a>(body: &'a Value, pointer: Option<&str>) -> &'a Value {
    if let Some(pointer) = pointer {
        return body.pointer(pointer).unwrap_or(&Value::Null);
    }
    if body.is_array() {
        return body;
    }
    match body.get("data") {
        Some(data) if data.is_array() => data,
        Some(Value::Object(fields)) => fields.values().find(|v| v.is_array()).unwrap_or(&Value::Null),
        _ => &Value::Null,
    }
}

fn parse_column(spec: &str) -> Column<Value> {
    let (key, header) = spec.split_once(':').unwrap_or((spec, spec));
    Column::new(key.trim(), header.trim()).sortable().filterable()
}

fn print_table(body: &Value, args: &TableArgs) -> Result<(), CommandError> {
    let records = match extract_records(body, args.pointer.as_deref()) {
        Value::Array(items) => items.clone(),
        _ => {
            log::warn!("no record array found in response");
            Vec::new()
        }
    };

    let columns: Vec<Column<Value>> = args.columns.iter().map(|c| parse_column(c)).collect();
    let mut options = GridOptions::default()
        .with_pagination(!args.no_pagination)
        .with_frozen_column_count(args.frozen);
    if let Some(size) = args.page_size {
        if !options.page_size_options.contains(&size) {
            options.page_size_options.push(size);
        }
        options = options.with_default_page_size(size);
    }

    let mut grid = DataGrid::new(columns, records).with_options(options);

    for filter in &args.filters {
        let (key, text) = filter
            .split_once('=')
            .ok_or_else(|| CommandError::Input(format!("invalid filter '{}', expected KEY=TEXT", filter)))?;
        grid.set_filter(key.trim(), text);
    }

    if let Some(sort) = &args.sort {
        let (key, descending) = match sort.rsplit_once(':') {
            Some((key, dir)) if dir.eq_ignore_ascii_case("desc") => (key, true),
            Some((key, dir)) if dir.eq_ignore_ascii_case("asc") => (key, false),
            _ => (sort.as_str(), false),
        };
        if !grid.click_header(key) {
            return Err(CommandError::Input(format!("unknown sort column '{}'", key)));
        }
        if descending && grid.state().sort.direction == SortDirection::Ascending {
            grid.click_header(key);
        }
    }

    grid.go_to_page(args.page);
    print!("{}", grid.render_text());
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_extract_records() {
        let array = json!([{ "id": 1 }]);
        assert_eq!(extract_records(&array, None), &array);

        let wrapped = json!({ "message": "OK", "data": { "HOTEL_LIST": [{ "id": 1 }], "count": 1 } });
        assert_eq!(extract_records(&wrapped, None), &json!([{ "id": 1 }]));
        assert_eq!(extract_records(&wrapped, Some("/data/count")), &json!(1));
        assert_eq!(extract_records(&json!({ "x": 1 }), None), &Value::Null);
    }

    #[test]
    fn test_parse_column() {
        let column = parse_column("roomNo:Room");
        assert_eq!((column.key.as_str(), column.header.as_str()), ("roomNo", "Room"));
        assert!(column.sortable && column.filterable);

        let plain = parse_column("name");
        assert_eq!(plain.header, "name");
    }
}
