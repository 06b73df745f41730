//! CLI argument definitions.

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
    name = "lodging",
    version,
    about = "Query the lodging management API and browse results as a table",
    long_about = "Query the lodging management API and browse results as a table.\n\n\
                  Configuration is read from LODGING_* environment variables \
                  (a .env file is loaded if present)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Credential database path.
    #[arg(long = "db", value_name = "PATH", env = "LODGING_CREDENTIALS_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Log level.
    #[arg(long = "log-level", value_enum, default_value = "warn", global = true)]
    pub log_level: LogLevelArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in and store the returned tokens.
    Login(LoginArgs),

    /// Log out and clear stored tokens.
    Logout,

    /// Show stored token expiry.
    Status,

    /// GET an API path and show the records as a table.
    Fetch(FetchArgs),

    /// Show records from a local JSON file as a table.
    Show(ShowArgs),
}

#[derive(Args)]
pub struct LoginArgs {
    /// Account email.
    #[arg(long, env = "LODGING_EMAIL")]
    pub email: String,

    /// Account password.
    #[arg(long, env = "LODGING_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Ask for a long-lived session.
    #[arg(long = "remember-me")]
    pub remember_me: bool,
}

#[derive(Args)]
pub struct FetchArgs {
    /// API path, e.g. /api/Hotel/GetHotelList.
    #[arg(value_name = "PATH")]
    pub path: String,

    #[command(flatten)]
    pub table: TableArgs,
}

#[derive(Args)]
pub struct ShowArgs {
    /// JSON file holding an array of records (or an API response).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub table: TableArgs,
}

#[derive(Args, Clone)]
pub struct TableArgs {
    /// Columns as `key` or `key:Header`, comma separated.
    #[arg(long, short = 'c', value_delimiter = ',', required = true)]
    pub columns: Vec<String>,

    /// JSON pointer to the record array inside the response.
    #[arg(long = "pointer", value_name = "POINTER")]
    pub pointer: Option<String>,

    /// Column filter as `key=text`; repeatable.
    #[arg(long = "filter", short = 'f', value_name = "KEY=TEXT")]
    pub filters: Vec<String>,

    /// Sort column, optionally suffixed with `:desc`.
    #[arg(long = "sort", short = 's', value_name = "KEY[:desc]")]
    pub sort: Option<String>,

    /// 1-based page number.
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Records per page.
    #[arg(long = "page-size")]
    pub page_size: Option<usize>,

    /// Number of frozen leading columns.
    #[arg(long, default_value_t = 0)]
    pub frozen: usize,

    /// Show all records on one page.
    #[arg(long = "no-pagination")]
    pub no_pagination: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
