//! CLI Argument Parsing
//!
//! CLIの引数解析

use clap::Parser;

use crate::application::dto::merge_request::DEFAULT_UNIQUE_COLUMN;

/// ステージングテーブルの新規行を本番テーブルへマージするCLI
#[derive(Parser, Debug, Clone)]
#[command(name = "loc-prodifier")]
#[command(
    about = "Merge rows from a staging table into a production table without duplicates",
    long_about = None
)]
pub struct Args {
    /// Dataset holding both tables
    #[arg(long = "dataset_id")]
    pub dataset_id: String,

    /// Staging (source) table
    #[arg(long = "staging_table_id")]
    pub staging_table_id: String,

    /// Production (target) table
    #[arg(long = "prod_table_id")]
    pub prod_table_id: String,

    /// Column used to detect rows already present in production
    #[arg(long = "unique_column", default_value = DEFAULT_UNIQUE_COLUMN)]
    pub unique_column: String,

    /// Authenticate with a service account key file instead of ambient credentials
    #[arg(long)]
    pub local: bool,

    /// Project ID (falls back to the config file, then to the credentials)
    #[arg(long = "project_id", env = "GCP_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Service account key file used with --local [default: secret.json]
    #[arg(long = "credentials_path", env = "GCP_CREDENTIALS_PATH")]
    pub credentials_path: Option<String>,

    /// Job location [default: US]
    #[arg(long)]
    pub location: Option<String>,

    /// Maximum time to wait for the merge job, in seconds
    #[arg(long = "timeout_secs")]
    pub timeout_secs: Option<u64>,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<String>,
}
