use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Load, extend, filter, and export spreadsheets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Preview the first few rows of a spreadsheet in a formatted table
    Preview(PreviewArgs),
    /// List columns with their categorical/freeform classification
    Columns(ColumnsArgs),
    /// Append one validated row and export the result
    Append(AppendArgs),
    /// Filter rows by case-insensitive column equality and print or export them
    Filter(FilterArgs),
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input spreadsheet (.xlsx, .xls, .ods, .csv; '-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
    /// Session configuration YAML
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    /// Input spreadsheet (.xlsx, .xls, .ods, .csv; '-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Emit profiles as JSON instead of a table
    #[arg(long)]
    pub json: bool,
    /// Session configuration YAML
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct AppendArgs {
    /// Input spreadsheet (.xlsx, .xls, .ods, .csv; '-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Destination file; .csv/.tsv exports delimited text, anything else xlsx
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    /// Field values of the form `column=value`; omitted columns become NA
    #[arg(long = "set", action = clap::ArgAction::Append)]
    pub values: Vec<String>,
    /// Session configuration YAML
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Input spreadsheet (.xlsx, .xls, .ods, .csv; '-' for stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Required values such as `Name=bob`; all conditions must hold
    #[arg(long = "where", action = clap::ArgAction::Append)]
    pub filters: Vec<String>,
    /// Export matching rows here instead of printing them
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Session configuration YAML
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
