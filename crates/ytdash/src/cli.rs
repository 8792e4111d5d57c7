//! Command line arguments

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::str::FromStr;
use ytdash_common::VideoType;

/// YouTube channel dashboard
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path (YAML or TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level or filter directive; overrides the configured level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the channel's videos
    Table(TableArgs),
    /// Show a month of uploads as a calendar
    Calendar(CalendarArgs),
    /// Show view and upload statistics
    Stats,
    /// Show channel information
    Channel,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Newest first
    #[default]
    Published,
    /// Most viewed first
    Views,
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq, Default)]
pub struct TableArgs {
    /// Only show these types (repeatable)
    #[arg(short = 't', long = "type", value_parser = parse_video_type)]
    pub types: Vec<VideoType>,

    /// Sort order
    #[arg(short, long, value_enum, default_value_t = SortKey::Published)]
    pub sort: SortKey,

    /// Maximum number of rows
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(ClapArgs, Debug, Clone, PartialEq, Eq, Default)]
pub struct CalendarArgs {
    /// Month to show as YYYY-MM; defaults to the current month
    #[arg(short, long)]
    pub month: Option<YearMonth>,
}

/// A calendar month given as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("'{}' is not a month in YYYY-MM form", s);
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        if !(1..=12).contains(&month) {
            return Err(invalid());
        }

        Ok(Self { year, month })
    }
}

fn parse_video_type(s: &str) -> Result<VideoType, String> {
    s.parse::<VideoType>().map_err(|e| e.to_string())
}
