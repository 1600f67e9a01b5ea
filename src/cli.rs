use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "snaptrail")]
#[command(about = "Navigate backup snapshot timelines and forecast storage growth")]
#[command(version)]
pub struct Cli {
    /// Path to the snapshot index database (defaults to the platform data dir)
    #[arg(long, global = true)]
    pub index: Option<PathBuf>,

    /// Show detailed output including diagnostics
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List snapshots, newest first
    List(ListArgs),

    /// Render the clustered timeline ruler
    Timeline(TimelineArgs),

    /// Forecast storage growth and days until the destination fills
    Forecast(ForecastArgs),

    /// Jump to the snapshot closest to a date
    Goto(GotoArgs),

    /// Snapshot counts per calendar bucket
    Density(DensityArgs),
}

#[derive(Parser)]
pub struct ListArgs {
    /// Restrict to one job (defaults to all jobs merged)
    #[arg(long)]
    pub job: Option<String>,

    /// Keep only snapshots from this calendar year
    #[arg(long)]
    pub year: Option<i32>,

    /// Keep only snapshots from this month of --year (0 = January, 11 = December)
    #[arg(long, requires = "year")]
    pub month: Option<u32>,

    /// Rolling window like "7d", "30d", "90d", "365d", or "all"
    #[arg(long, conflicts_with = "year")]
    pub window: Option<String>,

    /// Output as JSON instead of table
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct TimelineArgs {
    /// Restrict to one job (defaults to all jobs merged)
    #[arg(long)]
    pub job: Option<String>,

    /// Rolling window like "7d", "30d", "90d", "365d", or "all"
    #[arg(long)]
    pub window: Option<String>,

    /// Cluster proximity threshold in percent of track width
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Cap on rendered markers before down-sampling kicks in
    #[arg(long)]
    pub max_markers: Option<usize>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ForecastArgs {
    /// Restrict to one job (defaults to all jobs merged)
    #[arg(long)]
    pub job: Option<String>,

    /// Destination path to probe for disk capacity
    #[arg(long, conflicts_with_all = ["capacity", "free"])]
    pub dest: Option<String>,

    /// Total capacity in bytes (overrides probing)
    #[arg(long, requires = "free")]
    pub capacity: Option<u64>,

    /// Free space in bytes (overrides probing)
    #[arg(long, requires = "capacity")]
    pub free: Option<u64>,

    /// Projected days to chart
    #[arg(long, default_value_t = 30)]
    pub horizon: usize,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct GotoArgs {
    /// Target date, "YYYY-MM-DD" or "YYYY-MM-DD HH:MM:SS" local time
    pub date: String,

    /// Restrict to one job (defaults to all jobs merged)
    #[arg(long)]
    pub job: Option<String>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Parser)]
pub struct DensityArgs {
    /// Restrict to one job (defaults to all jobs merged)
    #[arg(long)]
    pub job: Option<String>,

    /// Year to break down per month (defaults to the most recent year)
    #[arg(long)]
    pub year: Option<i32>,

    /// Query the index directly for day/month/year buckets (requires --job)
    #[arg(long, requires = "job", value_parser = ["day", "month", "year"])]
    pub period: Option<String>,

    /// Output as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
