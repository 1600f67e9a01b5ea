use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use clap::Parser;

use snaptrail::cli::{Cli, Command, DensityArgs, ForecastArgs, GotoArgs, ListArgs, TimelineArgs};
use snaptrail::config::Config;
use snaptrail::report::{
    json, table, BucketReport, DensityReport, ForecastReport, GotoReport, TimelineReport,
};
use snaptrail::source::sqlite::SqliteSource;
use snaptrail::source::{DensityPeriod, DiskStats, SnapshotSource};
use snaptrail::timeline::cluster::{TimeRange, Timeline};
use snaptrail::timeline::filter::{self, MonthFilter, Window};
use snaptrail::timeline::project::{self, Severity};
use snaptrail::timeline::{aggregate, Job};
use snaptrail::util;

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            std::process::exit(1);
        }
    };

    let source = match SqliteSource::open(&config.index_path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!(
                "Error opening snapshot index {}: {e}",
                config.index_path.display()
            );
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::List(args) => run_list(&source, &config, &args),
        Command::Timeline(args) => run_timeline(&source, &config, &args),
        Command::Forecast(args) => run_forecast(&source, &config, &args),
        Command::Goto(args) => run_goto(&source, &config, &args),
        Command::Density(args) => run_density(&source, &config, &args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Load every job's snapshots from the index, optionally restricted to one
/// job. An unknown job id yields an empty job list with a stderr notice;
/// queries over nothing are well-defined, not errors.
fn load_jobs(
    source: &dyn SnapshotSource,
    job_filter: Option<&str>,
    verbose: bool,
) -> Result<Vec<Job>, Box<dyn std::error::Error>> {
    let mut refs = source.list_jobs()?;

    if let Some(wanted) = job_filter {
        refs.retain(|r| r.id == wanted);
        if refs.is_empty() {
            eprintln!("note: job '{wanted}' has no snapshots in the index");
        }
    }

    let mut jobs = Vec::new();
    for job_ref in refs {
        let snapshots = source.list_snapshots(&job_ref.id)?;
        if verbose {
            eprintln!("job {}: {} snapshots", job_ref.id, snapshots.len());
        }
        jobs.push(Job {
            id: job_ref.id,
            name: job_ref.name,
            snapshots: Some(snapshots),
        });
    }

    Ok(jobs)
}

fn job_filter<'a>(config: &'a Config, arg: &'a Option<String>) -> Option<&'a str> {
    arg.as_deref().or(config.default_job.as_deref())
}

/// "7d" / "30d" / "all" into a rolling window; sub-day durations round up
/// to one day.
fn parse_window(arg: &str) -> Result<Window, Box<dyn std::error::Error>> {
    if arg == "all" {
        return Ok(Window::All);
    }

    let duration = humantime::parse_duration(arg)?;
    let days = duration.as_secs().div_ceil(86_400).max(1);
    Ok(Window::Days(days))
}

/// "YYYY-MM-DD" or "YYYY-MM-DD HH:MM:SS", interpreted in local time.
fn parse_local_date(arg: &str) -> Result<i64, Box<dyn std::error::Error>> {
    let naive = NaiveDateTime::parse_from_str(arg, "%Y-%m-%d %H:%M:%S").or_else(|_| {
        NaiveDate::parse_from_str(arg, "%Y-%m-%d").map(|d| d.and_time(NaiveTime::MIN))
    })?;

    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("'{arg}' does not exist in the local timezone"))?;

    Ok(local.timestamp_millis())
}

fn run_list(
    source: &dyn SnapshotSource,
    config: &Config,
    args: &ListArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let jobs = load_jobs(source, job_filter(config, &args.job), config.verbose)?;
    let merged = aggregate::aggregate(&jobs);

    let listed = if let Some(year) = args.year {
        let month = match args.month {
            Some(m) if m <= 11 => MonthFilter::Month(m),
            Some(m) => return Err(format!("month must be 0-11, got {m}").into()),
            None => MonthFilter::All,
        };
        filter::filter_by_calendar(&merged, year, month)
    } else {
        let window = match &args.window {
            Some(arg) => parse_window(arg)?,
            None => Window::All,
        };
        let mut kept = filter::filter_by_window(&merged, window, util::now_ms());
        // list views read newest first
        kept.reverse();
        kept
    };

    if args.json {
        println!("{}", json::render(&listed));
    } else {
        print!("{}", table::render_list(&listed));
    }

    Ok(())
}

fn run_timeline(
    source: &dyn SnapshotSource,
    config: &Config,
    args: &TimelineArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let jobs = load_jobs(source, job_filter(config, &args.job), config.verbose)?;
    let merged = aggregate::aggregate(&jobs);

    let window = match &args.window {
        Some(arg) => parse_window(arg)?,
        None => Window::All,
    };
    let kept = filter::filter_by_window(&merged, window, util::now_ms());

    let range = TimeRange::covering(&kept, util::now_ms());
    let timeline = Timeline::new(kept, range);

    let threshold = args.threshold.unwrap_or(config.cluster_threshold_percent);
    let max_markers = args.max_markers.unwrap_or(config.max_markers);
    let markers = timeline.capped_markers(threshold, max_markers);

    let report = TimelineReport {
        range,
        total_snapshots: timeline.snapshots().len(),
        markers,
    };

    if args.json {
        println!("{}", json::render(&report));
    } else {
        print!("{}", table::render_timeline(&report));
    }

    Ok(())
}

fn run_forecast(
    source: &dyn SnapshotSource,
    config: &Config,
    args: &ForecastArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let jobs = load_jobs(source, job_filter(config, &args.job), config.verbose)?;
    let merged = aggregate::aggregate(&jobs);
    let history = project::cumulative_usage(&merged);

    let disk = if let (Some(capacity), Some(free)) = (args.capacity, args.free) {
        Some(DiskStats {
            total_bytes: capacity,
            available_bytes: free,
        })
    } else if let Some(dest) = &args.dest {
        // a destination that cannot be probed degrades to "capacity
        // unknown" rather than failing the whole forecast
        match source.disk_stats(dest) {
            Ok(stats) => Some(stats),
            Err(e) => {
                eprintln!("warning: could not probe {dest}: {e}");
                None
            }
        }
    } else {
        None
    };

    let forecast = project::forecast(&history, disk);
    let severity = Severity::of(forecast.days_until_full);
    let projected = project::project(&history, &forecast, args.horizon);

    let report = ForecastReport {
        forecast,
        severity,
        history,
        projected,
    };

    if args.json {
        println!("{}", json::render(&report));
    } else {
        print!("{}", table::render_forecast(&report));
    }

    Ok(())
}

fn run_goto(
    source: &dyn SnapshotSource,
    config: &Config,
    args: &GotoArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let target_ms = parse_local_date(&args.date)?;

    let jobs = load_jobs(source, job_filter(config, &args.job), config.verbose)?;
    let merged = aggregate::aggregate(&jobs);

    let range = TimeRange::covering(&merged, util::now_ms());
    let timeline = Timeline::new(merged, range);

    let Some(index) = timeline.closest_to_date(target_ms) else {
        println!("No snapshots in the index.");
        return Ok(());
    };

    let snapshot = timeline.snapshots()[index].clone();
    let report = GotoReport {
        target_ms,
        distance_ms: snapshot.timestamp() - target_ms,
        snapshot,
    };

    if args.json {
        println!("{}", json::render(&report));
    } else {
        print!("{}", table::render_goto(&report));
    }

    Ok(())
}

fn run_density(
    source: &dyn SnapshotSource,
    config: &Config,
    args: &DensityArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    // --period asks the index itself; clap guarantees --job came with it
    if let (Some(period), Some(job_id)) = (&args.period, job_filter(config, &args.job)) {
        let period = match period.as_str() {
            "day" => DensityPeriod::Day,
            "year" => DensityPeriod::Year,
            _ => DensityPeriod::Month,
        };

        let report = BucketReport {
            job_id: job_id.to_string(),
            buckets: source.snapshot_density(job_id, period)?,
        };

        if args.json {
            println!("{}", json::render(&report));
        } else {
            print!("{}", table::render_buckets(&report));
        }
        return Ok(());
    }

    let jobs = load_jobs(source, job_filter(config, &args.job), config.verbose)?;
    let merged = aggregate::aggregate(&jobs);
    let years = filter::available_years(&merged);

    let Some(year) = args.year.or_else(|| years.first().copied()) else {
        println!("No snapshots in the index.");
        return Ok(());
    };

    let report = DensityReport {
        years,
        year,
        months: filter::month_density(&merged, year),
    };

    if args.json {
        println!("{}", json::render(&report));
    } else {
        print!("{}", table::render_density(&report));
    }

    Ok(())
}
