use std::path::PathBuf;
use std::process::Command;

use crate::source::DiskStats;

/// Default location of the snapshot index database
/// (~/.local/share/snaptrail/index.db or platform equivalent).
pub fn default_index_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let data_dir = directories::ProjectDirs::from("", "", "snaptrail")
        .ok_or("Could not determine data directory")?
        .data_dir()
        .to_path_buf();

    Ok(data_dir.join("index.db"))
}

/// Location of the optional config file
/// (~/.config/snaptrail/config.toml or platform equivalent).
pub fn config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "snaptrail")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Capacity of the filesystem containing `path`, via `df -k`.
/// 1024-byte blocks regardless of platform.
pub fn disk_stats(path: &str) -> Result<DiskStats, Box<dyn std::error::Error>> {
    let output = Command::new("df").args(["-k", "--", path]).output()?;

    if !output.status.success() {
        return Err(format!(
            "df failed for {path}: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )
        .into());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_df_output(&stdout).ok_or_else(|| format!("unparseable df output for {path}").into())
}

/// Parse `df -k` output: header line, then one data line whose second and
/// fourth columns are total and available 1K blocks. A long device name can
/// wrap the data onto a following line, so columns are gathered across lines.
fn parse_df_output(stdout: &str) -> Option<DiskStats> {
    let fields: Vec<&str> = stdout
        .lines()
        .skip(1)
        .flat_map(str::split_whitespace)
        .collect();

    // device, 1k-blocks, used, available
    let total_kb: u64 = fields.get(1)?.parse().ok()?;
    let available_kb: u64 = fields.get(3)?.parse().ok()?;

    Some(DiskStats {
        total_bytes: total_kb * 1024,
        available_bytes: available_kb * 1024,
    })
}
