use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use codecollect_core::{CollectSummary, OutputTarget, PlannedEntry};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

pub fn print_collect_report(target: &OutputTarget, summary: &CollectSummary, quiet: bool) {
    if quiet {
        return;
    }
    println!("{} Code extraction completed!", "✅".green());
    println!(
        "{:<16} {}",
        "Output folder:".green(),
        target.dir.display().to_string().blue()
    );
    println!(
        "{:<16} {}",
        "Output file:".green(),
        target.file.display().to_string().blue()
    );
    println!("{:<16} {}", "Folder name:".green(), target.folder_name.cyan());
    println!(
        "{:<16} {} files, {} ({} files and {} directories skipped)",
        "Collected:".green(),
        summary.files_written.to_string().cyan(),
        readable_size(summary.bytes_written).cyan(),
        summary.files_skipped,
        summary.dirs_skipped
    );

    if !summary.unreadable.is_empty() {
        eprintln!(
            "\n{}",
            "⚠️ Warning: Some paths could not be read and were skipped:".yellow()
        );
        for path in &summary.unreadable {
            eprintln!(" - {}", path.display());
        }
        eprintln!("---");
    }
}

pub fn print_planned_entries_table(entries: &[PlannedEntry]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Path").fg(Color::Green),
        Cell::new("Kind").fg(Color::Green),
        Cell::new("Decision").fg(Color::Green),
    ]);
    for entry in entries {
        let kind = if entry.is_dir { "dir" } else { "file" };
        let decision = match entry.reason {
            Some(reason) => Cell::new(format!("skip: {}", reason)).fg(Color::DarkGrey),
            None => Cell::new("include").fg(Color::Cyan),
        };
        table.add_row(vec![
            Cell::new(entry.path.display()),
            Cell::new(kind),
            decision,
        ]);
    }
    println!("{table}");
}

pub fn print_json<T: Serialize>(data: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(data).context("Failed to serialize to JSON")?;
    write_to_stdout(&content)
}

pub fn write_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let mut file =
        File::create(path).with_context(|| format!("Failed to create file {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to file {}", path.display()))?;
    Ok(())
}

/// Asks before replacing `path`. Quiet mode never overwrites.
pub fn confirm_overwrite(path: &Path, quiet: bool) -> Result<bool> {
    if quiet {
        anyhow::bail!(
            "Target file '{}' exists. Overwrite prevented in quiet mode.",
            path.display()
        );
    }
    print!(
        "{} File already exists at '{}'. Overwrite? [{}/{}] ",
        "⚠️".yellow(),
        path.display().to_string().cyan(),
        "y".green(),
        "N".red()
    );
    io::stdout().flush().context("Failed to flush stdout")?;
    let mut response = String::new();
    io::stdin()
        .read_line(&mut response)
        .context("Failed to read user input")?;
    Ok(response.trim().eq_ignore_ascii_case("y"))
}

pub fn readable_size(bytes: u64) -> String {
    Byte::from_u128(bytes as u128)
        .unwrap_or_default()
        .get_appropriate_unit(UnitType::Binary)
        .to_string()
}

fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_readable_size() {
        assert!(readable_size(0).ends_with('B'));
        assert!(readable_size(2048).contains("KiB"));
    }

    #[test]
    fn test_write_to_file_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a").join("b").join("codecollect.toml");
        write_to_file(&path, "[general]\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[general]\n");
    }

    #[test]
    fn test_confirm_overwrite_refuses_in_quiet_mode() {
        let temp = TempDir::new().unwrap();
        assert!(confirm_overwrite(temp.path(), true).is_err());
    }
}
