use crate::config::{EntryOrder, ReadErrorPolicy};
use crate::error::{AppError, Result};
use crate::rules::{Exclusion, ExclusionRules};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

pub const RECORD_DELIMITER: &str = "==============================";
pub const RECORD_PATH_PREFIX: &str = "FILE: ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectOptions {
    pub entry_order: EntryOrder,
    pub follow_symlinks: bool,
    pub on_read_error: ReadErrorPolicy,
    /// Never emitted, even when it passes every rule. Used for the output file itself.
    pub skip_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectSummary {
    pub files_written: usize,
    pub bytes_written: u64,
    pub dirs_skipped: usize,
    pub files_skipped: usize,
    pub unreadable: Vec<PathBuf>,
}

/// One visited entry and what the filter decided about it. Paths are relative
/// to the source directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedEntry {
    pub path: PathBuf,
    pub is_dir: bool,
    pub included: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<Exclusion>,
}

enum Visit<'a> {
    Dir {
        entry: &'a DirEntry,
        exclusion: Option<Exclusion>,
    },
    File {
        entry: &'a DirEntry,
        exclusion: Option<Exclusion>,
    },
    Failed {
        path: PathBuf,
        error: AppError,
    },
}

/// Resolves the source directory to an absolute, canonical path.
pub fn locate_source(source: &Path) -> Result<PathBuf> {
    if !source.exists() {
        return Err(AppError::SourceNotFound {
            path: source.to_path_buf(),
        });
    }
    let resolved = source.canonicalize().map_err(|e| {
        AppError::Io(io::Error::new(
            e.kind(),
            format!("Failed to canonicalize source '{}': {}", source.display(), e),
        ))
    })?;
    if !resolved.is_dir() {
        return Err(AppError::InvalidArgument(format!(
            "Source is not a directory: {}",
            resolved.display()
        )));
    }
    Ok(resolved)
}

/// Walks `source` depth-first and writes one framed record per included file
/// to `writer`. Only one file's content is held in memory at a time.
pub fn collect_tree<W: Write>(
    source: &Path,
    rules: &ExclusionRules,
    options: &CollectOptions,
    writer: &mut W,
) -> Result<CollectSummary> {
    let source = locate_source(source)?;
    log::info!("Collecting files under: {}", source.display());

    let mut summary = CollectSummary::default();
    walk_source(&source, rules, options, |visit| {
        match visit {
            Visit::Dir {
                entry,
                exclusion: Some(reason),
            } => {
                log::trace!("Skipping directory ({}): {}", reason, entry.path().display());
                summary.dirs_skipped += 1;
            }
            Visit::Dir { .. } => {}
            Visit::File {
                entry,
                exclusion: Some(reason),
            } => {
                log::trace!("Skipping file ({}): {}", reason, entry.path().display());
                summary.files_skipped += 1;
            }
            Visit::File {
                entry,
                exclusion: None,
            } => match read_text(entry.path()) {
                Ok(content) => {
                    write_record(writer, entry.path(), &content)?;
                    summary.files_written += 1;
                    summary.bytes_written += content.len() as u64;
                    log::trace!("Wrote {}", entry.path().display());
                }
                Err(error) => {
                    tolerate(options.on_read_error, &mut summary, entry.path(), error)?;
                }
            },
            Visit::Failed { path, error } => {
                tolerate(options.on_read_error, &mut summary, &path, error)?;
            }
        }
        Ok(())
    })?;

    log::info!(
        "Collection complete: {} files written, {} files and {} directories skipped.",
        summary.files_written,
        summary.files_skipped,
        summary.dirs_skipped
    );
    Ok(summary)
}

/// Runs [`collect_tree`] into `output_file`, truncating it first and creating
/// missing parent directories. The source is checked before anything is created.
pub fn collect_to_file(
    source: &Path,
    rules: &ExclusionRules,
    options: &CollectOptions,
    output_file: &Path,
) -> Result<CollectSummary> {
    let source = locate_source(source)?;

    if let Some(parent) = output_file.parent() {
        fs::create_dir_all(parent).map_err(|e| AppError::DirCreation {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let file = File::create(output_file).map_err(|e| AppError::FileWrite {
        path: output_file.to_path_buf(),
        source: e,
    })?;

    let mut options = options.clone();
    if options.skip_path.is_none() {
        options.skip_path = Some(canonical_output_path(output_file));
    }

    let mut writer = BufWriter::new(file);
    let summary =
        collect_tree(&source, rules, &options, &mut writer).map_err(|e| match e {
            AppError::Io(source) => AppError::FileWrite {
                path: output_file.to_path_buf(),
                source,
            },
            other => other,
        })?;
    writer.flush().map_err(|e| AppError::FileWrite {
        path: output_file.to_path_buf(),
        source: e,
    })?;
    Ok(summary)
}

/// Absolute form of `output_file` as the walker will see it. Works before the
/// file exists by resolving its parent directory instead.
pub fn canonical_output_path(output_file: &Path) -> PathBuf {
    if let Ok(resolved) = output_file.canonicalize() {
        return resolved;
    }
    match (output_file.parent(), output_file.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map(|dir| dir.join(name))
            .unwrap_or_else(|_| output_file.to_path_buf()),
        _ => output_file.to_path_buf(),
    }
}

/// Same walk and filter as [`collect_tree`], without reading or writing anything.
pub fn plan_tree(
    source: &Path,
    rules: &ExclusionRules,
    options: &CollectOptions,
) -> Result<Vec<PlannedEntry>> {
    let source = locate_source(source)?;
    log::debug!("Planning collection under: {}", source.display());

    let relative = |path: &Path| path.strip_prefix(&source).unwrap_or(path).to_path_buf();
    let mut planned = Vec::new();
    walk_source(&source, rules, options, |visit| {
        let (path, is_dir, reason) = match visit {
            Visit::Dir { entry, exclusion } => (entry.path().to_path_buf(), true, exclusion),
            Visit::File { entry, exclusion } => (entry.path().to_path_buf(), false, exclusion),
            Visit::Failed { path, error } => match options.on_read_error {
                ReadErrorPolicy::Abort => return Err(error),
                ReadErrorPolicy::Skip => {
                    log::warn!("Unreadable path {}: {}", path.display(), error);
                    planned.push(PlannedEntry {
                        path: relative(&path),
                        is_dir: false,
                        included: false,
                        reason: Some(Exclusion::Unreadable),
                    });
                    return Ok(());
                }
            },
        };
        planned.push(PlannedEntry {
            path: relative(&path),
            is_dir,
            included: reason.is_none(),
            reason,
        });
        Ok(())
    })?;
    Ok(planned)
}

fn walk_source<F>(
    source: &Path,
    rules: &ExclusionRules,
    options: &CollectOptions,
    mut on_visit: F,
) -> Result<()>
where
    F: FnMut(Visit<'_>) -> Result<()>,
{
    let mut walker = WalkDir::new(source)
        .follow_links(options.follow_symlinks)
        .min_depth(1);
    if options.entry_order == EntryOrder::Name {
        walker = walker.sort_by_file_name();
    }

    let mut entries = walker.into_iter();
    while let Some(entry_result) = entries.next() {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(source).to_path_buf();
                on_visit(Visit::Failed {
                    path,
                    error: AppError::from(e),
                })?;
                continue;
            }
        };

        if entry.file_type().is_dir() {
            let exclusion = check_dir_entry(&entry, rules);
            if exclusion.is_some() {
                entries.skip_current_dir();
            }
            on_visit(Visit::Dir {
                entry: &entry,
                exclusion,
            })?;
        } else {
            let exclusion = check_file_entry(&entry, rules, options.skip_path.as_deref());
            on_visit(Visit::File {
                entry: &entry,
                exclusion,
            })?;
        }
    }
    Ok(())
}

fn check_dir_entry(entry: &DirEntry, rules: &ExclusionRules) -> Option<Exclusion> {
    let name = entry.file_name().to_string_lossy();
    let parent_name = entry
        .path()
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy());
    rules.check_dir(&name, parent_name.as_deref())
}

fn check_file_entry(
    entry: &DirEntry,
    rules: &ExclusionRules,
    skip_path: Option<&Path>,
) -> Option<Exclusion> {
    let file_type = entry.file_type();
    if file_type.is_symlink() {
        // Only reached when links are not followed.
        if entry.path().is_dir() {
            return Some(Exclusion::SymlinkedDir);
        }
    } else if !file_type.is_file() {
        return Some(Exclusion::SpecialFile);
    }

    let name = entry.file_name().to_string_lossy();
    if let Some(reason) = rules.check_file(&name) {
        return Some(reason);
    }
    if skip_path.is_some_and(|skip| skip == entry.path()) {
        return Some(Exclusion::OutputFile);
    }
    None
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| AppError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    String::from_utf8(bytes).map_err(|_| AppError::FileDecode {
        path: path.to_path_buf(),
    })
}

fn write_record<W: Write>(writer: &mut W, path: &Path, content: &str) -> io::Result<()> {
    write!(
        writer,
        "\n\n{delim}\n{prefix}{path}\n{delim}\n\n",
        delim = RECORD_DELIMITER,
        prefix = RECORD_PATH_PREFIX,
        path = path.display()
    )?;
    writer.write_all(content.as_bytes())
}

fn tolerate(
    policy: ReadErrorPolicy,
    summary: &mut CollectSummary,
    path: &Path,
    error: AppError,
) -> Result<()> {
    match policy {
        ReadErrorPolicy::Abort => Err(error),
        ReadErrorPolicy::Skip => {
            log::warn!("Skipping unreadable path {}: {}", path.display(), error);
            summary.unreadable.push(path.to_path_buf());
            Ok(())
        }
    }
}
