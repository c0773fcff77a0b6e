
pub const FALLBACK_FOLDER_NAME: &str = "output";

const SRC_SEGMENT: &str = "src";

/// Picks the output folder name for a source path.
///
/// An explicit, non-blank name is returned unchanged. Otherwise the segment
/// just before the last `src` segment wins (`.../projectX/src/app` gives
/// `projectX`), falling back to the final segment and then to
/// [`FALLBACK_FOLDER_NAME`]. Never returns an empty string.
pub fn resolve_output_folder_name(explicit: Option<&str>, source: &str) -> String {
    if let Some(name) = explicit.filter(|n| !n.trim().is_empty()) {
        log::trace!("Using explicit output folder name '{}'", name);
        return name.to_string();
    }

    let normalized = source.replace('\\', "/");
    let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();

    let src_index = segments
        .iter()
        .rposition(|s| s.eq_ignore_ascii_case(SRC_SEGMENT));

    let derived = match src_index {
        Some(idx) if idx > 0 => Some(segments[idx - 1]),
        _ => segments.last().copied(),
    };

    let name = derived.unwrap_or(FALLBACK_FOLDER_NAME).to_string();
    log::trace!("Derived output folder name '{}' from '{}'", name, source);
    name
}
