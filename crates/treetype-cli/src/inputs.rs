use anyhow::{Context, Result};
use std::path::PathBuf;
use treetype_engine::io::scan_source_files;

/// Expands command-line inputs into the list of files to encode.
///
/// Directories are searched recursively for supported extensions. Arguments
/// containing glob characters (`*`, `?`, `[`) are expanded; other arguments
/// are kept as literal paths even if they do not exist, so the batch reports
/// them alongside the other per-file errors.
pub fn resolve_inputs(args: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for arg in args {
        if arg.contains('*') || arg.contains('?') || arg.contains('[') {
            let paths = glob::glob(arg).with_context(|| format!("Invalid glob pattern: {arg}"))?;

            let mut match_count = 0;
            for path in paths {
                let path = path.with_context(|| format!("Failed to read glob match for: {arg}"))?;
                if path.is_file() {
                    files.push(path);
                    match_count += 1;
                }
            }

            if match_count == 0 {
                log::warn!("No files matched pattern: {arg}");
            }
        } else {
            let path = PathBuf::from(arg);
            if path.is_dir() {
                let found = scan_source_files(&path)?;
                if found.is_empty() {
                    log::warn!("No supported source files under {}", path.display());
                }
                files.extend(found);
            } else {
                files.push(path);
            }
        }
    }

    Ok(files)
}
