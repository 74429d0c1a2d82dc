//! Discovery of schedule spreadsheets on the local filesystem.
//!
//! Files are returned in processing order: grouped by the first include glob
//! they match (in config order), then sorted by relative path within each
//! group. With the default globs every `.xlsx` file is processed before any
//! `.csv` file. The hierarchy builder keeps the week metadata of the first
//! row it sees, so this order is observable.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::config::DataConfig;

/// A discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to the data root, with `/` separators.
    pub relative: String,
    /// Index of the include glob that selected this file.
    pub glob_index: usize,
}

pub fn scan_data_dir(data: &DataConfig) -> Result<Vec<SourceFile>> {
    let root = &data.root;
    if !root.is_dir() {
        bail!("Data directory does not exist: {}", root.display());
    }

    let include_globs = data
        .include_globs
        .iter()
        .map(|pattern| compile_glob(pattern))
        .collect::<Result<Vec<_>>>()?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        // Excel lock files
        "**/~$*".to_string(),
    ];
    default_excludes.extend(data.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut walker = WalkDir::new(root).follow_links(data.follow_symlinks);
    if !data.recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if exclude_set.is_match(&rel_str) {
            continue;
        }

        let Some(glob_index) = include_globs.iter().position(|g| g.is_match(&rel_str)) else {
            continue;
        };

        files.push(SourceFile {
            path: path.to_path_buf(),
            relative: rel_str,
            glob_index,
        });
    }

    files.sort_by(|a, b| {
        a.glob_index
            .cmp(&b.glob_index)
            .then_with(|| a.relative.cmp(&b.relative))
    });

    Ok(files)
}

fn compile_glob(pattern: &str) -> Result<globset::GlobMatcher> {
    Ok(Glob::new(pattern)
        .with_context(|| format!("Invalid glob pattern: {}", pattern))?
        .compile_matcher())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?);
    }
    Ok(builder.build()?)
}
