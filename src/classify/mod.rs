//! Sorting raw images into category directories
//!
//! Two interchangeable strategies implement [`ImageClassifier`]:
//! [`SizeHeuristic`] guesses from image dimensions, [`StaticMapping`] follows
//! a curated filename table. The caller picks one.

mod mapping;
mod size;

pub use mapping::StaticMapping;
pub use size::SizeHeuristic;

use crate::catalog::Category;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A strategy that files images from a raw directory into `<organized>/<category>/`
pub trait ImageClassifier {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn organize(&self, raw_dir: &Path, organized_dir: &Path) -> Result<ClassifySummary>;
}

/// Outcome of one classification run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifySummary {
    /// Files written, per category
    pub written: BTreeMap<Category, Vec<PathBuf>>,
    /// Inputs ignored without error
    pub skipped: usize,
    /// Inputs that failed to decode, convert or write
    pub failed: usize,
}

impl ClassifySummary {
    pub fn record(&mut self, category: Category, path: PathBuf) {
        self.written.entry(category).or_default().push(path);
    }

    pub fn total_written(&self) -> usize {
        self.written.values().map(Vec::len).sum()
    }
}

/// Create `<organized>/<category>` for every category
pub fn create_category_dirs(organized_dir: &Path) -> Result<()> {
    for category in Category::ALL {
        let dir = organized_dir.join(category.as_str());
        std::fs::create_dir_all(&dir).map_err(|source| Error::CreateDir { path: dir, source })?;
    }
    Ok(())
}

/// Regular files in `dir` whose name matches `*.png`, sorted by name
pub fn list_png_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = glob::Pattern::new("*.png").expect("static glob pattern is valid");
    let entries = std::fs::read_dir(dir).map_err(|source| Error::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue, // Skip entries we can't read
        };

        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| pattern.matches(name));
        if matches {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
