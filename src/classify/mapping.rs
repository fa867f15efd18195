//! Category and bone name taken from a curated filename table

use super::{create_category_dirs, ClassifySummary, ImageClassifier};
use crate::codec;
use crate::config::{BoneMapping, MappingEntry};
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Re-encodes each curated raw file as `<organized>/<category>/<bone>[_n].png`
///
/// Curated rather than guessed, so prefer it over [`super::SizeHeuristic`]
/// when the table covers the document.
#[derive(Debug, Clone, Default)]
pub struct StaticMapping {
    mapping: BoneMapping,
}

impl StaticMapping {
    pub fn new(mapping: BoneMapping) -> Self {
        Self { mapping }
    }

    fn convert(&self, source: &Path, dest: &Path) -> Result<()> {
        let image = codec::without_alpha(image::open(source)?);
        let png = codec::encode_png(&image, true)?;
        std::fs::write(dest, png)?;
        Ok(())
    }

    fn dest_path(organized_dir: &Path, entry: &MappingEntry<'_>) -> PathBuf {
        organized_dir
            .join(entry.category.as_str())
            .join(entry.dest_filename())
    }
}

impl ImageClassifier for StaticMapping {
    fn name(&self) -> &'static str {
        "static-mapping"
    }

    fn organize(&self, raw_dir: &Path, organized_dir: &Path) -> Result<ClassifySummary> {
        create_category_dirs(organized_dir)?;

        let mut summary = ClassifySummary::default();
        for entry in self.mapping.entries() {
            let source = raw_dir.join(entry.source);
            if !source.is_file() {
                tracing::debug!(
                    path = %source.display(),
                    bone = %entry.bone,
                    "Mapped file not present"
                );
                summary.skipped += 1;
                continue;
            }

            let dest = Self::dest_path(organized_dir, &entry);
            match self.convert(&source, &dest) {
                Ok(()) => {
                    tracing::info!("Processed: {}", dest.display());
                    summary.record(entry.category, dest);
                }
                Err(e) => {
                    tracing::error!("Error processing {}: {}", source.display(), e);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}
