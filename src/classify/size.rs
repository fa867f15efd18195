//! Category guessed from image dimensions

use super::{create_category_dirs, list_png_files, ClassifySummary, ImageClassifier};
use crate::config::SizeTable;
use crate::error::Result;
use std::path::Path;

/// Copies each raw PNG into the category with the closest reference size
#[derive(Debug, Clone, Default)]
pub struct SizeHeuristic {
    table: SizeTable,
}

impl SizeHeuristic {
    pub fn new(table: SizeTable) -> Self {
        Self { table }
    }
}

impl ImageClassifier for SizeHeuristic {
    fn name(&self) -> &'static str {
        "size-heuristic"
    }

    fn organize(&self, raw_dir: &Path, organized_dir: &Path) -> Result<ClassifySummary> {
        create_category_dirs(organized_dir)?;

        let mut summary = ClassifySummary::default();
        for path in list_png_files(raw_dir)? {
            let (width, height) = match image::image_dimensions(&path) {
                Ok(dims) => dims,
                Err(e) => {
                    tracing::error!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read image size"
                    );
                    summary.failed += 1;
                    continue;
                }
            };

            let Some(category) = self.table.nearest(width, height) else {
                summary.skipped += 1;
                continue;
            };

            // list_png_files only yields named files
            let Some(file_name) = path.file_name() else {
                continue;
            };
            let dest = organized_dir.join(category.as_str()).join(file_name);
            match std::fs::copy(&path, &dest) {
                Ok(_) => {
                    tracing::info!(
                        width,
                        height,
                        "Copied {} to {}/",
                        file_name.to_string_lossy(),
                        category
                    );
                    summary.record(category, dest);
                }
                Err(e) => {
                    tracing::error!(path = %path.display(), error = %e, "Failed to copy image");
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use crate::config::SizeRule;
    use image::{DynamicImage, RgbImage};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();
        path
    }

    #[test]
    fn test_routes_by_nearest_size() {
        let raw = tempfile::tempdir().unwrap();
        let organized = tempfile::tempdir().unwrap();
        write_png(raw.path(), "page_1_img_1.png", 410, 505);
        write_png(raw.path(), "page_2_img_1.png", 610, 590);
        write_png(raw.path(), "page_3_img_1.png", 720, 880);

        let summary = SizeHeuristic::default()
            .organize(raw.path(), organized.path())
            .unwrap();

        assert_eq!(summary.total_written(), 3);
        assert!(organized.path().join("neurocranium/page_1_img_1.png").is_file());
        assert!(organized.path().join("viscerocranium/page_2_img_1.png").is_file());
        assert!(organized.path().join("sutures/page_3_img_1.png").is_file());
    }

    #[test]
    fn test_copies_without_touching_raw() {
        let raw = tempfile::tempdir().unwrap();
        let organized = tempfile::tempdir().unwrap();
        let source = write_png(raw.path(), "page_1_img_1.png", 400, 500);
        let before = std::fs::read(&source).unwrap();

        SizeHeuristic::default()
            .organize(raw.path(), organized.path())
            .unwrap();

        assert_eq!(std::fs::read(&source).unwrap(), before);
        assert_eq!(
            std::fs::read(organized.path().join("neurocranium/page_1_img_1.png")).unwrap(),
            before
        );
    }

    #[test]
    fn test_ignores_non_png_and_survives_corrupt_png() {
        let raw = tempfile::tempdir().unwrap();
        let organized = tempfile::tempdir().unwrap();
        std::fs::write(raw.path().join("readme.txt"), b"hello").unwrap();
        std::fs::write(raw.path().join("broken.png"), b"not a png").unwrap();
        write_png(raw.path(), "page_4_img_1.png", 600, 600);

        let summary = SizeHeuristic::default()
            .organize(raw.path(), organized.path())
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(
            summary.written[&Category::Viscerocranium],
            vec![organized.path().join("viscerocranium/page_4_img_1.png")]
        );
        assert!(!organized.path().join("neurocranium/readme.txt").exists());
    }

    #[test]
    fn test_custom_table_tie_goes_to_first_rule() {
        let raw = tempfile::tempdir().unwrap();
        let organized = tempfile::tempdir().unwrap();
        write_png(raw.path(), "page_1_img_1.png", 200, 200);
        let classifier = SizeHeuristic::new(SizeTable::new(vec![
            SizeRule::new(150, 200, Category::Sutures),
            SizeRule::new(250, 200, Category::Neurocranium),
        ]));

        let summary = classifier.organize(raw.path(), organized.path()).unwrap();

        let categories: Vec<Category> = summary.written.keys().copied().collect();
        assert_eq!(categories, vec![Category::Sutures]);
    }
}
