//! Command-line surface

use crate::audit::Auditor;
use crate::catalog::Category;
use crate::classify::{ImageClassifier, SizeHeuristic, StaticMapping};
use crate::config::{AuditConfig, ExtractorConfig, KeywordSet};
use crate::extract::Extractor;
use crate::pdf::PdfReader;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "cranium-atlas",
    version,
    about = "Extract, organize and audit images from a cranium anatomy PDF"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write embedded images of at least 100x100 to <output_dir>/raw
    Extract {
        pdf_path: PathBuf,
        output_dir: PathBuf,
    },
    /// Copy raw images into the category with the closest reference size
    OrganizeSizes {
        raw_dir: PathBuf,
        organized_dir: PathBuf,
    },
    /// Re-encode curated raw images as <category>/<bone>.png
    OrganizeBones {
        raw_dir: PathBuf,
        organized_dir: PathBuf,
    },
    /// Report which bones mentioned in the PDF have matching images
    Audit {
        pdf_path: PathBuf,
        images_dir: PathBuf,
        /// Category whose bones are audited
        #[arg(default_value_t = Category::Neurocranium)]
        category: Category,
    },
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Extract {
            pdf_path,
            output_dir,
        } => extract(&pdf_path, &output_dir),
        Commands::OrganizeSizes {
            raw_dir,
            organized_dir,
        } => organize(&SizeHeuristic::default(), &raw_dir, &organized_dir),
        Commands::OrganizeBones {
            raw_dir,
            organized_dir,
        } => organize(&StaticMapping::default(), &raw_dir, &organized_dir),
        Commands::Audit {
            pdf_path,
            images_dir,
            category,
        } => audit(&pdf_path, &images_dir, category),
    }
}

fn extract(pdf_path: &Path, output_dir: &Path) -> anyhow::Result<()> {
    let document = PdfReader::open(pdf_path)
        .with_context(|| format!("Failed to open {}", pdf_path.display()))?;

    Extractor::new(ExtractorConfig::default())
        .run(&document, output_dir)
        .context("Extraction aborted")?;
    Ok(())
}

fn organize(
    classifier: &dyn ImageClassifier,
    raw_dir: &Path,
    organized_dir: &Path,
) -> anyhow::Result<()> {
    tracing::info!(strategy = classifier.name(), "Organizing {}", raw_dir.display());

    let summary = classifier
        .organize(raw_dir, organized_dir)
        .with_context(|| format!("Failed to organize {}", raw_dir.display()))?;

    tracing::info!(
        written = summary.total_written(),
        skipped = summary.skipped,
        failed = summary.failed,
        "Organizing finished"
    );
    Ok(())
}

fn audit(pdf_path: &Path, images_dir: &Path, category: Category) -> anyhow::Result<()> {
    tracing::info!("Analyzing PDF content and image coverage...");

    let document = PdfReader::open_with_text(pdf_path)
        .with_context(|| format!("Failed to open {}", pdf_path.display()))?;

    let auditor = Auditor::new(KeywordSet::for_category(category), AuditConfig::default());
    let report = auditor
        .run(&document, images_dir)
        .with_context(|| format!("Failed to audit {}", images_dir.display()))?;

    println!("{}", report);
    Ok(())
}
