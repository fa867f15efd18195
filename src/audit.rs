//! Coverage audit: which bones the text talks about, and which have images

use crate::catalog::Bone;
use crate::config::{AuditConfig, KeywordSet};
use crate::error::{Error, Result};
use crate::pdf::DocumentSource;
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

/// Paragraph that mentions a keyword
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    /// Page number (1-indexed)
    pub page: u32,
    /// Trimmed paragraph text
    pub excerpt: String,
}

/// All mentions of one keyword, in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMentions {
    pub bone: Bone,
    pub mentions: Vec<Mention>,
}

/// Result of an audit run
#[derive(Debug, Clone)]
pub struct CoverageReport {
    pub keywords: Vec<KeywordMentions>,
    /// Bones with at least one image whose filename contains the keyword
    pub covered: BTreeSet<Bone>,
    preview: AuditConfig,
}

impl CoverageReport {
    pub fn is_covered(&self, bone: Bone) -> bool {
        self.covered.contains(&bone)
    }

    pub fn mentions(&self, bone: Bone) -> &[Mention] {
        self.keywords
            .iter()
            .find(|k| k.bone == bone)
            .map(|k| k.mentions.as_slice())
            .unwrap_or(&[])
    }

    /// Keywords without a matching image
    pub fn missing(&self) -> impl Iterator<Item = Bone> + '_ {
        self.keywords
            .iter()
            .map(|k| k.bone)
            .filter(|bone| !self.covered.contains(bone))
    }
}

impl fmt::Display for CoverageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Content Coverage Analysis:")?;
        write!(f, "{}", "=".repeat(50))?;

        for entry in &self.keywords {
            writeln!(f)?;
            writeln!(f)?;
            writeln!(f, "{} Bone:", entry.bone.title())?;
            writeln!(f, "{}", "-".repeat(20))?;
            if self.is_covered(entry.bone) {
                writeln!(f, "✓ Has corresponding images")?;
            } else {
                writeln!(f, "✗ Missing images")?;
            }
            write!(f, "Content mentions: {}", entry.mentions.len())?;

            for mention in entry.mentions.iter().take(self.preview.preview_mentions) {
                // limit covers the page prefix too
                let line = format!("Page {}: {}", mention.page, mention.excerpt);
                write!(
                    f,
                    "\n  • {}...",
                    truncate_chars(&line, self.preview.preview_chars)
                )?;
            }
        }
        writeln!(f)
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Blank-line separated, trimmed, non-empty paragraphs
pub fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n").map(str::trim).filter(|p| !p.is_empty())
}

/// Collect every paragraph mentioning each keyword (case-insensitive)
///
/// Pages whose text cannot be read are logged and skipped.
pub fn find_mentions<D>(document: &D, keywords: &KeywordSet) -> Vec<KeywordMentions>
where
    D: DocumentSource + ?Sized,
{
    let mut found: Vec<KeywordMentions> = keywords
        .bones()
        .iter()
        .map(|&bone| KeywordMentions {
            bone,
            mentions: Vec::new(),
        })
        .collect();

    for page in 1..=document.page_count() {
        let text = match document.page_text(page) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(page, error = %e, "Skipping page without text");
                continue;
            }
        };

        for paragraph in paragraphs(&text) {
            let lowered = paragraph.to_lowercase();
            for entry in found.iter_mut() {
                if lowered.contains(entry.bone.as_str()) {
                    entry.mentions.push(Mention {
                        page,
                        excerpt: paragraph.to_string(),
                    });
                }
            }
        }
    }

    for entry in &found {
        if entry.mentions.is_empty() {
            tracing::debug!(bone = %entry.bone, "No mentions");
        }
    }

    found
}

/// Bones with a file in `images_dir` whose name contains the keyword
pub fn covered_bones(images_dir: &Path, keywords: &KeywordSet) -> Result<BTreeSet<Bone>> {
    let entries = std::fs::read_dir(images_dir).map_err(|source| Error::ReadDir {
        path: images_dir.to_path_buf(),
        source,
    })?;

    let names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_lowercase())
        .collect();

    Ok(keywords
        .bones()
        .iter()
        .copied()
        .filter(|bone| names.iter().any(|name| name.contains(bone.as_str())))
        .collect())
}

/// Read-only cross check of document text against an organized image directory
#[derive(Debug, Clone, Default)]
pub struct Auditor {
    keywords: KeywordSet,
    config: AuditConfig,
}

impl Auditor {
    pub fn new(keywords: KeywordSet, config: AuditConfig) -> Self {
        Self { keywords, config }
    }

    pub fn run<D>(&self, document: &D, images_dir: &Path) -> Result<CoverageReport>
    where
        D: DocumentSource + ?Sized,
    {
        let keywords = find_mentions(document, &self.keywords);
        let covered = covered_bones(images_dir, &self.keywords)?;

        Ok(CoverageReport {
            keywords,
            covered,
            preview: self.config.clone(),
        })
    }
}
