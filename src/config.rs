//! Stage configuration and the read-only lookup tables each stage consumes

use crate::catalog::{Bone, Category};

/// Thresholds applied by the extractor
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Minimum decoded width in pixels (default: 100)
    pub min_width: u32,
    /// Minimum decoded height in pixels (default: 100)
    pub min_height: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_width: 100,
            min_height: 100,
        }
    }
}

impl ExtractorConfig {
    pub fn accepts(&self, width: u32, height: u32) -> bool {
        width >= self.min_width && height >= self.min_height
    }
}

/// Preview limits for the coverage report
#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Mentions printed per keyword (default: 2)
    pub preview_mentions: usize,
    /// Characters kept from each printed mention (default: 200)
    pub preview_chars: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            preview_mentions: 2,
            preview_chars: 200,
        }
    }
}

// ============================================================================
// Size heuristic table
// ============================================================================

/// Reference dimensions typical for one category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRule {
    pub width: u32,
    pub height: u32,
    pub category: Category,
}

impl SizeRule {
    pub const fn new(width: u32, height: u32, category: Category) -> Self {
        Self {
            width,
            height,
            category,
        }
    }

    /// L1 distance between this rule's reference size and the given one
    pub fn distance(&self, width: u32, height: u32) -> u64 {
        u64::from(self.width.abs_diff(width)) + u64::from(self.height.abs_diff(height))
    }
}

/// Ordered reference sizes; earlier rules win ties
#[derive(Debug, Clone)]
pub struct SizeTable {
    rules: Vec<SizeRule>,
}

impl SizeTable {
    pub fn new(rules: Vec<SizeRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[SizeRule] {
        &self.rules
    }

    /// Category whose reference size is closest to `width`x`height`
    pub fn nearest(&self, width: u32, height: u32) -> Option<Category> {
        let mut best: Option<(u64, Category)> = None;
        for rule in &self.rules {
            let distance = rule.distance(width, height);
            match best {
                Some((min, _)) if distance >= min => {}
                _ => best = Some((distance, rule.category)),
            }
        }
        best.map(|(_, category)| category)
    }
}

impl Default for SizeTable {
    fn default() -> Self {
        Self::new(vec![
            // skull vault plates
            SizeRule::new(400, 500, Category::Neurocranium),
            // facial bones
            SizeRule::new(600, 600, Category::Viscerocranium),
            SizeRule::new(700, 900, Category::Sutures),
        ])
    }
}

// ============================================================================
// Static bone mapping
// ============================================================================

/// Raw files curated for one bone, in output order
#[derive(Debug, Clone)]
pub struct BoneSources {
    pub bone: Bone,
    pub files: Vec<String>,
}

/// All curated bones of one category
#[derive(Debug, Clone)]
pub struct MappingSection {
    pub category: Category,
    pub bones: Vec<BoneSources>,
}

/// One raw file routed to a named bone image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry<'a> {
    pub category: Category,
    pub bone: Bone,
    /// 1-based position among the bone's files
    pub ordinal: usize,
    pub source: &'a str,
}

impl MappingEntry<'_> {
    /// `frontal.png` for the first file of a bone, `frontal_2.png` onwards after
    pub fn dest_filename(&self) -> String {
        if self.ordinal <= 1 {
            format!("{}.png", self.bone)
        } else {
            format!("{}_{}.png", self.bone, self.ordinal)
        }
    }
}

/// Curated {category -> {bone -> [raw filenames]}} table
#[derive(Debug, Clone)]
pub struct BoneMapping {
    sections: Vec<MappingSection>,
}

impl BoneMapping {
    pub fn new(sections: Vec<MappingSection>) -> Self {
        Self { sections }
    }

    pub fn sections(&self) -> &[MappingSection] {
        &self.sections
    }

    /// Flattened entries in declaration order
    pub fn entries(&self) -> impl Iterator<Item = MappingEntry<'_>> {
        self.sections.iter().flat_map(|section| {
            section.bones.iter().flat_map(move |sources| {
                sources
                    .files
                    .iter()
                    .enumerate()
                    .map(move |(idx, file)| MappingEntry {
                        category: section.category,
                        bone: sources.bone,
                        ordinal: idx + 1,
                        source: file.as_str(),
                    })
            })
        })
    }
}

fn sources(bone: Bone, pages: &[u32], images_per_page: u32) -> BoneSources {
    let files = pages
        .iter()
        .flat_map(|page| {
            (1..=images_per_page).map(move |img| format!("page_{}_img_{}.png", page, img))
        })
        .collect();
    BoneSources { bone, files }
}

impl Default for BoneMapping {
    fn default() -> Self {
        Self::new(vec![
            MappingSection {
                category: Category::Neurocranium,
                bones: vec![
                    sources(Bone::Frontal, &[2], 2),
                    sources(Bone::Parietal, &[3], 2),
                    sources(Bone::Temporal, &[4], 2),
                    sources(Bone::Occipital, &[5], 2),
                    sources(Bone::Sphenoid, &[6], 2),
                    sources(Bone::Ethmoid, &[7], 2),
                ],
            },
            MappingSection {
                category: Category::Viscerocranium,
                bones: vec![
                    sources(Bone::Maxilla, &[8], 2),
                    sources(Bone::Nasal, &[9], 1),
                    sources(Bone::Zygomatic, &[10], 1),
                    sources(Bone::Mandible, &[11], 2),
                ],
            },
            MappingSection {
                category: Category::Sutures,
                bones: vec![
                    sources(Bone::Coronal, &[12], 1),
                    sources(Bone::Sagittal, &[13], 1),
                    sources(Bone::Lambdoid, &[14], 1),
                ],
            },
        ])
    }
}

// ============================================================================
// Audit keywords
// ============================================================================

/// Closed set of bone keywords searched by the coverage auditor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    bones: Vec<Bone>,
}

impl KeywordSet {
    pub fn new(bones: Vec<Bone>) -> Self {
        Self { bones }
    }

    pub fn for_category(category: Category) -> Self {
        Self::new(category.bones().collect())
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::for_category(Category::Neurocranium)
    }
}
