//! Anatomical vocabulary: the three cranial categories and the bones in each.

use std::fmt;
use std::str::FromStr;

/// Top-level anatomical grouping an image is sorted into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Neurocranium,
    Viscerocranium,
    Sutures,
}

impl Category {
    /// All categories in declaration order
    pub const ALL: [Category; 3] = [
        Category::Neurocranium,
        Category::Viscerocranium,
        Category::Sutures,
    ];

    /// Directory name used under the organized output root
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Neurocranium => "neurocranium",
            Category::Viscerocranium => "viscerocranium",
            Category::Sutures => "sutures",
        }
    }

    /// Bones belonging to this category, in atlas order
    pub fn bones(self) -> impl Iterator<Item = Bone> {
        Bone::ALL.into_iter().filter(move |bone| bone.category() == self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown category '{}' (expected neurocranium, viscerocranium or sutures)",
                    s
                )
            })
    }
}

/// Bone (or suture) label within a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bone {
    Frontal,
    Parietal,
    Temporal,
    Occipital,
    Sphenoid,
    Ethmoid,
    Maxilla,
    Nasal,
    Zygomatic,
    Mandible,
    Coronal,
    Sagittal,
    Lambdoid,
}

impl Bone {
    pub const ALL: [Bone; 13] = [
        Bone::Frontal,
        Bone::Parietal,
        Bone::Temporal,
        Bone::Occipital,
        Bone::Sphenoid,
        Bone::Ethmoid,
        Bone::Maxilla,
        Bone::Nasal,
        Bone::Zygomatic,
        Bone::Mandible,
        Bone::Coronal,
        Bone::Sagittal,
        Bone::Lambdoid,
    ];

    /// Lowercase keyword, also the stem of organized filenames
    pub fn as_str(self) -> &'static str {
        match self {
            Bone::Frontal => "frontal",
            Bone::Parietal => "parietal",
            Bone::Temporal => "temporal",
            Bone::Occipital => "occipital",
            Bone::Sphenoid => "sphenoid",
            Bone::Ethmoid => "ethmoid",
            Bone::Maxilla => "maxilla",
            Bone::Nasal => "nasal",
            Bone::Zygomatic => "zygomatic",
            Bone::Mandible => "mandible",
            Bone::Coronal => "coronal",
            Bone::Sagittal => "sagittal",
            Bone::Lambdoid => "lambdoid",
        }
    }

    pub fn category(self) -> Category {
        match self {
            Bone::Frontal
            | Bone::Parietal
            | Bone::Temporal
            | Bone::Occipital
            | Bone::Sphenoid
            | Bone::Ethmoid => Category::Neurocranium,
            Bone::Maxilla | Bone::Nasal | Bone::Zygomatic | Bone::Mandible => {
                Category::Viscerocranium
            }
            Bone::Coronal | Bone::Sagittal | Bone::Lambdoid => Category::Sutures,
        }
    }

    /// Capitalized name for report headings ("Frontal")
    pub fn title(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Bone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
