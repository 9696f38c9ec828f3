//! Level data: section masks, level metadata and assembly
//!
//! A level is a list of sections appended left to right into one
//! [`BlockIndex`]. Assembly is all-or-nothing: every section is resolved
//! before a single block is appended, so a missing asset never leaves a
//! half-built level behind.

pub mod generate;
pub mod mask;

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::script::ScriptStep;
use crate::sim::blocks::BlockIndex;
use crate::sim::vehicle::ShapeFormation;
use crate::tuning::Tuning;

pub use generate::{GenerateParams, generate};
pub use mask::SectionMask;

/// Reasons a level cannot be built
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    MissingSection { name: String },
    MaskSize { expected: usize, actual: usize },
    EmptyMask,
    RaggedMask { line: usize },
    /// Section height differs from the level's row count
    SectionHeight { name: String, expected: usize, actual: usize },
    NoSections,
    BadFormation { reason: String },
    Parse { message: String },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSection { name } => write!(f, "section not registered: {name}"),
            Self::MaskSize { expected, actual } => {
                write!(f, "mask size mismatch: expected {expected} bytes, got {actual}")
            }
            Self::EmptyMask => write!(f, "mask has no pixels"),
            Self::RaggedMask { line } => write!(f, "mask line {line} has a different width"),
            Self::SectionHeight {
                name,
                expected,
                actual,
            } => write!(f, "section {name} is {actual} rows tall, level has {expected}"),
            Self::NoSections => write!(f, "level has no sections"),
            Self::BadFormation { reason } => write!(f, "invalid formation: {reason}"),
            Self::Parse { message } => write!(f, "level data parse error: {message}"),
        }
    }
}

impl std::error::Error for LevelError {}

impl From<serde_json::Error> for LevelError {
    fn from(err: serde_json::Error) -> Self {
        LevelError::Parse {
            message: err.to_string(),
        }
    }
}

/// A script fired when the vehicle has travelled `distance` tiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptTrigger {
    pub distance: f32,
    pub script: Vec<ScriptStep>,
}

/// Level metadata as authored in JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelDef {
    pub name: String,
    /// Section names, appended in order
    pub sections: Vec<String>,
    /// When set, sections are picked by the generator instead
    pub generate: Option<GenerateParams>,
    /// Background image paths (parallax layers, back to front)
    pub backgrounds: Vec<String>,
    pub level_color: [f32; 4],
    pub point_color: [f32; 4],
    pub warning_color: [f32; 4],
    pub text_color: [f32; 4],
    /// Scripts keyed by travelled distance
    pub triggers: Vec<ScriptTrigger>,
    /// Score needed to pass the level
    pub min_score: u64,
    /// Part targets per shape; the default formation when absent
    pub formation: Option<Vec<Vec<Vec2>>>,
}

impl Default for LevelDef {
    fn default() -> Self {
        Self {
            name: String::from("untitled"),
            sections: Vec::new(),
            generate: None,
            backgrounds: Vec::new(),
            level_color: [1.0, 1.0, 1.0, 1.0],
            point_color: [0.2, 1.0, 0.2, 1.0],
            warning_color: [1.0, 0.3, 0.1, 1.0],
            text_color: [1.0, 1.0, 1.0, 1.0],
            triggers: Vec::new(),
            min_score: 0,
            formation: None,
        }
    }
}

impl LevelDef {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Registered section masks, by name
#[derive(Debug, Clone, Default)]
pub struct SectionLibrary {
    sections: BTreeMap<String, SectionMask>,
}

impl SectionLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, mask: SectionMask) {
        let name = name.into();
        log::debug!("Registered section \"{}\" ({}x{})", name, mask.width(), mask.height());
        self.sections.insert(name, mask);
    }

    pub fn get(&self, name: &str) -> Result<&SectionMask, LevelError> {
        self.sections
            .get(name)
            .ok_or_else(|| LevelError::MissingSection {
                name: name.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SectionMask)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// A fully assembled level
#[derive(Debug, Clone)]
pub struct Level {
    pub def: LevelDef,
    pub blocks: BlockIndex,
    pub formation: ShapeFormation,
}

/// Build a level from its definition
///
/// Every section must be exactly `tuning.level_rows` tall.
pub fn assemble(def: LevelDef, library: &SectionLibrary, tuning: &Tuning) -> Result<Level, LevelError> {
    let names = match &def.generate {
        Some(params) => generate(library, params)?,
        None => def.sections.clone(),
    };
    if names.is_empty() {
        return Err(LevelError::NoSections);
    }

    // Resolve everything up front; nothing is appended on failure
    let rows = tuning.level_rows.max(0) as usize;
    let masks = names
        .iter()
        .map(|name| {
            let mask = library.get(name)?;
            if mask.height() != rows {
                return Err(LevelError::SectionHeight {
                    name: name.clone(),
                    expected: rows,
                    actual: mask.height(),
                });
            }
            Ok(mask)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let formation = match &def.formation {
        Some(shapes) => ShapeFormation::new(shapes.clone())?,
        None => ShapeFormation::default(),
    };

    let mut blocks = BlockIndex::new(tuning.tile_size);
    for mask in masks {
        blocks.append_section(mask);
    }

    log::info!(
        "Assembled level \"{}\": {} sections, {} columns, {} blocks",
        def.name,
        names.len(),
        blocks.length(),
        blocks.len()
    );

    Ok(Level {
        def,
        blocks,
        formation,
    })
}
