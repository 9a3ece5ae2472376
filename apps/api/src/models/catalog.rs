//! Static lookup data: skill tags (languages, frameworks/libraries) and states.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A Language or FrameLib catalog row. Both tables share this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Skill {
    pub id: i32,
    pub name: String,
    /// Icon reference rendered next to the tag.
    pub img: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    Language,
    Framework,
}

impl SkillKind {
    pub fn catalog_table(self) -> &'static str {
        match self {
            SkillKind::Language => "langs",
            SkillKind::Framework => "framelib",
        }
    }

    /// Association table and its catalog-side column for developers.
    pub fn dev_link(self) -> (&'static str, &'static str) {
        match self {
            SkillKind::Language => ("dev_langs", "lang_id"),
            SkillKind::Framework => ("dev_frame_lib", "framelib_id"),
        }
    }

    /// Association table and its catalog-side column for positions.
    pub fn position_link(self) -> (&'static str, &'static str) {
        match self {
            SkillKind::Language => ("position_langs", "lang_id"),
            SkillKind::Framework => ("position_frame_lib", "framelib_id"),
        }
    }
}

/// Collapses a skill list into its id set.
pub fn skill_ids(skills: &[Skill]) -> BTreeSet<i32> {
    skills.iter().map(|s| s.id).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct State {
    pub id: i32,
    pub name: String,
    pub abbrev: String,
}
