//! Credit pricing for scene generation.
//!
//! Each scene submission debits a model-dependent cost from the owner's
//! balance at the moment the generation request is dispatched. The cost is
//! recorded on the scene row so accounting stays correct even if prices
//! change mid-project.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Generation model tiers offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationModel {
    /// Fast, lowest-fidelity model.
    Flash,
    /// Default model.
    Standard,
    /// Highest-fidelity model.
    Cinema,
}

/// Credit cost per scene for each model tier.
pub const FLASH_SCENE_COST: i64 = 2;
pub const STANDARD_SCENE_COST: i64 = 5;
pub const CINEMA_SCENE_COST: i64 = 10;

impl GenerationModel {
    /// Database/API string for this model.
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationModel::Flash => "flash",
            GenerationModel::Standard => "standard",
            GenerationModel::Cinema => "cinema",
        }
    }

    /// Parse a model string as stored on the project row.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "flash" => Ok(GenerationModel::Flash),
            "standard" => Ok(GenerationModel::Standard),
            "cinema" => Ok(GenerationModel::Cinema),
            other => Err(CoreError::Validation(format!(
                "Unknown generation model: {other}"
            ))),
        }
    }

    /// Credits debited per scene generated with this model.
    pub fn scene_cost(self) -> i64 {
        match self {
            GenerationModel::Flash => FLASH_SCENE_COST,
            GenerationModel::Standard => STANDARD_SCENE_COST,
            GenerationModel::Cinema => CINEMA_SCENE_COST,
        }
    }
}

/// Estimated total cost for a project, assuming every scene succeeds on
/// the first attempt. Retries are not estimated; they draw from the same
/// balance when they happen.
pub fn estimate_project_cost(model: GenerationModel, total_scenes: i32) -> i64 {
    model.scene_cost() * i64::from(total_scenes.max(0))
}
