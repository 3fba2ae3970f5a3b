use serde::{Deserialize, Serialize};
use crate::types::{BuildingId, JobId, ResourceId, TechId, UpgradeId};

/// All player-issued commands.
/// Variants may be appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum PlayerCommand {
    // ── Clock control ─────────────────────────────
    Pause,
    Resume,
    SetSpeed { speed: crate::clock::SimSpeed },

    // ── Colony actions ────────────────────────────
    Gather          { resource: ResourceId },
    AssignJob       { job: JobId },
    UnassignJob     { job: JobId },
    Build           { building: BuildingId },
    Research        { tech: TechId },

    // ── Prestige ──────────────────────────────────
    PurchaseUpgrade { upgrade: UpgradeId },
    Migrate,
}

impl PlayerCommand {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Pause                   => "pause",
            Self::Resume                  => "resume",
            Self::SetSpeed { .. }         => "set_speed",
            Self::Gather { .. }           => "gather",
            Self::AssignJob { .. }        => "assign_job",
            Self::UnassignJob { .. }      => "unassign_job",
            Self::Build { .. }            => "build",
            Self::Research { .. }         => "research",
            Self::PurchaseUpgrade { .. }  => "purchase_upgrade",
            Self::Migrate                 => "migrate",
        }
    }
}
