//! Cue definitions: what a reminder is and which desk position it belongs to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Physical desk configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeskPosition {
    Standing,
    Sitting,
    Floor,
}

impl DeskPosition {
    pub const ALL: [DeskPosition; 3] = [
        DeskPosition::Standing,
        DeskPosition::Sitting,
        DeskPosition::Floor,
    ];
}

impl std::fmt::Display for DeskPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeskPosition::Standing => f.write_str("standing"),
            DeskPosition::Sitting => f.write_str("sitting"),
            DeskPosition::Floor => f.write_str("floor"),
        }
    }
}

impl std::str::FromStr for DeskPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standing" | "stand" => Ok(DeskPosition::Standing),
            "sitting" | "sit" => Ok(DeskPosition::Sitting),
            "floor" => Ok(DeskPosition::Floor),
            other => Err(format!("unknown desk position: {other}")),
        }
    }
}

/// Cue category.
///
/// The first three move the desk; the remaining six are exercises tied to
/// the position they are performed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueType {
    DeskStanding,
    DeskSitting,
    DeskFloor,
    StandingStretch,
    StandingMobilityDrill,
    SittingStretch,
    SittingMobilityDrill,
    FloorStretch,
    FloorMobilityDrill,
}

impl CueType {
    pub const ALL: [CueType; 9] = [
        CueType::DeskStanding,
        CueType::DeskSitting,
        CueType::DeskFloor,
        CueType::StandingStretch,
        CueType::StandingMobilityDrill,
        CueType::SittingStretch,
        CueType::SittingMobilityDrill,
        CueType::FloorStretch,
        CueType::FloorMobilityDrill,
    ];

    pub fn is_position_change(&self) -> bool {
        matches!(
            self,
            CueType::DeskStanding | CueType::DeskSitting | CueType::DeskFloor
        )
    }

    pub fn is_exercise(&self) -> bool {
        !self.is_position_change()
    }

    /// For a position-change cue, the position the desk moves to.
    pub fn target_position(&self) -> Option<DeskPosition> {
        match self {
            CueType::DeskStanding => Some(DeskPosition::Standing),
            CueType::DeskSitting => Some(DeskPosition::Sitting),
            CueType::DeskFloor => Some(DeskPosition::Floor),
            _ => None,
        }
    }

    /// The position this cue is performed in (target position for desk moves).
    pub fn position(&self) -> DeskPosition {
        match self {
            CueType::DeskStanding | CueType::StandingStretch | CueType::StandingMobilityDrill => {
                DeskPosition::Standing
            }
            CueType::DeskSitting | CueType::SittingStretch | CueType::SittingMobilityDrill => {
                DeskPosition::Sitting
            }
            CueType::DeskFloor | CueType::FloorStretch | CueType::FloorMobilityDrill => {
                DeskPosition::Floor
            }
        }
    }
}

impl std::fmt::Display for CueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CueType::DeskStanding => "desk_standing",
            CueType::DeskSitting => "desk_sitting",
            CueType::DeskFloor => "desk_floor",
            CueType::StandingStretch => "standing_stretch",
            CueType::StandingMobilityDrill => "standing_mobility_drill",
            CueType::SittingStretch => "sitting_stretch",
            CueType::SittingMobilityDrill => "sitting_mobility_drill",
            CueType::FloorStretch => "floor_stretch",
            CueType::FloorMobilityDrill => "floor_mobility_drill",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for CueType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        CueType::ALL
            .into_iter()
            .find(|t| t.to_string() == wanted)
            .ok_or_else(|| format!("unknown cue type: {s}"))
    }
}

/// A single reminder definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub cue_type: CueType,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Cue {
    pub fn new(cue_type: CueType, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            cue_type,
            title: title.into(),
            description: description.into(),
            enabled: true,
            created_at: Utc::now(),
        }
    }
}

/// Factory cue set used for first run and "reset to defaults".
pub fn default_cues() -> Vec<Cue> {
    const SEED: &[(CueType, &str, &str)] = &[
        (CueType::DeskStanding, "Stand Up", "Raise your desk to standing position"),
        (CueType::DeskSitting, "Sit Down", "Lower your desk to sitting position"),
        (CueType::DeskFloor, "Floor Position", "Lower your desk all the way down"),
        (
            CueType::StandingStretch,
            "Standing Hamstring Stretch",
            "Put one heel forward, hinge at the hips and hold for 20 seconds per leg",
        ),
        (
            CueType::StandingStretch,
            "Chest Opener",
            "Clasp your hands behind your back and lift gently for 20 seconds",
        ),
        (
            CueType::StandingMobilityDrill,
            "Hip Circles",
            "Stand and make large circles with your hips, 10 each direction",
        ),
        (
            CueType::StandingMobilityDrill,
            "Calf Raises",
            "Rise onto your toes and lower slowly, 15 repetitions",
        ),
        (
            CueType::SittingStretch,
            "Neck Stretch",
            "Gently tilt your head to each side, holding for 10 seconds",
        ),
        (
            CueType::SittingStretch,
            "Seated Spinal Twist",
            "Turn your torso to each side using the chair back, 15 seconds each",
        ),
        (
            CueType::SittingMobilityDrill,
            "Shoulder Rolls",
            "Roll your shoulders backwards 10 times",
        ),
        (
            CueType::SittingMobilityDrill,
            "Ankle Mobility",
            "Rotate each ankle 10 times in each direction",
        ),
        (
            CueType::FloorStretch,
            "Child's Pose",
            "Sit back on your heels with arms extended forward for 30 seconds",
        ),
        (
            CueType::FloorStretch,
            "Figure Four Stretch",
            "Lying on your back, cross one ankle over the opposite knee, 20 seconds per side",
        ),
        (
            CueType::FloorMobilityDrill,
            "Cat-Cow",
            "On hands and knees, alternate arching and rounding your back 10 times",
        ),
        (
            CueType::FloorMobilityDrill,
            "Hip Openers",
            "From a deep squat, rotate your knees in and out 10 times",
        ),
    ];

    SEED.iter()
        .map(|(t, title, desc)| Cue::new(*t, *title, *desc))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_change_types_map_to_targets() {
        assert_eq!(
            CueType::DeskFloor.target_position(),
            Some(DeskPosition::Floor)
        );
        assert_eq!(CueType::FloorStretch.target_position(), None);
        assert!(CueType::DeskSitting.is_position_change());
        assert!(CueType::SittingMobilityDrill.is_exercise());
    }

    #[test]
    fn cue_type_parses_display_form() {
        for t in CueType::ALL {
            assert_eq!(t.to_string().parse::<CueType>().unwrap(), t);
        }
        assert_eq!(
            "floor-mobility-drill".parse::<CueType>().unwrap(),
            CueType::FloorMobilityDrill
        );
        assert!("yoga".parse::<CueType>().is_err());
    }

    #[test]
    fn default_cues_cover_every_category() {
        let cues = default_cues();
        for t in CueType::ALL {
            assert!(cues.iter().any(|c| c.cue_type == t), "missing {t}");
        }
        assert!(cues.iter().all(|c| c.enabled));
    }

    #[test]
    fn cue_json_uses_type_key() {
        let cue = Cue::new(CueType::SittingStretch, "Neck", "");
        let json = serde_json::to_value(&cue).unwrap();
        assert_eq!(json["type"], "sitting_stretch");
    }
}
