use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Defines stimuli and their render data
pub trait Stimulus: Clone + Send + Sync + std::fmt::Debug {
    fn cache_id(&self) -> usize;
    fn label(&self) -> &'static str;
}

/// Identity of one item in a search array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StimulusKind {
    #[serde(rename = "T")]
    Target,
    #[serde(rename = "L1")]
    DistractorA,
    #[serde(rename = "L2")]
    DistractorB,
}

impl StimulusKind {
    pub const DISTRACTORS: [StimulusKind; 2] = [StimulusKind::DistractorA, StimulusKind::DistractorB];

    pub fn is_target(&self) -> bool {
        matches!(self, StimulusKind::Target)
    }
}

impl Stimulus for StimulusKind {
    fn cache_id(&self) -> usize {
        match self {
            StimulusKind::Target => 0,
            StimulusKind::DistractorA => 1,
            StimulusKind::DistractorB => 2,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            StimulusKind::Target => "T",
            StimulusKind::DistractorA => "L1",
            StimulusKind::DistractorB => "L2",
        }
    }
}

/// Direction the top of a stimulus points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Left,
    Up,
    Right,
    Down,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::Left,
        Orientation::Up,
        Orientation::Right,
        Orientation::Down,
    ];

    /// Clockwise rotation from upright.
    pub fn degrees(&self) -> u16 {
        match self {
            Orientation::Left => 270,
            Orientation::Up => 0,
            Orientation::Right => 90,
            Orientation::Down => 180,
        }
    }

    pub fn from_degrees(degrees: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.degrees() == degrees % 360)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Orientation::Left => "left",
            Orientation::Up => "up",
            Orientation::Right => "right",
            Orientation::Down => "down",
        }
    }
}

/// One drawable element of a search display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchItem {
    pub position: Point,
    pub rotation: u16,
    pub stimulus: StimulusKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_degrees_round_trip() {
        for o in Orientation::ALL {
            assert_eq!(Orientation::from_degrees(o.degrees()), Some(o));
        }
        assert_eq!(Orientation::from_degrees(45), None);
        assert_eq!(Orientation::from_degrees(450), Some(Orientation::Right));
    }

    #[test]
    fn stimulus_labels_match_serde_names() {
        for kind in [
            StimulusKind::Target,
            StimulusKind::DistractorA,
            StimulusKind::DistractorB,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.label()));
        }
    }
}
