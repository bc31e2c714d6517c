use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::geometry::Point;
use crate::stimulus::{SearchItem, Stimulus, StimulusKind};

/// One fully specified search trial. The three per-item vectors are
/// parallel-indexed and all have `set_size` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub set_size: usize,
    pub locations: Vec<Point>,
    pub rotations: Vec<u16>,
    pub stimuli: Vec<StimulusKind>,
    pub test_location: usize,
    pub cresp: String,
}

impl Trial {
    /// Display tuples in location order.
    pub fn items(&self) -> Vec<SearchItem> {
        self.locations
            .iter()
            .zip(&self.rotations)
            .zip(&self.stimuli)
            .map(|((&position, &rotation), &stimulus)| SearchItem {
                position,
                rotation,
                stimulus,
            })
            .collect()
    }

    pub fn target_rotation(&self) -> Option<u16> {
        self.rotations.get(self.test_location).copied()
    }

    /// `[[x, y], ...]`
    pub fn locations_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.locations)
    }

    /// `[deg, ...]`
    pub fn rotations_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.rotations)
    }

    /// Single-quoted list such as `['L1', 'T']`, so the column holds no
    /// nested double quotes.
    pub fn stimuli_list(&self) -> String {
        let inner = self
            .stimuli
            .iter()
            .map(|s| format!("'{}'", s.label()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("[{inner}]")
    }
}

/// A response symbol and the time it took, measured from when the response
/// source was armed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub symbol: String,
    pub elapsed: Duration,
}

impl KeyPress {
    pub fn new(symbol: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            symbol: symbol.into(),
            elapsed,
        }
    }
}

/// Recorded result per trial, in flat form for row-oriented storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Block")]
    pub block: usize,
    #[serde(rename = "Trial")]
    pub trial: usize,
    /// Absolute wall-clock seconds at record creation
    #[serde(rename = "Timestamp")]
    pub timestamp: f64,
    #[serde(rename = "SetSize")]
    pub set_size: usize,
    #[serde(rename = "RT")]
    pub rt_ms: f64,
    #[serde(rename = "CRESP")]
    pub cresp: String,
    #[serde(rename = "RESP")]
    pub resp: String,
    #[serde(rename = "ACC")]
    pub acc: u8,
    #[serde(rename = "LocationTested")]
    pub location_tested: usize,
    #[serde(rename = "Locations")]
    pub locations: String,
    #[serde(rename = "Rotations")]
    pub rotations: String,
    #[serde(rename = "Stimuli")]
    pub stimuli: String,
}

impl TrialRecord {
    pub const FIELDS: [&'static str; 13] = [
        "Subject",
        "Block",
        "Trial",
        "Timestamp",
        "SetSize",
        "RT",
        "CRESP",
        "RESP",
        "ACC",
        "LocationTested",
        "Locations",
        "Rotations",
        "Stimuli",
    ];

    pub fn is_correct(&self) -> bool {
        self.acc == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trial() -> Trial {
        Trial {
            set_size: 2,
            locations: vec![Point::new(1.0, -2.5), Point::new(-3.0, 4.0)],
            rotations: vec![270, 0],
            stimuli: vec![StimulusKind::DistractorA, StimulusKind::Target],
            test_location: 1,
            cresp: "up".to_string(),
        }
    }

    #[test]
    fn flat_columns() {
        let trial = sample_trial();
        assert_eq!(trial.locations_json().unwrap(), "[[1.0,-2.5],[-3.0,4.0]]");
        assert_eq!(trial.rotations_json().unwrap(), "[270,0]");
        assert_eq!(trial.stimuli_list(), "['L1', 'T']");
    }

    #[test]
    fn items_are_parallel() {
        let trial = sample_trial();
        let items = trial.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].stimulus, StimulusKind::Target);
        assert_eq!(items[1].rotation, 0);
        assert_eq!(items[1].position, Point::new(-3.0, 4.0));
        assert_eq!(trial.target_rotation(), Some(0));
    }

    #[test]
    fn record_uses_column_names() {
        let record = TrialRecord {
            subject: "7".into(),
            block: 0,
            trial: 3,
            timestamp: 1.0,
            set_size: 2,
            rt_ms: 420.0,
            cresp: "up".into(),
            resp: "up".into(),
            acc: 1,
            location_tested: 1,
            locations: "[]".into(),
            rotations: "[]".into(),
            stimuli: "[]".into(),
        };
        let value = serde_json::to_value(&record).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), TrialRecord::FIELDS.len());
        for field in TrialRecord::FIELDS {
            assert!(object.contains_key(field), "missing {field}");
        }
        assert!(record.is_correct());
    }
}
