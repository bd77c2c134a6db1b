//! Production stage state machine

use serde::{Deserialize, Serialize};

/// One step in the fixed cherry → greenbean pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "sortasi")]
    Sorting,
    #[serde(rename = "fermentasi")]
    Fermentation,
    #[serde(rename = "jemur")]
    Drying,
    #[serde(rename = "roasting")]
    Roasting,
    #[serde(rename = "kemas")]
    Packing,
}

/// What an advance from a given stage leads to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Move to the next stage of the pipeline
    Advance(Stage),
    /// The pipeline is done; the batch leaves active tracking
    Archive,
}

impl Stage {
    /// The fixed pipeline order. No skipping, no reordering.
    pub const ALL: [Stage; 5] = [
        Stage::Sorting,
        Stage::Fermentation,
        Stage::Drying,
        Stage::Roasting,
        Stage::Packing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Sorting => "sortasi",
            Stage::Fermentation => "fermentasi",
            Stage::Drying => "jemur",
            Stage::Roasting => "roasting",
            Stage::Packing => "kemas",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sortasi" => Some(Stage::Sorting),
            "fermentasi" => Some(Stage::Fermentation),
            "jemur" => Some(Stage::Drying),
            "roasting" => Some(Stage::Roasting),
            "kemas" => Some(Stage::Packing),
            _ => None,
        }
    }

    /// Display label shown to farmers
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Sorting => "Sortasi",
            Stage::Fermentation => "Fermentasi",
            Stage::Drying => "Penjemuran",
            Stage::Roasting => "Roasting",
            Stage::Packing => "Pengemasan",
        }
    }

    /// Where an advance out of this stage goes. Packing is the last stage;
    /// advancing out of it archives the batch instead of storing a terminal
    /// status.
    pub fn next_step(&self) -> NextStep {
        match self {
            Stage::Sorting => NextStep::Advance(Stage::Fermentation),
            Stage::Fermentation => NextStep::Advance(Stage::Drying),
            Stage::Drying => NextStep::Advance(Stage::Roasting),
            Stage::Roasting => NextStep::Advance(Stage::Packing),
            Stage::Packing => NextStep::Archive,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_order_is_fixed() {
        let mut stage = Stage::ALL[0];
        let mut walked = vec![stage];
        while let NextStep::Advance(next) = stage.next_step() {
            walked.push(next);
            stage = next;
        }
        assert_eq!(walked, Stage::ALL);
    }

    #[test]
    fn test_only_packing_archives() {
        for stage in Stage::ALL {
            match stage.next_step() {
                NextStep::Archive => assert_eq!(stage, Stage::Packing),
                NextStep::Advance(_) => assert_ne!(stage, Stage::Packing),
            }
        }
    }

    #[test]
    fn test_wire_name_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(Stage::from_str(stage.as_str()), Some(stage));
        }
        assert_eq!(Stage::from_str("selesai"), None);
    }
}
