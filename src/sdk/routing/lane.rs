use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A turn that a lane marking permits.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LaneIndication {
    #[serde(rename = "sharp right")]
    SharpRight,
    #[serde(rename = "right")]
    Right,
    #[serde(rename = "slight right")]
    SlightRight,
    #[serde(rename = "straight")]
    StraightAhead,
    #[serde(rename = "slight left")]
    SlightLeft,
    #[serde(rename = "left")]
    Left,
    #[serde(rename = "sharp left")]
    SharpLeft,
    #[serde(rename = "uturn")]
    UTurn,
}

/// One traffic lane at an intersection.
///
/// The same shape is used for the raw `lanes` records sent by the service and
/// for the archived `usableLanes` set; keys other than `valid` and
/// `indications` are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Lane {
    #[serde(default)]
    pub indications: BTreeSet<LaneIndication>,
    /// Whether the lane can be used to complete the maneuver the route takes.
    #[serde(rename = "valid")]
    pub is_valid: bool,
}

impl Lane {
    pub fn new<I>(indications: I, is_valid: bool) -> Self
    where
        I: IntoIterator<Item = LaneIndication>,
    {
        Self {
            indications: indications.into_iter().collect(),
            is_valid,
        }
    }
}
