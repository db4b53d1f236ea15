use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::error::DecodeError;
use super::lane::Lane;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// An intersection record as the routing service sends it.
#[derive(Deserialize, Debug, Clone)]
pub struct RawIntersection {
    #[serde(rename = "in")]
    pub approach_index: Option<usize>,
    #[serde(rename = "out")]
    pub outlet_index: Option<usize>,
    pub entry: Vec<bool>,
    /// `[latitude, longitude]`
    pub location: Vec<f64>,
    pub bearings: Vec<f64>,
    pub lanes: Option<Vec<Lane>>,
}

/// A point along a route step where roads meet.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    approach_index: Option<usize>,
    outlet_index: Option<usize>,
    location: Coordinate,
    headings: Vec<f64>,
    entry: Vec<bool>,
    lanes: Option<Vec<Arc<Lane>>>,
    usable_lanes: UsableLanes,
}

/// Lanes that can be used to complete the maneuver, with no defined order.
///
/// Membership is by identity: two equal lanes at different positions of
/// `lanes` are two members. Equality between collections compares the lane
/// values regardless of order, so a restored intersection equals the one it
/// was archived from.
#[derive(Debug, Clone, Default)]
pub struct UsableLanes(Vec<Arc<Lane>>);

impl UsableLanes {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Lane>> {
        self.0.iter()
    }

    /// Whether this exact lane, not merely an equal one, is usable.
    pub fn contains(&self, lane: &Arc<Lane>) -> bool {
        self.0.iter().any(|usable| Arc::ptr_eq(usable, lane))
    }

    /// Whether any usable lane equals `lane`.
    pub fn contains_value(&self, lane: &Lane) -> bool {
        self.0.iter().any(|usable| usable.as_ref() == lane)
    }

    /// Lane values in a stable order.
    pub fn sorted(&self) -> Vec<&Lane> {
        let mut lanes: Vec<&Lane> = self.0.iter().map(Arc::as_ref).collect();
        lanes.sort();
        lanes
    }
}

impl PartialEq for UsableLanes {
    fn eq(&self, other: &Self) -> bool {
        self.sorted() == other.sorted()
    }
}

impl FromIterator<Arc<Lane>> for UsableLanes {
    fn from_iter<I: IntoIterator<Item = Arc<Lane>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Intersection {
    /// Builds an intersection from already-decoded parts, enforcing the same
    /// invariants as the decoder.
    pub fn new(
        approach_index: Option<usize>,
        outlet_index: Option<usize>,
        location: Coordinate,
        headings: Vec<f64>,
        entry: Vec<bool>,
        lanes: Option<Vec<Lane>>,
    ) -> Result<Self, DecodeError> {
        check_entry(&entry, &headings)?;
        check_index("approach", approach_index, &headings)?;
        check_index("exit", outlet_index, &headings)?;

        let (lanes, usable_lanes) = partition_lanes(lanes);
        Ok(Self {
            approach_index,
            outlet_index,
            location,
            headings,
            entry,
            lanes,
            usable_lanes,
        })
    }

    /// Decodes one raw intersection record.
    pub fn decode(record: &Value) -> Result<Self, DecodeError> {
        let raw = RawIntersection::deserialize(record)?;
        Self::try_from(raw)
    }

    /// Decodes either a single raw record or an array of them.
    pub fn decode_all(records: &Value) -> Result<Vec<Self>, DecodeError> {
        match records {
            Value::Array(records) => records.iter().map(Self::decode).collect(),
            record => Ok(vec![Self::decode(record)?]),
        }
    }

    /// Restores an intersection from its persisted parts. Only the usable
    /// lanes survive persistence, so `lanes` comes back absent.
    pub(crate) fn restore(
        approach_index: Option<usize>,
        outlet_index: Option<usize>,
        location: Coordinate,
        headings: Vec<f64>,
        entry: Vec<bool>,
        usable_lanes: Vec<Lane>,
    ) -> Result<Self, DecodeError> {
        let mut intersection = Self::new(
            approach_index,
            outlet_index,
            location,
            headings,
            entry,
            None,
        )?;
        intersection.usable_lanes = usable_lanes.into_iter().map(Arc::new).collect();
        Ok(intersection)
    }

    /// Index into `headings` of the bearing just before the maneuver. Absent
    /// for a departure.
    pub fn approach_index(&self) -> Option<usize> {
        self.approach_index
    }

    /// Index into `headings` of the bearing just after the maneuver. Absent
    /// for an arrival.
    pub fn outlet_index(&self) -> Option<usize> {
        self.outlet_index
    }

    pub fn approach_heading(&self) -> Option<f64> {
        self.approach_index.map(|i| self.headings[i])
    }

    pub fn outlet_heading(&self) -> Option<f64> {
        self.outlet_index.map(|i| self.headings[i])
    }

    pub fn location(&self) -> Coordinate {
        self.location
    }

    /// Bearings, in degrees clockwise from true north, of every road leaving
    /// the intersection.
    pub fn headings(&self) -> &[f64] {
        &self.headings
    }

    /// One flag per heading telling whether that road may legally be entered.
    pub fn entry(&self) -> &[bool] {
        &self.entry
    }

    /// Replaces the entry flags. The new flags must still line up with
    /// `headings`.
    pub fn set_entry(&mut self, entry: Vec<bool>) -> Result<(), DecodeError> {
        check_entry(&entry, &self.headings)?;
        self.entry = entry;
        Ok(())
    }

    /// Headings that may legally be entered.
    pub fn enterable_headings(&self) -> impl Iterator<Item = f64> + '_ {
        self.headings
            .iter()
            .zip(&self.entry)
            .filter(|(_, allowed)| **allowed)
            .map(|(&heading, _)| heading)
    }

    pub fn lanes(&self) -> Option<&[Arc<Lane>]> {
        self.lanes.as_deref()
    }

    /// Replaces the lanes and recomputes the usable lanes from them.
    pub fn set_lanes(&mut self, lanes: Option<Vec<Lane>>) {
        let (lanes, usable_lanes) = partition_lanes(lanes);
        self.lanes = lanes;
        self.usable_lanes = usable_lanes;
    }

    /// Lanes that can be used to complete the maneuver. The elements are
    /// shared with `lanes`, not copies of them.
    pub fn usable_lanes(&self) -> &UsableLanes {
        &self.usable_lanes
    }
}

impl TryFrom<RawIntersection> for Intersection {
    type Error = DecodeError;

    fn try_from(raw: RawIntersection) -> Result<Self, Self::Error> {
        let location = match raw.location[..] {
            [latitude, longitude] => Coordinate {
                latitude,
                longitude,
            },
            _ => return Err(DecodeError::CoordinateArity(raw.location.len())),
        };

        let intersection = Self::new(
            raw.approach_index,
            raw.outlet_index,
            location,
            raw.bearings,
            raw.entry,
            raw.lanes,
        )?;
        log::debug!(
            "Decoded intersection at ({}, {}) with {} headings and {} usable lanes",
            location.latitude,
            location.longitude,
            intersection.headings.len(),
            intersection.usable_lanes.len()
        );
        Ok(intersection)
    }
}

fn check_entry(entry: &[bool], headings: &[f64]) -> Result<(), DecodeError> {
    if entry.len() != headings.len() {
        return Err(DecodeError::EntryLengthMismatch {
            entry: entry.len(),
            headings: headings.len(),
        });
    }
    Ok(())
}

fn check_index(
    field: &'static str,
    index: Option<usize>,
    headings: &[f64],
) -> Result<(), DecodeError> {
    match index {
        Some(index) if index >= headings.len() => Err(DecodeError::BearingIndexOutOfBounds {
            field,
            index,
            len: headings.len(),
        }),
        _ => Ok(()),
    }
}

/// Wraps each lane once and collects the valid ones into the usable lanes,
/// sharing the same allocation.
fn partition_lanes(lanes: Option<Vec<Lane>>) -> (Option<Vec<Arc<Lane>>>, UsableLanes) {
    let lanes: Option<Vec<Arc<Lane>>> =
        lanes.map(|lanes| lanes.into_iter().map(Arc::new).collect());
    let usable = lanes
        .iter()
        .flatten()
        .filter(|lane| lane.is_valid)
        .cloned()
        .collect();
    (lanes, usable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::routing::lane::LaneIndication;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "in": 0,
            "out": 1,
            "entry": [false, true, true],
            "location": [38.9, -77.03],
            "bearings": [30, 120, 300]
        })
    }

    #[test]
    fn decodes_record_without_lanes() {
        let intersection = Intersection::decode(&sample()).unwrap();

        assert_eq!(intersection.headings().len(), 3);
        assert_eq!(intersection.approach_index(), Some(0));
        assert_eq!(intersection.outlet_index(), Some(1));
        assert_eq!(intersection.approach_heading(), Some(30.0));
        assert_eq!(intersection.outlet_heading(), Some(120.0));
        assert_eq!(
            intersection.location(),
            Coordinate {
                latitude: 38.9,
                longitude: -77.03
            }
        );
        assert!(intersection.lanes().is_none());
        assert!(intersection.usable_lanes().is_empty());
        assert_eq!(
            intersection.enterable_headings().collect::<Vec<_>>(),
            vec![120.0, 300.0]
        );
    }

    #[test]
    fn departure_and_arrival_have_no_indices() {
        let intersection = Intersection::decode(&json!({
            "entry": [true],
            "location": [0.0, 0.0],
            "bearings": [90]
        }))
        .unwrap();
        assert_eq!(intersection.approach_index(), None);
        assert_eq!(intersection.outlet_index(), None);
        assert_eq!(intersection.approach_heading(), None);
    }

    #[test]
    fn usable_lanes_share_valid_lanes() {
        let mut record = sample();
        record["lanes"] = json!([
            { "valid": false, "indications": ["left"] },
            { "valid": true, "indications": ["straight"] },
            { "valid": true, "indications": ["straight", "right"] }
        ]);
        let intersection = Intersection::decode(&record).unwrap();

        let lanes = intersection.lanes().unwrap();
        assert_eq!(lanes.len(), 3);
        assert!(lanes[0].indications.contains(&LaneIndication::Left));
        assert_eq!(intersection.usable_lanes().len(), 2);

        for lane in lanes {
            assert_eq!(intersection.usable_lanes().contains(lane), lane.is_valid);
        }
    }

    #[test]
    fn equal_valid_lanes_stay_distinct() {
        let mut record = sample();
        record["lanes"] = json!([
            { "valid": true, "indications": ["straight"] },
            { "valid": true, "indications": ["straight"] },
            { "valid": false, "indications": ["left"] }
        ]);
        let intersection = Intersection::decode(&record).unwrap();
        let lanes = intersection.lanes().unwrap();

        assert_eq!(lanes[0], lanes[1]);
        assert_eq!(intersection.usable_lanes().len(), 2);
        assert!(intersection.usable_lanes().contains(&lanes[0]));
        assert!(intersection.usable_lanes().contains(&lanes[1]));
        assert!(!intersection.usable_lanes().contains(&lanes[2]));
        assert!(!intersection
            .usable_lanes()
            .contains(&Arc::new(Lane::new([LaneIndication::StraightAhead], true))));
    }

    #[test]
    fn usable_lanes_compare_regardless_of_order() {
        let straight = Lane::new([LaneIndication::StraightAhead], true);
        let left = Lane::new([LaneIndication::Left], true);
        let a: UsableLanes = [straight.clone(), left.clone()]
            .into_iter()
            .map(Arc::new)
            .collect();
        let b: UsableLanes = [left.clone(), straight.clone()]
            .into_iter()
            .map(Arc::new)
            .collect();
        let c: UsableLanes = [left, straight.clone(), straight]
            .into_iter()
            .map(Arc::new)
            .collect();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn rejects_mismatched_entry() {
        let mut record = sample();
        record["entry"] = json!([true, false]);
        assert!(matches!(
            Intersection::decode(&record),
            Err(DecodeError::EntryLengthMismatch {
                entry: 2,
                headings: 3
            })
        ));
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let mut record = sample();
        record["in"] = json!(3);
        assert!(matches!(
            Intersection::decode(&record),
            Err(DecodeError::BearingIndexOutOfBounds {
                field: "approach",
                index: 3,
                len: 3
            })
        ));

        let mut record = sample();
        record["out"] = json!(7);
        assert!(matches!(
            Intersection::decode(&record),
            Err(DecodeError::BearingIndexOutOfBounds { field: "exit", .. })
        ));

        let mut record = sample();
        record["out"] = json!(-1);
        assert!(matches!(
            Intersection::decode(&record),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_bad_location() {
        let mut record = sample();
        record["location"] = json!([38.9, -77.03, 10.0]);
        assert!(matches!(
            Intersection::decode(&record),
            Err(DecodeError::CoordinateArity(3))
        ));

        record["location"] = json!(["north", "west"]);
        assert!(matches!(
            Intersection::decode(&record),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_missing_or_wrongly_typed_fields() {
        for key in ["entry", "location", "bearings"] {
            let mut record = sample();
            record.as_object_mut().unwrap().remove(key);
            assert!(
                matches!(Intersection::decode(&record), Err(DecodeError::Malformed(_))),
                "missing {}",
                key
            );
        }

        let mut record = sample();
        record["entry"] = json!([1, 0, 1]);
        assert!(matches!(
            Intersection::decode(&record),
            Err(DecodeError::Malformed(_))
        ));
    }

    #[test]
    fn decode_all_accepts_single_record_or_array() {
        assert_eq!(Intersection::decode_all(&sample()).unwrap().len(), 1);
        let both = json!([sample(), sample()]);
        assert_eq!(Intersection::decode_all(&both).unwrap().len(), 2);
    }

    #[test]
    fn set_lanes_recomputes_usable_lanes() {
        let mut intersection = Intersection::decode(&sample()).unwrap();
        intersection.set_lanes(Some(vec![
            Lane::new([LaneIndication::Left], true),
            Lane::new([LaneIndication::Right], false),
        ]));
        assert_eq!(intersection.usable_lanes().len(), 1);

        intersection.set_lanes(None);
        assert!(intersection.lanes().is_none());
        assert!(intersection.usable_lanes().is_empty());
    }

    #[test]
    fn set_entry_keeps_length_invariant() {
        let mut intersection = Intersection::decode(&sample()).unwrap();
        assert!(intersection.set_entry(vec![true, true, true]).is_ok());
        assert_eq!(intersection.entry(), &[true, true, true]);
        assert!(intersection.set_entry(vec![true]).is_err());
        assert_eq!(intersection.entry(), &[true, true, true]);
    }
}
