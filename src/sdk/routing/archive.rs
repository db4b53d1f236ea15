use serde::{Deserialize, Serialize};
use std::{fs, io::Result as IoResult, path::Path};

use super::error::DecodeError;
use super::intersection::{Coordinate, Intersection};
use super::lane::Lane;

/// Durable form of an [`Intersection`].
///
/// Only the usable lanes are persisted; the full `lanes` sequence is not,
/// so an intersection restored from an archive never has `lanes`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntersectionArchive {
    pub approach_index: Option<usize>,
    pub outlet_index: Option<usize>,
    pub entry: Vec<bool>,
    pub headings: Vec<f64>,
    pub usable_lanes: Vec<Lane>,
    pub location: Coordinate,
}

impl From<&Intersection> for IntersectionArchive {
    fn from(intersection: &Intersection) -> Self {
        // Sorted so that archives of equal intersections are byte-identical.
        let usable_lanes: Vec<Lane> = intersection
            .usable_lanes()
            .sorted()
            .into_iter()
            .cloned()
            .collect();

        Self {
            approach_index: intersection.approach_index(),
            outlet_index: intersection.outlet_index(),
            entry: intersection.entry().to_vec(),
            headings: intersection.headings().to_vec(),
            usable_lanes,
            location: intersection.location(),
        }
    }
}

impl TryFrom<IntersectionArchive> for Intersection {
    type Error = DecodeError;

    fn try_from(archive: IntersectionArchive) -> Result<Self, Self::Error> {
        Intersection::restore(
            archive.approach_index,
            archive.outlet_index,
            archive.location,
            archive.headings,
            archive.entry,
            archive.usable_lanes,
        )
    }
}

impl Intersection {
    pub fn to_archive(&self) -> IntersectionArchive {
        IntersectionArchive::from(self)
    }

    pub fn from_archive(archive: IntersectionArchive) -> Result<Self, DecodeError> {
        Self::try_from(archive)
    }
}

pub fn to_json(intersections: &[Intersection]) -> serde_json::Result<String> {
    let archives: Vec<IntersectionArchive> =
        intersections.iter().map(IntersectionArchive::from).collect();
    serde_json::to_string_pretty(&archives)
}

pub fn from_json(data: &str) -> Result<Vec<Intersection>, DecodeError> {
    let archives: Vec<IntersectionArchive> = serde_json::from_str(data)?;
    archives.into_iter().map(Intersection::try_from).collect()
}

pub fn save_to_file<P: AsRef<Path>>(intersections: &[Intersection], path: P) -> IoResult<()> {
    let data = to_json(intersections)?;
    fs::write(path, data)
}

pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Intersection>, DecodeError> {
    let data = fs::read_to_string(path)?;
    from_json(&data)
}
