pub mod archive;
pub mod classify;
pub mod error;
pub mod explain;
pub mod intersection;
pub mod lane;
pub mod locale;

pub use archive::IntersectionArchive;
pub use error::{Cause, DecodeError, DirectionsError, ResponseMetadata};
pub use explain::Explain;
pub use intersection::{Coordinate, Intersection, RawIntersection, UsableLanes};
pub use lane::{Lane, LaneIndication};
pub use locale::LocaleContext;
