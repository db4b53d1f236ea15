pub mod sdk;

pub use sdk::config::ExplainConfig;
pub use sdk::routing::{
    Cause, Coordinate, DecodeError, DirectionsError, Explain, Intersection, IntersectionArchive,
    Lane, LaneIndication, LocaleContext, ResponseMetadata, UsableLanes,
};
