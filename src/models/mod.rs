//! Domain models: request descriptors, normalized tweets, normalization and ordering

pub mod normalize;
pub mod request;
pub mod sort;
pub mod tweet;

pub use normalize::{RawPayload, normalize, normalize_user};
pub use request::{Command, MetricFilters, RequestDescriptor, SearchOptions, Since, SortMode, Target};
pub use sort::SortFilter;
pub use tweet::{TweetRecord, UserProfile, VendorProblem};
