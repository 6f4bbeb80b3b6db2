pub mod allocator;
pub mod catalog;
pub mod exclusions;
pub mod preferences;
pub mod recommendations;

pub use allocator::RecommendationAllocator;
pub use catalog::{CatalogClient, HttpCatalogClient};
pub use exclusions::{ExclusionResolver, ExclusionSets, Subject};
pub use recommendations::RecommendationParams;
