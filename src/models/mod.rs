pub mod preference;
pub mod recommendation;

pub use preference::{AddPreferencesRequest, AddPreferencesResponse, GenrePreference, PreferenceView};
pub use recommendation::{
    CandidateItem, ContentKind, ContentType, RecommendationQuery, RecommendationResult,
    MAX_LIMIT, MIN_LIMIT,
};
