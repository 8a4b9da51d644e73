pub mod recommend;
pub mod render_results;
pub mod search_places;
pub mod types;

pub use recommend::RecommendTask;
pub use render_results::RenderResultsTask;
pub use search_places::SearchPlacesTask;

pub use types::session_keys;
