/// Context keys shared by the search pipeline tasks
pub mod session_keys {
    /// Validated `RecommendationRequest`
    pub const REQUEST: &str = "request";
    /// `Vec<PlaceRecord>` from the places search
    pub const PLACES: &str = "places";
    /// `RecommendationSet` from the model
    pub const RECOMMENDATIONS: &str = "recommendations";
    /// `PipelineFailure` recorded by whichever task failed
    pub const FAILURE: &str = "failure";
}
