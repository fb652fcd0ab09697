pub mod scorecard;
pub mod scoring_json;

pub use scorecard::{Scorecard, SCORECARD_SCHEMA_VERSION};
pub use scoring_json::{
    get_scorecard_json, handle_request_json, ApiError, ApiResponse, ScoringRequest,
    ScoringResponse, API_VERSION,
};
