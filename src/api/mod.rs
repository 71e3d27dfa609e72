pub mod request;
pub mod response;
pub mod routes;

pub use request::{EvaluationRequest, IngestError, LinkRequest};
pub use response::{ErrorResponse, EvaluationResponse};
pub use routes::{create_router, AppState};
