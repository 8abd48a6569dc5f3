pub mod requests;
pub mod responses;

pub use requests::{ClearAllQuery, HistoryQuery, InvalidateCacheRequest};
pub use responses::{
    ErrorResponse, HealthResponse, HistoryResponse, InvalidateResponse, WebhookResponse,
};
