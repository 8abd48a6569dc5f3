// Public API
pub mod api_key;
pub mod signature;

// Re-export commonly used types
pub use api_key::{redact, ApiKeySet};
pub use signature::WebhookSigner;
