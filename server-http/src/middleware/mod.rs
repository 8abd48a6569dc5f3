pub mod authentication;

pub use authentication::{authorize_api_key, require_api_key, API_KEY_HEADER, SIGNATURE_HEADER};
