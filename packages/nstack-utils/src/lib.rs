pub mod http;
pub mod locale;
pub mod time;
pub mod versioning;

// Re-export main utilities
pub use http::{get, http_status_is_ok, parse_uri, post_form, HttpError, ResponseData};
pub use locale::accept_language;
pub use versioning::Version;
