// --- File: crates/slotwise_common/src/lib.rs ---

pub mod error; // Error handling
pub mod features; // Runtime feature switches
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Booking domain models
pub mod services; // Service abstractions

pub use error::{Context, HttpStatusCode, SlotwiseError};

pub use http::{client::HTTP_CLIENT, error_response, IntoHttpResponse};

pub use logging::{init, init_from_config, init_with_level};

pub use features::{is_email_enabled, is_feature_enabled, is_gcal_enabled};
