//! Built-in pipeline stages.
//!
//! | Stage | Kind | Purpose |
//! |-------|------|---------|
//! | [`RequestIdMiddleware`] | middleware | Generate/propagate request ID (UUID v7) |
//! | [`CelebrateMiddleware`] | middleware | Validate request segments |
//! | [`ErrorResponder`] | error handler | Render validation failures |
//!
//! A typical pipeline registers them in that order.

pub mod celebrate;
pub mod errors;
pub mod request_id;

pub use celebrate::CelebrateMiddleware;
pub use errors::ErrorResponder;
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
