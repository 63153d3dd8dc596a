//! Ser Recicla API - REST server for the university recycling program
//!
//! Provides JWT authentication with an access/refresh pair, an exact-match
//! role gate, and CRUD endpoints for the institutional hierarchy and the
//! recycling workflow.

pub mod audit;
pub mod auth;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod institutional;
pub mod middleware;
pub mod recycling;
pub mod routes;
pub mod state;

pub use error::{ApiError, AppError};
pub use routes::{create_router, ApiDoc};
pub use state::AppState;
