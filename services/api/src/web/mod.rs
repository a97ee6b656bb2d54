pub mod medications;
pub mod rest;
pub mod routes;
pub mod state;
pub mod takes;
pub mod treatment_medications;
pub mod treatments;
pub mod users;
pub mod validation;

// Re-export what the binaries need to assemble the server.
pub use rest::ApiDoc;
pub use routes::{build_router, cors_layer};
pub use state::AppState;
