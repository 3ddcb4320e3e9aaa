mod errors;
mod gate;
mod routes;

pub use errors::{Error, Result};
pub use gate::{AuthGate, AuthState};
pub use routes::router;
