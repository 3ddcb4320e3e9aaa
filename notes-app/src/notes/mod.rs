mod form;
mod handlers;
mod model;
pub mod query;
mod routes;
mod store;

pub use model::*;
pub use query::{NoteQuery, View, ViewCounts};
pub use routes::router;
pub use store::{Deletion, NoteStore};
