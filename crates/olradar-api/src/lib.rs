pub mod error;
pub mod log;
pub mod nearby;
pub mod photos;
pub mod routes;
pub mod state;
pub mod stats;
pub mod venues;

pub use routes::router;
pub use state::{AppState, AppStateInner, Clock};
