pub mod convert;
pub mod error;
pub mod extract;
pub mod images;
pub mod middleware;
pub mod options;
pub mod results;
pub mod routes;
pub mod state;
pub mod topics;
pub mod votes;

pub use routes::router;
pub use state::{AppState, AppStateInner};
