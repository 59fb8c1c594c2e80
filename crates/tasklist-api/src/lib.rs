pub mod error;
pub mod routes;
pub mod state;
pub mod todos;
pub mod users;

pub use error::ApiError;
pub use routes::router;
pub use state::{AppState, AppStateInner};
