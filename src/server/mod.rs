mod handlers;
mod models;
mod render;
mod state;

pub use handlers::{run_server, serve};
pub use models::normalize_caption;
pub use state::ServerState;
