use std::path::PathBuf;
use std::sync::Arc;

/// Shared state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Storage root all category directories live under.
    pub root: Arc<PathBuf>,
}

impl AppState {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root: Arc::new(root),
        }
    }
}
