//! Application state for the web layer.

use std::sync::Arc;

use crate::service::LineService;
use crate::stations::StationRegistry;
use crate::store::AnyLineStore;

/// The line service as wired by the server.
pub type Lines = LineService<StationRegistry, AnyLineStore>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Station registry (also the directory the line service reads from)
    pub stations: StationRegistry,

    /// Line operations
    pub lines: Arc<Lines>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(stations: StationRegistry, lines: Lines) -> Self {
        Self {
            stations,
            lines: Arc::new(lines),
        }
    }
}
