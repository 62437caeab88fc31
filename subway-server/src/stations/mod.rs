//! Station registration and lookup.
//!
//! Lines only ever read stations through [`StationDirectory`]; creating,
//! renaming and deleting them is handled here and by the web layer. With a
//! data directory the registry lives in `stations.json` so ids survive a
//! restart.

mod directory;
mod error;

pub use directory::{StationDirectory, StationRegistry};
pub use error::StationError;
