//! Media storage adapters.
//!
//! - `FsMediaStorage` - Files under a local directory, served at `/media`
//! - `InMemoryMediaStorage` - Test double that records uploads and deletions

mod filesystem;
mod in_memory;

pub use filesystem::FsMediaStorage;
pub use in_memory::InMemoryMediaStorage;
