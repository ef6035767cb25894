//! console-sources - API Console source staging
//!
//! Resolves a versioned API Console front-end bundle from GitHub releases,
//! a remote zip, or a local path, and stages it into a destination
//! directory. Release archives are cached per tag under the user's
//! application-data folder.

pub mod cache;
pub mod cli;
pub mod error;
pub mod extract;
pub mod options;
pub mod release;
pub mod resolver;
pub mod transport;

pub use error::{SourcesError, SourcesResult};
pub use options::SourceOptions;
pub use resolver::SourcesResolver;
