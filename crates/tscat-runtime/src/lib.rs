#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod resolver;
mod store;

pub use crate::config::{CatalogSource, EngineConfig, load_config, load_config_or_default};
pub use crate::error::{RuntimeError, RuntimeResult};
pub use crate::loader::{
    LoadFailure, LoadReport, bootstrap, bootstrap_global, bootstrap_with_store, install, load_all,
    load_from_config, parse_sha256, read_catalog, sha256,
};
pub use crate::resolver::{
    MessageRequest, MessageResolver, MissingMessage, MissingMessageHook, ResolverOptions,
    TracingHook,
};
pub use crate::store::{CatalogStore, Snapshot};
