//! reading-store: Storage layer for the reading platform export and tagging services
//!
//! This crate provides:
//! - PostgreSQL access to the reading data exports draw from
//! - The export audit log and saved export templates
//! - Tag definitions and polymorphic tag relations
//! - Migration management
//!
//! # Architecture
//!
//! Handlers program against the repository traits in [`repository`]; the
//! PostgreSQL [`Store`] implements all of them, and with the `test-support`
//! feature so does the in-memory `MemoryStore`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use reading_store::{ExportRepository, Store, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let store = Store::connect(config).await?;
//!
//! let documents = store.documents(user, Some(&[1, 2, 3])).await?;
//! ```

pub mod error;
pub mod exports;
pub mod history;
pub mod models;
pub mod repository;
pub mod schema;
pub mod store;
pub mod tags;
pub mod templates;

#[cfg(feature = "test-support")]
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use models::*;
pub use repository::{
    Backend, ExportRepository, HistoryRepository, SessionRepository, TagRepository,
    TemplateRepository,
};
pub use store::{Store, StoreConfig};
pub use templates::mint_template_id;

#[cfg(feature = "test-support")]
pub use memory::MemoryStore;

// Re-export reading-core for downstream crates
pub use reading_core;
