//! Store-backed CRUD handlers for registered entities.
//!
//! [`StoreCrud::attach_entity`] registers an entity with a [`RestEngine`]
//! and serves `GET`, `POST`, `PUT`, `PATCH` and `DELETE` for it from any
//! [`DocumentStore`]. Documents live in the collection named after the
//! entity path (`user-profile` is stored in `userProfile`).
//!
//! [`RestEngine`]: crate::engine::RestEngine

mod handlers;
mod memory;
mod search_meta;
mod store;

pub use handlers::{CRUD_PRIORITY, CrudConfig, CrudOp, StoreCrud};
pub use memory::MemoryStore;
pub use search_meta::{DEFAULT_LIMIT, SearchMeta};
pub use store::{Document, DocumentStore, Query};
