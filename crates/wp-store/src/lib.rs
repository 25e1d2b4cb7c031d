//! Hierarchical path-addressed object store for The Week Project.
//!
//! A dotted [`Location`] such as `user.chilts.project` names a chain of
//! nested containers. Containers hold child containers and leaf entries; a
//! leaf is a `(local key, encoded record)` pair. The store maps this
//! namespace onto an embedded LMDB environment.
//!
//! # Layers
//!
//! - [`location`]: parse and build dotted locations
//! - [`container`]: walk (and create) the container chain of a location
//! - [`codec`]: self-describing record encoding
//! - [`txn`]: read-write and read-only transactions
//! - [`children`]: ordered, lazy enumeration of a container's leaves
//! - [`store`]: the shared handle and the one-shot `write` / `read` /
//!   `list_children` primitives
//!
//! # Design Rules
//!
//! 1. Within one container a name is either a child container or a leaf,
//!    never both.
//! 2. Creating the container chain and writing the leaf commit together or
//!    not at all.
//! 3. One writer at a time; readers see a stable snapshot and never block.
//! 4. Listing an absent location is empty, not an error.
//! 5. No caching: every read walks the chain again.

pub mod children;
pub mod codec;
pub mod config;
pub mod container;
pub mod error;
pub mod location;
pub mod store;
pub mod txn;

pub use children::Children;
pub use config::{DecodePolicy, StoreConfig};
pub use container::{ContainerId, MAX_NAME_LEN};
pub use error::{ErrorKind, StoreError, StoreResult};
pub use location::{Location, SEPARATOR};
pub use store::Store;
pub use txn::{ReadTxn, WriteTxn};
