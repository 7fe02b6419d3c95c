//! # stratum-data
//!
//! A client-side data-access core that unifies a fast but possibly stale
//! local store with an authoritative but slower remote store behind one
//! uniform interface.
//!
//! ## Overview
//!
//! Three layers compose bottom-up:
//!
//! - [`deferred::Deferred`] — a single-shot, race-free async result cell.
//!   Every operation in this crate returns one.
//! - [`datasource`] — the `Get`/`Put`/`Delete` capability traits a concrete
//!   backend (a key-value store, an HTTP client, an on-disk cache, ...)
//!   implements, keyed by an opaque [`query::Query`].
//! - [`repository::Repository`] — the orchestration layer. The interesting
//!   member is [`repository::tiered::NetworkStorageRepository`], which
//!   composes a `network` and a `storage` data source and picks read-through,
//!   write-through, refresh-on-miss, and sync behavior per call via
//!   [`operation::Operation`].
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use stratum_data::datasource::{DataSource, DeleteSource, GetSource, PutSource};
//! use stratum_data::deferred::Deferred;
//! use stratum_data::error::DataError;
//! use stratum_data::operation::Operation;
//! use stratum_data::query::Query;
//! use stratum_data::repository::{NetworkStorageRepository, Repository};
//!
//! #[derive(Clone)]
//! struct User {
//!     name: String,
//! }
//!
//! struct InMemory(std::sync::Mutex<Option<User>>);
//! impl GetSource<User> for InMemory {
//!     fn get(&self, _q: &Query) -> Deferred<User, DataError> {
//!         match self.0.lock().unwrap().clone() {
//!             Some(u) => Deferred::of_value(u),
//!             None => Deferred::of_error(DataError::NotFound("empty".into())),
//!         }
//!     }
//! }
//! impl PutSource<User> for InMemory {
//!     fn put(&self, value: Option<User>, _q: &Query) -> Deferred<User, DataError> {
//!         let value = value.expect("example always puts Some");
//!         *self.0.lock().unwrap() = Some(value.clone());
//!         Deferred::of_value(value)
//!     }
//! }
//! impl DeleteSource for InMemory {}
//!
//! # fn example() {
//! let network: Arc<dyn DataSource<User>> = Arc::new(InMemory(std::sync::Mutex::new(Some(
//!     User { name: "Ada".into() },
//! ))));
//! let storage: Arc<dyn DataSource<User>> = Arc::new(InMemory(std::sync::Mutex::new(None)));
//! let repo = NetworkStorageRepository::new(network, storage);
//!
//! // Cache miss: falls through to network, then populates storage.
//! let user = repo
//!     .get(&Query::key("users/1"), Operation::StorageSync)
//!     .result()
//!     .into_result()
//!     .unwrap();
//! assert_eq!(user.name, "Ada");
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`deferred::Deferred`] — the async primitive: construction forms,
//!   `set`/`on_set`/`on`/`then`/`fail`/`result`/`clear`, and the
//!   [`deferred::combinators`] (`map`, `flat_map`, `recover`, `zip`, ...).
//! - [`datasource`] — the `GetSource`/`PutSource`/`DeleteSource` sub-traits,
//!   the blanket `DataSource` bound, and [`datasource::ValidatingDataSource`],
//!   the one concrete decorator the core ships.
//! - [`repository`] — [`repository::tiered::NetworkStorageRepository`] (the
//!   tiered engine), [`repository::mapping::MappingRepository`], and the
//!   single-source variants in [`repository::single`].
//! - [`config::RepositoryConfig`] — overridable per-method tiering defaults.
//! - [`delivery`] — the `DeliveryQueue` trait callbacks are dispatched
//!   through, plus the bundled `InlineQueue` and (behind the `tokio-queue`
//!   feature) `TokioQueue` implementations.
//! - [`error::DataError`] — the closed error taxonomy data sources and
//!   repositories resolve a failed `Deferred` with.
//!
//! ## Non-goals
//!
//! Offline write-queues, conflict resolution beyond last-write-wins at each
//! tier, multi-key transactional atomicity, and push/subscription streams
//! are out of scope for this crate. Concrete backends, object-to-entity
//! mapping beyond [`repository::mapping::MappingRepository`]'s bidirectional
//! closures, dependency-injection assembly, and executor implementations
//! beyond the [`delivery::DeliveryQueue`] contract are external collaborators.

pub mod config;
pub mod datasource;
pub mod deferred;
pub mod delivery;
pub mod error;
pub mod operation;
pub mod query;
pub mod repository;

pub use config::RepositoryConfig;
pub use datasource::{DataSource, DeleteSource, GetSource, ObjectValidator, PutSource, ValidatingDataSource};
pub use deferred::{Deferred, Outcome, Resolver};
pub use delivery::{DeliveryQueue, InlineQueue};
pub use error::{DataError, Result};
pub use operation::Operation;
pub use query::Query;
pub use repository::{
    DeleteOnlyRepository, GeneralRepository, GetOnlyRepository, MappingRepository,
    NetworkStorageRepository, PutOnlyRepository, Repository,
};

#[cfg(feature = "tokio-queue")]
pub use delivery::TokioQueue;
