//! `Repository<T>` — the orchestration layer over one or more
//! [`crate::datasource`]s, parameterized per call by an [`Operation`].
//!
//! Three families live here, mirroring the teacher's split between a thin
//! `EventProvider` trait and the richer `EventBus` built on top of it:
//!
//! - [`tiered::NetworkStorageRepository`] — the heart of the engine (spec §4.3).
//! - [`mapping::MappingRepository`] — bidirectional type adaptation (spec §4.4).
//! - [`single::GetOnlyRepository`], [`single::PutOnlyRepository`],
//!   [`single::DeleteOnlyRepository`], [`single::GeneralRepository`] — narrow
//!   and general single-source variants (spec §4.5).

pub mod mapping;
pub mod single;
pub mod tiered;

use crate::deferred::Deferred;
use crate::error::DataError;
use crate::operation::Operation;
use crate::query::Query;

/// The repository surface: the same six capabilities as [`crate::datasource`],
/// each call additionally carrying an [`Operation`] that selects tiering
/// policy.
pub trait Repository<T: Send + 'static>: Send + Sync {
    /// Fetch a single entity matching `query` under `op`.
    fn get(&self, query: &Query, op: Operation) -> Deferred<T, DataError>;

    /// Fetch all entities matching `query` under `op`.
    fn get_all(&self, query: &Query, op: Operation) -> Deferred<Vec<T>, DataError>;

    /// Write `value` at `query` under `op`, returning the stored form.
    fn put(&self, value: Option<T>, query: &Query, op: Operation) -> Deferred<T, DataError>;

    /// Write a batch of entities under `op`.
    fn put_all(&self, values: Vec<T>, query: &Query, op: Operation) -> Deferred<Vec<T>, DataError>;

    /// Delete the single entity matching `query` under `op`.
    fn delete(&self, query: &Query, op: Operation) -> Deferred<(), DataError>;

    /// Delete all entities matching `query` under `op`.
    fn delete_all(&self, query: &Query, op: Operation) -> Deferred<(), DataError>;
}

pub use mapping::MappingRepository;
pub use single::{DeleteOnlyRepository, GeneralRepository, GetOnlyRepository, PutOnlyRepository};
pub use tiered::NetworkStorageRepository;
