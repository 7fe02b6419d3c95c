//! `DataSource<T>` — a single-tier read/write/delete capability.
//!
//! Split into `GetSource`/`PutSource`/`DeleteSource` per the redesign noted
//! alongside the original description of this trait, so a backend can
//! implement only the capability subset it actually supports and still
//! type-check against the unified `DataSource<T>` bound the tiered engine
//! requires.

mod validating;

pub use validating::{ObjectValidator, ValidatingDataSource};

use crate::deferred::Deferred;
use crate::error::DataError;
use crate::query::Query;

/// Read capability.
pub trait GetSource<T: Send + 'static>: Send + Sync {
    /// Fetch a single entity matching `query`.
    fn get(&self, query: &Query) -> Deferred<T, DataError> {
        let _ = query;
        Deferred::of_error(DataError::Unimplemented("get".into()))
    }

    /// Fetch all entities matching `query`.
    fn get_all(&self, query: &Query) -> Deferred<Vec<T>, DataError> {
        let _ = query;
        Deferred::of_error(DataError::Unimplemented("get_all".into()))
    }
}

/// Write capability.
pub trait PutSource<T: Send + 'static>: Send + Sync {
    /// Write `value` (or clear it, for `None`) at `query`, returning the
    /// entity as the backend now understands it.
    fn put(&self, value: Option<T>, query: &Query) -> Deferred<T, DataError> {
        let _ = (value, query);
        Deferred::of_error(DataError::Unimplemented("put".into()))
    }

    /// Write a batch of entities.
    fn put_all(&self, values: Vec<T>, query: &Query) -> Deferred<Vec<T>, DataError> {
        let _ = (values, query);
        Deferred::of_error(DataError::Unimplemented("put_all".into()))
    }
}

/// Delete capability.
pub trait DeleteSource: Send + Sync {
    /// Delete the single entity matching `query`.
    fn delete(&self, query: &Query) -> Deferred<(), DataError> {
        let _ = query;
        Deferred::of_error(DataError::Unimplemented("delete".into()))
    }

    /// Delete all entities matching `query`.
    fn delete_all(&self, query: &Query) -> Deferred<(), DataError> {
        let _ = query;
        Deferred::of_error(DataError::Unimplemented("delete_all".into()))
    }
}

/// The full read/write/delete capability, automatically implemented for
/// anything that implements the three narrower traits.
pub trait DataSource<T: Send + 'static>: GetSource<T> + PutSource<T> + DeleteSource {}

impl<T: Send + 'static, S> DataSource<T> for S where S: GetSource<T> + PutSource<T> + DeleteSource {}
