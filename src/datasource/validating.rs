//! The validating decorator: the only concrete `DataSource` the core ships
//! (spec §4.2). Wraps an inner source and an [`ObjectValidator`], rejecting
//! values the validator declares stale or unacceptable.

use super::{DeleteSource, GetSource, PutSource};
use crate::deferred::Deferred;
use crate::error::DataError;
use crate::query::Query;
use std::sync::Arc;

/// Stateless verdict on whether an entity is still acceptable to hand back
/// to a caller.
pub trait ObjectValidator<T>: Send + Sync {
    /// True if `entity` should be delivered as-is.
    fn is_valid(&self, entity: &T) -> bool;
}

/// Wraps any `F: Fn(&T) -> bool` as an [`ObjectValidator`], so callers don't
/// need a named type for a one-off check.
impl<T, F> ObjectValidator<T> for F
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn is_valid(&self, entity: &T) -> bool {
        self(entity)
    }
}

/// Decorates an inner `GetSource`/`PutSource`/`DeleteSource` with an
/// [`ObjectValidator`] pass on `get`/`get_all`.
///
/// `put`/`put_all`/`delete`/`delete_all` are transparent — the validator only
/// ever inspects data flowing back out to a caller.
pub struct ValidatingDataSource<T, S, V> {
    inner: Arc<S>,
    validator: Arc<V>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T, S, V> ValidatingDataSource<T, S, V> {
    /// Wrap `inner`, validating entities it returns against `validator`.
    pub fn new(inner: Arc<S>, validator: Arc<V>) -> Self {
        Self {
            inner,
            validator,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T, S, V> GetSource<T> for ValidatingDataSource<T, S, V>
where
    T: Send + 'static,
    S: GetSource<T>,
    V: ObjectValidator<T> + 'static,
{
    fn get(&self, query: &Query) -> Deferred<T, DataError> {
        let validator = self.validator.clone();
        self.inner.get(query).flat_map(move |entity| {
            if validator.is_valid(&entity) {
                Deferred::of_value(entity)
            } else {
                tracing::debug!("validating data source rejected an entity as stale");
                Deferred::of_error(DataError::NotValid(
                    "entity rejected by validator".into(),
                ))
            }
        })
    }

    fn get_all(&self, query: &Query) -> Deferred<Vec<T>, DataError> {
        let validator = self.validator.clone();
        self.inner.get_all(query).flat_map(move |entities| {
            if entities.iter().all(|e| validator.is_valid(e)) {
                Deferred::of_value(entities)
            } else {
                tracing::debug!(
                    count = entities.len(),
                    "validating data source rejected a batch containing a stale entity"
                );
                Deferred::of_error(DataError::NotValid(
                    "batch contained an entity rejected by validator".into(),
                ))
            }
        })
    }
}

impl<T, S, V> PutSource<T> for ValidatingDataSource<T, S, V>
where
    T: Send + 'static,
    S: PutSource<T>,
    V: Send + Sync,
{
    fn put(&self, value: Option<T>, query: &Query) -> Deferred<T, DataError> {
        self.inner.put(value, query)
    }

    fn put_all(&self, values: Vec<T>, query: &Query) -> Deferred<Vec<T>, DataError> {
        self.inner.put_all(values, query)
    }
}

impl<T, S, V> DeleteSource for ValidatingDataSource<T, S, V>
where
    T: Send + Sync + 'static,
    S: DeleteSource,
    V: Send + Sync,
{
    fn delete(&self, query: &Query) -> Deferred<(), DataError> {
        self.inner.delete(query)
    }

    fn delete_all(&self, query: &Query) -> Deferred<(), DataError> {
        self.inner.delete_all(query)
    }
}
