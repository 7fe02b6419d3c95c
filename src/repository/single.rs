//! Single-source repositories (spec §4.5): narrow wrappers over one
//! capability, plus a general triple-source variant holding three
//! independent, individually optional, `DataSource` handles.
//!
//! All four accept the `Operation` argument for signature uniformity with
//! [`super::Repository`] and ignore it — there is only one source, so there
//! is nothing to tier between.

use super::Repository;
use crate::datasource::{DeleteSource, GetSource, PutSource};
use crate::deferred::Deferred;
use crate::error::DataError;
use crate::operation::Operation;
use crate::query::Query;
use std::sync::Arc;

/// Delegates every read to a single [`GetSource`]; `put`/`delete` are
/// unimplemented.
pub struct GetOnlyRepository<T, S> {
    source: Arc<S>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T, S> GetOnlyRepository<T, S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T, S> Repository<T> for GetOnlyRepository<T, S>
where
    T: Send + 'static,
    S: GetSource<T> + 'static,
{
    fn get(&self, query: &Query, _op: Operation) -> Deferred<T, DataError> {
        self.source.get(query)
    }

    fn get_all(&self, query: &Query, _op: Operation) -> Deferred<Vec<T>, DataError> {
        self.source.get_all(query)
    }

    fn put(&self, _value: Option<T>, _query: &Query, _op: Operation) -> Deferred<T, DataError> {
        Deferred::of_error(DataError::Unimplemented("put on a get-only repository".into()))
    }

    fn put_all(
        &self,
        _values: Vec<T>,
        _query: &Query,
        _op: Operation,
    ) -> Deferred<Vec<T>, DataError> {
        Deferred::of_error(DataError::Unimplemented(
            "put_all on a get-only repository".into(),
        ))
    }

    fn delete(&self, _query: &Query, _op: Operation) -> Deferred<(), DataError> {
        Deferred::of_error(DataError::Unimplemented(
            "delete on a get-only repository".into(),
        ))
    }

    fn delete_all(&self, _query: &Query, _op: Operation) -> Deferred<(), DataError> {
        Deferred::of_error(DataError::Unimplemented(
            "delete_all on a get-only repository".into(),
        ))
    }
}

/// Delegates every write to a single [`PutSource`]; `get`/`delete` are
/// unimplemented.
pub struct PutOnlyRepository<T, S> {
    source: Arc<S>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T, S> PutOnlyRepository<T, S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T, S> Repository<T> for PutOnlyRepository<T, S>
where
    T: Send + 'static,
    S: PutSource<T> + 'static,
{
    fn get(&self, _query: &Query, _op: Operation) -> Deferred<T, DataError> {
        Deferred::of_error(DataError::Unimplemented("get on a put-only repository".into()))
    }

    fn get_all(&self, _query: &Query, _op: Operation) -> Deferred<Vec<T>, DataError> {
        Deferred::of_error(DataError::Unimplemented(
            "get_all on a put-only repository".into(),
        ))
    }

    fn put(&self, value: Option<T>, query: &Query, _op: Operation) -> Deferred<T, DataError> {
        self.source.put(value, query)
    }

    fn put_all(
        &self,
        values: Vec<T>,
        query: &Query,
        _op: Operation,
    ) -> Deferred<Vec<T>, DataError> {
        self.source.put_all(values, query)
    }

    fn delete(&self, _query: &Query, _op: Operation) -> Deferred<(), DataError> {
        Deferred::of_error(DataError::Unimplemented(
            "delete on a put-only repository".into(),
        ))
    }

    fn delete_all(&self, _query: &Query, _op: Operation) -> Deferred<(), DataError> {
        Deferred::of_error(DataError::Unimplemented(
            "delete_all on a put-only repository".into(),
        ))
    }
}

/// Delegates every delete to a single [`DeleteSource`]; `get`/`put` are
/// unimplemented.
pub struct DeleteOnlyRepository<T, S> {
    source: Arc<S>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T, S> DeleteOnlyRepository<T, S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T, S> Repository<T> for DeleteOnlyRepository<T, S>
where
    T: Send + 'static,
    S: DeleteSource + 'static,
{
    fn get(&self, _query: &Query, _op: Operation) -> Deferred<T, DataError> {
        Deferred::of_error(DataError::Unimplemented(
            "get on a delete-only repository".into(),
        ))
    }

    fn get_all(&self, _query: &Query, _op: Operation) -> Deferred<Vec<T>, DataError> {
        Deferred::of_error(DataError::Unimplemented(
            "get_all on a delete-only repository".into(),
        ))
    }

    fn put(&self, _value: Option<T>, _query: &Query, _op: Operation) -> Deferred<T, DataError> {
        Deferred::of_error(DataError::Unimplemented(
            "put on a delete-only repository".into(),
        ))
    }

    fn put_all(
        &self,
        _values: Vec<T>,
        _query: &Query,
        _op: Operation,
    ) -> Deferred<Vec<T>, DataError> {
        Deferred::of_error(DataError::Unimplemented(
            "put_all on a delete-only repository".into(),
        ))
    }

    fn delete(&self, query: &Query, _op: Operation) -> Deferred<(), DataError> {
        self.source.delete(query)
    }

    fn delete_all(&self, query: &Query, _op: Operation) -> Deferred<(), DataError> {
        self.source.delete_all(query)
    }
}

/// Holds three independent, individually optional, data-source handles for
/// get/put/delete. Invoking a capability whose source is absent is a
/// programming error: it panics rather than returning a data error, per
/// spec §4.5 and §7.
pub struct GeneralRepository<T> {
    get_source: Option<Arc<dyn GetSource<T>>>,
    put_source: Option<Arc<dyn PutSource<T>>>,
    delete_source: Option<Arc<dyn DeleteSource>>,
}

impl<T: Send + 'static> GeneralRepository<T> {
    /// No sources configured; every call will panic until one is set via
    /// the `with_*` builders.
    pub fn new() -> Self {
        Self {
            get_source: None,
            put_source: None,
            delete_source: None,
        }
    }

    pub fn with_get_source(mut self, source: Arc<dyn GetSource<T>>) -> Self {
        self.get_source = Some(source);
        self
    }

    pub fn with_put_source(mut self, source: Arc<dyn PutSource<T>>) -> Self {
        self.put_source = Some(source);
        self
    }

    pub fn with_delete_source(mut self, source: Arc<dyn DeleteSource>) -> Self {
        self.delete_source = Some(source);
        self
    }
}

impl<T: Send + 'static> Default for GeneralRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Repository<T> for GeneralRepository<T> {
    fn get(&self, query: &Query, _op: Operation) -> Deferred<T, DataError> {
        self.get_source
            .as_ref()
            .expect("GeneralRepository::get called with no get_source configured")
            .get(query)
    }

    fn get_all(&self, query: &Query, _op: Operation) -> Deferred<Vec<T>, DataError> {
        self.get_source
            .as_ref()
            .expect("GeneralRepository::get_all called with no get_source configured")
            .get_all(query)
    }

    fn put(&self, value: Option<T>, query: &Query, _op: Operation) -> Deferred<T, DataError> {
        self.put_source
            .as_ref()
            .expect("GeneralRepository::put called with no put_source configured")
            .put(value, query)
    }

    fn put_all(
        &self,
        values: Vec<T>,
        query: &Query,
        _op: Operation,
    ) -> Deferred<Vec<T>, DataError> {
        self.put_source
            .as_ref()
            .expect("GeneralRepository::put_all called with no put_source configured")
            .put_all(values, query)
    }

    fn delete(&self, query: &Query, _op: Operation) -> Deferred<(), DataError> {
        self.delete_source
            .as_ref()
            .expect("GeneralRepository::delete called with no delete_source configured")
            .delete(query)
    }

    fn delete_all(&self, query: &Query, _op: Operation) -> Deferred<(), DataError> {
        self.delete_source
            .as_ref()
            .expect("GeneralRepository::delete_all called with no delete_source configured")
            .delete_all(query)
    }
}
