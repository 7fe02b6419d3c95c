//! `NetworkStorageRepository` — the tiered engine (spec §4.3), the heart of
//! this crate. Composes a `network` and a `storage` [`crate::datasource::DataSource`]
//! behind the uniform [`Repository`] surface, with behavior selected per call
//! by [`Operation`].

use super::Repository;
use crate::config::RepositoryConfig;
use crate::datasource::DataSource;
use crate::deferred::Deferred;
use crate::error::DataError;
use crate::operation::Operation;
use crate::query::Query;
use std::sync::Arc;

/// Wraps a `network` and a `storage` data source and encodes read-through,
/// write-through, refresh-on-miss, and sync tiering policy over them.
///
/// Every two-step composition here is strictly sequential via
/// [`Deferred::flat_map`]: the second `DataSource` call begins only after the
/// first succeeds (spec §4.3 "Ordering guarantees"). The one exception is the
/// `StorageSync` read path, which is fallback-on-miss rather than retry.
pub struct NetworkStorageRepository<T> {
    network: Arc<dyn DataSource<T>>,
    storage: Arc<dyn DataSource<T>>,
    config: RepositoryConfig,
}

impl<T: Send + 'static> NetworkStorageRepository<T> {
    /// Build with the default tiering policy (reads `StorageSync`,
    /// writes/deletes `NetworkSync`).
    pub fn new(network: Arc<dyn DataSource<T>>, storage: Arc<dyn DataSource<T>>) -> Self {
        Self::with_config(network, storage, RepositoryConfig::default())
    }

    /// Build with an explicit [`RepositoryConfig`], overriding which concrete
    /// [`Operation`] `Operation::Default` resolves to per method.
    pub fn with_config(
        network: Arc<dyn DataSource<T>>,
        storage: Arc<dyn DataSource<T>>,
        config: RepositoryConfig,
    ) -> Self {
        Self {
            network,
            storage,
            config,
        }
    }
}

fn unrecognized_operation(op: Operation) -> DataError {
    DataError::QueryNotSupported(format!(
        "NetworkStorageRepository does not recognize {op:?} for this call"
    ))
}

impl<T: Send + 'static> Repository<T> for NetworkStorageRepository<T> {
    fn get(&self, query: &Query, op: Operation) -> Deferred<T, DataError> {
        let op = self.config.resolve_get(op);
        let span = tracing::debug_span!("repository.get", ?op);
        let _guard = span.enter();
        match op {
            Operation::Network => self.network.get(query),
            Operation::Storage => self.storage.get(query),
            Operation::NetworkSync => self.network_sync_get(query),
            Operation::StorageSync => self.storage_sync_get(query),
            other => Deferred::of_error(unrecognized_operation(other)),
        }
    }

    fn get_all(&self, query: &Query, op: Operation) -> Deferred<Vec<T>, DataError> {
        let op = self.config.resolve_get(op);
        match op {
            Operation::Network => self.network.get_all(query),
            Operation::Storage => self.storage.get_all(query),
            Operation::NetworkSync => self.network_sync_get_all(query),
            Operation::StorageSync => self.storage_sync_get_all(query),
            other => Deferred::of_error(unrecognized_operation(other)),
        }
    }

    fn put(&self, value: Option<T>, query: &Query, op: Operation) -> Deferred<T, DataError> {
        let op = self.config.resolve_put(op);
        let span = tracing::debug_span!("repository.put", ?op);
        let _guard = span.enter();
        match op {
            Operation::Network => self.network.put(value, query),
            Operation::Storage => self.storage.put(value, query),
            Operation::NetworkSync => self.network_sync_put(value, query),
            Operation::StorageSync => self.storage_sync_put(value, query),
            other => Deferred::of_error(unrecognized_operation(other)),
        }
    }

    fn put_all(&self, values: Vec<T>, query: &Query, op: Operation) -> Deferred<Vec<T>, DataError> {
        let op = self.config.resolve_put(op);
        match op {
            Operation::Network => self.network.put_all(values, query),
            Operation::Storage => self.storage.put_all(values, query),
            Operation::NetworkSync => self.network_sync_put_all(values, query),
            Operation::StorageSync => self.storage_sync_put_all(values, query),
            other => Deferred::of_error(unrecognized_operation(other)),
        }
    }

    fn delete(&self, query: &Query, op: Operation) -> Deferred<(), DataError> {
        let op = self.config.resolve_delete(op);
        let span = tracing::debug_span!("repository.delete", ?op);
        let _guard = span.enter();
        match op {
            Operation::Network => self.network.delete(query),
            Operation::Storage => self.storage.delete(query),
            Operation::NetworkSync => self.network_sync_delete(query),
            Operation::StorageSync => self.storage_sync_delete(query),
            other => Deferred::of_error(unrecognized_operation(other)),
        }
    }

    fn delete_all(&self, query: &Query, op: Operation) -> Deferred<(), DataError> {
        let op = self.config.resolve_delete(op);
        match op {
            Operation::Network => self.network.delete_all(query),
            Operation::Storage => self.storage.delete_all(query),
            Operation::NetworkSync => self.network_sync_delete_all(query),
            Operation::StorageSync => self.storage_sync_delete_all(query),
            other => Deferred::of_error(unrecognized_operation(other)),
        }
    }
}

impl<T: Send + 'static> NetworkStorageRepository<T> {
    fn network_sync_get(&self, query: &Query) -> Deferred<T, DataError> {
        let storage = self.storage.clone();
        let query = query.clone();
        self.network.get(&query).flat_map(move |value| {
            storage.put(Some(value), &query)
        })
    }

    fn network_sync_get_all(&self, query: &Query) -> Deferred<Vec<T>, DataError> {
        let storage = self.storage.clone();
        let query = query.clone();
        self.network.get_all(&query).flat_map(move |values| {
            storage.put_all(values, &query)
        })
    }

    fn storage_sync_get(&self, query: &Query) -> Deferred<T, DataError> {
        let network = self.network.clone();
        let storage = self.storage.clone();
        let query = query.clone();
        self.storage.get(&query).recover(move |err| {
            if err.triggers_network_fallback() {
                tracing::debug!(cause = %err, "storage miss, falling through to network");
                let query2 = query.clone();
                network
                    .get(&query)
                    .flat_map(move |value| storage.put(Some(value), &query2))
            } else {
                Deferred::of_error(err)
            }
        })
    }

    fn storage_sync_get_all(&self, query: &Query) -> Deferred<Vec<T>, DataError> {
        let network = self.network.clone();
        let storage = self.storage.clone();
        let query = query.clone();
        self.storage.get_all(&query).recover(move |err| {
            if err.triggers_network_fallback() {
                tracing::debug!(cause = %err, "storage miss, falling through to network");
                let query2 = query.clone();
                network
                    .get_all(&query)
                    .flat_map(move |values| storage.put_all(values, &query2))
            } else {
                Deferred::of_error(err)
            }
        })
    }

    fn network_sync_put(&self, value: Option<T>, query: &Query) -> Deferred<T, DataError> {
        let storage = self.storage.clone();
        let query = query.clone();
        self.network.put(value, &query).flat_map(move |confirmed| {
            storage.put(Some(confirmed), &query)
        })
    }

    fn network_sync_put_all(&self, values: Vec<T>, query: &Query) -> Deferred<Vec<T>, DataError> {
        let storage = self.storage.clone();
        let query = query.clone();
        self.network
            .put_all(values, &query)
            .flat_map(move |confirmed| storage.put_all(confirmed, &query))
    }

    fn storage_sync_put(&self, value: Option<T>, query: &Query) -> Deferred<T, DataError> {
        let network = self.network.clone();
        let query = query.clone();
        self.storage.put(value, &query).flat_map(move |stored| {
            network.put(Some(stored), &query)
        })
    }

    fn storage_sync_put_all(&self, values: Vec<T>, query: &Query) -> Deferred<Vec<T>, DataError> {
        let network = self.network.clone();
        let query = query.clone();
        self.storage
            .put_all(values, &query)
            .flat_map(move |stored| network.put_all(stored, &query))
    }

    fn network_sync_delete(&self, query: &Query) -> Deferred<(), DataError> {
        let storage = self.storage.clone();
        let query = query.clone();
        self.network.delete(&query).flat_map(move |_| storage.delete(&query))
    }

    fn network_sync_delete_all(&self, query: &Query) -> Deferred<(), DataError> {
        let storage = self.storage.clone();
        let query = query.clone();
        self.network
            .delete_all(&query)
            .flat_map(move |_| storage.delete_all(&query))
    }

    fn storage_sync_delete(&self, query: &Query) -> Deferred<(), DataError> {
        let network = self.network.clone();
        let query = query.clone();
        self.storage.delete(&query).flat_map(move |_| network.delete(&query))
    }

    fn storage_sync_delete_all(&self, query: &Query) -> Deferred<(), DataError> {
        let network = self.network.clone();
        let query = query.clone();
        self.storage
            .delete_all(&query)
            .flat_map(move |_| network.delete_all(&query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::{DeleteSource, GetSource, PutSource};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Clone, Debug, PartialEq)]
    struct User {
        id: String,
        name: String,
    }

    struct FakeSource {
        get_calls: AtomicUsize,
        put_calls: AtomicUsize,
        get_result: Mutex<Option<Result<User, DataError>>>,
        put_transform: Mutex<Option<Box<dyn Fn(User) -> User + Send>>>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                get_calls: AtomicUsize::new(0),
                put_calls: AtomicUsize::new(0),
                get_result: Mutex::new(None),
                put_transform: Mutex::new(None),
            }
        }

        fn returning_get(self, result: Result<User, DataError>) -> Self {
            *self.get_result.lock().unwrap() = Some(result);
            self
        }

        fn transforming_put(self, f: impl Fn(User) -> User + Send + 'static) -> Self {
            *self.put_transform.lock().unwrap() = Some(Box::new(f));
            self
        }
    }

    impl GetSource<User> for FakeSource {
        fn get(&self, _query: &Query) -> Deferred<User, DataError> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            match self.get_result.lock().unwrap().clone() {
                Some(Ok(user)) => Deferred::of_value(user),
                Some(Err(e)) => Deferred::of_error(e),
                None => Deferred::of_error(DataError::NotFound("unset".into())),
            }
        }
    }

    impl PutSource<User> for FakeSource {
        fn put(&self, value: Option<User>, _query: &Query) -> Deferred<User, DataError> {
            self.put_calls.fetch_add(1, Ordering::SeqCst);
            let value = value.expect("test always puts Some");
            let transformed = match self.put_transform.lock().unwrap().as_ref() {
                Some(f) => f(value),
                None => value,
            };
            Deferred::of_value(transformed)
        }
    }

    impl DeleteSource for FakeSource {}

    fn ada() -> User {
        User {
            id: "42".into(),
            name: "Ada".into(),
        }
    }

    #[test]
    fn cache_miss_falls_through_to_network_and_populates_storage() {
        let network = Arc::new(FakeSource::new().returning_get(Ok(ada())));
        let storage =
            Arc::new(FakeSource::new().returning_get(Err(DataError::NotFound("miss".into()))));
        let repo = NetworkStorageRepository::new(network.clone(), storage.clone());

        let result = repo
            .get(&Query::key("user:42"), Operation::StorageSync)
            .result()
            .into_result()
            .unwrap();

        assert_eq!(result, ada());
        assert_eq!(network.get_calls.load(Ordering::SeqCst), 1);
        assert_eq!(storage.get_calls.load(Ordering::SeqCst), 1);
        assert_eq!(storage.put_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cache_hit_short_circuits_and_never_touches_network() {
        let network = Arc::new(FakeSource::new());
        let storage = Arc::new(FakeSource::new().returning_get(Ok(User {
            id: "42".into(),
            name: "Cached".into(),
        })));
        let repo = NetworkStorageRepository::new(network.clone(), storage);

        let result = repo
            .get(&Query::key("user:42"), Operation::StorageSync)
            .result()
            .into_result()
            .unwrap();

        assert_eq!(result.name, "Cached");
        assert_eq!(network.get_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn write_through_preserves_the_server_confirmed_value() {
        let network = Arc::new(FakeSource::new().transforming_put(|mut u| {
            u.id = "99".into();
            u
        }));
        let storage = Arc::new(FakeSource::new());
        let repo = NetworkStorageRepository::new(network, storage);

        let result = repo
            .put(
                Some(User {
                    id: String::new(),
                    name: "X".into(),
                }),
                &Query::key("users"),
                Operation::NetworkSync,
            )
            .result()
            .into_result()
            .unwrap();

        assert_eq!(result.id, "99");
        assert_eq!(result.name, "X");
    }

    #[test]
    fn network_failure_on_put_aborts_the_storage_write() {
        struct AlwaysFails;
        impl GetSource<User> for AlwaysFails {
            fn get(&self, _q: &Query) -> Deferred<User, DataError> {
                Deferred::of_error(DataError::Other("500".into()))
            }
        }
        impl PutSource<User> for AlwaysFails {
            fn put(&self, _v: Option<User>, _q: &Query) -> Deferred<User, DataError> {
                Deferred::of_error(DataError::Other("500".into()))
            }
        }
        impl DeleteSource for AlwaysFails {}
        let network: Arc<dyn DataSource<User>> = Arc::new(AlwaysFails);
        let storage = Arc::new(FakeSource::new());
        let repo = NetworkStorageRepository::new(network, storage.clone());

        let err = repo
            .put(Some(ada()), &Query::key("users"), Operation::NetworkSync)
            .result()
            .into_result()
            .unwrap_err();

        assert!(matches!(err, DataError::Other(ref s) if s == "500"));
        assert_eq!(storage.put_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn non_recoverable_storage_error_does_not_fall_through_to_network() {
        let network = Arc::new(FakeSource::new());
        let storage =
            Arc::new(FakeSource::new().returning_get(Err(DataError::Other("disk-io".into()))));
        let repo = NetworkStorageRepository::new(network.clone(), storage);

        let err = repo
            .get(&Query::key("users/1"), Operation::StorageSync)
            .result()
            .into_result()
            .unwrap_err();

        assert!(matches!(err, DataError::Other(ref s) if s == "disk-io"));
        assert_eq!(network.get_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unrecognized_operation_fails_with_query_not_supported() {
        let network = Arc::new(FakeSource::new());
        let storage = Arc::new(FakeSource::new());
        let repo = NetworkStorageRepository::new(network, storage);

        let err = repo
            .get(&Query::key("x"), Operation::Blank)
            .result()
            .into_result()
            .unwrap_err();

        assert!(matches!(err, DataError::QueryNotSupported(_)));
    }

    #[test]
    fn config_overrides_the_default_operation_used_for_default_calls() {
        let network = Arc::new(FakeSource::new().returning_get(Ok(ada())));
        let storage = Arc::new(FakeSource::new());
        let repo = NetworkStorageRepository::with_config(
            network.clone(),
            storage,
            RepositoryConfig::new().with_default_get(Operation::Network),
        );

        let result = repo
            .get(&Query::key("users/1"), Operation::Default)
            .result()
            .into_result()
            .unwrap();
        assert_eq!(result, ada());
        assert_eq!(network.get_calls.load(Ordering::SeqCst), 1);
    }
}
