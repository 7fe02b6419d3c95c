//! Performance benchmarks for stratum-data
//!
//! Run with: cargo bench

use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use stratum_data::datasource::{DataSource, DeleteSource, GetSource, PutSource};
use stratum_data::deferred::Deferred;
use stratum_data::error::DataError;
use stratum_data::operation::Operation;
use stratum_data::query::Query;
use stratum_data::repository::{NetworkStorageRepository, Repository};

#[derive(Clone)]
struct Row {
    id: u64,
    payload: String,
}

struct MemoryStore {
    rows: Mutex<std::collections::HashMap<u64, Row>>,
    hits: AtomicU64,
}

impl MemoryStore {
    fn empty() -> Self {
        Self {
            rows: Mutex::new(std::collections::HashMap::new()),
            hits: AtomicU64::new(0),
        }
    }

    fn seeded(n: u64) -> Self {
        let store = Self::empty();
        let mut rows = store.rows.lock().unwrap();
        for i in 0..n {
            rows.insert(
                i,
                Row {
                    id: i,
                    payload: format!("row-{i}"),
                },
            );
        }
        drop(rows);
        store
    }
}

fn key_of(query: &Query) -> u64 {
    query.as_key().and_then(|k| k.parse().ok()).unwrap_or(0)
}

impl GetSource<Row> for MemoryStore {
    fn get(&self, query: &Query) -> Deferred<Row, DataError> {
        self.hits.fetch_add(1, Ordering::Relaxed);
        match self.rows.lock().unwrap().get(&key_of(query)) {
            Some(row) => Deferred::of_value(row.clone()),
            None => Deferred::of_error(DataError::NotFound(format!("{}", key_of(query)))),
        }
    }
}

impl PutSource<Row> for MemoryStore {
    fn put(&self, value: Option<Row>, query: &Query) -> Deferred<Row, DataError> {
        let row = value.unwrap_or(Row {
            id: key_of(query),
            payload: String::new(),
        });
        self.rows.lock().unwrap().insert(row.id, row.clone());
        Deferred::of_value(row)
    }
}

impl DeleteSource for MemoryStore {}

fn bench_storage_hit(c: &mut Criterion) {
    let network: Arc<dyn DataSource<Row>> = Arc::new(MemoryStore::empty());
    let storage: Arc<dyn DataSource<Row>> = Arc::new(MemoryStore::seeded(1000));
    let repo = NetworkStorageRepository::new(network, storage);

    c.bench_function("StorageSync get (cache hit)", |b| {
        b.iter(|| {
            repo.get(&Query::key("42"), Operation::StorageSync)
                .result()
                .into_result()
                .unwrap()
        });
    });
}

fn bench_storage_miss_falls_through(c: &mut Criterion) {
    let network: Arc<dyn DataSource<Row>> = Arc::new(MemoryStore::seeded(1));
    let storage: Arc<dyn DataSource<Row>> = Arc::new(MemoryStore::empty());
    let repo = NetworkStorageRepository::new(network, storage);

    c.bench_function("StorageSync get (cache miss, network fallback)", |b| {
        b.iter(|| {
            repo.get(&Query::key("0"), Operation::StorageSync)
                .result()
                .into_result()
                .unwrap()
        });
    });
}

fn bench_network_sync_put(c: &mut Criterion) {
    let network: Arc<dyn DataSource<Row>> = Arc::new(MemoryStore::empty());
    let storage: Arc<dyn DataSource<Row>> = Arc::new(MemoryStore::empty());
    let repo = NetworkStorageRepository::new(network, storage);

    c.bench_function("NetworkSync put", |b| {
        b.iter(|| {
            repo.put(
                Some(Row {
                    id: 7,
                    payload: "x".into(),
                }),
                &Query::key("7"),
                Operation::NetworkSync,
            )
            .result()
            .into_result()
            .unwrap()
        });
    });
}

fn bench_deferred_combinator_chain(c: &mut Criterion) {
    c.bench_function("Deferred map/flat_map chain", |b| {
        b.iter(|| {
            Deferred::<i32, DataError>::of_value(1)
                .map(|v| v + 1)
                .flat_map(|v| Deferred::of_value(v * 2))
                .result()
                .into_result()
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_storage_hit,
    bench_storage_miss_falls_through,
    bench_network_sync_put,
    bench_deferred_combinator_chain,
);
criterion_main!(benches);
