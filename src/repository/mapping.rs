//! `MappingRepository<T, U, R>` — wraps an inner `Repository<U>` behind a
//! bidirectional `T <-> U` type mapping (spec §4.4).

use super::Repository;
use crate::deferred::Deferred;
use crate::error::DataError;
use crate::operation::Operation;
use crate::query::Query;
use std::marker::PhantomData;
use std::sync::Arc;

/// Adapts an inner `Repository<U>` to the `Repository<T>` surface via two
/// fallible mapper closures.
///
/// `get`/`get_all` map the inner result `U -> T`; `put`/`put_all` map the
/// input `T -> U`, call the inner repository, then map its response back
/// `U -> T`; `delete`/`delete_all` pass through untouched. The `Operation`
/// argument passes through unchanged in every case.
pub struct MappingRepository<T, U, R> {
    inner: Arc<R>,
    to_outer: Arc<dyn Fn(U) -> Result<T, DataError> + Send + Sync>,
    to_inner: Arc<dyn Fn(T) -> Result<U, DataError> + Send + Sync>,
    _marker: PhantomData<fn() -> (T, U)>,
}

impl<T, U, R> MappingRepository<T, U, R>
where
    T: Send + 'static,
    U: Send + 'static,
    R: Repository<U>,
{
    /// Wrap `inner`, converting between `T` (this repository's surface) and
    /// `U` (the inner repository's surface) via `to_outer`/`to_inner`.
    pub fn new(
        inner: Arc<R>,
        to_outer: impl Fn(U) -> Result<T, DataError> + Send + Sync + 'static,
        to_inner: impl Fn(T) -> Result<U, DataError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner,
            to_outer: Arc::new(to_outer),
            to_inner: Arc::new(to_inner),
            _marker: PhantomData,
        }
    }
}

impl<T, U, R> Repository<T> for MappingRepository<T, U, R>
where
    T: Send + 'static,
    U: Send + 'static,
    R: Repository<U>,
{
    fn get(&self, query: &Query, op: Operation) -> Deferred<T, DataError> {
        let to_outer = self.to_outer.clone();
        self.inner
            .get(query, op)
            .flat_map(move |u| match to_outer(u) {
                Ok(t) => Deferred::of_value(t),
                Err(e) => Deferred::of_error(e),
            })
    }

    fn get_all(&self, query: &Query, op: Operation) -> Deferred<Vec<T>, DataError> {
        let to_outer = self.to_outer.clone();
        self.inner
            .get_all(query, op)
            .flat_map(move |items| match map_all(items, &to_outer) {
                Ok(ts) => Deferred::of_value(ts),
                Err(e) => Deferred::of_error(e),
            })
    }

    fn put(&self, value: Option<T>, query: &Query, op: Operation) -> Deferred<T, DataError> {
        let to_inner = self.to_inner.clone();
        let to_outer = self.to_outer.clone();
        let mapped = match value.map(|v| to_inner(v)).transpose() {
            Ok(u) => u,
            Err(e) => return Deferred::of_error(e),
        };
        self.inner
            .put(mapped, query, op)
            .flat_map(move |u| match to_outer(u) {
                Ok(t) => Deferred::of_value(t),
                Err(e) => Deferred::of_error(e),
            })
    }

    fn put_all(&self, values: Vec<T>, query: &Query, op: Operation) -> Deferred<Vec<T>, DataError> {
        let to_inner = self.to_inner.clone();
        let to_outer = self.to_outer.clone();
        let mapped = match map_all(values, &to_inner) {
            Ok(us) => us,
            Err(e) => return Deferred::of_error(e),
        };
        self.inner
            .put_all(mapped, query, op)
            .flat_map(move |items| match map_all(items, &to_outer) {
                Ok(ts) => Deferred::of_value(ts),
                Err(e) => Deferred::of_error(e),
            })
    }

    fn delete(&self, query: &Query, op: Operation) -> Deferred<(), DataError> {
        self.inner.delete(query, op)
    }

    fn delete_all(&self, query: &Query, op: Operation) -> Deferred<(), DataError> {
        self.inner.delete_all(query, op)
    }
}

fn map_all<A, B>(
    items: Vec<A>,
    f: &(impl Fn(A) -> Result<B, DataError> + ?Sized),
) -> Result<Vec<B>, DataError> {
    items.into_iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::{DataSource, DeleteSource, GetSource, PutSource};
    use std::sync::Mutex;

    #[derive(Clone, Debug, PartialEq)]
    struct Dto {
        id: String,
        name: String,
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Domain {
        id: String,
        display_name: String,
    }

    fn dto_to_domain(dto: Dto) -> Result<Domain, DataError> {
        Ok(Domain {
            id: dto.id,
            display_name: dto.name,
        })
    }

    fn domain_to_dto(domain: Domain) -> Result<Dto, DataError> {
        Ok(Dto {
            id: domain.id,
            name: domain.display_name,
        })
    }

    struct EchoSource {
        stored: Mutex<Option<Dto>>,
    }

    impl GetSource<Dto> for EchoSource {
        fn get(&self, _q: &Query) -> Deferred<Dto, DataError> {
            match self.stored.lock().unwrap().clone() {
                Some(v) => Deferred::of_value(v),
                None => Deferred::of_error(DataError::NotFound("empty".into())),
            }
        }
    }

    impl PutSource<Dto> for EchoSource {
        fn put(&self, value: Option<Dto>, _q: &Query) -> Deferred<Dto, DataError> {
            *self.stored.lock().unwrap() = value.clone();
            Deferred::of_value(value.expect("test always puts Some"))
        }
    }

    impl DeleteSource for EchoSource {}

    struct SingleSourceRepo<S> {
        source: Arc<S>,
    }

    impl<T: Send + Clone + 'static, S: DataSource<T>> Repository<T> for SingleSourceRepo<S> {
        fn get(&self, query: &Query, _op: Operation) -> Deferred<T, DataError> {
            self.source.get(query)
        }
        fn get_all(&self, query: &Query, _op: Operation) -> Deferred<Vec<T>, DataError> {
            self.source.get_all(query)
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
        fn delete(&self, query: &Query, _op: Operation) -> Deferred<(), DataError> {
            self.source.delete(query)
        }
        fn delete_all(&self, query: &Query, _op: Operation) -> Deferred<(), DataError> {
            self.source.delete_all(query)
        }
    }

    #[test]
    fn round_trip_put_then_get_preserves_the_domain_value() {
        let inner = Arc::new(SingleSourceRepo {
            source: Arc::new(EchoSource {
                stored: Mutex::new(None),
            }),
        });
        let repo = MappingRepository::new(inner, dto_to_domain, domain_to_dto);

        let domain = Domain {
            id: "1".into(),
            display_name: "Ada".into(),
        };
        repo.put(Some(domain.clone()), &Query::Blank, Operation::Storage)
            .result()
            .into_result()
            .unwrap();

        let fetched = repo
            .get(&Query::Blank, Operation::Storage)
            .result()
            .into_result()
            .unwrap();
        assert_eq!(fetched, domain);
    }

    #[test]
    fn mapping_failure_on_get_propagates_as_an_error() {
        let inner = Arc::new(SingleSourceRepo {
            source: Arc::new(EchoSource {
                stored: Mutex::new(Some(Dto {
                    id: "1".into(),
                    name: "Ada".into(),
                })),
            }),
        });
        let repo = MappingRepository::new(
            inner,
            |_dto: Dto| -> Result<Domain, DataError> {
                Err(DataError::Other("mapping blew up".into()))
            },
            domain_to_dto,
        );

        let err = repo
            .get(&Query::Blank, Operation::Storage)
            .result()
            .into_result()
            .unwrap_err();
        assert!(matches!(err, DataError::Other(_)));
    }
}
