//! `Query` describes which entity (or entities) a [`crate::datasource`] or
//! [`crate::repository`] call addresses.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A lookup descriptor, generic over the id type `K` so integer-, UUID-,
/// and string-keyed backends all type-check without `Box<dyn Any>`
/// downcasting.
///
/// The three named variants cover the common cases; `Other` is the escape
/// hatch a backend reaches for when neither fits — an arbitrary selector
/// downcast at the point of use. A backend that doesn't recognize the
/// concrete type inside an `Other` (or any variant it simply doesn't
/// support) returns [`crate::error::DataError::QueryNotSupported`].
#[derive(Clone)]
pub enum Query<K = String> {
    /// No selector: usually "the one resource this source serves".
    Blank,
    /// A free-form string key.
    Key(String),
    /// A typed identifier understood by the backend.
    Id(K),
    /// An arbitrary, backend-defined selector. `Arc` rather than `Box` so
    /// `Query` itself stays `Clone` without constraining the payload.
    Other(Arc<dyn Any + Send + Sync>),
}

impl<K> Default for Query<K> {
    fn default() -> Self {
        Query::Blank
    }
}

impl<K> Query<K> {
    /// Build a key-addressed query.
    pub fn key(key: impl Into<String>) -> Self {
        Query::Key(key.into())
    }

    /// Build an id-addressed query.
    pub fn id(id: K) -> Self {
        Query::Id(id)
    }

    /// Build a query carrying a backend-defined selector.
    pub fn other<V: Any + Send + Sync>(value: V) -> Self {
        Query::Other(Arc::new(value))
    }

    /// The string key, if this is a `Key` query.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Query::Key(k) => Some(k.as_str()),
            _ => None,
        }
    }

    /// The id, if this is an `Id` query.
    pub fn as_id(&self) -> Option<&K> {
        match self {
            Query::Id(id) => Some(id),
            _ => None,
        }
    }

    /// Downcast the `Other` payload to a concrete type, if this is an
    /// `Other` query carrying that type.
    pub fn as_other<V: Any + Send + Sync>(&self) -> Option<&V> {
        match self {
            Query::Other(v) => v.downcast_ref::<V>(),
            _ => None,
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for Query<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Blank => write!(f, "Blank"),
            Query::Key(k) => f.debug_tuple("Key").field(k).finish(),
            Query::Id(id) => f.debug_tuple("Id").field(id).finish(),
            Query::Other(v) => f
                .debug_tuple("Other")
                .field(&format_args!("<{:p}>", Arc::as_ptr(v)))
                .finish(),
        }
    }
}

impl<K: PartialEq> PartialEq for Query<K> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Query::Blank, Query::Blank) => true,
            (Query::Key(a), Query::Key(b)) => a == b,
            (Query::Id(a), Query::Id(b)) => a == b,
            // `dyn Any` carries no `PartialEq`; two `Other` queries are
            // equal only when they share the same underlying allocation.
            (Query::Other(a), Query::Other(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<K: Eq> Eq for Query<K> {}

impl<K: Hash> Hash for Query<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Query::Blank => 0u8.hash(state),
            Query::Key(k) => {
                1u8.hash(state);
                k.hash(state);
            }
            Query::Id(id) => {
                2u8.hash(state);
                id.hash(state);
            }
            Query::Other(v) => {
                3u8.hash(state);
                (Arc::as_ptr(v) as *const () as usize).hash(state);
            }
        }
    }
}
