//! Transforming combinators over [`Deferred`]: `map`, `map_err`, `flat_map`,
//! `recover`, `and_then`, `on_completion`, `filter`, and `zip` up to arity 4.
//!
//! Each combinator builds a fresh child `Deferred` and installs exactly one
//! consumer on `self` via the same `chain`-style plumbing `then`/`fail` use,
//! so the double-install and post-`Sent` panics in [`super`] apply here too.

use super::{Deferred, Outcome};
use std::fmt;

/// The error produced by `zip` when one of the zipped `Deferred`s fails.
///
/// Evaluation is strictly left-to-right: if the first `Deferred` in the zip
/// errors, later ones are never even awaited, so on ties the earliest
/// position wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipError<E> {
    /// Zero-based index of the `Deferred` that failed.
    pub position: usize,
    /// The error it produced.
    pub error: E,
}

impl<E: fmt::Display> fmt::Display for ZipError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "zip member {} failed: {}", self.position, self.error)
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for ZipError<E> {}

impl<T: Send + 'static, E: Send + 'static> Deferred<T, E> {
    /// Build a new child by installing a consumer on `self` that runs `f`
    /// with the outcome and a handle to the child, then returns the child.
    fn chain<U, F2>(
        &self,
        f: impl FnOnce(Outcome<T, E>, Deferred<U, F2>) + Send + 'static,
    ) -> Deferred<U, F2>
    where
        U: Send + 'static,
        F2: Send + 'static,
    {
        let child = Deferred::<U, F2>::blank();
        child.set_parent(self.0.clone());
        let child_clone = child.clone();
        self.install_consumer(Box::new(move |outcome| {
            f(outcome, child_clone);
        }));
        child
    }

    /// Transform the value on success; pass errors through unchanged.
    pub fn map<U: Send + 'static>(
        &self,
        f: impl FnOnce(T) -> U + Send + 'static,
    ) -> Deferred<U, E> {
        self.chain(move |outcome, child| match outcome {
            Outcome::Value(v) => child.set(f(v)),
            Outcome::Error(e) => child.set_error(e),
        })
    }

    /// Transform the error on failure; pass values through unchanged.
    pub fn map_err<F2: Send + 'static>(
        &self,
        f: impl FnOnce(E) -> F2 + Send + 'static,
    ) -> Deferred<T, F2> {
        self.chain(move |outcome, child| match outcome {
            Outcome::Value(v) => child.set(v),
            Outcome::Error(e) => child.set_error(f(e)),
        })
    }

    /// On success, run `f` to produce a follow-up `Deferred` and adopt its
    /// eventual result; on failure, propagate the error unchanged.
    pub fn flat_map<U: Send + 'static>(
        &self,
        f: impl FnOnce(T) -> Deferred<U, E> + Send + 'static,
    ) -> Deferred<U, E> {
        self.chain(move |outcome, child| match outcome {
            Outcome::Value(v) => child.set_from(f(v)),
            Outcome::Error(e) => child.set_error(e),
        })
    }

    /// On failure, run `f` to produce a replacement `Deferred` and adopt
    /// its eventual result; on success, pass the value through unchanged.
    pub fn recover(&self, f: impl FnOnce(E) -> Deferred<T, E> + Send + 'static) -> Deferred<T, E> {
        self.chain(move |outcome, child| match outcome {
            Outcome::Value(v) => child.set(v),
            Outcome::Error(e) => child.set_from(f(e)),
        })
    }

    /// Run optional side-effecting observers for either arm; the value or
    /// error passes through to the child unchanged either way.
    pub fn and_then(
        &self,
        on_value: Option<impl FnOnce(&T) + Send + 'static>,
        on_error: Option<impl FnOnce(&E) + Send + 'static>,
    ) -> Deferred<T, E> {
        self.chain(move |outcome, child| {
            match &outcome {
                Outcome::Value(v) => {
                    if let Some(f) = on_value {
                        f(v);
                    }
                }
                Outcome::Error(e) => {
                    if let Some(f) = on_error {
                        f(e);
                    }
                }
            }
            match outcome {
                Outcome::Value(v) => child.set(v),
                Outcome::Error(e) => child.set_error(e),
            }
        })
    }

    /// Run `f` once with a reference to the outcome regardless of arm; the
    /// value or error passes through to the child unchanged.
    pub fn on_completion(
        &self,
        f: impl FnOnce(Result<&T, &E>) + Send + 'static,
    ) -> Deferred<T, E> {
        self.chain(move |outcome, child| {
            match &outcome {
                Outcome::Value(v) => f(Ok(v)),
                Outcome::Error(e) => f(Err(e)),
            }
            match outcome {
                Outcome::Value(v) => child.set(v),
                Outcome::Error(e) => child.set_error(e),
            }
        })
    }

    /// On success, run `pred`; if it returns `Some(e)` the child fails with
    /// `e` instead of carrying the value forward. Errors pass through
    /// unchanged.
    pub fn filter(&self, pred: impl FnOnce(&T) -> Option<E> + Send + 'static) -> Deferred<T, E> {
        self.chain(move |outcome, child| match outcome {
            Outcome::Value(v) => match pred(&v) {
                Some(e) => child.set_error(e),
                None => child.set(v),
            },
            Outcome::Error(e) => child.set_error(e),
        })
    }

    /// Combine with one other `Deferred`, succeeding with both values or
    /// failing with whichever fails first (left to right).
    pub fn zip<U: Send + 'static>(&self, other: &Deferred<U, E>) -> Deferred<(T, U), ZipError<E>>
    where
        E: Clone,
    {
        let other = other.clone();
        self.map_err(|e| ZipError { position: 0, error: e })
            .flat_map(move |t| {
                other
                    .map_err(|e| ZipError { position: 1, error: e })
                    .map(move |u| (t, u))
            })
    }

    /// Combine with two other `Deferred`s, left to right, first-failure-wins.
    pub fn zip3<U: Send + 'static, V: Send + 'static>(
        &self,
        b: &Deferred<U, E>,
        c: &Deferred<V, E>,
    ) -> Deferred<(T, U, V), ZipError<E>>
    where
        E: Clone,
    {
        let c = c.clone();
        self.zip(b).flat_map(move |(t, u)| {
            c.map_err(|e| ZipError { position: 2, error: e })
                .map(move |v| (t, u, v))
        })
    }

    /// Combine with three other `Deferred`s, left to right,
    /// first-failure-wins.
    pub fn zip4<U: Send + 'static, V: Send + 'static, W: Send + 'static>(
        &self,
        b: &Deferred<U, E>,
        c: &Deferred<V, E>,
        d: &Deferred<W, E>,
    ) -> Deferred<(T, U, V, W), ZipError<E>>
    where
        E: Clone,
    {
        let d = d.clone();
        self.zip3(b, c).flat_map(move |(t, u, v)| {
            d.map_err(|e| ZipError { position: 3, error: e })
                .map(move |w| (t, u, v, w))
        })
    }
}
