//! `Deferred<T, E>` — a single-shot, race-free carrier of either a value or
//! an error, with deterministic delivery to at most one consumer.
//!
//! See [`crate`] for the module map. This file holds the state machine,
//! construction forms, and the raw `then`/`fail`/`result` surface; the
//! transforming combinators (`map`, `flat_map`, `recover`, ...) live in
//! [`combinators`](super::deferred::combinators).

mod combinators;

use crate::delivery::DeliveryQueue;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, Weak};

/// The stored outcome of a `Deferred`: exactly one of a value or an error.
#[derive(Clone)]
pub enum Outcome<T, E> {
    /// The operation produced a value.
    Value(T),
    /// The operation failed.
    Error(E),
}

impl<T, E> Outcome<T, E> {
    /// True if this is the value arm.
    pub fn is_value(&self) -> bool {
        matches!(self, Outcome::Value(_))
    }

    /// True if this is the error arm.
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    /// Convert to a standard `Result`.
    pub fn into_result(self) -> std::result::Result<T, E> {
        match self {
            Outcome::Value(v) => Ok(v),
            Outcome::Error(e) => Err(e),
        }
    }
}

impl<T, E> From<std::result::Result<T, E>> for Outcome<T, E> {
    fn from(r: std::result::Result<T, E>) -> Self {
        match r {
            Ok(v) => Outcome::Value(v),
            Err(e) => Outcome::Error(e),
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Outcome<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Outcome::Error(e) => f.debug_tuple("Error").field(e).finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Blank,
    WaitingThen,
    WaitingContent,
    Sent,
}

type Consumer<T, E> = Box<dyn FnOnce(Outcome<T, E>) + Send>;
type OnSet<T, E> = Box<dyn FnMut(&mut Outcome<T, E>) + Send>;

struct Shared<T, E> {
    phase: Phase,
    result: Option<Outcome<T, E>>,
    consumer: Option<Consumer<T, E>>,
    on_set: Option<OnSet<T, E>>,
    queue: Option<Arc<dyn DeliveryQueue>>,
    /// Strong reference to whatever this Deferred was chained from, so
    /// upstream combinators stay alive until delivery completes.
    parent: Option<Arc<dyn Any + Send + Sync>>,
}

impl<T, E> Default for Shared<T, E> {
    fn default() -> Self {
        Self {
            phase: Phase::Blank,
            result: None,
            consumer: None,
            on_set: None,
            queue: None,
            parent: None,
        }
    }
}

struct Cell<T, E> {
    mutex: Mutex<Shared<T, E>>,
    condvar: Condvar,
}

/// A single-shot async result cell. See the module docs for the state
/// machine and delivery-ordering guarantees.
pub struct Deferred<T, E>(Arc<Cell<T, E>>);

impl<T, E> Clone for Deferred<T, E> {
    fn clone(&self) -> Self {
        Deferred(self.0.clone())
    }
}

/// A non-owning handle that resolves a `Deferred` from outside the closure
/// that built it.
///
/// Per spec §9, the handle upgrades its weak reference on each access; if
/// the `Deferred` was already dropped by its consumer, resolving becomes a
/// silent no-op rather than an error.
pub struct Resolver<T, E> {
    cell: Weak<Cell<T, E>>,
}

impl<T: Send + 'static, E: Send + 'static> Resolver<T, E> {
    /// Resolve with a value.
    pub fn resolve(&self, value: T) {
        if let Some(cell) = self.cell.upgrade() {
            Deferred(cell).resolve_with(Outcome::Value(value));
        }
    }

    /// Resolve with an error.
    pub fn reject(&self, error: E) {
        if let Some(cell) = self.cell.upgrade() {
            Deferred(cell).resolve_with(Outcome::Error(error));
        }
    }

    /// Resolve by adopting another `Deferred`'s eventual result.
    pub fn resolve_with(&self, other: Deferred<T, E>) {
        if let Some(cell) = self.cell.upgrade() {
            Deferred(cell).adopt(other);
        }
    }
}

impl<T: Send + 'static, E: Send + 'static> Deferred<T, E> {
    /// A fresh, unresolved `Deferred`.
    pub fn blank() -> Self {
        Deferred(Arc::new(Cell {
            mutex: Mutex::new(Shared::default()),
            condvar: Condvar::new(),
        }))
    }

    /// A `Deferred` pre-resolved with a value.
    pub fn of_value(value: T) -> Self {
        let d = Self::blank();
        d.set(value);
        d
    }

    /// A `Deferred` pre-resolved with an error.
    pub fn of_error(error: E) -> Self {
        let d = Self::blank();
        d.set_error(error);
        d
    }

    /// A `Deferred` that adopts another `Deferred`'s eventual result.
    pub fn wrapping(other: Deferred<T, E>) -> Self {
        let d = Self::blank();
        d.adopt(other);
        d
    }

    /// Builder form: the closure receives a [`Resolver`] it can use
    /// (synchronously or from another thread) to resolve the returned cell.
    pub fn building(f: impl FnOnce(Resolver<T, E>)) -> Self {
        let d = Self::blank();
        let resolver = Resolver {
            cell: Arc::downgrade(&d.0),
        };
        f(resolver);
        d
    }

    /// Bind a delivery queue. Callbacks registered after this call run on
    /// `queue` unless `queue.is_current()` is true at delivery time, in
    /// which case delivery happens inline on the resolving thread.
    pub fn on(&self, queue: Arc<dyn DeliveryQueue>) -> Self {
        let mut guard = self.0.mutex.lock().expect("Deferred mutex poisoned");
        guard.queue = Some(queue);
        drop(guard);
        self.clone()
    }

    /// Register a one-shot interceptor that runs synchronously at the
    /// moment of resolution, before any consumer observes the result, with
    /// mutable access to rewrite the pending outcome.
    ///
    /// At most one interceptor is active; installing a second replaces the
    /// first. Has no effect if the `Deferred` is already `Sent`.
    pub fn on_set(&self, f: impl FnMut(&mut Outcome<T, E>) + Send + 'static) {
        let mut guard = self.0.mutex.lock().expect("Deferred mutex poisoned");
        if guard.phase == Phase::Sent {
            return;
        }
        guard.on_set = Some(Box::new(f));
    }

    /// Resolve with a value. A no-op if already resolved or already `Sent`
    /// (spec §9: the forgiving, non-panicking contract).
    pub fn set(&self, value: T) {
        self.resolve_with(Outcome::Value(value));
    }

    /// Resolve with an error. Same no-op-after-resolved contract as `set`.
    pub fn set_error(&self, error: E) {
        self.resolve_with(Outcome::Error(error));
    }

    /// Resolve by adopting another `Deferred`'s eventual result.
    pub fn set_from(&self, other: Deferred<T, E>) {
        self.adopt(other);
    }

    /// Register a value-observing callback. Returns a new child `Deferred`
    /// carrying the same eventual value/error, chained to `self` (the child
    /// holds a strong reference to keep `self` alive until delivery).
    ///
    /// Installing a second `then`/`fail` pair on the same `Deferred`, or
    /// calling `then`/`fail` after it has already delivered, is a
    /// programming error and panics (spec §7, §8).
    pub fn then(&self, on_value: impl FnOnce(&T) + Send + 'static) -> Deferred<T, E> {
        self.chain_passthrough(Some(on_value), None::<fn(&E)>)
    }

    /// Register an error-observing callback. See [`Deferred::then`].
    pub fn fail(&self, on_error: impl FnOnce(&E) + Send + 'static) -> Deferred<T, E> {
        self.chain_passthrough(None::<fn(&T)>, Some(on_error))
    }

    /// Blocking read of the stored result.
    ///
    /// Blocks the calling thread until resolution if still `Blank`. It is a
    /// programming error to call this after a `then`/`fail`/combinator has
    /// already been installed on `self` — that consumer owns the result.
    pub fn result(&self) -> Outcome<T, E>
    where
        T: Clone,
        E: Clone,
    {
        let mut guard = self.0.mutex.lock().expect("Deferred mutex poisoned");
        match guard.phase {
            Phase::WaitingContent | Phase::Sent => {
                panic!("Deferred::result() called after a then/fail callback was installed")
            }
            _ => {}
        }
        while guard.phase == Phase::Blank {
            guard = self
                .0
                .condvar
                .wait(guard)
                .expect("Deferred condvar poisoned");
        }
        match guard.phase {
            Phase::WaitingThen => guard.result.clone().expect("result missing in WaitingThen"),
            other => panic!("Deferred::result() observed unexpected phase {other:?}"),
        }
    }

    /// Return the cell to `Blank`, releasing any stored result and
    /// callbacks. Not normally called on a plain `Deferred` — it exists for
    /// the reusable multi-shot `Observable` sibling this primitive is
    /// acknowledged but not specified alongside (spec §1).
    pub fn clear(&self) {
        let mut guard = self.0.mutex.lock().expect("Deferred mutex poisoned");
        *guard = Shared::default();
    }

    fn adopt(&self, other: Deferred<T, E>) {
        self.set_parent(other.0.clone());
        let this = self.clone();
        other.install_consumer(Box::new(move |outcome| {
            this.resolve_with(outcome);
        }));
    }

    fn set_parent(&self, parent: Arc<Cell<T, E>>) {
        let mut guard = self.0.mutex.lock().expect("Deferred mutex poisoned");
        guard.parent = Some(parent as Arc<dyn Any + Send + Sync>);
    }

    fn chain_passthrough(
        &self,
        on_value: Option<impl FnOnce(&T) + Send + 'static>,
        on_error: Option<impl FnOnce(&E) + Send + 'static>,
    ) -> Deferred<T, E> {
        let child = Deferred::blank();
        child.set_parent(self.0.clone());
        let child_clone = child.clone();
        self.install_consumer(Box::new(move |outcome| {
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
            child_clone.resolve_with(outcome);
        }));
        child
    }

    fn resolve_with(&self, result: Outcome<T, E>) {
        let mut outcome = result;
        {
            let mut guard = self.0.mutex.lock().expect("Deferred mutex poisoned");
            if guard.phase == Phase::Sent {
                return;
            }
            if let Some(mut interceptor) = guard.on_set.take() {
                drop(guard);
                interceptor(&mut outcome);
                guard = self.0.mutex.lock().expect("Deferred mutex poisoned");
                if guard.phase == Phase::Sent {
                    return;
                }
            }
            match guard.phase {
                Phase::Blank => {
                    guard.result = Some(outcome);
                    guard.phase = Phase::WaitingThen;
                    self.0.condvar.notify_all();
                    return;
                }
                Phase::WaitingContent => {
                    let consumer = guard.consumer.take().expect("consumer missing");
                    guard.phase = Phase::Sent;
                    let queue = guard.queue.clone();
                    drop(guard);
                    deliver(consumer, outcome, queue);
                    return;
                }
                Phase::WaitingThen | Phase::Sent => return,
            }
        }
    }

    fn install_consumer(&self, consumer: Consumer<T, E>) {
        let mut guard = self.0.mutex.lock().expect("Deferred mutex poisoned");
        match guard.phase {
            Phase::Sent => {
                panic!("Deferred: then/fail/map installed after the Deferred was already delivered")
            }
            Phase::WaitingContent => {
                panic!("Deferred: a then/fail/map consumer is already installed on this Deferred")
            }
            Phase::Blank => {
                guard.consumer = Some(consumer);
                guard.phase = Phase::WaitingContent;
                self.0.condvar.notify_all();
            }
            Phase::WaitingThen => {
                let outcome = guard.result.take().expect("result missing in WaitingThen");
                guard.phase = Phase::Sent;
                let queue = guard.queue.clone();
                drop(guard);
                deliver(consumer, outcome, queue);
            }
        }
    }
}

fn deliver<T: Send + 'static, E: Send + 'static>(
    consumer: Consumer<T, E>,
    outcome: Outcome<T, E>,
    queue: Option<Arc<dyn DeliveryQueue>>,
) {
    match queue {
        Some(q) if !q.is_current() => {
            q.dispatch(Box::new(move || consumer(outcome)));
        }
        _ => consumer(outcome),
    }
}

pub use combinators::ZipError;
