//! `ExposedCell<T>` — the concrete in-memory cell backing a DATUM (§3).
//!
//! Source-language DATUMs are ordinary object fields read and written by
//! reflection. Rust has no field-by-name reflection, so `exposer-macros`
//! requires a DATUM-annotated struct field to be one of these cells instead
//! of a bare `T`: the generated read/write closures (`member::MemberHandle::Datum`)
//! close over a clone of the cell rather than over a raw pointer into the
//! struct, which would not be expressible without unsafe code.
//!
//! Per §5 ("DATUM writes are not synchronised... documented as a user
//! responsibility"), this uses an uncontended `RwLock` rather than any
//! attempt at optimistic or lock-free concurrency — the spec explicitly
//! leaves races under concurrent writes undefined, so there is nothing to
//! optimise for here beyond "don't deadlock, don't torn-read".

use std::sync::{Arc, RwLock};

/// A named, independently clonable cell holding one value (§3 "DATUM").
///
/// Cloning an `ExposedCell` clones the handle, not the value — all clones
/// observe the same underlying cell, matching the "non-owning references
/// into a shared object graph" model of §3's Lifecycle note.
pub struct ExposedCell<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> ExposedCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }
}

impl<T: Clone> ExposedCell<T> {
    /// Read the current value.
    pub fn get(&self) -> T {
        self.inner.read().expect("ExposedCell lock poisoned").clone()
    }

    /// Replace the current value, returning the previous one (§4.2 "Write
    /// path" — "Read the current value and serialise as the 'previous'
    /// result").
    pub fn set(&self, value: T) -> T {
        let mut guard = self.inner.write().expect("ExposedCell lock poisoned");
        std::mem::replace(&mut *guard, value)
    }
}

impl<T> Clone for ExposedCell<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ExposedCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_read() {
            Ok(guard) => f.debug_tuple("ExposedCell").field(&*guard).finish(),
            Err(_) => f.write_str("ExposedCell(<locked>)"),
        }
    }
}

impl<T: Default> Default for ExposedCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
