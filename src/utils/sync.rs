//! Locks that panic on poisoning.
//!
//! The mock response store and the console logger keep their state behind
//! short-lived synchronous locks. A poisoned lock means a panic happened
//! while the state was half updated, so all we can do is panic, too.

use std::sync::{Mutex as StdMutex, RwLock as StdRwLock};

pub use std::sync::{MutexGuard, RwLockReadGuard, RwLockWriteGuard};


//------------ RwLock --------------------------------------------------------

/// A read-write lock that panics if it is poisoned.
#[derive(Debug, Default)]
pub struct RwLock<T>(StdRwLock<T>);

impl<T> RwLock<T> {
    pub fn new(value: T) -> Self {
        RwLock(StdRwLock::new(value))
    }

    /// Acquires shared read access.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().expect("poisoned rwlock")
    }

    /// Acquires exclusive write access.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write().expect("poisoned rwlock")
    }
}


//------------ Mutex ---------------------------------------------------------

/// A mutex that panics if it is poisoned.
#[derive(Debug, Default)]
pub struct Mutex<T>(StdMutex<T>);

impl<T> Mutex<T> {
    pub fn new(value: T) -> Self {
        Mutex(StdMutex::new(value))
    }

    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.0.lock().expect("poisoned mutex")
    }
}


//============ Tests =========================================================
