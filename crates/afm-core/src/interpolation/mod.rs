//! Surface interpolation and the per-object interpolation cache
//!
//! Channel data objects are immutable, so an interpolation is built at most
//! once and then shared. [`LazyInterpolation`] owns that state explicitly:
//!
//! ```text
//! Unbuilt --get--> Building --ok--> Ready
//!    ^                 |
//!    +------err--------+
//! ```
//!
//! Concurrent callers that find the cache `Building` wait for the builder
//! instead of starting a second build. A failed build is logged and the next
//! access tries again.

pub mod bicubic;
pub mod bilinear;
pub mod natural_neighbor;

pub use bicubic::BicubicSpline;
pub use natural_neighbor::{NaturalNeighborInterpolator, ScatteredSurface};

use crate::error::Result;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// A surface that can be evaluated anywhere in its domain.
pub trait SurfaceInterpolation: Send + Sync {
    /// Interpolated value, NaN outside the domain.
    fn value(&self, x: f64, y: f64) -> f64;
}

/// Observable state of a [`LazyInterpolation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Unbuilt,
    Building,
    Ready,
}

enum CacheState<T> {
    Unbuilt,
    Building,
    Ready(Arc<T>),
}

/// Build-once cache with an explicit state machine.
pub struct LazyInterpolation<T> {
    state: Mutex<CacheState<T>>,
    changed: Condvar,
}

impl<T> Default for LazyInterpolation<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resets a `Building` cache if the builder unwinds.
struct BuildGuard<'a, T> {
    cache: &'a LazyInterpolation<T>,
    armed: bool,
}

impl<T> Drop for BuildGuard<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            *self.cache.lock() = CacheState::Unbuilt;
            self.cache.changed.notify_all();
        }
    }
}

impl<T> LazyInterpolation<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState::Unbuilt),
            changed: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> CacheStatus {
        match *self.lock() {
            CacheState::Unbuilt => CacheStatus::Unbuilt,
            CacheState::Building => CacheStatus::Building,
            CacheState::Ready(_) => CacheStatus::Ready,
        }
    }

    /// The cached value if it has been built.
    pub fn get(&self) -> Option<Arc<T>> {
        match &*self.lock() {
            CacheState::Ready(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// Return the cached value, building it with `build` if needed.
    pub fn get_or_build<F>(&self, build: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Result<T>,
    {
        let mut state = self.lock();
        loop {
            if let CacheState::Ready(value) = &*state {
                return Ok(Arc::clone(value));
            }
            if !matches!(*state, CacheState::Building) {
                break;
            }
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *state = CacheState::Building;
        drop(state);

        let mut guard = BuildGuard {
            cache: self,
            armed: true,
        };
        let outcome = build();
        guard.armed = false;

        let mut state = self.lock();
        let result = match outcome {
            Ok(value) => {
                let value = Arc::new(value);
                *state = CacheState::Ready(Arc::clone(&value));
                debug!("interpolation built");
                Ok(value)
            }
            Err(e) => {
                *state = CacheState::Unbuilt;
                warn!(error = %e, "interpolation build failed");
                Err(e)
            }
        };
        self.changed.notify_all();
        result
    }
}

impl<T> Clone for LazyInterpolation<T> {
    /// A clone starts with an empty cache.
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for LazyInterpolation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyInterpolation")
            .field("status", &self.status())
            .finish()
    }
}
