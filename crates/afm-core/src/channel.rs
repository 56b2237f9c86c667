//! Owning channel wrappers
//!
//! A channel pairs an identifier with its data. Data objects are immutable;
//! the only way to change what a channel shows is to swap the whole data
//! object with `set_channel_data`.

use crate::channel1d::Channel1DData;
use crate::channel2d::Channel2DData;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifies the coordinate domain channels are plotted against; channels
/// with equal keys share an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainKey(u64);

impl DomainKey {
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DomainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "domain#{}", self.0)
    }
}

/// Issues distinct [`DomainKey`]s; safe to share between threads.
#[derive(Debug, Default)]
pub struct DomainRegistry {
    next: AtomicU64,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> DomainKey {
        DomainKey(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Number of keys handed out so far
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

// ============================================================================
// 1D
// ============================================================================

/// Named curve, e.g. the approach branch of a force curve
#[derive(Debug, Clone)]
pub struct Channel1D {
    identifier: String,
    domain: DomainKey,
    data: Arc<dyn Channel1DData>,
}

impl Channel1D {
    pub fn new(
        identifier: impl Into<String>,
        domain: DomainKey,
        data: Box<dyn Channel1DData>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            domain,
            data: Arc::from(data),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn domain(&self) -> DomainKey {
        self.domain
    }

    pub fn data(&self) -> &dyn Channel1DData {
        self.data.as_ref()
    }

    /// Handle to the data that outlives later `set_channel_data` calls
    pub fn shared_data(&self) -> Arc<dyn Channel1DData> {
        Arc::clone(&self.data)
    }

    pub fn set_channel_data(&mut self, data: Box<dyn Channel1DData>) {
        self.data = Arc::from(data);
    }
}

// ============================================================================
// 2D
// ============================================================================

/// Named map, e.g. a height image
#[derive(Debug, Clone)]
pub struct Channel2D {
    identifier: String,
    domain: DomainKey,
    data: Arc<dyn Channel2DData>,
}

impl Channel2D {
    pub fn new(
        identifier: impl Into<String>,
        domain: DomainKey,
        data: Box<dyn Channel2DData>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            domain,
            data: Arc::from(data),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn domain(&self) -> DomainKey {
        self.domain
    }

    pub fn data(&self) -> &dyn Channel2DData {
        self.data.as_ref()
    }

    pub fn shared_data(&self) -> Arc<dyn Channel2DData> {
        Arc::clone(&self.data)
    }

    pub fn set_channel_data(&mut self, data: Box<dyn Channel2DData>) {
        self.data = Arc::from(data);
    }
}
