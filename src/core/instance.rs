//! Scene files referenced by `fileInstance` are parsed at most once
//! per cache. The cache maps a canonical path to a slot; whoever
//! finds an empty slot parses the file while holding the slot lock,
//! everybody else waits for the result and shares it.

// std
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
// others
use lazy_static::lazy_static;
use log::debug;
// rs_ray
use crate::core::animation::AffineChannel;
use crate::core::error::Result;
use crate::core::shape::Shape;

/// A parsed scene file ready to be shared by any number of
/// instances.
#[derive(Clone)]
pub struct CachedInstance {
    pub shape: Arc<dyn Shape>,
    /// dynamic channels declared inside the file
    pub channels: Vec<Arc<AffineChannel>>,
}

type Slot = Arc<Mutex<Option<CachedInstance>>>;

#[derive(Default)]
pub struct InstanceCache {
    slots: Mutex<HashMap<PathBuf, Slot>>,
    parse_count: AtomicUsize,
}

lazy_static! {
    static ref GLOBAL_CACHE: Arc<InstanceCache> = Arc::new(InstanceCache::new());
}

impl InstanceCache {
    pub fn new() -> Self {
        InstanceCache::default()
    }
    /// The cache shared by all scenes of this process.
    pub fn global() -> Arc<InstanceCache> {
        GLOBAL_CACHE.clone()
    }
    /// Return the cached subtree for `path`, running `parse` if the
    /// path has not been seen yet. A failed parse leaves the slot
    /// empty.
    pub fn get_or_parse<F>(&self, path: &Path, parse: F) -> Result<CachedInstance>
    where
        F: FnOnce() -> Result<CachedInstance>,
    {
        let slot: Slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots
                .entry(path.to_path_buf())
                .or_insert_with(|| Arc::new(Mutex::new(None)))
                .clone()
        };
        let mut entry = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = entry.as_ref() {
            debug!("Instance cache hit for {}", path.display());
            return Ok(cached.clone());
        }
        debug!("Instance cache miss for {}", path.display());
        let parsed: CachedInstance = parse()?;
        self.parse_count.fetch_add(1, Ordering::SeqCst);
        *entry = Some(parsed.clone());
        Ok(parsed)
    }
    pub fn get(&self, path: &Path) -> Option<CachedInstance> {
        let slot: Slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.get(path)?.clone()
        };
        let entry = slot.lock().unwrap_or_else(PoisonError::into_inner);
        entry.clone()
    }
    pub fn contains(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }
    /// Number of files parsed through this cache.
    pub fn parse_count(&self) -> usize {
        self.parse_count.load(Ordering::SeqCst)
    }
    /// Forget all cached subtrees. Shapes already holding one keep it.
    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
