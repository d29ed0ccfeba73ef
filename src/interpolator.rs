use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, TryLockError};

use log::{debug, info};

use crate::data::model::SetId;
use crate::error::{PdfError, Result};
use crate::set::PdfSet;
use crate::source::{GridSource, LhaDirectory};

/// Cache entry for one set name: filled once, loads serialized by `loading`.
#[derive(Default)]
struct Slot {
    set: OnceLock<Arc<PdfSet>>,
    loading: Mutex<()>,
}

// ---------------------------------------------------------------------------
// GridInterpolator
// ---------------------------------------------------------------------------

/// Entry point: loads PDF sets by identifier and evaluates them.
///
/// Each set is loaded at most once and then shared as an immutable
/// `Arc<PdfSet>`; evaluation never locks.
pub struct GridInterpolator {
    source: Box<dyn GridSource>,
    cache: Mutex<HashMap<String, Arc<Slot>>>,
}

impl GridInterpolator {
    pub fn new(source: impl GridSource + 'static) -> Self {
        GridInterpolator {
            source: Box::new(source),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Interpolator over the LHAPDF data directories of this environment.
    pub fn discover() -> Result<Self> {
        let source = LhaDirectory::discover().map_err(|err| PdfError::from_source("", err))?;
        Ok(Self::new(source))
    }

    /// Resolve `id` to a loaded set, reading it on first use.
    ///
    /// Unknown identifiers fail with [`PdfError::NotFound`], invalid grid data
    /// with [`PdfError::CorruptData`]; neither leaves anything in the cache.
    pub fn load(&self, id: impl Into<SetId>) -> Result<Arc<PdfSet>> {
        let id = id.into();
        let name = self
            .source
            .resolve(&id)
            .map_err(|err| PdfError::from_source(&id.to_string(), err))?;

        loop {
            let slot = Arc::clone(lock(&self.cache).entry(name.clone()).or_default());
            if let Some(set) = slot.set.get() {
                debug!("'{name}' served from cache");
                return Ok(Arc::clone(set));
            }

            let loading = lock(&slot.loading);
            if let Some(set) = slot.set.get() {
                debug!("'{name}' loaded concurrently");
                return Ok(Arc::clone(set));
            }
            // A failed load may have evicted the slot while we waited.
            if !self.is_current(&name, &slot) {
                debug!("slot of '{name}' was evicted, retrying");
                continue;
            }

            return match self.read(&name) {
                Ok(set) => {
                    info!("loaded '{name}': {} members", set.len());
                    let set = Arc::new(set);
                    // Only the holder of `loading` fills the slot.
                    let _ = slot.set.set(Arc::clone(&set));
                    Ok(set)
                }
                Err(err) => {
                    drop(loading);
                    self.evict_empty(&name, &slot);
                    Err(err)
                }
            };
        }
    }

    /// Set and member offset of an LHAPDF numeric member id.
    ///
    /// Ids past the last member of their set fail with
    /// [`PdfError::NotFound`] before anything is loaded.
    pub fn lookup(&self, lhaid: u32) -> Result<(Arc<PdfSet>, usize)> {
        let not_found = || PdfError::NotFound(SetId::Lhaid(lhaid));
        let (name, member) = self.source.member_of(lhaid).ok_or_else(not_found)?;
        let set = self.load(SetId::Name(name))?;
        if member < set.len() {
            Ok((set, member))
        } else {
            Err(not_found())
        }
    }

    /// Evaluate `points` for one flavor and member of `set`, in input order.
    ///
    /// Points off the grid on any axis yield NaN; the rest of the batch is
    /// unaffected.
    pub fn evaluate<P: AsRef<[f64]>>(
        &self,
        set: &PdfSet,
        flavor: i32,
        member: usize,
        points: &[P],
    ) -> Result<Vec<f64>> {
        set.evaluate(flavor, member, points)
    }

    pub fn evaluate_point(
        &self,
        set: &PdfSet,
        flavor: i32,
        member: usize,
        point: &[f64],
    ) -> Result<f64> {
        set.evaluate_point(flavor, member, point)
    }

    /// αs(Q) of `set`; NaN off-grid or without a table.
    pub fn alphas(&self, set: &PdfSet, q: f64) -> f64 {
        set.alphas(q)
    }

    /// Names of the sets loaded so far.
    pub fn cached(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.cache)
            .iter()
            .filter(|(_, slot)| slot.set.get().is_some())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    fn read(&self, name: &str) -> Result<PdfSet> {
        debug!("reading '{name}'");
        let raw = self
            .source
            .fetch(name)
            .map_err(|err| PdfError::from_source(name, err))?;
        PdfSet::from_raw(raw)
    }

    fn is_current(&self, name: &str, slot: &Arc<Slot>) -> bool {
        lock(&self.cache)
            .get(name)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    /// Drop the slot of a failed load, unless another caller is loading into
    /// it or has filled it meanwhile.
    fn evict_empty(&self, name: &str, slot: &Arc<Slot>) {
        let mut cache = lock(&self.cache);
        let idle = cache.get(name).is_some_and(|current| {
            Arc::ptr_eq(current, slot)
                && current.set.get().is_none()
                && !matches!(current.loading.try_lock(), Err(TryLockError::WouldBlock))
        });
        if idle {
            cache.remove(name);
        }
    }
}

impl std::fmt::Debug for GridInterpolator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridInterpolator")
            .field("cached", &self.cached())
            .finish_non_exhaustive()
    }
}

/// The guarded data is either complete or absent, so a poisoned lock is
/// still consistent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
