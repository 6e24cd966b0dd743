//! Auto-detect the best available storage backend.
//!
//! Priority: IndexedDB, then memory as a fallback. Session history is
//! lost on reload when only the fallback is available.

use std::rc::Rc;
use chat_core::ports::StoragePort;
use chat_types::Result;
use super::{IndexedDbStorage, MemoryStorage};

/// Try to open the best available storage backend.
/// Returns a trait object so callers are backend-agnostic.
pub async fn auto_detect_storage() -> Result<Rc<dyn StoragePort>> {
    match IndexedDbStorage::open().await {
        Ok(idb) => {
            log::info!("Storage backend: IndexedDB");
            Ok(Rc::new(idb))
        }
        Err(e) => {
            log::warn!("IndexedDB unavailable ({}), falling back to memory", e);
            Ok(Rc::new(MemoryStorage::new()))
        }
    }
}
