pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::store::{PairRegistry, RateStore};
use anyhow::Result;
use disk::DiskRateStore;
use memory::MemoryRateStore;
use std::sync::Arc;
use tracing::{debug, info};

/// Rate table and registry handles, both backed by the same storage.
#[derive(Clone)]
pub struct StoreHandles {
    pub rates: Arc<dyn RateStore>,
    pub registry: Arc<dyn PairRegistry>,
}

impl StoreHandles {
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: RateStore + PairRegistry + 'static,
    {
        Self {
            rates: backend.clone(),
            registry: backend,
        }
    }
}

/// Opens the configured backend and registers the pairs listed in the config.
pub async fn open_store(config: &AppConfig) -> Result<StoreHandles> {
    let handles = if config.ephemeral {
        debug!("Using in-memory rate store");
        StoreHandles::from_backend(Arc::new(MemoryRateStore::new()))
    } else {
        let path = config.default_data_path()?.join("cache");
        StoreHandles::from_backend(Arc::new(DiskRateStore::open(&path)?))
    };

    for pair in &config.pairs {
        handles.registry.register(pair.clone()).await?;
    }
    if !config.pairs.is_empty() {
        info!("Registered {} pairs from config", config.pairs.len());
    }

    Ok(handles)
}
