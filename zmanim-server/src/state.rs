use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use zmanim_core::config::Settings;
use zmanim_core::{EventSource, LocationResolver, ZmanimEngine};

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub resolver: Arc<LocationResolver>,
    pub source: Arc<dyn EventSource + Send + Sync>,
}

impl AppState {
    pub fn new(settings: Settings) -> Result<Self> {
        let resolver = settings.resolver()?;
        info!(
            postal_codes = ?settings.postal_codes_path(),
            "Location resolver ready"
        );
        Ok(Self::with_parts(settings, resolver, Arc::new(ZmanimEngine::new())))
    }

    pub fn with_parts(
        settings: Settings,
        resolver: LocationResolver,
        source: Arc<dyn EventSource + Send + Sync>,
    ) -> Self {
        AppState {
            settings: Arc::new(settings),
            resolver: Arc::new(resolver),
            source,
        }
    }
}
