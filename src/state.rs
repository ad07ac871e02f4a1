use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::DispatchSettings;
use crate::models::rider::RiderLocation;
use crate::observability::metrics::Metrics;
use crate::store::Store;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub settings: DispatchSettings,
    pub location_events_tx: broadcast::Sender<RiderLocation>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, settings: DispatchSettings, event_buffer_size: usize) -> Self {
        let (location_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        Self {
            store,
            settings,
            location_events_tx,
            metrics: Metrics::new(),
        }
    }
}
