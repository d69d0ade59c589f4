use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::dataset::ReferenceDataset;

/// Everything the API handlers need, cloned per request.
/// The dataset is immutable after startup and shared behind one `Arc`;
/// the config is small enough to clone outright.
#[derive(Clone)]
pub struct SharedState {
    pub config: Config,
    pub dataset: Arc<ReferenceDataset>,
}

impl SharedState {
    pub fn new(config: Config, dataset: ReferenceDataset) -> Self {
        Self {
            config,
            dataset: Arc::new(dataset),
        }
    }
}

impl FromRef<SharedState> for Config {
    fn from_ref(shared: &SharedState) -> Self {
        shared.config.clone()
    }
}

impl FromRef<SharedState> for Arc<ReferenceDataset> {
    fn from_ref(shared: &SharedState) -> Self {
        Arc::clone(&shared.dataset)
    }
}
