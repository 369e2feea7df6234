use std::sync::Arc;

use crate::notify::NotifierRegistry;
use crate::storage::ReportStore;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub store: ReportStore,
    pub notifiers: NotifierRegistry,
}
