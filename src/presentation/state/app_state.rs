use std::sync::Arc;

use crate::application::ports::{FilenameMetadataExtractor, RecordStore};
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub record_store: Arc<dyn RecordStore>,
    pub extractor: Arc<dyn FilenameMetadataExtractor>,
    pub settings: Settings,
}
