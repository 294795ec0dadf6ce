use std::sync::Arc;

use crate::services::analysis_service::InstrumentAnalyzer;

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<InstrumentAnalyzer>,
}
