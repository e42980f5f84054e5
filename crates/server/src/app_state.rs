use std::sync::Arc;

use crate::generator::ContentGenerator;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) generator: Arc<dyn ContentGenerator>,
}
