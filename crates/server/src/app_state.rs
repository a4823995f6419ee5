use server_api::ApiContext;
use storage::Storage;

use crate::session::SessionConfig;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) api: ApiContext,
    pub(crate) storage: Storage,
    pub(crate) sessions: SessionConfig,
    pub(crate) max_body_bytes: usize,
}
