pub mod api;
pub mod config;
pub mod error;
pub mod form;
pub mod guard;
pub mod models;
pub mod session;
pub mod storage;
pub mod todos;

use std::sync::Arc;

use tracing::info;

use api::ApiClient;
use config::Config;
use error::AppError;
use session::SessionManager;
use storage::{SqliteStore, StoreHandle};
use todos::TodoList;

/// One session shared between the guard and the task list view.
pub struct App {
    pub session: Arc<SessionManager>,
    pub todos: TodoList,
}

impl App {
    pub fn new(api: ApiClient, store: StoreHandle) -> Self {
        let session = Arc::new(SessionManager::restore(api.clone(), store));
        let todos = TodoList::new(api, session.clone());
        App { session, todos }
    }

    pub fn open(config: &Config) -> Result<Self, AppError> {
        let store = SqliteStore::open(&config.session_path)?;
        let api = ApiClient::new(config.api_url.clone())?;
        info!(api_url = %config.api_url, session = %config.session_path.display(), "Opened client");
        Ok(App::new(api, Arc::new(store)))
    }
}
