use std::future::Future;
use std::sync::Arc;
use url::Url;

use crate::api::{AuthService, HttpTransport, Pipeline, TaskService, Transport, UserService};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::router::{Navigation, Route, Router};
use crate::session::{SessionStorage, SessionStore};
use crate::shell::Shell;

/// Everything a view needs, wired around one session store
#[derive(Clone)]
pub struct App {
    pub session: SessionStore,
    pub pipeline: Pipeline,
    pub router: Router,
    pub shell: Shell,
    pub auth: AuthService,
    pub tasks: TaskService,
    pub users: UserService,
    api_base: Url,
}

impl App {
    pub fn from_config(config: &AppConfig, storage: Arc<dyn SessionStorage>) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(&config.api.base_url, config.api.request_timeout())?;
        let api_base = transport.base_url().clone();
        Ok(Self::with_transport(
            Arc::new(transport),
            storage,
            api_base,
            config.views.task_page_size,
        ))
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        storage: Arc<dyn SessionStorage>,
        api_base: Url,
        task_page_size: u32,
    ) -> Self {
        let session = SessionStore::init(storage);
        let pipeline = Pipeline::new(session.clone(), transport);
        let router = Router::new(session.clone());
        let shell = Shell::new(session.clone(), router.clone());

        Self {
            auth: AuthService::new(pipeline.clone()),
            tasks: TaskService::new(pipeline.clone(), task_page_size),
            users: UserService::new(pipeline.clone()),
            session,
            pipeline,
            router,
            shell,
            api_base,
        }
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    pub fn enter(&self, route: Route) -> Navigation {
        self.router.navigate_to(route)
    }

    /// Run a view request: abandoned on navigation, and an authentication
    /// rejection logs the session out before the error is returned
    pub async fn run_view<F, T>(&self, request: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let result = self.router.scoped(request).await;
        if let Err(error) = &result {
            self.shell.on_api_error(error);
        }
        result
    }
}
