//! Application state for the Workbench TUI.
//!
//! `App` owns everything the components read and mutate: shared context
//! (theme, API client, preferences), the router, the navigation rail, the
//! open workspace form, the workspaces page and the logs panel. It also
//! applies messages coming back from background tasks.

use std::sync::Arc;

use rat_focus::{Focus, FocusBuilder, FocusFlag, HasFocus};
use ratatui::layout::Rect;
use tracing::{debug, info, warn};
use workbench_api::WorkspaceService;
use workbench_types::{
    ClusterType, Effect, ExecOutcome, FormId, LinkTarget, Msg, NavIcon, NavigationItem, default_navigation_items,
};
use workbench_util::UserPreferences;

use crate::ui::{
    components::{
        logs::{LogLevel, LogsState},
        nav_rail::NavigationRailState,
        pages::{PageRoute, WORKSPACES_PATH, WorkspacesState},
        workspace_form::WorkspaceFormState,
    },
    theme::{self, Theme, ThemeId},
};

/// Everything the caller decides before the UI starts.
#[derive(Debug)]
pub struct TuiOptions {
    pub api: Arc<dyn WorkspaceService>,
    pub preferences: Arc<UserPreferences>,
    pub cluster_type: ClusterType,
    /// Attach the lifecycle section to creation requests.
    pub submit_lifecycle_config: bool,
    /// Rail items; `None` uses the built-in pipelines items.
    pub navigation_items: Option<Vec<NavigationItem>>,
    pub initial_path: String,
}

/// Default rail plus the workspace management entry.
pub fn dashboard_navigation_items() -> Vec<NavigationItem> {
    let mut items = default_navigation_items();
    items.push(
        NavigationItem::new(
            "manage",
            NavIcon::new("[W]").with_selected("<W>"),
            "Workspaces",
            LinkTarget::new(WORKSPACES_PATH),
        )
        .with_selection_predicate(|path| path.starts_with(WORKSPACES_PATH)),
    );
    items
}

#[derive(Debug)]
pub struct SharedCtx {
    pub theme: Box<dyn Theme>,
    pub theme_id: ThemeId,
    pub api: Arc<dyn WorkspaceService>,
    pub preferences: Arc<UserPreferences>,
    pub cluster_type: ClusterType,
    pub submit_lifecycle_config: bool,
}

/// Current location; the only writer is [`App::navigate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Router {
    pathname: String,
}

impl Router {
    pub fn new(pathname: &str) -> Self {
        let trimmed = pathname.trim();
        let pathname = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{trimmed}")
        };
        Self { pathname }
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    pub fn route(&self) -> PageRoute {
        PageRoute::for_path(&self.pathname)
    }

    /// Follow `target`; returns `false` when already there.
    fn follow(&mut self, target: &LinkTarget) -> bool {
        let next = target.resolved_path();
        if next == self.pathname {
            return false;
        }
        self.pathname = next;
        true
    }
}

pub struct App {
    pub ctx: SharedCtx,
    pub router: Router,
    pub nav_rail: NavigationRailState,
    pub workspaces: WorkspacesState,
    /// Present while the creation modal is open.
    pub workspace_form: Option<WorkspaceFormState>,
    pub logs: LogsState,
    pub focus: Focus,
    pub throbber_idx: usize,
    last_form_id: FormId,
    root_focus: FocusFlag,
}

impl App {
    pub fn new(options: TuiOptions) -> Self {
        let TuiOptions {
            api,
            preferences,
            cluster_type,
            submit_lifecycle_config,
            navigation_items,
            initial_path,
        } = options;
        let preferred_theme = preferences.preferred_theme();
        let theme_id = theme::load(preferred_theme.as_deref());

        let mut app = Self {
            ctx: SharedCtx {
                theme: theme_id.build(),
                theme_id,
                api,
                preferences,
                cluster_type,
                submit_lifecycle_config,
            },
            router: Router::new(&initial_path),
            nav_rail: NavigationRailState::new(navigation_items),
            workspaces: WorkspacesState::default(),
            workspace_form: None,
            logs: LogsState::default(),
            focus: Focus::default(),
            throbber_idx: 0,
            last_form_id: FormId::default(),
            root_focus: FocusFlag::named("root"),
        };
        app.focus = FocusBuilder::build_for(&app);
        app
    }

    /// Apply a message from the runtime.
    pub fn update(&mut self, msg: &Msg) -> Vec<Effect> {
        match msg {
            Msg::Tick => {
                if self.is_executing() {
                    self.throbber_idx = (self.throbber_idx + 1) % 8;
                }
                Vec::new()
            }
            Msg::Resize(..) => Vec::new(),
            Msg::ExecCompleted(outcome) => self.apply_outcome(outcome),
        }
    }

    /// The open form, if it is the one that sent request `id`.
    fn form_for(&mut self, id: FormId) -> Option<&mut WorkspaceFormState> {
        let form = self.workspace_form.as_mut().filter(|form| form.id() == id);
        if form.is_none() {
            debug!(%id, "creation result belongs to a form that is no longer open");
        }
        form
    }

    fn apply_outcome(&mut self, outcome: &ExecOutcome) -> Vec<Effect> {
        match outcome {
            ExecOutcome::WorkspaceCreated { form, name, workspace } => {
                let Some(form) = self.form_for(*form) else {
                    info!(name, "workspace created after its form was closed");
                    self.logs.push(LogLevel::Info, format!("Workspace '{name}' created"));
                    return Vec::new();
                };
                if !form.complete(Ok(())) {
                    return Vec::new();
                }
                let cluster_type = form.cluster_type().clone();
                self.workspaces.record(name.clone(), cluster_type, workspace.clone());
                self.logs.push(LogLevel::Info, format!("Workspace '{name}' created"));
                vec![Effect::CloseModal]
            }
            ExecOutcome::WorkspaceCreateFailed { form, name, message } => {
                warn!(name, %message, "workspace creation failed");
                self.logs
                    .push(LogLevel::Error, format!("Failed to create workspace '{name}': {message}"));
                if let Some(form) = self.form_for(*form) {
                    form.complete(Err(message.clone()));
                }
                Vec::new()
            }
            ExecOutcome::Log(line) => {
                self.logs.push(LogLevel::Info, line);
                Vec::new()
            }
        }
    }

    /// A creation request is in flight for the open form.
    pub fn is_executing(&self) -> bool {
        self.workspace_form.as_ref().is_some_and(WorkspaceFormState::is_loading)
    }

    pub fn navigate(&mut self, target: &LinkTarget) {
        if self.router.follow(target) {
            info!(pathname = self.router.pathname(), "navigated");
        }
    }

    /// Open a fresh form with its own id.
    pub fn open_workspace_form(&mut self) {
        self.last_form_id = self.last_form_id.next();
        let form = WorkspaceFormState::new(self.ctx.cluster_type.clone(), self.ctx.submit_lifecycle_config)
            .with_id(self.last_form_id);
        self.workspace_form = Some(form);
    }

    /// Drop the form state; an in-flight result is discarded when it arrives.
    pub fn close_workspace_form(&mut self) {
        if self.workspace_form.take().is_some_and(|form| form.is_loading()) {
            self.logs
                .push(LogLevel::Warn, "Form closed while a workspace was being created");
        }
    }

    /// Switch to the next theme and remember it.
    pub fn cycle_theme(&mut self) {
        let next = self.ctx.theme_id.next();
        self.ctx.theme_id = next;
        self.ctx.theme = next.build();
        if let Err(error) = self.ctx.preferences.set_preferred_theme(Some(next.as_str().to_string())) {
            warn!(%error, "failed to persist theme preference");
            self.logs.push(LogLevel::Warn, format!("Could not save theme: {error}"));
        }
    }
}

impl HasFocus for App {
    fn build(&self, builder: &mut FocusBuilder) {
        // The modal traps focus.
        if let Some(form) = &self.workspace_form {
            builder.widget(form);
            return;
        }
        builder.widget(&self.nav_rail);
        if self.router.route() == PageRoute::Workspaces {
            builder.widget(&self.workspaces);
        }
        if self.logs.is_visible {
            builder.widget(&self.logs);
        }
    }

    fn focus(&self) -> FocusFlag {
        self.root_focus.clone()
    }

    fn area(&self) -> Rect {
        Rect::default()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use workbench_api::{ApiError, CreateWorkspaceResponse};
    use workbench_types::CreateWorkspaceRequest;

    use super::*;

    /// Records requests and answers with a canned response.
    #[derive(Debug)]
    pub struct FakeWorkspaceService {
        pub requests: Mutex<Vec<CreateWorkspaceRequest>>,
        response: Result<CreateWorkspaceResponse, String>,
    }

    impl FakeWorkspaceService {
        pub fn answering(response: CreateWorkspaceResponse) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response: Ok(response),
            })
        }

        pub fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response: Err(message.to_string()),
            })
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().expect("requests lock").len()
        }
    }

    #[async_trait]
    impl WorkspaceService for FakeWorkspaceService {
        async fn create_workspace(&self, request: &CreateWorkspaceRequest) -> Result<CreateWorkspaceResponse, ApiError> {
            self.requests.lock().expect("requests lock").push(request.clone());
            match &self.response {
                Ok(response) => Ok(response.clone()),
                Err(message) => Err(ApiError::Server {
                    status: 500,
                    message: message.clone(),
                    errors: None,
                }),
            }
        }
    }

    pub fn app_with(api: Arc<dyn WorkspaceService>, cluster_type: ClusterType) -> App {
        App::new(TuiOptions {
            api,
            preferences: Arc::new(UserPreferences::ephemeral()),
            cluster_type,
            submit_lifecycle_config: false,
            navigation_items: Some(dashboard_navigation_items()),
            initial_path: WORKSPACES_PATH.to_string(),
        })
    }
}
