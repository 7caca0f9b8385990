//! Terminal front end over [`DirectoryClient`]: routes, screens and notifications.

use std::sync::Arc;

use anyhow::Context;
use client_core::{
    shell::{HAMBURGER_MENU, HORIZONTAL_MENU},
    view::{
        render_directory, render_employee_detail, render_header, render_login, render_menu,
        render_placeholder,
    },
    ClientEvent, DirectoryClient, EmployeeForm, FormError, GraphQlGateway, ListStatus, ListView,
    NotificationLevel, Route, ViewMode, ViewShell,
};
use clap::Args;
use shared::domain::{EmployeeClass, EmployeeId};
use storage::Storage;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::{
    config::Settings,
    ui_error::{UiError, UiErrorCategory, UiErrorContext},
};

/// Field overrides for the add/edit form. Unset fields keep the form's value.
#[derive(Args, Debug, Clone, Default)]
pub struct EmployeeFields {
    /// Full name
    #[arg(long)]
    pub name: Option<String>,
    /// Age (18-100)
    #[arg(long)]
    pub age: Option<i32>,
    /// Junior, Mid-Level, Senior or Principal
    #[arg(long)]
    pub class: Option<EmployeeClass>,
    /// Attendance percentage (0-100)
    #[arg(long)]
    pub attendance: Option<f64>,
    /// Subject to add; repeatable
    #[arg(long = "subject")]
    pub subjects: Vec<String>,
    /// Subject to remove; repeatable
    #[arg(long = "remove-subject")]
    pub remove_subjects: Vec<String>,
}

impl EmployeeFields {
    pub fn apply_to(&self, form: &mut EmployeeForm) {
        if let Some(name) = &self.name {
            form.set_name(name.trim());
        }
        if let Some(age) = self.age {
            form.set_age(age);
        }
        if let Some(class) = self.class {
            form.set_class(class);
        }
        if let Some(attendance) = self.attendance {
            form.set_attendance(attendance);
        }
        for subject in &self.remove_subjects {
            form.remove_subject(subject.trim());
        }
        for subject in &self.subjects {
            form.add_subject(subject);
        }
    }
}

pub struct App {
    client: DirectoryClient,
    storage: Arc<Storage>,
    shell: ViewShell,
    events: broadcast::Receiver<ClientEvent>,
}

impl App {
    pub async fn connect(settings: &Settings) -> anyhow::Result<Self> {
        let storage = Arc::new(
            Storage::new(&settings.database_url)
                .await
                .with_context(|| format!("failed to open local storage '{}'", settings.database_url))?,
        );
        let gateway = Arc::new(
            GraphQlGateway::with_timeout(&settings.gateway_url, settings.request_timeout())
                .with_context(|| format!("invalid gateway url '{}'", settings.gateway_url))?,
        );
        info!(gateway = %gateway.endpoint(), database = %settings.database_url, "directory client ready");

        let client = DirectoryClient::new_with_dependencies(gateway, storage.clone()).await?;
        let events = client.subscribe_events();
        let shell = ViewShell::new(client.session().clone());
        Ok(Self {
            client,
            storage,
            shell,
            events,
        })
    }

    pub fn current_route(&self) -> Route {
        self.shell.current_route()
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), UiError> {
        match self.client.session().login(username, password).await {
            Ok(user) => {
                println!("{}", render_header(Some(&user)));
                self.drain_events();
                self.open(Route::Home.path()).await
            }
            Err(err) => {
                let ui = UiError::from_session(&err);
                println!("{}", render_login(Some(ui.message())));
                Err(ui)
            }
        }
    }

    pub async fn logout(&mut self) -> Result<(), UiError> {
        let result = self.client.session().logout().await;
        self.drain_events();
        self.shell.revalidate().await;
        match result {
            Ok(()) => {
                println!("Signed out.");
                Ok(())
            }
            Err(err) => Err(UiError::new(
                UiErrorCategory::Unknown,
                UiErrorContext::General,
                err.to_string(),
            )),
        }
    }

    /// Prints the persisted session and checks it against the gateway.
    pub async fn whoami(&mut self, check: bool) -> Result<(), UiError> {
        let snapshot = self.client.session().snapshot().await;
        if !snapshot.is_authenticated() {
            println!("Not signed in.");
            return Ok(());
        }
        println!("{}", render_header(snapshot.user.as_ref()));
        if let Some(at) = snapshot.signed_in_at {
            println!("signed in at {}", at.to_rfc3339());
        }
        match self.storage.list_items().await {
            Ok(items) => {
                for item in items {
                    println!("  stored {} (updated {})", item.key, item.updated_at);
                }
            }
            Err(err) => warn!("failed to list stored session items: {err:#}"),
        }

        if check {
            let verified = self
                .client
                .session()
                .verify()
                .await
                .map_err(|err| UiError::from_gateway(UiErrorContext::General, &err))?;
            self.drain_events();
            match verified {
                Some(user) => println!("gateway confirms {} ({})", user.username, user.role.as_str()),
                None => {
                    self.shell.revalidate().await;
                    println!("The gateway no longer accepts this session.");
                }
            }
        }
        Ok(())
    }

    /// Navigates and renders whatever the gate lets through.
    pub async fn open(&mut self, path: &str) -> Result<(), UiError> {
        let route = self.shell.navigate(path).await;
        if Route::parse(path) != Some(route) {
            debug!(requested = path, resolved = route.path(), "redirected");
            println!("-> {}", route.path());
        }
        self.render_route(route).await
    }

    /// Prints the top menu, or the nested hamburger menu when `full` is set.
    pub fn print_menu(&self, full: bool) {
        let items = if full { HAMBURGER_MENU } else { HORIZONTAL_MENU };
        print!("{}", render_menu(items, self.shell.current_route()));
    }

    async fn render_route(&mut self, route: Route) -> Result<(), UiError> {
        if route == Route::Login {
            print!("{}", render_login(None));
            return Ok(());
        }
        if route.shows_directory() {
            let view = self.client.list().refresh().await;
            return self.show_directory(view).await;
        }
        if let Some(text) = render_placeholder(route) {
            print!("{text}");
        }
        Ok(())
    }

    /// Enters the directory, optionally switching display mode first.
    pub async fn enter_directory(&mut self, mode: Option<ViewMode>) -> bool {
        let path = match mode {
            Some(ViewMode::Grid) => Route::EmployeesGrid.path(),
            Some(ViewMode::Tile) => Route::EmployeesList.path(),
            None => Route::Employees.path(),
        };
        let route = self.shell.navigate(path).await;
        if route == Route::Login {
            print!("{}", render_login(Some("Please sign in first.")));
            return false;
        }
        true
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.shell.set_view_mode(mode);
    }

    pub fn client(&self) -> &DirectoryClient {
        &self.client
    }

    /// Prints a directory view. Rejected tokens end the session.
    pub async fn show_directory(&mut self, view: ListView) -> Result<(), UiError> {
        self.drain_events();
        if let ListStatus::Failed {
            message,
            requires_reauth,
        } = &view.status
        {
            if *requires_reauth {
                self.client.session().invalidate().await;
                self.drain_events();
                self.shell.revalidate().await;
            }
            let category = if *requires_reauth {
                UiErrorCategory::Auth
            } else {
                UiErrorCategory::Unknown
            };
            return Err(UiError::new(
                category,
                UiErrorContext::LoadEmployees,
                message.clone(),
            ));
        }
        let caps = self.client.capabilities().await;
        print!("{}", render_directory(&view, caps, self.shell.view_mode()));
        Ok(())
    }

    pub async fn show_employee(&mut self, id: &EmployeeId) -> Result<(), UiError> {
        match self.client.employee_detail(id).await {
            Ok(Some(employee)) => {
                print!("{}", render_employee_detail(&employee));
                Ok(())
            }
            Ok(None) => Err(UiError::new(
                UiErrorCategory::Validation,
                UiErrorContext::General,
                format!("employee {id} not found"),
            )),
            Err(err) => {
                self.drain_events();
                self.shell.revalidate().await;
                Err(UiError::from_gateway(UiErrorContext::General, &err))
            }
        }
    }

    /// Loads an employee into an edit form.
    pub async fn edit_form(&mut self, id: &EmployeeId) -> Result<EmployeeForm, UiError> {
        match self.client.employee_detail(id).await {
            Ok(Some(employee)) => Ok(EmployeeForm::edit(&employee)),
            Ok(None) => Err(UiError::new(
                UiErrorCategory::Validation,
                UiErrorContext::SaveEmployee,
                format!("employee {id} not found"),
            )),
            Err(err) => Err(UiError::from_gateway(UiErrorContext::SaveEmployee, &err)),
        }
    }

    pub async fn save(&mut self, form: &EmployeeForm) -> Result<(), UiError> {
        let result = self.client.list().save_form(form).await;
        self.drain_events();
        match result {
            Ok(saved) => {
                print!("{}", render_employee_detail(&saved));
                Ok(())
            }
            Err(err) => {
                if let FormError::Gateway(inner) = &err {
                    if self.client.expire_session_if_unauthorized(inner).await {
                        self.drain_events();
                        self.shell.revalidate().await;
                    }
                }
                Err(UiError::from_form(&err))
            }
        }
    }

    pub async fn delete(&mut self, id: &EmployeeId) -> Result<(), UiError> {
        match self.client.list().delete_employee(id).await {
            Ok(view) => self.show_directory(view).await,
            Err(err) => {
                self.drain_events();
                if self.client.expire_session_if_unauthorized(&err).await {
                    self.drain_events();
                    self.shell.revalidate().await;
                }
                Err(UiError::from_gateway(UiErrorContext::DeleteEmployee, &err))
            }
        }
    }

    /// Prints pending informational notices. Blocking errors are reported by the caller
    /// through the returned [`UiError`] instead.
    pub fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(ClientEvent::Notification(notice)) => {
                    if !notice.blocking && notice.level == NotificationLevel::Info {
                        println!("* {}", notice.message);
                    }
                }
                Ok(ClientEvent::SessionExpired) => {
                    println!("Your session has expired. Please sign in again.");
                }
                Ok(ClientEvent::SessionChanged(_) | ClientEvent::ListUpdated(_)) => {}
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "event receiver lagged");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
}
