//! Route table, authentication gate and navigation chrome.

use std::sync::Arc;

use shared::domain::User;

use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Home,
    Employees,
    EmployeesGrid,
    EmployeesList,
    Reports,
    AttendanceReports,
    PerformanceReports,
    Departments,
    Analytics,
    Settings,
}

impl Route {
    pub const ALL: [Route; 11] = [
        Route::Login,
        Route::Home,
        Route::Employees,
        Route::EmployeesGrid,
        Route::EmployeesList,
        Route::Reports,
        Route::AttendanceReports,
        Route::PerformanceReports,
        Route::Departments,
        Route::Analytics,
        Route::Settings,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Home => "/",
            Route::Employees => "/employees",
            Route::EmployeesGrid => "/employees/grid",
            Route::EmployeesList => "/employees/list",
            Route::Reports => "/reports",
            Route::AttendanceReports => "/reports/attendance",
            Route::PerformanceReports => "/reports/performance",
            Route::Departments => "/departments",
            Route::Analytics => "/analytics",
            Route::Settings => "/settings",
        }
    }

    /// Matches a path, ignoring query string, fragment and a trailing slash.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim();
        let path = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        let path = if path.is_empty() { "/" } else { path };
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    pub fn is_protected(self) -> bool {
        self != Route::Login
    }

    /// Heading and message of the informational pages that have no content yet.
    pub fn placeholder(self) -> Option<(&'static str, &'static str)> {
        match self {
            Route::Reports => Some(("Reports", "Reports functionality coming soon...")),
            Route::AttendanceReports => {
                Some(("Attendance Reports", "Attendance reports coming soon..."))
            }
            Route::PerformanceReports => {
                Some(("Performance Reports", "Performance reports coming soon..."))
            }
            Route::Departments => Some(("Departments", "Departments functionality coming soon...")),
            Route::Analytics => Some(("Analytics", "Analytics functionality coming soon...")),
            Route::Settings => Some(("Settings", "Settings functionality coming soon...")),
            _ => None,
        }
    }

    pub fn shows_directory(self) -> bool {
        matches!(
            self,
            Route::Home | Route::Employees | Route::EmployeesGrid | Route::EmployeesList
        )
    }

    /// Display mode a route selects, if it selects one.
    pub fn view_mode(self) -> Option<ViewMode> {
        match self {
            Route::EmployeesGrid => Some(ViewMode::Grid),
            Route::EmployeesList => Some(ViewMode::Tile),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    Tile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

/// One routing step. `/login` always renders; protected routes need a session; unknown
/// paths go to the landing route.
pub fn resolve(path: &str, authenticated: bool) -> Navigation {
    match Route::parse(path) {
        None => Navigation::Redirect(Route::Home),
        Some(route) if route.is_protected() && !authenticated => Navigation::Redirect(Route::Login),
        Some(route) => Navigation::Render(route),
    }
}

/// Follows redirects until a route renders.
pub fn resolve_final(path: &str, authenticated: bool) -> Route {
    let mut next = path.to_string();
    // Any chain ends within two hops: unknown -> home -> login.
    for _ in 0..3 {
        match resolve(&next, authenticated) {
            Navigation::Render(route) => return route,
            Navigation::Redirect(route) => next = route.path().to_string(),
        }
    }
    Route::Login
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl Capabilities {
    /// Admins may mutate; anyone else only reads. The gateway enforces this for real.
    pub fn for_user(user: Option<&User>) -> Self {
        let admin = user.is_some_and(User::is_admin);
        Self {
            can_create: admin,
            can_edit: admin,
            can_delete: admin,
        }
    }

    pub fn any_row_action(self) -> bool {
        self.can_edit || self.can_delete
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MenuItem {
    pub label: &'static str,
    pub route: Route,
    pub children: &'static [MenuItem],
}

const fn leaf(label: &'static str, route: Route) -> MenuItem {
    MenuItem {
        label,
        route,
        children: &[],
    }
}

pub const HORIZONTAL_MENU: &[MenuItem] = &[
    leaf("Home", Route::Home),
    leaf("Employees", Route::Employees),
    leaf("Reports", Route::Reports),
    leaf("Departments", Route::Departments),
    leaf("Analytics", Route::Analytics),
    leaf("Settings", Route::Settings),
];

pub const HAMBURGER_MENU: &[MenuItem] = &[
    leaf("Dashboard", Route::Home),
    MenuItem {
        label: "Employees",
        route: Route::Employees,
        children: &[
            leaf("Grid View", Route::EmployeesGrid),
            leaf("List View", Route::EmployeesList),
        ],
    },
    MenuItem {
        label: "Reports",
        route: Route::Reports,
        children: &[
            leaf("Attendance", Route::AttendanceReports),
            leaf("Performance", Route::PerformanceReports),
        ],
    },
    leaf("Departments", Route::Departments),
    leaf("Settings", Route::Settings),
];

/// Current location plus display mode, gated on the injected session.
pub struct ViewShell {
    session: Arc<SessionStore>,
    current: Route,
    view_mode: ViewMode,
}

impl ViewShell {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            current: Route::Login,
            view_mode: ViewMode::default(),
        }
    }

    pub async fn navigate(&mut self, path: &str) -> Route {
        let authenticated = self.session.is_authenticated().await;
        let route = resolve_final(path, authenticated);
        if let Some(mode) = route.view_mode() {
            self.view_mode = mode;
        }
        self.current = route;
        route
    }

    /// Re-applies the gate to the current route, e.g. after sign-out.
    pub async fn revalidate(&mut self) -> Route {
        let path = self.current.path();
        self.navigate(path).await
    }

    pub fn current_route(&self) -> Route {
        self.current
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
