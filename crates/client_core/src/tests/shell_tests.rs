use storage::MemoryStore;
use tokio::sync::broadcast;

use super::*;
use crate::test_support::{admin_user, staff_user, ScriptedGateway};

#[test]
fn parses_known_paths_with_noise() {
    assert_eq!(Route::parse("/"), Some(Route::Home));
    assert_eq!(Route::parse(""), Some(Route::Home));
    assert_eq!(Route::parse("/employees/"), Some(Route::Employees));
    assert_eq!(Route::parse("/employees/list?page=2"), Some(Route::EmployeesList));
    assert_eq!(Route::parse("/reports/attendance#top"), Some(Route::AttendanceReports));
    assert_eq!(Route::parse("/nowhere"), None);
}

#[test]
fn every_route_round_trips_through_its_path() {
    for route in Route::ALL {
        assert_eq!(Route::parse(route.path()), Some(route));
    }
}

#[test]
fn unauthenticated_access_redirects_to_login() {
    assert_eq!(resolve("/employees", false), Navigation::Redirect(Route::Login));
    assert_eq!(resolve("/settings", false), Navigation::Redirect(Route::Login));
    assert_eq!(resolve("/login", false), Navigation::Render(Route::Login));
    assert_eq!(resolve_final("/employees/grid", false), Route::Login);
}

#[test]
fn unknown_paths_land_on_home() {
    assert_eq!(resolve("/does-not-exist", true), Navigation::Redirect(Route::Home));
    assert_eq!(resolve_final("/does-not-exist", true), Route::Home);
    assert_eq!(resolve_final("/does-not-exist", false), Route::Login);
}

#[test]
fn authenticated_routes_render() {
    for route in Route::ALL {
        assert_eq!(resolve(route.path(), true), Navigation::Render(route));
    }
}

#[test]
fn placeholder_routes_have_messages() {
    assert_eq!(
        Route::Analytics.placeholder(),
        Some(("Analytics", "Analytics functionality coming soon..."))
    );
    assert!(Route::Employees.placeholder().is_none());
    assert!(Route::Employees.shows_directory());
    assert!(!Route::Settings.shows_directory());
}

#[test]
fn only_admins_get_mutation_capabilities() {
    let admin = Capabilities::for_user(Some(&admin_user()));
    assert!(admin.can_create && admin.can_edit && admin.can_delete);

    let staff = Capabilities::for_user(Some(&staff_user()));
    assert_eq!(staff, Capabilities::default());
    assert_eq!(Capabilities::for_user(None), Capabilities::default());
}

#[test]
fn hamburger_menu_nests_employee_views() {
    let employees = HAMBURGER_MENU
        .iter()
        .find(|item| item.route == Route::Employees)
        .expect("employees entry");
    let children: Vec<Route> = employees.children.iter().map(|c| c.route).collect();
    assert_eq!(children, vec![Route::EmployeesGrid, Route::EmployeesList]);
    assert_eq!(HORIZONTAL_MENU.len(), 6);
}

#[tokio::test]
async fn view_shell_follows_session_state() {
    let gateway = Arc::new(ScriptedGateway::default());
    let (events, _rx) = broadcast::channel(16);
    let session = SessionStore::rehydrate(gateway, Arc::new(MemoryStore::new()), events)
        .await
        .expect("session");
    let mut shell = ViewShell::new(session.clone());

    assert_eq!(shell.navigate("/employees/list").await, Route::Login);

    session.login("admin", "admin123").await.expect("login");
    assert_eq!(shell.navigate("/employees/list").await, Route::EmployeesList);
    assert_eq!(shell.view_mode(), ViewMode::Tile);
    assert_eq!(shell.navigate("/employees").await, Route::Employees);
    assert_eq!(shell.view_mode(), ViewMode::Tile, "plain listing keeps the mode");

    session.logout().await.expect("logout");
    assert_eq!(shell.revalidate().await, Route::Login);
}
