use shared::domain::{SortKey, SortOrder};

use super::*;
use crate::{
    shell::{HAMBURGER_MENU, HORIZONTAL_MENU},
    test_support::{admin_user, employee, staff_user},
};

fn ready_view(rows: Vec<Employee>) -> ListView {
    ListView {
        result_count: rows.len() as u32,
        has_next: rows.len() == 5,
        rows,
        page: 1,
        page_size: 5,
        sort_by: SortKey::Name,
        sort_order: SortOrder::Asc,
        search: None,
        status: ListStatus::Ready,
        has_previous: false,
    }
}

fn admin_caps() -> Capabilities {
    Capabilities::for_user(Some(&admin_user()))
}

#[test]
fn non_admin_sees_no_mutation_controls() {
    let view = ready_view(vec![employee("1", "Ada Lovelace")]);
    let caps = Capabilities::for_user(Some(&staff_user()));

    for mode in [ViewMode::Grid, ViewMode::Tile] {
        let out = render_directory(&view, caps, mode);
        assert!(out.contains("Ada Lovelace"));
        assert!(!out.contains("Add Employee"));
        assert!(!out.contains("[edit]"));
        assert!(!out.contains("[delete]"));
        assert!(!out.contains("Actions"));
    }
}

#[test]
fn admin_sees_add_and_row_actions() {
    let view = ready_view(vec![employee("1", "Ada Lovelace")]);

    let grid = render_directory(&view, admin_caps(), ViewMode::Grid);
    assert!(grid.starts_with("[+] Add Employee"));
    assert!(grid.contains(" | Actions"));
    assert!(grid.contains("[edit] [delete]"));

    let tiles = render_directory(&view, admin_caps(), ViewMode::Tile);
    assert!(tiles.contains("(AL) Ada Lovelace - Senior #1 | [edit] [delete]"));
}

#[test]
fn failure_renders_only_the_error() {
    let mut view = ready_view(vec![employee("1", "Ada Lovelace")]);
    view.status = ListStatus::Failed {
        message: "gateway returned HTTP 500: boom".into(),
        requires_reauth: false,
    };

    let out = render_directory(&view, admin_caps(), ViewMode::Grid);
    assert_eq!(
        out,
        "Error loading employees: gateway returned HTTP 500: boom\n"
    );
}

#[test]
fn search_mode_disables_sort_and_shows_summary() {
    let mut view = ready_view(vec![employee("3", "Grace Hopper")]);
    view.search = Some("grace".into());
    view.result_count = 1;

    let out = render_directory(&view, admin_caps(), ViewMode::Grid);
    assert!(out.contains("Found 1 result for \"grace\""));
    assert!(out.contains("Sort: name asc (disabled while searching)"));
    assert!(out.contains("Showing 1-1 of 1"));
}

#[test]
fn empty_listing_says_so() {
    let view = ready_view(Vec::new());
    let out = render_directory(&view, Capabilities::default(), ViewMode::Grid);
    assert!(out.contains("No employees found."));
    assert!(!out.contains("Showing"));
}

#[test]
fn pagination_line_reflects_neighbours() {
    let rows = (1..=5)
        .map(|n| employee(&n.to_string(), &format!("Employee {n:02}")))
        .collect();
    let mut view = ready_view(rows);
    view.page = 2;
    view.has_previous = true;

    let out = render_directory(&view, Capabilities::default(), ViewMode::Grid);
    assert!(out.contains("<prev page 2 next>  Showing 6-10"));
}

#[test]
fn header_names_the_signed_in_user() {
    assert_eq!(
        render_header(Some(&admin_user())),
        "Employee Directory | admin (admin) | logout"
    );
    assert_eq!(render_header(None), "Employee Directory");
}

#[test]
fn menu_marks_current_route_and_indents_children() {
    let out = render_menu(HAMBURGER_MENU, Route::EmployeesList);
    assert!(out.lines().any(|line| line.starts_with("  * List View")));
    assert!(out.lines().any(|line| line.starts_with("    Grid View")));

    let flat = render_menu(HORIZONTAL_MENU, Route::Home);
    assert_eq!(flat.lines().count(), 6);
    assert!(flat.starts_with("* Home"));
}

#[test]
fn login_banner_and_placeholders() {
    let out = render_login(Some("Invalid username or password. Please try again."));
    assert!(out.contains("! Invalid username or password. Please try again."));
    assert_eq!(
        render_placeholder(Route::Settings).as_deref(),
        Some("Settings\nSettings functionality coming soon...\n")
    );
    assert_eq!(render_placeholder(Route::Employees), None);
}

#[test]
fn form_shows_title_and_subjects() {
    let mut form = EmployeeForm::create();
    form.set_name("Katherine Johnson");
    form.add_subject("Orbital Mechanics");
    let out = render_form(&form);
    assert!(out.starts_with("Add Employee\n"));
    assert!(out.contains("[Orbital Mechanics]"));

    let detail = render_employee_detail(&employee("8", "Katherine Johnson"));
    assert!(detail.starts_with("(KJ) Katherine Johnson"));
    assert!(detail.contains("Subjects:   Math"));
}
