//! Plain-text rendering of the directory screens.

use std::fmt::Write as _;

use shared::domain::{Employee, User};

use crate::{
    forms::EmployeeForm,
    list_controller::{ListStatus, ListView},
    shell::{Capabilities, MenuItem, Route, ViewMode},
};

const NAME_WIDTH: usize = 24;
const CLASS_WIDTH: usize = 10;

pub fn render_header(user: Option<&User>) -> String {
    match user {
        Some(user) => format!(
            "Employee Directory | {} ({}) | logout",
            user.username,
            user.role.as_str()
        ),
        None => "Employee Directory".to_string(),
    }
}

pub fn render_menu(items: &[MenuItem], current: Route) -> String {
    let mut out = String::new();
    render_menu_level(&mut out, items, current, 0);
    out
}

fn render_menu_level(out: &mut String, items: &[MenuItem], current: Route, depth: usize) {
    for item in items {
        let marker = if item.route == current { '*' } else { ' ' };
        let _ = writeln!(
            out,
            "{}{marker} {:<14} {}",
            "  ".repeat(depth),
            item.label,
            item.route.path()
        );
        render_menu_level(out, item.children, current, depth + 1);
    }
}

pub fn render_login(banner: Option<&str>) -> String {
    let mut out = String::from("Employee Directory - Sign In\n");
    if let Some(banner) = banner {
        let _ = writeln!(out, "! {banner}");
    }
    out
}

pub fn render_placeholder(route: Route) -> Option<String> {
    route
        .placeholder()
        .map(|(heading, message)| format!("{heading}\n{message}\n"))
}

fn attendance_bar(attendance: f64) -> String {
    let filled = (attendance.clamp(0.0, 100.0) / 10.0).round() as usize;
    format!("[{}{}] {attendance:>5.1}%", "#".repeat(filled), ".".repeat(10 - filled))
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

/// Renders the directory screen. Admin-only controls are omitted for everyone else.
pub fn render_directory(view: &ListView, caps: Capabilities, mode: ViewMode) -> String {
    let mut out = String::new();

    if let ListStatus::Failed { message, .. } = &view.status {
        let _ = writeln!(out, "Error loading employees: {message}");
        return out;
    }

    if caps.can_create {
        out.push_str("[+] Add Employee\n");
    }
    if let Some(summary) = view.search_summary() {
        let _ = writeln!(out, "{summary}");
    }
    let _ = writeln!(
        out,
        "Sort: {} {}{}",
        view.sort_by.as_str(),
        view.sort_order.as_str(),
        if view.sort_controls_enabled() {
            ""
        } else {
            " (disabled while searching)"
        }
    );

    if view.status == ListStatus::Loading {
        out.push_str("Loading...\n");
        return out;
    }

    if view.rows.is_empty() {
        out.push_str("No employees found.\n");
    } else {
        match mode {
            ViewMode::Grid => render_table(&mut out, &view.rows, caps),
            ViewMode::Tile => render_tiles(&mut out, &view.rows, caps),
        }
    }

    let _ = writeln!(
        out,
        "{} page {} {}{}",
        if view.has_previous { "<prev" } else { "     " },
        view.page,
        if view.has_next { "next>" } else { "     " },
        view.range_label()
            .map(|label| format!("  {label}"))
            .unwrap_or_default()
    );
    out
}

fn render_table(out: &mut String, rows: &[Employee], caps: Capabilities) {
    let _ = write!(
        out,
        "{:<8} {:<NAME_WIDTH$} {:>3} {:<CLASS_WIDTH$} {:<18} Subjects",
        "ID", "Name", "Age", "Class", "Attendance"
    );
    if caps.any_row_action() {
        out.push_str(" | Actions");
    }
    out.push('\n');

    for employee in rows {
        let _ = write!(
            out,
            "{:<8} {:<NAME_WIDTH$} {:>3} {:<CLASS_WIDTH$} {:<18} {}",
            truncate(employee.id.as_str(), 8),
            truncate(&employee.name, NAME_WIDTH),
            employee.age,
            employee.class.label(),
            attendance_bar(employee.attendance),
            employee.subjects.join(", ")
        );
        push_row_actions(out, caps);
        out.push('\n');
    }
}

fn render_tiles(out: &mut String, rows: &[Employee], caps: Capabilities) {
    for employee in rows {
        let _ = write!(
            out,
            "({}) {} - {} #{}",
            employee.initials(),
            employee.name,
            employee.class.label(),
            employee.id
        );
        push_row_actions(out, caps);
        out.push('\n');
        let _ = writeln!(
            out,
            "     age {} | attendance {}",
            employee.age,
            attendance_bar(employee.attendance)
        );
        if !employee.subjects.is_empty() {
            let _ = writeln!(out, "     subjects: {}", employee.subjects.join(", "));
        }
    }
}

fn push_row_actions(out: &mut String, caps: Capabilities) {
    if !caps.any_row_action() {
        return;
    }
    out.push_str(" |");
    if caps.can_edit {
        out.push_str(" [edit]");
    }
    if caps.can_delete {
        out.push_str(" [delete]");
    }
}

pub fn render_employee_detail(employee: &Employee) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "({}) {}", employee.initials(), employee.name);
    let _ = writeln!(out, "  ID:         {}", employee.id);
    let _ = writeln!(out, "  Class:      {}", employee.class);
    let _ = writeln!(out, "  Age:        {}", employee.age);
    let _ = writeln!(out, "  Attendance: {}", attendance_bar(employee.attendance));
    if employee.subjects.is_empty() {
        out.push_str("  Subjects:   none\n");
    } else {
        let _ = writeln!(out, "  Subjects:   {}", employee.subjects.join(", "));
    }
    out
}

pub fn render_form(form: &EmployeeForm) -> String {
    let draft = form.draft();
    let mut out = String::new();
    let _ = writeln!(out, "{}", form.title());
    let _ = writeln!(out, "  Full Name:    {}", draft.name);
    let _ = writeln!(out, "  Age:          {}", draft.age);
    let _ = writeln!(out, "  Class/Level:  {}", draft.class);
    let _ = writeln!(out, "  Attendance %: {}", draft.attendance);
    let _ = writeln!(out, "  Subjects:     [{}]", draft.subjects.join(", "));
    out
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
