use super::*;

#[test]
fn parses_navigation_and_paging() {
    assert_eq!(
        parse_line("open /employees/list"),
        Ok(ReplCommand::Open("/employees/list".into()))
    );
    assert_eq!(parse_line("  next "), Ok(ReplCommand::Next));
    assert_eq!(parse_line("page 3"), Ok(ReplCommand::Page(3)));
    assert!(parse_line("page three").is_err());
    assert_eq!(parse_line(""), Ok(ReplCommand::Empty));
}

#[test]
fn parses_sort_and_view_arguments() {
    assert_eq!(parse_line("sort Age"), Ok(ReplCommand::Sort(SortKey::Age)));
    assert_eq!(parse_line("order desc"), Ok(ReplCommand::Order(SortOrder::Desc)));
    assert_eq!(parse_line("view list"), Ok(ReplCommand::View(ViewMode::Tile)));
    assert!(parse_line("sort salary").is_err());
    assert!(parse_line("view cards").is_err());
}

#[test]
fn search_keeps_inner_spacing_and_allows_empty() {
    assert_eq!(
        parse_line("search  Ada  Lovelace "),
        Ok(ReplCommand::Search("Ada  Lovelace".into()))
    );
    assert_eq!(parse_line("search"), Ok(ReplCommand::Search(String::new())));
}

#[test]
fn id_commands_require_an_argument() {
    assert_eq!(
        parse_line("delete 42"),
        Ok(ReplCommand::Delete(EmployeeId::new("42")))
    );
    assert_eq!(parse_line("edit"), Err("usage: edit <id>".to_string()));
    assert!(parse_line("frobnicate").is_err());
}

#[test]
fn login_arguments_are_optional() {
    assert_eq!(
        parse_line("login admin admin123"),
        Ok(ReplCommand::Login {
            username: Some("admin".into()),
            password: Some("admin123".into()),
        })
    );
    assert_eq!(
        parse_line("login"),
        Ok(ReplCommand::Login {
            username: None,
            password: None,
        })
    );
}

#[test]
fn form_summary_shows_the_draft_before_prompting() {
    let mut form = EmployeeForm::create();
    form.set_name("Grace Hopper");
    form.add_subject("Compilers");

    let summary = form_summary(&form);
    assert!(summary.starts_with("Add Employee\n"));
    assert!(summary.contains("Full Name:    Grace Hopper"));
    assert!(summary.contains("[Compilers]"));
    assert!(summary.ends_with("(empty keeps the value, `.` cancels)\n"));
}
