use std::sync::atomic::Ordering;

use super::*;
use crate::test_support::{employee, GatewayCall, ScriptedGateway};

#[test]
fn create_template_matches_defaults() {
    let form = EmployeeForm::create();
    assert!(form.is_new());
    assert_eq!(form.title(), "Add Employee");
    let draft = form.draft();
    assert_eq!(draft.name, "");
    assert_eq!(draft.age, 25);
    assert_eq!(draft.class, EmployeeClass::Junior);
    assert!(draft.subjects.is_empty());
    assert_eq!(draft.attendance, 100.0);
}

#[test]
fn edit_form_is_seeded_from_employee() {
    let existing = employee("42", "Alan Turing");
    let form = EmployeeForm::edit(&existing);
    assert!(!form.is_new());
    assert_eq!(form.title(), "Edit Employee");
    assert_eq!(form.id(), Some(&EmployeeId::new("42")));
    assert_eq!(form.draft(), &existing.to_input());
}

#[test]
fn duplicate_subject_is_a_no_op() {
    let mut form = EmployeeForm::create();
    assert!(form.add_subject("  Physics "));
    assert!(!form.add_subject("Physics"));
    assert!(!form.add_subject("   "));
    assert!(form.add_subject("physics"), "dedup is case-sensitive");
    assert_eq!(form.draft().subjects, vec!["Physics", "physics"]);
}

#[test]
fn remove_subject_keeps_order_of_the_rest() {
    let mut form = EmployeeForm::create();
    for subject in ["Math", "Art", "Music"] {
        form.add_subject(subject);
    }
    assert!(form.remove_subject("Art"));
    assert!(!form.remove_subject("Art"));
    assert_eq!(form.draft().subjects, vec!["Math", "Music"]);
}

#[test]
fn validate_applies_required_and_range_checks() {
    let mut form = EmployeeForm::create();
    assert!(matches!(
        form.validate(),
        Err(FormError::Invalid { field: "name", .. })
    ));

    form.set_name("Ada");
    form.set_age(17);
    assert!(matches!(
        form.validate(),
        Err(FormError::Invalid { field: "age", .. })
    ));

    form.set_age(MAX_AGE);
    form.set_attendance(100.5);
    assert!(matches!(
        form.validate(),
        Err(FormError::Invalid {
            field: "attendance",
            ..
        })
    ));

    form.set_attendance(0.0);
    assert!(form.validate().is_ok());
}

#[tokio::test]
async fn submit_dispatches_create_without_id() {
    let gateway = ScriptedGateway::default();
    let mut form = EmployeeForm::create();
    form.set_name("Grace Hopper");
    form.set_class(EmployeeClass::Principal);
    form.add_subject("Compilers");

    let saved = form.submit(&gateway).await.expect("create");

    assert_eq!(saved.name, "Grace Hopper");
    assert_eq!(
        gateway.calls(),
        vec![GatewayCall::Create(form.draft().clone())]
    );
}

#[tokio::test]
async fn submit_dispatches_update_with_id() {
    let gateway = ScriptedGateway::with_employees(3);
    let existing = employee("2", "Employee 02");
    let mut form = EmployeeForm::edit(&existing);
    form.set_age(44);

    let saved = form.submit(&gateway).await.expect("update");

    assert_eq!(saved.age, 44);
    assert!(matches!(
        gateway.last_call(),
        Some(GatewayCall::Update(id, _)) if id == EmployeeId::new("2")
    ));
}

#[tokio::test]
async fn failed_submit_keeps_draft_populated() {
    let gateway = ScriptedGateway::default();
    gateway.fail_mutations.store(true, Ordering::SeqCst);
    let mut form = EmployeeForm::create();
    form.set_name("Edsger Dijkstra");
    form.add_subject("Algorithms");
    let before = form.clone();

    let err = form.submit(&gateway).await.expect_err("gateway rejects");

    assert!(matches!(err, FormError::Gateway(_)));
    assert_eq!(form, before);
}

#[tokio::test]
async fn invalid_draft_never_reaches_gateway() {
    let gateway = ScriptedGateway::default();
    let form = EmployeeForm::create();

    form.submit(&gateway).await.expect_err("name missing");
    assert!(gateway.calls().is_empty());
}
