use shared::domain::{Employee, EmployeeClass, EmployeeId, EmployeeInput};

use crate::{error::FormError, gateway::DirectoryGateway};

pub const MIN_AGE: i32 = 18;
pub const MAX_AGE: i32 = 100;

/// Draft state of the add/edit employee form.
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeForm {
    id: Option<EmployeeId>,
    draft: EmployeeInput,
}

impl EmployeeForm {
    /// Empty template for a new employee.
    pub fn create() -> Self {
        Self {
            id: None,
            draft: EmployeeInput {
                name: String::new(),
                age: 25,
                class: EmployeeClass::Junior,
                subjects: Vec::new(),
                attendance: 100.0,
            },
        }
    }

    pub fn edit(employee: &Employee) -> Self {
        Self {
            id: Some(employee.id.clone()),
            draft: employee.to_input(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn id(&self) -> Option<&EmployeeId> {
        self.id.as_ref()
    }

    pub fn title(&self) -> &'static str {
        if self.is_new() {
            "Add Employee"
        } else {
            "Edit Employee"
        }
    }

    pub fn draft(&self) -> &EmployeeInput {
        &self.draft
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.draft.name = name.into();
    }

    pub fn set_age(&mut self, age: i32) {
        self.draft.age = age;
    }

    pub fn set_class(&mut self, class: EmployeeClass) {
        self.draft.class = class;
    }

    pub fn set_attendance(&mut self, attendance: f64) {
        self.draft.attendance = attendance;
    }

    /// Appends a trimmed subject. Blank input and exact duplicates are ignored.
    pub fn add_subject(&mut self, raw: &str) -> bool {
        let subject = raw.trim();
        if subject.is_empty() || self.draft.subjects.iter().any(|s| s == subject) {
            return false;
        }
        self.draft.subjects.push(subject.to_string());
        true
    }

    pub fn remove_subject(&mut self, subject: &str) -> bool {
        let before = self.draft.subjects.len();
        self.draft.subjects.retain(|s| s != subject);
        self.draft.subjects.len() != before
    }

    /// Required-field and range checks only; the gateway does the real validation.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.draft.name.trim().is_empty() {
            return Err(FormError::invalid("name", "full name is required"));
        }
        if !(MIN_AGE..=MAX_AGE).contains(&self.draft.age) {
            return Err(FormError::invalid(
                "age",
                format!("must be between {MIN_AGE} and {MAX_AGE}"),
            ));
        }
        if !self.draft.attendance.is_finite() || !(0.0..=100.0).contains(&self.draft.attendance) {
            return Err(FormError::invalid("attendance", "must be between 0 and 100"));
        }
        Ok(())
    }

    /// Creates when the form has no id, updates otherwise. The draft is left untouched.
    pub async fn submit(&self, gateway: &dyn DirectoryGateway) -> Result<Employee, FormError> {
        self.validate()?;
        let saved = match &self.id {
            None => gateway.create_employee(self.draft.clone()).await?,
            Some(id) => gateway.update_employee(id, self.draft.clone()).await?,
        };
        Ok(saved)
    }
}

#[cfg(test)]
#[path = "tests/forms_tests.rs"]
mod tests;
