use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(EmployeeId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employee => "employee",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Seniority level. The wire form is the display label, e.g. `"Mid-Level"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmployeeClass {
    Junior,
    #[serde(rename = "Mid-Level")]
    MidLevel,
    Senior,
    Principal,
}

impl EmployeeClass {
    pub const ALL: [EmployeeClass; 4] = [
        EmployeeClass::Junior,
        EmployeeClass::MidLevel,
        EmployeeClass::Senior,
        EmployeeClass::Principal,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EmployeeClass::Junior => "Junior",
            EmployeeClass::MidLevel => "Mid-Level",
            EmployeeClass::Senior => "Senior",
            EmployeeClass::Principal => "Principal",
        }
    }
}

impl fmt::Display for EmployeeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EmployeeClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "junior" => Ok(EmployeeClass::Junior),
            "mid-level" | "mid" | "midlevel" => Ok(EmployeeClass::MidLevel),
            "senior" => Ok(EmployeeClass::Senior),
            "principal" => Ok(EmployeeClass::Principal),
            _ => Err(format!("unknown employee class '{s}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub age: i32,
    pub class: EmployeeClass,
    #[serde(default)]
    pub subjects: Vec<String>,
    pub attendance: f64,
}

impl Employee {
    /// Up to two upper-cased initials taken from the whitespace-separated name parts.
    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect()
    }

    pub fn to_input(&self) -> EmployeeInput {
        EmployeeInput {
            name: self.name.clone(),
            age: self.age,
            class: self.class,
            subjects: self.subjects.clone(),
            attendance: self.attendance,
        }
    }
}

/// Employee fields without the server-assigned identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeInput {
    pub name: String,
    pub age: i32,
    pub class: EmployeeClass,
    pub subjects: Vec<String>,
    pub attendance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Age,
    Class,
    Attendance,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Age => "age",
            SortKey::Class => "class",
            SortKey::Attendance => "attendance",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "age" => Ok(SortKey::Age),
            "class" => Ok(SortKey::Class),
            "attendance" => Ok(SortKey::Attendance),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Asc),
            "desc" | "descending" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_class_uses_display_labels_on_the_wire() {
        let json = serde_json::to_string(&EmployeeClass::MidLevel).expect("serialize");
        assert_eq!(json, "\"Mid-Level\"");
        let parsed: EmployeeClass = serde_json::from_str("\"Principal\"").expect("deserialize");
        assert_eq!(parsed, EmployeeClass::Principal);
    }

    #[test]
    fn employee_class_parses_loose_cli_spellings() {
        assert_eq!("mid_level".parse::<EmployeeClass>(), Ok(EmployeeClass::MidLevel));
        assert_eq!("SENIOR".parse::<EmployeeClass>(), Ok(EmployeeClass::Senior));
        assert!("intern".parse::<EmployeeClass>().is_err());
    }

    #[test]
    fn initials_take_first_two_name_parts() {
        let employee = Employee {
            id: EmployeeId::new("1"),
            name: "ada mary lovelace".into(),
            age: 36,
            class: EmployeeClass::Principal,
            subjects: Vec::new(),
            attendance: 99.0,
        };
        assert_eq!(employee.initials(), "AM");
    }

    #[test]
    fn role_deserializes_from_lowercase() {
        let user: User =
            serde_json::from_str(r#"{"id":"7","username":"root","role":"admin"}"#).expect("user");
        assert!(user.is_admin());
        assert_eq!(user.id, UserId::new("7"));
    }
}
