//! GraphQL operation documents and the request/response shapes exchanged with the gateway.
//!
//! Field names are part of the gateway contract; the serde renames below must match the
//! schema exactly.

use serde::{Deserialize, Serialize};

use crate::{
    domain::{Employee, EmployeeId, EmployeeInput, SortKey, SortOrder, User},
    error::ErrorCode,
};

pub const LOGIN_MUTATION: &str = r#"mutation Login($input: LoginInput!) {
  login(input: $input) {
    token
    user { id username role }
  }
}"#;

pub const GET_EMPLOYEES_QUERY: &str = r#"query GetEmployees($limit: Int, $offset: Int, $sortBy: String, $sortOrder: String) {
  employees(limit: $limit, offset: $offset, sortBy: $sortBy, sortOrder: $sortOrder) {
    id name age class subjects attendance
  }
}"#;

pub const SEARCH_EMPLOYEES_QUERY: &str = r#"query SearchEmployees($query: String!, $limit: Int, $offset: Int) {
  searchEmployees(query: $query, limit: $limit, offset: $offset) {
    employees { id name age class subjects attendance }
    total
    hasMore
  }
}"#;

pub const GET_EMPLOYEE_BY_ID_QUERY: &str = r#"query GetEmployeeById($id: ID!) {
  employee(id: $id) {
    id name age class subjects attendance
  }
}"#;

pub const GET_CURRENT_USER_QUERY: &str = r#"query GetCurrentUser {
  currentUser { id username role }
}"#;

pub const CREATE_EMPLOYEE_MUTATION: &str = r#"mutation CreateEmployee($input: EmployeeInput!) {
  createEmployee(input: $input) {
    id name age class subjects attendance
  }
}"#;

pub const UPDATE_EMPLOYEE_MUTATION: &str = r#"mutation UpdateEmployee($id: ID!, $input: EmployeeInput!) {
  updateEmployee(id: $id, input: $input) {
    id name age class subjects attendance
  }
}"#;

pub const DELETE_EMPLOYEE_MUTATION: &str = r#"mutation DeleteEmployee($id: ID!) {
  deleteEmployee(id: $id)
}"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<V> {
    pub query: String,
    pub variables: V,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl<V> GraphQlRequest<V> {
    pub fn new(query: &str, operation_name: &str, variables: V) -> Self {
        Self {
            query: query.to_string(),
            variables,
            operation_name: Some(operation_name.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlErrorEntry {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlErrorExtensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl GraphQlErrorEntry {
    pub fn code(&self) -> ErrorCode {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.code.as_deref())
            .map(ErrorCode::from_extension_code)
            .unwrap_or(ErrorCode::Internal)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginVariables {
    pub input: LoginInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPayload {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginData {
    pub login: Option<LoginPayload>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEmployeesVariables {
    pub limit: u32,
    pub offset: u32,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeesData {
    pub employees: Vec<Employee>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEmployeesVariables {
    pub query: String,
    pub limit: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEmployeesPayload {
    pub employees: Vec<Employee>,
    pub total: u32,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEmployeesData {
    pub search_employees: SearchEmployeesPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeIdVariables {
    pub id: EmployeeId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeData {
    pub employee: Option<Employee>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserData {
    pub current_user: Option<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmployeeVariables {
    pub input: EmployeeInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEmployeeVariables {
    pub id: EmployeeId,
    pub input: EmployeeInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeData {
    pub create_employee: Employee,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeData {
    pub update_employee: Employee,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteEmployeeData {
    pub delete_employee: bool,
}

/// Empty variables object for operations without arguments.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NoVariables {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_variables_use_contract_field_names() {
        let vars = ListEmployeesVariables {
            limit: 5,
            offset: 10,
            sort_by: SortKey::Attendance,
            sort_order: SortOrder::Desc,
        };
        let value = serde_json::to_value(vars).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "limit": 5,
                "offset": 10,
                "sortBy": "attendance",
                "sortOrder": "desc"
            })
        );
    }

    #[test]
    fn error_entry_maps_extension_code() {
        let entry: GraphQlErrorEntry = serde_json::from_value(serde_json::json!({
            "message": "Not authorized",
            "extensions": { "code": "UNAUTHENTICATED" }
        }))
        .expect("error entry");
        assert_eq!(entry.code(), ErrorCode::Unauthorized);

        let bare: GraphQlErrorEntry =
            serde_json::from_value(serde_json::json!({ "message": "boom" })).expect("bare");
        assert_eq!(bare.code(), ErrorCode::Internal);
    }

    #[test]
    fn search_payload_reads_has_more() {
        let data: SearchEmployeesData = serde_json::from_value(serde_json::json!({
            "searchEmployees": { "employees": [], "total": 0, "hasMore": false }
        }))
        .expect("search data");
        assert!(!data.search_employees.has_more);
    }

    #[test]
    fn response_without_data_key_reads_as_none() {
        let response: GraphQlResponse<DeleteEmployeeData> =
            serde_json::from_value(serde_json::json!({
                "errors": [{ "message": "Forbidden", "extensions": { "code": "FORBIDDEN" } }]
            }))
            .expect("error-only response");
        assert!(response.data.is_none());
        assert_eq!(response.errors[0].code(), ErrorCode::Forbidden);

        let ok: GraphQlResponse<DeleteEmployeeData> =
            serde_json::from_value(serde_json::json!({ "data": { "deleteEmployee": true } }))
                .expect("data-only response");
        assert!(ok.errors.is_empty());
        assert_eq!(ok.data.map(|d| d.delete_employee), Some(true));
    }
}
