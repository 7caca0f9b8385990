use std::{sync::RwLock, time::Duration};

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{Employee, EmployeeId, EmployeeInput, User},
    error::{ApiException, ErrorCode},
    protocol::{
        CreateEmployeeData, CreateEmployeeVariables, CurrentUserData, DeleteEmployeeData,
        EmployeeData, EmployeeIdVariables, EmployeesData, GraphQlRequest, GraphQlResponse,
        ListEmployeesVariables, LoginData, LoginInput, LoginPayload, LoginVariables, NoVariables,
        SearchEmployeesData, SearchEmployeesPayload, SearchEmployeesVariables,
        UpdateEmployeeData, UpdateEmployeeVariables, CREATE_EMPLOYEE_MUTATION,
        DELETE_EMPLOYEE_MUTATION, GET_CURRENT_USER_QUERY, GET_EMPLOYEES_QUERY,
        GET_EMPLOYEE_BY_ID_QUERY, LOGIN_MUTATION, SEARCH_EMPLOYEES_QUERY,
        UPDATE_EMPLOYEE_MUTATION,
    },
};
use tracing::debug;
use url::Url;

use crate::error::GatewayError;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote data gateway: the graph API the directory reads from and mutates.
#[async_trait]
pub trait DirectoryGateway: Send + Sync {
    /// Replaces the bearer token attached to subsequent requests.
    fn set_auth_token(&self, token: Option<String>);

    async fn login(&self, username: &str, password: &str) -> Result<LoginPayload, GatewayError>;
    async fn current_user(&self) -> Result<Option<User>, GatewayError>;
    async fn list_employees(
        &self,
        variables: ListEmployeesVariables,
    ) -> Result<Vec<Employee>, GatewayError>;
    async fn search_employees(
        &self,
        variables: SearchEmployeesVariables,
    ) -> Result<SearchEmployeesPayload, GatewayError>;
    async fn employee(&self, id: &EmployeeId) -> Result<Option<Employee>, GatewayError>;
    async fn create_employee(&self, input: EmployeeInput) -> Result<Employee, GatewayError>;
    async fn update_employee(
        &self,
        id: &EmployeeId,
        input: EmployeeInput,
    ) -> Result<Employee, GatewayError>;
    async fn delete_employee(&self, id: &EmployeeId) -> Result<bool, GatewayError>;
}

/// GraphQL-over-HTTP implementation of [`DirectoryGateway`].
pub struct GraphQlGateway {
    http: Client,
    endpoint: Url,
    token: RwLock<Option<String>>,
}

impl GraphQlGateway {
    pub fn new(endpoint: &str) -> Result<Self, GatewayError> {
        Self::with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let endpoint = Url::parse(endpoint)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint,
            token: RwLock::new(None),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn bearer_token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }

    async fn execute<V, T>(
        &self,
        operation_name: &'static str,
        document: &str,
        variables: V,
    ) -> Result<T, GatewayError>
    where
        V: Serialize + Send,
        T: DeserializeOwned + Send,
    {
        let request = GraphQlRequest::new(document, operation_name, variables);
        let mut builder = self.http.post(self.endpoint.clone()).json(&request);
        if let Some(token) = self.bearer_token() {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        debug!(operation = operation_name, endpoint = %self.endpoint, "dispatching gateway request");
        let res = builder.send().await?;
        let status = res.status();
        let body = res.text().await?;

        let parsed = match serde_json::from_str::<GraphQlResponse<T>>(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(GatewayError::Status {
                    status: status.as_u16(),
                    body,
                });
            }
            Err(err) => return Err(err.into()),
        };

        if let Some(first) = parsed.errors.first() {
            let message = parsed
                .errors
                .iter()
                .map(|entry| entry.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            // An uncoded error on an auth status takes its code from the status.
            let uncoded = first
                .extensions
                .as_ref()
                .and_then(|ext| ext.code.as_deref())
                .is_none();
            let code = match status.as_u16() {
                401 if uncoded => ErrorCode::Unauthorized,
                403 if uncoded => ErrorCode::Forbidden,
                _ => first.code(),
            };
            return Err(ApiException::new(code, message).into());
        }

        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parsed.data.ok_or(GatewayError::MissingData(operation_name))
    }
}

#[async_trait]
impl DirectoryGateway for GraphQlGateway {
    fn set_auth_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginPayload, GatewayError> {
        let data: LoginData = self
            .execute(
                "Login",
                LOGIN_MUTATION,
                LoginVariables {
                    input: LoginInput {
                        username: username.to_string(),
                        password: password.to_string(),
                    },
                },
            )
            .await?;
        data.login.ok_or(GatewayError::MissingData("Login"))
    }

    async fn current_user(&self) -> Result<Option<User>, GatewayError> {
        let data: CurrentUserData = self
            .execute("GetCurrentUser", GET_CURRENT_USER_QUERY, NoVariables {})
            .await?;
        Ok(data.current_user)
    }

    async fn list_employees(
        &self,
        variables: ListEmployeesVariables,
    ) -> Result<Vec<Employee>, GatewayError> {
        let data: EmployeesData = self
            .execute("GetEmployees", GET_EMPLOYEES_QUERY, variables)
            .await?;
        Ok(data.employees)
    }

    async fn search_employees(
        &self,
        variables: SearchEmployeesVariables,
    ) -> Result<SearchEmployeesPayload, GatewayError> {
        let data: SearchEmployeesData = self
            .execute("SearchEmployees", SEARCH_EMPLOYEES_QUERY, variables)
            .await?;
        Ok(data.search_employees)
    }

    async fn employee(&self, id: &EmployeeId) -> Result<Option<Employee>, GatewayError> {
        let data: EmployeeData = self
            .execute(
                "GetEmployeeById",
                GET_EMPLOYEE_BY_ID_QUERY,
                EmployeeIdVariables { id: id.clone() },
            )
            .await?;
        Ok(data.employee)
    }

    async fn create_employee(&self, input: EmployeeInput) -> Result<Employee, GatewayError> {
        let data: CreateEmployeeData = self
            .execute(
                "CreateEmployee",
                CREATE_EMPLOYEE_MUTATION,
                CreateEmployeeVariables { input },
            )
            .await?;
        Ok(data.create_employee)
    }

    async fn update_employee(
        &self,
        id: &EmployeeId,
        input: EmployeeInput,
    ) -> Result<Employee, GatewayError> {
        let data: UpdateEmployeeData = self
            .execute(
                "UpdateEmployee",
                UPDATE_EMPLOYEE_MUTATION,
                UpdateEmployeeVariables {
                    id: id.clone(),
                    input,
                },
            )
            .await?;
        Ok(data.update_employee)
    }

    async fn delete_employee(&self, id: &EmployeeId) -> Result<bool, GatewayError> {
        let data: DeleteEmployeeData = self
            .execute(
                "DeleteEmployee",
                DELETE_EMPLOYEE_MUTATION,
                EmployeeIdVariables { id: id.clone() },
            )
            .await?;
        Ok(data.delete_employee)
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
