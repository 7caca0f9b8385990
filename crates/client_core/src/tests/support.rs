use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::{Employee, EmployeeClass, EmployeeId, EmployeeInput, Role, User, UserId},
    error::{ApiException, ErrorCode},
    protocol::{
        ListEmployeesVariables, LoginPayload, SearchEmployeesPayload, SearchEmployeesVariables,
    },
};

use crate::{error::GatewayError, gateway::DirectoryGateway};

#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Login { username: String, password: String },
    CurrentUser,
    List(ListEmployeesVariables),
    Search(SearchEmployeesVariables),
    Employee(EmployeeId),
    Create(EmployeeInput),
    Update(EmployeeId, EmployeeInput),
    Delete(EmployeeId),
}

/// In-memory gateway that records calls and serves a fixed employee set.
#[derive(Default)]
pub struct ScriptedGateway {
    pub employees: Mutex<Vec<Employee>>,
    pub calls: Mutex<Vec<GatewayCall>>,
    pub auth_token: Mutex<Option<String>>,
    pub fail_queries: AtomicBool,
    pub reject_token: AtomicBool,
    pub fail_mutations: AtomicBool,
    /// Delays applied to successive list/search calls, front first.
    pub query_delays: Mutex<VecDeque<Duration>>,
}

pub fn employee(id: &str, name: &str) -> Employee {
    Employee {
        id: EmployeeId::new(id),
        name: name.to_string(),
        age: 30,
        class: EmployeeClass::Senior,
        subjects: vec!["Math".to_string()],
        attendance: 90.0,
    }
}

pub fn admin_user() -> User {
    User {
        id: UserId::new("1"),
        username: "admin".into(),
        role: Role::Admin,
    }
}

pub fn staff_user() -> User {
    User {
        id: UserId::new("2"),
        username: "employee".into(),
        role: Role::Employee,
    }
}

impl ScriptedGateway {
    pub fn with_employees(count: usize) -> Self {
        let gateway = Self::default();
        *gateway.employees.lock().expect("employees") = (1..=count)
            .map(|n| employee(&n.to_string(), &format!("Employee {n:02}")))
            .collect();
        gateway
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().expect("calls").clone()
    }

    pub fn last_call(&self) -> Option<GatewayCall> {
        self.calls.lock().expect("calls").last().cloned()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().expect("calls").clear();
    }

    pub fn current_token(&self) -> Option<String> {
        self.auth_token.lock().expect("token").clone()
    }

    pub fn push_query_delay(&self, delay: Duration) {
        self.query_delays.lock().expect("delays").push_back(delay);
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().expect("calls").push(call);
    }

    async fn query_guard(&self) -> Result<(), GatewayError> {
        let delay = self.query_delays.lock().expect("delays").pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.reject_token.load(Ordering::SeqCst) {
            return Err(ApiException::new(ErrorCode::Unauthorized, "token expired").into());
        }
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(GatewayError::Status {
                status: 500,
                body: "internal error".into(),
            });
        }
        Ok(())
    }

    fn mutation_guard(&self) -> Result<(), GatewayError> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(ApiException::new(ErrorCode::Validation, "age out of range").into());
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryGateway for ScriptedGateway {
    fn set_auth_token(&self, token: Option<String>) {
        *self.auth_token.lock().expect("token") = token;
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginPayload, GatewayError> {
        self.record(GatewayCall::Login {
            username: username.to_string(),
            password: password.to_string(),
        });
        match (username, password) {
            ("admin", "admin123") => Ok(LoginPayload {
                token: "admin-token".into(),
                user: admin_user(),
            }),
            ("employee", "employee123") => Ok(LoginPayload {
                token: "employee-token".into(),
                user: staff_user(),
            }),
            _ => Err(ApiException::new(ErrorCode::Unauthorized, "Invalid credentials").into()),
        }
    }

    async fn current_user(&self) -> Result<Option<User>, GatewayError> {
        self.record(GatewayCall::CurrentUser);
        self.query_guard().await?;
        Ok(match self.current_token().as_deref() {
            Some("admin-token") => Some(admin_user()),
            Some("employee-token") => Some(staff_user()),
            _ => None,
        })
    }

    async fn list_employees(
        &self,
        variables: ListEmployeesVariables,
    ) -> Result<Vec<Employee>, GatewayError> {
        self.record(GatewayCall::List(variables));
        self.query_guard().await?;
        let employees = self.employees.lock().expect("employees");
        Ok(employees
            .iter()
            .skip(variables.offset as usize)
            .take(variables.limit as usize)
            .cloned()
            .collect())
    }

    async fn search_employees(
        &self,
        variables: SearchEmployeesVariables,
    ) -> Result<SearchEmployeesPayload, GatewayError> {
        self.record(GatewayCall::Search(variables.clone()));
        self.query_guard().await?;
        let needle = variables.query.to_ascii_lowercase();
        let employees = self.employees.lock().expect("employees");
        let matches: Vec<Employee> = employees
            .iter()
            .filter(|e| e.name.to_ascii_lowercase().contains(&needle))
            .cloned()
            .collect();
        let total = matches.len() as u32;
        let page: Vec<Employee> = matches
            .into_iter()
            .skip(variables.offset as usize)
            .take(variables.limit as usize)
            .collect();
        Ok(SearchEmployeesPayload {
            has_more: variables.offset + (page.len() as u32) < total,
            employees: page,
            total,
        })
    }

    async fn employee(&self, id: &EmployeeId) -> Result<Option<Employee>, GatewayError> {
        self.record(GatewayCall::Employee(id.clone()));
        self.query_guard().await?;
        let employees = self.employees.lock().expect("employees");
        Ok(employees.iter().find(|e| &e.id == id).cloned())
    }

    async fn create_employee(&self, input: EmployeeInput) -> Result<Employee, GatewayError> {
        self.record(GatewayCall::Create(input.clone()));
        self.mutation_guard()?;
        let mut employees = self.employees.lock().expect("employees");
        let created = Employee {
            id: EmployeeId::new(format!("{}", employees.len() + 100)),
            name: input.name,
            age: input.age,
            class: input.class,
            subjects: input.subjects,
            attendance: input.attendance,
        };
        employees.push(created.clone());
        Ok(created)
    }

    async fn update_employee(
        &self,
        id: &EmployeeId,
        input: EmployeeInput,
    ) -> Result<Employee, GatewayError> {
        self.record(GatewayCall::Update(id.clone(), input.clone()));
        self.mutation_guard()?;
        let mut employees = self.employees.lock().expect("employees");
        let target = employees
            .iter_mut()
            .find(|e| &e.id == id)
            .ok_or_else(|| ApiException::new(ErrorCode::NotFound, "no such employee"))?;
        target.name = input.name;
        target.age = input.age;
        target.class = input.class;
        target.subjects = input.subjects;
        target.attendance = input.attendance;
        Ok(target.clone())
    }

    async fn delete_employee(&self, id: &EmployeeId) -> Result<bool, GatewayError> {
        self.record(GatewayCall::Delete(id.clone()));
        self.mutation_guard()?;
        let mut employees = self.employees.lock().expect("employees");
        let before = employees.len();
        employees.retain(|e| &e.id != id);
        Ok(employees.len() != before)
    }
}
