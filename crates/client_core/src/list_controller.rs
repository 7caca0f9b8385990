//! Paged, sortable and searchable employee listing.
//!
//! Exactly one retrieval mode is active at a time: the sorted page listing, or free-text
//! search. Sort controls are inert while a search is active. Every query takes a
//! sequence number and only the response to the most recently issued query is applied,
//! so a slow response cannot overwrite newer state.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use shared::{
    domain::{Employee, EmployeeId, SortKey, SortOrder},
    protocol::{ListEmployeesVariables, SearchEmployeesPayload, SearchEmployeesVariables},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    error::{FormError, GatewayError},
    forms::EmployeeForm,
    gateway::DirectoryGateway,
    ClientEvent, Notification,
};

pub const PAGE_SIZE: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Page of the sorted listing; kept while a search is active so clearing returns to it.
    pub page: u32,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub search: Option<SearchQuery>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            sort_by: SortKey::Name,
            sort_order: SortOrder::Asc,
            search: None,
        }
    }
}

impl ListQuery {
    pub fn active_page(&self) -> u32 {
        self.search.as_ref().map_or(self.page, |search| search.page)
    }

    pub fn offset(&self) -> u32 {
        (self.active_page().max(1) - 1) * PAGE_SIZE
    }

    pub fn is_searching(&self) -> bool {
        self.search.is_some()
    }

    pub fn listing_variables(&self) -> ListEmployeesVariables {
        ListEmployeesVariables {
            limit: PAGE_SIZE,
            offset: (self.page.max(1) - 1) * PAGE_SIZE,
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }

    pub fn search_variables(&self) -> Option<SearchEmployeesVariables> {
        self.search.as_ref().map(|search| SearchEmployeesVariables {
            query: search.text.clone(),
            limit: PAGE_SIZE,
            offset: (search.page.max(1) - 1) * PAGE_SIZE,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListStatus {
    Idle,
    Loading,
    Ready,
    Failed {
        message: String,
        requires_reauth: bool,
    },
}

/// Everything the directory screen renders, derived from the controller state.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    pub rows: Vec<Employee>,
    /// Search: the server's total. Listing: rows on this page, not a collection total.
    pub result_count: u32,
    pub page: u32,
    pub page_size: u32,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub search: Option<String>,
    pub status: ListStatus,
    pub has_previous: bool,
    pub has_next: bool,
}

impl ListView {
    pub fn is_searching(&self) -> bool {
        self.search.is_some()
    }

    pub fn sort_controls_enabled(&self) -> bool {
        !self.is_searching()
    }

    /// `Showing a-b of n` in search mode; without a total in listing mode.
    pub fn range_label(&self) -> Option<String> {
        if self.rows.is_empty() {
            return None;
        }
        let start = (self.page - 1) * self.page_size + 1;
        let end = start + self.rows.len() as u32 - 1;
        Some(if self.is_searching() {
            format!("Showing {start}-{end} of {}", self.result_count)
        } else {
            format!("Showing {start}-{end}")
        })
    }

    pub fn search_summary(&self) -> Option<String> {
        let text = self.search.as_ref()?;
        if !matches!(self.status, ListStatus::Ready) {
            return None;
        }
        let plural = if self.result_count == 1 { "" } else { "s" };
        Some(format!(
            "Found {} result{plural} for \"{text}\"",
            self.result_count
        ))
    }
}

enum Fetched {
    Listing(Vec<Employee>),
    Search(SearchEmployeesPayload),
}

struct ListState {
    query: ListQuery,
    listing_rows: Vec<Employee>,
    search_result: Option<SearchEmployeesPayload>,
    status: ListStatus,
    applied_seq: u64,
}

impl ListState {
    fn has_more(&self) -> bool {
        if matches!(self.status, ListStatus::Failed { .. }) {
            return false;
        }
        if self.query.is_searching() {
            self.search_result.as_ref().is_some_and(|result| result.has_more)
        } else {
            self.listing_rows.len() as u32 >= PAGE_SIZE
        }
    }

    fn view(&self) -> ListView {
        let failed = matches!(self.status, ListStatus::Failed { .. });
        let (rows, result_count) = match (&self.query.search, &self.search_result) {
            _ if failed => (Vec::new(), 0),
            (Some(_), Some(result)) => (result.employees.clone(), result.total),
            (Some(_), None) => (Vec::new(), 0),
            (None, _) => (
                self.listing_rows.clone(),
                self.listing_rows.len() as u32,
            ),
        };
        let page = self.query.active_page();
        ListView {
            rows,
            result_count,
            page,
            page_size: PAGE_SIZE,
            sort_by: self.query.sort_by,
            sort_order: self.query.sort_order,
            search: self.query.search.as_ref().map(|search| search.text.clone()),
            status: self.status.clone(),
            has_previous: page > 1,
            has_next: self.has_more(),
        }
    }
}

pub struct ListController {
    gateway: Arc<dyn DirectoryGateway>,
    state: Mutex<ListState>,
    issued_seq: AtomicU64,
    events: broadcast::Sender<ClientEvent>,
}

impl ListController {
    pub fn new(gateway: Arc<dyn DirectoryGateway>, events: broadcast::Sender<ClientEvent>) -> Self {
        Self {
            gateway,
            state: Mutex::new(ListState {
                query: ListQuery::default(),
                listing_rows: Vec::new(),
                search_result: None,
                status: ListStatus::Idle,
                applied_seq: 0,
            }),
            issued_seq: AtomicU64::new(0),
            events,
        }
    }

    pub async fn query(&self) -> ListQuery {
        self.state.lock().await.query.clone()
    }

    pub async fn view(&self) -> ListView {
        self.state.lock().await.view()
    }

    /// Seeds page and sort before the first fetch, e.g. from command-line flags.
    pub async fn configure(&self, page: u32, sort_by: SortKey, sort_order: SortOrder) {
        let mut state = self.state.lock().await;
        state.query.page = page.max(1);
        state.query.sort_by = sort_by;
        state.query.sort_order = sort_order;
    }

    /// Reissues the active query with unchanged parameters.
    pub async fn refresh(&self) -> ListView {
        self.fetch().await
    }

    /// Non-empty text enters search mode at offset zero; blank text clears the search.
    pub async fn submit_search(&self, text: &str) -> ListView {
        let text = text.trim();
        if text.is_empty() {
            return self.clear_search().await;
        }
        {
            let mut state = self.state.lock().await;
            state.query.search = Some(SearchQuery {
                text: text.to_string(),
                page: 1,
            });
            state.search_result = None;
        }
        self.fetch().await
    }

    /// Leaves search mode and returns to the sorted listing.
    pub async fn clear_search(&self) -> ListView {
        {
            let mut state = self.state.lock().await;
            state.query.search = None;
            state.search_result = None;
        }
        self.fetch().await
    }

    /// Moves to `page`, clamped to at least 1. Moving forward is refused unless the current
    /// page signalled that more rows exist.
    pub async fn set_page(&self, page: u32) -> ListView {
        {
            let mut state = self.state.lock().await;
            let current = state.query.active_page();
            let target = page.max(1);
            if target == current || (target > current && !state.has_more()) {
                return state.view();
            }
            match state.query.search.as_mut() {
                Some(search) => search.page = target,
                None => state.query.page = target,
            }
        }
        self.fetch().await
    }

    pub async fn next_page(&self) -> ListView {
        let current = self.state.lock().await.query.active_page();
        self.set_page(current.saturating_add(1)).await
    }

    pub async fn previous_page(&self) -> ListView {
        let current = self.state.lock().await.query.active_page();
        self.set_page(current.saturating_sub(1)).await
    }

    /// Ignored while searching. The page index is left as is.
    pub async fn set_sort_by(&self, sort_by: SortKey) -> ListView {
        {
            let mut state = self.state.lock().await;
            if state.query.is_searching() || state.query.sort_by == sort_by {
                return state.view();
            }
            state.query.sort_by = sort_by;
        }
        self.fetch().await
    }

    /// Ignored while searching. The page index is left as is.
    pub async fn set_sort_order(&self, sort_order: SortOrder) -> ListView {
        {
            let mut state = self.state.lock().await;
            if state.query.is_searching() || state.query.sort_order == sort_order {
                return state.view();
            }
            state.query.sort_order = sort_order;
        }
        self.fetch().await
    }

    /// Deletes an employee and refetches the active query. Confirmation is the caller's job.
    pub async fn delete_employee(&self, id: &EmployeeId) -> Result<ListView, GatewayError> {
        let outcome = match self.gateway.delete_employee(id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(GatewayError::Rejected {
                operation: "deleteEmployee",
                reason: format!("employee {id} was not deleted"),
            }),
            Err(err) => Err(err),
        };

        if let Err(err) = outcome {
            warn!(employee_id = %id, "delete failed: {err}");
            self.notify(Notification::blocking_error(format!(
                "Error deleting employee: {err}"
            )));
            return Err(err);
        }

        info!(employee_id = %id, "employee deleted");
        self.notify(Notification::info("Employee deleted successfully!"));
        Ok(self.refresh().await)
    }

    /// Submits a create/update form; on success the active query is refetched.
    /// On failure the caller keeps the form open with its draft intact.
    pub async fn save_form(&self, form: &EmployeeForm) -> Result<Employee, FormError> {
        let verb = if form.is_new() { "creating" } else { "updating" };
        match form.submit(self.gateway.as_ref()).await {
            Ok(saved) => {
                let done = if form.is_new() { "created" } else { "updated" };
                info!(employee_id = %saved.id, "employee {done}");
                self.notify(Notification::info(format!(
                    "Employee {done} successfully!"
                )));
                self.refresh().await;
                Ok(saved)
            }
            Err(err) => {
                warn!("form submission failed: {err}");
                self.notify(Notification::blocking_error(format!(
                    "Error {verb} employee: {err}"
                )));
                Err(err)
            }
        }
    }

    fn notify(&self, notification: Notification) {
        let _ = self.events.send(ClientEvent::Notification(notification));
    }

    async fn fetch(&self) -> ListView {
        let (seq, query) = {
            let mut state = self.state.lock().await;
            let seq = self.issued_seq.fetch_add(1, Ordering::SeqCst) + 1;
            state.status = ListStatus::Loading;
            (seq, state.query.clone())
        };

        let outcome = match query.search_variables() {
            Some(variables) => {
                debug!(seq, query = %variables.query, offset = variables.offset, "searching employees");
                self.gateway
                    .search_employees(variables)
                    .await
                    .map(Fetched::Search)
            }
            None => {
                let variables = query.listing_variables();
                debug!(
                    seq,
                    offset = variables.offset,
                    sort_by = variables.sort_by.as_str(),
                    sort_order = variables.sort_order.as_str(),
                    "listing employees"
                );
                self.gateway
                    .list_employees(variables)
                    .await
                    .map(Fetched::Listing)
            }
        };

        let view = {
            let mut state = self.state.lock().await;
            if seq != self.issued_seq.load(Ordering::SeqCst) {
                warn!(seq, "dropping stale listing response");
                return state.view();
            }
            match outcome {
                Ok(Fetched::Listing(rows)) => {
                    state.listing_rows = rows;
                    state.status = ListStatus::Ready;
                }
                Ok(Fetched::Search(result)) => {
                    state.search_result = Some(result);
                    state.status = ListStatus::Ready;
                }
                Err(err) => {
                    warn!(seq, "employee query failed: {err}");
                    state.status = ListStatus::Failed {
                        message: err.to_string(),
                        requires_reauth: err.is_unauthorized(),
                    };
                }
            }
            state.applied_seq = seq;
            state.view()
        };

        let _ = self.events.send(ClientEvent::ListUpdated(view.clone()));
        view
    }

    /// Sequence number of the last response applied to the state.
    pub async fn applied_sequence(&self) -> u64 {
        self.state.lock().await.applied_seq
    }
}

#[cfg(test)]
#[path = "tests/list_controller_tests.rs"]
mod tests;
