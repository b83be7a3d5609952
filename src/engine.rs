// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Leave accounting engine.
//!
//! The [`Engine`] is the central component that opens employee balances,
//! accepts leave applications and records approval decisions.
//!
//! # Operations
//!
//! - **Initialize**: open pro-rated join-year balances for a new employee.
//! - **Submit**: validate an application and file it as a pending request.
//! - **Decide**: approve or reject a pending request, consuming balance on
//!   approval.
//!
//! # Thread Safety
//!
//! Each operation runs as a single unit of work on the affected employee's
//! rows (see [`LeaveStore::transact`]). Submissions and decisions for the
//! same employee are serialized, so two overlapping submissions cannot both
//! pass the overlap check and a request can be approved at most once.
//! Different employees proceed in parallel.

use crate::base::{EmployeeId, RequestId};
use crate::category::LeaveCategory;
use crate::directory::Directory;
use crate::employee::Employee;
use crate::error::{DecisionError, IdempotencyError, ValidationError};
use crate::ledger::LedgerEntry;
use crate::request::{
    DateRange, Decision, DecisionRecord, LeaveApplication, LeaveRequest, NewRequest, Page,
    RequestFilter, RequestStatus,
};
use crate::store::{LeaveStore, MemoryStore};
use chrono::Datelike;
use tracing::{debug, error, info, warn};

/// Leave accounting engine over a [`LeaveStore`].
///
/// # Invariants
///
/// - Exactly one ledger entry exists per (employee, category, year).
/// - `used_days <= granted_days` for every ledger entry.
/// - Requests move `Pending` -> `Approved` | `Rejected` exactly once.
/// - Pending and approved requests of one employee never overlap.
pub struct Engine<S = MemoryStore> {
    store: S,
    directory: Directory,
}

impl Engine {
    /// Creates an engine over an empty [`MemoryStore`] and directory.
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: LeaveStore> Engine<S> {
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            directory: Directory::new(),
        }
    }

    pub fn with_directory(mut self, directory: Directory) -> Self {
        self.directory = directory;
        self
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Registers `employee` in the directory and opens their balances for
    /// every category on file.
    ///
    /// The employee record already on file wins over `employee`, so
    /// onboarding twice reports the conflict for the original join year.
    ///
    /// # Errors
    ///
    /// [`IdempotencyError::AlreadyInitialized`] if the employee was already
    /// onboarded.
    pub fn onboard(&self, employee: Employee) -> Result<Vec<LedgerEntry>, IdempotencyError> {
        let employee = self.directory.register(employee);
        self.initialize_balances(&employee, &self.directory.categories())
    }

    /// Opens one ledger entry per category for the employee's join year.
    ///
    /// `granted_days` is the annual quota pro-rated over the months left in
    /// the join year, the join month included. Entries are written together
    /// or not at all.
    ///
    /// # Errors
    ///
    /// [`IdempotencyError::AlreadyInitialized`] if the join year was already
    /// opened for this employee. Nothing is written.
    pub fn initialize_balances(
        &self,
        employee: &Employee,
        categories: &[LeaveCategory],
    ) -> Result<Vec<LedgerEntry>, IdempotencyError> {
        let year = employee.join_date.year();

        let result = self.store.transact(employee.id, |unit| {
            if unit.is_year_open(year) {
                return Err(IdempotencyError::AlreadyInitialized {
                    employee: employee.id,
                    year,
                });
            }
            let entries: Vec<LedgerEntry> = categories
                .iter()
                .map(|category| LedgerEntry::opening(employee, category))
                .collect();
            unit.open_year(year, &entries);
            Ok(entries)
        });

        match &result {
            Ok(entries) => info!(
                employee = %employee.id,
                year,
                categories = entries.len(),
                "opened leave balances"
            ),
            Err(e) => warn!(employee = %employee.id, year, "{e}"),
        }
        result
    }

    /// Validates `application` and files it as a pending request.
    ///
    /// # Validation
    ///
    /// Checks run in this order and the first failure is returned:
    ///
    /// | Check | Error |
    /// |-------|-------|
    /// | start date not after end date | [`ValidationError::InvalidRange`] |
    /// | start date not before join date | [`ValidationError::PredatesEmployment`] |
    /// | half-day leave is a single day | [`ValidationError::InvalidHalfDay`] |
    /// | no pending/approved request overlaps | [`ValidationError::OverlappingRequest`] |
    /// | start year's balance covers the days | [`ValidationError::InsufficientBalance`] |
    ///
    /// Leave is charged for every calendar day in the range, or half a day
    /// for half-day leave. A range crossing into the next year is charged
    /// entirely to the start year's balance.
    ///
    /// The overlap check and the insert happen in one unit of work.
    pub fn submit_request(
        &self,
        employee: &Employee,
        application: LeaveApplication,
    ) -> Result<LeaveRequest, ValidationError> {
        let result = self.validate_and_file(employee, application);
        match &result {
            Ok(request) => info!(
                employee = %employee.id,
                request = %request.id,
                days = %request.total_days,
                "filed leave request"
            ),
            Err(e) => debug!(employee = %employee.id, "leave request refused: {e}"),
        }
        result
    }

    fn validate_and_file(
        &self,
        employee: &Employee,
        application: LeaveApplication,
    ) -> Result<LeaveRequest, ValidationError> {
        let LeaveApplication {
            category,
            start_date,
            end_date,
            half_day,
            reason,
        } = application;

        let period = DateRange::new(start_date, end_date)?;
        if period.start() < employee.join_date {
            return Err(ValidationError::PredatesEmployment);
        }
        if half_day && !period.is_single_day() {
            return Err(ValidationError::InvalidHalfDay);
        }

        self.store.transact(employee.id, |unit| {
            if !unit
                .requests(&RequestFilter::active().overlapping(period))
                .is_empty()
            {
                return Err(ValidationError::OverlappingRequest);
            }

            let total_days = period.leave_days(half_day);
            let covered = unit
                .balance(category, period.start().year())
                .is_some_and(|entry| entry.covers(total_days));
            if !covered {
                return Err(ValidationError::InsufficientBalance);
            }

            Ok(unit.insert_request(NewRequest {
                employee: employee.id,
                category,
                period,
                half_day,
                total_days,
                reason,
            }))
        })
    }

    /// Approves or rejects a pending request on behalf of `actor`.
    ///
    /// Approval adds the request's days to the start year's ledger entry.
    /// The status change and the ledger update commit together.
    ///
    /// # Errors
    ///
    /// - [`DecisionError::NotAuthorized`] - `actor` is not an administrator.
    /// - [`DecisionError::NotFound`] - No request with this id.
    /// - [`DecisionError::AlreadyDecided`] - Request is no longer pending.
    /// - [`DecisionError::LedgerMissing`] - Ledger entry vanished since submission.
    /// - [`DecisionError::InsufficientBalance`] - Other approvals used up the balance.
    pub fn decide_request(
        &self,
        id: RequestId,
        decision: Decision,
        note: Option<String>,
        actor: &Employee,
    ) -> Result<LeaveRequest, DecisionError> {
        let result = self.apply_decision(id, decision, note, actor);
        match &result {
            Ok(request) => info!(
                request = %id,
                employee = %request.employee,
                approver = %actor.id,
                status = %request.status,
                "decided leave request"
            ),
            Err(DecisionError::LedgerMissing) => error!(
                request = %id,
                approver = %actor.id,
                "approved request has no ledger entry for its start year"
            ),
            Err(e) => debug!(request = %id, approver = %actor.id, "decision refused: {e}"),
        }
        result
    }

    fn apply_decision(
        &self,
        id: RequestId,
        decision: Decision,
        note: Option<String>,
        actor: &Employee,
    ) -> Result<LeaveRequest, DecisionError> {
        if !actor.is_admin() {
            return Err(DecisionError::NotAuthorized);
        }
        let owner = self.store.owner_of(id).ok_or(DecisionError::NotFound)?;

        self.store.transact(owner, |unit| {
            let mut request = unit.request(id).ok_or(DecisionError::NotFound)?;
            if request.status.is_terminal() {
                return Err(DecisionError::AlreadyDecided);
            }

            if decision == Decision::Approved {
                let key = request.balance_key();
                let mut entry = unit
                    .balance(key.category, key.year)
                    .ok_or(DecisionError::LedgerMissing)?;
                entry.consume(request.total_days)?;
                unit.put_balance(entry);
            }

            request.status = RequestStatus::from(decision);
            request.decision = Some(DecisionRecord {
                approver: actor.id,
                note,
            });
            unit.put_request(request.clone());
            Ok(request)
        })
    }

    /// Ledger entries of `employee` for `year`, ordered by category.
    pub fn balances(&self, employee: EmployeeId, year: i32) -> Vec<LedgerEntry> {
        self.store
            .ledger(employee)
            .into_iter()
            .filter(|entry| entry.year == year)
            .collect()
    }

    /// Every ledger entry of `employee`, ordered by year then category.
    pub fn ledger(&self, employee: EmployeeId) -> Vec<LedgerEntry> {
        self.store.ledger(employee)
    }

    pub fn request(&self, id: RequestId) -> Option<LeaveRequest> {
        self.store.request(id)
    }

    /// One page of the requests matching `filter`, ordered by id.
    pub fn requests(&self, filter: &RequestFilter, page: Page) -> Vec<LeaveRequest> {
        page.slice(self.store.requests(filter))
    }
}
