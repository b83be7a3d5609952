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

//! Engine behavior over a custom [`LeaveStore`].
//!
//! Wraps [`MemoryStore`] so tests can hide ledger rows from the engine and
//! reach states the public API never produces.

use chrono::NaiveDate;
use leave_ledger::{
    CategoryId, Decision, DecisionError, Employee, EmployeeId, Engine, LeaveApplication,
    LeaveCategory, LeaveRequest, LeaveStore, LedgerEntry, MemoryStore, NewRequest, RequestFilter,
    RequestId, RequestStatus, UnitOfWork,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicBool, Ordering};

/// Store whose units of work can be told to lose every ledger entry.
#[derive(Default)]
struct LedgerlessStore {
    inner: MemoryStore,
    hide_ledger: AtomicBool,
}

struct HidingUnit<'a> {
    inner: &'a mut dyn UnitOfWork,
    hide_ledger: bool,
}

impl UnitOfWork for HidingUnit<'_> {
    fn is_year_open(&self, year: i32) -> bool {
        self.inner.is_year_open(year)
    }

    fn open_year(&mut self, year: i32, entries: &[LedgerEntry]) {
        self.inner.open_year(year, entries)
    }

    fn balance(&self, category: CategoryId, year: i32) -> Option<LedgerEntry> {
        if self.hide_ledger {
            return None;
        }
        self.inner.balance(category, year)
    }

    fn put_balance(&mut self, entry: LedgerEntry) {
        self.inner.put_balance(entry)
    }

    fn request(&self, id: RequestId) -> Option<LeaveRequest> {
        self.inner.request(id)
    }

    fn requests(&self, filter: &RequestFilter) -> Vec<LeaveRequest> {
        self.inner.requests(filter)
    }

    fn insert_request(&mut self, request: NewRequest) -> LeaveRequest {
        self.inner.insert_request(request)
    }

    fn put_request(&mut self, request: LeaveRequest) {
        self.inner.put_request(request)
    }
}

impl LeaveStore for LedgerlessStore {
    fn transact<T, E, F>(&self, employee: EmployeeId, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E>,
    {
        let hide_ledger = self.hide_ledger.load(Ordering::SeqCst);
        self.inner.transact(employee, |unit| {
            work(&mut HidingUnit {
                inner: unit,
                hide_ledger,
            })
        })
    }

    fn owner_of(&self, id: RequestId) -> Option<EmployeeId> {
        self.inner.owner_of(id)
    }

    fn request(&self, id: RequestId) -> Option<LeaveRequest> {
        self.inner.request(id)
    }

    fn requests(&self, filter: &RequestFilter) -> Vec<LeaveRequest> {
        self.inner.requests(filter)
    }

    fn ledger(&self, employee: EmployeeId) -> Vec<LedgerEntry> {
        self.inner.ledger(employee)
    }
}

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

fn setup() -> (Engine<LedgerlessStore>, Employee, LeaveRequest) {
    let engine = Engine::with_store(LedgerlessStore::default());
    let employee = Employee::new(EmployeeId(1), date(3, 1));
    engine
        .initialize_balances(
            &employee,
            &[LeaveCategory::new(CategoryId(1), "Casual", dec!(12))],
        )
        .unwrap();
    let request = engine
        .submit_request(
            &employee,
            LeaveApplication::new(CategoryId(1), date(3, 5), date(3, 7)),
        )
        .unwrap();
    (engine, employee, request)
}

fn admin() -> Employee {
    Employee::admin(EmployeeId(99), date(1, 1))
}

#[test]
fn approval_without_ledger_entry_fails() {
    let (engine, _, request) = setup();
    engine.store().hide_ledger.store(true, Ordering::SeqCst);

    let result = engine.decide_request(request.id, Decision::Approved, None, &admin());

    assert_eq!(result, Err(DecisionError::LedgerMissing));
    assert_eq!(
        engine.request(request.id).unwrap().status,
        RequestStatus::Pending
    );
    assert_eq!(engine.balances(EmployeeId(1), 2024)[0].used_days, Decimal::ZERO);
}

#[test]
fn rejection_without_ledger_entry_succeeds() {
    let (engine, _, request) = setup();
    engine.store().hide_ledger.store(true, Ordering::SeqCst);

    let decided = engine
        .decide_request(request.id, Decision::Rejected, None, &admin())
        .unwrap();
    assert_eq!(decided.status, RequestStatus::Rejected);
}

#[test]
fn approval_after_ledger_returns_succeeds() {
    let (engine, _, request) = setup();
    engine.store().hide_ledger.store(true, Ordering::SeqCst);
    assert_eq!(
        engine.decide_request(request.id, Decision::Approved, None, &admin()),
        Err(DecisionError::LedgerMissing)
    );

    engine.store().hide_ledger.store(false, Ordering::SeqCst);
    engine
        .decide_request(request.id, Decision::Approved, None, &admin())
        .unwrap();
    assert_eq!(engine.balances(EmployeeId(1), 2024)[0].used_days, dec!(3));
}

#[test]
fn hidden_ledger_refuses_submission() {
    let (engine, employee, _) = setup();
    engine.store().hide_ledger.store(true, Ordering::SeqCst);

    let result = engine.submit_request(
        &employee,
        LeaveApplication::new(CategoryId(1), date(4, 1), date(4, 1)),
    );
    assert_eq!(
        result,
        Err(leave_ledger::ValidationError::InsufficientBalance)
    );
}
