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

//! Storage collaborator.
//!
//! The engine never touches rows directly. Every operation opens a unit of
//! work on one employee's aggregate (ledger entries, initialized years and
//! leave requests) through [`LeaveStore::transact`]. A unit of work sees a
//! consistent snapshot, excludes every other unit on the same employee, and
//! its writes land only if the closure returns `Ok`.
//!
//! [`MemoryStore`] is the in-process implementation.

use crate::base::{CategoryId, EmployeeId, RequestId};
use crate::ledger::LedgerEntry;
use crate::request::{LeaveRequest, NewRequest, RequestFilter};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Reads and staged writes against a single employee's rows.
pub trait UnitOfWork {
    /// Returns `true` if balances were already opened for `year`.
    fn is_year_open(&self, year: i32) -> bool;

    /// Marks `year` as opened and stages its entries.
    fn open_year(&mut self, year: i32, entries: &[LedgerEntry]);

    fn balance(&self, category: CategoryId, year: i32) -> Option<LedgerEntry>;

    fn put_balance(&mut self, entry: LedgerEntry);

    fn request(&self, id: RequestId) -> Option<LeaveRequest>;

    /// This employee's requests matching `filter`, ordered by id.
    fn requests(&self, filter: &RequestFilter) -> Vec<LeaveRequest>;

    /// Assigns an id to `request` and stages it.
    fn insert_request(&mut self, request: NewRequest) -> LeaveRequest;

    fn put_request(&mut self, request: LeaveRequest);
}

/// Persistence guarantees the engine relies on.
pub trait LeaveStore: Send + Sync {
    /// Runs `work` as one atomic unit on `employee`'s rows.
    ///
    /// Concurrent units on the same employee are serialized. Staged writes
    /// are committed together when `work` returns `Ok` and discarded
    /// otherwise.
    fn transact<T, E, F>(&self, employee: EmployeeId, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E>;

    /// Employee owning request `id`.
    fn owner_of(&self, id: RequestId) -> Option<EmployeeId>;

    fn request(&self, id: RequestId) -> Option<LeaveRequest>;

    /// Requests across all employees matching `filter`, ordered by id.
    fn requests(&self, filter: &RequestFilter) -> Vec<LeaveRequest>;

    /// Every ledger entry of `employee`, ordered by year then category.
    fn ledger(&self, employee: EmployeeId) -> Vec<LedgerEntry>;
}

/// Rows owned by one employee.
#[derive(Debug, Default)]
struct AccountRows {
    balances: BTreeMap<(i32, CategoryId), LedgerEntry>,
    opened_years: BTreeSet<i32>,
    requests: BTreeMap<RequestId, LeaveRequest>,
}

impl AccountRows {
    fn apply(&mut self, staged: AccountRows) {
        self.balances.extend(staged.balances);
        self.opened_years.extend(staged.opened_years);
        self.requests.extend(staged.requests);
    }
}

/// Snapshot of an aggregate plus the writes staged against it.
struct MemoryUnit<'a> {
    employee: EmployeeId,
    committed: &'a AccountRows,
    staged: AccountRows,
    created: Vec<RequestId>,
    next_id: &'a AtomicU64,
}

impl UnitOfWork for MemoryUnit<'_> {
    fn is_year_open(&self, year: i32) -> bool {
        self.staged.opened_years.contains(&year) || self.committed.opened_years.contains(&year)
    }

    fn open_year(&mut self, year: i32, entries: &[LedgerEntry]) {
        self.staged.opened_years.insert(year);
        for entry in entries {
            self.put_balance(entry.clone());
        }
    }

    fn balance(&self, category: CategoryId, year: i32) -> Option<LedgerEntry> {
        let key = (year, category);
        self.staged
            .balances
            .get(&key)
            .or_else(|| self.committed.balances.get(&key))
            .cloned()
    }

    fn put_balance(&mut self, entry: LedgerEntry) {
        debug_assert_eq!(entry.employee, self.employee);
        self.staged
            .balances
            .insert((entry.year, entry.category), entry);
    }

    fn request(&self, id: RequestId) -> Option<LeaveRequest> {
        self.staged
            .requests
            .get(&id)
            .or_else(|| self.committed.requests.get(&id))
            .cloned()
    }

    fn requests(&self, filter: &RequestFilter) -> Vec<LeaveRequest> {
        let mut merged: BTreeMap<RequestId, &LeaveRequest> =
            self.committed.requests.iter().map(|(id, r)| (*id, r)).collect();
        merged.extend(self.staged.requests.iter().map(|(id, r)| (*id, r)));
        merged
            .into_values()
            .filter(|request| filter.matches(request))
            .cloned()
            .collect()
    }

    fn insert_request(&mut self, request: NewRequest) -> LeaveRequest {
        debug_assert_eq!(request.employee, self.employee);
        let id = RequestId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let request = request.into_request(id);
        self.staged.requests.insert(id, request.clone());
        self.created.push(id);
        request
    }

    fn put_request(&mut self, request: LeaveRequest) {
        debug_assert_eq!(request.employee, self.employee);
        self.staged.requests.insert(request.id, request);
    }
}

/// In-memory [`LeaveStore`].
///
/// Each employee's rows sit behind their own [`Mutex`], so units of work on
/// different employees run in parallel while units on the same employee
/// queue up. Request ids are routed to their owner through a separate index.
///
/// The aggregate's `Arc` is cloned out of the map before its mutex is
/// taken, so no map shard lock is ever held while waiting on an employee.
#[derive(Debug)]
pub struct MemoryStore {
    accounts: DashMap<EmployeeId, Arc<Mutex<AccountRows>>>,
    /// Request id to owning employee.
    owners: DashMap<RequestId, EmployeeId>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
            owners: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    fn account(&self, employee: EmployeeId) -> Option<Arc<Mutex<AccountRows>>> {
        self.accounts
            .get(&employee)
            .map(|account| Arc::clone(account.value()))
    }

    fn account_or_default(&self, employee: EmployeeId) -> Arc<Mutex<AccountRows>> {
        Arc::clone(self.accounts.entry(employee).or_default().value())
    }
}

impl LeaveStore for MemoryStore {
    fn transact<T, E, F>(&self, employee: EmployeeId, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T, E>,
    {
        let account = self.account_or_default(employee);
        let mut rows = account.lock();

        let mut unit = MemoryUnit {
            employee,
            committed: &*rows,
            staged: AccountRows::default(),
            created: Vec::new(),
            next_id: &self.next_id,
        };
        let output = work(&mut unit)?;
        let MemoryUnit {
            staged, created, ..
        } = unit;

        rows.apply(staged);
        for id in created {
            self.owners.insert(id, employee);
        }
        Ok(output)
    }

    fn owner_of(&self, id: RequestId) -> Option<EmployeeId> {
        self.owners.get(&id).map(|owner| *owner)
    }

    fn request(&self, id: RequestId) -> Option<LeaveRequest> {
        let account = self.account(self.owner_of(id)?)?;
        let rows = account.lock();
        rows.requests.get(&id).cloned()
    }

    fn requests(&self, filter: &RequestFilter) -> Vec<LeaveRequest> {
        let accounts: Vec<_> = match filter.employee {
            Some(employee) => self.account(employee).into_iter().collect(),
            None => self
                .accounts
                .iter()
                .map(|account| Arc::clone(account.value()))
                .collect(),
        };

        let mut matching: Vec<LeaveRequest> = accounts
            .iter()
            .flat_map(|account| {
                let rows = account.lock();
                rows.requests
                    .values()
                    .filter(|request| filter.matches(request))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .collect();
        matching.sort_by_key(|request| request.id);
        matching
    }

    fn ledger(&self, employee: EmployeeId) -> Vec<LedgerEntry> {
        self.account(employee)
            .map(|account| account.lock().balances.values().cloned().collect())
            .unwrap_or_default()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
