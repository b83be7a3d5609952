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

//! Employee and leave category directory.
//!
//! Reference data the engine reads but never owns. Records are write-once:
//! a second registration under the same id keeps the first record, so an
//! employee's join date cannot change after onboarding.

use crate::base::{CategoryId, EmployeeId};
use crate::category::LeaveCategory;
use crate::employee::Employee;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

#[derive(Debug, Default)]
pub struct Directory {
    employees: DashMap<EmployeeId, Employee>,
    categories: DashMap<CategoryId, LeaveCategory>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(categories: impl IntoIterator<Item = LeaveCategory>) -> Self {
        let directory = Self::new();
        for category in categories {
            directory.add_category(category);
        }
        directory
    }

    /// Adds `category` unless its id is taken. Returns `true` if added.
    pub fn add_category(&self, category: LeaveCategory) -> bool {
        match self.categories.entry(category.id) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(category);
                true
            }
        }
    }

    pub fn category(&self, id: CategoryId) -> Option<LeaveCategory> {
        self.categories.get(&id).map(|category| category.value().clone())
    }

    /// All categories, ordered by id.
    pub fn categories(&self) -> Vec<LeaveCategory> {
        let mut categories: Vec<_> = self
            .categories
            .iter()
            .map(|category| category.value().clone())
            .collect();
        categories.sort_by_key(|category| category.id);
        categories
    }

    /// Registers `employee` and returns the record on file, which is the
    /// earlier one if the id was already registered.
    pub fn register(&self, employee: Employee) -> Employee {
        self.employees
            .entry(employee.id)
            .or_insert(employee)
            .value()
            .clone()
    }

    pub fn employee(&self, id: EmployeeId) -> Option<Employee> {
        self.employees.get(&id).map(|employee| employee.value().clone())
    }

    /// All employees, ordered by id.
    pub fn employees(&self) -> Vec<Employee> {
        let mut employees: Vec<_> = self
            .employees
            .iter()
            .map(|employee| employee.value().clone())
            .collect();
        employees.sort_by_key(|employee| employee.id);
        employees
    }
}
