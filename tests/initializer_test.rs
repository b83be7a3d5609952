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

//! Balance initialization integration tests.

use chrono::NaiveDate;
use leave_ledger::{
    CategoryId, Directory, Employee, EmployeeId, Engine, IdempotencyError, LeaveCategory,
    default_catalog,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn catalog() -> Vec<LeaveCategory> {
    vec![
        LeaveCategory::new(CategoryId(1), "Casual", dec!(12)),
        LeaveCategory::new(CategoryId(2), "Earned", dec!(15)).with_carry_forward(),
        LeaveCategory::new(CategoryId(3), "Sick", dec!(10)).unpaid(),
    ]
}

#[test]
fn opens_one_entry_per_category() {
    let engine = Engine::new();
    let employee = Employee::new(EmployeeId(1), date(2024, 3, 1));

    let entries = engine.initialize_balances(&employee, &catalog()).unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(engine.ledger(EmployeeId(1)), entries);
    for entry in &entries {
        assert_eq!(entry.employee, EmployeeId(1));
        assert_eq!(entry.year, 2024);
        assert_eq!(entry.used_days, Decimal::ZERO);
    }
    let granted: Vec<_> = entries.iter().map(|entry| entry.granted_days).collect();
    assert_eq!(granted, vec![dec!(10.00), dec!(12.50), dec!(8.33)]);
}

#[test]
fn january_joiner_gets_full_quota() {
    let engine = Engine::new();
    let employee = Employee::new(EmployeeId(1), date(2024, 1, 31));
    let entries = engine.initialize_balances(&employee, &catalog()).unwrap();
    assert_eq!(entries[0].granted_days, dec!(12));
    assert_eq!(entries[1].granted_days, dec!(15));
}

#[test]
fn december_joiner_gets_one_month() {
    let engine = Engine::new();
    let employee = Employee::new(EmployeeId(1), date(2024, 12, 31));
    let entries = engine.initialize_balances(&employee, &catalog()).unwrap();
    assert_eq!(entries[0].granted_days, dec!(1.00));
    assert_eq!(entries[1].granted_days, dec!(1.25));
    assert_eq!(entries[2].granted_days, dec!(0.83));
}

#[test]
fn second_initialization_is_rejected() {
    let engine = Engine::new();
    let employee = Employee::new(EmployeeId(1), date(2024, 3, 1));
    engine.initialize_balances(&employee, &catalog()).unwrap();

    let result = engine.initialize_balances(&employee, &catalog());
    assert_eq!(
        result,
        Err(IdempotencyError::AlreadyInitialized {
            employee: EmployeeId(1),
            year: 2024,
        })
    );
    assert_eq!(engine.ledger(EmployeeId(1)).len(), 3);
}

#[test]
fn retry_with_different_categories_adds_nothing() {
    let engine = Engine::new();
    let employee = Employee::new(EmployeeId(1), date(2024, 3, 1));
    engine
        .initialize_balances(&employee, &catalog()[..1])
        .unwrap();

    assert!(engine.initialize_balances(&employee, &catalog()).is_err());
    assert_eq!(engine.ledger(EmployeeId(1)).len(), 1);
}

#[test]
fn empty_catalog_still_counts_as_initialized() {
    let engine = Engine::new();
    let employee = Employee::new(EmployeeId(1), date(2024, 3, 1));

    assert_eq!(engine.initialize_balances(&employee, &[]), Ok(vec![]));
    assert!(engine.initialize_balances(&employee, &catalog()).is_err());
    assert!(engine.ledger(EmployeeId(1)).is_empty());
}

#[test]
fn employees_are_initialized_independently() {
    let engine = Engine::new();
    let first = Employee::new(EmployeeId(1), date(2024, 3, 1));
    let second = Employee::new(EmployeeId(2), date(2024, 9, 1));

    engine.initialize_balances(&first, &catalog()).unwrap();
    let entries = engine.initialize_balances(&second, &catalog()).unwrap();

    assert_eq!(entries[0].granted_days, dec!(4.00));
    assert_eq!(engine.ledger(EmployeeId(1)).len(), 3);
    assert_eq!(engine.ledger(EmployeeId(2)).len(), 3);
}

#[test]
fn onboard_uses_directory_catalog() {
    let engine = Engine::new().with_directory(Directory::with_categories(default_catalog()));
    let entries = engine
        .onboard(Employee::new(EmployeeId(1), date(2024, 3, 1)))
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert!(engine.directory().employee(EmployeeId(1)).is_some());
}

#[test]
fn onboarding_twice_keeps_original_join_date() {
    let engine = Engine::new().with_directory(Directory::with_categories(default_catalog()));
    engine
        .onboard(Employee::new(EmployeeId(1), date(2024, 3, 1)))
        .unwrap();

    let result = engine.onboard(Employee::new(EmployeeId(1), date(2025, 6, 1)));
    assert_eq!(
        result,
        Err(IdempotencyError::AlreadyInitialized {
            employee: EmployeeId(1),
            year: 2024,
        })
    );
    assert_eq!(
        engine.directory().employee(EmployeeId(1)).unwrap().join_date,
        date(2024, 3, 1)
    );
    assert!(engine.balances(EmployeeId(1), 2025).is_empty());
}
