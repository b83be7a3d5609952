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

//! Leave balance ledger.
//!
//! One [`LedgerEntry`] exists per (employee, category, year). Entries are
//! opened once, pro-rated by join month, and afterwards only ever consume
//! days when a request is approved.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use leave_ledger::{CategoryId, Employee, EmployeeId, LeaveCategory, LedgerEntry};
//! use rust_decimal_macros::dec;
//!
//! let join = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
//! let employee = Employee::new(EmployeeId(1), join);
//! let casual = LeaveCategory::new(CategoryId(1), "Casual", dec!(12));
//!
//! let entry = LedgerEntry::opening(&employee, &casual);
//! assert_eq!(entry.granted_days, dec!(10.00));
//! assert_eq!(entry.remaining(), dec!(10.00));
//! ```

use crate::base::{CategoryId, EmployeeId};
use crate::category::LeaveCategory;
use crate::employee::Employee;
use crate::error::DecisionError;
use chrono::Datelike;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Identifies a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BalanceKey {
    pub employee: EmployeeId,
    pub category: CategoryId,
    pub year: i32,
}

/// Granted vs. consumed leave days for one (employee, category, year).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub employee: EmployeeId,
    pub category: CategoryId,
    pub year: i32,
    pub granted_days: Decimal,
    /// Never decreases.
    pub used_days: Decimal,
}

impl LedgerEntry {
    pub const DECIMAL_PRECISION: u32 = 2;

    /// Opens the join-year entry for `employee` in `category`.
    pub fn opening(employee: &Employee, category: &LeaveCategory) -> Self {
        Self {
            employee: employee.id,
            category: category.id,
            year: employee.join_date.year(),
            granted_days: prorated_quota(category.annual_quota, employee.join_date.month()),
            used_days: Decimal::ZERO,
        }
    }

    pub fn key(&self) -> BalanceKey {
        BalanceKey {
            employee: self.employee,
            category: self.category,
            year: self.year,
        }
    }

    /// Returns `granted_days - used_days`.
    pub fn remaining(&self) -> Decimal {
        self.granted_days - self.used_days
    }

    /// Returns `true` if `days` fit in what is left. Exact equality fits.
    pub fn covers(&self, days: Decimal) -> bool {
        self.remaining() >= days
    }

    /// Records `days` as used.
    ///
    /// # Errors
    ///
    /// [`DecisionError::InsufficientBalance`] if the entry would go past its
    /// grant. The entry is left untouched.
    pub fn consume(&mut self, days: Decimal) -> Result<(), DecisionError> {
        debug_assert!(days > Decimal::ZERO, "consumed days must be positive: {days}");
        if !self.covers(days) {
            return Err(DecisionError::InsufficientBalance);
        }
        self.used_days += days;
        self.assert_invariants();
        Ok(())
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.used_days <= self.granted_days,
            "Invariant violated: used {} exceeds granted {}",
            self.used_days,
            self.granted_days
        );
        debug_assert!(
            self.used_days >= Decimal::ZERO,
            "Invariant violated: used days went negative: {}",
            self.used_days
        );
    }
}

/// Scales `annual_quota` by the months left in the year, counting the join
/// month in full, rounded half away from zero to two places.
pub fn prorated_quota(annual_quota: Decimal, join_month: u32) -> Decimal {
    debug_assert!((1..=12).contains(&join_month), "invalid month {join_month}");
    let months_remaining = Decimal::from(12 - join_month + 1);
    (annual_quota * months_remaining / Decimal::from(12u32)).round_dp_with_strategy(
        LedgerEntry::DECIMAL_PRECISION,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

/// Rounds for presentation, always showing two decimal places.
fn presented(days: Decimal) -> Decimal {
    let mut days = days.round_dp(LedgerEntry::DECIMAL_PRECISION);
    days.rescale(LedgerEntry::DECIMAL_PRECISION);
    days
}

impl Serialize for LedgerEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("LedgerEntry", 6)?;
        state.serialize_field("employee", &self.employee)?;
        state.serialize_field("category", &self.category)?;
        state.serialize_field("year", &self.year)?;
        state.serialize_field("granted", &presented(self.granted_days))?;
        state.serialize_field("used", &presented(self.used_days))?;
        state.serialize_field("remaining", &presented(self.remaining()))?;
        state.end()
    }
}
