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

//! Leave categories (reference data).

use crate::base::CategoryId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A kind of leave with its yearly entitlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveCategory {
    pub id: CategoryId,
    pub name: String,
    pub paid: bool,
    /// Days granted for a full year of employment.
    pub annual_quota: Decimal,
    pub carry_forward: bool,
}

impl LeaveCategory {
    pub fn new(id: CategoryId, name: impl Into<String>, annual_quota: Decimal) -> Self {
        Self {
            id,
            name: name.into(),
            paid: true,
            annual_quota,
            carry_forward: false,
        }
    }

    pub fn unpaid(mut self) -> Self {
        self.paid = false;
        self
    }

    pub fn with_carry_forward(mut self) -> Self {
        self.carry_forward = true;
        self
    }
}

/// Catalogue installed when no categories are configured.
pub fn default_catalog() -> Vec<LeaveCategory> {
    vec![
        LeaveCategory::new(CategoryId(1), "Casual Leave (CL)", dec!(12)),
        LeaveCategory::new(CategoryId(2), "Earned Leave (EL)", dec!(15)).with_carry_forward(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_category_is_paid_without_carry_forward() {
        let category = LeaveCategory::new(CategoryId(3), "Sick", dec!(10));
        assert!(category.paid);
        assert!(!category.carry_forward);
        assert_eq!(category.annual_quota, dec!(10));
    }

    #[test]
    fn builders_flip_flags() {
        let category = LeaveCategory::new(CategoryId(4), "Unpaid", dec!(30))
            .unpaid()
            .with_carry_forward();
        assert!(!category.paid);
        assert!(category.carry_forward);
    }

    #[test]
    fn default_catalog_has_casual_and_earned_leave() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].annual_quota, dec!(12));
        assert!(!catalog[0].carry_forward);
        assert_eq!(catalog[1].annual_quota, dec!(15));
        assert!(catalog[1].carry_forward);
    }
}
