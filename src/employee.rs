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

//! Employees and their roles.

use crate::base::EmployeeId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Employee,
    Admin,
}

/// An employee as seen by the leave engine.
///
/// The join date is fixed at onboarding and drives both the pro-rated
/// opening balance and the earliest date leave may be taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub join_date: NaiveDate,
    #[serde(default)]
    pub role: Role,
}

impl Employee {
    pub fn new(id: EmployeeId, join_date: NaiveDate) -> Self {
        Self {
            id,
            join_date,
            role: Role::Employee,
        }
    }

    pub fn admin(id: EmployeeId, join_date: NaiveDate) -> Self {
        Self {
            id,
            join_date,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
