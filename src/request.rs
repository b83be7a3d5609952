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

//! Leave requests and their lifecycle.
//!
//! Requests follow a state machine with two terminal states:
//!
//! ```text
//!  Pending ──approve──► Approved
//!     │
//!     └─────reject────► Rejected
//! ```
//!
//! A request leaves [`RequestStatus::Pending`] exactly once and is never
//! re-opened or deleted.

use crate::base::{CategoryId, EmployeeId, RequestId};
use crate::error::ValidationError;
use crate::ledger::BalanceKey;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive `[start, end]` calendar range. Always `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// [`ValidationError::InvalidRange`] if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Inclusive intersection test: ranges sharing a single day overlap.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// Calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    /// Leave charged for this range.
    ///
    /// Every calendar day counts; weekends and holidays are not excluded.
    pub fn leave_days(&self, half_day: bool) -> Decimal {
        if half_day {
            dec!(0.5)
        } else {
            Decimal::from(self.days())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Pending and approved requests hold their dates against new requests.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        };
        f.write_str(name)
    }
}

/// Outcome an administrator can give a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
}

impl From<Decision> for RequestStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => RequestStatus::Approved,
            Decision::Rejected => RequestStatus::Rejected,
        }
    }
}

/// Who decided a request, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub approver: EmployeeId,
    pub note: Option<String>,
}

/// What an employee asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveApplication {
    pub category: CategoryId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub half_day: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

impl LeaveApplication {
    pub fn new(category: CategoryId, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            category,
            start_date,
            end_date,
            half_day: false,
            reason: None,
        }
    }

    pub fn for_half_day(category: CategoryId, day: NaiveDate) -> Self {
        Self {
            half_day: true,
            ..Self::new(category, day, day)
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// A validated request waiting for the store to assign its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
    pub employee: EmployeeId,
    pub category: CategoryId,
    pub period: DateRange,
    pub half_day: bool,
    pub total_days: Decimal,
    pub reason: Option<String>,
}

impl NewRequest {
    pub fn into_request(self, id: RequestId) -> LeaveRequest {
        LeaveRequest {
            id,
            employee: self.employee,
            category: self.category,
            period: self.period,
            half_day: self.half_day,
            total_days: self.total_days,
            reason: self.reason,
            status: RequestStatus::Pending,
            decision: None,
        }
    }
}

/// A persisted leave request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaveRequest {
    pub id: RequestId,
    pub employee: EmployeeId,
    pub category: CategoryId,
    pub period: DateRange,
    pub half_day: bool,
    pub total_days: Decimal,
    pub reason: Option<String>,
    pub status: RequestStatus,
    /// Present once the status leaves `Pending`.
    pub decision: Option<DecisionRecord>,
}

impl LeaveRequest {
    pub fn start_date(&self) -> NaiveDate {
        self.period.start()
    }

    pub fn end_date(&self) -> NaiveDate {
        self.period.end()
    }

    /// Ledger entry this request draws on.
    ///
    /// Always the start date's year, even when the request runs into the
    /// next year.
    pub fn balance_key(&self) -> BalanceKey {
        BalanceKey {
            employee: self.employee,
            category: self.category,
            year: self.start_date().year(),
        }
    }
}

/// Predicate over leave requests. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub employee: Option<EmployeeId>,
    /// Empty matches any status.
    pub statuses: Vec<RequestStatus>,
    pub overlapping: Option<DateRange>,
}

impl RequestFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that block new requests on their dates.
    pub fn active() -> Self {
        Self::new()
            .status(RequestStatus::Pending)
            .status(RequestStatus::Approved)
    }

    pub fn employee(mut self, employee: EmployeeId) -> Self {
        self.employee = Some(employee);
        self
    }

    pub fn status(mut self, status: RequestStatus) -> Self {
        if !self.statuses.contains(&status) {
            self.statuses.push(status);
        }
        self
    }

    pub fn overlapping(mut self, range: DateRange) -> Self {
        self.overlapping = Some(range);
        self
    }

    pub fn matches(&self, request: &LeaveRequest) -> bool {
        self.employee.is_none_or(|employee| request.employee == employee)
            && (self.statuses.is_empty() || self.statuses.contains(&request.status))
            && self
                .overlapping
                .is_none_or(|range| request.period.overlaps(&range))
    }
}

/// 1-based page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: u32,
    size: u32,
}

impl Page {
    pub const DEFAULT_SIZE: u32 = 20;
    pub const MAX_SIZE: u32 = 100;

    /// Clamps `number` to at least 1 and `size` to `1..=MAX_SIZE`.
    pub fn new(number: u32, size: u32) -> Self {
        Self {
            number: number.max(1),
            size: size.clamp(1, Self::MAX_SIZE),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn next(&self) -> Self {
        Self::new(self.number.saturating_add(1), self.size)
    }

    pub fn offset(&self) -> usize {
        (self.number as usize - 1) * self.size as usize
    }

    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.size as usize)
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_SIZE)
    }
}
