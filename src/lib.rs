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

//! # Leave Ledger
//!
//! This library tracks employee leave entitlements and moves leave requests
//! through their approval lifecycle while keeping the balance ledger
//! consistent.
//!
//! ## Core Components
//!
//! - [`Engine`]: Opens balances, files requests and records decisions
//! - [`LedgerEntry`]: Granted vs. used days per (employee, category, year)
//! - [`LeaveRequest`]: A request and its `Pending` -> `Approved` | `Rejected` status
//! - [`LeaveStore`]: Storage seam providing atomic per-employee units of work
//! - [`ValidationError`], [`DecisionError`], [`IdempotencyError`]: Failure kinds
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use leave_ledger::{
//!     CategoryId, Decision, Employee, EmployeeId, Engine, LeaveApplication, LeaveCategory,
//!     ValidationError,
//! };
//! use rust_decimal_macros::dec;
//!
//! let date = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
//! let engine = Engine::new();
//! engine
//!     .directory()
//!     .add_category(LeaveCategory::new(CategoryId(1), "Casual", dec!(12)));
//!
//! // Joining in March grants 10 of the 12 yearly days
//! let employee = Employee::new(EmployeeId(1), date(3, 1));
//! let opened = engine.onboard(employee.clone()).unwrap();
//! assert_eq!(opened[0].granted_days, dec!(10.00));
//!
//! let request = engine
//!     .submit_request(&employee, LeaveApplication::new(CategoryId(1), date(3, 5), date(3, 7)))
//!     .unwrap();
//! assert_eq!(request.total_days, dec!(3));
//!
//! // Shares 2024-03-07 with the pending request
//! let overlapping = engine
//!     .submit_request(&employee, LeaveApplication::new(CategoryId(1), date(3, 7), date(3, 8)));
//! assert_eq!(overlapping, Err(ValidationError::OverlappingRequest));
//!
//! let admin = Employee::admin(EmployeeId(99), date(1, 1));
//! engine
//!     .decide_request(request.id, Decision::Approved, None, &admin)
//!     .unwrap();
//! assert_eq!(engine.balances(EmployeeId(1), 2024)[0].used_days, dec!(3));
//! ```
//!
//! ## Thread Safety
//!
//! The engine is `Sync`; operations on different employees run in parallel
//! and operations on the same employee are serialized by the store.

mod base;
mod category;
mod directory;
mod employee;
mod engine;
pub mod error;
pub mod ledger;
pub mod request;
pub mod store;

pub use base::{CategoryId, EmployeeId, RequestId};
pub use category::{LeaveCategory, default_catalog};
pub use directory::Directory;
pub use employee::{Employee, Role};
pub use engine::Engine;
pub use error::{DecisionError, IdempotencyError, LeaveError, ValidationError};
pub use ledger::{BalanceKey, LedgerEntry, prorated_quota};
pub use request::{
    DateRange, Decision, DecisionRecord, LeaveApplication, LeaveRequest, NewRequest, Page,
    RequestFilter, RequestStatus,
};
pub use store::{LeaveStore, MemoryStore, UnitOfWork};
