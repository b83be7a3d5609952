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

//! Error types for leave accounting.
//!
//! Each engine operation has its own error family so callers can match on
//! exactly the failures that operation can produce. Every error is raised
//! before anything is written.

use crate::base::EmployeeId;
use thiserror::Error;

/// Reasons a leave application is refused.
///
/// All of these are caller-correctable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Start date is after end date
    #[error("start date cannot be after end date")]
    InvalidRange,

    /// Leave starts before the employee joined
    #[error("cannot apply for leave before joining date")]
    PredatesEmployment,

    /// Half-day leave spanning more than one day
    #[error("half-day leave must be for a single day")]
    InvalidHalfDay,

    /// A pending or approved request already covers part of the range
    #[error("overlapping leave request already exists")]
    OverlappingRequest,

    /// No ledger entry for the start year, or not enough days left in it
    #[error("insufficient leave balance")]
    InsufficientBalance,
}

/// Reasons a decision on a leave request is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecisionError {
    /// Actor is not an administrator
    #[error("only administrators can decide leave requests")]
    NotAuthorized,

    /// Referenced request does not exist
    #[error("leave request not found")]
    NotFound,

    /// Request is already approved or rejected
    #[error("leave request has already been processed")]
    AlreadyDecided,

    /// Ledger entry for the request's start year is gone. Indicates a
    /// data-integrity problem: submission guarantees it exists.
    #[error("leave balance record not found for employee")]
    LedgerMissing,

    /// Approving would consume more days than were granted
    #[error("insufficient leave balance to approve request")]
    InsufficientBalance,
}

/// Balance initialization was attempted twice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdempotencyError {
    #[error("leave balances for employee {employee} already initialized for {year}")]
    AlreadyInitialized { employee: EmployeeId, year: i32 },
}

/// Any failure produced by the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeaveError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Decision(#[from] DecisionError),

    #[error(transparent)]
    Idempotency(#[from] IdempotencyError),
}
