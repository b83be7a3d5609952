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

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use csv::{ReaderBuilder, Trim, Writer};
use leave_ledger::{
    CategoryId, Decision, Directory, Employee, EmployeeId, Engine, LeaveApplication,
    LeaveCategory, LeaveError, Page, RequestFilter, RequestId, RequestStatus, Role,
    default_catalog,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Leave Ledger - Replay leave operations from a CSV file
///
/// Reads onboarding, leave applications and decisions from a CSV file and
/// writes the resulting balances (or requests) to stdout.
#[derive(Parser, Debug)]
#[command(name = "leave-ledger")]
#[command(about = "A leave accounting engine that replays operation CSVs", long_about = None)]
struct Args {
    /// Path to CSV file with operations
    ///
    /// Expected format: type,employee,role,request,category,start,end,half_day,text
    /// Example: cargo run -- operations.csv > balances.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// CSV file with leave categories (id,name,paid,annual_quota,carry_forward)
    ///
    /// Defaults to Casual Leave (12 days) and Earned Leave (15 days).
    #[arg(long, value_name = "FILE")]
    categories: Option<PathBuf>,

    /// What to write to stdout
    #[arg(long, value_enum, default_value_t = Report::Balances)]
    report: Report,

    /// Log filter directive, e.g. `info` or `leave_ledger=debug`
    #[arg(long, env = "LEAVE_LEDGER_LOG", default_value = "warn")]
    log: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Report {
    Balances,
    Requests,
}

fn main() {
    let args = Args::parse();
    init_tracing(&args.log);

    let categories = match &args.categories {
        Some(path) => match open(path).and_then(load_categories) {
            Ok(categories) => categories,
            Err(e) => {
                error!("Error reading categories '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => default_catalog(),
    };
    let engine = Engine::new().with_directory(Directory::with_categories(categories));

    let input = match open(&args.input) {
        Ok(reader) => reader,
        Err(e) => {
            error!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    if let Err(e) = process_operations(&engine, input) {
        error!("Error processing operations: {}", e);
        process::exit(1);
    }

    let written = match args.report {
        Report::Balances => write_balances(&engine, std::io::stdout()),
        Report::Requests => write_requests(&engine, std::io::stdout()),
    };
    if let Err(e) = written {
        error!("Error writing output: {}", e);
        process::exit(1);
    }
}

fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open(path: &Path) -> Result<BufReader<File>, csv::Error> {
    Ok(BufReader::new(File::open(path)?))
}

/// Raw CSV record matching the input format.
///
/// Fields: `type, employee, role, request, category, start, end, half_day, text`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "type")]
    op_type: String,
    employee: u32,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    role: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    request: Option<u64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    category: Option<u16>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    end: Option<NaiveDate>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    half_day: Option<bool>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Operation {
    Onboard(Employee),
    Submit {
        employee: EmployeeId,
        application: LeaveApplication,
    },
    Decide {
        actor: EmployeeId,
        request: RequestId,
        decision: Decision,
        note: Option<String>,
    },
}

impl CsvRecord {
    /// Converts CSV record to an engine operation.
    ///
    /// Returns `None` for unknown operation types or missing required fields.
    fn into_operation(self) -> Option<Operation> {
        let employee = EmployeeId(self.employee);
        let text = self.text.filter(|text| !text.is_empty());

        match self.op_type.to_lowercase().as_str() {
            "onboard" => {
                let role = match self.role.as_deref().map(str::to_lowercase).as_deref() {
                    None | Some("") | Some("employee") => Role::Employee,
                    Some("admin") => Role::Admin,
                    Some(_) => return None,
                };
                Some(Operation::Onboard(Employee {
                    id: employee,
                    join_date: self.start?,
                    role,
                }))
            }
            "submit" => {
                let start_date = self.start?;
                Some(Operation::Submit {
                    employee,
                    application: LeaveApplication {
                        category: CategoryId(self.category?),
                        start_date,
                        end_date: self.end.unwrap_or(start_date),
                        half_day: self.half_day.unwrap_or(false),
                        reason: text,
                    },
                })
            }
            "approve" | "reject" => {
                let decision = if self.op_type.eq_ignore_ascii_case("approve") {
                    Decision::Approved
                } else {
                    Decision::Rejected
                };
                Some(Operation::Decide {
                    actor: employee,
                    request: RequestId(self.request?),
                    decision,
                    note: text,
                })
            }
            _ => None,
        }
    }
}

/// Applies one operation. Unknown employees are skipped.
fn apply(engine: &Engine, operation: Operation) -> Result<(), LeaveError> {
    match operation {
        Operation::Onboard(employee) => {
            engine.onboard(employee)?;
        }
        Operation::Submit {
            employee,
            application,
        } => {
            let Some(employee) = engine.directory().employee(employee) else {
                warn!(%employee, "skipping leave request for unknown employee");
                return Ok(());
            };
            engine.submit_request(&employee, application)?;
        }
        Operation::Decide {
            actor,
            request,
            decision,
            note,
        } => {
            let Some(actor) = engine.directory().employee(actor) else {
                warn!(%actor, %request, "skipping decision by unknown employee");
                return Ok(());
            };
            engine.decide_request(request, decision, note, &actor)?;
        }
    }
    Ok(())
}

/// Replays operations from a CSV reader.
///
/// Rows are streamed, so arbitrarily large files are handled without
/// loading them into memory. Malformed rows and refused operations are
/// logged and skipped.
///
/// # CSV Format
///
/// Expected columns: `type, employee, role, request, category, start, end, half_day, text`
/// - `onboard`: `employee`, optional `role` (employee/admin), `start` is the join date
/// - `submit`: `employee`, `category`, `start`, optional `end` and `half_day`, `text` is the reason
/// - `approve` / `reject`: `employee` is the acting admin, `request`, `text` is the note
///
/// Request ids are assigned from 1 in submission order.
///
/// # Example
///
/// ```csv
/// type,employee,role,request,category,start,end,half_day,text
/// onboard,1,,,,2024-03-01,,,
/// onboard,9,admin,,,2024-01-01,,,
/// submit,1,,,1,2024-03-05,2024-03-07,,family trip
/// approve,9,,1,,,,,enjoy
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is invalid.
pub fn process_operations<R: Read>(engine: &Engine, reader: R) -> Result<(), csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for (line, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        let row = line + 2;
        match result {
            Ok(record) => {
                let Some(operation) = record.into_operation() else {
                    warn!(row, "skipping invalid operation record");
                    continue;
                };
                if let Err(e) = apply(engine, operation) {
                    warn!(row, "skipping operation: {e}");
                }
            }
            Err(e) => {
                warn!(row, "skipping malformed row: {e}");
            }
        }
    }

    Ok(())
}

/// Reads leave categories: `id, name, paid, annual_quota, carry_forward`.
fn load_categories<R: Read>(reader: R) -> Result<Vec<LeaveCategory>, csv::Error> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(reader)
        .into_deserialize()
        .collect()
}

/// Writes every employee's ledger, rounded to 2 decimal places.
///
/// # CSV Format
///
/// Columns: `employee, category, year, granted, used, remaining`
///
/// ```csv
/// employee,category,year,granted,used,remaining
/// 1,1,2024,10.00,3.00,7.00
/// ```
pub fn write_balances<W: Write>(engine: &Engine, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for employee in engine.directory().employees() {
        for entry in engine.ledger(employee.id) {
            wtr.serialize(&entry)?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct RequestRow {
    id: RequestId,
    employee: EmployeeId,
    category: CategoryId,
    start: NaiveDate,
    end: NaiveDate,
    half_day: bool,
    total_days: Decimal,
    status: RequestStatus,
    approver: Option<EmployeeId>,
    note: Option<String>,
    reason: Option<String>,
}

/// Writes every request in id order, one page at a time.
///
/// Columns: `id, employee, category, start, end, half_day, total_days, status, approver, note, reason`
pub fn write_requests<W: Write>(engine: &Engine, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);
    let filter = RequestFilter::new();
    let mut page = Page::new(1, Page::MAX_SIZE);

    loop {
        let requests = engine.requests(&filter, page);
        if requests.is_empty() {
            break;
        }
        for request in requests {
            let (approver, note) = match request.decision {
                Some(record) => (Some(record.approver), record.note),
                None => (None, None),
            };
            wtr.serialize(RequestRow {
                id: request.id,
                employee: request.employee,
                category: request.category,
                start: request.period.start(),
                end: request.period.end(),
                half_day: request.half_day,
                total_days: request.total_days,
                status: request.status,
                approver,
                note,
                reason: request.reason,
            })?;
        }
        page = page.next();
    }

    wtr.flush()?;
    Ok(())
}
