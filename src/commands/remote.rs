//! `hrms remote ...`: the terminal dashboard, talking to a running server.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use crate::client::http::{DEFAULT_API_URL, DEFAULT_TIMEOUT};
use crate::client::{ApiClient, ApiError, Pagination, SessionState, SessionStore};
use crate::entities::sea_orm_active_enums::AttendanceStatus;
use crate::models::query::{AttendanceQuery, DateRangeQuery, StatsQuery};
use crate::models::{AttendanceStatsPoint, EmployeeCreate, EmployeeRead};

const CHART_WIDTH: usize = 40;

#[derive(Debug, Args)]
pub struct RemoteArgs {
    /// Base URL of the API
    #[arg(long, env = "HRMS_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Session file (defaults to the per-user data directory)
    #[arg(long)]
    pub session: Option<PathBuf>,

    #[command(subcommand)]
    pub command: RemoteCommand,
}

#[derive(Debug, Subcommand)]
pub enum RemoteCommand {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "HRMS_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Revalidate the stored session and show the current user
    Whoami,
    /// List employees
    Employees {
        /// Search code, name, email or department
        #[arg(long)]
        q: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 20)]
        page_size: u64,
    },
    /// Attendance history and totals for one employee
    Attendance {
        /// Numeric employee id
        #[arg(long)]
        employee: i32,
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long, default_value_t = 1)]
        page: u64,
        #[arg(long, default_value_t = 20)]
        page_size: u64,
    },
    /// Add an employee
    AddEmployee {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        department: String,
    },
    /// Mark today's attendance for an employee
    Mark {
        /// Numeric employee id
        #[arg(long)]
        employee: i32,
        /// present or absent
        #[arg(long)]
        status: AttendanceStatus,
    },
    /// Headcount for a day
    Overview {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Per-day attendance chart
    Stats {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        employee: Option<i32>,
    },
}

/// Message plus one line per field error.
fn describe(err: ApiError) -> anyhow::Error {
    let mut text = err.message.clone();
    for (field, msg) in err.field_errors() {
        let _ = write!(text, "\n  {field}: {msg}");
    }
    anyhow!(text)
}

/// Render one text bar per day: `#` present, `x` absent, `.` unmarked.
pub fn render_chart(points: &[AttendanceStatsPoint], width: usize) -> String {
    let scale_max = points
        .iter()
        .map(|p| p.present + p.absent + p.unmarked)
        .max()
        .unwrap_or(0);
    let cells = |count: u64| -> usize {
        if scale_max == 0 {
            0
        } else {
            ((count as f64 / scale_max as f64) * width as f64).round() as usize
        }
    };

    let mut out = String::new();
    for point in points {
        let bar = format!(
            "{}{}{}",
            "#".repeat(cells(point.present)),
            "x".repeat(cells(point.absent)),
            ".".repeat(cells(point.unmarked)),
        );
        let _ = writeln!(
            out,
            "{date}  {bar:<width$}  present {p:>3}  absent {a:>3}  unmarked {u:>3}",
            date = point.date,
            p = point.present,
            a = point.absent,
            u = point.unmarked,
        );
    }
    out
}

fn print_employees(items: &[EmployeeRead]) {
    println!("{:<6} {:<10} {:<24} {:<30} {}", "ID", "CODE", "NAME", "EMAIL", "DEPARTMENT");
    for e in items {
        println!(
            "{:<6} {:<10} {:<24} {:<30} {}",
            e.id, e.employee_id, e.full_name, e.email, e.department
        );
    }
}

pub async fn run(args: RemoteArgs) -> anyhow::Result<()> {
    let path = match args.session {
        Some(path) => path,
        None => SessionStore::default_path().context("No home directory for the session file; pass --session")?,
    };
    let mut store = SessionStore::load(&path);
    let mut client = ApiClient::new(&args.api_url, DEFAULT_TIMEOUT).map_err(describe)?;
    client.set_token(store.token().map(str::to_string));

    match args.command {
        RemoteCommand::Login { email, password } => {
            let token = client.login(&email, &password).await.map_err(describe)?;
            store.set_token(token.access_token);
            let session = client.refresh_session().await.map_err(describe)?;
            store.set_token(session.token.access_token);
            store.set_user(Some(session.user.clone()));
            store.mark_checked();
            store.save()?;
            println!("Logged in as {} ({})", session.user.email, session.user.role);
        }
        RemoteCommand::Logout => {
            client.logout();
            store.clear();
            store.save()?;
            println!("Logged out");
        }
        RemoteCommand::Whoami => {
            let state = store.bootstrap(&mut client).await;
            store.save()?;
            match state {
                SessionState::Anonymous => println!("Not logged in"),
                SessionState::Authenticated(user) => {
                    println!("{} <{}> role={}", user.name.as_deref().unwrap_or("-"), user.email, user.role)
                }
                SessionState::Expired(reason) => println!("Session expired: {reason}"),
                SessionState::Unreachable(reason) => {
                    return Err(anyhow!("Could not reach the server: {reason}"));
                }
            }
        }
        RemoteCommand::Employees { q, page, page_size } => {
            let page = Pagination::new(page, page_size);
            let (items, meta) = client.list_employees(&page, q.as_deref()).await.map_err(describe)?;
            print_employees(&items);
            println!(
                "Page {} of {} ({} total)",
                page.page,
                page.total_pages(meta.total),
                meta.total
            );
            if page.has_next(meta.total) {
                println!("Next: --page {}", page.next().page);
            }
        }
        RemoteCommand::Attendance {
            employee,
            from,
            to,
            page,
            page_size,
        } => {
            let page = Pagination::new(page, page_size);
            let query = AttendanceQuery {
                date_from: from,
                date_to: to,
                limit: i64::try_from(page.limit()).ok(),
                offset: i64::try_from(page.offset()).ok(),
            };
            let range = DateRangeQuery {
                date_from: from,
                date_to: to,
            };
            let summary = client.attendance_summary(employee, &range).await.map_err(describe)?;
            let (records, meta) = client.list_attendance(employee, &query).await.map_err(describe)?;

            println!(
                "{}: {} records, {} present, {} absent",
                summary.employee_code, summary.total_records, summary.total_present, summary.total_absent
            );
            for record in &records {
                println!("{:<6} {}  {}", record.id, record.date, record.status);
            }
            println!("Page {} of {}", page.page, page.total_pages(meta.total));
        }
        RemoteCommand::AddEmployee {
            name,
            email,
            department,
        } => {
            let payload = EmployeeCreate {
                full_name: name,
                email,
                department,
            };
            let employee = client.create_employee(&payload).await.map_err(describe)?;
            println!("Created {} (id {})", employee.employee_id, employee.id);
        }
        RemoteCommand::Mark { employee, status } => {
            let record = client.upsert_today(employee, status).await.map_err(describe)?;
            println!("Employee {} marked {} on {}", record.employee_id, record.status, record.date);
        }
        RemoteCommand::Overview { date } => {
            let stats = client.overview(date).await.map_err(describe)?;
            println!("Date:        {}", stats.date);
            println!("Employees:   {}", stats.total_employees);
            println!("Present:     {}", stats.present);
            println!("Absent:      {}", stats.absent);
            println!("Unmarked:    {}", stats.unmarked);
        }
        RemoteCommand::Stats { from, to, employee } => {
            let query = StatsQuery {
                employee_id: employee,
                date_from: from,
                date_to: to,
            };
            let (points, meta) = client.attendance_stats(&query).await.map_err(describe)?;
            println!(
                "{} to {} ({} employees)",
                meta.date_from, meta.date_to, meta.total_employees
            );
            print!("{}", render_chart(&points, CHART_WIDTH));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, present: u64, absent: u64, unmarked: u64) -> AttendanceStatsPoint {
        AttendanceStatsPoint {
            date: NaiveDate::from_ymd_opt(2025, 6, day).unwrap(),
            present,
            absent,
            unmarked,
        }
    }

    #[test]
    fn test_render_chart_scales_to_width() {
        let chart = render_chart(&[point(1, 2, 1, 1), point(2, 0, 0, 4)], 8);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("2025-06-01  ####xx..  "));
        assert!(lines[1].starts_with("2025-06-02  ........  "));
        assert!(lines[0].ends_with("present   2  absent   1  unmarked   1"));
    }

    #[test]
    fn test_render_chart_empty_headcount() {
        let chart = render_chart(&[point(1, 0, 0, 0)], 10);
        assert!(chart.starts_with("2025-06-01              present   0"));
        assert_eq!(render_chart(&[], 10), "");
    }

    #[test]
    fn test_describe_includes_field_errors() {
        let err = ApiError::from_response(
            reqwest::StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"success":false,"message":"Validation error.","errors":[{"loc":["body","email"],"msg":"bad email","type":"value_error"}]}"#,
        );
        assert_eq!(describe(err).to_string(), "Validation error.\n  email: bad email");
    }
}
