//! Excel export of attendance records.

use std::path::Path;

use chrono::Local;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};

use crate::entities::sea_orm_active_enums::AttendanceStatus;
use crate::error::Result;
use crate::models::AttendanceListItem;

/// Write attendance rows to an `.xlsx` file, one record per line.
pub fn export_attendance_to_excel(rows: &[AttendanceListItem], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.set_name("Attendance")?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White)
        .set_border(FormatBorder::Thin);
    let absent_format = Format::new().set_font_color(Color::RGB(0xC00000));

    let headers = ["Employee Code", "Full Name", "Email", "Department", "Date", "Status"];
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
    }

    worksheet.set_column_width(0, 15)?; // Employee Code
    worksheet.set_column_width(1, 30)?; // Full Name
    worksheet.set_column_width(2, 32)?; // Email
    worksheet.set_column_width(3, 20)?; // Department
    worksheet.set_column_width(4, 12)?; // Date
    worksheet.set_column_width(5, 10)?; // Status

    for (idx, record) in rows.iter().enumerate() {
        let row = (idx + 1) as u32;

        worksheet.write_string(row, 0, &record.employee_code)?;
        worksheet.write_string(row, 1, &record.employee_name)?;
        worksheet.write_string(row, 2, &record.employee_email)?;
        worksheet.write_string(row, 3, &record.department)?;
        worksheet.write_string(row, 4, record.date.format("%Y-%m-%d").to_string())?;

        let status = record.status.to_string();
        if record.status == AttendanceStatus::Absent {
            worksheet.write_string_with_format(row, 5, &status, &absent_format)?;
        } else {
            worksheet.write_string(row, 5, &status)?;
        }
    }

    if !rows.is_empty() {
        worksheet.autofilter(0, 0, rows.len() as u32, 5)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    workbook.save(path)?;
    Ok(())
}

/// Generate default filename for export.
pub fn generate_export_filename(prefix: &str) -> String {
    let now = Local::now();
    format!("{prefix}_{ts}.xlsx", ts = now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    fn item(code: &str, status: AttendanceStatus) -> AttendanceListItem {
        AttendanceListItem {
            id: 1,
            employee_id: 1,
            employee_code: code.to_string(),
            employee_name: "Ava Patel".to_string(),
            employee_email: "ava.patel@hrms.com".to_string(),
            department: "Engineering".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 5, 6).unwrap(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by_id: None,
            updated_by_id: None,
        }
    }

    #[test]
    fn test_generate_export_filename() {
        let name = generate_export_filename("attendance");
        assert!(name.starts_with("attendance_"));
        assert!(name.ends_with(".xlsx"));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.xlsx");
        let rows = vec![
            item("EMP-001", AttendanceStatus::Present),
            item("EMP-002", AttendanceStatus::Absent),
        ];

        export_attendance_to_excel(&rows, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        // xlsx is a zip archive
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_export_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.xlsx");
        export_attendance_to_excel(&[], &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.xlsx");
        let err = export_attendance_to_excel(&[], &path).unwrap_err();
        assert!(matches!(err, AppError::Export(_)));
    }
}
