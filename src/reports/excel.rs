//! Spreadsheet rendering of a weekly report.

use anyhow::Result;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};

use super::ScoreRow;

const HEADER_FILL: Color = Color::RGB(0x4472C4);

const HEADERS: [&str; 7] = [
    "Employee ID",
    "Employee Name",
    "Task",
    "Speed",
    "Professional",
    "Activity",
    "Productivity Score",
];

/// Render one worksheet titled after the week: merged title row, styled
/// header band in row 3, data from row 4 with the score column bold.
pub fn render(week: &str, rows: &[ScoreRow]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(format!("Week {week}"))?;

    let title_format = Format::new().set_bold().set_font_size(16);
    worksheet.merge_range(0, 0, 0, 6, &format!("Weekly Productivity Report - {week}"), &title_format)?;

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(HEADER_FILL)
        .set_align(FormatAlign::Center);
    for (col, header) in HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(2, col as u16, *header, &header_format)?;
    }

    let bold = Format::new().set_bold();
    for (i, row) in rows.iter().enumerate() {
        let r = 3 + i as u32;
        worksheet.write_number(r, 0, row.employee_id as f64)?;
        worksheet.write_string(r, 1, &row.employee_name)?;
        worksheet.write_number(r, 2, row.task_completion)?;
        worksheet.write_number(r, 3, row.speed)?;
        worksheet.write_number(r, 4, row.professionalism)?;
        worksheet.write_number(r, 5, row.activity)?;
        worksheet.write_number_with_format(r, 6, row.productivity_score, &bold)?;
    }

    for col in 0..7u16 {
        worksheet.set_column_width(col, 15)?;
    }

    let buf = workbook.save_to_buffer()?;
    Ok(buf)
}
