//! PDF rendering of a weekly report: letter-size page with a ruled table.

use anyhow::Result;
use printpdf::{
    BuiltinFont, Color, Line, Mm, PdfDocument, Point, Polygon, PolygonMode, Rgb, WindingOrder,
};

use super::ScoreRow;

const PAGE_W: f32 = 215.9; // letter, in mm
const PAGE_H: f32 = 279.4;
const MARGIN: f32 = 20.0;
const ROW_H: f32 = 9.0;
const TABLE_TOP: f32 = 245.0;

const HEADERS: [&str; 6] = ["Employee", "Task", "Speed", "Prof.", "Activity", "Score"];
// Employee column is wide, numeric columns are uniform
const COL_WIDTHS: [f32; 6] = [55.0, 24.0, 24.0, 24.0, 24.0, 24.0];

fn col_edges() -> Vec<f32> {
    let mut xs = vec![MARGIN];
    let mut x = MARGIN;
    for w in COL_WIDTHS {
        x += w;
        xs.push(x);
    }
    xs
}

/// Render the report as PDF bytes.
pub fn render(week: &str, rows: &[ScoreRow]) -> Result<Vec<u8>> {
    let (doc, page, layer) =
        PdfDocument::new("Weekly Productivity Report", Mm(PAGE_W), Mm(PAGE_H), "report");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
    let layer = doc.get_page(page).get_layer(layer);

    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    layer.use_text(
        format!("Weekly Productivity Report - {week}"),
        16.0,
        Mm(MARGIN),
        Mm(258.0),
        &bold,
    );

    let edges = col_edges();
    let table_right = *edges.last().unwrap_or(&MARGIN);
    let n_rows = rows.len() + 1; // header row included
    let table_bottom = TABLE_TOP - ROW_H * n_rows as f32;

    // grey header band behind the first row
    layer.set_fill_color(Color::Rgb(Rgb::new(0.5, 0.5, 0.5, None)));
    layer.add_polygon(Polygon {
        rings: vec![vec![
            (Point::new(Mm(MARGIN), Mm(TABLE_TOP)), false),
            (Point::new(Mm(table_right), Mm(TABLE_TOP)), false),
            (Point::new(Mm(table_right), Mm(TABLE_TOP - ROW_H)), false),
            (Point::new(Mm(MARGIN), Mm(TABLE_TOP - ROW_H)), false),
        ]],
        mode: PolygonMode::Fill,
        winding_order: WindingOrder::NonZero,
    });

    // header labels in near-white over the band
    layer.set_fill_color(Color::Rgb(Rgb::new(0.96, 0.96, 0.96, None)));
    for (i, header) in HEADERS.iter().enumerate() {
        layer.use_text(*header, 12.0, Mm(edges[i] + 2.0), Mm(TABLE_TOP - ROW_H + 2.5), &bold);
    }

    // data rows
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    for (i, row) in rows.iter().enumerate() {
        let y = Mm(TABLE_TOP - ROW_H * (i as f32 + 2.0) + 2.5);
        let cells = [
            row.employee_name.clone(),
            format!("{}", row.task_completion),
            format!("{}", row.speed),
            format!("{}", row.professionalism),
            format!("{}", row.activity),
            format!("{}", row.productivity_score),
        ];
        for (c, text) in cells.iter().enumerate() {
            layer.use_text(text.as_str(), 11.0, Mm(edges[c] + 2.0), y, &font);
        }
    }

    // grid
    layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    layer.set_outline_thickness(0.5);
    for r in 0..=n_rows {
        let y = TABLE_TOP - ROW_H * r as f32;
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(MARGIN), Mm(y)), false),
                (Point::new(Mm(table_right), Mm(y)), false),
            ],
            is_closed: false,
        });
    }
    for x in &edges {
        layer.add_line(Line {
            points: vec![
                (Point::new(Mm(*x), Mm(TABLE_TOP)), false),
                (Point::new(Mm(*x), Mm(table_bottom)), false),
            ],
            is_closed: false,
        });
    }

    let bytes = doc.save_to_bytes()?;
    Ok(bytes)
}
