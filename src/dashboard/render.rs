use askama::Template;

use crate::model::attendance::AttendanceRecord;

/// Badge style for a row still in the library.
pub const IN_LIBRARY_BADGE: &str = "bg-emerald-50 text-emerald-700 ring-emerald-200";
/// Badge style for every other status.
pub const DEFAULT_BADGE: &str = "bg-slate-50 text-slate-700 ring-slate-200";

pub fn badge_class(record: &AttendanceRecord) -> &'static str {
    if record.is_in_library() {
        IN_LIBRARY_BADGE
    } else {
        DEFAULT_BADGE
    }
}

/// One table row as the templates see it.
pub struct RowView<'a> {
    pub record: &'a AttendanceRecord,
    pub badge: &'static str,
}

pub fn row_views(records: &[AttendanceRecord]) -> Vec<RowView<'_>> {
    records
        .iter()
        .map(|record| RowView {
            record,
            badge: badge_class(record),
        })
        .collect()
}

/// Table body markup: one `<tr>` per record, in order.
#[derive(Template)]
#[template(path = "rows.html")]
pub struct RowsPartial<'a> {
    pub rows: Vec<RowView<'a>>,
}

pub fn render_rows(records: &[AttendanceRecord]) -> askama::Result<String> {
    RowsPartial {
        rows: row_views(records),
    }
    .render()
}
