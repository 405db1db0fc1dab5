use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Placeholder shown for a value that has not been recorded yet.
pub const NOT_RECORDED: &str = "—";

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString, AsRefStr)]
pub enum AttendanceStatus {
    #[strum(serialize = "In Library")]
    InLibrary,
    #[strum(serialize = "Completed")]
    Completed,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString, AsRefStr, Serialize, Deserialize)]
pub enum ScanAction {
    #[strum(serialize = "Walk-In")]
    #[serde(rename = "Walk-In")]
    WalkIn,
    #[strum(serialize = "Walk-Out")]
    #[serde(rename = "Walk-Out")]
    WalkOut,
}

/// One row of the attendance table as it travels over the wire.
///
/// Every field tolerates `null` or absence so that a partially filled row
/// still renders instead of failing the whole list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[schema(example = "23BCA041")]
    #[serde(deserialize_with = "null_as_empty")]
    pub roll: String,
    #[schema(example = "23BCA041")]
    #[serde(deserialize_with = "null_as_empty")]
    pub barcode: String,
    #[schema(example = "Asha Rai")]
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[schema(example = "A")]
    #[serde(deserialize_with = "null_as_empty")]
    pub section: String,
    #[schema(example = "BCA")]
    #[serde(rename = "class", deserialize_with = "null_as_empty")]
    pub class_name: String,
    #[schema(example = "2026-01-01", format = "date")]
    #[serde(deserialize_with = "null_as_empty")]
    pub date: String,
    #[schema(example = "09:15:02")]
    #[serde(deserialize_with = "null_as_empty")]
    pub in_time: String,
    #[schema(example = "—")]
    #[serde(deserialize_with = "null_as_empty")]
    pub out_time: String,
    #[schema(example = "In Library")]
    #[serde(deserialize_with = "null_as_empty")]
    pub status: String,
}

impl AttendanceRecord {
    pub fn is_in_library(&self) -> bool {
        self.status == AttendanceStatus::InLibrary.as_ref()
    }
}

/// Body of `GET /api/attendance`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceList {
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Raw `attendance` table row.
#[derive(Debug, FromRow)]
pub struct AttendanceRow {
    pub id: i64,
    pub barcode: String,
    pub name: Option<String>,
    pub section: Option<String>,
    pub class: Option<String>,
    pub date: String,
    pub in_time: Option<String>,
    pub out_time: Option<String>,
    pub status: String,
}

impl From<AttendanceRow> for AttendanceRecord {
    fn from(row: AttendanceRow) -> Self {
        AttendanceRecord {
            roll: row.barcode.clone(),
            barcode: row.barcode,
            name: row.name.unwrap_or_default(),
            section: row.section.unwrap_or_default(),
            class_name: row.class.unwrap_or_default(),
            date: row.date,
            in_time: row.in_time.unwrap_or_default(),
            out_time: row
                .out_time
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| NOT_RECORDED.to_string()),
            status: row.status,
        }
    }
}
