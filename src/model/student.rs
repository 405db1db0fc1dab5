use serde::Serialize;
use serde_json::{Map, Value};

const NAME_KEYS: [&str; 3] = ["name", "student_name", "fullName"];
const SECTION_KEYS: [&str; 3] = ["section", "class", "dept"];

/// A student entry as found in the directory files.
///
/// The source files are not uniform, so the entry keeps its original JSON
/// object and resolves the interesting fields from a few known aliases.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Student {
    fields: Map<String, Value>,
}

impl Student {
    pub fn new(fields: Map<String, Value>) -> Self {
        Student { fields }
    }

    pub fn name(&self) -> Option<&str> {
        self.first_text(&NAME_KEYS)
    }

    pub fn section(&self) -> Option<&str> {
        self.first_text(&SECTION_KEYS)
    }

    fn first_text(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.fields.get(*k))
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}
