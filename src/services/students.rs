use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::model::student::Student;

const ROLL_KEYS: [&str; 3] = ["roll", "roll_no", "id"];

/// Students keyed by upper-cased roll number.
#[derive(Debug, Default)]
pub struct StudentDirectory {
    by_roll: HashMap<String, Student>,
}

impl StudentDirectory {
    /// Loads every readable file; a broken file is logged and skipped.
    pub fn load(paths: &[PathBuf]) -> Self {
        let mut directory = StudentDirectory::default();

        for path in paths {
            match directory.load_file(path) {
                Ok(count) => info!(path = %path.display(), count, "Loaded students"),
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to load students"),
            }
        }

        directory
    }

    fn load_file(&mut self, path: &Path) -> Result<usize> {
        let raw = fs::read_to_string(path).context("read failed")?;
        let value: Value = serde_json::from_str(&raw).context("invalid JSON")?;
        Ok(self.extend_from_json(value))
    }

    /// Accepts `{"students": [{roll, ...}]}` or `{"<roll>": {...}}`.
    pub fn extend_from_json(&mut self, value: Value) -> usize {
        let Value::Object(mut top) = value else {
            return 0;
        };

        let mut added = 0;
        match top.remove("students") {
            Some(Value::Array(list)) => {
                for entry in list {
                    let Value::Object(fields) = entry else { continue };
                    let roll = ROLL_KEYS
                        .iter()
                        .filter_map(|k| fields.get(*k))
                        .find_map(roll_text);
                    if let Some(roll) = roll {
                        self.by_roll.insert(roll, Student::new(fields));
                        added += 1;
                    }
                }
            }
            Some(other) => {
                // not a list, so "students" was just a roll like any other
                top.insert("students".to_string(), other);
                added += self.extend_keyed(top);
            }
            None => added += self.extend_keyed(top),
        }
        added
    }

    fn extend_keyed(&mut self, entries: serde_json::Map<String, Value>) -> usize {
        let mut added = 0;
        for (roll, entry) in entries {
            let roll = roll.trim().to_uppercase();
            if roll.is_empty() {
                continue;
            }
            if let Value::Object(fields) = entry {
                self.by_roll.insert(roll, Student::new(fields));
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, roll: &str) -> Option<&Student> {
        self.by_roll.get(&roll.trim().to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.by_roll.len()
    }
}

fn roll_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then(|| text.to_uppercase())
}
