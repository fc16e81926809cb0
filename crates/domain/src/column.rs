use serde::{Deserialize, Serialize};

/// Description of a single table column as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDesc {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    /// Key role as reported by the catalog ("PRI", "MUL", ...).
    pub key: Option<String>,
    pub default: Option<String>,
    pub extra: Option<String>,
}

impl ColumnDesc {
    pub fn type_display(&self) -> String {
        let mut display = self.data_type.clone();
        if !self.nullable {
            display.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default {
            display.push_str(&format!(" DEFAULT {}", default));
        }
        display
    }

    pub fn is_primary_key(&self) -> bool {
        self.key.as_deref() == Some("PRI")
    }
}
