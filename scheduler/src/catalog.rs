// Named schedules loaded from a JSON file

use anyhow::{Context, Result};
use recurrence::Frequency;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Schedule names mapped to their recurrence, in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub entries: BTreeMap<String, Frequency>,
}

impl Catalog {
    /// Read a JSON object of `name -> frequency`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schedules file {}", path.display()))?;
        let catalog = Self::from_json(&text)
            .with_context(|| format!("Invalid schedules file {}", path.display()))?;

        info!(
            path = %path.display(),
            schedules = catalog.entries.len(),
            "Schedules loaded"
        );
        for (name, frequency) in &catalog.entries {
            if matches!(frequency, Frequency::Unknown) {
                warn!(schedule = %name, "Schedule has no recognised recurrence and will never run");
            }
        }
        Ok(catalog)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let entries: BTreeMap<String, Frequency> = serde_json::from_str(text)?;
        Ok(Self { entries })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
