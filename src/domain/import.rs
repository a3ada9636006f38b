use crate::domain::labels::normalize_label;
use serde::Serialize;
use std::collections::BTreeMap;

/// One spreadsheet row keyed by its header cell. Empty cells are absent.
pub type RawRow = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedRow {
    pub index: usize,
    /// Minted public id (`LD0001`, `VH0001`).
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub index: usize,
    pub reason: String,
    pub row: RawRow,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub successful: Vec<ImportedRow>,
    pub skipped: Vec<SkippedRow>,
}

/// Read access to a row that tolerates header spelling differences.
pub struct RowView<'a> {
    cells: BTreeMap<String, &'a str>,
}

impl<'a> RowView<'a> {
    pub fn new(row: &'a RawRow) -> Self {
        let cells = row
            .iter()
            .map(|(header, value)| (normalize_label(header), value.trim()))
            .filter(|(_, value)| !value.is_empty())
            .collect();
        Self { cells }
    }

    /// First non-empty cell among `aliases`, compared after normalisation.
    pub fn get(&self, aliases: &[&str]) -> Option<&'a str> {
        aliases
            .iter()
            .find_map(|alias| self.cells.get(&normalize_label(alias)).copied())
    }

    pub fn text(&self, aliases: &[&str]) -> Option<String> {
        self.get(aliases).map(str::to_string)
    }

    /// Numeric cell; thousands separators and currency signs are ignored,
    /// anything else unparseable is treated as absent.
    pub fn number(&self, aliases: &[&str]) -> Option<f64> {
        self.get(aliases).and_then(|raw| {
            let cleaned: String = raw
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
        })
    }

    /// Comma separated list cell.
    pub fn list(&self, aliases: &[&str]) -> Vec<String> {
        self.get(aliases)
            .map(|raw| {
                raw.split(',')
                    .map(|item| item.trim().to_string())
                    .filter(|item| !item.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}
