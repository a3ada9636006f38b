use serde::{Deserialize, Serialize};

/// Zero-padding width of public entity ids (`LD0001`).
pub const SEQUENCE_ID_WIDTH: usize = 4;

/// Named counters used to mint human-readable ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceKind {
    Lead,
    Vehicle,
}

impl SequenceKind {
    /// Counter row name.
    pub fn counter_name(self) -> &'static str {
        match self {
            SequenceKind::Lead => "leadId",
            SequenceKind::Vehicle => "vehicleId",
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            SequenceKind::Lead => "LD",
            SequenceKind::Vehicle => "VH",
        }
    }

    pub fn format(self, value: i64) -> String {
        format_sequence_id(self.prefix(), value, SEQUENCE_ID_WIDTH)
    }
}

/// Formats `value` behind `prefix`, zero-padded to `width` digits.
/// Values wider than `width` are kept whole.
pub fn format_sequence_id(prefix: &str, value: i64, width: usize) -> String {
    format!("{}{:0width$}", prefix, value, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_to_width() {
        assert_eq!(format_sequence_id("LD", 7, 4), "LD0007");
        assert_eq!(format_sequence_id("VH", 42, 4), "VH0042");
    }

    #[test]
    fn test_format_does_not_truncate_wide_values() {
        assert_eq!(format_sequence_id("LD", 12345, 4), "LD12345");
    }

    #[test]
    fn test_kind_prefixes() {
        assert_eq!(SequenceKind::Lead.format(1), "LD0001");
        assert_eq!(SequenceKind::Vehicle.format(9999), "VH9999");
        assert_eq!(SequenceKind::Lead.counter_name(), "leadId");
        assert_eq!(SequenceKind::Vehicle.counter_name(), "vehicleId");
    }
}
