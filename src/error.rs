use std::fmt;

use thiserror::Error;

use crate::data::columns::CanonicalField;

/// Structural failures that abort an analysis.
///
/// Row-level anomalies are never reported through this type; the simulator
/// records them as skipped rows and keeps going.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MouldError {
    #[error("Missing required columns: {}", FieldList(.0))]
    MissingColumns(Vec<CanonicalField>),

    #[error("No valid data after standardization")]
    EmptyDataset,
}

struct FieldList<'a>(&'a [CanonicalField]);

impl fmt::Display for FieldList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_fields_in_order() {
        let err = MouldError::MissingColumns(vec![
            CanonicalField::Timestamp,
            CanonicalField::Humidity,
        ]);
        assert_eq!(err.to_string(), "Missing required columns: Timestamp, Humidity");
    }

    #[test]
    fn test_empty_dataset_message() {
        assert_eq!(
            MouldError::EmptyDataset.to_string(),
            "No valid data after standardization"
        );
    }
}
