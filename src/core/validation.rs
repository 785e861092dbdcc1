//! Shape validation for loaded position tables.
//!
//! Only the column count is checked here. Row counts, column names and cell
//! types are left to the numeric conversion in [`crate::core::distance`].

use thiserror::Error;

use super::loaders::{CsvTable, TableRole};

/// Number of columns a position table must have (X, Y, Z).
pub const EXPECTED_COLUMNS: usize = 3;

/// Errors raised when a table does not have the expected shape.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("shape mismatch: expected {expected} columns, {role} table '{path}' has {found}")]
    ShapeMismatch {
        role: TableRole,
        path: String,
        expected: usize,
        found: usize,
    },
}

/// Result type for validation operations.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Check that a single table has exactly [`EXPECTED_COLUMNS`] columns.
pub fn validate_columns(table: &CsvTable, role: TableRole) -> Result<()> {
    if table.num_columns != EXPECTED_COLUMNS {
        return Err(ValidationError::ShapeMismatch {
            role,
            path: table.source_display(),
            expected: EXPECTED_COLUMNS,
            found: table.num_columns,
        });
    }
    Ok(())
}

/// Check both sides of a comparison, ground truth first.
pub fn validate_pair(ground_truth: &CsvTable, measured: &CsvTable) -> Result<()> {
    validate_columns(ground_truth, TableRole::GroundTruth)?;
    validate_columns(measured, TableRole::Measured)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(num_columns: usize, num_rows: usize) -> CsvTable {
        let rows = (0..num_rows)
            .map(|r| {
                (0..num_columns)
                    .map(|c| (r * c).to_string())
                    .collect::<Vec<String>>()
            })
            .collect();
        let mut table = CsvTable::from_rows(rows);
        table.num_columns = num_columns;
        table
    }

    #[test]
    fn test_three_columns_pass() {
        assert!(validate_pair(&table(3, 4), &table(3, 5)).is_ok());
    }

    #[test]
    fn test_two_columns_rejected() {
        let result = validate_pair(&table(2, 4), &table(3, 4));
        match result {
            Err(ValidationError::ShapeMismatch {
                role,
                expected,
                found,
                ..
            }) => {
                assert_eq!(role, TableRole::GroundTruth);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            _ => panic!("Expected ShapeMismatch error"),
        }
    }

    #[test]
    fn test_four_columns_rejected() {
        let result = validate_pair(&table(3, 4), &table(4, 4));
        match result {
            Err(ValidationError::ShapeMismatch { role, found, .. }) => {
                assert_eq!(role, TableRole::Measured);
                assert_eq!(found, 4);
            }
            _ => panic!("Expected ShapeMismatch error"),
        }
    }

    #[test]
    fn test_error_message() {
        let err = validate_columns(&table(4, 1), TableRole::Measured).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("shape mismatch: expected 3 columns"));
        assert!(msg.contains("measured"));
    }
}
