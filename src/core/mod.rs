//! Core data types and I/O operations.

pub mod distance;
pub mod loaders;
pub mod validation;
pub mod writers;

pub use distance::{
    compute_l2_distances, DistanceError, DistanceSample, DistanceSeries, DistanceStats,
    LengthPolicy, PositionTable,
};
pub use loaders::{load_table, CsvTable, HeaderMode, LoaderError, TableRole};
pub use validation::{validate_columns, validate_pair, ValidationError, EXPECTED_COLUMNS};
pub use writers::{format_distance_table, print_distance_table, write_distance_csv, WriteError};
