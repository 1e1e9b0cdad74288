// src/process/mod.rs
pub mod normalize;
pub mod periods;
pub mod raw_table;
pub mod series;
pub mod utils;

pub use normalize::{normalize, DuplicateColumns, NormalizedTable, Record, COMPANY, PARAMETERS};
pub use periods::{compute_master_periods, table_periods, Period, PeriodWindow};
pub use raw_table::RawTable;
pub use series::{extract_series, find_row, find_series, scalar, LabelPattern, MatchStrategy, Series};
pub use utils::{clean_value, normalize_ws, parse_number, round2};
