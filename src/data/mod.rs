pub mod csv;
pub mod dataset;
pub mod folds;
pub mod loader;

pub use csv::save_as_csv;
pub use dataset::{DataFile, DataPoint};
pub use folds::FoldGroups;
pub use loader::load_data_files_from_path;
