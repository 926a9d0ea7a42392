pub mod csv_import;
pub mod file;

pub use csv_import::import_csv;
pub use file::load_items;
