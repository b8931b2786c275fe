pub mod errors;
pub mod model;
mod reader;

pub use errors::ParserError;
pub use model::RawSalesTable;
pub use reader::{parse_sales_csv, NA_VALUES};
