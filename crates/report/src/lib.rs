pub mod csv;
pub mod format;

pub use csv::{write_report, ReportError, HEADER};
pub use format::{format_amount, format_date};
