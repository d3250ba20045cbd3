pub mod profile_extractor;
pub mod report_filter;
pub mod report_writer;

pub use profile_extractor::{extract_profile, ProfileDocument};
pub use report_filter::{read_report, ReportFilter};
pub use report_writer::{render_csv, render_table, ReportWriter, WriteOutcome};
