pub mod rate_fetcher;
pub mod reporter;
pub mod table_writer;

pub use rate_fetcher::{FetchRate, RateFetcher};
pub use reporter::{Alert, AlertType, LogReporter, Reporter, TaskSummary};
pub use table_writer::TableWriter;
