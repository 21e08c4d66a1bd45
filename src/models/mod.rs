pub mod loaders;
pub mod outcome;
pub mod table;

pub use loaders::load_table;
pub use outcome::{RowOutcome, RunOutcome, RunResult, Verdict};
pub use table::{CurrencyRow, Quote, Table, COL_CURRENCY, COL_DATE, COL_RATE};
