pub mod row_ctx;

pub use row_ctx::RowCtx;
