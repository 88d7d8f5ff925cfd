//! Report routes - DRE (income statement)
//!
//! Features:
//! - Totals, revenue/expense bars and the classic statement
//! - Optional breakdown by account or by month (with a line chart)
//! - Daily detail filtered by type, payment method and top-level account
//!
//! Structure:
//! - api.rs: JSON report and query parsing
//! - page.rs: Report form and HTMX results fragment

pub mod api;
pub mod page;

pub use api::{api_dre, detail_filter, dre_query};
pub use page::{htmx_dre_results, page_dre, render_dre_results};
