//! Title routes - Receivables and payables
//!
//! Features:
//! - Title list with search and type filter
//! - Create and delete titles from the list page
//! - Detail page with balance and the entries section
//!
//! Structure:
//! - api.rs: JSON API and HTMX mutations
//! - page.rs: Full page and list rendering

pub mod api;
pub mod page;

pub use api::{
    api_title,
    api_title_balance,
    api_title_create,
    api_title_delete,
    api_title_update,
    api_titles,
    htmx_title_delete,
    htmx_title_store,
};
pub use page::{htmx_titles_list, page_title_detail, page_titles, render_titles_list, TitleFilter};
