//! Entry routes - Payments and receipts recorded against a title
//!
//! Structure:
//! - api.rs: JSON API and HTMX mutations
//! - page.rs: Entries section of the title detail page

pub mod api;
pub mod page;

pub use api::{
    api_entry,
    api_entry_create,
    api_entry_delete,
    api_entry_update,
    api_title_entries,
    htmx_entry_delete,
    htmx_entry_store,
};
pub use page::{entries_section, render_entries_section};
