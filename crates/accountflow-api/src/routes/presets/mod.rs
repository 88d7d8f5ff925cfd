//! History preset routes
//!
//! Structure:
//! - api.rs: JSON API and HTMX mutations
//! - page.rs: Page, list and account selector rendering

pub mod api;
pub mod page;

pub use api::{
    api_preset,
    api_preset_create,
    api_preset_delete,
    api_preset_update,
    api_presets,
    htmx_preset_delete,
    htmx_preset_store,
};
pub use page::{htmx_preset_account_fields, page_presets, presets_list, render_presets_list};
