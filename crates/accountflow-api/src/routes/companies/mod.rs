//! Company routes - Clients and suppliers
//!
//! Structure:
//! - api.rs: JSON API and HTMX mutations
//! - page.rs: Page and list rendering

pub mod api;
pub mod page;

pub use api::{
    api_companies,
    api_company,
    api_company_create,
    api_company_delete,
    api_company_update,
    htmx_company_delete,
    htmx_company_store,
};
pub use page::{htmx_companies_list, page_companies, render_companies_list};
