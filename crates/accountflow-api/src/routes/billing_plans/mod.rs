//! Billing plan routes - Plan list and CRUD
//!
//! Structure:
//! - api.rs: JSON API and HTMX mutations
//! - page.rs: Full page and list fragment rendering

pub mod api;
pub mod page;

pub use api::{
    api_billing_plan,
    api_billing_plan_create,
    api_billing_plan_delete,
    api_billing_plan_update,
    api_billing_plans,
    htmx_billing_plan_delete,
    htmx_billing_plan_store,
};
pub use page::{htmx_billing_plans_list, page_billing_plans, render_plans_list};
