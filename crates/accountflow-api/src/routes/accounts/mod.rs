//! Account routes - Chart-of-accounts tree of a billing plan
//!
//! Features:
//! - Tree table with expandable/collapsible rows
//! - Expanded rows carried in the `open` query parameter
//! - Expand all / collapse all and local search
//! - Create, edit (rename, retype, move) and delete accounts
//! - Parent selector limited to valid parents
//!
//! Structure:
//! - api.rs: JSON API and HTMX mutations
//! - page.rs: Full page and fragment rendering

pub mod api;
pub mod page;

pub use api::{
    api_account,
    api_account_create,
    api_account_delete,
    api_account_update,
    api_plan_accounts,
    api_plan_parent_options,
    api_plan_tree,
    htmx_account_delete,
    htmx_account_store,
    htmx_account_update,
};
pub use page::{
    htmx_account_edit_form,
    htmx_account_rows,
    page_billing_plan_accounts,
    render_account_form,
    render_account_tree,
    TreeView,
};
