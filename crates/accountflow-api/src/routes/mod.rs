//! Route modules for the API server
//!
//! All routes are organized into modules for better maintainability:
//! - billing_plans: Billing plan list and forms
//! - accounts: Account tree of a plan, expandable rows, account forms
//! - presets: History presets
//! - titles: Titles list and detail page
//! - entries: Entries of a title
//! - companies: Company registry
//! - reports: DRE report
//! - settings: Settings page
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints and HTMX mutations
//! - page.rs: HTMX page rendering

pub mod accounts;
pub mod billing_plans;
pub mod companies;
pub mod entries;
pub mod presets;
pub mod reports;
pub mod settings;
pub mod titles;
