//! Record types and persistence for accountflow
//!
//! The application treats persistence as a collaborator: everything above this
//! crate talks to an [`AccountFlowStore`]. The bundled [`MemoryStore`] keeps
//! the records in memory and mirrors them to a JSON snapshot file.

use async_trait::async_trait;
use std::sync::Arc;

pub mod error;
pub mod memory;
pub mod records;
pub mod seed;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use records::{
    Address, BillingAccount, BillingPlan, Company, Entry, HistoryPreset, StoreData, Title,
};
pub use types::{AccountType, CompanyKind, FlowKind, PaymentMethod, RecurrencePeriod};

/// Store reference type
pub type StoreRef = Arc<dyn AccountFlowStore>;

// ==================== Store Trait ====================

/// Persistence operations for every resource.
///
/// Lists keep insertion order, except entries which come newest payment
/// first. `update_*` and `delete_*` fail with [`StoreError::NotFound`] for
/// unknown ids. Deleting a plan removes its accounts and presets, deleting a
/// title removes its entries and deleting a company removes its titles.
#[async_trait]
pub trait AccountFlowStore: Send + Sync {
    async fn billing_plans(&self) -> StoreResult<Vec<BillingPlan>>;
    async fn billing_plan(&self, id: &str) -> StoreResult<BillingPlan>;
    async fn create_billing_plan(&self, plan: BillingPlan) -> StoreResult<BillingPlan>;
    async fn update_billing_plan(&self, plan: BillingPlan) -> StoreResult<BillingPlan>;
    async fn delete_billing_plan(&self, id: &str) -> StoreResult<()>;

    /// Flat list of the accounts of one plan
    async fn billing_accounts(&self, plan_id: &str) -> StoreResult<Vec<BillingAccount>>;
    async fn billing_account(&self, id: &str) -> StoreResult<BillingAccount>;
    async fn create_billing_account(&self, account: BillingAccount) -> StoreResult<BillingAccount>;
    async fn update_billing_account(&self, account: BillingAccount) -> StoreResult<BillingAccount>;
    async fn delete_billing_account(&self, id: &str) -> StoreResult<()>;

    async fn presets(&self) -> StoreResult<Vec<HistoryPreset>>;
    async fn preset(&self, id: &str) -> StoreResult<HistoryPreset>;
    async fn create_preset(&self, preset: HistoryPreset) -> StoreResult<HistoryPreset>;
    async fn update_preset(&self, preset: HistoryPreset) -> StoreResult<HistoryPreset>;
    async fn delete_preset(&self, id: &str) -> StoreResult<()>;

    async fn titles(&self) -> StoreResult<Vec<Title>>;
    async fn title(&self, id: &str) -> StoreResult<Title>;
    async fn create_title(&self, title: Title) -> StoreResult<Title>;
    async fn update_title(&self, title: Title) -> StoreResult<Title>;
    async fn delete_title(&self, id: &str) -> StoreResult<()>;

    /// Entries of one title, newest `paid_at` first
    async fn entries_by_title(&self, title_id: &str) -> StoreResult<Vec<Entry>>;
    async fn entries(&self) -> StoreResult<Vec<Entry>>;
    async fn entry(&self, id: &str) -> StoreResult<Entry>;
    async fn create_entry(&self, entry: Entry) -> StoreResult<Entry>;
    async fn update_entry(&self, entry: Entry) -> StoreResult<Entry>;
    async fn delete_entry(&self, id: &str) -> StoreResult<()>;

    async fn companies(&self) -> StoreResult<Vec<Company>>;
    async fn company(&self, id: &str) -> StoreResult<Company>;
    async fn create_company(&self, company: Company) -> StoreResult<Company>;
    async fn update_company(&self, company: Company) -> StoreResult<Company>;
    async fn delete_company(&self, id: &str) -> StoreResult<()>;
}
