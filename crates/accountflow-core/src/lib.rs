//! Core business logic for accountflow
//!
//! [`AccountFlow`] mediates between the web layer and the store: it validates
//! payloads, keeps the chart-of-accounts invariants (codes, degrees, parent
//! types) and builds the DRE report.

pub mod error;
pub mod hierarchy;
pub mod models;
pub mod reports;

use accountflow_config::Config;
use accountflow_store::{
    AccountType, BillingAccount, BillingPlan, Company, Entry, HistoryPreset, StoreRef, Title,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger, ErrorSeverity};
pub use hierarchy::{AccountNode, ExpandedSet, ParentOption, RenderOptions, TreeRow};
pub use models::{
    BillingAccountPayload, BillingPlanPayload, CompanyPayload, EntryPayload, HistoryPresetPayload,
    TitlePayload,
};
pub use reports::{DetailFilter, DreGrouping, DreQuery, DreReport};

/// Error logger reference type
pub type ErrorLoggerRef = Arc<dyn ErrorLogger>;

/// Counters shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub billing_plans: usize,
    pub billing_accounts: usize,
    pub presets: usize,
    pub titles: usize,
    pub active_titles: usize,
    pub entries: usize,
    pub companies: usize,
}

/// Paid and open amounts of a title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleBalance {
    pub title: String,
    pub amount: Decimal,
    pub paid: Decimal,
    pub open: Decimal,
    pub entries: usize,
}

/// Keep the items whose fields contain `query`, case-insensitively
pub fn search<T>(items: Vec<T>, query: &str, fields: impl Fn(&T) -> Vec<&str>) -> Vec<T> {
    let query = query.trim();
    if query.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|item| {
            fields(item)
                .into_iter()
                .any(|f| accountflow_utils::matches_search(f, query))
        })
        .collect()
}

/// Application service
pub struct AccountFlow {
    store: StoreRef,
    config: Config,
    logger: ErrorLoggerRef,
}

impl AccountFlow {
    pub fn new(store: StoreRef, config: Config) -> Self {
        Self {
            store,
            config,
            logger: Arc::new(DefaultErrorLogger),
        }
    }

    pub fn with_logger(mut self, logger: ErrorLoggerRef) -> Self {
        self.logger = logger;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &StoreRef {
        &self.store
    }

    fn max_degree(&self) -> u8 {
        self.config.hierarchy.max_degree
    }

    /// Log a failed mutation and hand the error back
    fn logged<T>(&self, operation: &str, id: &str, result: CoreResult<T>) -> CoreResult<T> {
        if let Err(ref error) = result {
            let context = ErrorContext::new(operation).with_data("id", serde_json::json!(id));
            self.logger.log_error(error, &context);
        }
        result
    }

    pub async fn summary(&self) -> CoreResult<DashboardSummary> {
        let plans = self.store.billing_plans().await?;
        let mut billing_accounts = 0;
        for plan in &plans {
            billing_accounts += self.store.billing_accounts(&plan.id).await?.len();
        }
        let titles = self.store.titles().await?;
        Ok(DashboardSummary {
            billing_plans: plans.len(),
            billing_accounts,
            presets: self.store.presets().await?.len(),
            active_titles: titles.iter().filter(|t| t.active).count(),
            titles: titles.len(),
            entries: self.store.entries().await?.len(),
            companies: self.store.companies().await?.len(),
        })
    }

    // ==================== Billing plans ====================

    pub async fn billing_plans(&self) -> CoreResult<Vec<BillingPlan>> {
        Ok(self.store.billing_plans().await?)
    }

    pub async fn billing_plan(&self, id: &str) -> CoreResult<BillingPlan> {
        Ok(self.store.billing_plan(id).await?)
    }

    pub async fn create_billing_plan(&self, payload: BillingPlanPayload) -> CoreResult<BillingPlan> {
        let result: CoreResult<BillingPlan> = async {
            payload.validate()?;
            let plan = self.store.create_billing_plan(payload.into_record(None)).await?;
            log::info!(target: "accountflow::core", "Created billing plan {} ({})", plan.name, plan.id);
            Ok(plan)
        }
        .await;
        self.logged("create_billing_plan", "", result)
    }

    pub async fn update_billing_plan(&self, id: &str, payload: BillingPlanPayload) -> CoreResult<BillingPlan> {
        let result: CoreResult<BillingPlan> = async {
            payload.validate()?;
            self.store.billing_plan(id).await?;
            Ok(self
                .store
                .update_billing_plan(payload.into_record(Some(id.to_string())))
                .await?)
        }
        .await;
        self.logged("update_billing_plan", id, result)
    }

    /// Delete a plan together with its accounts and presets
    pub async fn delete_billing_plan(&self, id: &str) -> CoreResult<()> {
        let result: CoreResult<()> = async {
            self.store.delete_billing_plan(id).await?;
            log::info!(target: "accountflow::core", "Deleted billing plan {}", id);
            Ok(())
        }
        .await;
        self.logged("delete_billing_plan", id, result)
    }

    // ==================== Billing accounts ====================

    /// Flat accounts of a plan, in stored order
    pub async fn billing_accounts(&self, plan_id: &str) -> CoreResult<Vec<BillingAccount>> {
        self.store.billing_plan(plan_id).await?;
        Ok(self.store.billing_accounts(plan_id).await?)
    }

    pub async fn billing_account(&self, id: &str) -> CoreResult<BillingAccount> {
        Ok(self.store.billing_account(id).await?)
    }

    /// Accounts of a plan rebuilt into a forest
    pub async fn account_tree(&self, plan_id: &str) -> CoreResult<Vec<AccountNode>> {
        let accounts = self.billing_accounts(plan_id).await?;
        hierarchy::build_tree(&accounts)
    }

    /// Parent candidates for the account forms of a plan
    pub async fn parent_options(&self, plan_id: &str, exclude: Option<&str>) -> CoreResult<Vec<ParentOption>> {
        let forest = self.account_tree(plan_id).await?;
        Ok(hierarchy::parent_options_with(
            &forest,
            0,
            &self.config.hierarchy.option_marker,
            self.max_degree(),
            exclude,
        ))
    }

    /// Create an account with a generated code and degree. An Analytic parent
    /// becomes Synthetic.
    pub async fn create_billing_account(&self, payload: BillingAccountPayload) -> CoreResult<BillingAccount> {
        let result: CoreResult<BillingAccount> = async {
            payload.validate()?;
            let forest = self.account_tree(&payload.billing_plan).await?;
            let placement = hierarchy::plan_new_account(payload.parent(), &forest, self.max_degree())?;
            let parent = payload
                .parent()
                .and_then(|id| hierarchy::find_node(&forest, id))
                .map(|node| node.account.clone());

            let account = payload.into_record(placement.code.into_string(), placement.degree);
            let account = self.store.create_billing_account(account).await?;
            if let Some(parent) = parent {
                self.mark_synthetic(parent).await?;
            }
            log::info!(
                target: "accountflow::core",
                "Created account {} {} (degree {})",
                account.code,
                account.name,
                account.degree
            );
            Ok(account)
        }
        .await;
        self.logged("create_billing_account", "", result)
    }

    async fn mark_synthetic(&self, mut parent: BillingAccount) -> CoreResult<()> {
        if parent.account_type != AccountType::Synthetic {
            parent.account_type = AccountType::Synthetic;
            log::debug!(target: "accountflow::core", "Account {} is now synthetic", parent.code);
            self.store.update_billing_account(parent).await?;
        }
        Ok(())
    }

    /// Write a relocated subtree, moved account first. When a write fails the
    /// accounts already written get their previous code, degree and parent back.
    async fn write_relocated(&self, forest: &[AccountNode], moved: Vec<BillingAccount>) -> CoreResult<Vec<BillingAccount>> {
        let mut written: Vec<BillingAccount> = Vec::with_capacity(moved.len());
        for account in moved {
            let account_id = account.id.clone();
            match self.store.update_billing_account(account).await {
                Ok(saved) => written.push(saved),
                Err(error) => {
                    for saved in written.iter().rev() {
                        let Some(original) = hierarchy::find_node(forest, &saved.id) else {
                            continue;
                        };
                        if let Err(e) = self.store.update_billing_account(original.account.clone()).await {
                            log::error!(
                                target: "accountflow::core",
                                "Could not restore account {} after a failed move: {}",
                                saved.id,
                                e
                            );
                        }
                    }
                    log::warn!(
                        target: "accountflow::core",
                        "Move rolled back at account {}: {}",
                        account_id,
                        error
                    );
                    return Err(error.into());
                }
            }
        }
        Ok(written)
    }

    /// Rename or retype an account. A new parent moves the whole subtree and
    /// regenerates its codes and degrees.
    pub async fn update_billing_account(&self, id: &str, payload: BillingAccountPayload) -> CoreResult<BillingAccount> {
        let result: CoreResult<BillingAccount> = async {
            payload.validate()?;
            let existing = self.store.billing_account(id).await?;
            if existing.billing_plan != payload.billing_plan {
                return Err(CoreError::validation("An account cannot move to another billing plan"));
            }
            let forest = self.account_tree(&existing.billing_plan).await?;
            let has_children = hierarchy::find_node(&forest, id).map_or(false, |n| !n.children.is_empty());
            let account_type = payload.account_type.unwrap_or(existing.account_type);
            if has_children && account_type == AccountType::Analytic {
                return Err(CoreError::validation("Accounts with children must be synthetic"));
            }

            let new_parent = payload.parent().map(str::to_string);
            if new_parent == existing.parent_id {
                let mut updated = existing;
                updated.name = accountflow_utils::normalize_name(&payload.name);
                updated.account_type = account_type;
                return Ok(self.store.update_billing_account(updated).await?);
            }

            let mut moved = hierarchy::relocate(&forest, id, new_parent.as_deref(), self.max_degree())?;
            if let Some(root) = moved.first_mut() {
                root.name = accountflow_utils::normalize_name(&payload.name);
                root.account_type = account_type;
            }
            let root = self
                .write_relocated(&forest, moved)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| CoreError::InternalError {
                    message: "relocation returned no account".to_string(),
                })?;
            if let Some(parent) = new_parent.as_deref().and_then(|p| hierarchy::find_node(&forest, p)) {
                self.mark_synthetic(parent.account.clone()).await?;
            }
            log::info!(target: "accountflow::core", "Moved account {} to {}", existing.code, root.code);
            Ok(root)
        }
        .await;
        self.logged("update_billing_account", id, result)
    }

    /// Delete a leaf account
    pub async fn delete_billing_account(&self, id: &str) -> CoreResult<()> {
        let result: CoreResult<()> = async {
            let account = self.store.billing_account(id).await?;
            let children = self
                .store
                .billing_accounts(&account.billing_plan)
                .await?
                .iter()
                .filter(|a| a.parent_id.as_deref() == Some(id))
                .count();
            if children > 0 {
                return Err(CoreError::HasChildren {
                    id: id.to_string(),
                    count: children,
                });
            }
            self.store.delete_billing_account(id).await?;
            log::info!(target: "accountflow::core", "Deleted account {} {}", account.code, account.name);
            Ok(())
        }
        .await;
        self.logged("delete_billing_account", id, result)
    }

    // ==================== History presets ====================

    pub async fn presets(&self) -> CoreResult<Vec<HistoryPreset>> {
        Ok(self.store.presets().await?)
    }

    pub async fn preset(&self, id: &str) -> CoreResult<HistoryPreset> {
        Ok(self.store.preset(id).await?)
    }

    async fn check_preset(&self, payload: &HistoryPresetPayload) -> CoreResult<()> {
        payload.validate()?;
        let accounts = self.billing_accounts(&payload.billing_plan).await?;
        for id in payload.accounts().iter().flatten() {
            if !accounts.iter().any(|a| &a.id == id) {
                return Err(CoreError::validation(format!(
                    "Account {} does not belong to the selected billing plan",
                    id
                )));
            }
        }
        Ok(())
    }

    pub async fn create_preset(&self, payload: HistoryPresetPayload) -> CoreResult<HistoryPreset> {
        let result: CoreResult<HistoryPreset> = async {
            self.check_preset(&payload).await?;
            Ok(self.store.create_preset(payload.into_record(None)).await?)
        }
        .await;
        self.logged("create_preset", "", result)
    }

    pub async fn update_preset(&self, id: &str, payload: HistoryPresetPayload) -> CoreResult<HistoryPreset> {
        let result: CoreResult<HistoryPreset> = async {
            self.store.preset(id).await?;
            self.check_preset(&payload).await?;
            Ok(self.store.update_preset(payload.into_record(Some(id.to_string()))).await?)
        }
        .await;
        self.logged("update_preset", id, result)
    }

    pub async fn delete_preset(&self, id: &str) -> CoreResult<()> {
        let result = self.store.delete_preset(id).await.map_err(CoreError::from);
        self.logged("delete_preset", id, result)
    }

    // ==================== Titles ====================

    pub async fn titles(&self) -> CoreResult<Vec<Title>> {
        Ok(self.store.titles().await?)
    }

    pub async fn title(&self, id: &str) -> CoreResult<Title> {
        Ok(self.store.title(id).await?)
    }

    async fn check_title(&self, payload: &TitlePayload) -> CoreResult<()> {
        payload.validate()?;
        self.store.company(&payload.company).await?;
        if let Some(preset) = payload.preset.as_deref().filter(|p| !p.trim().is_empty()) {
            self.store.preset(preset).await?;
        }
        Ok(())
    }

    pub async fn create_title(&self, payload: TitlePayload) -> CoreResult<Title> {
        let result: CoreResult<Title> = async {
            self.check_title(&payload).await?;
            let title = self.store.create_title(payload.into_record(None)).await?;
            log::info!(target: "accountflow::core", "Created title {} ({})", title.description, title.id);
            Ok(title)
        }
        .await;
        self.logged("create_title", "", result)
    }

    pub async fn update_title(&self, id: &str, payload: TitlePayload) -> CoreResult<Title> {
        let result: CoreResult<Title> = async {
            let existing = self.store.title(id).await?;
            self.check_title(&payload).await?;
            Ok(self.store.update_title(payload.into_record(Some(&existing))).await?)
        }
        .await;
        self.logged("update_title", id, result)
    }

    /// Delete a title and its entries
    pub async fn delete_title(&self, id: &str) -> CoreResult<()> {
        let result = self.store.delete_title(id).await.map_err(CoreError::from);
        self.logged("delete_title", id, result)
    }

    pub async fn title_balance(&self, id: &str) -> CoreResult<TitleBalance> {
        let title = self.store.title(id).await?;
        let entries = self.store.entries_by_title(id).await?;
        let paid: Decimal = entries
            .iter()
            .filter(|e| e.paid_at.is_some())
            .map(|e| e.amount)
            .sum();
        Ok(TitleBalance {
            title: title.id,
            amount: title.amount,
            paid,
            open: (title.amount - paid).max(Decimal::ZERO),
            entries: entries.len(),
        })
    }

    // ==================== Entries ====================

    /// Entries of a title, newest payment first
    pub async fn entries_by_title(&self, title_id: &str) -> CoreResult<Vec<Entry>> {
        self.store.title(title_id).await?;
        Ok(self.store.entries_by_title(title_id).await?)
    }

    pub async fn entry(&self, id: &str) -> CoreResult<Entry> {
        Ok(self.store.entry(id).await?)
    }

    async fn check_entry(&self, payload: &EntryPayload) -> CoreResult<Title> {
        payload.validate()?;
        let title = self.store.title(&payload.title).await?;
        if let Some(account) = payload.billing_account.as_deref().filter(|a| !a.trim().is_empty()) {
            self.store.billing_account(account).await?;
        }
        Ok(title)
    }

    pub async fn create_entry(&self, payload: EntryPayload) -> CoreResult<Entry> {
        let result: CoreResult<Entry> = async {
            let title = self.check_entry(&payload).await?;
            Ok(self.store.create_entry(payload.into_record(&title, None)).await?)
        }
        .await;
        self.logged("create_entry", "", result)
    }

    pub async fn update_entry(&self, id: &str, payload: EntryPayload) -> CoreResult<Entry> {
        let result: CoreResult<Entry> = async {
            let existing = self.store.entry(id).await?;
            let title = self.check_entry(&payload).await?;
            Ok(self
                .store
                .update_entry(payload.into_record(&title, Some(&existing)))
                .await?)
        }
        .await;
        self.logged("update_entry", id, result)
    }

    pub async fn delete_entry(&self, id: &str) -> CoreResult<()> {
        let result = self.store.delete_entry(id).await.map_err(CoreError::from);
        self.logged("delete_entry", id, result)
    }

    // ==================== Companies ====================

    pub async fn companies(&self) -> CoreResult<Vec<Company>> {
        Ok(self.store.companies().await?)
    }

    pub async fn company(&self, id: &str) -> CoreResult<Company> {
        Ok(self.store.company(id).await?)
    }

    pub async fn create_company(&self, payload: CompanyPayload) -> CoreResult<Company> {
        let result: CoreResult<Company> = async {
            payload.validate()?;
            let company = self.store.create_company(payload.into_record(None)).await?;
            log::info!(target: "accountflow::core", "Created company {} ({})", company.fantasy_name, company.id);
            Ok(company)
        }
        .await;
        self.logged("create_company", "", result)
    }

    pub async fn update_company(&self, id: &str, payload: CompanyPayload) -> CoreResult<Company> {
        let result: CoreResult<Company> = async {
            payload.validate()?;
            self.store.company(id).await?;
            Ok(self
                .store
                .update_company(payload.into_record(Some(id.to_string())))
                .await?)
        }
        .await;
        self.logged("update_company", id, result)
    }

    /// Delete a company with its titles and their entries
    pub async fn delete_company(&self, id: &str) -> CoreResult<()> {
        let result = self.store.delete_company(id).await.map_err(CoreError::from);
        self.logged("delete_company", id, result)
    }

    // ==================== Reports ====================

    pub async fn dre_report(&self, query: &DreQuery) -> CoreResult<DreReport> {
        query.validate()?;
        self.store.company(&query.company).await?;
        let titles = self.store.titles().await?;
        let entries = self.store.entries().await?;
        let mut accounts = Vec::new();
        for plan in self.store.billing_plans().await? {
            accounts.extend(self.store.billing_accounts(&plan.id).await?);
        }
        reports::compute_dre(query, &titles, &entries, &accounts)
    }
}

// ==================== Tests ====================
