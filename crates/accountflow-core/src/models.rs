//! Create/update payloads
//!
//! Each payload spells out required and optional fields and is checked with
//! `validate()` before anything reaches the store.

use accountflow_store::{
    AccountType, Address, BillingAccount, BillingPlan, Company, CompanyKind, Entry, FlowKind,
    HistoryPreset, PaymentMethod, RecurrencePeriod, Title,
};
use accountflow_utils::{generate_id, normalize_name};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

fn required(value: &str, field: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(format!("{} is required", field)));
    }
    Ok(())
}

fn cnpj_regex() -> &'static regex::Regex {
    static CNPJ: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    CNPJ.get_or_init(|| regex::Regex::new(r"^\d{2}\.?\d{3}\.?\d{3}/?\d{4}-?\d{2}$").unwrap())
}

fn email_regex() -> &'static regex::Regex {
    static EMAIL: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    EMAIL.get_or_init(|| regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

fn zip_regex() -> &'static regex::Regex {
    static ZIP: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    ZIP.get_or_init(|| regex::Regex::new(r"^\d{5}-?\d{3}$").unwrap())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// ==================== Billing plans ====================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingPlanPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl BillingPlanPayload {
    pub fn validate(&self) -> CoreResult<()> {
        required(&self.name, "Name")
    }

    pub fn into_record(self, id: Option<String>) -> BillingPlan {
        BillingPlan {
            id: id.unwrap_or_else(generate_id),
            name: normalize_name(&self.name),
            description: self.description.unwrap_or_default().trim().to_string(),
        }
    }
}

// ==================== Billing accounts ====================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingAccountPayload {
    pub name: String,
    pub billing_plan: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Defaults to Analytic on creation, unchanged on update
    #[serde(default)]
    pub account_type: Option<AccountType>,
}

impl BillingAccountPayload {
    pub fn validate(&self) -> CoreResult<()> {
        required(&self.name, "Name")?;
        required(&self.billing_plan, "Billing plan")
    }

    /// Parent id with blanks treated as "no parent"
    pub fn parent(&self) -> Option<&str> {
        self.parent_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    pub fn into_record(self, code: String, degree: u8) -> BillingAccount {
        let parent_id = self.parent().map(str::to_string);
        BillingAccount {
            id: generate_id(),
            name: normalize_name(&self.name),
            code,
            degree,
            account_type: self.account_type.unwrap_or_default(),
            parent_id,
            billing_plan: self.billing_plan,
        }
    }
}

// ==================== History presets ====================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryPresetPayload {
    pub name: String,
    pub billing_plan: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub payable_account: Option<String>,
    #[serde(default)]
    pub receivable_account: Option<String>,
    #[serde(default)]
    pub revenue_account: Option<String>,
    #[serde(default)]
    pub expense_account: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
}

impl HistoryPresetPayload {
    pub fn validate(&self) -> CoreResult<()> {
        required(&self.name, "Name")?;
        required(&self.billing_plan, "Billing plan")?;
        if self.accounts().iter().all(Option::is_none) {
            return Err(CoreError::validation("Select at least one account"));
        }
        Ok(())
    }

    /// Referenced account ids, blanks removed
    pub fn accounts(&self) -> [Option<String>; 4] {
        [
            non_empty(self.payable_account.clone()),
            non_empty(self.receivable_account.clone()),
            non_empty(self.revenue_account.clone()),
            non_empty(self.expense_account.clone()),
        ]
    }

    pub fn into_record(self, id: Option<String>) -> HistoryPreset {
        let [payable_account, receivable_account, revenue_account, expense_account] = self.accounts();
        HistoryPreset {
            id: id.unwrap_or_else(generate_id),
            name: normalize_name(&self.name),
            description: self.description.unwrap_or_default().trim().to_string(),
            billing_plan: self.billing_plan,
            payable_account,
            receivable_account,
            revenue_account,
            expense_account,
            active: self.active.unwrap_or(true),
        }
    }
}

// ==================== Titles ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitlePayload {
    pub description: String,
    pub kind: FlowKind,
    pub amount: Decimal,
    pub expiration_date: NaiveDate,
    pub company: String,
    #[serde(default)]
    pub fees_percentage_monthly: Option<Decimal>,
    #[serde(default)]
    pub installments: Option<u32>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub recurrence: bool,
    #[serde(default)]
    pub recurrence_period: Option<RecurrencePeriod>,
    #[serde(default)]
    pub preset: Option<String>,
}

impl TitlePayload {
    pub fn validate(&self) -> CoreResult<()> {
        required(&self.description, "Description")?;
        required(&self.company, "Company")?;
        if self.amount <= Decimal::ZERO {
            return Err(CoreError::validation("Amount must be greater than zero"));
        }
        if self.fees_percentage_monthly.map_or(false, |f| f < Decimal::ZERO) {
            return Err(CoreError::validation("Monthly fees cannot be negative"));
        }
        if self.installments == Some(0) {
            return Err(CoreError::validation("Installments must be at least 1"));
        }
        if self.recurrence && self.recurrence_period.is_none() {
            return Err(CoreError::validation("Recurring titles need a recurrence period"));
        }
        Ok(())
    }

    /// Build the record. `existing` keeps id and creation time on update.
    pub fn into_record(self, existing: Option<&Title>) -> Title {
        let now = Utc::now();
        Title {
            id: existing.map_or_else(generate_id, |t| t.id.clone()),
            description: self.description.trim().to_string(),
            kind: self.kind,
            amount: self.amount,
            expiration_date: self.expiration_date,
            fees_percentage_monthly: self.fees_percentage_monthly,
            installments: self.installments,
            active: self.active.unwrap_or(true),
            recurrence: self.recurrence,
            recurrence_period: if self.recurrence { self.recurrence_period } else { None },
            company: self.company,
            preset: non_empty(self.preset),
            created_at: existing.map_or(now, |t| t.created_at),
            updated_at: now,
        }
    }
}

// ==================== Entries ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPayload {
    pub title: String,
    pub amount: Decimal,
    /// Defaults to the title's kind
    #[serde(default)]
    pub kind: Option<FlowKind>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub paid_at: Option<NaiveDate>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub billing_account: Option<String>,
}

impl EntryPayload {
    pub fn validate(&self) -> CoreResult<()> {
        required(&self.title, "Title")?;
        if self.amount <= Decimal::ZERO {
            return Err(CoreError::validation("Amount must be greater than zero"));
        }
        Ok(())
    }

    pub fn into_record(self, title: &Title, existing: Option<&Entry>) -> Entry {
        Entry {
            id: existing.map_or_else(generate_id, |e| e.id.clone()),
            title: title.id.clone(),
            description: self.description.unwrap_or_default().trim().to_string(),
            kind: self.kind.unwrap_or(title.kind),
            amount: self.amount,
            paid_at: self.paid_at,
            payment_method: self.payment_method.unwrap_or_default(),
            billing_account: non_empty(self.billing_account),
            created_at: existing.map_or_else(Utc::now, |e| e.created_at),
        }
    }
}

// ==================== Companies ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyPayload {
    pub cnpj: String,
    pub fantasy_name: String,
    pub social_reason: String,
    pub opening_date: NaiveDate,
    pub address: Address,
    #[serde(default)]
    pub kind: CompanyKind,
    #[serde(default)]
    pub cnae: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl CompanyPayload {
    pub fn validate(&self) -> CoreResult<()> {
        required(&self.fantasy_name, "Fantasy name")?;
        required(&self.social_reason, "Social reason")?;
        if !cnpj_regex().is_match(self.cnpj.trim()) {
            return Err(CoreError::validation(format!("Invalid CNPJ: {}", self.cnpj)));
        }
        if let Some(email) = non_empty(self.email.clone()) {
            if !email_regex().is_match(&email) {
                return Err(CoreError::validation(format!("Invalid e-mail: {}", email)));
            }
        }
        let address = &self.address;
        if !zip_regex().is_match(address.zip_code.trim()) {
            return Err(CoreError::validation(format!("Invalid zip code: {}", address.zip_code)));
        }
        required(&address.street, "Street")?;
        required(&address.city, "City")?;
        if address.state.trim().chars().count() != 2 {
            return Err(CoreError::validation("State must be a two-letter code"));
        }
        Ok(())
    }

    pub fn into_record(self, id: Option<String>) -> Company {
        let mut address = self.address;
        address.state = address.state.trim().to_uppercase();
        address.complement = non_empty(address.complement);
        Company {
            id: id.unwrap_or_else(generate_id),
            cnpj: self.cnpj.trim().to_string(),
            fantasy_name: self.fantasy_name.trim().to_string(),
            social_reason: self.social_reason.trim().to_string(),
            opening_date: self.opening_date,
            cnae: self.cnae.unwrap_or_default().trim().to_string(),
            address,
            kind: self.kind,
            email: non_empty(self.email).unwrap_or_default(),
            phone: non_empty(self.phone).unwrap_or_default(),
        }
    }
}

// ==================== Tests ====================
