//! DRE (income statement) aggregation and chart helpers

use accountflow_store::{BillingAccount, Entry, FlowKind, PaymentMethod, Title};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{CoreError, CoreResult};

/// Breakdown requested alongside the totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DreGrouping {
    Account,
    Month,
}

impl std::str::FromStr for DreGrouping {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "account" => Ok(DreGrouping::Account),
            "month" => Ok(DreGrouping::Month),
            _ => Err(format!("Invalid grouping: {}", s)),
        }
    }
}

impl std::fmt::Display for DreGrouping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DreGrouping::Account => write!(f, "account"),
            DreGrouping::Month => write!(f, "month"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreQuery {
    pub company: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub group: Option<DreGrouping>,
}

impl DreQuery {
    pub fn validate(&self) -> CoreResult<()> {
        if self.company.trim().is_empty() {
            return Err(CoreError::validation("Select a company"));
        }
        if self.start > self.end {
            return Err(CoreError::validation("Start date must not be after end date"));
        }
        Ok(())
    }

    fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DreTotals {
    pub revenues: Decimal,
    pub expenses: Decimal,
    pub result: Decimal,
}

impl DreTotals {
    fn add(&mut self, kind: FlowKind, amount: Decimal) {
        match kind {
            FlowKind::Income => self.revenues += amount,
            FlowKind::Expense => self.expenses += amount,
        }
        self.result = self.revenues - self.expenses;
    }

    fn rounded(self) -> Self {
        Self {
            revenues: self.revenues.round_dp(2),
            expenses: self.expenses.round_dp(2),
            result: self.result.round_dp(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreAccountRow {
    pub code: String,
    pub name: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreMonthRow {
    /// `YYYY-MM`
    pub month: String,
    pub revenues: Decimal,
    pub expenses: Decimal,
    pub result: Decimal,
}

/// Classic income statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassicStatement {
    #[serde(rename = "receita_total")]
    pub revenue: Decimal,
    #[serde(rename = "custos_variaveis")]
    pub variable_costs: Decimal,
    #[serde(rename = "margem_contribuicao")]
    pub contribution_margin: Decimal,
    #[serde(rename = "custos_fixos")]
    pub fixed_costs: Decimal,
    #[serde(rename = "resultado_operacional_liquido")]
    pub operating_result: Decimal,
    #[serde(rename = "investimentos")]
    pub investments: Decimal,
    #[serde(rename = "amortizacoes")]
    pub amortizations: Decimal,
    #[serde(rename = "resultado_final")]
    pub final_result: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CostBucket {
    Variable,
    Fixed,
    Investment,
    Amortization,
}

impl CostBucket {
    /// Bucket from the names on the account's ancestor chain
    fn classify(names: &[String]) -> Self {
        let has = |needles: &[&str]| {
            names
                .iter()
                .any(|n| needles.iter().any(|needle| n.to_uppercase().contains(needle)))
        };
        if has(&["INVEST"]) {
            CostBucket::Investment
        } else if has(&["AMORTIZ", "DEPRECIA"]) {
            CostBucket::Amortization
        } else if has(&["VARI", "CUSTO"]) {
            CostBucket::Variable
        } else {
            CostBucket::Fixed
        }
    }
}

/// One paid entry in the daily detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreDetail {
    pub paid_at: NaiveDate,
    #[serde(rename = "type")]
    pub kind: FlowKind,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub account_code: String,
    pub account_name: String,
    /// Name of the root account of the entry's account
    pub top_level: String,
    pub title_desc: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreReport {
    pub company: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub totals: DreTotals,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_account: Option<Vec<DreAccountRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly: Option<Vec<DreMonthRow>>,
    pub classic: ClassicStatement,
    pub details_by_day: BTreeMap<NaiveDate, Vec<DreDetail>>,
}

struct AccountInfo<'a> {
    account: &'a BillingAccount,
    /// Names from the account up to its root
    chain: Vec<String>,
}

fn account_chains(accounts: &[BillingAccount]) -> HashMap<&str, AccountInfo<'_>> {
    let by_id: HashMap<&str, &BillingAccount> = accounts.iter().map(|a| (a.id.as_str(), a)).collect();
    accounts
        .iter()
        .map(|account| {
            let mut chain = vec![account.name.clone()];
            let mut seen = HashSet::from([account.id.as_str()]);
            let mut current = account.parent_id.as_deref();
            while let Some(parent) = current.and_then(|id| by_id.get(id)) {
                if !seen.insert(parent.id.as_str()) {
                    break;
                }
                chain.push(parent.name.clone());
                current = parent.parent_id.as_deref();
            }
            (account.id.as_str(), AccountInfo { account, chain })
        })
        .collect()
}

/// Aggregate the paid entries of `query.company` within the period.
///
/// `accounts` is every billing account the entries may reference.
pub fn compute_dre(
    query: &DreQuery,
    titles: &[Title],
    entries: &[Entry],
    accounts: &[BillingAccount],
) -> CoreResult<DreReport> {
    query.validate()?;

    let company_titles: HashMap<&str, &Title> = titles
        .iter()
        .filter(|t| t.company == query.company)
        .map(|t| (t.id.as_str(), t))
        .collect();
    let chains = account_chains(accounts);

    let mut totals = DreTotals::default();
    // Codes repeat across plans, so rows are keyed by code and account id
    let mut by_account: BTreeMap<(String, String), DreAccountRow> = BTreeMap::new();
    let mut monthly: BTreeMap<String, DreTotals> = BTreeMap::new();
    let mut classic = ClassicStatement::default();
    let mut details: BTreeMap<NaiveDate, Vec<DreDetail>> = BTreeMap::new();

    for entry in entries {
        let Some(paid_at) = entry.paid_at.filter(|d| query.contains(*d)) else {
            continue;
        };
        let Some(title) = company_titles.get(entry.title.as_str()) else {
            continue;
        };
        let info = entry
            .billing_account
            .as_deref()
            .and_then(|id| chains.get(id));

        totals.add(entry.kind, entry.amount);
        monthly
            .entry(paid_at.format("%Y-%m").to_string())
            .or_default()
            .add(entry.kind, entry.amount);

        let (account_id, code, name) = match info {
            Some(info) => (
                info.account.id.clone(),
                info.account.code.clone(),
                info.account.name.clone(),
            ),
            None => (String::new(), "-".to_string(), "Sem conta".to_string()),
        };
        let row = by_account.entry((code.clone(), account_id)).or_insert_with(|| DreAccountRow {
            code: code.clone(),
            name: name.clone(),
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            total: Decimal::ZERO,
        });
        match entry.kind {
            FlowKind::Income => row.income += entry.amount,
            FlowKind::Expense => row.expense += entry.amount,
        }
        row.total = row.income - row.expense;

        if entry.kind == FlowKind::Expense {
            let chain = info.map(|i| i.chain.as_slice()).unwrap_or(&[]);
            match CostBucket::classify(chain) {
                CostBucket::Variable => classic.variable_costs += entry.amount,
                CostBucket::Fixed => classic.fixed_costs += entry.amount,
                CostBucket::Investment => classic.investments += entry.amount,
                CostBucket::Amortization => classic.amortizations += entry.amount,
            }
        }

        details.entry(paid_at).or_default().push(DreDetail {
            paid_at,
            kind: entry.kind,
            amount: entry.amount,
            payment_method: entry.payment_method,
            account_code: code,
            account_name: name,
            top_level: info
                .and_then(|i| i.chain.last().cloned())
                .unwrap_or_default(),
            title_desc: title.description.clone(),
        });
    }

    classic.revenue = totals.revenues;
    classic.contribution_margin = classic.revenue - classic.variable_costs;
    classic.operating_result = classic.contribution_margin - classic.fixed_costs;
    classic.final_result = classic.operating_result - classic.investments - classic.amortizations;
    let classic = ClassicStatement {
        revenue: classic.revenue.round_dp(2),
        variable_costs: classic.variable_costs.round_dp(2),
        contribution_margin: classic.contribution_margin.round_dp(2),
        fixed_costs: classic.fixed_costs.round_dp(2),
        operating_result: classic.operating_result.round_dp(2),
        investments: classic.investments.round_dp(2),
        amortizations: classic.amortizations.round_dp(2),
        final_result: classic.final_result.round_dp(2),
    };

    let by_account = (query.group == Some(DreGrouping::Account)).then(|| {
        by_account
            .into_values()
            .map(|row| DreAccountRow {
                income: row.income.round_dp(2),
                expense: row.expense.round_dp(2),
                total: row.total.round_dp(2),
                ..row
            })
            .collect()
    });
    let monthly = (query.group == Some(DreGrouping::Month)).then(|| {
        monthly
            .into_iter()
            .map(|(month, t)| {
                let t = t.rounded();
                DreMonthRow {
                    month,
                    revenues: t.revenues,
                    expenses: t.expenses,
                    result: t.result,
                }
            })
            .collect()
    });

    log::debug!(
        target: "accountflow::reports",
        "DRE for {} from {} to {}: {} day(s) with entries",
        query.company,
        query.start,
        query.end,
        details.len()
    );

    Ok(DreReport {
        company: query.company.clone(),
        start: query.start,
        end: query.end,
        totals: totals.rounded(),
        by_account,
        monthly,
        classic,
        details_by_day: details,
    })
}

// ==================== Detail filtering ====================

/// Filters of the daily detail tab, `None` meaning "all"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailFilter {
    #[serde(default)]
    pub kind: Option<FlowKind>,
    #[serde(default)]
    pub method: Option<PaymentMethod>,
    #[serde(default)]
    pub top_level: Option<String>,
}

impl DetailFilter {
    pub fn matches(&self, detail: &DreDetail) -> bool {
        self.kind.map_or(true, |k| k == detail.kind)
            && self.method.map_or(true, |m| m == detail.payment_method)
            && self
                .top_level
                .as_deref()
                .map_or(true, |t| t == detail.top_level)
    }
}

/// Entries of one day after filtering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDetails {
    pub date: NaiveDate,
    pub items: Vec<DreDetail>,
    pub totals: DreTotals,
}

impl DreReport {
    /// Days with at least one entry passing `filter`, oldest first
    pub fn filtered_details(&self, filter: &DetailFilter) -> Vec<DayDetails> {
        self.details_by_day
            .iter()
            .filter_map(|(date, items)| {
                let items: Vec<DreDetail> = items.iter().filter(|d| filter.matches(d)).cloned().collect();
                if items.is_empty() {
                    return None;
                }
                let mut totals = DreTotals::default();
                for item in &items {
                    totals.add(item.kind, item.amount);
                }
                Some(DayDetails {
                    date: *date,
                    items,
                    totals: totals.rounded(),
                })
            })
            .collect()
    }

    /// Distinct top-level account names in the detail, sorted
    pub fn top_levels(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .details_by_day
            .values()
            .flatten()
            .map(|d| d.top_level.clone())
            .filter(|t| !t.is_empty())
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();
        names.dedup();
        names
    }
}

// ==================== Charts ====================

/// Revenue and expense bar lengths, in percent of the larger one
pub fn summary_bars(totals: &DreTotals) -> (u32, u32) {
    let revenue = totals.revenues.max(Decimal::ZERO);
    let expense = totals.expenses.abs();
    let mut max = revenue.max(expense);
    if max.is_zero() {
        max = Decimal::ONE;
    }
    let pct = |v: Decimal| {
        (v * Decimal::from(100) / max)
            .round()
            .to_u32()
            .unwrap_or(0)
    };
    (pct(revenue), pct(expense))
}

/// SVG line chart of the monthly results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPath {
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    /// `M x y L x y ...`
    pub path: String,
    /// Month labels with their x position
    pub labels: Vec<(f64, String)>,
    /// y position of the zero line
    pub zero_y: f64,
}

pub const CHART_HEIGHT: u32 = 160;
pub const CHART_PADDING: u32 = 20;

fn coord(v: f64) -> String {
    let text = format!("{:.2}", v);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

pub fn monthly_chart(monthly: &[DreMonthRow]) -> Option<ChartPath> {
    if monthly.is_empty() {
        return None;
    }
    let points: Vec<f64> = monthly
        .iter()
        .map(|m| m.result.to_f64().unwrap_or(0.0))
        .collect();
    let width = 300.max(monthly.len() as u32 * 60);
    let (w, h, pad) = (width as f64, CHART_HEIGHT as f64, CHART_PADDING as f64);
    let min_y = points.iter().cloned().fold(0.0_f64, f64::min);
    let max_y = points.iter().cloned().fold(0.0_f64, f64::max);
    let range = if max_y - min_y == 0.0 { 1.0 } else { max_y - min_y };
    let x_step = (w - pad * 2.0) / (points.len().saturating_sub(1).max(1)) as f64;
    let to_x = |i: usize| pad + i as f64 * x_step;
    let to_y = |v: f64| pad + (h - pad * 2.0) * (1.0 - (v - min_y) / range);

    let path = points
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{} {} {}", if i == 0 { "M" } else { "L" }, coord(to_x(i)), coord(to_y(*v))))
        .collect::<Vec<_>>()
        .join(" ");

    Some(ChartPath {
        width,
        height: CHART_HEIGHT,
        padding: CHART_PADDING,
        path,
        labels: monthly
            .iter()
            .enumerate()
            .map(|(i, m)| (to_x(i), m.month.clone()))
            .collect(),
        zero_y: to_y(0.0),
    })
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use accountflow_store::AccountType;
    use chrono::Utc;
    use std::str::FromStr;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn account(id: &str, parent: Option<&str>, code: &str, name: &str) -> BillingAccount {
        BillingAccount {
            id: id.to_string(),
            name: name.to_string(),
            code: code.to_string(),
            degree: code.split('.').count() as u8,
            account_type: AccountType::Analytic,
            parent_id: parent.map(str::to_string),
            billing_plan: "p".to_string(),
        }
    }

    fn title(id: &str, company: &str) -> Title {
        Title {
            id: id.to_string(),
            description: format!("Title {}", id),
            kind: FlowKind::Income,
            amount: dec("1"),
            expiration_date: d(1, 1),
            fees_percentage_monthly: None,
            installments: None,
            active: true,
            recurrence: false,
            recurrence_period: None,
            company: company.to_string(),
            preset: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn entry(title: &str, kind: FlowKind, amount: &str, paid_at: Option<NaiveDate>, account: Option<&str>) -> Entry {
        Entry {
            id: accountflow_utils::generate_id(),
            title: title.to_string(),
            description: String::new(),
            kind,
            amount: dec(amount),
            paid_at,
            payment_method: PaymentMethod::Pix,
            billing_account: account.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    fn fixture() -> (Vec<Title>, Vec<Entry>, Vec<BillingAccount>) {
        let accounts = vec![
            account("r", None, "1", "RECEITAS"),
            account("serv", Some("r"), "1.1", "SERVIÇOS"),
            account("d", None, "2", "DESPESAS"),
            account("cv", Some("d"), "2.1", "CUSTOS VARIÁVEIS"),
            account("mp", Some("cv"), "2.1.1", "MATÉRIA-PRIMA"),
            account("adm", Some("d"), "2.2", "ADMINISTRATIVAS"),
            account("inv", Some("d"), "2.3", "INVESTIMENTOS"),
            account("dep", Some("d"), "2.4", "DEPRECIAÇÃO"),
        ];
        let titles = vec![title("t1", "c1"), title("t2", "c2")];
        let entries = vec![
            entry("t1", FlowKind::Income, "1000.00", Some(d(1, 5)), Some("serv")),
            entry("t1", FlowKind::Income, "500.00", Some(d(2, 3)), Some("serv")),
            entry("t1", FlowKind::Expense, "200.00", Some(d(1, 5)), Some("mp")),
            entry("t1", FlowKind::Expense, "300.00", Some(d(2, 10)), Some("adm")),
            entry("t1", FlowKind::Expense, "100.00", Some(d(2, 11)), Some("inv")),
            entry("t1", FlowKind::Expense, "50.00", Some(d(2, 12)), Some("dep")),
            entry("t1", FlowKind::Expense, "25.00", Some(d(2, 12)), None),
            // unpaid, out of range and other company
            entry("t1", FlowKind::Income, "999.00", None, Some("serv")),
            entry("t1", FlowKind::Income, "999.00", Some(d(4, 1)), Some("serv")),
            entry("t2", FlowKind::Income, "999.00", Some(d(1, 5)), Some("serv")),
        ];
        (titles, entries, accounts)
    }

    fn query(group: Option<DreGrouping>) -> DreQuery {
        DreQuery {
            company: "c1".to_string(),
            start: d(1, 1),
            end: d(3, 31),
            group,
        }
    }

    #[test]
    fn test_query_validation() {
        let mut q = query(None);
        q.start = d(5, 1);
        assert!(q.validate().is_err());
        let mut q = query(None);
        q.company = " ".to_string();
        assert!(q.validate().is_err());
        assert_eq!("Month".parse::<DreGrouping>().unwrap(), DreGrouping::Month);
    }

    #[test]
    fn test_totals_filter_company_period_and_unpaid() {
        let (titles, entries, accounts) = fixture();
        let report = compute_dre(&query(None), &titles, &entries, &accounts).unwrap();
        assert_eq!(report.totals.revenues, dec("1500.00"));
        assert_eq!(report.totals.expenses, dec("675.00"));
        assert_eq!(report.totals.result, dec("825.00"));
        assert!(report.by_account.is_none());
        assert!(report.monthly.is_none());
    }

    #[test]
    fn test_monthly_rows_sum_to_totals() {
        let (titles, entries, accounts) = fixture();
        let report = compute_dre(&query(Some(DreGrouping::Month)), &titles, &entries, &accounts).unwrap();
        let monthly = report.monthly.unwrap();
        assert_eq!(
            monthly.iter().map(|m| m.month.as_str()).collect::<Vec<_>>(),
            vec!["2024-01", "2024-02"]
        );
        assert_eq!(monthly[0].result, dec("800.00"));
        let revenues: Decimal = monthly.iter().map(|m| m.revenues).sum();
        let expenses: Decimal = monthly.iter().map(|m| m.expenses).sum();
        assert_eq!(revenues, report.totals.revenues);
        assert_eq!(expenses, report.totals.expenses);
    }

    #[test]
    fn test_by_account_rows() {
        let (titles, entries, accounts) = fixture();
        let report = compute_dre(&query(Some(DreGrouping::Account)), &titles, &entries, &accounts).unwrap();
        let rows = report.by_account.unwrap();
        let codes: Vec<&str> = rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["-", "1.1", "2.1.1", "2.2", "2.3", "2.4"]);
        assert_eq!(rows[0].expense, dec("25.00"));
        assert_eq!(rows[1].income, dec("1500.00"));
        let total: Decimal = rows.iter().map(|r| r.total).sum();
        assert_eq!(total, report.totals.result);
    }

    #[test]
    fn test_by_account_keeps_same_code_from_other_plans_apart() {
        let mut sales = account("a1", None, "1", "VENDAS");
        sales.billing_plan = "p1".to_string();
        let mut rents = account("b1", None, "1", "ALUGUEIS");
        rents.billing_plan = "p2".to_string();
        let titles = vec![title("t1", "c1")];
        let entries = vec![
            entry("t1", FlowKind::Income, "100.00", Some(d(1, 5)), Some("a1")),
            entry("t1", FlowKind::Income, "50.00", Some(d(1, 6)), Some("b1")),
        ];
        let report = compute_dre(&query(Some(DreGrouping::Account)), &titles, &entries, &[sales, rents]).unwrap();
        let rows = report.by_account.unwrap();
        let rows: Vec<(&str, &str, Decimal)> = rows
            .iter()
            .map(|r| (r.code.as_str(), r.name.as_str(), r.income))
            .collect();
        assert_eq!(
            rows,
            vec![("1", "VENDAS", dec("100.00")), ("1", "ALUGUEIS", dec("50.00"))]
        );
    }

    #[test]
    fn test_classic_statement_buckets() {
        let (titles, entries, accounts) = fixture();
        let report = compute_dre(&query(None), &titles, &entries, &accounts).unwrap();
        let c = report.classic;
        assert_eq!(c.revenue, dec("1500.00"));
        assert_eq!(c.variable_costs, dec("200.00"));
        assert_eq!(c.contribution_margin, dec("1300.00"));
        assert_eq!(c.fixed_costs, dec("325.00"));
        assert_eq!(c.operating_result, dec("975.00"));
        assert_eq!(c.investments, dec("100.00"));
        assert_eq!(c.amortizations, dec("50.00"));
        assert_eq!(c.final_result, report.totals.result);
    }

    #[test]
    fn test_classic_serializes_with_statement_names() {
        let json = serde_json::to_value(ClassicStatement::default()).unwrap();
        assert!(json.get("margem_contribuicao").is_some());
        assert!(json.get("resultado_final").is_some());
    }

    #[test]
    fn test_details_by_day_and_filters() {
        let (titles, entries, accounts) = fixture();
        let report = compute_dre(&query(None), &titles, &entries, &accounts).unwrap();
        assert_eq!(report.details_by_day.len(), 5);
        let first = &report.details_by_day[&d(1, 5)];
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].top_level, "DESPESAS");
        assert_eq!(first[1].title_desc, "Title t1");

        assert_eq!(report.top_levels(), vec!["DESPESAS", "RECEITAS"]);

        let filter = DetailFilter {
            kind: Some(FlowKind::Expense),
            top_level: Some("DESPESAS".to_string()),
            ..Default::default()
        };
        let days = report.filtered_details(&filter);
        assert_eq!(days.len(), 4);
        assert_eq!(days[0].totals.expenses, dec("200.00"));
        assert_eq!(days[0].totals.result, dec("-200.00"));

        let none = DetailFilter {
            method: Some(PaymentMethod::Cash),
            ..Default::default()
        };
        assert!(report.filtered_details(&none).is_empty());
    }

    #[test]
    fn test_summary_bars() {
        let totals = DreTotals {
            revenues: dec("200"),
            expenses: dec("50"),
            result: dec("150"),
        };
        assert_eq!(summary_bars(&totals), (100, 25));
        assert_eq!(summary_bars(&DreTotals::default()), (0, 0));
    }

    #[test]
    fn test_monthly_chart_path() {
        assert!(monthly_chart(&[]).is_none());

        let rows = vec![
            DreMonthRow {
                month: "2024-01".to_string(),
                revenues: dec("100"),
                expenses: Decimal::ZERO,
                result: dec("100"),
            },
            DreMonthRow {
                month: "2024-02".to_string(),
                revenues: Decimal::ZERO,
                expenses: dec("50"),
                result: dec("-50"),
            },
        ];
        let chart = monthly_chart(&rows).unwrap();
        assert_eq!(chart.width, 300);
        assert_eq!(chart.height, 160);
        assert_eq!(chart.path, "M 20 20 L 280 140");
        assert_eq!(chart.labels[1], (280.0, "2024-02".to_string()));
        assert!((chart.zero_y - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_chart_widens_with_months() {
        let rows: Vec<DreMonthRow> = (1..=8)
            .map(|m| DreMonthRow {
                month: format!("2024-{:02}", m),
                revenues: Decimal::ZERO,
                expenses: Decimal::ZERO,
                result: Decimal::ZERO,
            })
            .collect();
        assert_eq!(monthly_chart(&rows).unwrap().width, 480);
    }
}
