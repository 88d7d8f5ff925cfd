//! DRE page rendering

use super::api::{detail_filter, dre_query};
use crate::{esc, page_response, ApiError, AppState, HtmxError};
use accountflow_core::reports::{monthly_chart, summary_bars, DreAccountRow, DreMonthRow};
use accountflow_core::{DetailFilter, DreReport};
use accountflow_store::{FlowKind, PaymentMethod};
use axum::extract::{Query, State};
use axum::response::Html;
use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

const METHODS: [(PaymentMethod, &str); 4] = [
    (PaymentMethod::Pix, "Pix"),
    (PaymentMethod::Cash, "Dinheiro"),
    (PaymentMethod::Debit, "Débito"),
    (PaymentMethod::Credit, "Crédito"),
];

fn selected(flag: bool) -> &'static str {
    if flag {
        " selected"
    } else {
        ""
    }
}

fn signed_class(value: Decimal) -> &'static str {
    if value.is_sign_negative() && !value.is_zero() {
        "text-red-600"
    } else {
        "text-green-600"
    }
}

/// `2024-03` as `03/2024`
fn month_label(month: &str) -> String {
    match month.split_once('-') {
        Some((year, month)) => format!("{}/{}", month, year),
        None => month.to_string(),
    }
}

fn render_totals(state: &AppState, report: &DreReport) -> String {
    let totals = &report.totals;
    let (revenue_pct, expense_pct) = summary_bars(totals);
    format!(
        r#"<div class='grid grid-cols-3 gap-4 mb-6'>
            <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Receitas</p><p class='text-xl font-bold text-green-700'>{revenues}</p></div>
            <div class='bg-red-50 p-4 rounded-lg border border-red-200'><p class='text-sm text-red-600'>Despesas</p><p class='text-xl font-bold text-red-700'>{expenses}</p></div>
            <div class='bg-white p-4 rounded-lg border'><p class='text-sm text-gray-600'>Resultado</p><p class='text-xl font-bold {result_class}'>{result}</p></div>
        </div>
        <div class='space-y-2 mb-6'>
            <div class='flex items-center gap-2 text-sm'><span class='w-20'>Receitas</span><div class='flex-1 bg-gray-100 rounded h-3'><div class='bg-green-500 h-3 rounded' style='width: {revenue_pct}%'></div></div></div>
            <div class='flex items-center gap-2 text-sm'><span class='w-20'>Despesas</span><div class='flex-1 bg-gray-100 rounded h-3'><div class='bg-red-500 h-3 rounded' style='width: {expense_pct}%'></div></div></div>
        </div>"#,
        revenues = state.money(totals.revenues),
        expenses = state.money(totals.expenses),
        result = state.money(totals.result),
        result_class = signed_class(totals.result),
        revenue_pct = revenue_pct,
        expense_pct = expense_pct,
    )
}

fn render_classic(state: &AppState, report: &DreReport) -> String {
    let c = &report.classic;
    let lines = [
        ("Receita total", c.revenue, false),
        ("(-) Custos variáveis", c.variable_costs, false),
        ("= Margem de contribuição", c.contribution_margin, true),
        ("(-) Custos fixos", c.fixed_costs, false),
        ("= Resultado operacional líquido", c.operating_result, true),
        ("(-) Investimentos", c.investments, false),
        ("(-) Amortizações", c.amortizations, false),
        ("= Resultado final", c.final_result, true),
    ];
    let rows: String = lines
        .iter()
        .map(|(label, value, subtotal)| {
            let weight = if *subtotal { " font-semibold bg-gray-50" } else { "" };
            format!(
                "<tr class='border-b{}'><td class='px-4 py-2'>{}</td><td class='px-4 py-2 text-right'>{}</td></tr>",
                weight,
                label,
                state.money(*value)
            )
        })
        .collect();
    format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>DRE clássica</h3>
            <table class='w-full text-sm'><tbody>{}</tbody></table>
        </div>"#,
        rows
    )
}

fn render_by_account(state: &AppState, rows: &[DreAccountRow]) -> String {
    let body: String = rows
        .iter()
        .map(|row| {
            format!(
                r#"<tr class='border-b'>
                    <td class='px-4 py-2 font-mono'>{code}</td><td class='px-4 py-2'>{name}</td>
                    <td class='px-4 py-2 text-right text-green-600'>{income}</td>
                    <td class='px-4 py-2 text-right text-red-600'>{expense}</td>
                    <td class='px-4 py-2 text-right font-medium {class}'>{total}</td>
                </tr>"#,
                code = esc(&row.code),
                name = esc(&row.name),
                income = state.money(row.income),
                expense = state.money(row.expense),
                class = signed_class(row.total),
                total = state.money(row.total),
            )
        })
        .collect();
    format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Por conta</h3>
            <table class='w-full text-sm'>
                <thead><tr class='text-left text-gray-500 border-b'><th class='px-4 py-2'>Código</th><th class='px-4 py-2'>Conta</th><th class='px-4 py-2 text-right'>Receitas</th><th class='px-4 py-2 text-right'>Despesas</th><th class='px-4 py-2 text-right'>Total</th></tr></thead>
                <tbody>{}</tbody>
            </table>
        </div>"#,
        body
    )
}

fn render_chart(monthly: &[DreMonthRow]) -> String {
    let Some(chart) = monthly_chart(monthly) else {
        return String::new();
    };
    let labels: String = chart
        .labels
        .iter()
        .map(|(x, month)| {
            format!(
                "<text x='{:.1}' y='{}' font-size='10' text-anchor='middle' fill='#6b7280'>{}</text>",
                x,
                chart.height - 4,
                esc(&month_label(month))
            )
        })
        .collect();
    format!(
        r#"<svg viewBox='0 0 {w} {h}' class='w-full h-40 mb-4'>
            <line x1='{pad}' x2='{line_end}' y1='{zero:.1}' y2='{zero:.1}' stroke='#d1d5db' stroke-dasharray='4'/>
            <path d='{path}' fill='none' stroke='#4f46e5' stroke-width='2'/>
            {labels}
        </svg>"#,
        w = chart.width,
        h = chart.height,
        pad = chart.padding,
        line_end = chart.width - chart.padding,
        zero = chart.zero_y,
        path = chart.path,
        labels = labels,
    )
}

fn render_monthly(state: &AppState, rows: &[DreMonthRow]) -> String {
    let body: String = rows
        .iter()
        .map(|row| {
            format!(
                r#"<tr class='border-b'>
                    <td class='px-4 py-2'>{month}</td>
                    <td class='px-4 py-2 text-right text-green-600'>{revenues}</td>
                    <td class='px-4 py-2 text-right text-red-600'>{expenses}</td>
                    <td class='px-4 py-2 text-right font-medium {class}'>{result}</td>
                </tr>"#,
                month = esc(&month_label(&row.month)),
                revenues = state.money(row.revenues),
                expenses = state.money(row.expenses),
                class = signed_class(row.result),
                result = state.money(row.result),
            )
        })
        .collect();
    format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Por mês</h3>
            {chart}
            <table class='w-full text-sm'>
                <thead><tr class='text-left text-gray-500 border-b'><th class='px-4 py-2'>Mês</th><th class='px-4 py-2 text-right'>Receitas</th><th class='px-4 py-2 text-right'>Despesas</th><th class='px-4 py-2 text-right'>Resultado</th></tr></thead>
                <tbody>{body}</tbody>
            </table>
        </div>"#,
        chart = render_chart(rows),
        body = body
    )
}

fn render_details(state: &AppState, report: &DreReport, filter: &DetailFilter) -> String {
    let kind_options: String = [FlowKind::Income, FlowKind::Expense]
        .iter()
        .map(|k| format!("<option value='{}'{}>{}</option>", k, selected(filter.kind == Some(*k)), k.label()))
        .collect();
    let method_options: String = METHODS
        .iter()
        .map(|(m, label)| format!("<option value='{}'{}>{}</option>", m, selected(filter.method == Some(*m)), label))
        .collect();
    let top_options: String = report
        .top_levels()
        .iter()
        .map(|name| {
            format!(
                "<option value='{0}'{1}>{0}</option>",
                esc(name),
                selected(filter.top_level.as_deref() == Some(name.as_str()))
            )
        })
        .collect();

    let days = report.filtered_details(filter);
    let days_html: String = if days.is_empty() {
        "<p class='text-center text-gray-500 py-4'>Nenhum lançamento no período</p>".to_string()
    } else {
        days.iter()
            .map(|day| {
                let items: String = day
                    .items
                    .iter()
                    .map(|item| {
                        let class = match item.kind {
                            FlowKind::Income => "text-green-600",
                            FlowKind::Expense => "text-red-600",
                        };
                        format!(
                            r#"<tr class='border-b'>
                                <td class='px-4 py-1'>{title}</td>
                                <td class='px-4 py-1 font-mono text-xs'>{code} {account}</td>
                                <td class='px-4 py-1'>{method}</td>
                                <td class='px-4 py-1 text-right {class}'>{amount}</td>
                            </tr>"#,
                            title = esc(&item.title_desc),
                            code = esc(&item.account_code),
                            account = esc(&item.account_name),
                            method = METHODS
                                .iter()
                                .find(|(m, _)| *m == item.payment_method)
                                .map_or("-", |(_, label)| *label),
                            class = class,
                            amount = state.money(item.amount),
                        )
                    })
                    .collect();
                format!(
                    r#"<div class='mb-4'>
                        <div class='flex justify-between text-sm font-semibold bg-gray-50 px-4 py-2'>
                            <span>{date}</span><span class='{class}'>{result}</span>
                        </div>
                        <table class='w-full text-sm'><tbody>{items}</tbody></table>
                    </div>"#,
                    date = day.date.format("%d/%m/%Y"),
                    class = signed_class(day.totals.result),
                    result = state.money(day.totals.result),
                    items = items,
                )
            })
            .collect()
    };

    format!(
        r#"<div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>Detalhamento diário</h3>
            <div id='dre-detail-filter' class='flex gap-3 mb-4'>
                <select name='detail_kind' class='px-3 py-2 border rounded-lg bg-white' hx-get='/reports/dre/results' hx-include='#dre-form, #dre-detail-filter' hx-target='#dre-results' hx-swap='outerHTML'>
                    <option value=''>Todos os tipos</option>{kind_options}
                </select>
                <select name='detail_method' class='px-3 py-2 border rounded-lg bg-white' hx-get='/reports/dre/results' hx-include='#dre-form, #dre-detail-filter' hx-target='#dre-results' hx-swap='outerHTML'>
                    <option value=''>Todas as formas</option>{method_options}
                </select>
                <select name='detail_top' class='px-3 py-2 border rounded-lg bg-white' hx-get='/reports/dre/results' hx-include='#dre-form, #dre-detail-filter' hx-target='#dre-results' hx-swap='outerHTML'>
                    <option value=''>Todas as contas</option>{top_options}
                </select>
            </div>
            {days}
        </div>"#,
        kind_options = kind_options,
        method_options = method_options,
        top_options = top_options,
        days = days_html,
    )
}

/// Results fragment swapped into `#dre-results`
pub fn render_dre_results(state: &AppState, report: &DreReport, filter: &DetailFilter) -> String {
    let mut html = String::from("<div id='dre-results'>");
    html.push_str(&render_totals(state, report));
    html.push_str(&render_classic(state, report));
    if let Some(rows) = &report.by_account {
        html.push_str(&render_by_account(state, rows));
    }
    if let Some(rows) = &report.monthly {
        html.push_str(&render_monthly(state, rows));
    }
    html.push_str(&render_details(state, report, filter));
    html.push_str("</div>");
    html
}

pub async fn htmx_dre_results(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, HtmxError> {
    let query = dre_query(&params)?;
    let filter = detail_filter(&params)?;
    let report = state.flow.dre_report(&query).await?;
    Ok(Html(render_dre_results(&state, &report, &filter)))
}

/// Whole years spanned by the company's titles, or the current year
async fn default_period(state: &AppState, company: Option<&str>) -> Result<(NaiveDate, NaiveDate), ApiError> {
    let titles = state.flow.titles().await?;
    let years: Vec<i32> = titles
        .iter()
        .filter(|t| company.map_or(true, |c| t.company == c))
        .map(|t| t.expiration_date.year())
        .collect();
    let current = Utc::now().year();
    let first = years.iter().copied().min().unwrap_or(current);
    let last = years.iter().copied().max().unwrap_or(current);
    let start = NaiveDate::from_ymd_opt(first, 1, 1);
    let end = NaiveDate::from_ymd_opt(last, 12, 31);
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(ApiError::InternalError {
            message: format!("Invalid report period {}-{}", first, last),
        }),
    }
}

pub async fn page_dre(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
    headers: axum::http::HeaderMap,
) -> Result<Html<String>, ApiError> {
    let companies = state.flow.companies().await?;
    let chosen = params
        .get("company")
        .filter(|c| !c.is_empty())
        .cloned()
        .or_else(|| companies.first().map(|c| c.id.clone()));
    let (start, end) = default_period(&state, chosen.as_deref()).await?;

    let company_options: String = companies
        .iter()
        .map(|c| {
            format!(
                "<option value='{}'{}>{}</option>",
                esc(&c.id),
                selected(chosen.as_deref() == Some(c.id.as_str())),
                esc(&c.fantasy_name)
            )
        })
        .collect();

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>DRE</h2><p class='text-gray-500'>Demonstrativo de resultado por período</p></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <form id='dre-form' hx-get='/reports/dre/results' hx-target='#dre-results' hx-swap='outerHTML' class='grid grid-cols-1 md:grid-cols-5 gap-4 items-end'>
                <label class='text-sm text-gray-600'>Empresa
                    <select name='company' class='w-full px-3 py-2 border rounded-lg bg-white'><option value=''>Selecione...</option>{company_options}</select>
                </label>
                <label class='text-sm text-gray-600'>Início<input name='start' type='date' value='{start}' class='w-full px-3 py-2 border rounded-lg'></label>
                <label class='text-sm text-gray-600'>Fim<input name='end' type='date' value='{end}' class='w-full px-3 py-2 border rounded-lg'></label>
                <label class='text-sm text-gray-600'>Agrupar
                    <select name='group' class='w-full px-3 py-2 border rounded-lg bg-white'>
                        <option value=''>Somente totais</option><option value='account'>Por conta</option><option value='month'>Por mês</option>
                    </select>
                </label>
                <button class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Gerar</button>
            </form>
        </div>
        <div id='dre-results' class='text-center text-gray-500 py-8'>Escolha a empresa e o período</div>"#,
        company_options = company_options,
        start = start.format("%Y-%m-%d"),
        end = end.format("%Y-%m-%d"),
    );

    Ok(Html(page_response(&headers, "DRE", "/reports/dre", &inner_content)))
}
