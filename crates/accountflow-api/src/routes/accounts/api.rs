//! Account API endpoints - JSON API and HTMX mutations

use super::page::{render_account_form, render_account_tree, TreeView};
use crate::form::FormData;
use crate::{with_toast, ApiError, AppState, HtmxError};
use accountflow_core::hierarchy::ExpandedSet;
use accountflow_core::{AccountNode, BillingAccountPayload, ParentOption};
use accountflow_store::BillingAccount;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use std::collections::HashMap;

/// Flat accounts of a plan, optionally filtered by `q` (JSON API)
pub async fn api_plan_accounts(
    state: State<AppState>,
    path: Path<String>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<Vec<BillingAccount>>, ApiError> {
    let accounts = state.flow.billing_accounts(&path.0).await?;
    let query = params.get("q").map(|s| s.as_str()).unwrap_or("");
    Ok(Json(accountflow_core::search(accounts, query, |a| {
        vec![a.name.as_str(), a.code.as_str()]
    })))
}

/// Accounts of a plan as a forest (JSON API)
pub async fn api_plan_tree(state: State<AppState>, path: Path<String>) -> Result<Json<Vec<AccountNode>>, ApiError> {
    Ok(Json(state.flow.account_tree(&path.0).await?))
}

/// Parent candidates, `exclude` leaves out an account and its subtree (JSON API)
pub async fn api_plan_parent_options(
    state: State<AppState>,
    path: Path<String>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<Vec<ParentOption>>, ApiError> {
    let exclude = params.get("exclude").map(|s| s.as_str()).filter(|s| !s.is_empty());
    Ok(Json(state.flow.parent_options(&path.0, exclude).await?))
}

pub async fn api_account(state: State<AppState>, path: Path<String>) -> Result<Json<BillingAccount>, ApiError> {
    Ok(Json(state.flow.billing_account(&path.0).await?))
}

pub async fn api_account_create(
    state: State<AppState>,
    Json(payload): Json<BillingAccountPayload>,
) -> Result<(StatusCode, Json<BillingAccount>), ApiError> {
    let account = state.flow.create_billing_account(payload).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn api_account_update(
    state: State<AppState>,
    path: Path<String>,
    Json(payload): Json<BillingAccountPayload>,
) -> Result<Json<BillingAccount>, ApiError> {
    Ok(Json(state.flow.update_billing_account(&path.0, payload).await?))
}

pub async fn api_account_delete(state: State<AppState>, path: Path<String>) -> Result<StatusCode, ApiError> {
    state.flow.delete_billing_account(&path.0).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn account_payload(form: &FormData, plan_id: &str) -> Result<BillingAccountPayload, ApiError> {
    Ok(BillingAccountPayload {
        name: form.get("name").to_string(),
        billing_plan: plan_id.to_string(),
        parent_id: form.opt("parent_id"),
        account_type: form.parse_opt("account_type", "account type")?,
    })
}

/// Tree and a fresh create form after a mutation
async fn refreshed(state: &AppState, plan_id: &str, open: ExpandedSet, message: &str) -> Result<Html<String>, HtmxError> {
    let forest = state.flow.account_tree(plan_id).await?;
    let options = state.flow.parent_options(plan_id, None).await?;
    let view = TreeView {
        plan_id: plan_id.to_string(),
        open,
        search: String::new(),
    };
    let fragment = format!(
        "{}{}",
        render_account_tree(state, &view, &forest),
        render_account_form(plan_id, &options, None, &view.open, true)
    );
    Ok(Html(with_toast(&fragment, message)))
}

fn open_set(value: &str) -> ExpandedSet {
    value.parse().unwrap_or_default()
}

/// HTMX: create an account in a plan. The new account's parent is expanded
/// so it shows up in the tree.
pub async fn htmx_account_store(
    state: State<AppState>,
    path: Path<String>,
    body: String,
) -> Result<Html<String>, HtmxError> {
    let form = FormData::parse(&body);
    let account = state.flow.create_billing_account(account_payload(&form, &path.0)?).await?;
    let mut open = open_set(form.get("open"));
    if let Some(parent) = &account.parent_id {
        open.insert(parent.clone());
    }
    refreshed(
        &state,
        &path.0,
        open,
        &format!("Conta {} - {} criada", account.code, account.name),
    )
    .await
}

/// HTMX: rename, retype or move an account
pub async fn htmx_account_update(
    state: State<AppState>,
    path: Path<String>,
    body: String,
) -> Result<Html<String>, HtmxError> {
    let form = FormData::parse(&body);
    let existing = state.flow.billing_account(&path.0).await?;
    let payload = account_payload(&form, &existing.billing_plan)?;
    let account = state.flow.update_billing_account(&path.0, payload).await?;
    let mut open = open_set(form.get("open"));
    if let Some(parent) = &account.parent_id {
        open.insert(parent.clone());
    }
    refreshed(
        &state,
        &account.billing_plan,
        open,
        &format!("Conta {} - {} atualizada", account.code, account.name),
    )
    .await
}

/// HTMX: delete a leaf account
pub async fn htmx_account_delete(
    state: State<AppState>,
    path: Path<String>,
    params: Query<HashMap<String, String>>,
) -> Result<Html<String>, HtmxError> {
    let account = state.flow.billing_account(&path.0).await?;
    state.flow.delete_billing_account(&path.0).await?;
    let open = open_set(params.get("open").map(|s| s.as_str()).unwrap_or(""));
    refreshed(
        &state,
        &account.billing_plan,
        open,
        &format!("Conta {} removida", account.code),
    )
    .await
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use crate::AppState;
    use accountflow_store::{AccountType, BillingAccount};
    use axum::http::StatusCode;
    use serde_json::json;

    async fn by_code(state: &AppState, code: &str) -> BillingAccount {
        let plan = demo_plan(state).await;
        state
            .flow
            .billing_accounts(&plan.id)
            .await
            .unwrap()
            .into_iter()
            .find(|a| a.code == code)
            .unwrap()
    }

    #[tokio::test]
    async fn test_json_create_generates_code_and_flips_parent() {
        let state = demo_state();
        let plan = demo_plan(&state).await;
        let recebimentos = by_code(&state, "1.3").await;
        assert_eq!(recebimentos.account_type, AccountType::Analytic);

        let (status, account) = json(
            &state,
            "POST",
            "/api/billing-accounts",
            json!({ "name": "clientes", "billing_plan": plan.id, "parent_id": recebimentos.id }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(account["code"], "1.3.1");
        assert_eq!(account["degree"], 3);
        assert_eq!(account["name"], "CLIENTES");
        assert_eq!(by_code(&state, "1.3").await.account_type, AccountType::Synthetic);
    }

    #[tokio::test]
    async fn test_json_tree_and_parent_options() {
        let state = demo_state();
        let plan = demo_plan(&state).await;
        let (_, tree) = json(&state, "GET", &format!("/api/billing-plans/{}/tree", plan.id), json!(null)).await;
        let roots = tree.as_array().unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0]["code"], "1");
        assert_eq!(roots[0]["children"].as_array().unwrap().len(), 3);

        let receitas = by_code(&state, "1").await;
        let (_, options) = json(
            &state,
            "GET",
            &format!("/api/billing-plans/{}/parent-options?exclude={}", plan.id, receitas.id),
            json!(null),
        )
        .await;
        let labels: Vec<&str> = options.as_array().unwrap().iter().map(|o| o["label"].as_str().unwrap()).collect();
        assert_eq!(labels[0], " 2 - DESPESAS");
        assert!(labels.iter().all(|l| !l.contains("RECEITAS")));
    }

    #[tokio::test]
    async fn test_json_delete_with_children_conflicts() {
        let state = demo_state();
        let receitas = by_code(&state, "1").await;
        let (status, error) = json(&state, "DELETE", &format!("/api/billing-accounts/{}", receitas.id), json!(null)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error["code"], "HAS_CHILDREN");
    }

    #[tokio::test]
    async fn test_json_move_into_own_subtree_conflicts() {
        let state = demo_state();
        let plan = demo_plan(&state).await;
        let receitas = by_code(&state, "1").await;
        let servicos = by_code(&state, "1.1.1").await;
        let (status, error) = json(
            &state,
            "PUT",
            &format!("/api/billing-accounts/{}", receitas.id),
            json!({ "name": "RECEITAS", "billing_plan": plan.id, "parent_id": servicos.id, "account_type": "synthetic" }),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(error["code"], "CYCLIC_HIERARCHY");
    }

    #[tokio::test]
    async fn test_htmx_store_expands_parent_and_refreshes_form() {
        let state = demo_state();
        let plan = demo_plan(&state).await;
        let receitas = by_code(&state, "1").await;
        let form = format!("name=Outras+receitas&parent_id={}&account_type=analytic&open={}", receitas.id, receitas.id);
        let (status, html) = htmx(&state, "POST", &format!("/billing-plans/{}/accounts", plan.id), &form).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("OUTRAS RECEITAS"));
        assert!(html.contains("Conta 1.4 - OUTRAS RECEITAS criada"));
        assert!(html.contains("id='account-form' class='bg-white rounded-xl shadow-sm p-6 mb-6' hx-swap-oob='true'"));
    }

    #[tokio::test]
    async fn test_htmx_update_moves_subtree() {
        let state = demo_state();
        let despesas = by_code(&state, "2").await;
        let juros = by_code(&state, "1.2.1").await;
        let form = format!("name=juros+pagos&parent_id={}&account_type=analytic", despesas.id);
        let (status, html) = htmx(&state, "PUT", &format!("/billing-accounts/{}", juros.id), &form).await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Conta 2.4 - JUROS PAGOS atualizada"));
        let moved = by_code(&state, "2.4").await;
        assert_eq!(moved.id, juros.id);
        assert_eq!(moved.degree, 2);
    }

    #[tokio::test]
    async fn test_htmx_delete_leaf_and_reject_branch() {
        let state = demo_state();
        let juros = by_code(&state, "1.2.1").await;
        let (_, html) = htmx(&state, "DELETE", &format!("/billing-accounts/{}?open=", juros.id), "").await;
        assert!(html.contains("Conta 1.2.1 removida"));

        let receitas = by_code(&state, "1").await;
        let (status, html) = htmx(&state, "DELETE", &format!("/billing-accounts/{}", receitas.id), "").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("still has 3 child account(s)"));
        assert!(!html.contains("account-tree"));
    }
}
