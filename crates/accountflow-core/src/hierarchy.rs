//! Chart-of-accounts hierarchy
//!
//! Accounts are persisted flat with a `parent_id` pointer. Everything that
//! needs the tree (listing pages, parent selectors, code generation) rebuilds
//! it with [`build_tree`] from the current flat list.

use accountflow_config::MAX_DEGREE;
use accountflow_store::{AccountType, BillingAccount};
use accountflow_utils::matches_search;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::{CoreError, CoreResult};

/// Default indentation per tree level, in pixels
pub const INDENT_UNIT: usize = 24;

/// Default marker repeated per level in parent selector labels
pub const OPTION_MARKER: &str = "--";

// ==================== Tree ====================

/// Account with its resolved children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountNode {
    #[serde(flatten)]
    pub account: BillingAccount,
    pub children: Vec<AccountNode>,
}

impl AccountNode {
    fn leaf(account: BillingAccount) -> Self {
        Self {
            account,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.account.id
    }

    /// Number of nodes in this subtree, including self
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(AccountNode::size).sum::<usize>()
    }

    /// Levels in this subtree, 1 for a leaf
    pub fn height(&self) -> u8 {
        1 + self.children.iter().map(AccountNode::height).max().unwrap_or(0)
    }
}

/// Total number of nodes in a forest
pub fn count_nodes(forest: &[AccountNode]) -> usize {
    forest.iter().map(AccountNode::size).sum()
}

/// Depth-first lookup by id
pub fn find_node<'a>(forest: &'a [AccountNode], id: &str) -> Option<&'a AccountNode> {
    for node in forest {
        if node.account.id == id {
            return Some(node);
        }
        if let Some(found) = find_node(&node.children, id) {
            return Some(found);
        }
    }
    None
}

#[derive(Clone, Copy, PartialEq)]
enum Visit {
    Pending,
    InProgress,
    Done,
}

/// Build a forest from a flat parent-pointer list.
///
/// Roots and children keep the input order. Accounts whose parent is not in
/// the list are dropped together with their subtrees. A parent chain that
/// revisits an account fails with [`CoreError::CyclicHierarchy`].
pub fn build_tree(accounts: &[BillingAccount]) -> CoreResult<Vec<AccountNode>> {
    let index: HashMap<&str, usize> = accounts
        .iter()
        .enumerate()
        .map(|(i, a)| (a.id.as_str(), i))
        .collect();

    check_cycles(accounts, &index)?;

    let mut roots = Vec::new();
    let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut orphans = Vec::new();
    for (i, account) in accounts.iter().enumerate() {
        match account.parent_id.as_deref().filter(|p| !p.is_empty()) {
            None => roots.push(i),
            Some(parent) => match index.get(parent) {
                Some(&p) => children.entry(p).or_default().push(i),
                None => orphans.push(account.id.as_str()),
            },
        }
    }

    if !orphans.is_empty() {
        log::warn!(
            target: "accountflow::hierarchy",
            "Dropping {} account(s) with unknown parent: {}",
            orphans.len(),
            orphans.join(", ")
        );
    }

    fn assemble(i: usize, accounts: &[BillingAccount], children: &HashMap<usize, Vec<usize>>) -> AccountNode {
        let mut node = AccountNode::leaf(accounts[i].clone());
        if let Some(kids) = children.get(&i) {
            node.children = kids.iter().map(|&k| assemble(k, accounts, children)).collect();
        }
        node
    }

    Ok(roots
        .into_iter()
        .map(|i| assemble(i, accounts, &children))
        .collect())
}

fn check_cycles(accounts: &[BillingAccount], index: &HashMap<&str, usize>) -> CoreResult<()> {
    let mut state = vec![Visit::Pending; accounts.len()];

    for start in 0..accounts.len() {
        let mut path: Vec<usize> = Vec::new();
        let mut current = Some(start);
        while let Some(i) = current {
            match state[i] {
                Visit::Done => break,
                Visit::InProgress => {
                    let from = path.iter().position(|&p| p == i).unwrap_or(0);
                    let mut ids: Vec<String> = path[from..]
                        .iter()
                        .map(|&p| accounts[p].id.clone())
                        .collect();
                    ids.push(accounts[i].id.clone());
                    return Err(CoreError::CyclicHierarchy { ids });
                }
                Visit::Pending => {
                    state[i] = Visit::InProgress;
                    path.push(i);
                    current = accounts[i]
                        .parent_id
                        .as_deref()
                        .and_then(|p| index.get(p).copied());
                }
            }
        }
        for i in path {
            state[i] = Visit::Done;
        }
    }
    Ok(())
}

// ==================== Rendering ====================

/// Set of expanded account ids. View state only, carried in the page URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedSet {
    ids: BTreeSet<String>,
}

impl ExpandedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn insert(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    /// Flip membership, returns true when the id is now expanded
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    /// Expand every node that has children
    pub fn expand_all(&mut self, forest: &[AccountNode]) {
        for node in forest {
            if !node.children.is_empty() {
                self.ids.insert(node.account.id.clone());
                self.expand_all(&node.children);
            }
        }
    }

    pub fn collapse_all(&mut self) {
        self.ids.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Copy with `id` toggled, used to build toggle links
    pub fn toggled(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.toggle(id);
        next
    }

    /// Comma-separated form used in the `open` query parameter
    pub fn to_query(&self) -> String {
        self.ids.iter().cloned().collect::<Vec<_>>().join(",")
    }
}

impl std::str::FromStr for ExpandedSet {
    type Err = std::convert::Infallible;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self {
            ids: s
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }
}

impl std::fmt::Display for ExpandedSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_query())
    }
}

/// Rendering parameters
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Pixels of indentation per level
    pub indent_unit: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent_unit: INDENT_UNIT,
        }
    }
}

/// One display row of the tree table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeRow {
    pub id: String,
    pub name: String,
    pub code: String,
    pub degree: u8,
    pub account_type: AccountType,
    pub parent_id: Option<String>,
    pub depth: usize,
    pub indent: usize,
    pub has_children: bool,
    pub expanded: bool,
}

/// Pre-order rows of the visible part of the forest
pub fn render_rows(nodes: &[AccountNode], depth: usize, expanded: &ExpandedSet) -> Vec<TreeRow> {
    render_rows_with(nodes, depth, expanded, &RenderOptions::default())
}

pub fn render_rows_with(
    nodes: &[AccountNode],
    depth: usize,
    expanded: &ExpandedSet,
    options: &RenderOptions,
) -> Vec<TreeRow> {
    let mut rows = Vec::new();
    push_rows(nodes, depth, expanded, options, &mut rows);
    rows
}

fn push_rows(
    nodes: &[AccountNode],
    depth: usize,
    expanded: &ExpandedSet,
    options: &RenderOptions,
    rows: &mut Vec<TreeRow>,
) {
    for node in nodes {
        let account = &node.account;
        let has_children = !node.children.is_empty();
        let is_expanded = has_children && expanded.contains(&account.id);
        rows.push(TreeRow {
            id: account.id.clone(),
            name: account.name.clone(),
            code: account.code.clone(),
            degree: account.degree,
            account_type: account.account_type,
            parent_id: account.parent_id.clone(),
            depth,
            indent: depth * options.indent_unit,
            has_children,
            expanded: is_expanded,
        });
        if is_expanded {
            push_rows(&node.children, depth + 1, expanded, options, rows);
        }
    }
}

// ==================== Classification ====================

/// Dotted numeric code of an account, e.g. `1.2.3`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationCode(String);

impl ClassificationCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Number of dotted segments
    pub fn level(&self) -> usize {
        self.0.split('.').count()
    }
}

impl std::fmt::Display for ClassificationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn next_code(prefix: Option<&str>, siblings: &[AccountNode]) -> ClassificationCode {
    let build = |n: usize| match prefix {
        Some(p) => format!("{}.{}", p, n),
        None => n.to_string(),
    };
    // Sibling count + 1, skipping codes left taken after a deletion
    let mut n = siblings.len() + 1;
    while siblings.iter().any(|s| s.account.code == build(n)) {
        n += 1;
    }
    ClassificationCode(build(n))
}

/// Code for a new account under `parent_id` (a root when `None` or empty)
pub fn generate_classification(
    parent_id: Option<&str>,
    forest: &[AccountNode],
) -> CoreResult<ClassificationCode> {
    match parent_id.filter(|p| !p.is_empty()) {
        None => Ok(next_code(None, forest)),
        Some(id) => {
            let parent = find_node(forest, id).ok_or_else(|| CoreError::OrphanParent {
                id: id.to_string(),
            })?;
            Ok(next_code(Some(&parent.account.code), &parent.children))
        }
    }
}

/// Code and degree assigned to a new account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAccountPlacement {
    pub code: ClassificationCode,
    pub degree: u8,
}

/// Place a new account under `parent_id`, rejecting degrees above `max_degree`
pub fn plan_new_account(
    parent_id: Option<&str>,
    forest: &[AccountNode],
    max_degree: u8,
) -> CoreResult<NewAccountPlacement> {
    let max_degree = max_degree.min(MAX_DEGREE);
    let degree = match parent_id.filter(|p| !p.is_empty()) {
        None => 1,
        Some(id) => {
            let parent = find_node(forest, id).ok_or_else(|| CoreError::OrphanParent {
                id: id.to_string(),
            })?;
            parent.account.degree.saturating_add(1)
        }
    };
    if degree > max_degree {
        return Err(CoreError::DegreeExceeded { max: max_degree });
    }
    Ok(NewAccountPlacement {
        code: generate_classification(parent_id, forest)?,
        degree,
    })
}

/// Recompute code and degree of the subtree rooted at `account_id` when it
/// moves under `new_parent`. Returns the updated accounts, moved node first.
pub fn relocate(
    forest: &[AccountNode],
    account_id: &str,
    new_parent: Option<&str>,
    max_degree: u8,
) -> CoreResult<Vec<BillingAccount>> {
    let node = find_node(forest, account_id).ok_or_else(|| CoreError::NotFound {
        kind: "Billing account".to_string(),
        id: account_id.to_string(),
    })?;
    let new_parent = new_parent.filter(|p| !p.is_empty());

    if let Some(parent) = new_parent {
        if parent == account_id || find_node(&node.children, parent).is_some() {
            return Err(CoreError::CyclicHierarchy {
                ids: vec![account_id.to_string(), parent.to_string(), account_id.to_string()],
            });
        }
    }

    let placement = plan_new_account(new_parent, forest, max_degree)?;
    let max_degree = max_degree.min(MAX_DEGREE);
    if placement.degree + node.height() - 1 > max_degree {
        return Err(CoreError::DegreeExceeded { max: max_degree });
    }

    let mut moved = Vec::with_capacity(node.size());
    let mut root = node.account.clone();
    root.parent_id = new_parent.map(str::to_string);
    root.code = placement.code.into_string();
    root.degree = placement.degree;
    rewrite_descendants(node, &root, &mut moved);
    moved.insert(0, root);
    Ok(moved)
}

fn rewrite_descendants(old: &AccountNode, new: &BillingAccount, out: &mut Vec<BillingAccount>) {
    let old_prefix = format!("{}.", old.account.code);
    for (i, child) in old.children.iter().enumerate() {
        let mut updated = child.account.clone();
        updated.degree = new.degree + 1;
        updated.code = match child.account.code.strip_prefix(&old_prefix) {
            Some(suffix) => format!("{}.{}", new.code, suffix),
            None => format!("{}.{}", new.code, i + 1),
        };
        out.push(updated.clone());
        rewrite_descendants(child, &updated, out);
    }
}

// ==================== Parent options ====================

/// Entry of a "parent account" selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentOption {
    pub id: String,
    pub label: String,
}

/// Pre-order parent candidates, labels indented with `--` per level.
/// Accounts at the maximum degree are not offered.
pub fn generate_parent_options(forest: &[AccountNode], depth: usize) -> Vec<ParentOption> {
    parent_options_with(forest, depth, OPTION_MARKER, MAX_DEGREE, None)
}

/// Same as [`generate_parent_options`] with a custom marker and degree limit,
/// leaving out `exclude` and its subtree (an account being edited).
pub fn parent_options_with(
    forest: &[AccountNode],
    depth: usize,
    marker: &str,
    max_degree: u8,
    exclude: Option<&str>,
) -> Vec<ParentOption> {
    let mut options = Vec::new();
    for node in forest {
        let account = &node.account;
        if account.degree >= max_degree || exclude == Some(account.id.as_str()) {
            continue;
        }
        options.push(ParentOption {
            id: account.id.clone(),
            label: format!("{} {} - {}", marker.repeat(depth), account.code, account.name),
        });
        options.extend(parent_options_with(&node.children, depth + 1, marker, max_degree, exclude));
    }
    options
}

// ==================== Search ====================

/// Keep nodes matching `query` by name or code, plus the ancestors of any
/// match. A matching node keeps its whole subtree.
pub fn filter_tree(forest: &[AccountNode], query: &str) -> Vec<AccountNode> {
    let query = query.trim();
    if query.is_empty() {
        return forest.to_vec();
    }
    forest
        .iter()
        .filter_map(|node| {
            let account = &node.account;
            if matches_search(&account.name, query) || matches_search(&account.code, query) {
                return Some(node.clone());
            }
            let children = filter_tree(&node.children, query);
            if children.is_empty() {
                None
            } else {
                Some(AccountNode {
                    account: account.clone(),
                    children,
                })
            }
        })
        .collect()
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: &str, parent: Option<&str>) -> BillingAccount {
        BillingAccount {
            id: id.to_string(),
            name: id.to_uppercase(),
            code: String::new(),
            degree: 1,
            account_type: AccountType::Analytic,
            parent_id: parent.map(str::to_string),
            billing_plan: "plan".to_string(),
        }
    }

    fn coded(id: &str, parent: Option<&str>, code: &str) -> BillingAccount {
        let mut a = account(id, parent);
        a.code = code.to_string();
        a.degree = code.split('.').count() as u8;
        a
    }

    fn ids(rows: &[TreeRow]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    /// 1 a
    ///   1.1 b
    ///     1.1.1 d
    ///   1.2 c
    /// 2 e
    fn sample() -> Vec<BillingAccount> {
        vec![
            coded("a", None, "1"),
            coded("b", Some("a"), "1.1"),
            coded("c", Some("a"), "1.2"),
            coded("d", Some("b"), "1.1.1"),
            coded("e", None, "2"),
        ]
    }

    #[test]
    fn test_build_tree_empty() {
        assert!(build_tree(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_build_tree_structure() {
        let forest = build_tree(&sample()).unwrap();
        assert_eq!(forest.len(), 2);
        assert_eq!(count_nodes(&forest), 5);
        assert_eq!(forest[0].id(), "a");
        let kids: Vec<&str> = forest[0].children.iter().map(AccountNode::id).collect();
        assert_eq!(kids, vec!["b", "c"]);
        assert_eq!(forest[0].children[0].children[0].id(), "d");
        assert_eq!(forest[0].height(), 3);
    }

    #[test]
    fn test_build_tree_child_before_parent() {
        let accounts = vec![account("b", Some("a")), account("a", None)];
        let forest = build_tree(&accounts).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children[0].id(), "b");
    }

    #[test]
    fn test_build_tree_drops_orphans() {
        let accounts = vec![
            account("a", None),
            account("b", Some("missing")),
            account("c", Some("b")),
        ];
        let forest = build_tree(&accounts).unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id(), "a");
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn test_build_tree_detects_cycle() {
        let accounts = vec![account("a", Some("b")), account("b", Some("a"))];
        match build_tree(&accounts) {
            Err(CoreError::CyclicHierarchy { ids }) => assert_eq!(ids, vec!["a", "b", "a"]),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_build_tree_detects_self_parent() {
        let accounts = vec![account("r", None), account("a", Some("a"))];
        assert!(matches!(
            build_tree(&accounts),
            Err(CoreError::CyclicHierarchy { .. })
        ));
    }

    #[test]
    fn test_build_tree_is_deterministic() {
        let accounts = sample();
        assert_eq!(build_tree(&accounts).unwrap(), build_tree(&accounts).unwrap());
    }

    #[test]
    fn test_render_rows_collapsed_and_expanded() {
        let forest = build_tree(&[account("a", None), account("b", Some("a"))]).unwrap();

        let rows = render_rows(&forest, 0, &ExpandedSet::new());
        assert_eq!(ids(&rows), vec!["a"]);
        assert!(rows[0].has_children);
        assert!(!rows[0].expanded);

        let expanded: ExpandedSet = "a".parse().unwrap();
        let rows = render_rows(&forest, 0, &expanded);
        assert_eq!(ids(&rows), vec!["a", "b"]);
        assert_eq!(rows.iter().map(|r| r.depth).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(rows[1].indent, INDENT_UNIT);
        assert!(!rows[1].has_children);
    }

    #[test]
    fn test_render_rows_pre_order_when_all_expanded() {
        let forest = build_tree(&sample()).unwrap();
        let mut expanded = ExpandedSet::new();
        expanded.expand_all(&forest);
        assert_eq!(expanded.len(), 2);

        let rows = render_rows_with(&forest, 0, &expanded, &RenderOptions { indent_unit: 10 });
        assert_eq!(ids(&rows), vec!["a", "b", "d", "c", "e"]);
        assert_eq!(rows[2].indent, 20);
    }

    #[test]
    fn test_render_rows_hidden_grandchildren() {
        let forest = build_tree(&sample()).unwrap();
        let expanded: ExpandedSet = "a".parse().unwrap();
        assert_eq!(ids(&render_rows(&forest, 0, &expanded)), vec!["a", "b", "c", "e"]);
    }

    #[test]
    fn test_expanded_set_toggle_and_query() {
        let mut set: ExpandedSet = " b, a ,,".parse().unwrap();
        assert_eq!(set.to_query(), "a,b");
        assert!(!set.toggle("a"));
        assert!(set.toggle("c"));
        assert_eq!(set.to_string(), "b,c");
        assert_eq!(set.toggled("b").to_query(), "c");
        set.collapse_all();
        assert!(set.is_empty());
    }

    #[test]
    fn test_classification_root() {
        assert_eq!(generate_classification(None, &[]).unwrap().as_str(), "1");
        let forest = build_tree(&[coded("a", None, "1"), coded("b", None, "2")]).unwrap();
        assert_eq!(generate_classification(None, &forest).unwrap().as_str(), "3");
        assert_eq!(generate_classification(Some(""), &forest).unwrap().as_str(), "3");
    }

    #[test]
    fn test_classification_child() {
        let mut accounts = vec![coded("p", None, "1")];
        let forest = build_tree(&accounts).unwrap();
        let code = generate_classification(Some("p"), &forest).unwrap();
        assert_eq!(code.as_str(), "1.1");
        assert_eq!(code.level(), 2);

        accounts.push(coded("c1", Some("p"), code.as_str()));
        let forest = build_tree(&accounts).unwrap();
        assert_eq!(generate_classification(Some("p"), &forest).unwrap().as_str(), "1.2");
    }

    #[test]
    fn test_classification_skips_taken_code() {
        // 1.1 was deleted, 1.2 remains
        let forest = build_tree(&[coded("p", None, "1"), coded("c2", Some("p"), "1.2")]).unwrap();
        assert_eq!(generate_classification(Some("p"), &forest).unwrap().as_str(), "1.3");
    }

    #[test]
    fn test_classification_orphan_parent() {
        let forest = build_tree(&sample()).unwrap();
        assert!(matches!(
            generate_classification(Some("nope"), &forest),
            Err(CoreError::OrphanParent { id }) if id == "nope"
        ));
    }

    #[test]
    fn test_plan_new_account_degree_cap() {
        let accounts = vec![
            coded("l1", None, "1"),
            coded("l2", Some("l1"), "1.1"),
            coded("l3", Some("l2"), "1.1.1"),
            coded("l4", Some("l3"), "1.1.1.1"),
            coded("l5", Some("l4"), "1.1.1.1.1"),
        ];
        let forest = build_tree(&accounts).unwrap();

        let placement = plan_new_account(Some("l4"), &forest, MAX_DEGREE).unwrap();
        assert_eq!(placement.degree, 5);
        assert_eq!(placement.code.as_str(), "1.1.1.1.2");

        assert!(matches!(
            plan_new_account(Some("l5"), &forest, MAX_DEGREE),
            Err(CoreError::DegreeExceeded { max: 5 })
        ));
        assert!(matches!(
            plan_new_account(Some("l3"), &forest, 3),
            Err(CoreError::DegreeExceeded { max: 3 })
        ));
        assert_eq!(plan_new_account(None, &forest, MAX_DEGREE).unwrap().degree, 1);
    }

    #[test]
    fn test_relocate_rewrites_subtree() {
        let forest = build_tree(&sample()).unwrap();
        let moved = relocate(&forest, "b", Some("e"), MAX_DEGREE).unwrap();
        assert_eq!(moved.len(), 2);
        assert_eq!(moved[0].id, "b");
        assert_eq!(moved[0].code, "2.1");
        assert_eq!(moved[0].degree, 2);
        assert_eq!(moved[0].parent_id.as_deref(), Some("e"));
        assert_eq!(moved[1].id, "d");
        assert_eq!(moved[1].code, "2.1.1");
        assert_eq!(moved[1].degree, 3);
    }

    #[test]
    fn test_relocate_to_root() {
        let forest = build_tree(&sample()).unwrap();
        let moved = relocate(&forest, "c", None, MAX_DEGREE).unwrap();
        assert_eq!(moved[0].code, "3");
        assert_eq!(moved[0].degree, 1);
        assert!(moved[0].parent_id.is_none());
    }

    #[test]
    fn test_relocate_under_descendant_is_cycle() {
        let forest = build_tree(&sample()).unwrap();
        assert!(matches!(
            relocate(&forest, "a", Some("d"), MAX_DEGREE),
            Err(CoreError::CyclicHierarchy { .. })
        ));
        assert!(matches!(
            relocate(&forest, "a", Some("a"), MAX_DEGREE),
            Err(CoreError::CyclicHierarchy { .. })
        ));
    }

    #[test]
    fn test_relocate_respects_subtree_height() {
        let forest = build_tree(&sample()).unwrap();
        // b has two levels, under c (degree 2) its child lands on degree 4
        assert!(relocate(&forest, "b", Some("c"), 3).is_err());
        assert!(relocate(&forest, "b", Some("c"), MAX_DEGREE).is_ok());
    }

    #[test]
    fn test_parent_options_labels_and_order() {
        let forest = build_tree(&sample()).unwrap();
        let options = generate_parent_options(&forest, 0);
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![" 1 - A", "-- 1.1 - B", "---- 1.1.1 - D", "-- 1.2 - C", " 2 - E"]
        );
    }

    #[test]
    fn test_parent_options_exclude_max_degree() {
        let accounts = vec![
            coded("l1", None, "1"),
            coded("l2", Some("l1"), "1.1"),
            coded("l3", Some("l2"), "1.1.1"),
            coded("l4", Some("l3"), "1.1.1.1"),
            coded("l5", Some("l4"), "1.1.1.1.1"),
        ];
        let forest = build_tree(&accounts).unwrap();
        let options = generate_parent_options(&forest, 0);
        assert_eq!(options.len(), 4);
        assert!(options.iter().all(|o| o.id != "l5"));
    }

    #[test]
    fn test_parent_options_exclude_edited_subtree() {
        let forest = build_tree(&sample()).unwrap();
        let options = parent_options_with(&forest, 0, ">", MAX_DEGREE, Some("b"));
        let ids: Vec<&str> = options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "e"]);
        assert_eq!(options[1].label, "> 1.2 - C");
    }

    #[test]
    fn test_filter_tree_keeps_ancestors() {
        let forest = build_tree(&sample()).unwrap();
        let filtered = filter_tree(&forest, "d");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id(), "a");
        assert_eq!(filtered[0].children.len(), 1);
        assert_eq!(filtered[0].children[0].children[0].id(), "d");

        let by_code = filter_tree(&forest, "1.2");
        assert_eq!(count_nodes(&by_code), 2);
        assert_eq!(count_nodes(&filter_tree(&forest, "")), 5);
        assert!(filter_tree(&forest, "zzz").is_empty());
    }
}
