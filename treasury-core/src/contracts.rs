//! Contract explorer: text filtering, roll-up totals and TRSC focus.
//!
//! A routing contract can be focused to narrow the project list to the
//! projects it funds. Focus toggles: selecting the focused contract again
//! clears it.

use std::collections::HashSet;

use serde::Serialize;
use tracing::trace;

use crate::model::{ProjectContract, RoutingContract, TreasuryData};

/// Block explorer used for funding transaction links.
pub const EXPLORER_TX_URL: &str = "https://cardanoscan.io/transaction/";

/// Label used when a project has neither vendor nor project name.
pub const UNKNOWN_VENDOR: &str = "Unknown vendor";

/// Roll-up over a set of project contracts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ContractTotals {
    pub total_budget: f64,
    pub total_claimed: f64,
    /// `total_claimed / total_budget`, or 0 when nothing is allocated.
    pub claimed_ratio: f64,
}

/// Case-insensitive substring match on vendor (falling back to project name).
///
/// An empty query returns every contract in input order.
pub fn filter_by_query<'a>(contracts: &'a [ProjectContract], query: &str) -> Vec<&'a ProjectContract> {
    if query.is_empty() {
        return contracts.iter().collect();
    }
    let needle = query.to_lowercase();
    contracts
        .iter()
        .filter(|contract| {
            contract
                .vendor_or_project()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&needle)
        })
        .collect()
}

/// Sum budgets and claims in one pass. Missing or non-finite amounts count as 0.
pub fn aggregate<'a, I>(contracts: I) -> ContractTotals
where
    I: IntoIterator<Item = &'a ProjectContract>,
{
    let (total_budget, total_claimed) =
        contracts
            .into_iter()
            .fold((0.0, 0.0), |(budget, claimed), contract| {
                (
                    budget + finite_or_zero(contract.budget),
                    claimed + finite_or_zero(contract.claimed),
                )
            });

    ContractTotals {
        total_budget,
        total_claimed,
        claimed_ratio: if total_budget > 0.0 {
            total_claimed / total_budget
        } else {
            0.0
        },
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Routing contract matching `focus`, if any.
pub fn resolve_focused<'a>(
    trsc: &'a [RoutingContract],
    focus: Option<&str>,
) -> Option<&'a RoutingContract> {
    let id = focus?;
    trsc.iter().find(|contract| contract.id == id)
}

/// Which routing contract, if any, the explorer is narrowed to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusState {
    focused: Option<String>,
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Focus `id`, or clear focus when `id` is already focused.
    pub fn toggle(&mut self, id: &str) {
        if self.focused.as_deref() == Some(id) {
            self.focused = None;
        } else {
            self.focused = Some(id.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.focused = None;
    }
}

/// Result of applying focus and a text query to a snapshot.
#[derive(Debug, Clone)]
pub struct Selection<'a> {
    /// Resolved focused contract; `None` when unfocused or the id is unknown.
    pub focused: Option<&'a RoutingContract>,
    pub projects: Vec<&'a ProjectContract>,
}

/// Projects to display for the given focus and query.
///
/// When focused, the text-filtered set is narrowed to projects whose
/// `fund_tx` appears among the focused contract's child links.
pub fn select_projects<'a>(
    data: &'a TreasuryData,
    focus: Option<&str>,
    query: &str,
) -> Selection<'a> {
    let focused = resolve_focused(&data.trsc, focus);
    let filtered = filter_by_query(&data.pssc, query);

    let projects = match focused {
        Some(contract) => {
            let child_ids: HashSet<&str> =
                contract.children.iter().map(|child| child.id.as_str()).collect();
            filtered
                .into_iter()
                .filter(|project| child_ids.contains(project.fund_tx.as_str()))
                .collect()
        }
        None => filtered,
    };

    trace!(
        focus = ?focus,
        resolved = focused.is_some(),
        query,
        matched = projects.len(),
        "Selected projects"
    );

    Selection { focused, projects }
}

/// One project line in the explorer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRow {
    pub fund_tx: String,
    pub vendor: String,
    pub status: i64,
    pub claimed: f64,
    pub budget: f64,
    /// Claimed share of budget, capped at 1.
    pub progress: f64,
    pub fund_date: Option<String>,
    pub explorer_url: String,
}

impl ProjectRow {
    pub fn from_contract(contract: &ProjectContract) -> Self {
        let claimed = finite_or_zero(contract.claimed);
        let budget = finite_or_zero(contract.budget);
        let progress = if budget > 0.0 {
            (claimed / budget).min(1.0)
        } else {
            0.0
        };

        Self {
            fund_tx: contract.fund_tx.clone(),
            vendor: contract
                .vendor_or_project()
                .unwrap_or(UNKNOWN_VENDOR)
                .to_string(),
            status: contract.status.unwrap_or(0),
            claimed,
            budget,
            progress,
            fund_date: contract.fund_date.clone(),
            explorer_url: format!("{}{}", EXPLORER_TX_URL, contract.fund_tx),
        }
    }
}

/// Routing contract card in the explorer sidebar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingSummary {
    pub id: String,
    pub name: String,
    pub child_count: u64,
    pub balance: f64,
    pub incoming: Option<f64>,
    pub focused: bool,
}

/// Everything the contract explorer shows for one focus/query combination.
#[derive(Debug, Clone, Serialize)]
pub struct ExplorerView {
    pub routing: Vec<RoutingSummary>,
    pub focused: Option<String>,
    pub projects: Vec<ProjectRow>,
    pub totals: ContractTotals,
}

impl ExplorerView {
    pub fn build(data: &TreasuryData, focus: Option<&str>, query: &str) -> Self {
        let selection = select_projects(data, focus, query);
        let focused_id = selection.focused.map(|contract| contract.id.clone());

        let routing = data
            .trsc
            .iter()
            .map(|contract| RoutingSummary {
                id: contract.id.clone(),
                name: contract.name.clone(),
                child_count: contract.display_child_count(),
                balance: contract.balance,
                incoming: contract.incoming_to_trsc,
                focused: focused_id.as_deref() == Some(contract.id.as_str()),
            })
            .collect();

        Self {
            routing,
            totals: aggregate(selection.projects.iter().copied()),
            projects: selection
                .projects
                .iter()
                .map(|contract| ProjectRow::from_contract(contract))
                .collect(),
            focused: focused_id,
        }
    }
}
