//! Budget distribution map: one group per routing contract, one tile per
//! funded project. Tile area is the consumer's concern; this only assigns
//! values and labels.

use serde::Serialize;

use crate::index::ProjectIndex;
use crate::model::{StatusValue, TreasuryData};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapTile {
    pub name: String,
    pub value: f64,
    pub vendor: String,
    pub claimed: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapGroup {
    pub name: String,
    pub value: f64,
    pub children: Vec<TreemapTile>,
}

/// Shape the contract hierarchy for a proportional-area map.
///
/// Tile value prefers the child's current balance, then its budget, then the
/// linked project's budget. Claimed and status prefer the linked project.
pub fn build_treemap(data: &TreasuryData) -> Vec<TreemapGroup> {
    let index = ProjectIndex::new(&data.pssc);

    data.trsc
        .iter()
        .map(|contract| TreemapGroup {
            name: contract.name.clone(),
            value: contract.balance,
            children: contract
                .children
                .iter()
                .map(|child| {
                    let linked = index.get(&child.id);
                    let vendor = child
                        .vendor
                        .clone()
                        .or_else(|| linked.and_then(|p| p.project.clone()))
                        .unwrap_or_else(|| "Unknown".to_string());
                    TreemapTile {
                        name: vendor.clone(),
                        value: child
                            .balance
                            .or(child.budget_ada)
                            .or_else(|| linked.and_then(|p| p.budget))
                            .unwrap_or(0.0),
                        vendor,
                        claimed: linked
                            .and_then(|p| p.claimed)
                            .or(child.claimed_ada)
                            .unwrap_or(0.0),
                        status: linked
                            .and_then(|p| p.status)
                            .map(|percent| StatusValue::Percent(percent as f64))
                            .or_else(|| child.status.clone()),
                    }
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChildLink, ProjectContract, RoutingContract};

    #[test]
    fn test_tiles_prefer_child_balance_and_linked_claims() {
        let data = TreasuryData {
            trsc: vec![RoutingContract {
                id: "t1".to_string(),
                name: "Core".to_string(),
                balance: 900.0,
                children: vec![
                    ChildLink {
                        id: "a".to_string(),
                        balance: Some(40.0),
                        budget_ada: Some(100.0),
                        claimed_ada: Some(1.0),
                        ..Default::default()
                    },
                    ChildLink {
                        id: "orphan-link".to_string(),
                        vendor: Some("Solo".to_string()),
                        status: Some(StatusValue::Label("paused".to_string())),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            pssc: vec![ProjectContract {
                fund_tx: "a".to_string(),
                project: Some("Indexer".to_string()),
                budget: Some(100.0),
                claimed: Some(60.0),
                status: Some(60),
                ..Default::default()
            }],
            total_treasury_ada: None,
        };

        let groups = build_treemap(&data);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].value, 900.0);

        let linked = &groups[0].children[0];
        assert_eq!(linked.name, "Indexer");
        assert_eq!(linked.value, 40.0);
        assert_eq!(linked.claimed, 60.0);
        assert_eq!(linked.status, Some(StatusValue::Percent(60.0)));

        let orphan = &groups[0].children[1];
        assert_eq!(orphan.vendor, "Solo");
        assert_eq!(orphan.value, 0.0);
        assert_eq!(orphan.status, Some(StatusValue::Label("paused".to_string())));
    }

    #[test]
    fn test_linked_project_without_status_uses_child_status() {
        let data: TreasuryData = serde_json::from_value(serde_json::json!({
            "trsc": [{
                "id": "t1",
                "name": "Core",
                "children": [{"id": "a", "status": "active"}]
            }],
            "pssc": [{"fund_tx": "a", "project": "Indexer", "status": null}]
        }))
        .unwrap();

        let groups = build_treemap(&data);
        assert_eq!(groups[0].children[0].name, "Indexer");
        assert_eq!(
            groups[0].children[0].status,
            Some(StatusValue::Label("active".to_string()))
        );
    }

    #[test]
    fn test_empty_routing_list() {
        assert!(build_treemap(&TreasuryData::default()).is_empty());
    }
}
