//! Derived views over a realistic upstream snapshot

use treasury_core::{
    aggregate, build_graph, build_treemap, bucket_timeline, compute_metrics, filter_by_query,
    format_ada, group_by_month, log_size, normalize_events, CalendarEvent, ExplorerView,
    FocusState, NodeKind, TreasuryData, TreasuryStats,
};

const SNAPSHOT: &str = r#"{
  "trsc": [
    {
      "id": "trsc-core",
      "instance_id": "inst-1",
      "name": "Core Development",
      "currency": "ADA",
      "balance": 2500000,
      "incomingToTRSC": 4000000,
      "children_count": 3,
      "undeclaredAmount": null,
      "children": [
        { "id": "tx-ledger", "vendor": "Authentic Ledger Labs", "budgetAda": 1200000, "claimedAda": 300000, "status": "active", "fund_date": "2024-02-10" },
        { "id": "tx-wallet", "budgetAda": null, "balance": 80000, "fund_date": "2024-03-15T12:00:00Z" },
        { "id": "", "vendor": "Nameless" }
      ]
    },
    {
      "id": "trsc-community",
      "name": "Community Grants",
      "currency": "ADA",
      "balance": 0,
      "incomingToTRSC": null,
      "children": [
        { "id": "tx-ledger", "vendor": "Duplicate link", "budgetAda": 10 },
        { "id": "tx-docs", "budgetAda": 0, "fund_date": "not a date" }
      ]
    }
  ],
  "pssc": [
    { "fund_tx": "tx-ledger", "project": "Ledger", "vendor": "Ledger Labs", "budget": 1200000, "claimed": 600000, "status": 50 },
    { "fund_tx": "tx-wallet", "project": "Wallet", "budget": 90000, "claimed": null, "status": 10.6 },
    { "fund_tx": "tx-orphan", "project": "Lonely Tooling", "budget": 5000, "claimed": 5000, "status": 100 }
  ],
  "totalTreasuryADA": 1500000000
}"#;

fn snapshot() -> TreasuryData {
    serde_json::from_str(SNAPSHOT).expect("snapshot parses")
}

#[test]
fn test_graph_over_snapshot() {
    let graph = build_graph(&snapshot());
    let counts = graph.counts();

    assert_eq!(counts.routing, 2);
    // tx-ledger placed once, the empty id skipped
    assert_eq!(counts.project, 3);
    assert_eq!(counts.orphan, 1);
    assert_eq!(counts.edges, 3);
    assert!(!graph.has_edge("trsc-community", "tx-ledger"));

    let ledger = graph.node("tx-ledger").unwrap();
    assert_eq!(ledger.label, "Ledger Labs");
    assert_eq!(ledger.kind, NodeKind::Project);

    let orphan = graph.node("tx-orphan").unwrap();
    assert_eq!(orphan.kind, NodeKind::Orphan);
    assert_eq!(orphan.label, "Lonely Tooling");

    let mut ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
}

#[test]
fn test_graph_serializes_without_internal_indexes() {
    let graph = build_graph(&snapshot());
    let json = serde_json::to_value(&graph).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert!(object.contains_key("nodes"));
    assert!(object.contains_key("edges"));
}

#[test]
fn test_timeline_over_snapshot() {
    let points = bucket_timeline(&snapshot().trsc);
    let months: Vec<&str> = points.iter().map(|p| p.month.as_str()).collect();
    assert_eq!(months, vec!["2024-02", "2024-03"]);
    assert_eq!(points[0].incoming, 4_000_000.0);
    assert_eq!(points[0].outgoing, 1_200_000.0);
    assert_eq!(points[1].outgoing, 80_000.0);
}

#[test]
fn test_explorer_focus_round_trip() {
    let data = snapshot();
    let mut focus = FocusState::new();

    focus.toggle("trsc-community");
    let view = ExplorerView::build(&data, focus.focused(), "");
    assert_eq!(view.focused.as_deref(), Some("trsc-community"));
    let focused_rows: Vec<&str> = view.projects.iter().map(|r| r.fund_tx.as_str()).collect();
    assert_eq!(focused_rows, vec!["tx-ledger"]);
    assert_eq!(view.routing[0].child_count, 3);
    assert_eq!(view.routing[1].child_count, 2);

    focus.toggle("trsc-community");
    let view = ExplorerView::build(&data, focus.focused(), "");
    assert!(view.focused.is_none());
    assert_eq!(view.projects.len(), data.pssc.len());
    assert_eq!(view.totals.total_budget, 1_295_000.0);
}

#[test]
fn test_query_and_totals() {
    let data = snapshot();
    let matched = filter_by_query(&data.pssc, "WALL");
    assert_eq!(matched.len(), 1);

    let totals = aggregate(matched);
    assert_eq!(totals.total_budget, 90_000.0);
    assert_eq!(totals.total_claimed, 0.0);
    assert_eq!(totals.claimed_ratio, 0.0);
    assert_eq!(aggregate(std::iter::empty()).claimed_ratio, 0.0);
}

#[test]
fn test_treemap_over_snapshot() {
    let groups = build_treemap(&snapshot());
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].children.len(), 3);
    assert_eq!(groups[0].children[1].value, 80_000.0);
}

#[test]
fn test_calendar_grouping() {
    let events: Vec<CalendarEvent> = serde_json::from_str(
        r#"[
          { "id": "e1", "title": "Ledger M1", "date": "2024-03-20", "extendedProps": { "amount_ada": 1000 } },
          { "id": "e2", "title": "undefined - undefined", "date": "2024-03-01" },
          { "id": "e3", "date": "not-a-date" },
          { "id": "e4", "title": "Wallet M2", "date": "2024-04-02T09:00:00Z" }
        ]"#,
    )
    .unwrap();

    let entries = normalize_events(&events);
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].label, "Treasury Milestone");

    let groups = group_by_month(&entries);
    let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, vec!["March 2024", "April 2024"]);
}

#[test]
fn test_metrics_and_formatting() {
    let stats: TreasuryStats = serde_json::from_str(
        r#"{ "annual_budget": null, "trsc_count": 2, "pssc_count": 3, "treasury_balance_ada": 1234567890 }"#,
    )
    .unwrap();
    let cards = compute_metrics(Some(&stats));
    assert_eq!(cards[0].value, "1.23B ₳");
    assert_eq!(cards[1].change.as_deref(), Some("0.0%"));

    assert_eq!(format_ada(45_200.0), "45.2K ₳");
    assert_eq!(format_ada(999.0), "999 ₳");
}

#[test]
fn test_log_size_floor_and_monotonic() {
    for bad in [0.0, -5.0, f64::NAN, f64::NEG_INFINITY] {
        assert_eq!(log_size(bad, 5.0, 12.0), 5.0);
    }
    let mut previous = log_size(1.0, 5.0, 12.0);
    for exponent in 1..12 {
        let size = log_size(10f64.powi(exponent), 5.0, 12.0);
        assert!(size >= previous);
        previous = size;
    }
}
