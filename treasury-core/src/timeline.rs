//! Monthly treasury movements.
//!
//! Outgoing funding is dated by each child link's `fund_date`. Incoming
//! allocations have no date upstream, so a routing contract's whole incoming
//! amount is attributed to the month of its first child's funding date. This
//! is an approximation and is kept as-is until upstream dates incoming flows.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::trace;

use crate::dates::{month_key, parse_optional, short_month_label};
use crate::model::RoutingContract;

/// Totals for one calendar month (UTC).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineBucket {
    /// Sortable `YYYY-MM` key.
    pub month: String,
    /// `Mar 2024`
    pub display_month: String,
    pub incoming: f64,
    pub outgoing: f64,
}

impl TimelineBucket {
    fn empty(date: &DateTime<Utc>) -> Self {
        Self {
            month: month_key(date),
            display_month: short_month_label(date),
            incoming: 0.0,
            outgoing: 0.0,
        }
    }
}

/// Fold dated funding events into per-month incoming/outgoing totals,
/// ascending by month.
pub fn bucket_timeline(trsc: &[RoutingContract]) -> Vec<TimelineBucket> {
    let mut buckets: HashMap<String, TimelineBucket> = HashMap::new();

    for contract in trsc {
        for child in &contract.children {
            let date = match parse_optional(child.fund_date.as_deref()) {
                Ok(date) => date,
                Err(err) => {
                    trace!(trsc = %contract.id, child = %child.id, %err, "Skipping undated child");
                    continue;
                }
            };
            let amount = child.budget_ada.or(child.balance).unwrap_or(0.0);
            bucket_for(&mut buckets, &date).outgoing += amount;
        }

        let incoming = contract.incoming_to_trsc.unwrap_or(0.0);
        if incoming == 0.0 {
            continue;
        }
        let Some(first) = contract.children.first() else {
            continue;
        };
        match parse_optional(first.fund_date.as_deref()) {
            Ok(date) => bucket_for(&mut buckets, &date).incoming += incoming,
            Err(err) => trace!(trsc = %contract.id, %err, "Incoming amount has no usable date"),
        }
    }

    let mut points: Vec<TimelineBucket> = buckets.into_values().collect();
    points.sort_by(|a, b| a.month.cmp(&b.month));
    points
}

fn bucket_for<'a>(
    buckets: &'a mut HashMap<String, TimelineBucket>,
    date: &DateTime<Utc>,
) -> &'a mut TimelineBucket {
    buckets
        .entry(month_key(date))
        .or_insert_with(|| TimelineBucket::empty(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChildLink;

    fn child(id: &str, fund_date: Option<&str>, budget: Option<f64>, balance: Option<f64>) -> ChildLink {
        ChildLink {
            id: id.to_string(),
            fund_date: fund_date.map(str::to_string),
            budget_ada: budget,
            balance,
            ..Default::default()
        }
    }

    fn routing(id: &str, incoming: Option<f64>, children: Vec<ChildLink>) -> RoutingContract {
        RoutingContract {
            id: id.to_string(),
            incoming_to_trsc: incoming,
            children,
            ..Default::default()
        }
    }

    #[test]
    fn test_outgoing_prefers_budget_then_balance() {
        let trsc = vec![routing(
            "t1",
            None,
            vec![
                child("a", Some("2024-03-05"), Some(100.0), Some(999.0)),
                child("b", Some("2024-03-20"), None, Some(50.0)),
                child("c", Some("2024-03-21"), None, None),
            ],
        )];

        let points = bucket_timeline(&trsc);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].month, "2024-03");
        assert_eq!(points[0].display_month, "Mar 2024");
        assert_eq!(points[0].outgoing, 150.0);
        assert_eq!(points[0].incoming, 0.0);
    }

    #[test]
    fn test_incoming_attributed_to_first_child_month() {
        let trsc = vec![routing(
            "t1",
            Some(1_000.0),
            vec![
                child("a", Some("2024-01-15"), Some(10.0), None),
                child("b", Some("2024-02-15"), Some(20.0), None),
            ],
        )];

        let points = bucket_timeline(&trsc);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].month, "2024-01");
        assert_eq!(points[0].incoming, 1_000.0);
        assert_eq!(points[1].incoming, 0.0);
    }

    #[test]
    fn test_incoming_skipped_when_first_child_undated() {
        let trsc = vec![routing(
            "t1",
            Some(500.0),
            vec![
                child("a", None, Some(10.0), None),
                child("b", Some("2024-02-15"), Some(20.0), None),
            ],
        )];

        let points = bucket_timeline(&trsc);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].incoming, 0.0);
        assert_eq!(points[0].outgoing, 20.0);
    }

    #[test]
    fn test_unparseable_dates_are_skipped() {
        let trsc = vec![routing(
            "t1",
            Some(500.0),
            vec![child("a", Some("garbage"), Some(10.0), None)],
        )];
        assert!(bucket_timeline(&trsc).is_empty());
    }

    #[test]
    fn test_output_sorted_regardless_of_input_order() {
        let forward = vec![
            routing("t1", Some(5.0), vec![child("a", Some("2023-12-01"), Some(1.0), None)]),
            routing("t2", Some(7.0), vec![child("b", Some("2024-06-01"), Some(2.0), None)]),
            routing("t3", None, vec![child("c", Some("2024-01-31"), Some(3.0), None)]),
        ];
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = bucket_timeline(&forward);
        let b = bucket_timeline(&reversed);
        let months: Vec<&str> = a.iter().map(|p| p.month.as_str()).collect();
        assert_eq!(months, vec!["2023-12", "2024-01", "2024-06"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_routing_contracts() {
        assert!(bucket_timeline(&[]).is_empty());
    }
}
