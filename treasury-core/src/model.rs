//! Record shapes returned by the upstream treasury API.
//!
//! Field names match the upstream JSON exactly. Upstream payloads are not
//! validated: numeric fields that arrive as `null` or are missing fall back to
//! zero (required numbers) or `None` (optional numbers), so a
//! malformed-but-parseable document still deserializes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Aggregate treasury snapshot (`GET /treasury-stats`).
///
/// Replaced wholesale on every refresh; never partially updated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreasuryStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub annual_budget: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub trsc_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pssc_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub claimed_by_vendors_ada: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub allocated_to_trsc_ada: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub remaining_treasury_ada: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub treasury_balance_ada: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub budget_claimed_percentage: f64,
}

/// A disbursement milestone attached to a project or child link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_ada: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Status as reported upstream: child links carry a label, project
/// contracts a percent-complete number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusValue {
    Percent(f64),
    Label(String),
}

/// Project smart contract ("PSSC"), keyed by its funding transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectContract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Funding transaction id; the primary key and soft-join target of
    /// [`ChildLink::id`].
    #[serde(default, deserialize_with = "null_as_default")]
    pub fund_tx: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pssc_addr: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    #[serde(default)]
    pub claimed: Option<f64>,
    /// Percent complete, nominally 0-100 but never range-checked.
    #[serde(default, deserialize_with = "lenient_percent", skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestones: Option<Vec<Milestone>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund_date: Option<String>,
}

impl ProjectContract {
    /// Vendor label, falling back to the project name.
    pub fn vendor_or_project(&self) -> Option<&str> {
        self.vendor.as_deref().or(self.project.as_deref())
    }
}

/// A routing contract's reference to one funded project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildLink {
    /// Matches [`ProjectContract::fund_tx`] when the project is known.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "budgetAda", default, skip_serializing_if = "Option::is_none")]
    pub budget_ada: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    #[serde(rename = "claimedAda", default, skip_serializing_if = "Option::is_none")]
    pub claimed_ada: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestones: Option<Vec<Milestone>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fund_date: Option<String>,
}

/// Treasury routing smart contract ("TRSC").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingContract {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub balance: f64,
    #[serde(rename = "incomingToTRSC", default, skip_serializing_if = "Option::is_none")]
    pub incoming_to_trsc: Option<f64>,
    /// Denormalized upstream counter; may disagree with `children.len()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children_count: Option<u64>,
    #[serde(rename = "undeclaredAmount", default, skip_serializing_if = "Option::is_none")]
    pub undeclared_amount: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<ChildLink>,
}

impl RoutingContract {
    /// Child count for display: the upstream counter when present, otherwise
    /// the length of the child list.
    pub fn display_child_count(&self) -> u64 {
        self.children_count
            .unwrap_or(self.children.len() as u64)
    }
}

/// Full contract hierarchy (`GET /treasury-data`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreasuryData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub trsc: Vec<RoutingContract>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pssc: Vec<ProjectContract>,
    #[serde(rename = "totalTreasuryADA", default, skip_serializing_if = "Option::is_none")]
    pub total_treasury_ada: Option<f64>,
}

/// Raw calendar entry (`GET /calendar-events`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Free-form properties; may carry `amount_ada`, `pssc_addr`, `vendor`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_props: Option<Map<String, Value>>,
}

/// Upstream data version marker (`GET /data-version`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataVersion {
    /// Epoch milliseconds of the last upstream change.
    #[serde(rename = "lastModified", default, deserialize_with = "null_as_default")]
    pub last_modified: i64,
}

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts integer or fractional percentages (and `null`).
fn lenient_percent<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite()).map(|v| v.round() as i64))
}
