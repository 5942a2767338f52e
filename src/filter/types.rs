use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which profile table an item owner lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerType {
    Freelancer,
    ServiceProvider,
}

impl OwnerType {
    /// Map a user role onto an owner type. Roles outside the two owning
    /// roles (e.g. "client") have no marketplace presence.
    pub fn from_role(role: &str) -> Option<Self> {
        match role {
            "freelancer" => Some(OwnerType::Freelancer),
            "service_provider" => Some(OwnerType::ServiceProvider),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerType::Freelancer => "freelancer",
            OwnerType::ServiceProvider => "service_provider",
        }
    }

    /// Column on marketplace_items holding the owning profile reference.
    pub fn owner_column(&self) -> &'static str {
        match self {
            OwnerType::Freelancer => "owner_freelancer",
            OwnerType::ServiceProvider => "owner_provider",
        }
    }
}

/// Ownership predicate: `owner_type = … AND <owner column> = <profile id>`.
/// Produced by the owner resolver, consumed by mine/update/delete.
#[derive(Debug, Clone, Copy)]
pub struct OwnerFilter {
    pub owner_type: OwnerType,
    pub profile_id: Uuid,
}

/// Optional list filters taken from query parameters. One field per
/// filterable attribute; absent fields add no predicate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingQuery {
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub owner_type: Option<String>,
    pub search: Option<String>,
}

/// A typed bind parameter. Closed set so array columns (text[], uuid[])
/// bind natively instead of passing through serde_json.
#[derive(Debug, Clone)]
pub enum SqlParam {
    Text(String),
    Uuid(Uuid),
    TextArray(Vec<String>),
    UuidArray(Vec<Uuid>),
    Numeric(Decimal),
}
