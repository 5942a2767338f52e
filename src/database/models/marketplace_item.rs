use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::profile::{FreelancerProfile, ServiceProviderProfile};
use crate::filter::SqlParam;

/// A marketplace listing as stored. Exactly one of `owner_freelancer` /
/// `owner_provider` is set, consistent with `owner_type`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceItem {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub pricing_model: Option<String>,
    pub price: Option<Decimal>,
    pub price_range: Option<String>,
    pub website_url: Option<String>,
    pub owner_type: String,
    pub owner_freelancer: Option<Uuid>,
    pub owner_provider: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire shape for list/get: the owner reference is replaced with the
/// joined profile document (or null).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemWithOwner {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub pricing_model: Option<String>,
    pub price: Option<Decimal>,
    pub price_range: Option<String>,
    pub website_url: Option<String>,
    pub owner_type: String,
    pub owner_freelancer: Option<FreelancerProfile>,
    pub owner_provider: Option<ServiceProviderProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MarketplaceItem {
    pub fn with_owner(
        self,
        freelancer: Option<FreelancerProfile>,
        provider: Option<ServiceProviderProfile>,
    ) -> ItemWithOwner {
        ItemWithOwner {
            id: self.id,
            item_type: self.item_type,
            name: self.name,
            description: self.description,
            category: self.category,
            tags: self.tags,
            pricing_model: self.pricing_model,
            price: self.price,
            price_range: self.price_range,
            website_url: self.website_url,
            owner_type: self.owner_type,
            owner_freelancer: freelancer,
            owner_provider: provider,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Inbound item fields. The allow-list below is the complete set of
/// client-writable columns; anything else in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemBody {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Outer None: field absent. Some(None): explicit null.
    #[serde(default, deserialize_with = "double_option")]
    pub tags: Option<Option<TagsInput>>,
    pub pricing_model: Option<String>,
    pub price: Option<Decimal>,
    pub price_range: Option<String>,
    pub website_url: Option<String>,
}

/// Tags arrive either as a proper list or as a comma-separated string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Csv(String),
}

impl TagsInput {
    fn is_blank(&self) -> bool {
        matches!(self, TagsInput::Csv(s) if s.is_empty())
    }

    /// Lists pass through; strings split on commas with each element trimmed.
    fn normalize(&self) -> Vec<String> {
        match self {
            TagsInput::List(tags) => tags.clone(),
            TagsInput::Csv(csv) => csv.split(',').map(|tag| tag.trim().to_string()).collect(),
        }
    }
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

impl ItemBody {
    /// Tags column value on create: blank/null/absent all mean "not sent",
    /// leaving the column to its `{}` default.
    fn tags_for_create(&self) -> Option<Vec<String>> {
        match &self.tags {
            Some(Some(input)) if !input.is_blank() => Some(input.normalize()),
            _ => None,
        }
    }

    /// Tags column value on update: absent leaves the stored list intact,
    /// while explicit null or empty string clears it.
    fn tags_for_update(&self) -> Option<Vec<String>> {
        match &self.tags {
            None => None,
            Some(None) => Some(Vec::new()),
            Some(Some(input)) if input.is_blank() => Some(Vec::new()),
            Some(Some(input)) => Some(input.normalize()),
        }
    }

    fn scalar_fields(&self) -> Vec<(&'static str, SqlParam)> {
        let mut fields = Vec::new();
        if let Some(v) = &self.item_type {
            fields.push(("item_type", SqlParam::Text(v.clone())));
        }
        if let Some(v) = &self.name {
            fields.push(("name", SqlParam::Text(v.clone())));
        }
        if let Some(v) = &self.description {
            fields.push(("description", SqlParam::Text(v.clone())));
        }
        if let Some(v) = &self.category {
            fields.push(("category", SqlParam::Text(v.clone())));
        }
        if let Some(v) = &self.pricing_model {
            fields.push(("pricing_model", SqlParam::Text(v.clone())));
        }
        if let Some(v) = self.price {
            fields.push(("price", SqlParam::Numeric(v)));
        }
        if let Some(v) = &self.price_range {
            fields.push(("price_range", SqlParam::Text(v.clone())));
        }
        if let Some(v) = &self.website_url {
            fields.push(("website_url", SqlParam::Text(v.clone())));
        }
        fields
    }

    pub fn create_payload(&self) -> ItemPayload {
        let mut fields = self.scalar_fields();
        if let Some(tags) = self.tags_for_create() {
            fields.push(("tags", SqlParam::TextArray(tags)));
        }
        ItemPayload { fields }
    }

    pub fn update_payload(&self) -> ItemPayload {
        let mut fields = self.scalar_fields();
        if let Some(tags) = self.tags_for_update() {
            fields.push(("tags", SqlParam::TextArray(tags)));
        }
        ItemPayload { fields }
    }
}

/// Column/value pairs ready to become an INSERT column list or an UPDATE
/// SET clause. Only fields present in the request body appear.
#[derive(Debug, Clone)]
pub struct ItemPayload {
    fields: Vec<(&'static str, SqlParam)>,
}

impl ItemPayload {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn columns(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(column, _)| *column).collect()
    }

    pub fn into_fields(self) -> Vec<(&'static str, SqlParam)> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(json: serde_json::Value) -> ItemBody {
        serde_json::from_value(json).expect("body")
    }

    #[test]
    fn csv_tags_split_and_trim() {
        let body = body(serde_json::json!({ "tags": "a, b ,c" }));
        assert_eq!(body.tags_for_create(), Some(vec!["a".into(), "b".into(), "c".into()]));
    }

    #[test]
    fn list_tags_pass_through() {
        let body = body(serde_json::json!({ "tags": ["rust", "api"] }));
        assert_eq!(body.tags_for_create(), Some(vec!["rust".into(), "api".into()]));
    }

    #[test]
    fn absent_tags_are_omitted_in_both_modes() {
        let body = body(serde_json::json!({ "name": "Logo Design" }));
        assert_eq!(body.tags_for_create(), None);
        assert_eq!(body.tags_for_update(), None);
    }

    #[test]
    fn empty_string_clears_on_update_but_not_create() {
        let body = body(serde_json::json!({ "tags": "" }));
        assert_eq!(body.tags_for_create(), None);
        assert_eq!(body.tags_for_update(), Some(Vec::new()));
    }

    #[test]
    fn explicit_null_clears_on_update() {
        let body = body(serde_json::json!({ "tags": null }));
        assert_eq!(body.tags_for_create(), None);
        assert_eq!(body.tags_for_update(), Some(Vec::new()));
    }

    #[test]
    fn payload_contains_only_present_fields() {
        let payload = body(serde_json::json!({
            "name": "Tax Filing",
            "price": 150,
        }))
        .update_payload();
        assert_eq!(payload.columns(), vec!["name", "price"]);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let payload = body(serde_json::json!({
            "name": "Logo Design",
            "ownerType": "freelancer",
            "ownerFreelancer": "5eb63bbb-e01e-4eed-8c5f-0f0fd8bd3a6b",
            "isAdmin": true,
        }))
        .create_payload();
        // ownership and any stray keys never reach the column list
        assert_eq!(payload.columns(), vec!["name"]);
    }

    #[test]
    fn empty_body_yields_empty_payload() {
        let payload = body(serde_json::json!({})).update_payload();
        assert!(payload.is_empty());
    }
}
