use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    FreelancerProfile, ItemPayload, ItemWithOwner, MarketplaceItem, ServiceProviderProfile,
};
use crate::database::query::{bind_param_query, bind_param_query_as};
use crate::filter::{ListingQuery, OwnerFilter, SqlParam, WhereBuilder};

/// CRUD over marketplace_items. Mutations are always conditioned on the
/// caller's ownership filter in the same statement as the match, so a
/// non-owner's update/delete simply affects zero rows.
#[derive(Clone)]
pub struct ListingService {
    pool: PgPool,
}

impl ListingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All items matching the optional query filters, owner profiles joined.
    pub async fn list(&self, query: &ListingQuery) -> Result<Vec<ItemWithOwner>, DatabaseError> {
        let mut where_clause = WhereBuilder::new();
        where_clause.listing(query);

        let sql = format!("SELECT * FROM marketplace_items{}", where_clause.sql());
        let params = where_clause.into_params();

        let mut q = sqlx::query_as::<_, MarketplaceItem>(&sql);
        for param in &params {
            q = bind_param_query_as(q, param);
        }
        let items = q.fetch_all(&self.pool).await?;

        self.populate_owners(items).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<ItemWithOwner>, DatabaseError> {
        let item = sqlx::query_as::<_, MarketplaceItem>(
            "SELECT * FROM marketplace_items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(item) = item else { return Ok(None) };
        Ok(self.populate_owners(vec![item]).await?.into_iter().next())
    }

    /// Insert a new item with ownership attached.
    pub async fn create(
        &self,
        payload: ItemPayload,
        owner: &OwnerFilter,
    ) -> Result<MarketplaceItem, DatabaseError> {
        let mut fields = payload.into_fields();
        fields.push((
            "owner_type",
            SqlParam::Text(owner.owner_type.as_str().to_string()),
        ));
        fields.push((owner.owner_type.owner_column(), SqlParam::Uuid(owner.profile_id)));

        let columns: Vec<&str> = fields.iter().map(|(column, _)| *column).collect();
        let placeholders: Vec<String> = (1..=fields.len()).map(|n| format!("${n}")).collect();
        let sql = format!(
            "INSERT INTO marketplace_items ({}) VALUES ({}) RETURNING *",
            columns.join(", "),
            placeholders.join(", ")
        );

        let mut q = sqlx::query_as::<_, MarketplaceItem>(&sql);
        for (_, param) in &fields {
            q = bind_param_query_as(q, param);
        }
        Ok(q.fetch_one(&self.pool).await?)
    }

    /// The caller's own listings, newest first.
    pub async fn mine(&self, owner: &OwnerFilter) -> Result<Vec<MarketplaceItem>, DatabaseError> {
        let mut where_clause = WhereBuilder::new();
        where_clause.owner(owner);

        let sql = format!(
            "SELECT * FROM marketplace_items{} ORDER BY created_at DESC",
            where_clause.sql()
        );
        let params = where_clause.into_params();

        let mut q = sqlx::query_as::<_, MarketplaceItem>(&sql);
        for param in &params {
            q = bind_param_query_as(q, param);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    /// Conditional update: id and ownership matched in one statement.
    /// `None` means nothing matched - absent and not-yours look the same.
    pub async fn update(
        &self,
        id: Uuid,
        owner: &OwnerFilter,
        payload: ItemPayload,
    ) -> Result<Option<MarketplaceItem>, DatabaseError> {
        let fields = payload.into_fields();

        let mut where_clause = WhereBuilder::with_offset(fields.len());
        where_clause.eq("id", SqlParam::Uuid(id));
        where_clause.owner(owner);

        let sql = format!(
            "UPDATE marketplace_items SET {}{} RETURNING *",
            set_clause(&fields),
            where_clause.sql()
        );

        let mut q = sqlx::query_as::<_, MarketplaceItem>(&sql);
        for (_, param) in &fields {
            q = bind_param_query_as(q, param);
        }
        for param in &where_clause.into_params() {
            q = bind_param_query_as(q, param);
        }
        Ok(q.fetch_optional(&self.pool).await?)
    }

    /// Conditional delete with the same not-found/not-yours ambiguity.
    pub async fn delete(&self, id: Uuid, owner: &OwnerFilter) -> Result<bool, DatabaseError> {
        let mut where_clause = WhereBuilder::new();
        where_clause.eq("id", SqlParam::Uuid(id));
        where_clause.owner(owner);

        let sql = format!("DELETE FROM marketplace_items{}", where_clause.sql());
        let params = where_clause.into_params();

        let mut q = sqlx::query(&sql);
        for param in &params {
            q = bind_param_query(q, param);
        }
        let result = q.execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Names of the most recent items matching a search term. Feeds the
    /// support chat's "matches for you" personalization line.
    pub async fn match_names(
        &self,
        term: &str,
        limit: i64,
    ) -> Result<Vec<String>, DatabaseError> {
        let mut where_clause = WhereBuilder::new();
        where_clause.search(term);

        let sql = format!(
            "SELECT name FROM marketplace_items{} ORDER BY created_at DESC LIMIT {}",
            where_clause.sql(),
            limit
        );
        let params = where_clause.into_params();

        let mut q = sqlx::query_as::<_, (Option<String>,)>(&sql);
        for param in &params {
            q = bind_param_query_as(q, param);
        }
        let rows = q.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().filter_map(|(name,)| name).collect())
    }

    /// Batch-fetch owner profiles and attach them to each item.
    async fn populate_owners(
        &self,
        items: Vec<MarketplaceItem>,
    ) -> Result<Vec<ItemWithOwner>, DatabaseError> {
        let freelancer_ids: Vec<Uuid> = items.iter().filter_map(|i| i.owner_freelancer).collect();
        let provider_ids: Vec<Uuid> = items.iter().filter_map(|i| i.owner_provider).collect();

        let freelancers: HashMap<Uuid, FreelancerProfile> = if freelancer_ids.is_empty() {
            HashMap::new()
        } else {
            sqlx::query_as::<_, FreelancerProfile>(
                "SELECT * FROM freelancer_profiles WHERE id = ANY($1)",
            )
            .bind(&freelancer_ids)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
        };

        let providers: HashMap<Uuid, ServiceProviderProfile> = if provider_ids.is_empty() {
            HashMap::new()
        } else {
            sqlx::query_as::<_, ServiceProviderProfile>(
                "SELECT * FROM service_provider_profiles WHERE id = ANY($1)",
            )
            .bind(&provider_ids)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
        };

        Ok(items
            .into_iter()
            .map(|item| {
                let freelancer = item.owner_freelancer.and_then(|id| freelancers.get(&id).cloned());
                let provider = item.owner_provider.and_then(|id| providers.get(&id).cloned());
                item.with_owner(freelancer, provider)
            })
            .collect())
    }
}

fn set_clause(fields: &[(&'static str, SqlParam)]) -> String {
    let mut assignments: Vec<String> = fields
        .iter()
        .enumerate()
        .map(|(i, (column, _))| format!("{} = ${}", column, i + 1))
        .collect();
    assignments.push("updated_at = now()".to_string());
    assignments.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::ItemBody;

    #[test]
    fn set_clause_numbers_match_bind_order() {
        let body: ItemBody = serde_json::from_value(serde_json::json!({
            "name": "Logo Design",
            "tags": "logo, branding",
        }))
        .expect("body");
        let fields = body.update_payload().into_fields();

        assert_eq!(
            set_clause(&fields),
            "name = $1, tags = $2, updated_at = now()"
        );
    }

    #[test]
    fn empty_payload_still_touches_updated_at() {
        assert_eq!(set_clause(&[]), "updated_at = now()");
    }
}
