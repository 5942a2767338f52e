use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{FreelancerProfile, ServiceProviderProfile};
use crate::filter::{OwnerFilter, OwnerType};

/// Result of resolving a user's marketplace identity. `Missing` covers both
/// "no profile yet" and "role has no marketplace presence"; each call site
/// picks its own response mapping.
#[derive(Debug, Clone, Copy)]
pub enum OwnerResolution {
    Found(OwnerFilter),
    Missing,
}

/// Looks up owner profiles by user id. Read-only: profile lifecycle belongs
/// to the profiles feature.
#[derive(Clone)]
pub struct OwnerService {
    pool: PgPool,
}

impl OwnerService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_freelancer(
        &self,
        user_id: Uuid,
    ) -> Result<Option<FreelancerProfile>, DatabaseError> {
        let profile = sqlx::query_as::<_, FreelancerProfile>(
            "SELECT * FROM freelancer_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn find_provider(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ServiceProviderProfile>, DatabaseError> {
        let profile = sqlx::query_as::<_, ServiceProviderProfile>(
            "SELECT * FROM service_provider_profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    /// Resolve the ownership filter for a user under a role.
    pub async fn resolve(
        &self,
        user_id: Uuid,
        role: &str,
    ) -> Result<OwnerResolution, DatabaseError> {
        let Some(owner_type) = OwnerType::from_role(role) else {
            return Ok(OwnerResolution::Missing);
        };

        let profile_id = match owner_type {
            OwnerType::Freelancer => self.find_freelancer(user_id).await?.map(|p| p.id),
            OwnerType::ServiceProvider => self.find_provider(user_id).await?.map(|p| p.id),
        };

        Ok(match profile_id {
            Some(profile_id) => OwnerResolution::Found(OwnerFilter {
                owner_type,
                profile_id,
            }),
            None => OwnerResolution::Missing,
        })
    }
}
