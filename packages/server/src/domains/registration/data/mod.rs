//! Postgres implementation of the registration store.
//!
//! All mutations after creation are single-row conditional updates
//! (`WHERE application_id = $n`); no multi-row transaction is assumed by the
//! callers, which is exactly why the fan-out step can tolerate partial
//! failure. Only `create_group_rows` uses a transaction, because the store
//! contract promises the group's rows appear atomically.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::common::ApplicationId;
use crate::domains::registration::models::{NewRegistrationRow, Registration, RegistrationPatch};
use crate::kernel::traits::{BaseRegistrationStore, CreatedGroup, PendingQueue};

const SQL_INSERT: &str = r#"
INSERT INTO registrations (
    application_id,
    parent_application_id,
    full_name,
    email,
    stay_type,
    registration_fee
) VALUES ($1, $2, $3, $4, $5, $6)
"#;

#[derive(Clone)]
pub struct PostgresRegistrationStore {
    pool: PgPool,
}

impl PostgresRegistrationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseRegistrationStore for PostgresRegistrationStore {
    async fn create_group_rows(
        &self,
        primary: NewRegistrationRow,
        attendees: Vec<NewRegistrationRow>,
    ) -> Result<CreatedGroup> {
        let mut tx = self.pool.begin().await?;

        let primary_id = ApplicationId::generate();
        sqlx::query(SQL_INSERT)
            .bind(primary_id.as_str())
            .bind(Option::<&str>::None)
            .bind(&primary.full_name)
            .bind(&primary.email)
            .bind(primary.stay_type)
            .bind(primary.registration_fee)
            .execute(&mut *tx)
            .await?;

        let mut attendee_ids = Vec::with_capacity(attendees.len());
        for attendee in &attendees {
            let id = ApplicationId::generate();
            sqlx::query(SQL_INSERT)
                .bind(id.as_str())
                .bind(Some(primary_id.as_str()))
                .bind(&attendee.full_name)
                .bind(&attendee.email)
                .bind(attendee.stay_type)
                .bind(attendee.registration_fee)
                .execute(&mut *tx)
                .await?;
            attendee_ids.push(id);
        }

        tx.commit().await?;

        Ok(CreatedGroup {
            application_id: primary_id,
            attendee_application_ids: attendee_ids,
        })
    }

    async fn update_registration(
        &self,
        application_id: &ApplicationId,
        patch: RegistrationPatch,
    ) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE registrations SET updated_at = NOW()");

        if let Some(v) = patch.payment_status {
            qb.push(", payment_status = ").push_bind(v);
        }
        if let Some(v) = patch.registration_status {
            qb.push(", registration_status = ").push_bind(v);
        }
        if let Some(v) = patch.payment_proof_url {
            qb.push(", payment_proof_url = ").push_bind(v);
        }
        if let Some(v) = patch.payment_receipt_url {
            qb.push(", payment_receipt_url = ").push_bind(v);
        }
        if let Some(v) = patch.accounts_verified {
            qb.push(", accounts_verified = ").push_bind(v);
        }
        if let Some(v) = patch.accounts_verified_by {
            qb.push(", accounts_verified_by = ").push_bind(v);
        }
        if let Some(v) = patch.accounts_verified_at {
            qb.push(", accounts_verified_at = ").push_bind(v);
        }
        if let Some(v) = patch.approved_by {
            qb.push(", approved_by = ").push_bind(v);
        }
        if let Some(v) = patch.approved_at {
            qb.push(", approved_at = ").push_bind(v);
        }
        if let Some(v) = patch.edit_mode_enabled {
            qb.push(", edit_mode_enabled = ").push_bind(v);
        }
        if let Some(v) = patch.edit_mode_enabled_by {
            qb.push(", edit_mode_enabled_by = ").push_bind(v);
        }
        if let Some(v) = patch.edit_mode_enabled_at {
            qb.push(", edit_mode_enabled_at = ").push_bind(v);
        }
        if let Some(v) = patch.edit_mode_reason {
            qb.push(", edit_mode_reason = ").push_bind(v);
        }
        if let Some(v) = patch.pending_admin_approval {
            qb.push(", pending_admin_approval = ").push_bind(v);
        }

        qb.push(" WHERE application_id = ")
            .push_bind(application_id.as_str().to_string());

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            anyhow::bail!("no registration with application id {}", application_id);
        }
        Ok(())
    }

    async fn select_by_parent(&self, parent: &ApplicationId) -> Result<Vec<Registration>> {
        sqlx::query_as::<_, Registration>(
            "SELECT * FROM registrations WHERE parent_application_id = $1 ORDER BY created_at",
        )
        .bind(parent.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    async fn select_by_application_id(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<Registration>> {
        sqlx::query_as::<_, Registration>("SELECT * FROM registrations WHERE application_id = $1")
            .bind(application_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(Into::into)
    }

    async fn select_pending(&self, queue: PendingQueue) -> Result<Vec<Registration>> {
        let sql = match queue {
            PendingQueue::AccountsReview => {
                "SELECT * FROM registrations
                 WHERE payment_status = 'submitted' AND accounts_verified = FALSE
                 ORDER BY created_at"
            }
            PendingQueue::AdminApproval => {
                "SELECT * FROM registrations
                 WHERE accounts_verified = TRUE AND registration_status = 'pending'
                 ORDER BY created_at"
            }
        };
        sqlx::query_as::<_, Registration>(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Into::into)
    }
}
