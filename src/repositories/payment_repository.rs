//! Repositorio PostgreSQL de pagos

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::payment::Payment;
use crate::repositories::PaymentRepository;
use crate::utils::errors::{not_found_error, AppResult};

pub struct PgPaymentRepository {
    pool: PgPool,
}

impl PgPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for PgPaymentRepository {
    async fn create(
        &self,
        trip_id: Uuid,
        amount: Decimal,
        payment_date: DateTime<Utc>,
    ) -> AppResult<Payment> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (id, trip_id, amount, payment_date)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(trip_id)
        .bind(amount)
        .bind(payment_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(payment)
    }

    async fn find_by_id(&self, payment_id: Uuid) -> AppResult<Payment> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found_error("Payment", &payment_id.to_string()))
    }

    async fn delete(&self, payment_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(payment_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found_error("Payment", &payment_id.to_string()));
        }
        Ok(())
    }
}
