//! PostgreSQL adapter for deposit position storage

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{DepositId, DomainPort, PortError};
use domain_deposit::{DepositPosition, DepositProductType, DepositStatus, DepositStorePort};

use crate::error::DatabaseError;

fn port(err: sqlx::Error) -> PortError {
    DatabaseError::from(err).into()
}

#[derive(Debug, sqlx::FromRow)]
struct DepositRow {
    deposit_id: Uuid,
    customer_ci: String,
    account_number: String,
    irp_account_number: String,
    product_type: i16,
    contract_period: i32,
    rate: Decimal,
    subscription_date: NaiveDate,
    maturity_date: NaiveDate,
    current_balance: Decimal,
    unpaid_interest: Decimal,
    last_calculation_date: Option<NaiveDate>,
    rollover_eligible: bool,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DepositRow {
    fn into_domain(self) -> Result<DepositPosition, PortError> {
        let product_type = DepositProductType::from_code(self.product_type)
            .map_err(|e| DatabaseError::InvalidValue(e.to_string()))?;
        let contract_period = u32::try_from(self.contract_period).map_err(|_| {
            PortError::from(DatabaseError::InvalidValue(format!(
                "contract_period: {}",
                self.contract_period
            )))
        })?;
        Ok(DepositPosition {
            id: DepositId::from(self.deposit_id),
            customer_ci: self.customer_ci,
            account_number: self.account_number,
            irp_account_number: self.irp_account_number,
            product_type,
            contract_period,
            rate: self.rate,
            subscription_date: self.subscription_date,
            maturity_date: self.maturity_date,
            current_balance: self.current_balance,
            unpaid_interest: self.unpaid_interest,
            last_calculation_date: self.last_calculation_date,
            rollover_eligible: self.rollover_eligible,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_status(raw: &str) -> Result<DepositStatus, PortError> {
    match raw {
        "ACTIVE" => Ok(DepositStatus::Active),
        "MATURED" => Ok(DepositStatus::Matured),
        "CLOSED" => Ok(DepositStatus::Closed),
        other => Err(DatabaseError::InvalidValue(format!("deposit status: {other}")).into()),
    }
}

fn status_str(status: DepositStatus) -> &'static str {
    match status {
        DepositStatus::Active => "ACTIVE",
        DepositStatus::Matured => "MATURED",
        DepositStatus::Closed => "CLOSED",
    }
}

const DEPOSIT_SELECT: &str = "SELECT deposit_id, customer_ci, account_number, \
     irp_account_number, product_type, contract_period, rate, subscription_date, \
     maturity_date, current_balance, unpaid_interest, last_calculation_date, \
     rollover_eligible, status, created_at, updated_at FROM deposit_positions";

/// Deposit position store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgDepositStore {
    pool: PgPool,
}

impl PgDepositStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgDepositStore {}

#[async_trait]
impl DepositStorePort for PgDepositStore {
    async fn find_by_account(
        &self,
        account_number: &str,
    ) -> Result<Option<DepositPosition>, PortError> {
        let row: Option<DepositRow> =
            sqlx::query_as(&format!("{DEPOSIT_SELECT} WHERE account_number = $1"))
                .bind(account_number)
                .fetch_optional(&self.pool)
                .await
                .map_err(port)?;

        row.map(DepositRow::into_domain).transpose()
    }

    async fn find_active(&self) -> Result<Vec<DepositPosition>, PortError> {
        let rows: Vec<DepositRow> = sqlx::query_as(&format!(
            "{DEPOSIT_SELECT} WHERE status = 'ACTIVE' ORDER BY account_number"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(port)?;

        rows.into_iter().map(DepositRow::into_domain).collect()
    }

    async fn find_maturing(&self, date: NaiveDate) -> Result<Vec<DepositPosition>, PortError> {
        let rows: Vec<DepositRow> = sqlx::query_as(&format!(
            "{DEPOSIT_SELECT} WHERE status = 'ACTIVE' AND maturity_date = $1 \
             ORDER BY account_number"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(port)?;

        rows.into_iter().map(DepositRow::into_domain).collect()
    }

    async fn save(&self, deposit: &DepositPosition) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO deposit_positions \
             (deposit_id, customer_ci, account_number, irp_account_number, product_type, \
              contract_period, rate, subscription_date, maturity_date, current_balance, \
              unpaid_interest, last_calculation_date, rollover_eligible, status, \
              created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             ON CONFLICT (account_number) DO UPDATE SET \
             current_balance = EXCLUDED.current_balance, \
             unpaid_interest = EXCLUDED.unpaid_interest, \
             last_calculation_date = EXCLUDED.last_calculation_date, \
             rollover_eligible = EXCLUDED.rollover_eligible, \
             status = EXCLUDED.status, \
             updated_at = EXCLUDED.updated_at",
        )
        .bind(Uuid::from(deposit.id))
        .bind(&deposit.customer_ci)
        .bind(&deposit.account_number)
        .bind(&deposit.irp_account_number)
        .bind(deposit.product_type.code())
        .bind(deposit.contract_period as i32)
        .bind(deposit.rate)
        .bind(deposit.subscription_date)
        .bind(deposit.maturity_date)
        .bind(deposit.current_balance)
        .bind(deposit.unpaid_interest)
        .bind(deposit.last_calculation_date)
        .bind(deposit.rollover_eligible)
        .bind(status_str(deposit.status))
        .bind(deposit.created_at)
        .bind(deposit.updated_at)
        .execute(&self.pool)
        .await
        .map_err(port)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            DepositStatus::Active,
            DepositStatus::Matured,
            DepositStatus::Closed,
        ] {
            assert_eq!(parse_status(status_str(status)).unwrap(), status);
        }
        assert!(parse_status("PENDING").is_err());
    }
}
