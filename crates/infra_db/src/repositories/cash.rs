//! PostgreSQL dual-record cash ledger
//!
//! Production implementation of the cash ledger port. One `apply` runs in a
//! single transaction: both balance rows are taken with `FOR UPDATE`, which
//! serializes movements per account across processes, and the statement entry
//! lands in the same commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, error};
use uuid::Uuid;

use core_kernel::{CashEntryId, DomainPort, PortError};
use domain_cash::{
    AccountStatus, CashEntry, CashError, CashPosting, EntryCategory, EntryDirection, IrpRecord,
    LedgerPort, ReferenceGenerator,
};

use crate::error::DatabaseError;

#[derive(Debug, sqlx::FromRow)]
struct IrpRow {
    account_number: String,
    customer_ci: String,
    balance: Decimal,
    total_contribution: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl IrpRow {
    fn into_record(self) -> Result<IrpRecord, PortError> {
        Ok(IrpRecord {
            account_number: self.account_number,
            customer_ci: self.customer_ci,
            balance: self.balance,
            total_contribution: self.total_contribution,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    entry_id: Uuid,
    account_number: String,
    direction: String,
    category: String,
    amount: Decimal,
    balance_after: Decimal,
    description: String,
    reference: String,
    posted_at: DateTime<Utc>,
}

impl EntryRow {
    fn into_entry(self) -> Result<CashEntry, PortError> {
        Ok(CashEntry {
            id: CashEntryId::from(self.entry_id),
            account_number: self.account_number,
            direction: parse_direction(&self.direction)?,
            category: parse_category(&self.category)?,
            amount: self.amount,
            balance_after: self.balance_after,
            description: self.description,
            reference: self.reference,
            posted_at: self.posted_at,
        })
    }
}

fn parse_status(raw: &str) -> Result<AccountStatus, PortError> {
    match raw {
        "ACTIVE" => Ok(AccountStatus::Active),
        "SUSPENDED" => Ok(AccountStatus::Suspended),
        "CLOSED" => Ok(AccountStatus::Closed),
        other => Err(PortError::internal(format!("unknown account status {other}"))),
    }
}

fn parse_direction(raw: &str) -> Result<EntryDirection, PortError> {
    match raw {
        "CREDIT" => Ok(EntryDirection::Credit),
        "DEBIT" => Ok(EntryDirection::Debit),
        other => Err(PortError::internal(format!("unknown entry direction {other}"))),
    }
}

fn category_str(category: EntryCategory) -> &'static str {
    match category {
        EntryCategory::Investment => "INVESTMENT",
        EntryCategory::Deposit => "DEPOSIT",
        EntryCategory::Interest => "INTEREST",
        EntryCategory::Contribution => "CONTRIBUTION",
    }
}

fn parse_category(raw: &str) -> Result<EntryCategory, PortError> {
    match raw {
        "INVESTMENT" => Ok(EntryCategory::Investment),
        "DEPOSIT" => Ok(EntryCategory::Deposit),
        "INTEREST" => Ok(EntryCategory::Interest),
        "CONTRIBUTION" => Ok(EntryCategory::Contribution),
        other => Err(PortError::internal(format!("unknown entry category {other}"))),
    }
}

fn storage(err: sqlx::Error) -> CashError {
    CashError::Storage(DatabaseError::from(err).into())
}

const IRP_SELECT: &str = "SELECT account_number, customer_ci, balance, total_contribution, \
     status, created_at, updated_at FROM irp_accounts";

/// Cash ledger backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgCashLedger {
    pool: PgPool,
    references: std::sync::Arc<ReferenceGenerator>,
}

impl PgCashLedger {
    pub fn new(pool: PgPool) -> Self {
        Self::with_bank_code(pool, "HANA")
    }

    pub fn with_bank_code(pool: PgPool, bank_code: impl Into<String>) -> Self {
        Self {
            pool,
            references: std::sync::Arc::new(ReferenceGenerator::new(bank_code)),
        }
    }

    /// Opens an account: inserts both balance rows in one transaction
    pub async fn open_account(
        &self,
        account_number: &str,
        customer_ci: &str,
        opening_balance: Decimal,
    ) -> Result<(), CashError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(storage)?;

        sqlx::query(
            "INSERT INTO irp_accounts \
             (account_number, customer_ci, balance, total_contribution, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $3, 'ACTIVE', $4, $4)",
        )
        .bind(account_number)
        .bind(customer_ci)
        .bind(opening_balance)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        sqlx::query(
            "INSERT INTO mirror_accounts (account_number, balance, updated_at) VALUES ($1, $2, $3)",
        )
        .bind(account_number)
        .bind(opening_balance)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        tx.commit().await.map_err(storage)?;
        Ok(())
    }
}

impl DomainPort for PgCashLedger {}

#[async_trait]
impl LedgerPort for PgCashLedger {
    async fn apply(
        &self,
        account_number: &str,
        delta: Decimal,
        category: EntryCategory,
        description: &str,
        at: DateTime<Utc>,
    ) -> Result<CashPosting, CashError> {
        if delta.is_zero() {
            return Err(CashError::ZeroAmount);
        }

        let mut tx = self.pool.begin().await.map_err(storage)?;

        let irp: Option<IrpRow> =
            sqlx::query_as(&format!("{IRP_SELECT} WHERE account_number = $1 FOR UPDATE"))
                .bind(account_number)
                .fetch_optional(&mut *tx)
                .await
                .map_err(storage)?;
        let irp = irp.ok_or_else(|| CashError::AccountNotFound(account_number.to_string()))?;

        let mirror_balance: Option<Decimal> = sqlx::query_scalar(
            "SELECT balance FROM mirror_accounts WHERE account_number = $1 FOR UPDATE",
        )
        .bind(account_number)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?;
        let mirror_balance =
            mirror_balance.ok_or_else(|| CashError::AccountNotFound(account_number.to_string()))?;

        if parse_status(&irp.status)? != AccountStatus::Active {
            return Err(CashError::AccountNotActive(account_number.to_string()));
        }
        if irp.balance != mirror_balance {
            error!(
                account = %account_number,
                irp = %irp.balance,
                mirror = %mirror_balance,
                "refusing movement: ledger records disagree"
            );
            return Err(CashError::DriftDetected {
                account_number: account_number.to_string(),
                irp_balance: irp.balance,
                mirror_balance,
            });
        }

        let before = irp.balance;
        let after = before + delta;
        if after < Decimal::ZERO {
            return Err(CashError::InsufficientBalance {
                balance: before,
                required: -delta,
            });
        }

        let contribution_delta =
            if category == EntryCategory::Contribution && delta > Decimal::ZERO {
                delta
            } else {
                Decimal::ZERO
            };

        sqlx::query(
            "UPDATE irp_accounts SET balance = $1, \
             total_contribution = total_contribution + $2, updated_at = $3 \
             WHERE account_number = $4",
        )
        .bind(after)
        .bind(contribution_delta)
        .bind(at)
        .bind(account_number)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        sqlx::query("UPDATE mirror_accounts SET balance = $1, updated_at = $2 WHERE account_number = $3")
            .bind(after)
            .bind(at)
            .bind(account_number)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;

        let entry_id = CashEntryId::new_v7();
        let reference = self.references.next(category, at);
        let direction = if delta > Decimal::ZERO { "CREDIT" } else { "DEBIT" };
        sqlx::query(
            "INSERT INTO cash_entries \
             (entry_id, account_number, direction, category, amount, balance_after, \
              description, reference, posted_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(Uuid::from(entry_id))
        .bind(account_number)
        .bind(direction)
        .bind(category_str(category))
        .bind(delta.abs())
        .bind(after)
        .bind(description)
        .bind(&reference)
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;

        tx.commit().await.map_err(storage)?;

        debug!(
            account = %account_number,
            %delta,
            %before,
            %after,
            %reference,
            "cash movement committed to both records"
        );

        Ok(CashPosting {
            entry_id,
            reference,
            balance_before: before,
            balance_after: after,
        })
    }

    async fn balance_of(&self, account_number: &str) -> Result<Decimal, CashError> {
        let irp_balance: Option<Decimal> =
            sqlx::query_scalar("SELECT balance FROM irp_accounts WHERE account_number = $1")
                .bind(account_number)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage)?;
        let irp_balance =
            irp_balance.ok_or_else(|| CashError::AccountNotFound(account_number.to_string()))?;

        let mirror_balance: Option<Decimal> =
            sqlx::query_scalar("SELECT balance FROM mirror_accounts WHERE account_number = $1")
                .bind(account_number)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage)?;
        let mirror_balance =
            mirror_balance.ok_or_else(|| CashError::AccountNotFound(account_number.to_string()))?;

        if irp_balance != mirror_balance {
            return Err(CashError::DriftDetected {
                account_number: account_number.to_string(),
                irp_balance,
                mirror_balance,
            });
        }
        Ok(irp_balance)
    }

    async fn find_active_account(&self, customer_ci: &str) -> Result<IrpRecord, CashError> {
        let row: Option<IrpRow> = sqlx::query_as(&format!(
            "{IRP_SELECT} WHERE customer_ci = $1 AND status = 'ACTIVE' LIMIT 1"
        ))
        .bind(customer_ci)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        row.ok_or_else(|| CashError::NoActiveAccountForCustomer(customer_ci.to_string()))?
            .into_record()
            .map_err(CashError::Storage)
    }

    async fn entries_for(&self, account_number: &str) -> Result<Vec<CashEntry>, CashError> {
        let rows: Vec<EntryRow> = sqlx::query_as(
            "SELECT entry_id, account_number, direction, category, amount, balance_after, \
             description, reference, posted_at \
             FROM cash_entries WHERE account_number = $1 ORDER BY posted_at, entry_id",
        )
        .bind(account_number)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        rows.into_iter()
            .map(|row| row.into_entry().map_err(CashError::Storage))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        assert_eq!(parse_status("ACTIVE").unwrap(), AccountStatus::Active);
        assert!(parse_status("???").is_err());
    }

    #[test]
    fn test_category_round_trip() {
        for category in [
            EntryCategory::Investment,
            EntryCategory::Deposit,
            EntryCategory::Interest,
            EntryCategory::Contribution,
        ] {
            assert_eq!(parse_category(category_str(category)).unwrap(), category);
        }
    }
}
