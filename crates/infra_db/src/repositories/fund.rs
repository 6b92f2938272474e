//! PostgreSQL adapters for the fund catalog, NAV store, positions, and trades

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{DomainPort, NavId, PortError, PositionId, TradeId};
use domain_fund::{
    FeeSchedule, FundCatalogPort, FundClass, LoadType, NavQuote, NavStorePort, Position,
    PositionStatus, PositionStorePort, SaleStatus, TradeLogPort, TradeRecord, TradeSide,
    TradingRule,
};

use crate::error::DatabaseError;

fn port(err: sqlx::Error) -> PortError {
    DatabaseError::from(err).into()
}

fn invalid(field: &str, raw: impl std::fmt::Display) -> PortError {
    DatabaseError::InvalidValue(format!("{field}: {raw}")).into()
}

fn to_u32(value: i32, field: &str) -> Result<u32, PortError> {
    u32::try_from(value).map_err(|_| invalid(field, value))
}

// ---------------------------------------------------------------------------
// Fund catalog
// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct FundClassRow {
    code: String,
    fund_code: String,
    fund_name: String,
    class_code: String,
    load_type: String,
    sale_status: String,
    mgmt_bps: i32,
    sales_bps: Option<i32>,
    trustee_bps: i32,
    admin_bps: i32,
    front_load_pct: Option<Decimal>,
    cutoff: NaiveTime,
    buy_settle_days: Option<i32>,
    redeem_settle_days: Option<i32>,
    min_initial_amount: Decimal,
    min_additional_amount: Decimal,
    redemption_fee_rate: Option<Decimal>,
    redemption_fee_days: Option<i32>,
}

impl FundClassRow {
    fn into_domain(self) -> Result<FundClass, PortError> {
        let load_type = match self.load_type.as_str() {
            "FRONT_LOAD" => LoadType::FrontLoad,
            "BACK_LOAD" => LoadType::BackLoad,
            "NO_LOAD" => LoadType::NoLoad,
            other => return Err(invalid("load_type", other)),
        };
        let sale_status = match self.sale_status.as_str() {
            "ON_SALE" => SaleStatus::OnSale,
            "SUSPENDED" => SaleStatus::Suspended,
            other => return Err(invalid("sale_status", other)),
        };

        Ok(FundClass {
            code: self.code,
            fund_code: self.fund_code,
            fund_name: self.fund_name,
            class_code: self.class_code,
            load_type,
            sale_status,
            fees: FeeSchedule {
                mgmt_bps: to_u32(self.mgmt_bps, "mgmt_bps")?,
                sales_bps: self.sales_bps.map(|v| to_u32(v, "sales_bps")).transpose()?,
                trustee_bps: to_u32(self.trustee_bps, "trustee_bps")?,
                admin_bps: to_u32(self.admin_bps, "admin_bps")?,
                front_load_pct: self.front_load_pct,
            },
            trading: TradingRule {
                cutoff: self.cutoff,
                buy_settle_days: self
                    .buy_settle_days
                    .map(|v| to_u32(v, "buy_settle_days"))
                    .transpose()?,
                redeem_settle_days: self
                    .redeem_settle_days
                    .map(|v| to_u32(v, "redeem_settle_days"))
                    .transpose()?,
                min_initial_amount: self.min_initial_amount,
                min_additional_amount: self.min_additional_amount,
                redemption_fee_rate: self.redemption_fee_rate,
                redemption_fee_days: self
                    .redemption_fee_days
                    .map(|v| to_u32(v, "redemption_fee_days"))
                    .transpose()?,
            },
        })
    }
}

/// Share-class catalog backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgFundCatalog {
    pool: PgPool,
}

impl PgFundCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgFundCatalog {}

#[async_trait]
impl FundCatalogPort for PgFundCatalog {
    async fn find_class(&self, code: &str) -> Result<Option<FundClass>, PortError> {
        let row: Option<FundClassRow> = sqlx::query_as(
            "SELECT code, fund_code, fund_name, class_code, load_type, sale_status, \
             mgmt_bps, sales_bps, trustee_bps, admin_bps, front_load_pct, \
             cutoff, buy_settle_days, redeem_settle_days, \
             min_initial_amount, min_additional_amount, \
             redemption_fee_rate, redemption_fee_days \
             FROM fund_classes WHERE code = $1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(port)?;

        row.map(FundClassRow::into_domain).transpose()
    }
}

// ---------------------------------------------------------------------------
// NAV store
// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct NavRow {
    nav_id: Uuid,
    fund_class_code: String,
    nav_date: NaiveDate,
    nav: Decimal,
    published_at: DateTime<Utc>,
}

impl From<NavRow> for NavQuote {
    fn from(row: NavRow) -> Self {
        NavQuote {
            id: NavId::from(row.nav_id),
            fund_class_code: row.fund_class_code,
            nav_date: row.nav_date,
            nav: row.nav,
            published_at: row.published_at,
        }
    }
}

const NAV_SELECT: &str =
    "SELECT nav_id, fund_class_code, nav_date, nav, published_at FROM nav_quotes";

/// NAV quote store backed by PostgreSQL, one row per (class, date)
#[derive(Debug, Clone)]
pub struct PgNavStore {
    pool: PgPool,
}

impl PgNavStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgNavStore {}

#[async_trait]
impl NavStorePort for PgNavStore {
    async fn publish(&self, quote: NavQuote) -> Result<Option<NavQuote>, PortError> {
        // Read the previous quote under the same transaction so a correction
        // reports exactly the row it replaced.
        let mut tx = self.pool.begin().await.map_err(port)?;

        let previous: Option<NavRow> = sqlx::query_as(&format!(
            "{NAV_SELECT} WHERE fund_class_code = $1 AND nav_date = $2 FOR UPDATE"
        ))
        .bind(&quote.fund_class_code)
        .bind(quote.nav_date)
        .fetch_optional(&mut *tx)
        .await
        .map_err(port)?;

        sqlx::query(
            "INSERT INTO nav_quotes (nav_id, fund_class_code, nav_date, nav, published_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (fund_class_code, nav_date) \
             DO UPDATE SET nav = EXCLUDED.nav, published_at = EXCLUDED.published_at",
        )
        .bind(Uuid::from(quote.id))
        .bind(&quote.fund_class_code)
        .bind(quote.nav_date)
        .bind(quote.nav)
        .bind(quote.published_at)
        .execute(&mut *tx)
        .await
        .map_err(port)?;

        tx.commit().await.map_err(port)?;
        Ok(previous.map(NavQuote::from))
    }

    async fn find_for_date(
        &self,
        fund_class_code: &str,
        date: NaiveDate,
    ) -> Result<Option<NavQuote>, PortError> {
        let row: Option<NavRow> = sqlx::query_as(&format!(
            "{NAV_SELECT} WHERE fund_class_code = $1 AND nav_date = $2"
        ))
        .bind(fund_class_code)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(port)?;

        Ok(row.map(NavQuote::from))
    }

    async fn find_latest(
        &self,
        fund_class_code: &str,
        date: NaiveDate,
    ) -> Result<Option<NavQuote>, PortError> {
        let row: Option<NavRow> = sqlx::query_as(&format!(
            "{NAV_SELECT} WHERE fund_class_code = $1 AND nav_date <= $2 \
             ORDER BY nav_date DESC LIMIT 1"
        ))
        .bind(fund_class_code)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(port)?;

        Ok(row.map(NavQuote::from))
    }
}

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct PositionRow {
    position_id: Uuid,
    customer_ci: String,
    account_number: String,
    fund_class_code: String,
    fund_name: String,
    class_code: String,
    purchase_date: NaiveDate,
    purchase_amount: Decimal,
    purchase_fee: Decimal,
    purchase_units: Decimal,
    purchase_nav: Decimal,
    current_units: Decimal,
    current_nav: Decimal,
    current_value: Decimal,
    total_return: Decimal,
    return_rate: Decimal,
    accumulated_fees: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PositionRow {
    fn into_domain(self) -> Result<Position, PortError> {
        let status = parse_position_status(&self.status)?;
        Ok(Position {
            id: PositionId::from(self.position_id),
            customer_ci: self.customer_ci,
            account_number: self.account_number,
            fund_class_code: self.fund_class_code,
            fund_name: self.fund_name,
            class_code: self.class_code,
            purchase_date: self.purchase_date,
            purchase_amount: self.purchase_amount,
            purchase_fee: self.purchase_fee,
            purchase_units: self.purchase_units,
            purchase_nav: self.purchase_nav,
            current_units: self.current_units,
            current_nav: self.current_nav,
            current_value: self.current_value,
            total_return: self.total_return,
            return_rate: self.return_rate,
            accumulated_fees: self.accumulated_fees,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn parse_position_status(raw: &str) -> Result<PositionStatus, PortError> {
    match raw {
        "ACTIVE" => Ok(PositionStatus::Active),
        "PARTIAL_SOLD" => Ok(PositionStatus::PartialSold),
        "SOLD" => Ok(PositionStatus::Sold),
        other => Err(invalid("position status", other)),
    }
}

fn position_status_str(status: PositionStatus) -> &'static str {
    match status {
        PositionStatus::Active => "ACTIVE",
        PositionStatus::PartialSold => "PARTIAL_SOLD",
        PositionStatus::Sold => "SOLD",
    }
}

const POSITION_SELECT: &str = "SELECT position_id, customer_ci, account_number, \
     fund_class_code, fund_name, class_code, purchase_date, purchase_amount, purchase_fee, \
     purchase_units, purchase_nav, current_units, current_nav, current_value, total_return, \
     return_rate, accumulated_fees, status, created_at, updated_at FROM fund_positions";

/// Fund position store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgPositionStore {
    pool: PgPool,
}

impl PgPositionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgPositionStore {}

#[async_trait]
impl PositionStorePort for PgPositionStore {
    async fn find_by_id(&self, id: PositionId) -> Result<Option<Position>, PortError> {
        let row: Option<PositionRow> =
            sqlx::query_as(&format!("{POSITION_SELECT} WHERE position_id = $1"))
                .bind(Uuid::from(id))
                .fetch_optional(&self.pool)
                .await
                .map_err(port)?;

        row.map(PositionRow::into_domain).transpose()
    }

    async fn find_open(
        &self,
        customer_ci: &str,
        fund_class_code: &str,
    ) -> Result<Option<Position>, PortError> {
        let row: Option<PositionRow> = sqlx::query_as(&format!(
            "{POSITION_SELECT} WHERE customer_ci = $1 AND fund_class_code = $2 \
             AND status <> 'SOLD' ORDER BY created_at LIMIT 1"
        ))
        .bind(customer_ci)
        .bind(fund_class_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(port)?;

        row.map(PositionRow::into_domain).transpose()
    }

    async fn save(&self, position: &Position) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO fund_positions \
             (position_id, customer_ci, account_number, fund_class_code, fund_name, class_code, \
              purchase_date, purchase_amount, purchase_fee, purchase_units, purchase_nav, \
              current_units, current_nav, current_value, total_return, return_rate, \
              accumulated_fees, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, \
                     $11, $12, $13, $14, $15, $16, $17, $18, $19, $20) \
             ON CONFLICT (position_id) DO UPDATE SET \
             purchase_amount = EXCLUDED.purchase_amount, \
             purchase_fee = EXCLUDED.purchase_fee, \
             purchase_units = EXCLUDED.purchase_units, \
             purchase_nav = EXCLUDED.purchase_nav, \
             current_units = EXCLUDED.current_units, \
             current_nav = EXCLUDED.current_nav, \
             current_value = EXCLUDED.current_value, \
             total_return = EXCLUDED.total_return, \
             return_rate = EXCLUDED.return_rate, \
             accumulated_fees = EXCLUDED.accumulated_fees, \
             status = EXCLUDED.status, \
             updated_at = EXCLUDED.updated_at",
        )
        .bind(Uuid::from(position.id))
        .bind(&position.customer_ci)
        .bind(&position.account_number)
        .bind(&position.fund_class_code)
        .bind(&position.fund_name)
        .bind(&position.class_code)
        .bind(position.purchase_date)
        .bind(position.purchase_amount)
        .bind(position.purchase_fee)
        .bind(position.purchase_units)
        .bind(position.purchase_nav)
        .bind(position.current_units)
        .bind(position.current_nav)
        .bind(position.current_value)
        .bind(position.total_return)
        .bind(position.return_rate)
        .bind(position.accumulated_fees)
        .bind(position_status_str(position.status))
        .bind(position.created_at)
        .bind(position.updated_at)
        .execute(&self.pool)
        .await
        .map_err(port)?;

        Ok(())
    }

    async fn delete(&self, id: PositionId) -> Result<(), PortError> {
        sqlx::query("DELETE FROM fund_positions WHERE position_id = $1")
            .bind(Uuid::from(id))
            .execute(&self.pool)
            .await
            .map_err(port)?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Trade log
// ---------------------------------------------------------------------------

#[derive(Debug, sqlx::FromRow)]
struct TradeRow {
    trade_id: Uuid,
    position_id: Uuid,
    account_number: String,
    fund_class_code: String,
    side: String,
    nav: Decimal,
    units: Decimal,
    gross_amount: Decimal,
    fee: Decimal,
    profit: Option<Decimal>,
    profit_rate: Option<Decimal>,
    balance_before: Decimal,
    balance_after: Decimal,
    trade_date: NaiveDate,
    settlement_date: NaiveDate,
    cash_reference: String,
    created_at: DateTime<Utc>,
}

impl TradeRow {
    fn into_domain(self) -> Result<TradeRecord, PortError> {
        let side = match self.side.as_str() {
            "BUY" => TradeSide::Buy,
            "SELL" => TradeSide::Sell,
            other => return Err(invalid("trade side", other)),
        };
        Ok(TradeRecord {
            id: TradeId::from(self.trade_id),
            position_id: PositionId::from(self.position_id),
            account_number: self.account_number,
            fund_class_code: self.fund_class_code,
            side,
            nav: self.nav,
            units: self.units,
            gross_amount: self.gross_amount,
            fee: self.fee,
            profit: self.profit,
            profit_rate: self.profit_rate,
            balance_before: self.balance_before,
            balance_after: self.balance_after,
            trade_date: self.trade_date,
            settlement_date: self.settlement_date,
            cash_reference: self.cash_reference,
            created_at: self.created_at,
        })
    }
}

fn trade_side_str(side: TradeSide) -> &'static str {
    match side {
        TradeSide::Buy => "BUY",
        TradeSide::Sell => "SELL",
    }
}

/// Append-only trade log backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgTradeLog {
    pool: PgPool,
}

impl PgTradeLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgTradeLog {}

#[async_trait]
impl TradeLogPort for PgTradeLog {
    async fn append(&self, trade: &TradeRecord) -> Result<(), PortError> {
        sqlx::query(
            "INSERT INTO trade_records \
             (trade_id, position_id, account_number, fund_class_code, side, nav, units, \
              gross_amount, fee, profit, profit_rate, balance_before, balance_after, \
              trade_date, settlement_date, cash_reference, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        )
        .bind(Uuid::from(trade.id))
        .bind(Uuid::from(trade.position_id))
        .bind(&trade.account_number)
        .bind(&trade.fund_class_code)
        .bind(trade_side_str(trade.side))
        .bind(trade.nav)
        .bind(trade.units)
        .bind(trade.gross_amount)
        .bind(trade.fee)
        .bind(trade.profit)
        .bind(trade.profit_rate)
        .bind(trade.balance_before)
        .bind(trade.balance_after)
        .bind(trade.trade_date)
        .bind(trade.settlement_date)
        .bind(&trade.cash_reference)
        .bind(trade.created_at)
        .execute(&self.pool)
        .await
        .map_err(port)?;

        Ok(())
    }

    async fn find_for_position(&self, id: PositionId) -> Result<Vec<TradeRecord>, PortError> {
        let rows: Vec<TradeRow> = sqlx::query_as(
            "SELECT trade_id, position_id, account_number, fund_class_code, side, nav, units, \
             gross_amount, fee, profit, profit_rate, balance_before, balance_after, \
             trade_date, settlement_date, cash_reference, created_at \
             FROM trade_records WHERE position_id = $1 ORDER BY created_at, trade_id",
        )
        .bind(Uuid::from(id))
        .fetch_all(&self.pool)
        .await
        .map_err(port)?;

        rows.into_iter().map(TradeRow::into_domain).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_status_round_trip() {
        for status in [
            PositionStatus::Active,
            PositionStatus::PartialSold,
            PositionStatus::Sold,
        ] {
            assert_eq!(
                parse_position_status(position_status_str(status)).unwrap(),
                status
            );
        }
        assert!(parse_position_status("GONE").is_err());
    }

    #[test]
    fn test_negative_bps_is_rejected() {
        assert!(to_u32(-1, "mgmt_bps").is_err());
        assert_eq!(to_u32(45, "mgmt_bps").unwrap(), 45);
    }
}
