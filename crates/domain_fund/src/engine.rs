//! The fund subscription engine
//!
//! Orchestrates purchase and redemption: validates the request, prices it
//! against the NAV book, computes fees and units, moves cash through the
//! dual-record ledger, updates the position's cost basis, and appends an
//! immutable trade record.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, warn};

use core_kernel::rounding::{units_for_amount, value_of_units};
use core_kernel::temporal::{elapsed_days, settlement_date};
use core_kernel::{PositionId, SharedClock, TradeId};
use domain_cash::{CashError, EntryCategory, LedgerPort};

use crate::error::FundError;
use crate::fees::{purchase_fee, redemption_fee};
use crate::fund_class::FundClass;
use crate::nav::NavQuote;
use crate::ports::{FundCatalogPort, NavStorePort, PositionStorePort, TradeLogPort};
use crate::position::Position;
use crate::trade::{TradeRecord, TradeSide};

const DEFAULT_BUY_SETTLE_DAYS: u32 = 2;
const DEFAULT_REDEEM_SETTLE_DAYS: u32 = 3;

/// A purchase order from the boundary layer
#[derive(Debug, Clone)]
pub struct PurchaseRequest {
    pub customer_ci: String,
    pub fund_class_code: String,
    pub amount: Decimal,
}

/// How much of a position to redeem
#[derive(Debug, Clone, Copy)]
pub enum SellQuantity {
    Units(Decimal),
    All,
}

/// A redemption order from the boundary layer
#[derive(Debug, Clone)]
pub struct RedemptionRequest {
    pub customer_ci: String,
    pub position_id: PositionId,
    pub quantity: SellQuantity,
}

/// Result of a booked purchase
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    pub position_id: PositionId,
    pub units: Decimal,
    pub fee: Decimal,
    pub nav: Decimal,
    pub settlement_date: NaiveDate,
    pub cash_reference: String,
    pub balance_after: Decimal,
}

/// Result of a booked redemption
#[derive(Debug, Clone)]
pub struct RedemptionReceipt {
    pub position_id: PositionId,
    pub sell_units: Decimal,
    pub gross_amount: Decimal,
    pub fee: Decimal,
    pub net_amount: Decimal,
    pub profit: Decimal,
    pub profit_rate: Decimal,
    pub settlement_date: NaiveDate,
    pub cash_reference: String,
    pub balance_after: Decimal,
}

/// Orchestrator for fund purchase and redemption
pub struct SubscriptionEngine {
    catalog: Arc<dyn FundCatalogPort>,
    navs: Arc<dyn NavStorePort>,
    positions: Arc<dyn PositionStorePort>,
    trades: Arc<dyn TradeLogPort>,
    ledger: Arc<dyn LedgerPort>,
    clock: SharedClock,
}

impl SubscriptionEngine {
    pub fn new(
        catalog: Arc<dyn FundCatalogPort>,
        navs: Arc<dyn NavStorePort>,
        positions: Arc<dyn PositionStorePort>,
        trades: Arc<dyn TradeLogPort>,
        ledger: Arc<dyn LedgerPort>,
        clock: SharedClock,
    ) -> Self {
        Self {
            catalog,
            navs,
            positions,
            trades,
            ledger,
            clock,
        }
    }

    /// Publishes a NAV quote; republishing a (class, date) key is a correction
    pub async fn publish_nav(
        &self,
        fund_class_code: &str,
        date: NaiveDate,
        nav: Decimal,
    ) -> Result<NavQuote, FundError> {
        let quote = NavQuote::new(fund_class_code, date, nav);
        let stored = quote.clone();
        if let Some(previous) = self.navs.publish(quote).await? {
            info!(
                class = %fund_class_code,
                %date,
                old = %previous.nav,
                new = %stored.nav,
                "NAV republished; treating as correction"
            );
        }
        Ok(stored)
    }

    /// Executes a purchase end to end
    pub async fn purchase(&self, request: PurchaseRequest) -> Result<PurchaseReceipt, FundError> {
        if request.amount <= Decimal::ZERO {
            return Err(FundError::NonPositiveAmount);
        }

        let class = self
            .catalog
            .find_class(&request.fund_class_code)
            .await?
            .ok_or_else(|| FundError::FundClassNotFound(request.fund_class_code.clone()))?;
        if !class.is_on_sale() {
            return Err(FundError::FundNotOnSale(class.code.clone()));
        }

        let account = self.ledger.find_active_account(&request.customer_ci).await?;
        if account.balance < request.amount {
            return Err(FundError::Cash(CashError::InsufficientBalance {
                balance: account.balance,
                required: request.amount,
            }));
        }

        let existing = self
            .positions
            .find_open(&request.customer_ci, &class.code)
            .await?;
        let minimum = if existing.is_some() {
            class.trading.min_additional_amount
        } else {
            class.trading.min_initial_amount
        };
        if request.amount < minimum {
            return Err(match existing {
                Some(_) => FundError::BelowMinimumAdditional {
                    minimum,
                    amount: request.amount,
                },
                None => FundError::BelowMinimumInitial {
                    minimum,
                    amount: request.amount,
                },
            });
        }

        let today = self.clock.today();
        let quote = self.resolve_nav(&class.code, today).await?;
        let fee = purchase_fee(request.amount, &class.fees);
        let net = request.amount - fee;
        let units = units_for_amount(net, quote.nav);
        if units.is_zero() {
            return Err(FundError::Validation(format!(
                "net amount {net} buys zero units at NAV {}",
                quote.nav
            )));
        }

        let posting = self
            .ledger
            .apply(
                &account.account_number,
                -request.amount,
                EntryCategory::Investment,
                &format!("Fund purchase - {} ({})", class.fund_name, class.class_code),
                self.clock.now(),
            )
            .await?;

        let prior = existing.clone();
        let mut position = match existing {
            Some(mut position) => {
                position.add_purchase(request.amount, fee, units);
                position
            }
            None => Position::open(
                &request.customer_ci,
                &account.account_number,
                &class,
                request.amount,
                fee,
                units,
                quote.nav,
                today,
            ),
        };
        position.mark_valuation(quote.nav);

        if let Err(e) = self.positions.save(&position).await {
            self.refund(&account.account_number, request.amount, &class).await;
            return Err(FundError::Storage(e));
        }

        let settlement = settlement_date(
            today,
            class
                .trading
                .buy_settle_days
                .unwrap_or(DEFAULT_BUY_SETTLE_DAYS),
        );
        let trade = TradeRecord {
            id: TradeId::new_v7(),
            position_id: position.id,
            account_number: account.account_number.clone(),
            fund_class_code: class.code.clone(),
            side: TradeSide::Buy,
            nav: quote.nav,
            units,
            gross_amount: request.amount,
            fee,
            profit: None,
            profit_rate: None,
            balance_before: posting.balance_before,
            balance_after: posting.balance_after,
            trade_date: today,
            settlement_date: settlement,
            cash_reference: posting.reference.clone(),
            created_at: self.clock.now(),
        };
        if let Err(e) = self.trades.append(&trade).await {
            self.refund(&account.account_number, request.amount, &class).await;
            // A first purchase has no prior state to restore; the fresh
            // position must go away entirely or the customer keeps the units
            // alongside the refunded cash.
            let revert = match prior {
                Some(prior) => self.positions.save(&prior).await,
                None => self.positions.delete(position.id).await,
            };
            if let Err(revert) = revert {
                error!(position = %position.id, error = %revert, "position revert failed; manual reconciliation required");
            }
            return Err(FundError::Storage(e));
        }

        info!(
            customer = %request.customer_ci,
            class = %class.code,
            amount = %request.amount,
            fee = %fee,
            units = %units,
            nav = %quote.nav,
            settlement = %settlement,
            "fund purchase booked"
        );

        Ok(PurchaseReceipt {
            position_id: position.id,
            units,
            fee,
            nav: quote.nav,
            settlement_date: settlement,
            cash_reference: posting.reference,
            balance_after: posting.balance_after,
        })
    }

    /// Executes a redemption end to end
    pub async fn redeem(&self, request: RedemptionRequest) -> Result<RedemptionReceipt, FundError> {
        let mut position = self
            .positions
            .find_by_id(request.position_id)
            .await?
            .ok_or_else(|| FundError::PositionNotFound(request.position_id.to_string()))?;

        if position.customer_ci != request.customer_ci {
            return Err(FundError::PositionNotOwned {
                position_id: request.position_id.to_string(),
                customer_ci: request.customer_ci.clone(),
            });
        }
        if !position.is_open() {
            return Err(FundError::PositionClosed(request.position_id.to_string()));
        }

        let class = self
            .catalog
            .find_class(&position.fund_class_code)
            .await?
            .ok_or_else(|| FundError::FundClassNotFound(position.fund_class_code.clone()))?;

        let sell_units = match request.quantity {
            SellQuantity::All => position.current_units,
            SellQuantity::Units(units) => units,
        };

        let today = self.clock.today();
        let quote = self.resolve_nav(&class.code, today).await?;
        let sell_amount = value_of_units(sell_units, quote.nav);
        let holding_days = elapsed_days(position.purchase_date, today);
        let fee = redemption_fee(sell_amount, holding_days, &class.trading);
        let realized = position.realized_profit(sell_units, sell_amount, fee);
        let net = sell_amount - fee;

        let prior = position.clone();
        position.sell_units(sell_units, fee)?;
        position.mark_valuation(quote.nav);

        let posting = self
            .ledger
            .apply(
                &position.account_number,
                net,
                EntryCategory::Investment,
                &format!("Fund redemption - {} ({})", class.fund_name, class.class_code),
                self.clock.now(),
            )
            .await?;

        if let Err(e) = self.positions.save(&position).await {
            self.reclaim(&position.account_number, net, &class).await;
            return Err(FundError::Storage(e));
        }

        let settlement = settlement_date(
            today,
            class
                .trading
                .redeem_settle_days
                .unwrap_or(DEFAULT_REDEEM_SETTLE_DAYS),
        );
        let trade = TradeRecord {
            id: TradeId::new_v7(),
            position_id: position.id,
            account_number: position.account_number.clone(),
            fund_class_code: class.code.clone(),
            side: TradeSide::Sell,
            nav: quote.nav,
            units: sell_units,
            gross_amount: sell_amount,
            fee,
            profit: Some(realized.profit),
            profit_rate: Some(realized.profit_rate),
            balance_before: posting.balance_before,
            balance_after: posting.balance_after,
            trade_date: today,
            settlement_date: settlement,
            cash_reference: posting.reference.clone(),
            created_at: self.clock.now(),
        };
        if let Err(e) = self.trades.append(&trade).await {
            self.reclaim(&position.account_number, net, &class).await;
            if let Err(revert) = self.positions.save(&prior).await {
                error!(position = %position.id, error = %revert, "position revert failed; manual reconciliation required");
            }
            return Err(FundError::Storage(e));
        }

        info!(
            customer = %request.customer_ci,
            position = %position.id,
            units = %sell_units,
            gross = %sell_amount,
            fee = %fee,
            profit = %realized.profit,
            settlement = %settlement,
            "fund redemption booked"
        );

        Ok(RedemptionReceipt {
            position_id: position.id,
            sell_units,
            gross_amount: sell_amount,
            fee,
            net_amount: net,
            profit: realized.profit,
            profit_rate: realized.profit_rate,
            settlement_date: settlement,
            cash_reference: posting.reference,
            balance_after: posting.balance_after,
        })
    }

    /// Same-day quote, else the latest earlier one with a degraded-path warn
    async fn resolve_nav(&self, fund_class_code: &str, date: NaiveDate) -> Result<NavQuote, FundError> {
        if let Some(quote) = self.navs.find_for_date(fund_class_code, date).await? {
            return Ok(quote);
        }
        match self.navs.find_latest(fund_class_code, date).await? {
            Some(quote) => {
                warn!(
                    class = %fund_class_code,
                    requested = %date,
                    used = %quote.nav_date,
                    "no same-day NAV quote; pricing against latest known quote"
                );
                Ok(quote)
            }
            None => Err(FundError::NavUnavailable(fund_class_code.to_string())),
        }
    }

    /// Best-effort reversal of a purchase debit after a downstream failure
    async fn refund(&self, account_number: &str, amount: Decimal, class: &FundClass) {
        let result = self
            .ledger
            .apply(
                account_number,
                amount,
                EntryCategory::Investment,
                &format!("Reversal - fund purchase {} ({})", class.fund_name, class.class_code),
                self.clock.now(),
            )
            .await;
        if let Err(e) = result {
            error!(account = %account_number, %amount, error = %e, "purchase reversal failed; manual reconciliation required");
        }
    }

    /// Best-effort reversal of a redemption credit after a downstream failure
    async fn reclaim(&self, account_number: &str, amount: Decimal, class: &FundClass) {
        let result = self
            .ledger
            .apply(
                account_number,
                -amount,
                EntryCategory::Investment,
                &format!("Reversal - fund redemption {} ({})", class.fund_name, class.class_code),
                self.clock.now(),
            )
            .await;
        if let Err(e) = result {
            error!(account = %account_number, %amount, error = %e, "redemption reversal failed; manual reconciliation required");
        }
    }
}
