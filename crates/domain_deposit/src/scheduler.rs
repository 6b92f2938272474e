//! Interest accrual and maturity settlement
//!
//! Two periodic passes over the active deposit book. A failure on one record
//! is logged and counted; the pass always finishes the rest of the book.
//! Passes are keyed by calendar date: re-running on the same day neither
//! double-accrues nor re-settles.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use core_kernel::temporal::elapsed_days;
use core_kernel::SharedClock;
use domain_cash::{EntryCategory, LedgerPort};

use crate::error::DepositError;
use crate::interest::{
    accrual_interest, contract_months, early_termination_interest, early_termination_rate,
    maturity_interest,
};
use crate::ports::DepositStorePort;
use crate::position::{DepositPosition, DepositProductType};

/// Scheduler cadence and thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Minimum elapsed days before the accrual pass books interest
    pub accrual_threshold_days: i64,
    /// Seconds between accrual passes
    pub accrual_interval_secs: u64,
    /// Seconds between maturity passes
    pub maturity_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            accrual_threshold_days: 30,
            accrual_interval_secs: 86_400,
            maturity_interval_secs: 86_400,
        }
    }
}

/// Outcome counters for one batch pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Records examined
    pub examined: usize,
    /// Records actually changed
    pub processed: usize,
    /// Records that failed and were skipped
    pub failed: usize,
}

/// Result of settling one deposit
#[derive(Debug, Clone)]
pub struct SettlementReceipt {
    pub account_number: String,
    /// Interest credited to the IRP account
    pub interest: Decimal,
    /// Full proceeds paid out (principal plus interest)
    pub proceeds: Decimal,
    /// Annual rate the interest was computed at
    pub applied_rate: Decimal,
}

/// The deposit accrual and maturity batch runner
pub struct DepositScheduler {
    store: Arc<dyn DepositStorePort>,
    ledger: Arc<dyn LedgerPort>,
    config: SchedulerConfig,
    clock: SharedClock,
}

impl DepositScheduler {
    pub fn new(
        store: Arc<dyn DepositStorePort>,
        ledger: Arc<dyn LedgerPort>,
        config: SchedulerConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            store,
            ledger,
            config,
            clock,
        }
    }

    /// Runs both passes forever on their configured intervals
    ///
    /// A pass always runs to completion before the next tick is taken, so a
    /// pass never overlaps itself.
    pub async fn run(&self) -> Result<(), DepositError> {
        let mut accrual = tokio::time::interval(Duration::from_secs(self.config.accrual_interval_secs));
        let mut maturity = tokio::time::interval(Duration::from_secs(self.config.maturity_interval_secs));
        accrual.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        maturity.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = accrual.tick() => {
                    let summary = self.run_accrual_pass().await?;
                    info!(examined = summary.examined, accrued = summary.processed, failed = summary.failed, "accrual pass finished");
                }
                _ = maturity.tick() => {
                    let summary = self.run_maturity_pass().await?;
                    info!(examined = summary.examined, settled = summary.processed, failed = summary.failed, "maturity pass finished");
                }
            }
        }
    }

    /// Books accrued interest on every active deposit past the day threshold
    ///
    /// Elapsed days count from the last calculation date (subscription date if
    /// the deposit has never accrued), so a same-day re-run sees zero elapsed
    /// days and changes nothing.
    pub async fn run_accrual_pass(&self) -> Result<PassSummary, DepositError> {
        let today = self.clock.today();
        let deposits = self.store.find_active().await?;
        let mut summary = PassSummary {
            examined: deposits.len(),
            ..PassSummary::default()
        };

        for mut deposit in deposits {
            let since = deposit
                .last_calculation_date
                .unwrap_or(deposit.subscription_date);
            let elapsed = elapsed_days(since, today);
            if elapsed < self.config.accrual_threshold_days {
                continue;
            }

            let interest = accrual_interest(deposit.principal(), deposit.rate, elapsed);
            deposit.accrue(interest, today);
            match self.store.save(&deposit).await {
                Ok(()) => {
                    summary.processed += 1;
                    info!(
                        account = %deposit.account_number,
                        elapsed,
                        %interest,
                        unpaid = %deposit.unpaid_interest,
                        "interest accrued"
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    error!(account = %deposit.account_number, error = %e, "accrual failed; continuing pass");
                }
            }
        }

        Ok(summary)
    }

    /// Settles every active deposit whose maturity date is today
    pub async fn run_maturity_pass(&self) -> Result<PassSummary, DepositError> {
        let today = self.clock.today();
        let deposits = self.store.find_maturing(today).await?;
        let mut summary = PassSummary {
            examined: deposits.len(),
            ..PassSummary::default()
        };

        for deposit in deposits {
            match self.settle(deposit, today).await {
                Ok(receipt) => {
                    summary.processed += 1;
                    info!(
                        account = %receipt.account_number,
                        interest = %receipt.interest,
                        proceeds = %receipt.proceeds,
                        "deposit matured"
                    );
                }
                Err((account, e)) => {
                    summary.failed += 1;
                    error!(account = %account, error = %e, "maturity settlement failed; continuing pass");
                }
            }
        }

        Ok(summary)
    }

    /// Settles one deposit by account number, outside the scheduled pass
    pub async fn process_maturity_for(&self, account_number: &str) -> Result<SettlementReceipt, DepositError> {
        let deposit = self
            .store
            .find_by_account(account_number)
            .await?
            .ok_or_else(|| DepositError::DepositNotFound(account_number.to_string()))?;
        if !deposit.is_active() {
            return Err(DepositError::DepositNotActive(account_number.to_string()));
        }
        self.settle(deposit, self.clock.today())
            .await
            .map_err(|(_, e)| e)
    }

    /// Closes a deposit before maturity at the tiered early-termination rate
    ///
    /// The unpaid accrual bucket is forfeited; the customer receives principal
    /// plus interest at the early rate over the elapsed days.
    pub async fn terminate_early(&self, account_number: &str) -> Result<SettlementReceipt, DepositError> {
        let mut deposit = self
            .store
            .find_by_account(account_number)
            .await?
            .ok_or_else(|| DepositError::DepositNotFound(account_number.to_string()))?;
        if !deposit.is_active() {
            return Err(DepositError::DepositNotActive(account_number.to_string()));
        }

        let today = self.clock.today();
        let elapsed = elapsed_days(deposit.subscription_date, today);
        let contract_days = elapsed_days(deposit.subscription_date, deposit.maturity_date);
        let early_rate =
            early_termination_rate(deposit.product_type, deposit.rate, elapsed, contract_days);
        let interest = early_termination_interest(deposit.principal(), early_rate, elapsed);
        let principal = deposit.principal();
        deposit.settle_early(interest, today);
        let proceeds = deposit.current_balance;

        if !proceeds.is_zero() {
            self.ledger
                .apply(
                    &deposit.irp_account_number,
                    proceeds,
                    EntryCategory::Deposit,
                    &format!("Early termination - deposit {} (interest {interest})", deposit.account_number),
                    self.clock.now(),
                )
                .await?;
        }
        if let Err(e) = self.store.save(&deposit).await {
            error!(account = %deposit.account_number, error = %e, "deposit save failed after payout; reversing credit");
            self.reverse_payout(
                &deposit.irp_account_number,
                proceeds,
                EntryCategory::Deposit,
                &deposit.account_number,
            )
            .await;
            return Err(DepositError::Storage(e));
        }

        warn!(
            account = %deposit.account_number,
            elapsed,
            rate = %early_rate,
            %interest,
            %principal,
            "deposit terminated early"
        );

        Ok(SettlementReceipt {
            account_number: deposit.account_number,
            interest,
            proceeds,
            applied_rate: early_rate,
        })
    }

    async fn settle(
        &self,
        mut deposit: DepositPosition,
        today: NaiveDate,
    ) -> Result<SettlementReceipt, (String, DepositError)> {
        let account = deposit.account_number.clone();
        let months = contract_months(deposit.product_type, deposit.contract_period);
        let final_interest = maturity_interest(deposit.principal(), deposit.rate, months);
        let interest_paid = deposit.unpaid_interest + final_interest;

        deposit.settle_maturity(final_interest, today);
        let proceeds = deposit.current_balance;

        self.ledger
            .apply(
                &deposit.irp_account_number,
                proceeds,
                EntryCategory::Interest,
                &format!("Deposit maturity - {} (interest {interest_paid})", deposit.account_number),
                self.clock.now(),
            )
            .await
            .map_err(|e| (account.clone(), DepositError::Cash(e)))?;

        if let Err(e) = self.store.save(&deposit).await {
            // The deposit would still read ACTIVE with today's maturity date,
            // so a same-day re-run would settle it again. Take the credit back
            // so the retry starts from a clean balance.
            error!(account = %account, error = %e, "deposit save failed after payout; reversing credit");
            self.reverse_payout(
                &deposit.irp_account_number,
                proceeds,
                EntryCategory::Interest,
                &account,
            )
            .await;
            return Err((account, DepositError::Storage(e)));
        }

        if deposit.product_type == DepositProductType::DefaultOption {
            info!(account = %deposit.account_number, "default-option deposit matured; eligible for auto-rollover");
        }

        Ok(SettlementReceipt {
            account_number: deposit.account_number,
            interest: interest_paid,
            proceeds,
            applied_rate: deposit.rate,
        })
    }

    /// Best-effort reversal of a settlement credit after a failed save
    async fn reverse_payout(
        &self,
        irp_account_number: &str,
        proceeds: Decimal,
        category: EntryCategory,
        deposit_account: &str,
    ) {
        if proceeds.is_zero() {
            return;
        }
        let result = self
            .ledger
            .apply(
                irp_account_number,
                -proceeds,
                category,
                &format!("Reversal - deposit settlement {deposit_account}"),
                self.clock.now(),
            )
            .await;
        if let Err(e) = result {
            error!(account = %deposit_account, %proceeds, error = %e, "settlement reversal failed; manual reconciliation required");
        }
    }
}
