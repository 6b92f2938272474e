//! The dual-ledger synchronizer
//!
//! [`CashLedger`] owns both physical balance records for every account and is
//! the only code allowed to move money between them. It enforces three rules:
//!
//! - movements against one account are serialized by a per-account mutex
//! - both records and the statement entry change together or not at all
//! - if the two records already disagree, the movement is refused outright
//!   until the account is reconciled

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tracing::{debug, error, info};

use core_kernel::CashEntryId;

use crate::account::{IrpRecord, MirrorRecord};
use crate::entry::{CashEntry, EntryCategory, EntryDirection, ReferenceGenerator};
use crate::error::CashError;

/// Result of one posted movement
#[derive(Debug, Clone)]
pub struct CashPosting {
    /// Statement entry appended for this movement
    pub entry_id: CashEntryId,
    /// Traceable reference id on the entry
    pub reference: String,
    /// Balance before the movement
    pub balance_before: Decimal,
    /// Balance after the movement
    pub balance_after: Decimal,
}

/// Both physical records for one account, locked as a unit
#[derive(Debug)]
struct RecordPair {
    irp: IrpRecord,
    mirror: MirrorRecord,
}

/// In-memory dual-ledger synchronizer
///
/// # Invariants
///
/// - `irp.balance == mirror.balance` for every account, always
/// - statement entries are append-only
/// - a debit never takes a balance below zero
#[derive(Debug)]
pub struct CashLedger {
    accounts: RwLock<HashMap<String, Arc<Mutex<RecordPair>>>>,
    entries: Mutex<Vec<CashEntry>>,
    references: ReferenceGenerator,
}

impl CashLedger {
    /// Creates an empty ledger with the given bank code for reference ids
    pub fn new(bank_code: impl Into<String>) -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            entries: Mutex::new(Vec::new()),
            references: ReferenceGenerator::new(bank_code),
        }
    }

    /// Opens an account, creating both physical records with equal balances
    ///
    /// # Errors
    ///
    /// Returns a conflict via `CashError::Storage` if the account number is
    /// already registered.
    pub fn open_account(
        &self,
        account_number: impl Into<String>,
        customer_ci: impl Into<String>,
        opening_balance: Decimal,
    ) -> Result<(), CashError> {
        let account_number = account_number.into();
        let mut accounts = self.accounts.write().expect("account registry poisoned");
        if accounts.contains_key(&account_number) {
            return Err(CashError::Storage(core_kernel::PortError::conflict(
                format!("account {account_number} already exists"),
            )));
        }

        let pair = RecordPair {
            irp: IrpRecord::new(account_number.clone(), customer_ci, opening_balance),
            mirror: MirrorRecord::new(account_number.clone(), opening_balance),
        };
        accounts.insert(account_number.clone(), Arc::new(Mutex::new(pair)));

        info!(account = %account_number, balance = %opening_balance, "IRP account opened");
        Ok(())
    }

    /// Applies a signed delta to both records and appends one statement entry
    ///
    /// Positive deltas credit the account, negative deltas debit it. The whole
    /// operation happens under the account's lock; nothing is written if any
    /// check fails.
    ///
    /// # Errors
    ///
    /// - `CashError::AccountNotFound` if the account is not registered
    /// - `CashError::AccountNotActive` if the account cannot move money
    /// - `CashError::DriftDetected` if the two records disagree before the move
    /// - `CashError::InsufficientBalance` if a debit would overdraw
    /// - `CashError::ZeroAmount` for a zero delta
    pub fn apply(
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

        let pair = self.pair_of(account_number)?;
        let mut pair = pair.lock().expect("account pair poisoned");

        if !pair.irp.is_active() {
            return Err(CashError::AccountNotActive(account_number.to_string()));
        }

        // Both records must agree before any money moves
        if pair.irp.balance != pair.mirror.balance {
            error!(
                account = %account_number,
                irp = %pair.irp.balance,
                mirror = %pair.mirror.balance,
                "refusing movement: ledger records disagree"
            );
            return Err(CashError::DriftDetected {
                account_number: account_number.to_string(),
                irp_balance: pair.irp.balance,
                mirror_balance: pair.mirror.balance,
            });
        }

        let before = pair.irp.balance;
        let after = before + delta;
        if after < Decimal::ZERO {
            return Err(CashError::InsufficientBalance {
                balance: before,
                required: -delta,
            });
        }

        let now = at;
        pair.irp.balance = after;
        pair.irp.updated_at = now;
        if category == EntryCategory::Contribution && delta > Decimal::ZERO {
            pair.irp.total_contribution += delta;
        }
        pair.mirror.balance = after;
        pair.mirror.updated_at = now;

        let direction = if delta > Decimal::ZERO {
            EntryDirection::Credit
        } else {
            EntryDirection::Debit
        };
        let reference = self.references.next(category, now);
        let entry = CashEntry::new(
            account_number,
            direction,
            category,
            delta.abs(),
            after,
            description,
            reference.clone(),
            now,
        );
        let entry_id = entry.id;
        self.entries.lock().expect("entry log poisoned").push(entry);

        debug!(
            account = %account_number,
            delta = %delta,
            before = %before,
            after = %after,
            reference = %reference,
            "cash movement posted to both records"
        );

        Ok(CashPosting {
            entry_id,
            reference,
            balance_before: before,
            balance_after: after,
        })
    }

    /// Returns the balance of an account (both records agree or this errors)
    pub fn balance_of(&self, account_number: &str) -> Result<Decimal, CashError> {
        let pair = self.pair_of(account_number)?;
        let pair = pair.lock().expect("account pair poisoned");
        if pair.irp.balance != pair.mirror.balance {
            return Err(CashError::DriftDetected {
                account_number: account_number.to_string(),
                irp_balance: pair.irp.balance,
                mirror_balance: pair.mirror.balance,
            });
        }
        Ok(pair.irp.balance)
    }

    /// Finds the active account for a customer CI
    pub fn find_active_account(&self, customer_ci: &str) -> Result<IrpRecord, CashError> {
        let accounts = self.accounts.read().expect("account registry poisoned");
        for pair in accounts.values() {
            let pair = pair.lock().expect("account pair poisoned");
            if pair.irp.customer_ci == customer_ci && pair.irp.is_active() {
                return Ok(pair.irp.clone());
            }
        }
        Err(CashError::NoActiveAccountForCustomer(customer_ci.to_string()))
    }

    /// Returns statement entries for an account, oldest first
    pub fn entries_for(&self, account_number: &str) -> Vec<CashEntry> {
        self.entries
            .lock()
            .expect("entry log poisoned")
            .iter()
            .filter(|e| e.account_number == account_number)
            .cloned()
            .collect()
    }

    fn pair_of(&self, account_number: &str) -> Result<Arc<Mutex<RecordPair>>, CashError> {
        self.accounts
            .read()
            .expect("account registry poisoned")
            .get(account_number)
            .cloned()
            .ok_or_else(|| CashError::AccountNotFound(account_number.to_string()))
    }
}

impl Default for CashLedger {
    fn default() -> Self {
        Self::new("HANA")
    }
}
