//! In-memory port adapters
//!
//! Back the domain port traits with plain collections so engine and
//! scheduler tests run without a database. Stores can be armed to fail their
//! next write, which is how the compensation paths get exercised.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use core_kernel::{DomainPort, PortError, PositionId};
use domain_deposit::{DepositPosition, DepositStorePort};
use domain_fund::{
    FundCatalogPort, FundClass, NavBook, NavQuote, NavStorePort, Position, PositionStorePort,
    TradeLogPort, TradeRecord,
};

/// Fund share-class catalog backed by a map
#[derive(Debug, Default)]
pub struct InMemoryFundCatalog {
    classes: RwLock<HashMap<String, FundClass>>,
}

impl InMemoryFundCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, class: FundClass) {
        self.classes
            .write()
            .expect("catalog poisoned")
            .insert(class.code.clone(), class);
    }
}

impl DomainPort for InMemoryFundCatalog {}

#[async_trait]
impl FundCatalogPort for InMemoryFundCatalog {
    async fn find_class(&self, code: &str) -> Result<Option<FundClass>, PortError> {
        Ok(self.classes.read().expect("catalog poisoned").get(code).cloned())
    }
}

/// NAV store wrapping the domain's in-memory quote book
#[derive(Debug, Default)]
pub struct InMemoryNavStore {
    book: RwLock<NavBook>,
}

impl InMemoryNavStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryNavStore {}

#[async_trait]
impl NavStorePort for InMemoryNavStore {
    async fn publish(&self, quote: NavQuote) -> Result<Option<NavQuote>, PortError> {
        Ok(self.book.write().expect("nav book poisoned").publish(quote))
    }

    async fn find_for_date(
        &self,
        fund_class_code: &str,
        date: NaiveDate,
    ) -> Result<Option<NavQuote>, PortError> {
        Ok(self
            .book
            .read()
            .expect("nav book poisoned")
            .for_date(fund_class_code, date)
            .cloned())
    }

    async fn find_latest(
        &self,
        fund_class_code: &str,
        date: NaiveDate,
    ) -> Result<Option<NavQuote>, PortError> {
        Ok(self
            .book
            .read()
            .expect("nav book poisoned")
            .latest_on_or_before(fund_class_code, date)
            .cloned())
    }
}

/// Position store with a one-shot failure switch
#[derive(Debug, Default)]
pub struct InMemoryPositionStore {
    positions: RwLock<HashMap<PositionId, Position>>,
    fail_next_save: AtomicBool,
}

impl InMemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the store so the next `save` fails once
    pub fn fail_next_save(&self) {
        self.fail_next_save.store(true, Ordering::SeqCst);
    }
}

impl DomainPort for InMemoryPositionStore {}

#[async_trait]
impl PositionStorePort for InMemoryPositionStore {
    async fn find_by_id(&self, id: PositionId) -> Result<Option<Position>, PortError> {
        Ok(self.positions.read().expect("positions poisoned").get(&id).cloned())
    }

    async fn find_open(
        &self,
        customer_ci: &str,
        fund_class_code: &str,
    ) -> Result<Option<Position>, PortError> {
        Ok(self
            .positions
            .read()
            .expect("positions poisoned")
            .values()
            .find(|p| {
                p.customer_ci == customer_ci && p.fund_class_code == fund_class_code && p.is_open()
            })
            .cloned())
    }

    async fn save(&self, position: &Position) -> Result<(), PortError> {
        if self.fail_next_save.swap(false, Ordering::SeqCst) {
            return Err(PortError::internal("injected position save failure"));
        }
        self.positions
            .write()
            .expect("positions poisoned")
            .insert(position.id, position.clone());
        Ok(())
    }

    async fn delete(&self, id: PositionId) -> Result<(), PortError> {
        self.positions.write().expect("positions poisoned").remove(&id);
        Ok(())
    }
}

/// Append-only trade log with a one-shot failure switch
#[derive(Debug, Default)]
pub struct InMemoryTradeLog {
    trades: Mutex<Vec<TradeRecord>>,
    fail_next_append: AtomicBool,
}

impl InMemoryTradeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the log so the next `append` fails once
    pub fn fail_next_append(&self) {
        self.fail_next_append.store(true, Ordering::SeqCst);
    }

    pub fn all(&self) -> Vec<TradeRecord> {
        self.trades.lock().expect("trades poisoned").clone()
    }
}

impl DomainPort for InMemoryTradeLog {}

#[async_trait]
impl TradeLogPort for InMemoryTradeLog {
    async fn append(&self, trade: &TradeRecord) -> Result<(), PortError> {
        if self.fail_next_append.swap(false, Ordering::SeqCst) {
            return Err(PortError::internal("injected trade append failure"));
        }
        self.trades.lock().expect("trades poisoned").push(trade.clone());
        Ok(())
    }

    async fn find_for_position(&self, id: PositionId) -> Result<Vec<TradeRecord>, PortError> {
        Ok(self
            .trades
            .lock()
            .expect("trades poisoned")
            .iter()
            .filter(|t| t.position_id == id)
            .cloned()
            .collect())
    }
}

/// Deposit store keyed by account number
#[derive(Debug, Default)]
pub struct InMemoryDepositStore {
    deposits: RwLock<HashMap<String, DepositPosition>>,
    fail_next_save: AtomicBool,
}

impl InMemoryDepositStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, deposit: DepositPosition) {
        self.deposits
            .write()
            .expect("deposits poisoned")
            .insert(deposit.account_number.clone(), deposit);
    }

    /// Arms the store so the next `save` fails once
    pub fn fail_next_save(&self) {
        self.fail_next_save.store(true, Ordering::SeqCst);
    }
}

impl DomainPort for InMemoryDepositStore {}

#[async_trait]
impl DepositStorePort for InMemoryDepositStore {
    async fn find_by_account(
        &self,
        account_number: &str,
    ) -> Result<Option<DepositPosition>, PortError> {
        Ok(self
            .deposits
            .read()
            .expect("deposits poisoned")
            .get(account_number)
            .cloned())
    }

    async fn find_active(&self) -> Result<Vec<DepositPosition>, PortError> {
        let mut active: Vec<DepositPosition> = self
            .deposits
            .read()
            .expect("deposits poisoned")
            .values()
            .filter(|d| d.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| a.account_number.cmp(&b.account_number));
        Ok(active)
    }

    async fn find_maturing(&self, date: NaiveDate) -> Result<Vec<DepositPosition>, PortError> {
        let mut maturing: Vec<DepositPosition> = self
            .deposits
            .read()
            .expect("deposits poisoned")
            .values()
            .filter(|d| d.is_active() && d.maturity_date == date)
            .cloned()
            .collect();
        maturing.sort_by(|a, b| a.account_number.cmp(&b.account_number));
        Ok(maturing)
    }

    async fn save(&self, deposit: &DepositPosition) -> Result<(), PortError> {
        if self.fail_next_save.swap(false, Ordering::SeqCst) {
            return Err(PortError::internal("injected deposit save failure"));
        }
        self.deposits
            .write()
            .expect("deposits poisoned")
            .insert(deposit.account_number.clone(), deposit.clone());
        Ok(())
    }
}
