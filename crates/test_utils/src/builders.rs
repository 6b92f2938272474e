//! Builders for test data construction

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_deposit::{DepositPosition, DepositProductType};
use domain_fund::{FeeSchedule, FundClass, LoadType, SaleStatus, TradingRule};

/// Builder for fund share classes
pub struct FundClassBuilder {
    code: String,
    fund_name: String,
    class_code: String,
    load_type: LoadType,
    sale_status: SaleStatus,
    front_load_pct: Option<Decimal>,
    sales_bps: Option<u32>,
    min_initial_amount: Decimal,
    redemption_fee_rate: Option<Decimal>,
    redemption_fee_days: Option<u32>,
    buy_settle_days: Option<u32>,
    redeem_settle_days: Option<u32>,
}

impl FundClassBuilder {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            fund_name: "Test Fund".to_string(),
            class_code: "C-e".to_string(),
            load_type: LoadType::NoLoad,
            sale_status: SaleStatus::OnSale,
            front_load_pct: None,
            sales_bps: None,
            min_initial_amount: dec!(10000),
            redemption_fee_rate: None,
            redemption_fee_days: None,
            buy_settle_days: None,
            redeem_settle_days: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.fund_name = name.into();
        self
    }

    pub fn front_load(mut self, pct: Decimal) -> Self {
        self.load_type = LoadType::FrontLoad;
        self.front_load_pct = Some(pct);
        self
    }

    pub fn sales_bps(mut self, bps: u32) -> Self {
        self.sales_bps = Some(bps);
        self
    }

    pub fn off_sale(mut self) -> Self {
        self.sale_status = SaleStatus::Suspended;
        self
    }

    pub fn min_initial(mut self, amount: Decimal) -> Self {
        self.min_initial_amount = amount;
        self
    }

    pub fn redemption_fee(mut self, rate: Decimal, days: u32) -> Self {
        self.redemption_fee_rate = Some(rate);
        self.redemption_fee_days = Some(days);
        self
    }

    pub fn settle_days(mut self, buy: u32, redeem: u32) -> Self {
        self.buy_settle_days = Some(buy);
        self.redeem_settle_days = Some(redeem);
        self
    }

    pub fn build(self) -> FundClass {
        FundClass {
            code: self.code.clone(),
            fund_code: self.code,
            fund_name: self.fund_name,
            class_code: self.class_code,
            load_type: self.load_type,
            sale_status: self.sale_status,
            fees: FeeSchedule {
                mgmt_bps: 45,
                sales_bps: self.sales_bps,
                trustee_bps: 3,
                admin_bps: 2,
                front_load_pct: self.front_load_pct,
            },
            trading: TradingRule {
                cutoff: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
                buy_settle_days: self.buy_settle_days,
                redeem_settle_days: self.redeem_settle_days,
                min_initial_amount: self.min_initial_amount,
                min_additional_amount: dec!(1000),
                redemption_fee_rate: self.redemption_fee_rate,
                redemption_fee_days: self.redemption_fee_days,
            },
        }
    }
}

/// Builder for deposit positions
pub struct DepositBuilder {
    customer_ci: String,
    account_number: String,
    irp_account_number: String,
    product_type: DepositProductType,
    contract_period: u32,
    principal: Decimal,
    subscription_date: NaiveDate,
}

impl DepositBuilder {
    pub fn new(account_number: impl Into<String>) -> Self {
        Self {
            customer_ci: "CI-2024-0001".to_string(),
            account_number: account_number.into(),
            irp_account_number: "110-123-456".to_string(),
            product_type: DepositProductType::General,
            contract_period: 12,
            principal: dec!(10000000),
            subscription_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        }
    }

    pub fn customer(mut self, ci: impl Into<String>) -> Self {
        self.customer_ci = ci.into();
        self
    }

    pub fn irp_account(mut self, account: impl Into<String>) -> Self {
        self.irp_account_number = account.into();
        self
    }

    pub fn product(mut self, product_type: DepositProductType, contract_period: u32) -> Self {
        self.product_type = product_type;
        self.contract_period = contract_period;
        self
    }

    pub fn principal(mut self, principal: Decimal) -> Self {
        self.principal = principal;
        self
    }

    pub fn subscribed_on(mut self, date: NaiveDate) -> Self {
        self.subscription_date = date;
        self
    }

    pub fn build(self) -> DepositPosition {
        DepositPosition::open(
            self.customer_ci,
            self.account_number,
            self.irp_account_number,
            self.product_type,
            self.contract_period,
            self.principal,
            self.subscription_date,
        )
        .expect("supported contract period")
    }
}
