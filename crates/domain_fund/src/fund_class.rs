//! Sellable fund share classes and their fee/trading terms

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// When the sales fee is charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadType {
    /// Fee charged at purchase time
    FrontLoad,
    /// Fee charged at redemption time
    BackLoad,
    /// No sales load
    NoLoad,
}

/// Whether the class is currently offered for sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleStatus {
    OnSale,
    Suspended,
}

/// Annual fee figures for a share class
///
/// The bps figures are annual management-side fees; `front_load_pct` is the
/// one-off purchase charge as a decimal fraction (0.01 = 1%).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Management fee, basis points
    pub mgmt_bps: u32,
    /// Sales fee, basis points
    pub sales_bps: Option<u32>,
    /// Trustee fee, basis points
    pub trustee_bps: u32,
    /// Administration fee, basis points
    pub admin_bps: u32,
    /// One-off front load as a decimal fraction
    pub front_load_pct: Option<Decimal>,
}

impl FeeSchedule {
    /// Total annual fee load in basis points
    pub fn total_bps(&self) -> u32 {
        self.mgmt_bps + self.sales_bps.unwrap_or(0) + self.trustee_bps + self.admin_bps
    }
}

/// Trading terms for a share class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradingRule {
    /// Same-day order cutoff
    pub cutoff: NaiveTime,
    /// Settlement lag for purchases; defaults to T+2 when unset
    pub buy_settle_days: Option<u32>,
    /// Settlement lag for redemptions; defaults to T+3 when unset
    pub redeem_settle_days: Option<u32>,
    /// Minimum first purchase amount
    pub min_initial_amount: Decimal,
    /// Minimum follow-on purchase amount
    pub min_additional_amount: Decimal,
    /// Redemption fee as a decimal fraction
    pub redemption_fee_rate: Option<Decimal>,
    /// Holding-day threshold below which the redemption fee applies
    pub redemption_fee_days: Option<u32>,
}

impl TradingRule {
    /// True when the class charges a redemption fee for short holdings
    pub fn has_redemption_fee(&self) -> bool {
        matches!(self.redemption_fee_rate, Some(rate) if !rate.is_zero())
            && matches!(self.redemption_fee_days, Some(days) if days > 0)
    }
}

/// A sellable share class of a fund
///
/// The class code (e.g. `K55101BU1234-Ce`) is the business key positions and
/// NAV quotes refer to; the parent fund is carried for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundClass {
    /// Share class business key
    pub code: String,
    /// Parent fund code
    pub fund_code: String,
    /// Parent fund display name
    pub fund_name: String,
    /// Class designation, e.g. `C-e`
    pub class_code: String,
    /// Load type
    pub load_type: LoadType,
    /// Sale status
    pub sale_status: SaleStatus,
    /// Fee terms
    pub fees: FeeSchedule,
    /// Trading terms
    pub trading: TradingRule,
}

impl FundClass {
    /// True when new purchases are accepted
    pub fn is_on_sale(&self) -> bool {
        self.sale_status == SaleStatus::OnSale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_total_bps_sums_all_components() {
        let schedule = FeeSchedule {
            mgmt_bps: 45,
            sales_bps: Some(30),
            trustee_bps: 3,
            admin_bps: 2,
            front_load_pct: None,
        };
        assert_eq!(schedule.total_bps(), 80);
    }

    #[test]
    fn test_has_redemption_fee_requires_rate_and_threshold() {
        let mut rule = TradingRule {
            cutoff: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
            buy_settle_days: None,
            redeem_settle_days: None,
            min_initial_amount: dec!(10000),
            min_additional_amount: dec!(1000),
            redemption_fee_rate: Some(dec!(0.01)),
            redemption_fee_days: Some(30),
        };
        assert!(rule.has_redemption_fee());

        rule.redemption_fee_rate = Some(Decimal::ZERO);
        assert!(!rule.has_redemption_fee());

        rule.redemption_fee_rate = Some(dec!(0.01));
        rule.redemption_fee_days = None;
        assert!(!rule.has_redemption_fee());
    }
}
