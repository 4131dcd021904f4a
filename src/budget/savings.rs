use rust_decimal::Decimal;

const HIGH_INCOME: i64 = 100_000;
const BUILDING_BELOW: i64 = 50_000;
const GOOD_UP_TO: i64 = 200_000;

/// How the advice is worded, based on savings already put aside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavingsFraming {
    BuildingEmergencyFund,
    GoodProgress,
    ExcellentDiscipline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavingsRecommendation {
    pub min_percent: u32,
    pub max_percent: u32,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub framing: SavingsFraming,
}

/// Advice for a confirmed income. Read-only: nothing is stored.
pub fn recommend(income: Decimal, prior_savings: Decimal) -> SavingsRecommendation {
    let (min_percent, max_percent) = if income > Decimal::from(HIGH_INCOME) {
        (10, 15)
    } else {
        (15, 20)
    };

    let framing = if prior_savings < Decimal::from(BUILDING_BELOW) {
        SavingsFraming::BuildingEmergencyFund
    } else if prior_savings <= Decimal::from(GOOD_UP_TO) {
        SavingsFraming::GoodProgress
    } else {
        SavingsFraming::ExcellentDiscipline
    };

    SavingsRecommendation {
        min_percent,
        max_percent,
        min_amount: share(income, min_percent),
        max_amount: share(income, max_percent),
        framing,
    }
}

fn share(income: Decimal, percent: u32) -> Decimal {
    income
        .checked_mul(Decimal::from(percent))
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .map(|v| v.round_dp(2).normalize())
        .unwrap_or(Decimal::MAX)
}
