use chrono::{DateTime, Utc};

use super::saas_plans::MIN_CHARGE_MINOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeQuote {
    /// Unused value of the current period, in minor units.
    pub credit_minor: i32,
    /// What the gym pays for the new plan after the credit.
    pub amount_minor: i32,
}

/// Prices an immediate upgrade: the unused part of the current period is
/// credited against the full price of the new plan.
///
/// The remaining fraction is clamped to `[0, 1]`, the credit is rounded down
/// and the charge never drops below [`MIN_CHARGE_MINOR`].
pub fn prorate_upgrade(
    current_price_minor: i32,
    new_price_minor: i32,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> UpgradeQuote {
    let period_secs = (period_end - period_start).num_seconds();
    let remaining_secs = (period_end - now).num_seconds().clamp(0, period_secs.max(0));

    let credit_minor = if period_secs <= 0 || current_price_minor <= 0 {
        0
    } else {
        let credit = i64::from(current_price_minor) * remaining_secs / period_secs;
        i32::try_from(credit).unwrap_or(current_price_minor)
    };

    let amount_minor = new_price_minor
        .saturating_sub(credit_minor)
        .max(MIN_CHARGE_MINOR);

    UpgradeQuote {
        credit_minor,
        amount_minor,
    }
}
