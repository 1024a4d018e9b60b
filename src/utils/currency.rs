use crate::error::AppError;
use bigdecimal::{BigDecimal, Signed, ToPrimitive};
use std::str::FromStr;

/// Utilities for handling money precision between the operator-facing decimal
/// amounts and the Stripe API's integer minor units.
///
/// Stripe API requirements:
/// - All amounts are integers in the currency's smallest unit (cents for USD)
/// - The relay only charges USD, a two-decimal currency

/// Parse an operator-supplied decimal amount into USD cents.
///
/// Rejects unparsable and non-positive amounts before any remote call is
/// made. Sub-cent precision is rounded to the nearest cent.
pub fn parse_minor_units(amount: &str) -> Result<i64, AppError> {
    let amount = amount.trim();
    let decimal = BigDecimal::from_str(amount)
        .map_err(|_| AppError::Validation(format!("Amount is not a valid decimal: '{}'", amount)))?;

    if !decimal.is_positive() {
        return Err(AppError::Validation(format!(
            "Amount must be greater than zero, got {}",
            decimal
        )));
    }

    let cents = (decimal * BigDecimal::from(100)).round(0);
    cents.to_i64().ok_or_else(|| {
        AppError::Validation(format!("Amount {} is too large to charge", amount))
    })
}

/// Format USD cents for display, e.g. 25000 -> "$250.00"
pub fn format_usd(minor_units: i64) -> String {
    let sign = if minor_units < 0 { "-" } else { "" };
    let abs = minor_units.unsigned_abs();
    format!("{}${}.{:02}", sign, abs / 100, abs % 100)
}
