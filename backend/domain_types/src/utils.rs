use error_stack::report;
use time::format_description::well_known::Rfc3339;

use crate::{errors::ParsingError, CustomResult};

/// Amount in the smallest currency unit, as carried on the commerce side.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct MinorUnit(i64);

impl MinorUnit {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get_amount_as_i64(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for MinorUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

fn minor_unit_factor(fraction_digits: u32) -> i64 {
    10i64.saturating_pow(fraction_digits)
}

/// Renders a minor-unit amount as the gateway's decimal string, e.g.
/// 6532 with two fraction digits becomes "65.32". Pure integer
/// arithmetic, so `gateway_amount_to_minor_units` inverts it exactly.
pub fn minor_units_to_gateway_amount(amount: MinorUnit, fraction_digits: u32) -> String {
    let units = amount.get_amount_as_i64();
    if fraction_digits == 0 {
        return units.to_string();
    }
    let factor = minor_unit_factor(fraction_digits);
    let whole = units / factor;
    let frac = (units % factor).abs();
    format!(
        "{whole}.{frac:0width$}",
        width = usize::try_from(fraction_digits).unwrap_or(0)
    )
}

/// Parses a gateway decimal amount string back into minor units, rounding
/// half-up on excess precision. Inverse of `minor_units_to_gateway_amount`
/// for all fraction digit counts the commerce side uses (0..=4).
pub fn gateway_amount_to_minor_units(
    amount: &str,
    fraction_digits: u32,
) -> CustomResult<MinorUnit, ParsingError> {
    let trimmed = amount.trim();
    let (raw_whole, raw_frac) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let parse_failure = || report!(ParsingError::StructParseFailure("gateway amount"));
    if raw_whole.is_empty() && raw_frac.is_empty() {
        return Err(parse_failure());
    }
    if !raw_whole.chars().all(|c| c.is_ascii_digit())
        || !raw_frac.chars().all(|c| c.is_ascii_digit())
    {
        return Err(parse_failure());
    }
    let whole: i64 = if raw_whole.is_empty() {
        0
    } else {
        raw_whole.parse().map_err(|_| parse_failure())?
    };
    let wanted = usize::try_from(fraction_digits).map_err(|_| parse_failure())?;
    let mut frac: i64 = 0;
    for (position, digit) in raw_frac.bytes().enumerate() {
        let digit = i64::from(digit - b'0');
        if position < wanted {
            frac = frac * 10 + digit;
        } else {
            // Half-up rounding on the first excess digit.
            if digit >= 5 {
                frac += 1;
            }
            break;
        }
    }
    if raw_frac.len() < wanted {
        frac *= minor_unit_factor(u32::try_from(wanted - raw_frac.len()).map_err(|_| parse_failure())?);
    }
    Ok(MinorUnit::new(
        whole
            .checked_mul(minor_unit_factor(fraction_digits))
            .and_then(|scaled| scaled.checked_add(frac))
            .ok_or_else(parse_failure)?,
    ))
}

/// Timestamp used on interface interactions and synthesized transactions.
pub fn current_timestamp() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
