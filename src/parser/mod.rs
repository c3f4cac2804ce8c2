//! Decoders for record plaintexts and public mapping values.
//!
//! Ledger values arrive as loosely-structured text such as
//!
//! ```text
//! { owner: aleo1abc..., position_id: 12345field, is_long: true,
//!   size_usdc: 50000000u64, collateral_usdc: 4950000u64,
//!   entry_price: 10000000000000u64, open_block: 0u32 }
//! ```
//!
//! Two strategies exist and are never merged: [`parse_position`] extracts by
//! declared field tag and fails closed when a mandatory tag is missing;
//! [`parse_position_heuristic`] is the documented best-effort fallback that
//! classifies untagged integer tokens by magnitude. Parse failures are
//! per-record and must never abort a batch scan.

use thiserror::Error;
use tracing::debug;

use crate::domain::{
    Address, BlockHeight, Direction, LpShare, OraclePrice, PoolState, Position, PositionId,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("ambiguous record: {0}")]
    Ambiguous(String),
}

/// Strict tagged decode of a Position record plaintext.
///
/// Mandatory tags: `position_id`, `is_long`, `size_usdc`, `collateral_usdc`,
/// `entry_price`. A record missing any of them is rejected rather than
/// populated with placeholder zeros. `open_block` defaults to 0 and `owner`
/// to the scanning identity when absent.
pub fn parse_position(plaintext: &str, scanning_owner: &Address) -> Result<Position, ParseError> {
    let cleaned = strip_whitespace(plaintext);

    let id = tagged_raw(&cleaned, "position_id").ok_or(ParseError::MissingField("position_id"))?;
    if !strip_visibility(id).ends_with("field") {
        return Err(ParseError::InvalidValue {
            field: "position_id",
            reason: format!("expected a field element, got {}", id),
        });
    }

    let direction = tagged_bool(&cleaned, "is_long")
        .ok_or(ParseError::MissingField("is_long"))
        .map(Direction::from_is_long)?;

    let size = tagged_uint(&cleaned, "size_usdc", &["u64"])?
        .ok_or(ParseError::MissingField("size_usdc"))?;
    // Older deployments stored collateral as u128.
    let collateral = tagged_uint(&cleaned, "collateral_usdc", &["u64", "u128"])?
        .ok_or(ParseError::MissingField("collateral_usdc"))?;
    let entry_price = tagged_uint(&cleaned, "entry_price", &["u64"])?
        .ok_or(ParseError::MissingField("entry_price"))?;
    let open_block = tagged_uint(&cleaned, "open_block", &["u32"])?.unwrap_or(0) as u32;

    let owner = tagged_raw(&cleaned, "owner")
        .map(strip_visibility)
        .filter(|v| v.starts_with("aleo1"))
        .map(|v| Address::new(v.to_string()))
        .unwrap_or_else(|| scanning_owner.clone());

    build_position(
        owner,
        id,
        direction,
        size,
        collateral,
        entry_price,
        open_block,
        plaintext,
    )
}

/// Best-effort fallback for plaintexts without the expected tags.
///
/// Collects every integer-with-suffix token and disambiguates by magnitude:
/// values at or above `price_floor` are price candidates, values below it
/// amount candidates. Exactly one price and exactly two amounts must be
/// present; size is the larger amount (leverage is at least 1x) and
/// collateral the smaller. Anything else fails closed with
/// [`ParseError::Ambiguous`] -- this path is heuristic and must never guess
/// between equally plausible readings.
pub fn parse_position_heuristic(
    plaintext: &str,
    scanning_owner: &Address,
    price_floor: u64,
) -> Result<Position, ParseError> {
    let cleaned = strip_whitespace(plaintext);

    // Direction cannot be inferred from magnitudes; the boolean tag must be
    // present even on otherwise untagged records.
    let direction = tagged_bool(&cleaned, "is_long")
        .ok_or_else(|| ParseError::Ambiguous("no is_long tag to infer direction from".to_string()))
        .map(Direction::from_is_long)?;

    let id = find_field_token(&cleaned).ok_or(ParseError::MissingField("position_id"))?;

    let mut prices: Vec<u64> = Vec::new();
    let mut amounts: Vec<u64> = Vec::new();
    for token in suffixed_uint_tokens(&cleaned, &["u64", "u128"]) {
        if token >= price_floor {
            prices.push(token);
        } else {
            amounts.push(token);
        }
    }

    if prices.len() != 1 {
        return Err(ParseError::Ambiguous(format!(
            "expected exactly one price-range value, found {}",
            prices.len()
        )));
    }
    if amounts.len() != 2 {
        return Err(ParseError::Ambiguous(format!(
            "expected exactly two amount-range values, found {}",
            amounts.len()
        )));
    }

    let entry_price = prices[0];
    let size = amounts[0].max(amounts[1]);
    let collateral = amounts[0].min(amounts[1]);
    let open_block = suffixed_uint_tokens(&cleaned, &["u32"])
        .first()
        .copied()
        .unwrap_or(0) as u32;

    debug!(
        "heuristic decode resolved size={} collateral={} entry_price={}",
        size, collateral, entry_price
    );

    build_position(
        scanning_owner.clone(),
        &id,
        direction,
        size,
        collateral,
        entry_price,
        open_block,
        plaintext,
    )
}

/// Decode an LPToken record plaintext. `amount` is mandatory; the record
/// nonce becomes the share id when present.
pub fn parse_lp_share(plaintext: &str, scanning_owner: &Address) -> Result<LpShare, ParseError> {
    let cleaned = strip_whitespace(plaintext);

    let amount =
        tagged_uint(&cleaned, "amount", &["u64"])?.ok_or(ParseError::MissingField("amount"))?;
    if amount == 0 {
        return Err(ParseError::InvalidValue {
            field: "amount",
            reason: "must be positive".to_string(),
        });
    }

    let id = tagged_raw(&cleaned, "_nonce")
        .map(strip_visibility)
        .unwrap_or("")
        .to_string();
    let owner = tagged_raw(&cleaned, "owner")
        .map(strip_visibility)
        .filter(|v| v.starts_with("aleo1"))
        .map(|v| Address::new(v.to_string()))
        .unwrap_or_else(|| scanning_owner.clone());

    Ok(LpShare {
        id,
        owner,
        amount,
        record: plaintext.trim().to_string(),
    })
}

/// Decode the `pool_state` mapping value. Every field independently defaults
/// to 0 when its tag is absent: this is a read model, intentionally the
/// opposite of the fail-closed position path.
pub fn parse_pool_state(raw: &str) -> PoolState {
    let cleaned = strip_whitespace(raw);
    let extract = |key| {
        tagged_uint(&cleaned, key, &["u64", "u128"])
            .ok()
            .flatten()
            .unwrap_or(0)
    };

    PoolState {
        total_liquidity: extract("total_liquidity"),
        total_lp_shares: extract("total_lp_tokens"),
        long_open_interest: extract("long_open_interest"),
        short_open_interest: extract("short_open_interest"),
        accumulated_fees: extract("accumulated_fees"),
    }
}

/// Decode the `oracle_prices` mapping value. The price is mandatory; the
/// block stamp defaults to 0.
pub fn parse_oracle_price(raw: &str) -> Result<OraclePrice, ParseError> {
    let cleaned = strip_whitespace(raw);
    let price =
        tagged_uint(&cleaned, "price", &["u64"])?.ok_or(ParseError::MissingField("price"))?;
    let block = tagged_uint(&cleaned, "timestamp", &["u32"])?.unwrap_or(0) as u32;

    Ok(OraclePrice {
        price,
        block: BlockHeight::new(block),
    })
}

/// Decode a boolean mapping value (e.g. `closed_positions`).
pub fn parse_bool_mapping(raw: &str) -> bool {
    raw.contains("true")
}

#[allow(clippy::too_many_arguments)]
fn build_position(
    owner: Address,
    id: &str,
    direction: Direction,
    size: u64,
    collateral: u64,
    entry_price: u64,
    open_block: u32,
    plaintext: &str,
) -> Result<Position, ParseError> {
    if size == 0 {
        return Err(ParseError::InvalidValue {
            field: "size_usdc",
            reason: "must be positive".to_string(),
        });
    }
    if collateral == 0 {
        return Err(ParseError::InvalidValue {
            field: "collateral_usdc",
            reason: "must be positive".to_string(),
        });
    }
    if entry_price == 0 {
        return Err(ParseError::InvalidValue {
            field: "entry_price",
            reason: "must be positive".to_string(),
        });
    }

    Ok(Position {
        owner,
        id: PositionId::new(strip_visibility(id).to_string()),
        direction,
        size,
        collateral,
        entry_price,
        open_block: BlockHeight::new(open_block),
        plaintext: Some(plaintext.trim().to_string()),
    })
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Raw value of `key: value` in a whitespace-stripped plaintext, up to the
/// next delimiter. A match must start the key, so looking up `price` does
/// not hit `entry_price`.
fn tagged_raw<'a>(cleaned: &'a str, key: &str) -> Option<&'a str> {
    let pattern = format!("{}:", key);
    for (index, _) in cleaned.match_indices(&pattern) {
        let boundary = index == 0
            || matches!(cleaned.as_bytes()[index - 1], b'{' | b',' | b'(' | b'[');
        if !boundary {
            continue;
        }
        let rest = &cleaned[index + pattern.len()..];
        let end = rest.find([',', '}']).unwrap_or(rest.len());
        let value = &rest[..end];
        if !value.is_empty() {
            return Some(value);
        }
    }
    None
}

fn strip_visibility(value: &str) -> &str {
    value
        .strip_suffix(".private")
        .or_else(|| value.strip_suffix(".public"))
        .unwrap_or(value)
}

/// Tagged unsigned integer with one of the accepted type suffixes.
/// `Ok(None)` when the tag is absent; an error when present but malformed.
fn tagged_uint(
    cleaned: &str,
    key: &'static str,
    suffixes: &[&str],
) -> Result<Option<u64>, ParseError> {
    let Some(value) = tagged_raw(cleaned, key) else {
        return Ok(None);
    };
    let value = strip_visibility(value);

    for suffix in suffixes {
        if let Some(digits) = value.strip_suffix(suffix) {
            return digits
                .parse::<u64>()
                .map(Some)
                .map_err(|_| ParseError::InvalidValue {
                    field: key,
                    reason: format!("not an unsigned integer: {}", digits),
                });
        }
    }
    Err(ParseError::InvalidValue {
        field: key,
        reason: format!("unexpected type suffix in {}", value),
    })
}

fn tagged_bool(cleaned: &str, key: &str) -> Option<bool> {
    match tagged_raw(cleaned, key).map(strip_visibility) {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

/// Every `<digits><suffix>` token in the value stream, in textual order.
fn suffixed_uint_tokens(cleaned: &str, suffixes: &[&str]) -> Vec<u64> {
    let bytes = cleaned.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let rest = &cleaned[i..];
            for suffix in suffixes {
                if rest.starts_with(suffix) {
                    // The suffix must end at a delimiter, not run into a
                    // longer identifier.
                    let after = rest[suffix.len()..].chars().next();
                    if after.map_or(true, |c| !c.is_ascii_alphanumeric()) {
                        if let Ok(v) = cleaned[start..i].parse::<u64>() {
                            tokens.push(v);
                        }
                        break;
                    }
                }
            }
        } else {
            i += 1;
        }
    }
    tokens
}

/// First `<digits>field` token, returned with its suffix (it is the id's
/// canonical form).
fn find_field_token(cleaned: &str) -> Option<String> {
    let bytes = cleaned.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            let rest = &cleaned[i..];
            if rest.starts_with("field") {
                let after = rest["field".len()..].chars().next();
                if after.map_or(true, |c| !c.is_ascii_alphanumeric()) {
                    return Some(format!("{}field", &cleaned[start..i]));
                }
            }
        } else {
            i += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAINTEXT: &str = "{\n  owner: aleo1abc.private,\n  position_id: 12345field.private,\n  is_long: true,\n  size_usdc: 50000000u64.private,\n  collateral_usdc: 4950000u64.private,\n  entry_price: 10000000000000u64.private,\n  open_block: 42u32.private\n}";

    fn scanner() -> Address {
        Address::new("aleo1scanner".to_string())
    }

    #[test]
    fn test_parse_position_tagged() {
        let position = parse_position(PLAINTEXT, &scanner()).unwrap();
        assert_eq!(position.owner.as_str(), "aleo1abc");
        assert_eq!(position.id.as_str(), "12345field");
        assert_eq!(position.direction, Direction::Long);
        assert_eq!(position.size, 50_000_000);
        assert_eq!(position.collateral, 4_950_000);
        assert_eq!(position.entry_price, 10_000_000_000_000);
        assert_eq!(position.open_block, BlockHeight::new(42));
        assert_eq!(position.plaintext.as_deref(), Some(PLAINTEXT.trim()));
    }

    #[test]
    fn test_parse_position_collateral_u128_suffix() {
        let plaintext = "{ position_id: 1field, is_long: false, size_usdc: 50000000u64, collateral_usdc: 4950000u128, entry_price: 10000000000000u64 }";
        let position = parse_position(plaintext, &scanner()).unwrap();
        assert_eq!(position.collateral, 4_950_000);
        assert_eq!(position.direction, Direction::Short);
        // Absent tags fall back: owner to the scanning identity, block to 0.
        assert_eq!(position.owner, scanner());
        assert_eq!(position.open_block, BlockHeight::new(0));
    }

    #[test]
    fn test_parse_position_missing_collateral_fails_closed() {
        let plaintext = "{ position_id: 1field, is_long: true, size_usdc: 50000000u64, entry_price: 10000000000000u64 }";
        assert_eq!(
            parse_position(plaintext, &scanner()),
            Err(ParseError::MissingField("collateral_usdc"))
        );
    }

    #[test]
    fn test_parse_position_missing_id() {
        let plaintext = "{ is_long: true, size_usdc: 1u64 }";
        assert_eq!(
            parse_position(plaintext, &scanner()),
            Err(ParseError::MissingField("position_id"))
        );
    }

    #[test]
    fn test_parse_position_zero_size_rejected() {
        let plaintext = "{ position_id: 1field, is_long: true, size_usdc: 0u64, collateral_usdc: 1u64, entry_price: 1u64 }";
        assert!(matches!(
            parse_position(plaintext, &scanner()),
            Err(ParseError::InvalidValue { field: "size_usdc", .. })
        ));
    }

    #[test]
    fn test_parse_position_malformed_number() {
        let plaintext =
            "{ position_id: 1field, is_long: true, size_usdc: xyzu64, collateral_usdc: 1u64, entry_price: 1u64 }";
        assert!(matches!(
            parse_position(plaintext, &scanner()),
            Err(ParseError::InvalidValue { field: "size_usdc", .. })
        ));
    }

    #[test]
    fn test_heuristic_disambiguates_by_magnitude() {
        // No recognizable tags on the numbers, but one price-range value and
        // two amount-range values.
        let plaintext =
            "{ pid: 777field, is_long: true, a: 4950000u64, b: 50000000u64, c: 10000000000000u64 }";
        let position = parse_position_heuristic(plaintext, &scanner(), 10_000_000_000).unwrap();
        assert_eq!(position.entry_price, 10_000_000_000_000);
        assert_eq!(position.size, 50_000_000);
        assert_eq!(position.collateral, 4_950_000);
        assert_eq!(position.id.as_str(), "777field");
    }

    #[test]
    fn test_heuristic_ambiguous_amounts() {
        let plaintext =
            "{ pid: 777field, is_long: true, a: 1u64, b: 2u64, c: 3u64, d: 10000000000000u64 }";
        assert!(matches!(
            parse_position_heuristic(plaintext, &scanner(), 10_000_000_000),
            Err(ParseError::Ambiguous(_))
        ));
    }

    #[test]
    fn test_heuristic_ambiguous_without_direction() {
        let plaintext = "{ pid: 777field, a: 4950000u64, b: 50000000u64, c: 10000000000000u64 }";
        assert!(matches!(
            parse_position_heuristic(plaintext, &scanner(), 10_000_000_000),
            Err(ParseError::Ambiguous(_))
        ));
    }

    #[test]
    fn test_heuristic_two_price_candidates() {
        let plaintext = "{ pid: 777field, is_long: false, a: 4950000u64, b: 50000000u64, c: 10000000000000u64, d: 20000000000000u64 }";
        assert!(matches!(
            parse_position_heuristic(plaintext, &scanner(), 10_000_000_000),
            Err(ParseError::Ambiguous(_))
        ));
    }

    #[test]
    fn test_parse_lp_share() {
        let plaintext =
            "{ owner: aleo1abc.private, amount: 25000000u64.private, _nonce: 999group.public }";
        let share = parse_lp_share(plaintext, &scanner()).unwrap();
        assert_eq!(share.amount, 25_000_000);
        assert_eq!(share.id, "999group");
        assert_eq!(share.owner.as_str(), "aleo1abc");
    }

    #[test]
    fn test_parse_lp_share_missing_amount() {
        assert_eq!(
            parse_lp_share("{ owner: aleo1abc }", &scanner()),
            Err(ParseError::MissingField("amount"))
        );
    }

    #[test]
    fn test_parse_pool_state_defaults_missing_fields() {
        let raw = "{ total_liquidity: 100000000u64, long_open_interest: 30000000u64 }";
        let state = parse_pool_state(raw);
        assert_eq!(state.total_liquidity, 100_000_000);
        assert_eq!(state.long_open_interest, 30_000_000);
        assert_eq!(state.short_open_interest, 0);
        assert_eq!(state.total_lp_shares, 0);
        assert_eq!(state.accumulated_fees, 0);
    }

    #[test]
    fn test_parse_pool_state_garbage_is_zero() {
        assert_eq!(parse_pool_state("null"), PoolState::default());
    }

    #[test]
    fn test_parse_oracle_price() {
        let raw = "{ price: 10000000000000u64, timestamp: 123u32 }";
        let price = parse_oracle_price(raw).unwrap();
        assert_eq!(price.price, 10_000_000_000_000);
        assert_eq!(price.block, BlockHeight::new(123));
    }

    #[test]
    fn test_parse_oracle_price_requires_price() {
        assert_eq!(
            parse_oracle_price("{ timestamp: 123u32 }"),
            Err(ParseError::MissingField("price"))
        );
    }

    #[test]
    fn test_parse_bool_mapping() {
        assert!(parse_bool_mapping("true"));
        assert!(parse_bool_mapping("\"true\""));
        assert!(!parse_bool_mapping("false"));
        assert!(!parse_bool_mapping(""));
    }
}
