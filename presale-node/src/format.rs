use chrono::{DateTime, Utc};
use console::Style;
use presale_types::constants::{ONE_TOKEN, TOKEN_DECIMALS};
use presale_types::primitives::{Address, Amount, Currency, ReserveAsset, Timestamp};

use crate::error::NodeError;

// ── Styles ──────────────────────────────────────────────────────────────────

pub fn style_success() -> Style {
    Style::new().green()
}

pub fn style_error() -> Style {
    Style::new().red()
}

pub fn style_dim() -> Style {
    Style::new().dim()
}

pub fn print_success(msg: &str) {
    println!("  {} {}", style_success().apply_to("✓"), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("  {} {}", style_error().apply_to("Error:"), msg);
}

// ── Amounts ─────────────────────────────────────────────────────────────────

/// Format base units as whole tokens, e.g. "1,234.500000000000000000".
pub fn format_tokens(amount: Amount) -> String {
    let whole = amount / ONE_TOKEN;
    let frac = amount % ONE_TOKEN;
    format!(
        "{}.{:0>width$}",
        format_with_commas(whole),
        frac,
        width = TOKEN_DECIMALS as usize
    )
}

/// Parse a decimal token amount ("5000", "0.01", "1,000.5") into base units.
pub fn parse_tokens(s: &str) -> Result<Amount, NodeError> {
    let cleaned = s.trim().replace(',', "");
    let invalid = || NodeError::invalid_argument(format!("invalid amount '{}'", s));
    let decimals = TOKEN_DECIMALS as usize;

    let (whole, frac) = match cleaned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (cleaned.as_str(), ""),
    };
    if frac.len() > decimals || (whole.is_empty() && frac.is_empty()) {
        return Err(invalid());
    }
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac: u128 = if frac.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac, width = decimals)
            .parse()
            .map_err(|_| invalid())?
    };
    whole
        .checked_mul(ONE_TOKEN)
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(invalid)
}

fn format_with_commas(n: u128) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

// ── Addresses & enums ───────────────────────────────────────────────────────

pub fn parse_address(s: &str) -> Result<Address, NodeError> {
    let hex_str = s.strip_prefix("0x").unwrap_or(s);
    if hex_str.len() != 40 {
        return Err(NodeError::invalid_argument(format!(
            "address: expected 40 hex chars, got {}",
            hex_str.len()
        )));
    }
    let bytes = hex::decode(hex_str)
        .map_err(|e| NodeError::invalid_argument(format!("address: invalid hex: {}", e)))?;
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&bytes);
    Ok(addr)
}

pub fn parse_currency(s: &str) -> Result<Currency, NodeError> {
    Currency::parse(s).ok_or_else(|| {
        NodeError::invalid_argument(format!(
            "unknown currency '{}', expected 'native' or 'stable'",
            s
        ))
    })
}

/// `staking`, `rewards`, `native` or `stable` (the latter two are payments).
pub fn parse_asset(s: &str) -> Result<ReserveAsset, NodeError> {
    match s.to_ascii_lowercase().as_str() {
        "staking" | "staking-inventory" => Ok(ReserveAsset::StakingInventory),
        "rewards" => Ok(ReserveAsset::Rewards),
        other => Currency::parse(other)
            .map(ReserveAsset::Payments)
            .ok_or_else(|| {
                NodeError::invalid_argument(format!(
                    "unknown asset '{}', expected 'staking', 'rewards', 'native' or 'stable'",
                    s
                ))
            }),
    }
}

// ── Time ────────────────────────────────────────────────────────────────────

pub fn format_timestamp(ts: Timestamp) -> String {
    if ts == 0 {
        return "-".to_string();
    }
    i64::try_from(ts)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ts.to_string())
}

pub fn format_weeks(seconds: u64) -> String {
    format!("{} weeks", seconds / presale_types::constants::WEEK)
}

pub fn format_bps(bps: u32) -> String {
    format!("{}.{:02}%", bps / 100, bps % 100)
}
