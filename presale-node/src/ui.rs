use comfy_table::{presets, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use presale_ledger::engine::Receipt;
use presale_ledger::oracle::PriceQuote;
use presale_ledger::{GlobalStats, Outcome};
use presale_types::primitives::{format_address, Address, Amount, Timestamp};
use presale_types::stake::StakePlan;

use crate::error::NodeError;
use crate::format::*;
use crate::service::{StakeView, StakerView};

/// Data table for lists (stakes, plans, prices).
pub fn data_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers);
    table
}

/// Key-value card without borders.
pub fn info_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn cell_right(content: impl ToString) -> comfy_table::Cell {
    comfy_table::Cell::new(content).set_alignment(CellAlignment::Right)
}

pub fn print_table(table: &Table) {
    for line in table.lines() {
        println!("  {}", line);
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), NodeError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_receipt(receipt: &Receipt) {
    let summary = match &receipt.outcome {
        Outcome::StakeOpened {
            stake_id,
            principal,
        } => format!("stake #{} opened for {} tokens", stake_id, format_tokens(*principal)),
        Outcome::Paid { amount } => format!("paid {}", format_tokens(*amount)),
        Outcome::Distributed {
            stakes_paid,
            amount,
        } => format!(
            "distributed {} across {} stakes",
            format_tokens(*amount),
            stakes_paid
        ),
        Outcome::Applied => "applied".to_string(),
    };
    print_success(&format!("{} (ledger version {})", summary, receipt.version));

    if receipt.events.is_empty() {
        return;
    }
    let mut table = data_table(&["Event", "Details"]);
    for event in &receipt.events {
        let details = serde_json::to_string(event).unwrap_or_default();
        table.add_row(vec![comfy_table::Cell::new(event.kind()), comfy_table::Cell::new(details)]);
    }
    print_table(&table);
}

fn stake_rows(table: &mut Table, view: &StakeView, now: Timestamp) {
    let s = &view.stake;
    table.add_row(vec![
        comfy_table::Cell::new(s.id),
        comfy_table::Cell::new(s.plan_index),
        cell_right(format_tokens(s.principal)),
        cell_right(format_bps(s.apy_bps)),
        comfy_table::Cell::new(format_timestamp(s.opened_at)),
        comfy_table::Cell::new(format_timestamp(s.lock_end())),
        cell_right(format!("{}%", s.withdrawn_percentage)),
        cell_right(format_tokens(view.pending_rewards)),
        comfy_table::Cell::new(format!("{:?}", s.status(now))),
    ]);
}

const STAKE_HEADERS: [&str; 9] = [
    "Id", "Plan", "Principal", "APY", "Opened", "Lock end", "Withdrawn", "Pending", "Status",
];

pub fn print_stake(view: &StakeView, now: Timestamp) {
    let s = &view.stake;
    let mut card = info_table();
    card.add_row(vec!["Owner".to_string(), format_address(&s.staker)]);
    card.add_row(vec!["Paid".to_string(), format!("{} {}", format_tokens(s.invested_value), s.currency)]);
    card.add_row(vec!["Claimed".to_string(), format_tokens(s.claimed_rewards)]);
    card.add_row(vec!["Last claim".to_string(), format_timestamp(s.last_claim_at)]);
    card.add_row(vec!["Returned".to_string(), format_tokens(s.total_withdrawn_amount)]);
    card.add_row(vec![
        "Referrer".to_string(),
        s.referrer.map(|r| format_address(&r)).unwrap_or_else(|| "-".to_string()),
    ]);
    print_table(&card);

    let mut table = data_table(&STAKE_HEADERS);
    stake_rows(&mut table, view, now);
    print_table(&table);
}

pub fn print_staker(view: &StakerView, now: Timestamp) {
    let mut card = info_table();
    card.add_row(vec!["Address".to_string(), format_address(&view.staker.address)]);
    card.add_row(vec!["Joined".to_string(), format_timestamp(view.staker.created_at)]);
    card.add_row(vec![
        "Referrer".to_string(),
        view.staker
            .referrer
            .map(|r| format_address(&r))
            .unwrap_or_else(|| "-".to_string()),
    ]);
    card.add_row(vec!["Staked".to_string(), format_tokens(view.staker.total_principal)]);
    card.add_row(vec!["Referral balance".to_string(), format_tokens(view.referral_balance)]);
    card.add_row(vec!["Referrals".to_string(), view.referrals.len().to_string()]);
    print_table(&card);

    if view.stakes.is_empty() {
        return;
    }
    let mut table = data_table(&STAKE_HEADERS);
    for stake in &view.stakes {
        stake_rows(&mut table, stake, now);
    }
    print_table(&table);
}

pub fn print_plans(plans: &[StakePlan]) {
    let mut table = data_table(&["Plan", "Lock", "APY", "Minimum"]);
    for (i, plan) in plans.iter().enumerate() {
        table.add_row(vec![
            comfy_table::Cell::new(i),
            comfy_table::Cell::new(format_weeks(plan.lock_duration)),
            cell_right(format_bps(plan.apy_bps)),
            cell_right(format_tokens(plan.min_stake_amount)),
        ]);
    }
    print_table(&table);
}

pub fn print_quotes(quotes: &[PriceQuote]) {
    let mut table = data_table(&["Currency", "Price per token", "Intervals"]);
    for q in quotes {
        table.add_row(vec![
            comfy_table::Cell::new(q.currency),
            cell_right(format_tokens(q.price)),
            cell_right(q.intervals),
        ]);
    }
    print_table(&table);
}

pub fn print_stats(stats: &GlobalStats) {
    let rows: Vec<(&str, String)> = vec![
        ("Version", stats.version.to_string()),
        ("Config revision", stats.config_revision.to_string()),
        ("Paused", stats.paused.to_string()),
        ("Stakers", stats.staker_count.to_string()),
        ("Stakes", stats.stake_count.to_string()),
        ("Invested", format_tokens(stats.total_invested)),
        ("Hardcap", format_tokens(stats.hardcap)),
        ("Tokens sold", format_tokens(stats.total_distributed)),
        ("Rewards paid", format_tokens(stats.total_rewards_paid)),
        ("Referral credited", format_tokens(stats.total_referral_credited)),
        ("Principal returned", format_tokens(stats.total_principal_returned)),
        ("Sale inventory", format_tokens(stats.treasury.staking_inventory)),
        ("Locked principal", format_tokens(stats.treasury.locked_principal)),
        ("Reward reserve", format_tokens(stats.treasury.reward_reserve)),
        ("Native payments", format_tokens(stats.treasury.native_payments)),
        ("Stable payments", format_tokens(stats.treasury.stable_payments)),
        ("Native price", format_tokens(stats.native_price)),
        ("Stable price", format_tokens(stats.stable_price)),
    ];
    let mut card = info_table();
    for (label, value) in rows {
        card.add_row(vec![
            comfy_table::Cell::new(style_dim().apply_to(label).to_string()),
            cell_right(value),
        ]);
    }
    print_table(&card);
}

pub fn print_referrals(address: &Address, referees: &[Address], balance: Amount) {
    println!(
        "  {} referred {} staker(s), {} tokens unwithdrawn",
        format_address(address),
        referees.len(),
        format_tokens(balance)
    );
    for r in referees {
        println!("    {}", format_address(r));
    }
}
