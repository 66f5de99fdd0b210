use std::sync::Arc;

use clap::{Parser, Subcommand};

use presale_ledger::{AdminAction, Command as LedgerCommand};
use presale_types::config::{BasePrices, ReferralPolicy};
use presale_types::constants::{PLAN_COUNT, WEEK};
use presale_types::primitives::*;
use presale_types::stake::StakePlan;

use crate::clock::{Clock, FixedClock, SystemClock};
use crate::config::{NodeConfig, CONFIG_FILE_NAME};
use crate::error::NodeError;
use crate::format::{parse_address, parse_asset, parse_currency, parse_tokens, print_success};
use crate::service::LedgerService;
use crate::ui;

#[derive(Parser)]
#[command(
    name = "presale",
    about = "Presale staking ledger: stakes, weekly rewards, referrals and phased withdrawals",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE_NAME)]
    pub config: String,
    /// Evaluate at this unix timestamp instead of the system clock
    #[arg(long, global = true)]
    pub at: Option<u64>,
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        dir: String,
    },
    /// Open a stake
    Stake {
        #[arg(long, value_parser = address_arg)]
        staker: Address,
        /// Plan index (0, 1 or 2)
        #[arg(long, default_value_t = 0)]
        plan: PlanIndex,
        /// "native" or "stable"
        #[arg(long, value_parser = currency_arg, default_value = "stable")]
        currency: Currency,
        /// Payment amount in whole units, e.g. "5000" or "12.5"
        #[arg(long, value_parser = tokens_arg)]
        amount: Amount,
        /// Recorded only on the staker's first stake
        #[arg(long, value_parser = address_arg)]
        referrer: Option<Address>,
    },
    /// Claim weekly rewards on a stake
    Claim {
        #[arg(long, value_parser = address_arg)]
        staker: Address,
        stake_id: StakeId,
    },
    /// Withdraw the unlocked share of a stake's principal
    Withdraw {
        #[arg(long, value_parser = address_arg)]
        staker: Address,
        stake_id: StakeId,
    },
    /// Withdraw accumulated referral rewards
    WithdrawReferral {
        #[arg(long, value_parser = address_arg)]
        staker: Address,
    },
    /// Claim on behalf of a window of stakers (owner only)
    Distribute {
        #[arg(long, value_parser = address_arg)]
        caller: Address,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        #[arg(long, default_value_t = 100)]
        limit: u64,
    },
    /// Query ledger state
    Show {
        #[command(subcommand)]
        what: ShowCommand,
    },
    /// Owner operations
    Admin {
        #[arg(long, value_parser = address_arg)]
        caller: Address,
        #[command(subcommand)]
        action: AdminCommand,
    },
    /// Wipe the ledger store and start again from the configured genesis
    Reset {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ShowCommand {
    /// One stake by id
    Stake { id: StakeId },
    /// A staker with all its stakes
    Staker {
        #[arg(value_parser = address_arg)]
        address: Address,
    },
    /// The plan table
    Plans,
    /// Current token price per currency
    Price,
    /// Global counters and reserves
    Stats,
    /// Who an address referred
    Referrals {
        #[arg(value_parser = address_arg)]
        address: Address,
    },
}

#[derive(Subcommand, Clone)]
pub enum AdminCommand {
    /// Replace one plan
    SetPlan {
        #[arg(long)]
        plan: PlanIndex,
        #[arg(long)]
        apy_bps: BasisPoints,
        #[arg(long)]
        lock_weeks: u64,
        #[arg(long, value_parser = tokens_arg)]
        minimum: Amount,
    },
    /// Set all three tier minimums (the first is also the global minimum)
    UpdateMinimums {
        #[arg(value_parser = tokens_arg, num_args = PLAN_COUNT, required = true)]
        minimums: Vec<Amount>,
    },
    UpdateGlobalMinimum {
        #[arg(value_parser = tokens_arg)]
        minimum: Amount,
    },
    UpdateMax {
        #[arg(value_parser = tokens_arg)]
        maximum: Amount,
    },
    UpdateApy {
        #[arg(num_args = PLAN_COUNT, required = true)]
        apys: Vec<BasisPoints>,
    },
    /// Lock periods in weeks
    UpdateLockPeriods {
        #[arg(num_args = PLAN_COUNT, required = true)]
        weeks: Vec<u64>,
    },
    UpdatePrices {
        #[arg(long, value_parser = tokens_arg)]
        native: Amount,
        #[arg(long, value_parser = tokens_arg)]
        stable: Amount,
    },
    UpdateHardcap {
        #[arg(value_parser = tokens_arg)]
        hardcap: Amount,
    },
    UpdateStartTime { start_time: Timestamp },
    UpdateReferralPolicy {
        #[arg(long, value_parser = tokens_arg)]
        min_qualifying_stake: Amount,
        #[arg(long)]
        require_qualified: bool,
    },
    DepositStaking {
        #[arg(value_parser = tokens_arg)]
        amount: Amount,
    },
    FundRewards {
        #[arg(value_parser = tokens_arg)]
        amount: Amount,
    },
    WithdrawPayments {
        #[arg(value_parser = currency_arg)]
        currency: Currency,
    },
    /// Remove funds from a reserve: staking, rewards, native or stable
    EmergencyWithdraw {
        #[arg(value_parser = asset_arg)]
        asset: ReserveAsset,
        #[arg(value_parser = tokens_arg)]
        amount: Amount,
    },
    Pause,
    Unpause,
    TransferOwnership {
        #[arg(value_parser = address_arg)]
        new_owner: Address,
    },
}

fn address_arg(s: &str) -> Result<Address, String> {
    parse_address(s).map_err(|e| e.to_string())
}

fn tokens_arg(s: &str) -> Result<Amount, String> {
    parse_tokens(s).map_err(|e| e.to_string())
}

fn currency_arg(s: &str) -> Result<Currency, String> {
    parse_currency(s).map_err(|e| e.to_string())
}

fn asset_arg(s: &str) -> Result<ReserveAsset, String> {
    parse_asset(s).map_err(|e| e.to_string())
}

fn exactly<T>(values: Vec<T>, what: &str) -> Result<[T; PLAN_COUNT], NodeError> {
    let len = values.len();
    values.try_into().map_err(|_| {
        NodeError::invalid_argument(format!(
            "{}: expected {} values, got {}",
            what, PLAN_COUNT, len
        ))
    })
}

impl AdminCommand {
    pub fn into_action(self) -> Result<AdminAction, NodeError> {
        let action = match self {
            AdminCommand::SetPlan {
                plan,
                apy_bps,
                lock_weeks,
                minimum,
            } => AdminAction::SetPlan {
                plan_index: plan,
                plan: StakePlan {
                    apy_bps,
                    lock_duration: lock_weeks.saturating_mul(WEEK),
                    min_stake_amount: minimum,
                },
            },
            AdminCommand::UpdateMinimums { minimums } => AdminAction::UpdateMinimumStakeAmounts {
                minimums: exactly(minimums, "minimums")?,
            },
            AdminCommand::UpdateGlobalMinimum { minimum } => {
                AdminAction::UpdateGlobalMinimum { minimum }
            }
            AdminCommand::UpdateMax { maximum } => AdminAction::UpdateMaxStakeAmount { maximum },
            AdminCommand::UpdateApy { apys } => AdminAction::UpdateApy {
                apys: exactly(apys, "apys")?,
            },
            AdminCommand::UpdateLockPeriods { weeks } => AdminAction::UpdateLockPeriods {
                weeks: exactly(weeks, "weeks")?,
            },
            AdminCommand::UpdatePrices { native, stable } => AdminAction::UpdatePrices {
                prices: BasePrices { native, stable },
            },
            AdminCommand::UpdateHardcap { hardcap } => AdminAction::UpdateHardcap { hardcap },
            AdminCommand::UpdateStartTime { start_time } => {
                AdminAction::UpdateStartTime { start_time }
            }
            AdminCommand::UpdateReferralPolicy {
                min_qualifying_stake,
                require_qualified,
            } => AdminAction::UpdateReferralPolicy {
                policy: ReferralPolicy {
                    min_qualifying_stake,
                    require_qualified_referrer: require_qualified,
                },
            },
            AdminCommand::DepositStaking { amount } => AdminAction::DepositStakingTokens { amount },
            AdminCommand::FundRewards { amount } => AdminAction::FundRewards { amount },
            AdminCommand::WithdrawPayments { currency } => {
                AdminAction::WithdrawPayments { currency }
            }
            AdminCommand::EmergencyWithdraw { asset, amount } => {
                AdminAction::EmergencyWithdraw { asset, amount }
            }
            AdminCommand::Pause => AdminAction::Pause,
            AdminCommand::Unpause => AdminAction::Unpause,
            AdminCommand::TransferOwnership { new_owner } => {
                AdminAction::TransferOwnership { new_owner }
            }
        };
        Ok(action)
    }
}

impl Command {
    /// The ledger command this invocation submits, if it is a mutation.
    pub fn to_ledger_command(&self) -> Result<Option<LedgerCommand>, NodeError> {
        let cmd = match self {
            Command::Stake {
                staker,
                plan,
                currency,
                amount,
                referrer,
            } => LedgerCommand::OpenStake {
                staker: *staker,
                plan_index: *plan,
                currency: *currency,
                payment: *amount,
                referrer: *referrer,
            },
            Command::Claim { staker, stake_id } => LedgerCommand::ClaimRewards {
                staker: *staker,
                stake_id: *stake_id,
            },
            Command::Withdraw { staker, stake_id } => LedgerCommand::WithdrawPrincipal {
                staker: *staker,
                stake_id: *stake_id,
            },
            Command::WithdrawReferral { staker } => {
                LedgerCommand::WithdrawReferralRewards { staker: *staker }
            }
            Command::Distribute {
                caller,
                offset,
                limit,
            } => LedgerCommand::Admin {
                caller: *caller,
                action: AdminAction::DistributeRewards {
                    offset: *offset,
                    limit: *limit,
                },
            },
            Command::Admin { caller, action } => LedgerCommand::Admin {
                caller: *caller,
                action: action.clone().into_action()?,
            },
            Command::Init { .. } | Command::Show { .. } | Command::Reset { .. } => return Ok(None),
        };
        Ok(Some(cmd))
    }
}

pub async fn run(cli: Cli) -> Result<(), NodeError> {
    if let Command::Init { dir } = &cli.command {
        let path = NodeConfig::init(dir)?;
        print_success(&format!("wrote {}", path.display()));
        return Ok(());
    }

    let config = NodeConfig::load(&cli.config)?;
    let clock: Arc<dyn Clock> = match cli.at {
        Some(ts) => Arc::new(FixedClock(ts)),
        None => Arc::new(SystemClock),
    };
    let service = LedgerService::open(&config, clock)?;
    let now = service.now();

    if let Some(command) = cli.command.to_ledger_command()? {
        tracing::debug!(command = command.name(), now, "submitting command");
        let receipt = service.execute(command).await?;
        if cli.json {
            ui::print_json(&receipt)?;
        } else {
            ui::print_receipt(&receipt);
        }
        return Ok(());
    }

    match cli.command {
        Command::Show { what } => show(&service, what, now, cli.json).await,
        Command::Reset { yes } => {
            if !yes {
                return Err(NodeError::invalid_argument(
                    "reset wipes every stake; pass --yes to confirm",
                ));
            }
            let removed = service.reset(config.ledger.to_genesis()?).await?;
            print_success(&format!("ledger reset ({} entries removed)", removed));
            Ok(())
        }
        _ => Ok(()),
    }
}

async fn show(
    service: &LedgerService,
    what: ShowCommand,
    now: Timestamp,
    json: bool,
) -> Result<(), NodeError> {
    match what {
        ShowCommand::Stake { id } => {
            let view = service.stake(id).await.ok_or_else(|| {
                NodeError::from(presale_types::error::LedgerError::StakeNotFound(id))
            })?;
            if json {
                return ui::print_json(&view);
            }
            ui::print_stake(&view, now);
        }
        ShowCommand::Staker { address } => {
            let view = service.staker(address).await.ok_or_else(|| {
                NodeError::invalid_argument(format!("{} has never staked", format_address(&address)))
            })?;
            if json {
                return ui::print_json(&view);
            }
            ui::print_staker(&view, now);
        }
        ShowCommand::Plans => {
            let plans = service.plans().await;
            if json {
                return ui::print_json(&plans);
            }
            ui::print_plans(&plans);
        }
        ShowCommand::Price => {
            let quotes = service.quotes().await?;
            if json {
                return ui::print_json(&quotes);
            }
            ui::print_quotes(&quotes);
        }
        ShowCommand::Stats => {
            let stats = service.stats().await?;
            if json {
                return ui::print_json(&stats);
            }
            ui::print_stats(&stats);
        }
        ShowCommand::Referrals { address } => {
            let (referees, balance) = service.referrals(address).await;
            if json {
                return ui::print_json(&serde_json::json!({
                    "address": format_address(&address),
                    "referrals": referees.iter().map(format_address).collect::<Vec<_>>(),
                    "balance": balance.to_string(),
                }));
            }
            ui::print_referrals(&address, &referees, balance);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_stake() {
        let cli = Cli::try_parse_from([
            "presale",
            "stake",
            "--staker",
            "0x0101010101010101010101010101010101010101",
            "--amount",
            "5000",
            "--referrer",
            "0x0202020202020202020202020202020202020202",
            "--at",
            "1735689600",
        ])
        .unwrap();
        assert_eq!(cli.at, Some(1_735_689_600));
        let cmd = cli.command.to_ledger_command().unwrap().unwrap();
        assert_eq!(
            cmd,
            LedgerCommand::OpenStake {
                staker: [1; 20],
                plan_index: 0,
                currency: Currency::Stable,
                payment: 5_000 * presale_types::constants::ONE_TOKEN,
                referrer: Some([2; 20]),
            }
        );
    }

    #[test]
    fn test_parse_admin_update_apy() {
        let cli = Cli::try_parse_from([
            "presale",
            "admin",
            "--caller",
            "0x1111111111111111111111111111111111111111",
            "update-apy",
            "7000",
            "9000",
            "11000",
        ])
        .unwrap();
        match cli.command.to_ledger_command().unwrap().unwrap() {
            LedgerCommand::Admin { action, .. } => {
                assert_eq!(
                    action,
                    AdminAction::UpdateApy {
                        apys: [7_000, 9_000, 11_000]
                    }
                )
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_update_apy_needs_three_values() {
        let result = Cli::try_parse_from([
            "presale",
            "admin",
            "--caller",
            "0x1111111111111111111111111111111111111111",
            "update-apy",
            "7000",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_address_rejected_by_parser() {
        let result = Cli::try_parse_from(["presale", "withdraw-referral", "--staker", "0x12"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_queries_are_not_ledger_commands() {
        let cli = Cli::try_parse_from(["presale", "show", "stats"]).unwrap();
        assert!(cli.command.to_ledger_command().unwrap().is_none());
    }

    #[test]
    fn test_emergency_withdraw_asset() {
        let cli = Cli::try_parse_from([
            "presale",
            "admin",
            "--caller",
            "0x1111111111111111111111111111111111111111",
            "emergency-withdraw",
            "rewards",
            "10.5",
        ])
        .unwrap();
        match cli.command.to_ledger_command().unwrap().unwrap() {
            LedgerCommand::Admin { action, .. } => assert_eq!(
                action,
                AdminAction::EmergencyWithdraw {
                    asset: ReserveAsset::Rewards,
                    amount: 10 * presale_types::constants::ONE_TOKEN
                        + presale_types::constants::ONE_TOKEN / 2,
                }
            ),
            other => panic!("unexpected {:?}", other),
        }
    }
}
