pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod primitives;
pub mod stake;
pub mod state;

#[cfg(test)]
mod tests {
    use borsh::{BorshDeserialize, BorshSerialize};

    /// Helper: borsh round-trip test.
    fn borsh_roundtrip<T: BorshSerialize + BorshDeserialize + PartialEq + std::fmt::Debug>(
        value: &T,
    ) {
        let encoded = borsh::to_vec(value).expect("borsh serialize failed");
        let decoded = T::try_from_slice(&encoded).expect("borsh deserialize failed");
        assert_eq!(*value, decoded);
    }

    #[test]
    fn test_stake_roundtrip() {
        use crate::primitives::Currency;
        use crate::stake::Stake;
        let stake = Stake {
            id: 7,
            staker: [1u8; 20],
            plan_index: 2,
            apy_bps: 12_000,
            lock_duration: 104 * crate::constants::WEEK,
            principal: 300_000 * crate::constants::ONE_TOKEN,
            invested_value: 42,
            currency: Currency::Native,
            opened_at: 1_000,
            last_claim_at: 1_000,
            claimed_rewards: 0,
            withdrawal_started_at: 0,
            withdrawn_percentage: 0,
            total_withdrawn_amount: 0,
            closed: false,
            referrer: Some([2u8; 20]),
        };
        borsh_roundtrip(&stake);
    }

    #[test]
    fn test_staker_roundtrip() {
        use crate::stake::Staker;
        let mut staker = Staker::new([3u8; 20], 4, None, 99);
        staker.stake_ids = vec![1, 5, 9];
        staker.total_principal = 123;
        borsh_roundtrip(&staker);
    }

    #[test]
    fn test_config_roundtrip() {
        use crate::config::{BasePrices, LedgerConfig};
        let cfg = LedgerConfig::new(
            [9u8; 20],
            1_700_000_000,
            BasePrices {
                native: 1_000,
                stable: 2_000,
            },
        );
        borsh_roundtrip(&cfg);
    }

    #[test]
    fn test_event_roundtrip() {
        use crate::event::LedgerEvent;
        use crate::primitives::{Currency, ReserveAsset};
        borsh_roundtrip(&LedgerEvent::ReservesChanged {
            asset: ReserveAsset::Payments(Currency::Stable),
            delta: -500,
            balance: 0,
        });
        borsh_roundtrip(&LedgerEvent::Paused);
    }

    #[test]
    fn test_event_json_is_tagged() {
        use crate::event::LedgerEvent;
        let json = serde_json::to_string(&LedgerEvent::Unpaused).unwrap();
        assert_eq!(json, r#"{"event":"unpaused"}"#);
    }

    #[test]
    fn test_treasury_roundtrip() {
        use crate::state::{GlobalCounters, Treasury};
        let treasury = Treasury {
            staking_inventory: 10,
            locked_principal: 20,
            reward_reserve: 30,
            native_payments: 40,
            stable_payments: 50,
        };
        borsh_roundtrip(&treasury);
        let counters = GlobalCounters {
            staker_count: 2,
            stake_count: 3,
            ..Default::default()
        };
        borsh_roundtrip(&counters);
    }
}
