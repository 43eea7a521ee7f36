//! Property-based tests for settlement invariants
//!
//! These tests use proptest to verify:
//! - Conservation: Σ(paid) == Σ(amounts), Σ(share) == grand total, Σ(net) == 0
//! - Transfer correctness: executing every transfer zeroes every balance
//! - Positivity: every transfer moves a positive amount between two people
//! - Determinism: the same snapshot always yields the same transfers

use expense_settlement::{
    Expense, GroupSnapshot, NetPosition, NettingEngine, Participant, SettlementEngine,
    SplitPolicy, Surcharge, TipMode, CONSERVATION_TOLERANCE, SETTLED_EPSILON,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating expense amounts (cents, zero allowed)
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..5_000_00i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for generating percentage weights
fn weight_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_00i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// Strategy for generating a split policy over `n` participants
fn policy_strategy(n: usize) -> impl Strategy<Value = SplitPolicy> {
    prop_oneof![
        Just(SplitPolicy::equal()),
        prop::collection::vec(0..n, 0..=n).prop_map(|included| SplitPolicy::subset(included)),
        prop::collection::vec((0..n, weight_strategy()), 0..=n)
            .prop_map(|weights| SplitPolicy::percentage(weights)),
    ]
}

/// Strategy for generating an expense over `n` participants
fn expense_strategy(n: usize) -> impl Strategy<Value = Expense> {
    (amount_strategy(), 0..n, policy_strategy(n))
        .prop_map(|(amount, payer, split)| Expense::new("item", amount, payer, split))
}

/// Strategy for generating a valid snapshot
fn snapshot_strategy() -> impl Strategy<Value = GroupSnapshot> {
    (1usize..7).prop_flat_map(|n| {
        prop::collection::vec(expense_strategy(n), 0..12).prop_map(move |expenses| {
            let participants = (0..n).map(|i| Participant::new(format!("P{}", i))).collect();
            GroupSnapshot::new(participants, expenses)
        })
    })
}

/// Strategy for generating a valid surcharge
fn surcharge_strategy() -> impl Strategy<Value = Surcharge> {
    let tip = prop_oneof![
        Just(TipMode::None),
        (0i64..25_00i64).prop_map(|p| TipMode::Percentage(Decimal::new(p, 2))),
        (0i64..500_00i64).prop_map(|c| TipMode::Fixed(Decimal::new(c, 2))),
    ];
    (tip, 0i64..20_00i64).prop_map(|(tip, tax)| Surcharge::new(tip, Decimal::new(tax, 2)))
}

/// Strategy for generating net positions that sum to zero
fn positions_strategy() -> impl Strategy<Value = Vec<NetPosition>> {
    prop::collection::vec(-1_000_00i64..1_000_00i64, 1..10).prop_map(|cents| {
        let mut nets: Vec<Decimal> = cents.into_iter().map(|c| Decimal::new(c, 2)).collect();
        let total: Decimal = nets.iter().sum();
        nets.push(-total);
        nets.into_iter()
            .enumerate()
            .map(|(i, net)| NetPosition::new(format!("P{}", i), net))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Property: every payment lands on exactly one payer
    #[test]
    fn prop_paid_is_conserved(
        snapshot in snapshot_strategy(),
        surcharge in surcharge_strategy()
    ) {
        let report = SettlementEngine::new().settle(&snapshot, &surcharge).unwrap();

        let paid: Decimal = report.participants.iter().map(|p| p.paid).sum();
        let spent: Decimal = snapshot.expenses.iter().map(|e| e.amount).sum();
        prop_assert_eq!(paid, spent);
    }

    /// Property: shares add up to the grand total whenever there is a base
    #[test]
    fn prop_share_is_conserved(
        snapshot in snapshot_strategy(),
        surcharge in surcharge_strategy()
    ) {
        let report = SettlementEngine::new().settle(&snapshot, &surcharge).unwrap();
        prop_assume!(report.totals.base > Decimal::ZERO);

        let share: Decimal = report.participants.iter().map(|p| p.share).sum();
        prop_assert!(
            (share - report.totals.grand).abs() <= CONSERVATION_TOLERANCE,
            "shares {} vs grand {}", share, report.totals.grand
        );
    }

    /// Property: balances net to zero
    #[test]
    fn prop_net_sums_to_zero(
        snapshot in snapshot_strategy(),
        surcharge in surcharge_strategy()
    ) {
        let report = SettlementEngine::new().settle(&snapshot, &surcharge).unwrap();

        let net: Decimal = report.balances().map(|(_, net)| net).sum();
        prop_assert!(net.abs() <= CONSERVATION_TOLERANCE, "net sum {}", net);
    }

    /// Property: executing all transfers settles everyone
    #[test]
    fn prop_transfers_settle_all_balances(
        snapshot in snapshot_strategy(),
        surcharge in surcharge_strategy()
    ) {
        let report = SettlementEngine::new().settle(&snapshot, &surcharge).unwrap();

        for (name, residual) in report.outstanding_after_transfers() {
            prop_assert!(
                residual.abs() <= SETTLED_EPSILON,
                "{} left with {}", name, residual
            );
        }
    }

    /// Property: transfers are positive, never self-directed, and fewer than
    /// the number of unsettled participants
    #[test]
    fn prop_transfers_are_well_formed(positions in positions_strategy()) {
        let transfers = NettingEngine::default().minimize_transfers(&positions);

        for t in &transfers {
            prop_assert!(t.amount > Decimal::ZERO);
            prop_assert_ne!(&t.from, &t.to);
        }

        let unsettled = positions
            .iter()
            .filter(|p| p.abs_net() > SETTLED_EPSILON)
            .count();
        prop_assert!(transfers.len() <= unsettled.saturating_sub(1));
    }

    /// Property: debtors only pay and creditors only receive
    #[test]
    fn prop_transfer_direction(positions in positions_strategy()) {
        let transfers = NettingEngine::default().minimize_transfers(&positions);
        let net_of = |name: &str| {
            positions
                .iter()
                .find(|p| p.participant == name)
                .map(|p| p.net)
                .unwrap()
        };

        for t in &transfers {
            prop_assert!(net_of(&t.from) < Decimal::ZERO);
            prop_assert!(net_of(&t.to) > Decimal::ZERO);
        }
    }

    /// Property: same input → same transfers
    #[test]
    fn prop_deterministic(
        snapshot in snapshot_strategy(),
        surcharge in surcharge_strategy()
    ) {
        let engine = SettlementEngine::new();
        let first = engine.settle(&snapshot, &surcharge).unwrap();
        let second = engine.settle(&snapshot, &surcharge).unwrap();

        prop_assert_eq!(first.participants, second.participants);
        prop_assert_eq!(first.transfers, second.transfers);
    }
}

#[test]
fn test_out_of_range_reference_always_fails() {
    for payer in [3usize, 4, 100] {
        let snapshot = GroupSnapshot::new(
            vec![Participant::new("A"), Participant::new("B"), Participant::new("C")],
            vec![Expense::new("Dinner", Decimal::from(10), payer, SplitPolicy::equal())],
        );
        let err = SettlementEngine::new()
            .settle(&snapshot, &Surcharge::none())
            .unwrap_err();
        assert!(err.is_invalid_reference());
    }
}
