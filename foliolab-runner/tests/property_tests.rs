//! Property tests for seed derivation and run fingerprints.
//!
//! Uses proptest to verify:
//! 1. Per-portfolio seeds fit the generator's 31 bits and are deterministic
//! 2. The seed policy decides which seed the simulator receives
//! 3. Fingerprints are 64-char hex and depend on the seed
//! 4. A per-portfolio refresh is reproducible

use foliolab_core::{Holding, PortfolioSnapshot, SignalHistory};
use foliolab_runner::{analyze, portfolio_seed, run_fingerprint, AnalysisConfig, SeedPolicy};
use proptest::prelude::*;

fn arb_snapshot() -> impl Strategy<Value = PortfolioSnapshot> {
    prop::collection::vec((0.0..1000.0_f64, 0.01..500.0_f64), 1..=12).prop_map(|rows| {
        let holdings = rows
            .into_iter()
            .enumerate()
            .map(|(i, (q, p))| Holding::new(format!("H{i}"), q, p))
            .collect();
        PortfolioSnapshot::new(holdings).unwrap()
    })
}

proptest! {
    #[test]
    fn portfolio_seed_fits_31_bits(master in any::<u64>(), snap in arb_snapshot()) {
        let seed = portfolio_seed(master, &snap);
        prop_assert!(seed <= 0x7fff_ffff);
        prop_assert_eq!(seed, portfolio_seed(master, &snap.clone()));
    }

    #[test]
    fn seed_policy_selects_simulation_seed(master in 0u64..=0x7fff_ffff, snap in arb_snapshot()) {
        let mut config = AnalysisConfig::default();
        config.simulation.seed = master;
        prop_assert_eq!(config.simulation_for(&snap).seed, master);

        config.seed_policy = SeedPolicy::PerPortfolio;
        let derived = config.simulation_for(&snap);
        prop_assert_eq!(derived.seed, portfolio_seed(master, &snap));
        prop_assert_eq!(derived.days, config.simulation.days);
    }

    #[test]
    fn fingerprint_is_hex_and_seed_sensitive(
        snap in arb_snapshot(),
        a in any::<u64>(),
        b in any::<u64>(),
    ) {
        let config = AnalysisConfig::default();
        let fa = run_fingerprint(&snap, &config, a).unwrap();
        prop_assert_eq!(fa.len(), 64);
        prop_assert!(fa.chars().all(|c| c.is_ascii_hexdigit()));

        let fb = run_fingerprint(&snap, &config, b).unwrap();
        prop_assert_eq!(a == b, fa == fb);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn per_portfolio_refresh_is_reproducible(snap in arb_snapshot()) {
        let config = AnalysisConfig {
            seed_policy: SeedPolicy::PerPortfolio,
            ..AnalysisConfig::default()
        };
        let first = analyze(&snap, &config, &mut SignalHistory::new());
        let second = analyze(&snap, &config, &mut SignalHistory::new());
        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.seed, portfolio_seed(config.simulation.seed, &snap));
                prop_assert_eq!(a, b);
            }
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            _ => prop_assert!(false, "refresh outcome changed between runs"),
        }
    }
}
