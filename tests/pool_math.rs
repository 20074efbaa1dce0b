//! Integration tests for constant-product pool math.
//!
//! Tests verify:
//! - swap output matches `Y - XY / (X + d(1 - f))` on both sides
//! - the invariant never decreases and grows on every fee-paying swap
//! - a swap followed by the reverse swap loses value to fees
//! - failed operations leave the pool untouched

mod common;

#[cfg(test)]
mod pool_math {
    use super::common::{assert_close, seeded_scenarios, POOL_A};
    use cpamm_sim::{ArbError, Pool, PoolEvent, Token};

    const AMOUNTS: [f64; 6] = [0.5, 1.0, 17.25, 250.0, 1_000.0, 40_000.0];

    #[test]
    fn swap_output_matches_closed_form_both_sides() {
        let (x, y, f) = (POOL_A.base, POOL_A.quote, 0.003);

        for d in AMOUNTS {
            let mut pool = Pool::new(x, y).expect("valid pool");
            let out = pool.swap(Token::Base, d).expect("base swap");
            assert_close(out, y - (x * y) / (x + d * (1.0 - f)), 1e-12);

            let mut pool = Pool::new(x, y).expect("valid pool");
            let out = pool.swap(Token::Quote, d).expect("quote swap");
            assert_close(out, x - (x * y) / (y + d * (1.0 - f)), 1e-12);
        }
    }

    #[test]
    fn invariant_grows_on_every_fee_paying_swap() {
        for scenario in seeded_scenarios(3, 20) {
            let pair = scenario.reserves_a;
            let mut pool = Pool::new(pair.base, pair.quote).expect("valid pool");

            for (i, d) in AMOUNTS.iter().enumerate() {
                let token = if i % 2 == 0 { Token::Quote } else { Token::Base };
                let k_before = pool.invariant();
                pool.swap(token, *d).expect("swap succeeds");
                assert!(
                    pool.invariant() > k_before,
                    "k fell from {k_before} to {} after {d} {token}",
                    pool.invariant()
                );
            }
        }
    }

    #[test]
    fn zero_fee_swap_keeps_invariant_within_rounding() {
        let mut pool = Pool::with_fee(POOL_A.base, POOL_A.quote, 0.0).expect("valid pool");
        let k_before = pool.invariant();
        pool.swap(Token::Quote, 123.0).expect("swap succeeds");
        assert_close(pool.invariant(), k_before, 1e-12);
    }

    #[test]
    fn round_trip_loses_to_fees() {
        for d in AMOUNTS {
            for token in [Token::Base, Token::Quote] {
                let mut pool = Pool::new(POOL_A.base, POOL_A.quote).expect("valid pool");
                let out = pool.swap(token, d).expect("outbound swap");
                let back = pool.swap(token.other(), out).expect("return swap");
                assert!(back < d, "round trip of {d} {token} returned {back}");
            }
        }
    }

    #[test]
    fn failed_operations_leave_pool_untouched() {
        let mut pool = Pool::new(POOL_A.base, POOL_A.quote).expect("valid pool");
        let before = pool.snapshot();

        assert_eq!(pool.swap(Token::Base, -1.0), Err(ArbError::InvalidAmount(-1.0)));
        assert!(matches!(pool.swap_symbol("WBTC", 1.0), Err(ArbError::InvalidToken(_))));
        assert!(matches!(
            pool.add_liquidity(1.0, 1.0),
            Err(ArbError::LiquidityRatioMismatch { .. })
        ));
        assert!(matches!(
            pool.remove_liquidity(POOL_A.base * 2.0, POOL_A.quote * 2.0),
            Err(ArbError::InvalidReserves(_))
        ));

        assert_eq!(pool.snapshot(), before);
    }

    #[test]
    fn audit_trail_chains_snapshots() {
        let mut pool = Pool::new(POOL_A.base, POOL_A.quote).expect("valid pool");
        let mut trail: Vec<PoolEvent> = Vec::new();

        pool.swap_with(Token::Quote, 10.0, &mut trail).expect("swap");
        pool.add_liquidity_with(
            pool.reserve_base() * 0.1,
            pool.reserve_quote() * 0.1,
            &mut trail,
        )
        .expect("add at pool ratio");
        pool.swap_with(Token::Base, 5_000.0, &mut trail).expect("swap");

        assert_eq!(trail.len(), 3);
        assert_eq!(trail.last().map(PoolEvent::after), Some(&pool.snapshot()));
        assert!(matches!(trail[1], PoolEvent::AddLiquidity { .. }));
    }
}
