use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use seo_forecast::ctr::{CtrSource, OverflowPolicy};
use seo_forecast::scenario::{improve_by_n, improve_by_percent, PercentMode, ScenarioId};
use seo_forecast::timeline::{distribute, DurationProfile, GrowthCurve};

fn any_source() -> impl Strategy<Value = CtrSource> {
    prop::sample::select(CtrSource::ALL.to_vec())
}

fn any_overflow() -> impl Strategy<Value = OverflowPolicy> {
    prop::sample::select(vec![OverflowPolicy::LastBucket, OverflowPolicy::Zero])
}

fn any_profile() -> impl Strategy<Value = DurationProfile> {
    prop::sample::select(DurationProfile::ALL.to_vec())
}

fn any_percent_mode() -> impl Strategy<Value = PercentMode> {
    prop::sample::select(vec![PercentMode::Scale, PercentMode::OfHundred])
}

/// Sorted increments ending at 100.
fn any_curve() -> impl Strategy<Value = GrowthCurve> {
    prop::collection::vec(0.0f64..100.0, 0..30).prop_map(|mut values| {
        values.sort_by(|a, b| a.total_cmp(b));
        values.push(100.0);
        GrowthCurve::new(values).expect("sorted curve ending at 100")
    })
}

proptest! {
    #[test]
    fn ctr_never_increases_with_position(
        source in any_source(),
        overflow in any_overflow(),
        a in 1.0f64..150.0,
        b in 1.0f64..150.0,
    ) {
        let table = source.table(overflow);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(
            table.ctr_for(lo) >= table.ctr_for(hi),
            "ctr({}) = {} < ctr({}) = {}",
            lo, table.ctr_for(lo), hi, table.ctr_for(hi)
        );
    }

    #[test]
    fn ctr_is_never_negative(source in any_source(), position in -50.0f64..500.0) {
        prop_assert!(source.table(OverflowPolicy::LastBucket).ctr_for(position) >= 0.0);
    }

    #[test]
    fn improve_by_n_stays_within_one_and_input(position in 1.0f64..500.0, n in 0.0f64..200.0) {
        let adjusted = improve_by_n(position, n);
        prop_assert!(adjusted >= 1.0);
        prop_assert!(adjusted <= position);
    }

    #[test]
    fn improve_by_percent_stays_within_one_and_input(
        position in 1.0f64..500.0,
        fraction in 0.0f64..=1.0,
        mode in any_percent_mode(),
    ) {
        let adjusted = improve_by_percent(position, fraction, mode);
        prop_assert!(adjusted >= 1.0);
        prop_assert!(adjusted <= position);
    }

    #[test]
    fn distribute_with_equal_ends_is_constant(value in -1.0e6f64..1.0e6, curve in any_curve()) {
        let series = distribute(value, value, &curve);
        prop_assert_eq!(series.len(), curve.months());
        prop_assert!(series.iter().all(|point| point.value == value));
    }

    #[test]
    fn distribute_last_step_is_future(
        current in -1.0e6f64..1.0e6,
        future in -1.0e6f64..1.0e6,
        profile in any_profile(),
    ) {
        let series = distribute(current, future, &profile.curve());
        prop_assert_eq!(series.last().map(|point| point.value), Some(future));
    }

    #[test]
    fn distribute_moves_monotonically_toward_future(
        current in 0.0f64..1.0e5,
        future in 0.0f64..1.0e5,
        curve in any_curve(),
    ) {
        let series = distribute(current, future, &curve);
        for pair in series.windows(2) {
            if future >= current {
                prop_assert!(pair[1].value >= pair[0].value - 1e-6);
            } else {
                prop_assert!(pair[1].value <= pair[0].value + 1e-6);
            }
        }
    }

    #[test]
    fn seeded_lifts_are_reproducible(seed in any::<u64>(), position in 1.0f64..200.0) {
        let lifts = [
            ScenarioId::PageTwo,
            ScenarioId::TopFive,
            ScenarioId::TopThree,
            ScenarioId::PageOne,
        ];
        for id in lifts {
            let scenario = id.scenario(PercentMode::Scale);
            let a = scenario.apply(position, &mut StdRng::seed_from_u64(seed));
            let b = scenario.apply(position, &mut StdRng::seed_from_u64(seed));
            prop_assert_eq!(a, b);
            prop_assert!(a >= 1.0);
            prop_assert!(a <= position);
        }
    }
}
