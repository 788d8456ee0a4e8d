//! Weather chain closure and blend timing

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use courier_quest::core::config::GameConfig;
use courier_quest::core::error::CourierError;
use courier_quest::weather::{WeatherCondition, WeatherCycle, WeatherEvent, WeatherProcess};

fn table(rows: &[(&str, &[(&str, f64)])]) -> BTreeMap<String, BTreeMap<String, f64>> {
    rows.iter()
        .map(|(from, row)| {
            (
                from.to_string(),
                row.iter().map(|(to, w)| (to.to_string(), *w)).collect(),
            )
        })
        .collect()
}

fn city_table() -> BTreeMap<String, BTreeMap<String, f64>> {
    table(&[
        ("clear", &[("clear", 0.5), ("clouds", 0.3), ("fog", 0.2)]),
        ("clouds", &[("clear", 0.3), ("rain", 0.4), ("clouds", 0.3)]),
        ("rain", &[("storm", 0.3), ("clouds", 0.7)]),
        ("storm", &[("rain", 1.0)]),
        ("fog", &[("clear", 1.0)]),
    ])
}

#[test]
fn test_samples_stay_inside_the_table() {
    let mut process = WeatherProcess::new(WeatherCondition::Clear, &city_table()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let known: Vec<WeatherCondition> = city_table().keys().map(|k| WeatherCondition::from(k.as_str())).collect();

    for _ in 0..2000 {
        let next = process.next_state(&mut rng).unwrap();
        assert!(known.contains(&next), "sampled {next} outside the table");
    }
}

#[test]
fn test_zero_weight_successor_never_sampled() {
    let t = table(&[
        ("clear", &[("clear", 1.0), ("storm", 0.0)]),
        ("storm", &[("clear", 1.0)]),
    ]);
    let process = WeatherProcess::new(WeatherCondition::Clear, &t).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    for _ in 0..500 {
        assert_eq!(process.sample_next(&mut rng).unwrap(), WeatherCondition::Clear);
    }
}

#[test]
fn test_dangling_successor_rejected_at_load() {
    let t = table(&[("clear", &[("heat", 1.0)])]);
    let result = WeatherProcess::new(WeatherCondition::Clear, &t);
    assert!(matches!(result, Err(CourierError::UnknownCondition(name)) if name == "heat"));
}

#[test]
fn test_all_zero_row_rejected() {
    let t = table(&[("clear", &[("clear", 0.0)])]);
    let result = WeatherProcess::new(WeatherCondition::Clear, &t);
    assert!(matches!(result, Err(CourierError::InvalidTransitionRow(_))));
}

#[test]
fn test_cycle_blends_then_commits() {
    let t = table(&[("clear", &[("storm", 1.0)]), ("storm", &[("clear", 1.0)])]);
    let process = WeatherProcess::new(WeatherCondition::Clear, &t).unwrap();
    let config = GameConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut cycle = WeatherCycle::new(process, &config, &mut rng);

    let timer = cycle.timer();
    assert!((45.0..=60.0).contains(&timer));

    let events = cycle.update(timer, &mut rng).unwrap();
    assert_eq!(
        events,
        vec![WeatherEvent::BlendStarted {
            from: WeatherCondition::Clear,
            to: WeatherCondition::Storm
        }]
    );
    assert_eq!(cycle.condition(), &WeatherCondition::Clear);

    cycle.update(2.0, &mut rng).unwrap();
    // halfway between 1.00 and 0.75
    assert!((cycle.effective_multiplier() - 0.875).abs() < 1e-9);

    let events = cycle.update(2.0, &mut rng).unwrap();
    assert!(events.contains(&WeatherEvent::WeatherChanged {
        old: WeatherCondition::Clear,
        new: WeatherCondition::Storm
    }));
    assert_eq!(cycle.condition(), &WeatherCondition::Storm);
    assert!((cycle.effective_multiplier() - 0.75).abs() < 1e-9);
}
