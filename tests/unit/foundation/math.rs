use super::*;

#[test]
fn fnv_hash_is_split_invariant() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"slidecast");
    let mut b = Fnv1a64::new_default();
    b.write_u8(b's');
    b.write_bytes(b"lidecast");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn scenario_seed_depends_on_both_inputs() {
    let a = scenario_seed(7, "morning_routine");
    assert_eq!(a, scenario_seed(7, "morning_routine"));
    assert_ne!(a, scenario_seed(8, "morning_routine"));
    assert_ne!(a, scenario_seed(7, "evening_routine"));
}

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn decibel_conversions_invert() {
    assert!((db_to_amplitude(0.0) - 1.0).abs() < 1e-6);
    assert!((db_to_amplitude(-20.0) - 0.1).abs() < 1e-6);
    assert!((amplitude_to_db(0.1) + 20.0).abs() < 1e-4);
    assert_eq!(amplitude_to_db(0.0), f32::NEG_INFINITY);
}
