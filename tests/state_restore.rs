// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

use pearlstate::{RandomError, RandomState, StateTuple};

fn setup() -> (RandomState, StateTuple) {
    let rs = RandomState::new(1234567890u32).unwrap();
    let state = rs.get_state();
    (rs, state)
}

#[test]
fn basic() {
    let (mut rs, state) = setup();
    let old = rs.tomaxint_array(&[16]);
    rs.set_state(&state).unwrap();
    let new = rs.tomaxint_array(&[16]);
    assert_eq!(old, new);
}

#[test]
fn gaussian_reset() {
    let (mut rs, state) = setup();
    let old = rs.standard_normal_array(&[3]);
    rs.set_state(&state).unwrap();
    let new = rs.standard_normal_array(&[3]);
    assert_eq!(old, new);
}

#[test]
fn gaussian_reset_in_media_res() {
    let (mut rs, _) = setup();
    rs.standard_normal();
    let state = rs.get_state();
    let old = rs.standard_normal_array(&[3]);
    rs.set_state(&state).unwrap();
    let new = rs.standard_normal_array(&[3]);
    assert_eq!(old, new);
}

#[test]
fn backwards_compatibility() {
    let (mut rs, state) = setup();
    let old_state = state.without_gaussian();
    assert_eq!(old_state.field_count(), 3);
    let x1 = rs.standard_normal_array(&[16]);
    rs.set_state(&old_state).unwrap();
    let x2 = rs.standard_normal_array(&[16]);
    rs.set_state(&state).unwrap();
    let x3 = rs.standard_normal_array(&[16]);
    assert_eq!(x1, x2);
    assert_eq!(x1, x3);
}

#[test]
fn legacy_tuple_drops_cached_value() {
    let (mut rs, _) = setup();
    rs.standard_normal();
    let full = rs.get_state();
    let cached = rs.standard_normal();
    rs.set_state(&full.without_gaussian()).unwrap();
    // Cache is empty so the next value comes from fresh words.
    assert_ne!(rs.standard_normal(), cached);
}

#[test]
fn negative_binomial() {
    // Fractional n must be accepted.
    let (mut rs, _) = setup();
    rs.negative_binomial(0.5, 0.5).unwrap();
}

#[test]
fn corrupt_tuples_leave_state_alone() {
    let (mut rs, state) = setup();
    rs.random_sample();
    let before = rs.get_state();
    let bad = [
        StateTuple::Legacy("PCG64".into(), state.key().to_vec(), 0),
        StateTuple::Legacy("MT19937".into(), state.key()[1..].to_vec(), 0),
        StateTuple::Full("MT19937".into(), state.key().to_vec(), 625, false, 0.0),
        StateTuple::Full("MT19937".into(), state.key().to_vec(), 0, true, f64::NAN),
    ];
    for tuple in &bad {
        let err = rs.set_state(tuple).unwrap_err();
        assert!(matches!(err, RandomError::CorruptState(_)));
        assert!(!err.is_domain());
        assert_eq!(rs.get_state(), before);
    }
}

#[cfg(feature = "serde")]
#[test]
fn state_survives_json() {
    let (mut rs, _) = setup();
    rs.standard_normal();
    rs.bytes(7);
    let json = serde_json::to_string(&rs.get_state()).unwrap();
    let expected = rs.standard_normal_array(&[8]);

    let parsed: StateTuple = serde_json::from_str(&json).unwrap();
    let mut other = RandomState::new(1u32).unwrap();
    other.set_state(&parsed).unwrap();
    assert_eq!(other.standard_normal_array(&[8]), expected);
}

#[cfg(feature = "serde")]
#[test]
fn legacy_json_is_accepted() {
    let (rs, _) = setup();
    let key: Vec<String> = rs.get_state().key().iter().map(|w| w.to_string()).collect();
    let json = format!("[\"MT19937\",[{}],624]", key.join(","));
    let parsed: StateTuple = serde_json::from_str(&json).unwrap();
    assert!(matches!(parsed, StateTuple::Legacy(..)));
    let mut other = RandomState::new(1u32).unwrap();
    other.set_state(&parsed).unwrap();
    assert_eq!(other, rs);
}
