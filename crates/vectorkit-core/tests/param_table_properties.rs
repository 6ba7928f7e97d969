use proptest::prelude::*;
use std::collections::HashSet;
use vectorkit_core::{MarkingParams, ParamChange, ParamTable};

fn change_strategy() -> impl Strategy<Value = ParamChange> {
    prop_oneof![
        (0u8..4).prop_map(|v| ParamChange::LaserPower(f32::from(v) * 50.0)),
        (0u8..3).prop_map(|v| ParamChange::MarkSpeed(f32::from(v) * 400.0)),
        (0u8..2).prop_map(|v| ParamChange::FocusShift(f32::from(v) * -0.5)),
        (0u8..3).prop_map(|v| ParamChange::PointExposureTime(f32::from(v) * 10.0)),
    ]
}

#[derive(Debug, Clone)]
enum Step {
    Update(ParamChange),
    Insert,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        change_strategy().prop_map(Step::Update),
        Just(Step::Insert),
    ]
}

proptest! {
    #[test]
    fn equal_states_share_one_key(steps in prop::collection::vec(step_strategy(), 1..64)) {
        let mut table = ParamTable::new();
        let mut shadow = MarkingParams::default();
        let mut issued: Vec<(i32, MarkingParams)> = Vec::new();

        for step in steps {
            match step {
                Step::Update(change) => {
                    shadow.apply(change.clone());
                    table.update(change);
                }
                Step::Insert => {
                    let key = table.insert_current();
                    issued.push((key, shadow.clone()));
                }
            }
        }

        // Every key still resolves to the state it was issued for.
        for (key, state) in &issued {
            prop_assert_eq!(table.get(*key), Some(state));
        }

        // No two distinct keys hold equal records.
        let map = table.to_map();
        let signatures: HashSet<_> = map.values().map(MarkingParams::signature).collect();
        prop_assert_eq!(signatures.len(), map.len());

        // Keys are dense from zero.
        let keys: Vec<i32> = map.keys().copied().collect();
        let expected: Vec<i32> = (0..map.len() as i32).collect();
        prop_assert_eq!(keys, expected);
    }

    #[test]
    fn absorbing_own_map_is_identity(steps in prop::collection::vec(change_strategy(), 1..16)) {
        let mut table = ParamTable::new();
        for change in steps {
            table.update(change);
            table.insert_current();
        }
        let map = table.to_map();
        let remap = table.absorb(map.clone());
        prop_assert_eq!(table.len(), map.len());
        for (old, new) in remap {
            prop_assert_eq!(old, new);
        }
    }
}
