//! Properties of label deltas

use igitt::labels::{LabelChange, LabelDelta};
use igitt::LabelSet;
use proptest::prelude::*;

fn label_set() -> impl Strategy<Value = LabelSet> {
    prop::collection::btree_set("[a-z]{1,3}( [a-z]{1,2})?", 0..8).prop_map(|set| set.into_iter().collect())
}

proptest! {
    #[test]
    fn applying_delta_reaches_desired(current in label_set(), desired in label_set()) {
        let delta = LabelDelta::between(&current, &desired);
        let mut labels = current.clone();
        for change in delta.changes() {
            change.apply_to(&mut labels);
        }
        prop_assert_eq!(labels, desired);
    }

    #[test]
    fn delta_touches_only_the_difference(current in label_set(), desired in label_set()) {
        let delta = LabelDelta::between(&current, &desired);
        let expected = current.difference(&desired).count() + desired.difference(&current).count();
        prop_assert_eq!(delta.len(), expected);

        for change in delta.changes() {
            match &change {
                LabelChange::Add(label) => prop_assert!(!current.contains(label) && desired.contains(label)),
                LabelChange::Remove(label) => prop_assert!(current.contains(label) && !desired.contains(label)),
            }
        }
    }

    #[test]
    fn adds_come_before_removes(current in label_set(), desired in label_set()) {
        let changes = LabelDelta::between(&current, &desired).changes();
        let first_remove = changes.iter().position(|c| matches!(c, LabelChange::Remove(_)));
        if let Some(first_remove) = first_remove {
            prop_assert!(changes[first_remove..].iter().all(|c| matches!(c, LabelChange::Remove(_))));
        }
    }

    #[test]
    fn same_sets_yield_empty_delta(labels in label_set()) {
        prop_assert!(LabelDelta::between(&labels, &labels).is_empty());
    }
}
