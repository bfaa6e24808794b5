//! Property-based tests for the data model.

#![allow(clippy::float_cmp)]

use proptest::prelude::*;

use crate::types::{AtomicType, AtomicValue, Item, ItemType, Sequence, SequenceType};

/// Strategy for generating arbitrary atomic items.
fn arb_item() -> impl Strategy<Value = Item> {
    prop_oneof![
        any::<i64>().prop_map(Item::integer),
        any::<f64>().prop_filter("not NaN", |f| !f.is_nan()).prop_map(Item::double),
        any::<bool>().prop_map(Item::boolean),
        ".*".prop_map(Item::string),
        ".*".prop_map(|s| Item::Atomic(AtomicValue::UntypedAtomic(s))),
    ]
}

proptest! {
    #[test]
    fn item_star_matches_everything(items in prop::collection::vec(arb_item(), 0..20)) {
        let seq = Sequence::from_items(items);
        prop_assert!(SequenceType::zero_or_more(ItemType::AnyItem).matches(&seq));
        prop_assert!(SequenceType::zero_or_more(ItemType::Atomic(AtomicType::AnyAtomic)).matches(&seq));
        prop_assert!(!SequenceType::zero_or_more(ItemType::AnyNode).matches(&seq) || seq.is_empty());
    }

    #[test]
    fn sequence_preserves_order(items in prop::collection::vec(arb_item(), 0..20)) {
        let seq = Sequence::from_items(items.clone());
        prop_assert_eq!(seq.len(), items.len());
        for (i, item) in items.iter().enumerate() {
            prop_assert_eq!(seq.get(i), Some(item));
        }
    }

    #[test]
    fn integer_ebv_is_nonzero(i in any::<i64>()) {
        let seq = Sequence::singleton(Item::integer(i));
        prop_assert_eq!(seq.effective_boolean_value().unwrap(), i != 0);
    }

    #[test]
    fn integer_string_value_parses_back(i in any::<i64>()) {
        let text = AtomicValue::Integer(i).string_value();
        prop_assert_eq!(text.parse::<i64>().unwrap(), i);
    }
}
