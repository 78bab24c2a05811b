//! Property tests for the slot partitioner.

use proptest::prelude::*;

use rangebench::{compute_slot_ranges, SlotRange};

fn slot_containing(slots: &[SlotRange], value: i64) -> Option<usize> {
    slots.iter().position(|s| s.contains(value))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn slots_cover_the_domain(
        values in prop::collection::vec(-1000i64..1000, 1..400),
        num_slots in 1usize..16,
    ) {
        let slots = compute_slot_ranges(&values, num_slots).unwrap();
        prop_assert_eq!(slots.len(), num_slots);

        let min = *values.iter().min().unwrap();
        let max = *values.iter().max().unwrap();
        prop_assert_eq!(slots[0].low, min);
        prop_assert_eq!(slots[num_slots - 1].high, max);

        for slot in &slots {
            prop_assert!(slot.low <= slot.high);
        }
    }

    #[test]
    fn adjacent_slots_share_their_boundary(
        values in prop::collection::vec(-1000i64..1000, 1..400),
        num_slots in 2usize..16,
    ) {
        let slots = compute_slot_ranges(&values, num_slots).unwrap();
        for pair in slots.windows(2) {
            prop_assert_eq!(pair[0].high, pair[1].low);
        }
    }

    #[test]
    fn every_value_lands_in_a_slot(
        values in prop::collection::vec(-1000i64..1000, 1..400),
        num_slots in 1usize..16,
    ) {
        let slots = compute_slot_ranges(&values, num_slots).unwrap();
        for &v in &values {
            prop_assert!(
                slot_containing(&slots, v).is_some(),
                "value {} not covered by {:?}",
                v,
                slots
            );
        }
    }

    #[test]
    fn boundaries_are_monotonic(
        values in prop::collection::vec(-1_000_000i64..1_000_000, 1..200),
        num_slots in 1usize..12,
    ) {
        let slots = compute_slot_ranges(&values, num_slots).unwrap();
        let mut previous = slots[0].low;
        for slot in &slots {
            prop_assert!(slot.low >= previous);
            prop_assert!(slot.high >= slot.low);
            previous = slot.low;
        }
    }

    #[test]
    fn partitioning_is_deterministic(
        values in prop::collection::vec(-500i64..500, 1..200),
        num_slots in 1usize..8,
    ) {
        let first = compute_slot_ranges(&values, num_slots).unwrap();
        let mut shuffled = values.clone();
        shuffled.reverse();
        let second = compute_slot_ranges(&shuffled, num_slots).unwrap();
        prop_assert_eq!(first, second);
    }
}
