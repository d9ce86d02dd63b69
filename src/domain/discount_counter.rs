/// Running total of discounted products reported by the long-poll channel.
///
/// The value only ever grows while a session is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscountCounter {
    value: u64,
}

impl DiscountCounter {
    pub const fn new(value: u64) -> Self {
        Self { value }
    }

    pub const fn value(self) -> u64 {
        self.value
    }

    /// Next counter after receiving `count`. A zero count leaves it unchanged.
    #[must_use]
    pub const fn add(self, count: u64) -> Self {
        Self {
            value: self.value.saturating_add(count),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_count_is_noop() {
        let counter = DiscountCounter::new(3);
        assert_eq!(counter.add(0), counter);
    }

    #[test]
    fn test_add_accumulates() {
        let counter = DiscountCounter::default().add(2).add(5);
        assert_eq!(counter.value(), 7);
    }

    proptest! {
        #[test]
        fn prop_counter_is_monotonic_and_sums(counts in prop::collection::vec(0u64..1_000, 0..50)) {
            let mut counter = DiscountCounter::default();
            for &count in &counts {
                let next = counter.add(count);
                prop_assert!(next.value() >= counter.value());
                counter = next;
            }
            prop_assert_eq!(counter.value(), counts.iter().sum::<u64>());
        }
    }
}
