/// What a completed five-die hand does to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandOutcome {
    /// The player becomes the killer hunting for dice of `value`.
    Killer { value: u8 },
    /// The player rolls one bonus die and gains its face in hit points.
    Regenerate,
    /// The player loses `amount` hit points and the turn passes.
    LoseHitPoints { amount: i32 },
    /// Out-of-table sums fall through with no effect.
    Nothing,
}

/// Score the sum of a five-die kept hand. Low and high sums mirror each
/// other: both extremes produce a killer, both pivots regenerate, and the
/// middle band punishes by its distance from the nearest pivot.
pub fn score_hand(sum: u32) -> HandOutcome {
    match sum {
        5..=10 => HandOutcome::Killer {
            value: (11 - sum) as u8,
        },
        11 | 24 => HandOutcome::Regenerate,
        12..=17 => HandOutcome::LoseHitPoints {
            amount: (sum - 11) as i32,
        },
        18..=23 => HandOutcome::LoseHitPoints {
            amount: (24 - sum) as i32,
        },
        25..=30 => HandOutcome::Killer {
            value: (sum - 24) as u8,
        },
        _ => HandOutcome::Nothing,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(5, HandOutcome::Killer { value: 6 })]
    #[case(6, HandOutcome::Killer { value: 5 })]
    #[case(10, HandOutcome::Killer { value: 1 })]
    #[case(11, HandOutcome::Regenerate)]
    #[case(12, HandOutcome::LoseHitPoints { amount: 1 })]
    #[case(15, HandOutcome::LoseHitPoints { amount: 4 })]
    #[case(17, HandOutcome::LoseHitPoints { amount: 6 })]
    #[case(18, HandOutcome::LoseHitPoints { amount: 6 })]
    #[case(20, HandOutcome::LoseHitPoints { amount: 4 })]
    #[case(23, HandOutcome::LoseHitPoints { amount: 1 })]
    #[case(24, HandOutcome::Regenerate)]
    #[case(25, HandOutcome::Killer { value: 1 })]
    #[case(29, HandOutcome::Killer { value: 5 })]
    #[case(30, HandOutcome::Killer { value: 6 })]
    fn test_scoring_table(#[case] sum: u32, #[case] expected: HandOutcome) {
        assert_eq!(score_hand(sum), expected);
    }

    #[test]
    fn test_bands_are_symmetric() {
        // Distance from the nearest pivot drives the penalty in both bands.
        for offset in 1..=6u32 {
            let low = score_hand(11 + offset);
            let high = score_hand(24 - offset);
            assert_eq!(low, high);
        }
    }

    #[test]
    fn test_every_five_die_sum_is_covered() {
        for sum in 5..=30 {
            assert_ne!(score_hand(sum), HandOutcome::Nothing, "sum {}", sum);
        }
    }
}
