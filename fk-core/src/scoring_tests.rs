#[cfg(test)]
mod tests {
    use crate::scoring::{
        dead_dice, decompose, face_counts, has_any_score, score_subset, scoring_indices,
        ComboKind,
    };

    /// Every ordered roll of `k` dice (6^k of them).
    fn all_rolls(k: usize) -> Vec<Vec<u8>> {
        let mut out = vec![Vec::new()];
        for _ in 0..k {
            let mut next = Vec::with_capacity(out.len() * 6);
            for prefix in &out {
                for f in 1u8..=6 {
                    let mut r = prefix.clone();
                    r.push(f);
                    next.push(r);
                }
            }
            out = next;
        }
        out
    }

    fn is_permutation_of_straight(r: &[u8]) -> bool {
        let mut s = r.to_vec();
        s.sort_unstable();
        s == [1, 2, 3, 4, 5, 6]
    }

    fn is_three_pairs(r: &[u8]) -> bool {
        r.len() == 6 && face_counts(r).iter().filter(|&&c| c == 2).count() == 3
    }

    #[test]
    fn every_straight_scores_1500() {
        let mut seen = 0;
        for r in all_rolls(6) {
            if is_permutation_of_straight(&r) {
                seen += 1;
                assert_eq!(score_subset(&r), 1500, "straight {:?}", r);
                let combos = decompose(&r);
                assert_eq!(combos.len(), 1);
                assert_eq!(combos[0].kind, ComboKind::Straight);
            }
        }
        assert_eq!(seen, 720);
    }

    #[test]
    fn every_three_pairs_scores_1500() {
        let mut seen = 0;
        for r in all_rolls(6) {
            if is_three_pairs(&r) {
                seen += 1;
                assert_eq!(score_subset(&r), 1500, "three pairs {:?}", r);
                assert_eq!(decompose(&r)[0].kind, ComboKind::ThreePairs);
            }
        }
        // C(6,3) face choices * 6!/(2!2!2!) arrangements
        assert_eq!(seen, 20 * 90);
    }

    #[test]
    fn fewer_than_three_dead_faces_score_nothing() {
        for face in [2u8, 3, 4, 6] {
            for count in 1..3 {
                let r = vec![face; count];
                assert_eq!(score_subset(&r), 0, "{:?}", r);
                assert!(!has_any_score(&r));
                assert_eq!(dead_dice(&r), r);
            }
        }
    }

    #[test]
    fn n_of_a_kind_table() {
        assert_eq!(score_subset(&[1, 1, 1]), 1000);
        assert_eq!(score_subset(&[1, 1, 1, 1]), 2000);
        assert_eq!(score_subset(&[5, 5, 5]), 500);
        assert_eq!(score_subset(&[2, 2, 2]), 200);
        assert_eq!(score_subset(&[6, 6, 6, 6, 6, 6]), 4800);
        assert_eq!(score_subset(&[2, 2, 2, 2, 2, 2]), 1600);
        assert_eq!(score_subset(&[4, 4, 4, 4, 4]), 1600);
        assert_eq!(score_subset(&[1, 1, 1, 1, 1, 1]), 8000);
    }

    #[test]
    fn singles_and_leftovers() {
        assert_eq!(score_subset(&[1]), 100);
        assert_eq!(score_subset(&[5]), 50);
        assert_eq!(score_subset(&[1, 1]), 200);
        assert_eq!(score_subset(&[1, 5]), 150);
        assert_eq!(score_subset(&[5, 5, 2, 3]), 100);
    }

    #[test]
    fn mixed_roll_scenario() {
        let r = [1, 1, 1, 5, 5, 2];
        assert!(has_any_score(&r));
        assert_eq!(score_subset(&r), 1100);
        assert_eq!(dead_dice(&r), vec![2]);
        assert_eq!(scoring_indices(&r), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn four_plus_pair_is_not_three_pairs() {
        // 1111 + 55: four ones and two single fives.
        assert_eq!(score_subset(&[1, 1, 1, 1, 5, 5]), 2100);
        // 2222 + 33: the threes are dead.
        assert_eq!(score_subset(&[2, 2, 2, 2, 3, 3]), 400);
        assert_eq!(dead_dice(&[2, 2, 2, 2, 3, 3]), vec![3, 3]);
    }

    #[test]
    fn scoring_is_order_independent_and_pure() {
        for r in all_rolls(4) {
            let mut rev = r.clone();
            rev.reverse();
            let a = score_subset(&r);
            assert_eq!(a, score_subset(&r));
            assert_eq!(a, score_subset(&rev));
        }
    }

    #[test]
    fn partition_accounts_for_every_die_exhaustive() {
        for k in 1..=6 {
            for r in all_rolls(k) {
                let combos = decompose(&r);
                let consumed: usize = combos.iter().map(|c| c.consumed.len()).sum();
                let dead = dead_dice(&r);
                assert_eq!(consumed + dead.len(), r.len(), "{:?}", r);

                let total: u32 = combos.iter().map(|c| c.score).sum();
                assert_eq!(total, score_subset(&r));
                assert_eq!(has_any_score(&r), !combos.is_empty());

                // Banking exactly the scoring dice is worth the whole roll.
                let picked: Vec<u8> = scoring_indices(&r).iter().map(|&i| r[i]).collect();
                assert_eq!(score_subset(&picked), total, "{:?}", r);
                assert!(dead_dice(&picked).is_empty());
            }
        }
    }

    #[test]
    fn farkle_rolls_contain_only_dead_faces() {
        for k in 1..=6 {
            for r in all_rolls(k) {
                if !has_any_score(&r) {
                    assert!(r.iter().all(|&f| f != 1 && f != 5), "{:?}", r);
                    assert!(face_counts(&r).iter().all(|&c| c < 3), "{:?}", r);
                }
            }
        }
    }
}
