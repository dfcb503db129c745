//! Property tests for the token set, vector and set algebra invariants.

use proptest::prelude::*;
use scry::{TokenSet, TokenSetBuilder};

fn sorted_unique(mut words: Vec<String>) -> Vec<String> {
    words.sort();
    words.dedup();
    words
}

fn vocabulary(words: &[String]) -> TokenSet {
    TokenSet::from_sorted_words(words).unwrap()
}

/// Glob match where `*` matches any run of characters, including the empty
/// one.
fn glob_matches(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => (0..=text.len()).any(|skip| glob_matches(rest, &text[skip..])),
        Some((ch, rest)) => text.first() == Some(ch) && glob_matches(rest, &text[1..]),
    }
}

/// Optimal-string-alignment edit distance (substitution, insertion, deletion
/// and adjacent transposition).
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut distances = vec![vec![0usize; b.len() + 1]; a.len() + 1];

    for (i, row) in distances.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        distances[0][j] = j;
    }

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (distances[i - 1][j] + 1)
                .min(distances[i][j - 1] + 1)
                .min(distances[i - 1][j - 1] + cost);

            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(distances[i - 2][j - 2] + cost);
            }
            distances[i][j] = best;
        }
    }

    distances[a.len()][b.len()]
}

fn word_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-d]{1,6}").unwrap()
}

fn vocabulary_strategy() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(word_strategy(), 1..12).prop_map(sorted_unique)
}

proptest! {
    #[test]
    fn token_set_round_trips_sorted_word_lists(words in vocabulary_strategy()) {
        let set = vocabulary(&words);
        let accepted = sorted_unique(set.to_vec());
        prop_assert_eq!(accepted, words);
    }

    #[test]
    fn out_of_order_insertion_always_fails(words in vocabulary_strategy()) {
        prop_assume!(words.len() >= 2);

        let mut builder = TokenSetBuilder::new();
        builder.insert(&words[words.len() - 1]).unwrap();
        prop_assert!(builder.insert(&words[0]).is_err());
    }

    #[test]
    fn wildcard_intersection_agrees_with_glob_semantics(
        words in vocabulary_strategy(),
        pattern in proptest::string::string_regex("[a-d*]{1,5}").unwrap(),
    ) {
        let set = vocabulary(&words);
        let matched = set.intersect(&TokenSet::from_string(&pattern)).to_vec();

        let pattern_chars: Vec<char> = pattern.chars().collect();
        for word in &words {
            let word_chars: Vec<char> = word.chars().collect();
            let expected = glob_matches(&pattern_chars, &word_chars);
            let actual = matched.contains(word);
            prop_assert_eq!(
                actual,
                expected,
                "pattern {:?} vs word {:?}",
                pattern,
                word
            );
        }
    }

    #[test]
    fn fuzzy_intersection_matches_exactly_distance_one(
        words in vocabulary_strategy(),
        term in word_strategy(),
    ) {
        let set = vocabulary(&words);
        let matched = set.intersect(&TokenSet::from_fuzzy_string(&term, 1)).to_vec();

        for word in &words {
            let expected = edit_distance(&term, word) <= 1;
            let actual = matched.contains(word);
            prop_assert_eq!(
                actual,
                expected,
                "term {:?} vs word {:?} (distance {})",
                term,
                word,
                edit_distance(&term, word)
            );
        }
    }

    #[test]
    fn intersection_is_contained_in_both_inputs(
        left in vocabulary_strategy(),
        right in vocabulary_strategy(),
    ) {
        let intersected = sorted_unique(vocabulary(&left).intersect(&vocabulary(&right)).to_vec());
        let expected: Vec<String> = left
            .iter()
            .filter(|word| right.contains(word))
            .cloned()
            .collect();
        prop_assert_eq!(intersected, expected);
    }
}

mod vectors {
    use super::*;
    use scry::scoring::vector::Vector;

    fn vector_strategy() -> impl Strategy<Value = Vector> {
        proptest::collection::btree_map(0usize..32, -10.0f64..10.0, 0..8).prop_map(|entries| {
            let mut vector = Vector::new();
            for (index, value) in entries {
                vector.insert(index, value).unwrap();
            }
            vector
        })
    }

    proptest! {
        #[test]
        fn dot_product_is_commutative(a in vector_strategy(), b in vector_strategy()) {
            prop_assert_eq!(a.dot(&b), b.dot(&a));
        }

        #[test]
        fn upsert_keeping_the_old_value_is_identity(
            vector in vector_strategy(),
            index in 0usize..32,
            value in -10.0f64..10.0,
        ) {
            let mut updated = vector.clone();
            let had_index = vector.position_for_index(index) < vector.len()
                && vector.to_flat()[vector.position_for_index(index) * 2] == index as f64;

            updated.upsert(index, value, |old, _new| old);

            if had_index {
                prop_assert_eq!(updated.to_flat(), vector.to_flat());
            } else {
                prop_assert_eq!(updated.len(), vector.len() + 1);
            }
        }

        #[test]
        fn magnitude_is_non_negative(vector in vector_strategy()) {
            prop_assert!(vector.magnitude() >= 0.0);
        }
    }
}

mod sets {
    use super::*;
    use scry::search::set::DocSet;

    fn keys_strategy() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[a-c]{1,3}", 0..6)
    }

    proptest! {
        #[test]
        fn sentinel_identities_hold(keys in keys_strategy()) {
            let set = DocSet::from_keys(keys);

            prop_assert_eq!(set.intersect(&DocSet::Complete), set.clone());
            prop_assert_eq!(DocSet::Complete.intersect(&set), set.clone());
            prop_assert_eq!(set.union(&DocSet::Empty), set.clone());
            prop_assert_eq!(DocSet::Empty.union(&set), set.clone());
            prop_assert_eq!(DocSet::Empty.intersect(&set), DocSet::Empty);
            prop_assert_eq!(DocSet::Complete.union(&set), DocSet::Complete);
        }

        #[test]
        fn membership_distributes_over_intersection(
            left in keys_strategy(),
            right in keys_strategy(),
            probe in "[a-c]{1,3}",
        ) {
            let a = DocSet::from_keys(left);
            let b = DocSet::from_keys(right);
            prop_assert_eq!(
                a.intersect(&b).contains(&probe),
                a.contains(&probe) && b.contains(&probe)
            );
        }
    }
}
