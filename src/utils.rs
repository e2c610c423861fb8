use std::time::Duration;

use fnv::FnvHashMap;

use crate::types;
use crate::types::{RatingMatrix, RatingVector};

pub fn to_millis(duration: Duration) -> u64 {
    (duration.as_secs() * 1_000) + (duration.subsec_nanos() / 1_000_000) as u64
}

/// scoped_pool needs at least one worker thread
pub fn pool_size_or_default(pool_size: usize) -> usize {
    if pool_size == 0 { 1 } else { pool_size }
}

/// Swaps the roles of entities and counterparts, e.g. turns user -> item -> rating into
/// item -> user -> rating. The set of (row, column, rating) triples stays the same.
pub fn transpose(matrix: &RatingMatrix) -> RatingMatrix {

    let mut transposed = types::new_rating_matrix(matrix.len());

    for (row, ratings) in matrix.iter() {
        for (column, rating) in ratings.iter() {
            transposed
                .entry(column.clone())
                .or_insert_with(|| FnvHashMap::with_capacity_and_hasher(10, Default::default()))
                .insert(row.clone(), *rating);
        }
    }

    transposed
}

/// Mean of all ratings in the vector, 0.0 for an empty vector.
pub fn mean_rating(ratings: &RatingVector) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }

    ratings.values().sum::<f64>() / ratings.len() as f64
}


#[cfg(test)]
mod tests {

    use crate::types;
    use crate::utils;

    fn matrix(triples: &[(&str, &str, f64)]) -> types::RatingMatrix {
        let mut matrix = types::new_rating_matrix(triples.len());
        for &(row, column, rating) in triples {
            matrix.entry(row.to_string())
                .or_insert_with(Default::default)
                .insert(column.to_string(), rating);
        }
        matrix
    }

    #[test]
    fn transpose_swaps_roles() {
        let ratings = matrix(&[
            ("alice", "apple", 5.0),
            ("alice", "pony", 3.0),
            ("bob", "apple", 1.0),
        ]);

        let transposed = utils::transpose(&ratings);

        assert_eq!(transposed.len(), 2);
        assert_eq!(transposed["apple"].len(), 2);
        assert_eq!(transposed["apple"]["alice"], 5.0);
        assert_eq!(transposed["apple"]["bob"], 1.0);
        assert_eq!(transposed["pony"]["alice"], 3.0);
    }

    #[test]
    fn transpose_twice_restores_content() {
        let ratings = matrix(&[
            ("a", "x", 1.0),
            ("a", "y", 2.0),
            ("b", "y", 3.0),
            ("c", "z", 4.5),
        ]);

        assert_eq!(utils::transpose(&utils::transpose(&ratings)), ratings);
    }

    #[test]
    fn mean_of_empty_vector_is_zero() {
        assert_eq!(utils::mean_rating(&Default::default()), 0.0);

        let ratings = matrix(&[("a", "x", 1.0), ("a", "y", 4.0)]);
        assert_eq!(utils::mean_rating(&ratings["a"]), 2.5);
    }

    #[test]
    fn pool_size_never_zero() {
        assert_eq!(utils::pool_size_or_default(0), 1);
        assert_eq!(utils::pool_size_or_default(8), 8);
    }
}
