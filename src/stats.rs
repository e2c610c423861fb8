use fnv::FnvHashSet;
use tracing::info;

use crate::types::RatingMatrix;

/// Size of a rating matrix: distinct primary entities (rows), distinct counterparts (columns)
/// and the number of ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataStatistics {
    num_primary: usize,
    num_counterparts: usize,
    num_ratings: u64,
}

impl DataStatistics {

    pub fn of(matrix: &RatingMatrix) -> Self {

        let mut counterparts: FnvHashSet<&str> =
            FnvHashSet::with_capacity_and_hasher(matrix.len(), Default::default());

        let mut num_ratings: u64 = 0;

        for ratings in matrix.values() {
            for counterpart in ratings.keys() {
                counterparts.insert(counterpart);
            }
            num_ratings += ratings.len() as u64;
        }

        DataStatistics {
            num_primary: matrix.len(),
            num_counterparts: counterparts.len(),
            num_ratings,
        }
    }

    pub fn num_primary(&self) -> usize {
        self.num_primary
    }

    pub fn num_counterparts(&self) -> usize {
        self.num_counterparts
    }

    pub fn num_ratings(&self) -> u64 {
        self.num_ratings
    }

    pub fn report(&self, title: &str) {
        info!(
            strategy = title,
            num_primary = self.num_primary,
            num_counterparts = self.num_counterparts,
            num_ratings = self.num_ratings,
            "Data statistics"
        );
    }
}
