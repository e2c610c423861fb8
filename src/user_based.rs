/*
 * KnnReco
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

//! User-based collaborative filtering, following "An Algorithmic Framework for Performing
//! Collaborative Filtering" (Herlocker, Konstan, Borchers, Riedl, SIGIR 1999).

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use fnv::{FnvHashMap, FnvHashSet};
use scoped_pool::Pool;
use tracing::{debug, info};

use crate::error::CfError;
use crate::similarity::{Pearson, SimilarityMeasure};
use crate::topk;
use crate::topk::ScoredItem;
use crate::types;
use crate::types::{NeighborModel, NeighborRow, RatingMatrix, RatingVector};
use crate::utils;

pub const DEFAULT_NUM_NEIGHBORS: usize = 50;

/// Predicts ratings from the mean-centered ratings of the most similar users that rated an item.
/// The model holds the similarity of every user to every other user, the neighborhood for a
/// particular item is selected at prediction time.
pub struct UserBasedCF<S = Pearson> {
    ratings: RatingMatrix,
    items: FnvHashSet<String>,
    mean_ratings: FnvHashMap<String, f64>,
    measure: S,
    num_neighbors: usize,
    pool_size: usize,
}

impl UserBasedCF<Pearson> {

    pub fn new(ratings: RatingMatrix, num_neighbors: usize) -> Result<Self, CfError> {
        UserBasedCF::with_measure(ratings, Pearson, num_neighbors)
    }
}

impl<S: SimilarityMeasure> UserBasedCF<S> {

    /// Expects user -> item -> rating.
    pub fn with_measure(
        ratings: RatingMatrix,
        measure: S,
        num_neighbors: usize,
    ) -> Result<Self, CfError> {

        if ratings.is_empty() {
            return Err(CfError::EmptyRatings);
        }

        let items: FnvHashSet<String> = ratings.values()
            .flat_map(|user_ratings| user_ratings.keys().cloned())
            .collect();

        let mean_ratings: FnvHashMap<String, f64> = ratings.iter()
            .map(|(user, user_ratings)| (user.clone(), utils::mean_rating(user_ratings)))
            .collect();

        Ok(UserBasedCF {
            ratings,
            items,
            mean_ratings,
            measure,
            num_neighbors,
            pool_size: num_cpus::get(),
        })
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn ratings(&self) -> &RatingMatrix {
        &self.ratings
    }

    pub fn items(&self) -> &FnvHashSet<String> {
        &self.items
    }

    pub fn num_neighbors(&self) -> usize {
        self.num_neighbors
    }

    /// Computes the similarity between every ordered pair of distinct users. Rows are computed in
    /// parallel, each task only writes the row of its own user.
    pub fn build_model(&self) -> NeighborModel {

        let build_start = Instant::now();

        let users: Vec<&String> = self.ratings.keys().collect();
        let rows: Vec<Mutex<NeighborRow>> = users.iter()
            .map(|_| Mutex::new(types::new_neighbor_row(0)))
            .collect();

        let pool = Pool::new(utils::pool_size_or_default(self.pool_size));

        pool.scoped(|scope| {
            for (user, row) in users.iter().zip(rows.iter()) {
                scope.execute(move || self.compute_row(user, row));
            }
        });

        pool.shutdown();

        let model: NeighborModel = users.into_iter()
            .zip(rows.into_iter())
            .map(|(user, row)| {
                (user.clone(), row.into_inner().unwrap_or_else(PoisonError::into_inner))
            })
            .collect();

        info!(
            num_users = model.len(),
            duration_ms = utils::to_millis(build_start.elapsed()),
            "Built user-based model"
        );

        model
    }

    fn compute_row(&self, user: &str, row: &Mutex<NeighborRow>) {

        let user_ratings = &self.ratings[user];
        let mut similarities = types::new_neighbor_row(self.ratings.len());

        for (other, other_ratings) in self.ratings.iter() {
            if other != user {
                similarities.insert(other.clone(), self.measure.similarity(user_ratings, other_ratings));
            }
        }

        *row.lock().unwrap_or_else(PoisonError::into_inner) = similarities;
    }

    /// Predicted rating of `user` for `item`. Returns the actual rating for rated items.
    pub fn predict(&self, model: &NeighborModel, user: &str, item: &str) -> Result<f64, CfError> {

        let user_ratings = self.user_ratings("predict", user)?;

        if !self.items.contains(item) {
            return Err(CfError::unknown_item("predict", item));
        }

        if let Some(rating) = user_ratings.get(item) {
            return Ok(*rating);
        }

        let ranked_neighbors = rank_neighbors(model, "predict", user)?;

        Ok(self.predict_from_neighbors(user, &ranked_neighbors, item))
    }

    /// The `top_n` unrated items with the highest predicted ratings for `user`.
    pub fn recommend(
        &self,
        model: &NeighborModel,
        user: &str,
        top_n: usize,
    ) -> Result<Vec<ScoredItem>, CfError> {

        let user_ratings = self.user_ratings("recommend", user)?;
        let ranked_neighbors = rank_neighbors(model, "recommend", user)?;

        let candidates: Vec<ScoredItem> = self.items.iter()
            .filter(|item| !user_ratings.contains_key(*item))
            .map(|item| {
                let score = self.predict_from_neighbors(user, &ranked_neighbors, item);
                ScoredItem::new(item, score)
            })
            .collect();

        debug!(user, num_candidates = candidates.len(), "Scored candidates");

        Ok(topk::top_k(candidates, top_n))
    }

    fn user_ratings(&self, operation: &'static str, user: &str) -> Result<&RatingVector, CfError> {
        self.ratings.get(user).ok_or_else(|| CfError::unknown_user(operation, user))
    }

    /// Resnick's formula over the first `num_neighbors` users of the ranking which rated `item`.
    /// Without such neighbors (or if all of them have zero similarity) the prediction is 0.0.
    fn predict_from_neighbors(&self, user: &str, ranked_neighbors: &[ScoredItem], item: &str) -> f64 {

        let mut weighted_sum = 0.0;
        let mut normalizing_factor = 0.0;
        let mut num_selected = 0;

        for neighbor in ranked_neighbors.iter() {

            if num_selected == self.num_neighbors {
                break;
            }

            // Neighbors of a loaded model might have no ratings anymore
            let rating = match self.ratings.get(&neighbor.item).and_then(|r| r.get(item)) {
                Some(rating) => *rating,
                None => continue,
            };

            let mean_rating_of_neighbor = self.mean_ratings[&neighbor.item];

            weighted_sum += neighbor.score * (rating - mean_rating_of_neighbor);
            normalizing_factor += neighbor.score.abs();
            num_selected += 1;
        }

        if normalizing_factor == 0.0 {
            return 0.0;
        }

        self.mean_ratings[user] + (weighted_sum / normalizing_factor)
    }
}

/// The neighbors of `user`, most similar first.
fn rank_neighbors(
    model: &NeighborModel,
    operation: &'static str,
    user: &str,
) -> Result<Vec<ScoredItem>, CfError> {

    let row = model.get(user).ok_or_else(|| CfError::missing_from_model(operation, user))?;

    let neighbors = row.iter()
        .map(|(neighbor, similarity)| ScoredItem::new(neighbor, *similarity))
        .collect();

    Ok(topk::rank(neighbors))
}


#[cfg(test)]
mod tests {

    use crate::error::CfError;
    use crate::similarity::Cosine;
    use crate::types::RatingMatrix;
    use crate::user_based::UserBasedCF;

    fn ratings(triples: &[(&str, &str, f64)]) -> RatingMatrix {
        let mut matrix = RatingMatrix::default();
        for &(user, item, rating) in triples {
            matrix.entry(user.to_string())
                .or_insert_with(Default::default)
                .insert(item.to_string(), rating);
        }
        matrix
    }

    fn example_ratings() -> RatingMatrix {
        ratings(&[
            ("A", "i1", 5.0), ("A", "i2", 3.0),
            ("B", "i1", 4.0), ("B", "i2", 2.0), ("B", "i3", 5.0),
            ("C", "i2", 1.0), ("C", "i3", 4.0),
        ])
    }

    fn close_enough_to(value: f64, expected: f64) -> bool {
        (value - expected).abs() < 1e-9
    }

    #[test]
    fn empty_ratings_rejected() {
        match UserBasedCF::new(RatingMatrix::default(), 2) {
            Err(CfError::EmptyRatings) => {},
            _ => panic!("expected EmptyRatings"),
        }
    }

    #[test]
    fn model_is_complete_without_self_references() {
        let cf = UserBasedCF::new(example_ratings(), 2).unwrap().with_pool_size(2);
        let model = cf.build_model();

        assert_eq!(model.len(), 3);

        for (user, neighbors) in model.iter() {
            assert_eq!(neighbors.len(), 2);
            assert!(!neighbors.contains_key(user));
        }

        assert!(model["A"].contains_key("B"));
        assert!(model["A"].contains_key("C"));
        assert!(close_enough_to(model["A"]["B"], 1.0));
        assert_eq!(model["A"]["C"], 0.0);
        assert!(close_enough_to(model["B"]["C"], 1.0));
    }

    #[test]
    fn build_model_is_idempotent() {
        let cf = UserBasedCF::new(example_ratings(), 2).unwrap();
        assert_eq!(cf.build_model(), cf.build_model());
    }

    #[test]
    fn rated_items_pass_through() {
        let cf = UserBasedCF::new(example_ratings(), 2).unwrap();
        let model = cf.build_model();

        for (user, user_ratings) in example_ratings().iter() {
            for (item, rating) in user_ratings.iter() {
                assert_eq!(cf.predict(&model, user, item).unwrap(), *rating);
            }
        }
    }

    #[test]
    fn mean_centered_prediction() {
        let cf = UserBasedCF::new(example_ratings(), 2).unwrap();
        let model = cf.build_model();

        // mean(A) = 4, only B contributes weight: 1.0 * (5 - 11/3) / 1.0
        let prediction = cf.predict(&model, "A", "i3").unwrap();
        assert!(close_enough_to(prediction, 4.0 + 4.0 / 3.0));

        // mean(C) = 2.5, B contributes 1.0 * (4 - 11/3), A has zero similarity
        let prediction = cf.predict(&model, "C", "i1").unwrap();
        assert!(close_enough_to(prediction, 2.5 + 1.0 / 3.0));
    }

    #[test]
    fn recommend_unrated_item() {
        let cf = UserBasedCF::new(example_ratings(), 2).unwrap();
        let model = cf.build_model();

        let recommendations = cf.recommend(&model, "A", 1).unwrap();

        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].item, "i3");
        assert!(close_enough_to(recommendations[0].score, cf.predict(&model, "A", "i3").unwrap()));

        // Fewer candidates than requested
        assert_eq!(cf.recommend(&model, "A", 10).unwrap().len(), 1);
        assert_eq!(cf.recommend(&model, "C", 10).unwrap().len(), 1);
    }

    #[test]
    fn recommendations_sorted_and_exclude_rated_items() {
        let data = ratings(&[
            ("u1", "a", 5.0), ("u1", "b", 1.0),
            ("u2", "a", 4.0), ("u2", "b", 2.0), ("u2", "c", 5.0), ("u2", "d", 1.0),
            ("u3", "a", 5.0), ("u3", "b", 1.0), ("u3", "c", 4.0), ("u3", "e", 3.0),
            ("u4", "a", 1.0), ("u4", "b", 5.0), ("u4", "d", 5.0), ("u4", "e", 2.0),
        ]);

        let cf = UserBasedCF::new(data.clone(), 2).unwrap();
        let model = cf.build_model();

        for (user, user_ratings) in data.iter() {
            let recommendations = cf.recommend(&model, user, 2).unwrap();

            assert!(recommendations.len() <= 2);

            for recommended in recommendations.iter() {
                assert!(!user_ratings.contains_key(&recommended.item));
            }

            for pair in recommendations.windows(2) {
                assert!(pair[0].score >= pair[1].score);
            }
        }

        let recommendations = cf.recommend(&model, "u1", 3).unwrap();
        assert_eq!(recommendations.len(), 3);
    }

    #[test]
    fn zero_similarity_neighbors_predict_zero() {
        let mut data = example_ratings();
        data.entry("D".to_string()).or_insert_with(Default::default).insert("i4".to_string(), 3.0);

        let cf = UserBasedCF::new(data, 2).unwrap();
        let model = cf.build_model();

        // D is the only rater of i4 and shares no items with A
        assert_eq!(cf.predict(&model, "A", "i4").unwrap(), 0.0);
    }

    #[test]
    fn empty_neighborhood_predicts_zero() {
        let cf = UserBasedCF::new(example_ratings(), 2).unwrap();
        let mut model = cf.build_model();

        model.get_mut("A").unwrap().clear();

        assert_eq!(cf.predict(&model, "A", "i3").unwrap(), 0.0);
    }

    #[test]
    fn neighborhood_limited_to_k_raters() {
        let data = ratings(&[
            ("target", "x", 4.0), ("target", "y", 2.0),
            ("close", "x", 5.0), ("close", "y", 1.0), ("close", "z", 5.0),
            ("far", "x", 1.0), ("far", "y", 5.0), ("far", "z", 5.0),
        ]);

        let cf = UserBasedCF::new(data, 1).unwrap();
        let model = cf.build_model();

        // With K = 1 only "close" (similarity 1.0) is used, "far" (-1.0) is ignored
        let prediction = cf.predict(&model, "target", "z").unwrap();
        assert!(close_enough_to(prediction, 3.0 + (5.0 - 11.0 / 3.0)));
    }

    #[test]
    fn unknown_entities() {
        let cf = UserBasedCF::new(example_ratings(), 2).unwrap();
        let model = cf.build_model();

        match cf.recommend(&model, "nobody", 3) {
            Err(CfError::UnknownUser { operation, user }) => {
                assert_eq!(operation, "recommend");
                assert_eq!(user, "nobody");
            },
            _ => panic!("expected UnknownUser"),
        }

        match cf.predict(&model, "A", "nothing") {
            Err(CfError::UnknownItem { item, .. }) => assert_eq!(item, "nothing"),
            _ => panic!("expected UnknownItem"),
        }

        let mut stale_model = model.clone();
        stale_model.remove("A");

        match cf.recommend(&stale_model, "A", 3) {
            Err(CfError::MissingFromModel { entity, .. }) => assert_eq!(entity, "A"),
            _ => panic!("expected MissingFromModel"),
        }
    }

    #[test]
    fn pluggable_measure() {
        let cf = UserBasedCF::with_measure(example_ratings(), Cosine, 2).unwrap();
        let model = cf.build_model();

        // A and C co-rated i2 only, the cosine of two single ratings is 1.0
        assert!(close_enough_to(model["A"]["C"], 1.0));
    }
}
