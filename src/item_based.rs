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

//! Item-based top-N recommendation, following "Item-based Top-N Recommendation Algorithms"
//! (Deshpande, Karypis, TOIS 2004).

use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use fnv::FnvHashMap;
use scoped_pool::Pool;
use tracing::{debug, info};

use crate::error::CfError;
use crate::similarity::{Cosine, SimilarityMeasure};
use crate::topk;
use crate::topk::ScoredItem;
use crate::types;
use crate::types::{NeighborModel, NeighborRow, RatingMatrix, RatingVector};
use crate::utils;

pub const DEFAULT_NUM_NEIGHBORS: usize = 20;

/// Scores items by the weighted sum of the user's ratings on similar items. The model keeps the
/// `num_neighbors` most similar items per item, with weights normalized to sum to one.
pub struct ItemBasedCF<S = Cosine> {
    ratings_by_user: RatingMatrix,
    ratings_by_item: RatingMatrix,
    measure: S,
    num_neighbors: usize,
    pool_size: usize,
}

impl ItemBasedCF<Cosine> {

    pub fn new(ratings_by_user: RatingMatrix, num_neighbors: usize) -> Result<Self, CfError> {
        ItemBasedCF::with_measure(ratings_by_user, Cosine, num_neighbors)
    }
}

impl<S: SimilarityMeasure> ItemBasedCF<S> {

    /// Expects user -> item -> rating, the item-major view is derived from it.
    pub fn with_measure(
        ratings_by_user: RatingMatrix,
        measure: S,
        num_neighbors: usize,
    ) -> Result<Self, CfError> {

        let ratings_by_item = utils::transpose(&ratings_by_user);

        if ratings_by_item.is_empty() {
            return Err(CfError::EmptyRatings);
        }

        Ok(ItemBasedCF {
            ratings_by_user,
            ratings_by_item,
            measure,
            num_neighbors,
            pool_size: num_cpus::get(),
        })
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn ratings_by_user(&self) -> &RatingMatrix {
        &self.ratings_by_user
    }

    pub fn ratings_by_item(&self) -> &RatingMatrix {
        &self.ratings_by_item
    }

    pub fn num_neighbors(&self) -> usize {
        self.num_neighbors
    }

    /// Computes the `num_neighbors` most similar items for every item and row-normalizes their
    /// weights. Negative similarities compete for a slot like any other; a row whose kept
    /// similarities do not sum to a positive value cannot be normalized and is left empty.
    pub fn build_model(&self) -> NeighborModel {

        let build_start = Instant::now();

        let items: Vec<&String> = self.ratings_by_item.keys().collect();
        let rows: Vec<Mutex<NeighborRow>> = items.iter()
            .map(|_| Mutex::new(types::new_neighbor_row(0)))
            .collect();

        let pool = Pool::new(utils::pool_size_or_default(self.pool_size));

        pool.scoped(|scope| {
            for (item, row) in items.iter().zip(rows.iter()) {
                scope.execute(move || self.compute_row(item, row));
            }
        });

        pool.shutdown();

        let model: NeighborModel = items.into_iter()
            .zip(rows.into_iter())
            .map(|(item, row)| {
                (item.clone(), row.into_inner().unwrap_or_else(PoisonError::into_inner))
            })
            .collect();

        info!(
            num_items = model.len(),
            num_neighbors = self.num_neighbors,
            duration_ms = utils::to_millis(build_start.elapsed()),
            "Built item-based model"
        );

        model
    }

    fn compute_row(&self, item: &str, row: &Mutex<NeighborRow>) {

        let item_ratings = &self.ratings_by_item[item];

        let candidates = self.ratings_by_item.iter()
            .filter(|(other, _)| other.as_str() != item)
            .map(|(other, other_ratings)| {
                ScoredItem::new(other, self.measure.similarity(item_ratings, other_ratings))
            });

        let most_similar_items = topk::top_k(candidates, self.num_neighbors);

        let row_sum: f64 = most_similar_items.iter()
            .map(|scored_item| scored_item.score)
            .sum();

        let mut neighbors = types::new_neighbor_row(most_similar_items.len());

        if row_sum > 0.0 {
            for scored_item in most_similar_items.into_iter() {
                neighbors.insert(scored_item.item, scored_item.score / row_sum);
            }
        }

        *row.lock().unwrap_or_else(PoisonError::into_inner) = neighbors;
    }

    /// Score of `candidate` for `user`, `None` if the user already rated it.
    pub fn predict(
        &self,
        model: &NeighborModel,
        user: &str,
        candidate: &str,
    ) -> Result<Option<f64>, CfError> {

        let user_ratings = self.user_ratings("predict", user)?;

        if !self.ratings_by_item.contains_key(candidate) {
            return Err(CfError::unknown_item("predict", candidate));
        }

        if user_ratings.contains_key(candidate) {
            return Ok(None);
        }

        let mut score = 0.0;

        for (item, rating) in user_ratings.iter() {
            let neighbors = neighbors_of(model, "predict", item)?;
            if let Some(weight) = neighbors.get(candidate) {
                score += weight * rating;
            }
        }

        Ok(Some(score))
    }

    /// The `top_n` unrated items with the highest scores for `user`. Items without any path from
    /// the user's rated items score 0.0 and still take part in the ranking.
    pub fn recommend(
        &self,
        model: &NeighborModel,
        user: &str,
        top_n: usize,
    ) -> Result<Vec<ScoredItem>, CfError> {

        let user_ratings = self.user_ratings("recommend", user)?;

        let mut scores: FnvHashMap<&str, f64> = self.ratings_by_item.keys()
            .filter(|item| !user_ratings.contains_key(*item))
            .map(|item| (item.as_str(), 0.0))
            .collect();

        for (item, rating) in user_ratings.iter() {
            for (other_item, weight) in neighbors_of(model, "recommend", item)?.iter() {
                if let Some(score) = scores.get_mut(other_item.as_str()) {
                    *score += weight * rating;
                }
            }
        }

        debug!(user, num_candidates = scores.len(), "Scored candidates");

        let candidates = scores.into_iter()
            .map(|(item, score)| ScoredItem::new(item, score));

        Ok(topk::top_k(candidates, top_n))
    }

    fn user_ratings(&self, operation: &'static str, user: &str) -> Result<&RatingVector, CfError> {
        self.ratings_by_user.get(user).ok_or_else(|| CfError::unknown_user(operation, user))
    }
}

fn neighbors_of<'a>(
    model: &'a NeighborModel,
    operation: &'static str,
    item: &str,
) -> Result<&'a NeighborRow, CfError> {
    model.get(item).ok_or_else(|| CfError::missing_from_model(operation, item))
}
