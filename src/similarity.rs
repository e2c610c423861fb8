/**
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

use std::fmt;
use std::str::FromStr;

use crate::types::RatingVector;

/// A symmetric similarity score between two sparse rating vectors. Implementations must be pure
/// and defined for every pair of vectors, including vectors without any common key.
pub trait SimilarityMeasure: Sync {
    fn similarity(&self, ratings_a: &RatingVector, ratings_b: &RatingVector) -> f64;
}

/// Pearson correlation over the co-rated keys. Returns 0.0 for fewer than two co-rated keys and
/// when either side has zero variance on them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pearson;

/// Cosine similarity over the co-rated keys. Returns 0.0 without co-rated keys and when either
/// side has a zero norm on them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cosine;

/// Runtime choice of a similarity measure, e.g. from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Pearson,
    Cosine,
}

/// Pairs of ratings on the keys both vectors contain. Sorted by key, so that the floating point
/// sums below are accumulated in the same order for (a, b) and (b, a).
fn co_rated(ratings_a: &RatingVector, ratings_b: &RatingVector) -> Vec<(f64, f64)> {

    let (smaller, larger, swapped) = if ratings_a.len() <= ratings_b.len() {
        (ratings_a, ratings_b, false)
    } else {
        (ratings_b, ratings_a, true)
    };

    let mut pairs: Vec<(&String, f64, f64)> = smaller.iter()
        .filter_map(|(key, rating)| {
            larger.get(key).map(|other_rating| {
                if swapped {
                    (key, *other_rating, *rating)
                } else {
                    (key, *rating, *other_rating)
                }
            })
        })
        .collect();

    pairs.sort_by(|pair_a, pair_b| pair_a.0.cmp(pair_b.0));

    pairs.into_iter()
        .map(|(_, rating_a, rating_b)| (rating_a, rating_b))
        .collect()
}

/// Sums over ratings close to `f64::MAX` overflow, the resulting NaN or infinity counts as 0.0.
fn finite_or_zero(similarity: f64) -> f64 {
    if similarity.is_finite() { similarity } else { 0.0 }
}

impl SimilarityMeasure for Pearson {

    fn similarity(&self, ratings_a: &RatingVector, ratings_b: &RatingVector) -> f64 {

        let pairs = co_rated(ratings_a, ratings_b);

        if pairs.len() < 2 {
            return 0.0;
        }

        let n = pairs.len() as f64;
        let mean_a = pairs.iter().map(|&(rating_a, _)| rating_a).sum::<f64>() / n;
        let mean_b = pairs.iter().map(|&(_, rating_b)| rating_b).sum::<f64>() / n;

        let mut covariance = 0.0;
        let mut variance_a = 0.0;
        let mut variance_b = 0.0;

        for &(rating_a, rating_b) in pairs.iter() {
            let deviation_a = rating_a - mean_a;
            let deviation_b = rating_b - mean_b;

            covariance += deviation_a * deviation_b;
            variance_a += deviation_a * deviation_a;
            variance_b += deviation_b * deviation_b;
        }

        if variance_a == 0.0 || variance_b == 0.0 {
            return 0.0;
        }

        finite_or_zero(covariance / (variance_a * variance_b).sqrt())
    }
}

impl SimilarityMeasure for Cosine {

    fn similarity(&self, ratings_a: &RatingVector, ratings_b: &RatingVector) -> f64 {

        let pairs = co_rated(ratings_a, ratings_b);

        let mut dot_product = 0.0;
        let mut squared_norm_a = 0.0;
        let mut squared_norm_b = 0.0;

        for &(rating_a, rating_b) in pairs.iter() {
            dot_product += rating_a * rating_b;
            squared_norm_a += rating_a * rating_a;
            squared_norm_b += rating_b * rating_b;
        }

        if squared_norm_a == 0.0 || squared_norm_b == 0.0 {
            return 0.0;
        }

        finite_or_zero(dot_product / (squared_norm_a.sqrt() * squared_norm_b.sqrt()))
    }
}

impl SimilarityMeasure for Measure {

    fn similarity(&self, ratings_a: &RatingVector, ratings_b: &RatingVector) -> f64 {
        match *self {
            Measure::Pearson => Pearson.similarity(ratings_a, ratings_b),
            Measure::Cosine => Cosine.similarity(ratings_a, ratings_b),
        }
    }
}

impl FromStr for Measure {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_lowercase().as_str() {
            "pearson" => Ok(Measure::Pearson),
            "cosine" => Ok(Measure::Cosine),
            _ => Err(format!("Unknown similarity measure '{}', expected pearson or cosine", name)),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Measure::Pearson => write!(f, "pearson"),
            Measure::Cosine => write!(f, "cosine"),
        }
    }
}
