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

//! Neighborhood-based collaborative filtering. Builds a user-based or an item-based neighbor
//! model from explicit ratings and computes top-n recommendations from it.

pub mod config;
pub mod error;
pub mod io;
pub mod item_based;
pub mod model_store;
pub mod recommend;
pub mod similarity;
pub mod stats;
pub mod topk;
pub mod types;
pub mod user_based;
pub mod utils;

mod usage_tests;

pub use crate::error::CfError;
pub use crate::item_based::ItemBasedCF;
pub use crate::recommend::CollaborativeFiltering;
pub use crate::similarity::{Cosine, Measure, Pearson, SimilarityMeasure};
pub use crate::topk::ScoredItem;
pub use crate::types::{NeighborModel, RatingMatrix};
pub use crate::user_based::UserBasedCF;
