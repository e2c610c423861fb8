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

use crate::error::CfError;
use crate::item_based;
use crate::item_based::ItemBasedCF;
use crate::recommend::CollaborativeFiltering;
use crate::similarity::Measure;
use crate::types::RatingMatrix;
use crate::user_based;
use crate::user_based::UserBasedCF;

pub const DEFAULT_NUM_RECOMMENDATIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    UserBased,
    ItemBased,
}

impl Strategy {

    pub fn title(&self) -> &'static str {
        match *self {
            Strategy::UserBased => "ubcf",
            Strategy::ItemBased => "ibcf",
        }
    }

    pub fn default_num_neighbors(&self) -> usize {
        match *self {
            Strategy::UserBased => user_based::DEFAULT_NUM_NEIGHBORS,
            Strategy::ItemBased => item_based::DEFAULT_NUM_NEIGHBORS,
        }
    }

    pub fn default_measure(&self) -> Measure {
        match *self {
            Strategy::UserBased => Measure::Pearson,
            Strategy::ItemBased => Measure::Cosine,
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_lowercase().as_str() {
            "user" | "ubcf" => Ok(Strategy::UserBased),
            "item" | "ibcf" => Ok(Strategy::ItemBased),
            _ => Err(format!("Unknown strategy '{}', expected user or item", name)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Everything needed for a run: which strategy to use with which parameters, and where models
/// are dumped to or loaded from.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub strategy: Strategy,
    pub measure: Measure,
    pub num_neighbors: usize,
    pub num_recommendations: usize,
    pub pool_size: usize,
    pub dump_model_path: Option<String>,
    pub load_model_path: Option<String>,
}

impl Settings {

    /// Defaults for the strategy: Pearson and 50 neighbors for user-based, cosine and 20 neighbors
    /// for item-based, 10 recommendations and one worker per CPU.
    pub fn for_strategy(strategy: Strategy) -> Self {
        Settings {
            strategy,
            measure: strategy.default_measure(),
            num_neighbors: strategy.default_num_neighbors(),
            num_recommendations: DEFAULT_NUM_RECOMMENDATIONS,
            pool_size: num_cpus::get(),
            dump_model_path: None,
            load_model_path: None,
        }
    }

    /// Sets up the configured strategy on user -> item -> rating data.
    pub fn collaborative_filtering(
        &self,
        ratings: RatingMatrix,
    ) -> Result<Box<dyn CollaborativeFiltering>, CfError> {

        let cf: Box<dyn CollaborativeFiltering> = match self.strategy {
            Strategy::UserBased => Box::new(
                UserBasedCF::with_measure(ratings, self.measure, self.num_neighbors)?
                    .with_pool_size(self.pool_size)
            ),
            Strategy::ItemBased => Box::new(
                ItemBasedCF::with_measure(ratings, self.measure, self.num_neighbors)?
                    .with_pool_size(self.pool_size)
            ),
        };

        Ok(cf)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::for_strategy(Strategy::UserBased)
    }
}
