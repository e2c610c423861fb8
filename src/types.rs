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

use fnv::FnvHashMap;

/// Ratings of a single entity, keyed by the counterpart it rated (or was rated by). A missing
/// key means "unrated", never an implicit zero.
pub type RatingVector = FnvHashMap<String, f64>;

/// Sparse rating matrix: entity -> counterpart -> rating. Used both user-major and item-major.
pub type RatingMatrix = FnvHashMap<String, RatingVector>;

/// Neighbors of a single anchor entity and their weights.
pub type NeighborRow = FnvHashMap<String, f64>;

/// Precomputed neighborhoods: anchor -> neighbor -> weight. Never contains self-references.
pub type NeighborModel = FnvHashMap<String, NeighborRow>;

pub fn new_rating_matrix(num_rows: usize) -> RatingMatrix {
    FnvHashMap::with_capacity_and_hasher(num_rows, Default::default())
}

pub fn new_neighbor_row(capacity: usize) -> NeighborRow {
    FnvHashMap::with_capacity_and_hasher(capacity, Default::default())
}

pub fn new_neighbor_model(num_anchors: usize) -> NeighborModel {
    FnvHashMap::with_capacity_and_hasher(num_anchors, Default::default())
}
