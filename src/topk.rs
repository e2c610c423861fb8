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

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde_derive::Serialize;

/// An entity (item or neighbor) together with its score. Used to find the top-k neighbors per
/// anchor and the top-n recommendations per user via a binary heap.
#[derive(Clone, Debug, Serialize)]
pub struct ScoredItem {
    pub item: String,
    pub score: f64,
}

impl ScoredItem {
    pub fn new(item: &str, score: f64) -> Self {
        ScoredItem { item: item.to_string(), score }
    }
}

/// Ordering for our max-heap, note that we must use a special implementation here as there is no
/// total order on floating point numbers. Higher scores come first, NaN scores come last, equal
/// scores are ordered by identifier so that the output never depends on hash map iteration order.
fn cmp_reverse(scored_item_a: &ScoredItem, scored_item_b: &ScoredItem) -> Ordering {
    let by_score = match scored_item_a.score.partial_cmp(&scored_item_b.score) {
        Some(ordering) => ordering.reverse(),
        None => scored_item_a.score.is_nan().cmp(&scored_item_b.score.is_nan()),
    };

    by_score.then_with(|| scored_item_a.item.cmp(&scored_item_b.item))
}

impl PartialEq for ScoredItem {
    fn eq(&self, other: &Self) -> bool {
        cmp_reverse(self, other) == Ordering::Equal
    }
}

impl Eq for ScoredItem {}

impl Ord for ScoredItem {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_reverse(self, other)
    }
}

impl PartialOrd for ScoredItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(cmp_reverse(self, other))
    }
}

/// Selects the `k` best scored items, best first. The heap holds the worst retained item on top,
/// so every candidate costs at most one comparison and one O(log k) replacement.
pub fn top_k<I>(scored_items: I, k: usize) -> Vec<ScoredItem>
    where I: IntoIterator<Item=ScoredItem> {

    if k == 0 {
        return Vec::new();
    }

    let mut heap: BinaryHeap<ScoredItem> = BinaryHeap::with_capacity(k);

    for scored_item in scored_items {
        if heap.len() < k {
            heap.push(scored_item);
        } else if let Some(mut top) = heap.peek_mut() {
            if scored_item < *top {
                *top = scored_item;
            }
        }
    }

    heap.into_sorted_vec()
}

/// Sorts all items, best first.
pub fn rank(mut scored_items: Vec<ScoredItem>) -> Vec<ScoredItem> {
    scored_items.sort();
    scored_items
}
