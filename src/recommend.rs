use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use scoped_pool::Pool;
use serde_derive::Serialize;
use tracing::info;

use crate::error::CfError;
use crate::item_based::ItemBasedCF;
use crate::similarity::SimilarityMeasure;
use crate::stats::DataStatistics;
use crate::topk::ScoredItem;
use crate::types::{NeighborModel, RatingMatrix};
use crate::user_based::UserBasedCF;
use crate::utils;

/// Contract shared by the user-based and the item-based strategy: build a neighbor model once,
/// then compute top-n recommendations per user from it.
pub trait CollaborativeFiltering: Sync {

    /// Short name of the strategy, used in logs.
    fn title(&self) -> &'static str;

    /// Ratings in user -> item -> rating orientation.
    fn ratings_by_user(&self) -> &RatingMatrix;

    /// Statistics of the matrix the model is built from, so users are the primary entities for
    /// the user-based strategy and items for the item-based one.
    fn statistics(&self) -> DataStatistics;

    fn build_model(&self) -> NeighborModel;

    fn recommend(
        &self,
        model: &NeighborModel,
        user: &str,
        top_n: usize,
    ) -> Result<Vec<ScoredItem>, CfError>;
}

impl<S: SimilarityMeasure> CollaborativeFiltering for UserBasedCF<S> {

    fn title(&self) -> &'static str {
        "ubcf"
    }

    fn ratings_by_user(&self) -> &RatingMatrix {
        self.ratings()
    }

    fn statistics(&self) -> DataStatistics {
        DataStatistics::of(self.ratings())
    }

    fn build_model(&self) -> NeighborModel {
        UserBasedCF::build_model(self)
    }

    fn recommend(
        &self,
        model: &NeighborModel,
        user: &str,
        top_n: usize,
    ) -> Result<Vec<ScoredItem>, CfError> {
        UserBasedCF::recommend(self, model, user, top_n)
    }
}

impl<S: SimilarityMeasure> CollaborativeFiltering for ItemBasedCF<S> {

    fn title(&self) -> &'static str {
        "ibcf"
    }

    fn ratings_by_user(&self) -> &RatingMatrix {
        ItemBasedCF::ratings_by_user(self)
    }

    fn statistics(&self) -> DataStatistics {
        DataStatistics::of(self.ratings_by_item())
    }

    fn build_model(&self) -> NeighborModel {
        ItemBasedCF::build_model(self)
    }

    fn recommend(
        &self,
        model: &NeighborModel,
        user: &str,
        top_n: usize,
    ) -> Result<Vec<ScoredItem>, CfError> {
        ItemBasedCF::recommend(self, model, user, top_n)
    }
}

/// Recommendations for a single user. Field names will be used in JSON.
#[derive(Debug, Serialize)]
pub struct UserRecommendations {
    pub for_user: String,
    pub recommended_items: Vec<ScoredItem>,
}

/// Computes recommendations for the given users in parallel. The result keeps the order of
/// `users`, the first failure (e.g. an unknown user) is returned instead.
pub fn recommend_users(
    cf: &dyn CollaborativeFiltering,
    model: &NeighborModel,
    users: &[&str],
    top_n: usize,
    pool_size: usize,
) -> Result<Vec<UserRecommendations>, CfError> {

    let batch_start = Instant::now();

    let results: Vec<Mutex<Option<Result<Vec<ScoredItem>, CfError>>>> = users.iter()
        .map(|_| Mutex::new(None))
        .collect();

    let pool = Pool::new(utils::pool_size_or_default(pool_size));

    pool.scoped(|scope| {
        for (user, result) in users.iter().zip(results.iter()) {
            scope.execute(move || {
                let recommended_items = cf.recommend(model, user, top_n);
                *result.lock().unwrap_or_else(PoisonError::into_inner) = Some(recommended_items);
            });
        }
    });

    pool.shutdown();

    let mut recommendations = Vec::with_capacity(users.len());

    for (user, result) in users.iter().zip(results.into_iter()) {
        let recommended_items = match result.into_inner().unwrap_or_else(PoisonError::into_inner) {
            Some(recommended_items) => recommended_items?,
            None => Vec::new(),
        };

        recommendations.push(UserRecommendations {
            for_user: user.to_string(),
            recommended_items,
        });
    }

    info!(
        strategy = cf.title(),
        num_users = users.len(),
        duration_ms = utils::to_millis(batch_start.elapsed()),
        "Computed recommendations"
    );

    Ok(recommendations)
}

/// Recommendations for every user with ratings, ordered by user identifier.
pub fn recommend_all(
    cf: &dyn CollaborativeFiltering,
    model: &NeighborModel,
    top_n: usize,
    pool_size: usize,
) -> Result<Vec<UserRecommendations>, CfError> {

    let mut users: Vec<&str> = cf.ratings_by_user().keys().map(|user| user.as_str()).collect();
    users.sort();

    recommend_users(cf, model, &users, top_n, pool_size)
}


#[cfg(test)]
mod tests {

    use crate::error::CfError;
    use crate::item_based::ItemBasedCF;
    use crate::recommend;
    use crate::recommend::CollaborativeFiltering;
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

    #[test]
    fn batch_matches_single_user_recommendations() {
        let strategies: Vec<Box<dyn CollaborativeFiltering>> = vec![
            Box::new(UserBasedCF::new(example_ratings(), 2).unwrap()),
            Box::new(ItemBasedCF::new(example_ratings(), 2).unwrap()),
        ];

        for cf in strategies.iter() {
            let model = cf.build_model();
            let batch = recommend::recommend_all(cf.as_ref(), &model, 2, 3).unwrap();

            let users: Vec<&str> = batch.iter().map(|r| r.for_user.as_str()).collect();
            assert_eq!(users, vec!["A", "B", "C"]);

            for user_recommendations in batch.iter() {
                let single = cf.recommend(&model, &user_recommendations.for_user, 2).unwrap();
                assert_eq!(single, user_recommendations.recommended_items);
            }
        }
    }

    #[test]
    fn statistics_follow_model_orientation() {
        let user_based = UserBasedCF::new(example_ratings(), 2).unwrap();
        let item_based = ItemBasedCF::new(example_ratings(), 2).unwrap();

        assert_eq!(user_based.title(), "ubcf");
        assert_eq!(item_based.title(), "ibcf");

        let stats = CollaborativeFiltering::statistics(&user_based);
        assert_eq!(stats.num_primary(), 3);
        assert_eq!(stats.num_counterparts(), 3);

        let extended = ratings(&[("A", "i1", 1.0), ("A", "i2", 1.0), ("B", "i3", 1.0)]);
        let item_based = ItemBasedCF::new(extended, 2).unwrap();
        let stats = CollaborativeFiltering::statistics(&item_based);
        assert_eq!(stats.num_primary(), 3);
        assert_eq!(stats.num_counterparts(), 2);
    }

    #[test]
    fn batch_fails_for_unknown_user() {
        let cf = UserBasedCF::new(example_ratings(), 2).unwrap();
        let model = CollaborativeFiltering::build_model(&cf);

        match recommend::recommend_users(&cf, &model, &["A", "Z"], 2, 2) {
            Err(CfError::UnknownUser { user, .. }) => assert_eq!(user, "Z"),
            _ => panic!("expected UnknownUser"),
        }
    }
}
