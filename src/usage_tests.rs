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

#[cfg(test)]
mod tests {

    use crate::io;
    use crate::model_store;
    use crate::recommend;
    use crate::{CollaborativeFiltering, ItemBasedCF, UserBasedCF};

    #[test]
    fn programmatic_usage() {

        /* Our input data comprises of ratings which users gave to items, one per line with tab
           separation. The identifiers used can be strings of arbitrary length and structure. */
        let data = "alice\tapple\t5\n\
                    alice\tdog\t3\n\
                    alice\tpony\t4\n\
                    bob\tapple\t4\n\
                    bob\tpony\t5\n\
                    bob\tbike\t2\n\
                    charles\tpony\t2\n\
                    charles\tbike\t5\n\
                    charles\tdog\t1\n";

        let ratings = io::load_from_reader(data.as_bytes()).unwrap();

        /* The user-based strategy needs the similarity of every user to every other user. The
           neighborhood of at most 2 users per item is chosen when predicting. */
        let user_based = UserBasedCF::new(ratings.clone(), 2).unwrap().with_pool_size(2);
        user_based.statistics().report(user_based.title());
        let user_model = user_based.build_model();

        /* The item-based strategy only keeps the 2 most similar items per item. */
        let item_based = ItemBasedCF::new(ratings.clone(), 2).unwrap().with_pool_size(2);
        let item_model = item_based.build_model();

        /* Models can be stored and restored, e.g. to recommend without rebuilding them. */
        let mut bytes: Vec<u8> = Vec::new();
        model_store::save(&item_model, &mut bytes).unwrap();
        let restored_item_model = model_store::load(bytes.as_slice()).unwrap();

        for (cf, model) in [
            (&user_based as &dyn CollaborativeFiltering, &user_model),
            (&item_based as &dyn CollaborativeFiltering, &restored_item_model),
        ].iter() {

            let recommendations = recommend::recommend_all(*cf, model, 3, 2).unwrap();

            assert_eq!(recommendations.len(), 3);

            for user_recommendations in recommendations.iter() {
                let user_ratings = &ratings[&user_recommendations.for_user];

                /* Everybody rated 3 out of 4 items, so there is exactly one candidate */
                assert_eq!(user_recommendations.recommended_items.len(), 1);

                for recommended in user_recommendations.recommended_items.iter() {
                    assert!(!user_ratings.contains_key(&recommended.item));
                }
            }
        }

        assert_eq!(
            item_based.recommend(&item_model, "alice", 3).unwrap(),
            item_based.recommend(&restored_item_model, "alice", 3).unwrap()
        );
    }
}
