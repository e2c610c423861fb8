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

use std::fs::File;
use std::io::prelude::*;
use std::io::{stdout, BufWriter};
use std::path::Path;

use fnv::FnvHashMap;
use tracing::{debug, info};

use crate::error::CfError;
use crate::recommend::UserRecommendations;
use crate::types;
use crate::types::RatingMatrix;

/// Reader for rating files. We expect NO headers, and a user, item and rating per line with tab
/// separation. Additional columns (e.g. timestamps) are ignored.
pub fn csv_reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(false)
        .delimiter(b'\t')
        .flexible(true);

    builder
}

/// Uses ratings which are already in memory, e.g. a `HashMap<String, HashMap<String, f64>>` from
/// user to item to rating.
pub fn load_from_mapping<M, V>(mapping: M) -> RatingMatrix
    where M: IntoIterator<Item=(String, V)>,
          V: IntoIterator<Item=(String, f64)> {

    let ratings: RatingMatrix = mapping.into_iter()
        .map(|(user, user_ratings)| (user, user_ratings.into_iter().collect()))
        .collect();

    info!(num_users = ratings.len(), "Loaded ratings from mapping");

    ratings
}

/// Parses the rating file at `path`.
pub fn load_from_source<P: AsRef<Path>>(path: P) -> Result<RatingMatrix, CfError> {

    info!(path = %path.as_ref().display(), "Reading ratings");

    let mut reader = csv_reader_builder().from_path(path)?;

    ratings_from_csv(&mut reader)
}

/// Parses ratings from any reader, see `load_from_source`.
pub fn load_from_reader<R: Read>(reader: R) -> Result<RatingMatrix, CfError> {
    let mut reader = csv_reader_builder().from_reader(reader);
    ratings_from_csv(&mut reader)
}

fn ratings_from_csv<R: Read>(reader: &mut csv::Reader<R>) -> Result<RatingMatrix, CfError> {

    let mut ratings = types::new_rating_matrix(100);
    let mut num_ratings: u64 = 0;

    for result in reader.records() {

        let record = result?;
        let line = record.position().map(|position| position.line()).unwrap_or(0);

        if record.len() < 3 {
            return Err(CfError::MalformedRecord { line, num_fields: record.len() });
        }

        let value = record[2].trim();
        let rating: f64 = match value.parse() {
            Ok(rating) if f64::is_finite(rating) => rating,
            _ => return Err(CfError::InvalidRating { line, value: value.to_string() }),
        };

        let previous = ratings
            .entry(record[0].to_string())
            .or_insert_with(|| FnvHashMap::with_capacity_and_hasher(10, Default::default()))
            .insert(record[1].to_string(), rating);

        if previous.is_some() {
            debug!(line, user = &record[0], item = &record[1], "Replaced duplicate rating");
        } else {
            num_ratings += 1;
        }
    }

    info!(num_users = ratings.len(), num_ratings, "Loaded ratings");

    Ok(ratings)
}

/// Output the computed recommendations in JSON format, one user per line. If an `output_path` is
/// supplied, we write to a file at the specified path, otherwise, we output to stdout.
pub fn write_recommendations(
    recommendations: &[UserRecommendations],
    output_path: Option<String>,
) -> Result<(), CfError> {

    let out: Box<dyn Write> = match output_path {
        Some(path) => Box::new(File::create(&Path::new(&path))?),
        _ => Box::new(stdout())
    };

    let mut out = BufWriter::new(out);

    for user_recommendations in recommendations.iter() {
        serde_json::to_writer(&mut out, user_recommendations)?;
        writeln!(out)?;
    }

    out.flush()?;

    Ok(())
}
