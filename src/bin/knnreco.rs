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

use std::env;
use std::error::Error;
use std::process;

use getopts::{Matches, Options};
use tracing::info;
use tracing_subscriber::EnvFilter;

use knnreco::config::{Settings, Strategy};
use knnreco::io;
use knnreco::model_store;
use knnreco::recommend;
use knnreco::similarity::Measure;

fn main() {

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("i", "inputfile", "Input file name (required). The input consists of ratings \
        which users gave to items. The input file must contain a user, an item and a numeric \
        rating per line, separated by tabs.", "PATH");
    opts.optopt("o", "outputfile", "Output file name (optional, output will be written to stdout \
        by default).", "PATH");
    opts.optopt("s", "strategy", "Collaborative filtering strategy, 'user' or 'item' (optional, \
        defaults to user).", "STRATEGY");
    opts.optopt("m", "similarity", "Similarity measure, 'pearson' or 'cosine' (optional, defaults \
        to pearson for user-based and cosine for item-based).", "MEASURE");
    opts.optopt("n", "num-neighbors", "Number of nearest neighbors to use (optional, defaults to \
        50 for user-based and 20 for item-based).", "NUMBER");
    opts.optopt("k", "num-recommendations", "Number of items to recommend per user (optional, \
        defaults to 10).", "NUMBER");
    opts.optopt("u", "user", "Only recommend for this user (optional, recommends for all users \
        by default).", "USER");
    opts.optopt("d", "dump-model", "Write the built model to this file (optional).", "PATH");
    opts.optopt("l", "load-model", "Use the model stored in this file instead of building one, \
        falls back to building if it cannot be read (optional).", "PATH");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        return print_usage_and_exit(&program, opts, None);
    }

    let ratings_path = match matches.opt_str("i") {
        Some(path) => path,
        None => return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify an inputfile via --inputfile."),
        ),
    };

    let settings = match settings_from(&matches) {
        Ok(settings) => settings,
        Err(hint) => return print_usage_and_exit(&program, opts, Some(&hint)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let user = matches.opt_str("u");
    let output_path = matches.opt_str("o");

    if let Err(failure) = compute_recommendations(&ratings_path, &settings, user, output_path) {
        eprintln!("{}", failure);
        process::exit(1);
    }
}

fn settings_from(matches: &Matches) -> Result<Settings, String> {

    let strategy: Strategy = match matches.opt_str("s") {
        Some(name) => name.parse()?,
        None => Strategy::UserBased,
    };

    let mut settings = Settings::for_strategy(strategy);

    if let Some(name) = matches.opt_str("m") {
        settings.measure = name.parse::<Measure>()?;
    }

    settings.num_neighbors = matches.opt_get_default("n", settings.num_neighbors)
        .map_err(|failure| format!("Problem with option 'n': {}", failure))?;

    settings.num_recommendations = matches.opt_get_default("k", settings.num_recommendations)
        .map_err(|failure| format!("Problem with option 'k': {}", failure))?;

    settings.dump_model_path = matches.opt_str("d");
    settings.load_model_path = matches.opt_str("l");

    Ok(settings)
}

fn print_usage_and_exit(
    program: &str,
    opts: Options,
    hint: Option<&str>
) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));
    process::exit(2);
}

fn compute_recommendations(
    ratings_path: &str,
    settings: &Settings,
    user: Option<String>,
    output_path: Option<String>,
) -> Result<(), Box<dyn Error>> {

    let ratings = io::load_from_source(ratings_path)?;

    let cf = settings.collaborative_filtering(ratings)?;
    cf.statistics().report(cf.title());

    let loaded_model = match settings.load_model_path {
        Some(ref path) => model_store::load_from_path(path),
        None => None,
    };

    let model = match loaded_model {
        Some(model) => model,
        None => {
            info!(
                strategy = cf.title(),
                measure = %settings.measure,
                num_neighbors = settings.num_neighbors,
                "Building model"
            );

            let model = cf.build_model();

            if let Some(ref path) = settings.dump_model_path {
                model_store::save_to_path(&model, path)?;
            }

            model
        },
    };

    let recommendations = match user {
        Some(ref user) => recommend::recommend_users(
            cf.as_ref(),
            &model,
            &[user.as_str()],
            settings.num_recommendations,
            settings.pool_size,
        )?,
        None => recommend::recommend_all(
            cf.as_ref(),
            &model,
            settings.num_recommendations,
            settings.pool_size,
        )?,
    };

    info!(num_users = recommendations.len(), "Writing recommendations");
    io::write_recommendations(&recommendations, output_path)?;

    Ok(())
}
