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

//! Persistence for neighbor models. A model is written as a versioned JSON document which lists
//! all anchors and one (anchor, neighbor, weight) entry per stored weight, both sorted:
//!
//! ```text
//! {"version":1,"num_anchors":2,"anchors":["a","b"],"num_entries":1,
//!  "entries":[{"anchor":"a","neighbor":"b","weight":1.0}]}
//! ```

use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde_derive::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::CfError;
use crate::types;
use crate::types::NeighborModel;

pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Struct used for JSON serialization of models. Field names will be used in JSON.
#[derive(Serialize, Deserialize)]
struct PersistedModel {
    version: u32,
    num_anchors: usize,
    anchors: Vec<String>,
    num_entries: usize,
    entries: Vec<Entry>,
}

#[derive(Serialize, Deserialize)]
struct Entry {
    anchor: String,
    neighbor: String,
    weight: f64,
}

pub fn save<W: Write>(model: &NeighborModel, writer: W) -> Result<(), CfError> {

    let mut anchors: Vec<String> = model.keys().cloned().collect();
    anchors.sort();

    let mut entries: Vec<Entry> = Vec::with_capacity(model.values().map(|row| row.len()).sum());

    for anchor in anchors.iter() {
        let mut neighbors: Vec<(&String, &f64)> = model[anchor].iter().collect();
        neighbors.sort_by(|a, b| a.0.cmp(b.0));

        for (neighbor, weight) in neighbors.into_iter() {
            entries.push(Entry {
                anchor: anchor.clone(),
                neighbor: neighbor.clone(),
                weight: *weight,
            });
        }
    }

    let persisted = PersistedModel {
        version: MODEL_FORMAT_VERSION,
        num_anchors: anchors.len(),
        anchors,
        num_entries: entries.len(),
        entries,
    };

    serde_json::to_writer(writer, &persisted)?;

    Ok(())
}

pub fn save_to_path<P: AsRef<Path>>(model: &NeighborModel, path: P) -> Result<(), CfError> {

    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    save(model, &mut writer)?;
    writer.flush()?;

    info!(path = %path.as_ref().display(), num_anchors = model.len(), "Dumped model");

    Ok(())
}

/// Reads a model, `None` if it cannot be read or is not a valid model. Failures are logged but
/// never returned.
pub fn load<R: Read>(reader: R) -> Option<NeighborModel> {
    match read_model(reader) {
        Ok(model) => Some(model),
        Err(failure) => {
            warn!(error = %failure, "Failed to load model");
            None
        },
    }
}

pub fn load_from_path<P: AsRef<Path>>(path: P) -> Option<NeighborModel> {

    info!(path = %path.as_ref().display(), "Loading external model");

    match File::open(path.as_ref()) {
        Ok(file) => load(BufReader::new(file)),
        Err(failure) => {
            warn!(path = %path.as_ref().display(), error = %failure, "Failed to load model");
            None
        },
    }
}

fn read_model<R: Read>(reader: R) -> Result<NeighborModel, CfError> {

    let document: serde_json::Value = serde_json::from_reader(reader)?;

    let version = document.get("version")
        .and_then(|version| version.as_u64())
        .ok_or_else(|| CfError::CorruptModel("no version".to_string()))?;

    if version != MODEL_FORMAT_VERSION as u64 {
        return Err(CfError::UnsupportedModelVersion(version as u32));
    }

    let persisted: PersistedModel = serde_json::from_value(document)?;

    if persisted.num_anchors != persisted.anchors.len() {
        return Err(CfError::CorruptModel(format!(
            "expected {} anchors, found {}", persisted.num_anchors, persisted.anchors.len())));
    }

    if persisted.num_entries != persisted.entries.len() {
        return Err(CfError::CorruptModel(format!(
            "expected {} entries, found {}", persisted.num_entries, persisted.entries.len())));
    }

    let mut model = types::new_neighbor_model(persisted.num_anchors);

    for anchor in persisted.anchors.into_iter() {
        if model.contains_key(&anchor) {
            return Err(CfError::CorruptModel(format!("duplicate anchor '{}'", anchor)));
        }
        model.insert(anchor, types::new_neighbor_row(0));
    }

    for entry in persisted.entries.into_iter() {

        if entry.anchor == entry.neighbor {
            return Err(CfError::CorruptModel(format!("'{}' is its own neighbor", entry.anchor)));
        }

        let row = model.get_mut(&entry.anchor).ok_or_else(|| {
            CfError::CorruptModel(format!("entry for undeclared anchor '{}'", entry.anchor))
        })?;

        if row.insert(entry.neighbor, entry.weight).is_some() {
            return Err(CfError::CorruptModel(format!("duplicate entry for '{}'", entry.anchor)));
        }
    }

    Ok(model)
}
