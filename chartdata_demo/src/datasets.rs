// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Embedded gallery datasets.
//!
//! Each dataset is bundled JSON, the same shape the gallery ships next to its chart components.
//! Dates are seconds since the Unix epoch.

use chartdata_core::Record;

/// Names accepted by `--dataset`.
pub(crate) const NAMES: [&str; 4] = ["costs", "movies", "penguins", "trials"];

const COSTS: &str = r#"[
  {"Year": 2005, "Type": "Hurricane", "Cost": 125.0},
  {"Year": 2005, "Type": "Drought", "Cost": 1.8},
  {"Year": 2005, "Type": "Flooding", "Cost": 3.2},
  {"Year": 2008, "Type": "Hurricane", "Cost": 38.6},
  {"Year": 2008, "Type": "Flooding", "Cost": 11.4},
  {"Year": 2008, "Type": "Severe Storm", "Cost": 6.1},
  {"Year": 2011, "Type": "Severe Storm", "Cost": 31.2},
  {"Year": 2011, "Type": "Drought", "Cost": 14.9},
  {"Year": 2011, "Type": "Wildfire", "Cost": null},
  {"Year": 2012, "Type": "Hurricane", "Cost": 70.2},
  {"Year": 2012, "Type": "Drought", "Cost": 34.5},
  {"Year": 2017, "Type": "Hurricane", "Cost": 294.8},
  {"Year": 2017, "Type": "Wildfire", "Cost": 18.7},
  {"Year": 2017, "Type": "Flooding", "Cost": 2.4}
]"#;

const MOVIES: &str = r#"[
  {"Title": "The Shawshank Redemption", "IMDB_Rating": 9.3, "Rotten_Tomatoes_Rating": 91, "Release_Date": 780278400},
  {"Title": "The Godfather", "IMDB_Rating": 9.2, "Rotten_Tomatoes_Rating": 97, "Release_Date": 70243200},
  {"Title": "The Dark Knight", "IMDB_Rating": 9.0, "Rotten_Tomatoes_Rating": 94, "Release_Date": 1216339200},
  {"Title": "Schindler's List", "IMDB_Rating": 8.9, "Rotten_Tomatoes_Rating": 97, "Release_Date": 755913600},
  {"Title": "The Return of the King", "IMDB_Rating": 8.9, "Rotten_Tomatoes_Rating": 93, "Release_Date": 1071619200},
  {"Title": "Pulp Fiction", "IMDB_Rating": 8.9, "Rotten_Tomatoes_Rating": 92, "Release_Date": 782092800},
  {"Title": "Inception", "IMDB_Rating": 8.8, "Rotten_Tomatoes_Rating": 87, "Release_Date": 1279238400},
  {"Title": "Fight Club", "IMDB_Rating": 8.8, "Rotten_Tomatoes_Rating": 79, "Release_Date": 939945600},
  {"Title": "The Fellowship of the Ring", "IMDB_Rating": 8.8, "Rotten_Tomatoes_Rating": 91, "Release_Date": 1008720000},
  {"Title": "Braveheart", "IMDB_Rating": 8.3, "Rotten_Tomatoes_Rating": 76, "Release_Date": 800841600},
  {"Title": "The Dark Knight Rises", "IMDB_Rating": 8.4, "Rotten_Tomatoes_Rating": 87, "Release_Date": 1342742400},
  {"Title": "The Truman Show", "IMDB_Rating": 8.1, "Rotten_Tomatoes_Rating": 95, "Release_Date": 897004800},
  {"Title": "Troy", "IMDB_Rating": 7.3, "Rotten_Tomatoes_Rating": 54, "Release_Date": 1083888000},
  {"Title": "2012", "IMDB_Rating": 5.8, "Rotten_Tomatoes_Rating": 39, "Release_Date": 1258070400},
  {"Title": "Rise of the Planet of the Apes", "IMDB_Rating": 7.6, "Rotten_Tomatoes_Rating": null, "Release_Date": 1312502400},
  {"Title": "Titanic", "IMDB_Rating": 7.9, "Rotten_Tomatoes_Rating": 88, "Release_Date": 882489600},
  {"Title": "Untitled Festival Cut", "IMDB_Rating": null, "Rotten_Tomatoes_Rating": 62, "Release_Date": null}
]"#;

const PENGUINS: &str = r#"[
  {"Species": "Adelie", "Island": "Torgersen", "Flipper Length (mm)": 181, "Body Mass (g)": 3750},
  {"Species": "Adelie", "Island": "Torgersen", "Flipper Length (mm)": 186, "Body Mass (g)": 3800},
  {"Species": "Adelie", "Island": "Biscoe", "Flipper Length (mm)": 195, "Body Mass (g)": 3250},
  {"Species": "Adelie", "Island": "Dream", "Flipper Length (mm)": 193, "Body Mass (g)": 3450},
  {"Species": "Adelie", "Island": "Dream", "Flipper Length (mm)": null, "Body Mass (g)": null},
  {"Species": "Chinstrap", "Island": "Dream", "Flipper Length (mm)": 192, "Body Mass (g)": 3500},
  {"Species": "Chinstrap", "Island": "Dream", "Flipper Length (mm)": 196, "Body Mass (g)": 3900},
  {"Species": "Chinstrap", "Island": "Dream", "Flipper Length (mm)": 193, "Body Mass (g)": 3650},
  {"Species": "Chinstrap", "Island": "Dream", "Flipper Length (mm)": 188, "Body Mass (g)": 3525},
  {"Species": "Gentoo", "Island": "Biscoe", "Flipper Length (mm)": 211, "Body Mass (g)": 4500},
  {"Species": "Gentoo", "Island": "Biscoe", "Flipper Length (mm)": 230, "Body Mass (g)": 5700},
  {"Species": "Gentoo", "Island": "Biscoe", "Flipper Length (mm)": 217, "Body Mass (g)": 4875},
  {"Species": "Gentoo", "Island": "Biscoe", "Flipper Length (mm)": 221, "Body Mass (g)": 5200},
  {"Species": "Gentoo", "Island": "Biscoe", "Flipper Length (mm)": 215, "Body Mass (g)": 5000}
]"#;

const TRIALS: &str = r#"[
  {"Trial A": -1.42, "Trial B": 2.61, "Trial C": 0.73},
  {"Trial A": -0.35, "Trial B": 3.38, "Trial C": 1.21},
  {"Trial A": 0.12, "Trial B": 2.04, "Trial C": -0.22},
  {"Trial A": -0.98, "Trial B": 4.15, "Trial C": 0.54},
  {"Trial A": 0.77, "Trial B": 3.02, "Trial C": 1.86},
  {"Trial A": -0.06, "Trial B": 1.47, "Trial C": 0.09},
  {"Trial A": 1.31, "Trial B": 2.88, "Trial C": -0.65},
  {"Trial A": -2.17, "Trial B": 3.71, "Trial C": 1.02},
  {"Trial A": 0.44, "Trial B": null, "Trial C": 2.33},
  {"Trial A": -0.61, "Trial B": 2.26, "Trial C": 0.38},
  {"Trial A": 0.95, "Trial B": 3.94, "Trial C": 1.49},
  {"Trial A": -1.08, "Trial B": 2.49, "Trial C": -0.11}
]"#;

/// Parses an embedded dataset by name.
///
/// Returns `Ok(None)` for an unknown name.
pub(crate) fn load(name: &str) -> Result<Option<Vec<Record>>, serde_json::Error> {
    let json = match name {
        "costs" => COSTS,
        "movies" => MOVIES,
        "penguins" => PENGUINS,
        "trials" => TRIALS,
        _ => return Ok(None),
    };
    let records: Vec<Record> = serde_json::from_str(json)?;
    tracing::info!(dataset = name, records = records.len(), "loaded dataset");
    Ok(Some(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_named_dataset_parses() {
        for name in NAMES {
            let records = load(name).unwrap().unwrap();
            assert!(!records.is_empty(), "{name} is empty");
        }
        assert!(load("nope").unwrap().is_none());
    }

    #[test]
    fn nulls_load_as_missing_numbers() {
        let movies = load("movies").unwrap().unwrap();
        let last = movies.last().unwrap();
        assert!(last.num("IMDB_Rating").is_nan());
        assert_eq!(last.text("Title"), Some("Untitled Festival Cut"));
    }
}
