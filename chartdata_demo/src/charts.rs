// Copyright 2025 the Chartdata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The gallery charts, each reduced to the rows it would hand to a renderer.

use std::error::Error;

use chartdata_core::{
    ColId, GroupKey, Record, RecordTable, Scene, Schema, Table, TableId, year_of_epoch_seconds,
};
use chartdata_transforms::{
    AggregateField, AggregateOp, BinSpec, GridMode, Predicate, Program, SortOrder, TableFrame,
    Transform, bin_1d, bin_1d_multi, bin_2d, cumulative_share, cumulative_sum, density_ticks,
    group, group_aggregate, group_kde, group_summaries, quantile, summarize,
    summarize_with_quartiles,
};
use serde::Serialize;
use serde_json::{Value as JsonValue, json};

use crate::DemoOptions;

type ChartResult = Result<Vec<JsonValue>, Box<dyn Error>>;
type ChartFn = fn(&[Record], &DemoOptions) -> ChartResult;

const SOURCE: TableId = TableId(1);
const TRIAL_FIELDS: [&str; 3] = ["Trial A", "Trial B", "Trial C"];

/// One chart's output: its rows, or the reason it has none.
#[derive(Debug, Serialize)]
pub(crate) struct Chart {
    pub(crate) dataset: &'static str,
    pub(crate) chart: &'static str,
    pub(crate) rows: Vec<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) empty: Option<String>,
}

const COSTS_CHARTS: &[(&str, ChartFn)] = &[
    ("cost_by_year", cost_by_year),
    ("cost_share_by_type", cost_share_by_type),
    ("costliest_types", costliest_types),
    ("cost_table_by_type", cost_table_by_type),
];

const MOVIES_CHARTS: &[(&str, ChartFn)] = &[
    ("imdb_histogram", imdb_histogram),
    ("rating_heatmap", rating_heatmap),
    ("releases_by_year", releases_by_year),
    ("imdb_cumulative_table", imdb_cumulative_table),
];

const PENGUINS_CHARTS: &[(&str, ChartFn)] = &[
    ("body_mass_by_species", body_mass_by_species),
    ("flipper_length_summary", flipper_length_summary),
    ("body_mass_density", body_mass_density),
];

const TRIALS_CHARTS: &[(&str, ChartFn)] = &[("trial_histograms", trial_histograms)];

fn charts_for(dataset: &str) -> &'static [(&'static str, ChartFn)] {
    match dataset {
        "costs" => COSTS_CHARTS,
        "movies" => MOVIES_CHARTS,
        "penguins" => PENGUINS_CHARTS,
        "trials" => TRIALS_CHARTS,
        _ => &[],
    }
}

/// Runs every chart of `dataset`. A failing chart becomes an empty-state entry; the others still
/// render.
pub(crate) fn render(
    dataset: &'static str,
    records: &[Record],
    options: &DemoOptions,
) -> Vec<Chart> {
    charts_for(dataset)
        .iter()
        .map(|&(chart, build)| match build(records, options) {
            Ok(rows) => Chart {
                dataset,
                chart,
                rows,
                empty: None,
            },
            Err(err) => {
                tracing::warn!(dataset, chart, %err, "chart has no data");
                Chart {
                    dataset,
                    chart,
                    rows: Vec::new(),
                    empty: Some(err.to_string()),
                }
            }
        })
        .collect()
}

fn key_or_unknown(r: &Record, field: &str) -> GroupKey {
    r.key(field).unwrap_or_else(|| GroupKey::text("Unknown"))
}

fn cost_by_year(records: &[Record], _: &DemoOptions) -> ChartResult {
    let g = group(records, |r| key_or_unknown(r, "Year"), |r| r.num("Cost")).sort_by_key();
    Ok(g.iter()
        .map(|(year, cost)| json!({ "year": year, "cost": cost }))
        .collect())
}

fn cost_share_by_type(records: &[Record], _: &DemoOptions) -> ChartResult {
    let g = group(records, |r| key_or_unknown(r, "Type"), |r| r.num("Cost")).sort_by_value_desc();
    let shares = g.shares();
    Ok(g.iter()
        .map(|(kind, cost)| {
            let share = shares.get(kind).copied().unwrap_or(0.0);
            json!({ "type": kind, "cost": cost, "percent": share * 100.0 })
        })
        .collect())
}

fn costliest_types(records: &[Record], _: &DemoOptions) -> ChartResult {
    let g = group(records, |r| key_or_unknown(r, "Type"), |r| r.num("Cost")).top_n(3);
    Ok(g.iter()
        .enumerate()
        .map(|(rank, (kind, cost))| json!({ "rank": rank + 1, "type": kind, "cost": cost }))
        .collect())
}

fn cost_table_by_type(records: &[Record], _: &DemoOptions) -> ChartResult {
    let (scene, mut schema) = scene_for(records);
    let kind = col(&schema, "Type")?;
    let cost = col(&schema, "Cost")?;
    let total = schema.push("total");
    let events = schema.push("events");
    let mean = schema.push("mean");

    let mut p = Program::new();
    p.push(Transform::Aggregate {
        input: SOURCE,
        output: TableId(2),
        group_by: vec![kind],
        fields: vec![
            AggregateField {
                op: AggregateOp::Sum,
                input: cost,
                output: total,
            },
            AggregateField {
                op: AggregateOp::Count,
                input: cost,
                output: events,
            },
            AggregateField {
                op: AggregateOp::Mean,
                input: cost,
                output: mean,
            },
        ],
    });
    p.push(Transform::Sort {
        input: TableId(2),
        output: TableId(3),
        by: total,
        order: SortOrder::Desc,
        columns: vec![kind, total, events, mean],
    });
    let out = p.execute_on_scene(&scene)?;
    let frame = out.table(TableId(3)).ok_or("sort produced no table")?;
    Ok(frame_rows(frame, &schema))
}

fn imdb_histogram(records: &[Record], options: &DemoOptions) -> ChartResult {
    let spec = BinSpec::fixed(options.bins).with_domain(0.0, 10.0);
    let h = bin_1d(records, |r| r.num("IMDB_Rating"), &spec)?;
    if h.skipped_non_finite > 0 {
        tracing::info!(skipped = h.skipped_non_finite, "movies without an IMDB rating");
    }
    let cumulative = cumulative_sum(&h.bins);
    let shares = cumulative_share(&h.bins);
    Ok(h.bins
        .iter()
        .zip(cumulative.iter().zip(&shares))
        .map(|(b, (c, s))| {
            json!({
                "start": b.start,
                "end": b.end,
                "mid": b.mid(),
                "count": b.count,
                "cumulative": c,
                "cumulative_share": s,
            })
        })
        .collect())
}

fn rating_heatmap(records: &[Record], options: &DemoOptions) -> ChartResult {
    let h = bin_2d(
        records,
        |r| r.num("IMDB_Rating"),
        |r| r.num("Rotten_Tomatoes_Rating"),
        &BinSpec::fixed(options.bins).with_domain(0.0, 10.0),
        &BinSpec::fixed(options.bins).with_domain(0.0, 100.0),
        GridMode::Sparse,
    )?;
    let max = h.max_count();
    Ok(h.cells
        .iter()
        .map(|c| {
            json!({
                "imdb_start": c.cell.x0,
                "imdb_end": c.cell.x1,
                "rt_start": c.cell.y0,
                "rt_end": c.cell.y1,
                "count": c.count,
                "intensity": c.count as f64 / max as f64,
            })
        })
        .collect())
}

fn releases_by_year(records: &[Record], _: &DemoOptions) -> ChartResult {
    let g = group_aggregate(
        records,
        |r| year_of_epoch_seconds(r.num("Release_Date")),
        |r| r.num("IMDB_Rating"),
        &[AggregateOp::Count, AggregateOp::Mean],
    )
    .sort_by_key();
    Ok(g.iter()
        .map(|(year, v)| json!({ "year": year, "movies": v[0], "mean_rating": v[1] }))
        .collect())
}

fn imdb_cumulative_table(records: &[Record], options: &DemoOptions) -> ChartResult {
    let (mut scene, mut schema) = scene_for(records);
    let rating = col(&schema, "IMDB_Rating")?;
    let start = schema.push("bin_start");
    let end = schema.push("bin_end");
    let count = schema.push("count");
    let running = schema.push("cumulative");

    let mut p = Program::new();
    p.push(Transform::Filter {
        input: SOURCE,
        output: TableId(2),
        predicate: Predicate::finite(rating),
        columns: vec![rating],
    });
    p.push(Transform::Bin {
        input: TableId(2),
        output: TableId(3),
        input_col: rating,
        spec: BinSpec::nice(options.bins),
        output_start: start,
        output_end: end,
        output_count: count,
    });
    p.push(Transform::Cumulate {
        input: TableId(3),
        output: TableId(4),
        field: count,
        output_col: running,
        columns: vec![start, end, count],
    });
    p.apply_to_scene(&mut scene)?;
    let table = scene.table(TableId(4)).ok_or("cumulate produced no table")?;
    let frame = TableFrame::from_table(table, vec![start, end, count, running])?;
    Ok(frame_rows(&frame, &schema))
}

fn body_mass_by_species(records: &[Record], options: &DemoOptions) -> ChartResult {
    let g = group_summaries(
        records,
        |r| key_or_unknown(r, "Species"),
        |r| r.num("Body Mass (g)"),
        options.quartiles,
    );
    Ok(g.iter()
        .map(|(species, s)| {
            let mut row = json!({
                "species": species,
                "count": s.count,
                "mean": s.mean,
                "min": s.min,
                "max": s.max,
            });
            if let (Some(q), Some(obj)) = (s.quartiles, row.as_object_mut()) {
                obj.insert("q1".into(), q.q1.into());
                obj.insert("median".into(), q.median.into());
                obj.insert("q3".into(), q.q3.into());
                obj.insert("iqr".into(), q.iqr().into());
            }
            row
        })
        .collect())
}

/// One row per mass tick with a density column per species, as an overlaid area chart wants.
fn body_mass_density(records: &[Record], _: &DemoOptions) -> ChartResult {
    let ticks = density_ticks(2500.0, 6500.0, 50.0)?;
    let curves = group_kde(
        records,
        |r| key_or_unknown(r, "Species"),
        |r| r.num("Body Mass (g)"),
        180.0,
        &ticks,
    )?;
    Ok(ticks
        .iter()
        .enumerate()
        .map(|(i, &mass)| {
            let mut row = serde_json::Map::new();
            row.insert("mass".into(), mass.into());
            for (species, curve) in curves.iter() {
                row.insert(species.to_string(), curve[i].1.into());
            }
            JsonValue::Object(row)
        })
        .collect())
}

fn flipper_length_summary(records: &[Record], options: &DemoOptions) -> ChartResult {
    let field = |r: &Record| r.num("Flipper Length (mm)");
    let s = if options.quartiles {
        summarize_with_quartiles(records, field)?
    } else {
        summarize(records, field)?
    };
    let values: Vec<f64> = records.iter().map(field).collect();
    let p90 = quantile(&values, 0.9)?;
    Ok(vec![json!({
        "count": s.count,
        "sum": s.sum,
        "mean": s.mean,
        "min": s.min,
        "max": s.max,
        "median": s.quartiles.map(|q| q.median),
        "p90": p90,
    })])
}

fn trial_histograms(records: &[Record], options: &DemoOptions) -> ChartResult {
    let accessors: Vec<Box<dyn Fn(&Record) -> f64>> = TRIAL_FIELDS
        .iter()
        .map(|&name| Box::new(move |r: &Record| r.num(name)) as Box<dyn Fn(&Record) -> f64>)
        .collect();
    let fields: Vec<&dyn Fn(&Record) -> f64> = accessors.iter().map(|f| &**f).collect();
    let h = bin_1d_multi(records, &fields, &BinSpec::nice(options.bins))?;
    Ok(h.bins
        .iter()
        .map(|b| {
            let mut row = serde_json::Map::new();
            row.insert("start".into(), b.start.into());
            row.insert("end".into(), b.end.into());
            for (name, count) in TRIAL_FIELDS.iter().zip(&b.counts) {
                row.insert((*name).into(), (*count).into());
            }
            JsonValue::Object(row)
        })
        .collect())
}

/// Loads `records` into a fresh scene as [`SOURCE`], returning the inferred schema.
fn scene_for(records: &[Record]) -> (Scene, Schema) {
    let table = RecordTable::infer(records.to_vec());
    let schema = table.schema.clone();
    let mut scene = Scene::new();
    scene.insert_table(Table::from_data(SOURCE, Box::new(table)));
    (scene, schema)
}

fn col(schema: &Schema, name: &str) -> Result<ColId, Box<dyn Error>> {
    schema
        .col(name)
        .ok_or_else(|| format!("dataset has no `{name}` field").into())
}

/// Serializes a frame as one JSON object per row, keyed by schema name.
fn frame_rows(frame: &TableFrame, schema: &Schema) -> Vec<JsonValue> {
    (0..frame.row_count())
        .map(|row| {
            let obj = frame
                .columns
                .iter()
                .zip(&frame.data)
                .filter_map(|(&c, values)| {
                    let name = schema.name(c)?;
                    let value = serde_json::to_value(values.get(row)?).ok()?;
                    Some((name.to_owned(), value))
                })
                .collect();
            JsonValue::Object(obj)
        })
        .collect()
}
