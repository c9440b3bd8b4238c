//! Run products handed to the wider food-supply model, and the JSON report
//! writer used by the CLI.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::nutrition::NutrientQuantity;
use crate::species::{AnimalSize, Herd, MonthlySeries};

/// Month-indexed aggregates produced by one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunOutputs {
    pub months: usize,
    /// Professionally slaughtered head per month, by animal size class.
    pub slaughter_small: Vec<f64>,
    pub slaughter_medium: Vec<f64>,
    pub slaughter_large: Vec<f64>,
    /// Supplied minus leftover, per month.
    pub feed_used: Vec<NutrientQuantity>,
    pub grass_used: Vec<NutrientQuantity>,
    /// Total head across milk-function species.
    pub dairy_population: Vec<f64>,
    pub milk_production_kg: Vec<f64>,
}

impl RunOutputs {
    pub(crate) fn allocate(months: usize) -> Self {
        Self {
            months,
            slaughter_small: vec![0.0; months + 1],
            slaughter_medium: vec![0.0; months + 1],
            slaughter_large: vec![0.0; months + 1],
            feed_used: vec![NutrientQuantity::ZERO; months + 1],
            grass_used: vec![NutrientQuantity::ZERO; months + 1],
            dairy_population: vec![0.0; months + 1],
            milk_production_kg: vec![0.0; months + 1],
        }
    }

    pub(crate) fn slaughter_for_size(&mut self, size: AnimalSize) -> &mut Vec<f64> {
        match size {
            AnimalSize::Small => &mut self.slaughter_small,
            AnimalSize::Medium => &mut self.slaughter_medium,
            AnimalSize::Large => &mut self.slaughter_large,
        }
    }

    pub(crate) fn drop_seed_month(&mut self) {
        for stream in [
            &mut self.slaughter_small,
            &mut self.slaughter_medium,
            &mut self.slaughter_large,
            &mut self.dairy_population,
            &mut self.milk_production_kg,
        ] {
            if !stream.is_empty() {
                stream.remove(0);
            }
        }
        for stream in [&mut self.feed_used, &mut self.grass_used] {
            if !stream.is_empty() {
                stream.remove(0);
            }
        }
    }
}

#[derive(Serialize)]
struct SpeciesReport<'a> {
    name: &'a str,
    series: &'a MonthlySeries,
}

#[derive(Serialize)]
struct Report<'a> {
    scenario: &'a str,
    country: &'a str,
    generated_at: String,
    months: usize,
    outputs: &'a RunOutputs,
    species: Vec<SpeciesReport<'a>>,
}

/// Write the full run (aggregates plus every per-species series) as pretty
/// JSON.
pub fn write_report(
    path: impl AsRef<Path>,
    scenario: &str,
    country: &str,
    herd: &Herd,
    outputs: &RunOutputs,
) -> Result<()> {
    let path = path.as_ref();
    let report = Report {
        scenario,
        country,
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        months: outputs.months,
        outputs,
        species: herd
            .iter()
            .map(|s| SpeciesReport {
                name: s.name(),
                series: &s.series,
            })
            .collect(),
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
