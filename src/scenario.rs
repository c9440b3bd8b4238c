//! Scenario files: the YAML schema, eager validation, and construction of a
//! runnable herd, region, and supply streams.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::Simulation;
use crate::error::ConfigError;
use crate::nutrition::NutrientQuantity;
use crate::region::{LsuFactorTable, RegionContext};
use crate::species::{
    AnimalFunction, AnimalSize, DigestionEfficiency, DigestionType, Herd, MilkParams, SpeciesId,
    SpeciesParams, SpeciesState,
};

fn default_drop_seed_month() -> bool {
    true
}

fn default_change_in_slaughter_rate() -> f64 {
    1.0
}

fn default_target_population_fraction() -> f64 {
    1.0
}

fn default_starvation_death_fraction() -> f64 {
    1.0
}

fn default_animals_per_pregnancy() -> f64 {
    1.0
}

fn default_birth_ratio() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub country: String,
    pub lsu_region: String,
    pub months: usize,
    #[serde(default = "default_drop_seed_month")]
    pub drop_seed_month: bool,
    pub lsu_factors: BTreeMap<String, BTreeMap<String, f64>>,
    pub homekill: HomekillSpec,
    pub supplies: SupplySpec,
    #[serde(default)]
    pub policy: PolicySpec,
    pub species: Vec<SpeciesSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomekillSpec {
    /// Monthly demand for healthy homekill, per head of population.
    pub fraction: f64,
    /// Share of ordinary-death carcasses recoverable through homekill.
    pub other_death_recovery: f64,
    pub monthly_hours_budget: StreamSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplySpec {
    pub feed_kcals_monthly: StreamSpec,
    pub grass_kcals_monthly: StreamSpec,
}

/// A monthly stream given either as one constant or one value per month.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamSpec {
    Constant(f64),
    Monthly(Vec<f64>),
}

impl StreamSpec {
    fn resolve(&self, months: usize, stream: &'static str) -> Result<Vec<f64>, ConfigError> {
        match self {
            StreamSpec::Constant(value) => Ok(vec![*value; months]),
            StreamSpec::Monthly(values) => {
                if values.len() < months {
                    return Err(ConfigError::SupplyTooShort {
                        stream,
                        have: values.len(),
                        need: months,
                    });
                }
                Ok(values[..months].to_vec())
            }
        }
    }

    fn min_value(&self) -> f64 {
        match self {
            StreamSpec::Constant(value) => *value,
            StreamSpec::Monthly(values) => values.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

/// The scenario's intervention levers, shared by every species.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicySpec {
    #[serde(default)]
    pub reduction_in_breeding: f64,
    #[serde(default = "default_change_in_slaughter_rate")]
    pub change_in_slaughter_rate: f64,
    #[serde(default)]
    pub pregnant_animal_slaughter_fraction: f64,
    #[serde(default = "default_target_population_fraction")]
    pub target_population_fraction: f64,
    #[serde(default = "default_starvation_death_fraction")]
    pub starvation_death_fraction: f64,
}

impl Default for PolicySpec {
    fn default() -> Self {
        Self {
            reduction_in_breeding: 0.0,
            change_in_slaughter_rate: default_change_in_slaughter_rate(),
            pregnant_animal_slaughter_fraction: 0.0,
            target_population_fraction: default_target_population_fraction(),
            starvation_death_fraction: default_starvation_death_fraction(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EfficiencySpec {
    pub grass: f64,
    pub feed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilkSpec {
    pub insemination_cycle_months: f64,
    pub productive_age_end_years: f64,
    #[serde(default)]
    pub milk_yield_kg_monthly: f64,
    #[serde(default)]
    pub transfer_culling_fraction: f64,
    #[serde(default)]
    pub transfer_target: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesSpec {
    pub name: String,
    pub group: String,
    pub function: AnimalFunction,
    pub size: AnimalSize,
    pub digestion: DigestionType,
    pub population: f64,
    pub livestock_unit: f64,
    pub digestion_efficiency: EfficiencySpec,
    pub baseline_annual_slaughter: f64,
    pub animal_slaughter_hours: f64,
    pub other_death_rate_annual: f64,
    pub gestation_months: f64,
    #[serde(default = "default_animals_per_pregnancy")]
    pub animals_per_pregnancy: f64,
    #[serde(default = "default_birth_ratio")]
    pub birth_ratio: f64,
    #[serde(default)]
    pub milk: Option<MilkSpec>,
}

/// Everything needed to run one country, built from a validated scenario.
pub struct RunSetup {
    pub herd: Herd,
    pub region: RegionContext,
    pub feed: Vec<NutrientQuantity>,
    pub grass: Vec<NutrientQuantity>,
    pub simulation: Simulation,
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.months == 0 {
            return Err(ConfigError::ZeroMonths);
        }
        if self.species.is_empty() {
            return Err(ConfigError::EmptySpeciesList);
        }

        let mut seen = BTreeSet::new();
        for spec in &self.species {
            if !seen.insert(spec.name.as_str()) {
                return Err(ConfigError::DuplicateSpecies(spec.name.clone()));
            }
        }

        check_policy(&self.policy)?;
        if self.homekill.monthly_hours_budget.min_value() < 0.0 {
            return Err(ConfigError::PolicyOutOfRange {
                field: "homekill.monthly_hours_budget",
                value: self.homekill.monthly_hours_budget.min_value(),
            });
        }
        if self.supplies.feed_kcals_monthly.min_value() < 0.0 {
            return Err(ConfigError::PolicyOutOfRange {
                field: "supplies.feed_kcals_monthly",
                value: self.supplies.feed_kcals_monthly.min_value(),
            });
        }
        if self.supplies.grass_kcals_monthly.min_value() < 0.0 {
            return Err(ConfigError::PolicyOutOfRange {
                field: "supplies.grass_kcals_monthly",
                value: self.supplies.grass_kcals_monthly.min_value(),
            });
        }

        for spec in &self.species {
            check_species(spec)?;
            match (spec.function, &spec.milk) {
                (AnimalFunction::Milk, None) => {
                    return Err(ConfigError::MissingMilkBlock(spec.name.clone()));
                }
                (AnimalFunction::Meat, Some(_)) => {
                    return Err(ConfigError::UnexpectedMilkBlock(spec.name.clone()));
                }
                _ => {}
            }
            if let Some(milk) = &spec.milk {
                if let Some(target) = &milk.transfer_target {
                    let resolved = self.species.iter().find(|s| &s.name == target);
                    match resolved {
                        None => {
                            return Err(ConfigError::UnknownTransferTarget {
                                species: spec.name.clone(),
                                target: target.clone(),
                            });
                        }
                        Some(t) if t.function != AnimalFunction::Meat => {
                            return Err(ConfigError::TransferTargetNotMeat {
                                species: spec.name.clone(),
                                target: target.clone(),
                            });
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        Ok(())
    }

    /// Validate, resolve LSU factors, and build everything a run needs.
    pub fn build(&self) -> Result<RunSetup, ConfigError> {
        self.validate()?;

        let table = LsuFactorTable::from_map(self.lsu_factors.clone());
        let mut states = Vec::with_capacity(self.species.len());
        for spec in &self.species {
            let lsu_factor = table.resolve(&self.lsu_region, &spec.group)?;
            if lsu_factor <= 0.0 {
                return Err(ConfigError::OutOfRange {
                    species: spec.name.clone(),
                    field: "lsu_factor",
                    value: lsu_factor,
                });
            }
            let milk = match &spec.milk {
                Some(milk) => Some(MilkParams {
                    insemination_cycle_months: milk.insemination_cycle_months,
                    productive_age_end_years: milk.productive_age_end_years,
                    milk_yield_kg_monthly: milk.milk_yield_kg_monthly,
                    transfer_culling_fraction: milk.transfer_culling_fraction,
                    transfer_target: milk
                        .transfer_target
                        .as_ref()
                        .map(|target| self.species_id(target))
                        .transpose()?,
                }),
                None => None,
            };
            let params = SpeciesParams {
                name: spec.name.clone(),
                group: spec.group.clone(),
                size: spec.size,
                function: spec.function,
                digestion: spec.digestion,
                efficiency: DigestionEfficiency {
                    grass: spec.digestion_efficiency.grass,
                    feed: spec.digestion_efficiency.feed,
                },
                livestock_unit: spec.livestock_unit,
                lsu_factor,
                baseline_slaughter_monthly: spec.baseline_annual_slaughter / 12.0
                    * self.policy.change_in_slaughter_rate,
                animal_slaughter_hours: spec.animal_slaughter_hours,
                other_death_rate_monthly: spec.other_death_rate_annual / 12.0,
                gestation_months: spec.gestation_months,
                animals_per_pregnancy: spec.animals_per_pregnancy,
                birth_ratio: spec.birth_ratio,
                reduction_in_breeding: self.policy.reduction_in_breeding,
                target_population_fraction: self.policy.target_population_fraction,
                target_population_head: spec.population * self.policy.target_population_fraction,
                starvation_death_fraction: self.policy.starvation_death_fraction,
                milk,
            };
            states.push(SpeciesState::new(
                params,
                spec.population,
                self.policy.pregnant_animal_slaughter_fraction,
            ));
        }

        let region = RegionContext::new(
            &self.country,
            self.homekill.fraction,
            self.homekill.other_death_recovery,
            self.homekill
                .monthly_hours_budget
                .resolve(self.months, "homekill hours budget")?,
        )?;

        let feed = self
            .supplies
            .feed_kcals_monthly
            .resolve(self.months, "feed")?
            .into_iter()
            .map(NutrientQuantity::from_kcals)
            .collect();
        let grass = self
            .supplies
            .grass_kcals_monthly
            .resolve(self.months, "grass")?
            .into_iter()
            .map(NutrientQuantity::from_kcals)
            .collect();

        let simulation = if self.drop_seed_month {
            Simulation::new(self.months)
        } else {
            Simulation::new(self.months).keep_seed_month()
        };

        Ok(RunSetup {
            herd: Herd::new(states),
            region,
            feed,
            grass,
            simulation,
        })
    }

    fn species_id(&self, name: &str) -> Result<SpeciesId, ConfigError> {
        self.species
            .iter()
            .position(|s| s.name == name)
            .map(SpeciesId)
            .ok_or_else(|| ConfigError::UnknownTransferTarget {
                species: String::new(),
                target: name.to_string(),
            })
    }
}

fn check_policy(policy: &PolicySpec) -> Result<(), ConfigError> {
    check_fraction("policy.reduction_in_breeding", policy.reduction_in_breeding)?;
    check_non_negative(
        "policy.change_in_slaughter_rate",
        policy.change_in_slaughter_rate,
    )?;
    check_fraction(
        "policy.pregnant_animal_slaughter_fraction",
        policy.pregnant_animal_slaughter_fraction,
    )?;
    check_non_negative(
        "policy.target_population_fraction",
        policy.target_population_fraction,
    )?;
    check_fraction(
        "policy.starvation_death_fraction",
        policy.starvation_death_fraction,
    )?;
    Ok(())
}

fn check_fraction(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::PolicyOutOfRange { field, value });
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::PolicyOutOfRange { field, value });
    }
    Ok(())
}

fn check_species(spec: &SpeciesSpec) -> Result<(), ConfigError> {
    let range = |field: &'static str, value: f64, ok: bool| {
        if ok {
            Ok(())
        } else {
            Err(ConfigError::OutOfRange {
                species: spec.name.clone(),
                field,
                value,
            })
        }
    };

    range("population", spec.population, spec.population >= 0.0)?;
    range(
        "livestock_unit",
        spec.livestock_unit,
        spec.livestock_unit > 0.0,
    )?;
    range(
        "digestion_efficiency.grass",
        spec.digestion_efficiency.grass,
        (0.0..=1.0).contains(&spec.digestion_efficiency.grass),
    )?;
    range(
        "digestion_efficiency.feed",
        spec.digestion_efficiency.feed,
        (0.0..=1.0).contains(&spec.digestion_efficiency.feed),
    )?;
    range(
        "baseline_annual_slaughter",
        spec.baseline_annual_slaughter,
        spec.baseline_annual_slaughter >= 0.0,
    )?;
    range(
        "animal_slaughter_hours",
        spec.animal_slaughter_hours,
        spec.animal_slaughter_hours > 0.0,
    )?;
    range(
        "other_death_rate_annual",
        spec.other_death_rate_annual,
        (0.0..=1.0).contains(&spec.other_death_rate_annual),
    )?;
    range(
        "gestation_months",
        spec.gestation_months,
        spec.gestation_months > 0.0,
    )?;
    range(
        "animals_per_pregnancy",
        spec.animals_per_pregnancy,
        spec.animals_per_pregnancy > 0.0,
    )?;
    range("birth_ratio", spec.birth_ratio, spec.birth_ratio >= 1.0)?;

    if let Some(milk) = &spec.milk {
        range(
            "milk.insemination_cycle_months",
            milk.insemination_cycle_months,
            milk.insemination_cycle_months > 0.0,
        )?;
        range(
            "milk.productive_age_end_years",
            milk.productive_age_end_years,
            milk.productive_age_end_years > 0.0,
        )?;
        range(
            "milk.milk_yield_kg_monthly",
            milk.milk_yield_kg_monthly,
            milk.milk_yield_kg_monthly >= 0.0,
        )?;
        range(
            "milk.transfer_culling_fraction",
            milk.transfer_culling_fraction,
            (0.0..=1.0).contains(&milk.transfer_culling_fraction),
        )?;
    }

    Ok(())
}
