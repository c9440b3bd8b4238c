use serde::{Deserialize, Serialize};

use crate::nutrition::{FeedClass, NutrientQuantity};

/// Net energy demand of one livestock unit over one month, in kcal.
///
/// One LSU is the maintenance requirement of a ~600 kg reference cow,
/// about 9,300 kcal net energy per day over a 30.4-day month. Species scale
/// this by `livestock_unit * lsu_factor`.
pub const NE_KCAL_PER_LSU_MONTH: f64 = 283_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpeciesId(pub(crate) usize);

impl SpeciesId {
    pub fn raw(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimalSize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimalFunction {
    Milk,
    Meat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestionType {
    Ruminant,
    Monogastric,
}

/// Fraction of gross feed energy converted to usable net energy, per class.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DigestionEfficiency {
    pub grass: f64,
    pub feed: f64,
}

impl DigestionEfficiency {
    pub fn for_class(&self, class: FeedClass) -> f64 {
        match class {
            FeedClass::Grass => self.grass,
            FeedClass::Feed => self.feed,
        }
    }
}

/// Milk-only parameters, including the pairing to a meat sub-population.
#[derive(Debug, Clone)]
pub struct MilkParams {
    pub insemination_cycle_months: f64,
    pub productive_age_end_years: f64,
    pub milk_yield_kg_monthly: f64,
    /// Share of surplus newborns culled instead of transferred.
    pub transfer_culling_fraction: f64,
    pub transfer_target: Option<SpeciesId>,
}

/// Immutable per-species parameters, resolved once at construction from
/// scenario data and the region's LSU table.
#[derive(Debug, Clone)]
pub struct SpeciesParams {
    pub name: String,
    pub group: String,
    pub size: AnimalSize,
    pub function: AnimalFunction,
    pub digestion: DigestionType,
    pub efficiency: DigestionEfficiency,
    pub livestock_unit: f64,
    pub lsu_factor: f64,
    /// Desired monthly slaughter head count before capacity carry-over,
    /// already scaled by the scenario's change-in-slaughter-rate.
    pub baseline_slaughter_monthly: f64,
    /// Professional and homekill processing time per head.
    pub animal_slaughter_hours: f64,
    pub other_death_rate_monthly: f64,
    pub gestation_months: f64,
    pub animals_per_pregnancy: f64,
    /// Newborns per retained newborn; the surplus share is transferred
    /// (milk species) or culled at birth.
    pub birth_ratio: f64,
    pub reduction_in_breeding: f64,
    pub target_population_fraction: f64,
    pub target_population_head: f64,
    pub starvation_death_fraction: f64,
    pub milk: Option<MilkParams>,
}

impl SpeciesParams {
    pub fn is_milk(&self) -> bool {
        self.function == AnimalFunction::Milk
    }

    pub fn is_ruminant(&self) -> bool {
        self.digestion == DigestionType::Ruminant
    }

    pub fn monthly_ne_per_head(&self) -> f64 {
        self.livestock_unit * self.lsu_factor * NE_KCAL_PER_LSU_MONTH
    }
}

/// One month-indexed output stream per metric, allocated once per run and
/// written by explicit month index. Index 0 is the seeded initial row.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonthlySeries {
    pub population: Vec<f64>,
    pub slaughter: Vec<f64>,
    pub births: Vec<f64>,
    pub other_death_total: Vec<f64>,
    pub pregnant_animals_total: Vec<f64>,
    /// Net head flow from milk/meat pairing: positive into this species,
    /// negative out of it.
    pub transfer_population: Vec<f64>,
    /// Newborns received through the pairing (subset of transfer_population).
    pub transfer_births: Vec<f64>,
    pub homekill_other_death: Vec<f64>,
    pub homekill_healthy: Vec<f64>,
    pub homekill_starving: Vec<f64>,
    pub homekill_total: Vec<f64>,
    pub starving_pre_slaughter: Vec<f64>,
    pub starving_unresolved: Vec<f64>,
}

impl MonthlySeries {
    fn streams_mut(&mut self) -> Vec<&mut Vec<f64>> {
        vec![
            &mut self.population,
            &mut self.slaughter,
            &mut self.births,
            &mut self.other_death_total,
            &mut self.pregnant_animals_total,
            &mut self.transfer_population,
            &mut self.transfer_births,
            &mut self.homekill_other_death,
            &mut self.homekill_healthy,
            &mut self.homekill_starving,
            &mut self.homekill_total,
            &mut self.starving_pre_slaughter,
            &mut self.starving_unresolved,
        ]
    }

    /// Size every stream for `months` simulated months plus the seed row.
    pub fn allocate(&mut self, months: usize) {
        for stream in self.streams_mut() {
            stream.clear();
            stream.resize(months + 1, 0.0);
        }
    }

    /// Remove the seeded month-0 row from every stream.
    pub fn drop_seed_month(&mut self) {
        for stream in self.streams_mut() {
            if !stream.is_empty() {
                stream.remove(0);
            }
        }
    }
}

/// One species/function pairing within one country.
///
/// Exclusively owned by the monthly stages; nothing else mutates it during
/// a run.
#[derive(Debug, Clone)]
pub struct SpeciesState {
    pub params: SpeciesParams,
    pub population: f64,
    pub pregnant_animals_total: f64,
    pub pregnant_animals_birthing_this_month: f64,
    /// Zeroed permanently when the breeding reduction fires.
    pub pregnant_animal_slaughter_fraction: f64,
    pub breeding_reduction_applied: bool,

    /// Remaining net-energy need this month; set by the demand reset and
    /// only ever decreased while feeding.
    pub ne_balance: NutrientQuantity,
    /// Head count whose requirement was met by the latest allocation step.
    pub population_fed: f64,

    pub(crate) transfer_in: f64,
    pub(crate) transfer_births_in: f64,
    pub(crate) retiring_out: f64,
    pub(crate) births_this_month: f64,
    pub(crate) additive_population: f64,
    pub(crate) other_death_base: f64,
    pub(crate) actual_slaughter: f64,
    pub(crate) starving_pre_slaughter: f64,

    pub series: MonthlySeries,
}

impl SpeciesState {
    /// Build the initial state, deriving the standing pregnant stock.
    ///
    /// Milk herds cycle through insemination continuously, so the standing
    /// pregnant share is gestation over cycle length. Meat herds are assumed
    /// at steady state: enough pregnancies in flight to replace baseline
    /// slaughter and ordinary deaths.
    pub fn new(params: SpeciesParams, population: f64, pregnant_slaughter_fraction: f64) -> Self {
        let pregnant = if let Some(milk) = &params.milk {
            if milk.insemination_cycle_months > 0.0 {
                (population * params.gestation_months / milk.insemination_cycle_months)
                    .min(population)
            } else {
                0.0
            }
        } else {
            let births_needed = params.baseline_slaughter_monthly
                + population * params.other_death_rate_monthly;
            let per_pregnancy = params.animals_per_pregnancy.max(f64::MIN_POSITIVE);
            (births_needed * params.gestation_months * params.birth_ratio / per_pregnancy)
                .min(population)
        };
        let birthing = if params.gestation_months > 0.0 {
            pregnant / params.gestation_months
        } else {
            0.0
        };

        Self {
            params,
            population,
            pregnant_animals_total: pregnant,
            pregnant_animals_birthing_this_month: birthing,
            pregnant_animal_slaughter_fraction: pregnant_slaughter_fraction,
            breeding_reduction_applied: false,
            ne_balance: NutrientQuantity::ZERO,
            population_fed: 0.0,
            transfer_in: 0.0,
            transfer_births_in: 0.0,
            retiring_out: 0.0,
            births_this_month: 0.0,
            additive_population: 0.0,
            other_death_base: 0.0,
            actual_slaughter: 0.0,
            starving_pre_slaughter: 0.0,
            series: MonthlySeries::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.params.name
    }

    /// No negative head count may survive a completed month; a violation is
    /// a modeling bug, not a recoverable condition.
    pub(crate) fn assert_sane(&self, month: usize) {
        assert!(
            self.population >= 0.0,
            "negative population {} for '{}' after month {}",
            self.population,
            self.params.name,
            month
        );
        assert!(
            self.pregnant_animals_total >= 0.0,
            "negative pregnant count {} for '{}' after month {}",
            self.pregnant_animals_total,
            self.params.name,
            month
        );
    }
}

/// The ordered species list for one country.
///
/// Order is semantic: slaughter hours and homekill hours are handed down the
/// priority order, so this is an explicit sequence, never a map. The
/// priority order is computed once at construction (descending feed
/// digestion efficiency, stable), and Step A runs milk species before meat
/// species so transfers are visible the same month.
#[derive(Debug, Clone)]
pub struct Herd {
    species: Vec<SpeciesState>,
    priority: Vec<SpeciesId>,
    birth_order: Vec<SpeciesId>,
}

impl Herd {
    pub fn new(species: Vec<SpeciesState>) -> Self {
        let mut priority: Vec<SpeciesId> = (0..species.len()).map(SpeciesId).collect();
        priority.sort_by(|a, b| {
            let ea = species[a.0].params.efficiency.feed;
            let eb = species[b.0].params.efficiency.feed;
            eb.partial_cmp(&ea).unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut birth_order: Vec<SpeciesId> = Vec::with_capacity(species.len());
        birth_order.extend(
            (0..species.len())
                .map(SpeciesId)
                .filter(|id| species[id.0].params.is_milk()),
        );
        birth_order.extend(
            (0..species.len())
                .map(SpeciesId)
                .filter(|id| !species[id.0].params.is_milk()),
        );

        Self {
            species,
            priority,
            birth_order,
        }
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn get(&self, id: SpeciesId) -> &SpeciesState {
        &self.species[id.0]
    }

    pub fn get_mut(&mut self, id: SpeciesId) -> &mut SpeciesState {
        &mut self.species[id.0]
    }

    pub fn by_name(&self, name: &str) -> Option<&SpeciesState> {
        self.species.iter().find(|s| s.params.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesState> {
        self.species.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SpeciesState> {
        self.species.iter_mut()
    }

    /// Feeding and slaughter order; shared hour pools drain left to right.
    pub fn priority_order(&self) -> Vec<SpeciesId> {
        self.priority.clone()
    }

    /// Step A order: milk species first, then meat, both in list order.
    pub fn birth_order(&self) -> Vec<SpeciesId> {
        self.birth_order.clone()
    }
}
