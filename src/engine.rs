//! The monthly simulation driver.
//!
//! Month 0 is a seeded baseline row written outside the loop. Each simulated
//! month then runs the same fixed sequence: demand reset, feed and grass
//! allocation, births and transfers (milk first), slaughter, homekill.
//! Population and pregnant-stock series are closed out at the end of the
//! month, after which no stage may leave a negative head count.

use log::{debug, info};

use crate::error::ConfigError;
use crate::nutrition::NutrientQuantity;
use crate::output::RunOutputs;
use crate::region::RegionContext;
use crate::species::Herd;
use crate::systems::{breeding, feeding, homekill, slaughter};

pub struct Simulation {
    months: usize,
    drop_seed_month: bool,
}

impl Simulation {
    pub fn new(months: usize) -> Self {
        Self {
            months,
            drop_seed_month: true,
        }
    }

    /// Keep the seeded month-0 row in every output series.
    pub fn keep_seed_month(mut self) -> Self {
        self.drop_seed_month = false;
        self
    }

    pub fn months(&self) -> usize {
        self.months
    }

    /// Run the full monthly loop, mutating the herd in place and returning
    /// the aggregate output streams.
    pub fn run(
        &self,
        herd: &mut Herd,
        region: &mut RegionContext,
        feed_stream: &[NutrientQuantity],
        grass_stream: &[NutrientQuantity],
    ) -> Result<RunOutputs, ConfigError> {
        if self.months == 0 {
            return Err(ConfigError::ZeroMonths);
        }
        if feed_stream.len() < self.months {
            return Err(ConfigError::SupplyTooShort {
                stream: "feed",
                have: feed_stream.len(),
                need: self.months,
            });
        }
        if grass_stream.len() < self.months {
            return Err(ConfigError::SupplyTooShort {
                stream: "grass",
                have: grass_stream.len(),
                need: self.months,
            });
        }
        if region.budget_months() < self.months {
            return Err(ConfigError::SupplyTooShort {
                stream: "homekill hours budget",
                have: region.budget_months(),
                need: self.months,
            });
        }

        let mut outputs = RunOutputs::allocate(self.months);
        self.seed_initial_conditions(herd, &mut outputs);

        for month in 1..=self.months {
            region.begin_month(month);

            feeding::reset_demand(herd);
            let supplied_feed = feed_stream[month - 1];
            let supplied_grass = grass_stream[month - 1];
            let mut feed_left = supplied_feed;
            let mut grass_left = supplied_grass;
            feeding::allocate_month(herd, &mut grass_left, &mut feed_left);
            outputs.feed_used[month] = supplied_feed.saturating_sub(feed_left);
            outputs.grass_used[month] = supplied_grass.saturating_sub(grass_left);

            for species in herd.iter_mut() {
                let starving = (species.population - species.population_fed).max(0.0);
                species.starving_pre_slaughter = starving;
                species.series.starving_pre_slaughter[month] = starving;
            }

            breeding::run(herd, month);
            slaughter::run(herd, region, month);
            homekill::run(herd, region, month);

            self.close_month(herd, &mut outputs, month);
            debug!(
                "month {month}: {:.0} head total, {:.0} kcal feed used",
                herd.iter().map(|s| s.population).sum::<f64>(),
                outputs.feed_used[month].kcals
            );
        }

        if self.drop_seed_month {
            for species in herd.iter_mut() {
                species.series.drop_seed_month();
            }
            outputs.drop_seed_month();
        }

        info!(
            "simulation of {} species over {} months complete ({:.0} head remain)",
            herd.len(),
            self.months,
            herd.iter().map(|s| s.population).sum::<f64>()
        );
        Ok(outputs)
    }

    /// Write the month-0 baseline row for every species. No feeding,
    /// slaughter, or homekill happens here; the row only anchors the series
    /// and gives Step B its first prior-month slaughter value.
    fn seed_initial_conditions(&self, herd: &mut Herd, outputs: &mut RunOutputs) {
        for species in herd.iter_mut() {
            species.series.allocate(self.months);
            species.series.population[0] = species.population;
            species.series.slaughter[0] = species.params.baseline_slaughter_monthly;
            species.series.pregnant_animals_total[0] = species.pregnant_animals_total;
        }
        self.record_aggregates(herd, outputs, 0);
        // month 0 also reports the baseline slaughter level
        for species in herd.iter() {
            outputs.slaughter_for_size(species.params.size)[0] +=
                species.params.baseline_slaughter_monthly;
        }
    }

    fn close_month(&self, herd: &mut Herd, outputs: &mut RunOutputs, month: usize) {
        for species in herd.iter_mut() {
            species.series.population[month] = species.population;
            species.series.pregnant_animals_total[month] = species.pregnant_animals_total;
            species.assert_sane(month);
        }
        self.record_aggregates(herd, outputs, month);
        for species in herd.iter() {
            outputs.slaughter_for_size(species.params.size)[month] +=
                species.series.slaughter[month];
        }
    }

    fn record_aggregates(&self, herd: &Herd, outputs: &mut RunOutputs, month: usize) {
        let mut dairy = 0.0;
        let mut milk_kg = 0.0;
        for species in herd.iter() {
            if let Some(milk) = &species.params.milk {
                dairy += species.population;
                milk_kg += species.population * milk.milk_yield_kg_monthly;
            }
        }
        outputs.dairy_population[month] = dairy;
        outputs.milk_production_kg[month] = milk_kg;
    }
}
