use std::collections::BTreeMap;

use crate::error::ConfigError;

/// Region -> species group -> livestock-unit multiplier.
///
/// Resolved once while building species parameters; unknown lookups abort
/// construction rather than defaulting.
#[derive(Debug, Clone, Default)]
pub struct LsuFactorTable {
    regions: BTreeMap<String, BTreeMap<String, f64>>,
}

impl LsuFactorTable {
    pub fn from_map(regions: BTreeMap<String, BTreeMap<String, f64>>) -> Self {
        Self { regions }
    }

    pub fn resolve(&self, region: &str, group: &str) -> Result<f64, ConfigError> {
        let factors = self
            .regions
            .get(region)
            .ok_or_else(|| ConfigError::UnknownLsuRegion(region.to_string()))?;
        factors
            .get(group)
            .copied()
            .ok_or_else(|| ConfigError::UnknownSpeciesGroup {
                region: region.to_string(),
                group: group.to_string(),
            })
    }
}

/// Shared mutable per-country resources for one run.
///
/// The homekill hours budget and the spare-slaughter-hours pool are drawn
/// down by successive species within a month, so the order they are visited
/// in changes the outcome. Both are owned here and mutated through
/// read-then-write calls only.
#[derive(Debug, Clone)]
pub struct RegionContext {
    country_code: String,
    /// Monthly demand for healthy homekill, per head of population.
    pub homekill_fraction: f64,
    /// Share of ordinary-death carcasses recoverable through homekill.
    pub other_death_homekill_rate: f64,
    homekill_hours_budget: Vec<f64>,
    spare_slaughter_hours: f64,
    current_month: usize,
}

impl RegionContext {
    pub fn new(
        country_code: &str,
        homekill_fraction: f64,
        other_death_homekill_rate: f64,
        homekill_hours_budget: Vec<f64>,
    ) -> Result<Self, ConfigError> {
        if !is_valid_country_code(country_code) {
            return Err(ConfigError::MalformedCountryCode(country_code.to_string()));
        }
        if !(0.0..=1.0).contains(&homekill_fraction) {
            return Err(ConfigError::PolicyOutOfRange {
                field: "homekill.fraction",
                value: homekill_fraction,
            });
        }
        if !(0.0..=1.0).contains(&other_death_homekill_rate) {
            return Err(ConfigError::PolicyOutOfRange {
                field: "homekill.other_death_recovery",
                value: other_death_homekill_rate,
            });
        }
        if let Some(&bad) = homekill_hours_budget.iter().find(|h| **h < 0.0) {
            return Err(ConfigError::PolicyOutOfRange {
                field: "homekill.monthly_hours_budget",
                value: bad,
            });
        }

        Ok(Self {
            country_code: country_code.to_string(),
            homekill_fraction,
            other_death_homekill_rate,
            homekill_hours_budget,
            spare_slaughter_hours: 0.0,
            current_month: 0,
        })
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn current_month(&self) -> usize {
        self.current_month
    }

    pub fn budget_months(&self) -> usize {
        self.homekill_hours_budget.len()
    }

    /// Start a new month: set the index and clear the spare-hours pool.
    pub fn begin_month(&mut self, month: usize) {
        self.current_month = month;
        self.spare_slaughter_hours = 0.0;
    }

    pub fn homekill_hours_remaining(&self, month: usize) -> f64 {
        self.homekill_hours_budget
            .get(month.saturating_sub(1))
            .copied()
            .unwrap_or(0.0)
    }

    /// Consume homekill hours for this month; over-draw clamps to zero.
    pub fn draw_homekill_hours(&mut self, month: usize, hours: f64) {
        if let Some(remaining) = self.homekill_hours_budget.get_mut(month.saturating_sub(1)) {
            *remaining = (*remaining - hours).max(0.0);
        }
    }

    /// Read and reset the spare-slaughter-hours pool in one step.
    pub fn take_spare_slaughter_hours(&mut self) -> f64 {
        std::mem::take(&mut self.spare_slaughter_hours)
    }

    pub fn add_spare_slaughter_hours(&mut self, hours: f64) {
        self.spare_slaughter_hours += hours.max(0.0);
    }
}

fn is_valid_country_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic() && c.is_ascii_uppercase())
}
