//! Step C of the monthly cascade: the homekill draw-down and the starvation
//! deaths it fails to avert.
//!
//! Every sub-step decrements the one shared monthly hours budget in place,
//! species by species in priority order. Carcass recovery from ordinary
//! deaths comes first, then demand-driven healthy homekill, then homekill of
//! starving animals; whoever is visited later finds less budget left.

use log::{debug, warn};

use crate::region::RegionContext;
use crate::species::Herd;

/// Starvation below this head count, with no breeding reduction and no
/// population target, is treated as baseline noise and leaves the pregnant
/// stock untouched.
const BASELINE_STARVATION_HEAD: f64 = 10.0;

pub fn run(herd: &mut Herd, region: &mut RegionContext, month: usize) {
    for id in herd.priority_order() {
        let species = herd.get_mut(id);
        let params = &species.params;
        let hours_per_head = params.animal_slaughter_hours;
        let population_pre = species.population;

        let recoverable = species.other_death_base * region.other_death_homekill_rate;
        let other_death_homekill =
            recoverable.min(region.homekill_hours_remaining(month) / hours_per_head);
        region.draw_homekill_hours(month, other_death_homekill * hours_per_head);

        let healthy_demand = population_pre * region.homekill_fraction;
        let healthy_homekill =
            healthy_demand.min(region.homekill_hours_remaining(month) / hours_per_head);
        region.draw_homekill_hours(month, healthy_homekill * hours_per_head);

        let starving_mid = (species.starving_pre_slaughter
            - species.actual_slaughter
            - healthy_homekill)
            .max(0.0);
        let starving_homekill =
            starving_mid.min(region.homekill_hours_remaining(month) / hours_per_head);
        region.draw_homekill_hours(month, starving_homekill * hours_per_head);

        let starving_unresolved = (starving_mid - starving_homekill).max(0.0);
        let other_death_starving = starving_unresolved * params.starvation_death_fraction;
        let other_death_total = other_death_starving + species.other_death_base;

        let baseline_like = params.reduction_in_breeding == 0.0
            && params.target_population_fraction == 1.0
            && species.starving_pre_slaughter < BASELINE_STARVATION_HEAD;
        if !baseline_like && population_pre > 0.0 {
            let loss_fraction = (other_death_total / population_pre).clamp(0.0, 1.0);
            species.pregnant_animals_total =
                (species.pregnant_animals_total * (1.0 - loss_fraction)).max(0.0);
            species.pregnant_animals_birthing_this_month =
                (species.pregnant_animals_birthing_this_month * (1.0 - loss_fraction)).max(0.0);
        }

        let next_population = (population_pre
            - other_death_starving
            - healthy_homekill
            - starving_homekill)
            .max(0.0);
        if next_population == 0.0 && population_pre > 0.0 {
            warn!(
                "month {month}: '{}' driven to zero head",
                species.params.name
            );
        }
        species.population = next_population;

        species.series.homekill_other_death[month] = other_death_homekill;
        species.series.homekill_healthy[month] = healthy_homekill;
        species.series.homekill_starving[month] = starving_homekill;
        species.series.homekill_total[month] =
            other_death_homekill + healthy_homekill + starving_homekill;
        species.series.other_death_total[month] = other_death_total;
        species.series.starving_unresolved[month] = starving_unresolved;

        debug!(
            "month {month}: '{}' homekill {:.1} head, {:.1} starved",
            species.params.name,
            species.series.homekill_total[month],
            other_death_starving
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::{
        AnimalFunction, AnimalSize, DigestionEfficiency, DigestionType, SpeciesParams,
        SpeciesState,
    };

    fn params(name: &str, feed_eff: f64) -> SpeciesParams {
        SpeciesParams {
            name: name.to_string(),
            group: "cattle".to_string(),
            size: AnimalSize::Medium,
            function: AnimalFunction::Meat,
            digestion: DigestionType::Ruminant,
            efficiency: DigestionEfficiency {
                grass: 0.5,
                feed: feed_eff,
            },
            livestock_unit: 1.0,
            lsu_factor: 1.0,
            baseline_slaughter_monthly: 0.0,
            animal_slaughter_hours: 2.0,
            other_death_rate_monthly: 0.0,
            gestation_months: 9.0,
            animals_per_pregnancy: 1.0,
            birth_ratio: 1.0,
            reduction_in_breeding: 0.0,
            target_population_fraction: 0.5,
            target_population_head: 0.0,
            starvation_death_fraction: 1.0,
            milk: None,
        }
    }

    fn state(name: &str, feed_eff: f64, population: f64, starving: f64) -> SpeciesState {
        let mut s = SpeciesState::new(params(name, feed_eff), population, 0.0);
        s.series.allocate(3);
        s.starving_pre_slaughter = starving;
        s.series.starving_pre_slaughter[1] = starving;
        s
    }

    #[test]
    fn budget_is_shared_in_priority_order() {
        // 'first' has the higher feed efficiency, so it draws first
        let first = state("first", 0.9, 1_000.0, 500.0);
        let second = state("second", 0.3, 1_000.0, 500.0);
        let mut herd = Herd::new(vec![first, second]);
        // 1200 hours = 600 head at 2 h/head
        let mut region = RegionContext::new("USA", 0.0, 0.0, vec![1_200.0; 3]).unwrap();
        region.begin_month(1);

        run(&mut herd, &mut region, 1);

        let first = herd.by_name("first").unwrap();
        let second = herd.by_name("second").unwrap();
        assert_eq!(first.series.homekill_starving[1], 500.0);
        assert_eq!(second.series.homekill_starving[1], 100.0);
        assert_eq!(second.series.starving_unresolved[1], 400.0);
        assert_eq!(region.homekill_hours_remaining(1), 0.0);
    }

    #[test]
    fn zero_budget_means_zero_homekill_and_full_starvation_deaths() {
        let mut herd = Herd::new(vec![state("only", 0.5, 1_000.0, 300.0)]);
        let mut region = RegionContext::new("USA", 0.02, 0.5, vec![0.0; 3]).unwrap();
        region.begin_month(1);

        run(&mut herd, &mut region, 1);

        let s = herd.iter().next().unwrap();
        assert_eq!(s.series.homekill_total[1], 0.0);
        assert_eq!(s.series.other_death_total[1], 300.0);
        assert_eq!(s.population, 700.0);
    }

    #[test]
    fn healthy_homekill_counts_against_starvation() {
        let mut herd = Herd::new(vec![state("only", 0.5, 1_000.0, 100.0)]);
        // plenty of hours; healthy demand is 5% of 1000 = 50 head
        let mut region = RegionContext::new("USA", 0.05, 0.0, vec![10_000.0; 3]).unwrap();
        region.begin_month(1);

        run(&mut herd, &mut region, 1);

        let s = herd.iter().next().unwrap();
        assert_eq!(s.series.homekill_healthy[1], 50.0);
        // the 50 healthy kills reduce the starving pool before its own pass
        assert_eq!(s.series.homekill_starving[1], 50.0);
        assert_eq!(s.series.starving_unresolved[1], 0.0);
        assert_eq!(s.population, 900.0);
    }

    #[test]
    fn carcass_recovery_does_not_reduce_the_population() {
        let mut s = state("only", 0.5, 1_000.0, 0.0);
        s.other_death_base = 40.0;
        let mut herd = Herd::new(vec![s]);
        let mut region = RegionContext::new("USA", 0.0, 0.5, vec![10_000.0; 3]).unwrap();
        region.begin_month(1);

        run(&mut herd, &mut region, 1);

        let s = herd.iter().next().unwrap();
        assert_eq!(s.series.homekill_other_death[1], 20.0);
        assert_eq!(s.population, 1_000.0);
        assert_eq!(s.series.other_death_total[1], 40.0);
    }

    #[test]
    fn pregnant_stock_shrinks_with_the_death_fraction() {
        let mut s = state("only", 0.5, 1_000.0, 200.0);
        s.pregnant_animals_total = 400.0;
        s.pregnant_animals_birthing_this_month = 40.0;
        let mut herd = Herd::new(vec![s]);
        let mut region = RegionContext::new("USA", 0.0, 0.0, vec![0.0; 3]).unwrap();
        region.begin_month(1);

        run(&mut herd, &mut region, 1);

        let s = herd.iter().next().unwrap();
        // 200 of 1000 head died: pregnant stock drops by the same fifth
        assert!((s.pregnant_animals_total - 320.0).abs() < 1e-9);
        assert!((s.pregnant_animals_birthing_this_month - 32.0).abs() < 1e-9);
    }

    #[test]
    fn baseline_noise_leaves_pregnant_stock_alone() {
        let mut s = state("only", 0.5, 1_000.0, 5.0);
        s.params.target_population_fraction = 1.0;
        s.params.starvation_death_fraction = 1.0;
        s.pregnant_animals_total = 400.0;
        let mut herd = Herd::new(vec![s]);
        let mut region = RegionContext::new("USA", 0.0, 0.0, vec![0.0; 3]).unwrap();
        region.begin_month(1);

        run(&mut herd, &mut region, 1);

        let s = herd.iter().next().unwrap();
        assert_eq!(s.pregnant_animals_total, 400.0);
        // the five starving head still die
        assert_eq!(s.series.other_death_total[1], 5.0);
    }
}
