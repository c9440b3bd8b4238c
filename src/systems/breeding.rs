//! Step A of the monthly cascade: births, the one-shot breeding reduction,
//! and milk-to-meat transfers.
//!
//! Milk species run first so their paired meat species see the month's
//! transfers before any later stage reads them.

use log::debug;

use crate::species::{Herd, SpeciesId};

pub fn run(herd: &mut Herd, month: usize) {
    for species in herd.iter_mut() {
        species.transfer_in = 0.0;
        species.transfer_births_in = 0.0;
        species.retiring_out = 0.0;
        species.births_this_month = 0.0;
    }

    let mut transfers: Vec<(SpeciesId, f64, f64)> = Vec::new();

    for id in herd.birth_order() {
        let species = herd.get_mut(id);

        // The first cohort conceived after the run start would be born once a
        // full gestation has elapsed; from that month on the scenario's
        // breeding reduction is in force and pregnant animals are no longer
        // preferentially slaughtered.
        if !species.breeding_reduction_applied
            && (month as f64) >= species.params.gestation_months
        {
            let keep = 1.0 - species.params.reduction_in_breeding;
            species.pregnant_animals_birthing_this_month *= keep;
            species.pregnant_animals_total *= keep;
            species.pregnant_animal_slaughter_fraction = 0.0;
            species.breeding_reduction_applied = true;
            debug!(
                "month {month}: breeding reduction applied to '{}' (keep {keep:.3})",
                species.params.name
            );
        }

        let births = species.pregnant_animals_birthing_this_month
            * species.params.animals_per_pregnancy
            / species.params.birth_ratio;
        species.births_this_month = births;
        species.series.births[month] = births;

        if let Some(milk) = &species.params.milk {
            let export_births =
                births * (species.params.birth_ratio - 1.0) * (1.0 - milk.transfer_culling_fraction);
            let retiring = if milk.productive_age_end_years > 0.0 {
                species.population / (milk.productive_age_end_years * 12.0)
            } else {
                0.0
            };
            species.retiring_out = retiring;
            species.series.transfer_population[month] = -retiring;
            if let Some(target) = milk.transfer_target {
                transfers.push((target, retiring + export_births, export_births));
            }
        }
    }

    for (target, head, newborns) in transfers {
        let species = herd.get_mut(target);
        species.transfer_in += head;
        species.transfer_births_in += newborns;
        species.series.transfer_population[month] += head;
        species.series.transfer_births[month] += newborns;
    }

    for species in herd.iter_mut() {
        species.additive_population = species.births_this_month + species.transfer_in;
    }
}
