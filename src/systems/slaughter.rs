//! Step B of the monthly cascade: slaughter against the target floor and the
//! pregnant-stock bookkeeping that follows it.
//!
//! Species are visited in priority order. Capacity a species cannot use is
//! converted back to hours and handed to the next species through the
//! region's spare-hours pool, so the visit order is part of the model.

use log::debug;

use crate::region::RegionContext;
use crate::species::Herd;

pub fn run(herd: &mut Herd, region: &mut RegionContext, month: usize) {
    for id in herd.priority_order() {
        let species = herd.get_mut(id);
        let params = &species.params;

        let other_death = species.population * params.other_death_rate_monthly;

        let spare_hours = region.take_spare_slaughter_hours();
        let desired = species.series.slaughter[month - 1] + spare_hours / params.animal_slaughter_hours;

        let pre_slaughter = species.population - other_death - species.retiring_out
            + species.additive_population;

        let headroom = (pre_slaughter - params.target_population_head).max(0.0);
        let mut actual = desired.min(headroom);
        region.add_spare_slaughter_hours((desired - actual) * params.animal_slaughter_hours);

        let remaining = pre_slaughter - actual;
        if remaining < 0.0 {
            species.population = 0.0;
            actual = 0.0;
        } else {
            species.population = remaining;
        }

        let pregnant_prev = species.pregnant_animals_total;
        let preferential_cap = species.pregnant_animal_slaughter_fraction * pregnant_prev;
        let removed = if preferential_cap < actual {
            // the cap binds: take the capped slaughter share plus the
            // pregnant share of ordinary deaths
            preferential_cap + pregnant_prev * params.other_death_rate_monthly
        } else {
            actual
        };
        species.pregnant_animals_total = (pregnant_prev - removed).max(0.0);
        species.pregnant_animals_birthing_this_month = if params.gestation_months > 0.0 {
            species.pregnant_animals_total / params.gestation_months
        } else {
            0.0
        };

        species.other_death_base = other_death;
        species.actual_slaughter = actual;
        species.series.slaughter[month] = actual;

        debug!(
            "month {month}: '{}' slaughtered {actual:.1} of {desired:.1} desired ({:.1} head remain)",
            species.params.name, species.population
        );
    }
}
