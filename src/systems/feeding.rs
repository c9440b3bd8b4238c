//! Monthly feed and grass allocation.
//!
//! Scarcity is never an error here: whatever need is left unmet stays in the
//! species' net-energy balance and turns into starvation when the month is
//! closed out.

use crate::nutrition::{FeedClass, NutrientQuantity};
use crate::species::{Herd, SpeciesState};

/// Set every species' net-energy balance to its full monthly requirement.
///
/// Must run before feeding each month. Calling it again before any feeding
/// has happened leaves the balances unchanged.
pub fn reset_demand(herd: &mut Herd) {
    for species in herd.iter_mut() {
        species.ne_balance = NutrientQuantity::from_kcals(
            species.population * species.params.monthly_ne_per_head(),
        );
        species.population_fed = 0.0;
    }
}

/// Feed one species from one supply.
///
/// Draws down `supply` by the gross energy actually used and the species'
/// balance by the digestible energy delivered. On a partial allocation the
/// fed head count is `round(population * delivered / needed)`, rounding half
/// away from zero; the supply is exhausted and the shortfall stays in the
/// balance. The supply never goes negative and the fed count never exceeds
/// the population.
pub fn feed(species: &mut SpeciesState, supply: &mut NutrientQuantity, class: FeedClass) {
    let required = species.ne_balance.kcals;
    if required <= 0.0 {
        return;
    }
    let efficiency = species.params.efficiency.for_class(class);
    if efficiency <= 0.0 {
        return;
    }

    let available_digestible = supply.kcals * efficiency;
    if available_digestible >= required {
        species.population_fed = species.population;
        supply.kcals -= required / efficiency;
        supply.clamp_non_negative();
        species.ne_balance.kcals = 0.0;
    } else {
        let fed = (species.population * available_digestible / required).round();
        species.population_fed = fed.min(species.population);
        species.ne_balance.kcals = required - available_digestible;
        supply.kcals = 0.0;
    }
}

/// Distribute one month's supplies across the herd.
///
/// Ruminants eat grass first, then every species eats feed, both passes in
/// priority order. The supplies are left holding whatever was not used.
pub fn allocate_month(herd: &mut Herd, grass: &mut NutrientQuantity, feed_supply: &mut NutrientQuantity) {
    for id in herd.priority_order() {
        let species = herd.get_mut(id);
        if species.params.is_ruminant() {
            feed(species, grass, FeedClass::Grass);
        }
    }
    for id in herd.priority_order() {
        feed(herd.get_mut(id), feed_supply, FeedClass::Feed);
    }
}
