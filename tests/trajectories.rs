//! Scenario-level behavior: collapse under famine, shared budgets, drains.

use herdsim::scenario::StreamSpec;
use herdsim::Scenario;

fn single_milk_species_yaml() -> &'static str {
    r#"
name: famine
country: FRA
lsu_region: europe
months: 12
drop_seed_month: false
lsu_factors:
  europe:
    cattle: 1.0
homekill:
  fraction: 0.0
  other_death_recovery: 0.0
  monthly_hours_budget: 0.0
supplies:
  feed_kcals_monthly: 0.0
  grass_kcals_monthly: 0.0
policy:
  starvation_death_fraction: 1.0
species:
  - name: milk_cattle
    group: cattle
    function: milk
    size: large
    digestion: ruminant
    population: 1000000
    livestock_unit: 1.0
    digestion_efficiency: { grass: 0.55, feed: 0.8 }
    baseline_annual_slaughter: 120000
    animal_slaughter_hours: 2.0
    other_death_rate_annual: 0.05
    gestation_months: 9
    birth_ratio: 2.0
    milk:
      insemination_cycle_months: 13.5
      productive_age_end_years: 5.0
      milk_yield_kg_monthly: 300.0
"#
}

fn scenario(yaml: &str) -> Scenario {
    serde_yaml::from_str(yaml).expect("fixture parses")
}

#[test]
fn famine_collapses_the_herd_without_going_negative() {
    let mut setup = scenario(single_milk_species_yaml()).build().unwrap();
    setup
        .simulation
        .run(&mut setup.herd, &mut setup.region, &setup.feed, &setup.grass)
        .unwrap();

    let series = &setup.herd.by_name("milk_cattle").unwrap().series;
    for month in 1..series.population.len() {
        if series.population[month - 1] > 0.0 {
            assert!(
                series.population[month] < series.population[month - 1],
                "population should fall every month ({} -> {} in month {month})",
                series.population[month - 1],
                series.population[month]
            );
        } else {
            assert_eq!(series.population[month], 0.0);
        }
        assert!(series.population[month] >= 0.0);
        assert!(series.pregnant_animals_total[month] >= 0.0);
    }

    let last = series.population.len() - 1;
    assert!(
        series.pregnant_animals_total[last] < 50.0,
        "pregnant stock should be nearly gone, found {}",
        series.pregnant_animals_total[last]
    );
    assert!(series.pregnant_animals_total[last] < series.pregnant_animals_total[1]);
}

#[test]
fn zero_homekill_budget_silences_every_homekill_stream() {
    let yaml = single_milk_species_yaml();
    let mut s = scenario(yaml);
    // two species sharing the region, both starving hard
    let mut second = s.species[0].clone();
    second.name = "meat_cattle".to_string();
    second.function = herdsim::species::AnimalFunction::Meat;
    second.milk = None;
    s.species.push(second);
    // generous healthy-homekill demand, but not a single hour of budget
    s.homekill.fraction = 0.1;
    s.homekill.other_death_recovery = 1.0;

    let mut setup = s.build().unwrap();
    setup
        .simulation
        .run(&mut setup.herd, &mut setup.region, &setup.feed, &setup.grass)
        .unwrap();

    for species in setup.herd.iter() {
        for month in 0..species.series.homekill_total.len() {
            assert_eq!(species.series.homekill_other_death[month], 0.0);
            assert_eq!(species.series.homekill_healthy[month], 0.0);
            assert_eq!(species.series.homekill_starving[month], 0.0);
            assert_eq!(species.series.homekill_total[month], 0.0);
        }
    }
}

#[test]
fn unbounded_supplies_leave_nobody_starving() {
    let mut s = scenario(single_milk_species_yaml());
    s.supplies.feed_kcals_monthly = StreamSpec::Constant(1.0e18);
    s.supplies.grass_kcals_monthly = StreamSpec::Constant(1.0e18);

    let mut setup = s.build().unwrap();
    setup
        .simulation
        .run(&mut setup.herd, &mut setup.region, &setup.feed, &setup.grass)
        .unwrap();

    let species = setup.herd.by_name("milk_cattle").unwrap();
    // the whole herd as it stood at the final feeding was fed
    let feeding_time_population = species.series.population[species.series.population.len() - 2];
    assert_eq!(species.population_fed, feeding_time_population);
    for month in 0..species.series.starving_pre_slaughter.len() {
        assert_eq!(species.series.starving_pre_slaughter[month], 0.0);
        assert_eq!(species.series.homekill_starving[month], 0.0);
        assert_eq!(species.series.starving_unresolved[month], 0.0);
    }
}

#[test]
fn zero_target_drains_the_population_at_the_slaughter_rate() {
    let yaml = r#"
name: drain
country: FRA
lsu_region: europe
months: 14
drop_seed_month: false
lsu_factors:
  europe:
    cattle: 1.0
homekill:
  fraction: 0.0
  other_death_recovery: 0.0
  monthly_hours_budget: 0.0
supplies:
  feed_kcals_monthly: 1.0e18
  grass_kcals_monthly: 1.0e18
policy:
  reduction_in_breeding: 1.0
  target_population_fraction: 0.0
species:
  - name: meat_cattle
    group: cattle
    function: meat
    size: large
    digestion: ruminant
    population: 100000
    livestock_unit: 1.0
    digestion_efficiency: { grass: 0.55, feed: 0.8 }
    baseline_annual_slaughter: 120000
    animal_slaughter_hours: 2.0
    other_death_rate_annual: 0.0
    gestation_months: 1
"#;
    let mut setup = scenario(yaml).build().unwrap();
    setup
        .simulation
        .run(&mut setup.herd, &mut setup.region, &setup.feed, &setup.grass)
        .unwrap();

    let series = &setup.herd.by_name("meat_cattle").unwrap().series;
    // 100k head at 10k desired head a month: gone within ten months, one
    // month of slack allowed for rounding
    let drained_by = 11;
    assert!(
        series.population[drained_by] == 0.0,
        "population should be empty by month {drained_by}, found {}",
        series.population[drained_by]
    );
    for month in 1..series.population.len() {
        assert!(series.population[month] <= series.population[month - 1] + 1e-9);
    }
}

#[test]
fn bundled_baseline_scenario_builds_and_runs() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/baseline.yaml");
    let mut scenario = Scenario::load(path).unwrap();
    scenario.months = 24;

    let mut setup = scenario.build().unwrap();
    let outputs = setup
        .simulation
        .run(&mut setup.herd, &mut setup.region, &setup.feed, &setup.grass)
        .unwrap();

    assert_eq!(outputs.dairy_population.len(), 24);
    let initial_dairy = 4_900_000.0;
    let final_dairy = *outputs.dairy_population.last().unwrap();
    assert!(
        final_dairy > initial_dairy * 0.5,
        "well-fed dairy herd should not collapse, found {final_dairy}"
    );
    assert!(outputs.milk_production_kg.iter().all(|kg| *kg > 0.0));
}

#[test]
fn report_writes_to_disk() {
    let mut setup = scenario(single_milk_species_yaml()).build().unwrap();
    let outputs = setup
        .simulation
        .run(&mut setup.herd, &mut setup.region, &setup.feed, &setup.grass)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports/famine.json");
    herdsim::output::write_report(&path, "famine", "FRA", &setup.herd, &outputs).unwrap();

    let data = std::fs::read_to_string(&path).unwrap();
    assert!(data.contains("\"scenario\": \"famine\""));
    assert!(data.contains("milk_cattle"));
}
