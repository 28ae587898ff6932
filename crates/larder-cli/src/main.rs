//! # Larder CLI
//!
//! Loads a kitchen configuration and a scenario, stages ingredients for a
//! recipe, cooks it and prints what came out.
//!
//! ```text
//! larder --scenario assets/scenarios/farmhouse.toml --recipe omelet --quantity 3 --seed 7
//! ```
//!
//! Without `--recipe` the recipes craftable from the scenario are listed.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use larder_kitchen::prelude::*;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Cook a recipe against a kitchen scenario
#[derive(Parser, Debug)]
#[command(name = "larder", version, about, long_about = None)]
struct Cli {
    /// Kitchen configuration TOML; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Scenario TOML with items, recipes and containers
    #[arg(long)]
    scenario: PathBuf,

    /// Recipe name or id; lists craftable recipes when omitted
    #[arg(long)]
    recipe: Option<String>,

    /// Units to cook
    #[arg(long, default_value_t = 1)]
    quantity: u32,

    /// Cooking tool upgrade level
    #[arg(long, default_value_t = 0)]
    tool_level: u32,

    /// Cooking skill level
    #[arg(long, default_value_t = 0)]
    skill_level: u32,

    /// Seed for burn and bonus rolls
    #[arg(long)]
    seed: Option<u64>,

    /// Stage ingredients automatically instead of in container order
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    auto_fill: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Result of one CLI cook.
#[derive(Debug, Serialize)]
struct Summary {
    recipe: String,
    requested: u32,
    staged: usize,
    craftable: u32,
    seed: u64,
    experience: u32,
    #[serde(flatten)]
    report: CookReport,
}

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("larder=info".parse()?))
        .init();

    let cli = Cli::parse();
    info!("Larder {}", env!("CARGO_PKG_VERSION"));

    let Kitchen {
        config,
        mut scenario,
    } = load_kitchen(cli.config.as_deref(), &cli.scenario)
        .with_context(|| format!("loading kitchen for {}", cli.scenario.display()))?;

    let Some(key) = cli.recipe.as_deref() else {
        list_available(&scenario, cli.json)?;
        return Ok(());
    };

    let summary = cook(&cli, key, &config, &mut scenario)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, &scenario.catalog);
    }
    Ok(())
}

fn cook(
    cli: &Cli,
    key: &str,
    config: &KitchenConfig,
    scenario: &mut Scenario,
) -> Result<Summary> {
    let Scenario {
        ref catalog,
        ref recipes,
        ref mut containers,
    } = *scenario;
    let containers = containers.as_mut_slice();
    if containers.is_empty() {
        bail!("scenario has no containers to cook from");
    }
    let recipe = recipes
        .find(key)
        .with_context(|| format!("unknown recipe '{key}'"))?;

    let slots = config.slot_table()?;
    let mut manager = CookingManager::new(&slots, cli.tool_level);
    if cli.auto_fill {
        if !manager.auto_fill_ingredients(recipe, containers) {
            warn!("Not enough ingredients to cook '{}'", recipe.name);
        }
    } else {
        stage_in_order(&mut manager, recipe, containers);
    }
    let craftable = manager.amount_craftable(recipe, containers, true);
    let staged = manager.staged_count();

    let seed = cli.seed.unwrap_or_else(|| fastrand::u64(..));
    info!("Rolling with seed {}", seed);
    let mut rng = seeded(seed);
    let seasonings = config.seasoning_table();
    let mut ctx = CookingContext::new(catalog, &mut rng)
        .with_levels(cli.skill_level, cli.tool_level)
        .with_burn(&config.burn)
        .with_seasoning(&seasonings)
        .with_extra_portion(config.extra_portion());
    if let Some(item) = config.burnt_item {
        ctx = ctx.with_burnt_item(item);
    }

    let mut tally = CookingTally::new(config.experience_per_unit);
    let report = manager.cook_recipe(recipe, containers, cli.quantity, &mut ctx, &mut tally);

    Ok(Summary {
        recipe: recipe.name.clone(),
        requested: cli.quantity,
        staged,
        craftable,
        seed,
        experience: tally.experience(),
        report,
    })
}

/// Stages matching stacks in container order until the slots are full.
fn stage_in_order(manager: &mut CookingManager, recipe: &Recipe, containers: &[Container]) {
    for (index, container) in containers.iter().enumerate() {
        for (position, _, stack) in container.iter() {
            if manager.first_empty_slot().is_none() {
                return;
            }
            let wanted = recipe
                .requirements
                .iter()
                .any(|req| is_matching_ingredient(&req.requirement, stack));
            if wanted {
                manager.add_to_ingredients(containers, index, position);
            }
        }
    }
}

fn list_available(scenario: &Scenario, json: bool) -> Result<()> {
    let mut available: Vec<(&Recipe, u32)> =
        scenario.recipes.available(&scenario.containers).collect();
    available.sort_by_key(|(recipe, _)| recipe.id.raw());

    if json {
        let rows: Vec<_> = available
            .iter()
            .map(|(recipe, count)| {
                serde_json::json!({
                    "id": recipe.id.raw(),
                    "name": recipe.name,
                    "craftable": count,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if available.is_empty() {
        println!("Nothing can be cooked from this scenario.");
    }
    for (recipe, count) in available {
        let needs: Vec<String> = recipe
            .requirements
            .iter()
            .map(|req| {
                let name = label(&req.requirement, &scenario.catalog);
                format!("{} x{}", name, req.quantity)
            })
            .collect();
        println!(
            "{:>4}  {:<24} x{:<4} {}",
            recipe.id.raw(),
            recipe.name,
            count,
            needs.join(", ")
        );
    }
    Ok(())
}

fn label(requirement: &Requirement, catalog: &ItemCatalog) -> String {
    match requirement {
        Requirement::Item(item) => catalog.name_of(*item),
        other => other.label(),
    }
}

fn print_summary(summary: &Summary, catalog: &ItemCatalog) {
    let report = &summary.report;
    println!(
        "{}: cooked {}, burnt {} ({} of {} crafted, {} seasonings used)",
        summary.recipe,
        report.cooked,
        report.burnt,
        report.crafted,
        summary.requested,
        report.seasonings_used
    );
    println!(
        "  staged {} slots, craftable {} before cooking",
        summary.staged, summary.craftable
    );
    for stack in &report.delivered {
        println!(
            "  + {} x{} [{}]",
            catalog.name_of(stack.item),
            stack.quantity,
            stack.quality
        );
    }
    for stack in &report.dropped {
        println!(
            "  ! dropped {} x{} (inventory full)",
            catalog.name_of(stack.item),
            stack.quantity
        );
    }
    println!("  experience +{}, seed {}", summary.experience, summary.seed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use larder_common::ItemTypeId;
    use std::io::Write;
    use std::path::Path;

    const FARM: &str = r#"
        [[items]]
        id = 176
        name = "Egg"

        [[items]]
        id = 184
        name = "Milk"

        [[items]]
        id = 195
        name = "Omelet"

        [[recipes]]
        id = 1
        name = "Omelet"
        output = 195
        ingredients = [{ code = 176, quantity = 1 }, { code = 184, quantity = 1 }]

        [[containers]]
        name = "backpack"
        capacity = 8
        stacks = [{ item = 176, quantity = 2 }]

        [[containers]]
        name = "fridge"
        capacity = 8
        stacks = [{ item = 184, quantity = 4 }]
    "#;

    fn args(extra: &[&str]) -> Cli {
        let mut argv = vec!["larder", "--scenario", "farm.toml"];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv).expect("valid arguments")
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = args(&[]);
        assert_eq!(cli.quantity, 1);
        assert!(cli.auto_fill);
        assert!(cli.recipe.is_none());

        let cli = args(&["--auto-fill", "false", "--recipe", "omelet", "--json"]);
        assert!(!cli.auto_fill);
        assert!(cli.json);
    }

    #[test]
    fn test_cook_from_scenario_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(FARM.as_bytes()).expect("write");
        let Kitchen { mut scenario, .. } = load_kitchen(None, file.path()).expect("valid scenario");
        let config = KitchenConfig {
            burn: BurnCurve::NEVER,
            ..KitchenConfig::default()
        };

        let cli = args(&["--quantity", "3", "--seed", "4"]);
        let summary = cook(&cli, "omelet", &config, &mut scenario).expect("cooked");
        assert_eq!(summary.craftable, 2);
        assert_eq!(summary.report.cooked, 2);
        assert_eq!(summary.experience, 2);
        assert_eq!(scenario.containers[0].count(ItemTypeId::new(195)), 2);
        assert_eq!(scenario.containers[1].count(ItemTypeId::new(184)), 2);
    }

    #[test]
    fn test_manual_staging_follows_container_order() {
        let mut scenario = Scenario::from_toml_str(FARM).expect("valid scenario");
        let config = KitchenConfig {
            burn: BurnCurve::NEVER,
            ..KitchenConfig::default()
        };
        let cli = args(&["--auto-fill", "false", "--seed", "1"]);
        let summary = cook(&cli, "1", &config, &mut scenario).expect("cooked");
        assert_eq!(summary.staged, 2);
        assert_eq!(summary.report.cooked, 1);
    }

    #[test]
    fn test_missing_scenario_is_reported() {
        let err = load_kitchen(None, Path::new("no/such/farm.toml")).expect_err("missing");
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_unknown_recipe_is_an_error() {
        let mut scenario = Scenario::from_toml_str(FARM).expect("valid scenario");
        let cli = args(&[]);
        let result = cook(&cli, "souffle", &KitchenConfig::default(), &mut scenario);
        assert!(result.is_err());
    }
}
