//! Headless demo: assemble a mixture from the command line, run it to
//! equilibrium and print what happened.
//!
//! ```text
//! demo-headless -s chem:water=55.5 -s chem:acetic_acid=1.0 --ambient 298.15
//! demo-headless -s chem:water=40.0 -t chem:rock_salt=4
//! ```

use clap::Parser;

use chem_sim_core::{default_registry, Mixture, ReactionContext, Token};

#[derive(Parser)]
#[command(about = "Runs a chemical mixture to equilibrium and reports the outcome")]
struct Args {
    /// Species to dissolve, as `id=mol_per_liter` (repeatable).
    #[arg(short, long = "species", value_name = "ID=CONC")]
    species: Vec<String>,

    /// Solid tokens to offer, as `id` or `id=count` (repeatable).
    #[arg(short, long = "token", value_name = "ID[=COUNT]")]
    tokens: Vec<String>,

    /// Mixture volume in liters.
    #[arg(long, default_value_t = 1.0)]
    volume: f64,

    /// Starting temperature in kelvins.
    #[arg(long, default_value_t = 298.15)]
    temperature: f64,

    /// Heater power in watts (negative cools).
    #[arg(long, default_value_t = 0.0)]
    heating_power: f64,

    /// Ambient temperature in kelvins.
    #[arg(long, default_value_t = 298.15)]
    ambient: f64,

    /// Ultraviolet power reaching the vessel.
    #[arg(long, default_value_t = 0.0)]
    uv: f64,
}

fn parse_species(spec: &str) -> Result<(String, f64), String> {
    let (id, concentration) = spec
        .split_once('=')
        .ok_or_else(|| format!("expected id=concentration, got `{spec}`"))?;
    let concentration: f64 = concentration
        .parse()
        .map_err(|_| format!("bad concentration in `{spec}`"))?;
    Ok((id.to_owned(), concentration))
}

fn parse_token(spec: &str) -> Result<Token, String> {
    match spec.split_once('=') {
        Some((id, count)) => {
            let count: u32 = count.parse().map_err(|_| format!("bad count in `{spec}`"))?;
            Ok(Token::new(id, count))
        }
        None => Ok(Token::new(spec, 1)),
    }
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let registry = default_registry();
    let mut mixture = Mixture::new(registry.clone());
    mixture.set_temperature(args.temperature);
    for spec in &args.species {
        let (id, concentration) = parse_species(spec)?;
        let species = registry
            .species_named(&id)
            .ok_or_else(|| format!("unknown species `{id}`"))?;
        mixture.add_species(&species, concentration);
    }
    let mut context = ReactionContext::new();
    context.uv_power = args.uv;
    for spec in &args.tokens {
        context.tokens.push(parse_token(spec)?);
    }

    let run = mixture.run_to_equilibrium(args.volume, &mut context, args.heating_power, args.ambient);

    println!(
        "{} after {} ticks",
        if mixture.is_at_equilibrium() {
            "equilibrium"
        } else {
            "tick limit reached"
        },
        run.ticks
    );
    println!(
        "temperature {:.2} K, volume {:.3} L",
        mixture.temperature(),
        run.new_volume
    );
    let mut species: Vec<_> = mixture.species_present().collect();
    species.sort_by(|a, b| a.id().cmp(b.id()));
    for entry in species {
        let id = entry.id();
        println!(
            "  {id}: {:.6} mol/L (gas fraction {:.2})",
            mixture.concentration_of(id),
            mixture.gas_fraction_of(id)
        );
    }
    if !run.results.is_empty() {
        println!("results:");
        for (kind, count) in &run.results {
            println!("  {kind:?} x{count}");
        }
    }
    for token in &context.tokens {
        println!("token {} remaining x{}", token.id, token.count);
    }
    Ok(())
}
