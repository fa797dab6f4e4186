use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use fuzzy_control::elevator::{self, Elevator};
use fuzzy_control::surface::{Axis, Surface};
use fuzzy_control::{
    model, AndOp, DefuzzificationOp, EmptyAggregate, Expr, ImplicationOp, InferenceSystem, OrOp, ProductionLink, Universe,
    VariableKey,
};

#[derive(Parser)]
#[command(name = "fuzzy-control")]
#[command(about = "Evaluate Mamdani fuzzy inference models.")]
#[command(
    long_about = "Evaluates a fuzzy inference model once, over a grid, or shows its structure.\nWithout --model the built-in elevator operating-condition model is used."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the model once and print every output
    ///
    /// Inputs are given as name=value. With the built-in elevator model and no
    /// inputs, evaluates weight 1200, floor 20 in a 30 floor building.
    Run {
        /// Inputs (format: name=value)
        ///
        /// Examples: peso_elevador=1200 andar_chamado=20 num_andares=30
        inputs: Vec<String>,
        /// Output raw values only (for piping to other tools)
        #[arg(short = 'r', long)]
        raw: bool,
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Show variables, terms and rules of the model
    Show {
        #[command(flatten)]
        model: ModelArgs,
    },
    /// Evaluate the model over a grid of two inputs and print tab-separated values
    ///
    /// The first row holds the x values; every following row starts with its y value.
    /// Points where no rule fired are printed as NaN.
    Surface {
        /// Swept input along columns (format: name:min:max:step)
        #[arg(long, default_value = "peso_elevador:1000:1500:10")]
        x: String,
        /// Swept input along rows (format: name:min:max:step)
        #[arg(long, default_value = "andar_chamado:0:100:10")]
        y: String,
        /// Inputs held fixed (format: name=value)
        #[arg(long = "fixed", default_value = "num_andares=50")]
        fixed: Vec<String>,
        /// Output to tabulate
        #[arg(short, long, default_value = elevator::CONDITION)]
        output: String,
        #[command(flatten)]
        model: ModelArgs,
    },
}

#[derive(Args)]
struct ModelArgs {
    /// JSON model definition (default: built-in elevator model)
    #[arg(short, long)]
    model: Option<PathBuf>,
    /// Clamp inputs to their universes before fuzzification
    #[arg(long)]
    clip: bool,
    /// Fuzzy AND operator
    #[arg(long = "and")]
    and_op: Option<AndOp>,
    /// Fuzzy OR operator
    #[arg(long = "or")]
    or_op: Option<OrOp>,
    /// Implication operator
    #[arg(long)]
    implication: Option<ImplicationOp>,
    /// Aggregation operator
    #[arg(long)]
    aggregation: Option<ProductionLink>,
    /// Defuzzification method
    #[arg(long)]
    defuzz: Option<DefuzzificationOp>,
    /// What to output when no rule fires
    #[arg(long)]
    on_empty: Option<EmptyAggregate>,
}

impl ModelArgs {
    fn load(&self) -> Result<InferenceSystem> {
        let system = match &self.model {
            Some(path) => load_model(path)?,
            None => Elevator::new()?.system,
        };

        let mut config = *system.config();
        config.clip_inputs |= self.clip;
        config.and_op = self.and_op.unwrap_or(config.and_op);
        config.or_op = self.or_op.unwrap_or(config.or_op);
        config.imp_op = self.implication.unwrap_or(config.imp_op);
        config.prod_link = self.aggregation.unwrap_or(config.prod_link);
        config.defuzz_op = self.defuzz.unwrap_or(config.defuzz_op);
        config.on_empty = self.on_empty.unwrap_or(config.on_empty);

        Ok(system.with_config(config))
    }
}

fn load_model(path: &Path) -> Result<InferenceSystem> {
    let json = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    model::from_json(&json).with_context(|| format!("invalid model {}", path.display()))
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "fuzzy_control=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Run { inputs, raw, model } => run_command(model, inputs, *raw),
        Commands::Show { model } => show_command(model),
        Commands::Surface {
            x,
            y,
            fixed,
            output,
            model,
        } => surface_command(model, x, y, fixed, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run_command(args: &ModelArgs, inputs: &[String], raw: bool) -> Result<()> {
    let system = args.load()?;
    let mut values = inputs.iter().map(|s| parse_assignment(s)).collect::<Result<Vec<_>>>()?;

    if values.is_empty() && args.model.is_none() {
        values = vec![
            (elevator::WEIGHT.to_owned(), 1200.),
            (elevator::FLOOR.to_owned(), 20.),
            (elevator::FLOORS.to_owned(), 30.),
        ];
    }

    let outputs = system.evaluate_named(values)?;

    for output in outputs.iter() {
        if raw {
            println!("{}", output.crisp());
        } else if output.is_fallback() {
            println!("{} = {:.2} (no rule fired)", output.name(), output.crisp());
        } else {
            println!("{} = {:.2}", output.name(), output.crisp());
        }
    }

    Ok(())
}

fn show_command(args: &ModelArgs) -> Result<()> {
    let system = args.load()?;

    for (_, var) in system.variables() {
        let universe = var.universe();

        println!(
            "{} {} [{}, {}] step {}",
            var.kind(),
            var.name(),
            universe.min(),
            universe.max(),
            universe.step()
        );
        for (name, mf) in var.terms().iter() {
            println!("  {name}: {mf:?}");
        }
    }

    println!("{} rules", system.rules().len());
    for (i, rule) in system.rules().iter().enumerate() {
        let premise = render(&system, rule.premise());
        let conclusions = rule
            .conclusions()
            .iter()
            .map(|c| format!("{}.{} ({})", variable_name(&system, c.variable()), c.term(), c.weight()))
            .collect::<Vec<_>>()
            .join(", ");

        println!("  {}: {premise} -> {conclusions}", i + 1);
    }

    Ok(())
}

fn surface_command(args: &ModelArgs, x: &str, y: &str, fixed: &[String], output: &str) -> Result<()> {
    let system = args.load()?;
    let fixed = fixed.iter().map(|s| parse_assignment(s)).collect::<Result<Vec<_>>>()?;
    let surface = Surface::compute(&system, &parse_axis(x)?, &parse_axis(y)?, fixed, output)?;

    let header = surface.x().iter().map(f64::to_string).collect::<Vec<_>>().join("\t");
    println!("\t{header}");

    for (y, row) in surface.rows() {
        let cells = row
            .iter()
            .map(|z| z.map_or_else(|| "NaN".to_owned(), |z| format!("{z:.4}")))
            .collect::<Vec<_>>()
            .join("\t");
        println!("{y}\t{cells}");
    }

    Ok(())
}

fn variable_name(system: &InferenceSystem, key: VariableKey) -> &str {
    system.get(key).map_or("?", |var| var.name())
}

fn render(system: &InferenceSystem, expr: &Expr) -> String {
    match expr {
        Expr::Is(key, term) => format!("{}.{term}", variable_name(system, *key)),
        Expr::And(lhs, rhs) => format!("({} AND {})", render(system, lhs), render(system, rhs)),
        Expr::Or(lhs, rhs) => format!("({} OR {})", render(system, lhs), render(system, rhs)),
        Expr::Not(expr) => format!("NOT {}", render(system, expr)),
    }
}

fn parse_assignment(s: &str) -> Result<(String, f64)> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got `{s}`"))?;
    let value = value
        .trim()
        .parse()
        .with_context(|| format!("`{value}` is not a number"))?;

    Ok((name.trim().to_owned(), value))
}

fn parse_axis(s: &str) -> Result<Axis> {
    let parts: Vec<&str> = s.split(':').collect();
    let [name, min, max, step] = parts.as_slice() else {
        bail!("expected name:min:max:step, got `{s}`");
    };
    let number = |v: &str| v.parse::<f64>().with_context(|| format!("`{v}` is not a number"));

    Ok(Axis::new(*name, Universe::new(number(min)?, number(max)?, number(step)?)?))
}
