use anyhow::Context as _;
use attrlr_demo_arithmetic::{Calculator, Evaluation};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Evaluate the attributes over the leftmost derivation.
    #[arg(long)]
    top_down: bool,

    /// Print the parse table before evaluating.
    #[arg(long)]
    dump_table: bool,

    /// The expressions to evaluate.
    #[arg(required = true)]
    inputs: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    let calc = Calculator::new().context("failed to compile the arithmetic grammar")?;
    if args.dump_table {
        println!("{}", calc.grammar());
        println!("{}", calc.table().display(calc.grammar()));
    }

    let evaluation = if args.top_down {
        Evaluation::TopDown
    } else {
        Evaluation::BottomUp
    };

    for input in &args.inputs {
        let expr = calc
            .parse(input, evaluation)
            .with_context(|| format!("errored during parsing {:?}", input))?;
        match expr.eval() {
            Some(value) => println!("{} => {}", expr, value),
            None => println!("{} => <undefined>", expr),
        }
    }

    Ok(())
}
