//! Silica predictor console - main entry point.

use clap::Parser;
use silica::app::{Session, SessionState};
use silica::config::SilicaConfig;
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "silica")]
#[command(about = "Silica concentrate predictor for flotation processes")]
struct Args {
    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model artifact path (overrides configuration)
    #[arg(short, long)]
    model: Option<PathBuf>,
}

const ABOUT: &str = "\
How it works:
  1. Input: you provide the key operating parameters of the flotation
     process with the three bounded controls.
  2. Prediction: the pre-trained regression model receives those inputs
     and evaluates them against the patterns it learned from historical
     plant data.
  3. Result: the predicted silica concentrate is shown as a percentage,
     formatted to two decimal places.

Model details:
  Type:     regression model (optimized gradient-boosted trees)
  Purpose:  predict the continuous silica concentrate percentage
  Features: iron concentrate (%), flotation column 01 air flow,
            amine reagent flow";

const HELP: &str = "\
Commands:
  iron <value>    set iron concentrate (%)
  air <value>     set flotation column 01 air flow
  amine <value>   set amine reagent flow
  show            print the current parameter values
  predict         run the prediction with the current values
  about           how the predictor works
  help            this text
  quit            exit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load or create configuration
    let mut config = match args.config {
        Some(path) => SilicaConfig::from_file(&path)?,
        None => SilicaConfig::default(),
    };
    if let Some(model) = args.model {
        config.model.path = model;
    }
    config.validate()?;

    silica::observability::init(&config.observability)?;

    let mut session = Session::new(config);
    print_banner(&session);

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let mut parts = line.split_whitespace();
        let command = match parts.next() {
            Some(command) => command,
            None => continue,
        };

        match command {
            "iron" | "air" | "amine" => set_control(&mut session, command, parts.next()),
            "show" => show(&session),
            "predict" => {
                let state = session.submit().await;
                render(&state);
                session.acknowledge();
            }
            "about" => println!("{}\n", ABOUT),
            "help" => println!("{}\n", HELP),
            "quit" | "exit" => break,
            other => println!("Unknown command '{}'. Type 'help' for the command list.", other),
        }
    }

    Ok(())
}

fn print_banner(session: &Session) {
    println!("Silica Concentrate Predictor (%) - Flotation Process");
    println!();
    println!(
        "This tool uses a machine learning model to predict the silica
concentrate (%) in flotation from three key operating variables.
Set the parameters, then run 'predict'."
    );
    println!();
    for (control, caption) in session.controls().into_iter().zip([
        "fraction of the ore recovered in the froth after separation",
        "air injected through the dispersion system in the column",
        "dosage of amine collector reagent fed to the column",
    ]) {
        let spec = control.spec();
        println!(
            "  {:<30} [{} .. {}] step {}  ({})",
            control.label(),
            spec.min,
            spec.max,
            spec.step,
            caption
        );
    }
    println!();
    println!("{}\n", HELP);
}

fn set_control(session: &mut Session, name: &str, raw: Option<&str>) {
    let raw = match raw {
        Some(raw) => raw,
        None => {
            println!("Usage: {} <value>", name);
            return;
        }
    };
    let value: f64 = match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            println!("'{}' is not a number.", raw);
            return;
        }
    };

    let result = match name {
        "iron" => session.set_iron(value),
        "air" => session.set_air(value),
        _ => session.set_amine(value),
    };
    match result {
        Ok(clamped) if clamped != value => {
            println!("{} clamped into range: {}", name, clamped);
        }
        Ok(clamped) => println!("{} = {}", name, clamped),
        Err(e) => println!("Rejected: {}", e),
    }
}

fn show(session: &Session) {
    let (iron, air, amine) = session.values();
    println!("  iron concentrate (%) : {}", iron);
    println!("  air flow             : {}", air);
    println!("  amine flow           : {}", amine);
}

fn render(state: &SessionState) {
    match state {
        SessionState::DisplayResult(pct) => {
            println!("Prediction result");
            println!("  Predicted concentrate: {}", pct);
            println!("  This value is the estimated silica concentrate percentage.");
        }
        SessionState::DisplayError(msg) => println!("{}", msg),
        // submit() always lands on a display state
        SessionState::Idle | SessionState::Predicting => {}
    }
}
