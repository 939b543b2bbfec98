use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use bprop::{
    file, report, Activation, LearnParameters, LearningMethod, NetworkBuilder, ReportMode,
};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Print {
    Outputs,
    Targets,
    Errors,
    All,
}

impl From<Print> for ReportMode {
    fn from(value: Print) -> Self {
        match value {
            Print::Outputs => ReportMode::Outputs,
            Print::Targets => ReportMode::OutputsTargets,
            Print::Errors => ReportMode::OutputsErrors,
            Print::All => ReportMode::OutputsTargetsErrors,
        }
    }
}

/// Train a multilayer perceptron on a dataset file and report the results.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Training dataset
    training: PathBuf,

    /// Validation dataset; enables early stopping
    #[arg(long)]
    validation: Option<PathBuf>,

    /// Dataset to run the trained network on
    #[arg(long)]
    test: Option<PathBuf>,

    /// Units per layer, output layer last
    #[arg(long, value_delimiter = ',', default_value = "4,1")]
    layers: Vec<usize>,

    /// identity or logistic
    #[arg(long, default_value = "logistic")]
    activation: String,

    #[arg(long, default_value = "backpropagation")]
    learning: String,

    #[arg(long, default_value_t = 1000)]
    epochs: usize,

    #[arg(long, default_value_t = 0.5)]
    learning_rate: f64,

    #[arg(long, default_value_t = 0.5)]
    momentum: f64,

    /// Seed for the initial weights; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Initial flat weight vector
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Where to save the trained flat weight vector
    #[arg(long)]
    save_weights: Option<PathBuf>,

    /// Report file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "outputs")]
    print: Print,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn run(args: Args) -> bprop::Result<()> {
    let activation: Activation = args.activation.parse()?;
    let learning: LearningMethod = args.learning.parse()?;

    let mut training = file::load_dataset(&args.training, "training")?;
    let mut validation = args
        .validation
        .as_ref()
        .map(|path| file::load_dataset(path, "validation"))
        .transpose()?;
    let mut test = args
        .test
        .as_ref()
        .map(|path| file::load_dataset(path, "test"))
        .transpose()?;

    let builder = NetworkBuilder::new(training.num_inputs())
        .layers(&args.layers)
        .activation(activation)
        .learning(learning)
        .learn_parameters(LearnParameters {
            epoch_max: args.epochs,
            learning_rate: args.learning_rate,
            momentum: args.momentum,
        });
    let mut net = match args.seed {
        Some(seed) => builder.build_with_seed(seed)?,
        None => builder.build()?,
    };
    if let Some(path) = &args.weights {
        net.set_weights(Some(&file::load_weights(path)?))?;
    }
    for data in [Some(&training), validation.as_ref(), test.as_ref()]
        .into_iter()
        .flatten()
    {
        net.check_dataset(data)?;
    }

    let mut sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    report::write_learn_parameters(&mut sink, &net)?;
    let summary = net.train(&mut training, validation.as_mut());
    report::write_summary(&mut sink, &summary)?;
    report::write_weights(&mut sink, &net)?;

    if let Some(test) = test.as_mut() {
        net.run_once(test);
        report::write_results(&mut sink, test, args.print.into())?;
        writeln!(sink, "Test SSE: {:9.5}", test.total_error())?;
    }
    sink.flush()?;

    if let Some(path) = &args.save_weights {
        file::save_weights(path, &net.weights())?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, log_level),
    )
    .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
