mod cli;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use log::info;

use electric_processing::data::loader::discover_inputs;
use electric_processing::{BatchOrchestrator, GeometryConstants, RunConfig};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = cli::parse_args(std::env::args().skip(1))?;
    if args.help {
        println!("{}", cli::USAGE);
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    config.overwrite |= args.overwrite;

    let work_dir = match args.dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolving working directory")?,
    };
    let work_dir: PathBuf = work_dir
        .canonicalize()
        .with_context(|| format!("opening {}", work_dir.display()))?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let thickness_mm = match args.thickness_mm {
        Some(v) => v,
        None => cli::prompt_dimension(&mut input, &mut output, "thickness")?,
    };
    let diameter_mm = match args.diameter_mm {
        Some(v) => v,
        None => cli::prompt_dimension(&mut input, &mut output, "diameter")?,
    };
    let geometry = GeometryConstants::compute(thickness_mm, diameter_mm)?;

    let layout = config.layout(&work_dir, &geometry);
    if layout.has_previous_outputs()
        && !config.overwrite
        && !cli::confirm_overwrite(&mut input, &mut output)?
    {
        println!("Electric processing is stopping, existing files were left untouched.");
        return Ok(ExitCode::SUCCESS);
    }

    let inputs = discover_inputs(&work_dir, &config.input_extension)
        .with_context(|| format!("listing {}", work_dir.display()))?;
    if inputs.is_empty() {
        println!(
            "No .{} files found in {}",
            config.input_extension,
            work_dir.display()
        );
        return Ok(ExitCode::SUCCESS);
    }
    info!("found {} input file(s) in {}", inputs.len(), work_dir.display());

    let orchestrator = BatchOrchestrator::new(layout, config.separator_byte()?);
    let report = orchestrator.run_with_geometry(&inputs, geometry);
    print!("{report}");

    Ok(if report.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
