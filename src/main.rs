#[macro_use]
extern crate clap;

use {
    anyhow::{Context as _, Result},
    channel_gke::{
        context::Context,
        dns::DnsInput,
        engine::{Engine, Ranks},
        parameters::Parameters,
        statistics::Statistics,
        store::BlockStore,
    },
    log::{error, info},
    simplelog::{Config as LogConfig, LevelFilter, TermLogger, TerminalMode},
    std::fs::File,
};

#[quit::main]
fn main() {
    let matches = clap_app!(channel_gke =>
        (version: crate_version!())
        (about: "Computes the Generalized Kolmogorov Equation terms of a turbulent channel flow.")
        (@arg IPROC: "Rank of this process, starting from 1")
        (@arg NPROC: "Number of processes sharing the output")
        (@arg PARAMETERS: -p --parameters +takes_value "Path to file containing run parameters.")
        (@arg OUTPUT: -o --output +takes_value "Path of the GKE term image, overriding the parameters.")
        (@arg WORKERS: -w --workers +takes_value "Number of threads per process, overriding the parameters.")
    )
    .get_matches();

    TermLogger::init(
        LevelFilter::Info,
        LogConfig::default(),
        TerminalMode::Mixed,
    )
    .expect("Failed to initialize logger");

    let mut params = match matches.value_of("PARAMETERS") {
        Some(path) => {
            let file = File::open(path).unwrap_or_else(|e| {
                error!("Failed to open {}: \"{}\"", path, e);
                quit::with_code(1);
            });

            let params = serde_yaml::from_reader::<_, Parameters>(file).unwrap_or_else(|e| {
                error!("Failed to parse parameters from {}: \"{}\"", path, e);
                quit::with_code(1);
            });

            info!(
                "Successfully loaded run parameters from \"{}\": \n{:#?}",
                path, params
            );

            params
        }
        None => {
            let params = Parameters::default();
            info!("Using default run parameters: \n{:#?}", params);
            params
        }
    };

    if let Some(output) = matches.value_of("OUTPUT") {
        params.output = output.into();
    }
    if let Some(workers) = matches.value_of("WORKERS") {
        params.workers = workers.parse().unwrap_or_else(|e| {
            error!("Invalid worker count \"{}\": \"{}\"", workers, e);
            quit::with_code(1);
        });
    }

    let ranks = parse_ranks(matches.value_of("IPROC"), matches.value_of("NPROC")).unwrap_or_else(
        |e| {
            error!("Error: \"{:#}\"", e);
            quit::with_code(1);
        },
    );

    run(&params, ranks).unwrap_or_else(|e| {
        error!("Error: \"{:#}\"", e);
        quit::with_code(1);
    });
}

fn parse_ranks(iproc: Option<&str>, nproc: Option<&str>) -> Result<Ranks> {
    let parse = |arg: Option<&str>, name: &str| -> Result<usize> {
        match arg {
            Some(s) => s
                .parse()
                .with_context(|| format!("{} \"{}\" is not a positive integer", name, s)),
            None => Ok(1),
        }
    };

    Ok(Ranks::new(parse(iproc, "IPROC")?, parse(nproc, "NPROC")?)?)
}

fn run(params: &Parameters, ranks: Ranks) -> Result<()> {
    params.validate()?;

    let directory = &params.input.directory;
    let dns = DnsInput::from_file(directory.join(&params.input.dns))
        .context("Failed to read solver input")?;
    dns.log_summary(ranks.nproc, params.workers);

    let statistics = Statistics::read(directory.join(&params.input.statistics), dns.ny)
        .context("Failed to read statistics")?;

    let ctx = Context::new(dns, statistics, &params.sampling)?;
    ctx.log_summary(ranks.iproc);
    info!(
        "[{}] Will require {:.3} GiB on disk",
        ranks.iproc,
        ctx.layout.total_bytes() as f64 / (1u64 << 30) as f64
    );

    let mut store = BlockStore::open(&params.output, ctx.layout.clone())?;
    Engine::new(&ctx, ranks, params.workers, params.symmetry)?
        .run(directory, &params.snapshots.indices(), &mut store)
        .context("Failed to accumulate snapshots")?;

    Ok(())
}
