use clap::{Parser, ValueEnum};
use log::debug;
use std::{io, process::ExitCode};
use vkprobe::{probe, InstanceRequest, ProbeError, ProbeOptions, ProbeStage, Session, VulkanLoader};

/// Print what the Vulkan loader offers, then create an instance with a debug
/// messenger attached.
#[derive(Parser)]
#[command(name = "vkprobe", version, about, long_about = None)]
struct Cli {
    /// Last stage to run.
    #[arg(short, long, value_enum, default_value_t = Stage::Instance)]
    stage: Stage,
    /// Application name advertised at instance creation.
    #[arg(long, default_value = "vkprobe")]
    app_name: String,
}

#[derive(Copy, Clone, ValueEnum)]
enum Stage {
    Version,
    Layers,
    Extensions,
    Instance,
}

impl From<Stage> for ProbeStage {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Version => ProbeStage::Version,
            Stage::Layers => ProbeStage::Layers,
            Stage::Extensions => ProbeStage::Extensions,
            Stage::Instance => ProbeStage::Instance,
        }
    }
}

fn run(cli: Cli) -> Result<(), ProbeError> {
    let options = ProbeOptions::new()
        .stage(cli.stage.into())
        .instance_request(InstanceRequest::new().app_name(&cli.app_name)?);

    // Dropped on every return path below, destroying the instance if one
    // was created.
    let mut session = Session::new();
    session.bootstrap(VulkanLoader::load)?;

    // Unlocked: the debug callback may write from driver threads while the
    // instance is created or destroyed. The version line is written before
    // any instance exists, so stdout's buffer is already in place by then.
    let mut stdout = io::stdout();
    probe::run(&mut session, &options, &mut stdout)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(err) = &result {
        eprintln!("{err}");
    }

    let status = probe::exit_status(&result);
    debug!("exiting with status {status}");
    ExitCode::from(status)
}
