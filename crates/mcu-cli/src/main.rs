use clap::{Parser, Subcommand};
use mcu::{
    commands::{
        config::{self, ConfigAction},
        discover::{self, DiscoverCommand},
        generate::{self, GenerateCommand},
    },
    init_tracing, logger, GlobalOpts,
};

#[derive(Parser)]
#[command(name = "mcu")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Moddable manifest generator",
    long_about = "mcu writes Moddable XS manifest.json files for npm packages and their dependencies."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the manifest tree for a package
    Generate(GenerateCommand),
    /// Show which existing manifest would be reused for a package
    Discover(DiscoverCommand),
    /// Configure the mcu tool
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), cli.global.quiet) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing(&cli.global);

    let result = match cli.command {
        Commands::Generate(cmd) => generate::handle_generate(cmd, &cli.global).map(|_| ()),
        Commands::Discover(cmd) => discover::handle_discover(cmd, &cli.global).map(|_| ()),
        Commands::Config { action } => config::handle_config(action, &cli.global),
    };

    if let Err(e) = result {
        logger::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
