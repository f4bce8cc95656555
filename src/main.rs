use clap::{Parser, Subcommand};
use docpress::config::{self, BuildConfig, ConfigError, PathOverrides};
use docpress::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use docpress::routes::{RouteManifest, RoutesError};
use docpress::{output, pipeline};
use log::LevelFilter;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "docpress")]
#[command(about = "Route manifest compiler and meta description extractor for documentation sites")]
#[command(long_about = "\
Route manifest compiler and meta description extractor for documentation sites

Compiles declarative route trees into a validated manifest and derives a
short meta description for every markdown page.

Project structure:

  my-site/
  ├── docpress.toml                # Project config (optional)
  ├── routes.json                  # Route declarations (or routes.toml)
  └── docs/
      ├── intro.md                 # Page; front matter may set id/title/description
      └── guides/
          └── install.md

Description resolution (first available wins):
  Front matter `description` → first 160 characters of body prose

Run 'docpress gen-config' to generate a documented docpress.toml.")]
#[command(version)]
struct Cli {
    /// Project config file (default: ./docpress.toml when present)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Route declaration file, overrides `routes_file`
    #[arg(long, global = true)]
    routes: Option<PathBuf>,

    /// Content directory, overrides `content_dir`
    #[arg(long, global = true)]
    content: Option<PathBuf>,

    /// Output directory, overrides `output_dir`
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile route declarations into manifest.json
    Compile,
    /// Derive meta descriptions into descriptions.json
    Describe,
    /// Run the full pipeline: compile → describe
    Build,
    /// Validate routes and content without writing anything
    Check,
    /// Print a stock docpress.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match cli.command {
        Command::Compile => {
            let config = resolve_config(&cli)?;
            let manifest = compile(&config)?;
            let path = config.output_dir.join(pipeline::MANIFEST_FILE);
            pipeline::write_json(&path, &manifest)?;
            output::print_compile_output(&manifest);
            log::info!("wrote {}", path.display());
        }
        Command::Describe => {
            let config = resolve_config(&cli)?;
            let (descriptions, diagnostics) =
                pipeline::describe_content(&config.content_dir, config.description)?;
            report(diagnostics);
            let path = config.output_dir.join(pipeline::DESCRIPTIONS_FILE);
            pipeline::write_json(&path, &descriptions)?;
            output::print_describe_output(&descriptions);
            log::info!("wrote {}", path.display());
        }
        Command::Build => {
            let config = resolve_config(&cli)?;
            println!("==> Building into {}", config.output_dir.display());
            let result = pipeline::build(&config).inspect_err(log_route_location)?;
            report(result.diagnostics.clone());
            output::print_build_output(&result);
            println!("==> Build complete");
        }
        Command::Check => {
            let config = resolve_config(&cli)?;
            println!("==> Checking {}", config.routes_file.display());
            let manifest = compile(&config)?;
            output::print_compile_output(&manifest);
            println!("==> Checking {}", config.content_dir.display());
            let (descriptions, diagnostics) =
                pipeline::describe_content(&config.content_dir, config.description)?;
            output::print_describe_output(&descriptions);
            let warnings = diagnostics.len();
            report(diagnostics);
            if warnings == 0 {
                println!("==> Project is valid");
            } else {
                println!("==> Project is valid ({warnings} warnings)");
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the project config with CLI path overrides as the top layer.
///
/// Config paths are relative to the config file's directory; CLI paths are
/// relative to the working directory.
fn resolve_config(cli: &Cli) -> Result<BuildConfig, ConfigError> {
    let overrides = PathOverrides {
        routes_file: cli.routes.clone(),
        content_dir: cli.content.clone(),
        output_dir: cli.output.clone(),
    }
    .anchored(&std::env::current_dir()?);
    config::load_layered(Path::new("."), cli.config.as_deref(), &overrides)
}

fn compile(config: &BuildConfig) -> Result<RouteManifest, RoutesError> {
    pipeline::compile_routes(&config.routes_file).inspect_err(|err| {
        if let RoutesError::Validation(e) = err {
            log::error!("invalid route declaration at {}", e.location());
        }
    })
}

fn log_route_location(err: &pipeline::BuildError) {
    if let pipeline::BuildError::Routes(RoutesError::Validation(e)) = err {
        log::error!("invalid route declaration at {}", e.location());
    }
}

fn report(diagnostics: Vec<Diagnostic>) {
    let mut sink = LogSink;
    for diagnostic in diagnostics {
        sink.report(diagnostic);
    }
}
