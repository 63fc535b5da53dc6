use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use schemapack::deploy_script::generate_dump;
use schemapack::display::print_objects;
use schemapack::filter::{FilterPolicy, SchemaFilter};
use schemapack::model::{Model, ObjectKind, ScopeFilter};
use schemapack::package::{build_package, load_package, load_package_as_model, PackageMetadata};
use schemapack::parser::parse_script_file;
use schemapack::pg::{deploy, extract, PgConnection};
use schemapack::sample::{
    run_demo, sample_metadata, sample_model, DemoOptions, DEFAULT_DATABASE_URL,
    EXTRACTED_PACKAGE, UNFILTERED_PACKAGE,
};
use std::path::PathBuf;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "schemapack")]
#[command(about = "Build, filter, deploy and extract PostgreSQL schema packages", long_about = None)]
#[command(version)]
struct Cli {
    /// Target database connection URL
    #[arg(long, global = true, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database: String,

    /// Directory the demo writes its package files to
    #[arg(long, global = true, default_value = ".")]
    work_dir: PathBuf,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, global = true, default_value = "info")]
    verbosity: String,

    /// Log format: text or json
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full sample: build, filter, deploy, extract (default)
    Demo,

    /// Build a package from SQL script files, or from the sample scripts
    Build {
        #[arg(long, default_value = UNFILTERED_PACKAGE)]
        output: PathBuf,
        #[arg(long = "script")]
        scripts: Vec<PathBuf>,
        #[arg(long, default_value = "schemapack-sample")]
        name: String,
        #[arg(long = "package-version", default_value = "1.0.0")]
        version: String,
    },

    /// Filter a package by schema membership into a new package
    Filter {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long = "schema", required = true)]
        schemas: Vec<String>,
        #[arg(long, default_value_t = FilterPolicy::Exclude)]
        policy: FilterPolicy,
    },

    /// Print the objects of a package
    List {
        package: PathBuf,
        #[arg(long = "kind")]
        kinds: Vec<ObjectKind>,
    },

    /// Deploy a package to the target database
    Deploy { package: PathBuf },

    /// Print the DDL a deploy of the package would run
    Script {
        package: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        header: Option<String>,
    },

    /// Extract the target database into a package
    Extract {
        #[arg(long, default_value = EXTRACTED_PACKAGE)]
        output: PathBuf,
        #[arg(long, default_value = "schemapack-extracted")]
        name: String,
        #[arg(long = "package-version", default_value = "1.0.0")]
        version: String,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.verbosity, &cli.log_format);

    match cli.command.unwrap_or(Commands::Demo) {
        Commands::Demo => {
            let options = DemoOptions::new(cli.database, cli.work_dir);
            let report = run_demo(&options).await.context("Sample workflow failed")?;
            info!(
                deployed = report.deployed.statements_executed,
                extracted = report.extracted.objects.len(),
                "sample workflow finished"
            );
            Ok(())
        }
        Commands::Build {
            output,
            scripts,
            name,
            version,
        } => {
            let model = if scripts.is_empty() {
                sample_model()?
            } else {
                let mut model = Model::new();
                for script in &scripts {
                    for object in parse_script_file(script)
                        .with_context(|| format!("Failed to parse {}", script.display()))?
                    {
                        model.add_object(object);
                    }
                }
                model
            };
            let sample = sample_metadata();
            let metadata = if scripts.is_empty()
                && name == sample.name
                && version == sample.version
            {
                sample
            } else {
                PackageMetadata::new(name, version)
            };
            let package = build_package(&output, &model, metadata)?;
            println!(
                "Built {} with {} objects",
                output.display(),
                package.objects.len()
            );
            Ok(())
        }
        Commands::Filter {
            input,
            output,
            schemas,
            policy,
        } => {
            let package = load_package(&input)
                .with_context(|| format!("Failed to load {}", input.display()))?;
            let filter = SchemaFilter::new(&schemas).with_policy(policy);
            let filtered = package.model().filtered(&filter);
            let written = build_package(&output, &filtered, package.metadata.clone())?;
            println!(
                "Kept {} of {} objects ({policy} {})",
                written.objects.len(),
                package.objects.len(),
                schemas.join(", ")
            );
            Ok(())
        }
        Commands::List { package, kinds } => {
            let model = load_package_as_model(&package)
                .with_context(|| format!("Failed to load {}", package.display()))?;
            print_objects(
                &format!("{}:", package.display()),
                model.objects(ScopeFilter::All, &kinds),
            )?;
            Ok(())
        }
        Commands::Deploy { package } => {
            let package = load_package(&package)
                .with_context(|| format!("Failed to load {}", package.display()))?;
            let connection = PgConnection::new(&cli.database).await?;
            let report = deploy(&package, &connection).await?;
            println!(
                "Deployed {} ({} statements)",
                report.package, report.statements_executed
            );
            Ok(())
        }
        Commands::Script { package, header } => {
            let model = load_package_as_model(&package)
                .with_context(|| format!("Failed to load {}", package.display()))?;
            print!("{}", generate_dump(&model, header.as_deref()));
            Ok(())
        }
        Commands::Extract {
            output,
            name,
            version,
        } => {
            let connection = PgConnection::new(&cli.database).await?;
            let package = extract(&output, &connection, &name, &version).await?;
            println!(
                "Extracted {} objects to {}",
                package.objects.len(),
                output.display()
            );
            Ok(())
        }
    }
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

