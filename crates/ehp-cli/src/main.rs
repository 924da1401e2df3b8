mod report;
mod server;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use ehp_core::{
    Category, Dataset, LIMIT_PAGE, ModuleState, ReferenceTables, Truncation, ass_view,
    check_integrity, check_reference_tables, ehp_view, import_json, infer_differentials,
    inspect_differential, inspect_generator,
};
use ehp_store::{Catalog, ViewOverrides};
use serde::Serialize;

use report::{VerifyReport, format_inferred, projection_report};

#[derive(Parser)]
#[command(name = "ehp", about = "Synthetic EHP spectral sequence engine CLI and HTTP server")]
struct Cli {
    /// Data directory (default: $EHP_DATA_DIR, then ~/.ehp-chart)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Dataset to operate on (default: config default_dataset, or the only one)
    #[arg(long, global = true)]
    dataset: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a JSON dataset into the catalog
    Import {
        /// Input file path
        path: PathBuf,

        /// Catalog name (default: the file stem)
        #[arg(long)]
        name: Option<String>,
    },

    /// List imported datasets
    List,

    /// Export a dataset to a JSON file
    Export {
        /// Output file path
        path: PathBuf,
    },

    /// Remove a dataset from the catalog
    Delete {
        /// Catalog name
        name: String,
    },

    /// Check integrity and compare E∞ with the stable stems
    Verify {
        /// Check a JSON file instead of a catalog dataset
        #[arg(long)]
        file: Option<PathBuf>,

        /// Also fail on integrity errors and stem mismatches
        #[arg(long)]
        strict: bool,
    },

    /// List the classes alive on a page
    Project(ViewArgs),

    /// Infer Adams differentials from algebraic and synthetic E∞
    Infer(TruncationArgs),

    /// Describe a generator, or the differential between two generators
    Inspect {
        /// Generator name
        generator: String,

        /// Target generator; inspects the differential `generator -> to`
        #[arg(long)]
        to: Option<String>,
    },

    /// Build the EHP chart (dots and lines) for a page
    View(ViewArgs),

    /// List the permanent classes on the Adams chart
    Ass(TruncationArgs),

    /// Serve the HTTP JSON API
    Serve {
        /// Listen address (default: [server] listen from config.toml)
        #[arg(long)]
        listen: Option<String>,
    },
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// synthetic, algebraic or geometric
    #[arg(long)]
    category: Option<Category>,

    /// Page to view
    #[arg(long, conflicts_with = "limit")]
    page: Option<i32>,

    /// View E∞
    #[arg(long)]
    limit: bool,

    /// Only differentials on the viewed page
    #[arg(long)]
    exact: bool,

    /// Apply tau multiplications on the synthetic limit page
    #[arg(long)]
    tau: bool,

    /// Seed only stems within one of this stem
    #[arg(long)]
    stem: Option<i32>,

    #[command(flatten)]
    truncation: TruncationArgs,
}

#[derive(Args, Debug)]
struct TruncationArgs {
    /// Exclusive upper bound on the sphere index
    #[arg(long)]
    top: Option<i32>,

    /// Inclusive lower bound on the sphere index
    #[arg(long)]
    bottom: Option<i32>,
}

impl ViewArgs {
    fn overrides(&self) -> ViewOverrides {
        ViewOverrides {
            category: self.category,
            page: if self.limit { Some(LIMIT_PAGE) } else { self.page },
            all_diffs: self.exact.then_some(false),
            top: self.truncation.top,
            bottom: self.truncation.bottom,
            stem: self.stem,
            tau: self.tau.then_some(true),
        }
    }
}

fn data_dir(cli: &Cli) -> Option<PathBuf> {
    cli.data_dir
        .clone()
        .or_else(|| std::env::var("EHP_DATA_DIR").ok().map(PathBuf::from))
}

fn open_catalog(cli: &Cli) -> Result<Catalog> {
    Catalog::open(data_dir(cli).as_deref()).context("failed to open dataset catalog")
}

fn load_dataset(cli: &Cli, catalog: &Catalog) -> Result<(String, Dataset)> {
    let name = catalog.resolve_name(cli.dataset.as_deref())?;
    let dataset = catalog
        .load(&name)
        .with_context(|| format!("failed to load dataset '{name}'"))?;
    Ok((name, dataset))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Import { path, name } => cmd_import(&cli, path, name.as_deref()),
        Commands::List => cmd_list(&cli),
        Commands::Export { path } => cmd_export(&cli, path),
        Commands::Delete { name } => cmd_delete(&cli, name),
        Commands::Verify { file, strict } => cmd_verify(&cli, file.as_deref(), *strict),
        Commands::Project(args) => cmd_project(&cli, args),
        Commands::Infer(args) => cmd_infer(&cli, args),
        Commands::Inspect { generator, to } => cmd_inspect(&cli, generator, to.as_deref()),
        Commands::View(args) => cmd_view(&cli, args),
        Commands::Ass(args) => cmd_ass(&cli, args),
        Commands::Serve { listen } => cmd_serve(&cli, listen.as_deref()).await,
    }
}

fn cmd_import(cli: &Cli, path: &Path, name: Option<&str>) -> Result<()> {
    let catalog = open_catalog(cli)?;
    let name = match name {
        Some(name) => name.to_string(),
        None => path
            .file_stem()
            .and_then(|s| s.to_str())
            .context("cannot derive a dataset name from the path, pass --name")?
            .to_string(),
    };

    let dataset = catalog
        .import_json_file(&name, path)
        .with_context(|| format!("failed to import {}", path.display()))?;

    println!(
        "imported {} as '{name}': {} generators, {} differentials",
        path.display(),
        dataset.len(),
        dataset.differentials().len()
    );
    Ok(())
}

fn cmd_list(cli: &Cli) -> Result<()> {
    let catalog = open_catalog(cli)?;
    let datasets = catalog.list()?;

    if cli.json {
        return print_json(&datasets);
    }
    if datasets.is_empty() {
        println!("(no datasets)");
    }
    for d in &datasets {
        println!(
            "{:<16} generators={:<6} differentials={:<6} imported={}",
            d.name, d.generators, d.differentials, d.imported_at
        );
    }
    Ok(())
}

fn cmd_export(cli: &Cli, path: &Path) -> Result<()> {
    let catalog = open_catalog(cli)?;
    let name = catalog.resolve_name(cli.dataset.as_deref())?;
    catalog
        .export_json_file(&name, path)
        .with_context(|| format!("failed to export '{name}'"))?;

    println!("exported '{name}' to {}", path.display());
    Ok(())
}

fn cmd_delete(cli: &Cli, name: &str) -> Result<()> {
    let catalog = open_catalog(cli)?;
    if !catalog.delete(name)? {
        bail!("dataset '{name}' not found");
    }
    println!("deleted '{name}'");
    Ok(())
}

fn cmd_verify(cli: &Cli, file: Option<&Path>, strict: bool) -> Result<()> {
    let (label, dataset) = match file {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let dataset = import_json(&json)
                .with_context(|| format!("failed to parse {}", path.display()))?;
            (path.display().to_string(), dataset)
        }
        // Load without the catalog's integrity gate so fatal issues are reported here.
        None => {
            let catalog = open_catalog(cli)?;
            let name = catalog.resolve_name(cli.dataset.as_deref())?;
            let dataset = catalog.store().load_dataset(&name)?;
            (name, dataset)
        }
    };

    let integrity = check_integrity(&dataset);
    let mismatches = integrity
        .is_valid()
        .then(|| check_reference_tables(&dataset, &ReferenceTables::STABLE));
    let report = VerifyReport::new(&integrity, mismatches.as_deref());

    if cli.json {
        print_json(&report)?;
    } else {
        for issue in &report.issues {
            println!("{issue}");
        }
        for m in report.stem_mismatches.iter().flatten() {
            println!("{m}");
        }
        println!(
            "{label}: {} fatal, {} errors, {} warnings, {} stem mismatches",
            report.fatal,
            report.errors,
            report.warnings,
            report.stem_mismatches.as_ref().map_or(0, Vec::len)
        );
    }

    if !report.valid {
        bail!("{label} has fatal integrity issues");
    }
    if strict && (report.errors > 0 || mismatches.is_some_and(|m| !m.is_empty())) {
        bail!("{label} failed strict verification");
    }
    Ok(())
}

fn cmd_project(cli: &Cli, args: &ViewArgs) -> Result<()> {
    let catalog = open_catalog(cli)?;
    let (name, dataset) = load_dataset(cli, &catalog)?;
    let view = catalog.config().view.resolve(&args.overrides());
    let report = projection_report(&dataset, &view);

    if cli.json {
        return print_json(&report);
    }
    println!(
        "{name}: {} E{} ({} alive of {} seeded)",
        view.category,
        view.page,
        report.alive.len(),
        report.seeded
    );
    for class in &report.alive {
        println!(
            "  {:<16} x={:<4} y={:<4} af={:<4} {}",
            class.name, class.x, class.y, class.filtration, class.module
        );
    }
    Ok(())
}

fn cmd_infer(cli: &Cli, args: &TruncationArgs) -> Result<()> {
    let catalog = open_catalog(cli)?;
    let (_, dataset) = load_dataset(cli, &catalog)?;
    let diagram = infer_differentials(&dataset, Truncation::new(args.top, args.bottom));

    if cli.json {
        return print_json(&diagram);
    }
    if diagram.edges.is_empty() {
        println!("(no inferred differentials)");
    }
    for line in format_inferred(&diagram) {
        println!("{line}");
    }
    Ok(())
}

fn cmd_inspect(cli: &Cli, generator: &str, to: Option<&str>) -> Result<()> {
    let catalog = open_catalog(cli)?;
    let (name, dataset) = load_dataset(cli, &catalog)?;

    if let Some(to) = to {
        let info = inspect_differential(&dataset, generator, to)
            .with_context(|| format!("no differential {generator} -> {to} in '{name}'"))?;
        if cli.json {
            return print_json(&info);
        }
        println!("{} -> {}", info.from, info.to);
        println!("page:        {}", info.page);
        println!("coefficient: {}", info.coefficient);
        println!("synthetic:   {}", info.synthetic_only);
        if let Some(proof) = &info.proof {
            println!("proof:       {proof}");
        }
        return Ok(());
    }

    let info = inspect_generator(&dataset, generator)
        .with_context(|| format!("generator '{generator}' not found in '{name}'"))?;
    if cli.json {
        return print_json(&info);
    }
    println!("name:        {}", info.name);
    println!("position:    ({}, {}), af {}", info.x, info.y, info.adams_filtration);
    println!("module:      {}", info.module);
    if let Some(alg) = &info.alg_name {
        println!("algebraic:   {alg}");
    }
    if let Some(hom) = &info.hom_name {
        println!("homotopy:    {hom}");
    }
    for (sphere, label) in &info.induced_name {
        println!("on S^{sphere:<5}  {label}");
    }
    println!("lifecycle:   {}", info.lifecycle);
    println!("generated:   {}", info.generated_by);
    println!("generating:  {}", info.generating_name);
    if !info.generates.is_empty() {
        println!("generates:   {}", info.generates.join(", "));
    }
    Ok(())
}

fn cmd_view(cli: &Cli, args: &ViewArgs) -> Result<()> {
    let catalog = open_catalog(cli)?;
    let (name, dataset) = load_dataset(cli, &catalog)?;
    let view = catalog.config().view.resolve(&args.overrides());
    let chart = ehp_view(&dataset, &view);

    if cli.json {
        return print_json(&chart);
    }
    println!(
        "{name}: {} E{}: {} dots, {} differentials, {} multiplications, {} tau multiplications",
        view.category,
        view.page,
        chart.dots.len(),
        chart.differentials.len(),
        chart.multiplications.len(),
        chart.tau_mults.len()
    );
    for dot in &chart.dots {
        let marker = if dot.permanent { "*" } else { " " };
        println!("{marker} {:<16} ({}, {}) {}", dot.name, dot.x, dot.y, dot.module);
    }
    for line in &chart.differentials {
        println!("  {} -> {}  E{}  coeff {}", line.from, line.to, line.page, line.coeff);
    }
    Ok(())
}

fn cmd_ass(cli: &Cli, args: &TruncationArgs) -> Result<()> {
    let catalog = open_catalog(cli)?;
    let (_, dataset) = load_dataset(cli, &catalog)?;
    let classes = ass_view(&dataset, Truncation::new(args.top, args.bottom));

    if cli.json {
        return print_json(&classes);
    }
    for g in &classes {
        let module = ModuleState::from_raw(g.torsion);
        println!("{:<16} ({}, {}) {module}", g.name, g.x, g.y);
    }
    Ok(())
}

async fn cmd_serve(cli: &Cli, listen: Option<&str>) -> Result<()> {
    let catalog = open_catalog(cli)?;
    let datasets = catalog.load_all().context("failed to load datasets")?;
    let listen = listen
        .map(str::to_string)
        .unwrap_or_else(|| catalog.config().server.listen.clone());

    tracing::info!("serving {} dataset(s)", datasets.len());
    let state = server::AppState::new(datasets, catalog.config().view.clone());
    server::serve(&listen, state).await
}
