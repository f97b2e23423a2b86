use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use bank_feature_repo::catalog::{apply_repo, count_objects, list_apply_events, open_catalog};
use bank_feature_repo::{
    init_tracing, read_sample_data, validate_repo, write_sample_data, DataQualityEngine, FeatureRepo,
    GeneratorConfig, OutputFormat, RepoConfig, ResourceKind, SampleDataGenerator, Severity,
};

/// Banking feature store: sample data, definitions, and catalog
#[derive(Parser, Debug)]
#[command(name = "bank-feature-repo", version, about, long_about = None)]
struct Cli {
    /// Configuration file base name (extension optional)
    #[arg(short, long, default_value = "feature_store")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the synthetic banking datasets
    Generate {
        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// parquet or csv
        #[arg(short, long)]
        format: Option<OutputFormat>,
        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Use small record counts
        #[arg(long)]
        small: bool,
    },
    /// Check feature definitions for structural errors
    Validate {
        /// Also print informational notes
        #[arg(short, long)]
        verbose: bool,
    },
    /// Run data quality checks over generated files
    Check {
        /// Directory holding the generated files
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        format: Option<OutputFormat>,
        /// Skip comparing row counts with the configured counts
        #[arg(long)]
        any_count: bool,
    },
    /// Snapshot validated definitions into the catalog
    Apply {
        /// Catalog database path
        #[arg(short, long)]
        registry: Option<PathBuf>,
    },
    /// Print definitions as JSON (or YAML)
    Describe {
        /// Restrict to one kind (entity, data_source, feature_view, ...)
        #[arg(short, long)]
        kind: Option<ResourceKind>,
        /// Object name
        name: Option<String>,
        #[arg(long)]
        yaml: bool,
    },
    /// Show effective access per group
    Permissions {
        /// Group to list access for; all groups when omitted
        #[arg(short, long)]
        group: Option<String>,
    },
    /// Show recent catalog applies
    History {
        #[arg(short, long)]
        registry: Option<PathBuf>,
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    init_tracing("bank_feature_repo=info")?;

    let cli = Cli::parse();
    let config = RepoConfig::load_from(&cli.config)?;
    debug!(?config, "running with configuration");

    let repo = FeatureRepo::banking().with_project(config.project.clone());

    match cli.command {
        Commands::Generate { output, format, seed, small } => {
            let mut generator_config = if small {
                GeneratorConfig {
                    seed: config.generator.seed,
                    anchor: config.generator.anchor,
                    ..GeneratorConfig::small()
                }
            } else {
                config.generator.clone()
            };
            if let Some(seed) = seed {
                generator_config = generator_config.with_seed(seed);
            }
            run_generate(
                generator_config,
                output.unwrap_or_else(|| config.data_dir.clone()),
                format.unwrap_or(config.output_format),
            )
        }
        Commands::Validate { verbose } => run_validate(&repo, verbose),
        Commands::Check { data, format, any_count } => {
            let expected = if any_count { None } else { Some(&config.generator) };
            run_check(
                &repo,
                data.unwrap_or_else(|| config.data_dir.clone()),
                format.unwrap_or(config.output_format),
                expected,
            )
        }
        Commands::Apply { registry } => {
            run_apply(&repo, registry.unwrap_or_else(|| config.registry_path.clone()))
        }
        Commands::Describe { kind, name, yaml } => run_describe(&repo, kind, name.as_deref(), yaml),
        Commands::Permissions { group } => run_permissions(&repo, group.as_deref()),
        Commands::History { registry, limit } => {
            run_history(registry.unwrap_or_else(|| config.registry_path.clone()), limit)
        }
    }
}

fn run_generate(config: GeneratorConfig, output: PathBuf, format: OutputFormat) -> Result<()> {
    println!("🏦 Generating banking sample data");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let mut generator = SampleDataGenerator::new(config);
    let data = generator.generate_all()?;

    println!("\n💾 Writing {} files to {}...", format, output.display());
    let written = write_sample_data(&data, &output, format)?;
    for file in &written {
        println!("✓ {:<14} {:>7} rows → {}", file.dataset.name(), file.rows, file.path.display());
    }

    println!("\n✅ Sample data generated");
    Ok(())
}

fn run_validate(repo: &FeatureRepo, verbose: bool) -> Result<()> {
    println!("🔍 Validating feature definitions for {}", repo.project);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let report = validate_repo(repo);

    for issue in report.errors() {
        println!("❌ {}", issue);
    }
    for issue in report.warnings() {
        println!("⚠️  {}", issue);
    }
    if verbose {
        for issue in report.notes() {
            println!("ℹ️  {}", issue);
        }
    }

    println!("\n{}", report.summary());
    if !report.is_valid() {
        bail!("Feature definitions are invalid ({} errors)", report.errors().count());
    }

    println!("✅ Definitions valid");
    Ok(())
}

fn run_check(
    repo: &FeatureRepo,
    data_dir: PathBuf,
    format: OutputFormat,
    expected: Option<&GeneratorConfig>,
) -> Result<()> {
    println!("📊 Checking data quality in {}", data_dir.display());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let tables = read_sample_data(&data_dir, format)?;
    if tables.is_empty() {
        bail!(
            "No {} files found in {}. Run generate first.",
            format,
            data_dir.display()
        );
    }
    for (dataset, table) in &tables {
        println!("✓ Loaded {:<14} {:>7} rows", dataset.name(), table.row_count);
    }

    let mut engine = DataQualityEngine::from_repo(repo);
    if let Some(config) = expected {
        engine = engine.with_expected_counts(config.expected_counts());
    }
    let report = engine.validate(&tables);

    println!();
    for issue in &report.issues {
        let icon = match issue.severity {
            Severity::Critical => "❌",
            Severity::Warning => "⚠️ ",
            Severity::Info => "ℹ️ ",
        };
        println!("{} {}: {}", icon, issue.field, issue.issue);
        println!("   → {}", issue.recommendation);
    }

    println!("\n{}", report.summary());
    if report.has_critical_issues() {
        bail!("Data quality check found critical issues");
    }

    println!("✅ Data quality check passed");
    Ok(())
}

fn run_apply(repo: &FeatureRepo, registry: PathBuf) -> Result<()> {
    println!("🗄️  Applying {} to {}", repo.project, registry.display());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let report = validate_repo(repo);
    if !report.is_valid() {
        for issue in report.errors() {
            println!("❌ {}", issue);
        }
        bail!("Refusing to apply invalid definitions");
    }
    println!("✓ {}", report.summary());

    let conn = open_catalog(&registry)?;
    let summary = apply_repo(&conn, repo)?;

    println!("✓ Created:   {}", summary.created);
    println!("✓ Updated:   {}", summary.updated);
    println!("✓ Unchanged: {}", summary.unchanged);
    println!("✓ Deleted:   {}", summary.deleted);
    println!("✓ Catalog holds {} objects", count_objects(&conn)?);

    if summary.has_changes() {
        println!("\n✅ Catalog updated (fingerprint {})", &summary.repo_fingerprint[..12]);
    } else {
        println!("\n✅ Catalog already up to date");
    }
    Ok(())
}

fn run_describe(repo: &FeatureRepo, kind: Option<ResourceKind>, name: Option<&str>, yaml: bool) -> Result<()> {
    let value = repo.describe(kind, name)?;
    if yaml {
        print!("{}", serde_yaml::to_string(&value)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}

fn run_permissions(repo: &FeatureRepo, group: Option<&str>) -> Result<()> {
    let permissions = repo.permission_set();
    let groups: Vec<String> = match group {
        Some(g) => vec![g.to_string()],
        None => permissions.groups().into_iter().collect(),
    };

    for group in &groups {
        println!("🔐 {}", group);
        let access = permissions.access_for_group(group, repo.resources());
        if access.is_empty() {
            println!("   (no access)");
        }
        for entry in access {
            let actions: Vec<&str> = entry.actions.iter().map(|a| a.as_str()).collect();
            println!(
                "   {:<24} {:<36} {}",
                entry.kind.as_str(),
                entry.name,
                actions.join(", ")
            );
        }
        println!();
    }
    Ok(())
}

fn run_history(registry: PathBuf, limit: usize) -> Result<()> {
    if !registry.exists() {
        bail!("Catalog not found at {}. Run apply first.", registry.display());
    }
    let conn = open_catalog(&registry)?;
    let events = list_apply_events(&conn, limit)?;

    println!("📜 Last {} applies", events.len());
    for event in events {
        println!(
            "   {}  {}  created={} updated={} deleted={}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.event_id,
            event.data["created"],
            event.data["updated"],
            event.data["deleted"],
        );
    }
    Ok(())
}
