use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mybackup_i18n::config::Config;
use mybackup_i18n::i18n::{
    loader, sync, ts, CatalogSet, CatalogValidator, Language, LookupMetrics, MetricsReport,
    SyncOptions, Translator, ValidationReport,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "mybackup-i18n", version, about = "My Backup message catalog tooling")]
struct Cli {
    /// Translations directory (overrides `MYBACKUP_TRANSLATIONS_DIR`)
    #[arg(long, value_name = "DIR", global = true)]
    dir: Option<PathBuf>,

    /// Catalog file name prefix (overrides `MYBACKUP_CATALOG_PREFIX`)
    #[arg(long, value_name = "PREFIX", global = true)]
    prefix: Option<String>,

    /// Reference language (overrides `MYBACKUP_REFERENCE_LANGUAGE`)
    #[arg(long, value_name = "LANG", global = true)]
    reference: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check every catalog against the reference catalog
    Check {
        /// Fail on warnings as well as errors
        #[arg(long)]
        strict: bool,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show completion statistics per language
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Print the localized text of a message
    Lookup {
        language: String,
        id: String,

        /// Plural count substituted for %n
        #[arg(long)]
        count: Option<u64>,

        /// Values substituted for %1, %2, ...
        #[arg(long = "arg", value_name = "VALUE")]
        args: Vec<String>,

        /// Use the catalogs compiled into the tool instead of the directory
        #[arg(long)]
        bundled: bool,
    },
    /// Bring translations in line with the reference catalog
    Sync {
        /// Language to sync; all translations when omitted
        language: Option<String>,

        /// Remove records the reference no longer defines
        #[arg(long)]
        drop_obsolete: bool,

        /// Report what would change without writing files
        #[arg(long)]
        dry_run: bool,
    },
    /// Rewrite catalogs in the canonical layout
    Normalize {
        /// Catalog files; every catalog of the directory when omitted
        files: Vec<PathBuf>,

        /// Only report files that are not in canonical layout
        #[arg(long)]
        check: bool,
    },
}

fn main() -> Result<ExitCode> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging on stderr so command output stays on stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mybackup_i18n=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = cli.dir {
        config.translations_dir = dir;
    }
    if let Some(prefix) = cli.prefix {
        config.catalog_prefix = prefix;
    }
    if let Some(reference) = cli.reference {
        config.reference_language = reference;
    }

    match cli.command {
        Commands::Check { strict, json } => run_check(&config, strict, json),
        Commands::Stats { json } => run_stats(&config, json),
        Commands::Lookup {
            language,
            id,
            count,
            args,
            bundled,
        } => run_lookup(&config, &language, &id, count, &args, bundled),
        Commands::Sync {
            language,
            drop_obsolete,
            dry_run,
        } => run_sync(&config, language.as_deref(), drop_obsolete, dry_run),
        Commands::Normalize { files, check } => run_normalize(&config, files, check),
    }
}

fn load_set(config: &Config) -> Result<CatalogSet> {
    CatalogSet::load_dir(
        &config.translations_dir,
        &config.catalog_prefix,
        &config.reference_language,
    )
}

fn run_check(config: &Config, strict: bool, json: bool) -> Result<ExitCode> {
    let set = load_set(config)?;
    let reference = &set.reference.catalog;

    let mut reports: BTreeMap<String, ValidationReport> = BTreeMap::new();
    let mut reference_report = CatalogValidator::validate_records(reference);
    if reference.language != set.reference.language {
        reference_report.warnings.push(format!(
            "Catalog declares language '{}', expected '{}'",
            reference.language, set.reference.language
        ));
    }
    reports.insert(set.reference.language.clone(), reference_report);

    for (language, file) in &set.translations {
        let report = CatalogValidator::validate_file(reference, &file.catalog, language);
        reports.insert(language.clone(), report);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for (language, report) in &reports {
            if report.is_clean() {
                println!("{}: ok", language);
                continue;
            }
            println!(
                "{}: {} error(s), {} warning(s)",
                language,
                report.errors.len(),
                report.warnings.len()
            );
            for error in &report.errors {
                println!("  error: {}", error);
            }
            for warning in &report.warnings {
                println!("  warning: {}", warning);
            }
        }
    }

    let errors: usize = reports.values().map(|r| r.errors.len()).sum();
    let warnings: usize = reports.values().map(|r| r.warnings.len()).sum();
    info!(
        "Checked {} catalogs: {} errors, {} warnings",
        reports.len(),
        errors,
        warnings
    );

    if errors > 0 || (strict && warnings > 0) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn run_stats(config: &Config, json: bool) -> Result<ExitCode> {
    let set = load_set(config)?;
    let reference = &set.reference.catalog;

    let reports: Vec<MetricsReport> = set
        .translations
        .values()
        .map(|file| MetricsReport::compute(reference, &file.catalog))
        .collect();

    if json {
        let output = serde_json::json!({
            "generated_at": chrono::Utc::now().to_rfc3339(),
            "reference": set.reference.language,
            "catalogs": reports,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "{:<8} {:>6} {:>10} {:>8} {:>6} {:>8}",
            "lang", "done", "unfinished", "missing", "extra", "percent"
        );
        for report in &reports {
            println!(
                "{:<8} {:>6} {:>10} {:>8} {:>6} {:>7.1}%",
                report.language,
                report.translated,
                report.unfinished,
                report.missing,
                report.extra,
                report.completion_rate
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run_lookup(
    config: &Config,
    language: &str,
    id: &str,
    count: Option<u64>,
    args: &[String],
    bundled: bool,
) -> Result<ExitCode> {
    let translator = if bundled {
        Translator::bundled(Language::from_code(language)?)?
    } else {
        let set = load_set(config)?;
        let catalog = match set.get(language) {
            Some(file) => file.catalog.clone(),
            None => bail!(
                "No catalog for language '{}' in {}",
                language,
                config.translations_dir.display()
            ),
        };
        Translator::new(set.reference.catalog, Some(catalog))
    };

    if !translator.contains(id) {
        warn!("Message '{}' is not defined by any catalog", id);
    }

    let text = match count {
        Some(n) => translator.tr_n(id, n),
        None => translator.tr(id).to_string(),
    };
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    println!("{}", Translator::arg(&text, &args));

    let metrics = LookupMetrics::global().report();
    info!(
        "Lookup resolved: {} translated, {} reference fallback, {} unknown",
        metrics.translated_hits, metrics.reference_fallbacks, metrics.unknown_ids
    );

    Ok(ExitCode::SUCCESS)
}

fn run_sync(
    config: &Config,
    language: Option<&str>,
    drop_obsolete: bool,
    dry_run: bool,
) -> Result<ExitCode> {
    let set = load_set(config)?;
    let options = SyncOptions { drop_obsolete };

    let targets: Vec<_> = match language {
        Some(language) => match set.translations.get(language) {
            Some(file) => vec![file],
            None => bail!("No translation catalog for language '{}'", language),
        },
        None => set.translations.values().collect(),
    };

    for file in targets {
        let (synced, summary) = sync::sync(&set.reference.catalog, &file.catalog, options);
        println!(
            "{}: {} kept, {} added, {} updated, {} revived, {} retired, {} dropped",
            file.language,
            summary.kept,
            summary.added,
            summary.updated,
            summary.revived,
            summary.retired,
            summary.dropped
        );

        if dry_run || !summary.has_changes() {
            continue;
        }
        loader::save_file(&file.path, &synced)?;
        info!("Wrote {}", file.path.display());
    }

    Ok(ExitCode::SUCCESS)
}

fn run_normalize(config: &Config, files: Vec<PathBuf>, check: bool) -> Result<ExitCode> {
    let paths = if files.is_empty() {
        let set = load_set(config)?;
        std::iter::once(set.reference.path)
            .chain(set.translations.into_values().map(|file| file.path))
            .collect()
    } else {
        files
    };

    let mut unnormalized = 0;
    for path in &paths {
        let document = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        let catalog = ts::parse(&document)
            .with_context(|| format!("Failed to parse catalog {}", path.display()))?;
        let normalized = ts::write(&catalog);

        if normalized == document {
            continue;
        }
        unnormalized += 1;
        if check {
            println!("{}: not in canonical layout", path.display());
        } else {
            loader::save_file(path, &catalog)?;
            println!("{}: rewritten", path.display());
        }
    }

    info!(
        "{} of {} catalogs needed normalizing",
        unnormalized,
        paths.len()
    );

    if check && unnormalized > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
