mod config;

use anyhow::{Context, Result};
use azscript_core::defaults::default_mapping;
use azscript_core::{ConfigValue, Environment, SectionRegistry};
use azscript_policy::Policy;
use clap::{ArgAction, Parser, Subcommand};
use secrecy::ExposeSecret;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Debug)]
#[command(author, version, about="azscript: Azure CLI deployment script generator for the ANPI bot")]
struct Cli {
    /// AGE identities (for .age config files)
    #[arg(long="age-identity", global = true)]
    age_ids: Vec<PathBuf>,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Render the deployment script from a config file
    Generate {
        /// Config file (YAML, JSON, or .age)
        #[arg(short, long)] file: PathBuf,
        /// Target environment, overriding the file
        #[arg(long)] env: Option<Environment>,
        /// Override one key (repeatable)
        #[arg(long = "set", value_parser = config::parse_override)] sets: Vec<(String, ConfigValue)>,
        /// Print one registry entry instead of the complete script
        #[arg(long)] section: Option<String>,
        /// Write every entry as <key>.sh into this directory
        #[arg(short, long)] out: Option<PathBuf>,
        #[arg(long)] markdown: Option<PathBuf>,
        #[arg(long)] json: Option<PathBuf>,
        /// Fail when a resource name lacks the environment placeholder
        #[arg(long, default_value_t=false)] strict_placeholders: bool,
    },
    /// Write a starter config with default values
    Init {
        #[arg(long)] env: Environment,
        #[arg(short, long)] out: Option<PathBuf>,
        /// Fill jwt_secret_key with a fresh random secret
        #[arg(long, default_value_t=false)] generate_secret: bool,
    },
    /// Print a random JWT signing secret
    Secret,
    /// Check that az and bash are on PATH
    Preflight,
}

fn log_level(verbose: u8) -> Level {
    match verbose { 0 => Level::INFO, 1 => Level::DEBUG, _ => Level::TRACE }
}

fn pick<'a>(reg: &'a SectionRegistry, section: Option<&str>) -> Result<&'a str> {
    match section {
        None => Ok(reg.complete()),
        Some(key) => reg.get(key).with_context(|| {
            format!("unknown section '{key}'; expected one of {}", SectionRegistry::keys().collect::<Vec<_>>().join(", "))
        }),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_max_level(log_level(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Cmd::Generate { file, env, sets, section, out, markdown, json, strict_placeholders } => {
            let policy = Policy::new(strict_placeholders);
            let mut mapping = config::load(&file, &cli.age_ids)?;
            config::apply_overrides(&mut mapping, env, &sets);

            let generated_at = chrono::Local::now().naive_local();
            let generated = azscript_azure::generate_with_report(&mapping, generated_at)
                .with_context(|| format!("generate deployment script from {}", file.display()))?;
            policy.check_placeholders(&generated.normalized)?;
            policy.check_registry(&generated.registry)?;
            let reg = &generated.registry;

            let text = pick(reg, section.as_deref())?;
            if let Some(dir) = &out { azscript_export::write_registry(reg, dir)?; }
            if let Some(p) = &markdown { azscript_export::write_markdown(reg, p)?; }
            if let Some(p) = &json { azscript_export::write_json(reg, p)?; }
            if section.is_some() || (out.is_none() && markdown.is_none() && json.is_none()) {
                print!("{text}");
            }
            info!(env = %reg.environment(), "generation finished");
        }
        Cmd::Init { env, out, generate_secret } => {
            let mut mapping = default_mapping(env);
            if generate_secret {
                let secret = azscript_crypto::generate_signing_secret()?;
                mapping.insert("jwt_secret_key", secret.expose_secret().as_str());
            }
            let yaml = serde_yaml::to_string(&mapping)?;
            match out {
                Some(p) => {
                    std::fs::write(&p, yaml).with_context(|| format!("write {}", p.display()))?;
                    info!(path = %p.display(), env = %env, "wrote starter config");
                }
                None => print!("{yaml}"),
            }
        }
        Cmd::Secret => {
            let secret = azscript_crypto::generate_signing_secret()?;
            println!("{}", secret.expose_secret());
        }
        Cmd::Preflight => {
            for t in azscript_export::preflight() {
                match &t.path {
                    Some(p) => println!("ok       {:<5} {}", t.name, p.display()),
                    None => println!("missing  {}", t.name),
                }
            }
            azscript_export::require_tools()?;
        }
    }
    Ok(())
}
