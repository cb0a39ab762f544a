//! Ninite Classic CLI - run Ninite Pro Classic and print its report as records

mod output;
mod settings;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use ninite_core::{AppAudit, AppVersion, ClassicOptions, RecordStream};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use settings::Settings;

const DEFAULT_LOG_FILTER: &str = "ninite=warn";

#[derive(Parser)]
#[command(name = "ninite-classic")]
#[command(about = "Drive Ninite Pro Classic and print its report", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// NinitePro.exe or the directory that contains it (overrides settings)
    #[arg(long, global = true)]
    executable: Option<String>,

    /// Settings file (TOML); defaults to the per-user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print one JSON object per record instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    attributes: AttributeArgs,
}

/// Switches shared by every command
#[derive(Args, Debug, Default)]
struct AttributeArgs {
    /// Locale code, e.g. en-US
    #[arg(long, global = true)]
    locale: Option<String>,

    #[arg(long, global = true)]
    proxy_server: Option<String>,

    #[arg(long, global = true)]
    proxy_port: Option<u16>,

    #[arg(long, global = true)]
    proxy_user: Option<String>,

    #[arg(long, global = true, env = "NINITE_PROXY_PASSWORD", hide_env_values = true)]
    proxy_password: Option<String>,

    /// Apps to act on (comma separated or repeated)
    #[arg(long, global = true, value_delimiter = ',')]
    select: Vec<String>,

    /// Apps to leave alone
    #[arg(long, global = true, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Remote machines, or `file:<path>` listing them
    #[arg(long, global = true, value_delimiter = ',')]
    remote: Vec<String>,

    #[arg(long, global = true)]
    remote_user: Option<String>,

    #[arg(long, global = true, env = "NINITE_REMOTE_PASSWORD", hide_env_values = true)]
    remote_password: Option<String>,

    #[arg(long, global = true)]
    disable_shortcuts: bool,

    #[arg(long, global = true)]
    disable_auto_update: bool,

    /// Install per-user apps for all users where supported
    #[arg(long, global = true)]
    all_users: bool,

    #[arg(long, global = true)]
    cache_path: Option<String>,

    #[arg(long, global = true)]
    no_cache: bool,

    #[arg(long, global = true)]
    clean_cache: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Update installed apps without installing new ones
    UpdateOnly,

    /// Uninstall apps
    Uninstall {
        /// Apps to uninstall, added to any global --select list
        #[arg(required = true)]
        apps: Vec<String>,
    },

    /// Build an offline installer for the selected apps
    Freeze {
        /// Installer file to write
        #[arg(short, long)]
        output: String,

        /// Locales to bundle (repeatable)
        #[arg(long = "freeze-locale")]
        locales: Vec<String>,
    },

    /// List available app versions
    List {
        /// Include versions that must be selected explicitly
        #[arg(long)]
        show_alternate: bool,
    },

    /// Show which apps are installed
    Audit {
        /// Only show installed apps
        #[arg(long)]
        installed: bool,
    },
}

fn init_tracing() {
    let log_format = std::env::var("NINITE_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    // Records go to stdout; logs stay on stderr
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Pick the flag when given, otherwise the setting
fn choose(flag: Option<String>, setting: &str) -> String {
    flag.unwrap_or_else(|| setting.to_string())
}

/// Merge command-line switches over settings into invocation options
fn build_options(args: AttributeArgs, settings: &Settings) -> ClassicOptions {
    let mut options = ClassicOptions::new()
        .locale(choose(args.locale, &settings.locale))
        .proxy(
            choose(args.proxy_server, &settings.proxy.server),
            args.proxy_port.unwrap_or(settings.proxy.port),
        )
        .proxy_auth(
            choose(args.proxy_user, &settings.proxy.username),
            choose(args.proxy_password, &settings.proxy.password),
        )
        .select(args.select)
        .exclude(args.exclude)
        .remote(args.remote)
        .remote_auth(
            choose(args.remote_user, &settings.remote.username),
            choose(args.remote_password, &settings.remote.password),
        )
        .cache_path(choose(args.cache_path, &settings.cache_path));

    if args.disable_shortcuts {
        options = options.disable_shortcuts();
    }
    if args.disable_auto_update {
        options = options.disable_auto_update();
    }
    if args.all_users {
        options = options.all_users();
    }
    if args.no_cache {
        options = options.no_cache();
    }
    if args.clean_cache {
        options = options.clean_cache();
    }

    options
}

/// Apps named after `uninstall` extend any global `--select` list
fn merge_selection(selected: &[String], apps: Vec<String>) -> Vec<String> {
    let mut merged = selected.to_vec();
    for app in apps {
        if !merged.contains(&app) {
            merged.push(app);
        }
    }
    merged
}

fn keep_version(record: &AppVersion, show_alternate: bool) -> bool {
    show_alternate || !record.alternate_version
}

fn keep_audit(record: &AppAudit, installed_only: bool) -> bool {
    !installed_only || record.installed
}

/// Drain a spawned operation. JSON records are printed as they arrive; the
/// rest are returned for table output together with the operation result.
async fn consume<T: Serialize>(
    mut stream: RecordStream<T>,
    json: bool,
    keep: impl Fn(&T) -> bool,
) -> Result<(Vec<T>, ninite_core::Result<()>)> {
    let mut kept = Vec::new();
    while let Some(record) = stream.records.recv().await {
        if !keep(&record) {
            continue;
        }
        if json {
            output::print_json_line(&record)?;
        } else {
            kept.push(record);
        }
    }

    let outcome = stream
        .completion
        .await
        .context("Classic task did not complete")?;
    Ok((kept, outcome))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    let executable = match cli.executable {
        Some(path) => PathBuf::from(shellexpand::tilde(&path).into_owned()),
        None => settings.executable_path(),
    };
    debug!(executable = %executable.display(), "Resolved executable setting");

    let selected = cli.attributes.select.clone();
    let options = build_options(cli.attributes, &settings);
    let classic = ninite_infra_system::open(&executable)
        .with_context(|| format!("Cannot use {}", executable.display()))?
        .with_options(options);

    info!(executable = %classic.executable().display(), "Ninite Classic ready");

    let json = cli.json;
    let outcome = match cli.command {
        Commands::UpdateOnly => {
            let (records, outcome) = consume(classic.spawn_update_only(), json, |_| true).await?;
            if !json {
                output::print_statuses("Update results", records);
            }
            outcome
        }

        Commands::Uninstall { apps } => {
            let classic = classic.select(merge_selection(&selected, apps));
            let (records, outcome) = consume(classic.spawn_uninstall(), json, |_| true).await?;
            if !json {
                output::print_statuses("Uninstall results", records);
            }
            outcome
        }

        Commands::Freeze {
            output: installer,
            locales,
        } => {
            let stream = classic.spawn_freeze(installer.clone(), locales);
            let (records, outcome) = consume(stream, json, |_| true).await?;
            if !json {
                output::print_frozen(&installer, records);
            }
            outcome
        }

        Commands::List { show_alternate } => {
            let (records, outcome) = consume(classic.spawn_list(), json, |r| {
                keep_version(r, show_alternate)
            })
            .await?;
            if !json {
                output::print_versions(records);
            }
            outcome
        }

        Commands::Audit { installed } => {
            let (records, outcome) =
                consume(classic.spawn_audit(), json, |r| keep_audit(r, installed)).await?;
            if !json {
                output::print_audits(records);
            }
            outcome
        }
    };

    outcome.context("Ninite Classic reported a failure")?;

    if !json {
        println!();
        println!("{}", "✓ Done".green().bold());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use settings::{ProxySettings, RemoteSettings};

    fn settings() -> Settings {
        Settings {
            executable: ".".to_string(),
            locale: "en-GB".to_string(),
            cache_path: "D:/cache".to_string(),
            proxy: ProxySettings {
                server: "proxy.corp".to_string(),
                port: 3128,
                username: "svc".to_string(),
                password: "from-settings".to_string(),
            },
            remote: RemoteSettings::default(),
        }
    }

    #[test]
    fn test_settings_fill_missing_flags() {
        let options = build_options(AttributeArgs::default(), &settings());
        let args = options.compose_args();

        assert_eq!(
            args,
            vec![
                "/silent",
                ".",
                "/locale",
                "en-GB",
                "/proxy",
                "proxy.corp",
                "3128",
                "/proxyauth",
                "svc",
                "from-settings",
                "/cachepath",
                "D:/cache",
            ]
        );
    }

    #[test]
    fn test_flags_override_settings() {
        let args = AttributeArgs {
            locale: Some("fr-FR".to_string()),
            proxy_port: Some(0),
            select: vec!["Firefox".to_string()],
            no_cache: true,
            ..AttributeArgs::default()
        };

        let composed = build_options(args, &settings()).compose_args();

        assert!(composed.contains(&"fr-FR".to_string()));
        assert!(!composed.contains(&"/proxy".to_string()));
        assert!(composed.contains(&"/nocache".to_string()));
        assert!(composed.contains(&"Firefox".to_string()));
    }

    #[test]
    fn test_cli_parses_uninstall() {
        let cli = Cli::try_parse_from([
            "ninite-classic",
            "--select",
            "Firefox,Zoom",
            "uninstall",
            "Zoom",
            "Skype",
        ])
        .unwrap();

        let apps = match cli.command {
            Commands::Uninstall { apps } => apps,
            _ => panic!("expected uninstall"),
        };
        assert_eq!(apps, vec!["Zoom", "Skype"]);
        assert_eq!(
            merge_selection(&cli.attributes.select, apps),
            vec!["Firefox", "Zoom", "Skype"]
        );
    }

    #[test]
    fn test_merge_selection_without_global_select() {
        let apps = vec!["Zoom".to_string(), "Zoom".to_string()];
        assert_eq!(merge_selection(&[], apps), vec!["Zoom"]);
    }

    #[test]
    fn test_cli_uninstall_requires_apps() {
        assert!(Cli::try_parse_from(["ninite-classic", "uninstall"]).is_err());
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ninite-classic",
            "list",
            "--show-alternate",
            "--select",
            "Java,VLC",
            "--json",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.attributes.select, vec!["Java", "VLC"]);
        assert!(matches!(cli.command, Commands::List { show_alternate: true }));
    }

    #[test]
    fn test_filters() {
        let alternate = AppVersion {
            app: "Java".to_string(),
            version: "11".to_string(),
            current_version: false,
            alternate_version: true,
        };
        assert!(!keep_version(&alternate, false));
        assert!(keep_version(&alternate, true));

        let missing = AppAudit::new("Skype", "Not Installed", "");
        assert!(!keep_audit(&missing, true));
        assert!(keep_audit(&missing, false));
    }
}
