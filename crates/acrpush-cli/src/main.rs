mod commands;
mod logging;
mod tui;
mod wizard;

use std::path::PathBuf;
use std::process::ExitCode;

use acrpush_core::{LogLevel, Settings};
use anyhow::Context;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "acr-push",
    about = "Build container images and push them to Azure Container Registry"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the wizard, or the CI pipeline with --ci (same as no subcommand)
    Run(RunArgs),
}

/// Every option can also come from an `ACR_PUSH_*` variable or `.env`.
#[derive(Args, Debug, Clone, Default)]
struct RunArgs {
    /// Run non-interactively from flags and environment
    #[arg(long, env = "ACR_PUSH_CI", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    ci: bool,

    /// Registry name
    #[arg(long = "acr", env = "ACR_PUSH_ACR_NAME")]
    acr_name: Option<String>,

    /// Resource group of the registry
    #[arg(long = "rg", env = "ACR_PUSH_ACR_RESOURCE_GROUP")]
    acr_resource_group: Option<String>,

    /// Subscription id or name to activate
    #[arg(long, env = "ACR_PUSH_SUBSCRIPTION")]
    subscription: Option<String>,

    /// Tenant to log in to when the active one differs
    #[arg(long = "tenant-id", env = "ACR_PUSH_TENANT_ID")]
    tenant_id: Option<String>,

    /// Repository name
    #[arg(long = "repo", env = "ACR_PUSH_REPO_NAME")]
    repo_name: Option<String>,

    /// Image tag
    #[arg(long, env = "ACR_PUSH_TAG")]
    tag: Option<String>,

    /// Path to the Dockerfile
    #[arg(long = "dockerfile", env = "ACR_PUSH_DOCKERFILE_PATH")]
    dockerfile_path: Option<PathBuf>,

    /// Build context directory
    #[arg(long = "context", env = "ACR_PUSH_BUILD_CONTEXT")]
    build_context: Option<PathBuf>,

    /// Do not tag and push `latest`
    #[arg(long, env = "ACR_PUSH_SKIP_LATEST", action = ArgAction::SetTrue, value_parser = BoolishValueParser::new())]
    skip_latest: bool,

    /// Target platform, e.g. linux/amd64
    #[arg(long, env = "ACR_PUSH_PLATFORM")]
    platform: Option<String>,

    /// DEBUG, INFO, WARNING, ERROR or CRITICAL (RUST_LOG takes precedence)
    #[arg(long = "log-level", env = "ACR_PUSH_LOG_LEVEL")]
    log_level: Option<LogLevel>,
}

impl RunArgs {
    fn into_settings(self) -> Settings {
        fn text(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.trim().is_empty())
        }
        fn path(v: Option<PathBuf>) -> Option<PathBuf> {
            v.filter(|p| !p.as_os_str().is_empty())
        }

        Settings {
            acr_name: text(self.acr_name),
            acr_resource_group: text(self.acr_resource_group),
            subscription: text(self.subscription),
            tenant_id: text(self.tenant_id),
            repo_name: text(self.repo_name),
            tag: text(self.tag),
            dockerfile_path: path(self.dockerfile_path),
            build_context: path(self.build_context),
            skip_latest: self.skip_latest,
            platform: text(self.platform),
            log_level: self.log_level.unwrap_or_default(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Variables already in the environment win over .env.
    if let Err(error) = dotenvy::dotenv()
        && !error.not_found()
    {
        return Err(error).context("invalid .env file");
    }

    let cli = Cli::parse();
    let args = match cli.command {
        Some(Commands::Run(args)) => args,
        None => cli.run,
    };
    let ci = args.ci;
    let settings = args.into_settings();

    if ci {
        logging::init(settings.log_level, logging::Target::Stderr)?;
        if let Err(e) = commands::ci(&settings).await {
            tracing::error!("Build and push failed: {e}");
            return Ok(ExitCode::FAILURE);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let log_path = logging::interactive_log_path();
    logging::init(settings.log_level, logging::Target::File(log_path.clone()))?;
    commands::interactive(settings).await?;
    println!("Log written to {}", log_path.display());
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_become_absent() {
        let args = RunArgs {
            acr_name: Some("  ".to_owned()),
            tag: Some("1.0.0".to_owned()),
            build_context: Some(PathBuf::new()),
            ..Default::default()
        };

        let settings = args.into_settings();

        assert_eq!(settings.acr_name, None);
        assert_eq!(settings.tag.as_deref(), Some("1.0.0"));
        assert_eq!(settings.build_context, None);
        assert_eq!(settings.log_level, LogLevel::Info);
    }

    #[test]
    fn flags_parse_into_settings() {
        let cli = Cli::try_parse_from([
            "acr-push",
            "--ci",
            "--acr",
            "myacr",
            "--rg",
            "rg",
            "--skip-latest",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert!(cli.run.ci);
        let settings = cli.run.into_settings();
        assert_eq!(settings.acr_name.as_deref(), Some("myacr"));
        assert_eq!(settings.acr_resource_group.as_deref(), Some("rg"));
        assert!(settings.skip_latest);
        assert_eq!(settings.log_level, LogLevel::Debug);
    }

    #[test]
    fn run_subcommand_accepts_the_same_flags() {
        let cli = Cli::try_parse_from(["acr-push", "run", "--repo", "api", "--tag", "2.0.0"]).unwrap();
        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.repo_name.as_deref(), Some("api"));
        assert_eq!(args.tag.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
