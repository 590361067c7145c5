//! batch-cloud - inspect AWS credential and region resolution.

use std::path::PathBuf;

use anyhow::{Context, Result};
use batch_cloud::{AwsClientFactory, AwsConfig, SessionDefaults};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "batch-cloud")]
#[command(about = "Resolve AWS credentials and region for batch workloads", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML file with an `[aws]` section
    #[arg(long, global = true, env = "BATCH_CLOUD_CONFIG")]
    config: Option<PathBuf>,

    /// Shared profile used for session defaults
    #[arg(long, global = true, env = "BATCH_CLOUD_PROFILE")]
    profile: Option<String>,

    /// AWS region
    #[arg(long, global = true, env = "BATCH_CLOUD_REGION")]
    region: Option<String>,

    /// AWS access key ID
    #[arg(long, global = true, env = "BATCH_CLOUD_ACCESS_KEY")]
    access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, global = true, env = "BATCH_CLOUD_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    /// AWS session token
    #[arg(long, global = true, env = "BATCH_CLOUD_SESSION_TOKEN", hide_env_values = true)]
    session_token: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved region and credential source
    Resolve {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Build a service client to verify the configuration
    Check {
        /// Service to build a client for
        #[arg(value_enum)]
        service: Service,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Service {
    Ec2,
    Batch,
    Ecs,
    Logs,
}

impl Cli {
    fn aws_config(&self) -> Result<AwsConfig> {
        let file_config = match &self.config {
            Some(path) => AwsConfig::from_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => AwsConfig::default(),
        };

        let flag_config = AwsConfig {
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            session_token: self.session_token.clone(),
            region: self.region.clone(),
            profile: self.profile.clone(),
        };

        Ok(file_config.merge(flag_config))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("batch_cloud=debug,info")
    } else {
        EnvFilter::new("batch_cloud=info,warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = cli.aws_config()?;
    let session = SessionDefaults::load(config.profile.as_deref())
        .await
        .context("Failed to load AWS session defaults")?;
    let factory = AwsClientFactory::new(&config, &session).await?;

    match cli.command {
        Commands::Resolve { json } => {
            if json {
                let summary = json!({
                    "region": factory.region(),
                    "credentials_source": factory.credentials_source(),
                    "iam_role": factory.iam_role(),
                });
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("region:             {}", factory.region());
                println!("credentials source: {}", factory.credentials_source());
                if let Some(role) = factory.iam_role() {
                    println!("iam role:           {role}");
                }
            }
        }
        Commands::Check { service } => {
            let name = match service {
                Service::Ec2 => factory.ec2_client().await.map(|_| "ec2")?,
                Service::Batch => factory.batch_client().await.map(|_| "batch")?,
                Service::Ecs => factory.ecs_client().await.map(|_| "ecs")?,
                Service::Logs => factory.logs_client().await.map(|_| "logs")?,
            };
            tracing::info!(service = name, region = %factory.region(), "Client ready");
            println!("{name} client ready in {}", factory.region());
        }
    }

    Ok(())
}
