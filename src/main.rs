//! SAKeBomb: creates short-lived Service Account Keys.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use sakebomb::commands::create::{self, CreateParams, DEFAULT_CREDENTIALS_FILE};
use sakebomb::commands::generate::{
    self, DEFAULT_PRIVATE_KEY_FILE, DEFAULT_PUBLIC_KEY_FILE, GenerateParams,
};
use sakebomb::commands::DEFAULT_EXPIRY_MINUTES;
use sakebomb::config::Config;
use sakebomb::error::Result;
use sakebomb::iam::IamClient;
use sakebomb::logging;

#[derive(Parser)]
#[command(name = "sakebomb")]
#[command(about = "A Service Account Key generator")]
#[command(long_about = "SAKeBomb is a CLI utility that creates short-lived Service Account Keys")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generates a Service Account's Public/Private Keys
    ///
    /// Saves the certificate and the private key in two PEM files
    /// (public.pem and private.pem unless overridden).
    Generate {
        /// The number of minutes the key will be valid for
        #[arg(short = 'e', long = "expiry-time", default_value_t = DEFAULT_EXPIRY_MINUTES)]
        expiry_time: i64,

        /// The public key destination path (in PEM format)
        #[arg(short = 'p', long = "public-key-file", default_value = DEFAULT_PUBLIC_KEY_FILE)]
        public_key_file: PathBuf,

        /// The private key destination path (in PEM format)
        #[arg(short = 'j', long = "private-key-file", default_value = DEFAULT_PRIVATE_KEY_FILE)]
        private_key_file: PathBuf,
    },

    /// Create a Service Account Key in GCP
    ///
    /// Generates a key pair, uploads it to Google and writes a credential file.
    Create {
        /// The number of minutes the key will be valid for
        #[arg(short = 'e', long = "expiry-time", default_value_t = DEFAULT_EXPIRY_MINUTES)]
        expiry_time: i64,

        /// The Google ProjectID
        #[arg(short = 'p', long = "project-id")]
        project_id: String,

        /// The SA email
        #[arg(short = 's', long = "sa-email")]
        sa_email: String,

        /// The path for the credential file
        #[arg(short = 'j', long = "private-key-file", default_value = DEFAULT_CREDENTIALS_FILE)]
        private_key_file: PathBuf,
    },
}

async fn run(cli: Cli, config: &Config) -> Result<()> {
    match cli.command {
        Commands::Generate {
            expiry_time,
            public_key_file,
            private_key_file,
        } => generate::handle(&GenerateParams {
            expiry_minutes: expiry_time,
            public_key_file,
            private_key_file,
        }),
        Commands::Create {
            expiry_time,
            project_id,
            sa_email,
            private_key_file,
        } => {
            let iam = IamClient::new(config)?;
            create::handle(
                &CreateParams {
                    expiry_minutes: expiry_time,
                    project_id,
                    sa_email,
                    credentials_file: private_key_file,
                },
                &iam,
            )
            .await
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config);
    tracing::debug!(
        debug = config.debug,
        iam_endpoint = %config.iam_endpoint,
        "configuration loaded"
    );

    match run(cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}
