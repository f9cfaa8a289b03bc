//! Emergency Credential Provisioning CLI
//!
//! Manages the machine-local emergency administrator credential. Writes
//! the same key and sealed record files the console reads, so a record
//! provisioned here verifies byte-for-byte at login time.

use anyhow::{Context, bail};
use auth::{EmergencyAdminRecord, SecretStore};
use clap::{Parser, Subcommand, ValueEnum};
use platform::kdf::{
    DEFAULT_ITERATIONS, DEFAULT_OUTPUT_LENGTH, KdfDigest, KdfParams, MIN_ITERATIONS,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "provision",
    about = "Manage the local emergency administrator credential"
)]
struct Cli {
    /// Override the data directory (defaults to the console's own)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Provision (or replace) the emergency credential
    Create {
        /// Username the fallback will match, case-sensitively
        #[arg(short, long)]
        username: String,

        /// Password to derive the stored hash from
        #[arg(short, long)]
        password: String,

        /// PBKDF2 iteration count
        #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
        iterations: u32,

        /// Derived-key length in bytes
        #[arg(long, default_value_t = DEFAULT_OUTPUT_LENGTH)]
        output_length: usize,

        /// HMAC digest algorithm
        #[arg(long, value_enum, default_value_t = DigestArg::Sha512)]
        digest: DigestArg,

        /// Replace an existing record without asking
        #[arg(long)]
        force: bool,
    },

    /// Show the provisioned record (never the hash)
    Show,

    /// Remove the provisioned record
    Remove,
}

#[derive(Clone, Copy, ValueEnum)]
enum DigestArg {
    Sha256,
    Sha512,
}

impl From<DigestArg> for KdfDigest {
    fn from(arg: DigestArg) -> Self {
        match arg {
            DigestArg::Sha256 => KdfDigest::Sha256,
            DigestArg::Sha512 => KdfDigest::Sha512,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let store = match cli.data_dir {
        Some(dir) => SecretStore::at(dir),
        None => SecretStore::open_default()?,
    };

    match cli.command {
        Command::Create {
            username,
            password,
            iterations,
            output_length,
            digest,
            force,
        } => {
            if iterations < MIN_ITERATIONS {
                bail!("Iteration count must be at least {MIN_ITERATIONS}");
            }
            if !force && store.read_record().unwrap_or(None).is_some() {
                bail!("A record already exists; pass --force to replace it");
            }

            let params = KdfParams {
                iterations,
                output_length,
                digest: digest.into(),
            };
            let record = EmergencyAdminRecord::provision(&username, &password, params)
                .context("Invalid derivation parameters")?;
            store.write_record(&record)?;

            println!("Provisioned emergency credential for '{username}'");
            println!("  store:      {}", store.dir().display());
            println!("  iterations: {iterations}");
            println!("  digest:     {}", params.digest);
        }

        Command::Show => match store.read_record()? {
            Some(record) => {
                println!("username:   {}", record.username);
                println!("created:    {}", record.created_at.to_rfc3339());
                println!("iterations: {}", record.kdf_params.iterations);
                println!("length:     {}", record.kdf_params.output_length);
                println!("digest:     {}", record.kdf_params.digest);
            }
            None => println!("No emergency credential is provisioned"),
        },

        Command::Remove => {
            store.delete_record()?;
            println!("Emergency credential removed");
        }
    }

    Ok(())
}
