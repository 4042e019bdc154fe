use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cipherpix::pipeline;
use cipherpix::Codec;

/// cipherpix: hide an encrypted copy of an image inside an
/// ordinary-looking image, recoverable by password.
#[derive(Parser)]
#[command(name = "cipherpix", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt an image into a cipher container PNG
    Encrypt {
        /// Input image path
        #[arg(short, long)]
        input: PathBuf,

        /// Output cipher image path (.png)
        #[arg(short, long)]
        output: PathBuf,

        /// Encryption password
        #[arg(short, long)]
        password: String,
    },

    /// Decrypt a cipher container PNG back into the original image
    Decrypt {
        /// Input cipher image path
        #[arg(short, long)]
        input: PathBuf,

        /// Output image path
        #[arg(short, long)]
        output: PathBuf,

        /// Decryption password
        #[arg(short, long)]
        password: String,

        /// Write the output even when the password fails verification
        /// (the pixels will be garbage)
        #[arg(long)]
        force: bool,
    },

    /// Test a password against a cipher image without decrypting it
    Test {
        /// Cipher image path
        #[arg(short, long)]
        input: PathBuf,

        /// Candidate password
        #[arg(short, long)]
        password: String,
    },

    /// Report whether an image is a cipher container
    Detect {
        /// Image path
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encrypt {
            input,
            output,
            password,
        } => {
            pipeline::encrypt::encrypt_file(&input, &output, &password)?;
        }

        Commands::Decrypt {
            input,
            output,
            password,
            force,
        } => {
            pipeline::decrypt::decrypt_file(&input, &output, &password, force)?;
        }

        Commands::Test { input, password } => {
            let raster = pipeline::load_raster(&input)?;
            let codec = Codec::default();
            if !codec.is_recognized_container(&raster) {
                anyhow::bail!("{} is not a cipher container image", input.display());
            }
            if codec.test_password(&password, &raster)? {
                println!("password accepted");
            } else {
                anyhow::bail!("password rejected");
            }
        }

        Commands::Detect { input } => {
            let raster = pipeline::load_raster(&input)?;
            if Codec::default().is_recognized_container(&raster) {
                println!("{}: cipher container image", input.display());
            } else {
                println!("{}: ordinary image", input.display());
            }
        }
    }

    Ok(())
}
