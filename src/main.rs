use anyhow::Result;
use clap::{Parser, Subcommand};
mod auth;
use std::path::PathBuf;
use twofae::{
    Aes256GcmProvider, Codec, DecryptTargets, EncodeOptions, EncryptTargets, EncryptionMode,
    KdfParams, ModeRegistry, crypto::kdf::DEFAULT_ITERATIONS, decrypt_file, encrypt_file,
    format::CURRENT_FORMAT_VERSION, inspect_file,
};

#[derive(Debug, clap::Args)]
struct Pbkdf2Args {
    /// PBKDF2-HMAC-SHA512 iterations used to derive the key
    #[arg(
        long = "pbkdf2-iterations",
        env = "TWOFAE_PBKDF2_ITERATIONS",
        default_value_t = DEFAULT_ITERATIONS
    )]
    iterations: u32,
}

impl Pbkdf2Args {
    fn to_kdf_params(&self) -> Result<KdfParams> {
        Ok(KdfParams::new(self.iterations)?)
    }
}

#[derive(Debug, Parser)]
#[command(name = "twofae")]
#[command(
    version,
    about = "Encrypts files into self-describing 2fae containers with separate key files."
)]
struct Cli {
    /// Log progress (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Encrypts a file into a container and writes its key file
    #[command(arg_required_else_help = true)]
    Encrypt {
        input: PathBuf,

        /// Container path (default: <INPUT>.2fae)
        #[arg(short, long, value_name = "PATH")]
        out: Option<PathBuf>,

        /// Key file path (default: <CONTAINER>.key.json)
        #[arg(long, value_name = "PATH")]
        keys: Option<PathBuf>,

        /// Encryption mode code written to the header
        #[arg(long, env = "TWOFAE_MODE", default_value_t = u32::from(EncryptionMode::default().code()))]
        mode: u32,

        /// Format version written to the header
        #[arg(long, env = "TWOFAE_FORMAT_VERSION", default_value_t = u32::from(CURRENT_FORMAT_VERSION))]
        format_version: u32,

        #[command(flatten)]
        pbkdf2: Pbkdf2Args,

        /// Overwrite existing outputs
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },

    /// Restores the original file from a container
    #[command(arg_required_else_help = true)]
    Decrypt {
        input: PathBuf,

        /// Key file written when the container was created
        #[arg(long, value_name = "PATH")]
        keys: PathBuf,

        /// Directory for the restored file (default: the container's directory)
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Overwrite an existing output file
        #[arg(short, long, default_value_t = false)]
        force: bool,
    },

    /// Shows the header of a container
    #[command(arg_required_else_help = true)]
    Info { input: PathBuf },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let args = Cli::parse();
    init_logging(args.verbose);

    match args.command {
        Commands::Encrypt {
            input,
            out,
            keys,
            mode,
            format_version,
            pbkdf2,
            force,
        } => {
            let options = EncodeOptions::from_codes(mode, format_version)?;
            let provider = Aes256GcmProvider::new(pbkdf2.to_kdf_params()?);
            let codec = Codec::new(ModeRegistry::with_aes256gcm(provider));

            let targets = EncryptTargets {
                container: out,
                key_file: keys,
                force,
            };

            let passphrase = auth::read_new_passphrase_with_confirmation()?;
            let encrypted = encrypt_file(&codec, &input, &targets, &passphrase, options)?;
            drop(passphrase);

            println!("encrypted '{}'", encrypted.container.display());
            println!("keys      '{}'", encrypted.key_file.display());
            println!("file id   {}", encrypted.file_id);
        }
        Commands::Decrypt {
            input,
            keys,
            out_dir,
            force,
        } => {
            let targets = DecryptTargets { out_dir, force };
            let decrypted = decrypt_file(&Codec::default(), &input, &keys, &targets)?;
            println!(
                "decrypted '{}' ({} bytes)",
                decrypted.path.display(),
                decrypted.size
            );
        }
        Commands::Info { input } => {
            let info = inspect_file(&input)?;
            println!("{info}");
        }
    }

    Ok(())
}
