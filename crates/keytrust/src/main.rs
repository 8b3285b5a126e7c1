use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use keytrust::{derive_from_mnemonic, initialize_root, verify_request_json, RootConfig, RootError};
use keytrust_vault::{MnemonicCodec, MnemonicCode};

/// Keytrust: mnemonic key derivation and credential trust verification
#[derive(Parser, Debug)]
#[command(name = "keytrust", version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the default configuration file
    Init,

    /// Generate or check 12-word mnemonics
    Mnemonic {
        #[command(subcommand)]
        action: MnemonicAction,
    },

    /// Derive a key from a mnemonic and print its public part
    Derive {
        /// The 12-word mnemonic sentence
        #[arg(long)]
        mnemonic: String,

        #[arg(long, default_value = "")]
        passphrase: String,

        /// Derivation path, e.g. m/0'/1'/0'. Defaults to the configured path.
        #[arg(long)]
        path: Option<String>,
    },

    /// Verify a credential described by a JSON request file
    Verify {
        #[arg(long)]
        request: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum MnemonicAction {
    /// Print a fresh random mnemonic
    Generate,

    /// Check a mnemonic's words, length and checksum
    Validate {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("keytrust=debug,keytrust_vault=debug,keytrust_sdk=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("keytrust=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<RootConfig, RootError> {
    match path {
        Some(p) => RootConfig::load(p),
        None => {
            let default_path = RootConfig::default_config_path();
            RootConfig::load(&default_path)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), RootError> {
    match cli.command {
        Commands::Init => cmd_init(cli.config.as_ref()),
        Commands::Mnemonic { action } => cmd_mnemonic(action),
        Commands::Derive {
            mnemonic,
            passphrase,
            path,
        } => cmd_derive(cli.config.as_ref(), &mnemonic, &passphrase, path.as_deref()),
        Commands::Verify { request } => cmd_verify(cli.config.as_ref(), &request),
    }
}

fn cmd_init(config_path: Option<&PathBuf>) -> Result<(), RootError> {
    let config = load_config(config_path)?;
    let save_path = config_path
        .cloned()
        .unwrap_or_else(RootConfig::default_config_path);
    config.save(&save_path)?;

    info!(path = %save_path.display(), "configuration written");
    println!("Keytrust initialized.");
    println!("  Backend:      {}", config.crypto.backend);
    println!("  Default path: {}", config.derivation.default_path);
    println!("  Config:       {}", save_path.display());
    Ok(())
}

fn cmd_mnemonic(action: MnemonicAction) -> Result<(), RootError> {
    match action {
        MnemonicAction::Generate => {
            let mnemonic = MnemonicCodec::generate()?;
            println!("{}", mnemonic);
        }
        MnemonicAction::Validate { words } => {
            // Accept the sentence either as one quoted argument or as words.
            let words: Vec<&str> = words.iter().flat_map(|w| w.split_whitespace()).collect();
            MnemonicCode::from_words(&words)?;
            println!("valid");
        }
    }
    Ok(())
}

fn cmd_derive(
    config_path: Option<&PathBuf>,
    mnemonic: &str,
    passphrase: &str,
    path: Option<&str>,
) -> Result<(), RootError> {
    let state = initialize_root(load_config(config_path)?)?;
    let key = derive_from_mnemonic(&state, mnemonic, passphrase, path)?;
    println!("{}", serde_json::to_string_pretty(&key)?);
    Ok(())
}

fn cmd_verify(config_path: Option<&PathBuf>, request: &std::path::Path) -> Result<(), RootError> {
    let state = initialize_root(load_config(config_path)?)?;
    let json = std::fs::read_to_string(request)?;
    let result = verify_request_json(&state, &json)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
