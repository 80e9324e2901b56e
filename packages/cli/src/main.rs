use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bitvec::order::Msb0;
use bitvec::slice::BitSlice;
use clap::{Args, Parser, Subcommand};
use goldwasser_micali::bits::{bits_to_bytes, bytes_to_bits};
use goldwasser_micali::config::KeyGenConfig;
use goldwasser_micali::goldwasser_micali::{
    generate_keys, verify_key_pair, GoldwasserMicaliPrivateKey, GoldwasserMicaliPublicKey,
};
use goldwasser_micali::key::{PrivateKey, PublicKey};
use log::info;
use num_bigint::BigUint;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const DEFAULT_MESSAGE: &str = "An example of Goldwasser-Micali cryptosystem.";

#[derive(Parser, Debug)]
#[command(name = "gm", version, about = "Goldwasser-Micali probabilistic encryption")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a key pair and print p, q, n and z
    Keygen(KeyArgs),
    /// Encrypt a message bit by bit, decrypt it again and print every step
    Demo {
        #[command(flatten)]
        key: KeyArgs,
        /// Text to encrypt
        #[arg(short, long, default_value = DEFAULT_MESSAGE)]
        message: String,
    },
}

#[derive(Args, Debug)]
struct KeyArgs {
    /// Bit length of each prime, overrides the configuration file
    #[arg(short, long)]
    bits: Option<u64>,
    /// Seed for a reproducible run
    #[arg(short, long)]
    seed: Option<u64>,
    /// JSON file with key generation parameters
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Search for p and q one after the other instead of in parallel
    #[arg(long)]
    sequential: bool,
}

impl KeyArgs {
    fn key_gen_config(&self) -> Result<KeyGenConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("could not read {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("invalid key generation config {}", path.display()))?
            }
            None => KeyGenConfig::default(),
        };
        if let Some(bits) = self.bits {
            config.bit_length = bits;
        }
        if self.sequential {
            config.parallel = false;
        }
        config.validate()?;
        Ok(config)
    }

    fn rng(&self) -> ChaCha20Rng {
        match self.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Keygen(key) => {
            let (public_key, private_key) = key_pair(&key, &mut key.rng())?;
            print_key_pair(&public_key, &private_key);
        }
        Command::Demo { key, message } => {
            let recovered = run_demo(&key, &message)?;
            println!("\nOriginal text (for comparison): {message}");
            if recovered != message {
                bail!("decrypted text differs from the original message");
            }
        }
    }

    Ok(())
}

fn key_pair(
    key: &KeyArgs,
    rng: &mut ChaCha20Rng,
) -> Result<(GoldwasserMicaliPublicKey, GoldwasserMicaliPrivateKey)> {
    let config = key.key_gen_config()?;
    info!("generating two {}-bit primes", config.bit_length);
    let (public_key, private_key) = generate_keys(&config, rng)?;
    verify_key_pair(&public_key, &private_key)?;
    Ok((public_key, private_key))
}

/// Runs the full message -> bits -> ciphertext -> bits -> message walkthrough.
fn run_demo(key: &KeyArgs, message: &str) -> Result<String> {
    let mut rng = key.rng();
    let (public_key, private_key) = key_pair(key, &mut rng)?;
    print_key_pair(&public_key, &private_key);

    let plaintext = bytes_to_bits(message.as_bytes());
    println!("\nPlaintext in binary:\n{}", bit_string(&plaintext));

    let ciphertext = public_key.encrypt(&plaintext, &mut rng);
    info!("encrypted {} bits into {} residues", plaintext.len(), ciphertext.len());
    println!("\nCiphertext: {}", residues(&ciphertext));

    let decrypted = private_key.decrypt(&ciphertext)?;
    println!("\nDecrypted binary: {}", bit_string(&decrypted));

    let groups: Vec<String> = decrypted.chunks(8).map(bit_string).collect();
    println!("\nGrouped by bytes: {groups:?}");

    let bytes = bits_to_bytes(&decrypted)?;
    println!("\nBytes in decimal: {bytes:?}");

    let text = String::from_utf8(bytes).context("decrypted bytes are not valid UTF-8")?;
    println!("\nDecrypted text: {text}");
    Ok(text)
}

fn print_key_pair(public_key: &GoldwasserMicaliPublicKey, private_key: &GoldwasserMicaliPrivateKey) {
    println!("p: {}", private_key.p());
    println!("q: {}", private_key.q());
    println!("n = p * q: {}", public_key.n());
    println!("z (pseudosquare modulo n): {}", public_key.z());
}

fn bit_string(bits: &BitSlice<u8, Msb0>) -> String {
    bits.iter().by_vals().map(|bit| if bit { '1' } else { '0' }).collect()
}

fn residues(ciphertext: &[BigUint]) -> String {
    let items: Vec<String> = ciphertext.iter().map(BigUint::to_string).collect();
    format!("[{}]", items.join(", "))
}
