//! # Goldwasser-Micali probabilistic public-key encryption
//!
//! `goldwasser_micali` implements the Goldwasser-Micali cryptosystem: every
//! plaintext bit is encrypted into a square (bit 0) or a pseudosquare (bit 1)
//! modulo `n = p * q`, and decrypted by evaluating the Legendre symbol modulo `p`.
//!
//! ```
//! use goldwasser_micali::config::KeyGenConfig;
//! use goldwasser_micali::goldwasser_micali::generate_keys;
//! use goldwasser_micali::key::{PrivateKey, PublicKey};
//!
//! let mut rng = rand::thread_rng();
//! let (public_key, private_key) = generate_keys(&KeyGenConfig::with_bit_length(128), &mut rng).unwrap();
//!
//! let ciphertext = public_key.encrypt_bytes(b"hello world", &mut rng);
//! assert_eq!(private_key.decrypt_bytes(&ciphertext).unwrap(), b"hello world");
//! ```

/// Canonical byte/bit codec.
pub mod bits;
/// Key generation parameters.
pub mod config;
/// Errors during key generation and decryption.
pub mod errors;
/// Goldwasser-Micali probabilistic public-key scheme.
pub mod goldwasser_micali;
/// Generic traits for operations on keys.
pub mod key;
/// Number theoric functions.
pub mod number;
/// Prime generation and primality testing functions.
pub mod prime;

pub use errors::{Error, Result};
