use thiserror::Error;

/// Error type for key generation, key validation and decryption.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("bit length of each prime should be at least {min}, got {actual}")]
    InvalidBitLength { min: u64, actual: u64 },
    #[error("{field} should be greater than 0")]
    InvalidConfig { field: &'static str },
    #[error("could not find a {bits}-bit probable prime after {attempts} attempts")]
    PrimeSearchExhausted { bits: u64, attempts: usize },
    #[error("could not find a pseudosquare modulo n after {attempts} attempts")]
    PseudoSquareSearchExhausted { attempts: usize },
    #[error("private primes p and q must be odd and greater than 2")]
    InvalidPrimeFactor,
    #[error("public key modulus must be odd and greater than 2")]
    InvalidModulus,
    #[error("public key modulus is not the product of the private primes")]
    ModulusMismatch,
    #[error("private primes p and q must be distinct")]
    IdenticalPrimes,
    #[error("public key residue z is not a pseudosquare modulo n")]
    InvalidPseudoSquare,
    #[error("ciphertext element {index} is not reduced modulo n")]
    ResidueOutOfRange { index: usize },
    #[error("ciphertext element {index} is not coprime to p, unable to decrypt")]
    DecryptionFailure { index: usize },
    #[error("bit sequence of length {0} does not split into whole bytes")]
    BitLengthNotByteAligned(usize),
}

/// Results of this crate.
pub type Result<T> = std::result::Result<T, Error>;
