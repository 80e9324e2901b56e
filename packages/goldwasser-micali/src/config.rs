use crate::errors::{Error, Result};
use crate::prime::DEFAULT_MILLER_RABIN_ROUNDS;

use serde::{Deserialize, Serialize};

/// Smallest prime size for which two distinct primes of equal length exist (5 and 7).
pub const MIN_BIT_LENGTH: u64 = 3;

/// Parameters of Goldwasser-Micali key generation.
///
/// Missing fields take their default value when deserialized, so a
/// configuration file only needs the fields it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyGenConfig {
    /// Bit length of each of the primes `p` and `q`.
    pub bit_length: u64,
    pub miller_rabin_rounds: usize,
    /// Cap on Miller-Rabin tests per prime, and on sieve draws per test.
    pub max_prime_attempts: usize,
    pub max_pseudosquare_attempts: usize,
    /// Search for `p` and `q` on two rayon workers.
    pub parallel: bool,
}

impl Default for KeyGenConfig {
    fn default() -> Self {
        Self {
            bit_length: 1024,
            miller_rabin_rounds: DEFAULT_MILLER_RABIN_ROUNDS,
            max_prime_attempts: 100_000,
            max_pseudosquare_attempts: 10_000,
            parallel: true,
        }
    }
}

impl KeyGenConfig {
    pub fn with_bit_length(bit_length: u64) -> Self {
        Self { bit_length, ..Self::default() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.bit_length < MIN_BIT_LENGTH {
            return Err(Error::InvalidBitLength { min: MIN_BIT_LENGTH, actual: self.bit_length });
        }
        if self.miller_rabin_rounds == 0 {
            return Err(Error::InvalidConfig { field: "miller_rabin_rounds" });
        }
        if self.max_prime_attempts == 0 {
            return Err(Error::InvalidConfig { field: "max_prime_attempts" });
        }
        if self.max_pseudosquare_attempts == 0 {
            return Err(Error::InvalidConfig { field: "max_pseudosquare_attempts" });
        }
        Ok(())
    }
}
