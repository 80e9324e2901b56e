use crate::errors::{Error, Result};
use crate::number;

use log::{debug, trace};
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::{CryptoRng, Rng};

/// Number of Miller-Rabin rounds used when the caller has no preference.
pub const DEFAULT_MILLER_RABIN_ROUNDS: usize = 20;

/// Returns `true` if the input unsigned integer is probably prime.
///
/// Values below 4 and even values are decided directly, everything else goes
/// through `rounds` rounds of [`miller_rabin`]. A `false` verdict is always
/// correct; a `true` verdict is wrong with probability at most `4^-rounds`.
///
/// # Examples
///
/// ```
/// use num_bigint::BigUint;
/// use goldwasser_micali::prime;
///
/// let mut rng = rand::thread_rng();
/// assert_eq!(prime::is_probably_prime(&BigUint::from(128usize), 20, &mut rng), false);
/// assert_eq!(prime::is_probably_prime(&BigUint::from(2969usize), 20, &mut rng), true);
/// ```
pub fn is_probably_prime<R>(n: &BigUint, rounds: usize, rng: &mut R) -> bool
where
    R: Rng + CryptoRng + ?Sized,
{
    match n.to_u8() {
        Some(0 | 1) => false,
        Some(2 | 3) => true,
        _ if n.is_even() => false,
        _ => miller_rabin(n, rounds, rng),
    }
}

/// Miller-Rabin probabilistic primality test.
///
/// # Arguments
///
/// * `n` - number to test for primality.
/// * `rounds` - number of random witnesses to try.
///
/// # Assumptions:
///
/// `n` is an odd integer `> 3`.
///
/// # Reference
///
/// See algorithm 4.24 in "Handbook of Applied Cryptography" by Alfred J. Menezes et al.
pub fn miller_rabin<R>(n: &BigUint, rounds: usize, rng: &mut R) -> bool
where
    R: Rng + CryptoRng + ?Sized,
{
    debug_assert!(n.is_odd() && *n > BigUint::from(3u8));

    let two = BigUint::from(2u8);
    let n_minus_one = n - BigUint::one();
    let (s, d) = number::as_power_of_two_and_odd(&n_minus_one);

    'witness: for _ in 0..rounds {
        let w = rng.gen_biguint_range(&two, n);
        let mut x = w.modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }

        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

/// Draws odd numbers of exactly `bit_size` bits until one is not a multiple of
/// any small prime.
///
/// A candidate that is itself one of the small primes survives, which only
/// matters for tiny bit sizes.
///
/// # Errors
///
/// [`Error::PrimeSearchExhausted`] after `max_attempts` rejected draws.
///
/// # Panics
///
/// Panics if `bit_size < 2`.
pub fn low_level_candidate<R>(bit_size: u64, max_attempts: usize, rng: &mut R) -> Result<BigUint>
where
    R: Rng + CryptoRng + ?Sized,
{
    assert!(bit_size >= 2, "prime candidates need at least 2 bits");

    let low = BigUint::one() << (bit_size - 1);
    let high = BigUint::one() << bit_size;

    for _ in 0..max_attempts {
        let candidate = rng.gen_biguint_range(&low, &high) | BigUint::one();
        if !has_small_factor(&candidate) {
            return Ok(candidate);
        }
        trace!("rejected {bit_size}-bit candidate by trial division");
    }

    Err(Error::PrimeSearchExhausted { bits: bit_size, attempts: max_attempts })
}

/// Returns `true` if a prime of the small-prime table divides `n` and its square does not exceed `n`.
fn has_small_factor(n: &BigUint) -> bool {
    SMALL_PRIMES.iter().any(|&prime| {
        let prime = BigUint::from(prime);
        (n % &prime).is_zero() && &prime * &prime <= *n
    })
}

/// Generates a random probable prime of the given bit size.
///
/// Every rejected candidate is discarded and a new one is drawn from scratch.
///
/// # Errors
///
/// [`Error::PrimeSearchExhausted`] if no candidate passes within `max_attempts`
/// Miller-Rabin tests (each of which draws at most `max_attempts` sieve candidates).
///
/// # Panics
///
/// Panics if `bit_size < 2`.
pub fn generate_prime<R>(
    bit_size: u64,
    rounds: usize,
    max_attempts: usize,
    rng: &mut R,
) -> Result<BigUint>
where
    R: Rng + CryptoRng + ?Sized,
{
    for attempt in 1..=max_attempts {
        let candidate = low_level_candidate(bit_size, max_attempts, rng)?;
        if is_probably_prime(&candidate, rounds, rng) {
            debug!("found {bit_size}-bit probable prime after {attempt} primality tests");
            return Ok(candidate);
        }
    }

    Err(Error::PrimeSearchExhausted { bits: bit_size, attempts: max_attempts })
}

/// Odd primes below 2000.
const SMALL_PRIMES: [u32; 302] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293, 307,
    311, 313, 317, 331, 337, 347, 349, 353, 359, 367, 373, 379, 383, 389, 397, 401, 409, 419, 421,
    431, 433, 439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503, 509, 521, 523, 541, 547,
    557, 563, 569, 571, 577, 587, 593, 599, 601, 607, 613, 617, 619, 631, 641, 643, 647, 653, 659,
    661, 673, 677, 683, 691, 701, 709, 719, 727, 733, 739, 743, 751, 757, 761, 769, 773, 787, 797,
    809, 811, 821, 823, 827, 829, 839, 853, 857, 859, 863, 877, 881, 883, 887, 907, 911, 919, 929,
    937, 941, 947, 953, 967, 971, 977, 983, 991, 997, 1009, 1013, 1019, 1021, 1031, 1033, 1039,
    1049, 1051, 1061, 1063, 1069, 1087, 1091, 1093, 1097, 1103, 1109, 1117, 1123, 1129, 1151, 1153,
    1163, 1171, 1181, 1187, 1193, 1201, 1213, 1217, 1223, 1229, 1231, 1237, 1249, 1259, 1277, 1279,
    1283, 1289, 1291, 1297, 1301, 1303, 1307, 1319, 1321, 1327, 1361, 1367, 1373, 1381, 1399, 1409,
    1423, 1427, 1429, 1433, 1439, 1447, 1451, 1453, 1459, 1471, 1481, 1483, 1487, 1489, 1493, 1499,
    1511, 1523, 1531, 1543, 1549, 1553, 1559, 1567, 1571, 1579, 1583, 1597, 1601, 1607, 1609, 1613,
    1619, 1621, 1627, 1637, 1657, 1663, 1667, 1669, 1693, 1697, 1699, 1709, 1721, 1723, 1733, 1741,
    1747, 1753, 1759, 1777, 1783, 1787, 1789, 1801, 1811, 1823, 1831, 1847, 1861, 1867, 1871, 1873,
    1877, 1879, 1889, 1901, 1907, 1913, 1931, 1933, 1949, 1951, 1973, 1979, 1987, 1993, 1997, 1999,
];
