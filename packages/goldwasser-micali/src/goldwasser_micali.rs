use crate::config::KeyGenConfig;
use crate::errors::{Error, Result};
use crate::key::{PrivateKey, PublicKey};
use crate::number::{self, JacobiSymbol};
use crate::prime;

use bitvec::order::Msb0;
use bitvec::slice::BitSlice;
use bitvec::vec::BitVec;
use log::{debug, info};
use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::One;
use rand::{CryptoRng, Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Represents the public key of the Goldwasser-Micali scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldwasserMicaliPublicKey {
    n: BigUint,
    z: BigUint,
}

impl GoldwasserMicaliPublicKey {
    /// Builds a public key from a modulus and a pseudosquare.
    ///
    /// Only the conditions checkable without the factorization are verified:
    /// `n` odd, `2 <= z < n` and `(z/n) = 1`. Use [`verify_key_pair`] to check
    /// the key against its private counterpart.
    pub fn new(n: BigUint, z: BigUint) -> Result<Self> {
        if n.is_even() || n <= BigUint::from(2u8) {
            return Err(Error::InvalidModulus);
        }
        if z < BigUint::from(2u8) || z >= n || number::jacobi_symbol(&z, &n) != JacobiSymbol::One {
            return Err(Error::InvalidPseudoSquare);
        }
        Ok(Self { n, z })
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub fn z(&self) -> &BigUint {
        &self.z
    }

    /// Encrypts a single bit as `z^bit * a^2 mod n` for a fresh random unit `a`.
    ///
    /// # Reference
    ///
    /// See algorithm 8.51 in "Handbook of Applied Cryptography" by Alfred J. Menezes et al.
    pub fn encrypt_bit<R>(&self, bit: bool, rng: &mut R) -> BigUint
    where
        R: Rng + CryptoRng + ?Sized,
    {
        let one = BigUint::one();

        // a must be a unit, otherwise a^2 shares a factor with p or q
        let a = loop {
            let a = rng.gen_biguint_range(&one, &self.n);
            if a.gcd(&self.n).is_one() {
                break a;
            }
        };
        let a_square = (&a * &a) % &self.n;

        if bit {
            (&self.z * a_square) % &self.n
        } else {
            a_square
        }
    }
}

impl PublicKey for GoldwasserMicaliPublicKey {
    /// Encryption algorithm.
    ///
    /// # Arguments
    ///
    /// * `plaintext` - Bits to encrypt, one residue modulo `n` each.
    /// * `rng` - Source of the per-bit masking values.
    fn encrypt<R>(&self, plaintext: &BitSlice<u8, Msb0>, rng: &mut R) -> Vec<BigUint>
    where
        R: Rng + CryptoRng + ?Sized,
    {
        plaintext.iter().by_vals().map(|bit| self.encrypt_bit(bit, rng)).collect()
    }
}

/// Represents the private key of the Goldwasser-Micali scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoldwasserMicaliPrivateKey {
    p: BigUint,
    q: BigUint,
    n: BigUint,
}

impl GoldwasserMicaliPrivateKey {
    /// Builds a private key from two distinct odd primes.
    ///
    /// Primality itself is not re-tested.
    pub fn new(p: BigUint, q: BigUint) -> Result<Self> {
        check_prime_factors(&p, &q)?;
        let n = &p * &q;
        Ok(Self { p, q, n })
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// The public modulus `p * q`.
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// Decrypts a single residue: `(c/p) = 1` gives 0, `(c/p) = -1` gives 1.
    ///
    /// Returns `None` when `p` divides `c`, which no honestly produced ciphertext does.
    pub fn decrypt_bit(&self, c: &BigUint) -> Option<bool> {
        match number::jacobi_symbol_reduced(c, &self.p) {
            JacobiSymbol::One => Some(false),
            JacobiSymbol::MinusOne => Some(true),
            JacobiSymbol::Zero => None,
        }
    }
}

impl PrivateKey for GoldwasserMicaliPrivateKey {
    /// Decryption algorithm.
    ///
    /// # Arguments
    ///
    /// * `ciphertext` - Residues modulo `n` to decrypt.
    ///
    /// # Errors
    ///
    /// [`Error::ResidueOutOfRange`] for the first element not below `n`, checked
    /// before decrypting anything, and [`Error::DecryptionFailure`] for the first
    /// element that is not coprime to `p`.
    ///
    /// # Reference
    ///
    /// See algorithm 8.51 in "Handbook of Applied Cryptography" by Alfred J. Menezes et al.
    fn decrypt(&self, ciphertext: &[BigUint]) -> Result<BitVec<u8, Msb0>> {
        if let Some(index) = ciphertext.iter().position(|c| *c >= self.n) {
            return Err(Error::ResidueOutOfRange { index });
        }

        let mut bits: BitVec<u8, Msb0> = BitVec::with_capacity(ciphertext.len());
        for (index, c) in ciphertext.iter().enumerate() {
            let bit = self.decrypt_bit(c).ok_or(Error::DecryptionFailure { index })?;
            bits.push(bit);
        }
        Ok(bits)
    }
}

/// Generates public and private keys.
///
/// # Arguments
///
/// * `config` - Key generation parameters, `config.bit_length` is the size of each prime.
/// * `rng` - Source of randomness for primes and the pseudosquare.
///
/// # Reference
///
/// See algorithm 8.50 in "Handbook of Applied Cryptography" by Alfred J. Menezes et al.
pub fn generate_keys<R>(
    config: &KeyGenConfig,
    rng: &mut R,
) -> Result<(GoldwasserMicaliPublicKey, GoldwasserMicaliPrivateKey)>
where
    R: Rng + CryptoRng + ?Sized,
{
    config.validate()?;

    let (p, q) = generate_primes(config, rng)?;
    let n = &p * &q;
    let z = find_pseudosquare(&n, &p, &q, config.max_pseudosquare_attempts, rng)?;
    info!("generated Goldwasser-Micali key pair with a {}-bit modulus", n.bits());

    let public_key = GoldwasserMicaliPublicKey { n: n.clone(), z };
    let private_key = GoldwasserMicaliPrivateKey { p, q, n };
    Ok((public_key, private_key))
}

/// Generates distinct primes `p` and `q` of `config.bit_length` bits each.
///
/// With `config.parallel` both searches run on rayon workers, each driving a
/// `ChaCha20Rng` seeded from `rng`.
fn generate_primes<R>(config: &KeyGenConfig, rng: &mut R) -> Result<(BigUint, BigUint)>
where
    R: Rng + CryptoRng + ?Sized,
{
    let generate = |rng: &mut ChaCha20Rng| {
        prime::generate_prime(
            config.bit_length,
            config.miller_rabin_rounds,
            config.max_prime_attempts,
            rng,
        )
    };

    let mut p_rng = ChaCha20Rng::from_seed(rng.gen());
    let mut q_rng = ChaCha20Rng::from_seed(rng.gen());
    let (p, q) = if config.parallel {
        rayon::join(|| generate(&mut p_rng), || generate(&mut q_rng))
    } else {
        (generate(&mut p_rng), generate(&mut q_rng))
    };
    let (p, mut q) = (p?, q?);

    let mut retries = 0;
    while p == q {
        if retries == config.max_prime_attempts {
            return Err(Error::IdenticalPrimes);
        }
        debug!("p and q collided, generating q again");
        q = generate(&mut q_rng)?;
        retries += 1;
    }

    Ok((p, q))
}

/// Finds a pseudosquare modulo `n = p * q` by rejection sampling.
///
/// Draws `a` uniformly from `[2, n)` until `(a/p) = (a/q) = -1` and `(a/n) = 1`.
/// Such an `a` is a non-residue modulo both primes but cannot be told apart
/// from a square modulo `n` without knowing `p` and `q`.
///
/// # Errors
///
/// [`Error::ModulusMismatch`] if `n != p * q`, [`Error::InvalidPrimeFactor`] or
/// [`Error::IdenticalPrimes`] for unusable primes, and
/// [`Error::PseudoSquareSearchExhausted`] after `max_attempts` draws, which in
/// practice means `p` or `q` is not prime.
///
/// # Reference
///
/// See remark 8.54 in "Handbook of Applied Cryptography" by Alfred J. Menezes et al.
pub fn find_pseudosquare<R>(
    n: &BigUint,
    p: &BigUint,
    q: &BigUint,
    max_attempts: usize,
    rng: &mut R,
) -> Result<BigUint>
where
    R: Rng + CryptoRng + ?Sized,
{
    check_prime_factors(p, q)?;
    if &(p * q) != n {
        return Err(Error::ModulusMismatch);
    }

    let two = BigUint::from(2u8);
    for attempt in 1..=max_attempts {
        let a = rng.gen_biguint_range(&two, n);
        if is_pseudosquare(&a, n, p, q) {
            debug!("found pseudosquare after {attempt} draws");
            return Ok(a);
        }
    }

    Err(Error::PseudoSquareSearchExhausted { attempts: max_attempts })
}

/// Checks that `public_key` belongs to `private_key`: the modulus is `p * q`
/// and `z` is a pseudosquare for exactly these primes.
pub fn verify_key_pair(
    public_key: &GoldwasserMicaliPublicKey,
    private_key: &GoldwasserMicaliPrivateKey,
) -> Result<()> {
    if public_key.n != private_key.p() * private_key.q() {
        return Err(Error::ModulusMismatch);
    }
    let z = &public_key.z;
    if z >= &public_key.n || !is_pseudosquare(z, &public_key.n, &private_key.p, &private_key.q) {
        return Err(Error::InvalidPseudoSquare);
    }
    Ok(())
}

fn is_pseudosquare(a: &BigUint, n: &BigUint, p: &BigUint, q: &BigUint) -> bool {
    number::jacobi_symbol_reduced(a, p) == JacobiSymbol::MinusOne
        && number::jacobi_symbol_reduced(a, q) == JacobiSymbol::MinusOne
        && number::jacobi_symbol_reduced(a, n) == JacobiSymbol::One
}

fn check_prime_factors(p: &BigUint, q: &BigUint) -> Result<()> {
    let two = BigUint::from(2u8);
    if p.is_even() || q.is_even() || *p <= two || *q <= two {
        return Err(Error::InvalidPrimeFactor);
    }
    if p == q {
        return Err(Error::IdenticalPrimes);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::bits::bits_to_bytes;
    use bitvec::bits;
    use proptest::prelude::*;

    fn small_key_pair(rng: &mut ChaCha20Rng) -> (GoldwasserMicaliPublicKey, GoldwasserMicaliPrivateKey) {
        let (p, q) = (BigUint::from(11u32), BigUint::from(19u32));
        let n = &p * &q;
        let z = find_pseudosquare(&n, &p, &q, 1_000, rng).unwrap();
        let public_key = GoldwasserMicaliPublicKey::new(n, z).unwrap();
        let private_key = GoldwasserMicaliPrivateKey::new(p, q).unwrap();
        (public_key, private_key)
    }

    #[test]
    fn test_pseudosquare_conditions() {
        let mut rng = ChaCha20Rng::seed_from_u64(209);
        let (p, q) = (BigUint::from(11u32), BigUint::from(19u32));
        let n = &p * &q;

        for _ in 0..50 {
            let z = find_pseudosquare(&n, &p, &q, 1_000, &mut rng).unwrap();
            assert!(z >= BigUint::from(2u32) && z < n);
            assert_eq!(number::jacobi_symbol_reduced(&z, &p), JacobiSymbol::MinusOne);
            assert_eq!(number::jacobi_symbol_reduced(&z, &q), JacobiSymbol::MinusOne);
            assert_eq!(number::jacobi_symbol(&z, &n), JacobiSymbol::One);
        }
    }

    #[test]
    fn test_find_pseudosquare_rejects_inconsistent_inputs() {
        let mut rng = ChaCha20Rng::seed_from_u64(1357);
        let (p, q) = (BigUint::from(23u32), BigUint::from(59u32));

        // z must come from the key's own primes, not from an unrelated triple
        let unrelated = BigUint::from(11u32 * 19);
        assert_eq!(find_pseudosquare(&unrelated, &p, &q, 1_000, &mut rng), Err(Error::ModulusMismatch));
        assert_eq!(
            find_pseudosquare(&(&p * &p), &p, &p, 1_000, &mut rng),
            Err(Error::IdenticalPrimes)
        );
        assert_eq!(
            find_pseudosquare(&BigUint::from(46u32), &BigUint::from(2u32), &p, 1_000, &mut rng),
            Err(Error::InvalidPrimeFactor)
        );

        // (a/9) = (a/3)^2 is never -1
        let (p, q) = (BigUint::from(9u32), BigUint::from(25u32));
        assert_eq!(
            find_pseudosquare(&(&p * &q), &p, &q, 1_000, &mut rng),
            Err(Error::PseudoSquareSearchExhausted { attempts: 1_000 })
        );
    }

    #[test]
    fn test_small_key_bits_decrypt_consistently() {
        let mut rng = ChaCha20Rng::seed_from_u64(11 * 19);
        let (public_key, private_key) = small_key_pair(&mut rng);

        for _ in 0..100 {
            let c0 = public_key.encrypt_bit(false, &mut rng);
            let c1 = public_key.encrypt_bit(true, &mut rng);
            assert_eq!(private_key.decrypt_bit(&c0), Some(false));
            assert_eq!(private_key.decrypt_bit(&c1), Some(true));
        }
    }

    #[test]
    fn test_ciphertext_residues_in_range() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let (public_key, _) = small_key_pair(&mut rng);

        let ciphertext = public_key.encrypt_bytes(b"range check", &mut rng);
        assert_eq!(ciphertext.len(), 8 * 11);
        assert!(ciphertext.iter().all(|c| c < public_key.n()));
    }

    #[test]
    fn test_encryption_is_randomized() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let (public_key, _) = generate_keys(&KeyGenConfig::with_bit_length(64), &mut rng).unwrap();

        for bit in [false, true] {
            let c1 = public_key.encrypt_bit(bit, &mut rng);
            let c2 = public_key.encrypt_bit(bit, &mut rng);
            assert_ne!(c1, c2);
        }
    }

    #[test_log::test]
    fn test_generate_keys_512_bits() {
        let mut rng = ChaCha20Rng::seed_from_u64(512);
        let (public_key, private_key) =
            generate_keys(&KeyGenConfig::with_bit_length(512), &mut rng).unwrap();

        assert_eq!(private_key.p().bits(), 512);
        assert_eq!(private_key.q().bits(), 512);
        assert_ne!(private_key.p(), private_key.q());
        assert_eq!(public_key.n(), private_key.n());
        assert_eq!(verify_key_pair(&public_key, &private_key), Ok(()));

        let plaintext = bits![u8, Msb0; 0, 1, 0, 0, 0, 0, 0, 1];
        let ciphertext = public_key.encrypt(plaintext, &mut rng);
        assert_eq!(ciphertext.len(), 8);

        let decrypted = private_key.decrypt(&ciphertext).unwrap();
        assert_eq!(decrypted.as_bitslice(), plaintext);
        assert_eq!(bits_to_bytes(&decrypted), Ok(vec![0x41]));
    }

    #[test]
    fn test_generate_keys_sequential() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let config = KeyGenConfig { bit_length: 48, parallel: false, ..KeyGenConfig::default() };
        let (public_key, private_key) = generate_keys(&config, &mut rng).unwrap();
        assert_eq!(verify_key_pair(&public_key, &private_key), Ok(()));
    }

    #[test]
    fn test_generate_keys_tiny_primes_are_distinct() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        for _ in 0..10 {
            let (public_key, private_key) =
                generate_keys(&KeyGenConfig::with_bit_length(3), &mut rng).unwrap();
            assert_eq!(public_key.n(), &BigUint::from(35u32));
            assert_eq!(verify_key_pair(&public_key, &private_key), Ok(()));
        }
    }

    #[test]
    fn test_generate_keys_invalid_config() {
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        assert_eq!(
            generate_keys(&KeyGenConfig::with_bit_length(1), &mut rng),
            Err(Error::InvalidBitLength { min: 3, actual: 1 })
        );
    }

    #[test]
    fn test_verify_key_pair_rejects_foreign_keys() {
        let mut rng = ChaCha20Rng::seed_from_u64(77);
        let config = KeyGenConfig::with_bit_length(32);
        let (public_key, _) = generate_keys(&config, &mut rng).unwrap();
        let (_, other_private_key) = generate_keys(&config, &mut rng).unwrap();

        assert_eq!(verify_key_pair(&public_key, &other_private_key), Err(Error::ModulusMismatch));
    }

    #[test]
    fn test_key_constructors() {
        let (p, q) = (BigUint::from(11u32), BigUint::from(19u32));
        assert_eq!(
            GoldwasserMicaliPrivateKey::new(p.clone(), p.clone()),
            Err(Error::IdenticalPrimes)
        );
        assert_eq!(
            GoldwasserMicaliPrivateKey::new(BigUint::from(4u32), q.clone()),
            Err(Error::InvalidPrimeFactor)
        );
        assert_eq!(
            GoldwasserMicaliPublicKey::new(BigUint::from(210u32), BigUint::from(3u32)),
            Err(Error::InvalidModulus)
        );
        assert_eq!(
            GoldwasserMicaliPublicKey::new(&p * &q, BigUint::from(209u32)),
            Err(Error::InvalidPseudoSquare)
        );

        // 4 is a square, so (4/209) = 1, but it is not a pseudosquare
        let public_key = GoldwasserMicaliPublicKey::new(&p * &q, BigUint::from(4u32)).unwrap();
        let private_key = GoldwasserMicaliPrivateKey::new(p, q).unwrap();
        assert_eq!(verify_key_pair(&public_key, &private_key), Err(Error::InvalidPseudoSquare));
    }

    #[test]
    fn test_decrypt_errors() {
        let mut rng = ChaCha20Rng::seed_from_u64(19);
        let (public_key, private_key) = small_key_pair(&mut rng);

        let mut ciphertext = public_key.encrypt_bytes(b"x", &mut rng);
        ciphertext[3] = BigUint::from(22u32);
        assert_eq!(private_key.decrypt(&ciphertext), Err(Error::DecryptionFailure { index: 3 }));

        ciphertext[5] = public_key.n().clone();
        assert_eq!(private_key.decrypt(&ciphertext), Err(Error::ResidueOutOfRange { index: 5 }));

        ciphertext.pop();
        assert_eq!(private_key.decrypt_bytes(&ciphertext), Err(Error::BitLengthNotByteAligned(7)));
    }

    proptest! {
        #[test]
        fn test_encrypt_decrypt(plaintext in prop::collection::vec(any::<u8>(), 0..32), seed in any::<u64>()) {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let (public_key, private_key) = generate_keys(&KeyGenConfig::with_bit_length(64), &mut rng).unwrap();

            let ciphertext = public_key.encrypt_bytes(&plaintext, &mut rng);
            prop_assert_eq!(ciphertext.len(), 8 * plaintext.len());
            prop_assert_eq!(private_key.decrypt_bytes(&ciphertext).unwrap(), plaintext);
        }

        #[test]
        fn test_encrypt_decrypt_bits(raw in prop::collection::vec(any::<bool>(), 0..64), seed in any::<u64>()) {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let (public_key, private_key) = small_key_pair(&mut rng);
            let plaintext: BitVec<u8, Msb0> = raw.into_iter().collect();

            let ciphertext = public_key.encrypt(&plaintext, &mut rng);
            prop_assert_eq!(private_key.decrypt(&ciphertext).unwrap(), plaintext);
        }
    }
}
