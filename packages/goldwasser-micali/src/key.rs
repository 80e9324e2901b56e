use crate::bits;
use crate::errors::{Error, Result};

use bitvec::order::Msb0;
use bitvec::slice::BitSlice;
use bitvec::vec::BitVec;
use num_bigint::BigUint;
use rand::{CryptoRng, Rng};

/// Generic trait for operations on a public key.
pub trait PublicKey {
    /// Encrypts every bit of `plaintext` into one residue, with fresh randomness per bit.
    fn encrypt<R>(&self, plaintext: &BitSlice<u8, Msb0>, rng: &mut R) -> Vec<BigUint>
    where
        R: Rng + CryptoRng + ?Sized;

    /// Encrypts `plaintext` under the canonical MSB-first byte encoding.
    fn encrypt_bytes<R>(&self, plaintext: &[u8], rng: &mut R) -> Vec<BigUint>
    where
        R: Rng + CryptoRng + ?Sized,
    {
        self.encrypt(&bits::bytes_to_bits(plaintext), rng)
    }
}

/// Generic trait for operations on a private key.
pub trait PrivateKey {
    /// Decrypts one bit per ciphertext element.
    fn decrypt(&self, ciphertext: &[BigUint]) -> Result<BitVec<u8, Msb0>>;

    /// Decrypts a ciphertext produced by [`PublicKey::encrypt_bytes`].
    ///
    /// The length is checked before any element is decrypted.
    fn decrypt_bytes(&self, ciphertext: &[BigUint]) -> Result<Vec<u8>> {
        if ciphertext.len() % 8 != 0 {
            return Err(Error::BitLengthNotByteAligned(ciphertext.len()));
        }
        bits::bits_to_bytes(&self.decrypt(ciphertext)?)
    }
}
