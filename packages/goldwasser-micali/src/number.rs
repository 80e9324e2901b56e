use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};

/// Calculates the values needed to represent `n` as the product of a power of 2 and an odd number.
///
/// # Examples
///
/// ```
/// use num_bigint::BigUint;
/// use goldwasser_micali::number;
///
/// assert_eq!(number::as_power_of_two_and_odd(&BigUint::from(256usize)), (8, BigUint::from(1usize)));
/// assert_eq!(number::as_power_of_two_and_odd(&BigUint::from(137usize)), (0, BigUint::from(137usize)));
/// assert_eq!(number::as_power_of_two_and_odd(&BigUint::from(11_776usize)), (9, BigUint::from(23usize)));
/// ```
pub fn as_power_of_two_and_odd(n: &BigUint) -> (u64, BigUint) {
    match n.trailing_zeros() {
        None => (0, BigUint::zero()),
        Some(pw) => (pw, n >> pw),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JacobiSymbol {
    MinusOne = -1,
    Zero = 0,
    One = 1,
}

impl From<JacobiSymbol> for i8 {
    fn from(symbol: JacobiSymbol) -> i8 {
        symbol as i8
    }
}

impl std::ops::Mul for JacobiSymbol {
    type Output = JacobiSymbol;

    fn mul(self, rhs: JacobiSymbol) -> JacobiSymbol {
        match i8::from(self) * i8::from(rhs) {
            -1 => JacobiSymbol::MinusOne,
            0 => JacobiSymbol::Zero,
            _ => JacobiSymbol::One,
        }
    }
}

/// Jacobi symbol computation. Same as Legendre symbol if `n` is prime.
///
/// Iterative quadratic reciprocity, see "Algorithmic Number Theory" by Bach and Shallit.
///
/// # Panics
///
/// Panics if `n` is even or `a` does not satisfy `0 < a < n`. Callers holding
/// an unreduced value should use [`jacobi_symbol_reduced`].
///
/// # Examples
///
/// ```
/// use num_bigint::BigUint;
/// use goldwasser_micali::number::{self, JacobiSymbol};
///
/// let a = BigUint::from(1001usize);
/// let n = BigUint::from(9907usize);
///
/// assert_eq!(number::jacobi_symbol(&a, &n), JacobiSymbol::MinusOne);
/// ```
pub fn jacobi_symbol(a: &BigUint, n: &BigUint) -> JacobiSymbol {
    assert!(n.is_odd(), "modulus of the Jacobi symbol must be odd");
    assert!(!a.is_zero() && a < n, "argument of the Jacobi symbol must satisfy 0 < a < n");

    let mut a = a.clone();
    let mut n = n.clone();
    let mut negative = false;

    while !a.is_zero() {
        // (2/n) = -1 exactly when n = 3, 5 (mod 8)
        let r = low_digit(&n) & 7;
        while a.is_even() {
            a >>= 1u32;
            if r == 3 || r == 5 {
                negative = !negative;
            }
        }

        std::mem::swap(&mut a, &mut n);
        if low_digit(&a) & 3 == 3 && low_digit(&n) & 3 == 3 {
            negative = !negative;
        }
        a %= &n;
    }

    if !n.is_one() {
        JacobiSymbol::Zero
    } else if negative {
        JacobiSymbol::MinusOne
    } else {
        JacobiSymbol::One
    }
}

/// Jacobi symbol of `a mod n`, returning [`JacobiSymbol::Zero`] when `n` divides `a`.
///
/// # Panics
///
/// Panics if `n` is even.
pub fn jacobi_symbol_reduced(a: &BigUint, n: &BigUint) -> JacobiSymbol {
    let reduced = a % n;
    if reduced.is_zero() {
        JacobiSymbol::Zero
    } else {
        jacobi_symbol(&reduced, n)
    }
}

fn low_digit(n: &BigUint) -> u32 {
    n.iter_u32_digits().next().unwrap_or(0)
}
