//! Rational number type for exact timestamps and frame rates.
//!
//! Every value is kept in lowest terms with a positive denominator, so the
//! derived equality and hashing compare values, not representations.
//! Intermediate products are computed in `i128` and only narrowed back to
//! `i64` once reduced.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

/// A rational number represented as a reduced numerator and denominator.
///
/// Used for precise representation of timestamps, frame rates and every
/// frame-count computation, so repeated conversions never drift.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRational", into = "RawRational")]
pub struct Rational {
    num: i64,
    den: i64,
}

#[derive(Serialize, Deserialize)]
struct RawRational {
    num: i64,
    den: i64,
}

impl TryFrom<RawRational> for Rational {
    type Error = Error;

    fn try_from(raw: RawRational) -> Result<Self> {
        Self::try_new(raw.num, raw.den)
    }
}

impl From<Rational> for RawRational {
    fn from(r: Rational) -> Self {
        Self {
            num: r.num,
            den: r.den,
        }
    }
}

impl Rational {
    /// Create a new rational number, reduced to lowest terms.
    ///
    /// # Panics
    ///
    /// Panics if denominator is zero.
    pub fn new(num: i64, den: i64) -> Self {
        assert!(den != 0, "Denominator cannot be zero");
        Self::from_wide(num as i128, den as i128).expect("reduced i64 ratio fits in i64")
    }

    /// Create a new rational number, failing on a zero denominator.
    pub fn try_new(num: i64, den: i64) -> Result<Self> {
        if den == 0 {
            return Err(Error::ZeroDenominator { numerator: num });
        }
        Self::from_wide(num as i128, den as i128).ok_or_else(|| Error::overflow("reduce"))
    }

    /// Create a reduced rational in a const context.
    ///
    /// # Panics
    ///
    /// Panics if the denominator is not positive.
    pub const fn const_new(num: i64, den: i64) -> Self {
        assert!(den > 0, "Denominator must be positive");
        let g = const_gcd(num.unsigned_abs(), den as u64) as i64;
        Self {
            num: num / g,
            den: den / g,
        }
    }

    /// Create a rational from an integer.
    pub const fn from_int(n: i64) -> Self {
        Self { num: n, den: 1 }
    }

    /// Create a zero rational.
    pub const fn zero() -> Self {
        Self { num: 0, den: 1 }
    }

    /// Create a rational representing one.
    pub const fn one() -> Self {
        Self { num: 1, den: 1 }
    }

    /// The numerator in lowest terms (carries the sign).
    pub const fn num(&self) -> i64 {
        self.num
    }

    /// The denominator in lowest terms (always positive).
    pub const fn den(&self) -> i64 {
        self.den
    }

    /// Check if this rational is zero.
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Check if this rational is positive.
    pub fn is_positive(&self) -> bool {
        self.num > 0
    }

    /// Check if this rational is negative.
    pub fn is_negative(&self) -> bool {
        self.num < 0
    }

    /// Check if this rational is a whole number.
    pub fn is_integer(&self) -> bool {
        self.den == 1
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        Self {
            num: self.num.abs(),
            den: self.den,
        }
    }

    /// Convert to f64.
    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Get the reciprocal of this rational.
    ///
    /// # Panics
    ///
    /// Panics if the numerator is zero.
    pub fn recip(&self) -> Self {
        assert!(self.num != 0, "Cannot take reciprocal of zero");
        Self::new(self.den, self.num)
    }

    /// Multiply by an integer.
    pub fn mul_int(&self, n: i64) -> Self {
        *self * Self::from_int(n)
    }

    /// Divide by an integer.
    ///
    /// # Panics
    ///
    /// Panics if `n` is zero.
    pub fn div_int(&self, n: i64) -> Self {
        *self / Self::from_int(n)
    }

    /// Largest integer less than or equal to this value.
    pub fn floor(&self) -> i64 {
        self.num.div_euclid(self.den)
    }

    /// Smallest integer greater than or equal to this value.
    pub fn ceil(&self) -> i64 {
        -(-self.num).div_euclid(self.den)
    }

    /// Nearest integer, ties rounded away from zero.
    pub fn round(&self) -> i64 {
        let doubled = 2 * self.num as i128;
        let den = self.den as i128;
        // (2n + d) / 2d, mirrored for negative values
        if doubled >= 0 {
            ((doubled + den) / (2 * den)) as i64
        } else {
            -(((-doubled) + den) / (2 * den)) as i64
        }
    }

    /// Nearest integer, ties rounded to the even neighbour.
    pub fn round_half_even(&self) -> i64 {
        saturate(wide_round_half_even(self.num as i128, self.den as i128))
    }

    /// `self * rhs` rounded half-to-even, computed without an intermediate
    /// `Rational` so it never overflows. Saturates at the `i64` bounds.
    pub fn mul_round_half_even(&self, rhs: Self) -> i64 {
        saturate(wide_round_half_even(
            self.num as i128 * rhs.num as i128,
            self.den as i128 * rhs.den as i128,
        ))
    }

    /// Smallest integer at or above `self * rhs`, computed wide like
    /// [`Rational::mul_round_half_even`]. Saturates at the `i64` bounds.
    pub fn mul_ceil(&self, rhs: Self) -> i64 {
        let num = self.num as i128 * rhs.num as i128;
        let den = self.den as i128 * rhs.den as i128;
        saturate(-(-num).div_euclid(den))
    }

    /// Euclidean remainder: the result lies in `[0, modulus)` for a positive
    /// modulus, whatever the sign of `self`.
    ///
    /// # Panics
    ///
    /// Panics if `modulus` is zero or the remainder is not representable.
    pub fn rem_euclid(&self, modulus: Rational) -> Self {
        assert!(modulus.num != 0, "Division by zero");
        self.checked_rem_euclid(modulus)
            .expect("rational overflow in rem_euclid")
    }

    /// Checked Euclidean remainder; `None` on a zero modulus or overflow.
    pub fn checked_rem_euclid(&self, modulus: Rational) -> Option<Self> {
        if modulus.num == 0 {
            return None;
        }
        let (num, den) = (self.num as i128, self.den as i128);
        let (m_num, m_den) = (modulus.num.unsigned_abs() as i128, modulus.den as i128);
        // floor(self / |modulus|)
        let quotient = (num.checked_mul(m_den)?).div_euclid(den.checked_mul(m_num)?);
        let rem_num = num
            .checked_mul(m_den)?
            .checked_sub(quotient.checked_mul(m_num)?.checked_mul(den)?)?;
        Self::from_wide(rem_num, den.checked_mul(m_den)?)
    }

    /// Checked addition.
    pub fn checked_add(&self, rhs: Self) -> Option<Self> {
        let num = self.num as i128 * rhs.den as i128 + rhs.num as i128 * self.den as i128;
        Self::from_wide(num, self.den as i128 * rhs.den as i128)
    }

    /// Checked subtraction.
    pub fn checked_sub(&self, rhs: Self) -> Option<Self> {
        self.checked_add(-rhs)
    }

    /// Checked multiplication.
    pub fn checked_mul(&self, rhs: Self) -> Option<Self> {
        Self::from_wide(
            self.num as i128 * rhs.num as i128,
            self.den as i128 * rhs.den as i128,
        )
    }

    /// Checked division; `None` on division by zero or overflow.
    pub fn checked_div(&self, rhs: Self) -> Option<Self> {
        if rhs.num == 0 {
            return None;
        }
        Self::from_wide(
            self.num as i128 * rhs.den as i128,
            self.den as i128 * rhs.num as i128,
        )
    }

    /// Convert a float through its shortest round-trip decimal form.
    ///
    /// `0.877_f64` becomes exactly `877/1000` rather than the binary
    /// expansion of the nearest double.
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(Error::NotFinite {
                value: value.to_string(),
            });
        }
        parse_decimal(&value.to_string())
    }

    /// Format as a decimal rounded half-to-even to at most `max_places`
    /// fractional digits. Trailing zeros are dropped but one fractional digit
    /// is always kept (`1.0`, `8.34168`).
    pub fn to_decimal_string(&self, max_places: u32) -> String {
        let scale = 10_i64.pow(max_places);
        let scaled = self.mul_round_half_even(Self::from_int(scale));
        let sign = if scaled < 0 { "-" } else { "" };
        let scaled = scaled.unsigned_abs();
        let whole = scaled / scale as u64;
        let frac = scaled % scale as u64;
        let mut digits = format!("{:0width$}", frac, width = max_places as usize);
        while digits.len() > 1 && digits.ends_with('0') {
            digits.pop();
        }
        if digits.is_empty() {
            digits.push('0');
        }
        format!("{sign}{whole}.{digits}")
    }

    fn from_wide(num: i128, den: i128) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
        if num == 0 {
            return Some(Self::zero());
        }
        let g = gcd(num.unsigned_abs(), den.unsigned_abs()) as i128;
        Some(Self {
            num: i64::try_from(num / g).ok()?,
            den: i64::try_from(den / g).ok()?,
        })
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({}/{})", self.num, self.den)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.num as i128 * other.den as i128;
        let rhs = other.num as i128 * self.den as i128;
        lhs.cmp(&rhs)
    }
}

impl Add for Rational {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.checked_add(rhs).expect("rational overflow in add")
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        self.checked_sub(rhs).expect("rational overflow in sub")
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.checked_mul(rhs).expect("rational overflow in mul")
    }
}

impl Div for Rational {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        assert!(rhs.num != 0, "Division by zero");
        self.checked_div(rhs).expect("rational overflow in div")
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            num: -self.num,
            den: self.den,
        }
    }
}

impl From<i32> for Rational {
    fn from(n: i32) -> Self {
        Self::from_int(n as i64)
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_int(n)
    }
}

impl From<(i32, i32)> for Rational {
    fn from((num, den): (i32, i32)) -> Self {
        Self::new(num as i64, den as i64)
    }
}

impl From<(i64, i64)> for Rational {
    fn from((num, den): (i64, i64)) -> Self {
        Self::new(num, den)
    }
}

impl FromStr for Rational {
    type Err = Error;

    /// Parse `"n"`, `"n/d"` or a decimal such as `"-12.345"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once('/') {
            Some((num, den)) => {
                let num: i64 = num.trim().parse().map_err(|_| Error::parse(s))?;
                let den: i64 = den.trim().parse().map_err(|_| Error::parse(s))?;
                Self::try_new(num, den)
            }
            None => parse_decimal(s),
        }
    }
}

/// Parse an optionally signed decimal literal without exponent.
fn parse_decimal(s: &str) -> Result<Rational> {
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (whole, frac) = body.split_once('.').unwrap_or((body, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
        return Err(Error::parse(s));
    }

    let mut num: i128 = 0;
    for b in whole.bytes().chain(frac.bytes()) {
        num = num
            .checked_mul(10)
            .and_then(|n| n.checked_add((b - b'0') as i128))
            .ok_or_else(|| Error::overflow(format!("parse {s}")))?;
    }
    let den = 10_i128
        .checked_pow(frac.len() as u32)
        .ok_or_else(|| Error::overflow(format!("parse {s}")))?;
    let num = if negative { -num } else { num };
    Rational::from_wide(num, den).ok_or_else(|| Error::overflow(format!("parse {s}")))
}

const fn const_gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Calculate the greatest common divisor using Euclidean algorithm.
fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// `num / den` rounded half-to-even; `den` must be positive.
fn wide_round_half_even(num: i128, den: i128) -> i128 {
    let floor = num.div_euclid(den);
    let rem = num.rem_euclid(den);
    match (2 * rem).cmp(&den) {
        Ordering::Less => floor,
        Ordering::Greater => floor + 1,
        Ordering::Equal if floor % 2 == 0 => floor,
        Ordering::Equal => floor + 1,
    }
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}
