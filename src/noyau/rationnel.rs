// src/noyau/rationnel.rs
//
// Rationnel borné
// ---------------
// Fraction exacte (toujours réduite, dénominateur > 0) qui refuse de grossir
// sans limite : au-delà de TAILLE_MAX_BITS, le résultat est `None` et
// l’appelant bascule sur les réels constructifs (approximation paresseuse).
// Les entiers ne sont jamais refusés par l’arithmétique simple.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::annulation;
use super::erreurs::{ErreurNoyau, Resultat};
use super::format::{format_rat_pretty, format_tronque, pow10};
use super::reel_constructif::ReelConstructif;

/// Taille max (bits numérateur + bits dénominateur) d’un non-entier.
pub const TAILLE_MAX_BITS: u64 = 10_000;

/// Au-delà, `pow` ne tente même pas le calcul exact.
pub const EXPOSANT_MAX_BITS: u64 = 1_000;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RationnelBorne(BigRational);

impl RationnelBorne {
    pub fn zero() -> Self {
        RationnelBorne(BigRational::zero())
    }

    pub fn un() -> Self {
        RationnelBorne(BigRational::one())
    }

    pub fn entier(n: i64) -> Self {
        RationnelBorne(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn from_bigint(n: BigInt) -> Self {
        RationnelBorne(BigRational::from_integer(n))
    }

    /// n/d (sans contrôle de taille : c’est une valeur saisie, pas un calcul).
    pub fn nouveau(n: BigInt, d: BigInt) -> Resultat<Self> {
        if d.is_zero() {
            return Err(ErreurNoyau::DivisionParZero);
        }
        Ok(RationnelBorne(BigRational::new(n, d)))
    }

    pub fn fraction(n: i64, d: i64) -> Resultat<Self> {
        Self::nouveau(BigInt::from(n), BigInt::from(d))
    }

    pub fn from_ratio(r: BigRational) -> Self {
        RationnelBorne(r)
    }

    pub fn ratio(&self) -> &BigRational {
        &self.0
    }

    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    /* ------------------------ Taille ------------------------ */

    fn taille(r: &BigRational) -> u64 {
        r.numer().bits() + r.denom().bits()
    }

    fn trop_gros(r: &BigRational) -> bool {
        !r.is_integer() && Self::taille(r) > TAILLE_MAX_BITS
    }

    fn borner(r: BigRational) -> Option<Self> {
        if Self::trop_gros(&r) {
            None
        } else {
            Some(RationnelBorne(r))
        }
    }

    /* ------------------------ Arithmétique ------------------------ */

    pub fn add(&self, o: &Self) -> Option<Self> {
        Self::borner(&self.0 + &o.0)
    }

    pub fn subtract(&self, o: &Self) -> Option<Self> {
        Self::borner(&self.0 - &o.0)
    }

    pub fn multiply(&self, o: &Self) -> Option<Self> {
        Self::borner(&self.0 * &o.0)
    }

    pub fn negate(&self) -> Self {
        RationnelBorne(-&self.0)
    }

    /// `None` pour zéro : l’appelant teste zéro avant et signale la division.
    pub fn inverse(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        Some(RationnelBorne(self.0.recip()))
    }

    pub fn divide(&self, o: &Self) -> Option<Self> {
        self.multiply(&o.inverse()?)
    }

    /// Racine exacte si numérateur et dénominateur sont des carrés parfaits.
    pub fn sqrt(&self) -> Option<Self> {
        if self.is_negative() {
            return None;
        }
        let sn = racine_entiere_exacte(self.numer())?;
        let sd = racine_entiere_exacte(self.denom())?;
        Some(RationnelBorne(BigRational::new(sn, sd)))
    }

    /// Puissance entière exacte (carré-multiplié).
    ///
    /// `Ok(None)` si le résultat serait trop gros (ou 0 puissance négative) ;
    /// `Err(Interrompu)` si le signal d’annulation est levé en route.
    pub fn pow(&self, exp: &BigInt) -> Resultat<Option<Self>> {
        if exp.is_zero() {
            return Ok(Some(Self::un()));
        }
        if self.is_zero() {
            return Ok(if exp.is_negative() { None } else { Some(Self::zero()) });
        }
        if self.0.is_one() {
            return Ok(Some(Self::un()));
        }
        if self.0 == -BigRational::one() {
            let impair = !(exp % 2u32).is_zero();
            return Ok(Some(if impair { self.clone() } else { Self::un() }));
        }
        if exp.bits() > EXPOSANT_MAX_BITS {
            return Ok(None);
        }
        if exp.is_negative() {
            return match self.inverse() {
                Some(inv) => inv.pow(&-exp),
                None => Ok(None),
            };
        }

        let e = exp.magnitude();
        let nb_bits = e.bits();
        let mut acc = BigRational::one();
        let mut b = self.0.clone();

        for i in 0..nb_bits {
            if e.bit(i) {
                acc *= &b;
                if Self::taille(&acc) > TAILLE_MAX_BITS {
                    return Ok(None);
                }
            }
            if i + 1 < nb_bits {
                annulation::verifier()?;
                b = &b * &b;
                if Self::taille(&b) > TAILLE_MAX_BITS {
                    return Ok(None);
                }
            }
        }
        Ok(Some(RationnelBorne(acc)))
    }

    /* ------------------------ Observateurs ------------------------ */

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    pub fn signum(&self) -> i32 {
        match self.0.cmp(&BigRational::zero()) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }

    /// Valeur entière exacte, sinon `None`.
    pub fn to_bigint(&self) -> Option<BigInt> {
        if self.0.is_integer() {
            Some(self.0.numer().clone())
        } else {
            None
        }
    }

    pub fn to_f64(&self) -> Option<f64> {
        self.0.to_f64()
    }

    /// Nombre de décimales nécessaires pour l’écrire exactement,
    /// `None` si le développement est infini (dénominateur avec un facteur ≠ 2, 5).
    pub fn digits_required(&self) -> Option<u64> {
        let d = self.denom();
        if d.is_one() {
            return Some(0);
        }
        let deux = d.trailing_zeros().unwrap_or(0);
        let mut reste = d >> deux;
        let cinq = BigInt::from(5);
        let mut nb_cinq = 0u64;
        while (&reste % &cinq).is_zero() {
            reste /= &cinq;
            nb_cinq += 1;
        }
        if reste.is_one() {
            Some(deux.max(nb_cinq))
        } else {
            None
        }
    }

    /// Exactement `n` décimales, troncature vers zéro. Le point est toujours présent.
    pub fn to_string_truncated(&self, n: usize) -> String {
        let scaled = (self.numer().abs() * pow10(n)) / self.denom();
        format_tronque(self.is_negative(), &scaled, n)
    }

    /// `n` ou `n/d`.
    pub fn to_nice_string(&self) -> String {
        format_rat_pretty(&self.0)
    }

    /// Réel constructif de même valeur.
    pub fn reel(&self) -> ReelConstructif {
        ReelConstructif::rationnel(&self.0)
    }
}

impl fmt::Debug for RationnelBorne {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_nice_string())
    }
}

impl fmt::Display for RationnelBorne {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_nice_string())
    }
}

/* ------------------------ Racines entières ------------------------ */

fn racine_entiere_exacte(x: &BigInt) -> Option<BigInt> {
    if x.is_negative() {
        return None;
    }
    let s = x.sqrt();
    if &s * &s == *x {
        Some(s)
    } else {
        None
    }
}
