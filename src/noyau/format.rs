// src/noyau/format.rs

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;

/* ------------------------ Helpers décimaux ------------------------ */

pub fn pow10(n: usize) -> BigInt {
    BigInt::from(10).pow(n as u32)
}

/// Magnitude “scalée” (×10^digits) -> texte avec exactement `digits` décimales.
/// Le point décimal est toujours présent ("12." pour digits = 0).
pub fn format_tronque(negatif: bool, magnitude: &BigInt, digits: usize) -> String {
    let mut chiffres = magnitude.to_str_radix(10);
    while chiffres.len() < digits + 1 {
        chiffres.insert(0, '0');
    }
    let coupure = chiffres.len() - digits;
    let (entier, frac) = chiffres.split_at(coupure);
    if negatif {
        format!("-{entier}.{frac}")
    } else {
        format!("{entier}.{frac}")
    }
}

/// Regroupe les chiffres par milliers : "1234567" -> "1,234,567".
/// Un signe en tête est conservé.
pub fn grouper_milliers(entier: &str, separateur: char) -> String {
    let (signe, chiffres) = match entier.strip_prefix('-') {
        Some(reste) => ("-", reste),
        None => ("", entier),
    };
    let n = chiffres.chars().count();
    let mut out = String::with_capacity(entier.len() + n / 3);
    out.push_str(signe);
    for (i, c) in chiffres.chars().enumerate() {
        if i > 0 && (n - i) % 3 == 0 {
            out.push(separateur);
        }
        out.push(c);
    }
    out
}

/* ------------------------ Helpers rationnels ------------------------ */

pub fn format_rat_pretty(r: &BigRational) -> String {
    let n = r.numer();
    let d = r.denom();
    if d.is_one() {
        format!("{n}")
    } else {
        format!("{n}/{d}")
    }
}

/// coeff·nom : "π", "-e", "3√2", "(1/2)ln(3)".
pub fn format_coeff_nom(coeff: &BigRational, nom: &str) -> String {
    let n = coeff.numer();
    let d = coeff.denom();

    if !d.is_one() {
        return format!("({n}/{d}){nom}");
    }
    if n.is_one() {
        return nom.to_string();
    }
    if *n == BigInt::from(-1) {
        return format!("-{nom}");
    }
    format!("{n}{nom}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tronque_avec_zeros_en_tete() {
        assert_eq!(format_tronque(false, &BigInt::from(5), 3), "0.005");
        assert_eq!(format_tronque(true, &BigInt::from(12345), 2), "-123.45");
        assert_eq!(format_tronque(false, &BigInt::from(7), 0), "7.");
    }

    #[test]
    fn milliers() {
        assert_eq!(grouper_milliers("1234567", ','), "1,234,567");
        assert_eq!(grouper_milliers("-1234", ','), "-1,234");
        assert_eq!(grouper_milliers("123", ','), "123");
        assert_eq!(grouper_milliers("", ','), "");
    }

    #[test]
    fn coefficients() {
        let r = |n: i64, d: i64| BigRational::new(BigInt::from(n), BigInt::from(d));
        assert_eq!(format_coeff_nom(&r(1, 1), "π"), "π");
        assert_eq!(format_coeff_nom(&r(-1, 1), "e"), "-e");
        assert_eq!(format_coeff_nom(&r(2, 1), "π"), "2π");
        assert_eq!(format_coeff_nom(&r(1, 2), "e"), "(1/2)e");
        assert_eq!(format_coeff_nom(&r(-3, 4), "√2"), "(-3/4)√2");
    }
}
