// src/noyau/reel_unifie.rs
//
// Réel unifié : rationnel exact × facteur constructif
// ---------------------------------------------------
// valeur = rat × facteur
//
// Le facteur est, chaque fois que possible, une constante nommée
// (1, π, e, √n, ln n). Deux valeurs au même facteur nommé se combinent et se
// comparent par pure arithmétique rationnelle : aucune approximation.
// Sinon on retombe sur un réel constructif quelconque (facteur libre).
//
// Toutes les constantes nommées sont > 0 : le signe d’une valeur à facteur
// nommé est celui de son rationnel.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::annulation;
use super::erreurs::{ErreurNoyau, Resultat};
use super::format::{format_coeff_nom, format_tronque, pow10};
use super::rationnel::RationnelBorne;
use super::reel_constructif::ReelConstructif;

/// Tolérance par défaut des comparaisons approchées (2^-1000).
pub const TOLERANCE_DEFAUT: i32 = -1000;

/// Au-delà, puissance entière via exp(ln(x)·n) plutôt que par carrés successifs.
const LIMITE_POW_RECURSIF: u64 = 1000;

/// Au-delà (en bits d’exposant), on ne tente plus le rationnel exact.
const LIMITE_DURE_POW_BITS: u64 = 1000;

/// Bits de marge pour une troncature non décidable.
const PRECISION_EN_PLUS: i32 = 10;

/// Bits max de l’argument de la factorielle.
const FACTORIELLE_MAX_BITS: u64 = 20;

const RACINES: [u32; 6] = [2, 3, 5, 6, 7, 10];
const LOGS: [u32; 6] = [2, 3, 5, 6, 7, 10];

/* ------------------------ Constantes nommées ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Nommee {
    Un,
    Pi,
    E,
    /// √n, n ∈ {2, 3, 5, 6, 7, 10}
    Racine(u32),
    /// ln n, n ∈ {2, 3, 5, 6, 7, 10}
    Ln(u32),
}

impl Nommee {
    /// √n nommée (n = 1 donne `Un`), si n est tabulé.
    fn racine_de(n: u32) -> Option<Self> {
        match n {
            1 => Some(Nommee::Un),
            _ if RACINES.contains(&n) => Some(Nommee::Racine(n)),
            _ => None,
        }
    }

    pub fn nom(self) -> String {
        match self {
            Nommee::Un => "1".to_string(),
            Nommee::Pi => "π".to_string(),
            Nommee::E => "e".to_string(),
            Nommee::Racine(n) => format!("√{n}"),
            Nommee::Ln(n) => format!("ln({n})"),
        }
    }

    fn algebrique(self) -> bool {
        matches!(self, Nommee::Un | Nommee::Racine(_))
    }

    /// c² si rationnel.
    fn carre(self) -> Option<RationnelBorne> {
        match self {
            Nommee::Un => Some(RationnelBorne::un()),
            Nommee::Racine(n) => Some(RationnelBorne::entier(i64::from(n))),
            _ => None,
        }
    }

    /// exp(c) si entier.
    fn exponentielle(self) -> Option<RationnelBorne> {
        match self {
            Nommee::Ln(n) => Some(RationnelBorne::entier(i64::from(n))),
            _ => None,
        }
    }

    fn reel(self) -> ReelConstructif {
        match self {
            Nommee::Un => ReelConstructif::un(),
            Nommee::Pi => ReelConstructif::pi(),
            Nommee::E => ReelConstructif::e(),
            Nommee::Racine(n) => table_reels(&TABLE_RACINES, &RACINES, n, |k| {
                ReelConstructif::entier(i64::from(k)).sqrt()
            }),
            Nommee::Ln(n) => table_reels(&TABLE_LOGS, &LOGS, n, |k| {
                ReelConstructif::ln_entier(u64::from(k))
            }),
        }
    }
}

type Table = OnceLock<HashMap<u32, ReelConstructif>>;

static TABLE_RACINES: Table = OnceLock::new();
static TABLE_LOGS: Table = OnceLock::new();

/// Un seul nœud par constante : les approximations se partagent entre calculs.
fn table_reels(
    table: &'static Table,
    cles: &[u32],
    n: u32,
    construire: fn(u32) -> ReelConstructif,
) -> ReelConstructif {
    let t = table.get_or_init(|| cles.iter().map(|&k| (k, construire(k))).collect());
    t.get(&n).cloned().unwrap_or_else(|| construire(n))
}

/// Indépendance linéaire sur Q, prouvable sans approximation.
fn independants(a: Nommee, b: Nommee) -> bool {
    use Nommee::*;
    if a == b {
        return false;
    }
    match (a, b) {
        (Un, _) | (_, Un) => true,
        (Pi, c) | (c, Pi) if c.algebrique() => true,
        (E, c) | (c, E) if c.algebrique() => true,
        (Racine(_), Racine(_)) | (Ln(_), Ln(_)) => true,
        (Ln(_), Racine(_)) | (Racine(_), Ln(_)) => true,
        // e / π, π / ln, e / ln : inconnu
        _ => false,
    }
}

/* ------------------------ Facteur ------------------------ */

#[derive(Clone)]
enum Facteur {
    Nomme(Nommee),
    Libre(ReelConstructif),
}

impl Facteur {
    fn reel(&self) -> ReelConstructif {
        match self {
            Facteur::Nomme(c) => c.reel(),
            Facteur::Libre(r) => r.clone(),
        }
    }

    fn nomme(&self) -> Option<Nommee> {
        match self {
            Facteur::Nomme(c) => Some(*c),
            Facteur::Libre(_) => None,
        }
    }

    fn est(&self, c: Nommee) -> bool {
        self.nomme() == Some(c)
    }

    fn meme(&self, o: &Facteur) -> bool {
        match (self, o) {
            (Facteur::Nomme(a), Facteur::Nomme(b)) => a == b,
            (Facteur::Libre(a), Facteur::Libre(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

/* ------------------------ Réel unifié ------------------------ */

#[derive(Clone)]
pub struct ReelUnifie {
    rat: RationnelBorne,
    facteur: Facteur,
}

fn q(n: i64, d: i64) -> RationnelBorne {
    RationnelBorne::from_ratio(BigRational::new(BigInt::from(n), BigInt::from(d)))
}

impl ReelUnifie {
    fn nouveau(rat: RationnelBorne, facteur: Facteur) -> Self {
        // zéro : facteur canonique
        if rat.is_zero() {
            return Self::zero();
        }
        ReelUnifie { rat, facteur }
    }

    pub fn avec_constante(rat: RationnelBorne, c: Nommee) -> Self {
        Self::nouveau(rat, Facteur::Nomme(c))
    }

    pub fn rationnel(rat: RationnelBorne) -> Self {
        Self::avec_constante(rat, Nommee::Un)
    }

    pub fn entier(n: i64) -> Self {
        Self::rationnel(RationnelBorne::entier(n))
    }

    pub fn from_bigint(n: BigInt) -> Self {
        Self::rationnel(RationnelBorne::from_bigint(n))
    }

    /// Réel constructif quelconque (plus comparable exactement).
    pub fn libre(r: ReelConstructif) -> Self {
        ReelUnifie {
            rat: RationnelBorne::un(),
            facteur: Facteur::Libre(r),
        }
    }

    pub fn zero() -> Self {
        ReelUnifie {
            rat: RationnelBorne::zero(),
            facteur: Facteur::Nomme(Nommee::Un),
        }
    }

    pub fn un() -> Self {
        Self::entier(1)
    }

    pub fn moins_un() -> Self {
        Self::entier(-1)
    }

    pub fn deux() -> Self {
        Self::entier(2)
    }

    pub fn dix() -> Self {
        Self::entier(10)
    }

    pub fn demi() -> Self {
        Self::rationnel(q(1, 2))
    }

    pub fn pi() -> Self {
        Self::avec_constante(RationnelBorne::un(), Nommee::Pi)
    }

    pub fn e() -> Self {
        Self::avec_constante(RationnelBorne::un(), Nommee::E)
    }

    /// π/180
    pub fn radians_par_degre() -> Self {
        Self::avec_constante(q(1, 180), Nommee::Pi)
    }

    fn pi_fois(n: i64, d: i64) -> Self {
        Self::avec_constante(q(n, d), Nommee::Pi)
    }

    fn racine_fois(n: i64, d: i64, r: u32) -> Self {
        Self::avec_constante(q(n, d), Nommee::Racine(r))
    }

    /* ------------------------ Accès ------------------------ */

    /// Le réel constructif de même valeur.
    pub fn cr_value(&self) -> ReelConstructif {
        if self.rat.is_zero() {
            return ReelConstructif::zero();
        }
        if self.rat.is_one() {
            return self.facteur.reel();
        }
        self.rat.reel().multiply(&self.facteur.reel())
    }

    /// Valeur rationnelle exacte si connue.
    pub fn bounded_rational_value(&self) -> Option<&RationnelBorne> {
        if self.facteur.est(Nommee::Un) || self.rat.is_zero() {
            Some(&self.rat)
        } else {
            None
        }
    }

    pub fn big_integer_value(&self) -> Option<BigInt> {
        self.bounded_rational_value()?.to_bigint()
    }

    pub fn constante(&self) -> Option<Nommee> {
        self.facteur.nomme()
    }

    /* ------------------------ Prédicats sans approximation ------------------------ */

    pub fn definitely_zero(&self) -> bool {
        self.rat.is_zero()
    }

    pub fn definitely_non_zero(&self) -> bool {
        self.facteur.nomme().is_some() && !self.rat.is_zero()
    }

    pub fn definitely_one(&self) -> bool {
        self.facteur.est(Nommee::Un) && self.rat.is_one()
    }

    pub fn definitely_rational(&self) -> bool {
        self.bounded_rational_value().is_some()
    }

    pub fn definitely_irrational(&self) -> bool {
        !self.rat.is_zero() && self.facteur.nomme().is_some_and(|c| c != Nommee::Un)
    }

    pub fn definitely_algebraic(&self) -> bool {
        self.rat.is_zero() || self.facteur.nomme().is_some_and(Nommee::algebrique)
    }

    pub fn definitely_transcendental(&self) -> bool {
        !self.rat.is_zero()
            && self
                .facteur
                .nomme()
                .is_some_and(|c| matches!(c, Nommee::Pi | Nommee::E | Nommee::Ln(_)))
    }

    fn independant_de(&self, u: &Self) -> bool {
        match (self.facteur.nomme(), u.facteur.nomme()) {
            (Some(a), Some(b)) => independants(a, b),
            _ => false,
        }
    }

    /// Vrai seulement si l’inégalité se prouve sans approximation.
    pub fn definitely_not_equals(&self, u: &Self) -> bool {
        let nomme = self.facteur.nomme().is_some();
        let u_nomme = u.facteur.nomme().is_some();
        if nomme && u_nomme {
            if self.independant_de(u) {
                return !self.rat.is_zero() || !u.rat.is_zero();
            }
            if self.facteur.meme(&u.facteur) {
                return self.rat != u.rat;
            }
            return false;
        }
        if self.rat.is_zero() {
            return u_nomme && !u.rat.is_zero();
        }
        if u.rat.is_zero() {
            return nomme && !self.rat.is_zero();
        }
        false
    }

    /* ------------------------ Comparaisons ------------------------ */

    /// Vrai si `compare_to(u)` termine à coup sûr.
    pub fn is_comparable(&self, u: &Self) -> Resultat<bool> {
        if self.facteur.meme(&u.facteur) {
            if self.facteur.nomme().is_some() {
                return Ok(true);
            }
            if self.facteur.reel().signum_tol(TOLERANCE_DEFAUT)? != 0 {
                return Ok(true);
            }
        }
        if self.rat.is_zero() && u.rat.is_zero() {
            return Ok(true);
        }
        if self.independant_de(u) {
            return Ok(true);
        }
        Ok(self.cr_value().compare_tol(&u.cr_value(), TOLERANCE_DEFAUT)? != 0)
    }

    /// Comparaison exacte. Diverge (jusqu’à `Precision`) pour deux valeurs
    /// égales qui ne sont pas `is_comparable`.
    pub fn compare_to(&self, u: &Self) -> Resultat<Ordering> {
        if self.definitely_zero() && u.definitely_zero() {
            return Ok(Ordering::Equal);
        }
        if self.facteur.meme(&u.facteur) {
            let signe = match &self.facteur {
                Facteur::Nomme(_) => 1,
                Facteur::Libre(r) => r.signum()?,
            };
            let ord = self.rat.cmp(&u.rat);
            return Ok(if signe < 0 { ord.reverse() } else { ord });
        }
        Ok(self.cr_value().compare(&u.cr_value())?.cmp(&0))
    }

    /// Peut répondre `Equal` pour deux valeurs à moins de 2^a l’une de l’autre.
    pub fn compare_to_tol(&self, u: &Self, a: i32) -> Resultat<Ordering> {
        if self.is_comparable(u)? {
            return self.compare_to(u);
        }
        Ok(self.cr_value().compare_tol(&u.cr_value(), a)?.cmp(&0))
    }

    pub fn definitely_equals(&self, u: &Self) -> Resultat<bool> {
        Ok(self.is_comparable(u)? && self.compare_to(u)? == Ordering::Equal)
    }

    pub fn approx_equals(&self, u: &Self, a: i32) -> Resultat<bool> {
        if self.is_comparable(u)? {
            if self.independant_de(u) && (!self.rat.is_zero() || !u.rat.is_zero()) {
                return Ok(false);
            }
            return Ok(self.compare_to(u)? == Ordering::Equal);
        }
        Ok(self.cr_value().compare_tol(&u.cr_value(), a)? == 0)
    }

    pub fn signum_tol(&self, a: i32) -> Resultat<i32> {
        match &self.facteur {
            Facteur::Nomme(_) => Ok(self.rat.signum()),
            Facteur::Libre(_) => self.cr_value().signum_tol(a),
        }
    }

    /// Diverge pour un zéro à facteur libre.
    pub fn signum(&self) -> Resultat<i32> {
        match &self.facteur {
            Facteur::Nomme(_) => Ok(self.rat.signum()),
            Facteur::Libre(r) => Ok(self.rat.signum() * r.signum()?),
        }
    }

    /* ------------------------ Arithmétique ------------------------ */

    pub fn add(&self, u: &Self) -> Self {
        if self.facteur.meme(&u.facteur) {
            if let Some(r) = self.rat.add(&u.rat) {
                return Self::nouveau(r, self.facteur.clone());
            }
        }
        if self.definitely_zero() {
            return u.clone();
        }
        if u.definitely_zero() {
            return self.clone();
        }
        Self::libre(self.cr_value().add(&u.cr_value()))
    }

    pub fn negate(&self) -> Self {
        Self::nouveau(self.rat.negate(), self.facteur.clone())
    }

    pub fn subtract(&self, u: &Self) -> Self {
        self.add(&u.negate())
    }

    pub fn multiply(&self, u: &Self) -> Self {
        if self.facteur.est(Nommee::Un) {
            if let Some(r) = self.rat.multiply(&u.rat) {
                return Self::nouveau(r, u.facteur.clone());
            }
        }
        if u.facteur.est(Nommee::Un) {
            if let Some(r) = self.rat.multiply(&u.rat) {
                return Self::nouveau(r, self.facteur.clone());
            }
        }
        if self.definitely_zero() || u.definitely_zero() {
            return Self::zero();
        }
        if let (Some(a), Some(b)) = (self.facteur.nomme(), u.facteur.nomme()) {
            if let (Some(ca), Some(cb)) = (a.carre(), b.carre()) {
                // √a·√b = √(ab)
                let produit = self.rat.multiply(&u.rat);
                let racine = ca.multiply(&cb).and_then(|ab| Self::racine_rationnelle(&ab));
                if let (Some(p), Some(r)) = (produit, racine) {
                    if let Some(n) = p.multiply(&r.rat) {
                        return Self::nouveau(n, r.facteur);
                    }
                }
            }
        }
        Self::libre(self.cr_value().multiply(&u.cr_value()))
    }

    pub fn inverse(&self) -> Resultat<Self> {
        if self.definitely_zero() {
            return Err(ErreurNoyau::DivisionParZero);
        }
        if let Some(c) = self.facteur.nomme() {
            if let Some(carre) = c.carre() {
                // 1/(r√n) = √n/(r·n)
                if let Some(inv) = self.rat.multiply(&carre).and_then(|d| d.inverse()) {
                    return Ok(Self::nouveau(inv, self.facteur.clone()));
                }
            }
        }
        Ok(Self::libre(self.cr_value().inverse()))
    }

    pub fn divide(&self, u: &Self) -> Resultat<Self> {
        if self.facteur.meme(&u.facteur) {
            if u.definitely_zero() {
                return Err(ErreurNoyau::DivisionParZero);
            }
            if let Some(r) = self.rat.divide(&u.rat) {
                return Ok(Self::rationnel(r));
            }
        }
        Ok(self.multiply(&u.inverse()?))
    }

    /// r ≥ 0 : √r = s·√d avec s rationnel et d tabulé, si possible.
    fn racine_rationnelle(r: &RationnelBorne) -> Option<Self> {
        if r.is_zero() {
            return Some(Self::zero());
        }
        [1u32, 2, 3, 5, 6, 7, 10].iter().find_map(|&d| {
            let s = r.divide(&RationnelBorne::entier(i64::from(d)))?.sqrt()?;
            Some(Self::avec_constante(s, Nommee::racine_de(d)?))
        })
    }

    pub fn sqrt(&self) -> Resultat<Self> {
        if self.definitely_zero() {
            return Ok(Self::zero());
        }
        if self.facteur.nomme().is_some() && self.rat.is_negative() {
            return Err(ErreurNoyau::domaine("racine carrée d’un nombre négatif"));
        }
        if self.facteur.est(Nommee::Un) {
            if let Some(r) = Self::racine_rationnelle(&self.rat) {
                return Ok(r);
            }
        }
        Ok(Self::libre(self.cr_value().sqrt()))
    }

    /* ------------------------ Trigonométrie ------------------------ */

    /// k tel que la valeur = kπ/12 (mod 2π), k ∈ [0, 24).
    fn pi_douziemes(&self) -> Option<i64> {
        if self.definitely_zero() {
            return Some(0);
        }
        if !self.facteur.est(Nommee::Pi) {
            return None;
        }
        let k = self.rat.multiply(&RationnelBorne::entier(12))?.to_bigint()?;
        k.mod_floor(&BigInt::from(24)).to_i64()
    }

    pub fn sin(&self) -> Resultat<Self> {
        if let Some(r) = self.pi_douziemes().and_then(sin_pi_douziemes) {
            return Ok(r);
        }
        Ok(Self::libre(self.cr_value().sin()?))
    }

    pub fn cos(&self) -> Resultat<Self> {
        if let Some(r) = self
            .pi_douziemes()
            .and_then(|k| sin_pi_douziemes((k + 6) % 24))
        {
            return Ok(r);
        }
        Ok(Self::libre(self.cr_value().cos()?))
    }

    pub fn tan(&self) -> Resultat<Self> {
        if let Some(k) = self.pi_douziemes() {
            if let Some(r) = tan_pi_douziemes(k % 12)? {
                return Ok(r);
            }
        }
        self.sin()?.divide(&self.cos()?)
    }

    fn verifier_domaine_asin(&self) -> Resultat<()> {
        let un = Self::un();
        if self.is_comparable(&un)?
            && (self.compare_to(&un)? == Ordering::Greater
                || self.compare_to(&Self::moins_un())? == Ordering::Less)
        {
            return Err(ErreurNoyau::domaine("arcsin/arccos hors de [-1, 1]"));
        }
        Ok(())
    }

    pub fn asin(&self) -> Resultat<Self> {
        self.verifier_domaine_asin()?;
        if let Some(demis) = self.multiply(&Self::deux()).big_integer_value() {
            return match demis.to_i64() {
                Some(-2) => Ok(Self::pi_fois(-1, 2)),
                Some(-1) => Ok(Self::pi_fois(-1, 6)),
                Some(0) => Ok(Self::zero()),
                Some(1) => Ok(Self::pi_fois(1, 6)),
                Some(2) => Ok(Self::pi_fois(1, 2)),
                _ => Err(ErreurNoyau::domaine("arcsin/arccos hors de [-1, 1]")),
            };
        }
        let demi_rat = self.rat.multiply(&RationnelBorne::entier(2));
        let unitaire = demi_rat.as_ref().and_then(|d| d.to_bigint()).and_then(|d| d.to_i64());
        match (self.facteur.nomme(), unitaire) {
            (Some(Nommee::Racine(2)), Some(s @ (-1 | 1))) => return Ok(Self::pi_fois(s, 4)),
            (Some(Nommee::Racine(3)), Some(s @ (-1 | 1))) => return Ok(Self::pi_fois(s, 3)),
            _ => {}
        }
        Ok(Self::libre(self.cr_value().asin()?))
    }

    pub fn acos(&self) -> Resultat<Self> {
        Ok(Self::pi_fois(1, 2).subtract(&self.asin()?))
    }

    pub fn atan(&self) -> Resultat<Self> {
        if self.compare_to_tol(&Self::zero(), TOLERANCE_DEFAUT)? == Ordering::Less {
            return Ok(self.negate().atan()?.negate());
        }
        if let Some(n) = self.big_integer_value() {
            if n.is_zero() {
                return Ok(Self::zero());
            }
            if n.is_one() {
                return Ok(Self::pi_fois(1, 4));
            }
        }
        if self.facteur.est(Nommee::Racine(3)) {
            if self.rat == q(1, 3) {
                return Ok(Self::pi_fois(1, 6));
            }
            if self.rat.is_one() {
                return Ok(Self::pi_fois(1, 3));
            }
        }
        Ok(Self::libre(self.cr_value().atan()?))
    }

    /* ------------------------ Exponentielles ------------------------ */

    pub fn exp(&self) -> Resultat<Self> {
        if self.definitely_zero() {
            return Ok(Self::un());
        }
        if self.definitely_one() {
            return Ok(Self::e());
        }
        if let Some(base) = self.facteur.nomme().and_then(Nommee::exponentielle) {
            // exp(r·ln n) = n^r, r entier ou demi-entier
            let (exposant, racine) = match self.rat.to_bigint() {
                Some(n) => (Some(n), false),
                None => (
                    self.rat
                        .multiply(&RationnelBorne::entier(2))
                        .and_then(|d| d.to_bigint()),
                    true,
                ),
            };
            if let Some(e) = exposant {
                if let Some(p) = base.pow(&e)? {
                    let r = Self::rationnel(p);
                    return if racine { r.sqrt() } else { Ok(r) };
                }
            }
        }
        Ok(Self::libre(self.cr_value().exp()?))
    }

    pub fn ln(&self) -> Resultat<Self> {
        if self.facteur.est(Nommee::E) {
            // ln(r·e) = ln(r) + 1
            return Ok(Self::rationnel(self.rat.clone()).ln()?.add(&Self::un()));
        }
        if self.is_comparable(&Self::zero())? {
            if self.signum()? <= 0 {
                return Err(ErreurNoyau::domaine("logarithme d’un nombre négatif ou nul"));
            }
            match self.compare_to_tol(&Self::un(), TOLERANCE_DEFAUT)? {
                Ordering::Equal => {
                    if self.definitely_equals(&Self::un())? {
                        return Ok(Self::zero());
                    }
                }
                Ordering::Less => return Ok(self.inverse()?.ln()?.negate()),
                Ordering::Greater => {}
            }
            if let Some(n) = self.rat.to_bigint() {
                if let Some(r) = self.ln_exact(&n)? {
                    return Ok(r);
                }
            }
        }
        Ok(Self::libre(self.cr_value().ln()?))
    }

    /// ln(n^k) = k·ln(n) ; ln(n^k·√n) = (k + 1/2)·ln(n).
    fn ln_exact(&self, n: &BigInt) -> Resultat<Option<Self>> {
        match self.facteur.nomme() {
            Some(Nommee::Un) => {
                for &base in &LOGS {
                    let k = log_entier(n, base)?;
                    if k != 0 {
                        let rat = RationnelBorne::from_bigint(BigInt::from(k));
                        return Ok(Some(Self::avec_constante(rat, Nommee::Ln(base))));
                    }
                }
                Ok(None)
            }
            Some(Nommee::Racine(base)) if LOGS.contains(&base) => {
                let k = log_entier(n, base)?;
                if k == 0 {
                    return Ok(None);
                }
                let rat = RationnelBorne::from_bigint(BigInt::from(k)).add(&q(1, 2));
                Ok(rat.map(|r| Self::avec_constante(r, Nommee::Ln(base))))
            }
            _ => Ok(None),
        }
    }

    /// x^y
    pub fn pow(&self, expon: &Self) -> Resultat<Self> {
        if self.facteur.est(Nommee::E) {
            // (r·e)^y = r^y · e^y
            if self.rat.is_one() {
                return expon.exp();
            }
            let base = Self::rationnel(self.rat.clone());
            return Ok(base.pow(expon)?.multiply(&expon.exp()?));
        }
        if let Some(r) = expon.bounded_rational_value() {
            if let Some(n) = r.to_bigint() {
                return self.pow_entier(&n);
            }
            let double = r.multiply(&RationnelBorne::entier(2));
            if let Some(n2) = double.and_then(|d| d.to_bigint()) {
                return self.pow_entier(&n2)?.sqrt();
            }
        }
        if self.definitely_zero() {
            return match expon.signum_tol(TOLERANCE_DEFAUT)? {
                s if s > 0 => Ok(Self::zero()),
                s if s < 0 => Err(ErreurNoyau::DivisionParZero),
                _ => Err(ErreurNoyau::domaine("0 à une puissance indécidable")),
            };
        }
        if self.signum_tol(TOLERANCE_DEFAUT)? < 0 {
            return Err(ErreurNoyau::domaine("base négative, exposant non entier"));
        }
        let ln = self.cr_value().ln()?;
        Ok(Self::libre(ln.multiply(&expon.cr_value()).exp()?))
    }

    fn pow_entier(&self, exp: &BigInt) -> Resultat<Self> {
        if exp.is_one() {
            return Ok(self.clone());
        }
        if exp.is_zero() {
            return Ok(Self::un());
        }
        if self.definitely_zero() && exp.is_negative() {
            return Err(ErreurNoyau::DivisionParZero);
        }
        let abs_exp = exp.abs();
        if self.facteur.est(Nommee::Un) && abs_exp.bits() <= LIMITE_DURE_POW_BITS {
            if let Some(p) = self.rat.pow(exp)? {
                return Ok(Self::rationnel(p));
            }
        }
        if abs_exp > BigInt::from(LIMITE_POW_RECURSIF) {
            return self.exp_ln_pow(exp);
        }
        if let Some(c) = self.facteur.nomme() {
            if let Some(carre) = c.carre() {
                // (r√n)^k = r^k · n^⌊k/2⌋ · (√n si k impair)
                let demi_exp: BigInt = exp >> 1usize;
                if let (Some(rk), Some(nk)) = (self.rat.pow(exp)?, carre.pow(&demi_exp)?) {
                    if let Some(rat) = rk.multiply(&nk) {
                        let facteur = if exp.is_odd() {
                            self.facteur.clone()
                        } else {
                            Facteur::Nomme(Nommee::Un)
                        };
                        return Ok(Self::nouveau(rat, facteur));
                    }
                }
            }
        }
        self.exp_ln_pow(exp)
    }

    fn exp_ln_pow(&self, exp: &BigInt) -> Resultat<Self> {
        let n = ReelConstructif::from_bigint(exp.clone());
        match self.signum_tol(TOLERANCE_DEFAUT)? {
            s if s > 0 => Ok(Self::libre(self.cr_value().ln()?.multiply(&n).exp()?)),
            s if s < 0 => {
                let r = self.cr_value().negate().ln()?.multiply(&n).exp()?;
                Ok(Self::libre(if exp.is_odd() { r.negate() } else { r }))
            }
            _ => {
                if exp.is_positive() {
                    Ok(Self::libre(puissance_recursive(&self.cr_value(), exp)?))
                } else {
                    let p = puissance_recursive(&self.cr_value(), &-exp)?;
                    Ok(Self::libre(p.inverse()))
                }
            }
        }
    }

    /// n! pour n entier (à la tolérance près) et petit.
    pub fn fact(&self) -> Resultat<Self> {
        let n = match self.big_integer_value() {
            Some(n) => n,
            None => {
                let n = self.cr_value().get_appr(0)?;
                if !self.approx_equals(&Self::from_bigint(n.clone()), TOLERANCE_DEFAUT)? {
                    return Err(ErreurNoyau::domaine("factorielle d’un non-entier"));
                }
                n
            }
        };
        if n.is_negative() {
            return Err(ErreurNoyau::domaine("factorielle d’un nombre négatif"));
        }
        if n.bits() > FACTORIELLE_MAX_BITS {
            return Err(ErreurNoyau::domaine("argument de factorielle trop grand"));
        }
        let n = n.to_u64().unwrap_or(0);
        Ok(Self::from_bigint(factorielle_partielle(n, 1)?))
    }

    /* ------------------------ Affichage ------------------------ */

    /// Nombre de décimales pour un affichage exact, `None` si infini ou inconnu.
    pub fn digits_required(&self) -> Option<u64> {
        self.bounded_rational_value()?.digits_required()
    }

    /// `to_nice_string` donne une forme exacte.
    pub fn exactly_displayable(&self) -> bool {
        self.facteur.nomme().is_some() || self.rat.is_zero()
    }

    /// La troncature est décidable (rationnel ou irrationnel prouvé).
    pub fn exactly_truncatable(&self) -> bool {
        self.definitely_rational() || self.definitely_irrational()
    }

    /// "3/4", "2π", "(1/2)e", "-√2", sinon développement décimal.
    pub fn to_nice_string(&self) -> Resultat<String> {
        if self.rat.is_zero() {
            return Ok("0".to_string());
        }
        match &self.facteur {
            Facteur::Nomme(Nommee::Un) => Ok(self.rat.to_nice_string()),
            Facteur::Nomme(c) => Ok(format_coeff_nom(self.rat.ratio(), &c.nom())),
            Facteur::Libre(_) => self.cr_value().to_string_decimal(10),
        }
    }

    /// Exactement `n` décimales, troncature vers zéro quand c’est décidable,
    /// sinon avec PRECISION_EN_PLUS bits de marge (presque toujours juste).
    pub fn to_string_truncated(&self, n: usize) -> Resultat<String> {
        if let Some(r) = self.bounded_rational_value() {
            return Ok(r.to_string_truncated(n));
        }
        let scaled = self.cr_value().multiply(&ReelConstructif::from_bigint(pow10(n)));
        let (negatif, magnitude) = if self.exactly_truncatable() {
            let a = scaled.get_appr(0)?;
            let negatif = a.is_negative();
            let mut m = a.abs();
            if !m.is_zero() {
                let cible = if negatif { scaled.negate() } else { scaled };
                if ReelConstructif::from_bigint(m.clone()).compare(&cible)? > 0 {
                    m -= 1;
                }
            }
            (negatif, m)
        } else {
            let a = scaled.get_appr(-PRECISION_EN_PLUS)?;
            (a.is_negative(), a.abs() >> (PRECISION_EN_PLUS as usize))
        };
        Ok(format_tronque(negatif, &magnitude, n))
    }

    pub fn to_f64(&self) -> Resultat<f64> {
        if let Some(r) = self.bounded_rational_value() {
            return Ok(r.to_f64().unwrap_or(f64::NAN));
        }
        self.cr_value().to_f64()
    }
}

impl fmt::Debug for ReelUnifie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.facteur {
            Facteur::Nomme(c) => write!(f, "ReelUnifie({} × {})", self.rat, c.nom()),
            Facteur::Libre(r) => write!(f, "ReelUnifie({} × {r:?})", self.rat),
        }
    }
}

/* ------------------------ Tables trigonométriques ------------------------ */

/// sin(kπ/12), k ∈ [0, 24), quand la valeur est simple.
fn sin_pi_douziemes(k: i64) -> Option<ReelUnifie> {
    if k >= 12 {
        return sin_pi_douziemes(k - 12).map(|r| r.negate());
    }
    match k {
        0 => Some(ReelUnifie::zero()),
        2 => Some(ReelUnifie::demi()),
        3 => Some(ReelUnifie::racine_fois(1, 2, 2)),
        4 => Some(ReelUnifie::racine_fois(1, 2, 3)),
        6 => Some(ReelUnifie::un()),
        7..=11 => sin_pi_douziemes(12 - k),
        _ => None,
    }
}

/// tan(kπ/12), k ∈ [0, 12). `Err` pour π/2.
fn tan_pi_douziemes(k: i64) -> Resultat<Option<ReelUnifie>> {
    Ok(match k {
        0 => Some(ReelUnifie::zero()),
        2 => Some(ReelUnifie::racine_fois(1, 3, 3)),
        3 => Some(ReelUnifie::un()),
        4 => Some(ReelUnifie::racine_fois(1, 1, 3)),
        6 => return Err(ErreurNoyau::domaine("tangente indéfinie")),
        8 => Some(ReelUnifie::racine_fois(-1, 1, 3)),
        9 => Some(ReelUnifie::moins_un()),
        10 => Some(ReelUnifie::racine_fois(-1, 3, 3)),
        _ => None,
    })
}

/* ------------------------ Outils entiers ------------------------ */

/// k si n = base^k (k >= 1), sinon 0.
fn log_entier(n: &BigInt, base: u32) -> Resultat<u64> {
    if n <= &BigInt::one() {
        return Ok(0);
    }
    // tri rapide en flottant (inutile si n dépasse f64)
    if let Some(f) = n.to_f64().filter(|f| f.is_finite()) {
        let approx = f.ln() / f64::from(base).ln();
        if (approx - approx.round()).abs() > 1.0e-6 {
            return Ok(0);
        }
    }
    let b = BigInt::from(base);
    let mut reste = n.clone();
    let mut k = 0u64;
    while !reste.is_one() {
        let (quot, rem) = reste.div_rem(&b);
        if !rem.is_zero() {
            return Ok(0);
        }
        annulation::verifier()?;
        reste = quot;
        k += 1;
    }
    Ok(k)
}

fn puissance_recursive(base: &ReelConstructif, exp: &BigInt) -> Resultat<ReelConstructif> {
    if exp.is_one() {
        return Ok(base.clone());
    }
    if exp.is_odd() {
        let reste = puissance_recursive(base, &(exp - 1))?;
        return Ok(base.multiply(&reste));
    }
    let moitie = puissance_recursive(base, &(exp >> 1usize))?;
    annulation::verifier()?;
    Ok(moitie.multiply(&moitie))
}

/// n·(n−step)·(n−2·step)… en diviser-pour-régner.
fn factorielle_partielle(n: u64, step: u64) -> Resultat<BigInt> {
    if n > 4 * step {
        let a = factorielle_partielle(n, 2 * step)?;
        annulation::verifier()?;
        let b = factorielle_partielle(n - step, 2 * step)?;
        annulation::verifier()?;
        return Ok(a * b);
    }
    if n == 0 {
        return Ok(BigInt::one());
    }
    let mut res = BigInt::from(n);
    let mut i = n.saturating_sub(step);
    while i > 1 {
        res *= i;
        i = i.saturating_sub(step);
    }
    Ok(res)
}
