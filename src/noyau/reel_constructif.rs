// src/noyau/reel_constructif.rs
//
// Réels constructifs (approximation paresseuse)
// ---------------------------------------------
// Un réel x est un nœud partagé capable de fournir, pour toute précision p,
// un entier a tel que |a·2^p − x| < 2^p.
//
// - Chaque nœud garde en cache sa meilleure approximation.
// - Une demande moins fine est servie par arrondi du cache.
// - Les fonctions transcendantes réduisent leur argument, puis somment une série.
//
// Précisions en bits, négatives = sous la virgule (p = -10 => 2^-10).

use std::cell::Cell;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::annulation;
use super::erreurs::{ErreurNoyau, Resultat};
use super::format::{format_tronque, pow10};

/// |p| doit rester sous cette borne, sinon `ErreurNoyau::Precision`.
pub const PRECISION_MAX: i32 = 1 << 28;

thread_local! {
    static APPROXIMATIONS: Cell<u64> = const { Cell::new(0) };
}

/// Nombre d’appels à `get_appr` faits sur le thread courant.
///
/// Sert d’instrumentation : un chemin exact ne doit jamais l’incrémenter.
pub fn compteur_approximations() -> u64 {
    APPROXIMATIONS.with(|c| c.get())
}

fn verifier_precision(p: i32) -> Resultat<()> {
    if p <= -PRECISION_MAX || p >= PRECISION_MAX {
        Err(ErreurNoyau::Precision)
    } else {
        Ok(())
    }
}

/// k·2^n, arrondi au plus proche.
fn decaler(k: &BigInt, n: i32) -> BigInt {
    if n >= 0 {
        k << (n as usize)
    } else {
        let ajuste: BigInt = (k >> ((-(n as i64) - 1) as usize)) + 1;
        ajuste >> 1usize
    }
}

/// ceil(log2(|n| + 1)) : garde de bits pour les erreurs cumulées d’une série.
fn borne_log2(n: i32) -> i32 {
    let np1 = n.unsigned_abs() + 1;
    (32 - (np1 - 1).leading_zeros()) as i32
}

fn puissance_deux(n: i32) -> BigInt {
    BigInt::one() << (n.max(0) as usize)
}

/* ------------------------ Nœuds ------------------------ */

#[derive(Clone)]
pub struct ReelConstructif(Arc<Noeud>);

struct Noeud {
    op: Op,
    cache: Mutex<Option<Approx>>,
}

#[derive(Clone)]
struct Approx {
    prec: i32,
    valeur: BigInt,
}

impl Approx {
    fn msd(&self) -> i32 {
        self.prec + self.valeur.bits() as i32 - 1
    }

    fn significatif(&self) -> bool {
        self.valeur.abs() > BigInt::one()
    }
}

enum Op {
    Entier(BigInt),
    /// x·2^n
    Decale(ReelConstructif, i32),
    Oppose(ReelConstructif),
    Somme(ReelConstructif, ReelConstructif),
    Produit(ReelConstructif, ReelConstructif),
    Inverse(ReelConstructif),
    Racine(ReelConstructif),
    /// exp(x), |x| petit
    ExpSerie(ReelConstructif),
    /// ln(1+x), |x| < 1/2
    LnSerie(ReelConstructif),
    /// cos(x), |x| < 1
    CosSerie(ReelConstructif),
    /// atan(x), |x| <= 1/2
    AtanSerie(ReelConstructif),
    /// atan(1/q)
    AtanInverse(u32),
}

impl ReelConstructif {
    fn noeud(op: Op) -> Self {
        ReelConstructif(Arc::new(Noeud {
            op,
            cache: Mutex::new(None),
        }))
    }

    fn cache(&self) -> Option<Approx> {
        self.0
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn memoriser(&self, prec: i32, valeur: &BigInt) {
        let mut c = self.0.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let plus_fin = c.as_ref().map_or(true, |a| prec < a.prec);
        if plus_fin {
            *c = Some(Approx {
                prec,
                valeur: valeur.clone(),
            });
        }
    }

    /// Même nœud (identité, pas égalité numérique).
    pub fn ptr_eq(&self, o: &Self) -> bool {
        Arc::ptr_eq(&self.0, &o.0)
    }

    /* ------------------------ Constructeurs ------------------------ */

    pub fn from_bigint(n: BigInt) -> Self {
        Self::noeud(Op::Entier(n))
    }

    pub fn entier(n: i64) -> Self {
        Self::from_bigint(BigInt::from(n))
    }

    pub fn rationnel(r: &BigRational) -> Self {
        let num = Self::from_bigint(r.numer().clone());
        if r.denom().is_one() {
            return num;
        }
        num.divide(&Self::from_bigint(r.denom().clone()))
    }

    pub fn zero() -> Self {
        static ZERO: OnceLock<ReelConstructif> = OnceLock::new();
        ZERO.get_or_init(|| Self::entier(0)).clone()
    }

    pub fn un() -> Self {
        static UN: OnceLock<ReelConstructif> = OnceLock::new();
        UN.get_or_init(|| Self::entier(1)).clone()
    }

    /// Machin : π = 16·atan(1/5) − 4·atan(1/239).
    pub fn pi() -> Self {
        static PI: OnceLock<ReelConstructif> = OnceLock::new();
        PI.get_or_init(|| {
            let a5 = Self::noeud(Op::AtanInverse(5));
            let a239 = Self::noeud(Op::AtanInverse(239));
            a5.shift_left(4).subtract(&a239.shift_left(2))
        })
        .clone()
    }

    pub fn demi_pi() -> Self {
        static DEMI_PI: OnceLock<ReelConstructif> = OnceLock::new();
        DEMI_PI.get_or_init(|| Self::pi().shift_right(1)).clone()
    }

    /// e = exp(2^-10)^(2^10).
    pub fn e() -> Self {
        static E: OnceLock<ReelConstructif> = OnceLock::new();
        E.get_or_init(|| {
            let mut r = Self::noeud(Op::ExpSerie(Self::un().shift_right(10)));
            for _ in 0..10 {
                r = r.multiply(&r);
            }
            r
        })
        .clone()
    }

    /// ln 2 = 7·ln(10/9) − 2·ln(25/24) + 3·ln(81/80).
    pub fn ln2() -> Self {
        static LN2: OnceLock<ReelConstructif> = OnceLock::new();
        LN2.get_or_init(|| {
            let serie = |d: i64| Self::noeud(Op::LnSerie(Self::un().divide(&Self::entier(d))));
            let a = Self::entier(7).multiply(&serie(9));
            let b = Self::entier(2).multiply(&serie(24));
            let c = Self::entier(3).multiply(&serie(80));
            a.subtract(&b).add(&c)
        })
        .clone()
    }

    /// ln(n) pour un entier n >= 1, sans calcul d’approximation :
    /// n = 2^k·(1+x) avec |x| < 1/2.
    pub fn ln_entier(n: u64) -> Self {
        match n {
            0 | 1 => return Self::zero(),
            2 => return Self::ln2(),
            _ => {}
        }
        let mut k = 63 - n.leading_zeros();
        if 2 * u128::from(n) >= 3u128 << k {
            k += 1;
        }
        let puissance = BigInt::one() << (k as usize);
        let x = BigRational::new(BigInt::from(n) - &puissance, puissance);
        let reste = Self::noeud(Op::LnSerie(Self::rationnel(&x)));
        Self::entier(i64::from(k)).multiply(&Self::ln2()).add(&reste)
    }

    /* ------------------------ Opérations paresseuses ------------------------ */

    pub fn add(&self, o: &Self) -> Self {
        Self::noeud(Op::Somme(self.clone(), o.clone()))
    }

    pub fn negate(&self) -> Self {
        Self::noeud(Op::Oppose(self.clone()))
    }

    pub fn subtract(&self, o: &Self) -> Self {
        self.add(&o.negate())
    }

    pub fn multiply(&self, o: &Self) -> Self {
        Self::noeud(Op::Produit(self.clone(), o.clone()))
    }

    pub fn shift_left(&self, n: i32) -> Self {
        Self::noeud(Op::Decale(self.clone(), n))
    }

    pub fn shift_right(&self, n: i32) -> Self {
        Self::noeud(Op::Decale(self.clone(), -n))
    }

    /// 1/x. Pour x = 0, l’approximation ne termine qu’en erreur de précision.
    pub fn inverse(&self) -> Self {
        Self::noeud(Op::Inverse(self.clone()))
    }

    pub fn divide(&self, o: &Self) -> Self {
        self.multiply(&o.inverse())
    }

    /// √x. Un argument négatif est détecté à l’approximation (`Domaine`).
    pub fn sqrt(&self) -> Self {
        Self::noeud(Op::Racine(self.clone()))
    }

    /* ------------------------ Transcendantes (réduction d’argument) ------------------------ */

    pub fn exp(&self) -> Resultat<Self> {
        let grossier = self.get_appr(-10)?;
        if grossier.abs() > BigInt::from(2) {
            let moitie = self.shift_right(1).exp()?;
            return Ok(moitie.multiply(&moitie));
        }
        Ok(Self::noeud(Op::ExpSerie(self.clone())))
    }

    pub fn ln(&self) -> Resultat<Self> {
        // en seizièmes
        let grossier = self.get_appr(-4)?;
        if grossier.is_negative() {
            return Err(ErreurNoyau::domaine("logarithme d’un nombre négatif"));
        }
        if grossier <= BigInt::from(8) {
            return Ok(self.inverse().ln()?.negate());
        }
        if grossier >= BigInt::from(24) {
            if grossier <= BigInt::from(64) {
                return Ok(self.sqrt().sqrt().ln()?.shift_left(2));
            }
            let bits_en_trop = grossier.bits() as i32 - 3;
            let reduit = self.shift_right(bits_en_trop).ln()?;
            return Ok(reduit.add(&Self::entier(bits_en_trop as i64).multiply(&Self::ln2())));
        }
        Ok(Self::noeud(Op::LnSerie(self.subtract(&Self::un()))))
    }

    pub fn cos(&self) -> Resultat<Self> {
        let demi_pis = self.divide(&Self::pi()).get_appr(-1)?;
        if demi_pis.abs() >= BigInt::from(2) {
            // retire un multiple entier de π
            let nb_pi = decaler(&demi_pis, -1);
            let ajustement = Self::pi().multiply(&Self::from_bigint(nb_pi.clone()));
            let reduit = self.subtract(&ajustement).cos()?;
            return Ok(if nb_pi.is_odd() { reduit.negate() } else { reduit });
        }
        if self.get_appr(-1)?.abs() >= BigInt::from(2) {
            // cos(2a) = 2cos²(a) − 1
            let c = self.shift_right(1).cos()?;
            return Ok(c.multiply(&c).shift_left(1).subtract(&Self::un()));
        }
        Ok(Self::noeud(Op::CosSerie(self.clone())))
    }

    pub fn sin(&self) -> Resultat<Self> {
        Self::demi_pi().subtract(self).cos()
    }

    pub fn atan(&self) -> Resultat<Self> {
        let grossier = self.get_appr(-4)?;
        if grossier.abs() <= BigInt::from(7) {
            return Ok(Self::noeud(Op::AtanSerie(self.clone())));
        }
        // atan(x) = 2·atan(x / (1 + √(1 + x²)))
        let un = Self::un();
        let denom = un.add(&un.add(&self.multiply(self)).sqrt());
        Ok(self.divide(&denom).atan()?.shift_left(1))
    }

    /// asin(x) = 2·atan(x / (1 + √(1 − x²))).
    pub fn asin(&self) -> Resultat<Self> {
        let un = Self::un();
        let denom = un.add(&un.subtract(&self.multiply(self)).sqrt());
        Ok(self.divide(&denom).atan()?.shift_left(1))
    }

    pub fn acos(&self) -> Resultat<Self> {
        Ok(Self::demi_pi().subtract(&self.asin()?))
    }

    /* ------------------------ Approximation ------------------------ */

    /// Entier a avec |a·2^p − x| < 2^p.
    pub fn get_appr(&self, p: i32) -> Resultat<BigInt> {
        verifier_precision(p)?;
        APPROXIMATIONS.with(|c| c.set(c.get() + 1));
        if let Some(a) = self.cache() {
            if a.prec <= p {
                return Ok(decaler(&a.valeur, a.prec - p));
            }
        }
        annulation::verifier()?;
        let v = self.0.op.approximer(p)?;
        self.memoriser(p, &v);
        Ok(v)
    }

    /// Position du chiffre binaire de poids fort si |x| > 2^n (à peu près), sinon `None`.
    fn msd(&self, n: i32) -> Resultat<Option<i32>> {
        if let Some(a) = self.cache() {
            if a.significatif() {
                return Ok(Some(a.msd()));
            }
        }
        self.get_appr(n.saturating_sub(1))?;
        Ok(self.cache().filter(Approx::significatif).map(|a| a.msd()))
    }

    /// Comme `msd`, en affinant progressivement la précision jusqu’à n.
    fn iter_msd(&self, n: i32) -> Resultat<Option<i32>> {
        let mut prec: i32 = 0;
        while i64::from(prec) > i64::from(n) + 30 {
            if let Some(m) = self.msd(prec)? {
                return Ok(Some(m));
            }
            verifier_precision(prec)?;
            annulation::verifier()?;
            prec = (prec * 3) / 2 - 16;
        }
        self.msd(n)
    }

    /* ------------------------ Comparaisons ------------------------ */

    /// -1, 0, 1. Peut répondre 0 si |x − y| < 2^a.
    pub fn compare_tol(&self, o: &Self, a: i32) -> Resultat<i32> {
        let besoin = a.saturating_sub(1);
        let x = self.get_appr(besoin)?;
        let y = o.get_appr(besoin)?;
        if x > &y + 1 {
            Ok(1)
        } else if x < &y - 1 {
            Ok(-1)
        } else {
            Ok(0)
        }
    }

    /// Comparaison décidée en affinant la précision.
    ///
    /// Ne termine pas pour deux valeurs égales : la boucle ne s’arrête qu’en
    /// `Precision` (précision hors bornes) ou `Interrompu`.
    pub fn compare(&self, o: &Self) -> Resultat<i32> {
        let mut a: i32 = -20;
        loop {
            verifier_precision(a)?;
            let c = self.compare_tol(o, a)?;
            if c != 0 {
                return Ok(c);
            }
            a = a.checked_mul(2).ok_or(ErreurNoyau::Precision)?;
        }
    }

    pub fn signum_tol(&self, a: i32) -> Resultat<i32> {
        if let Some(c) = self.cache() {
            if !c.valeur.is_zero() {
                return Ok(if c.valeur.is_negative() { -1 } else { 1 });
            }
        }
        let x = self.get_appr(a.saturating_sub(1))?;
        Ok(if x.is_zero() {
            0
        } else if x.is_negative() {
            -1
        } else {
            1
        })
    }

    /// Même mise en garde que `compare` : diverge pour zéro.
    pub fn signum(&self) -> Resultat<i32> {
        let mut a: i32 = -20;
        loop {
            verifier_precision(a)?;
            let s = self.signum_tol(a)?;
            if s != 0 {
                return Ok(s);
            }
            a = a.checked_mul(2).ok_or(ErreurNoyau::Precision)?;
        }
    }

    /* ------------------------ Sorties ------------------------ */

    /// `n` décimales, arrondi (dernier chiffre à ±1 près).
    pub fn to_string_decimal(&self, n: usize) -> Resultat<String> {
        let scaled = self.multiply(&Self::from_bigint(pow10(n)));
        let a = scaled.get_appr(0)?;
        Ok(format_tronque(a.is_negative(), &a.abs(), n))
    }

    pub fn to_f64(&self) -> Resultat<f64> {
        let a = self.get_appr(-64)?;
        Ok(a.to_f64().unwrap_or(f64::NAN) / 2f64.powi(64))
    }
}

impl fmt::Debug for ReelConstructif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nom = match &self.0.op {
            Op::Entier(n) => return write!(f, "ReelConstructif({n})"),
            Op::Decale(..) => "décalage",
            Op::Oppose(_) => "opposé",
            Op::Somme(..) => "somme",
            Op::Produit(..) => "produit",
            Op::Inverse(_) => "inverse",
            Op::Racine(_) => "racine",
            Op::ExpSerie(_) => "exp",
            Op::LnSerie(_) => "ln",
            Op::CosSerie(_) => "cos",
            Op::AtanSerie(_) => "atan",
            Op::AtanInverse(_) => "atan(1/q)",
        };
        write!(f, "ReelConstructif<{nom}>")
    }
}

/* ------------------------ Approximations par nœud ------------------------ */

impl Op {
    fn approximer(&self, p: i32) -> Resultat<BigInt> {
        match self {
            Op::Entier(n) => Ok(decaler(n, -p)),

            Op::Decale(x, n) => x.get_appr(p - n),

            Op::Oppose(x) => Ok(-x.get_appr(p)?),

            Op::Somme(a, b) => {
                let s = a.get_appr(p - 2)? + b.get_appr(p - 2)?;
                Ok(decaler(&s, -2))
            }

            Op::Produit(a, b) => approximer_produit(a, b, p),

            Op::Inverse(x) => approximer_inverse(x, p),

            Op::Racine(x) => {
                let a = x.get_appr(2 * p - 4)?;
                if a.is_negative() {
                    return Err(ErreurNoyau::domaine("racine carrée d’un nombre négatif"));
                }
                Ok(decaler(&a.sqrt(), -2))
            }

            Op::ExpSerie(x) => serie_exp(x, p),
            Op::LnSerie(x) => serie_ln(x, p),
            Op::CosSerie(x) => serie_cos(x, p),
            Op::AtanSerie(x) => serie_atan(x, p),
            Op::AtanInverse(q) => serie_atan_inverse(*q, p),
        }
    }
}

fn approximer_produit(a: &ReelConstructif, b: &ReelConstructif, p: i32) -> Resultat<BigInt> {
    let demi_prec = (p >> 1) - 1;
    let (x, y, msd_x) = match a.msd(demi_prec)? {
        Some(m) => (a, b, m),
        None => match b.msd(demi_prec)? {
            Some(m) => (b, a, m),
            // les deux facteurs sont trop petits
            None => return Ok(BigInt::zero()),
        },
    };
    let prec2 = p - msd_x - 3;
    let appr2 = y.get_appr(prec2)?;
    if appr2.is_zero() {
        return Ok(BigInt::zero());
    }
    let msd_y = prec2 + appr2.bits() as i32 - 1;
    let prec1 = p - msd_y - 3;
    let appr1 = x.get_appr(prec1)?;
    Ok(decaler(&(appr1 * appr2), prec1 + prec2 - p))
}

fn approximer_inverse(x: &ReelConstructif, p: i32) -> Resultat<BigInt> {
    let msd = x.iter_msd(i32::MIN)?.ok_or(ErreurNoyau::Precision)?;
    let inv_msd = 1 - msd;
    let chiffres = inv_msd - p + 3;
    let prec_besoin = msd - chiffres;
    let log_facteur = -p - prec_besoin;
    if log_facteur < 0 {
        return Ok(BigInt::zero());
    }
    let dividende = BigInt::one() << (log_facteur as usize);
    let diviseur = x.get_appr(prec_besoin)?;
    let abs_div = diviseur.abs();
    if abs_div.is_zero() {
        return Err(ErreurNoyau::DivisionParZero);
    }
    let quotient = (dividende + (&abs_div >> 1usize)) / &abs_div;
    Ok(if diviseur.is_negative() {
        -quotient
    } else {
        quotient
    })
}

/* ------------------------ Séries ------------------------ */
//
// Même schéma partout : on calcule à calc_prec (quelques bits de garde),
// on s’arrête quand le terme passe sous 2^(p-4), puis on arrondit à p.

fn serie_exp(x: &ReelConstructif, p: i32) -> Resultat<BigInt> {
    if p >= 1 {
        return Ok(BigInt::zero());
    }
    let iterations = -p / 2 + 2;
    let calc_prec = p - borne_log2(2 * iterations) - 4;
    let op_prec = p - 3;
    let op_appr = x.get_appr(op_prec)?;

    let un_scale = puissance_deux(-calc_prec);
    let mut terme = un_scale.clone();
    let mut somme = un_scale;
    let mut n: i32 = 0;
    let erreur_max = puissance_deux(p - 4 - calc_prec);

    while terme.abs() >= erreur_max {
        annulation::verifier()?;
        n += 1;
        terme = decaler(&(terme * &op_appr), op_prec) / n;
        somme += &terme;
    }
    Ok(decaler(&somme, calc_prec - p))
}

fn serie_ln(x: &ReelConstructif, p: i32) -> Resultat<BigInt> {
    if p >= 0 {
        return Ok(BigInt::zero());
    }
    let iterations = -p;
    let calc_prec = p - borne_log2(2 * iterations) - 4;
    let op_prec = p - 3;
    let op_appr = x.get_appr(op_prec)?;

    let mut x_n = decaler(&op_appr, op_prec - calc_prec);
    let mut terme = x_n.clone();
    let mut somme = terme.clone();
    let mut n: i32 = 1;
    let mut signe: i32 = 1;
    let erreur_max = puissance_deux(p - 4 - calc_prec);

    while terme.abs() >= erreur_max {
        annulation::verifier()?;
        n += 1;
        signe = -signe;
        x_n = decaler(&(&x_n * &op_appr), op_prec);
        terme = &x_n / (n * signe);
        somme += &terme;
    }
    Ok(decaler(&somme, calc_prec - p))
}

fn serie_cos(x: &ReelConstructif, p: i32) -> Resultat<BigInt> {
    if p >= 1 {
        return Ok(BigInt::zero());
    }
    let iterations = -p / 2 + 4;
    let calc_prec = p - borne_log2(2 * iterations) - 4;
    let op_prec = p - 2;
    let op_appr = x.get_appr(op_prec)?;

    let un_scale = puissance_deux(-calc_prec);
    let mut terme = un_scale.clone();
    let mut somme = un_scale;
    let mut n: i64 = 0;
    let erreur_max = puissance_deux(p - 4 - calc_prec);

    while terme.abs() >= erreur_max {
        annulation::verifier()?;
        n += 2;
        terme = decaler(&(terme * &op_appr), op_prec);
        terme = decaler(&(terme * &op_appr), op_prec);
        terme = terme / BigInt::from(-n * (n - 1));
        somme += &terme;
    }
    Ok(decaler(&somme, calc_prec - p))
}

/// atan(x) = x − x³/3 + x⁵/5 − …, pour |x| <= 1/2.
fn serie_atan(x: &ReelConstructif, p: i32) -> Resultat<BigInt> {
    if p >= 1 {
        return Ok(BigInt::zero());
    }
    let iterations = -p / 2 + 2;
    let calc_prec = p - borne_log2(2 * iterations) - 4;
    let op_prec = p - 3;
    let op_appr = x.get_appr(op_prec)?;

    let mut x_n = decaler(&op_appr, op_prec - calc_prec);
    let mut terme = x_n.clone();
    let mut somme = terme.clone();
    let mut n: i32 = 1;
    let mut signe: i32 = 1;
    let erreur_max = puissance_deux(p - 4 - calc_prec);

    while terme.abs() >= erreur_max {
        annulation::verifier()?;
        n += 2;
        signe = -signe;
        x_n = decaler(&(&x_n * &op_appr), op_prec);
        x_n = decaler(&(&x_n * &op_appr), op_prec);
        terme = &x_n / (n * signe);
        somme += &terme;
    }
    Ok(decaler(&somme, calc_prec - p))
}

/// atan(1/q) en entier scalé (troncature) via série:
/// atan(z) = z - z^3/3 + z^5/5 - ...
fn serie_atan_inverse(q: u32, p: i32) -> Resultat<BigInt> {
    if p >= 1 {
        return Ok(BigInt::zero());
    }
    let iterations = -p / 2 + 2;
    let calc_prec = p - borne_log2(2 * iterations) - 4;
    let scale = puissance_deux(-calc_prec);

    let q = BigInt::from(q);
    let q2 = &q * &q;
    let mut q_pow = q;
    let mut k: i64 = 0;
    let mut positif = true;
    let mut somme = BigInt::zero();

    loop {
        let terme = &scale / (&q_pow * BigInt::from(2 * k + 1));
        if terme.is_zero() {
            break;
        }
        if positif {
            somme += &terme;
        } else {
            somme -= &terme;
        }
        annulation::verifier()?;
        q_pow *= &q2;
        positif = !positif;
        k += 1;
    }
    Ok(decaler(&somme, calc_prec - p))
}
