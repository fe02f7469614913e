// src/noyau/jetons.rs
//
// Jetons d’une expression : opérateur, constante en cours de saisie,
// référence à une expression déjà évaluée.

use std::io::{Read, Write};
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::Zero;

use super::erreurs::{ErreurNoyau, Resultat};
use super::format::{grouper_milliers, pow10};
use super::localisation::Localisation;
use super::rationnel::RationnelBorne;
use super::touches::Touche;

/// Exposant décimal maximal (en valeur absolue) d’une constante.
pub const EXPOSANT_MAX: i32 = 10_000;

const TAG_CONSTANTE: u8 = 0;
const TAG_PRE_EVAL: u8 = 2;
/// Tout octet >= 0x20 est un opérateur.
const TAG_OPERATEUR_MIN: u8 = 0x20;

const DRAPEAU_POINT: u8 = 0x1;
const DRAPEAU_EXPOSANT: u8 = 0x2;

/// Texte affiché d’un jeton et, si connue, sa description parlée.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rendu {
    pub texte: String,
    pub description: Option<String>,
}

/* ------------------------ Constante ------------------------ */

/// Nombre en cours de saisie : `entier[.fraction][E exposant]`.
/// Un exposant nul signifie « pas d’exposant ».
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Constante {
    entier: String,
    fraction: String,
    point: bool,
    exposant: i32,
}

impl Constante {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ajoute un chiffre ou le point. `false` si refusé.
    pub fn ajouter(&mut self, t: Touche) -> bool {
        if t == Touche::Point {
            if self.point || self.exposant != 0 {
                return false;
            }
            self.point = true;
            return true;
        }
        let Some(v) = t.valeur_chiffre() else {
            return false;
        };
        if self.exposant != 0 {
            let v = i32::from(v);
            let suivant = if self.exposant > 0 {
                10 * self.exposant + v
            } else {
                10 * self.exposant - v
            };
            return self.ajouter_exposant(suivant);
        }
        let c = char::from(b'0' + v);
        if self.point {
            self.fraction.push(c);
        } else {
            self.entier.push(c);
        }
        true
    }

    /// `false` (exposant inchangé) au-delà de ±EXPOSANT_MAX.
    pub fn ajouter_exposant(&mut self, exp: i32) -> bool {
        if exp.unsigned_abs() > EXPOSANT_MAX.unsigned_abs() {
            return false;
        }
        self.exposant = exp;
        true
    }

    /// Retire le dernier caractère saisi : exposant, fraction, point, entier.
    pub fn supprimer(&mut self) {
        if self.exposant != 0 {
            // revenu à zéro, l’exposant ne repart que par ajouter_exposant
            self.exposant /= 10;
        } else if !self.fraction.is_empty() {
            self.fraction.pop();
        } else if self.point {
            self.point = false;
        } else {
            self.entier.pop();
        }
    }

    pub fn est_vide(&self) -> bool {
        !self.point && self.entier.is_empty()
    }

    pub fn exposant(&self) -> i32 {
        self.exposant
    }

    /// Valeur exacte. Il faut au moins un chiffre : "." seul n’a pas de valeur.
    pub fn to_rational(&self) -> Resultat<RationnelBorne> {
        if self.entier.is_empty() && self.fraction.is_empty() {
            return Err(ErreurNoyau::syntaxe("constante sans chiffre"));
        }
        if self.exposant.unsigned_abs() > EXPOSANT_MAX.unsigned_abs() {
            return Err(ErreurNoyau::domaine("exposant trop grand"));
        }
        let chiffres = format!(
            "{}{}",
            if self.entier.is_empty() { "0" } else { &self.entier },
            self.fraction
        );
        let mut num = BigInt::parse_bytes(chiffres.as_bytes(), 10)
            .ok_or_else(|| ErreurNoyau::syntaxe("constante illisible"))?;
        let mut den = pow10(self.fraction.len());
        let mag = pow10(self.exposant.unsigned_abs() as usize);
        if self.exposant > 0 {
            num *= mag;
        } else if self.exposant < 0 {
            den *= mag;
        }
        if num.is_zero() {
            return Ok(RationnelBorne::zero());
        }
        RationnelBorne::nouveau(num, den)
    }

    /// Texte brut ('.' décimal, ',' milliers) avant traduction.
    fn texte_brut(&self) -> String {
        let mut s = if self.exposant != 0 {
            self.entier.clone()
        } else {
            grouper_milliers(&self.entier, ',')
        };
        if self.point {
            s.push('.');
            s.push_str(&self.fraction);
        }
        if self.exposant != 0 {
            s.push('E');
            s.push_str(&self.exposant.to_string());
        }
        s
    }

    fn ecrire(&self, w: &mut impl Write) -> Resultat<()> {
        w.write_all(&[TAG_CONSTANTE])?;
        ecrire_chaine(w, &self.entier)?;
        let mut drapeaux = 0;
        if self.point {
            drapeaux |= DRAPEAU_POINT;
        }
        if self.exposant != 0 {
            drapeaux |= DRAPEAU_EXPOSANT;
        }
        w.write_all(&[drapeaux])?;
        if self.point {
            ecrire_chaine(w, &self.fraction)?;
        }
        if self.exposant != 0 {
            ecrire_i32(w, self.exposant)?;
        }
        Ok(())
    }

    fn lire(r: &mut impl Read) -> Resultat<Self> {
        let entier = lire_chiffres(r)?;
        let drapeaux = lire_u8(r)?;
        let point = drapeaux & DRAPEAU_POINT != 0;
        let fraction = if point { lire_chiffres(r)? } else { String::new() };
        let exposant = if drapeaux & DRAPEAU_EXPOSANT != 0 {
            lire_i32(r)?
        } else {
            0
        };
        if exposant.unsigned_abs() > EXPOSANT_MAX.unsigned_abs() {
            return Err(ErreurNoyau::Format(format!("exposant hors bornes: {exposant}")));
        }
        Ok(Constante {
            entier,
            fraction,
            point,
            exposant,
        })
    }
}

/// "3.25E-7" -> constante (utile aux tests et au collage).
impl std::str::FromStr for Constante {
    type Err = ErreurNoyau;

    fn from_str(s: &str) -> Resultat<Self> {
        let (mantisse, exposant) = match s.split_once(['E', 'e']) {
            Some((m, e)) => (
                m,
                e.parse::<i32>()
                    .map_err(|_| ErreurNoyau::syntaxe(format!("exposant invalide: {e:?}")))?,
            ),
            None => (s, 0),
        };
        let mut c = Constante::new();
        for ch in mantisse.chars() {
            let t = match ch {
                '.' => Touche::Point,
                _ => ch
                    .to_digit(10)
                    .and_then(|d| Touche::chiffre(d as u8))
                    .ok_or_else(|| ErreurNoyau::syntaxe(format!("caractère inattendu: '{ch}'")))?,
            };
            if !c.ajouter(t) {
                return Err(ErreurNoyau::syntaxe(format!("constante invalide: {s:?}")));
            }
        }
        if c.est_vide() {
            return Err(ErreurNoyau::syntaxe("constante vide"));
        }
        if !c.ajouter_exposant(exposant) {
            return Err(ErreurNoyau::syntaxe(format!("exposant trop grand: {exposant}")));
        }
        Ok(c)
    }
}

/* ------------------------ PreEval ------------------------ */

/// Référence à une expression déjà évaluée, avec son texte court figé.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreEval {
    pub index: i64,
    court: Arc<str>,
}

impl PreEval {
    pub fn new(index: i64, court: &str) -> Self {
        PreEval {
            index,
            court: Arc::from(court),
        }
    }

    pub fn court(&self) -> &str {
        &self.court
    }

    /// Le texte court a été tronqué.
    pub fn has_ellipsis(&self) -> bool {
        self.court.ends_with('…')
    }

    fn ecrire(&self, w: &mut impl Write) -> Resultat<()> {
        let index = i32::try_from(self.index).map_err(|_| {
            ErreurNoyau::Format(format!("index {} hors de 32 bits", self.index))
        })?;
        w.write_all(&[TAG_PRE_EVAL])?;
        ecrire_i32(w, index)?;
        ecrire_chaine(w, &self.court)
    }

    fn lire(r: &mut impl Read) -> Resultat<Self> {
        let index = i64::from(lire_i32(r)?);
        let court = lire_chaine(r)?;
        Ok(PreEval::new(index, &court))
    }
}

/* ------------------------ Jeton ------------------------ */

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Operator(Touche),
    Constant(Constante),
    PreEval(PreEval),
}

impl Token {
    pub fn est_operateur(&self, t: Touche) -> bool {
        matches!(self, Token::Operator(o) if *o == t)
    }

    pub fn operateur(&self) -> Option<Touche> {
        match self {
            Token::Operator(t) => Some(*t),
            _ => None,
        }
    }

    pub fn rendu(&self, loc: &Localisation) -> Rendu {
        match self {
            Token::Operator(t) => Rendu {
                texte: loc.libelle(*t).to_string(),
                description: loc.description(*t).map(str::to_string),
            },
            Token::Constant(c) => Rendu {
                texte: loc.traduire_resultat(&c.texte_brut()),
                description: None,
            },
            // déjà figé à l’abréviation : pas retraduit
            Token::PreEval(p) => Rendu {
                texte: p.court().to_string(),
                description: None,
            },
        }
    }

    pub fn ecrire(&self, w: &mut impl Write) -> Resultat<()> {
        match self {
            Token::Operator(t) => {
                let b = t.vers_octet().ok_or_else(|| {
                    ErreurNoyau::Format(format!("touche {t:?} sans octet"))
                })?;
                w.write_all(&[b])?;
                Ok(())
            }
            Token::Constant(c) => c.ecrire(w),
            Token::PreEval(p) => p.ecrire(w),
        }
    }

    pub fn lire(r: &mut impl Read) -> Resultat<Self> {
        let tag = lire_u8(r)?;
        if tag >= TAG_OPERATEUR_MIN {
            return Touche::depuis_octet(tag)
                .map(Token::Operator)
                .ok_or_else(|| ErreurNoyau::Format(format!("opérateur inconnu: 0x{tag:02x}")));
        }
        match tag {
            TAG_CONSTANTE => Ok(Token::Constant(Constante::lire(r)?)),
            TAG_PRE_EVAL => {
                let p = PreEval::lire(r)?;
                if p.index == -1 {
                    // enregistrement corrompu : constante ".", refusée à l’évaluation
                    tracing::warn!(court = p.court(), "référence -1 remplacée par \".\"");
                    let mut c = Constante::new();
                    c.ajouter(Touche::Point);
                    return Ok(Token::Constant(c));
                }
                Ok(Token::PreEval(p))
            }
            _ => Err(ErreurNoyau::Format(format!("type de jeton inconnu: {tag}"))),
        }
    }
}

/* ------------------------ Octets ------------------------ */

pub(crate) fn ecrire_i32(w: &mut impl Write, v: i32) -> Resultat<()> {
    w.write_all(&v.to_be_bytes())?;
    Ok(())
}

pub(crate) fn lire_i32(r: &mut impl Read) -> Resultat<i32> {
    let mut b = [0u8; 4];
    r.read_exact(&mut b)?;
    Ok(i32::from_be_bytes(b))
}

fn lire_u8(r: &mut impl Read) -> Resultat<u8> {
    let mut b = [0u8; 1];
    r.read_exact(&mut b)?;
    Ok(b[0])
}

/// Longueur u16 big-endian puis UTF-8.
fn ecrire_chaine(w: &mut impl Write, s: &str) -> Resultat<()> {
    let n = u16::try_from(s.len())
        .map_err(|_| ErreurNoyau::Format(format!("chaîne trop longue ({} octets)", s.len())))?;
    w.write_all(&n.to_be_bytes())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

fn lire_chaine(r: &mut impl Read) -> Resultat<String> {
    let mut n = [0u8; 2];
    r.read_exact(&mut n)?;
    let mut b = vec![0u8; usize::from(u16::from_be_bytes(n))];
    r.read_exact(&mut b)?;
    String::from_utf8(b).map_err(|e| ErreurNoyau::Format(format!("UTF-8 invalide: {e}")))
}

fn lire_chiffres(r: &mut impl Read) -> Resultat<String> {
    let s = lire_chaine(r)?;
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ErreurNoyau::Format(format!("chiffres attendus: {s:?}")));
    }
    Ok(s)
}
