//! Tests scientifiques (campagne) : propriétés du noyau + limites contrôlées.
//!
//! But : vérifier les garanties annoncées sans faire chauffer la machine.
//! - budget temps global
//! - expressions saisies touche par touche, comme au clavier
//! - comparaisons exactes quand le noyau les promet, tolérance sinon

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;

use super::erreurs::ErreurNoyau;
use super::eval::{evaluer_affichage, ResolveurExpr};
use super::expression::Expression;
use super::jetons::{Constante, Token, EXPOSANT_MAX};
use super::memoire::MemoireExpressions;
use super::reel_constructif::compteur_approximations;
use super::reel_unifie::ReelUnifie;
use super::touches::Touche::{self, *};

fn frappe(touches: &[Touche]) -> Expression {
    touches.iter().copied().collect()
}

fn eval_ok(touches: &[Touche], degres: bool) -> ReelUnifie {
    frappe(touches)
        .eval(degres, &MemoireExpressions::new())
        .unwrap_or_else(|e| panic!("touches={touches:?} err={e}"))
}

fn assert_exact_eq(touches: &[Touche], attendu: &str) {
    let v = eval_ok(touches, false);
    assert_eq!(v.to_nice_string().unwrap(), attendu, "touches={touches:?}");
}

/// Budget global anti-gel (scientifique + safe).
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Pourcentages ------------------------ */

#[test]
fn sci_pourcentage_additif() {
    // 100 + 10 % = 110
    assert_exact_eq(&[Chiffre1, Chiffre0, Chiffre0, OpAdd, Chiffre1, Chiffre0, OpPourcent], "110");
    // 100 + (10) % = 100.1
    let v = eval_ok(
        &[Chiffre1, Chiffre0, Chiffre0, OpAdd, ParenG, Chiffre1, Chiffre0, ParenD, OpPourcent],
        false,
    );
    let attendu = ReelUnifie::rationnel("100.1".parse::<Constante>().unwrap().to_rational().unwrap());
    assert!(v.definitely_equals(&attendu).unwrap());
}

#[test]
fn sci_pourcentage_dans_parentheses() {
    // (50 − 10%) = 45 : la parenthèse fermante termine le pourcentage
    assert_exact_eq(
        &[ParenG, Chiffre5, Chiffre0, OpSub, Chiffre1, Chiffre0, OpPourcent, ParenD, OpMul, Chiffre2],
        "90",
    );
}

/* ------------------------ Degrés / radians ------------------------ */

#[test]
fn sci_degres_sin_30() {
    let sin30 = [FunSin, ParenG, Chiffre3, Chiffre0, ParenD];
    let deg = eval_ok(&sin30, true);
    assert!(deg.definitely_equals(&ReelUnifie::demi()).unwrap());

    let rad = eval_ok(&sin30, false);
    assert!(!rad.definitely_rational());
    assert!(!rad.approx_equals(&ReelUnifie::demi(), -60).unwrap());
}

#[test]
fn sci_degres_inverses() {
    // arccos(1/2) = 60°, arctan(1) = 45°
    let acos = eval_ok(&[FunArccos, ParenG, Chiffre1, OpDiv, Chiffre2, ParenD], true);
    assert_eq!(acos.to_nice_string().unwrap(), "60");
    let atan = eval_ok(&[FunArctan, ParenG, Chiffre1, ParenD], true);
    assert_eq!(atan.to_nice_string().unwrap(), "45");
}

#[test]
fn sci_indefinis_tan() {
    for touches in [
        vec![FunTan, ParenG, ConstPi, OpDiv, Chiffre2, ParenD],
        vec![FunTan, ParenG, Chiffre3, ConstPi, OpDiv, Chiffre2, ParenD],
        vec![FunTan, ParenG, OpSub, ConstPi, OpDiv, Chiffre2, ParenD],
    ] {
        let r = frappe(&touches).eval(false, &MemoireExpressions::new());
        assert!(matches!(r, Err(ErreurNoyau::Domaine(_))), "{touches:?}: {r:?}");
    }
}

#[test]
fn sci_periodicite_angles() {
    // sin(π/4 + 2π) = sin(π/4)
    assert_exact_eq(
        &[FunSin, ParenG, ConstPi, OpDiv, Chiffre4, OpAdd, Chiffre2, ConstPi, ParenD],
        "(1/2)√2",
    );
    // cos(7π/3) = 1/2
    assert_exact_eq(&[FunCos, ParenG, Chiffre7, ConstPi, OpDiv, Chiffre3, ParenD], "1/2");
}

/* ------------------------ Multiplication implicite ------------------------ */

#[test]
fn sci_implicite_avec_abreviation() {
    let memoire = MemoireExpressions::new();
    let index = memoire.ajouter(frappe(&[ConstPi]), false);

    // [2, PreEval(π)] : construit à la main, add() mettrait un × explicite
    let mut implicite = frappe(&[Chiffre2]);
    implicite.append(&Expression::abbreviate(index, "π"));
    let explicite = frappe(&[Chiffre2, OpMul, ConstPi]);

    let a = implicite.eval(false, &memoire).unwrap();
    let b = explicite.eval(false, &memoire).unwrap();
    assert!(a.definitely_equals(&b).unwrap());
    assert_eq!(a.to_nice_string().unwrap(), "2π");
}

#[test]
fn sci_implicite_juxtapositions() {
    let implicite = eval_ok(&[Chiffre2, ConstPi, ConstE], false);
    let explicite = eval_ok(&[Chiffre2, OpMul, ConstPi, OpMul, ConstE], false);
    assert!(implicite.approx_equals(&explicite, -100).unwrap());
    // 3(1+1) = 6 : parenthèse après un chiffre
    assert_exact_eq(&[Chiffre3, ParenG, Chiffre1, OpAdd, Chiffre1, ParenD], "6");
}

/* ------------------------ Identités du réel unifié ------------------------ */

#[test]
fn sci_identites_rationnelles() {
    let start = Instant::now();
    for n in -20i64..=20 {
        for d in 1i64..=12 {
            budget(start, Duration::from_secs(5));
            let x = ReelUnifie::entier(n).divide(&ReelUnifie::entier(d)).unwrap();
            assert!(x.add(&x.negate()).definitely_zero(), "{n}/{d}");
            if n != 0 {
                let p = x.multiply(&x.inverse().unwrap());
                assert!(p.definitely_equals(&ReelUnifie::un()).unwrap(), "{n}/{d}");
            }
        }
    }
}

#[test]
fn sci_racines_au_clavier() {
    assert_exact_eq(&[OpRacine, Chiffre8], "2√2");
    assert_exact_eq(&[OpRacine, Chiffre1, Chiffre2, OpMul, OpRacine, Chiffre3], "6");
    assert_exact_eq(&[Chiffre2, OpRacine, Chiffre2, OpCarre], "4");
    // √ d’une constante nommée : pas de forme exacte tabulée
    let v = eval_ok(&[OpRacine, ConstPi], false);
    assert!(!v.definitely_rational());
    assert!(v.multiply(&v).approx_equals(&ReelUnifie::pi(), -100).unwrap());
}

#[test]
fn sci_pi_racine_deux_sans_approximation() {
    let pi = ReelUnifie::pi();
    let r2 = ReelUnifie::entier(2).sqrt().unwrap();
    let avant = compteur_approximations();
    assert!(pi.definitely_not_equals(&r2));
    assert!(r2.definitely_not_equals(&pi));
    assert_eq!(compteur_approximations(), avant);
}

#[test]
fn sci_zero_exact_sans_approximation() {
    // 2π − π − π = 0, décidé sur les rationnels seuls
    let avant = compteur_approximations();
    let v = eval_ok(&[Chiffre2, ConstPi, OpSub, ConstPi, OpSub, ConstPi], false);
    assert!(v.definitely_zero());
    assert_eq!(compteur_approximations(), avant);
}

/* ------------------------ Édition ------------------------ */

#[test]
fn sci_delete_annule_add() {
    let bases = [
        frappe(&[]),
        frappe(&[Chiffre1, Chiffre2]),
        frappe(&[Chiffre1, Point, Chiffre5]),
        frappe(&[Chiffre3, OpMul]),
        frappe(&[FunSin, ParenG]),
        frappe(&[ParenG, Chiffre2, ParenD]),
    ];
    for base in &bases {
        for t in super::touches::TOUTES {
            let mut e = base.clone();
            let accepte = e.add(t);
            // remplacement d’un binaire final : pas d’inverse exact
            let remplace = t.est_binaire() && !t.est_prefixe() && base.has_trailing_binary();
            if !accepte || remplace {
                continue;
            }
            e.delete();
            assert_eq!(&e, base, "touche {t:?}");
        }
    }
}

/* ------------------------ Sérialisation ------------------------ */

#[test]
fn sci_serialisation_meme_valeur() {
    let memoire = MemoireExpressions::new();
    let a = memoire.ajouter(frappe(&[Chiffre2, OpRacine, Chiffre3]), false);
    let mut e = frappe(&[Chiffre1, Chiffre2, Point, Chiffre5, OpMul, ParenG, ConstE, OpSub]);
    e.append(&Expression::abbreviate(a, "2√3"));
    e.add(ParenD);
    e.add(OpAdd);
    e.add(Chiffre7);
    e.add_exponent(-2);

    let relue = Expression::from_bytes(&e.to_bytes().unwrap()).unwrap();
    let v1 = e.eval(false, &memoire).unwrap();
    let v2 = relue.eval(false, &memoire).unwrap();
    // même arbre d’évaluation : égalité décidable via tolérance
    assert!(v1.approx_equals(&v2, -200).unwrap());
    assert_eq!(relue, e);

    // valeur exacte : égalité décidée sans tolérance
    let exacte = frappe(&[Chiffre2, ConstPi, OpAdd, Chiffre1, OpDiv, Chiffre3, OpPuissance, Chiffre2]);
    let relue = Expression::from_bytes(&exacte.to_bytes().unwrap()).unwrap();
    let a = exacte.eval(true, &memoire).unwrap();
    let b = relue.eval(true, &memoire).unwrap();
    assert!(a.definitely_equals(&b).unwrap());
}

#[test]
fn sci_serialisation_reference_corrompue() {
    let mut octets = Vec::new();
    octets.extend_from_slice(&1i32.to_be_bytes());
    Token::PreEval(super::jetons::PreEval::new(-1, "?"))
        .ecrire(&mut octets)
        .unwrap();
    let e = Expression::from_bytes(&octets).unwrap();
    assert!(e.has_trailing_constant());
    // la constante "." n’a pas de valeur : la corruption se voit
    let r = e.eval(false, &MemoireExpressions::new());
    assert!(matches!(r, Err(ErreurNoyau::Syntaxe(_))), "{r:?}");
}

#[test]
fn sci_exposant_borne() {
    let start = Instant::now();
    let mut e = frappe(&[Chiffre1]);
    assert!(!e.add_exponent(2_000_000_000));
    assert!(!e.add_exponent(-2_000_000_000));
    assert!(e.add_exponent(EXPOSANT_MAX));
    let v = e.eval(false, &MemoireExpressions::new()).unwrap();
    assert_eq!(v.big_integer_value().map(|n| n.to_string().len()), Some(10_001));

    // enregistrement forgé : exposant énorme refusé à la lecture
    let mut e = frappe(&[Chiffre1]);
    assert!(e.add_exponent(5));
    let mut octets = e.to_bytes().unwrap();
    let n = octets.len();
    octets[n - 4..].copy_from_slice(&2_000_000_000i32.to_be_bytes());
    let r = Expression::from_bytes(&octets);
    assert!(matches!(r, Err(ErreurNoyau::Format(_))), "{r:?}");
    budget(start, Duration::from_secs(5));
}

/* ------------------------ Références et résolveur ------------------------ */

#[test]
fn sci_chaine_de_references() {
    let start = Instant::now();
    let memoire = MemoireExpressions::new();
    // x0 = 1, x(k+1) = x(k) + 1 ; chaîne de 40 abréviations
    let mut precedent = memoire.ajouter(frappe(&[Chiffre1]), false);
    for _ in 0..40 {
        let mut e = Expression::abbreviate(precedent, "…");
        e.add(OpAdd);
        e.add(Chiffre1);
        precedent = memoire.ajouter(e, false);
    }
    let v = Expression::abbreviate(precedent, "41").eval(false, &memoire).unwrap();
    assert_eq!(v.to_nice_string().unwrap(), "41");
    budget(start, Duration::from_secs(5));
}

#[test]
fn sci_reference_a_binaire_final() {
    // "2+3×" rangé : seul le préfixe "2+3" compte, directement ou via l’abréviation
    let memoire = MemoireExpressions::new();
    let stockee = frappe(&[Chiffre2, OpAdd, Chiffre3, OpMul]);
    assert_eq!(stockee.eval(false, &memoire).unwrap().to_nice_string().unwrap(), "5");
    let i = memoire.ajouter(stockee, false);
    let v = Expression::abbreviate(i, "5").eval(false, &memoire).unwrap();
    assert_eq!(v.to_nice_string().unwrap(), "5");
    assert!(memoire.get_result(i).is_some());
}

#[test]
fn sci_references_circulaires() {
    let start = Instant::now();
    // auto-référence : le premier index d’une mémoire neuve est 0
    let memoire = MemoireExpressions::new();
    let a = memoire.ajouter(Expression::abbreviate(0, "x"), false);
    assert_eq!(a, 0);
    let r = Expression::abbreviate(a, "x").eval(false, &memoire);
    assert!(matches!(r, Err(ErreurNoyau::Syntaxe(_))), "{r:?}");
    assert!(memoire.get_result(a).is_none());

    // cycle à deux : 0 -> 1 -> 0, atteint aussi à travers un calcul
    let memoire = MemoireExpressions::new();
    let a = memoire.ajouter(Expression::abbreviate(1, "b"), false);
    let b = memoire.ajouter(Expression::abbreviate(a, "a"), false);
    assert_eq!((a, b), (0, 1));
    let mut e = frappe(&[Chiffre2, OpMul]);
    e.append(&Expression::abbreviate(b, "b"));
    let r = e.eval(false, &memoire);
    assert!(matches!(r, Err(ErreurNoyau::Syntaxe(_))), "{r:?}");
    budget(start, Duration::from_secs(5));
}

#[test]
fn sci_affichage_via_resolveur() {
    let memoire = MemoireExpressions::new();
    let i = memoire.ajouter(frappe(&[Chiffre2, OpDiv, Chiffre3]), false);
    let r = evaluer_affichage(&Expression::abbreviate(i, "2/3"), false, &memoire, 8).unwrap();
    assert_eq!(r.exact.as_deref(), Some("2/3"));
    assert_eq!(r.lecture, "0.66666666…");
    assert!(memoire.get_result(i).is_some());
}

/* ------------------------ Limites contrôlées ------------------------ */

#[test]
fn sci_factorielle_et_puissance_bornees() {
    let start = Instant::now();
    assert_exact_eq(&[Chiffre2, Chiffre0, OpFact], "2432902008176640000");
    // 2^2^10 : exact
    let v = eval_ok(&[Chiffre2, OpPuissance, Chiffre2, OpPuissance, Chiffre1, Chiffre0], false);
    assert_eq!(v.big_integer_value().map(|n| n.bits()), Some(1025));
    // 0.5 ! : pas un entier
    let r = frappe(&[Point, Chiffre5, OpFact]).eval(false, &MemoireExpressions::new());
    assert!(matches!(r, Err(ErreurNoyau::Domaine(_))));
    budget(start, Duration::from_secs(10));
}
