//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - saisies bornées (pas de chaînes de factorielles, constantes courtes)
//! - chaque évaluation sous `Annulation` + chien de garde
//! - budget temps global
//! - invariant clé : toute évaluation finit, par une valeur ou une erreur classée

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::annulation::Annulation;
use super::erreurs::{ErreurNoyau, Resultat};
use super::expression::Expression;
use super::memoire::MemoireExpressions;
use super::reel_unifie::ReelUnifie;
use super::touches::{Touche, TOUTES};

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn coin(&mut self) -> bool {
        (self.next_u32() & 1) == 1
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Saisie bornée ------------------------ */

/// Touche suivante acceptable : au plus deux chiffres par constante,
/// "!" seulement derrière un chiffre isolé, "^" jamais derrière ")" ni "!".
fn touche_sure(precedentes: &[Touche], t: Touche) -> bool {
    let chiffres_finaux = precedentes
        .iter()
        .rev()
        .take_while(|p| p.est_chiffre() || **p == Touche::Point)
        .count();
    let derniere = precedentes.last().copied();
    match t {
        _ if t.est_chiffre() || t == Touche::Point => chiffres_finaux < 2,
        Touche::OpFact => {
            chiffres_finaux == 1 && derniere.is_some_and(|d| d.est_chiffre())
        }
        Touche::OpPuissance => {
            !matches!(derniere, Some(Touche::ParenD | Touche::OpFact | Touche::OpCarre))
        }
        _ => true,
    }
}

fn gen_touches(rng: &mut Rng, max: u32) -> Vec<Touche> {
    let n = 1 + rng.pick(max);
    let mut v = Vec::new();
    while v.len() < n as usize {
        // chiffres plus fréquents : expressions plus souvent valides
        let chiffre = if rng.coin() { Touche::chiffre(rng.pick(10) as u8) } else { None };
        let t = chiffre.unwrap_or_else(|| TOUTES[rng.pick(TOUTES.len() as u32) as usize]);
        if touche_sure(&v, t) {
            v.push(t);
        }
    }
    v
}

fn frappe(touches: &[Touche]) -> Expression {
    let mut e = Expression::new();
    for t in touches {
        e.add(*t);
    }
    e
}

/* ------------------------ Évaluation sous chien de garde ------------------------ */

/// Évalue sur le thread courant ; un thread de garde lève l’annulation
/// si le calcul dépasse `delai`.
fn eval_surveillee(e: &Expression, degres: bool, delai: Duration) -> Resultat<ReelUnifie> {
    let annulation = Annulation::new();
    let (fini, attente) = flume::bounded::<()>(1);
    let garde = {
        let annulation = annulation.clone();
        std::thread::spawn(move || {
            if attente.recv_timeout(delai).is_err() {
                annulation.annuler();
            }
        })
    };
    let memoire = MemoireExpressions::new();
    let r = annulation.executer(|| e.eval(degres, &memoire));
    let _ = fini.send(());
    garde.join().unwrap();
    r
}

fn is_erreur_classee(e: &ErreurNoyau) -> bool {
    // Liste blanche : le fuzz tape n’importe quoi, ces refus sont normaux.
    matches!(
        e,
        ErreurNoyau::Syntaxe(_)
            | ErreurNoyau::DivisionParZero
            | ErreurNoyau::Domaine(_)
            | ErreurNoyau::Precision
            | ErreurNoyau::Interrompu
    )
}

/* ------------------------ Campagnes ------------------------ */

#[test]
fn fuzz_saisies_aleatoires_terminent() {
    let start = Instant::now();
    let mut rng = Rng::new(0xC0FF_EE00_1234_5678);
    let mut valeurs = 0;

    for _ in 0..400 {
        budget(start, Duration::from_secs(60));
        let touches = gen_touches(&mut rng, 14);
        let e = frappe(&touches);
        match eval_surveillee(&e, rng.coin(), Duration::from_secs(2)) {
            Ok(_) => valeurs += 1,
            Err(err) => assert!(is_erreur_classee(&err), "touches={touches:?} err={err:?}"),
        }
    }
    // quelques saisies valides au moins, sinon le générateur est cassé
    assert!(valeurs > 10, "valeurs={valeurs}");
}

#[test]
fn fuzz_determinisme() {
    let start = Instant::now();
    let mut rng = Rng::new(42);

    for _ in 0..120 {
        budget(start, Duration::from_secs(30));
        let touches = gen_touches(&mut rng, 10);
        let e = frappe(&touches);
        let a = eval_surveillee(&e, false, Duration::from_secs(2));
        let b = eval_surveillee(&e, false, Duration::from_secs(2));
        match (a, b) {
            (Ok(x), Ok(y)) => {
                if let (Some(p), Some(q)) = (x.bounded_rational_value(), y.bounded_rational_value()) {
                    assert_eq!(p, q, "touches={touches:?}");
                }
            }
            (Err(ErreurNoyau::Interrompu), _) | (_, Err(ErreurNoyau::Interrompu)) => {}
            (Err(x), Err(y)) => assert_eq!(x.categorie(), y.categorie(), "touches={touches:?}"),
            (x, y) => panic!("touches={touches:?} : {x:?} puis {y:?}"),
        }
    }
}

#[test]
fn fuzz_delete_vide_tout() {
    let mut rng = Rng::new(7);
    for _ in 0..200 {
        let touches = gen_touches(&mut rng, 20);
        let mut e = frappe(&touches);
        // chaque delete retire au moins un caractère saisi
        for _ in 0..touches.len() {
            e.delete();
        }
        assert!(e.is_empty(), "touches={touches:?} reste={e:?}");
    }
}

/* ------------------------ Propriétés (proptest) ------------------------ */

fn touche_strategy() -> impl Strategy<Value = Touche> {
    (0..TOUTES.len()).prop_map(|i| TOUTES[i])
}

fn touches_strategy() -> impl Strategy<Value = Vec<Touche>> {
    prop::collection::vec(touche_strategy(), 0..24).prop_map(|brut| {
        let mut v = Vec::new();
        for t in brut {
            if touche_sure(&v, t) {
                v.push(t);
            }
        }
        v
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_delete_annule_add(touches in touches_strategy(), t in touche_strategy()) {
        let base = frappe(&touches);
        let mut e = base.clone();
        // un binaire posé sur un binaire final le remplace : pas d’inverse exact
        let remplace = t.est_binaire() && !t.est_prefixe() && base.has_trailing_binary();
        if e.add(t) && !remplace {
            e.delete();
            prop_assert_eq!(e, base);
        }
    }

    #[test]
    fn prop_serialisation_aller_retour(touches in touches_strategy(), exposant in -30i32..30) {
        let mut e = frappe(&touches);
        if exposant != 0 {
            e.add_exponent(exposant);
        }
        let octets = e.to_bytes().unwrap();
        let relue = Expression::from_bytes(&octets).unwrap();
        prop_assert_eq!(&relue, &e);
        prop_assert_eq!(relue.to_bytes().unwrap(), octets);
    }

    #[test]
    fn prop_octets_tronques_refuses(touches in touches_strategy(), coupe in 1usize..8) {
        let e = frappe(&touches);
        let octets = e.to_bytes().unwrap();
        if coupe <= octets.len() {
            let r = Expression::from_bytes(&octets[..octets.len() - coupe]);
            prop_assert!(matches!(r, Err(ErreurNoyau::Format(_))), "{:?}", r);
        }
    }
}
