//! Noyau exact de la calculatrice
//!
//! Organisation interne :
//! - erreurs.rs          : erreurs typées (syntaxe, domaine, précision…)
//! - annulation.rs       : interruption coopérative d’un calcul
//! - format.rs           : troncature décimale, milliers, "coeff·nom"
//! - rationnel.rs        : rationnels bornés (trop gros => None)
//! - reel_constructif.rs : réels calculables paresseux, précision arbitraire
//! - reel_unifie.rs      : rationnel × constante nommée (π, e, √n, ln n)
//! - touches.rs          : clavier (chiffres, opérateurs, fonctions)
//! - localisation.rs     : libellés, descriptions parlées, séparateurs
//! - jetons.rs           : constantes saisies, abréviations, codage binaire
//! - expression.rs       : suite de jetons éditable + sérialisation
//! - eval.rs             : descente récursive + affichage du résultat
//! - memoire.rs          : expressions validées, résolues par index
//! - reglages.rs         : décimales affichées, mode degrés

pub mod annulation;
pub mod erreurs;
pub mod eval;
pub mod expression;
pub mod format;
pub mod jetons;
pub mod localisation;
pub mod memoire;
pub mod rationnel;
pub mod reel_constructif;
pub mod reel_unifie;
pub mod reglages;
pub mod touches;

#[cfg(test)]
mod tests_scientifiques;

#[cfg(test)]
mod tests_fuzz_safe;

// API publique minimale
pub use annulation::Annulation;
pub use erreurs::{ErreurNoyau, Resultat};
pub use eval::{evaluer_affichage, ResolveurExpr, ResultatAffiche};
pub use expression::Expression;
pub use localisation::Localisation;
pub use memoire::MemoireExpressions;
pub use reel_unifie::ReelUnifie;
pub use reglages::Reglages;
pub use touches::Touche;
