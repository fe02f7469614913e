// src/noyau/memoire.rs
//
// Magasin des expressions validées par "=" : chaque entrée garde son mode
// d’angle et, une fois calculé, son résultat.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use super::erreurs::{ErreurNoyau, Resultat};
use super::eval::ResolveurExpr;
use super::expression::Expression;
use super::reel_unifie::ReelUnifie;

struct Entree {
    expr: Arc<Expression>,
    mode_degres: bool,
    resultat: Option<ReelUnifie>,
}

#[derive(Default)]
pub struct MemoireExpressions {
    entrees: DashMap<i64, Entree>,
    prochain: AtomicI64,
}

impl MemoireExpressions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stocke `expr` ; l’index retourné n’est jamais réutilisé.
    pub fn ajouter(&self, expr: Expression, mode_degres: bool) -> i64 {
        let index = self.prochain.fetch_add(1, Ordering::Relaxed);
        self.entrees.insert(
            index,
            Entree {
                expr: Arc::new(expr),
                mode_degres,
                resultat: None,
            },
        );
        tracing::trace!(index, "expression stockée");
        index
    }

    pub fn len(&self) -> usize {
        self.entrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrees.is_empty()
    }
}

impl ResolveurExpr for MemoireExpressions {
    fn get_expr(&self, index: i64) -> Resultat<Arc<Expression>> {
        self.entrees
            .get(&index)
            .map(|e| Arc::clone(&e.expr))
            .ok_or(ErreurNoyau::ReferenceInconnue(index))
    }

    fn get_degree_mode(&self, index: i64) -> Resultat<bool> {
        self.entrees
            .get(&index)
            .map(|e| e.mode_degres)
            .ok_or(ErreurNoyau::ReferenceInconnue(index))
    }

    fn get_result(&self, index: i64) -> Option<ReelUnifie> {
        self.entrees.get(&index)?.resultat.clone()
    }

    fn put_result_if_absent(&self, index: i64, valeur: ReelUnifie) -> ReelUnifie {
        // verrou d’écriture de la tranche : test et écriture atomiques
        let Some(mut e) = self.entrees.get_mut(&index) else {
            tracing::debug!(index, "résultat d’une référence inconnue non stocké");
            return valeur;
        };
        if let Some(deja) = &e.resultat {
            return deja.clone();
        }
        e.resultat = Some(valeur.clone());
        tracing::debug!(index, "résultat stocké");
        valeur
    }
}
