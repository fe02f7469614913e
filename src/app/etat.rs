//! src/app/etat.rs
//!
//! État UI : expression en cours, historique, calcul en arrière-plan.
//!
//! Rôle : relier le clavier au noyau sans logique d’affichage.
//! - Chaque frappe annule le calcul en cours puis relance un aperçu.
//! - "=" range l’expression dans la mémoire ; le résultat devient une
//!   abréviation réutilisable.
//! - Natif : calcul sur un thread de travail, résultat via canal flume.
//!   Web (wasm32) : pas de threads, calcul synchrone.

use std::sync::Arc;

use crate::noyau::{
    evaluer_affichage, Annulation, ErreurNoyau, Expression, Localisation, MemoireExpressions,
    Reglages, ResolveurExpr, ResultatAffiche, Touche,
};

/// Ligne d’historique : expression validée + résultat affiché.
#[derive(Clone, Debug)]
pub struct Ligne {
    pub index: i64,
    pub texte: String,
    pub resultat: String,
    pub court: String,
}

/// Calcul lancé, pas encore reçu.
struct Calcul {
    annulation: Annulation,
    recu: flume::Receiver<Result<ResultatAffiche, ErreurNoyau>>,
    /// "=" (validation) ou simple aperçu pendant la saisie.
    valide: bool,
}

pub struct AppCalc {
    // --- entrée utilisateur ---
    pub expr: Expression,

    // --- sorties ---
    pub exact: String,   // forme exacte ("2π", "3/4"), vide si inconnue
    pub lecture: String, // lecture décimale tronquée
    pub erreur: String,

    // --- historique ---
    pub historique: Vec<Ligne>,
    memoire: Arc<MemoireExpressions>,

    // --- paramètres ---
    pub reglages: Reglages,
    pub loc: Localisation,

    calcul: Option<Calcul>,
}

impl Default for AppCalc {
    fn default() -> Self {
        Self {
            expr: Expression::new(),
            exact: String::new(),
            lecture: String::new(),
            erreur: String::new(),
            historique: Vec::new(),
            memoire: Arc::new(MemoireExpressions::new()),
            reglages: Reglages::default(),
            loc: Localisation::francaise(),
            calcul: None,
        }
    }
}

impl AppCalc {
    /* ------------------------ Saisie ------------------------ */

    /// Frappe d’une touche. Une fonction ouvre aussi sa parenthèse.
    pub fn touche(&mut self, t: Touche) {
        if !self.expr.add(t) {
            tracing::trace!(touche = ?t, "touche refusée");
            return;
        }
        if t.est_fonction() {
            self.expr.add(Touche::ParenG);
        }
        self.apres_edition();
    }

    /// DEL : retire le dernier caractère saisi.
    pub fn supprimer(&mut self) {
        self.expr.delete();
        self.apres_edition();
    }

    /// Ajoute l’abréviation d’une ligne d’historique à l’expression en cours.
    pub fn reprendre(&mut self, index: i64) {
        let Some(ligne) = self.historique.iter().find(|l| l.index == index) else {
            return;
        };
        let abr = Expression::abbreviate(ligne.index, &ligne.court);
        self.expr.append(&abr);
        self.apres_edition();
    }

    /// C : effacer seulement l’entrée.
    pub fn clear_entree(&mut self) {
        self.annuler_calcul();
        self.expr.clear();
        self.clear_resultats();
    }

    /// AC : entrée, résultats, historique et réglages par défaut.
    pub fn reset_total(&mut self) {
        self.clear_entree();
        self.historique.clear();
        self.reglages = Reglages::default();
    }

    pub fn set_digits(&mut self, digits: usize) {
        self.reglages.set_digits(digits);
        self.relancer_apercu();
    }

    pub fn set_mode_degres(&mut self, degres: bool) {
        self.reglages.mode_degres = degres;
        self.relancer_apercu();
    }

    fn clear_resultats(&mut self) {
        self.exact.clear();
        self.lecture.clear();
        self.erreur.clear();
    }

    fn apres_edition(&mut self) {
        self.erreur.clear();
        self.relancer_apercu();
    }

    /* ------------------------ Calcul ------------------------ */

    /// "=" : évalue pour de bon ; le résultat rejoindra l’historique.
    pub fn valider(&mut self) {
        if self.expr.is_empty() {
            return;
        }
        self.lancer(true);
    }

    pub fn calcul_en_cours(&self) -> bool {
        self.calcul.is_some()
    }

    /// Aperçu seulement si l’expression contient un vrai calcul.
    fn relancer_apercu(&mut self) {
        self.exact.clear();
        self.lecture.clear();
        if self.expr.has_interesting_ops() {
            self.lancer(false);
        } else {
            self.annuler_calcul();
        }
    }

    fn annuler_calcul(&mut self) {
        if let Some(c) = self.calcul.take() {
            c.annulation.annuler();
        }
    }

    fn lancer(&mut self, valide: bool) {
        self.annuler_calcul();
        let annulation = Annulation::new();
        let (envoi, recu) = flume::bounded(1);
        let expr = self.expr.clone();
        let memoire = Arc::clone(&self.memoire);
        let degres = self.reglages.mode_degres;
        let digits = self.reglages.digits();
        let tache = {
            let annulation = annulation.clone();
            move || {
                let r = annulation.executer(|| evaluer_affichage(&expr, degres, &*memoire, digits));
                // UI déjà passée à autre chose : rien à livrer
                let _ = envoi.send(r);
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        std::thread::spawn(tache);
        #[cfg(target_arch = "wasm32")]
        tache();

        self.calcul = Some(Calcul {
            annulation,
            recu,
            valide,
        });
    }

    /// À appeler à chaque frame : récupère le résultat s’il est arrivé.
    pub fn relever_calcul(&mut self) {
        let Some(c) = &self.calcul else {
            return;
        };
        let valide = c.valide;
        let r = match c.recu.try_recv() {
            Ok(r) => r,
            Err(flume::TryRecvError::Empty) => return,
            Err(flume::TryRecvError::Disconnected) => {
                self.calcul = None;
                return;
            }
        };
        self.calcul = None;
        match r {
            Ok(res) if valide => self.ranger(res),
            Ok(res) => self.afficher(&res),
            // aperçu : une saisie incomplète n’est pas une faute
            Err(e) if !valide => tracing::trace!(erreur = %e, "aperçu indisponible"),
            Err(ErreurNoyau::Interrompu) => {}
            Err(e) => self.erreur = e.to_string(),
        }
    }

    fn afficher(&mut self, res: &ResultatAffiche) {
        self.exact = res
            .exact
            .as_deref()
            .map(|s| self.loc.traduire_resultat(s))
            .unwrap_or_default();
        self.lecture = self.loc.traduire_resultat(&res.lecture);
    }

    /// Résultat de "=" : mémoire + historique, puis l’entrée devient son abréviation.
    fn ranger(&mut self, res: ResultatAffiche) {
        self.afficher(&res);
        let texte = self.expr.rendu(&self.loc).texte;
        let expr = std::mem::take(&mut self.expr);
        let index = self.memoire.ajouter(expr, self.reglages.mode_degres);
        self.memoire.put_result_if_absent(index, res.valeur.clone());
        let court = self.loc.traduire_resultat(&res.court);
        tracing::debug!(index, %texte, "résultat rangé");
        self.historique.push(Ligne {
            index,
            texte,
            resultat: if self.exact.is_empty() {
                self.lecture.clone()
            } else {
                self.exact.clone()
            },
            court: court.clone(),
        });
        self.expr = Expression::abbreviate(index, &court);
    }
}
