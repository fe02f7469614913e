// src/noyau/erreurs.rs
//
// Erreurs du noyau
// ----------------
// Une seule énumération pour tout le noyau. L’UI ne regarde que la catégorie
// (syntaxe / calcul / ressource / données) pour choisir l’état affiché.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErreurNoyau {
    /// Expression mal formée ou incomplète (opérande manquant, fin inattendue…).
    #[error("expression invalide : {0}")]
    Syntaxe(String),

    #[error("division par zéro")]
    DivisionParZero,

    /// Argument hors domaine (factorielle négative, arcsin(2), tan(π/2)…).
    #[error("hors domaine : {0}")]
    Domaine(String),

    /// Précision demandée hors bornes dans une approximation.
    #[error("précision insuffisante pour conclure")]
    Precision,

    /// Calcul abandonné sur demande (signal d’annulation levé).
    #[error("calcul interrompu")]
    Interrompu,

    #[error("expression référencée inconnue : #{0}")]
    ReferenceInconnue(i64),

    /// Sauvegarde illisible (flux tronqué, étiquette inconnue, UTF-8 invalide…).
    #[error("format de sauvegarde invalide : {0}")]
    Format(String),
}

/// Ce que l’utilisateur voit : pas de distinction plus fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Categorie {
    Syntaxe,
    /// Division par zéro et erreurs de domaine.
    Calcul,
    /// Précision / interruption : on peut relancer.
    Ressource,
    Donnees,
}

impl ErreurNoyau {
    pub fn syntaxe(msg: impl Into<String>) -> Self {
        ErreurNoyau::Syntaxe(msg.into())
    }

    pub fn domaine(msg: impl Into<String>) -> Self {
        ErreurNoyau::Domaine(msg.into())
    }

    pub fn categorie(&self) -> Categorie {
        match self {
            ErreurNoyau::Syntaxe(_) => Categorie::Syntaxe,
            ErreurNoyau::DivisionParZero | ErreurNoyau::Domaine(_) => Categorie::Calcul,
            ErreurNoyau::Precision | ErreurNoyau::Interrompu => Categorie::Ressource,
            ErreurNoyau::ReferenceInconnue(_) | ErreurNoyau::Format(_) => Categorie::Donnees,
        }
    }

    /// Vrai si relancer le même calcul peut réussir (autre budget, pas d’annulation).
    pub fn relancable(&self) -> bool {
        self.categorie() == Categorie::Ressource
    }
}

impl From<std::io::Error> for ErreurNoyau {
    fn from(e: std::io::Error) -> Self {
        ErreurNoyau::Format(e.to_string())
    }
}

pub type Resultat<T> = Result<T, ErreurNoyau>;
