// src/noyau/localisation.rs
//
// Contexte de localisation : libellés des touches, descriptions lues à voix
// haute, séparateurs décimal / milliers.
// Immuable une fois construit ; l’appelant en reconstruit un au changement
// de langue et le passe explicitement au rendu.

use std::collections::HashMap;

use super::touches::{Touche, TOUTES};

#[derive(Clone, Debug)]
pub struct Localisation {
    libelles: HashMap<Touche, String>,
    descriptions: HashMap<Touche, String>,
    point_decimal: char,
    separateur_milliers: char,
}

impl Default for Localisation {
    fn default() -> Self {
        Self::standard()
    }
}

impl Localisation {
    /// Symboles par défaut, point décimal, virgule des milliers, sans descriptions.
    pub fn standard() -> Self {
        let libelles = TOUTES
            .iter()
            .map(|&t| (t, t.symbole().to_string()))
            .collect();
        Localisation {
            libelles,
            descriptions: HashMap::new(),
            point_decimal: '.',
            separateur_milliers: ',',
        }
    }

    /// Variante française : virgule décimale, espace fine insécable, descriptions parlées.
    pub fn francaise() -> Self {
        use Touche::*;
        let mut loc = Self::standard()
            .avec_separateurs(',', '\u{202F}')
            .avec_libelle(Point, ",");
        for (t, d) in [
            (OpPuissance, "puissance"),
            (OpMul, "fois"),
            (OpDiv, "divisé par"),
            (OpAdd, "plus"),
            (OpSub, "moins"),
            (OpRacine, "racine carrée de"),
            (OpFact, "factorielle"),
            (OpCarre, "au carré"),
            (OpPourcent, "pour cent"),
            (ParenG, "parenthèse ouvrante"),
            (ParenD, "parenthèse fermante"),
            (ConstPi, "pi"),
            (FunSin, "sinus"),
            (FunCos, "cosinus"),
            (FunTan, "tangente"),
            (FunArcsin, "arc sinus"),
            (FunArccos, "arc cosinus"),
            (FunArctan, "arc tangente"),
            (FunLn, "logarithme népérien"),
            (FunLog, "logarithme décimal"),
            (FunExp, "exponentielle"),
        ] {
            loc = loc.avec_description(t, d);
        }
        loc
    }

    pub fn avec_libelle(mut self, t: Touche, libelle: impl Into<String>) -> Self {
        self.libelles.insert(t, libelle.into());
        self
    }

    pub fn avec_description(mut self, t: Touche, description: impl Into<String>) -> Self {
        self.descriptions.insert(t, description.into());
        self
    }

    pub fn avec_separateurs(mut self, point_decimal: char, separateur_milliers: char) -> Self {
        self.point_decimal = point_decimal;
        self.separateur_milliers = separateur_milliers;
        self
    }

    /// Toujours défini : repli sur le symbole par défaut.
    pub fn libelle(&self, t: Touche) -> &str {
        self.libelles
            .get(&t)
            .map(String::as_str)
            .unwrap_or_else(|| t.symbole())
    }

    pub fn description(&self, t: Touche) -> Option<&str> {
        self.descriptions.get(&t).map(String::as_str)
    }

    pub fn point_decimal(&self) -> char {
        self.point_decimal
    }

    /// Résultat produit par le noyau ('.' décimal, ',' milliers) -> texte local.
    pub fn traduire_resultat(&self, s: &str) -> String {
        s.chars()
            .map(|c| match c {
                '.' => self.point_decimal,
                ',' => self.separateur_milliers,
                _ => c,
            })
            .collect()
    }
}
