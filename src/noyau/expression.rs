// src/noyau/expression.rs
//
// Expression = suite de jetons, éditée touche par touche.
// Une expression partielle ("2+", "sin(") est un état d’édition valide :
// la grammaire n’est vérifiée qu’à l’évaluation.

use std::collections::HashSet;
use std::io::{Read, Write};

use super::erreurs::{ErreurNoyau, Resultat};
use super::eval::ResolveurExpr;
use super::jetons::{ecrire_i32, lire_i32, Constante, PreEval, Rendu, Token};
use super::localisation::Localisation;
use super::touches::Touche;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Expression {
    jetons: Vec<Token>,
}

impl Expression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jetons(&self) -> &[Token] {
        &self.jetons
    }

    pub fn len(&self) -> usize {
        self.jetons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jetons.is_empty()
    }

    fn dernier(&self) -> Option<&Token> {
        self.jetons.last()
    }

    fn dernier_operateur(&self) -> Option<Touche> {
        self.dernier().and_then(Token::operateur)
    }

    /* ------------------------ Édition ------------------------ */

    /// Ajoute la touche pressée. `false` si l’entrée est refusée.
    pub fn add(&mut self, t: Touche) -> bool {
        if t.est_binaire() && !t.est_prefixe() {
            let refuse = match self.dernier() {
                None => true,
                Some(Token::Operator(o)) => {
                    *o == Touche::ParenG
                        || o.est_fonction()
                        || (o.est_prefixe() && *o != Touche::OpSub)
                }
                Some(_) => false,
            };
            if refuse {
                return false;
            }
            // "+" puis "×" donne "×"
            while self.has_trailing_binary() {
                self.delete();
            }
        }

        if !t.est_morceau_constante() {
            self.jetons.push(Token::Operator(t));
            return true;
        }

        match self.dernier() {
            Some(Token::Constant(_)) => {}
            Some(Token::PreEval(_)) => {
                // "2π" abrégé suivi de 3 : multiplication explicite, plus lisible
                self.jetons.push(Token::Operator(Touche::OpMul));
                self.jetons.push(Token::Constant(Constante::new()));
            }
            _ => self.jetons.push(Token::Constant(Constante::new())),
        }
        match self.jetons.last_mut() {
            Some(Token::Constant(c)) => {
                let accepte = c.ajouter(t);
                // "." refusé dans une constante neuve : ne pas laisser de constante vide
                if !accepte && c.est_vide() {
                    self.jetons.pop();
                }
                accepte
            }
            _ => false,
        }
    }

    /// Pose l’exposant de la constante finale. `false` s’il n’y en a pas
    /// ou si l’exposant dépasse ±EXPOSANT_MAX.
    pub fn add_exponent(&mut self, exp: i32) -> bool {
        match self.jetons.last_mut() {
            Some(Token::Constant(c)) => c.ajouter_exposant(exp),
            _ => false,
        }
    }

    /// Annule la dernière saisie : un caractère de la constante finale,
    /// sinon le dernier jeton.
    pub fn delete(&mut self) {
        if let Some(Token::Constant(c)) = self.jetons.last_mut() {
            c.supprimer();
            if !c.est_vide() {
                return;
            }
        }
        self.jetons.pop();
    }

    pub fn remove_trailing_additive_operators(&mut self) {
        while matches!(
            self.dernier_operateur(),
            Some(Touche::OpAdd | Touche::OpSub)
        ) {
            self.jetons.pop();
        }
    }

    /// Concatène `autre`. Deux opérandes collés reçoivent un × explicite.
    pub fn append(&mut self, autre: &Expression) {
        if let (Some(dernier), Some(premier)) = (self.dernier(), autre.jetons.first()) {
            let operande = |t: &Token| !matches!(t, Token::Operator(_));
            if operande(dernier) && operande(premier) {
                self.jetons.push(Token::Operator(Touche::OpMul));
            }
        }
        self.jetons.extend(autre.jetons.iter().cloned());
    }

    pub fn clear(&mut self) {
        self.jetons.clear();
    }

    /// Expression d’un seul jeton remplaçant une expression évaluée.
    pub fn abbreviate(index: i64, court: &str) -> Expression {
        Expression {
            jetons: vec![Token::PreEval(PreEval::new(index, court))],
        }
    }

    /* ------------------------ Requêtes ------------------------ */

    pub fn has_trailing_constant(&self) -> bool {
        matches!(self.dernier(), Some(Token::Constant(_)))
    }

    pub fn has_trailing_binary(&self) -> bool {
        self.dernier_operateur().is_some_and(Touche::est_binaire)
    }

    /// Longueur du préfixe évalué : sans la suite finale d’opérateurs binaires.
    pub fn trailing_binary_ops_start(&self) -> usize {
        let mut n = self.jetons.len();
        while n > 0 && self.jetons[n - 1].operateur().is_some_and(Touche::est_binaire) {
            n -= 1;
        }
        n
    }

    /// Mérite un résultat en direct : un opérateur (hors moins de tête)
    /// ou une abréviation tronquée.
    pub fn has_interesting_ops(&self) -> bool {
        let fin = self.trailing_binary_ops_start();
        let debut = usize::from(fin > 0 && self.jetons[0].est_operateur(Touche::OpSub));
        self.jetons[debut.min(fin)..fin].iter().any(|t| match t {
            Token::Operator(_) => true,
            Token::PreEval(p) => p.has_ellipsis(),
            Token::Constant(_) => false,
        })
    }

    pub fn has_trig_funcs(&self) -> bool {
        self.jetons
            .iter()
            .any(|t| t.operateur().is_some_and(Touche::est_trigo))
    }

    /// Index des références directes pas encore évaluées, ajoutés à `liste`.
    fn ajouter_references(
        &self,
        liste: &mut Vec<i64>,
        vus: &mut HashSet<i64>,
        resolveur: &dyn ResolveurExpr,
    ) {
        for t in &self.jetons {
            if let Token::PreEval(p) = t {
                if resolveur.get_result(p.index).is_none() && vus.insert(p.index) {
                    liste.push(p.index);
                }
            }
        }
    }

    /// Références transitives non évaluées, dans un ordre d’évaluation
    /// convenable pour une chaîne (parcours en largeur inversé, pas un vrai
    /// tri topologique : un graphe non linéaire peut provoquer des
    /// évaluations imbriquées).
    pub fn transitively_referenced_exprs(
        &self,
        resolveur: &dyn ResolveurExpr,
    ) -> Resultat<Vec<i64>> {
        let mut liste = Vec::new();
        let mut vus = HashSet::new();
        self.ajouter_references(&mut liste, &mut vus, resolveur);
        let mut parcourus = 0;
        while parcourus < liste.len() {
            let index = liste[parcourus];
            parcourus += 1;
            resolveur
                .get_expr(index)?
                .ajouter_references(&mut liste, &mut vus, resolveur);
        }
        liste.reverse();
        Ok(liste)
    }

    /* ------------------------ Rendu ------------------------ */

    pub fn rendu(&self, loc: &Localisation) -> Rendu {
        let mut texte = String::new();
        let mut parole = Vec::with_capacity(self.jetons.len());
        for t in &self.jetons {
            let r = t.rendu(loc);
            texte.push_str(&r.texte);
            parole.push(r.description.unwrap_or(r.texte));
        }
        let description = (!parole.is_empty()).then(|| parole.join(" "));
        Rendu { texte, description }
    }

    /* ------------------------ Sérialisation ------------------------ */

    /// Nombre de jetons (i32 big-endian) puis chaque jeton.
    pub fn write(&self, w: &mut impl Write) -> Resultat<()> {
        let n = i32::try_from(self.jetons.len())
            .map_err(|_| ErreurNoyau::Format("expression trop longue".into()))?;
        ecrire_i32(w, n)?;
        self.jetons.iter().try_for_each(|t| t.ecrire(w))
    }

    pub fn read(r: &mut impl Read) -> Resultat<Self> {
        let n = lire_i32(r)?;
        let n = usize::try_from(n)
            .map_err(|_| ErreurNoyau::Format(format!("longueur négative: {n}")))?;
        // pas de réservation : la longueur vient d’un fichier
        let mut jetons = Vec::new();
        for _ in 0..n {
            jetons.push(Token::lire(r)?);
        }
        Ok(Expression { jetons })
    }

    pub fn to_bytes(&self) -> Resultat<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(buf)
    }

    pub fn from_bytes(mut octets: &[u8]) -> Resultat<Self> {
        let e = Self::read(&mut octets)?;
        if !octets.is_empty() {
            return Err(ErreurNoyau::Format(format!(
                "{} octets en trop après l’expression",
                octets.len()
            )));
        }
        Ok(e)
    }
}

impl FromIterator<Touche> for Expression {
    /// Frappe successive des touches (les refus sont ignorés).
    fn from_iter<I: IntoIterator<Item = Touche>>(touches: I) -> Self {
        let mut e = Expression::new();
        for t in touches {
            e.add(t);
        }
        e
    }
}
