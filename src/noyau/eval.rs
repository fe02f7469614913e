//! Noyau — évaluation
//!
//! Descente récursive directement sur les jetons, sans AST :
//!
//! ```text
//! unaire     := CONST | PREEVAL | π | e | √ [−] unaire | ( expr ) | FONCTION ( expr )
//! suffixe    := unaire (! | ² | %)*
//! facteur    := suffixe [^ facteur_signe]
//! facteur_signe := [−] facteur
//! terme      := facteur_signe ((× | ÷) facteur_signe | facteur_signe implicite)*
//! expr       := terme ((+ | −) (pourcentage | terme))*
//! ```
//!
//! Seul le préfixe sans opérateurs binaires finaux est évalué ("2+3×" vaut 5).
//! Les parenthèses fermantes manquantes sont tolérées.

use std::sync::Arc;

use super::erreurs::{ErreurNoyau, Resultat};
use super::expression::Expression;
use super::format::grouper_milliers;
use super::jetons::Token;
use super::reel_unifie::ReelUnifie;
use super::touches::Touche;

/// Imbrication max (parenthèses, fonctions, racines, puissances).
pub const PROFONDEUR_MAX: usize = 100;

/// Longueur max du texte court d’une abréviation.
const COURT_MAX: usize = 12;

/// Décimales du texte court quand la valeur n’est pas exacte.
const CHIFFRES_COURT: usize = 6;

/* ------------------------ Résolveur ------------------------ */

/// Magasin d’expressions déjà saisies, partagé entre threads.
///
/// `put_result_if_absent` est atomique : le premier résultat stocké gagne et
/// tous les appelants reçoivent cette valeur-là.
pub trait ResolveurExpr: Send + Sync {
    fn get_expr(&self, index: i64) -> Resultat<Arc<Expression>>;
    fn get_degree_mode(&self, index: i64) -> Resultat<bool>;
    fn get_result(&self, index: i64) -> Option<ReelUnifie>;
    fn put_result_if_absent(&self, index: i64, valeur: ReelUnifie) -> ReelUnifie;
}

/* ------------------------ Contexte ------------------------ */

struct ContexteEval<'a> {
    mode_degres: bool,
    longueur_prefixe: usize,
    resolveur: &'a dyn ResolveurExpr,
    /// Références en cours d’évaluation, de la plus externe à la plus proche.
    chaine: &'a [i64],
}

struct Analyse<'a> {
    jetons: &'a [Token],
    ctx: ContexteEval<'a>,
    profondeur: usize,
}

type Pas = Resultat<(usize, ReelUnifie)>;

fn incomplete() -> ErreurNoyau {
    ErreurNoyau::syntaxe("expression incomplète")
}

impl<'a> Analyse<'a> {
    fn new(
        expr: &'a Expression,
        mode_degres: bool,
        longueur_prefixe: usize,
        resolveur: &'a dyn ResolveurExpr,
        chaine: &'a [i64],
    ) -> Self {
        Analyse {
            jetons: expr.jetons(),
            ctx: ContexteEval {
                mode_degres,
                longueur_prefixe,
                resolveur,
                chaine,
            },
            profondeur: 0,
        }
    }

    /// Jeton `i`, seulement dans le préfixe évalué.
    fn jeton(&self, i: usize) -> Option<&'a Token> {
        if i < self.ctx.longueur_prefixe {
            self.jetons.get(i)
        } else {
            None
        }
    }

    fn est_operateur(&self, i: usize, t: Touche) -> bool {
        self.jeton(i).is_some_and(|j| j.est_operateur(t))
    }

    fn vers_radians(&self, x: ReelUnifie) -> ReelUnifie {
        if self.ctx.mode_degres {
            x.multiply(&ReelUnifie::radians_par_degre())
        } else {
            x
        }
    }

    fn depuis_radians(&self, x: ReelUnifie) -> Resultat<ReelUnifie> {
        if self.ctx.mode_degres {
            x.divide(&ReelUnifie::radians_par_degre())
        } else {
            Ok(x)
        }
    }

    /* ------------------------ Grammaire ------------------------ */

    /// Un niveau d’imbrication de plus pendant `f`.
    fn plus_profond(&mut self, f: impl FnOnce(&mut Self) -> Pas) -> Pas {
        if self.profondeur >= PROFONDEUR_MAX {
            return Err(ErreurNoyau::syntaxe("imbrication trop profonde"));
        }
        self.profondeur += 1;
        let r = f(self);
        self.profondeur -= 1;
        r
    }

    fn unaire(&mut self, i: usize) -> Pas {
        self.plus_profond(|a| a.unaire_sans_garde(i))
    }

    fn unaire_sans_garde(&mut self, i: usize) -> Pas {
        let t = self.jeton(i).ok_or_else(incomplete)?;
        let op = match t {
            Token::Constant(c) => return Ok((i + 1, ReelUnifie::rationnel(c.to_rational()?))),
            Token::PreEval(p) => {
                let v = match self.ctx.resolveur.get_result(p.index) {
                    Some(v) => v,
                    None => nested_eval(p.index, self.ctx.resolveur, self.ctx.chaine)?,
                };
                return Ok((i + 1, v));
            }
            Token::Operator(op) => *op,
        };
        match op {
            Touche::ConstPi => Ok((i + 1, ReelUnifie::pi())),
            Touche::ConstE => Ok((i + 1, ReelUnifie::e())),
            Touche::OpRacine => {
                // accepte un moins juste après : √−4
                if self.est_operateur(i + 1, Touche::OpSub) {
                    let (pos, v) = self.unaire(i + 2)?;
                    Ok((pos, v.negate().sqrt()?))
                } else {
                    let (pos, v) = self.unaire(i + 1)?;
                    Ok((pos, v.sqrt()?))
                }
            }
            Touche::ParenG => self.entre_parentheses(i + 1),
            f if f.est_fonction() => {
                if !self.est_operateur(i + 1, Touche::ParenG) {
                    return Err(ErreurNoyau::syntaxe("parenthèse attendue après la fonction"));
                }
                let (pos, x) = self.entre_parentheses(i + 2)?;
                Ok((pos, self.appliquer(f, x)?))
            }
            _ => Err(ErreurNoyau::syntaxe(format!(
                "jeton inattendu: {}",
                op.symbole()
            ))),
        }
    }

    /// `expr` puis `)` si présente.
    fn entre_parentheses(&mut self, i: usize) -> Pas {
        let (mut pos, v) = self.expr(i)?;
        if self.est_operateur(pos, Touche::ParenD) {
            pos += 1;
        }
        Ok((pos, v))
    }

    fn appliquer(&self, f: Touche, x: ReelUnifie) -> Resultat<ReelUnifie> {
        match f {
            Touche::FunSin => self.vers_radians(x).sin(),
            Touche::FunCos => self.vers_radians(x).cos(),
            Touche::FunTan => self.vers_radians(x).tan(),
            Touche::FunArcsin => self.depuis_radians(x.asin()?),
            Touche::FunArccos => self.depuis_radians(x.acos()?),
            Touche::FunArctan => self.depuis_radians(x.atan()?),
            Touche::FunLn => x.ln(),
            Touche::FunLog => x.ln()?.divide(&ReelUnifie::dix().ln()?),
            Touche::FunExp => x.exp(),
            _ => Err(ErreurNoyau::syntaxe(format!("fonction inconnue: {}", f.symbole()))),
        }
    }

    fn suffixe(&mut self, i: usize) -> Pas {
        let (mut pos, mut v) = self.unaire(i)?;
        loop {
            v = match self.jeton(pos).and_then(Token::operateur) {
                Some(Touche::OpFact) => v.fact()?,
                Some(Touche::OpCarre) => v.multiply(&v),
                Some(Touche::OpPourcent) => v.multiply(&centieme()?),
                _ => return Ok((pos, v)),
            };
            pos += 1;
        }
    }

    fn facteur(&mut self, i: usize) -> Pas {
        let (pos, v) = self.suffixe(i)?;
        if self.est_operateur(pos, Touche::OpPuissance) {
            let (pos, e) = self.plus_profond(|a| a.facteur_signe(pos + 1))?;
            return Ok((pos, v.pow(&e)?));
        }
        Ok((pos, v))
    }

    fn facteur_signe(&mut self, i: usize) -> Pas {
        let negatif = self.est_operateur(i, Touche::OpSub);
        let (pos, v) = self.facteur(if negatif { i + 1 } else { i })?;
        Ok((pos, if negatif { v.negate() } else { v }))
    }

    /// Un facteur peut commencer ici (multiplication implicite).
    fn debut_facteur(&self, i: usize) -> bool {
        match self.jeton(i) {
            None => false,
            Some(Token::Operator(op)) => {
                !op.est_binaire() && !op.est_suffixe() && *op != Touche::ParenD
            }
            Some(_) => true,
        }
    }

    fn terme(&mut self, i: usize) -> Pas {
        let (mut pos, mut v) = self.facteur_signe(i)?;
        loop {
            let division = self.est_operateur(pos, Touche::OpDiv);
            let explicite = division || self.est_operateur(pos, Touche::OpMul);
            if !explicite && !self.debut_facteur(pos) {
                return Ok((pos, v));
            }
            let (suivant, w) = self.facteur_signe(if explicite { pos + 1 } else { pos })?;
            v = if division { v.divide(&w)? } else { v.multiply(&w) };
            pos = suivant;
        }
    }

    /// `N%` après + ou − : N seul (constante ou abréviation), suivi de la fin,
    /// d’un + / − ou d’une parenthèse fermante.
    fn est_pourcentage(&self, pos: usize) -> bool {
        let fin = self.ctx.longueur_prefixe;
        if pos + 2 > fin || !self.est_operateur(pos + 1, Touche::OpPourcent) {
            return false;
        }
        if matches!(self.jetons[pos], Token::Operator(_)) {
            return false;
        }
        pos + 2 == fin
            || matches!(
                self.jetons[pos + 2].operateur(),
                Some(Touche::OpAdd | Touche::OpSub | Touche::ParenD)
            )
    }

    fn expr(&mut self, i: usize) -> Pas {
        let (mut pos, mut v) = self.terme(i)?;
        loop {
            let plus = self.est_operateur(pos, Touche::OpAdd);
            if !plus && !self.est_operateur(pos, Touche::OpSub) {
                return Ok((pos, v));
            }
            if self.est_pourcentage(pos + 1) {
                // A + N% = A × (1 + N/100)
                let (apres, n) = self.unaire(pos + 1)?;
                let n = if plus { n } else { n.negate() };
                v = v.multiply(&ReelUnifie::un().add(&n.multiply(&centieme()?)));
                pos = apres + 1;
            } else {
                let (apres, w) = self.terme(pos + 1)?;
                v = if plus { v.add(&w) } else { v.subtract(&w) };
                pos = apres;
            }
        }
    }
}

fn centieme() -> Resultat<ReelUnifie> {
    ReelUnifie::entier(100).inverse()
}

/* ------------------------ Évaluation ------------------------ */

/// Évalue le préfixe de `expr` (sans binaires finaux) ; il doit être consommé en entier.
fn evaluer_prefixe(
    expr: &Expression,
    mode_degres: bool,
    resolveur: &dyn ResolveurExpr,
    chaine: &[i64],
) -> Resultat<ReelUnifie> {
    let prefixe = expr.trailing_binary_ops_start();
    let (pos, v) = Analyse::new(expr, mode_degres, prefixe, resolveur, chaine).expr(0)?;
    if pos != prefixe {
        return Err(ErreurNoyau::syntaxe("expression non analysée en entier"));
    }
    Ok(v)
}

/// Évalue l’expression stockée `index` et mémorise son résultat.
/// Une référence déjà présente dans `chaine` est circulaire : erreur de syntaxe.
fn nested_eval(index: i64, resolveur: &dyn ResolveurExpr, chaine: &[i64]) -> Resultat<ReelUnifie> {
    if chaine.contains(&index) {
        tracing::warn!(index, "référence circulaire");
        return Err(ErreurNoyau::syntaxe("référence circulaire"));
    }
    let expr = resolveur.get_expr(index)?;
    let mode = resolveur.get_degree_mode(index)?;
    tracing::debug!(index, mode_degres = mode, "évaluation imbriquée");
    let mut suite = chaine.to_vec();
    suite.push(index);
    let v = evaluer_prefixe(&expr, mode, resolveur, &suite)
        .inspect_err(|e| tracing::debug!(index, erreur = %e, "échec de l’évaluation imbriquée"))?;
    Ok(resolveur.put_result_if_absent(index, v))
}

impl Expression {
    /// Valeur du préfixe évaluable. Les références non encore évaluées le sont
    /// d’abord, des plus profondes aux plus proches.
    pub fn eval(&self, mode_degres: bool, resolveur: &dyn ResolveurExpr) -> Resultat<ReelUnifie> {
        for index in self.transitively_referenced_exprs(resolveur)? {
            nested_eval(index, resolveur, &[])?;
        }
        evaluer_prefixe(self, mode_degres, resolveur, &[])
    }
}

/* ------------------------ Affichage ------------------------ */

#[derive(Clone, Debug)]
pub struct ResultatAffiche {
    pub valeur: ReelUnifie,
    /// Forme symbolique exacte ("2π", "3/4"), si connue.
    pub exact: Option<String>,
    /// Lecture décimale ; finit par "…" si tronquée.
    pub lecture: String,
    /// Texte court pour une abréviation.
    pub court: String,
}

/// "1234567.5" -> "1,234,567.5"
fn grouper_lecture(s: &str) -> String {
    match s.split_once('.') {
        Some((entier, frac)) => format!("{}.{frac}", grouper_milliers(entier, ',')),
        None => grouper_milliers(s, ','),
    }
}

/// Lecture sur au plus `digits` décimales, sans point final inutile.
fn lecture(valeur: &ReelUnifie, digits: usize) -> Resultat<(String, bool)> {
    match valeur.digits_required() {
        Some(d) if d as usize <= digits => {
            let s = valeur.to_string_truncated(d as usize)?;
            Ok((s.trim_end_matches('.').to_string(), true))
        }
        _ => Ok((format!("{}…", valeur.to_string_truncated(digits)?), false)),
    }
}

pub fn evaluer_affichage(
    expr: &Expression,
    mode_degres: bool,
    resolveur: &dyn ResolveurExpr,
    digits: usize,
) -> Resultat<ResultatAffiche> {
    let valeur = expr
        .eval(mode_degres, resolveur)
        .inspect_err(|e| tracing::debug!(erreur = %e, "échec d’évaluation"))?;
    let exact = if valeur.exactly_displayable() {
        Some(valeur.to_nice_string()?)
    } else {
        None
    };
    let (texte, _) = lecture(&valeur, digits)?;
    let court = match &exact {
        Some(s) if s.chars().count() <= COURT_MAX => s.clone(),
        _ => lecture(&valeur, CHIFFRES_COURT)?.0,
    };
    Ok(ResultatAffiche {
        valeur,
        exact,
        lecture: grouper_lecture(&texte),
        court,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noyau::memoire::MemoireExpressions;
    use crate::noyau::touches::Touche::*;
    use pretty_assertions::assert_eq;

    fn frappe(touches: &[Touche]) -> Expression {
        touches.iter().copied().collect()
    }

    fn valeur(touches: &[Touche], degres: bool) -> Resultat<ReelUnifie> {
        frappe(touches).eval(degres, &MemoireExpressions::new())
    }

    fn nice(touches: &[Touche]) -> String {
        valeur(touches, false)
            .unwrap_or_else(|e| panic!("{touches:?}: {e}"))
            .to_nice_string()
            .unwrap()
    }

    fn syntaxe(touches: &[Touche]) {
        match valeur(touches, false) {
            Err(ErreurNoyau::Syntaxe(_)) => {}
            r => panic!("{touches:?}: syntaxe attendue, reçu {r:?}"),
        }
    }

    #[test]
    fn reference_evaluee_sur_son_prefixe() {
        let memoire = MemoireExpressions::new();
        let i = memoire.ajouter(frappe(&[Chiffre2, OpAdd, Chiffre3, OpMul]), false);
        let v = Expression::abbreviate(i, "5").eval(false, &memoire).unwrap();
        assert_eq!(v.to_nice_string().unwrap(), "5");
    }

    #[test]
    fn auto_reference_refusee() {
        let memoire = MemoireExpressions::new();
        let i = memoire.ajouter(Expression::abbreviate(0, "x"), false);
        let r = nested_eval(i, &memoire, &[]);
        assert!(matches!(r, Err(ErreurNoyau::Syntaxe(_))), "{r:?}");
    }

    #[test]
    fn point_seul() {
        syntaxe(&[Point]);
        syntaxe(&[Chiffre1, OpAdd, Point]);
    }

    #[test]
    fn priorites() {
        assert_eq!(nice(&[Chiffre2, OpAdd, Chiffre3, OpMul, Chiffre4]), "14");
        assert_eq!(nice(&[Chiffre2, OpPuissance, Chiffre3, OpPuissance, Chiffre2]), "512");
        assert_eq!(nice(&[OpSub, Chiffre2, OpPuissance, Chiffre2]), "-4");
        assert_eq!(nice(&[Chiffre2, OpPuissance, OpSub, Chiffre1]), "1/2");
        assert_eq!(nice(&[Chiffre7, OpDiv, Chiffre2, OpMul, Chiffre4]), "14");
        assert_eq!(nice(&[Chiffre8, OpSub, Chiffre3, OpSub, Chiffre2]), "3");
    }

    #[test]
    fn multiplication_implicite() {
        assert_eq!(nice(&[Chiffre2, ConstPi]), "2π");
        assert_eq!(
            nice(&[Chiffre3, ParenG, Chiffre4, OpAdd, Chiffre5, ParenD]),
            "27"
        );
        assert_eq!(nice(&[ParenG, Chiffre2, ParenD, ParenG, Chiffre3, ParenD]), "6");
        assert_eq!(nice(&[Chiffre2, OpRacine, Chiffre2]), "2√2");
    }

    #[test]
    fn suffixes() {
        assert_eq!(nice(&[Chiffre5, OpFact]), "120");
        assert_eq!(nice(&[Chiffre3, OpFact, OpCarre]), "36");
        assert_eq!(nice(&[Chiffre5, OpPourcent]), "1/20");
        assert_eq!(nice(&[OpRacine, Chiffre8, OpCarre]), "8");
    }

    #[test]
    fn pourcentages() {
        assert_eq!(nice(&[Chiffre1, Chiffre0, Chiffre0, OpAdd, Chiffre1, Chiffre0, OpPourcent]), "110");
        assert_eq!(nice(&[Chiffre2, Chiffre0, Chiffre0, OpSub, Chiffre5, OpPourcent]), "190");
        assert_eq!(
            nice(&[Chiffre1, Chiffre0, Chiffre0, OpAdd, ParenG, Chiffre1, Chiffre0, ParenD, OpPourcent]),
            "1001/10"
        );
        // suivi d’un + : toujours la règle du pourcentage
        assert_eq!(
            nice(&[Chiffre5, Chiffre0, OpAdd, Chiffre1, Chiffre0, OpPourcent, OpAdd, Chiffre1]),
            "56"
        );
    }

    #[test]
    fn racine_avec_moins() {
        assert_eq!(nice(&[OpRacine, OpSub, ParenG, OpSub, Chiffre4, ParenD]), "2");
        syntaxe(&[OpRacine, OpSub, OpSub, Chiffre4]);
        assert!(matches!(
            valeur(&[OpRacine, OpSub, Chiffre4], false),
            Err(ErreurNoyau::Domaine(_))
        ));
    }

    #[test]
    fn parentheses_fermees_automatiquement() {
        assert_eq!(nice(&[ParenG, Chiffre2, OpAdd, Chiffre3]), "5");
        assert_eq!(nice(&[FunSin, ParenG, ConstPi]), "0");
    }

    #[test]
    fn prefixe_sans_binaires_finaux() {
        assert_eq!(nice(&[Chiffre2, OpAdd, Chiffre3, OpMul]), "5");
        assert_eq!(nice(&[Chiffre2, OpMul, OpSub]), "2");
    }

    #[test]
    fn fonctions() {
        assert_eq!(nice(&[FunLn, ParenG, ConstE, ParenD]), "1");
        assert_eq!(nice(&[FunLog, ParenG, Chiffre1, Chiffre0, Chiffre0, Chiffre0, ParenD]), "3");
        assert_eq!(nice(&[FunExp, ParenG, Chiffre0, ParenD]), "1");
        assert_eq!(nice(&[FunCos, ParenG, ConstPi, ParenD]), "-1");
        assert_eq!(nice(&[FunArctan, ParenG, Chiffre1, ParenD]), "(1/4)π");
    }

    #[test]
    fn mode_degres() {
        let sin30 = [FunSin, ParenG, Chiffre3, Chiffre0, ParenD];
        assert_eq!(valeur(&sin30, true).unwrap().to_nice_string().unwrap(), "1/2");
        let rad = valeur(&sin30, false).unwrap();
        assert!(!rad.definitely_rational());
        assert!(!rad.approx_equals(&ReelUnifie::demi(), -50).unwrap());
        let asin = valeur(&[FunArcsin, ParenG, Chiffre1, ParenD], true).unwrap();
        assert_eq!(asin.to_nice_string().unwrap(), "90");
        assert!(matches!(
            valeur(&[FunTan, ParenG, Chiffre9, Chiffre0, ParenD], true),
            Err(ErreurNoyau::Domaine(_))
        ));
    }

    #[test]
    fn erreurs_de_syntaxe() {
        syntaxe(&[]);
        syntaxe(&[ParenG]);
        syntaxe(&[ParenD]);
        syntaxe(&[Chiffre2, ParenD]);
        syntaxe(&[OpFact]);
        syntaxe(&[OpRacine]);
        syntaxe(&[Chiffre2, OpMul, OpFact]);
    }

    #[test]
    fn erreurs_de_calcul() {
        assert_eq!(
            valeur(&[Chiffre1, OpDiv, Chiffre0], false).unwrap_err(),
            ErreurNoyau::DivisionParZero
        );
        assert!(matches!(
            valeur(&[OpSub, Chiffre1, OpFact], false),
            Ok(_)
        ));
        assert!(matches!(
            valeur(&[ParenG, OpSub, Chiffre1, ParenD, OpFact], false),
            Err(ErreurNoyau::Domaine(_))
        ));
        assert!(matches!(
            valeur(&[FunLn, ParenG, Chiffre0, ParenD], false),
            Err(ErreurNoyau::Domaine(_))
        ));
    }

    #[test]
    fn imbrication_bornee() {
        let touches = vec![ParenG; PROFONDEUR_MAX + 5];
        let mut t = touches;
        t.push(Chiffre1);
        syntaxe(&t);
        let mut ok = vec![ParenG; 50];
        ok.push(Chiffre1);
        assert_eq!(nice(&ok), "1");
    }

    #[test]
    fn references_evaluees_et_memorisees() {
        let memoire = MemoireExpressions::new();
        let a = memoire.ajouter(frappe(&[Chiffre2, OpMul, ConstPi]), false);
        let b = memoire.ajouter(
            {
                let mut e = Expression::abbreviate(a, "2π");
                e.add(OpAdd);
                e.add(Chiffre1);
                e
            },
            false,
        );
        let top = Expression::abbreviate(b, "2π+1…");
        let v = top.eval(false, &memoire).unwrap();
        assert!(memoire.get_result(a).is_some());
        assert!(memoire.get_result(b).is_some());
        let attendu = ReelUnifie::pi().multiply(&ReelUnifie::deux()).add(&ReelUnifie::un());
        assert!(v.approx_equals(&attendu, -100).unwrap());
    }

    #[test]
    fn reference_en_mode_degres_propre() {
        let memoire = MemoireExpressions::new();
        let a = memoire.ajouter(frappe(&[FunSin, ParenG, Chiffre3, Chiffre0, ParenD]), true);
        // l’expression courante est en radians, la référence garde ses degrés
        let v = Expression::abbreviate(a, "1/2").eval(false, &memoire).unwrap();
        assert_eq!(v.to_nice_string().unwrap(), "1/2");
    }

    #[test]
    fn affichage() {
        let memoire = MemoireExpressions::new();
        let r = evaluer_affichage(&frappe(&[Chiffre1, OpDiv, Chiffre8]), false, &memoire, 20).unwrap();
        assert_eq!(r.exact.as_deref(), Some("1/8"));
        assert_eq!(r.lecture, "0.125");
        assert_eq!(r.court, "1/8");

        let r = evaluer_affichage(&frappe(&[Chiffre1, OpDiv, Chiffre3]), false, &memoire, 5).unwrap();
        assert_eq!(r.lecture, "0.33333…");

        let r = evaluer_affichage(&frappe(&[ConstPi]), false, &memoire, 10).unwrap();
        assert_eq!(r.exact.as_deref(), Some("π"));
        assert_eq!(r.lecture, "3.1415926535…");
        assert_eq!(r.court, "π");

        let grand = frappe(&[Chiffre1, Chiffre2, Chiffre3, Chiffre4, Chiffre5, Chiffre6, Chiffre7]);
        let r = evaluer_affichage(&grand, false, &memoire, 10).unwrap();
        assert_eq!(r.lecture, "1,234,567");

        let r = evaluer_affichage(&frappe(&[FunSin, ParenG, Chiffre1, ParenD]), false, &memoire, 4)
            .unwrap();
        assert_eq!(r.exact, None);
        assert_eq!(r.court, "0.841470…");
    }
}
