// src/noyau/touches.rs
//
// Vocabulaire fermé des touches du clavier.
// Le noyau ne réinterprète jamais une touche : il la classe et la sérialise.

/* ------------------------ Touches ------------------------ */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Touche {
    Chiffre0,
    Chiffre1,
    Chiffre2,
    Chiffre3,
    Chiffre4,
    Chiffre5,
    Chiffre6,
    Chiffre7,
    Chiffre8,
    Chiffre9,
    Point,

    OpPuissance,
    OpMul,
    OpDiv,
    OpAdd,
    OpSub,

    OpRacine,
    OpFact,
    OpCarre,
    OpPourcent,

    ParenG,
    ParenD,

    ConstPi,
    ConstE,

    FunSin,
    FunCos,
    FunTan,
    FunArcsin,
    FunArccos,
    FunArctan,
    FunLn,
    FunLog,
    FunExp,
}

use Touche::*;

/// Toutes les touches, dans l’ordre de déclaration.
pub const TOUTES: [Touche; 33] = [
    Chiffre0, Chiffre1, Chiffre2, Chiffre3, Chiffre4, Chiffre5, Chiffre6, Chiffre7, Chiffre8,
    Chiffre9, Point, OpPuissance, OpMul, OpDiv, OpAdd, OpSub, OpRacine, OpFact, OpCarre,
    OpPourcent, ParenG, ParenD, ConstPi, ConstE, FunSin, FunCos, FunTan, FunArcsin, FunArccos,
    FunArctan, FunLn, FunLog, FunExp,
];

const CHIFFRES: [Touche; 10] = [
    Chiffre0, Chiffre1, Chiffre2, Chiffre3, Chiffre4, Chiffre5, Chiffre6, Chiffre7, Chiffre8,
    Chiffre9,
];

impl Touche {
    pub fn chiffre(v: u8) -> Option<Self> {
        CHIFFRES.get(usize::from(v)).copied()
    }

    /// Valeur du chiffre, `None` pour toute autre touche.
    pub fn valeur_chiffre(self) -> Option<u8> {
        CHIFFRES.iter().position(|&t| t == self).map(|p| p as u8)
    }

    pub fn est_chiffre(self) -> bool {
        self.valeur_chiffre().is_some()
    }

    /// Morceau de constante (chiffre ou point décimal).
    pub fn est_morceau_constante(self) -> bool {
        self.est_chiffre() || self == Point
    }

    pub fn est_binaire(self) -> bool {
        matches!(self, OpPuissance | OpMul | OpDiv | OpAdd | OpSub)
    }

    /// Préfixes : √ et le moins unaire.
    pub fn est_prefixe(self) -> bool {
        matches!(self, OpRacine | OpSub)
    }

    pub fn est_suffixe(self) -> bool {
        matches!(self, OpFact | OpCarre | OpPourcent)
    }

    /// Fonctions nommées, toujours suivies d’une parenthèse ouvrante.
    pub fn est_fonction(self) -> bool {
        matches!(
            self,
            FunSin | FunCos | FunTan | FunArcsin | FunArccos | FunArctan | FunLn | FunLog | FunExp
        )
    }

    pub fn est_trigo(self) -> bool {
        matches!(
            self,
            FunSin | FunCos | FunTan | FunArcsin | FunArccos | FunArctan
        )
    }

    /// Symbole par défaut (hors localisation).
    pub fn symbole(self) -> &'static str {
        match self {
            Chiffre0 => "0",
            Chiffre1 => "1",
            Chiffre2 => "2",
            Chiffre3 => "3",
            Chiffre4 => "4",
            Chiffre5 => "5",
            Chiffre6 => "6",
            Chiffre7 => "7",
            Chiffre8 => "8",
            Chiffre9 => "9",
            Point => ".",
            OpPuissance => "^",
            OpMul => "×",
            OpDiv => "÷",
            OpAdd => "+",
            OpSub => "−",
            OpRacine => "√",
            OpFact => "!",
            OpCarre => "²",
            OpPourcent => "%",
            ParenG => "(",
            ParenD => ")",
            ConstPi => "π",
            ConstE => "e",
            FunSin => "sin",
            FunCos => "cos",
            FunTan => "tan",
            FunArcsin => "sin⁻¹",
            FunArccos => "cos⁻¹",
            FunArctan => "tan⁻¹",
            FunLn => "ln",
            FunLog => "log",
            FunExp => "exp",
        }
    }

    /* ------------------------ Octets (sérialisation) ------------------------ */

    /// Octet ASCII (0x20..=0x7E) d’un opérateur. Les morceaux de constante
    /// ne sont jamais écrits comme opérateurs.
    pub fn vers_octet(self) -> Option<u8> {
        let b = match self {
            ConstPi => b'p',
            ConstE => b'e',
            OpRacine => b'r',
            OpFact => b'!',
            OpPourcent => b'%',
            FunSin => b's',
            FunCos => b'c',
            FunTan => b't',
            FunArcsin => b'S',
            FunArccos => b'C',
            FunArctan => b'T',
            FunLn => b'l',
            FunLog => b'L',
            FunExp => b'E',
            ParenG => b'(',
            ParenD => b')',
            OpPuissance => b'^',
            OpMul => b'*',
            OpDiv => b'/',
            OpAdd => b'+',
            OpSub => b'-',
            OpCarre => b'2',
            _ => return None,
        };
        Some(b)
    }

    pub fn depuis_octet(b: u8) -> Option<Self> {
        TOUTES.iter().copied().find(|t| t.vers_octet() == Some(b))
    }
}
