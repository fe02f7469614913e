// src/noyau/reglages.rs
//
// Réglages d’affichage : nombre de décimales de la lecture, mode d’angle.

pub const DIGITS_DEFAUT: usize = 20;
pub const DIGITS_MAX: usize = 200;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reglages {
    digits: usize,
    pub mode_degres: bool,
}

impl Default for Reglages {
    fn default() -> Self {
        Reglages {
            digits: DIGITS_DEFAUT,
            mode_degres: false,
        }
    }
}

impl Reglages {
    pub fn digits(&self) -> usize {
        self.digits
    }

    /// Borné à [1, DIGITS_MAX].
    pub fn set_digits(&mut self, n: usize) {
        self.digits = n.clamp(1, DIGITS_MAX);
    }
}
