// src/noyau/annulation.rs
//
// Annulation coopérative
// ----------------------
// Un calcul long (factorielle énorme, précision élevée) tourne sur un thread de
// travail. L’UI garde une copie de l’`Annulation` et la lève si l’entrée change.
// Les boucles coûteuses appellent `verifier()` entre deux étapes.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::erreurs::{ErreurNoyau, Resultat};

thread_local! {
    static SIGNAL: RefCell<Option<Arc<AtomicBool>>> = const { RefCell::new(None) };
}

#[derive(Clone, Debug, Default)]
pub struct Annulation(Arc<AtomicBool>);

impl Annulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn annuler(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn est_annulee(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Exécute `f` sur le thread courant avec ce signal installé.
    /// Le signal précédent est restauré en sortie (même en cas de panique).
    pub fn executer<T>(&self, f: impl FnOnce() -> T) -> T {
        let precedent = SIGNAL.with(|s| s.borrow_mut().replace(self.0.clone()));
        let _garde = Restauration(precedent);
        f()
    }
}

struct Restauration(Option<Arc<AtomicBool>>);

impl Drop for Restauration {
    fn drop(&mut self) {
        let precedent = self.0.take();
        SIGNAL.with(|s| *s.borrow_mut() = precedent);
    }
}

/// `Err(Interrompu)` si le signal du thread courant est levé.
pub fn verifier() -> Resultat<()> {
    let leve = SIGNAL.with(|s| {
        s.borrow()
            .as_ref()
            .is_some_and(|f| f.load(Ordering::Relaxed))
    });
    if leve {
        Err(ErreurNoyau::Interrompu)
    } else {
        Ok(())
    }
}
