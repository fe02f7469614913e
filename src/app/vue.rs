// src/app/vue.rs
//
// Vue (UI egui) — natif + web
// ---------------------------
// Objectifs :
// - Même AppCalc (etat.rs) pour natif + wasm
// - Pavé de touches : chaque bouton est une `Touche` du noyau
// - Clavier physique : chiffres/opérateurs tapés, Enter évalue, Backspace efface
// - Historique cliquable : réutilise un résultat comme abréviation
//
// Note :
// - PAS de Key::NumEnter (n’existe pas dans egui 0.33.x)

use eframe::egui;

use super::etat::AppCalc;
use crate::noyau::reglages::DIGITS_MAX;
use crate::noyau::Touche::{self, *};

#[derive(Clone, Copy)]
enum Bouton {
    T(Touche),
    Del,
    Egal,
}

use Bouton::{Del, Egal, T};

const RANGEES: [[Bouton; 5]; 7] = [
    [T(FunSin), T(FunCos), T(FunTan), T(FunLn), T(FunLog)],
    [T(FunArcsin), T(FunArccos), T(FunArctan), T(FunExp), T(OpFact)],
    [T(ConstPi), T(ConstE), T(OpRacine), T(OpCarre), T(OpPuissance)],
    [T(ParenG), T(ParenD), T(OpPourcent), T(OpDiv), T(OpMul)],
    [T(Chiffre7), T(Chiffre8), T(Chiffre9), T(OpSub), T(OpAdd)],
    [T(Chiffre4), T(Chiffre5), T(Chiffre6), T(Point), Del],
    [T(Chiffre1), T(Chiffre2), T(Chiffre3), T(Chiffre0), Egal],
];

impl AppCalc {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        self.clavier_physique(ui);
        self.relever_calcul();
        if self.calcul_en_cours() {
            ui.ctx().request_repaint();
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading("Calculatrice exacte");
                ui.add_space(6.0);

                self.ui_entree(ui);
                ui.add_space(6.0);
                self.ui_resultats(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_reglages(ui);
                ui.add_space(6.0);
                self.ui_pave(ui);

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                self.ui_historique(ui);
            });
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui) {
        let rendu = self.expr.rendu(&self.loc);
        let resp = Self::champ_monospace(ui, "entree_out", &rendu.texte, 1);
        if let Some(d) = rendu.description {
            resp.on_hover_text(d);
        }
    }

    fn ui_resultats(&mut self, ui: &mut egui::Ui) {
        if !self.exact.is_empty() {
            ui.label("Exact :");
            Self::champ_monospace(ui, "exact_out", &self.exact, 1);
        }
        ui.label("Lecture :");
        let lecture = if self.calcul_en_cours() { "…" } else { self.lecture.as_str() };
        Self::champ_monospace(ui, "lecture_out", lecture, 2);

        if !self.erreur.is_empty() {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().error_fg_color, &self.erreur);
        }
    }

    fn ui_reglages(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let mut degres = self.reglages.mode_degres;
            if ui.checkbox(&mut degres, "Degrés").changed() {
                self.set_mode_degres(degres);
            }

            ui.separator();

            ui.label("Lecture :");
            let mut d = self.reglages.digits() as u32;
            let resp = ui.add(
                egui::DragValue::new(&mut d)
                    .speed(1)
                    .range(1..=DIGITS_MAX as u32)
                    .suffix(" chiffres"),
            );
            if resp.changed() {
                self.set_digits(d as usize);
            }
        });
    }

    fn ui_pave(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("pave_touches")
            .num_columns(5)
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                for rangee in &RANGEES {
                    for &b in rangee {
                        match b {
                            T(t) => self.bouton_touche(ui, t),
                            Del => self.bouton_action(ui, "DEL", "Efface le dernier symbole", Action::Supprimer),
                            Egal => self.bouton_action(ui, "=", "Évalue et range dans l’historique", Action::Valider),
                        }
                    }
                    ui.end_row();
                }
            });

        ui.horizontal(|ui| {
            self.bouton_action(ui, "C", "Efface seulement l’entrée", Action::ClearEntree);
            self.bouton_action(ui, "AC", "Remise à zéro totale", Action::ResetTotal);
        });
    }

    fn ui_historique(&mut self, ui: &mut egui::Ui) {
        let mut reprise = None;
        egui::CollapsingHeader::new("Historique")
            .default_open(true)
            .show(ui, |ui| {
                if self.historique.is_empty() {
                    ui.weak("vide");
                }
                for ligne in self.historique.iter().rev() {
                    let texte = format!("{} = {}", ligne.texte, ligne.resultat);
                    let resp = ui
                        .add(egui::Button::new(egui::RichText::new(texte).monospace()).frame(false))
                        .on_hover_text("Réutiliser ce résultat");
                    if resp.clicked() {
                        reprise = Some(ligne.index);
                    }
                }
            });
        if let Some(index) = reprise {
            self.reprendre(index);
        }
    }

    /// Touches tapées au clavier -> touches du noyau.
    fn clavier_physique(&mut self, ui: &mut egui::Ui) {
        let evenements = ui.input(|i| i.events.clone());
        for ev in evenements {
            match ev {
                egui::Event::Text(s) => {
                    for c in s.chars() {
                        if let Some(t) = touche_de_caractere(c) {
                            self.touche(t);
                        }
                    }
                }
                egui::Event::Key {
                    key, pressed: true, ..
                } => match key {
                    egui::Key::Enter => self.valider(),
                    egui::Key::Backspace => self.supprimer(),
                    _ => {}
                },
                _ => {}
            }
        }
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) -> egui::Response {
        // Affichage lecture seule “stable”, sans TextEdit interactif.
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            })
            .response
    }

    fn bouton_touche(&mut self, ui: &mut egui::Ui, t: Touche) {
        let mut resp = ui.add_sized([52.0, 32.0], egui::Button::new(self.loc.libelle(t)));
        if let Some(d) = self.loc.description(t) {
            resp = resp.on_hover_text(d);
        }
        if resp.clicked() {
            self.touche(t);
        }
    }

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add_sized([52.0, 32.0], egui::Button::new(label))
            .on_hover_text(tip);

        if resp.clicked() {
            match action {
                Action::ClearEntree => self.clear_entree(),
                Action::ResetTotal => self.reset_total(),
                Action::Supprimer => self.supprimer(),
                Action::Valider => self.valider(),
            }
        }
    }
}

fn touche_de_caractere(c: char) -> Option<Touche> {
    if let Some(v) = c.to_digit(10) {
        return Touche::chiffre(v as u8);
    }
    Some(match c {
        '.' | ',' => Point,
        '+' => OpAdd,
        '-' => OpSub,
        '*' => OpMul,
        '/' => OpDiv,
        '^' => OpPuissance,
        '(' => ParenG,
        ')' => ParenD,
        '!' => OpFact,
        '%' => OpPourcent,
        'p' => ConstPi,
        'e' => ConstE,
        _ => return None,
    })
}

#[derive(Clone, Copy, Debug)]
enum Action {
    ClearEntree,
    ResetTotal,
    Supprimer,
    Valider,
}
