//! Planet names for generated universes.

use rand::seq::SliceRandom;

use crate::rules::GameRng;

const NAMES: &[&str] = &[
    "Abbott", "Acrux", "Adhara", "Alcor", "Aldebaran", "Algol", "Alioth", "Alnitak", "Alpheratz",
    "Altair", "Ankaa", "Antares", "Arcturus", "Arrakis", "Atria", "Avior", "Bellatrix",
    "Betelgeuse", "Bolivar", "Brahe", "Canopus", "Capella", "Castor", "Cebalrai", "Chara",
    "Cygni", "Dabih", "Deneb", "Diphda", "Dubhe", "Elnath", "Eltanin", "Enif", "Fomalhaut",
    "Gacrux", "Gemma", "Gienah", "Hadar", "Hamal", "Izar", "Kaus", "Kochab", "Kraz", "Lesath",
    "Markab", "Meissa", "Menkar", "Merak", "Miaplacidus", "Mimosa", "Mintaka", "Mira",
    "Mirach", "Mirfak", "Mizar", "Naos", "Nashira", "Nihal", "Nunki", "Peacock", "Phact",
    "Phecda", "Polaris", "Pollux", "Procyon", "Rasalhague", "Regulus", "Rigel", "Ruchbah",
    "Sabik", "Sadr", "Saiph", "Scheat", "Schedar", "Shaula", "Sirius", "Spica", "Suhail",
    "Tarazed", "Thuban", "Unukalhai", "Vega", "Wasat", "Wezen", "Yed", "Zaniah", "Zaurak",
    "Zosma", "Zubenelgenubi",
];

/// `count` distinct names in random order. Names repeat with a numeric
/// suffix once the list runs out.
#[must_use]
pub fn random_names(count: usize, rng: &mut GameRng) -> Vec<String> {
    let mut names = Vec::with_capacity(count);
    let mut round = 0;
    while names.len() < count {
        let mut batch: Vec<String> = NAMES
            .iter()
            .map(|name| {
                if round == 0 {
                    (*name).to_string()
                } else {
                    format!("{name} {}", round + 1)
                }
            })
            .collect();
        batch.shuffle(rng);
        names.extend(batch.into_iter().take(count - names.len()));
        round += 1;
    }
    names
}
