//! Procedural nation names and banner colours.

use rand::seq::SliceRandom;
use rand::Rng;

/// Leading honorifics.
pub const PREFIXES: [&str; 10] = [
    "Holy", "Ancient", "Dark", "Bright", "Silent", "Grand", "Mystic", "Iron", "Stormy", "Golden",
];

/// Descriptive adjectives.
pub const ADJECTIVES: [&str; 10] = [
    "Berating", "Golden", "Furious", "Hidden", "Mighty", "Blessed", "Crimson", "Shadow", "Silver",
    "Glorious",
];

/// Polity types; every name has exactly one.
pub const TYPES: [&str; 5] = ["Duchy", "Kingdom", "Empire", "Principality", "Realm"];

/// Trailing "of ..." phrases.
pub const SUFFIXES: [&str; 10] = [
    "of Light", "of Stone", "of Fire", "of Brick", "of Shadows", "of Glory", "of Winds", "of Ice",
    "of Earth", "of Heaven",
];

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, words: &[&'a str]) -> &'a str {
    words.choose(rng).copied().unwrap_or_default()
}

/// Roll a kingdom name such as "Iron Duchy of Winds".
///
/// Prefix, adjective and suffix each appear with even odds; the polity
/// type always does. A bare type gets one extra modifier so no nation is
/// just "Kingdom".
pub fn nation_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut parts: Vec<&str> = Vec::with_capacity(4);

    if rng.gen::<f64>() > 0.5 {
        parts.push(pick(rng, &PREFIXES));
    }
    if rng.gen::<f64>() > 0.5 {
        parts.push(pick(rng, &ADJECTIVES));
    }
    parts.push(pick(rng, &TYPES));
    if rng.gen::<f64>() > 0.5 {
        parts.push(pick(rng, &SUFFIXES));
    }

    if parts.len() == 1 {
        let all: Vec<&str> = PREFIXES
            .iter()
            .chain(ADJECTIVES.iter())
            .chain(SUFFIXES.iter())
            .copied()
            .collect();
        let modifier = pick(rng, &all);
        if SUFFIXES.contains(&modifier) {
            parts.push(modifier);
        } else {
            parts.insert(0, modifier);
        }
    }

    parts.join(" ")
}

/// Random banner hue in `[0, 360)`.
pub fn banner_hue<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>() * 360.0
}

/// CSS colour string for a hue, as the map renders it.
#[must_use]
pub fn hue_to_css(hue: f64) -> String {
    format!("hsl({hue},70%,50%)")
}
