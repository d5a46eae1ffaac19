//! The player's ruler: name, gender and regnal title.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Name used when a rename is left blank.
pub const DEFAULT_RULER_NAME: &str = "Arthur";

/// Names a male ruler may be born with.
pub const MALE_NAMES: [&str; 10] = [
    "Arthur",
    "David",
    "Henry",
    "Edward",
    "Charles",
    "Richard",
    "William",
    "James",
    "Alexander",
    "Frederick",
];

/// Names a female ruler may be born with.
pub const FEMALE_NAMES: [&str; 10] = [
    "Isabella",
    "Victoria",
    "Alice",
    "Matilda",
    "Eleanor",
    "Elizabeth",
    "Catherine",
    "Margaret",
    "Anne",
    "Mary",
];

/// Titles by island prestige rank as `(male, female)`.
const TITLES: [(&str, &str); 6] = [
    ("General", "General"),
    ("Count", "Countess"),
    ("Duke", "Duchess"),
    ("King", "Queen"),
    ("Emperor", "Empress"),
    ("Overlord", "Overlord"),
];

/// Ruler gender; selects the title variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Male titles.
    #[default]
    Male,
    /// Female titles.
    Female,
}

/// Ruler identity. Survives every reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruler {
    /// Given name.
    pub name: String,
    /// Gender.
    pub gender: Gender,
}

impl Default for Ruler {
    fn default() -> Self {
        Self {
            name: DEFAULT_RULER_NAME.to_string(),
            gender: Gender::Male,
        }
    }
}

impl Ruler {
    /// Draw a name from both lists and infer the gender from it.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let all: Vec<&str> = MALE_NAMES.iter().chain(FEMALE_NAMES.iter()).copied().collect();
        let name = all.choose(rng).copied().unwrap_or(DEFAULT_RULER_NAME);
        let gender = if FEMALE_NAMES.contains(&name) {
            Gender::Female
        } else {
            Gender::Male
        };
        Self {
            name: name.to_string(),
            gender,
        }
    }

    /// Rename; blank names fall back to [`DEFAULT_RULER_NAME`].
    pub fn rename(&mut self, name: &str, gender: Gender) {
        let trimmed = name.trim();
        self.name = if trimmed.is_empty() {
            DEFAULT_RULER_NAME.to_string()
        } else {
            trimmed.to_string()
        };
        self.gender = gender;
    }

    /// Full display name, e.g. "Duchess Alice III".
    #[must_use]
    pub fn display_name(&self, island_prestige: u32, ruler_prestige: u32) -> String {
        format!(
            "{} {} {}",
            title(island_prestige, self.gender),
            self.name,
            regnal_number(u64::from(ruler_prestige) + 1)
        )
    }
}

/// Title for an island prestige rank, clamped to the last rank.
#[must_use]
pub fn title(rank: u32, gender: Gender) -> &'static str {
    let index = usize::try_from(rank).unwrap_or(usize::MAX).min(TITLES.len() - 1);
    let (male, female) = TITLES[index];
    match gender {
        Gender::Male => male,
        Gender::Female => female,
    }
}

/// Roman numeral below 4000, English ordinal from there on.
#[must_use]
pub fn regnal_number(n: u64) -> String {
    if n >= 4000 {
        ordinal(n)
    } else {
        to_roman(n)
    }
}

/// Roman numeral. Zero renders as an empty string.
#[must_use]
pub fn to_roman(mut n: u64) -> String {
    const LOOKUP: [(u64, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, numeral) in LOOKUP {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

/// English ordinal, e.g. "4001st", "4011th".
#[must_use]
pub fn ordinal(n: u64) -> String {
    let suffix = match (n % 100, n % 10) {
        (11..=13, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_roman() {
        assert_eq!(to_roman(1), "I");
        assert_eq!(to_roman(4), "IV");
        assert_eq!(to_roman(14), "XIV");
        assert_eq!(to_roman(19), "XIX");
        assert_eq!(to_roman(49), "XLIX");
        assert_eq!(to_roman(1994), "MCMXCIV");
        assert_eq!(to_roman(3999), "MMMCMXCIX");
    }

    #[test]
    fn test_ordinals() {
        assert_eq!(regnal_number(4000), "4000th");
        assert_eq!(regnal_number(4001), "4001st");
        assert_eq!(regnal_number(4002), "4002nd");
        assert_eq!(regnal_number(4003), "4003rd");
        assert_eq!(regnal_number(4011), "4011th");
        assert_eq!(regnal_number(4113), "4113th");
        assert_eq!(regnal_number(4122), "4122nd");
    }

    #[test]
    fn test_titles_clamp() {
        assert_eq!(title(0, Gender::Female), "General");
        assert_eq!(title(1, Gender::Female), "Countess");
        assert_eq!(title(3, Gender::Male), "King");
        assert_eq!(title(5, Gender::Female), "Overlord");
        assert_eq!(title(40, Gender::Male), "Overlord");
    }

    #[test]
    fn test_display_name() {
        let mut ruler = Ruler::default();
        assert_eq!(ruler.display_name(0, 0), "General Arthur I");
        ruler.rename("Alice", Gender::Female);
        assert_eq!(ruler.display_name(2, 2), "Duchess Alice III");
        ruler.rename("   ", Gender::Male);
        assert_eq!(ruler.name, DEFAULT_RULER_NAME);
    }

    #[test]
    fn test_random_gender_matches_list() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..50 {
            let ruler = Ruler::random(&mut rng);
            let female = FEMALE_NAMES.contains(&ruler.name.as_str());
            assert_eq!(female, ruler.gender == Gender::Female);
        }
    }
}
