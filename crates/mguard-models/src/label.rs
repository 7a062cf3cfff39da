//! Open-vocabulary detection labels.
//!
//! Every label carries a static category tag. The three categories are
//! disjoint, so a label can raise at most one category flag.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Detection category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Animal,
    /// Drugs, alcohol and smoking
    Das,
    Weapon,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Animal, Category::Das, Category::Weapon];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Animal => "animal",
            Category::Das => "das",
            Category::Weapon => "weapon",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detector prompt label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    // Animal
    Dog,
    Cat,
    Cow,
    Horse,
    Goat,
    Sheep,
    Pig,
    Elephant,
    Tiger,
    Lion,
    Bear,
    Deer,
    Monkey,
    Bird,
    Snake,
    Rabbit,
    Fish,
    Animal,
    // Drugs / alcohol / smoking
    Alcohol,
    AlcoholBottle,
    Beer,
    Wine,
    Liquor,
    Cigarette,
    Smoking,
    Cigar,
    Vape,
    WeedJoint,
    Cannabis,
    DrugPacket,
    Syringe,
    Injection,
    Needle,
    Tablet,
    Pill,
    Capsule,
    // Weapon
    Knife,
    Pistol,
    Gun,
    Revolver,
    Rifle,
    AssaultRifle,
    Ak47,
    Grenade,
    Weapon,
    Blade,
    Machete,
    Bazooka,
    SniperRifle,
    Sword,
}

static BY_PROMPT: LazyLock<HashMap<&'static str, Label>> =
    LazyLock::new(|| Label::ALL.iter().map(|l| (l.prompt(), *l)).collect());

impl Label {
    /// Every label, in detector prompt order (animal, DAS, weapon).
    pub const ALL: [Label; 50] = [
        Label::Dog,
        Label::Cat,
        Label::Cow,
        Label::Horse,
        Label::Goat,
        Label::Sheep,
        Label::Pig,
        Label::Elephant,
        Label::Tiger,
        Label::Lion,
        Label::Bear,
        Label::Deer,
        Label::Monkey,
        Label::Bird,
        Label::Snake,
        Label::Rabbit,
        Label::Fish,
        Label::Animal,
        Label::Alcohol,
        Label::AlcoholBottle,
        Label::Beer,
        Label::Wine,
        Label::Liquor,
        Label::Cigarette,
        Label::Smoking,
        Label::Cigar,
        Label::Vape,
        Label::WeedJoint,
        Label::Cannabis,
        Label::DrugPacket,
        Label::Syringe,
        Label::Injection,
        Label::Needle,
        Label::Tablet,
        Label::Pill,
        Label::Capsule,
        Label::Knife,
        Label::Pistol,
        Label::Gun,
        Label::Revolver,
        Label::Rifle,
        Label::AssaultRifle,
        Label::Ak47,
        Label::Grenade,
        Label::Weapon,
        Label::Blade,
        Label::Machete,
        Label::Bazooka,
        Label::SniperRifle,
        Label::Sword,
    ];

    /// Text prompt sent to the open-vocabulary detector.
    pub fn prompt(&self) -> &'static str {
        match self {
            Label::Dog => "Dog",
            Label::Cat => "Cat",
            Label::Cow => "Cow",
            Label::Horse => "Horse",
            Label::Goat => "Goat",
            Label::Sheep => "Sheep",
            Label::Pig => "Pig",
            Label::Elephant => "Elephant",
            Label::Tiger => "Tiger",
            Label::Lion => "Lion",
            Label::Bear => "Bear",
            Label::Deer => "Deer",
            Label::Monkey => "Monkey",
            Label::Bird => "Bird",
            Label::Snake => "Snake",
            Label::Rabbit => "Rabbit",
            Label::Fish => "Fish",
            Label::Animal => "Animal",
            Label::Alcohol => "Alcohol",
            Label::AlcoholBottle => "Alcohol bottle",
            Label::Beer => "Beer",
            Label::Wine => "Wine",
            Label::Liquor => "Liquor",
            Label::Cigarette => "cigarette",
            Label::Smoking => "smoking",
            Label::Cigar => "cigar",
            Label::Vape => "vape",
            Label::WeedJoint => "weed joint",
            Label::Cannabis => "cannabis",
            Label::DrugPacket => "drug packet",
            Label::Syringe => "syringe",
            Label::Injection => "injection",
            Label::Needle => "needle",
            Label::Tablet => "Tablet",
            Label::Pill => "Pill",
            Label::Capsule => "Capsule",
            Label::Knife => "knife",
            Label::Pistol => "pistol",
            Label::Gun => "gun",
            Label::Revolver => "revolver",
            Label::Rifle => "rifle",
            Label::AssaultRifle => "assault rifle",
            Label::Ak47 => "AK47",
            Label::Grenade => "grenade",
            Label::Weapon => "weapon",
            Label::Blade => "blade",
            Label::Machete => "machete",
            Label::Bazooka => "bazooka",
            Label::SniperRifle => "sniper rifle",
            Label::Sword => "sword",
        }
    }

    /// Category tag.
    pub fn category(&self) -> Category {
        use Label::*;
        match self {
            Dog | Cat | Cow | Horse | Goat | Sheep | Pig | Elephant | Tiger | Lion | Bear
            | Deer | Monkey | Bird | Snake | Rabbit | Fish | Animal => Category::Animal,
            Alcohol | AlcoholBottle | Beer | Wine | Liquor | Cigarette | Smoking | Cigar
            | Vape | WeedJoint | Cannabis | DrugPacket | Syringe | Injection | Needle
            | Tablet | Pill | Capsule => Category::Das,
            Knife | Pistol | Gun | Revolver | Rifle | AssaultRifle | Ak47 | Grenade | Weapon
            | Blade | Machete | Bazooka | SniperRifle | Sword => Category::Weapon,
        }
    }

    /// Look up a label by the exact prompt text the detector echoed back.
    pub fn from_prompt(prompt: &str) -> Option<Label> {
        BY_PROMPT.get(prompt).copied()
    }

    /// All prompts, in detector order.
    pub fn prompts() -> Vec<&'static str> {
        Self::ALL.iter().map(|l| l.prompt()).collect()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prompt())
    }
}

/// Per-category detection flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFlags {
    pub animal: bool,
    pub das: bool,
    pub weapon: bool,
}

impl CategoryFlags {
    pub fn get(&self, category: Category) -> bool {
        match category {
            Category::Animal => self.animal,
            Category::Das => self.das,
            Category::Weapon => self.weapon,
        }
    }

    pub fn set(&mut self, category: Category) {
        match category {
            Category::Animal => self.animal = true,
            Category::Das => self.das = true,
            Category::Weapon => self.weapon = true,
        }
    }

    /// True once every category has fired.
    pub fn all(&self) -> bool {
        self.animal && self.das && self.weapon
    }

    pub fn any(&self) -> bool {
        self.animal || self.das || self.weapon
    }
}
