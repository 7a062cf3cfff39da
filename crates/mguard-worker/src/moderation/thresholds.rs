//! Per-label confidence thresholds for open-vocabulary detections.

use std::collections::HashMap;

use mguard_models::{Category, Label};

/// Threshold for labels the table does not know. Nothing passes it.
pub const UNKNOWN_LABEL_THRESHOLD: f32 = 1.0;

/// Label → minimum confidence, with per-category defaults.
#[derive(Debug, Clone)]
pub struct ThresholdTable {
    overrides: HashMap<Label, f32>,
    category_defaults: HashMap<Category, f32>,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        let overrides = HashMap::from([
            (Label::Animal, 0.50),
            (Label::Alcohol, 0.40),
            (Label::AlcoholBottle, 0.45),
            (Label::Beer, 0.38),
            (Label::Wine, 0.45),
            (Label::Liquor, 0.45),
            (Label::Cigarette, 0.50),
            (Label::Smoking, 0.50),
            (Label::Cigar, 0.50),
            (Label::Vape, 0.50),
            (Label::WeedJoint, 0.50),
            (Label::Cannabis, 0.55),
            (Label::DrugPacket, 0.65),
            (Label::Syringe, 0.48),
            (Label::Injection, 0.45),
            (Label::Needle, 0.50),
            (Label::Tablet, 0.50),
            (Label::Pill, 0.50),
            (Label::Capsule, 0.40),
        ]);

        let category_defaults = HashMap::from([
            (Category::Animal, 0.44),
            (Category::Das, 0.44),
            (Category::Weapon, 0.30),
        ]);

        Self {
            overrides,
            category_defaults,
        }
    }
}

impl ThresholdTable {
    /// Replace or add a per-label threshold.
    pub fn with_override(mut self, label: Label, threshold: f32) -> Self {
        self.overrides.insert(label, threshold);
        self
    }

    pub fn resolve_label(&self, label: Label) -> f32 {
        if let Some(threshold) = self.overrides.get(&label) {
            return *threshold;
        }
        self.category_defaults
            .get(&label.category())
            .copied()
            .unwrap_or(UNKNOWN_LABEL_THRESHOLD)
    }

    /// Threshold for a detector label string.
    pub fn resolve(&self, label: &str) -> f32 {
        Label::from_prompt(label)
            .map(|l| self.resolve_label(l))
            .unwrap_or(UNKNOWN_LABEL_THRESHOLD)
    }

    /// Whether a detection clears its threshold. Unknown labels never pass.
    pub fn passes(&self, label: &str, score: f32) -> Option<Label> {
        let known = Label::from_prompt(label)?;
        (score >= self.resolve_label(known)).then_some(known)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_override() {
        let table = ThresholdTable::default();
        assert_eq!(table.resolve("Beer"), 0.38);
        assert_eq!(table.resolve("drug packet"), 0.65);
        assert_eq!(table.resolve("Animal"), 0.50);
    }

    #[test]
    fn test_category_default() {
        let table = ThresholdTable::default();
        assert_eq!(table.resolve("Dog"), 0.44);
        assert_eq!(table.resolve("sword"), 0.30);
        assert_eq!(table.resolve("AK47"), 0.30);
    }

    #[test]
    fn test_unknown_label() {
        let table = ThresholdTable::default();
        assert_eq!(table.resolve("toaster"), 1.0);
        assert_eq!(table.resolve("beer"), 1.0);
        assert!(table.passes("toaster", 1.0).is_none());
    }

    #[test]
    fn test_passes_is_inclusive() {
        let table = ThresholdTable::default();
        assert_eq!(table.passes("Beer", 0.38), Some(Label::Beer));
        assert!(table.passes("Beer", 0.379).is_none());
        assert_eq!(table.passes("knife", 0.31), Some(Label::Knife));
    }

    fn expected_threshold(label: Label) -> f32 {
        use Label::*;
        match label {
            Animal => 0.50,
            Alcohol | Capsule => 0.40,
            AlcoholBottle | Wine | Liquor | Injection => 0.45,
            Beer => 0.38,
            Cigarette | Smoking | Cigar | Vape | WeedJoint | Needle | Tablet | Pill => 0.50,
            Cannabis => 0.55,
            DrugPacket => 0.65,
            Syringe => 0.48,
            Dog | Cat | Cow | Horse | Goat | Sheep | Pig | Elephant | Tiger | Lion | Bear
            | Deer | Monkey | Bird | Snake | Rabbit | Fish => 0.44,
            Knife | Pistol | Gun | Revolver | Rifle | AssaultRifle | Ak47 | Grenade | Weapon
            | Blade | Machete | Bazooka | SniperRifle | Sword => 0.30,
        }
    }

    #[test]
    fn test_every_label_resolves() {
        let table = ThresholdTable::default();
        for label in Label::ALL {
            let expected = expected_threshold(label);
            assert_eq!(table.resolve(label.prompt()), expected, "{:?}", label);
            assert_eq!(table.resolve_label(label), expected, "{:?}", label);
            assert_eq!(table.passes(label.prompt(), expected), Some(label), "{:?}", label);
            assert!(
                table.passes(label.prompt(), expected - 0.001).is_none(),
                "{:?}",
                label
            );
        }
    }

    #[test]
    fn test_with_override() {
        let table = ThresholdTable::default().with_override(Label::Dog, 0.9);
        assert_eq!(table.resolve("Dog"), 0.9);
        assert_eq!(table.resolve("Cat"), 0.44);
    }
}
