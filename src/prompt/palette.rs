//! Feature-to-color mapping for the prompt palette block.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::analysis::CodeMetrics;

/// Weights are clamped into this range regardless of feature magnitude.
const MAX_COLOR_WEIGHT: u32 = 10;

/// One row of the element color wheel: a feature key paired with a named hue.
pub struct ElementColor {
    pub key: &'static str,
    pub name: &'static str,
    pub hex: &'static str,
}

/// Fixed, ordered color table. Order doubles as the tie-break for equal
/// weights, so it must stay stable.
pub const ELEMENT_COLORS: &[ElementColor] = &[
    ElementColor { key: "loop_count",        name: "scarlet red",      hex: "#ff1744" },
    ElementColor { key: "conditional_count", name: "burnt orange",     hex: "#ff6d00" },
    ElementColor { key: "recursion_count",   name: "cadmium yellow",   hex: "#ffd600" },
    ElementColor { key: "functions",         name: "acid green",       hex: "#76ff03" },
    ElementColor { key: "class_count",       name: "emerald green",    hex: "#00e676" },
    ElementColor { key: "async_count",       name: "cyan",             hex: "#00e5ff" },
    ElementColor { key: "import_count",      name: "cobalt blue",      hex: "#2979ff" },
    ElementColor { key: "try_catch_count",   name: "deep violet",      hex: "#651fff" },
    ElementColor { key: "magic_numbers",     name: "electric magenta", hex: "#d500f9" },
    ElementColor { key: "duplicate_blocks",  name: "hot pink",         hex: "#ff1867" },
    ElementColor { key: "max_nesting_depth", name: "crimson",          hex: "#d50000" },
];

/// Accent colors shuffled per call for visual variety. Their order is never
/// meaningful output.
pub const WILD_ACCENTS: &[&str] = &[
    "fluorescent chartreuse (#ccff00)",
    "neon coral (#ff6e7f)",
    "electric teal (#00ffc8)",
    "radioactive orange (#ff6100)",
    "ultraviolet (#7c00ff)",
    "shocking pink (#fc0fc0)",
    "cerulean (#007ba7)",
    "vermillion (#e34234)",
    "chrome yellow (#ffa700)",
    "phthalo green (#123524)",
    "quinacridone rose (#e8467c)",
    "mars black (#1b1b1b)",
    "titanium white (#fafafa)",
    "raw umber (#826644)",
    "cadmium orange (#ed872d)",
    "prussian blue (#003153)",
    "viridian (#40826d)",
    "alizarin crimson (#e32636)",
];

/// A color chosen for the palette with its computed weight.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorAssignment {
    pub name: &'static str,
    pub hex: &'static str,
    pub weight: u32,
}

/// Derive the weighted palette for a feature vector.
///
/// A color is included when its feature is non-zero, weighted by the clamped
/// feature value. Fewer than two active colors triggers the neutral fallback
/// set, so the palette is never shorter than two entries.
pub fn assign_colors(metrics: &CodeMetrics) -> Vec<ColorAssignment> {
    let mut active: Vec<ColorAssignment> = ELEMENT_COLORS
        .iter()
        .filter_map(|ec| {
            let value = metrics.feature(ec.key)?;
            if value > 0 {
                Some(ColorAssignment {
                    name: ec.name,
                    hex: ec.hex,
                    weight: value.min(MAX_COLOR_WEIGHT),
                })
            } else {
                None
            }
        })
        .collect();

    if active.len() < 2 {
        active.push(ColorAssignment { name: "ivory black", hex: "#1b1b1b", weight: 5 });
        active.push(ColorAssignment { name: "titanium white", hex: "#fafafa", weight: 3 });
        active.push(ColorAssignment { name: "cadmium red", hex: "#e21a1a", weight: 2 });
    }

    // Stable sort keeps table order among equal weights
    active.sort_by(|a, b| b.weight.cmp(&a.weight));
    active
}

/// Render the palette block of the prompt. The top three colors by weight are
/// dominant, the rest secondary, plus one or two shuffled wild accents.
pub fn palette_block<R: Rng + ?Sized>(metrics: &CodeMetrics, rng: &mut R) -> String {
    let active = assign_colors(metrics);

    let mut shuffled: Vec<&str> = WILD_ACCENTS.to_vec();
    shuffled.shuffle(rng);
    let num_accents = if active.len() > 5 { 2 } else { 1 };

    let primary = active
        .iter()
        .take(3)
        .map(|c| format!("{} ({}) — DOMINANT", c.name, c.hex))
        .collect::<Vec<_>>()
        .join(", ");
    let secondary = active
        .iter()
        .skip(3)
        .map(|c| format!("{} ({})", c.name, c.hex))
        .collect::<Vec<_>>()
        .join(", ");
    let accents = shuffled[..num_accents].join(", ");

    let secondary_line = if secondary.is_empty() {
        String::new()
    } else {
        format!("SECONDARY: {}.\n", secondary)
    };

    format!(
        "PRIMARY: {}.\n{}WILD ACCENT{}: {}.\n\
         Use colors at FULL SATURATION. Distribute across the entire piece — no single color should dominate more than 40% of the surface.\n\
         Colors should clash, vibrate, and create optical tension.",
        primary,
        secondary_line,
        if num_accents > 1 { "S" } else { "" },
        accents
    )
}
