//! Prompt composition: feature vector in, image-generation prompt out.

mod composer;
mod directives;
mod palette;

pub use composer::{
    compose, compose_seeded, compose_template, compose_with_rng, PromptDocument, TemplateFamily,
};
pub use directives::{chaos_score, density_directive, density_level, extremity_directive};
pub use palette::{assign_colors, ColorAssignment, ELEMENT_COLORS, WILD_ACCENTS};
