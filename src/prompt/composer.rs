//! Prompt assembly: turns a feature vector into the full image-generation
//! instruction text.
//!
//! Two interchangeable template families exist; one is picked at random per
//! call. The randomness (template choice and accent shuffle) is cosmetic
//! only, so every entry point has a seedable variant for deterministic tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::analysis::CodeMetrics;

use super::directives::{
    art_medium, density_directive, dominant_movement, extremity_directive,
    gallery_texture_overlays, mark_making, mark_scale, scanned_texture_overlays,
};
use super::palette::palette_block;

/// The two top-level prompt templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemplateFamily {
    /// Close-up photograph of a physical gallery piece.
    Gallery,
    /// Full-bleed flat scanned artwork.
    Scanned,
}

/// The assembled prompt text. No identity beyond its content; `template` is
/// `None` for caller-supplied prompts that bypassed composition.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptDocument {
    pub text: String,
    pub template: Option<TemplateFamily>,
}

impl PromptDocument {
    /// Wrap an externally supplied prompt.
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            template: None,
        }
    }
}

impl std::fmt::Display for PromptDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Compose a prompt with a random template family and accent shuffle.
pub fn compose(metrics: &CodeMetrics) -> PromptDocument {
    compose_with_rng(metrics, &mut rand::rng())
}

/// Deterministic composition from a seed. Same seed, same metrics, same text.
pub fn compose_seeded(metrics: &CodeMetrics, seed: u64) -> PromptDocument {
    compose_with_rng(metrics, &mut StdRng::seed_from_u64(seed))
}

/// Compose with an explicit RNG. The template family consumes one coin flip
/// before the palette shuffle, so the choice does not perturb accent order
/// between families.
pub fn compose_with_rng<R: Rng + ?Sized>(metrics: &CodeMetrics, rng: &mut R) -> PromptDocument {
    let template = if rng.random_bool(0.5) {
        TemplateFamily::Scanned
    } else {
        TemplateFamily::Gallery
    };
    compose_template(metrics, template, rng)
}

/// Compose a specific template family.
pub fn compose_template<R: Rng + ?Sized>(
    metrics: &CodeMetrics,
    template: TemplateFamily,
    rng: &mut R,
) -> PromptDocument {
    let text = match template {
        TemplateFamily::Gallery => gallery_prompt(metrics, rng),
        TemplateFamily::Scanned => scanned_prompt(metrics, rng),
    };
    PromptDocument {
        text,
        template: Some(template),
    }
}

fn gallery_density_line(lines_of_code: u32) -> &'static str {
    if lines_of_code > 500 {
        "Surface is COMPLETELY saturated — no breathing room, every inch is covered, the \
         piece is almost suffocating in its density"
    } else if lines_of_code > 200 {
        "Most of the surface is active, marks and materials crowd each other with small gaps"
    } else if lines_of_code > 100 {
        "Balanced density — active areas and intentional voids in conversation"
    } else if lines_of_code > 50 {
        "Sparse — more empty space than content, each element is isolated and precious"
    } else {
        "Almost nothing — 90% empty surface with tiny precise interventions"
    }
}

fn gallery_prompt<R: Rng + ?Sized>(metrics: &CodeMetrics, rng: &mut R) -> String {
    format!(
        "A close-up, frame-filling photograph of a post-modern art piece.\n\
         The artwork fills 100% of the image from edge to edge. No gallery\n\
         walls, no floor, no frame, no border, no surrounding space visible.\n\
         The image IS the artwork surface itself, shot straight-on and\n\
         cropped tightly so the art bleeds off all four edges.\n\
         \n\
         {medium}\n\
         \n\
         COLOR PALETTE:\n\
         {palette}\n\
         \n\
         {textures}\n\
         \n\
         DENSITY:\n\
         {density}\n\
         \n\
         CRITICAL REQUIREMENTS:\n\
         - The artwork covers the ENTIRE image edge to edge — no margins,\n\
         \x20 no borders, no frames, no gallery walls, no floor, no\n\
         \x20 surrounding objects of any kind\n\
         - Visible materiality — you can see thickness, texture,\n\
         \x20 weight of the materials\n\
         - The piece should look like it costs $50,000 and belongs\n\
         \x20 in MoMA or the Tate Modern\n\
         - NO recognizable faces, figures, or objects (unless the\n\
         \x20 medium directive above specifically calls for found objects,\n\
         \x20 in which case they should be abstracted and unrecognizable)\n\
         - NO text, letters, numbers, punctuation, glyphs, symbols, logos\n\
         - Square format, high resolution, shot straight-on\n\
         - Strictly abstract\n\
         \n\
         FRAMING: The artwork must fill the ENTIRE square image. No borders. No margins. \
         No background visible. Edge to edge coverage only.",
        medium = art_medium(metrics),
        palette = palette_block(metrics, rng),
        textures = gallery_texture_overlays(metrics),
        density = gallery_density_line(metrics.lines_of_code),
    )
}

fn scanned_prompt<R: Rng + ?Sized>(metrics: &CodeMetrics, rng: &mut R) -> String {
    let movement = dominant_movement(metrics);

    format!(
        "Full-bleed abstract artwork filling the entire square image edge to edge. \
         No borders, no frames, no empty space.\n\
         \n\
         DOMINANT MOVEMENT: {style}\n\
         {movement_desc}\n\
         Artist references: {artists}\n\
         \n\
         COLOR PALETTE (USE THESE EXACT COLORS AT FULL SATURATION):\n\
         {palette}\n\
         \n\
         {density}\n\
         \n\
         {extremity}\n\
         \n\
         TEXTURE AND SURFACE OVERLAYS:\n\
         {textures}\n\
         \n\
         SCALE OF MARKS:\n\
         {scale}\n\
         \n\
         COMPOSITION:\n\
         All-over composition filling the ENTIRE canvas edge to edge.\n\
         The artwork bleeds off all four edges — no margins, no borders,\n\
         no frames, no surrounding objects, no empty space around the piece.\n\
         The image IS the artwork surface, nothing else.\n\
         No centered focal point.\n\
         No fading to edges.\n\
         Background is ACTIVE, not passive.\n\
         \n\
         MARK-MAKING:\n\
         {marks}\n\
         \n\
         SURFACE:\n\
         Matte paper grain, scan noise.\n\
         No glossy render. No 3D shading. No clean vector look.\n\
         \n\
         CRITICAL — AVOID THESE DEFAULTS:\n\
         - NO beige/cream default background\n\
         - NO centered symmetrical composition\n\
         - NO soft watercolor washes\n\
         - NO gradient fades\n\
         - NO decorative borders, frames, margins, or empty edges\n\
         - NO surrounding objects, gallery walls, floors, or context\n\
         - NO digital/clean/vector aesthetic\n\
         - The artwork fills 100% of the image from edge to edge\n\
         - The piece should look like a PHYSICAL artwork, not digital art\n\
         \n\
         HARD CONSTRAINTS:\n\
         No text, letters, numbers, punctuation, glyphs, symbols, logos.\n\
         No recognizable objects, faces, figures.\n\
         Strictly abstract.\n\
         \n\
         FRAMING: The artwork must fill the ENTIRE square image. No borders. No margins. \
         No background visible. Edge to edge coverage only.",
        style = movement.style,
        movement_desc = movement.desc,
        artists = movement.artists,
        palette = palette_block(metrics, rng),
        density = density_directive(metrics.lines_of_code),
        extremity = extremity_directive(metrics),
        textures = scanned_texture_overlays(metrics),
        scale = mark_scale(metrics),
        marks = mark_making(metrics),
    )
}
