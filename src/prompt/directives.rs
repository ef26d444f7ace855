//! Directive tables: density, extremity, medium, movement, textures.
//!
//! Medium and movement are priority-ordered decision tables evaluated first
//! match wins; texture overlays are independent threshold checks that all
//! concatenate. Keeping the rules as data keeps them testable row by row.

use crate::analysis::CodeMetrics;

/// Weighted chaos score shared by the extremity and mark-making rules.
pub fn chaos_score(m: &CodeMetrics) -> u32 {
    m.cyclomatic_complexity + m.max_nesting_depth * 3 + m.loop_count
}

/// Monotonic step function from line count to a coverage directive. Severity
/// never decreases as the line count grows.
pub fn density_directive(lines_of_code: u32) -> &'static str {
    if lines_of_code > 500 {
        return "MAXIMUM SATURATION: There should be ZERO visible background. \
                Every single pixel is covered with marks, dots, strokes, or texture. \
                The surface is so packed it becomes almost illegible — a wall of visual \
                information that overwhelms the viewer. Layer marks ON TOP of other marks. \
                Nothing is clean. The canvas is groaning under the weight.";
    }
    if lines_of_code > 200 {
        return "HIGH DENSITY: 80-90% of the canvas is covered. Marks crowd each other, \
                overlap, compete for space. Small pockets of background peek through but \
                they feel accidental, like gaps in a crowd. The composition is aggressive \
                and demanding.";
    }
    if lines_of_code > 100 {
        return "MODERATE DENSITY: 50-60% coverage. Clear rhythm between active zones and \
                breathing room. The composition has structure — dense clusters separated \
                by intentional voids.";
    }
    if lines_of_code > 50 {
        return "SPARSE: Only 20-30% of the canvas has marks. The empty space IS the \
                composition. Each mark exists in isolation, surrounded by vast negative \
                space. The viewer's eye has to travel across emptiness to reach the next \
                element.";
    }
    "ULTRA-MINIMAL: 5-10% coverage maximum. Almost nothing on the canvas. Maybe 3-5 marks \
     total on the entire surface. The piece is 90% blank paper/canvas with a tiny cluster \
     of precise marks. The emptiness should feel intentional and powerful, not lazy. \
     Think Agnes Martin at her most restrained — barely there."
}

/// Numeric severity of the density step, for monotonicity checks.
pub fn density_level(lines_of_code: u32) -> u8 {
    if lines_of_code > 500 {
        4
    } else if lines_of_code > 200 {
        3
    } else if lines_of_code > 100 {
        2
    } else if lines_of_code > 50 {
        1
    } else {
        0
    }
}

/// Intensity directive from the weighted chaos score.
pub fn extremity_directive(m: &CodeMetrics) -> &'static str {
    let chaos = chaos_score(m);
    if chaos > 40 {
        return "VISUAL EXTREMITY: MAXIMUM. This piece should be visually VIOLENT. Marks \
                collide and destroy each other. Colors scream against each other at full \
                saturation. Stripes and dots at war. The surface looks like it was attacked. \
                Splatter, scratch, gouge, tear. Multiple conflicting systems overlaid until \
                chaos emerges. The viewer should feel uncomfortable and overwhelmed. Think \
                Cy Twombly at his most frantic crossed with Julie Mehretu at her most dense.";
    }
    if chaos > 25 {
        return "VISUAL EXTREMITY: HIGH. Strong contrasts, bold marks, visible tension \
                between order and disorder. Some systems are intact, others are breaking \
                down. Colors are saturated and confrontational. The composition demands \
                attention aggressively.";
    }
    if chaos > 12 {
        return "VISUAL EXTREMITY: MODERATE. Confident mark-making with controlled energy. \
                Colors are clear and purposeful. Systems are visible and mostly intact. \
                There is tension but it is productive, not destructive.";
    }
    if chaos > 5 {
        return "VISUAL EXTREMITY: LOW. Quiet, measured, contemplative. Colors are muted or \
                used sparingly. Marks are gentle and precise. The piece invites slow \
                viewing. Nothing shouts.";
    }
    "VISUAL EXTREMITY: NEAR ZERO. Almost silent. The faintest possible marks on the \
     surface. Colors so muted they barely register. The piece exists at the threshold of \
     visibility. The viewer has to lean in and squint. Think Vija Celmins pencil oceans \
     or Robert Ryman white paintings."
}

struct MediumRule {
    applies: fn(&CodeMetrics) -> bool,
    directive: &'static str,
}

/// Physical-medium decision table for the gallery template. First matching
/// rule wins; the last row is the unconditional default.
const MEDIUM_RULES: &[MediumRule] = &[
    MediumRule {
        applies: |m| m.recursion_count > 3,
        directive: "MEDIUM: Layered cut paper collage with visible depth. Thick cardboard \
                    and foam shapes stacked 3-5 layers deep, casting real shadows. Each layer \
                    is a different scale of the same recursive form. Shot from above so you \
                    see the dimensional stacking. Colors are bold construction paper: \
                    saturated, flat, unapologetic. Think Elizabeth Murray shaped canvases or \
                    Keith Haring foam reliefs. The piece should look PHYSICAL — you can see \
                    the cut edges, the thickness of the material, the shadows between layers.",
    },
    MediumRule {
        applies: |m| m.loop_count > 8,
        directive: "MEDIUM: Obsessive hand-stitched textile or woven piece. Thousands of \
                    identical small elements (beads, knots, loops of thread, tiny fabric \
                    squares) arranged in a dense grid that warps and distorts. The repetition \
                    is manic and handmade — slightly irregular, human, obsessive. Think \
                    Sheila Hicks fiber art or El Anatsui bottle cap tapestries. The surface \
                    should feel TACTILE — you want to touch it. Shot close-up with dramatic \
                    side lighting that catches the texture, filling the entire frame.",
    },
    MediumRule {
        applies: |m| m.conditional_count > 10,
        directive: "MEDIUM: Architectural drawing on translucent vellum. Precise ink lines \
                    on semi-transparent paper, layered over ghostly background imagery. Thin \
                    blue, red, and graphite lines creating branching network diagrams. Small \
                    red and yellow dots at intersection nodes. Multiple sheets of tracing \
                    paper layered creating depth through transparency. Think Julie Mehretu \
                    architectural abstractions or Mark Lombardi conspiracy network drawings. \
                    Should feel like classified documents or urban planning maps from a \
                    fictional city.",
    },
    MediumRule {
        applies: |m| m.class_count > 3,
        directive: "MEDIUM: Welded steel and found metal assemblage. Heavy industrial metal \
                    pieces — I-beams, steel plates, rusted gears, pipe fittings — welded \
                    together into a wall-mounted sculpture. Each module is a distinct \
                    structural component bolted to the others. The whole piece has \
                    architectural integrity despite looking brutal. Think Anthony Caro or \
                    John Chamberlain crushed car sculptures. Shot close-up filling the \
                    entire frame, dramatic lighting casting shadows.",
    },
    MediumRule {
        applies: |m| m.async_count > 5,
        directive: "MEDIUM: Hanging installation of disparate objects suspended from ceiling \
                    by thin wires at different heights. Random clustered objects: colored \
                    resin blobs, crumpled fabric, foam spheres, tangled wire, small found \
                    objects — each one different, all floating in space with no visible \
                    connection between them. Some cluster together, others drift alone. \
                    Think Sarah Sze installations or Mike Kelley hanging pieces. Shot \
                    close-up so the objects fill the entire frame edge to edge, no gallery \
                    walls or floor visible.",
    },
    MediumRule {
        applies: |m| m.cyclomatic_complexity < 5 && m.functions < 5,
        directive: "MEDIUM: Large-scale color field painting. 2-3 massive soft-edged \
                    rectangles of luminous color floating on the canvas. Edges bleed and \
                    breathe — not hard lines but halos where one color dissolves into \
                    another. The paint is thin and translucent in places, thick and opaque \
                    in others. Think Mark Rothko or Helen Frankenthaler stain paintings. The \
                    simplicity should feel POWERFUL not empty. Photographed straight-on, \
                    filling the frame, no gallery context visible.",
    },
    MediumRule {
        applies: |m| m.import_count > 15,
        directive: "MEDIUM: Massive pin-and-string conspiracy board. A white surface covered \
                    in photographs, documents, sticky notes, and printed diagrams all \
                    connected by colored string, push pins, and tape. Red string for critical \
                    connections, blue for secondary, yellow for tentative. Some areas are \
                    dense tangled knots of string, others have single clean connections. \
                    Handwritten annotations in marker (but NOT readable as real text — \
                    abstract scribbles only). Think detective investigation board as \
                    abstract art.",
    },
    MediumRule {
        applies: |m| m.lines_of_code > 300 && m.functions < 4,
        directive: "MEDIUM: Draped industrial material — black trash bags, plastic sheeting, \
                    tarpaulin stretched and pinned to a wall like a canvas. Glimpses of vivid \
                    color (red, electric blue) peek through tears and folds in the dark \
                    material. The surface is wrinkled, folded, draped — aggressively physical \
                    and confrontational. Think David Hammons or Oscar Murillo. Shot close-up \
                    filling the entire frame, harsh overhead lighting creating reflections on \
                    the plastic surface.",
    },
    MediumRule {
        applies: |_| true,
        directive: "MEDIUM: Mixed-media collage combining at least 4 different materials \
                    visible in the same piece: torn paper, paint strokes, fabric scraps, \
                    printed imagery fragments, tape, staples, string. Nothing matches. \
                    Materials collide and overlap without hierarchy. Some areas are thick \
                    with layered material, others are bare canvas showing through. Think \
                    Robert Rauschenberg combines or Kurt Schwitters Merzbau. The piece \
                    should look like it was assembled from whatever was lying around the \
                    studio, but the composition is secretly masterful.",
    },
];

/// Pick the physical medium directive for the gallery template.
pub fn art_medium(m: &CodeMetrics) -> &'static str {
    MEDIUM_RULES
        .iter()
        .find(|rule| (rule.applies)(m))
        .map(|rule| rule.directive)
        .unwrap_or(MEDIUM_RULES[MEDIUM_RULES.len() - 1].directive)
}

/// An artistic movement with flavor text, for the scanned template.
pub struct Movement {
    pub style: &'static str,
    pub desc: &'static str,
    pub artists: &'static str,
}

struct MovementRule {
    applies: fn(&CodeMetrics) -> bool,
    movement: Movement,
}

const MOVEMENT_RULES: &[MovementRule] = &[
    MovementRule {
        applies: |m| m.recursion_count > 3,
        movement: Movement {
            style: "FRACTAL SELF-SIMILARITY",
            desc: "Self-similar nested structures at multiple scales, like Sierpinski \
                   triangles or Mandelbrot edges. Shapes contain smaller versions of \
                   themselves. Recursive depth visible as layers within layers within layers.",
            artists: "M.C. Escher, Bridget Riley nested forms",
        },
    },
    MovementRule {
        applies: |m| m.loop_count > 8,
        movement: Movement {
            style: "OP-ART REPETITION",
            desc: "Obsessive repetitive tiling patterns — dense grids of dots or lines that \
                   create optical vibration and moiré effects. The repetition is relentless \
                   and hypnotic, like Yayoi Kusama infinity nets or Bridget Riley stripe \
                   paintings.",
            artists: "Bridget Riley, Yayoi Kusama, Victor Vasarely",
        },
    },
    MovementRule {
        applies: |m| m.conditional_count > 10,
        movement: Movement {
            style: "BRANCHING PATHWAYS",
            desc: "Compositions built from forking paths — lines that split into two, then \
                   split again. Tree-like or root-like structures spreading across the \
                   canvas. Decision points visible as nodes where paths diverge.",
            artists: "Julie Mehretu architectural drawings, Piet Mondrian tree studies",
        },
    },
    MovementRule {
        applies: |m| m.class_count > 3,
        movement: Movement {
            style: "CUBIST FRAGMENTATION",
            desc: "Multiple simultaneous viewpoints of the same subject fragmented and \
                   reassembled. Overlapping planes, angular shards, the same form shown \
                   from different angles simultaneously. Dense, intellectual, analytical.",
            artists: "Pablo Picasso analytical cubism, Georges Braque",
        },
    },
    MovementRule {
        applies: |m| m.async_count > 5,
        movement: Movement {
            style: "SCATTERED CONSTELLATION",
            desc: "Disconnected elements floating in space with invisible connections \
                   between them. Dotted lines, dashed paths, elements that almost touch but \
                   dont. Tension between isolation and relationship. Things happening in \
                   parallel.",
            artists: "Wassily Kandinsky Composition VIII, Joan Miró constellations",
        },
    },
    MovementRule {
        applies: |m| m.cyclomatic_complexity < 5 && m.functions < 5,
        movement: Movement {
            style: "HARD-EDGE MINIMALISM",
            desc: "Clean, confident, deliberate. Large flat color planes with precise edges \
                   meeting. Very few elements but each one is intentional and powerful. \
                   Generous negative space. Quiet authority.",
            artists: "Ellsworth Kelly, Agnes Martin grids, Frank Stella",
        },
    },
    MovementRule {
        applies: |m| m.import_count > 15,
        movement: Movement {
            style: "NETWORK TOPOLOGY",
            desc: "Dense web of interconnected nodes and lines — a complex network graph \
                   rendered as art. Clusters of activity connected by thin threads. Some \
                   nodes are massive hubs, others are tiny endpoints.",
            artists: "Mark Lombardi network drawings, Tomás Saraceno web installations",
        },
    },
    MovementRule {
        applies: |m| m.lines_of_code > 300 && m.functions < 4,
        movement: Movement {
            style: "ABSTRACT EXPRESSIONIST GESTURE",
            desc: "Massive sweeping gestures dominating the canvas. Few moves but each one \
                   is enormous and bold. Drips, splatters, aggressive marks that cover huge \
                   areas. Raw energy over precision.",
            artists: "Franz Kline, Robert Motherwell, Pierre Soulages",
        },
    },
    MovementRule {
        applies: |_| true,
        movement: Movement {
            style: "POST-MODERN COLLAGE",
            desc: "Multiple art styles colliding in a single composition. Geometric \
                   precision next to organic chaos. Clean lines interrupted by messy \
                   textures. Historical references layered over contemporary marks.",
            artists: "Robert Rauschenberg, Ibrahim El-Salahi, Jasper Johns",
        },
    },
];

/// Pick the dominant movement for the scanned template.
pub fn dominant_movement(m: &CodeMetrics) -> &'static Movement {
    MOVEMENT_RULES
        .iter()
        .find(|rule| (rule.applies)(m))
        .map(|rule| &rule.movement)
        .unwrap_or(&MOVEMENT_RULES[MOVEMENT_RULES.len() - 1].movement)
}

/// Texture overlays for the gallery template: all matching rules concatenate.
pub fn gallery_texture_overlays(m: &CodeMetrics) -> String {
    let mut overlays: Vec<String> = Vec::new();

    if m.cyclomatic_complexity > 15 {
        overlays.push(
            "TEXTURE: Visible crack lines and stress fractures across the surface, as if \
             the piece is physically breaking apart under its own complexity."
                .to_string(),
        );
    }
    if m.max_nesting_depth > 5 {
        overlays.push(
            "TEXTURE: Areas where material is compressed, folded, or crushed — physically \
             showing the pressure of deep nesting."
                .to_string(),
        );
    }
    if m.try_catch_count > 3 {
        overlays.push(
            "TEXTURE: Gold metallic repair lines visible where the piece was broken and \
             mended. Kintsugi philosophy — the repairs are celebrated not hidden."
                .to_string(),
        );
    }
    if m.unused_code_lines > 20 {
        overlays.push(
            "TEXTURE: Ghostly areas where material has been sanded away, erased, painted \
             over — but the original still bleeds through faintly like a palimpsest."
                .to_string(),
        );
    }
    if m.duplicate_blocks > 2 {
        overlays.push(format!(
            "TEXTURE: {} regions that are near-identical copies of each other — same \
             forms, same materials, uncanny repetition.",
            m.duplicate_blocks
        ));
    }
    if m.magic_numbers > 5 {
        overlays.push(
            "TEXTURE: Small random objects or shapes that dont belong to any system — \
             arbitrarily placed, unexplained, alien to the rest of the composition."
                .to_string(),
        );
    }
    if m.comment_ratio > 0.3 {
        overlays.push(
            "TEXTURE: Handwritten-looking scribble marks hovering near elements, like \
             annotations or marginalia. NOT readable as text — abstract gestural \
             scribbles only."
                .to_string(),
        );
    }

    if overlays.is_empty() {
        "Surface is clean and assured. No distress.".to_string()
    } else {
        overlays.join("\n")
    }
}

/// Texture overlays for the scanned template.
pub fn scanned_texture_overlays(m: &CodeMetrics) -> String {
    let mut textures: Vec<String> = Vec::new();

    if m.cyclomatic_complexity > 15 {
        textures.push(
            "Dense pointillist dot fields filling at least 40% of the canvas — dots \
             compressed so tightly they almost merge, creating optical vibration and \
             visual anxiety. Reference: Seurat but aggressive."
                .to_string(),
        );
    }
    if m.max_nesting_depth > 5 {
        textures.push(format!(
            "Overlapping stripe panels at {} different angles creating moiré interference \
             where they cross. Each nesting level adds another stripe direction. The deeper \
             the nesting, the more chaotic the interference. Reference: Jesus Rafael Soto \
             kinetic stripe works.",
            m.max_nesting_depth
        ));
    }
    if m.try_catch_count > 3 {
        textures.push(
            "Visible crack lines running through the composition — thin fractures filled \
             with gold or warm metallic tone. The piece looks like it was broken and \
             repaired. Reference: Japanese kintsugi pottery repair philosophy."
                .to_string(),
        );
    }
    if m.unused_code_lines > 20 {
        textures.push(
            "Ghostly faded regions where forms almost disappear — sanded-back zones, \
             erased-and-redrawn areas, palimpsest layers where old marks show through new \
             ones. Some areas look like they were painted over but the original bleeds \
             through."
                .to_string(),
        );
    }
    if m.comment_ratio > 0.3 {
        textures.push(
            "Soft luminous halos or aureoles around certain elements — warm glowing edges \
             that suggest annotation or illumination. Like marginalia in a medieval \
             manuscript rendered as light."
                .to_string(),
        );
    }
    if m.duplicate_blocks > 2 {
        textures.push(format!(
            "{} distinct regions of the composition that are near-identical echoes of \
             each other — same forms, same marks, slightly shifted or rotated. The \
             repetition should feel uncanny, like seeing double.",
            m.duplicate_blocks
        ));
    }
    if m.magic_numbers > 5 {
        textures.push(
            "Small geometric shapes (circles, squares, triangles) floating disconnected \
             from the main composition — unanchored, unexplained, arbitrary. They dont \
             belong to any system."
                .to_string(),
        );
    }

    if textures.is_empty() {
        "Clean, confident mark-making with no distress or interference. The surface is \
         assured and unblemished."
            .to_string()
    } else {
        textures.join("\n\n")
    }
}

/// Mark scale from the average function length.
pub fn mark_scale(m: &CodeMetrics) -> &'static str {
    let avg_function_length = m.lines_of_code as f64 / m.functions.max(1) as f64;
    if avg_function_length > 80.0 {
        "LARGE SCALE MARKS: Big, bold, sweeping gestures. Each mark covers significant \
         canvas area. Few but massive elements."
    } else if avg_function_length > 30.0 {
        "MIXED SCALE: A range from large commanding forms to small detailed textures. \
         Hierarchy is clear — major and minor elements."
    } else {
        "SMALL SCALE MARKS: Fine, intricate, detailed mark-making. Many tiny elements \
         building up to a larger whole. Requires close viewing to appreciate."
    }
}

/// Mark-making energy from the chaos score.
pub fn mark_making(m: &CodeMetrics) -> &'static str {
    let chaos = chaos_score(m);
    if chaos > 25 {
        "Aggressive: slashing strokes, violent scratches, splattered ink, torn edges, \
         marks that feel ANGRY and URGENT"
    } else if chaos > 12 {
        "Confident: deliberate strokes, varied pressure, mix of precise and gestural, \
         energetic but controlled"
    } else {
        "Delicate: hairline marks, whispered touches, barely-there traces, the lightest \
         possible pressure"
    }
}
