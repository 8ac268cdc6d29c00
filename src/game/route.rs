//! Static campaign route: the celestial bodies and the legs between them.
//!
//! The route is a fixed linear chain: every leg starts where the previous
//! one ended. Bodies carry the times tables drilled on the way there.

use serde::Serialize;

/// Waypoints (playable rounds) on every leg.
pub const WAYPOINTS_PER_LEG: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyKind {
    Planet,
    Moon,
    Asteroid,
    Dwarf,
    Kuiper,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CelestialBody {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: BodyKind,
    pub emoji: &'static str,
    /// CSS color used by the map and fact card.
    pub color: &'static str,
    pub focus_tables: &'static [u32],
    pub fact: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Chapter {
    Inner,
    Giants,
    Outer,
    Kuiper,
}

impl Chapter {
    pub fn name(self) -> &'static str {
        match self {
            Chapter::Inner => "Inner System",
            Chapter::Giants => "Gas Giants",
            Chapter::Outer => "Ice Giants",
            Chapter::Kuiper => "Kuiper Belt",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub id: &'static str,
    pub from_body_id: &'static str,
    pub to_body_id: &'static str,
    pub waypoints_required: u8,
    pub chapter: Chapter,
}

const fn def_body(
    id: &'static str,
    name: &'static str,
    kind: BodyKind,
    emoji: &'static str,
    color: &'static str,
    focus_tables: &'static [u32],
    fact: &'static str,
) -> CelestialBody {
    CelestialBody {
        id,
        name,
        kind,
        emoji,
        color,
        focus_tables,
        fact,
    }
}

const fn def_leg(id: &'static str, from: &'static str, to: &'static str, chapter: Chapter) -> Leg {
    Leg {
        id,
        from_body_id: from,
        to_body_id: to,
        waypoints_required: WAYPOINTS_PER_LEG,
        chapter,
    }
}

pub static BODIES: [CelestialBody; 15] = [
    def_body(
        "earth",
        "Earth",
        BodyKind::Planet,
        "\u{1F30D}",
        "hsl(195 100% 50%)",
        &[1, 2, 3],
        "Earth is the only planet known to support life, with 71% of its surface covered by water.",
    ),
    def_body(
        "moon",
        "Moon",
        BodyKind::Moon,
        "\u{1F319}",
        "hsl(0 0% 75%)",
        &[2, 3, 4],
        "The Moon is Earth's only natural satellite. It takes 27.3 days to orbit Earth.",
    ),
    def_body(
        "mars",
        "Mars",
        BodyKind::Planet,
        "\u{1F534}",
        "hsl(0 70% 50%)",
        &[3, 4, 5],
        "Mars is called the Red Planet due to iron oxide (rust) on its surface. A day on Mars is 24.6 hours!",
    ),
    def_body(
        "ceres",
        "Ceres",
        BodyKind::Asteroid,
        "\u{2604}\u{FE0F}",
        "hsl(30 50% 50%)",
        &[4, 5, 6],
        "Ceres is the largest object in the asteroid belt, containing about one-third of the belt's total mass.",
    ),
    def_body(
        "jupiter",
        "Jupiter",
        BodyKind::Planet,
        "\u{1FA90}",
        "hsl(30 70% 60%)",
        &[5, 6, 7],
        "Jupiter is the largest planet in our solar system, with 95 known moons. Its Great Red Spot is a storm larger than Earth!",
    ),
    def_body(
        "europa",
        "Europa",
        BodyKind::Moon,
        "\u{1F9CA}",
        "hsl(195 80% 80%)",
        &[6, 7, 8],
        "Europa is covered in ice and may have a vast ocean beneath its frozen surface, making it a prime candidate for alien life!",
    ),
    def_body(
        "saturn",
        "Saturn",
        BodyKind::Planet,
        "\u{1F48D}",
        "hsl(45 60% 70%)",
        &[7, 8, 9],
        "Saturn's rings are made of billions of ice and rock particles, some as small as dust, others as large as mountains.",
    ),
    def_body(
        "titan",
        "Titan",
        BodyKind::Moon,
        "\u{1F7E0}",
        "hsl(30 80% 50%)",
        &[7, 8, 9],
        "Titan is Saturn's largest moon and has lakes and rivers, but filled with liquid methane, not water!",
    ),
    def_body(
        "uranus",
        "Uranus",
        BodyKind::Planet,
        "\u{1F48E}",
        "hsl(180 60% 60%)",
        &[8, 9, 10],
        "Uranus rotates on its side at a 98\u{B0} tilt, likely due to a massive collision billions of years ago.",
    ),
    def_body(
        "neptune",
        "Neptune",
        BodyKind::Planet,
        "\u{1F535}",
        "hsl(220 80% 50%)",
        &[9, 10, 11],
        "Neptune has the fastest winds in the solar system, reaching speeds of over 1,200 mph (2,000 km/h)!",
    ),
    def_body(
        "pluto",
        "Pluto",
        BodyKind::Dwarf,
        "\u{2744}\u{FE0F}",
        "hsl(200 40% 70%)",
        &[10, 11, 12],
        "Pluto was reclassified as a dwarf planet in 2006. It has a heart-shaped glacier called Tombaugh Regio!",
    ),
    def_body(
        "haumea",
        "Haumea",
        BodyKind::Dwarf,
        "\u{1F95A}",
        "hsl(0 0% 85%)",
        &[4, 8, 12],
        "Haumea is egg-shaped due to its incredibly fast rotation. A day on Haumea is only 4 hours long!",
    ),
    def_body(
        "makemake",
        "Makemake",
        BodyKind::Dwarf,
        "\u{1F534}",
        "hsl(15 60% 55%)",
        &[3, 6, 9, 12],
        "Makemake is one of the brightest objects in the Kuiper Belt and is named after the Rapa Nui god of fertility.",
    ),
    def_body(
        "eris",
        "Eris",
        BodyKind::Dwarf,
        "\u{26AA}",
        "hsl(0 0% 95%)",
        &[2, 4, 6, 8, 10, 12],
        "Eris is slightly smaller than Pluto but more massive. Its discovery led to Pluto being reclassified!",
    ),
    def_body(
        "arrokoth",
        "Arrokoth",
        BodyKind::Kuiper,
        "\u{1F954}",
        "hsl(30 30% 50%)",
        &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12],
        "Arrokoth is the most distant object ever explored by a spacecraft. It looks like a snowman made of ancient space rock!",
    ),
];

pub static LEGS: [Leg; 14] = [
    def_leg("leg-1", "earth", "moon", Chapter::Inner),
    def_leg("leg-2", "moon", "mars", Chapter::Inner),
    def_leg("leg-3", "mars", "ceres", Chapter::Inner),
    def_leg("leg-4", "ceres", "jupiter", Chapter::Giants),
    def_leg("leg-5", "jupiter", "europa", Chapter::Giants),
    def_leg("leg-6", "europa", "saturn", Chapter::Giants),
    def_leg("leg-7", "saturn", "titan", Chapter::Giants),
    def_leg("leg-8", "titan", "uranus", Chapter::Outer),
    def_leg("leg-9", "uranus", "neptune", Chapter::Outer),
    def_leg("leg-10", "neptune", "pluto", Chapter::Kuiper),
    def_leg("leg-11", "pluto", "haumea", Chapter::Kuiper),
    def_leg("leg-12", "haumea", "makemake", Chapter::Kuiper),
    def_leg("leg-13", "makemake", "eris", Chapter::Kuiper),
    def_leg("leg-14", "eris", "arrokoth", Chapter::Kuiper),
];

/// The leg every new campaign starts on.
pub const FIRST_LEG_ID: &str = "leg-1";

pub fn body(id: &str) -> Option<&'static CelestialBody> {
    BODIES.iter().find(|b| b.id == id)
}

pub fn leg(id: &str) -> Option<&'static Leg> {
    LEGS.iter().find(|l| l.id == id)
}

pub fn leg_index(id: &str) -> Option<usize> {
    LEGS.iter().position(|l| l.id == id)
}

/// The leg after `id`, or `None` for an unknown id or the final leg.
pub fn next_leg_id(id: &str) -> Option<&'static str> {
    let idx = leg_index(id)?;
    LEGS.get(idx + 1).map(|l| l.id)
}

pub fn total_waypoints() -> usize {
    LEGS.len() * WAYPOINTS_PER_LEG as usize
}
