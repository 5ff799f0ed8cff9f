/// Unified physics layer: the single source of truth for "where is the ground".
///
/// ## Architecture
///
/// Three questions, answered here and nowhere else:
///   1. SURFACE:  how high is a girder's walking surface at x?
///   2. SUPPORT:  which girder (if any) is a body standing on?
///   3. LADDER:   which ladder (if any) can the player grab?
///
/// The player, barrels, ladder dismounts and spawn placement all go through
/// `surface_height_at`; a second interpolation anywhere else would let the
/// entities disagree about the terrain.
///
/// ## Support Rule
///
/// A body is SUPPORTED by a girder if ALL of:
///   - its horizontal extent overlaps the girder's span
///   - it is not moving upward faster than the band's `upward_limit`
///   - its bottom edge is at or below the surface height (at the body's
///     center x), by no more than `max(floor, |vy| + velocity_margin)`
///
/// The velocity term widens the band at speed so a fast fall cannot step
/// over a girder in one tick; `floor` keeps slow bodies from missing it.
/// First girder in authoring order wins.

use super::geometry::Rect;
use super::terrain::{Girder, GirderId, Ladder, Terrain};

// ══════════════════════════════════════════════════════════════
// Layer 1: Surface
// ══════════════════════════════════════════════════════════════

/// Surface height of `girder` at `x`.
///
/// `x` is clamped into the span, so this is total: positions left of the
/// span read `y_start`, positions right of it read `y_end`. A zero-width
/// (or inverted) span reads `y_start`. Endpoints are exact.
#[inline]
pub fn surface_height_at(girder: &Girder, x: f32) -> f32 {
    let width = girder.right - girder.left;
    if !(width > 0.0) {
        return girder.y_start;
    }
    // max/min (not clamp) so a NaN x lands on an edge instead of propagating
    let clamped = x.max(girder.left).min(girder.right);
    let t = (clamped - girder.left) / width;
    if t <= 0.0 {
        girder.y_start
    } else if t >= 1.0 {
        girder.y_end
    } else {
        girder.y_start + (girder.y_end - girder.y_start) * t
    }
}

// ══════════════════════════════════════════════════════════════
// Layer 2: Support
// ══════════════════════════════════════════════════════════════

/// Landing tolerance parameters for one kind of body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupportBand {
    /// Minimum depth below the surface still counted as "on" it.
    pub floor: f32,
    /// Added to |vy| to get the speed-scaled depth.
    pub velocity_margin: f32,
    /// Bodies with vy below this (moving up) never land.
    pub upward_limit: f32,
}

impl SupportBand {
    #[inline]
    pub fn depth(&self, vy: f32) -> f32 {
        self.floor.max(vy.abs() + self.velocity_margin)
    }
}

/// Surface height if `girder` supports `body` moving at `vy`, else `None`.
pub fn supported_by(body: &Rect, girder: &Girder, vy: f32, band: &SupportBand) -> Option<f32> {
    if !body.overlaps_span(girder.left, girder.right) {
        return None;
    }
    if vy < band.upward_limit {
        return None;
    }
    let surface = surface_height_at(girder, body.center_x());
    let bottom = body.bottom();
    if bottom >= surface && bottom <= surface + band.depth(vy) {
        Some(surface)
    } else {
        None
    }
}

/// First girder (authoring order) that supports `body`, with its surface height.
///
/// `skip` excludes one girder from the search (a barrel that just rolled
/// off an edge must not be caught by the same girder's lip).
pub fn find_support(
    body: &Rect,
    terrain: &Terrain,
    vy: f32,
    band: &SupportBand,
    skip: Option<GirderId>,
) -> Option<(GirderId, f32)> {
    terrain
        .iter()
        .filter(|(id, _)| Some(*id) != skip)
        .find_map(|(id, g)| supported_by(body, g, vy, band).map(|y| (id, y)))
}

// ══════════════════════════════════════════════════════════════
// Layer 3: Ladder contact
// ══════════════════════════════════════════════════════════════

/// First ladder the body is "on": rects overlap AND the body's center is
/// within `grab_factor × ladder width` of the ladder's center line.
pub fn ladder_contact<'a>(body: &Rect, ladders: &'a [Ladder], grab_factor: f32) -> Option<&'a Ladder> {
    ladders.iter().find(|l| {
        body.intersects(&l.rect()) && (body.center_x() - l.center_x).abs() < l.width * grab_factor
    })
}

/// First ladder whose top is under the body's feet (within `reach`),
/// with the same centering rule as `ladder_contact`. A body standing on a
/// ladder's top only touches it, so this is how a descent begins.
pub fn ladder_below<'a>(body: &Rect, ladders: &'a [Ladder], grab_factor: f32, reach: f32) -> Option<&'a Ladder> {
    ladders.iter().find(|l| {
        (body.bottom() - l.top).abs() <= reach && (body.center_x() - l.center_x).abs() < l.width * grab_factor
    })
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER_BAND: SupportBand = SupportBand { floor: 7.5, velocity_margin: 2.0, upward_limit: -0.1 };
    const BARREL_BAND: SupportBand = SupportBand { floor: 15.0, velocity_margin: 2.0, upward_limit: 0.0 };

    fn body_at(cx: f32, bottom: f32) -> Rect {
        Rect::from_midbottom(cx, bottom, 28.0, 28.0)
    }

    // ── surface_height_at ──

    #[test]
    fn slope_midpoint() {
        let g = Girder::new("s", 50.0, 400.0, 500.0, 540.0);
        assert_eq!(surface_height_at(&g, 250.0), 520.0);
    }

    #[test]
    fn slope_endpoints_exact() {
        let g = Girder::new("s", 50.0, 500.0, 585.0, 620.0);
        assert_eq!(surface_height_at(&g, 50.0), 585.0);
        assert_eq!(surface_height_at(&g, 550.0), 620.0);
    }

    #[test]
    fn outside_span_is_clamped() {
        let g = Girder::new("s", 50.0, 500.0, 585.0, 620.0);
        assert_eq!(surface_height_at(&g, -1000.0), 585.0);
        assert_eq!(surface_height_at(&g, 9999.0), 620.0);
    }

    #[test]
    fn zero_width_reads_start() {
        let g = Girder::new("z", 100.0, 0.0, 300.0, 400.0);
        assert_eq!(surface_height_at(&g, 100.0), 300.0);
        assert_eq!(surface_height_at(&g, 50.0), 300.0);
        let inverted = Girder { right: 90.0, ..g };
        assert_eq!(surface_height_at(&inverted, 95.0), 300.0);
    }

    #[test]
    fn nan_x_is_total() {
        let g = Girder::new("s", 0.0, 100.0, 10.0, 20.0);
        assert!(surface_height_at(&g, f32::NAN).is_finite());
    }

    // ── supported_by ──

    #[test]
    fn resting_body_is_supported() {
        let g = Girder::flat("G0", 0.0, 600.0, 740.0);
        assert_eq!(supported_by(&body_at(60.0, 740.0), &g, 0.0, &PLAYER_BAND), Some(740.0));
    }

    #[test]
    fn body_above_surface_is_not_supported() {
        let g = Girder::flat("G0", 0.0, 600.0, 740.0);
        assert_eq!(supported_by(&body_at(60.0, 739.0), &g, 0.7, &PLAYER_BAND), None);
    }

    #[test]
    fn band_floor_and_velocity_scaling() {
        let g = Girder::flat("G0", 0.0, 600.0, 740.0);
        // 7 below the surface at rest: inside the 7.5 floor
        assert!(supported_by(&body_at(60.0, 747.0), &g, 0.0, &PLAYER_BAND).is_some());
        // 9 below at rest: outside
        assert!(supported_by(&body_at(60.0, 749.0), &g, 0.0, &PLAYER_BAND).is_none());
        // 9 below while falling at 10/tick: band is 12 deep
        assert!(supported_by(&body_at(60.0, 749.0), &g, 10.0, &PLAYER_BAND).is_some());
    }

    #[test]
    fn rising_body_never_lands() {
        let g = Girder::flat("G0", 0.0, 600.0, 740.0);
        assert!(supported_by(&body_at(60.0, 742.0), &g, -5.0, &PLAYER_BAND).is_none());
        // barrels refuse any upward speed, the player tolerates a hair
        assert!(supported_by(&body_at(60.0, 742.0), &g, -0.05, &PLAYER_BAND).is_some());
        assert!(supported_by(&body_at(60.0, 742.0), &g, -0.05, &BARREL_BAND).is_none());
    }

    #[test]
    fn extent_overlap_not_center() {
        let g = Girder::flat("G", 50.0, 500.0, 600.0);
        // center at 40 is outside the span but the right edge (54) overlaps
        assert!(supported_by(&body_at(40.0, 600.0), &g, 0.0, &PLAYER_BAND).is_some());
        // fully left of the span
        assert!(supported_by(&body_at(30.0, 600.0), &g, 0.0, &PLAYER_BAND).is_none());
    }

    #[test]
    fn slope_uses_body_center() {
        let g = Girder::new("s", 0.0, 100.0, 500.0, 600.0);
        assert_eq!(supported_by(&body_at(50.0, 550.0), &g, 0.0, &PLAYER_BAND), Some(550.0));
    }

    // ── find_support ──

    #[test]
    fn first_girder_in_list_wins() {
        // Two overlapping girders at nearly the same height: authoring order decides.
        let t = Terrain::new(
            vec![Girder::flat("B", 0.0, 600.0, 704.0), Girder::flat("A", 0.0, 600.0, 700.0)],
            vec![],
        );
        let (id, y) = find_support(&body_at(60.0, 705.0), &t, 0.0, &PLAYER_BAND, None).unwrap();
        assert_eq!(t.girder(id).label, "B");
        assert_eq!(y, 704.0);
    }

    #[test]
    fn skip_excludes_one_girder() {
        let t = Terrain::new(vec![Girder::flat("G", 0.0, 600.0, 700.0)], vec![]);
        let id = t.id_at(0);
        assert!(find_support(&body_at(60.0, 701.0), &t, 1.0, &BARREL_BAND, id).is_none());
        assert!(find_support(&body_at(60.0, 701.0), &t, 1.0, &BARREL_BAND, None).is_some());
    }

    // ── ladder_contact ──

    #[test]
    fn ladder_needs_overlap_and_centering() {
        let ladders = [Ladder::new(520.0, 620.0, 740.0, 18.0)];
        // standing at the foot, centered
        assert!(ladder_contact(&body_at(520.0, 740.0), &ladders, 0.75).is_some());
        // overlapping but 14 off-center (limit 13.5)
        assert!(ladder_contact(&body_at(534.0, 740.0), &ladders, 0.75).is_none());
        // standing exactly on top: edges touch, no overlap
        assert!(ladder_contact(&body_at(520.0, 620.0), &ladders, 0.75).is_none());
    }

    #[test]
    fn ladder_first_match_wins() {
        let ladders = [
            Ladder::new(100.0, 500.0, 740.0, 18.0),
            Ladder::new(105.0, 500.0, 740.0, 18.0),
        ];
        let hit = ladder_contact(&body_at(103.0, 700.0), &ladders, 0.75).unwrap();
        assert_eq!(hit.center_x, 100.0);
    }

    #[test]
    fn ladder_below_feet() {
        let ladders = [Ladder::new(520.0, 620.0, 740.0, 18.0)];
        assert!(ladder_below(&body_at(522.0, 620.5), &ladders, 0.75, 7.5).is_some());
        // too far above the top
        assert!(ladder_below(&body_at(520.0, 600.0), &ladders, 0.75, 7.5).is_none());
        // off-center
        assert!(ladder_below(&body_at(540.0, 620.0), &ladders, 0.75, 7.5).is_none());
    }

    // ── Properties ──

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn flat_girder_is_constant(
                left in -1000.0f32..1000.0,
                width in 0.0f32..1000.0,
                y in -1000.0f32..1000.0,
                x in -5000.0f32..5000.0,
            ) {
                let g = Girder::flat("f", left, width, y);
                prop_assert_eq!(surface_height_at(&g, x), y);
            }

            #[test]
            fn endpoints_are_exact(
                left in -1000.0f32..1000.0,
                width in 0.001f32..1000.0,
                y0 in -1000.0f32..1000.0,
                y1 in -1000.0f32..1000.0,
            ) {
                let g = Girder::new("s", left, width, y0, y1);
                prop_assert_eq!(surface_height_at(&g, g.left), y0);
                prop_assert_eq!(surface_height_at(&g, g.right), y1);
            }

            #[test]
            fn height_stays_between_ends(
                left in -1000.0f32..1000.0,
                width in 0.0f32..1000.0,
                y0 in -1000.0f32..1000.0,
                y1 in -1000.0f32..1000.0,
                x in -5000.0f32..5000.0,
            ) {
                let g = Girder::new("s", left, width, y0, y1);
                let h = surface_height_at(&g, x);
                let (lo, hi) = (y0.min(y1), y0.max(y1));
                prop_assert!(h >= lo - 1e-3 && h <= hi + 1e-3);
            }
        }
    }
}
