//! Spatial navigation resolver.
//!
//! Pure function of (direction, origin, candidates, config). Pipeline:
//! 1. Visibility filter: hidden candidates and the origin itself are dropped
//! 2. Admissibility: geometric half-plane test with a lateral reach bound, or
//!    directional cone test
//! 3. Scoring: lower is better, exact ties keep input order
//! 4. Fallback: `none`, `nearest` or `wrap` when nothing is admissible
//!
//! Distances along the travel axis are measured edge to edge (origin's
//! leading edge to the candidate's trailing edge, clamped at zero) so tall
//! and short neighbours compete fairly; perpendicular offsets are measured
//! center to center.

use tracing::debug;
use tracing::trace;

use crate::config::FallbackStrategy;
use crate::config::NavigationConfig;
use crate::config::NavigationMode;
use crate::config::ScrollBehavior;
use crate::geometry::Direction;
use crate::geometry::Rect;

/// Geometric mode rejects a candidate once its weighted lateral offset is
/// more than this many times its center distance along the travel axis.
/// With the default weights that is 45 degrees off axis for left/right and
/// about 86 degrees for up/down.
pub const LATERAL_REACH: f64 = 30.0;

/// One focusable element as seen by the resolver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub rect: Rect,
    pub visible: bool,
}

impl Candidate {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            visible: true,
        }
    }

    pub fn hidden(rect: Rect) -> Self {
        Self {
            rect,
            visible: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Won the directional pass
    Directional,
    /// Picked by the `nearest` fallback
    Nearest,
    /// Picked by the `wrap` fallback
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Index into the candidate slice passed to [`resolve`]
    pub index: usize,
    pub score: f64,
    pub source: ResolutionSource,
    /// Caller must scroll the winner into view before focusing it.
    pub scroll_first: bool,
}

/// Position of a candidate relative to the origin for one direction.
#[derive(Debug, Clone, Copy)]
struct Offsets {
    /// Signed center delta along the travel axis; positive means "ahead".
    ahead: f64,
    /// Edge-to-edge gap along the travel axis, never negative.
    gap: f64,
    /// Absolute center offset on the perpendicular axis.
    lateral: f64,
}

fn offsets(direction: Direction, origin: &Rect, candidate: &Rect) -> Offsets {
    let axis = direction.axis();
    let sign = direction.sign();
    let (o_start, o_end) = origin.span_on(axis);
    let (c_start, c_end) = candidate.span_on(axis);

    let gap = if sign > 0.0 {
        c_start - o_end
    } else {
        o_start - c_end
    };

    let lateral_axis = axis.perpendicular();
    Offsets {
        ahead: (candidate.center_on(axis) - origin.center_on(axis)) * sign,
        gap: gap.max(0.0),
        lateral: (candidate.center_on(lateral_axis) - origin.center_on(lateral_axis)).abs(),
    }
}

fn orthogonal_weight(direction: Direction, config: &NavigationConfig) -> f64 {
    if direction.is_horizontal() {
        config.orthogonal_weight_lr
    } else {
        config.orthogonal_weight_ud
    }
}

/// Same row (for left/right) or column (for up/down) as the origin.
///
/// Centers must sit within half of the smaller perpendicular extent of each
/// other; DOM layouts are rarely pixel exact.
fn is_aligned(direction: Direction, origin: &Rect, candidate: &Rect) -> bool {
    let lateral_axis = direction.axis().perpendicular();
    let tolerance = origin
        .extent_on(lateral_axis)
        .min(candidate.extent_on(lateral_axis))
        / 2.0;
    (candidate.center_on(lateral_axis) - origin.center_on(lateral_axis)).abs() <= tolerance
}

fn geometric_score(
    direction: Direction,
    origin: &Rect,
    candidate: &Rect,
    config: &NavigationConfig,
) -> Option<f64> {
    let o = offsets(direction, origin, candidate);
    if o.ahead <= 0.0 {
        return None;
    }
    let lateral = o.lateral * orthogonal_weight(direction, config);
    if lateral > LATERAL_REACH * o.ahead {
        return None;
    }
    Some((o.gap * o.gap + lateral * lateral).sqrt())
}

fn directional_score(
    direction: Direction,
    origin: &Rect,
    candidate: &Rect,
    config: &NavigationConfig,
) -> Option<f64> {
    let o = offsets(direction, origin, candidate);
    if o.ahead <= 0.0 {
        return None;
    }
    let angle = o.lateral.atan2(o.ahead).to_degrees();
    if angle > config.cone_angle_degrees {
        return None;
    }

    let mut score = config.primary_weight * o.gap + config.secondary_weight * o.lateral;
    if config.overlap_bonus && origin.overlaps_on(candidate, direction.axis().perpendicular()) {
        score -= config.overlap_weight;
    }
    if config.row_column_bias && is_aligned(direction, origin, candidate) {
        score -= config.alignment_weight;
    }
    Some(score)
}

/// Lowest finite score wins; strict `<` keeps the first of equal scores.
fn lowest<F>(pool: &[usize], mut score_of: F) -> Option<(usize, f64)>
where
    F: FnMut(usize) -> Option<f64>,
{
    let mut best: Option<(usize, f64)> = None;
    for &index in pool {
        let Some(score) = score_of(index).filter(|s| s.is_finite()) else {
            continue;
        };
        match best {
            Some((_, best_score)) if score >= best_score => {}
            _ => best = Some((index, score)),
        }
    }
    best
}

fn nearest(origin: &Rect, candidates: &[Candidate], pool: &[usize]) -> Option<(usize, f64)> {
    lowest(pool, |i| Some(origin.center_distance(&candidates[i].rect)))
}

/// Candidate that comes "first" after wrapping past the far edge.
///
/// Moving down off the bottom lands on the top-most band of candidates behind
/// the origin; within that band the one closest to the origin's column wins.
fn wrap(
    direction: Direction,
    origin: &Rect,
    candidates: &[Candidate],
    pool: &[usize],
) -> Option<(usize, f64)> {
    let axis = direction.axis();
    let behind: Vec<usize> = pool
        .iter()
        .copied()
        .filter(|&i| offsets(direction, origin, &candidates[i].rect).ahead < 0.0)
        .collect();

    // Leading position when entering from the far edge: smaller comes first.
    let entry_key = |rect: &Rect| {
        let (start, end) = rect.span_on(axis);
        if direction.sign() > 0.0 {
            start
        } else {
            -end
        }
    };

    let (edge_index, edge_key) = lowest(&behind, |i| Some(entry_key(&candidates[i].rect)))?;
    let band = edge_key + candidates[edge_index].rect.extent_on(axis) / 2.0;

    let first_band: Vec<usize> = behind
        .into_iter()
        .filter(|&i| entry_key(&candidates[i].rect) <= band)
        .collect();

    lowest(&first_band, |i| {
        Some(offsets(direction, origin, &candidates[i].rect).lateral)
    })
}

/// Picks the best candidate to move to from `origin` in `direction`.
///
/// `origin_index` names the origin's own entry in `candidates`, if it is
/// listed there. Other candidates sharing the origin's geometry stay in play.
///
/// Returns `None` when the origin is degenerate, when no visible candidate
/// remains, or when nothing is admissible and the fallback finds nothing.
pub fn resolve(
    direction: Direction,
    origin: &Rect,
    candidates: &[Candidate],
    origin_index: Option<usize>,
    config: &NavigationConfig,
) -> Option<Resolution> {
    if origin.is_degenerate() || !origin.is_finite() {
        debug!(direction = %direction, "origin has no geometry; cannot navigate");
        return None;
    }

    let pool: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|&(i, c)| Some(i) != origin_index && c.visible && c.rect.is_finite())
        .map(|(i, _)| i)
        .collect();

    if pool.is_empty() {
        trace!(direction = %direction, "no visible candidates");
        return None;
    }

    let directional = lowest(&pool, |i| {
        let rect = &candidates[i].rect;
        match config.mode {
            NavigationMode::Geometric => geometric_score(direction, origin, rect, config),
            NavigationMode::Directional => directional_score(direction, origin, rect, config),
        }
    });

    let (index, score, source) = match directional {
        Some((index, score)) => (index, score, ResolutionSource::Directional),
        None => {
            let fallback = match config.fallback {
                FallbackStrategy::None => None,
                FallbackStrategy::Nearest => nearest(origin, candidates, &pool)
                    .map(|(i, s)| (i, s, ResolutionSource::Nearest)),
                FallbackStrategy::Wrap => wrap(direction, origin, candidates, &pool)
                    .map(|(i, s)| (i, s, ResolutionSource::Wrap)),
            };
            debug!(
                direction = %direction,
                fallback = config.fallback.as_str(),
                found = fallback.is_some(),
                "no admissible candidate; applied fallback"
            );
            fallback?
        }
    };

    Some(Resolution {
        index,
        score,
        source,
        scroll_first: config.scroll_behavior == ScrollBehavior::ScrollFirst,
    })
}

/// Contract form of [`resolve`]: index of the winning candidate, if any.
///
/// The first candidate with exactly the origin's rectangle is taken to be
/// the origin.
pub fn navigate(
    direction: Direction,
    origin: &Rect,
    candidates: &[Candidate],
    config: &NavigationConfig,
) -> Option<usize> {
    let origin_index = candidates.iter().position(|c| c.rect == *origin);
    resolve(direction, origin, candidates, origin_index, config).map(|r| r.index)
}
