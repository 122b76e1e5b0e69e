//! Rate band table and the unit-stepping basis walk
//!
//! The investment basis moves one unit of quotation distance at a time, at a
//! rate that depends on which band currently contains the basis. The band is
//! re-evaluated on every step: a coarse price move is approximated by many
//! unit-sized, band-sensitive increments, never by one closed-form jump.

/// One rate band: half-open on the upper bound
#[derive(Debug, Clone, Copy)]
pub struct Band {
    pub lower: f64,
    pub upper: f64,

    /// Rate applied per unit step while the remaining distance is positive
    pub up: f64,

    /// Rate applied per unit step while the remaining distance is negative
    pub down: f64,
}

/// The fixed band table, checked top to bottom
pub const BANDS: [Band; 6] = [
    Band { lower: 1.0, upper: 50.0, up: 21.5, down: -3.0 },
    Band { lower: 50.0, upper: 100.0, up: 18.0, down: -8.0 },
    Band { lower: 100.0, upper: 200.0, up: 12.0, down: -12.0 },
    Band { lower: 200.0, upper: 400.0, up: 8.0, down: -18.0 },
    Band { lower: 400.0, upper: 600.0, up: 3.0, down: -21.5 },
    Band { lower: 600.0, upper: f64::INFINITY, up: 1.0, down: -30.0 },
];

/// No band is defined below this value; the walk saturates here instead of
/// running the basis below the table
pub const BASIS_FLOOR: f64 = 1.0;

/// Result of one basis walk
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasisWalk {
    /// Final basis after consuming the whole distance
    pub basis: f64,

    /// Whether any downward step had to saturate at `BASIS_FLOOR`
    pub clamped: bool,
}

fn rate_for(basis: f64, remaining: i64) -> f64 {
    let band = BANDS
        .iter()
        .find(|b| basis >= b.lower && basis < b.upper)
        .unwrap_or(&BANDS[0]);

    if remaining > 0 {
        band.up
    } else {
        band.down
    }
}

/// Walk the basis from `spesa` across `delta` units of quotation distance.
///
/// Terminates in exactly `|delta|` iterations: each iteration applies the
/// current band's rate once and moves the remaining distance one unit toward
/// zero. A downward step that would cross below `BASIS_FLOOR` saturates
/// there and still consumes its unit.
pub fn step_basis(spesa: i64, delta: i64) -> BasisWalk {
    let mut basis = spesa as f64;
    let mut remaining = delta;
    let mut clamped = false;

    while remaining != 0 {
        basis += rate_for(basis, remaining);

        if basis < BASIS_FLOOR {
            basis = BASIS_FLOOR;
            clamped = true;
        }

        remaining += if remaining > 0 { -1 } else { 1 };
    }

    BasisWalk { basis, clamped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_boundaries_are_half_open() {
        assert_eq!(rate_for(1.0, 1), 21.5);
        assert_eq!(rate_for(49.9, 1), 21.5);
        assert_eq!(rate_for(50.0, 1), 18.0);
        assert_eq!(rate_for(599.9, -1), -21.5);
        assert_eq!(rate_for(600.0, -1), -30.0);
        assert_eq!(rate_for(10_000.0, 1), 1.0);
    }

    #[test]
    fn walk_crosses_band_boundaries_mid_distance() {
        // Starting at 49 with two upward units: the first step uses the
        // [1,50) rate and lands at 70.5, the second uses the [50,100) rate
        // and lands at 88.5.
        let walk = step_basis(49, 2);
        assert_eq!(walk.basis, 88.5);
        assert!(!walk.clamped);
    }

    #[test]
    fn downward_walk_uses_down_rates() {
        // 120 -> -12 -> 108 (still [100,200)) -> -12 -> 96
        let walk = step_basis(120, -2);
        assert_eq!(walk.basis, 96.0);
        assert!(!walk.clamped);
    }

    #[test]
    fn zero_distance_leaves_the_basis_alone() {
        let walk = step_basis(250, 0);
        assert_eq!(walk.basis, 250.0);
        assert!(!walk.clamped);
    }

    #[test]
    fn downward_walk_saturates_at_the_floor() {
        // From the minimum basis every downward step would go negative; the
        // walk pins the basis at the floor and reports the clamp.
        let walk = step_basis(1, -5);
        assert_eq!(walk.basis, BASIS_FLOOR);
        assert!(walk.clamped);
    }

    #[test]
    fn clamped_walk_still_consumes_the_whole_distance() {
        // 5 -> 2 -> clamp at 1 -> remaining distance keeps draining without
        // looping forever
        let walk = step_basis(5, -100);
        assert_eq!(walk.basis, BASIS_FLOOR);
        assert!(walk.clamped);
    }
}
