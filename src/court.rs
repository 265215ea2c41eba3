use once_cell::sync::Lazy;

pub const COURT_LENGTH: f64 = 94.0;
pub const COURT_WIDTH: f64 = 50.0;
pub const HALF_COURT_X: f64 = 47.0;

// The backcourt trim intentionally sits short of the true half-court line;
// frames right at center court can land on either side of it.
pub const BACKCOURT_TRIM_X: f64 = 45.0;

const PAINT_Y: (f64, f64) = (17.0, 33.0);
const PAINT_X_NEAR: (f64, f64) = (0.0, 19.0);
const PAINT_X_FAR: (f64, f64) = (71.0, 90.0);

const BASELINE_Y: (f64, f64) = (17.0, 33.0);
const BASELINE_X_NEAR: (f64, f64) = (0.0, 5.0);
const BASELINE_X_FAR: (f64, f64) = (89.0, 94.0);

const HEXBIN_GRIDSIZE: usize = 50;
const HEXBIN_Y_OFFSET: f64 = -50.0;

pub fn in_paint(x: f64, y: f64) -> bool {
    let in_key_x = (x >= PAINT_X_NEAR.0 && x <= PAINT_X_NEAR.1)
        || (x >= PAINT_X_FAR.0 && x <= PAINT_X_FAR.1);
    in_key_x && y >= PAINT_Y.0 && y <= PAINT_Y.1
}

pub fn on_baseline(x: f64, y: f64) -> bool {
    let on_strip_x = (x >= BASELINE_X_NEAR.0 && x <= BASELINE_X_NEAR.1)
        || (x >= BASELINE_X_FAR.0 && x <= BASELINE_X_FAR.1);
    on_strip_x && y >= BASELINE_Y.0 && y <= BASELINE_Y.1
}

/// Mirror a point about center court so half-court action always reads in
/// one orientation. Applying it twice returns the original point.
pub fn rotate_about_center(x: f64, y: f64) -> (f64, f64) {
    (HALF_COURT_X - (x - HALF_COURT_X), COURT_WIDTH - y)
}

pub fn euclidean(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
}

/// Hexagon centers matching matplotlib's hexbin(gridsize=50,
/// extent=(0, 94, -50, 0)): a (nx+1)x(ny+1) primary lattice plus the
/// half-cell staggered lattice.
static HEXBIN_VERTICES: Lazy<Vec<(f64, f64)>> = Lazy::new(|| {
    let nx = HEXBIN_GRIDSIZE;
    let ny = (nx as f64 / 3.0_f64.sqrt()) as usize;
    let sx = COURT_LENGTH / nx as f64;
    let sy = -HEXBIN_Y_OFFSET / ny as f64;

    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1) + nx * ny);
    for i in 0..=nx {
        for j in 0..=ny {
            vertices.push((i as f64 * sx, HEXBIN_Y_OFFSET + j as f64 * sy));
        }
    }
    for i in 0..nx {
        for j in 0..ny {
            vertices.push((
                (i as f64 + 0.5) * sx,
                HEXBIN_Y_OFFSET + (j as f64 + 0.5) * sy,
            ));
        }
    }
    vertices
});

/// Snap a court coordinate to its hexbin vertex key. The lattice lives in
/// the grid's negative-y band while queries arrive in court coordinates;
/// the absolute-value manhattan metric the labeled dataset was built with
/// bridges the two, pairing court y with vertex -y.
pub fn hexbin_vertex_key(x: f64, y: f64) -> String {
    let mut best_dist = f64::MAX;
    let mut best_vertex = (0.0, 0.0);
    for &(vx, vy) in HEXBIN_VERTICES.iter() {
        let d = (x.abs() - vx.abs()).abs() + (y.abs() - vy.abs()).abs();
        if d < best_dist {
            best_dist = d;
            best_vertex = (vx, vy);
        }
    }
    format!("({:.2},{:.2})", best_vertex.0, best_vertex.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paint_bounds_cover_both_keys() {
        assert!(in_paint(10.0, 25.0));
        assert!(in_paint(80.0, 25.0));
        assert!(!in_paint(47.0, 25.0));
        assert!(!in_paint(10.0, 10.0));
    }

    #[test]
    fn baseline_strips_are_narrow() {
        assert!(on_baseline(2.0, 25.0));
        assert!(on_baseline(92.0, 25.0));
        assert!(!on_baseline(10.0, 25.0));
        assert!(!on_baseline(2.0, 5.0));
    }

    #[test]
    fn rotation_round_trips() {
        let points = [(10.0, 25.0), (80.0, 3.0), (47.0, 50.0), (0.0, 0.0)];
        for (x, y) in points {
            let (rx, ry) = rotate_about_center(x, y);
            let (bx, by) = rotate_about_center(rx, ry);
            assert!((bx - x).abs() < 1e-9);
            assert!((by - y).abs() < 1e-9);
        }
    }

    #[test]
    fn rotation_mirrors_far_court_to_near() {
        let (rx, ry) = rotate_about_center(80.0, 10.0);
        assert!((rx - 14.0).abs() < 1e-9);
        assert!((ry - 40.0).abs() < 1e-9);
    }

    #[test]
    fn hexbin_key_is_stable_for_nearby_points() {
        let a = hexbin_vertex_key(23.41, 25.02);
        let b = hexbin_vertex_key(23.44, 25.05);
        assert_eq!(a, b);
    }

    #[test]
    fn hexbin_key_distinguishes_distant_points() {
        assert_ne!(hexbin_vertex_key(5.0, 25.0), hexbin_vertex_key(40.0, 25.0));
    }
}
