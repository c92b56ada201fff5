use serde::Deserialize;

/// Geometry of the wind polar heatmap
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PolarGrid {
    pub sectors: usize,
    pub rings: usize,
    /// Wind speed covered by each ring, in km/h
    pub ring_width: f64,
}

impl Default for PolarGrid {
    fn default() -> Self {
        PolarGrid { sectors: 12, rings: 5, ring_width: 3.0 }
    }
}

/// Returns the (sector, ring) cell of the polar heatmap a wind reading falls in.
///
/// Out of range input is clamped: directions wrap around 360, negative or NaN speeds count
/// as calm, zero counts behave as one and speeds past the outer ring land in the outer ring.
///
/// # Arguments
///
/// * 'wind_direction' - degrees, 0 is north
/// * 'wind_speed' - speed in the same unit as 'ring_width'
/// * 'sector_count' - number of angular sectors
/// * 'ring_count' - number of rings
/// * 'ring_width' - speed range per ring
pub fn wind_to_polar_cell(
    wind_direction: f64,
    wind_speed: f64,
    sector_count: usize,
    ring_count: usize,
    ring_width: f64) -> (usize, usize) {

    let sectors = sector_count.max(1);
    let rings = ring_count.max(1);

    let direction = if wind_direction.is_finite() { wind_direction.rem_euclid(360.0) } else { 0.0 };
    let sector = ((direction / 360.0) * sectors as f64).floor() as usize % sectors;

    let speed = if wind_speed.is_nan() { 0.0 } else { wind_speed.max(0.0) };
    let width = if ring_width.is_finite() && ring_width > 0.0 { ring_width } else { f64::MIN_POSITIVE };
    let ring = ((speed / width).floor().min(usize::MAX as f64) as usize).min(rings - 1);

    (sector, ring)
}

/// Builds the heatmap intensity matrix (rings x sectors) with the wind speed placed in
/// its cell and zero everywhere else.
///
/// # Arguments
///
/// * 'wind_direction' - degrees
/// * 'wind_speed' - wind speed
/// * 'grid' - heatmap geometry
pub fn polar_intensity(wind_direction: f64, wind_speed: f64, grid: &PolarGrid) -> Vec<Vec<f64>> {
    let sectors = grid.sectors.max(1);
    let rings = grid.rings.max(1);
    let (sector, ring) = wind_to_polar_cell(wind_direction, wind_speed, sectors, rings, grid.ring_width);

    let mut intensity = vec![vec![0.0; sectors]; rings];
    intensity[ring][sector] = if wind_speed.is_finite() { wind_speed.max(0.0) } else { 0.0 };

    intensity
}
