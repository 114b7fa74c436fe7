use ratatui::style::Color;

/// Lower bounds of the six depth bands in km, shallowest first
pub const DEPTH_INTERVALS: [f64; 6] = [-10.0, 10.0, 30.0, 50.0, 70.0, 90.0];

/// Fill colors for the six depth bands, shallowest first
pub const DEPTH_COLORS: [&str; 6] = [
    "#5fde23", "#b2de23", "#decb23", "#de9623", "#de5b23", "#de2323",
];

/// Stroke color for earthquake markers
pub const MARKER_STROKE: &str = "black";

/// Stroke color for tectonic plate boundaries
pub const PLATE_COLOR: &str = "purple";

/// Stroke weight for tectonic plate boundaries
pub const PLATE_WEIGHT: f64 = 3.0;

/// Index (0..6) of the depth band a depth falls in.
/// Comparisons are strictly greater-than, so a depth sitting exactly on a
/// boundary belongs to the shallower band. NaN falls through to band 0.
pub fn depth_band(depth: f64) -> usize {
    if depth > 90.0 {
        5
    } else if depth > 70.0 {
        4
    } else if depth > 50.0 {
        3
    } else if depth > 30.0 {
        2
    } else if depth > 10.0 {
        1
    } else {
        0
    }
}

/// Fill color for an earthquake at the given depth (km)
pub fn color_for_depth(depth: f64) -> &'static str {
    DEPTH_COLORS[depth_band(depth)]
}

/// Marker radius for a magnitude. Zero-magnitude quakes still get a
/// visible marker.
pub fn radius_for_magnitude(mag: f64) -> f64 {
    if mag == 0.0 {
        1.0
    } else {
        mag * 4.0
    }
}

/// Visual style of an earthquake circle marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub opacity: f64,
    pub fill_opacity: f64,
    pub fill_color: &'static str,
    pub color: &'static str,
    pub radius: f64,
    pub weight: f64,
}

/// Complete marker style for a quake
pub fn marker_style(mag: f64, depth: f64) -> MarkerStyle {
    MarkerStyle {
        opacity: 0.8,
        fill_opacity: 0.8,
        fill_color: color_for_depth(depth),
        color: MARKER_STROKE,
        radius: radius_for_magnitude(mag),
        weight: 0.5,
    }
}

/// Parse a `#rrggbb` string into a terminal color.
/// Named colors used by the overlays are mapped too; anything else is white.
pub fn to_terminal_color(css: &str) -> Color {
    if let Some(hex) = css.strip_prefix('#') {
        if hex.len() == 6 {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            if let (Some(r), Some(g), Some(b)) = (channel(0), channel(2), channel(4)) {
                return Color::Rgb(r, g, b);
            }
        }
        return Color::White;
    }

    match css {
        "purple" => Color::Rgb(128, 0, 128),
        "black" => Color::Black,
        _ => Color::White,
    }
}

/// One row of the depth legend
#[derive(Debug, Clone, PartialEq)]
pub struct LegendRow {
    pub color: &'static str,
    pub label: String,
}

/// Legend rows in display order: "-10km to 10km" ... "90+"
pub fn legend_rows() -> Vec<LegendRow> {
    DEPTH_INTERVALS
        .iter()
        .enumerate()
        .map(|(i, lower)| {
            let label = match DEPTH_INTERVALS.get(i + 1) {
                Some(upper) => format!("{}km to {}km", lower, upper),
                None => format!("{}+", lower),
            };
            LegendRow {
                color: DEPTH_COLORS[i],
                label,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_thresholds() {
        assert_eq!(color_for_depth(95.0), "#de2323");
        assert_eq!(color_for_depth(90.0), "#de5b23");
        assert_eq!(color_for_depth(70.5), "#de5b23");
        assert_eq!(color_for_depth(70.0), "#de9623");
        assert_eq!(color_for_depth(50.0), "#decb23");
        assert_eq!(color_for_depth(30.0), "#b2de23");
        assert_eq!(color_for_depth(10.0), "#5fde23");
        assert_eq!(color_for_depth(10.01), "#b2de23");
    }

    #[test]
    fn test_negative_depth_is_shallowest() {
        assert_eq!(color_for_depth(-5.0), "#5fde23");
        assert_eq!(color_for_depth(f64::NAN), "#5fde23");
    }

    #[test]
    fn test_depth_color_monotonic() {
        let mut last = 0;
        let mut depth = -50.0;
        while depth < 200.0 {
            let band = depth_band(depth);
            assert!(band >= last, "band went backwards at {}", depth);
            assert!(DEPTH_COLORS.contains(&color_for_depth(depth)));
            last = band;
            depth += 0.5;
        }
        assert_eq!(last, 5);
    }

    #[test]
    fn test_radius() {
        assert_eq!(radius_for_magnitude(0.0), 1.0);
        assert_eq!(radius_for_magnitude(2.5), 10.0);
        assert_eq!(radius_for_magnitude(-0.5), -2.0);
    }

    #[test]
    fn test_sample_marker_style() {
        let style = marker_style(5.2, 45.0);
        assert_eq!(style.fill_color, "#decb23");
        assert!((style.radius - 20.8).abs() < 1e-9);
        assert_eq!(style.color, "black");
        assert_eq!(style.weight, 0.5);
        assert_eq!(style.opacity, 0.8);
        assert_eq!(style.fill_opacity, 0.8);
    }

    #[test]
    fn test_legend_rows() {
        let rows = legend_rows();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].label, "-10km to 10km");
        assert_eq!(rows[2].label, "30km to 50km");
        assert_eq!(rows[5].label, "90+");
        assert_eq!(rows[5].color, "#de2323");
    }

    #[test]
    fn test_terminal_color() {
        assert_eq!(to_terminal_color("#de2323"), Color::Rgb(0xde, 0x23, 0x23));
        assert_eq!(to_terminal_color("purple"), Color::Rgb(128, 0, 128));
        assert_eq!(to_terminal_color("#zz0000"), Color::White);
    }
}
