//! Relative-ranking cell colors.
//!
//! Each cell is placed between the smallest and largest non-empty value of
//! its row and painted along green → yellow → red → black. Throughput rows
//! (MB/s) are ranked the other way round.

use serde::Serialize;

use crate::units::{Measurement, Unit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.0, self.1, self.2)
    }

    /// Rec. 709 relative luminance, 0..255.
    pub fn luminance(&self) -> f64 {
        0.2126 * self.0 as f64 + 0.7152 * self.1 as f64 + 0.0722 * self.2 as f64
    }

    /// Black or white, whichever reads better on this background.
    pub fn contrast_text(&self) -> Rgb {
        if self.luminance() < 128.0 {
            Rgb::WHITE
        } else {
            Rgb::BLACK
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

impl Direction {
    pub fn for_unit(unit: Unit) -> Self {
        match unit {
            Unit::MegabytesPerSecond => Direction::HigherIsBetter,
            Unit::Seconds | Unit::Megabytes => Direction::LowerIsBetter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellStyle {
    /// Not enough values in the row to rank; text shown as is.
    Unstyled,
    /// This cell has no data; text hidden.
    Blank,
    Ranked {
        ratio: f64,
        background: Rgb,
        text: Rgb,
    },
}

impl CellStyle {
    pub fn background(&self) -> Rgb {
        match self {
            CellStyle::Ranked { background, .. } => *background,
            _ => Rgb::WHITE,
        }
    }

    pub fn text_color(&self) -> Rgb {
        match self {
            CellStyle::Ranked { text, .. } => *text,
            _ => Rgb::BLACK,
        }
    }

    /// Text to show for `value` under this style.
    pub fn display<'a>(&self, value: &'a str) -> &'a str {
        match self {
            CellStyle::Blank => "",
            _ => value,
        }
    }
}

fn non_zero(magnitudes: &[f64]) -> impl Iterator<Item = f64> + '_ {
    magnitudes
        .iter()
        .copied()
        .filter(|m| m.is_finite() && *m != 0.0)
}

/// Style for a cell of magnitude `current` in a row whose target columns
/// hold `row` (missing cells count as 0).
pub fn style_for(row: &[f64], current: f64, direction: Direction) -> CellStyle {
    if non_zero(row).count() < 2 {
        return CellStyle::Unstyled;
    }
    if !current.is_finite() || current == 0.0 {
        return CellStyle::Blank;
    }

    let min = non_zero(row).fold(f64::INFINITY, f64::min);
    let max = non_zero(row).fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let ratio = if span == 0.0 {
        0.0
    } else {
        match direction {
            Direction::LowerIsBetter => (current - min) / span,
            Direction::HigherIsBetter => (max - current) / span,
        }
    }
    .clamp(0.0, 1.0);

    let background = gradient(ratio);
    CellStyle::Ranked {
        ratio,
        background,
        text: background.contrast_text(),
    }
}

/// Style for one measurement among its row.
pub fn style_cell(row: &[Option<&Measurement>], cell: Option<&Measurement>) -> CellStyle {
    let magnitudes: Vec<f64> = row.iter().map(|m| m.map_or(0.0, |m| m.magnitude)).collect();
    match cell {
        Some(m) => style_for(&magnitudes, m.magnitude, Direction::for_unit(m.unit)),
        None => style_for(&magnitudes, 0.0, Direction::LowerIsBetter),
    }
}

/// Map 0..=1 onto green → yellow → red → black in three equal segments.
pub fn gradient(ratio: f64) -> Rgb {
    let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 1.0 };
    let third = 1.0 / 3.0;
    let channel = |v: f64| (v.clamp(0.0, 255.0)).round() as u8;

    if ratio < third {
        Rgb(channel(255.0 * ratio / third), 255, 0)
    } else if ratio < 2.0 * third {
        Rgb(255, channel(255.0 * (1.0 - (ratio - third) / third)), 0)
    } else {
        Rgb(channel(255.0 * (1.0 - (ratio - 2.0 * third) / third)), 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units;

    #[test]
    fn test_gradient_anchors() {
        assert_eq!(gradient(0.0), Rgb(0, 255, 0));
        assert_eq!(gradient(1.0 / 3.0), Rgb(255, 255, 0));
        assert_eq!(gradient(2.0 / 3.0), Rgb(255, 0, 0));
        assert_eq!(gradient(1.0), Rgb(0, 0, 0));
        let mid = gradient(0.5);
        assert_eq!((mid.0, mid.2), (255, 0));
        assert!((127..=128).contains(&mid.1));
    }

    #[test]
    fn test_text_contrast() {
        assert_eq!(Rgb(0, 255, 0).contrast_text(), Rgb::BLACK);
        assert_eq!(Rgb(255, 0, 0).contrast_text(), Rgb::WHITE);
        assert_eq!(Rgb(0, 0, 0).contrast_text(), Rgb::WHITE);
        assert_eq!(Rgb(255, 255, 0).contrast_text(), Rgb::BLACK);
    }

    #[test]
    fn test_fewer_than_two_values_unstyled() {
        let row = [0.0, 3.5, 0.0];
        for v in row {
            assert_eq!(style_for(&row, v, Direction::LowerIsBetter), CellStyle::Unstyled);
        }
        assert_eq!(style_for(&[], 0.0, Direction::HigherIsBetter), CellStyle::Unstyled);
    }

    #[test]
    fn test_lower_is_better_extremes() {
        let row = [10.0, 20.0, 40.0];
        let best = style_for(&row, 10.0, Direction::LowerIsBetter);
        let worst = style_for(&row, 40.0, Direction::LowerIsBetter);
        assert_eq!(best.background(), Rgb(0, 255, 0));
        assert_eq!(worst.background(), Rgb(0, 0, 0));
        assert_eq!(worst.text_color(), Rgb::WHITE);
        match style_for(&row, 20.0, Direction::LowerIsBetter) {
            CellStyle::Ranked { ratio, .. } => assert!((ratio - 1.0 / 3.0).abs() < 1e-12),
            other => panic!("expected ranked, got {:?}", other),
        }
    }

    #[test]
    fn test_higher_is_better_inverts() {
        let row = [10.0, 20.0, 40.0];
        assert_eq!(
            style_for(&row, 40.0, Direction::HigherIsBetter).background(),
            Rgb(0, 255, 0)
        );
        assert_eq!(
            style_for(&row, 10.0, Direction::HigherIsBetter).background(),
            Rgb(0, 0, 0)
        );
    }

    #[test]
    fn test_zero_cell_is_blank_when_row_ranked() {
        let row = [0.0, 2.0, 4.0];
        let style = style_for(&row, 0.0, Direction::LowerIsBetter);
        assert_eq!(style, CellStyle::Blank);
        assert_eq!(style.display("0.00MB"), "");
        assert_eq!(CellStyle::Unstyled.display("0.00MB"), "0.00MB");
    }

    #[test]
    fn test_equal_values_rank_as_best() {
        let row = [5.0, 5.0];
        assert_eq!(
            style_for(&row, 5.0, Direction::LowerIsBetter).background(),
            Rgb(0, 255, 0)
        );
    }

    #[test]
    fn test_style_cell_uses_unit_direction() {
        let fast = units::speed(100.0 * 1_048_576.0, 1000.0);
        let slow = units::speed(100.0 * 1_048_576.0, 4000.0);
        let row = [Some(&fast), Some(&slow), None];
        assert_eq!(style_cell(&row, Some(&fast)).background(), Rgb(0, 255, 0));
        assert_eq!(style_cell(&row, Some(&slow)).background(), Rgb(0, 0, 0));
        assert_eq!(style_cell(&row, None), CellStyle::Blank);
    }
}
