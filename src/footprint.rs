use std::collections::HashMap;

use crate::geometry::Size;

/// Text styling that affects an estimated footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl TextStyle {
    pub fn plain(font_size: f32) -> Self {
        Self {
            font_size,
            bold: false,
            italic: false,
        }
    }
}

/// Supplied measurement capability: text + style to an estimated pixel
/// footprint. The placement core never computes font metrics itself; a
/// renderer-backed implementation lives with the renderer.
pub trait FootprintEstimator {
    fn measure(&mut self, text: &str, style: &TextStyle) -> Size;
}

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_size_bits: u32,
    is_bold: bool,
    is_italic: bool,
}

const CHAR_WIDTH_RATIO: f32 = 0.6;
const LINE_HEIGHT_RATIO: f32 = 1.2;
const BOLD_WIDTH_RATIO: f32 = 0.66;

/// Character-count footprint approximation.
///
/// Good enough for decluttering: an average glyph advances 0.6 em and a
/// line occupies 1.2 em. Multi-line labels measure as the widest line by
/// the stacked line height.
pub struct HeuristicEstimator {
    cache: HashMap<MeasureKey, Size>,
}

impl HeuristicEstimator {
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }
}

impl Default for HeuristicEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl FootprintEstimator for HeuristicEstimator {
    fn measure(&mut self, text: &str, style: &TextStyle) -> Size {
        let key = MeasureKey {
            text: text.to_string(),
            font_size_bits: style.font_size.to_bits(),
            is_bold: style.bold,
            is_italic: style.italic,
        };

        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let char_width = if style.bold {
            style.font_size * BOLD_WIDTH_RATIO
        } else {
            style.font_size * CHAR_WIDTH_RATIO
        };
        let line_height = style.font_size * LINE_HEIGHT_RATIO;

        let mut max_chars = 0usize;
        let mut lines = 0usize;
        for line in text.lines() {
            lines += 1;
            max_chars = max_chars.max(line.chars().count());
        }
        if lines == 0 {
            lines = 1;
        }

        let measured = Size::new(max_chars as f32 * char_width, lines as f32 * line_height);
        self.cache.insert(key, measured);
        measured
    }
}

#[cfg(test)]
mod tests {
    use super::{FootprintEstimator, HeuristicEstimator, TextStyle};

    #[test]
    fn single_line_width_scales_with_char_count() {
        let mut est = HeuristicEstimator::new();
        let size = est.measure("ABC", &TextStyle::plain(10.0));
        assert!((size.width - 18.0).abs() < 1e-4);
        assert!((size.height - 12.0).abs() < 1e-4);
    }

    #[test]
    fn multiline_measures_widest_line_and_stacked_height() {
        let mut est = HeuristicEstimator::new();
        let size = est.measure("Jaxartes\n329 BC", &TextStyle::plain(10.0));
        assert!((size.width - 8.0 * 6.0).abs() < 1e-4);
        assert!((size.height - 24.0).abs() < 1e-4);
    }

    #[test]
    fn empty_text_still_occupies_one_line() {
        let mut est = HeuristicEstimator::new();
        let size = est.measure("", &TextStyle::plain(10.0));
        assert_eq!(size.width, 0.0);
        assert!((size.height - 12.0).abs() < 1e-4);
    }

    #[test]
    fn repeated_measurements_hit_the_cache() {
        let mut est = HeuristicEstimator::new();
        let style = TextStyle::plain(9.0);
        let first = est.measure("Samarkand", &style);
        let second = est.measure("Samarkand", &style);
        assert_eq!(first, second);
        assert_eq!(est.cache.len(), 1);
    }
}
