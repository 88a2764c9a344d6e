//! Typed configuration for layout and drawing.
//!
//! Every struct deserializes from partial camelCase JSON; missing fields
//! fall back to the defaults below.

use serde::{Deserialize, Serialize};

/// Knobs for the top-down tree layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    /// Horizontal gap between sibling subtrees.
    pub node_gap_x: f64,
    /// Vertical gap between depth rows.
    pub node_gap_y: f64,
    pub font_size: f64,
    /// Line height as a multiple of `font_size`.
    pub line_height: f64,
    /// Pads sibling gaps by `CROSSING_GAP_PADDING` so edges fan out cleanly.
    pub avoid_crossing: bool,
    /// Narrow vertical leaf boxes holding one glyph per line.
    pub single_char_per_line: bool,
}

/// Added to `node_gap_x` when `avoid_crossing` is on.
pub const CROSSING_GAP_PADDING: f64 = 12.0;

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            node_gap_x: 28.0,
            node_gap_y: 56.0,
            font_size: 14.0,
            line_height: 1.5,
            avoid_crossing: true,
            single_char_per_line: false,
        }
    }
}

impl LayoutOptions {
    /// The sibling gap actually applied by the layout.
    pub fn effective_gap_x(&self) -> f64 {
        let gap = self.node_gap_x.max(0.0);
        if self.avoid_crossing {
            gap + CROSSING_GAP_PADDING
        } else {
            gap
        }
    }

    pub fn line_height_px(&self) -> f64 {
        self.font_size * self.line_height
    }

    /// Replace out-of-range values with sane ones.
    pub fn normalized(mut self) -> Self {
        let d = Self::default();
        if !self.node_gap_x.is_finite() || self.node_gap_x < 0.0 {
            self.node_gap_x = d.node_gap_x;
        }
        if !self.node_gap_y.is_finite() || self.node_gap_y < 0.0 {
            self.node_gap_y = d.node_gap_y;
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            self.font_size = d.font_size;
        }
        if !self.line_height.is_finite() || self.line_height <= 0.0 {
            self.line_height = d.line_height;
        }
        self
    }
}

/// Options for re-deriving a layout from an edited document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RebalanceOptions {
    #[serde(flatten)]
    pub layout: LayoutOptions,
    /// Order siblings by their current x (then y) instead of edge order.
    pub sort_by_position: bool,
}

impl Default for RebalanceOptions {
    fn default() -> Self {
        Self {
            layout: LayoutOptions::default(),
            sort_by_position: true,
        }
    }
}

/// Font families offered by the diagram toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    SansSerif,
    Serif,
    Monospace,
    SongTi,
    HeiTi,
}

impl FontFamily {
    /// CSS font stack.
    pub fn css(self) -> &'static str {
        match self {
            FontFamily::SansSerif => "\"PingFang SC\", \"Microsoft YaHei\", sans-serif",
            FontFamily::Serif => "Georgia, \"Times New Roman\", serif",
            FontFamily::Monospace => "\"JetBrains Mono\", Menlo, monospace",
            FontFamily::SongTi => "SimSun, \"Songti SC\", serif",
            FontFamily::HeiTi => "SimHei, \"Heiti SC\", sans-serif",
        }
    }
}

/// Drawing style for the canvas renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleOptions {
    pub line_width: f64,
    pub font_size: f64,
    pub font_family: FontFamily,
    pub show_arrows: bool,
    pub arrow_width: f64,
    pub arrow_length: f64,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            line_width: 1.5,
            font_size: 14.0,
            font_family: FontFamily::SansSerif,
            show_arrows: true,
            arrow_width: 8.0,
            arrow_length: 10.0,
        }
    }
}

impl StyleOptions {
    /// Clamp numeric fields into the ranges the toolbar exposes.
    pub fn normalized(self) -> Self {
        let d = Self::default();
        let clamp = |v: f64, lo: f64, hi: f64, fallback: f64| {
            if v.is_finite() { v.clamp(lo, hi) } else { fallback }
        };
        Self {
            line_width: clamp(self.line_width, 0.5, 6.0, d.line_width),
            font_size: clamp(self.font_size, 10.0, 32.0, d.font_size),
            font_family: self.font_family,
            show_arrows: self.show_arrows,
            arrow_width: clamp(self.arrow_width, 4.0, 20.0, d.arrow_width),
            arrow_length: clamp(self.arrow_length, 4.0, 24.0, d.arrow_length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_fills_defaults() {
        let opts: LayoutOptions = serde_json::from_str(r#"{"nodeGapX": 40}"#).unwrap();
        assert_eq!(opts.node_gap_x, 40.0);
        assert_eq!(opts.node_gap_y, LayoutOptions::default().node_gap_y);
        assert!(opts.avoid_crossing);
    }

    #[test]
    fn crossing_padding_applies_only_when_enabled() {
        let mut opts = LayoutOptions::default();
        assert_eq!(opts.effective_gap_x(), 28.0 + CROSSING_GAP_PADDING);
        opts.avoid_crossing = false;
        assert_eq!(opts.effective_gap_x(), 28.0);
    }

    #[test]
    fn rebalance_options_flatten_layout_fields() {
        let opts: RebalanceOptions =
            serde_json::from_str(r#"{"fontSize": 18, "sortByPosition": false}"#).unwrap();
        assert_eq!(opts.layout.font_size, 18.0);
        assert!(!opts.sort_by_position);
    }

    #[test]
    fn style_is_clamped_to_toolbar_ranges() {
        let style = StyleOptions {
            line_width: 40.0,
            arrow_length: f64::NAN,
            ..StyleOptions::default()
        }
        .normalized();
        assert_eq!(style.line_width, 6.0);
        assert_eq!(style.arrow_length, 10.0);
    }

    #[test]
    fn font_family_uses_kebab_names() {
        let style: StyleOptions = serde_json::from_str(r#"{"fontFamily": "song-ti"}"#).unwrap();
        assert_eq!(style.font_family, FontFamily::SongTi);
    }
}
