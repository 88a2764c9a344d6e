//! Color palettes for the diagram canvas.
//!
//! Colors are CSS hex strings (`#RRGGBB` or `#RRGGBBAA`) so the Canvas2D
//! backend can use them verbatim; the Vello backend parses them.

/// Theme-dependent colors for the canvas renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasTheme {
    pub background: &'static str,
    /// Document area behind the nodes.
    pub paper: &'static str,
    pub paper_border: &'static str,
    pub edge: &'static str,
    pub module_fill: &'static str,
    pub module_stroke: &'static str,
    pub module_text: &'static str,
    pub leaf_fill: &'static str,
    pub leaf_stroke: &'static str,
    pub leaf_text: &'static str,
    pub selection: &'static str,
    pub handle_fill: &'static str,
    pub handle_active: &'static str,
}

impl Default for CanvasTheme {
    fn default() -> Self {
        Self::light()
    }
}

impl CanvasTheme {
    /// Light theme: white paper on a warm gray desk.
    pub fn light() -> Self {
        Self {
            background: "#F5F5F7",
            paper: "#FFFFFF",
            paper_border: "#E5E5EA",
            edge: "#1D1D1F",
            module_fill: "#FFFFFF",
            module_stroke: "#1D1D1F",
            module_text: "#1D1D1F",
            leaf_fill: "#FFFFFF",
            leaf_stroke: "#1D1D1F",
            leaf_text: "#1D1D1F",
            selection: "#0A84FF",
            handle_fill: "#FFFFFF",
            handle_active: "#0A84FF",
        }
    }

    /// Dark theme, macOS-like.
    pub fn dark() -> Self {
        Self {
            background: "#1C1C1E",
            paper: "#2C2C2E",
            paper_border: "#3A3A3C",
            edge: "#D1D1D6",
            module_fill: "#2C2C2E",
            module_stroke: "#E5E5EA",
            module_text: "#F2F2F7",
            leaf_fill: "#2C2C2E",
            leaf_stroke: "#AEAEB2",
            leaf_text: "#F2F2F7",
            selection: "#64D2FF",
            handle_fill: "#1C1C1E",
            handle_active: "#64D2FF",
        }
    }
}

/// Parse `#RGB`, `#RRGGBB`, or `#RRGGBBAA` into RGBA bytes.
pub fn parse_hex_color(s: &str) -> Option<[u8; 4]> {
    let hex = s.strip_prefix('#')?;
    let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    match hex.len() {
        3 => {
            let mut out = [0, 0, 0, 255];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                out[i] = v * 17;
            }
            Some(out)
        }
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => None,
    }
}
