use crate::face::Face;

/// Vertical position of the caption block as a fraction of the canvas height.
pub const DEFAULT_ANCHOR_RATIO: f64 = 0.77;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionedLine {
    pub text: String,
    /// Pen origin on the baseline.
    pub origin: (i32, i32),
    /// Rounded advance width of the line.
    pub width: i32,
}

/// Caption lines positioned as one block, horizontally centered per line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextLayout {
    pub line_height: i32,
    pub anchor_y: i32,
    pub lines: Vec<PositionedLine>,
}

impl TextLayout {
    /// Lays out `text` (split on `\n`, empty lines kept) for a `width` x `height` canvas.
    ///
    /// The block anchor is `trunc(height * anchor_ratio) - total_height / 2`,
    /// computed once; line `i` sits at `anchor_y + line_height * i`. Each line
    /// starts at `width / 2 - line_width / 2` (integer division).
    pub fn new<F: Face + ?Sized>(
        text: &str,
        face: &F,
        width: u32,
        height: u32,
        anchor_ratio: f64,
    ) -> Self {
        let line_height = face.line_height();
        let parts: Vec<&str> = text.split('\n').collect();
        let total_height = line_height * parts.len() as i32;

        let anchor_y = (f64::from(height) * anchor_ratio) as i32 - total_height / 2;
        let center_x = (width / 2) as i32;

        let lines = parts
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                let line_width = face.measure(line).round() as i32;
                PositionedLine {
                    text: line.to_string(),
                    origin: (center_x - line_width / 2, anchor_y + line_height * i as i32),
                    width: line_width,
                }
            })
            .collect();

        Self {
            line_height,
            anchor_y,
            lines,
        }
    }

    /// Whether drawing this layout would put any glyph on the canvas.
    pub fn has_ink(&self) -> bool {
        self.lines
            .iter()
            .any(|l| l.text.chars().any(|c| !c.is_whitespace()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::block::{BlockFace, LINE_HEIGHT};

    fn layout(text: &str, w: u32, h: u32) -> TextLayout {
        TextLayout::new(text, &BlockFace, w, h, DEFAULT_ANCHOR_RATIO)
    }

    #[test]
    fn single_line_is_centered_for_even_and_odd_widths() {
        // "hi" measures 14px
        assert_eq!(layout("hi", 100, 100).lines[0].origin.0, 50 - 7);
        assert_eq!(layout("hi", 101, 100).lines[0].origin.0, 50 - 7);
        // "abc" measures 21px, half truncates to 10
        assert_eq!(layout("abc", 100, 100).lines[0].origin.0, 40);
        assert_eq!(layout("abc", 101, 100).lines[0].origin.0, 40);
    }

    #[test]
    fn anchor_truncates_the_scaled_height() {
        // 100 * 0.77 = 77, minus 12 / 2
        assert_eq!(layout("x", 100, 100).anchor_y, 71);
        // 10 * 0.77 = 7.7 truncates to 7 (rounding would give 8)
        assert_eq!(layout("x", 100, 10).anchor_y, 1);
        // 50 * 0.77 = 38.5 truncates to 38
        assert_eq!(layout("x", 100, 50).anchor_y, 32);
    }

    #[test]
    fn lines_are_spaced_from_one_anchor() {
        let l = layout("one\ntwo\nthree", 200, 200);
        assert_eq!(l.lines.len(), 3);
        // 154 - 36 / 2
        assert_eq!(l.anchor_y, 136);
        for (i, line) in l.lines.iter().enumerate() {
            assert_eq!(line.origin.1, l.anchor_y + LINE_HEIGHT * i as i32);
        }
        let texts: Vec<_> = l.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn empty_lines_keep_their_slot() {
        let l = layout("a\n", 100, 100);
        assert_eq!(l.lines.len(), 2);
        assert_eq!(l.lines[1].text, "");
        assert_eq!(l.lines[1].width, 0);
        assert_eq!(l.lines[1].origin, (50, l.anchor_y + LINE_HEIGHT));
        // two slots: 77 - 24 / 2
        assert_eq!(l.anchor_y, 65);
    }

    #[test]
    fn has_ink_ignores_blank_captions() {
        assert!(!layout("", 10, 10).has_ink());
        assert!(!layout(" \n  ", 10, 10).has_ink());
        assert!(layout("\n.", 10, 10).has_ink());
    }

    #[test]
    fn wide_lines_can_start_left_of_the_canvas() {
        // 20 chars = 140px on a 20px canvas
        let l = layout(&"w".repeat(20), 20, 20);
        assert_eq!(l.lines[0].origin.0, 10 - 70);
    }
}
