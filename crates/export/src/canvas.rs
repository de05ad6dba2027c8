use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

use crate::metrics::{Font, to_win_ansi};

/// A4 portrait, in points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BRAND: Rgb = Rgb(41, 128, 185);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const DIVIDER: Rgb = Rgb(230, 230, 230);
    pub const FOOTER: Rgb = Rgb(120, 120, 120);
    pub const TEXT: Rgb = Rgb(80, 80, 80);
    pub const STRIPE: Rgb = Rgb(245, 245, 245);
    pub const BORDER: Rgb = Rgb(200, 200, 200);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    fn operands(&self) -> Vec<Object> {
        vec![
            (self.0 as f32 / 255.0).into(),
            (self.1 as f32 / 255.0).into(),
            (self.2 as f32 / 255.0).into(),
        ]
    }
}

/// Drawing surface for one page. Coordinates are measured from the top-left
/// corner and flipped to PDF space when emitted.
#[derive(Debug)]
pub struct PageCanvas {
    content: Content,
    height: f32,
}

impl PageCanvas {
    pub fn new() -> Self {
        Self {
            content: Content { operations: vec![] },
            height: PAGE_HEIGHT,
        }
    }

    fn push(&mut self, operator: &str, operands: Vec<Object>) {
        self.content.operations.push(Operation::new(operator, operands));
    }

    fn flip(&self, y: f32) -> f32 {
        self.height - y
    }

    /// Draws `text` with its baseline at `y`.
    pub fn text(&mut self, text: &str, x: f32, y: f32, font: Font, size: f32, color: Rgb) {
        self.push("BT", vec![]);
        self.push(
            "Tf",
            vec![Object::Name(font.resource_name().as_bytes().to_vec()), size.into()],
        );
        self.push("rg", color.operands());
        self.push("Td", vec![x.into(), self.flip(y).into()]);
        self.push("Tj", vec![Object::String(to_win_ansi(text), StringFormat::Literal)]);
        self.push("ET", vec![]);
    }

    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Rgb) {
        self.push("w", vec![width.into()]);
        self.push("RG", color.operands());
        self.push("m", vec![from.0.into(), self.flip(from.1).into()]);
        self.push("l", vec![to.0.into(), self.flip(to.1).into()]);
        self.push("S", vec![]);
    }

    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Rgb) {
        self.push("rg", color.operands());
        self.push(
            "re",
            vec![x.into(), self.flip(y + height).into(), width.into(), height.into()],
        );
        self.push("f", vec![]);
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, line_width: f32, color: Rgb) {
        self.push("w", vec![line_width.into()]);
        self.push("RG", color.operands());
        self.push(
            "re",
            vec![x.into(), self.flip(y + height).into(), width.into(), height.into()],
        );
        self.push("S", vec![]);
    }

    /// Paints a registered image XObject into the given box.
    pub fn image(&mut self, name: &str, x: f32, y: f32, width: f32, height: f32) {
        self.push("q", vec![]);
        self.push(
            "cm",
            vec![
                width.into(),
                0.into(),
                0.into(),
                height.into(),
                x.into(),
                self.flip(y + height).into(),
            ],
        );
        self.push("Do", vec![Object::Name(name.as_bytes().to_vec())]);
        self.push("Q", vec![]);
    }

    pub fn finish(self) -> Content {
        self.content
    }
}

impl Default for PageCanvas {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_flipped_to_pdf_space() {
        let mut canvas = PageCanvas::new();
        canvas.text("Oi", 40.0, 60.0, Font::Regular, 18.0, Rgb::BRAND);
        let content = canvas.finish();

        let td = content
            .operations
            .iter()
            .find(|op| op.operator == "Td")
            .unwrap();
        assert_eq!(td.operands[0].as_float().unwrap(), 40.0);
        assert!((td.operands[1].as_float().unwrap() - (PAGE_HEIGHT - 60.0)).abs() < 1e-3);
    }
}
