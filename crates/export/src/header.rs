use crate::canvas::{PAGE_WIDTH, PageCanvas, Rgb};
use crate::metrics::Font;

pub const MARGIN_X: f32 = 40.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN_X;

const HEADER_Y: f32 = 30.0;
pub const LOGO_SIZE: f32 = 60.0;
const TITLE_SIZE: f32 = 18.0;
const TITLE_GAP: f32 = 80.0;

/// XObject name the logo is registered under.
pub const LOGO_RESOURCE: &str = "Logo";

pub fn logo_y() -> f32 {
    HEADER_Y - 10.0
}

pub fn title_x(has_logo: bool) -> f32 {
    if has_logo { MARGIN_X + TITLE_GAP } else { MARGIN_X }
}

pub fn title_baseline() -> f32 {
    HEADER_Y + 30.0
}

pub fn divider_y() -> f32 {
    HEADER_Y + 45.0
}

/// Logo, title and divider rule shared by every page of both styles.
pub fn draw_header(canvas: &mut PageCanvas, title: &str, has_logo: bool) {
    if has_logo {
        canvas.image(LOGO_RESOURCE, MARGIN_X, logo_y(), LOGO_SIZE, LOGO_SIZE);
    }
    canvas.text(
        title,
        title_x(has_logo),
        title_baseline(),
        Font::Regular,
        TITLE_SIZE,
        Rgb::BRAND,
    );
    canvas.line(
        (MARGIN_X, divider_y()),
        (PAGE_WIDTH - MARGIN_X, divider_y()),
        0.5,
        Rgb::DIVIDER,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_geometry() {
        assert_eq!(logo_y(), 20.0);
        assert_eq!(title_x(true), 120.0);
        assert_eq!(title_x(false), 40.0);
        assert_eq!(title_baseline(), 60.0);
        assert_eq!(divider_y(), 75.0);
    }

    #[test]
    fn test_header_without_logo_draws_no_image() {
        let mut canvas = PageCanvas::new();
        draw_header(&mut canvas, "Lista de Atletas", false);
        let content = canvas.finish();
        assert!(!content.operations.iter().any(|op| op.operator == "Do"));
    }
}
