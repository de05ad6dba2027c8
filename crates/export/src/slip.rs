//! Consent slip layout: one bordered card per record, each on its own page.

use storage::models::{Mask, StoredAthlete};

use crate::canvas::{PAGE_WIDTH, PageCanvas, Rgb};
use crate::document::PdfDocument;
use crate::error::Result;
use crate::format;
use crate::header::{MARGIN_X, draw_header};
use crate::metrics::{Font, text_width, wrap};

pub const TITLE: &str = "Bilhete de Autorização";

pub const CONSENT: &str = "Declaro, na qualidade de responsável legal, que autorizo o(a) atleta \
acima identificado(a) a participar dos treinos, competições e demais atividades promovidas pela \
equipe, estando ciente das condições da prática esportiva e responsabilizando-me pelas \
informações prestadas.";

pub const SIGNATURE_CAPTION: &str = "Assinatura do Responsável";
pub const DATE_CAPTION: &str = "Data";

const CARD_INSET: f32 = 10.0;
const CARD_TOP: f32 = 10.0;

const LABEL_X: f32 = 50.0;
const VALUE_X: f32 = 200.0;
const RIGHT_EDGE: f32 = PAGE_WIDTH - 50.0;
const FIELDS_TOP: f32 = 105.0;
const FIELD_SIZE: f32 = 11.0;
const FIELD_SPACING: f32 = 20.0;
const PARAGRAPH_GAP: f32 = 15.0;
const PARAGRAPH_LEADING: f32 = 15.0;
const SIGNATURE_GAP: f32 = 60.0;
const CAPTION_SIZE: f32 = 10.0;
const MAX_VALUE_LINES: usize = 3;
const ELLIPSIS: &str = "...";

fn fields(athlete: &StoredAthlete) -> [(&'static str, String); 7] {
    let record = &athlete.record;
    [
        ("Nome", format::text(record.name())),
        ("CPF", format::masked(record.tax_id(), Mask::TaxId)),
        ("Data de Nascimento", format::date(record.birth_date())),
        ("Idade", record.age().to_string()),
        (
            "Responsável Legal",
            format::text(record.guardian_name().unwrap_or_default()),
        ),
        (
            "CPF do Responsável",
            format::masked(record.guardian_tax_id().unwrap_or_default(), Mask::TaxId),
        ),
        ("Telefone", format::masked(record.phone(), Mask::Phone)),
    ]
}

/// Wraps `value` into at most [`MAX_VALUE_LINES`] lines, ending a cut value
/// with an ellipsis.
fn value_lines(value: &str, width: f32) -> Vec<String> {
    let mut lines = wrap(value, Font::Regular, FIELD_SIZE, width);
    if lines.len() <= MAX_VALUE_LINES {
        return lines;
    }

    lines.truncate(MAX_VALUE_LINES);
    if let Some(last) = lines.last_mut() {
        while !last.is_empty()
            && text_width(&format!("{}{}", last, ELLIPSIS), Font::Regular, FIELD_SIZE) > width
        {
            last.pop();
        }
        last.push_str(ELLIPSIS);
    }
    lines
}

fn draw_signature(canvas: &mut PageCanvas, from: f32, to: f32, y: f32, caption: &str) {
    canvas.line((from, y), (to, y), 0.5, Rgb::BLACK);
    let x = from + (to - from - text_width(caption, Font::Regular, CAPTION_SIZE)) / 2.0;
    canvas.text(caption, x, y + 14.0, Font::Regular, CAPTION_SIZE, Rgb::TEXT);
}

/// Draws one card and returns the y of its bottom border.
fn draw_slip(canvas: &mut PageCanvas, athlete: &StoredAthlete, has_logo: bool) -> f32 {
    draw_header(canvas, TITLE, has_logo);

    let value_width = RIGHT_EDGE - VALUE_X;
    let mut y = FIELDS_TOP;
    for (label, value) in fields(athlete) {
        canvas.text(label, LABEL_X, y, Font::Bold, FIELD_SIZE, Rgb::TEXT);
        let lines = value_lines(&value, value_width);
        for (k, line) in lines.iter().enumerate() {
            let baseline = y + k as f32 * PARAGRAPH_LEADING;
            canvas.text(line, VALUE_X, baseline, Font::Regular, FIELD_SIZE, Rgb::BLACK);
        }
        y += FIELD_SPACING + (lines.len() - 1) as f32 * PARAGRAPH_LEADING;
    }

    y += PARAGRAPH_GAP;
    for line in wrap(CONSENT, Font::Regular, FIELD_SIZE, RIGHT_EDGE - LABEL_X) {
        canvas.text(&line, LABEL_X, y, Font::Regular, FIELD_SIZE, Rgb::BLACK);
        y += PARAGRAPH_LEADING;
    }

    y += SIGNATURE_GAP;
    let middle = PAGE_WIDTH / 2.0;
    draw_signature(canvas, LABEL_X, middle + 40.0, y, SIGNATURE_CAPTION);
    draw_signature(canvas, middle + 70.0, RIGHT_EDGE, y, DATE_CAPTION);

    let card_bottom = y + 30.0;
    canvas.stroke_rect(
        MARGIN_X - CARD_INSET,
        CARD_TOP,
        PAGE_WIDTH - 2.0 * (MARGIN_X - CARD_INSET),
        card_bottom - CARD_TOP,
        1.0,
        Rgb::BORDER,
    );
    card_bottom
}

/// One page per record. An empty list produces no pages.
pub fn render(document: &mut PdfDocument, records: &[StoredAthlete], has_logo: bool) -> Result<()> {
    for athlete in records {
        let mut canvas = PageCanvas::new();
        draw_slip(&mut canvas, athlete, has_logo);
        document.add_page(canvas.finish())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use storage::models::{AthleteRecord, GuardianConsent};
    use uuid::Uuid;

    use super::*;
    use crate::canvas::PAGE_HEIGHT;

    fn minor() -> StoredAthlete {
        StoredAthlete {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            record: AthleteRecord::GuardianConsent(GuardianConsent {
                name: "Ana".to_string(),
                birth_date: NaiveDate::from_ymd_opt(2012, 3, 9),
                age: 12,
                guardian_name: "Maria".to_string(),
                guardian_phone: "81999998888".to_string(),
                minor_tax_id: "12345678900".to_string(),
                guardian_tax_id: "98765432100".to_string(),
            }),
        }
    }

    #[test]
    fn test_fields_are_formatted() {
        let values: Vec<String> = fields(&minor()).into_iter().map(|(_, v)| v).collect();
        assert_eq!(
            values,
            [
                "Ana",
                "123.456.789-00",
                "09/03/2012",
                "12",
                "Maria",
                "987.654.321-00",
                "(81) 99999-8888",
            ]
        );
    }

    #[test]
    fn test_one_page_per_record() {
        let mut document = PdfDocument::new();
        render(&mut document, &[minor(), minor(), minor()], false).unwrap();
        assert_eq!(document.page_count(), 3);
    }

    #[test]
    fn test_long_values_are_cut_with_an_ellipsis() {
        let lines = value_lines(&"Maria ".repeat(300), RIGHT_EDGE - VALUE_X);
        assert_eq!(lines.len(), MAX_VALUE_LINES);
        assert!(lines[2].ends_with(ELLIPSIS));
        assert!(text_width(&lines[2], Font::Regular, FIELD_SIZE) <= RIGHT_EDGE - VALUE_X);

        assert_eq!(value_lines("Ana", RIGHT_EDGE - VALUE_X), ["Ana"]);
    }

    #[test]
    fn test_card_fits_the_page_with_long_values() {
        let mut athlete = minor();
        if let AthleteRecord::GuardianConsent(g) = &mut athlete.record {
            g.name = "x".repeat(3200);
            g.guardian_name = "Maria ".repeat(500);
        }

        let mut canvas = PageCanvas::new();
        let bottom = draw_slip(&mut canvas, &athlete, true);
        assert!(bottom < PAGE_HEIGHT - CARD_TOP);
    }
}
