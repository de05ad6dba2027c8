//! Roster layout: a single striped table across as many pages as needed.
//!
//! Layout runs in two passes. Rows are measured and assigned to pages first
//! so the footer can print the final page count on every page.

use std::ops::Range;

use storage::models::{Mask, StoredAthlete};

use crate::canvas::{PAGE_HEIGHT, PAGE_WIDTH, PageCanvas, Rgb};
use crate::document::PdfDocument;
use crate::error::Result;
use crate::format;
use crate::header::{CONTENT_WIDTH, MARGIN_X, draw_header};
use crate::metrics::{Font, longest_word_width, text_width, wrap};

pub const TITLE: &str = "Lista de Atletas";

pub const COLUMNS: [&str; 12] = [
    "Nome",
    "CPF",
    "Data Nasc.",
    "Idade",
    "Altura",
    "Peso",
    "Endereço",
    "Número",
    "Cidade",
    "Estado",
    "CEP",
    "Telefone",
];

const FONT_SIZE: f32 = 8.0;
const PADDING: f32 = 4.0;
const LINE_HEIGHT: f32 = FONT_SIZE * 1.15;
pub const TABLE_TOP: f32 = 100.0;
const TABLE_BOTTOM: f32 = PAGE_HEIGHT - 50.0;

const FOOTER_SIZE: f32 = 10.0;
const FOOTER_OFFSET: f32 = 30.0;

type Cells = [String; COLUMNS.len()];
type Widths = [f32; COLUMNS.len()];

fn cells(athlete: &StoredAthlete) -> Cells {
    let record = &athlete.record;
    let address = record.as_self_registration();
    let optional = |value: Option<&str>| format::text(value.unwrap_or_default());

    [
        format::text(record.name()),
        format::masked(record.tax_id(), Mask::TaxId),
        format::date(record.birth_date()),
        record.age().to_string(),
        format::decimal(address.and_then(|a| a.height)),
        format::decimal(address.and_then(|a| a.weight)),
        optional(address.map(|a| a.street.as_str())),
        optional(address.map(|a| a.house_number.as_str())),
        optional(address.map(|a| a.city.as_str())),
        optional(address.map(|a| a.state.as_str())),
        address
            .map(|a| format::masked(&a.postal_code, Mask::PostalCode))
            .unwrap_or_else(|| format::MISSING.to_string()),
        format::masked(record.phone(), Mask::Phone),
    ]
}

/// Sizes every column to its content, then fits the table between the
/// margins. Columns shrink towards their longest word before any word has
/// to be broken.
fn column_widths(rows: &[Cells]) -> Widths {
    let mut natural: Widths = COLUMNS.map(|head| text_width(head, Font::Bold, FONT_SIZE));
    let mut minimum: Widths = COLUMNS.map(|head| longest_word_width(head, Font::Bold, FONT_SIZE));

    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            natural[i] = natural[i].max(text_width(cell, Font::Regular, FONT_SIZE));
            minimum[i] = minimum[i].max(longest_word_width(cell, Font::Regular, FONT_SIZE));
        }
    }

    fit(
        natural.map(|w| w + 2.0 * PADDING),
        minimum.map(|w| w + 2.0 * PADDING),
        CONTENT_WIDTH,
    )
}

fn fit(natural: Widths, minimum: Widths, available: f32) -> Widths {
    let natural_total: f32 = natural.iter().sum();
    if natural_total <= available {
        let scale = available / natural_total;
        return natural.map(|w| w * scale);
    }

    let minimum_total: f32 = minimum.iter().sum();
    if minimum_total >= available {
        let scale = available / minimum_total;
        return minimum.map(|w| w * scale);
    }

    let slack = available - minimum_total;
    let flexible = natural_total - minimum_total;
    let mut widths = minimum;
    for (i, width) in widths.iter_mut().enumerate() {
        *width += (natural[i] - minimum[i]) / flexible * slack;
    }
    widths
}

struct Row {
    lines: Vec<Vec<String>>,
    line_count: usize,
}

impl Row {
    fn measure<'a>(cells: impl Iterator<Item = &'a str>, widths: &Widths, font: Font) -> Self {
        let lines: Vec<Vec<String>> = cells
            .zip(widths)
            .map(|(cell, width)| wrap(cell, font, FONT_SIZE, width - 2.0 * PADDING))
            .collect();
        let line_count = lines.iter().map(Vec::len).max().unwrap_or(1).max(1);

        Self { lines, line_count }
    }

    fn height(&self) -> f32 {
        block_height(self.line_count)
    }
}

fn block_height(lines: usize) -> f32 {
    lines as f32 * LINE_HEIGHT + 2.0 * PADDING
}

/// Wrapped lines that fit between `top` and the bottom of the table.
fn lines_below(top: f32) -> usize {
    ((TABLE_BOTTOM - top - 2.0 * PADDING) / LINE_HEIGHT).floor().max(0.0) as usize
}

/// The part of one body row drawn on a page.
#[derive(Debug, Clone, PartialEq)]
struct Slice {
    row: usize,
    lines: Range<usize>,
}

impl Slice {
    fn height(&self) -> f32 {
        block_height(self.lines.len())
    }
}

/// Splits body rows into pages. A row that fits on a fresh page is never
/// split. A row taller than a whole page is cut between wrapped lines and
/// continues under the repeated head row.
fn paginate(head_height: f32, rows: &[Row]) -> Vec<Vec<Slice>> {
    let body_top = TABLE_TOP + head_height;
    let page_capacity = lines_below(body_top).max(1);

    let mut pages: Vec<Vec<Slice>> = vec![Vec::new()];
    let mut y = body_top;

    for (i, row) in rows.iter().enumerate() {
        let mut start = 0;
        while start < row.line_count {
            let remaining = row.line_count - start;
            let on_fresh_page = y <= body_top;
            let mut room = lines_below(y);

            if remaining > room && !on_fresh_page && (remaining <= page_capacity || room == 0) {
                pages.push(Vec::new());
                y = body_top;
                continue;
            }
            if on_fresh_page {
                room = page_capacity;
            }

            let end = start + remaining.min(room);
            let slice = Slice {
                row: i,
                lines: start..end,
            };
            y += slice.height();
            if let Some(page) = pages.last_mut() {
                page.push(slice);
            }
            start = end;

            if start < row.line_count {
                pages.push(Vec::new());
                y = body_top;
            }
        }
    }

    pages
}

fn draw_row(
    canvas: &mut PageCanvas,
    row: &Row,
    lines: Range<usize>,
    widths: &Widths,
    top: f32,
    head: bool,
) {
    let (font, color) = if head {
        (Font::Bold, Rgb::WHITE)
    } else {
        (Font::Regular, Rgb::TEXT)
    };

    let mut x = MARGIN_X;
    for (cell, width) in row.lines.iter().zip(widths) {
        let visible = cell.iter().enumerate().skip(lines.start).take(lines.len());
        for (k, line) in visible {
            let offset = (k - lines.start) as f32 * LINE_HEIGHT;
            let baseline = top + PADDING + offset + FONT_SIZE;
            let line_x = if head {
                x + (width - text_width(line, font, FONT_SIZE)) / 2.0
            } else {
                x + PADDING
            };
            canvas.text(line, line_x, baseline, font, FONT_SIZE, color);
        }
        x += width;
    }
}

pub fn footer_text(page: usize, total: usize) -> String {
    format!("Página {} de {}", page, total)
}

fn draw_footer(canvas: &mut PageCanvas, page: usize, total: usize) {
    let text = footer_text(page, total);
    let x = PAGE_WIDTH - MARGIN_X - text_width(&text, Font::Regular, FOOTER_SIZE);
    canvas.text(
        &text,
        x,
        PAGE_HEIGHT - FOOTER_OFFSET,
        Font::Regular,
        FOOTER_SIZE,
        Rgb::FOOTER,
    );
}

pub fn render(document: &mut PdfDocument, records: &[StoredAthlete], has_logo: bool) -> Result<()> {
    let body: Vec<Cells> = records.iter().map(cells).collect();
    let widths = column_widths(&body);

    let head = Row::measure(COLUMNS.iter().copied(), &widths, Font::Bold);
    let rows: Vec<Row> = body
        .iter()
        .map(|cells| Row::measure(cells.iter().map(String::as_str), &widths, Font::Regular))
        .collect();

    let head_height = head.height();
    let pages = paginate(head_height, &rows);
    let total = pages.len();

    for (page_index, slices) in pages.into_iter().enumerate() {
        let mut canvas = PageCanvas::new();
        draw_header(&mut canvas, TITLE, has_logo);

        canvas.fill_rect(MARGIN_X, TABLE_TOP, CONTENT_WIDTH, head_height, Rgb::BRAND);
        draw_row(&mut canvas, &head, 0..head.line_count, &widths, TABLE_TOP, true);

        let mut y = TABLE_TOP + head_height;
        for slice in slices {
            let height = slice.height();
            if slice.row % 2 == 1 {
                canvas.fill_rect(MARGIN_X, y, CONTENT_WIDTH, height, Rgb::STRIPE);
            }
            draw_row(&mut canvas, &rows[slice.row], slice.lines, &widths, y, false);
            y += height;
        }

        draw_footer(&mut canvas, page_index + 1, total);
        document.add_page(canvas.finish())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths_fill_the_content_area() {
        let widths = column_widths(&[]);
        let total: f32 = widths.iter().sum();
        assert!((total - CONTENT_WIDTH).abs() < 0.01);
    }

    #[test]
    fn test_long_cells_are_squeezed_to_fit() {
        let mut row: Cells = Default::default();
        row[6] = "Rua ".repeat(200);
        let widths = column_widths(&[row]);
        let total: f32 = widths.iter().sum();
        assert!((total - CONTENT_WIDTH).abs() < 0.01);
        assert!(widths[6] > widths[9]);
    }

    fn rows(line_counts: &[usize]) -> Vec<Row> {
        line_counts
            .iter()
            .map(|&line_count| Row {
                lines: vec![],
                line_count,
            })
            .collect()
    }

    fn assert_within_table(head_height: f32, pages: &[Vec<Slice>]) {
        for page in pages {
            let used: f32 = page.iter().map(Slice::height).sum();
            assert!(TABLE_TOP + head_height + used <= TABLE_BOTTOM + 0.01);
        }
    }

    #[test]
    fn test_empty_table_is_one_page() {
        assert_eq!(paginate(20.0, &[]), vec![Vec::<Slice>::new()]);
    }

    #[test]
    fn test_rows_spill_onto_new_pages() {
        let rows = rows(&[1; 100]);
        let pages = paginate(20.0, &rows);

        assert!(pages.len() > 1);
        let order: Vec<usize> = pages.iter().flatten().map(|slice| slice.row).collect();
        assert_eq!(order, (0..100).collect::<Vec<_>>());
        assert!(pages.iter().flatten().all(|slice| slice.lines == (0..1)));
        assert_within_table(20.0, &pages);
    }

    #[test]
    fn test_row_that_fits_a_page_moves_whole() {
        let capacity = lines_below(TABLE_TOP + 20.0);
        let rows = rows(&[capacity - 2, 5]);
        let pages = paginate(20.0, &rows);

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1], vec![Slice { row: 1, lines: 0..5 }]);
    }

    #[test]
    fn test_oversized_row_continues_on_next_pages() {
        let capacity = lines_below(TABLE_TOP + 20.0);
        let rows = rows(&[3, capacity * 2 + 10]);
        let pages = paginate(20.0, &rows);

        assert_eq!(pages.len(), 3);
        let lines: Vec<Range<usize>> = pages
            .iter()
            .flatten()
            .filter(|slice| slice.row == 1)
            .map(|slice| slice.lines.clone())
            .collect();
        assert_eq!(lines.first().map(|r| r.start), Some(0));
        assert_eq!(lines.last().map(|r| r.end), Some(capacity * 2 + 10));
        for pair in lines.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_within_table(20.0, &pages);
    }

    #[test]
    fn test_footer_text() {
        assert_eq!(footer_text(2, 3), "Página 2 de 3");
    }
}
