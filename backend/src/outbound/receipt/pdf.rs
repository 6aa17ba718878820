//! Single-page PDF receipt written directly in PDF 1.4 syntax.
//!
//! The document uses the two standard Helvetica faces, so no fonts are
//! embedded. Text outside Latin-1 is replaced with `?`.

use std::fmt::Write as _;

use crate::domain::ports::{ReceiptContext, ReceiptRenderError, ReceiptRenderer};

const PAGE_WIDTH: u32 = 612;
const PAGE_HEIGHT: u32 = 792;
const MARGIN_LEFT: u32 = 50;

#[derive(Debug, Clone, Copy)]
enum Face {
    Regular,
    Bold,
}

impl Face {
    const fn resource(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }
}

/// Text drawing operations for one page, top to bottom.
#[derive(Debug)]
struct Page {
    ops: String,
    cursor: u32,
}

impl Page {
    fn new() -> Self {
        Self {
            ops: String::new(),
            cursor: PAGE_HEIGHT - 50,
        }
    }

    /// Move down by `gap` points, then draw `text` at the left margin.
    fn line(&mut self, gap: u32, face: Face, size: u32, text: &str) -> &mut Self {
        self.cursor = self.cursor.saturating_sub(gap);
        let y = self.cursor;
        self.text_at(y, face, size, text)
    }

    /// Draw `text` at a fixed height without moving the cursor.
    fn text_at(&mut self, y: u32, face: Face, size: u32, text: &str) -> &mut Self {
        let _ = writeln!(
            self.ops,
            "BT /{} {size} Tf {MARGIN_LEFT} {y} Td ({}) Tj ET",
            face.resource(),
            escape_text(text)
        );
        self
    }
}

/// Renders booking receipts as `application/pdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfReceiptRenderer;

impl PdfReceiptRenderer {
    fn layout(context: &ReceiptContext) -> Page {
        let ReceiptContext {
            booking,
            customer,
            car,
            issued_at,
        } = context;
        let details = &car.details;
        let mut page = Page::new();

        page.line(0, Face::Bold, 24, "CarShare")
            .line(25, Face::Regular, 14, "Booking Receipt")
            .line(45, Face::Bold, 12, &format!("Booking ID: {}", booking.id))
            .line(
                30,
                Face::Regular,
                10,
                &format!("Date: {}", issued_at.format("%B %d, %Y")),
            );

        page.line(40, Face::Bold, 14, "Customer Information")
            .line(25, Face::Regular, 10, &format!("Name: {}", customer.name()))
            .line(15, Face::Regular, 10, &format!("Email: {}", customer.email()));
        if let Some(phone) = customer.profile().phone.as_deref() {
            page.line(15, Face::Regular, 10, &format!("Phone: {phone}"));
        }

        page.line(40, Face::Bold, 14, "Car Information")
            .line(
                25,
                Face::Regular,
                10,
                &format!(
                    "Car: {} {} {}",
                    details.year(),
                    details.make(),
                    details.model()
                ),
            )
            .line(15, Face::Regular, 10, &format!("Color: {}", details.color()))
            .line(
                15,
                Face::Regular,
                10,
                &format!("Location: {}", details.location()),
            );

        let period = &booking.period;
        page.line(40, Face::Bold, 14, "Rental Details")
            .line(
                25,
                Face::Regular,
                10,
                &format!("Start Date: {}", period.start().format("%B %d, %Y %I:%M %p")),
            )
            .line(
                15,
                Face::Regular,
                10,
                &format!("End Date: {}", period.end().format("%B %d, %Y %I:%M %p")),
            )
            .line(
                15,
                Face::Regular,
                10,
                &format!("Rental Duration: {} day(s)", period.rental_days()),
            )
            .line(
                15,
                Face::Regular,
                10,
                &format!("Daily Rate: ${:.2}", details.price_per_day()),
            )
            .line(
                30,
                Face::Bold,
                12,
                &format!("Total Amount: ${:.2}", booking.terms.total_amount()),
            );

        page.text_at(50, Face::Regular, 8, "Thank you for choosing CarShare!")
            .text_at(35, Face::Regular, 8, "For support, contact us at support@carshare.com");
        page
    }
}

impl ReceiptRenderer for PdfReceiptRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, context: &ReceiptContext) -> Result<Vec<u8>, ReceiptRenderError> {
        let page = Self::layout(context);
        if page.ops.is_empty() {
            return Err(ReceiptRenderError::render("receipt has no content"));
        }
        Ok(write_document(&page.ops))
    }
}

/// Serialise a one-page document around `content` with a valid xref table.
fn write_document(content: &str) -> Vec<u8> {
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_owned(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_owned(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 5 0 R /F2 6 0 R >> >> /Contents 4 0 R >>"
        ),
        format!(
            "<< /Length {} >>\nstream\n{content}endstream",
            content.len()
        ),
        font("Helvetica"),
        font("Helvetica-Bold"),
    ];

    let mut out: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", index + 1).as_bytes());
    }

    let xref_at = out.len();
    let mut trailer = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(trailer, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        trailer,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    );
    out.extend_from_slice(trailer.as_bytes());
    out
}

fn font(base: &str) -> String {
    format!("<< /Type /Font /Subtype /Type1 /BaseFont /{base} /Encoding /WinAnsiEncoding >>")
}

/// Escape a PDF literal string. Non-ASCII Latin-1 becomes an octal escape.
fn escape_text(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            ' '..='~' => escaped.push(ch),
            '\u{a0}'..='\u{ff}' => {
                let _ = write!(escaped, "\\{:03o}", u32::from(ch));
            }
            _ => escaped.push('?'),
        }
    }
    escaped
}
