// src/services/document_service.rs

use std::io::BufWriter;
use std::path::PathBuf;

use genpdf::{elements, style, Element};
use image::{DynamicImage, GenericImageView, ImageOutputFormat, Luma};
use printpdf::{ColorBits, ColorSpace, Image, ImageFilter, ImageXObject, Mm, PdfDocument, Px};
use qrcode::QrCode;

use crate::{common::error::AppError, models::booking::Booking};

/// Placeholder de campos vazios no documento.
pub const PLACEHOLDER: &str = "N/A";

// A4 em milímetros
const A4_WIDTH_MM: u64 = 210;
const A4_HEIGHT_MM: u64 = 297;
// Qualidade das faixas JPEG do PDF rasterizado
const RASTER_JPEG_QUALITY: u8 = 85;

#[derive(Clone)]
pub struct DocumentService {
    fonts_dir: PathBuf,
    font_family: String,
    company_name: String,
}

impl DocumentService {
    pub fn new(fonts_dir: impl Into<PathBuf>, font_family: &str, company_name: &str) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            font_family: font_family.to_string(),
            company_name: company_name.to_string(),
        }
    }

    fn new_document(&self, title: String, margins: i32) -> Result<genpdf::Document, AppError> {
        // Carrega a fonte da pasta configurada
        let fonts = genpdf::fonts::from_files(&self.fonts_dir, &self.font_family, None).map_err(|e| {
            AppError::Document(format!(
                "font '{}' not found in {}: {}",
                self.font_family,
                self.fonts_dir.display(),
                e
            ))
        })?;

        let mut doc = genpdf::Document::new(fonts);
        doc.set_title(title);
        doc.set_paper_size(genpdf::PaperSize::A4);
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(margins);
        doc.set_page_decorator(decorator);
        Ok(doc)
    }

    /// Confirmação da reserva montada no servidor: cabeçalho, dados, equipe,
    /// caminhões, materiais e um QR code com o link de compartilhamento.
    pub fn confirmation_pdf(&self, booking: &Booking, share_link: Option<&str>) -> Result<Vec<u8>, AppError> {
        let number = booking.booking_id.as_deref().unwrap_or(PLACEHOLDER);
        let mut doc = self.new_document(format!("Booking {}", number), 10)?;

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new(self.company_name.as_str())
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Break::new(1));
        doc.push(
            elements::Paragraph::new(format!("BOOKING CONFIRMATION #{}", number))
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Break::new(1.5));

        // --- DADOS DA RESERVA ---
        let mut details = elements::TableLayout::new(vec![1, 2]);
        details.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
        let bold = style::Style::new().bold();
        for (label, value) in confirmation_rows(booking) {
            details
                .row()
                .element(elements::Paragraph::new(label).styled(bold))
                .element(elements::Paragraph::new(value))
                .push()
                .map_err(|e| AppError::Document(e.to_string()))?;
        }
        doc.push(details);

        // --- ALOCAÇÕES ---
        let crew: Vec<Vec<String>> = booking
            .labours
            .iter()
            .map(|l| vec![name_or_id(&l.staff_name, l.staff), text_or_na(l.hours.map(|h| h.to_string()))])
            .collect();
        push_section(&mut doc, "Crew", &["Staff", "Hours"], crew)?;

        let trucks: Vec<Vec<String>> = booking
            .trucks
            .iter()
            .map(|t| vec![name_or_id(&t.truck_name, t.truck), t.quantity.to_string()])
            .collect();
        push_section(&mut doc, "Trucks", &["Truck", "Quantity"], trucks)?;

        let materials: Vec<Vec<String>> = booking
            .materials
            .iter()
            .map(|m| vec![name_or_id(&m.material_name, m.material), m.quantity.to_string()])
            .collect();
        push_section(&mut doc, "Materials", &["Material", "Quantity"], materials)?;

        // --- QR CODE ---
        if let Some(link) = share_link {
            doc.push(elements::Break::new(2));
            doc.push(elements::Paragraph::new("Scan to share this confirmation").styled(bold));

            let code = QrCode::new(link.as_bytes()).map_err(|e| AppError::Document(e.to_string()))?;
            let image_buffer = code.render::<Luma<u8>>().build();
            let qr = elements::Image::from_dynamic_image(DynamicImage::ImageLuma8(image_buffer))
                .map_err(|e| AppError::Document(e.to_string()))?
                .with_scale(genpdf::Scale::new(0.5, 0.5));
            doc.push(qr);
        }

        render(doc)
    }

    /// Recebe a captura da página (PNG/JPEG) e corta em faixas A4, uma por página.
    /// Cada faixa vai para o PDF como JPEG (`DCTDecode`), ocupando a largura toda.
    pub fn raster_pdf(&self, image_bytes: &[u8], title: &str) -> Result<Vec<u8>, AppError> {
        let capture = image::load_from_memory(image_bytes)
            .map_err(|e| AppError::InvalidImage(e.to_string()))?;
        let (width, _) = capture.dimensions();

        let page_width = Mm(A4_WIDTH_MM as f64);
        let page_height = Mm(A4_HEIGHT_MM as f64);
        // 1px da captura = 210mm / largura
        let dpi = f64::from(width.max(1)) * 25.4 / A4_WIDTH_MM as f64;

        let bands = slice_raster(&capture);
        let count = bands.len();
        let (doc, first_page, first_layer) = PdfDocument::new(title, page_width, page_height, "capture");

        for (index, band) in bands.iter().enumerate() {
            let (page, layer) = if index == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(page_width, page_height, "capture")
            };
            let xobject = jpeg_band(band)?;
            // Origem do PDF é o canto inferior esquerdo; a faixa fica colada no topo.
            let band_height = Mm(xobject.height.0 as f64 * 25.4 / dpi);
            Image::from(xobject).add_to_layer(
                doc.get_page(page).get_layer(layer),
                Some(Mm(0.0)),
                Some(Mm(page_height.0 - band_height.0)),
                None,
                None,
                None,
                Some(dpi),
            );
        }

        let mut writer = BufWriter::new(Vec::new());
        doc.save(&mut writer).map_err(|e| AppError::Document(e.to_string()))?;
        let buffer = writer.into_inner().map_err(|e| AppError::Document(e.to_string()))?;

        tracing::debug!(
            "PDF rasterizado: {} página(s) de uma imagem {}px de largura, {} bytes",
            count,
            width,
            buffer.len()
        );
        Ok(buffer)
    }
}

/// Faixa como JPEG RGB, pronta para `DCTDecode`. O canal alfa é descartado.
fn jpeg_band(band: &DynamicImage) -> Result<ImageXObject, AppError> {
    let rgb = DynamicImage::ImageRgb8(band.to_rgb8());
    let mut jpeg = Vec::new();
    rgb.write_to(&mut jpeg, ImageOutputFormat::Jpeg(RASTER_JPEG_QUALITY))
        .map_err(|e| AppError::Document(e.to_string()))?;

    let (width, height) = rgb.dimensions();
    Ok(ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: jpeg,
        image_filter: Some(ImageFilter::DCT),
        clipping_bbox: None,
    })
}

fn render(doc: genpdf::Document) -> Result<Vec<u8>, AppError> {
    // Renderiza para buffer em memória; nada é gravado se falhar
    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(|e| AppError::Document(e.to_string()))?;
    Ok(buffer)
}

fn push_section(
    doc: &mut genpdf::Document,
    title: &str,
    headers: &[&str; 2],
    rows: Vec<Vec<String>>,
) -> Result<(), AppError> {
    doc.push(elements::Break::new(1.5));
    doc.push(elements::Paragraph::new(title).styled(style::Style::new().bold().with_font_size(12)));

    if rows.is_empty() {
        doc.push(elements::Paragraph::new(PLACEHOLDER));
        return Ok(());
    }

    let mut table = elements::TableLayout::new(vec![3, 1]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
    let bold = style::Style::new().bold();
    table
        .row()
        .element(elements::Paragraph::new(headers[0]).styled(bold))
        .element(elements::Paragraph::new(headers[1]).styled(bold))
        .push()
        .map_err(|e| AppError::Document(e.to_string()))?;

    for row in rows {
        let mut cells = table.row();
        for cell in row {
            cells = cells.element(elements::Paragraph::new(cell));
        }
        cells.push().map_err(|e| AppError::Document(e.to_string()))?;
    }
    doc.push(table);
    Ok(())
}

// =============================================================================
//  CONTEÚDO
// =============================================================================

fn text_or_na(value: Option<String>) -> String {
    value.filter(|v| !v.trim().is_empty()).unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn name_or_id(name: &Option<String>, id: i64) -> String {
    name.clone().filter(|n| !n.trim().is_empty()).unwrap_or_else(|| format!("#{}", id))
}

/// Linhas "rótulo: valor" da confirmação. Campos nulos viram `N/A`.
pub fn confirmation_rows(booking: &Booking) -> Vec<(&'static str, String)> {
    vec![
        ("Booking", text_or_na(booking.booking_id.clone())),
        ("Customer", text_or_na(booking.customer_name.clone())),
        ("Phone", text_or_na(booking.customer_phone.clone())),
        ("Email", text_or_na(booking.customer_email.clone())),
        ("Move date", text_or_na(booking.move_date.map(|d| d.format("%d/%m/%Y").to_string()))),
        ("Start time", text_or_na(booking.start_time.map(|t| t.format("%H:%M").to_string()))),
        ("Origin", text_or_na(booking.origin.clone())),
        ("Destination", text_or_na(booking.destination.clone())),
        ("Status", text_or_na(booking.status.clone())),
        ("Estimated volume", text_or_na(booking.estimated_volume.map(|v| format!("{} cbm", v)))),
        ("Supervisor", text_or_na(booking.supervisor_name.clone())),
        ("Notes", text_or_na(booking.notes.clone())),
    ]
}

pub fn confirmation_filename(booking: &Booking) -> String {
    let number = booking
        .booking_id
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Confirmation");
    format!("Booking_{}.pdf", number)
}

pub fn share_message(booking: &Booking, company_name: &str) -> String {
    let customer = text_or_na(booking.customer_name.clone());
    let number = text_or_na(booking.booking_id.clone());
    let date = text_or_na(booking.move_date.map(|d| d.format("%d/%m/%Y").to_string()));
    let origin = text_or_na(booking.origin.clone());
    let destination = text_or_na(booking.destination.clone());

    format!(
        "Hello {}, your booking {} is confirmed for {}.\nFrom: {}\nTo: {}\nThank you for choosing {}.",
        customer, number, date, origin, destination, company_name
    )
}

/// `https://wa.me/<dígitos>?text=<mensagem>`. Telefone sem dígitos é erro.
pub fn whatsapp_link(phone: &str, message: &str) -> Result<String, AppError> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(AppError::MissingPhone);
    }
    Ok(format!("https://wa.me/{}?text={}", digits, urlencoding::encode(message)))
}

// =============================================================================
//  PAGINAÇÃO DA IMAGEM
// =============================================================================

/// Faixas `(y, altura)` em pixels. A imagem é escalada para a largura A4,
/// então cada página comporta `largura * 297 / 210` pixels de altura.
pub fn page_bands(width: u32, height: u32) -> Vec<(u32, u32)> {
    if width == 0 || height == 0 {
        return vec![(0, height)];
    }
    let (w, h) = (u64::from(width), u64::from(height));
    let pages = (h * A4_WIDTH_MM).div_ceil(w * A4_HEIGHT_MM).max(1);

    (0..pages)
        .map(|i| {
            let start = i * w * A4_HEIGHT_MM / A4_WIDTH_MM;
            let end = ((i + 1) * w * A4_HEIGHT_MM / A4_WIDTH_MM).min(h);
            // Valores cabem em u32: ambos são limitados por `height`
            (start as u32, (end - start) as u32)
        })
        .collect()
}

pub fn slice_raster(capture: &DynamicImage) -> Vec<DynamicImage> {
    let (width, height) = capture.dimensions();
    page_bands(width, height)
        .into_iter()
        .map(|(y, band_height)| capture.crop_imm(0, y, width, band_height))
        .collect()
}
