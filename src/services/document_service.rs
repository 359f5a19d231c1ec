// src/services/document_service.rs

use genpdf::{Element, elements, style};
use image::Luma;
use qrcode::QrCode;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AssistanceRepository,
    models::assistance::Assistance,
    services::store::AssistanceStore,
};

/// Folha de serviço em PDF: o documento que o administrador imprime e
/// entrega ao fornecedor, com o QR code a apontar para o portal
/// tokenizado — quem tem o papel tem o acesso.
#[derive(Clone)]
pub struct DocumentService {
    repo: AssistanceRepository,
    portal_base_url: String,
    fonts_dir: String,
}

impl DocumentService {
    pub fn new(repo: AssistanceRepository, portal_base_url: String, fonts_dir: String) -> Self {
        Self { repo, portal_base_url, fonts_dir }
    }

    pub fn portal_link(&self, assistance: &Assistance) -> String {
        format!(
            "{}/fornecedor?action=portal&token={}",
            self.portal_base_url.trim_end_matches('/'),
            assistance.acceptance_token
        )
    }

    pub async fn generate_service_order_pdf(&self, id: Uuid) -> Result<Vec<u8>, AppError> {
        // 1. Busca os dados
        let assistance = self.repo.find_by_id(id).await?.ok_or(AppError::NotFound)?;
        let (building, supplier) = self.repo.display_names(&assistance).await?;

        // 2. Configura o PDF
        // Carrega a fonte da pasta de fontes (Roboto por padrão)
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, "Roboto", None)
            .map_err(|_| {
                AppError::FontNotFound(format!("Fonte não encontrada em {}", self.fonts_dir))
            })?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Assistência #{}", assistance.display_id));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new(format!("FOLHA DE SERVIÇO #{}", assistance.display_id))
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Criada em: {}",
            assistance.created_at.format("%d/%m/%Y")
        )));
        doc.push(elements::Break::new(1.5));

        // --- DADOS DA ASSISTÊNCIA ---
        doc.push(
            elements::Paragraph::new(format!("Tipo: {}", assistance.intervention_type))
                .styled(style::Style::new().bold()),
        );
        if let Some(building) = building {
            doc.push(elements::Paragraph::new(format!("Edifício: {}", building)));
        }
        if let Some(supplier) = supplier {
            doc.push(elements::Paragraph::new(format!("Fornecedor: {}", supplier)));
        }
        doc.push(elements::Paragraph::new(format!("Estado: {}", assistance.status)));
        if let Some(scheduled) = assistance.scheduled_datetime {
            doc.push(elements::Paragraph::new(format!(
                "Visita marcada: {}",
                scheduled.format("%d/%m/%Y %H:%M")
            )));
        }
        doc.push(elements::Break::new(1));
        doc.push(elements::Paragraph::new(assistance.description.clone()));
        doc.push(elements::Break::new(2));

        // --- ACESSO AO PORTAL (QR CODE) ---
        doc.push(
            elements::Paragraph::new("ACESSO DO FORNECEDOR")
                .styled(style::Style::new().bold().with_font_size(12)),
        );
        doc.push(elements::Paragraph::new(
            "Aponte a câmara para abrir o portal desta assistência:",
        ));
        doc.push(elements::Break::new(1));

        let link = self.portal_link(&assistance);
        let code = QrCode::new(link.as_bytes())
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        // Renderiza para imagem
        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

        let pdf_image = genpdf::elements::Image::from_dynamic_image(dynamic_image)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?
            .with_scale(genpdf::Scale::new(0.5, 0.5));

        doc.push(pdf_image);

        // 3. Renderiza para buffer em memória
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;

        Ok(buffer)
    }
}
