use std::path::Path;

use recibo::{rendering, Deductions, Receipt, RenderConfig};

fn sample_receipt() -> Receipt {
    serde_json::from_str(
        r#"{
            "receiptNumber": "REC-2026-00042",
            "payeeName": "Maria Souza",
            "payeeCpfCnpj": "123.456.789-00",
            "payeeCity": "Campinas",
            "payeeState": "SP",
            "eventName": "Festival de Inverno",
            "eventDate": "2026-09-12",
            "startTime": "18:00",
            "endTime": "22:00",
            "eventLocation": "Teatro Municipal",
            "city": "Campinas",
            "jobDescription": "sonorização e operação de mesa durante o evento",
            "value": "1.500,00",
            "valueInWords": "mil e quinhentos reais",
            "paymentMethod": "PIX",
            "purchaseOrder": "PO-77"
        }"#,
    )
    .unwrap()
}

#[tokio::test]
async fn renders_a_pdf_artifact_with_the_fixed_file_name() {
    let doc = rendering::render_receipt_pdf(&sample_receipt(), None, &RenderConfig::default())
        .await
        .unwrap();
    assert_eq!(doc.file_name, "recibo.pdf");
    assert!(doc.bytes.starts_with(b"%PDF"));
    assert!(doc.bytes.len() > 1_000);
}

#[tokio::test]
async fn broken_letterhead_path_is_non_fatal() {
    let doc = rendering::render_receipt_pdf(
        &sample_receipt(),
        Some(Path::new("/does/not/exist.png")),
        &RenderConfig::default(),
    )
    .await
    .unwrap();
    assert!(doc.bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn renders_with_a_real_letterhead_background() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timbrado.png");
    image::RgbaImage::from_pixel(3000, 2000, image::Rgba([240, 240, 255, 255]))
        .save(&path)
        .unwrap();

    let blank = rendering::render_receipt_pdf(&sample_receipt(), None, &RenderConfig::default())
        .await
        .unwrap();
    let with_bg =
        rendering::render_receipt_pdf(&sample_receipt(), Some(&path), &RenderConfig::default())
            .await
            .unwrap();
    // The embedded background raster has to show up in the artifact size.
    assert!(with_bg.bytes.len() > blank.bytes.len());
}

#[tokio::test]
async fn renders_with_deductions_and_long_description() {
    let mut receipt = sample_receipt();
    receipt.enable_taxes = true;
    receipt.taxes = Some(Deductions {
        iss: Some("50,00".to_string()),
        irrf: Some("20,00".to_string()),
        ..Deductions::default()
    });
    receipt.job_description = Some(
        "serviço de sonorização completa com montagem, passagem de som, \
operação durante todo o evento e desmontagem de equipamentos no encerramento"
            .to_string(),
    );

    let doc = rendering::render_receipt_pdf(&receipt, None, &RenderConfig::default())
        .await
        .unwrap();
    assert!(doc.bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn render_does_not_mutate_the_receipt() {
    let receipt = sample_receipt();
    let before = serde_json::to_string(&receipt).unwrap();
    let _ = rendering::render_receipt_pdf(&receipt, None, &RenderConfig::default())
        .await
        .unwrap();
    assert_eq!(serde_json::to_string(&receipt).unwrap(), before);
}
