/*!
 * End-to-end tests for the open → translate → assemble → save pipeline
 */

use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use docxlate::app_config::BatchingPolicy;
use docxlate::app_controller::Controller;
use docxlate::errors::{AppError, OpenError, TranslationError};
use docxlate::providers::mock::{MockBehavior, MockProvider};
use crate::common::{self, paragraph_xml, DocxBuilder};

fn to_english(text: &str, _target: &str) -> String {
    match text {
        "Hola" => "Hello".to_string(),
        "mundo" => "world".to_string(),
        other => format!("EN({})", other),
    }
}

#[tokio::test]
async fn test_run_withSinglePlainParagraph_shouldWriteOneRow() -> Result<()> {
    common::init_test_logging();
    let dir = common::create_temp_dir()?;
    let input = DocxBuilder::new()
        .paragraph(None, false, &[("Hola", false)])
        .write(&dir.path().join("input.docx"))?;
    let provider = Arc::new(MockProvider::working().with_custom_response(to_english));

    let controller = Controller::with_config(common::config_in(dir.path())).without_progress();
    let summary = controller.run(&input, provider, &CancellationToken::new()).await?;

    assert_eq!(summary.paragraphs, 1);
    assert_eq!(summary.runs, 1);
    let rows = common::read_rows(&summary.output_path)?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0.text(), "Hola");
    assert_eq!(rows[0].1.text(), "Hello");
    assert!(!rows[0].0.runs[0].properties.bold);
    assert!(!rows[0].1.runs[0].properties.bold);
    Ok(())
}

#[tokio::test]
async fn test_run_withBoldParagraph_shouldOnlyBoldLeftCell() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = DocxBuilder::new()
        .paragraph(Some("Heading1"), true, &[("Hola", false), ("mundo", true)])
        .write(&dir.path().join("input.docx"))?;
    let provider = Arc::new(MockProvider::working().with_custom_response(to_english));

    let controller = Controller::with_config(common::config_in(dir.path())).without_progress();
    let summary = controller.run(&input, provider, &CancellationToken::new()).await?;

    let rows = common::read_rows(&summary.output_path)?;
    let (left, right) = &rows[0];
    assert_eq!(left.style, "Heading1");
    assert_eq!(right.style, "Heading1");
    assert_eq!(left.runs.iter().map(|r| r.properties.bold).collect::<Vec<_>>(), vec![true, true]);
    assert_eq!(right.runs.iter().map(|r| r.properties.bold).collect::<Vec<_>>(), vec![false, true]);
    assert_eq!(right.text(), "Helloworld");
    Ok(())
}

#[tokio::test]
async fn test_run_withEmptyAndBlankParagraphs_shouldSkipThem() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = DocxBuilder::new()
        .text("uno")
        .raw("<w:p/>")
        .paragraph(None, false, &[("   ", false)])
        .text("dos")
        .write(&dir.path().join("input.docx"))?;
    let provider = Arc::new(MockProvider::working());

    let controller = Controller::with_config(common::config_in(dir.path())).without_progress();
    let summary = controller.run(&input, provider.clone(), &CancellationToken::new()).await?;

    assert_eq!(summary.paragraphs, 2);
    assert_eq!(provider.request_count(), 2);
    let rows = common::read_rows(&summary.output_path)?;
    assert_eq!(rows.iter().map(|(l, _)| l.text()).collect::<Vec<_>>(), vec!["uno", "dos"]);
    Ok(())
}

#[tokio::test]
async fn test_run_withStructuredBlocks_shouldAppendTheirRowsAfterBody() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = DocxBuilder::new()
        .sdt(&[paragraph_xml(None, false, &[("bloque", false)])])
        .text("cuerpo")
        .write(&dir.path().join("input.docx"))?;

    let controller = Controller::with_config(common::config_in(dir.path())).without_progress();
    let summary = controller
        .run(&input, Arc::new(MockProvider::working()), &CancellationToken::new())
        .await?;

    let rows = common::read_rows(&summary.output_path)?;
    assert_eq!(rows.iter().map(|(l, _)| l.text()).collect::<Vec<_>>(), vec!["cuerpo", "bloque"]);
    assert_eq!(rows[1].1.text(), "[en] bloque");
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingInput_shouldFailBeforeTranslating() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = common::config_in(dir.path());
    let output = config.output_path.clone();
    let provider = Arc::new(MockProvider::working());

    let controller = Controller::with_config(config).without_progress();
    let result = controller
        .run(dir.path().join("missing.docx"), provider.clone(), &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(AppError::Open(OpenError::NotFound(_)))));
    assert_eq!(provider.request_count(), 0);
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withFailureOnLaterParagraph_shouldWriteNothing() -> Result<()> {
    common::init_test_logging();
    let dir = common::create_temp_dir()?;
    let input = DocxBuilder::new()
        .text("uno")
        .text("dos")
        .text("tres")
        .write(&dir.path().join("input.docx"))?;
    let config = common::config_in(dir.path());
    let output = config.output_path.clone();
    let provider = Arc::new(MockProvider::new(MockBehavior::FailOnCall { call: 3 }));

    let controller = Controller::with_config(config).without_progress();
    let result = controller.run(&input, provider.clone(), &CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(AppError::Translation(TranslationError::Provider(_)))
    ));
    assert_eq!(provider.request_count(), 3);
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withInvalidTargetLanguage_shouldFailWithLanguageConfig() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = DocxBuilder::new().text("Hola").write(&dir.path().join("input.docx"))?;
    let mut config = common::config_in(dir.path());
    config.target_language = "zz".to_string();
    let provider = Arc::new(MockProvider::working());

    let controller = Controller::with_config(config).without_progress();
    let result = controller.run(&input, provider.clone(), &CancellationToken::new()).await;

    assert!(matches!(result, Err(AppError::LanguageConfig(_))));
    assert_eq!(provider.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_run_withCancelledToken_shouldFailAndWriteNothing() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = DocxBuilder::new().text("Hola").write(&dir.path().join("input.docx"))?;
    let config = common::config_in(dir.path());
    let output = config.output_path.clone();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let controller = Controller::with_config(config).without_progress();
    let result = controller.run(&input, Arc::new(MockProvider::working()), &cancel).await;

    assert!(matches!(result, Err(AppError::Translation(TranslationError::Cancelled))));
    assert!(!output.exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withSlowProvider_shouldTimeOut() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = DocxBuilder::new().text("Hola").write(&dir.path().join("input.docx"))?;
    let mut config = common::config_in(dir.path());
    for provider in config.translation.available_providers.iter_mut() {
        provider.timeout_secs = 1;
    }
    let provider = Arc::new(MockProvider::new(MockBehavior::Slow { delay_ms: 3_000 }));

    let controller = Controller::with_config(config).without_progress();
    let result = controller.run(&input, provider, &CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(AppError::Translation(TranslationError::Timeout { secs: 1 }))
    ));
    Ok(())
}

#[tokio::test]
async fn test_run_twiceOnSameInput_shouldProduceIdenticalFiles() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = DocxBuilder::new()
        .paragraph(Some("Title"), true, &[("Informe", false)])
        .paragraph(None, false, &[("Hola", false), (" ", false), ("mundo", true)])
        .write(&dir.path().join("input.docx"))?;
    let controller = Controller::with_config(common::config_in(dir.path())).without_progress();

    let first = controller
        .run(&input, Arc::new(MockProvider::working()), &CancellationToken::new())
        .await?;
    let first_bytes = std::fs::read(&first.output_path)?;
    let second = controller
        .run(&input, Arc::new(MockProvider::working()), &CancellationToken::new())
        .await?;
    let second_bytes = std::fs::read(&second.output_path)?;

    assert_eq!(first_bytes, second_bytes);
    Ok(())
}

#[tokio::test]
async fn test_run_documentBatching_shouldMatchParagraphBatchingOutput() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let input = DocxBuilder::new()
        .text("uno")
        .paragraph(None, true, &[("dos", false), ("tres", true)])
        .text("cuatro")
        .write(&dir.path().join("input.docx"))?;

    let per_paragraph_dir = dir.path().join("paragraph");
    let document_dir = dir.path().join("document");
    std::fs::create_dir_all(&per_paragraph_dir)?;
    std::fs::create_dir_all(&document_dir)?;

    let per_paragraph = Arc::new(MockProvider::working());
    Controller::with_config(common::config_in(&per_paragraph_dir))
        .without_progress()
        .run(&input, per_paragraph.clone(), &CancellationToken::new())
        .await?;

    let mut config = common::config_in(&document_dir);
    config.translation.batching = BatchingPolicy::Document;
    let coalesced = Arc::new(MockProvider::working());
    Controller::with_config(config)
        .without_progress()
        .run(&input, coalesced.clone(), &CancellationToken::new())
        .await?;

    assert_eq!(per_paragraph.request_count(), 3);
    assert_eq!(coalesced.request_count(), 1);
    assert_eq!(
        std::fs::read(per_paragraph_dir.join("document-output.docx"))?,
        std::fs::read(document_dir.join("document-output.docx"))?
    );
    Ok(())
}

#[tokio::test]
async fn test_run_withSourceStyles_shouldCopyStylesPart() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let styles = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:styleId="Heading1"/></w:styles>"#;
    let input = DocxBuilder::new()
        .paragraph(Some("Heading1"), false, &[("Hola", false)])
        .with_styles(styles)
        .write(&dir.path().join("input.docx"))?;

    let controller = Controller::with_config(common::config_in(dir.path())).without_progress();
    let summary = controller
        .run(&input, Arc::new(MockProvider::working()), &CancellationToken::new())
        .await?;

    let output = docxlate::DocumentReader::open(&summary.output_path)?;
    assert_eq!(output.styles.as_deref(), Some(styles));
    Ok(())
}
