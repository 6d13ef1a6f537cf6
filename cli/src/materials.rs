//! Assembles ingest items from command-line file arguments.

use anyhow::{Context, Result};
use base64::Engine;
use scribe_domain::IngestItem;
use std::path::{Path, PathBuf};

/// Read the named files and build the ingest items for them. PDFs are
/// shipped base64-encoded; text files are shipped inline.
pub fn build_items(
    pdfs: &[PathBuf],
    texts: &[PathBuf],
    youtube_urls: &[String],
) -> Result<Vec<IngestItem>> {
    let mut items = Vec::new();

    for path in pdfs {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        items.push(IngestItem::pdf(file_name(path), encoded));
    }

    for path in texts {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        items.push(IngestItem::text(file_name(path), content));
    }

    for url in youtube_urls {
        items.push(IngestItem::youtube(url.clone(), None));
    }

    Ok(items)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_text_file_becomes_text_item() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"some notes")
            .unwrap();

        let items = build_items(&[], &[path], &[]).unwrap();
        assert_eq!(items, vec![IngestItem::text("notes.txt", "some notes")]);
    }

    #[test]
    fn test_pdf_file_is_base64_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"%PDF-1.4")
            .unwrap();

        let items = build_items(&[path], &[], &[]).unwrap();
        let IngestItem::Pdf { name, data_base64 } = &items[0] else {
            panic!("Expected a PDF item");
        };
        assert_eq!(name, "doc.pdf");
        assert_eq!(data_base64, "JVBERi0xLjQ=");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = build_items(&[PathBuf::from("/nonexistent/file.pdf")], &[], &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_youtube_urls_pass_through() {
        let items = build_items(
            &[],
            &[],
            &["https://youtube.com/watch?v=abc".to_string()],
        )
        .unwrap();
        assert_eq!(
            items,
            vec![IngestItem::youtube("https://youtube.com/watch?v=abc", None)]
        );
    }
}
