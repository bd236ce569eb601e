use lopdf::Document;
use std::path::Path;
use tracing::debug;

use super::{ExtractError, catch_panic};

/// Extract text from a PDF file, page by page.
///
/// Each page with text becomes a `--- Page <n> ---` section; pages without
/// text are left out but keep their number. Any parser error fails the
/// whole document.
pub fn extract(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    // lopdf can panic on malformed streams
    let pages = catch_panic(|| extract_pages(&bytes))?;

    Ok(join_pages(pages))
}

/// Load a PDF from memory and pull the text of every page, in page order
fn extract_pages(bytes: &[u8]) -> Result<Vec<(u32, String)>, ExtractError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let mut pages = Vec::new();
    for page_number in doc.get_pages().into_keys() {
        let text = doc
            .extract_text(&[page_number])
            .map_err(|e| ExtractError::Pdf(format!("page {}: {}", page_number, e)))?;
        debug!(page = page_number, chars = text.len(), "extracted PDF page");
        pages.push((page_number, text));
    }

    Ok(pages)
}

/// Join page texts under `--- Page <n> ---` markers, skipping blank pages
fn join_pages(pages: Vec<(u32, String)>) -> String {
    pages
        .into_iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(number, text)| {
            format!("--- Page {} ---\n{}", number, text.trim_end_matches(['\r', '\n']))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};

    /// Write a PDF with one page per entry; an empty entry gives a page without text
    pub(crate) fn write_pdf(path: &Path, pages: &[&str]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let operations = if text.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_join_pages_numbers_and_skips_blank() {
        let joined = join_pages(vec![
            (1, "First page\n".to_string()),
            (2, "   \n".to_string()),
            (3, "Third page".to_string()),
        ]);
        assert_eq!(joined, "--- Page 1 ---\nFirst page\n--- Page 3 ---\nThird page");
    }

    #[test]
    fn test_join_pages_keeps_page_text_layout() {
        let joined = join_pages(vec![(1, "    indented\n  trailing  \n".to_string())]);
        assert_eq!(joined, "--- Page 1 ---\n    indented\n  trailing  ");
    }

    #[test]
    fn test_join_pages_all_blank_is_empty() {
        assert_eq!(join_pages(vec![(1, String::new()), (2, "\n".to_string())]), "");
    }

    #[test]
    fn test_extract_single_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.pdf");
        write_pdf(&path, &["World"]);

        let text = extract(&path).unwrap();
        assert!(text.starts_with("--- Page 1 ---\n"));
        assert!(text.contains("World"));
    }

    #[test]
    fn test_extract_keeps_physical_page_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gaps.pdf");
        write_pdf(&path, &["Alpha", "", "Gamma"]);

        let text = extract(&path).unwrap();
        assert!(text.contains("--- Page 1 ---"));
        assert!(!text.contains("--- Page 2 ---"));
        assert!(text.contains("--- Page 3 ---"));
        assert!(text.find("Alpha").unwrap() < text.find("Gamma").unwrap());
    }

    #[test]
    fn test_extract_no_text_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        write_pdf(&path, &[""]);

        assert_eq!(extract(&path).unwrap(), "");
    }

    #[test]
    fn test_extract_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pdf");
        std::fs::write(&path, b"%PDF-1.4\nnot really a pdf").unwrap();

        assert!(extract(&path).is_err());
    }
}
