use std::path::Path;

use lopdf::{Document, Object, ObjectId};

use crate::error::ScrubError;
use crate::page_range::PageSet;
use crate::pdf::placeholder;

/// How selected pages leave the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrubMode {
    /// Remove the page entirely; later pages close the gap.
    Delete,
    /// Swap the page for a placeholder of identical size.
    Redact,
}

/// US Letter, used when a page resolves no /MediaBox at all.
const FALLBACK_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Guard against cyclic /Parent chains in malformed files.
const MAX_TREE_DEPTH: usize = 16;

pub struct PdfDocument {
    pub doc: Document,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ScrubError> {
        let path = path.as_ref();
        let doc = Document::load(path).map_err(|source| ScrubError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(PdfDocument { doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// 1-indexed page numbers with their object IDs, in document order.
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        self.doc.get_pages().into_iter().collect()
    }

    /// Page size in points from /MediaBox, walking /Parent for the inherited
    /// attribute when the page itself carries none.
    pub fn page_size(&self, page_id: ObjectId) -> (f32, f32) {
        let mut current = page_id;
        for _ in 0..MAX_TREE_DEPTH {
            let dict = match self.doc.get_object(current).and_then(|obj| obj.as_dict()) {
                Ok(dict) => dict,
                Err(_) => break,
            };
            if let Ok(media_box) = dict.get(b"MediaBox") {
                if let Some(size) = self.media_box_size(media_box) {
                    return size;
                }
            }
            match dict.get(b"Parent") {
                Ok(Object::Reference(parent)) => current = *parent,
                _ => break,
            }
        }
        FALLBACK_PAGE_SIZE
    }

    fn media_box_size(&self, media_box: &Object) -> Option<(f32, f32)> {
        // The attribute may itself be an indirect reference.
        let media_box = match media_box {
            Object::Reference(id) => self.doc.get_object(*id).ok()?,
            direct => direct,
        };
        let rect = media_box.as_array().ok()?;
        if rect.len() != 4 {
            return None;
        }

        let mut sides = [0.0f32; 4];
        for (side, obj) in sides.iter_mut().zip(rect) {
            *side = match obj {
                Object::Integer(i) => *i as f32,
                Object::Real(r) => *r,
                _ => return None,
            };
        }
        Some(((sides[2] - sides[0]).abs(), (sides[3] - sides[1]).abs()))
    }

    /// Produce a new document with the selected pages deleted or replaced.
    /// Indices past the last page are ignored; the source document is left
    /// untouched.
    pub fn scrub(&self, targets: &PageSet, mode: ScrubMode) -> Result<Document, ScrubError> {
        let mut scrubbed = self.doc.clone();

        match mode {
            ScrubMode::Delete => {
                let doomed: Vec<u32> = self
                    .page_ids()
                    .into_iter()
                    .filter(|(number, _)| targets.contains((number - 1) as usize))
                    .map(|(number, _)| number)
                    .collect();
                if !doomed.is_empty() {
                    scrubbed.delete_pages(&doomed);
                }
            }
            ScrubMode::Redact => {
                for (number, page_id) in self.page_ids() {
                    if !targets.contains((number - 1) as usize) {
                        continue;
                    }
                    let (width, height) = self.page_size(page_id);
                    let rendered = placeholder::render(width, height);
                    graft_placeholder(&mut scrubbed, page_id, width, height, &rendered)?;
                }
            }
        }

        // Drop everything only the removed pages referenced, so scrubbed
        // content does not linger in the output file.
        scrubbed.prune_objects();
        Ok(scrubbed)
    }

    /// Save to a file.
    pub fn save<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<(), ScrubError> {
        let path = path.as_ref();
        doc.save(path).map_err(|source| ScrubError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }
}

/// Replace the page object at `page_id` with the single page of the rendered
/// placeholder document, pulling the placeholder's resources in with it.
/// Replacing in place keeps the page-tree order and count intact.
fn graft_placeholder(
    doc: &mut Document,
    page_id: ObjectId,
    width: f32,
    height: f32,
    rendered: &[u8],
) -> Result<(), ScrubError> {
    let stamp = Document::load_mem(rendered)
        .map_err(|err| ScrubError::Placeholder(format!("rendered page does not parse: {err}")))?;
    let stamp_page_id = match stamp.get_pages().into_values().next() {
        Some(id) => id,
        None => {
            return Err(ScrubError::Placeholder(
                "rendered document has no pages".to_string(),
            ))
        }
    };
    let stamp_page = stamp
        .get_object(stamp_page_id)
        .map_err(|err| ScrubError::Placeholder(format!("rendered page unreadable: {err}")))?;

    // The replacement takes the original page's slot in the tree, so it also
    // takes over its /Parent link.
    let parent = doc
        .get_object(page_id)
        .ok()
        .and_then(|obj| obj.as_dict().ok())
        .and_then(|dict| dict.get(b"Parent").ok())
        .cloned();

    let mut page_dict = match import_object(doc, &stamp, stamp_page) {
        Object::Dictionary(dict) => dict,
        other => {
            return Err(ScrubError::Placeholder(format!(
                "rendered page is not a dictionary: {other:?}"
            )))
        }
    };
    if let Some(parent) = parent {
        page_dict.set("Parent", parent);
    }
    // printpdf sized the page in millimetres; force the exact box.
    page_dict.set(
        "MediaBox",
        vec![0.into(), 0.into(), Object::Real(width), Object::Real(height)],
    );

    doc.objects.insert(page_id, Object::Dictionary(page_dict));
    Ok(())
}

/// Recursively copy an object from `source` into `doc`, allocating new IDs
/// for everything an indirect reference points at. /Parent links are skipped
/// so the page-tree cycle is not followed; the caller re-links the page.
fn import_object(doc: &mut Document, source: &Document, object: &Object) -> Object {
    match object {
        Object::Reference(id) => match source.get_object(*id) {
            Ok(referenced) => {
                let imported = import_object(doc, source, referenced);
                Object::Reference(doc.add_object(imported))
            }
            // Dangling reference in the rendered document; drop it.
            Err(_) => Object::Null,
        },
        Object::Array(items) => Object::Array(
            items
                .iter()
                .map(|item| import_object(doc, source, item))
                .collect(),
        ),
        Object::Dictionary(dict) => Object::Dictionary(import_dictionary(doc, source, dict)),
        Object::Stream(stream) => Object::Stream(lopdf::Stream::new(
            import_dictionary(doc, source, &stream.dict),
            stream.content.clone(),
        )),
        other => other.clone(),
    }
}

fn import_dictionary(
    doc: &mut Document,
    source: &Document,
    dict: &lopdf::Dictionary,
) -> lopdf::Dictionary {
    let mut imported = lopdf::Dictionary::new();
    for (key, value) in dict.iter() {
        if key == b"Parent" {
            continue;
        }
        imported.set(key.clone(), import_object(doc, source, value));
    }
    imported
}

/// Build an in-memory document with one page per entry, sized in points.
/// Each page carries a small text stream naming its original position.
#[cfg(test)]
pub(crate) fn sample_document(page_sizes: &[(f32, f32)]) -> Document {
    use lopdf::dictionary;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for (i, &(width, height)) in page_sizes.iter().enumerate() {
        let text = format!("BT /F1 12 Tf (page {i}) Tj ET");
        let content_id = doc.add_object(Object::Stream(lopdf::Stream::new(
            lopdf::Dictionary::new(),
            text.into_bytes(),
        )));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), Object::Real(width), Object::Real(height)],
            "Contents" => content_id,
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
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_range::PageSet;
    use lopdf::dictionary;

    fn distinct_sizes(n: usize) -> Vec<(f32, f32)> {
        (0..n)
            .map(|i| (100.0 + i as f32, 200.0 + i as f32))
            .collect()
    }

    fn page_sizes(doc: &Document) -> Vec<(f32, f32)> {
        let wrapper = PdfDocument { doc: doc.clone() };
        wrapper
            .page_ids()
            .into_iter()
            .map(|(_, id)| wrapper.page_size(id))
            .collect()
    }

    fn any_stream_contains(doc: &Document, needle: &[u8]) -> bool {
        doc.objects.values().any(|obj| match obj {
            Object::Stream(stream) => stream
                .content
                .windows(needle.len())
                .any(|window| window == needle),
            _ => false,
        })
    }

    /// Like `any_stream_contains`, but inflates filtered streams first.
    /// printpdf compresses the placeholder's content stream.
    fn any_decoded_stream_contains(doc: &Document, needle: &[u8]) -> bool {
        doc.objects.values().any(|obj| match obj {
            Object::Stream(stream) => {
                let content = if stream.dict.get(b"Filter").is_ok() {
                    match stream.decompressed_content() {
                        Ok(decoded) => decoded,
                        Err(_) => stream.content.clone(),
                    }
                } else {
                    stream.content.clone()
                };
                content.windows(needle.len()).any(|window| window == needle)
            }
            _ => false,
        })
    }

    #[test]
    fn test_delete_removes_selected_pages_in_order() {
        let sizes = distinct_sizes(10);
        let doc = PdfDocument {
            doc: sample_document(&sizes),
        };
        let targets = PageSet::parse("2,5-7").unwrap();

        let scrubbed = doc.scrub(&targets, ScrubMode::Delete).unwrap();

        // Pages 2, 5, 6, 7 gone; survivors keep their relative order.
        let expected: Vec<(f32, f32)> = [0usize, 2, 3, 7, 8, 9]
            .iter()
            .map(|&i| sizes[i])
            .collect();
        assert_eq!(page_sizes(&scrubbed), expected);
    }

    #[test]
    fn test_delete_prunes_removed_content() {
        let doc = PdfDocument {
            doc: sample_document(&distinct_sizes(3)),
        };
        let targets = PageSet::parse("2").unwrap();

        let scrubbed = doc.scrub(&targets, ScrubMode::Delete).unwrap();
        assert!(!any_stream_contains(&scrubbed, b"(page 1)"));
        assert!(any_stream_contains(&scrubbed, b"(page 0)"));
        assert!(any_stream_contains(&scrubbed, b"(page 2)"));
    }

    #[test]
    fn test_redact_keeps_count_and_exact_geometry() {
        let sizes = vec![(612.0, 792.0), (842.0, 595.0), (300.0, 500.0)];
        let doc = PdfDocument {
            doc: sample_document(&sizes),
        };
        let targets = PageSet::parse("2").unwrap();

        let scrubbed = doc.scrub(&targets, ScrubMode::Redact).unwrap();
        assert_eq!(page_sizes(&scrubbed), sizes);
    }

    #[test]
    fn test_redact_end_to_end_mixed_sizes() {
        let mut sizes = distinct_sizes(10);
        sizes[4] = (842.0, 595.0); // landscape page among portraits
        let doc = PdfDocument {
            doc: sample_document(&sizes),
        };
        let targets = PageSet::parse("2,5-7").unwrap();

        let scrubbed = doc.scrub(&targets, ScrubMode::Redact).unwrap();
        assert_eq!(page_sizes(&scrubbed), sizes);

        // Original content survives exactly on the pages that were kept.
        for i in 0..10usize {
            let marker = format!("(page {i})");
            let kept = ![1, 4, 5, 6].contains(&i);
            assert_eq!(
                any_stream_contains(&scrubbed, marker.as_bytes()),
                kept,
                "page {i}"
            );
        }
    }

    #[test]
    fn test_empty_set_copies_document() {
        let sizes = distinct_sizes(3);
        let doc = PdfDocument {
            doc: sample_document(&sizes),
        };

        for mode in [ScrubMode::Delete, ScrubMode::Redact] {
            let scrubbed = doc.scrub(&PageSet::default(), mode).unwrap();
            assert_eq!(page_sizes(&scrubbed), sizes);
            assert!(any_stream_contains(&scrubbed, b"(page 2)"));
        }
    }

    #[test]
    fn test_redact_replaces_content() {
        let doc = PdfDocument {
            doc: sample_document(&[(612.0, 792.0), (612.0, 792.0)]),
        };
        let targets = PageSet::parse("1").unwrap();

        let scrubbed = doc.scrub(&targets, ScrubMode::Redact).unwrap();
        assert_eq!(PdfDocument { doc: scrubbed.clone() }.page_count(), 2);
        assert!(!any_stream_contains(&scrubbed, b"(page 0)"));
        assert!(any_stream_contains(&scrubbed, b"(page 1)"));
        // The grafted page carries the label text.
        assert!(any_decoded_stream_contains(
            &scrubbed,
            placeholder::LABEL.as_bytes()
        ));
    }

    #[test]
    fn test_out_of_range_targets_ignored() {
        let doc = PdfDocument {
            doc: sample_document(&distinct_sizes(3)),
        };
        let targets: PageSet = [0, 999].into_iter().collect();

        let scrubbed = doc.scrub(&targets, ScrubMode::Delete).unwrap();
        let wrapper = PdfDocument { doc: scrubbed };
        assert_eq!(wrapper.page_count(), 2);
    }

    #[test]
    fn test_no_matching_pages_changes_nothing() {
        let sizes = distinct_sizes(3);
        let doc = PdfDocument {
            doc: sample_document(&sizes),
        };
        let targets: PageSet = [7, 8].into_iter().collect();

        for mode in [ScrubMode::Delete, ScrubMode::Redact] {
            let scrubbed = doc.scrub(&targets, mode).unwrap();
            assert_eq!(page_sizes(&scrubbed), sizes);
            assert!(any_stream_contains(&scrubbed, b"(page 0)"));
        }
    }

    #[test]
    fn test_delete_all_pages_yields_empty_document() {
        let doc = PdfDocument {
            doc: sample_document(&distinct_sizes(3)),
        };
        let targets = PageSet::parse("1-3").unwrap();

        let scrubbed = doc.scrub(&targets, ScrubMode::Delete).unwrap();
        assert_eq!(scrubbed.get_pages().len(), 0);
    }

    #[test]
    fn test_page_size_inherited_from_pages_node() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1i64,
                "MediaBox" => vec![0.into(), 0.into(), Object::Real(842.0), Object::Real(595.0)],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let wrapper = PdfDocument { doc };
        assert_eq!(wrapper.page_size(page_id), (842.0, 595.0));
    }

    #[test]
    fn test_page_size_falls_back_to_letter() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let wrapper = PdfDocument { doc };
        assert_eq!(wrapper.page_size(page_id), (612.0, 792.0));
    }

    #[test]
    fn test_save_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scrubbed.pdf");

        let sizes = distinct_sizes(4);
        let doc = PdfDocument {
            doc: sample_document(&sizes),
        };
        let targets = PageSet::parse("2-3").unwrap();
        let mut scrubbed = doc.scrub(&targets, ScrubMode::Delete).unwrap();

        PdfDocument::save(&mut scrubbed, &path).unwrap();
        let reloaded = PdfDocument::open(&path).unwrap();
        assert_eq!(reloaded.page_count(), 2);
        assert_eq!(page_sizes(&reloaded.doc), vec![sizes[0], sizes[3]]);
    }

    #[test]
    fn test_open_missing_file_is_read_error() {
        assert!(matches!(
            PdfDocument::open("/nonexistent/nowhere.pdf"),
            Err(ScrubError::Read { .. })
        ));
    }

    #[test]
    fn test_save_to_missing_directory_is_write_error() {
        let mut doc = sample_document(&distinct_sizes(1));
        let err = PdfDocument::save(&mut doc, "/nonexistent/nowhere/out.pdf").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to write PDF /nonexistent/nowhere/out.pdf"
        );
        assert!(matches!(err, ScrubError::Write { .. }));
    }
}
