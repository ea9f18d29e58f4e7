//! PDF concatenation via `lopdf`.
//!
//! ## Why spawn_blocking?
//!
//! Loading and re-serialising PDFs is CPU- and disk-bound synchronous work.
//! Like rasterisation elsewhere, it runs on tokio's blocking pool so the
//! executor thread is never stalled.
//!
//! ## Page trees
//!
//! Every input is renumbered into a disjoint object-id range, its pages are
//! collected in page order, and one fresh flat `/Pages` node and `/Catalog`
//! are built on top. Inheritable attributes (`/Resources`, `/MediaBox`,
//! `/CropBox`, `/Rotate`) are copied down onto each page first, since the
//! intermediate page-tree nodes they lived on are dropped.
//!
//! The output is written to a temp file beside the target and persisted over
//! it only once serialisation finished; a failed merge leaves any previous
//! `<folder>.pdf` untouched and no partial file behind.

use crate::error::SubmissionError;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page-tree node types rebuilt from scratch rather than copied over.
const STRUCTURAL: [&[u8]; 5] = [b"Catalog", b"Pages", b"Page", b"Outlines", b"Outline"];

/// What ended up in the combined document.
#[derive(Debug, Clone, Default)]
pub struct MergeSummary {
    /// Pages in the written document.
    pub page_count: usize,
    /// Inputs whose pages were included, in order.
    pub merged: Vec<PathBuf>,
    /// Inputs that could not be parsed, with the parser's complaint.
    pub unreadable: Vec<(PathBuf, String)>,
}

/// Concatenate `inputs` (in order) into `output`, replacing it if present.
///
/// An empty `inputs` writes a valid zero-page document.
pub async fn merge_pdfs(
    inputs: &[PathBuf],
    output: &Path,
) -> Result<MergeSummary, SubmissionError> {
    let inputs = inputs.to_vec();
    let output_path = output.to_path_buf();

    tokio::task::spawn_blocking(move || merge_blocking(&inputs, &output_path))
        .await
        .map_err(|e| SubmissionError::Internal(format!("Merge task panicked: {}", e)))?
}

fn merge_blocking(inputs: &[PathBuf], output: &Path) -> Result<MergeSummary, SubmissionError> {
    let mut summary = MergeSummary::default();
    let mut documents = Vec::with_capacity(inputs.len());

    for path in inputs {
        match Document::load(path) {
            Ok(doc) => {
                documents.push(doc);
                summary.merged.push(path.clone());
            }
            Err(e) => {
                warn!(pdf = %path.display(), error = %e, "Skipping unreadable PDF");
                summary.unreadable.push((path.clone(), e.to_string()));
            }
        }
    }

    let (mut document, page_count) = concatenate(documents).map_err(|e| {
        SubmissionError::MergeFailed {
            path: output.to_path_buf(),
            detail: e.to_string(),
        }
    })?;
    summary.page_count = page_count;

    write_atomically(&mut document, output)?;
    debug!(
        output = %output.display(),
        inputs = summary.merged.len(),
        pages = page_count,
        "Merged PDF written"
    );
    Ok(summary)
}

/// Build one document holding every page of `documents`, in order.
fn concatenate(documents: Vec<Document>) -> Result<(Document, usize), lopdf::Error> {
    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        // get_pages() is keyed by page number, so this preserves page order.
        for (_, page_id) in doc.get_pages() {
            pages.push((page_id, flatten_page(&doc, page_id)?));
        }
        objects.extend(doc.objects);
    }

    let mut document = Document::with_version("1.5");
    for (id, object) in objects {
        let structural = type_name(&object).is_some_and(|t| STRUCTURAL.iter().any(|s| *s == t));
        if !structural {
            document.objects.insert(id, object);
        }
    }
    document.max_id = max_id;

    let pages_id = document.new_object_id();
    let page_count = pages.len();
    let mut kids = Vec::with_capacity(page_count);
    for (id, mut page) in pages {
        page.set("Parent", pages_id);
        document.objects.insert(id, Object::Dictionary(page));
        kids.push(Object::Reference(id));
    }

    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    document.renumber_objects();
    document.compress();
    Ok((document, page_count))
}

/// A page dictionary with inherited attributes made explicit.
fn flatten_page(doc: &Document, page_id: ObjectId) -> Result<Dictionary, lopdf::Error> {
    let mut page = doc.get_dictionary(page_id)?.clone();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(id) = parent {
        // Malformed trees can loop.
        depth += 1;
        if depth > 64 {
            break;
        }
        let node = doc.get_dictionary(id)?;
        for key in INHERITABLE {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    Ok(page)
}

fn type_name(object: &Object) -> Option<&[u8]> {
    object.as_dict().ok()?.get(b"Type").ok()?.as_name().ok()
}

fn write_atomically(document: &mut Document, output: &Path) -> Result<(), SubmissionError> {
    let write_err = |source| SubmissionError::OutputWriteFailed {
        path: output.to_path_buf(),
        source,
    };

    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".merge-")
        .suffix(".pdf.tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;

    document
        .save_to(&mut tmp)
        .map_err(|e| SubmissionError::MergeFailed {
            path: output.to_path_buf(),
            detail: e.to_string(),
        })?;

    // Dropping `tmp` on any error above removes it.
    tmp.persist(output).map_err(|e| write_err(e.error))?;
    Ok(())
}
