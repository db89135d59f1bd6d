//! About the firm; not animated

use realest_core::{Document, NodeId};

use super::{place, text};

pub const ROOT: &str = "data-about";

pub const HEADING: &str = "About The Realest";
pub const BODY: &str = "We invest at the intersection of craft and impact. Our thesis centers \
on human\u{2011}centric products that elevate everyday life \u{2014} pairing principled capital \
with hands\u{2011}on support in brand, product, and go\u{2011}to\u{2011}market.";

pub fn build(doc: &mut Document, parent: NodeId, top: f32) -> f32 {
    let height = doc.viewport().height * 0.6;
    let root = doc.create_element(parent, "section", &[ROOT]);
    place(doc, root, top, height);
    text(doc, root, "h2", &[], HEADING);
    text(doc, root, "p", &[], BODY);
    top + height
}
