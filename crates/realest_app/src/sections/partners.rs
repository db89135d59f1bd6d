//! "Our Trusted Partners": slides up over the journey

use realest_core::{Color, Document, NodeId, Property};

use super::{text, SlideOver};
use crate::section::SectionSpec;

pub const NAME: &str = "partners";
pub const ROOT: &str = "data-partners";
pub const SPACER: &str = "data-partners-spacer";
pub const TITLE: &str = "data-partners-title";
pub const ITEM: &str = "data-partner-item";

pub const PARTNERS: [&str; 6] = [
    "Acme Corp",
    "TechVentures",
    "Innovation Labs",
    "Future Systems",
    "Digital Pioneers",
    "NextGen Capital",
];

const SLIDE: SlideOver = SlideOver {
    name: NAME,
    root: ROOT,
    spacer: SPACER,
    title: TITLE,
    item: ITEM,
    background: 0x1A4D2E,
    item_offset: (Property::Y, 50.0),
    item_scale: 0.9,
    stagger: 0.15,
};

pub fn build(doc: &mut Document, parent: NodeId, top: f32) -> f32 {
    let (_, _, grid) = SLIDE.build(doc, parent, top, "Our Trusted Partners");
    for partner in PARTNERS {
        let item = text(doc, grid, "div", &[ITEM], partner);
        doc.author_style(item, Property::Color, Color::from_hex(0xA8D5BA).into());
    }
    top + doc.viewport().height
}

pub fn spec() -> SectionSpec {
    SLIDE.spec()
}
