//! "Our Projects": slides up over the partners

use realest_core::{Color, Document, NodeId, Property};

use super::{text, SlideOver};
use crate::section::SectionSpec;

pub const NAME: &str = "projects";
pub const ROOT: &str = "data-projects";
pub const SPACER: &str = "data-projects-spacer";
pub const TITLE: &str = "data-projects-title";
pub const ITEM: &str = "data-project-item";

pub const PROJECTS: [(&str, &str); 4] = [
    ("Project Alpha", "Revolutionary AI-powered healthcare platform"),
    ("Project Beta", "Sustainable energy distribution network"),
    ("Project Gamma", "Next-generation education technology"),
    ("Project Delta", "Urban mobility transformation"),
];

const SLIDE: SlideOver = SlideOver {
    name: NAME,
    root: ROOT,
    spacer: SPACER,
    title: TITLE,
    item: ITEM,
    background: 0x2D3561,
    item_offset: (Property::X, -50.0),
    item_scale: 0.95,
    stagger: 0.2,
};

pub fn build(doc: &mut Document, parent: NodeId, top: f32) -> f32 {
    let (_, _, grid) = SLIDE.build(doc, parent, top, "Our Projects");
    for (name, description) in PROJECTS {
        let item = doc.create_element(grid, "div", &[ITEM]);
        doc.author_style(
            item,
            Property::BackgroundColor,
            Color::from_hex(0xFFFCE1).with_alpha(0.1).into(),
        );
        let heading = text(doc, item, "h3", &[], name);
        doc.author_style(heading, Property::Color, Color::from_hex(0xFFFCE1).into());
        let body = text(doc, item, "p", &[], description);
        doc.author_style(body, Property::Color, Color::from_hex(0xB8C5DB).into());
    }
    top + doc.viewport().height
}

pub fn spec() -> SectionSpec {
    SLIDE.spec()
}
