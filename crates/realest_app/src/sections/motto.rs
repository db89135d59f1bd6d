//! The firm's motto, scrubbed in as the section rises into view

use realest_animation::{
    Easing, Edge, Playback, Power, RangeEnd, RangeStart, ScrollTriggerSpec, Scrub, TimelineSpec,
    TriggerTarget, TweenSpec,
};
use realest_core::{Color, Document, Length, NodeId, Property};

use super::{place, text};
use crate::section::SectionSpec;

pub const NAME: &str = "motto";
pub const ROOT: &str = "data-motto";
pub const TEXT: &str = "data-motto-text";
pub const SUB: &str = "data-motto-sub";

pub const MOTTO: &str = "\"Invest in vision, build with purpose, grow with integrity.\"";
pub const COMMITMENT: &str = "Our commitment to founders who dare to make a difference.";

pub fn build(doc: &mut Document, parent: NodeId, top: f32) -> f32 {
    let height = doc.viewport().height;
    let root = doc.create_element(parent, "section", &[ROOT]);
    place(doc, root, top, height);
    doc.author_style(
        root,
        Property::BackgroundColor,
        Color::from_hex(0x6B2D5C).into(),
    );

    let quote = text(doc, root, "blockquote", &[TEXT], MOTTO);
    doc.author_style(quote, Property::Color, Color::from_hex(0xFFFCE1).into());
    let sub = text(doc, root, "p", &[SUB], COMMITMENT);
    doc.author_style(sub, Property::Color, Color::from_hex(0xD4A5D0).into());

    top + height
}

fn scrubbed(start: f32, end: f32) -> Playback {
    Playback::Scroll(
        ScrollTriggerSpec::new(TriggerTarget::Scope)
            .start(RangeStart::new(Edge::Top, Edge::Percent(start)))
            .end(RangeEnd::At(RangeStart::new(Edge::Top, Edge::Percent(end))))
            .scrub(Scrub::seconds(1.0)),
    )
}

pub fn spec() -> SectionSpec {
    SectionSpec::new(NAME, ROOT)
        .animate(
            TimelineSpec::new().add(
                TweenSpec::from_to(TEXT)
                    .range(Property::Opacity, 0.0, 1.0)
                    .range(Property::Scale, 0.9, 1.0)
                    .range(Property::Y, Length::px(80.0), Length::px(0.0))
                    .ease(Easing::Out(Power::P3)),
            ),
            scrubbed(70.0, 30.0),
        )
        .animate(
            TimelineSpec::new().add(
                TweenSpec::from_to(SUB)
                    .range(Property::Opacity, 0.0, 1.0)
                    .range(Property::Y, Length::px(40.0), Length::px(0.0))
                    .ease(Easing::Out(Power::P2)),
            ),
            scrubbed(60.0, 25.0),
        )
}
