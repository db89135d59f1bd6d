//! The landing page sections
//!
//! Each module builds its markup into the document (`build`) and, when the
//! section animates, describes how (`spec`). Builders take the page offset
//! the section starts at and return the offset the next one starts at.

pub mod about;
pub mod footer;
pub mod header;
pub mod motto;
pub mod partners;
pub mod projects;
pub mod real_journey;

use realest_animation::{
    Easing, Edge, Playback, Power, RangeEnd, RangeStart, ScrollTriggerSpec, Scrub, TimelineSpec,
    TriggerTarget, TweenSpec,
};
use realest_core::{Color, Document, LayoutBox, Length, NodeId, Property};

use crate::section::SectionSpec;

/// Specs of every animated section, in page order
pub fn animated() -> Vec<SectionSpec> {
    vec![
        header::spec(),
        real_journey::spec(),
        partners::spec(),
        projects::spec(),
        motto::spec(),
    ]
}

pub(crate) fn place(doc: &mut Document, node: NodeId, top: f32, height: f32) {
    doc.set_layout(node, LayoutBox { top, height });
}

pub(crate) fn text(
    doc: &mut Document,
    parent: NodeId,
    tag: &str,
    markers: &[&str],
    content: &str,
) -> NodeId {
    let node = doc.create_element(parent, tag, markers);
    doc.set_text(node, content);
    node
}

// =============================================================================
// Slide-over sections
// =============================================================================

/// A full-screen section fixed over the page that slides up while its
/// spacer scrolls into view
pub(crate) struct SlideOver {
    pub name: &'static str,
    pub root: &'static str,
    pub spacer: &'static str,
    pub title: &'static str,
    pub item: &'static str,
    pub background: u32,
    /// Offset each item enters from, besides fading and scaling
    pub item_offset: (Property, f32),
    pub item_scale: f32,
    pub stagger: f32,
}

impl SlideOver {
    /// Spacer and section boxes; returns `(spacer, section, grid)`
    pub fn build(
        &self,
        doc: &mut Document,
        parent: NodeId,
        top: f32,
        title: &str,
    ) -> (NodeId, NodeId, NodeId) {
        let height = doc.viewport().height;

        let spacer = doc.create_element(parent, "div", &[self.spacer]);
        place(doc, spacer, top, height);

        let section = doc.create_element(parent, "section", &[self.root]);
        place(doc, section, top, height);
        doc.author_style(
            section,
            Property::BackgroundColor,
            Color::from_hex(self.background).into(),
        );

        let heading = text(doc, section, "h2", &[self.title], title);
        doc.author_style(
            heading,
            Property::Color,
            Color::from_hex(0xFFFCE1).into(),
        );
        let grid = doc.create_element(section, "div", &[]);
        (spacer, section, grid)
    }

    pub fn spec(&self) -> SectionSpec {
        let spacer = TriggerTarget::Marker(self.spacer.to_string());
        let scrubbed = |start: RangeStart, end: RangeStart| {
            Playback::Scroll(
                ScrollTriggerSpec::new(spacer.clone())
                    .start(start)
                    .end(RangeEnd::At(end))
                    .scrub(Scrub::seconds(1.0)),
            )
        };
        let (offset_property, offset) = self.item_offset;

        SectionSpec::new(self.name, self.root)
            .require(self.title)
            .require(self.item)
            .initial(self.root, Property::Opacity, 0.0)
            .animate(
                TimelineSpec::new().add(
                    TweenSpec::from_to(self.root)
                        .range(Property::YPercent, 100.0, 0.0)
                        .range(Property::Opacity, 0.0, 1.0)
                        .ease(Easing::Linear),
                ),
                scrubbed(
                    RangeStart::new(Edge::Top, Edge::Bottom),
                    RangeStart::new(Edge::Bottom, Edge::Bottom),
                ),
            )
            .animate(
                TimelineSpec::new().add(
                    TweenSpec::from_to(self.title)
                        .range(Property::Opacity, 0.0, 1.0)
                        .range(Property::Scale, 0.8, 1.0)
                        .range(Property::Y, Length::px(100.0), Length::px(0.0))
                        .ease(Easing::Out(Power::P2)),
                ),
                scrubbed(
                    RangeStart::new(Edge::Top, Edge::Bottom),
                    RangeStart::new(Edge::Center, Edge::Bottom),
                ),
            )
            .animate(
                TimelineSpec::new().add(
                    TweenSpec::from_to(self.item)
                        .range(Property::Opacity, 0.0, 1.0)
                        .range(offset_property, Length::px(offset), Length::px(0.0))
                        .range(Property::Scale, self.item_scale, 1.0)
                        .stagger(self.stagger)
                        .ease(Easing::Out(Power::P2)),
                ),
                scrubbed(
                    RangeStart::new(Edge::Top, Edge::Percent(80.0)),
                    RangeStart::new(Edge::Center, Edge::Percent(60.0)),
                ),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realest_core::Viewport;

    #[test]
    fn test_every_animated_spec_compiles() {
        for spec in animated() {
            for animation in &spec.animations {
                assert!(
                    animation.timeline.compile().is_ok(),
                    "{} has an invalid timeline",
                    spec.name
                );
            }
        }
    }

    #[test]
    fn test_section_names_are_unique() {
        let mut names: Vec<String> = animated().into_iter().map(|s| s.name).collect();
        let count = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), count);
    }

    #[test]
    fn test_slide_over_starts_hidden() {
        let spec = partners::spec();
        assert!(spec
            .initial
            .iter()
            .any(|s| s.target == partners::ROOT && s.property == Property::Opacity));
        // Every timeline follows the spacer, not the fixed section itself
        for animation in &spec.animations {
            let Playback::Scroll(trigger) = &animation.playback else {
                panic!("slide-over animations are scroll-linked");
            };
            assert_eq!(
                trigger.trigger,
                TriggerTarget::Marker(partners::SPACER.to_string())
            );
        }
    }

    #[test]
    fn test_slide_over_boxes_share_the_spacer_slot() {
        let mut doc = Document::new(Viewport::new(1200.0, 700.0));
        let parent = doc.root();
        let next = partners::build(&mut doc, parent, 1000.0);
        assert_eq!(next, 1700.0);

        let spacer = doc.query(parent, partners::SPACER).unwrap();
        let section = doc.query(parent, partners::ROOT).unwrap();
        assert_eq!(doc.base_layout(spacer), doc.base_layout(section));
        assert_eq!(doc.query_all(section, partners::ITEM).len(), 6);
    }
}
