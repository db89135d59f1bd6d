//! "The Realest" hero and its pinned journey
//!
//! On mount the headline letters rise in one after another. Scrolling then
//! holds the section in place for four viewport heights while three phases
//! play:
//!
//! 1. "The" and "est" slide apart and fade, the subtitle lifts away and
//!    "Real" moves up
//! 2. the vision statement fades in beneath "Real"
//! 3. the vision gives way to the values title and cards

use realest_animation::{
    Easing, Edge, Playback, Position, Power, RangeEnd, RangeStart, ScrollTriggerSpec, Scrub,
    TimelineSpec, TriggerTarget, TweenSpec,
};
use realest_core::{Document, Length, NodeId, Property};

use super::{place, text};
use crate::section::SectionSpec;

pub const NAME: &str = "real-journey";
pub const ROOT: &str = "data-real-journey";
pub const LETTER: &str = "data-letter";
pub const THE: &str = "data-the";
pub const REAL: &str = "data-real";
pub const EST: &str = "data-est";
pub const SUB: &str = "data-sub";
pub const VISION_TITLE: &str = "data-vision-title";
pub const VISION_CONTENT: &str = "data-vision-content";
pub const VALUES_TITLE: &str = "data-values-title";
pub const VALUE_CARD: &str = "data-value-card";

pub const SUBTITLE: &str = "Capital for ideas that move humanity forward.";
pub const VISION: &str = "We see a future where capital flows toward projects that elevate \
human experience, not exploit it. Where design thinking meets deep technical rigor. Where \
founders build with intention, craft, and a genuine commitment to lasting impact.";

pub const VALUES: [(&str, &str); 3] = [
    (
        "Craft over speed",
        "We believe in the power of deliberate design and thoughtful execution.",
    ),
    (
        "Impact over scale",
        "Meaningful outcomes for real people, not vanity metrics.",
    ),
    (
        "Partnership over transaction",
        "We build alongside founders, not from a distance.",
    ),
];

/// How far the pinned journey runs, in viewport heights
pub const PIN_VIEWPORTS: f32 = 4.0;

pub fn build(doc: &mut Document, parent: NodeId, top: f32) -> f32 {
    let height = doc.viewport().height;

    let root = doc.create_element(parent, "div", &[ROOT]);
    place(doc, root, top, height);

    let hero = doc.create_element(root, "section", &["data-hero"]);
    place(doc, hero, top, height);
    let headline = doc.create_element(hero, "h1", &[]);
    for (marker, letters) in [(THE, "The\u{00A0}"), (REAL, "Real"), (EST, "est")] {
        let word = doc.create_element(headline, "span", &[marker]);
        for letter in letters.chars() {
            text(doc, word, "span", &[LETTER], &letter.to_string());
        }
    }
    text(doc, hero, "p", &[SUB], SUBTITLE);

    // Vision and values sit below where "Real" comes to rest
    let stage = doc.create_element(root, "div", &["data-journey-stage"]);
    place(doc, stage, top + 0.2 * height, 0.8 * height);
    text(doc, stage, "h2", &[VISION_TITLE], "Vision");
    text(doc, stage, "p", &[VISION_CONTENT], VISION);
    text(doc, stage, "h2", &[VALUES_TITLE], "Values");
    let grid = doc.create_element(stage, "div", &["data-values-grid"]);
    for (title, description) in VALUES {
        let card = doc.create_element(grid, "div", &[VALUE_CARD]);
        text(doc, card, "h3", &[], title);
        text(doc, card, "p", &[], description);
    }

    top + height
}

/// Headline letters and subtitle entering on mount
pub fn intro() -> TimelineSpec {
    TimelineSpec::new()
        .add(
            TweenSpec::from(LETTER)
                .prop(Property::YPercent, 120.0)
                .prop(Property::Opacity, 0.0)
                .stagger(0.06)
                .duration(0.85)
                .ease(Easing::Out(Power::P3))
                .at(Position::Absolute(0.0)),
        )
        .add(
            TweenSpec::from(SUB)
                .prop(Property::Opacity, 0.0)
                .prop(Property::Y, Length::px(10.0))
                .duration(0.7)
                .delay(0.35)
                .at(Position::Absolute(0.0)),
        )
}

fn at(label: &str, offset: f32) -> Position {
    Position::Label(label.to_string(), offset)
}

/// The three scroll phases
pub fn journey() -> TimelineSpec {
    TimelineSpec::new()
        .label("phase-1", Position::Absolute(0.0))
        .label("phase-2", Position::Absolute(1.5))
        .label("phase-3", Position::Absolute(3.0))
        // Phase 1
        .add(
            TweenSpec::to(THE)
                .prop(Property::Opacity, 0.0)
                .prop(Property::X, Length::px(-100.0))
                .duration(1.0)
                .at(at("phase-1", 0.0)),
        )
        .add(
            TweenSpec::to(EST)
                .prop(Property::Opacity, 0.0)
                .prop(Property::X, Length::px(100.0))
                .duration(1.0)
                .at(at("phase-1", 0.0)),
        )
        .add(
            TweenSpec::to(SUB)
                .prop(Property::Opacity, 0.0)
                .prop(Property::Y, Length::px(-20.0))
                .duration(0.8)
                .at(at("phase-1", 0.0)),
        )
        .add(
            TweenSpec::to(REAL)
                .prop(Property::Y, Length::vh(-31.0))
                .prop(Property::Scale, 0.9)
                .duration(1.5)
                .at(at("phase-1", 0.5)),
        )
        // Phase 2
        .add(
            TweenSpec::to(VISION_TITLE)
                .prop(Property::Opacity, 1.0)
                .prop(Property::Y, Length::px(0.0))
                .duration(1.0)
                .at(at("phase-2", 0.0)),
        )
        .add(
            TweenSpec::to(VISION_CONTENT)
                .prop(Property::Opacity, 1.0)
                .prop(Property::Y, Length::px(0.0))
                .duration(1.0)
                .at(at("phase-2", 0.5)),
        )
        // Phase 3
        .add(
            TweenSpec::to(VISION_TITLE)
                .prop(Property::Opacity, 0.0)
                .prop(Property::X, Length::px(-100.0))
                .duration(0.8)
                .at(at("phase-3", 0.0)),
        )
        .add(
            TweenSpec::to(VISION_CONTENT)
                .prop(Property::Opacity, 0.0)
                .prop(Property::Y, Length::px(-30.0))
                .duration(0.8)
                .at(at("phase-3", 0.0)),
        )
        .add(
            TweenSpec::to(VALUES_TITLE)
                .prop(Property::Opacity, 1.0)
                .prop(Property::X, Length::px(0.0))
                .duration(0.8)
                .at(at("phase-3", 0.3)),
        )
        .add(
            TweenSpec::to(VALUE_CARD)
                .prop(Property::Opacity, 1.0)
                .prop(Property::Y, Length::px(0.0))
                .stagger(0.15)
                .duration(1.0)
                .at(at("phase-3", 0.8)),
        )
}

pub fn trigger() -> ScrollTriggerSpec {
    ScrollTriggerSpec::new(TriggerTarget::Scope)
        .start(RangeStart::new(Edge::Top, Edge::Top))
        .end(RangeEnd::Relative(Length::percent(PIN_VIEWPORTS * 100.0)))
        .scrub(Scrub::seconds(1.0))
        .pin(true)
}

pub fn spec() -> SectionSpec {
    SectionSpec::new(NAME, ROOT)
        .require(THE)
        .require(REAL)
        .require(EST)
        .initial(VISION_TITLE, Property::Opacity, 0.0)
        .initial(VISION_TITLE, Property::Y, Length::px(30.0))
        .initial(VISION_CONTENT, Property::Opacity, 0.0)
        .initial(VISION_CONTENT, Property::Y, Length::px(30.0))
        .initial(VALUES_TITLE, Property::Opacity, 0.0)
        .initial(VALUES_TITLE, Property::X, Length::px(100.0))
        .initial(VALUE_CARD, Property::Opacity, 0.0)
        .initial(VALUE_CARD, Property::Y, Length::px(40.0))
        .on_mount(intro())
        .animate(journey(), Playback::Scroll(trigger()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use realest_core::Viewport;

    #[test]
    fn test_journey_phases() {
        let compiled = journey().compile().unwrap();
        assert_eq!(compiled.label("phase-1"), Some(0.0));
        assert_eq!(compiled.label("phase-2"), Some(1.5));
        assert_eq!(compiled.label("phase-3"), Some(3.0));

        let starts: Vec<(String, f32)> = compiled
            .entries()
            .iter()
            .map(|e| (e.spec.target.clone(), e.start))
            .collect();
        assert_eq!(starts[3], (REAL.to_string(), 0.5));
        assert_eq!(starts[5], (VISION_CONTENT.to_string(), 2.0));
        assert_eq!(starts[9], (VALUE_CARD.to_string(), 3.8));

        // The last card finishes the timeline
        let duration = compiled.duration_for(&[1, 1, 1, 1, 1, 1, 1, 1, 1, 3]);
        assert!((duration - 5.1).abs() < 1e-5);
    }

    #[test]
    fn test_letters_stagger_in_document_order() {
        let mut doc = Document::new(Viewport::default());
        let root = doc.root();
        build(&mut doc, root, 0.0);
        let letters = doc.query_all(root, LETTER);
        let text: String = letters
            .iter()
            .filter_map(|l| doc.text(*l))
            .collect();
        assert_eq!(text, "The\u{00A0}Realest");

        let intro = intro().compile().unwrap();
        let starts = intro.schedule(0, letters.len());
        assert_eq!(starts.len(), 11);
        for pair in starts.windows(2) {
            assert!((pair[1] - pair[0] - 0.06).abs() < 1e-6);
        }
        // The subtitle waits for its delay
        assert_eq!(intro.schedule(1, 1), vec![0.35]);
    }
}
