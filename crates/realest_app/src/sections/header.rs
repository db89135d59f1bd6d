//! Sticky site header
//!
//! The navigation toggles with the UI store's `nav_open` flag. The header's
//! translucent backdrop firms up over the first viewport of scrolling; this
//! is the only animation driven by whole-page scroll, and its context is
//! scoped to the header alone.

use realest_animation::{
    Easing, Edge, Playback, RangeEnd, RangeStart, ScrollTriggerSpec, Scrub, TimelineSpec,
    TriggerTarget, TweenSpec,
};
use realest_core::{Color, Document, Length, NodeId, Property};

use super::{place, text};
use crate::section::SectionSpec;

pub const NAME: &str = "header";
pub const ROOT: &str = "data-header";
pub const BACKDROP: &str = "data-header-backdrop";
pub const NAV: &str = "data-nav";
pub const MENU_BUTTON: &str = "data-menu-button";

/// Attribute present on the nav while the menu is open
pub const OPEN_ATTRIBUTE: &str = "data-open";

pub const BRAND: &str = "THE REALEST";
pub const LINKS: [(&str, &str); 2] = [("Home", "/"), ("Contact", "/contact-us")];

const HEIGHT: f32 = 64.0;
const BACKDROP_OPACITY: f32 = 0.7;
const SCROLLED_BACKDROP_OPACITY: f32 = 0.95;

pub fn build(doc: &mut Document, parent: NodeId, top: f32) -> f32 {
    let root = doc.create_element(parent, "header", &[ROOT]);
    place(doc, root, top, HEIGHT);

    let backdrop = doc.create_element(root, "div", &[BACKDROP]);
    place(doc, backdrop, top, HEIGHT);
    doc.author_style(backdrop, Property::BackgroundColor, Color::BLACK.into());
    doc.author_style(backdrop, Property::Opacity, BACKDROP_OPACITY.into());

    let brand = text(doc, root, "a", &["data-brand"], BRAND);
    doc.set_attribute(brand, "href", "/");

    let nav = doc.create_element(root, "nav", &[NAV]);
    for (label, href) in LINKS {
        let link = text(doc, nav, "a", &["data-nav-link"], label);
        doc.set_attribute(link, "href", href);
    }

    let button = text(doc, root, "button", &[MENU_BUTTON], "Menu");
    doc.set_attribute(button, "aria-expanded", "false");

    top + HEIGHT
}

/// Reflect the menu state onto the header
pub fn sync_nav(doc: &mut Document, open: bool) {
    let root = doc.root();
    let Some(header) = doc.query(root, ROOT) else {
        return;
    };
    if let Some(nav) = doc.query(header, NAV) {
        if open {
            doc.set_attribute(nav, OPEN_ATTRIBUTE, "true");
        } else {
            doc.remove_attribute(nav, OPEN_ATTRIBUTE);
        }
    }
    if let Some(button) = doc.query(header, MENU_BUTTON) {
        doc.set_attribute(button, "aria-expanded", if open { "true" } else { "false" });
    }
}

pub fn spec() -> SectionSpec {
    SectionSpec::new(NAME, ROOT).require(NAV).animate(
        TimelineSpec::new().add(
            TweenSpec::to(BACKDROP)
                .prop(Property::Opacity, SCROLLED_BACKDROP_OPACITY)
                .duration(1.0)
                .ease(Easing::Linear),
        ),
        Playback::Scroll(
            ScrollTriggerSpec::new(TriggerTarget::Page)
                .start(RangeStart::new(Edge::Top, Edge::Top))
                .end(RangeEnd::Relative(Length::percent(100.0)))
                .scrub(Scrub::Instant),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use realest_core::Viewport;

    #[test]
    fn test_sync_nav() {
        let mut doc = Document::new(Viewport::default());
        let root = doc.root();
        build(&mut doc, root, 0.0);
        let nav = doc.query(root, NAV).unwrap();
        let button = doc.query(root, MENU_BUTTON).unwrap();

        sync_nav(&mut doc, true);
        assert_eq!(doc.attribute(nav, OPEN_ATTRIBUTE), Some("true"));
        assert_eq!(doc.attribute(button, "aria-expanded"), Some("true"));

        sync_nav(&mut doc, false);
        assert_eq!(doc.attribute(nav, OPEN_ATTRIBUTE), None);
        assert_eq!(doc.attribute(button, "aria-expanded"), Some("false"));
    }

    #[test]
    fn test_sync_nav_without_header_is_a_no_op() {
        let mut doc = Document::new(Viewport::default());
        let before = doc.mutation_count();
        sync_nav(&mut doc, true);
        assert_eq!(doc.mutation_count(), before);
    }
}
