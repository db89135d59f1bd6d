//! Site footer; not animated

use realest_core::{Document, NodeId};

use super::{place, text};

pub const ROOT: &str = "data-footer";

const HEIGHT: f32 = 56.0;

pub fn notice(year: i32) -> String {
    format!("\u{a9} {} THE REALEST \u{2014} Investing in what matters.", year)
}

pub fn build(doc: &mut Document, parent: NodeId, top: f32, year: i32) -> f32 {
    let root = text(doc, parent, "footer", &[ROOT], &notice(year));
    place(doc, root, top, HEIGHT);
    top + HEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_carries_the_year() {
        assert_eq!(
            notice(2031),
            "\u{a9} 2031 THE REALEST \u{2014} Investing in what matters."
        );
    }
}
