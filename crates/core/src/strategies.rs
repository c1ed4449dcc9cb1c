//! Random markup for property tests.
use proptest::prelude::*;

const CLASS_NAMES: &[&str] = &[
    "",
    "sidebar",
    "widget",
    "nav menu",
    "comment",
    "share social",
    "footer",
    "related promo",
    "content",
    "post-body",
    "article",
];

const STYLES: &[&str] = &["", "color: red", "display:none", "visibility: hidden"];

const CONTAINERS: &[&str] = &["div", "p", "span"];

fn words() -> impl Strategy<Value = String> {
    "[a-z]{1,8}( [a-z]{1,8}){0,24}"
}

/// Nested div/p/span markup with anchor leaves, boilerplate-looking class
/// names and hidden styles. Text never starts or ends with whitespace.
pub(crate) fn html_fragment() -> impl Strategy<Value = String> {
    let anchor = (prop::sample::select(CLASS_NAMES), words())
        .prop_map(|(class, text)| format!(r#"<a class="{class}" href="/page">{text}</a>"#));
    let leaf = prop_oneof![2 => words(), 1 => anchor];

    leaf.prop_recursive(5, 64, 4, |inner| {
        (
            prop::sample::select(CONTAINERS),
            prop::sample::select(CLASS_NAMES),
            prop::sample::select(STYLES),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(tag, class, style, children)| {
                format!(r#"<{tag} class="{class}" style="{style}">{}</{tag}>"#, children.concat())
            })
    })
}
