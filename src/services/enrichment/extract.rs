//! Text extraction from fetched markup

use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

lazy_static! {
    static ref TITLE: Selector = Selector::parse("title").unwrap();
    static ref DESCRIPTION: Selector = Selector::parse(r#"meta[name="description"]"#).unwrap();
    static ref H1: Selector = Selector::parse("h1").unwrap();
    static ref MAIN_CONTENT: Selector = Selector::parse("main, article, .main-content").unwrap();
    static ref BODY: Selector = Selector::parse("body").unwrap();
}

/// Elements whose text never counts as page content
const HIDDEN_ELEMENTS: [&str; 2] = ["script", "style"];

/// Title, description, level-1 headings and primary content, one per line.
///
/// Malformed markup degrades to empty components; this never fails.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(visible_text)
        .unwrap_or_default();

    let description = document
        .select(&DESCRIPTION)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .unwrap_or_default();

    let headings = document
        .select(&H1)
        .map(visible_text)
        .collect::<Vec<_>>()
        .join(" ");

    let main = main_content(&document);

    format!("{title}\n{description}\n{headings}\n{main}")
}

/// Text of the main/article/.main-content containers, else the whole body
fn main_content(document: &Html) -> String {
    let matches: Vec<ElementRef> = document.select(&MAIN_CONTENT).collect();
    let ids: HashSet<_> = matches.iter().map(|el| el.id()).collect();

    // A container nested in another match is already covered by its ancestor
    let text = matches
        .iter()
        .filter(|el| !el.ancestors().any(|a| ids.contains(&a.id())))
        .map(|el| visible_text(*el))
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if !text.is_empty() {
        return text;
    }

    document
        .select(&BODY)
        .next()
        .map(visible_text)
        .unwrap_or_default()
}

/// Descendant text with script/style content skipped and whitespace collapsed
fn visible_text(element: ElementRef) -> String {
    let parts: Vec<&str> = element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_ELEMENTS.contains(&e.name()))
            });
            (!hidden).then_some(&**text)
        })
        .collect();
    collapse_whitespace(&parts.join(" "))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
