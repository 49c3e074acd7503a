//! Content reduction: pick the part of a page most likely to hold the recipe
//! and flatten it to plain text.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

/// Returned when no document was supplied.
pub const NO_CONTENT: &str = "No content available";

/// Returned when no strategy yields enough HTML.
pub const NO_RECIPE_CONTENT: &str = "No recipe content found";

/// Minimum inner-HTML length for a strategy's pick to be accepted.
pub const MIN_CANDIDATE_HTML: usize = 100;

/// Minimum text length for a keyword-scored element.
const MIN_SCORED_TEXT: usize = 200;

const KEYWORDS: &[&str] = &[
    "ingredients",
    "instructions",
    "directions",
    "recipe",
    "cook",
    "prep",
];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Invalid selector")
}

static PAGE_BOILERPLATE: Lazy<Selector> = Lazy::new(|| {
    selector("script, style, nav, header, footer, .advertisement, .ads, .social-share, .comments, .sidebar, .menu, .navigation")
});

static FRAGMENT_BOILERPLATE: Lazy<Selector> = Lazy::new(|| {
    selector("script, style, .advertisement, .ads, .social-share, .comments, .sidebar, .menu, .navigation, .popup, .modal")
});

static RECIPE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        r#"[itemtype*="Recipe"]"#,
        ".recipe-card",
        ".recipe-content",
        ".recipe-post",
        ".recipe-container",
        ".recipe",
        ".entry-recipe",
        ".post-recipe",
    ]
    .into_iter()
    .map(selector)
    .collect()
});

static MAIN_CONTENT_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "main",
        "article",
        ".entry-content",
        ".post-content",
        ".content",
        "#content",
        ".main-content",
    ]
    .into_iter()
    .map(selector)
    .collect()
});

static BLOCK_ELEMENTS: Lazy<Selector> = Lazy::new(|| selector("div, section, article"));
static BODY: Lazy<Selector> = Lazy::new(|| selector("body"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Selection strategy that produced the reduced content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    RecipeSelector,
    MainContent,
    KeywordScore,
    Body,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecipeSelector => "recipe_selector",
            Self::MainContent => "main_content",
            Self::KeywordScore => "keyword_score",
            Self::Body => "body",
        }
    }
}

/// Reduce a page to the plain text of its most recipe-like region.
///
/// Returns [`NO_CONTENT`] for `None` and [`NO_RECIPE_CONTENT`] when nothing
/// substantial is found.
pub fn reduce(html: Option<&str>) -> String {
    let Some(html) = html else {
        return NO_CONTENT.to_string();
    };

    let mut document = Html::parse_document(html);
    strip(&mut document, &PAGE_BOILERPLATE);

    let Some((strategy, fragment)) = select_content(&document) else {
        debug!("No substantial content found");
        return NO_RECIPE_CONTENT.to_string();
    };
    debug!(strategy = strategy.as_str(), content_len = fragment.len(), "Selected content");

    let mut fragment = Html::parse_fragment(&fragment);
    strip(&mut fragment, &FRAGMENT_BOILERPLATE);

    let text: String = fragment.root_element().text().collect();
    collapse_whitespace(&text)
}

/// Detach every element matching `selector`.
///
/// Later lookups go through `root_element()`, since `Html::select` still
/// visits detached nodes.
fn strip(document: &mut Html, selector: &Selector) {
    let ids: Vec<_> = document
        .root_element()
        .select(selector)
        .map(|el| el.id())
        .collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Run the strategies in order; the first pick with enough HTML wins.
fn select_content(document: &Html) -> Option<(Strategy, String)> {
    let strategies: [(Strategy, fn(&Html) -> Option<String>); 4] = [
        (Strategy::RecipeSelector, |d| first_match(d, &RECIPE_SELECTORS)),
        (Strategy::MainContent, |d| first_match(d, &MAIN_CONTENT_SELECTORS)),
        (Strategy::KeywordScore, best_scored),
        (Strategy::Body, |d| {
            d.root_element().select(&BODY).next().map(|b| b.inner_html())
        }),
    ];

    strategies.into_iter().find_map(|(strategy, pick)| {
        pick(document)
            .filter(|html| html.chars().count() >= MIN_CANDIDATE_HTML)
            .map(|html| (strategy, html))
    })
}

/// Inner HTML of the first element of the first selector with any match.
fn first_match(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors
        .iter()
        .find_map(|s| document.root_element().select(s).next())
        .map(|el| el.inner_html())
}

/// Number of distinct keywords present in the element's text.
fn keyword_score(text: &str) -> usize {
    let lower = text.to_lowercase();
    KEYWORDS.iter().filter(|k| lower.contains(*k)).count()
}

/// Highest-scoring block element with enough text; ties keep the earliest.
fn best_scored(document: &Html) -> Option<String> {
    let mut best: Option<(usize, ElementRef<'_>)> = None;
    for element in document.root_element().select(&BLOCK_ELEMENTS) {
        let text: String = element.text().collect();
        let score = keyword_score(&text);
        trace!(score, text_len = text.len(), "Scored element");
        let leading = best.map(|(s, _)| s).unwrap_or(0);
        if score > leading && text.chars().count() > MIN_SCORED_TEXT {
            best = Some((score, element));
        }
    }
    best.map(|(_, el)| el.inner_html())
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler(word: &str, n: usize) -> String {
        vec![word; n].join(" ")
    }

    #[test]
    fn test_absent_document_sentinel() {
        assert_eq!(reduce(None), NO_CONTENT);
    }

    #[test]
    fn test_recipe_card_beats_main() {
        let html = format!(
            r#"<html><body>
                <main><p>{}</p></main>
                <div class="recipe-card"><h2>Ingredients</h2><ul><li>{}</li></ul></div>
            </body></html>"#,
            filler("generic", 40),
            filler("flour", 40),
        );
        let text = reduce(Some(&html));
        assert!(text.starts_with("Ingredients"));
        assert!(text.contains("flour"));
        assert!(!text.contains("generic"));
    }

    #[test]
    fn test_short_recipe_match_falls_through_to_main() {
        let html = format!(
            r#"<html><body>
                <div class="recipe">tiny</div>
                <main><p>{}</p></main>
            </body></html>"#,
            filler("stew", 40),
        );
        let text = reduce(Some(&html));
        assert!(text.starts_with("stew"));
        assert!(!text.contains("tiny"));
    }

    #[test]
    fn test_boilerplate_removed_and_whitespace_collapsed() {
        let html = format!(
            r#"<html><body><article>
                <script>var tracking = 1;</script>
                <div class="ads">BUY NOW</div>
                <div class="popup">SUBSCRIBE</div>
                <p>Whisk   the
                   eggs.</p>
                <p>{}</p>
            </article></body></html>"#,
            filler("batter", 30),
        );
        let text = reduce(Some(&html));
        assert!(text.starts_with("Whisk the eggs."));
        assert!(!text.contains("tracking"));
        assert!(!text.contains("BUY NOW"));
        assert!(!text.contains("SUBSCRIBE"));
        assert!(!text.contains("  "));
    }

    #[test]
    fn test_keyword_scoring_picks_best_block() {
        let html = format!(
            r#"<html><body>
                <div id="a"><p>{}</p></div>
                <section id="b"><p>Ingredients and instructions: prep then cook. {}</p></section>
            </body></html>"#,
            filler("recipe", 50),
            filler("onion", 50),
        );
        let text = reduce(Some(&html));
        assert!(text.starts_with("Ingredients and instructions"));
    }

    #[test]
    fn test_keyword_score_counts_distinct_keywords() {
        assert_eq!(keyword_score("Recipe recipe RECIPE"), 1);
        assert_eq!(keyword_score("Prep and cook the ingredients"), 3);
        assert_eq!(keyword_score("nothing here"), 0);
    }

    #[test]
    fn test_body_fallback() {
        let html = format!("<html><body><p>{}</p></body></html>", filler("plain", 40));
        assert!(reduce(Some(&html)).starts_with("plain plain"));
    }

    #[test]
    fn test_tiny_page_yields_sentinel() {
        assert_eq!(
            reduce(Some("<html><body><p>Hi</p></body></html>")),
            NO_RECIPE_CONTENT
        );
    }

    #[test]
    fn test_navigation_stripped_before_selection() {
        let html = format!(
            r#"<html><body>
                <nav><main><p>{}</p></main></nav>
                <article><p>{}</p></article>
            </body></html>"#,
            filler("menu", 40),
            filler("saffron", 40),
        );
        let text = reduce(Some(&html));
        assert!(text.starts_with("saffron"));
    }

    #[test]
    fn test_inline_markup_keeps_words_together() {
        let html = format!(
            r#"<html><body><div class="recipe-content"><p>Add 1<sup>1</sup>/<sub>2</sub> cups fl<em>ou</em>r.</p> <p>{}</p></div></body></html>"#,
            filler("whisk", 30)
        );
        let text = reduce(Some(&html));
        assert!(text.starts_with("Add 11/2 cups flour."), "got: {}", text);
    }

    #[test]
    fn test_strategy_labels() {
        assert_eq!(Strategy::RecipeSelector.as_str(), "recipe_selector");
        assert_eq!(Strategy::MainContent.as_str(), "main_content");
        assert_eq!(Strategy::KeywordScore.as_str(), "keyword_score");
        assert_eq!(Strategy::Body.as_str(), "body");
    }
}
