//! Text sanitizers applied to every stored and served text field

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>").unwrap()
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)</?[A-Za-z!][^>]*>").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Reduce input to a single line of plain text.
///
/// Script and style blocks are dropped with their content, all other tags are
/// stripped, whitespace runs collapse to one space and the result is trimmed.
/// Applying it twice gives the same result as applying it once.
pub fn plain_text(input: &str) -> String {
    let mut text = SCRIPT_STYLE.replace_all(input, "").into_owned();
    // Stripping can splice a new tag together ("<<b>b>"), so repeat until stable
    loop {
        let stripped = TAG.replace_all(&text, "").into_owned();
        if stripped == text {
            break;
        }
        text = stripped;
    }
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Keep an allow-listed HTML subset: formatting, lists, links and headings
/// survive; scripts, styles, event handlers and unsafe URL schemes do not.
pub fn rich_text(input: &str) -> String {
    ammonia::clean(input)
}
