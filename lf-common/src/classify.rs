//! Keyword classifier
//!
//! Assigns a coarse [`Category`] from the free-text item name. The table is
//! tested in declaration order and the first category with a matching
//! keyword wins. Keywords match whole words (plural `s`/`es` allowed), so
//! "key" does not fire on "hockey" nor "hat" on "that".

use crate::Category;

const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Electronics,
        &[
            "phone", "iphone", "smartphone", "laptop", "charger", "headphone", "earphone",
            "earbud", "airpod", "ipad", "tablet", "calculator", "chromebook", "cable", "mouse",
            "speaker", "camera", "watch", "smartwatch",
        ],
    ),
    (
        Category::Clothing,
        &[
            "jacket", "hoodie", "sweater", "sweatshirt", "shirt", "coat", "hat", "cap", "scarf",
            "glove", "shoe", "sneaker", "pants", "jersey", "sock", "beanie",
        ],
    ),
    (
        Category::Accessories,
        &[
            "wallet", "key", "keychain", "glasses", "sunglasses", "bracelet", "necklace", "ring",
            "earring", "umbrella", "bottle", "purse", "lanyard", "id card",
        ],
    ),
    (
        Category::School,
        &[
            "book", "notebook", "binder", "folder", "pencil", "pen", "backpack", "bag",
            "planner", "textbook", "ruler", "lunchbox",
        ],
    ),
    (
        Category::Sports,
        &[
            "ball", "basketball", "football", "baseball", "softball", "volleyball", "racket",
            "racquet", "bat", "helmet", "cleat", "mitt", "stick", "goggles", "skateboard",
            "pads",
        ],
    ),
];

/// Lower-cased alphanumeric words of `text`
fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn is_word_form(word: &str, keyword: &str) -> bool {
    matches!(word.strip_prefix(keyword), Some("" | "s" | "es"))
}

/// Multi-word keywords match consecutive words
fn keyword_matches(words: &[String], keyword: &str) -> bool {
    let parts: Vec<&str> = keyword.split(' ').collect();
    words.windows(parts.len()).any(|window| {
        window
            .iter()
            .zip(&parts)
            .all(|(word, part)| is_word_form(word, part))
    })
}

/// Classify an item by its name
pub fn classify(name: &str) -> Category {
    let words = words(name);
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| keyword_matches(&words, keyword)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}
