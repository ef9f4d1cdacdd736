//! Story fixtures: a canned outline for the boy-and-dog example prompt.

use storybook_core::story::StoryOutline;

/// The example prompt used across tests.
pub const SAMPLE_PROMPT: &str = "A boy and a dog meet at street and became best friends";

const PAGES: [(&str, &str, &[&str], &str, &str); 8] = [
    (
        "A Rainy Street",
        "Leo walked home along the busy street. Under a bench he spotted a small, shivering dog.",
        &["Leo", "Biscuit"],
        "A busy city street on a rainy afternoon",
        "Curious",
    ),
    (
        "Hello, Little Friend",
        "Leo knelt down and held out his hand. The dog sniffed it and wagged a muddy tail.",
        &["Leo", "Biscuit"],
        "Beside a wooden bench on the sidewalk",
        "Gentle",
    ),
    (
        "The Big Puddle",
        "Biscuit jumped straight into a giant puddle. Leo laughed as the water splashed everywhere.",
        &["Leo", "Biscuit"],
        "A wide puddle near the crosswalk",
        "Playful",
    ),
    (
        "Looking for Home",
        "They asked Mrs. Park at the bakery if she knew the dog. She shook her head and offered a warm roll.",
        &["Leo", "Biscuit", "Mrs. Park"],
        "A cozy corner bakery",
        "Hopeful",
    ),
    (
        "A Name at Last",
        "Leo decided the dog needed a name. He called him Biscuit, and Biscuit barked with joy.",
        &["Leo", "Biscuit"],
        "A bench outside the bakery",
        "Joyful",
    ),
    (
        "Walking Together",
        "The sun came out as they walked side by side. Every step felt like an adventure.",
        &["Leo", "Biscuit"],
        "A sunny park path lined with trees",
        "Bright",
    ),
    (
        "Mom Says Yes",
        "At home, Leo asked his mom if Biscuit could stay. She smiled and said yes.",
        &["Leo", "Biscuit", "Mom"],
        "A small apartment kitchen",
        "Warm",
    ),
    (
        "Best Friends",
        "That night Biscuit curled up at the foot of Leo's bed. They were best friends forever.",
        &["Leo", "Biscuit"],
        "Leo's bedroom under a starry window",
        "Peaceful",
    ),
];

/// JSON for a valid outline with `page_count` pages (clamped to 1..=8), in
/// the shape the structured model returns.
#[must_use]
pub fn sample_outline_json(page_count: usize) -> serde_json::Value {
    let pages: Vec<serde_json::Value> = PAGES
        .iter()
        .take(page_count.clamp(1, PAGES.len()))
        .enumerate()
        .map(|(index, (title, content, characters, setting, mood))| {
            serde_json::json!({
                "pageNumber": index + 1,
                "title": title,
                "content": content,
                "characters": characters,
                "setting": setting,
                "mood": mood,
            })
        })
        .collect();

    serde_json::json!({
        "title": "Leo and Biscuit",
        "genre": "Friendship",
        "targetAge": "4-8 years",
        "pages": pages,
    })
}

/// A typed outline with `page_count` pages.
///
/// # Panics
///
/// Panics if the fixture JSON does not decode, which would be a bug in the
/// fixture itself.
#[must_use]
pub fn sample_outline(page_count: usize) -> StoryOutline {
    serde_json::from_value(sample_outline_json(page_count)).expect("fixture outline decodes")
}
