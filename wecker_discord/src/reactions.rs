use serenity::all::{EmojiId, ReactionType};
use wecker_models::reminder::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionEmoji {
    Unicode(&'static str),
    Custom(u64),
}

impl ReactionEmoji {
    pub(crate) fn reaction_type(self) -> ReactionType {
        match self {
            ReactionEmoji::Unicode(emoji) => ReactionType::Unicode(emoji.to_owned()),
            ReactionEmoji::Custom(id) => ReactionType::Custom {
                animated: false,
                id: EmojiId::new(id),
                name: None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionAction {
    React(ReactionEmoji),
    Say(&'static str),
}

/// Keyword tables for the chat reactions. Built once in `main` and handed to
/// the handler; nothing lives in globals.
#[derive(Debug, Clone)]
pub struct ReactionConfig {
    pub drool_words: Vec<String>,
    pub max_words: Vec<String>,
    pub lando_words: Vec<String>,
    pub horn_words: Vec<String>,
    pub grumble_words: Vec<String>,
    pub german_words: Vec<String>,
    pub wann_cs_words: Vec<String>,
    pub grumble_user: Option<UserId>,
    pub grumble_emoji: u64,
    pub db_emoji: u64,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            drool_words: words(&["füssen", "fuss", "fuß", "foot", "voeten", "voet"]),
            max_words: words(&["max", "max verstappen", "verstappen", "maximilian", "maggs"]),
            lando_words: words(&["lando", "norris", "lando norris", "lando no rizz"]),
            horn_words: words(&["tututu", "tödödö"]),
            grumble_words: words(&["törken", "franzosen", "nederlanders", "niederländer"]),
            german_words: words(&["duits", "deutsch", "deutschland", "german", "duitsers", "arier"]),
            wann_cs_words: words(&["wann cs"]),
            grumble_user: Some(629336494015905792),
            grumble_emoji: 1442859255748362261,
            db_emoji: 1403499851739828356,
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|word| (*word).to_owned()).collect()
}

pub fn classify(content: &str, author: UserId, config: &ReactionConfig) -> Vec<ReactionAction> {
    let lower = content.to_lowercase();
    let matches_any = |words: &[String]| words.iter().any(|word| lower.contains(word.as_str()));
    let mut actions = Vec::new();

    if matches_any(&config.drool_words) {
        actions.push(ReactionAction::React(ReactionEmoji::Unicode("🤤")));
    }
    if matches_any(&config.max_words) {
        actions.push(ReactionAction::React(ReactionEmoji::Unicode("🤤")));
        actions.push(ReactionAction::React(ReactionEmoji::Unicode("🇳🇱")));
        actions.push(ReactionAction::Say("TUTUTUTU"));
    }
    if matches_any(&config.lando_words) {
        actions.push(ReactionAction::React(ReactionEmoji::Unicode("🤮")));
        actions.push(ReactionAction::React(ReactionEmoji::Unicode("🌈")));
    }
    if matches_any(&config.horn_words) {
        actions.push(ReactionAction::Say("MAX VERSTAPPEN"));
    }
    if matches_any(&config.grumble_words) || config.grumble_user == Some(author) {
        actions.push(ReactionAction::React(ReactionEmoji::Custom(config.grumble_emoji)));
    }
    if matches_any(&config.german_words) || contains_word(&lower, "db") {
        actions.push(ReactionAction::React(ReactionEmoji::Custom(config.db_emoji)));
    }
    if matches_any(&config.wann_cs_words) {
        actions.push(ReactionAction::Say("Jetzt!"));
    }

    actions
}

// A bare `db` would fire on half the dictionary; it only counts between word
// boundaries (ASCII letters, digits and underscores bind).
fn contains_word(lower: &str, word: &str) -> bool {
    debug_assert!(word.is_ascii());
    let bytes = lower.as_bytes();
    let mut from = 0;
    while let Some(found) = lower[from..].find(word) {
        let start = from + found;
        let end = start + word.len();
        let left_free = start == 0 || !is_word_byte(bytes[start - 1]);
        let right_free = end == bytes.len() || !is_word_byte(bytes[end]);
        if left_free && right_free {
            return true;
        }
        from = start + 1;
    }

    false
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}
