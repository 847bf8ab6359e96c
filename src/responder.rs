//! Keyword replies for the chat widget.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Source of the fallback choice. `pick` returns an index below `len`.
pub trait RandomSource {
    fn pick(&mut self, len: usize) -> usize;
}

/// `rand`-backed source, seeded for reproducible sessions or from entropy.
pub struct StdRandom(StdRng);

impl StdRandom {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl RandomSource for StdRandom {
    fn pick(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

/// Always picks the same index (wrapped into range).
pub struct FixedChoice(pub usize);

impl RandomSource for FixedChoice {
    fn pick(&mut self, len: usize) -> usize {
        self.0 % len
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub reply: String,
}

impl KeywordRule {
    pub fn new(keyword: &str, reply: &str) -> Self {
        Self {
            keyword: keyword.to_lowercase(),
            reply: reply.to_string(),
        }
    }
}

const DEFAULT_RULES: [(&str, &str); 18] = [
    ("hello", "Hello! Welcome to KiwiArt. How can I assist you? 😊"),
    ("hi", "Hi there! What would you like to know about our gemstone art?"),
    ("price", "Our paintings range from $850 to $1950. Would you like to know about a specific piece?"),
    ("material", "We use natural precious stones like Lapis Lazuli, Amethyst, Turquoise, and more. Each piece is unique!"),
    ("buy", "You can browse our collection in the Gallery section. Open any artwork to see more details!"),
    ("gallery", "Check out our Gallery section to see all our amazing gemstone artworks! 🎨"),
    ("contact", "You can reach us through Instagram, Facebook, TikTok, or Viber. Follow us for updates!"),
    ("size", "Our artworks range from 16x20 inches to 40x30 inches. Each piece is custom-sized."),
    ("artist", "Our pieces are created by talented artists from around the world, each bringing their unique vision to gemstone art."),
    ("delivery", "We offer worldwide shipping! For delivery information, please contact us through our social media."),
    ("instagram", "Follow us on Instagram @kiwiart for daily updates and behind-the-scenes content!"),
    ("facebook", "Join us on Facebook at facebook.com/kiwiart for exclusive offers!"),
    ("tiktok", "Check out our TikTok @kiwiart for creative short videos!"),
    ("youtube", "Subscribe to our YouTube channel youtube.com/@kiwiart for tutorials and showcases!"),
    ("commission", "We accept custom commissions! Contact us to discuss your vision."),
    ("video", "Yes! Some of our pieces have video showcases. Check the Gallery for videos!"),
    ("thanks", "You're welcome! Feel free to ask anything else about our art! 🌟"),
    ("help", "I can help you with: pricing, materials, gallery info, shipping, commissions, and more!"),
];

const FALLBACK_REPLIES: [&str; 4] = [
    "That's a great question! Could you tell me more about what you're interested in?",
    "I'm here to help! Ask me about our artworks, prices, materials, or anything else!",
    "Interesting! For more detailed information, you can contact us through our social media channels.",
    "I'd love to help! Try asking about pricing, materials, gallery, or how to order.",
];

pub fn default_rules() -> Vec<KeywordRule> {
    DEFAULT_RULES
        .iter()
        .map(|(keyword, reply)| KeywordRule::new(keyword, reply))
        .collect()
}

pub fn fallback_replies() -> Vec<String> {
    FALLBACK_REPLIES.iter().map(|s| s.to_string()).collect()
}

pub struct ResponderEngine<R> {
    rules: Vec<KeywordRule>,
    fallbacks: Vec<String>,
    random: R,
}

impl<R: RandomSource> ResponderEngine<R> {
    pub fn new(random: R) -> Self {
        Self::with_rules(default_rules(), random)
    }

    /// Engine over a custom rule table; keywords are lowercased and matched
    /// in the given order.
    pub fn with_rules(rules: Vec<KeywordRule>, random: R) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| KeywordRule {
                keyword: rule.keyword.to_lowercase(),
                reply: rule.reply,
            })
            .collect();
        Self {
            rules,
            fallbacks: fallback_replies(),
            random,
        }
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn fallbacks(&self) -> &[String] {
        &self.fallbacks
    }

    pub fn respond(&mut self, message: &str) -> String {
        if let Some(rule) = self.matching_rule(message) {
            return rule.reply.clone();
        }
        let index = self.random.pick(self.fallbacks.len());
        self.fallbacks[index].clone()
    }

    /// First rule, in table order, whose keyword occurs in `message`.
    pub fn matching_rule(&self, message: &str) -> Option<&KeywordRule> {
        let normalized = message.to_lowercase();
        self.rules
            .iter()
            // an empty keyword would match every message
            .filter(|rule| !rule.keyword.is_empty())
            .find(|rule| normalized.contains(rule.keyword.as_str()))
    }
}
