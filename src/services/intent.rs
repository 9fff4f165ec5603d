// src/services/intent.rs

//! Rule-based classification of user messages.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// What the user is asking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ProgramSpecific,
    Registration,
    Exam,
    News,
    Help,
    Institution,
    Farewell,
    Greeting,
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 9] = [
        Intent::ProgramSpecific,
        Intent::Registration,
        Intent::Exam,
        Intent::News,
        Intent::Help,
        Intent::Institution,
        Intent::Farewell,
        Intent::Greeting,
        Intent::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::ProgramSpecific => "program_specific",
            Intent::Registration => "registration",
            Intent::Exam => "exam",
            Intent::News => "news",
            Intent::Help => "help",
            Intent::Institution => "institution",
            Intent::Farewell => "farewell",
            Intent::Greeting => "greeting",
            Intent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a rule tests the normalized message.
#[derive(Debug)]
pub enum Matcher {
    /// Regex search anywhere in the message.
    Pattern(Regex),
    /// Whole-message match against a word list.
    Exact(&'static [&'static str]),
}

impl Matcher {
    fn matches(&self, text: &str) -> bool {
        match self {
            Matcher::Pattern(regex) => regex.is_match(text),
            Matcher::Exact(words) => words.contains(&text),
        }
    }
}

#[derive(Debug)]
pub struct IntentRule {
    pub matcher: Matcher,
    pub intent: Intent,
}

fn pattern(intent: Intent, re: &str) -> IntentRule {
    IntentRule {
        matcher: Matcher::Pattern(Regex::new(re).expect("valid intent pattern")),
        intent,
    }
}

// Functional topics first; greetings only match messages that are nothing else.
static RULES: LazyLock<Vec<IntentRule>> = LazyLock::new(|| {
    vec![
        pattern(
            Intent::ProgramSpecific,
            r"informatik|computer.*wissenschaft|cs|it.*studium|programmier",
        ),
        pattern(
            Intent::Registration,
            r"anmeld|bewerbung|einschreib|registr|deadline|frist",
        ),
        pattern(
            Intent::Exam,
            r"klausur|prüfung|exam|test|termin.*prüf|wann.*klausur",
        ),
        pattern(
            Intent::News,
            r"news|aktuell|neuigkeit|was.*neu|was.*los|info|nachricht",
        ),
        pattern(Intent::Help, r"hilfe|help|was.*kann|befehle|funktionen"),
        pattern(
            Intent::Institution,
            r"westfälische|hochschule|uni|wh|studium|semester",
        ),
        pattern(Intent::Farewell, r"tschüss|bye|ciao|danke|bis"),
        pattern(
            Intent::Greeting,
            r"^(hi|hello|hey|moin|hallo|guten\s*(tag|morgen|abend)|servus|grüß)[.!?]*\s*$",
        ),
        IntentRule {
            matcher: Matcher::Exact(&["hi", "hey", "hallo", "hello", "moin", "start"]),
            intent: Intent::Greeting,
        },
    ]
});

/// Maps free text to an [`Intent`]; the first matching rule wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    /// The ordered rule list.
    pub fn rules(&self) -> &'static [IntentRule] {
        &RULES
    }

    pub fn classify(&self, text: &str) -> Intent {
        let normalized = text.trim().to_lowercase();
        let intent = self
            .rules()
            .iter()
            .find(|rule| rule.matcher.matches(&normalized))
            .map(|rule| rule.intent)
            .unwrap_or(Intent::Unknown);

        log::debug!("Classified {:?} as {}", normalized, intent);
        intent
    }
}
