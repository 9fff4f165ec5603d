// src/services/responder.rs

//! Turns an intent and the current snapshot into a chat reply.

use std::fmt::Write;

use chrono::Local;
use rand::seq::SliceRandom;

use crate::models::{CAMPUS_PORTAL, PROGRAM, Snapshot, TopicRecord};
use crate::services::extractors::CURRENT;
use crate::services::intent::Intent;

/// Records shown per list reply.
pub const MAX_LISTED: usize = 3;

pub const GREETINGS: &[&str] = &[
    "Moin! 😊",
    "Hey! 👋",
    "Hallo! 🙂",
    "Hi! 😄",
    "Na? 😎",
    "Servus! 🤙",
    "Hallöchen! 👋",
    "Was geht? 😊",
];

pub const GOODBYES: &[&str] = &[
    "Bis bald! 👋",
    "Tschüss! 😊",
    "Ciao! 🙂",
    "Bis später! 👋",
    "Viel Erfolg! 🍀",
    "Mach's gut! 😄",
    "See ya! 👋",
];

const NEWS_PAGE: &str = "w-hs.de/pressemedien/";

/// Chooses one phrase out of a pool.
pub trait PhrasePicker: Send + Sync {
    fn pick(&self, phrases: &[&'static str]) -> &'static str;
}

/// Uniformly random choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPicker;

impl PhrasePicker for RandomPicker {
    fn pick(&self, phrases: &[&'static str]) -> &'static str {
        phrases
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or_default()
    }
}

/// Always the phrase at the given position (wrapping).
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPicker(pub usize);

impl PhrasePicker for FixedPicker {
    fn pick(&self, phrases: &[&'static str]) -> &'static str {
        if phrases.is_empty() {
            return "";
        }
        phrases[self.0 % phrases.len()]
    }
}

/// Renders replies for every [`Intent`].
pub struct Responder {
    program_url: String,
    picker: Box<dyn PhrasePicker>,
}

impl Responder {
    pub fn new(program_url: impl Into<String>, picker: impl PhrasePicker + 'static) -> Self {
        Self {
            program_url: program_url.into(),
            picker: Box::new(picker),
        }
    }

    /// Reply text for `intent`, based on `snapshot`. Never empty.
    pub fn render(&self, intent: Intent, snapshot: &Snapshot) -> String {
        let greeting = self.picker.pick(GREETINGS);
        let stand = format!(
            "⏰ Stand: {}",
            snapshot
                .last_updated
                .with_timezone(&Local)
                .format("%d.%m.%Y, %H:%M:%S")
        );

        match intent {
            Intent::Greeting => format!(
                "{greeting} Schön, dass du da bist! 🎓\n\n\
                 Ich bin dein WH-Buddy und kann dir bei allem rund um die {} helfen! 😊\n\n\
                 Frag mich einfach:\n\
                 📝 \"Wann ist Anmeldung?\"\n\
                 📚 \"Wann sind Klausuren?\"\n\
                 💻 \"{PROGRAM} Prüfungen\"\n\
                 📰 \"Was gibt's Neues?\"\n\
                 ❓ \"Hilfe\" für mehr Optionen\n\n\
                 Ich hole alle Infos live von w-hs.de! 🌐✨\n\n{stand}",
                snapshot.institution
            ),
            Intent::Registration => self.registration(greeting, snapshot, &stand),
            Intent::Exam => self.exams(greeting, snapshot, &stand),
            Intent::News => news(greeting, snapshot, &stand),
            Intent::Help => format!(
                "{greeting} Kein Problem, ich helfe gerne! 😊\n\n\
                 Du kannst mich einfach fragen:\n\n\
                 💬 \"Wann ist die nächste Anmeldung?\"\n\
                 💬 \"Gibt es neue Klausurtermine?\"\n\
                 💬 \"Was gibt's Neues an der WH?\"\n\
                 💬 \"{PROGRAM} Prüfungen\" für FB {PROGRAM}\n\
                 💬 \"Hallo\" für Begrüßung\n\n\
                 Ich verstehe normale Sprache - keine Befehle nötig! 🤖✨\n\n{stand}"
            ),
            Intent::ProgramSpecific => self.program(greeting, snapshot, &stand),
            Intent::Institution => format!(
                "{greeting} Du fragst nach der {}? 🎓\n\n\
                 Ich bin dein persönlicher WH-Assistent und hole alle Infos live von der \
                 offiziellen Website! Frag mich nach:\n\n\
                 📝 Anmeldeterminen\n\
                 📚 Klausurterminen\n\
                 📰 Aktuellen News\n\
                 💻 {PROGRAM}-spezifischen Infos\n\n\
                 Was möchtest du wissen? 😊\n\n{stand}",
                snapshot.institution
            ),
            Intent::Farewell => format!(
                "{} War schön, mit dir zu quatschen! 😊\n\n\
                 Falls du noch Fragen zur WH hast, schreib mich einfach an. \
                 Ich bin immer da! 🤖💙\n\n{stand}",
                self.picker.pick(GOODBYES)
            ),
            Intent::Unknown => format!(
                "{greeting} Hmm, das hab ich nicht ganz verstanden 🤔\n\n\
                 Frag mich gerne nach:\n\
                 • Anmeldeterminen (\"Wann ist Anmeldung?\")\n\
                 • Klausurterminen (\"Wann sind Prüfungen?\")\n\
                 • Aktuellen News (\"Was gibt's Neues?\")\n\n\
                 Oder sag einfach \"Hilfe\" wenn du nicht weiterkommst! 😊\n\n{stand}"
            ),
        }
    }

    fn registration(&self, greeting: &str, snapshot: &Snapshot, stand: &str) -> String {
        if snapshot.registration.is_empty() {
            return format!(
                "{greeting} Momentan hab ich keine aktuellen Anmeldetermine gefunden 🤔\n\n\
                 Schau am besten direkt auf w-hs.de nach oder frag mich später nochmal! \
                 Die Daten werden alle 2 Stunden aktualisiert 🔄\n\n{stand}"
            );
        }

        let (program_only, records) = preferred(&snapshot.registration);
        if program_only {
            let listing = join_blocks(records.iter().map(|r| {
                format!(
                    "📅 {}\n   📍 {}\n   🌐 Anmeldung über: {}",
                    r.description,
                    r.date,
                    r.portal.as_deref().unwrap_or(CAMPUS_PORTAL)
                )
            }));
            return format!(
                "{greeting} Hier sind die {PROGRAM}-Anmeldetermine:\n\n{listing}\n\n{stand}\n\n\
                 Direkter Link: {}\n\n\
                 Vergiss nicht rechtzeitig anzumelden! 💻😉",
                self.program_url
            );
        }

        let listing = join_blocks(
            records
                .iter()
                .map(|r| format!("📅 {}\n   Deadline: {}", r.description, r.date)),
        );
        format!(
            "{greeting} Hier sind die wichtigsten Anmeldetermine:\n\n{listing}\n\n{stand}\n\n\
             Vergiss nicht rechtzeitig anzumelden! 😉"
        )
    }

    fn exams(&self, greeting: &str, snapshot: &Snapshot, stand: &str) -> String {
        if snapshot.exams.is_empty() {
            return format!(
                "{greeting} Keine Klausurtermine im System 📚\n\n\
                 Entweder sind noch keine veröffentlicht oder es ist gerade klausurfreie Zeit! \
                 Check mal w-hs.de für die neuesten Infos 🔍\n\n{stand}"
            );
        }

        let (program_only, records) = preferred(&snapshot.exams);
        if program_only {
            let listing = join_blocks(records.iter().map(|r| {
                format!(
                    "📚 {}\n   📅 {}\n   📝 Anmeldung: {}",
                    r.description,
                    r.date,
                    r.registration_window
                        .as_deref()
                        .unwrap_or("Siehe Informatik-Portal")
                )
            }));
            return format!(
                "{greeting} Die {PROGRAM}-Klausurtermine:\n\n{listing}\n\n{stand}\n\n\
                 🔗 Mehr Details: {}\n\n\
                 Schon fleißig am programmieren? 💻💪 Viel Erfolg!",
                self.program_url
            );
        }

        let listing = join_blocks(
            records
                .iter()
                .map(|r| format!("📚 {}\n   Termin: {}", r.description, r.date)),
        );
        format!(
            "{greeting} Die anstehenden Klausurtermine:\n\n{listing}\n\n{stand}\n\n\
             Schon fleißig am lernen? 💪 Viel Erfolg!"
        )
    }

    fn program(&self, greeting: &str, snapshot: &Snapshot, stand: &str) -> String {
        let mut text = format!(
            "{greeting} Alles klar, du fragst nach dem Fachbereich {PROGRAM}! 💻\n\n"
        );

        if let Some(next) = snapshot.registration.iter().find(|r| r.is_for(PROGRAM)) {
            let _ = write!(
                text,
                "📝 Nächste Anmeldung:\n{}\n📅 {}\n🌐 {}\n\n",
                next.description,
                next.date,
                next.portal.as_deref().unwrap_or(CAMPUS_PORTAL)
            );
        }
        if let Some(next) = snapshot.exams.iter().find(|r| r.is_for(PROGRAM)) {
            let _ = write!(
                text,
                "📚 Nächste Prüfungsperiode:\n{}\n📅 {}\n\n",
                next.description, next.date
            );
        }

        let _ = write!(
            text,
            "🔗 {PROGRAM} Info-Center:\n{}\n\n{stand}\n\nCode gut, lebe besser! 😄💾",
            self.program_url
        );
        text
    }
}

fn news(greeting: &str, snapshot: &Snapshot, stand: &str) -> String {
    if snapshot.news.is_empty() {
        return format!(
            "{greeting} Grad ist es ruhig an der WH 📰\n\n\
             Keine aktuellen News gefunden. Schau später nochmal vorbei! 😊\n\n{stand}"
        );
    }

    let listing = join_blocks(snapshot.news.iter().take(MAX_LISTED).map(|n| {
        let mut item = format!("📰 {}", n.description);
        if let Some(content) = n.content.as_deref().filter(|c| c.chars().count() > 10) {
            let _ = write!(item, "\n   {content}");
        }
        if n.date != CURRENT {
            let _ = write!(item, "\n   📅 {}", n.date);
        }
        item
    }));
    format!(
        "{greeting} Das läuft grad an der WH:\n\n{listing}\n\n{stand}\n\
         🔗 Mehr Details auf {NEWS_PAGE} 🌐"
    )
}

/// Up to [`MAX_LISTED`] records, program records first if there are any.
///
/// The flag tells whether the selection is program-specific.
fn preferred(records: &[TopicRecord]) -> (bool, Vec<&TopicRecord>) {
    let program: Vec<&TopicRecord> = records
        .iter()
        .filter(|r| r.is_for(PROGRAM))
        .take(MAX_LISTED)
        .collect();
    if program.is_empty() {
        (false, records.iter().take(MAX_LISTED).collect())
    } else {
        (true, program)
    }
}

fn join_blocks(blocks: impl Iterator<Item = String>) -> String {
    blocks.collect::<Vec<_>>().join("\n\n")
}
