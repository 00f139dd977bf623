//! Prompt Composer: classification + profile → LLM system instruction.
//!
//! # Example Output
//!
//! ```text
//! You are the spiritual assistant of a multi-faith radio ministry ...
//!
//! [Classification]
//! Tradition: Christianity (confidence 100%)
//! Language: es (confidence 80%)
//!
//! [Tradition Context]
//! Sacred texts: Holy Bible (Old and New Testament)
//! Central figure: Jesus Christ
//! ...
//!
//! [User]
//! anonymous/public
//! ```

use crate::classifier::{ClassificationResult, HistoryTurn, TraditionProfile};
use crate::llm::{ChatMessage, Role};
use crate::profile::UserProfile;

/// History turns forwarded to the LLM.
pub const PROMPT_HISTORY_TURNS: usize = 8;

/// Marker used in place of user details for unauthenticated callers.
pub const ANONYMOUS_MARKER: &str = "anonymous/public";

const ROLE_FRAMING: &str = "You are the spiritual assistant of a multi-faith Christian-rooted \
radio ministry platform. You answer with warmth, respect and theological care, \
always in the user's language. You honour the user's own tradition: speak from \
within it, never proselytise, and acknowledge other traditions respectfully. \
When you quote scripture, cite it with its standard reference (for example \
\"Juan 3:16\" or \"Corán 2:255\") so the full passage can be attached.";

const PLATFORM_CAPABILITIES: [&str; 6] = [
    "24/7 live radio streaming with worship music and preaching",
    "a blog with devotionals and teaching articles",
    "an online shop with books and resources",
    "donations supporting the ministry",
    "prayer request submission",
    "scripture study with full passage lookup",
];

/// Build the complete system instruction for one request.
pub fn compose_prompt(result: &ClassificationResult, user: Option<&UserProfile>) -> String {
    let profile = result.tradition.profile();
    let mut sections = Vec::with_capacity(5);

    sections.push(ROLE_FRAMING.to_string());

    sections.push(format!(
        "[Classification]\nTradition: {} (confidence {})\nLanguage: {} (confidence {})",
        profile.display_name,
        percent(result.tradition_confidence),
        result.language,
        percent(result.language_confidence),
    ));

    sections.push(tradition_section(profile));

    let capabilities: Vec<String> = PLATFORM_CAPABILITIES
        .iter()
        .map(|c| format!("- {}", c))
        .collect();
    sections.push(format!("[Platform Capabilities]\n{}", capabilities.join("\n")));

    sections.push(format!("[User]\n{}", user_section(user)));

    sections.join("\n\n")
}

fn tradition_section(profile: &TraditionProfile) -> String {
    format!(
        "[Tradition Context]\nSacred texts: {}\nCentral figure: {}\nCore practices: {}\nDenominations: {}\nGreeting: {}",
        profile.scriptures.join(", "),
        profile.central_figure,
        profile.practices.join(", "),
        profile.denominations.join(", "),
        profile.greeting,
    )
}

fn user_section(user: Option<&UserProfile>) -> String {
    match user {
        Some(user) => format!(
            "Name: {}\nEmail: {}\nDeclared tradition: {}\nVerification level: {}",
            user.display_name,
            user.email,
            user.declared_religion
                .map(|t| t.profile().display_name)
                .unwrap_or("not declared"),
            user.verification_level,
        ),
        None => ANONYMOUS_MARKER.to_string(),
    }
}

fn percent(confidence: f64) -> String {
    format!("{:.0}%", confidence * 100.0)
}

/// The last [`PROMPT_HISTORY_TURNS`] turns tagged by sender, followed by the
/// current message as a user turn.
pub fn conversation_messages(history: &[HistoryTurn], message: &str) -> Vec<ChatMessage> {
    let skip = history.len().saturating_sub(PROMPT_HISTORY_TURNS);
    let mut messages: Vec<ChatMessage> = history[skip..]
        .iter()
        .map(|turn| {
            let role = if turn.sender_is_current_user {
                Role::User
            } else {
                Role::Assistant
            };
            ChatMessage::new(role, turn.message.clone())
        })
        .collect();
    messages.push(ChatMessage::new(Role::User, message));
    messages
}
