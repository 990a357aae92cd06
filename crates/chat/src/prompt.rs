//! Prompt assembly — folds the persona, the lexicon legend, and the
//! retrieved passages into the two-message prompt sent on every turn.
//!
//! The system message is built once per assembler and is byte-identical
//! across all calls in a session. The user message follows a fixed
//! template: question, context separator, passages joined in received
//! order, output-format instructions. Passages are concatenated without
//! truncation — oversized context propagates to the completion endpoint
//! unmitigated.

use crate::lexicon::Lexicon;
use touchline_config::PromptConfig;
use touchline_core::message::Message;
use touchline_core::retrieval::Passage;

/// Default persona instructions for the tactical analyst.
const DEFAULT_PERSONA: &str = "\
You are the head tactical analyst for Manchester City.
You prepare match-data and tactical analysis reports for Pep Guardiola.
Drawing on the 2024-25 season's Manchester City match data, you surface \
opposition tactical patterns and information the team can use to improve \
its performance.

The head coach's tactical philosophy:
- Possession-based positional play
- Short passing and build-up to escape pressure
- Inverted full-backs and rotating midfield roles
- High pressing and immediate counter-pressing
- Positioning optimized to connect between the lines
- Responding to opposition shape and tactical changes

Your goals:
1. Support performance improvement through match-data analysis.
2. Identify and report opposition tactical patterns and weaknesses.
3. Propose improvements that reflect the head coach's philosophy.
4. Support decision-making with objective data and tactical insight.

Additional instructions:
- Present data in table form.
- Include tactical implications, not bare listings.
- If a question is ambiguous, ask for clarification.";

/// Separator between passages in the context block.
const PASSAGE_SEPARATOR: &str = "\n\n";

/// Fixed output-format instructions appended to every user message.
const OUTPUT_FORMAT: &str = "\
Output format:
- Present the data as tables.
- Add analysis of the tactical meaning.
- Where useful, include side-by-side comparisons (opponent vs. Manchester City).";

/// Assembles the two-message prompt for each turn.
pub struct PromptAssembler {
    system_message: String,
}

impl PromptAssembler {
    /// Build an assembler from persona text and a lexicon.
    ///
    /// The system message is rendered here, once; `assemble` reuses it
    /// verbatim for every call.
    pub fn new(persona: &str, report_date: Option<&str>, lexicon: &Lexicon) -> Self {
        let mut system_message = String::from(persona);
        if let Some(date) = report_date {
            system_message.push_str("\n\nToday's date is ");
            system_message.push_str(date);
            system_message.push('.');
        }
        system_message.push_str("\n\n");
        system_message.push_str(&lexicon.render());

        Self { system_message }
    }

    /// Build an assembler from prompt config, resolving overrides.
    pub fn from_config(config: &PromptConfig) -> std::io::Result<Self> {
        let lexicon = match &config.lexicon_file {
            Some(path) => Lexicon::load(path)?,
            None => Lexicon::builtin(),
        };
        let persona = config.persona_override.as_deref().unwrap_or(DEFAULT_PERSONA);
        Ok(Self::new(persona, config.report_date.as_deref(), &lexicon))
    }

    /// The constant system message (persona + lexicon legend).
    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    /// Produce exactly two prompt messages for a turn: the constant system
    /// message and the templated user message.
    ///
    /// Passages are joined in received order with a fixed separator. No
    /// query validation, no context truncation. An empty passage list
    /// yields a well-formed user message with an empty context section.
    pub fn assemble(&self, question: &str, passages: &[Passage]) -> Vec<Message> {
        let context = passages
            .iter()
            .map(|p| p.content.as_str())
            .collect::<Vec<_>>()
            .join(PASSAGE_SEPARATOR);

        let user_message = format!(
            "{question}\n\nGround your answer in the context below:\n{context}\n\n{OUTPUT_FORMAT}"
        );

        vec![
            Message::system(&self.system_message),
            Message::user(user_message),
        ]
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_PERSONA, None, &Lexicon::builtin())
    }
}
