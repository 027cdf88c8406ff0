//! System persona and retrieval-context formatting.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use core_config::ConfigError;

use crate::models::{Message, RetrievalMatch, TOP_K};

/// Built-in persona of the professor recommendation assistant.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are an advanced Rate My Professor assistant. Your primary goal is to help students find the best professors according to their specific queries. Each time a user asks for recommendations or information about professors, you are given the top 3 professors retrieved from a database of professor reviews that best match their request.

Here's how you should approach each user query:

Understand the Query:
Carefully read the user's request. This could include the subject they are interested in, their preferred professor rating, or any other specific criteria they provide.

Use the Retrieved Data:
The professors retrieved for the query are appended to the user's message. Base your answer on them.

Generate a Response:
Present the top 3 professors who best meet the user's needs. Provide a brief overview of each professor, including their name, subject expertise, star rating, and a summary of their reviews.

Format the Response Clearly:
Keep the response concise and directly address the user's query. Use exactly this format for each professor:

Professor Name
Subject: [Subject]
Rating: [Rating]/5
Review Summary: [Brief review summary or key highlight]

Example User Query: "I need recommendations for a great Chemistry professor."

Example Response:

Dr. Linda Johnson
Subject: Chemistry
Rating: 5/5
Review Summary: "Very approachable and always willing to help. Highly recommend!"

Dr. Emily White
Subject: Chemistry
Rating: 4/5
Review Summary: "Great teacher but sometimes goes too fast. Overall, learned a lot."

Dr. Sarah Taylor
Subject: Chemistry
Rating: 3/5
Review Summary: "Not bad, but the lectures can be a bit dry."

Make sure to adapt and refine your responses based on the user's specific needs and queries."#;

const RETRIEVAL_HEADER: &str = "\n\nHere are some professors that might meet your criteria:\n\n";
const MATCH_SEPARATOR: &str = "----------------------------------------";

/// Immutable system instruction shared by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    system: Arc<str>,
}

impl PromptTemplate {
    pub fn new(system: impl Into<Arc<str>>) -> Self {
        Self {
            system: system.into(),
        }
    }

    /// Load an alternate persona from a UTF-8 text file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let system = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;

        if system.trim().is_empty() {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                details: "system prompt file is empty".to_string(),
            });
        }

        Ok(Self::new(system))
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    /// Assemble the messages sent to the completion model: persona, the
    /// untouched history, then the query with the retrieval block appended.
    pub fn build_messages(
        &self,
        history: Vec<Message>,
        query: &Message,
        matches: &[RetrievalMatch],
    ) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.system()));
        messages.extend(history);
        messages.push(Message::user(augment_query(&query.content, matches)));
        messages
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

/// Original query text followed by the retrieval block.
pub fn augment_query(query: &str, matches: &[RetrievalMatch]) -> String {
    let mut content = String::with_capacity(query.len() + 256 * matches.len());
    content.push_str(query);
    content.push_str(&format_matches(matches));
    content
}

/// Human-readable block listing at most [`TOP_K`] matches in index order.
pub fn format_matches(matches: &[RetrievalMatch]) -> String {
    let mut block = String::from(RETRIEVAL_HEADER);

    for (rank, professor) in matches.iter().take(TOP_K as usize).enumerate() {
        // Writing into a String cannot fail
        let _ = write!(
            block,
            "Professor {}: {}\nSubject: {}\nRating: {}/5\nReview Summary: {}\n\n{}\n\n",
            rank + 1,
            professor.professor_name,
            professor.subject,
            professor.star_rating,
            professor.review_summary,
            MATCH_SEPARATOR,
        );
    }

    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn professor(name: &str, subject: &str, stars: f64) -> RetrievalMatch {
        RetrievalMatch {
            professor_name: name.to_string(),
            subject: subject.to_string(),
            star_rating: stars,
            review_summary: format!("{} review", name),
            similarity_score: 0.8,
        }
    }

    #[test]
    fn test_format_matches_enumerates_in_order() {
        let block = format_matches(&[
            professor("Dr. A", "Chemistry", 5.0),
            professor("Dr. B", "Chemistry", 4.5),
        ]);

        assert!(block.starts_with(RETRIEVAL_HEADER));
        let a = block.find("Professor 1: Dr. A").unwrap();
        let b = block.find("Professor 2: Dr. B").unwrap();
        assert!(a < b);
        assert!(block.contains("Rating: 5/5"));
        assert!(block.contains("Rating: 4.5/5"));
        assert!(block.contains("Review Summary: Dr. B review"));
        assert!(!block.contains("Professor 3"));
    }

    #[test]
    fn test_format_matches_caps_at_top_k() {
        let matches: Vec<_> = (1..=5)
            .map(|i| professor(&format!("Dr. {}", i), "Math", 3.0))
            .collect();

        let block = format_matches(&matches);
        assert_eq!(block.matches(MATCH_SEPARATOR).count(), 3);
        assert!(!block.contains("Dr. 4"));
    }

    #[test]
    fn test_format_matches_empty_keeps_header_only() {
        assert_eq!(format_matches(&[]), RETRIEVAL_HEADER);
    }

    #[test]
    fn test_augment_query_keeps_original_text_first() {
        let query = "I need a Chemistry professor";
        let augmented = augment_query(query, &[professor("Dr. A", "Chemistry", 5.0)]);
        assert!(augmented.starts_with(query));
        assert!(augmented[query.len()..].contains("Professor 1: Dr. A"));
    }

    #[test]
    fn test_build_messages_layout() {
        let template = PromptTemplate::new("persona");
        let history = vec![Message::user("hi"), Message::assistant("hello")];
        let query = Message::user("Physics?");

        let messages =
            template.build_messages(history.clone(), &query, &[professor("Dr. P", "Physics", 4.0)]);

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0], Message::system("persona"));
        assert_eq!(&messages[1..3], &history[..]);
        assert_eq!(messages[3].role, Role::User);
        assert!(messages[3].content.starts_with("Physics?"));
        assert!(messages[3].content.contains("Dr. P"));
    }

    #[test]
    fn test_default_persona_describes_output_format() {
        let template = PromptTemplate::default();
        assert!(template.system().contains("Rate My Professor"));
        assert!(template.system().contains("Rating: [Rating]/5"));
    }

    #[test]
    fn test_from_file_missing_path() {
        let err = PromptTemplate::from_file("/definitely/not/here.txt").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }

    #[test]
    fn test_from_file_reads_persona() {
        let path = std::env::temp_dir().join(format!("persona-{}.txt", uuid::Uuid::new_v4()));
        std::fs::write(&path, "You recommend history professors.").unwrap();

        let template = PromptTemplate::from_file(&path).unwrap();
        assert_eq!(template.system(), "You recommend history professors.");

        std::fs::remove_file(path).ok();
    }
}
