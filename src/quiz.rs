use crate::llm::Conversation;

pub const PLACEHOLDER: &str = "<?>";

pub struct Quiz {
    conversation: Conversation,
}

impl Quiz {
    pub fn new(conversation: Conversation) -> Self {
        Self { conversation }
    }

    pub fn question(&self) -> Vec<String> {
        let phrase = &self.conversation.phrase;
        // A phrase occurring in neither line means the generator broke its
        // contract. The lines come back unmodified, but the miss is logged.
        if !self
            .conversation
            .comments
            .iter()
            .any(|c| c.comment.contains(phrase.as_str()))
        {
            log::warn!("phrase {phrase:?} does not occur in the dialogue, question is unmasked");
        }

        self.conversation
            .comments
            .iter()
            .map(|c| c.comment.replace(phrase.as_str(), PLACEHOLDER))
            .collect()
    }

    pub fn hint(&self) -> String {
        // The phrase tends to carry sentence punctuation inside the dialogue
        // but not inside the nuance, hence the trailing strip. The search is
        // exact-case, so any other surface difference leaves the nuance
        // unmasked.
        let needle = self.conversation.phrase.trim_end_matches(['.', '!']);
        if !self.conversation.nuance.contains(needle) {
            log::warn!("phrase {needle:?} does not occur in the nuance text, hint is unmasked");
            return self.conversation.nuance.clone();
        }
        self.conversation.nuance.replacen(needle, PLACEHOLDER, 1)
    }

    pub fn japanese(&self) -> &str {
        &self.conversation.japanese_explanation
    }

    pub fn correct_answer(&self) -> &str {
        &self.conversation.phrase
    }

    pub fn confirm(&self, candidate: &str) -> bool {
        normalize(&self.conversation.phrase) == normalize(candidate)
    }
}

fn normalize(text: &str) -> String {
    text.to_lowercase()
        .trim_end_matches(['.', '!', '?'])
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Comment;

    fn conversation(phrase: &str, lines: [&str; 2], nuance: &str) -> Conversation {
        Conversation {
            original_phrase: phrase.to_owned(),
            phrase: phrase.to_owned(),
            japanese_explanation: "氷を砕くように場を和ませることを意味します。".to_owned(),
            nuance: nuance.to_owned(),
            comments: vec![
                Comment {
                    speaker: "Alice".to_owned(),
                    comment: lines[0].to_owned(),
                },
                Comment {
                    speaker: "Bob".to_owned(),
                    comment: lines[1].to_owned(),
                },
            ],
        }
    }

    #[test]
    fn masks_single_occurrence_and_leaves_rest_intact() {
        let quiz = Quiz::new(conversation(
            "break the ice",
            [
                "How did the party go?",
                "I tried to break the ice at the party.",
            ],
            "It means easing initial tension.",
        ));
        assert_eq!(
            quiz.question(),
            vec![
                "How did the party go?".to_owned(),
                "I tried to <?> at the party.".to_owned(),
            ]
        );
    }

    #[test]
    fn question_is_idempotent() {
        let quiz = Quiz::new(conversation(
            "break the ice",
            ["Hi.", "Let's break the ice."],
            "Easing tension.",
        ));
        assert_eq!(quiz.question(), quiz.question());
        assert_eq!(quiz.hint(), quiz.hint());
    }

    #[test]
    fn missing_phrase_degrades_to_unmodified_lines() {
        let quiz = Quiz::new(conversation(
            "break the ice",
            ["How was it?", "I broke the ice somehow."],
            "Easing tension.",
        ));
        assert_eq!(
            quiz.question(),
            vec![
                "How was it?".to_owned(),
                "I broke the ice somehow.".to_owned(),
            ]
        );
    }

    #[test]
    fn hint_masks_first_occurrence_with_trailing_punctuation_stripped() {
        let quiz = Quiz::new(conversation(
            "break the ice.",
            ["Hi.", "Let's break the ice."],
            "To break the ice is to ease the first awkward moments.",
        ));
        assert_eq!(
            quiz.hint(),
            "To <?> is to ease the first awkward moments."
        );
    }

    #[test]
    fn hint_passes_nuance_through_when_surface_form_differs() {
        let quiz = Quiz::new(conversation(
            "break the ice?",
            ["Hi.", "Break the ice?"],
            "Used when easing tension.",
        ));
        // Only `.` and `!` are stripped before the search, so a trailing `?`
        // keeps the needle from matching.
        assert_eq!(quiz.hint(), "Used when easing tension.");
    }

    #[test]
    fn confirm_ignores_case_and_trailing_punctuation() {
        let quiz = Quiz::new(conversation(
            "break the ice.",
            ["Hi.", "Let's break the ice."],
            "Easing tension.",
        ));
        assert!(quiz.confirm("Break the ice!"));
        assert!(quiz.confirm("break the ice?"));
        assert!(quiz.confirm("BREAK THE ICE"));
    }

    #[test]
    fn confirm_rejects_different_wording() {
        let quiz = Quiz::new(conversation(
            "break the ice",
            ["Hi.", "Let's break the ice."],
            "Easing tension.",
        ));
        assert!(!quiz.confirm("broke the ice"));
        assert!(!quiz.confirm("break  the ice"));
        assert!(!quiz.confirm("break the ice cream"));
    }

    #[test]
    fn confirm_only_strips_trailing_punctuation() {
        let quiz = Quiz::new(conversation(
            "break the ice",
            ["Hi.", "Let's break the ice."],
            "Easing tension.",
        ));
        assert!(!quiz.confirm("!break the ice"));
    }

    #[test]
    fn new_round_fully_replaces_the_previous_conversation() {
        let first = Quiz::new(conversation(
            "break the ice",
            ["Hi.", "Let's break the ice."],
            "Easing tension.",
        ));
        assert!(first.confirm("break the ice"));

        let second = Quiz::new(conversation(
            "call it a day",
            ["It's late.", "Let's call it a day."],
            "Deciding to stop working.",
        ));
        assert_eq!(second.correct_answer(), "call it a day");
        assert!(!second.confirm("break the ice"));
        for line in second.question() {
            assert!(!line.contains("break the ice"));
        }
    }
}
