use std::collections::HashMap;
use wordroom_types::LetterState;

pub struct GuessEvaluator;

impl GuessEvaluator {
    /// Per-letter feedback for `guess` against `secret`.
    ///
    /// Both words are expected to be normalized (uppercase) and of equal
    /// length; the room rejects mismatched lengths before calling this. If
    /// they differ anyway only the common prefix is compared and the rest of
    /// the guess is `Wrong`.
    pub fn evaluate(secret: &str, guess: &str) -> Vec<LetterState> {
        let secret_chars: Vec<char> = secret.chars().collect();
        let guess_chars: Vec<char> = guess.chars().collect();

        // Count frequency of each letter in the secret for handling duplicates
        let mut remaining: HashMap<char, usize> = HashMap::new();
        for ch in &secret_chars {
            *remaining.entry(*ch).or_insert(0) += 1;
        }

        let mut result = vec![LetterState::Wrong; guess_chars.len()];

        // First pass: exact positions
        for (i, &ch) in guess_chars.iter().enumerate() {
            if secret_chars.get(i) == Some(&ch) {
                result[i] = LetterState::Correct;
                if let Some(count) = remaining.get_mut(&ch) {
                    *count -= 1;
                }
            }
        }

        // Second pass: letters present elsewhere, limited by what is left
        for (i, &ch) in guess_chars.iter().enumerate() {
            if result[i] == LetterState::Correct || i >= secret_chars.len() {
                continue;
            }

            match remaining.get_mut(&ch) {
                Some(count) if *count > 0 => {
                    result[i] = LetterState::Misplaced;
                    *count -= 1;
                }
                _ => {}
            }
        }

        result
    }

    pub fn is_solved(result: &[LetterState]) -> bool {
        !result.is_empty() && result.iter().all(|state| *state == LetterState::Correct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LetterState::{Correct, Misplaced, Wrong};

    fn marks_per_letter(guess: &str, result: &[LetterState]) -> HashMap<char, usize> {
        let mut marks = HashMap::new();
        for (ch, state) in guess.chars().zip(result) {
            if *state != Wrong {
                *marks.entry(ch).or_insert(0) += 1;
            }
        }
        marks
    }

    fn letter_counts(word: &str) -> HashMap<char, usize> {
        let mut counts = HashMap::new();
        for ch in word.chars() {
            *counts.entry(ch).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_exact_match_is_all_correct() {
        for word in ["HALLO", "KAFFEE", "BROT", "FENSTER"] {
            let result = GuessEvaluator::evaluate(word, word);
            assert_eq!(result.len(), word.len());
            assert!(GuessEvaluator::is_solved(&result));
        }
    }

    #[test]
    fn test_partial_match() {
        // DANKE vs BANKE: only the first letter differs and B is not in DANKE
        let result = GuessEvaluator::evaluate("DANKE", "BANKE");
        assert_eq!(result, vec![Wrong, Correct, Correct, Correct, Correct]);

        // SONNE vs NASEN
        // N(0): S O N N E has two Ns, neither at 0 -> misplaced
        // A(1): not in word -> wrong
        // S(2): S at 0 -> misplaced
        // E(3): E at 4 -> misplaced
        // N(4): one N left -> misplaced
        let result = GuessEvaluator::evaluate("SONNE", "NASEN");
        assert_eq!(result, vec![Misplaced, Wrong, Misplaced, Misplaced, Misplaced]);
    }

    #[test]
    fn test_duplicate_letters_never_double_counted() {
        // Secret has one L at position 0
        let result = GuessEvaluator::evaluate("LOVE", "LLLL");
        assert_eq!(result, vec![Correct, Wrong, Wrong, Wrong]);

        // Exact match consumes the only A before the misplaced pass sees it
        let result = GuessEvaluator::evaluate("BAUM", "AAAA");
        assert_eq!(result, vec![Wrong, Correct, Wrong, Wrong]);

        // Two Ls in guess, one in secret, neither in place
        let result = GuessEvaluator::evaluate("SALZ", "LLXY");
        assert_eq!(result, vec![Misplaced, Wrong, Wrong, Wrong]);
    }

    #[test]
    fn test_anagram_marks_respect_letter_counts() {
        let secret = "LOVE";
        let guess = "OLEV";
        let result = GuessEvaluator::evaluate(secret, guess);
        assert_eq!(result, vec![Misplaced, Misplaced, Misplaced, Misplaced]);

        let counts = letter_counts(secret);
        for (letter, marked) in marks_per_letter(guess, &result) {
            assert!(marked <= counts.get(&letter).copied().unwrap_or(0));
        }
    }

    #[test]
    fn test_marks_never_exceed_secret_counts() {
        let pairs = [
            ("HALLO", "LLLLL"),
            ("KAFFEE", "EEFFAK"),
            ("BITTE", "TTTTT"),
            ("WASSER", "SSSSSS"),
            ("ZUCKER", "REKCUZ"),
            ("PIZZA", "ZAZIP"),
        ];

        for (secret, guess) in pairs {
            let result = GuessEvaluator::evaluate(secret, guess);
            let counts = letter_counts(secret);
            for (letter, marked) in marks_per_letter(guess, &result) {
                assert!(
                    marked <= counts.get(&letter).copied().unwrap_or(0),
                    "{} marked {} times for {} vs {}",
                    letter,
                    marked,
                    secret,
                    guess
                );
            }
        }
    }

    #[test]
    fn test_umlauts_compare_as_single_letters() {
        let result = GuessEvaluator::evaluate("MÜDE", "MÜDE");
        assert_eq!(result.len(), 4);
        assert!(GuessEvaluator::is_solved(&result));

        let result = GuessEvaluator::evaluate("MÜDE", "ÜMDE");
        assert_eq!(result, vec![Misplaced, Misplaced, Correct, Correct]);
    }

    #[test]
    fn test_mismatched_lengths_do_not_panic() {
        let result = GuessEvaluator::evaluate("HAUS", "HAUSE");
        assert_eq!(result, vec![Correct, Correct, Correct, Correct, Wrong]);

        let result = GuessEvaluator::evaluate("HAUS", "HA");
        assert_eq!(result, vec![Correct, Correct]);
        assert!(!GuessEvaluator::is_solved(&[]));
    }
}
