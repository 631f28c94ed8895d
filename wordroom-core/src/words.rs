use anyhow::{Result, anyhow};
use rand::Rng;
use wordroom_types::Word;

/// Source of the secret word for each round.
pub trait WordSource: Send + Sync {
    fn random_word(&self) -> Word;
}

/// Built-in vocabulary: A1-A2 German words with a one-line hint each.
pub const DEFAULT_WORD_LIST: &str = "\
# WORD|hint
HALLO|Man sagt das zur Begrüßung
DANKE|Man sagt das, wenn man höflich ist
BITTE|Ein höfliches Wort beim Fragen
HAUS|Hier wohnen Menschen
AUTO|Ein Fahrzeug mit vier Rädern
KATZE|Ein beliebtes Haustier
HUND|Ein treues Haustier
SCHULE|Hier lernen Kinder
WASSER|Man trinkt das jeden Tag
BUCH|Man kann es lesen
APFEL|Eine rote oder grüne Frucht
BROT|Man isst es zum Frühstück
KAFFEE|Ein heißes Getränk am Morgen
MILCH|Ein weißes Getränk von der Kuh
ZUCKER|Macht das Essen süß
SALZ|Macht das Essen lecker
SONNE|Scheint am Tag am Himmel
MOND|Scheint in der Nacht am Himmel
FREUND|Eine wichtige Person im Leben
STADT|Viele Menschen leben hier
DORF|Kleine Stadt auf dem Land
BAUM|Wächst im Garten oder Wald
BLUME|Riecht gut und ist bunt
BRIEF|Man schreibt das an Freunde
FENSTER|Man sieht dadurch nach draußen
TISCH|Man isst daran
STUHL|Man sitzt darauf
FARBE|Rot, Blau und Grün sind das
MUSIK|Man hört das gerne
BALL|Man spielt damit Sport
HANDY|Man telefoniert damit
MONAT|Januar ist einer davon
BILD|Man kann das anschauen
KINO|Hier sieht man Filme
PIZZA|Ein leckeres Essen aus Italien
";

#[derive(Debug, Clone)]
pub struct Vocabulary {
    words: Vec<Word>,
}

impl Vocabulary {
    /// Parse a `WORD|hint` list, one entry per line.
    ///
    /// Blank lines and lines starting with `#` are skipped. Words are trimmed
    /// and uppercased and must be purely alphabetic.
    pub fn from_word_list(word_list: &str) -> Result<Self> {
        let mut words = Vec::new();

        for (line_number, line) in word_list.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (word, hint) = line
                .split_once('|')
                .ok_or_else(|| anyhow!("Line {}: expected WORD|hint", line_number + 1))?;

            let word = word.trim().to_uppercase();
            if word.is_empty() || !Self::is_alphabetic(&word) {
                return Err(anyhow!(
                    "Line {}: '{}' is not a valid word",
                    line_number + 1,
                    word
                ));
            }

            words.push(Word::new(word, hint.trim()));
        }

        if words.is_empty() {
            return Err(anyhow!("No words available"));
        }

        Ok(Self { words })
    }

    /// The built-in vocabulary.
    pub fn builtin() -> Result<Self> {
        Self::from_word_list(DEFAULT_WORD_LIST)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        let word = word.trim().to_uppercase();
        self.words.iter().any(|w| w.word == word)
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    fn is_alphabetic(word: &str) -> bool {
        word.chars().all(|c| c.is_alphabetic())
    }
}

impl WordSource for Vocabulary {
    fn random_word(&self) -> Word {
        // `from_word_list` never builds an empty vocabulary
        let index = rand::rng().random_range(0..self.words.len());
        self.words[index].clone()
    }
}
