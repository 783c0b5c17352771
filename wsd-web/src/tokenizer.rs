//! # Tokenizador para Português Brasileiro
//!
//! Divide o texto bruto em tokens de palavra endereçados por sentença,
//! preservando os offsets de byte originais para destacar os alvos na
//! interface web. A segmentação de palavras segue as fronteiras Unicode
//! (UAX #29), então acentos e números decimais ("3.14") saem inteiros;
//! pontuação não vira token.
//!
//! ## Endereçamento
//!
//! Cada token carrega `(sentence, index)`: o índice é a posição **dentro da
//! sentença** e zera a cada fronteira, porque é esse o endereço que o
//! resolvedor de sobreposição usa para casar candidatos com o texto.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Um token de palavra extraído do texto original.
///
/// Mantém a referência exata da posição no texto (`start` e `end`, em
/// bytes), o que permite destacar as ocorrências na interface sem alterar a
/// formatação original.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "banco", "3.14").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Sentença a que o token pertence (0, 1, 2...).
    pub sentence: usize,
    /// Posição do token dentro da sentença (zera a cada sentença).
    pub index: usize,
}

/// Abreviações comuns em PT-BR cujo ponto não encerra a sentença
const ABBREVIATIONS: &[&str] = &[
    "Dr", "Dra", "Sr", "Sra", "Prof", "Profa", "Eng", "Av", "Gen", "Cel",
    "km", "cm", "kg", "ml", "etc", "pág", "tel", "art",
];

/// Tokeniza o texto em palavras endereçadas por `(sentença, posição)`.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut sentence = 0usize;
    let mut index = 0usize;
    let mut last_word: Option<&str> = None;

    for (start, segment) in text.split_word_bound_indices() {
        if segment.chars().any(char::is_alphanumeric) {
            tokens.push(Token {
                text: segment.to_string(),
                start,
                end: start + segment.len(),
                sentence,
                index,
            });
            index += 1;
            last_word = Some(segment);
            continue;
        }
        if index > 0 && is_sentence_terminator(segment) {
            // ponto de abreviação ("Dr.") não encerra a sentença
            if segment.starts_with('.') && matches!(last_word, Some(w) if ABBREVIATIONS.contains(&w)) {
                continue;
            }
            sentence += 1;
            index = 0;
        }
    }
    tokens
}

fn is_sentence_terminator(segment: &str) -> bool {
    segment.contains(['.', '!', '?', '…'])
}
