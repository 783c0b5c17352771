//! # Localização de Candidatos e Extração de Features
//!
//! Varre o fluxo de tokens procurando as palavras-alvo do léxico e produz,
//! para cada ocorrência, um candidato endereçado por `(sentença, posição,
//! comprimento)` e uma instância com as features de contexto. Entradas
//! diferentes do léxico podem começar no mesmo token: "banco" e "banco de
//! dados" geram dois candidatos sobrepostos, e é o resolvedor quem decide
//! a saída depois da avaliação.
//!
//! ## Features extraídas
//!
//! - `w-2`, `w-1`, `w+1`, `w+2`: palavras vizinhas (minúsculas), puladas as
//!   cobertas pelo próprio candidato; vizinho fora da sentença não vira
//!   feature.
//! - `c-1+1`: colocação `vizinho-anterior_vizinho-seguinte`, só quando os
//!   dois existem.
//! - `cap`: binária, cabeça com inicial maiúscula.
//! - `pos`: numérica, posição da cabeça dentro da sentença.

use wsd_core::{Candidate, Feature, SimpleInstance};

use crate::tokenizer::Token;

/// Entrada do léxico: sequência de palavras (minúsculas) de um lexelt.
pub struct LexiconEntry {
    pub lexelt: &'static str,
    pub words: &'static [&'static str],
}

/// Léxico padrão da demonstração, alinhado ao corpus de treinamento.
pub fn default_lexicon() -> Vec<LexiconEntry> {
    vec![
        LexiconEntry { lexelt: "banco.n", words: &["banco"] },
        LexiconEntry { lexelt: "banco_de_dados.n", words: &["banco", "de", "dados"] },
        LexiconEntry { lexelt: "manga.n", words: &["manga"] },
        LexiconEntry { lexelt: "vela.n", words: &["vela"] },
        LexiconEntry { lexelt: "cabo.n", words: &["cabo"] },
    ]
}

/// Uma ocorrência localizada: o candidato para o resolvedor e a instância
/// com as features, ainda sem rótulo.
pub struct Extraction {
    pub lexelt: String,
    pub candidate: Candidate,
    pub instance: SimpleInstance,
}

/// Localizador de candidatos sobre um léxico fixo.
pub struct Extractor {
    lexicon: Vec<LexiconEntry>,
}

impl Extractor {
    pub fn new(lexicon: Vec<LexiconEntry>) -> Self {
        Extractor { lexicon }
    }

    pub fn with_default_lexicon() -> Self {
        Extractor::new(default_lexicon())
    }

    /// Varre os tokens e devolve todas as ocorrências de todas as entradas
    /// do léxico, na ordem do texto. Ocorrências sobrepostas são todas
    /// emitidas.
    pub fn extract(&self, doc_id: &str, tokens: &[Token]) -> Vec<Extraction> {
        let lowered: Vec<String> = tokens.iter().map(|t| t.text.to_lowercase()).collect();

        let mut extractions = Vec::new();
        for pos in 0..tokens.len() {
            for entry in &self.lexicon {
                if !matches_at(&lowered, tokens, pos, entry.words) {
                    continue;
                }
                let head = &tokens[pos];
                let instance_id = format!(
                    "{}.{}.s{}t{}",
                    entry.lexelt, doc_id, head.sentence, head.index
                );
                let candidate = Candidate::new(
                    instance_id.clone(),
                    head.sentence,
                    head.index,
                    entry.words.len(),
                );
                let instance = build_instance(
                    instance_id,
                    doc_id,
                    &lowered,
                    tokens,
                    pos,
                    entry.words.len(),
                );
                extractions.push(Extraction {
                    lexelt: entry.lexelt.to_string(),
                    candidate,
                    instance,
                });
            }
        }
        extractions
    }
}

/// A sequência do léxico casa em `pos` sem atravessar fronteira de sentença?
fn matches_at(lowered: &[String], tokens: &[Token], pos: usize, words: &[&str]) -> bool {
    if pos + words.len() > tokens.len() {
        return false;
    }
    let sentence = tokens[pos].sentence;
    words.iter().enumerate().all(|(k, word)| {
        tokens[pos + k].sentence == sentence && lowered[pos + k] == *word
    })
}

/// Vizinho na posição absoluta `at`, só se ainda estiver na mesma sentença.
fn neighbor<'a>(lowered: &'a [String], tokens: &[Token], at: isize, sentence: usize) -> Option<&'a str> {
    if at < 0 {
        return None;
    }
    let at = at as usize;
    if at >= tokens.len() || tokens[at].sentence != sentence {
        return None;
    }
    Some(lowered[at].as_str())
}

fn build_instance(
    instance_id: String,
    doc_id: &str,
    lowered: &[String],
    tokens: &[Token],
    pos: usize,
    length: usize,
) -> SimpleInstance {
    let head = &tokens[pos];
    let after = pos + length;

    let mut instance = SimpleInstance::new(instance_id, doc_id);
    let window = [
        ("w-2", pos as isize - 2),
        ("w-1", pos as isize - 1),
        ("w+1", after as isize),
        ("w+2", after as isize + 1),
    ];
    for (key, at) in window {
        if let Some(word) = neighbor(lowered, tokens, at, head.sentence) {
            instance.push(Feature::categorical(key, word));
        }
    }
    let before = neighbor(lowered, tokens, pos as isize - 1, head.sentence);
    let following = neighbor(lowered, tokens, after as isize, head.sentence);
    if let (Some(b), Some(f)) = (before, following) {
        instance.push(Feature::categorical("c-1+1", format!("{b}_{f}")));
    }
    instance.push(Feature::binary(
        "cap",
        head.text.chars().next().is_some_and(|c| c.is_uppercase()),
    ));
    instance.push(Feature::numeric("pos", head.index as f64));
    instance
}
