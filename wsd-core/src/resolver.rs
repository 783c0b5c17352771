//! # Resolução de Sobreposição de Candidatos
//!
//! Depois de uma rodada de avaliação, cada lexelt devolve probabilidades
//! por instância, mas instâncias de expressões multipalavra se sobrepõem no
//! texto: "banco" e "banco de dados" podem começar no mesmo token. Este
//! módulo caminha pelos tokens do corpus em ordem de documento e reconcilia
//! os resultados num único fluxo decorado:
//!
//! - os resultados são indexados pelo id de instância numa tabela construída
//!   a partir do próprio conjunto, então a ordem da lista de resultados é
//!   irrelevante;
//! - num token que inicia candidatos de mais de um comprimento, cada balde
//!   de comprimento renormaliza suas probabilidades pela própria massa de
//!   sentidos legais e descarta a classe desconhecida `"U"`;
//! - se nenhum balde produz sentido legal, o token sai sem anotação e o
//!   cursor avança um token; senão o token cabeça recebe o marcador com as
//!   triplas `(comprimento, sentido, probabilidade)` de todos os baldes
//!   legais e o cursor pula o trecho coberto pelo maior comprimento legal,
//!   emitindo os tokens internos sem anotação (candidatos que começam
//!   dentro do trecho não são reexaminados).
//!
//! Um trecho nunca atravessa a fronteira de sentença: o avanço para no
//! primeiro token de outra sentença.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::result::ResultInfo;

/// Classe reservada para "sentido desconhecido", nunca emitida.
pub const UNKNOWN_SENSE: &str = "U";

/// Token do corpus original, endereçado por sentença e posição na sentença.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusToken {
    pub text: String,
    pub sentence: usize,
    pub index: usize,
}

impl CorpusToken {
    pub fn new<T: Into<String>>(text: T, sentence: usize, index: usize) -> Self {
        CorpusToken {
            text: text.into(),
            sentence,
            index,
        }
    }
}

/// Instância candidata: ocupa `length` tokens a partir de `(sentence, start)`
/// e aponta para sua linha de resultado pelo id de instância.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub instance_id: String,
    pub sentence: usize,
    pub start: usize,
    pub length: usize,
}

impl Candidate {
    pub fn new<I: Into<String>>(instance_id: I, sentence: usize, start: usize, length: usize) -> Self {
        Candidate {
            instance_id: instance_id.into(),
            sentence,
            start,
            length,
        }
    }
}

/// Uma tripla do marcador: sentido legal de um balde de comprimento, com a
/// probabilidade já renormalizada pela massa legal do balde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenseChoice {
    pub length: usize,
    pub sense: String,
    pub probability: f64,
}

/// Token do fluxo de saída: o token original mais, no token cabeça de um
/// trecho anotado, as triplas de todos os comprimentos legais.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoratedToken {
    pub token: CorpusToken,
    pub senses: Vec<SenseChoice>,
}

impl DecoratedToken {
    fn plain(token: &CorpusToken) -> Self {
        DecoratedToken {
            token: token.clone(),
            senses: Vec::new(),
        }
    }

    pub fn is_annotated(&self) -> bool {
        !self.senses.is_empty()
    }
}

/// Reconciliador de resultados contra o fluxo de tokens original.
pub struct OverlapResolver {
    by_start: HashMap<(usize, usize), Vec<Candidate>>,
}

impl OverlapResolver {
    /// Indexa os candidatos pelo início `(sentença, posição)`; dentro de um
    /// mesmo início os baldes ficam em ordem crescente de comprimento.
    pub fn new(candidates: Vec<Candidate>) -> Self {
        let mut by_start: HashMap<(usize, usize), Vec<Candidate>> = HashMap::new();
        for candidate in candidates {
            by_start
                .entry((candidate.sentence, candidate.start))
                .or_default()
                .push(candidate);
        }
        for bucket in by_start.values_mut() {
            bucket.sort_by_key(|c| c.length);
        }
        OverlapResolver { by_start }
    }

    /// Caminha pelos tokens em ordem de documento e produz o fluxo decorado.
    ///
    /// Linhas de resultado ausentes (rodada parcial, lexelt que falhou) são
    /// toleradas: o candidato sem linha simplesmente não contribui sentidos.
    pub fn resolve(&self, tokens: &[CorpusToken], results: &[ResultInfo]) -> Vec<DecoratedToken> {
        // tabela id de instância → (resultado, linha)
        let mut rows: HashMap<&str, (usize, usize)> = HashMap::new();
        for (ri, info) in results.iter().enumerate() {
            for (row, id) in info.ids.iter().enumerate() {
                rows.insert(id.as_str(), (ri, row));
            }
        }

        let mut output = Vec::with_capacity(tokens.len());
        let mut cursor = 0;
        while cursor < tokens.len() {
            let token = &tokens[cursor];
            let senses = self.senses_at(token, results, &rows);
            if senses.is_empty() {
                output.push(DecoratedToken::plain(token));
                cursor += 1;
                continue;
            }

            let span = senses.iter().map(|s| s.length).max().unwrap_or(1);
            output.push(DecoratedToken {
                token: token.clone(),
                senses,
            });
            // tokens internos saem sem anotação e não são reexaminados
            let mut consumed = 1;
            while consumed < span
                && cursor + consumed < tokens.len()
                && tokens[cursor + consumed].sentence == token.sentence
            {
                output.push(DecoratedToken::plain(&tokens[cursor + consumed]));
                consumed += 1;
            }
            cursor += consumed;
        }
        output
    }

    /// Triplas legais de todos os baldes de comprimento que começam no token.
    fn senses_at(
        &self,
        token: &CorpusToken,
        results: &[ResultInfo],
        rows: &HashMap<&str, (usize, usize)>,
    ) -> Vec<SenseChoice> {
        let Some(bucket) = self.by_start.get(&(token.sentence, token.index)) else {
            return Vec::new();
        };

        let mut senses = Vec::new();
        for candidate in bucket {
            let Some(&(ri, row)) = rows.get(candidate.instance_id.as_str()) else {
                continue;
            };
            let info = &results[ri];
            let Some(probs) = info.probability_row(row) else {
                continue;
            };
            // massa legal do balde: soma das probabilidades fora de "U"
            let mass: f64 = info
                .classes
                .iter()
                .zip(probs)
                .filter(|(class, _)| class.as_str() != UNKNOWN_SENSE)
                .map(|(_, p)| *p)
                .sum();
            if mass <= 0.0 {
                continue;
            }
            for (class, p) in info.classes.iter().zip(probs) {
                if class.as_str() == UNKNOWN_SENSE {
                    continue;
                }
                senses.push(SenseChoice {
                    length: candidate.length,
                    sense: class.clone(),
                    probability: p / mass,
                });
            }
        }
        senses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(lexelt_id: &str, ids: &[&str], classes: &[&str], rows: &[&[f64]]) -> ResultInfo {
        ResultInfo {
            lexelt_id: lexelt_id.to_string(),
            classes: classes.iter().map(|c| c.to_string()).collect(),
            probabilities: rows.iter().map(|r| r.to_vec()).collect(),
            ids: ids.iter().map(|i| i.to_string()).collect(),
            docs: vec!["d0".to_string(); ids.len()],
        }
    }

    fn sentence_tokens(words: &[&str], sentence: usize) -> Vec<CorpusToken> {
        words
            .iter()
            .enumerate()
            .map(|(i, w)| CorpusToken::new(*w, sentence, i))
            .collect()
    }

    #[test]
    fn test_two_lengths_same_start_merge_into_one_marker() {
        // comprimento 1 com {s1: 0.6, U: 0.4} e comprimento 2 com {s2: 1.0}
        let tokens = sentence_tokens(&["banco", "de", "dados", "seguros"], 0);
        let resolver = OverlapResolver::new(vec![
            Candidate::new("i1", 0, 0, 1),
            Candidate::new("i2", 0, 0, 2),
        ]);
        let results = vec![
            result("banco.n", &["i1"], &["s1", "U"], &[&[0.6, 0.4]]),
            result("banco_de_dados.n", &["i2"], &["s2"], &[&[1.0]]),
        ];

        let decorated = resolver.resolve(&tokens, &results);
        assert_eq!(decorated.len(), 4);
        // "U" excluída e o balde de comprimento 1 renormalizado: s1 vira 1.0
        assert_eq!(
            decorated[0].senses,
            vec![
                SenseChoice {
                    length: 1,
                    sense: "s1".to_string(),
                    probability: 1.0
                },
                SenseChoice {
                    length: 2,
                    sense: "s2".to_string(),
                    probability: 1.0
                },
            ]
        );
        // tokens internos e seguintes sem anotação
        assert!(!decorated[1].is_annotated());
        assert!(!decorated[2].is_annotated());
        assert!(!decorated[3].is_annotated());
    }

    #[test]
    fn test_renormalizes_over_legal_mass_only() {
        let tokens = sentence_tokens(&["manga"], 0);
        let resolver = OverlapResolver::new(vec![Candidate::new("i1", 0, 0, 1)]);
        let results = vec![result(
            "manga.n",
            &["i1"],
            &["fruta", "camisa", "U"],
            &[&[0.3, 0.3, 0.4]],
        )];

        let decorated = resolver.resolve(&tokens, &results);
        let senses = &decorated[0].senses;
        assert_eq!(senses.len(), 2);
        assert!((senses[0].probability - 0.5).abs() < 1e-12);
        assert!((senses[1].probability - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_all_unknown_emits_unannotated_and_advances_one() {
        // o trecho de comprimento 2 falha (só "U"); o candidato que começa
        // no token seguinte ainda é examinado
        let tokens = sentence_tokens(&["cabo", "de", "guerra"], 0);
        let resolver = OverlapResolver::new(vec![
            Candidate::new("i1", 0, 0, 2),
            Candidate::new("i2", 0, 1, 1),
        ]);
        let results = vec![
            result("cabo_de.x", &["i1"], &["U"], &[&[1.0]]),
            result("de.x", &["i2"], &["s9"], &[&[1.0]]),
        ];

        let decorated = resolver.resolve(&tokens, &results);
        assert!(!decorated[0].is_annotated());
        assert!(decorated[1].is_annotated());
        assert_eq!(decorated[1].senses[0].sense, "s9");
    }

    #[test]
    fn test_inner_candidate_not_reexamined() {
        let tokens = sentence_tokens(&["banco", "de", "dados"], 0);
        let resolver = OverlapResolver::new(vec![
            Candidate::new("i1", 0, 0, 2),
            Candidate::new("i2", 0, 1, 1),
        ]);
        let results = vec![
            result("banco_de.x", &["i1"], &["s1"], &[&[1.0]]),
            result("de.x", &["i2"], &["s9"], &[&[1.0]]),
        ];

        let decorated = resolver.resolve(&tokens, &results);
        assert!(decorated[0].is_annotated());
        // "de" está dentro do trecho coberto: sai sem anotação
        assert!(!decorated[1].is_annotated());
        assert!(!decorated[2].is_annotated());
    }

    #[test]
    fn test_missing_result_row_is_tolerated() {
        let tokens = sentence_tokens(&["vela"], 0);
        let resolver = OverlapResolver::new(vec![Candidate::new("orfao", 0, 0, 1)]);
        let decorated = resolver.resolve(&tokens, &[]);
        assert_eq!(decorated.len(), 1);
        assert!(!decorated[0].is_annotated());
    }

    #[test]
    fn test_result_list_order_is_irrelevant() {
        let tokens = sentence_tokens(&["manga", "e", "vela"], 0);
        let resolver = OverlapResolver::new(vec![
            Candidate::new("m0", 0, 0, 1),
            Candidate::new("v0", 0, 2, 1),
        ]);
        // resultados na ordem inversa da ocorrência no texto
        let results = vec![
            result("vela.n", &["v0"], &["nautica"], &[&[1.0]]),
            result("manga.n", &["m0"], &["fruta"], &[&[1.0]]),
        ];

        let decorated = resolver.resolve(&tokens, &results);
        assert_eq!(decorated[0].senses[0].sense, "fruta");
        assert_eq!(decorated[2].senses[0].sense, "nautica");
    }

    #[test]
    fn test_span_never_crosses_sentence_boundary() {
        // candidato de comprimento 3 numa sentença de 2 tokens: o avanço
        // para na fronteira e a sentença seguinte é examinada normalmente
        let mut tokens = sentence_tokens(&["pe", "de", "moleque"], 0);
        tokens.truncate(2);
        tokens.push(CorpusToken::new("vela", 1, 0));
        let resolver = OverlapResolver::new(vec![
            Candidate::new("p0", 0, 0, 3),
            Candidate::new("v0", 1, 0, 1),
        ]);
        let results = vec![
            result("pe_de_moleque.n", &["p0"], &["doce"], &[&[1.0]]),
            result("vela.n", &["v0"], &["nautica"], &[&[1.0]]),
        ];

        let decorated = resolver.resolve(&tokens, &results);
        assert_eq!(decorated.len(), 3);
        assert!(decorated[0].is_annotated());
        assert!(!decorated[1].is_annotated());
        assert!(decorated[2].is_annotated());
    }
}
