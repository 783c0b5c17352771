//! # Pipeline de Desambiguação
//!
//! O orquestrador da demonstração: conecta tokenização, localização de
//! candidatos, o escalonador concorrente do núcleo e a resolução de
//! sobreposição num único fluxo, emitindo eventos passo a passo para a
//! interface acompanhar o raciocínio do sistema.
//!
//! 1. Tokenização do texto bruto ([`crate::tokenizer`]).
//! 2. Localização de candidatos e extração de features ([`crate::extract`]).
//! 3. Uma avaliação por lexelt num pool fixo ([`wsd_core::Scheduler`]).
//! 4. Reconciliação dos resultados no fluxo de tokens
//!    ([`wsd_core::OverlapResolver`]).
//!
//! Falhas de avaliação não derrubam a análise: a rodada termina parcial e
//! as falhas saem tipadas no resultado, como o escalonador as reporta.

use std::collections::HashMap;
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;
use wsd_core::{CorpusToken, InstanceRef, OverlapResolver, Scheduler, SenseChoice};

use crate::corpus;
use crate::evaluator::{train_models, CorpusEvaluator, TrainedModel, DEFAULT_CUTOFF};
use crate::extract::Extractor;
use crate::tokenizer::{tokenize, Token};

/// Tamanho do pool de avaliação da demonstração.
const POOL_SIZE: usize = 4;

/// Um sentido emitido para a interface, com a glosa do inventário.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenseView {
    pub length: usize,
    pub sense: String,
    pub probability: f64,
    pub gloss: Option<String>,
}

/// Token do fluxo final: offsets para destaque e os sentidos do marcador
/// (vazio nos tokens sem anotação).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotatedToken {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub senses: Vec<SenseView>,
}

/// Falha parcial de um lexelt, apresentável na interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureView {
    pub lexelt: String,
    pub message: String,
}

/// Resultado completo de uma análise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub tokens: Vec<AnnotatedToken>,
    pub failures: Vec<FailureView>,
    pub total_tokens: usize,
    pub candidates: usize,
    pub processing_ms: u64,
}

/// Candidato localizado, na visão da interface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateView {
    pub lexelt: String,
    pub instance_id: String,
    pub sentence: usize,
    pub start: usize,
    pub length: usize,
}

/// Eventos emitidos pelo pipeline durante o processamento.
///
/// Permitem que a interface visualize o raciocínio passo a passo; cada
/// variante carrega os dados de uma etapa.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DisambiguationEvent {
    /// **Passo 1**: tokenização concluída.
    TokenizationDone { tokens: Vec<Token>, total: usize },
    /// **Passo 2**: candidatos localizados, inclusive multipalavra
    /// sobrepostos no mesmo início.
    CandidatesFound {
        candidates: Vec<CandidateView>,
        total: usize,
    },
    /// **Passo 3**: um lexelt avaliado no pool.
    LexeltEvaluated {
        lexelt: String,
        instances: usize,
        classes: Vec<String>,
    },
    /// **Falha parcial**: um lexelt falhou e a rodada continuou sem ele.
    LexeltFailed { lexelt: String, message: String },
    /// **Conclusão**: fluxo decorado completo.
    Done { analysis: Analysis },
    /// **Falha**: erro irrecuperável.
    Error { message: String },
}

/// O pipeline WSD principal: treina os modelos do corpus na construção e
/// atende análises reaproveitando-os.
pub struct WsdPipeline {
    extractor: Extractor,
    models: Arc<HashMap<String, TrainedModel>>,
    evaluator: CorpusEvaluator,
}

impl WsdPipeline {
    pub fn new() -> Self {
        let extractor = Extractor::with_default_lexicon();
        let models = Arc::new(train_models(&extractor, DEFAULT_CUTOFF));
        let evaluator = CorpusEvaluator::new(Arc::clone(&models));
        info!("Pipeline WSD pronto: {} lexelts treinados", models.len());
        WsdPipeline {
            extractor,
            models,
            evaluator,
        }
    }

    /// Modelo treinado de um lexelt, se existir.
    pub fn model(&self, lexelt: &str) -> Option<&TrainedModel> {
        self.models.get(lexelt)
    }

    /// Ids dos lexelts treinados, em ordem lexicográfica.
    pub fn lexelt_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.models.keys().map(|k| k.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    /// Análise completa, sem streaming.
    pub fn analyze(&self, text: &str) -> wsd_core::Result<Analysis> {
        self.run(text, None)
    }

    /// Análise com eventos passo a passo; erros viram o evento `Error`.
    pub fn analyze_streaming(&self, text: &str, events: Sender<DisambiguationEvent>) {
        if let Err(error) = self.run(text, Some(&events)) {
            let _ = events.send(DisambiguationEvent::Error {
                message: error.to_string(),
            });
        }
    }

    fn run(
        &self,
        text: &str,
        events: Option<&Sender<DisambiguationEvent>>,
    ) -> wsd_core::Result<Analysis> {
        let started = Instant::now();

        let tokens = tokenize(text);
        emit(
            events,
            DisambiguationEvent::TokenizationDone {
                tokens: tokens.clone(),
                total: tokens.len(),
            },
        );

        let extractions = self.extractor.extract("web", &tokens);
        let total_candidates = extractions.len();
        let views: Vec<CandidateView> = extractions
            .iter()
            .map(|e| CandidateView {
                lexelt: e.lexelt.clone(),
                instance_id: e.candidate.instance_id.clone(),
                sentence: e.candidate.sentence,
                start: e.candidate.start,
                length: e.candidate.length,
            })
            .collect();
        emit(
            events,
            DisambiguationEvent::CandidatesFound {
                candidates: views,
                total: total_candidates,
            },
        );

        let mut candidates = Vec::with_capacity(total_candidates);
        let mut stream = Vec::with_capacity(total_candidates);
        for extraction in extractions {
            candidates.push(extraction.candidate);
            let instance: InstanceRef = Arc::new(extraction.instance);
            stream.push((extraction.lexelt, instance));
        }

        let mut scheduler = Scheduler::new(POOL_SIZE);
        scheduler.load(stream);
        let outcome = scheduler.run(&self.evaluator)?;

        for result in &outcome.results {
            emit(
                events,
                DisambiguationEvent::LexeltEvaluated {
                    lexelt: result.lexelt_id.clone(),
                    instances: result.size(),
                    classes: result.classes.clone(),
                },
            );
        }
        for failure in &outcome.failures {
            emit(
                events,
                DisambiguationEvent::LexeltFailed {
                    lexelt: failure.lexelt_id.clone(),
                    message: failure.error.to_string(),
                },
            );
        }

        let corpus_tokens: Vec<CorpusToken> = tokens
            .iter()
            .map(|t| CorpusToken::new(t.text.clone(), t.sentence, t.index))
            .collect();
        let decorated = OverlapResolver::new(candidates).resolve(&corpus_tokens, &outcome.results);

        // o fluxo decorado sai 1:1 e na ordem dos tokens de entrada
        let annotated: Vec<AnnotatedToken> = decorated
            .iter()
            .zip(&tokens)
            .map(|(d, t)| AnnotatedToken {
                text: t.text.clone(),
                start: t.start,
                end: t.end,
                senses: d.senses.iter().map(sense_view).collect(),
            })
            .collect();

        let analysis = Analysis {
            total_tokens: annotated.len(),
            tokens: annotated,
            failures: outcome
                .failures
                .iter()
                .map(|f| FailureView {
                    lexelt: f.lexelt_id.clone(),
                    message: f.error.to_string(),
                })
                .collect(),
            candidates: total_candidates,
            processing_ms: started.elapsed().as_millis() as u64,
        };
        emit(
            events,
            DisambiguationEvent::Done {
                analysis: analysis.clone(),
            },
        );
        Ok(analysis)
    }
}

fn sense_view(choice: &SenseChoice) -> SenseView {
    let gloss = corpus::sense_inventory()
        .iter()
        .find(|entry| entry.sense == choice.sense)
        .map(|entry| entry.gloss.to_string());
    SenseView {
        length: choice.length,
        sense: choice.sense.clone(),
        probability: choice.probability,
        gloss,
    }
}

fn emit(events: Option<&Sender<DisambiguationEvent>>, event: DisambiguationEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_candidates_merge_on_head_token() {
        let pipeline = WsdPipeline::new();
        let analysis = pipeline
            .analyze("A equipe migrou o banco de dados para um servidor novo.")
            .unwrap();

        let head = analysis
            .tokens
            .iter()
            .find(|t| t.text == "banco")
            .unwrap();
        // comprimento 1 (dois sentidos de "banco") + comprimento 3 (a expressão)
        assert!(head
            .senses
            .iter()
            .any(|s| s.length == 3 && s.sense == "informatica"));
        assert!(head.senses.iter().any(|s| s.length == 1));

        // tokens internos da expressão saem sem anotação
        let de = analysis.tokens.iter().find(|t| t.text == "de").unwrap();
        assert!(de.senses.is_empty());
        let dados = analysis.tokens.iter().find(|t| t.text == "dados").unwrap();
        assert!(dados.senses.is_empty());
    }

    #[test]
    fn test_text_without_targets_stays_plain() {
        let pipeline = WsdPipeline::new();
        let analysis = pipeline.analyze("O servidor reiniciou sozinho ontem.").unwrap();

        assert_eq!(analysis.candidates, 0);
        assert!(analysis.failures.is_empty());
        assert!(analysis.tokens.iter().all(|t| t.senses.is_empty()));
        assert_eq!(analysis.total_tokens, analysis.tokens.len());
    }

    #[test]
    fn test_sense_probabilities_are_renormalized() {
        let pipeline = WsdPipeline::new();
        let analysis = pipeline
            .analyze("Sentamos no banco de madeira da praça.")
            .unwrap();

        let head = analysis.tokens.iter().find(|t| t.text == "banco").unwrap();
        let sum: f64 = head
            .senses
            .iter()
            .filter(|s| s.length == 1)
            .map(|s| s.probability)
            .sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_streaming_finishes_with_done() {
        let pipeline = WsdPipeline::new();
        let (tx, rx) = std::sync::mpsc::channel();
        pipeline.analyze_streaming("Ele acendeu uma vela durante o apagão.", tx);

        let events: Vec<DisambiguationEvent> = rx.try_iter().collect();
        assert!(matches!(
            events.first(),
            Some(DisambiguationEvent::TokenizationDone { .. })
        ));
        assert!(matches!(
            events.last(),
            Some(DisambiguationEvent::Done { .. })
        ));
    }

    #[test]
    fn test_glosses_come_from_inventory() {
        let pipeline = WsdPipeline::new();
        let analysis = pipeline
            .analyze("O mecânico trocou a vela de ignição do motor.")
            .unwrap();

        let head = analysis.tokens.iter().find(|t| t.text == "vela").unwrap();
        assert!(!head.senses.is_empty());
        for sense in &head.senses {
            assert!(sense.gloss.is_some(), "sentido '{}' sem glosa", sense.sense);
        }
    }
}
