//! # Avaliador Bayesiano por Frequência
//!
//! O classificador da demonstração: um naive Bayes multinomial com suavização
//! add-one, treinado sobre os vetores esparsos que o núcleo codifica. Cada
//! lexelt do corpus ganha um [`TrainedModel`]; o [`CorpusEvaluator`]
//! implementa o contrato [`Evaluator`] que o escalonador consome, uma chamada
//! por lexelt de teste.
//!
//! O treino percorre o caminho completo do núcleo: agrupa instâncias
//! rotuladas num [`Lexelt`], acumula contagens, poda o vocabulário com a
//! cadeia de seleção e codifica as linhas de treino pelo back-end LibLinear.
//! Um lexelt de teste sem modelo treinado vira erro de avaliação, que o
//! escalonador contém e reporta como falha parcial.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};
use wsd_core::{
    encode_features, BinaryCutoffSelector, CutoffSelector, Evaluator, FeatureKind,
    IndexAssignment, Instance, Lexelt, LexeltEncoder, LibLinearEncoder, ResultInfo,
    SelectorChain, Statistic, WsdError,
};

use crate::corpus;
use crate::extract::Extractor;
use crate::tokenizer::tokenize;

/// Corte padrão da cadeia de seleção: valores categóricos vistos uma única
/// vez são podados.
pub const DEFAULT_CUTOFF: u32 = 2;

/// Modelo treinado de um lexelt: o balde de treino com a estatística já
/// podada, a atribuição de índices e os pesos do naive Bayes.
pub struct TrainedModel {
    lexelt: Lexelt,
    assignment: IndexAssignment,
    classes: Vec<String>,
    priors: Vec<f64>,
    weights: Vec<HashMap<u32, f64>>,
    totals: Vec<f64>,
}

impl TrainedModel {
    /// Ajusta o modelo sobre um balde já treinado e podado.
    fn fit(lexelt: Lexelt) -> TrainedModel {
        let statistic = lexelt.statistic();
        let assignment = IndexAssignment::build(statistic);
        let problem = LibLinearEncoder::default().encode(&lexelt, statistic);

        let classes = problem.classes.clone();
        let n_classes = classes.len();
        let mut rows_per_class = vec![0u32; n_classes];
        let mut weights: Vec<HashMap<u32, f64>> = vec![HashMap::new(); n_classes];
        let mut totals = vec![0.0f64; n_classes];
        let mut total_rows = 0u32;

        for row in &problem.rows {
            // classe 0 = sem rótulo, não contribui para o treino
            if row.class_id == 0 {
                continue;
            }
            let class = (row.class_id - 1) as usize;
            rows_per_class[class] += 1;
            total_rows += 1;
            for (index, value) in &row.features {
                *weights[class].entry(*index).or_insert(0.0) += value;
                totals[class] += value;
            }
        }

        let priors = rows_per_class
            .iter()
            .map(|&rows| {
                let numerator = f64::from(rows + 1);
                let denominator = (total_rows as usize + n_classes) as f64;
                (numerator / denominator).ln()
            })
            .collect();

        TrainedModel {
            lexelt,
            assignment,
            classes,
            priors,
            weights,
            totals,
        }
    }

    pub fn lexelt(&self) -> &Lexelt {
        &self.lexelt
    }

    /// Estatística podada usada no treino e na codificação de teste.
    pub fn statistic(&self) -> &Statistic {
        self.lexelt.statistic()
    }

    /// Classes na ordem de registro dos rótulos de treino.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Log-score por classe para uma instância de teste.
    fn scores(&self, instance: &dyn Instance) -> Vec<f64> {
        let row = encode_features(instance, self.lexelt.statistic(), &self.assignment);
        let vocabulary = self.assignment.max_index().saturating_sub(1).max(1) as f64;

        self.priors
            .iter()
            .enumerate()
            .map(|(class, prior)| {
                let mut score = *prior;
                for (index, value) in &row {
                    let seen = self.weights[class].get(index).copied().unwrap_or(0.0);
                    score += value * ((seen + 1.0) / (self.totals[class] + vocabulary)).ln();
                }
                score
            })
            .collect()
    }
}

/// Normaliza log-scores numa distribuição de probabilidade.
fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    if sum <= 0.0 {
        return vec![1.0 / scores.len().max(1) as f64; scores.len()];
    }
    exps.iter().map(|e| e / sum).collect()
}

/// Treina um modelo por lexelt a partir do corpus anotado.
///
/// Exemplos cujo alvo não é localizado na sentença são descartados com
/// aviso no log; o restante passa por contagem, seleção com o corte dado e
/// ajuste do naive Bayes.
pub fn train_models(extractor: &Extractor, cutoff: u32) -> HashMap<String, TrainedModel> {
    let mut buckets: HashMap<String, Lexelt> = HashMap::new();

    for (i, example) in corpus::get_corpus().iter().enumerate() {
        let doc_id = format!("treino-{i}");
        let tokens = tokenize(example.text);
        let found = extractor
            .extract(&doc_id, &tokens)
            .into_iter()
            .find(|e| e.lexelt == example.lexelt);
        let Some(extraction) = found else {
            warn!(
                "Exemplo de treino sem ocorrência de '{}': {}",
                example.lexelt, example.text
            );
            continue;
        };

        let instance = extraction
            .instance
            .with_tags(vec![example.sense.to_string()]);
        buckets
            .entry(example.lexelt.to_string())
            .or_insert_with(|| Lexelt::new(example.lexelt))
            .add(Arc::new(instance));
    }

    buckets
        .into_iter()
        .map(|(id, mut lexelt)| {
            lexelt.train();
            let chain = SelectorChain::new()
                .with(Box::new(CutoffSelector::new(FeatureKind::Categorical, cutoff)))
                .with(Box::new(BinaryCutoffSelector::new(1)));
            let pruned = lexelt.statistic().select(&chain);
            lexelt.set_statistic(pruned);
            debug!(
                "Modelo de '{}' treinado com {} instâncias e {} classes",
                id,
                lexelt.len(),
                lexelt.statistic().tags().len()
            );
            (id, TrainedModel::fit(lexelt))
        })
        .collect()
}

/// Avaliador compartilhado entre as threads do escalonador.
pub struct CorpusEvaluator {
    models: Arc<HashMap<String, TrainedModel>>,
}

impl CorpusEvaluator {
    pub fn new(models: Arc<HashMap<String, TrainedModel>>) -> Self {
        CorpusEvaluator { models }
    }
}

impl Evaluator for CorpusEvaluator {
    fn evaluate(&self, lexelt: &Lexelt) -> wsd_core::Result<ResultInfo> {
        let Some(model) = self.models.get(lexelt.id()) else {
            return Err(WsdError::evaluation(
                lexelt.id(),
                "nenhum modelo treinado para o lexelt",
            ));
        };

        let mut probabilities = Vec::with_capacity(lexelt.len());
        let mut ids = Vec::with_capacity(lexelt.len());
        let mut docs = Vec::with_capacity(lexelt.len());
        for instance in lexelt.instances() {
            probabilities.push(softmax(&model.scores(instance.as_ref())));
            ids.push(instance.id().to_string());
            docs.push(instance.doc_id().to_string());
        }

        Ok(ResultInfo {
            lexelt_id: lexelt.id().to_string(),
            classes: model.classes.clone(),
            probabilities,
            ids,
            docs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket_for(extractor: &Extractor, lexelt_id: &str, text: &str) -> Lexelt {
        let tokens = tokenize(text);
        let extraction = extractor
            .extract("t0", &tokens)
            .into_iter()
            .find(|e| e.lexelt == lexelt_id)
            .unwrap();
        let mut lexelt = Lexelt::new(lexelt_id);
        lexelt.add(Arc::new(extraction.instance));
        lexelt
    }

    #[test]
    fn test_one_model_per_corpus_lexelt() {
        let extractor = Extractor::with_default_lexicon();
        let models = train_models(&extractor, DEFAULT_CUTOFF);
        for id in ["banco.n", "banco_de_dados.n", "manga.n", "vela.n", "cabo.n"] {
            assert!(models.contains_key(id), "faltou modelo de '{}'", id);
        }
    }

    #[test]
    fn test_cutoff_prunes_singleton_values() {
        let extractor = Extractor::with_default_lexicon();
        let models = train_models(&extractor, 2);
        let statistic = models["banco.n"].statistic();

        let key = statistic.key_position("w-1").unwrap();
        let values = statistic.values_at(key).unwrap();
        // "do" ocorre três vezes no treino e sobrevive; "um" é singleton
        assert!(values.iter().any(|v| v == "do"));
        assert!(values.iter().all(|v| v != "um"));
    }

    #[test]
    fn test_clear_context_recovers_gold_sense() {
        let extractor = Extractor::with_default_lexicon();
        let models = Arc::new(train_models(&extractor, 1));
        let evaluator = CorpusEvaluator::new(models);

        let bucket = bucket_for(
            &extractor,
            "banco.n",
            "Ela abriu uma conta no banco para receber o salário todo mês.",
        );
        let info = evaluator.evaluate(&bucket).unwrap();
        let row = info.probability_row(0).unwrap();
        let best = row
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap()
            .0;
        assert_eq!(info.classes[best], "financeiro");
    }

    #[test]
    fn test_probability_rows_are_normalized() {
        let extractor = Extractor::with_default_lexicon();
        let evaluator = CorpusEvaluator::new(Arc::new(train_models(&extractor, DEFAULT_CUTOFF)));

        let bucket = bucket_for(&extractor, "vela.n", "O vento rasgou a vela do barco.");
        let info = evaluator.evaluate(&bucket).unwrap();
        let row = info.probability_row(0).unwrap();
        assert_eq!(row.len(), info.classes.len());
        let sum: f64 = row.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(row.iter().all(|p| *p >= 0.0));
    }

    #[test]
    fn test_unknown_sense_is_a_trained_class() {
        let extractor = Extractor::with_default_lexicon();
        let models = train_models(&extractor, DEFAULT_CUTOFF);
        // "cabo.n" tem exemplos indecidíveis no corpus
        assert!(models["cabo.n"].classes().iter().any(|c| c == "U"));
    }

    #[test]
    fn test_missing_model_is_an_evaluation_error() {
        let extractor = Extractor::with_default_lexicon();
        let evaluator = CorpusEvaluator::new(Arc::new(train_models(&extractor, DEFAULT_CUTOFF)));

        let bucket = Lexelt::new("inexistente.x");
        let error = evaluator.evaluate(&bucket).unwrap_err();
        assert!(matches!(error, WsdError::Evaluation { .. }));
    }
}
