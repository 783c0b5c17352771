//! # Escalonador de Avaliações por Lexelt
//!
//! Particiona um fluxo de instâncias em lexelts e roda uma avaliação por
//! lexelt num pool fixo de threads, juntando os resultados num canal. O
//! paralelismo é de grão grosso: um job por lexelt, nunca subdividido, e o
//! tamanho do pool independe da quantidade de lexelts.
//!
//! A ordem de **submissão** é determinística (ids de lexelt em ordem
//! lexicográfica); a ordem de **conclusão** não tem garantia nenhuma, e os
//! resultados são colecionados na ordem de chegada.
//!
//! Não há cancelamento nem timeout por job: uma avaliação pendurada trava a
//! junção indefinidamente. Uma avaliação que falha (ou entra em pânico) é
//! contida na fronteira do job, registrada no log e convertida em entrada
//! de [`RunOutcome::failures`]; a rodada termina com resultados parciais e
//! quem chama precisa tolerar menos resultados do que lexelts submetidos.

use std::collections::{BTreeMap, HashMap};
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{Result, WsdError};
use crate::instance::InstanceRef;
use crate::lexelt::Lexelt;
use crate::result::{Evaluator, ResultInfo};

/// Fase corrente do escalonador.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    Created,
    Loaded,
    Scheduled,
    Joined,
    Collected,
}

/// Falha tipada de um job de avaliação.
#[derive(Debug)]
pub struct EvaluationFailure {
    pub lexelt_id: String,
    pub error: WsdError,
}

/// Resultado de uma rodada: resultados na ordem de chegada mais as falhas
/// tipadas dos jobs que não produziram resultado.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub results: Vec<ResultInfo>,
    pub failures: Vec<EvaluationFailure>,
}

impl RunOutcome {
    /// Soma dos tamanhos de todos os resultados colecionados.
    pub fn total_evaluated(&self) -> usize {
        self.results.iter().map(|r| r.size()).sum()
    }
}

/// Escalonador de grão grosso: um job por lexelt num pool fixo.
pub struct Scheduler {
    lexelts: BTreeMap<String, Lexelt>,
    overrides: HashMap<String, Vec<String>>,
    pool_size: usize,
    state: SchedulerState,
}

impl Scheduler {
    /// Cria um escalonador com o tamanho de pool dado (0 usa o padrão do
    /// rayon, uma thread por núcleo).
    pub fn new(pool_size: usize) -> Self {
        Scheduler {
            lexelts: BTreeMap::new(),
            overrides: HashMap::new(),
            pool_size,
            state: SchedulerState::Created,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Define o mapa `id de instância → [ids de lexelt]` que força
    /// instâncias específicas para baldes específicos, ignorando o lexelt
    /// natural delas. Uma instância listada é replicada em todos os baldes
    /// do seu vetor.
    pub fn set_overrides(&mut self, overrides: HashMap<String, Vec<String>>) {
        self.overrides = overrides;
    }

    /// Particiona o fluxo `(id de lexelt natural, instância)` nos baldes.
    ///
    /// Instâncias com id duplicado dentro de um balde são descartadas pelo
    /// próprio [`Lexelt::add`]; o descarte fica registrado no log.
    pub fn load<I>(&mut self, stream: I)
    where
        I: IntoIterator<Item = (String, InstanceRef)>,
    {
        for (natural_id, instance) in stream {
            let targets = match self.overrides.get(instance.id()) {
                Some(ids) => ids.clone(),
                None => vec![natural_id],
            };
            for target in targets {
                let bucket = self
                    .lexelts
                    .entry(target)
                    .or_insert_with_key(|id| Lexelt::new(id.clone()));
                if !bucket.add(Arc::clone(&instance)) {
                    debug!(
                        "Instância '{}' duplicada no lexelt '{}', descartada",
                        instance.id(),
                        bucket.id()
                    );
                }
            }
        }
        self.state = SchedulerState::Loaded;
    }

    /// Número de lexelts particionados.
    pub fn len(&self) -> usize {
        self.lexelts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lexelts.is_empty()
    }

    /// Total de instâncias em todos os baldes.
    pub fn total_instances(&self) -> usize {
        self.lexelts.values().map(|l| l.len()).sum()
    }

    pub fn lexelt(&self, id: &str) -> Option<&Lexelt> {
        self.lexelts.get(id)
    }

    /// Ids de lexelt na ordem de submissão (lexicográfica).
    pub fn lexelt_ids(&self) -> Vec<&str> {
        self.lexelts.keys().map(|k| k.as_str()).collect()
    }

    /// Roda uma avaliação por lexelt no pool e junta os resultados.
    ///
    /// Bloqueia até que todo job tenha sinalizado conclusão, com sucesso ou
    /// falha. Um job que nunca sinaliza (avaliador pendurado) bloqueia aqui
    /// para sempre.
    pub fn run(&mut self, evaluator: &dyn Evaluator) -> Result<RunOutcome> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.pool_size)
            .build()
            .map_err(|e| WsdError::ThreadPool(e.to_string()))?;

        self.state = SchedulerState::Scheduled;
        debug!(
            "Escalonando {} lexelts em pool de {} threads",
            self.lexelts.len(),
            self.pool_size
        );

        let (tx, rx) = mpsc::channel();
        pool.scope(|scope| {
            for (id, lexelt) in &self.lexelts {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let outcome =
                        panic::catch_unwind(AssertUnwindSafe(|| evaluator.evaluate(lexelt)))
                            .unwrap_or_else(|_| {
                                Err(WsdError::evaluation(
                                    id.clone(),
                                    "pânico durante a avaliação",
                                ))
                            });
                    // cada job sinaliza exatamente uma vez, sucesso ou falha
                    let _ = tx.send((id.clone(), outcome));
                });
            }
        });
        self.state = SchedulerState::Joined;

        drop(tx);
        let mut outcome = RunOutcome::default();
        while let Ok((id, result)) = rx.recv() {
            match result {
                Ok(info) => outcome.results.push(info),
                Err(error) => {
                    warn!("Avaliação do lexelt '{}' falhou: {}", id, error);
                    outcome.failures.push(EvaluationFailure {
                        lexelt_id: id,
                        error,
                    });
                }
            }
        }
        self.state = SchedulerState::Collected;
        debug!(
            "Rodada concluída: {} resultados, {} falhas",
            outcome.results.len(),
            outcome.failures.len()
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::SimpleInstance;

    fn inst(id: &str) -> InstanceRef {
        Arc::new(SimpleInstance::new(id, "doc").with_tags(vec!["s1".to_string()]))
    }

    /// Avaliador de teste: probabilidade 1.0 para a classe única.
    struct Uniform;

    fn uniform_result(lexelt: &Lexelt) -> ResultInfo {
        let n = lexelt.len();
        ResultInfo {
            lexelt_id: lexelt.id().to_string(),
            classes: vec!["s1".to_string()],
            probabilities: vec![vec![1.0]; n],
            ids: lexelt.instances().iter().map(|i| i.id().to_string()).collect(),
            docs: lexelt.instances().iter().map(|i| i.doc_id().to_string()).collect(),
        }
    }

    impl Evaluator for Uniform {
        fn evaluate(&self, lexelt: &Lexelt) -> Result<ResultInfo> {
            Ok(uniform_result(lexelt))
        }
    }

    /// Falha apenas no lexelt configurado.
    struct FailOn(&'static str);

    impl Evaluator for FailOn {
        fn evaluate(&self, lexelt: &Lexelt) -> Result<ResultInfo> {
            if lexelt.id() == self.0 {
                Err(WsdError::evaluation(lexelt.id(), "falha forçada de teste"))
            } else {
                Ok(uniform_result(lexelt))
            }
        }
    }

    /// Entra em pânico apenas no lexelt configurado.
    struct PanicOn(&'static str);

    impl Evaluator for PanicOn {
        fn evaluate(&self, lexelt: &Lexelt) -> Result<ResultInfo> {
            assert_ne!(lexelt.id(), self.0, "pânico forçado de teste");
            Ok(uniform_result(lexelt))
        }
    }

    fn loaded_scheduler() -> Scheduler {
        let mut scheduler = Scheduler::new(2);
        scheduler.load(vec![
            ("banco.n".to_string(), inst("b0")),
            ("manga.n".to_string(), inst("m0")),
            ("banco.n".to_string(), inst("b1")),
            ("vela.n".to_string(), inst("v0")),
        ]);
        scheduler
    }

    #[test]
    fn test_partition_by_natural_lexelt_id() {
        let scheduler = loaded_scheduler();
        assert_eq!(scheduler.len(), 3);
        assert_eq!(scheduler.lexelt("banco.n").unwrap().len(), 2);
        assert_eq!(scheduler.lexelt("manga.n").unwrap().len(), 1);
        assert_eq!(scheduler.total_instances(), 4);
        assert_eq!(scheduler.state(), SchedulerState::Loaded);
    }

    #[test]
    fn test_submission_order_is_lexicographic() {
        let mut scheduler = Scheduler::new(1);
        scheduler.load(vec![
            ("vela.n".to_string(), inst("v0")),
            ("banco.n".to_string(), inst("b0")),
            ("manga.n".to_string(), inst("m0")),
        ]);
        assert_eq!(scheduler.lexelt_ids(), vec!["banco.n", "manga.n", "vela.n"]);
    }

    #[test]
    fn test_override_replicates_into_listed_buckets() {
        let mut scheduler = Scheduler::new(1);
        let mut overrides = HashMap::new();
        overrides.insert(
            "x0".to_string(),
            vec!["banco.n".to_string(), "manga.n".to_string()],
        );
        scheduler.set_overrides(overrides);
        scheduler.load(vec![
            ("cabo.n".to_string(), inst("x0")),
            ("cabo.n".to_string(), inst("c1")),
        ]);
        // x0 ignora o lexelt natural e entra nos dois baldes listados
        assert_eq!(scheduler.lexelt("banco.n").unwrap().len(), 1);
        assert_eq!(scheduler.lexelt("manga.n").unwrap().len(), 1);
        assert_eq!(scheduler.lexelt("cabo.n").unwrap().len(), 1);
        assert!(scheduler.lexelt("banco.n").unwrap().find("x0").is_some());
    }

    #[test]
    fn test_run_collects_one_result_per_lexelt() {
        let mut scheduler = loaded_scheduler();
        let outcome = scheduler.run(&Uniform).unwrap();
        assert_eq!(outcome.results.len(), 3);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.total_evaluated(), 4);
        assert_eq!(scheduler.state(), SchedulerState::Collected);
    }

    #[test]
    fn test_single_failure_yields_partial_results() {
        let mut scheduler = loaded_scheduler();
        let outcome = scheduler.run(&FailOn("manga.n")).unwrap();
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].lexelt_id, "manga.n");
        assert!(matches!(
            outcome.failures[0].error,
            WsdError::Evaluation { .. }
        ));
        // a rodada termina mesmo com a falha
        assert_eq!(scheduler.state(), SchedulerState::Collected);
    }

    #[test]
    fn test_panic_is_contained_at_job_boundary() {
        let mut scheduler = loaded_scheduler();
        let outcome = scheduler.run(&PanicOn("vela.n")).unwrap();
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].lexelt_id, "vela.n");
    }

    #[test]
    fn test_duplicate_instance_id_in_bucket_dropped() {
        let mut scheduler = Scheduler::new(1);
        scheduler.load(vec![
            ("banco.n".to_string(), inst("b0")),
            ("banco.n".to_string(), inst("b0")),
        ]);
        assert_eq!(scheduler.lexelt("banco.n").unwrap().len(), 1);
    }
}
