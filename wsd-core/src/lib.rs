//! # wsd-core — Pipeline de Desambiguação de Sentido de Palavras (WSD)
//!
//! Este crate implementa o núcleo de um pipeline supervisionado de
//! classificação para WSD em Português Brasileiro. Para cada palavra-alvo
//! (um "lexelt") ele acumula estatísticas de features rotuladas, poda o
//! vocabulário por frequência, codifica instâncias em vetores esparsos para
//! vários back-ends de classificação e avalia muitos lexelts em paralelo,
//! reconciliando os resultados de volta na ordem do documento.
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui e é transformado passo a passo:
//!
//! 1.  **Entrada**: instâncias rotuladas ou não ([`instance`]), uma por
//!     ocorrência da palavra-alvo, agrupadas por lexelt ([`lexelt`]).
//! 2.  **Contagem** ([`statistic`]): cada lexelt acumula frequências de
//!     feature, valor e rótulo num [`Statistic`] próprio.
//! 3.  **Seleção de Features** ([`selector`]): políticas de corte por
//!     frequência podam o vocabulário, compondo-se em cadeia.
//! 4.  **Codificação** ([`encoder`]): o vocabulário podado vira uma
//!     atribuição global de índices e cada instância vira um vetor esparso
//!     num dos quatro back-ends (LibLinear, LibSVM, Weka, MaxEnt).
//! 5.  **Avaliação** ([`scheduler`]): um job por lexelt num pool fixo de
//!     threads, com falhas contidas na fronteira do job.
//! 6.  **Saída** ([`resolver`]): os resultados por instância são
//!     reconciliados contra o fluxo de tokens original, resolvendo
//!     candidatos multipalavra sobrepostos.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use wsd_core::{
//!     CutoffSelector, Feature, FeatureKind, Lexelt, LexeltEncoder, LibLinearEncoder,
//!     SimpleInstance,
//! };
//!
//! // 1. Uma instância rotulada do lexelt "banco.n"
//! let mut instance = SimpleInstance::new("banco.n.1", "doc0");
//! instance.push(Feature::categorical("w-1", "do"));
//! instance.push(Feature::binary("cap", true));
//! let instance = instance.with_tags(vec!["financeiro".to_string()]);
//!
//! // 2. Agrupa no lexelt e acumula as contagens de treino
//! let mut lexelt = Lexelt::new("banco.n");
//! lexelt.add(Arc::new(instance));
//! lexelt.train();
//!
//! // 3. Poda valores raros e codifica para o back-end LibLinear
//! let selector = CutoffSelector::new(FeatureKind::Categorical, 1);
//! let pruned = lexelt.statistic().select(&selector);
//!
//! let problem = LibLinearEncoder::default().encode(&lexelt, &pruned);
//! assert_eq!(problem.rows.len(), 1);
//! assert_eq!(problem.classes, vec!["financeiro".to_string()]);
//! ```
//!
//! ## Módulos Principais
//!
//! - [`statistic`]: a tabela de frequências por lexelt, com snapshot em
//!   arquivo (texto ou gzip) só de vocabulário.
//! - [`encoder`]: a atribuição de índices compartilhada e os quatro
//!   formatos de saída.
//! - [`scheduler`]: o escalonador de avaliações concorrentes.
//! - [`resolver`]: a fusão de candidatos sobrepostos no fluxo decorado.

pub mod encoder;
pub mod errors;
pub mod instance;
pub mod lexelt;
pub mod resolver;
pub mod result;
pub mod scheduler;
pub mod selector;
pub mod statistic;

pub use encoder::{
    encode_features, encoder_by_name, EncodedProblem, EncodedRow, IndexAssignment, LexeltEncoder,
    LibLinearEncoder, LibSvmEncoder, MaxEntEncoder, WekaEncoder,
};
pub use errors::{Result, WsdError};
pub use instance::{Feature, FeatureKind, Instance, InstanceRef, SimpleInstance, DEFAULT_VALUE};
pub use lexelt::Lexelt;
pub use resolver::{
    Candidate, CorpusToken, DecoratedToken, OverlapResolver, SenseChoice, UNKNOWN_SENSE,
};
pub use result::{Evaluator, ResultInfo};
pub use scheduler::{EvaluationFailure, RunOutcome, Scheduler, SchedulerState};
pub use selector::{
    selector_by_name, BinaryCutoffSelector, CutoffSelector, Decision, FeatureSelector,
    SelectorChain,
};
pub use statistic::{CountLookup, Statistic};
