//! # Seleção de Features por Corte de Frequência
//!
//! Políticas de poda do vocabulário de uma [`Statistic`]: valores (ou
//! features inteiras) com frequência abaixo de um corte são descartados
//! para reduzir a dimensionalidade dos vetores codificados.
//!
//! A decisão tem três níveis: `Accept` mantém a feature inteira, `Part`
//! mantém a feature mas submete cada valor a uma decisão própria, `Filter`
//! descarta a feature (ou o valor) por completo. Seletores são compostos
//! por [`SelectorChain`], onde o primeiro `Filter` vence imediatamente.

use serde::{Deserialize, Serialize};

use crate::instance::{FeatureKind, DEFAULT_VALUE};
use crate::statistic::Statistic;

/// Decisão de seleção sobre uma feature ou um valor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Mantém por inteiro.
    Accept,
    /// Mantém a feature, decidindo valor a valor.
    Part,
    /// Descarta por completo.
    Filter,
}

/// Política de seleção consultada por [`Statistic::select`].
pub trait FeatureSelector {
    /// Decisão sobre a feature na posição `key_index`.
    fn feature_decision(&self, statistic: &Statistic, key_index: usize) -> Decision;

    /// Decisão sobre um valor de uma feature classificada como `Part`.
    fn value_decision(
        &self,
        statistic: &Statistic,
        key_index: usize,
        value_index: usize,
    ) -> Decision;
}

/// Corte por frequência de valor, restrito a um tipo de feature.
///
/// Features do tipo-alvo viram `Part` quando algum valor não-padrão tem
/// contagem abaixo do corte; esses valores são filtrados individualmente e
/// o token padrão nunca é filtrado. Features de outros tipos passam
/// intactas.
#[derive(Debug, Clone, Copy)]
pub struct CutoffSelector {
    kind: FeatureKind,
    cutoff: u32,
}

impl CutoffSelector {
    pub fn new(kind: FeatureKind, cutoff: u32) -> Self {
        CutoffSelector { kind, cutoff }
    }
}

impl FeatureSelector for CutoffSelector {
    fn feature_decision(&self, statistic: &Statistic, key_index: usize) -> Decision {
        let Some(kind) = statistic.kind_at(key_index) else {
            return Decision::Accept;
        };
        if kind != self.kind {
            return Decision::Accept;
        }
        let Some(values) = statistic.values_at(key_index) else {
            return Decision::Accept;
        };
        for (value_index, value) in values.iter().enumerate() {
            if value == DEFAULT_VALUE {
                continue;
            }
            if statistic.value_count_at(key_index, value_index) < self.cutoff {
                return Decision::Part;
            }
        }
        Decision::Accept
    }

    fn value_decision(
        &self,
        statistic: &Statistic,
        key_index: usize,
        value_index: usize,
    ) -> Decision {
        if statistic.kind_at(key_index) != Some(self.kind) {
            return Decision::Accept;
        }
        let value = statistic
            .values_at(key_index)
            .and_then(|values| values.get(value_index));
        match value {
            Some(v) if v != DEFAULT_VALUE => {
                if statistic.value_count_at(key_index, value_index) < self.cutoff {
                    Decision::Filter
                } else {
                    Decision::Accept
                }
            }
            _ => Decision::Accept,
        }
    }
}

/// Especialização para features Binary: filtra a feature inteira quando a
/// contagem do valor `"1"` fica abaixo do corte, em vez de filtrar valor a
/// valor.
#[derive(Debug, Clone, Copy)]
pub struct BinaryCutoffSelector {
    cutoff: u32,
}

impl BinaryCutoffSelector {
    pub fn new(cutoff: u32) -> Self {
        BinaryCutoffSelector { cutoff }
    }
}

impl FeatureSelector for BinaryCutoffSelector {
    fn feature_decision(&self, statistic: &Statistic, key_index: usize) -> Decision {
        if statistic.kind_at(key_index) != Some(FeatureKind::Binary) {
            return Decision::Accept;
        }
        // índice 1 é sempre o valor "1" em features Binary
        if statistic.value_count_at(key_index, 1) < self.cutoff {
            Decision::Filter
        } else {
            Decision::Accept
        }
    }

    fn value_decision(&self, _: &Statistic, _: usize, _: usize) -> Decision {
        Decision::Accept
    }
}

/// Composição ordenada de seletores.
///
/// O resultado começa em `Accept`; o primeiro sub-seletor que responder
/// `Filter` vence imediatamente; `Part` rebaixa um `Accept` corrente. A
/// mesma lógica vale para as decisões por valor.
#[derive(Default)]
pub struct SelectorChain {
    selectors: Vec<Box<dyn FeatureSelector>>,
}

impl SelectorChain {
    pub fn new() -> Self {
        SelectorChain::default()
    }

    /// Acrescenta um sub-seletor ao fim da cadeia (estilo builder).
    pub fn with(mut self, selector: Box<dyn FeatureSelector>) -> Self {
        self.selectors.push(selector);
        self
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    fn combine<F: Fn(&dyn FeatureSelector) -> Decision>(&self, decide: F) -> Decision {
        let mut result = Decision::Accept;
        for selector in &self.selectors {
            match decide(selector.as_ref()) {
                Decision::Filter => return Decision::Filter,
                Decision::Part => {
                    if result == Decision::Accept {
                        result = Decision::Part;
                    }
                }
                Decision::Accept => {}
            }
        }
        result
    }
}

impl FeatureSelector for SelectorChain {
    fn feature_decision(&self, statistic: &Statistic, key_index: usize) -> Decision {
        self.combine(|s| s.feature_decision(statistic, key_index))
    }

    fn value_decision(
        &self,
        statistic: &Statistic,
        key_index: usize,
        value_index: usize,
    ) -> Decision {
        self.combine(|s| s.value_decision(statistic, key_index, value_index))
    }
}

/// Registro de seletores por nome, usado pela configuração dos drivers.
pub fn selector_by_name(name: &str, cutoff: u32) -> Option<Box<dyn FeatureSelector>> {
    match name {
        "cutoff" => Some(Box::new(CutoffSelector::new(FeatureKind::Categorical, cutoff))),
        "cutoff-binary" => Some(Box::new(BinaryCutoffSelector::new(cutoff))),
        _ => None,
    }
}
