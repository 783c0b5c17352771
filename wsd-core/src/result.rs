//! # Resultado de Avaliação por Lexelt
//!
//! [`ResultInfo`] é a matriz de probabilidades produzida pela avaliação de
//! um lexelt: uma linha por instância, uma coluna por classe, mais os ids
//! de instância e documento alinhados às linhas. O avaliador em si (o
//! classificador treinado) é um colaborador externo atrás do trait
//! [`Evaluator`].

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::lexelt::Lexelt;

/// Resultado imutável de uma rodada de avaliação de um lexelt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultInfo {
    /// Lexelt que produziu este resultado.
    pub lexelt_id: String,
    /// Classes (sentidos) na ordem de colunas da matriz.
    pub classes: Vec<String>,
    /// Probabilidade por instância (linha) e classe (coluna).
    pub probabilities: Vec<Vec<f64>>,
    /// Id de cada instância, alinhado às linhas.
    pub ids: Vec<String>,
    /// Id do documento de cada instância, alinhado às linhas.
    pub docs: Vec<String>,
}

impl ResultInfo {
    /// Número de instâncias avaliadas.
    pub fn size(&self) -> usize {
        self.ids.len()
    }

    /// Linha de probabilidades da instância na posição `index`.
    pub fn probability_row(&self, index: usize) -> Option<&[f64]> {
        self.probabilities.get(index).map(|r| r.as_slice())
    }

    /// Posição da linha correspondente ao id de instância dado.
    pub fn row_of(&self, instance_id: &str) -> Option<usize> {
        self.ids.iter().position(|id| id == instance_id)
    }
}

/// Colaborador externo que avalia um lexelt inteiro.
///
/// `Sync` porque o escalonador compartilha o avaliador entre as threads do
/// pool, uma chamada por lexelt.
pub trait Evaluator: Sync {
    fn evaluate(&self, lexelt: &Lexelt) -> Result<ResultInfo>;
}
