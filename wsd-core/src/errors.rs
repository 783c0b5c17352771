//! # Erros do Núcleo WSD
//!
//! Tipo de erro único para todo o crate, cobrindo a taxonomia do sistema:
//! falhas de E/S ao persistir estatísticas, arquivos de vocabulário
//! malformados e falhas de avaliação dentro de um job por lexelt.
//!
//! Faltas de vocabulário (chave ou valor desconhecido na codificação) não
//! são erros: são recuperadas localmente pelo codificador. Violações de
//! contrato de programação (índice fora do intervalo na remoção) causam
//! pânico imediato, sem recuperação.

/// Alias de `Result` usado em todo o crate.
pub type Result<T, E = WsdError> = std::result::Result<T, E>;

/// Erro do núcleo WSD.
#[derive(Debug, thiserror::Error)]
pub enum WsdError {
    /// Erro de entrada/saída ao ler ou gravar arquivos de estatística.
    #[error("erro de E/S: {0}")]
    Io(#[from] std::io::Error),

    /// O arquivo de estatística não segue o formato esperado.
    #[error("arquivo de estatística inválido (linha {line}): {msg}")]
    InvalidStatisticFile { line: usize, msg: String },

    /// Uma avaliação por lexelt falhou dentro do seu job.
    #[error("avaliação do lexelt '{lexelt_id}' falhou: {msg}")]
    Evaluation { lexelt_id: String, msg: String },

    /// Não foi possível criar o pool de threads do escalonador.
    #[error("falha ao criar o pool de threads: {0}")]
    ThreadPool(String),

    /// Argumento inválido passado a uma operação do núcleo.
    #[error("argumento inválido: {0}")]
    InvalidArgument(String),
}

impl WsdError {
    /// Constrói um erro de arquivo de estatística malformado.
    pub fn invalid_statistic_file<S: Into<String>>(line: usize, msg: S) -> Self {
        Self::InvalidStatisticFile {
            line,
            msg: msg.into(),
        }
    }

    /// Constrói um erro de avaliação para o lexelt informado.
    pub fn evaluation<I: Into<String>, S: Into<String>>(lexelt_id: I, msg: S) -> Self {
        Self::Evaluation {
            lexelt_id: lexelt_id.into(),
            msg: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluation_error_names_lexelt() {
        let err = WsdError::evaluation("banco.n", "classificador indisponível");
        let msg = err.to_string();
        assert!(msg.contains("banco.n"));
        assert!(msg.contains("classificador indisponível"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "nao existe");
        let err: WsdError = io.into();
        assert!(matches!(err, WsdError::Io(_)));
    }
}
