//! # Instâncias e Features
//!
//! Uma **instância** é uma ocorrência da palavra-alvo a ser desambiguada,
//! com suas features extraídas e, no treinamento, uma ou mais etiquetas de
//! sentido. O núcleo consome instâncias apenas através do trait
//! [`Instance`]; quem produz instâncias (tokenizador, extrator de features)
//! vive fora deste crate.
//!
//! ## Tipos de Feature
//!
//! - **Numeric**: carrega um valor numérico, sem vocabulário.
//! - **Binary**: só assume os valores `"0"` e `"1"`.
//! - **Categorical**: vocabulário aberto de valores; o token reservado
//!   [`DEFAULT_VALUE`] representa "feature ausente ou valor fora do
//!   vocabulário".

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Valor reservado de features categóricas: "ausente ou fora do vocabulário".
pub const DEFAULT_VALUE: &str = "<NIL>";

/// Tipo de uma feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Valor numérico livre (ex.: tamanho da janela de contexto).
    Numeric,
    /// Presença/ausência, valores `"0"`/`"1"`.
    Binary,
    /// Vocabulário aberto de strings (ex.: palavra vizinha).
    Categorical,
}

impl FeatureKind {
    /// Nome de tipo totalmente qualificado, gravado no cabeçalho do arquivo
    /// de estatística.
    pub fn qualified_name(&self) -> &'static str {
        match self {
            FeatureKind::Numeric => "wsd_core::instance::FeatureKind::Numeric",
            FeatureKind::Binary => "wsd_core::instance::FeatureKind::Binary",
            FeatureKind::Categorical => "wsd_core::instance::FeatureKind::Categorical",
        }
    }

    /// Inverso de [`qualified_name`](Self::qualified_name); exige o nome exato.
    pub fn from_qualified_name(name: &str) -> Option<FeatureKind> {
        match name {
            "wsd_core::instance::FeatureKind::Numeric" => Some(FeatureKind::Numeric),
            "wsd_core::instance::FeatureKind::Binary" => Some(FeatureKind::Binary),
            "wsd_core::instance::FeatureKind::Categorical" => Some(FeatureKind::Categorical),
            _ => None,
        }
    }
}

/// Uma feature extraída: chave, valor textual opcional e tipo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub key: String,
    pub value: Option<String>,
    pub kind: FeatureKind,
}

impl Feature {
    /// Feature numérica com o valor dado.
    pub fn numeric<K: Into<String>>(key: K, value: f64) -> Self {
        Feature {
            key: key.into(),
            value: Some(value.to_string()),
            kind: FeatureKind::Numeric,
        }
    }

    /// Feature binária; `on` vira o valor `"1"`, caso contrário `"0"`.
    pub fn binary<K: Into<String>>(key: K, on: bool) -> Self {
        Feature {
            key: key.into(),
            value: Some(if on { "1" } else { "0" }.to_string()),
            kind: FeatureKind::Binary,
        }
    }

    /// Feature categórica com o valor dado.
    pub fn categorical<K: Into<String>, V: Into<String>>(key: K, value: V) -> Self {
        Feature {
            key: key.into(),
            value: Some(value.into()),
            kind: FeatureKind::Categorical,
        }
    }

    /// Valor resolvido para contagem e codificação.
    ///
    /// Binary: `"1"` se o valor for exatamente `"1"`, senão `"0"`.
    /// Categorical: [`DEFAULT_VALUE`] quando ausente ou vazio.
    /// Numeric: o texto bruto (vazio quando ausente); o parse numérico
    /// acontece na codificação.
    pub fn resolved_value(&self) -> &str {
        match self.kind {
            FeatureKind::Binary => {
                if self.value.as_deref() == Some("1") {
                    "1"
                } else {
                    "0"
                }
            }
            FeatureKind::Categorical => match self.value.as_deref() {
                Some(v) if !v.is_empty() => v,
                _ => DEFAULT_VALUE,
            },
            FeatureKind::Numeric => self.value.as_deref().unwrap_or(""),
        }
    }
}

/// Contrato de instância consumido pelo núcleo.
///
/// Implementações vivem nos colaboradores externos (leitores de corpus,
/// extratores de features); o crate fornece [`SimpleInstance`] como
/// implementação concreta de referência.
pub trait Instance {
    /// Identificador único da instância dentro de um lexelt.
    fn id(&self) -> &str;

    /// Identificador do documento de origem.
    fn doc_id(&self) -> &str;

    /// Número de features.
    fn len(&self) -> usize;

    /// `true` quando a instância não tem nenhuma feature.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Feature na posição `index`, se existir.
    fn feature(&self, index: usize) -> Option<&Feature>;

    /// Chave da feature na posição `index`, se existir.
    fn feature_name(&self, index: usize) -> Option<&str>;

    /// Etiquetas de sentido; vazio = instância de teste (sem rótulo).
    fn tags(&self) -> &[String];
}

/// Instância compartilhável entre lexelts e threads de trabalho.
pub type InstanceRef = Arc<dyn Instance + Send + Sync>;

/// Implementação concreta de [`Instance`] com features em ordem de inserção.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimpleInstance {
    pub id: String,
    pub doc_id: String,
    pub features: Vec<Feature>,
    pub tags: Vec<String>,
}

impl SimpleInstance {
    pub fn new<I: Into<String>, D: Into<String>>(id: I, doc_id: D) -> Self {
        SimpleInstance {
            id: id.into(),
            doc_id: doc_id.into(),
            features: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Acrescenta uma feature ao fim da lista.
    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    /// Define as etiquetas de sentido (estilo builder).
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

impl Instance for SimpleInstance {
    fn id(&self) -> &str {
        &self.id
    }

    fn doc_id(&self) -> &str {
        &self.doc_id
    }

    fn len(&self) -> usize {
        self.features.len()
    }

    fn feature(&self, index: usize) -> Option<&Feature> {
        self.features.get(index)
    }

    fn feature_name(&self, index: usize) -> Option<&str> {
        self.features.get(index).map(|f| f.key.as_str())
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_value_resolution() {
        assert_eq!(Feature::binary("cap", true).resolved_value(), "1");
        assert_eq!(Feature::binary("cap", false).resolved_value(), "0");
        // Qualquer valor diferente de "1" resolve para "0"
        let weird = Feature {
            key: "cap".into(),
            value: Some("sim".into()),
            kind: FeatureKind::Binary,
        };
        assert_eq!(weird.resolved_value(), "0");
    }

    #[test]
    fn test_categorical_default_substitution() {
        let absent = Feature {
            key: "w-1".into(),
            value: None,
            kind: FeatureKind::Categorical,
        };
        assert_eq!(absent.resolved_value(), DEFAULT_VALUE);
        let empty = Feature {
            key: "w-1".into(),
            value: Some(String::new()),
            kind: FeatureKind::Categorical,
        };
        assert_eq!(empty.resolved_value(), DEFAULT_VALUE);
        assert_eq!(Feature::categorical("w-1", "banco").resolved_value(), "banco");
    }

    #[test]
    fn test_qualified_name_roundtrip() {
        for kind in [
            FeatureKind::Numeric,
            FeatureKind::Binary,
            FeatureKind::Categorical,
        ] {
            assert_eq!(FeatureKind::from_qualified_name(kind.qualified_name()), Some(kind));
        }
        assert_eq!(FeatureKind::from_qualified_name("Binary"), None);
    }

    #[test]
    fn test_simple_instance_accessors() {
        let mut inst = SimpleInstance::new("banco.n.0", "doc1");
        inst.push(Feature::categorical("w-1", "do"));
        inst.push(Feature::numeric("ctx", 4.0));
        let inst = inst.with_tags(vec!["financeiro".to_string()]);

        assert_eq!(inst.id(), "banco.n.0");
        assert_eq!(inst.doc_id(), "doc1");
        assert_eq!(inst.len(), 2);
        assert!(!inst.is_empty());
        assert_eq!(inst.feature_name(0), Some("w-1"));
        assert_eq!(inst.feature_name(2), None);
        assert!(inst.feature(1).is_some());
        assert_eq!(inst.tags(), &["financeiro".to_string()]);
    }
}
