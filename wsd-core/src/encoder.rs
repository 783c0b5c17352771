//! # Codificação Esparsa por Back-end
//!
//! Converte as instâncias de um [`Lexelt`] em vetores esparsos numéricos
//! prontos para uma biblioteca de classificação externa. Os quatro
//! back-ends (LibLinear, LibSVM, Weka denso/esparso e texto estilo MaxEnt)
//! compartilham o mesmo algoritmo de atribuição de índices sobre a
//! [`Statistic`] (tipicamente já recortada por seleção de features) e
//! divergem apenas na forma final.
//!
//! ## Atribuição de Índices
//!
//! As chaves são percorridas em ordem de registro com um índice corrente
//! começando em 1: chaves Numeric/Binary consomem exatamente um índice;
//! chaves Categorical consomem um índice por valor registrado, na ordem de
//! índice dos valores. `max_index` é o primeiro índice após o último
//! atribuído; o LibLinear usa essa posição para a feature de viés opcional.
//!
//! ## Convenções de Rótulo
//!
//! Cada instância expande em uma linha por etiqueta (mesmas features,
//! rótulos distintos); instâncias sem etiqueta produzem exatamente uma
//! linha com a convenção de rótulo ausente do back-end (`0` para
//! LibLinear/LibSVM, `?` para os formatos de texto).

use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::instance::{FeatureKind, Instance, DEFAULT_VALUE};
use crate::lexelt::Lexelt;
use crate::statistic::Statistic;

/// Bloco de índices de uma chave.
#[derive(Debug, Clone, Copy)]
struct KeyBlock {
    start: u32,
    kind: FeatureKind,
}

/// Atribuição global de índices sobre um recorte de [`Statistic`].
#[derive(Debug, Clone)]
pub struct IndexAssignment {
    blocks: HashMap<String, KeyBlock>,
    max_index: u32,
}

impl IndexAssignment {
    /// Percorre as chaves da estatística em ordem de registro e atribui os
    /// blocos de índice.
    pub fn build(statistic: &Statistic) -> Self {
        let mut blocks = HashMap::new();
        let mut next = 1u32;
        for key_index in 0..statistic.len() {
            let Some(key) = statistic.key_at(key_index) else {
                continue;
            };
            let Some(kind) = statistic.kind_at(key_index) else {
                continue;
            };
            let width = match kind {
                FeatureKind::Numeric | FeatureKind::Binary => 1,
                FeatureKind::Categorical => statistic
                    .values_at(key_index)
                    .map(|v| v.len() as u32)
                    .unwrap_or(0),
            };
            if width == 0 {
                continue;
            }
            blocks.insert(key.to_string(), KeyBlock { start: next, kind });
            next += width;
        }
        IndexAssignment {
            blocks,
            max_index: next,
        }
    }

    /// Primeiro índice após o último atribuído.
    pub fn max_index(&self) -> u32 {
        self.max_index
    }

    /// Índice inicial do bloco da chave, se atribuído.
    pub fn start_of(&self, key: &str) -> Option<u32> {
        self.blocks.get(key).map(|b| b.start)
    }
}

/// Codifica as features de uma instância num vetor esparso ordenado por
/// índice crescente.
///
/// Chave desconhecida para a estatística: feature ignorada em silêncio.
/// O tipo registrado na estatística prevalece sobre o tipo declarado na
/// feature.
pub fn encode_features(
    instance: &dyn Instance,
    statistic: &Statistic,
    assignment: &IndexAssignment,
) -> Vec<(u32, f64)> {
    let mut map: BTreeMap<u32, f64> = BTreeMap::new();
    for i in 0..instance.len() {
        let Some(feature) = instance.feature(i) else {
            continue;
        };
        let Some(block) = assignment.blocks.get(&feature.key) else {
            continue;
        };
        match block.kind {
            FeatureKind::Numeric => {
                let value: f64 = feature
                    .value
                    .as_deref()
                    .unwrap_or("")
                    .parse()
                    .unwrap_or(0.0);
                map.insert(block.start, value);
            }
            FeatureKind::Binary => {
                if feature.resolved_value() == "1" {
                    map.insert(block.start, 1.0);
                }
            }
            FeatureKind::Categorical => {
                let resolved = feature.resolved_value();
                let position = statistic
                    .value_position(&feature.key, resolved)
                    .or_else(|| statistic.value_position(&feature.key, DEFAULT_VALUE));
                if let Some(position) = position {
                    map.insert(block.start + position as u32, 1.0);
                }
            }
        }
    }
    map.into_iter().collect()
}

/// Uma linha do problema codificado: uma instância expandida por etiqueta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedRow {
    pub instance_id: String,
    pub doc_id: String,
    /// Etiqueta de origem da linha; `None` em instâncias sem rótulo.
    pub tag: Option<String>,
    /// 0 = sem rótulo ou etiqueta fora da ordem de treinamento; senão a
    /// posição 1-based da etiqueta na ordem de treinamento.
    pub class_id: u32,
    /// Pares (índice global, valor), em ordem crescente de índice.
    pub features: Vec<(u32, f64)>,
}

/// Problema em memória de um lexelt para um back-end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodedProblem {
    pub lexelt_id: String,
    /// Classes na ordem das etiquetas de treinamento.
    pub classes: Vec<String>,
    pub rows: Vec<EncodedRow>,
    /// Primeiro índice após o último atribuído às features.
    pub max_index: u32,
    /// Valor do viés quando o back-end anexa a linha de viés.
    pub bias: Option<f64>,
}

/// Expande as instâncias do lexelt em linhas codificadas.
fn encode_rows(
    lexelt: &Lexelt,
    statistic: &Statistic,
    assignment: &IndexAssignment,
) -> Vec<EncodedRow> {
    let mut rows = Vec::new();
    for instance in lexelt.instances() {
        let features = encode_features(instance.as_ref(), statistic, assignment);
        let tags = instance.tags();
        if tags.is_empty() {
            rows.push(EncodedRow {
                instance_id: instance.id().to_string(),
                doc_id: instance.doc_id().to_string(),
                tag: None,
                class_id: 0,
                features,
            });
            continue;
        }
        for tag in tags {
            let class_id = statistic
                .tag_position(tag)
                .map(|p| p as u32 + 1)
                .unwrap_or(0);
            rows.push(EncodedRow {
                instance_id: instance.id().to_string(),
                doc_id: instance.doc_id().to_string(),
                tag: Some(tag.clone()),
                class_id,
                features: features.clone(),
            });
        }
    }
    rows
}

/// Back-end de codificação de um lexelt (o "LexeltWriter" da família).
pub trait LexeltEncoder {
    /// Nome registrado do back-end.
    fn name(&self) -> &'static str;

    /// Constrói o problema em memória.
    fn encode(&self, lexelt: &Lexelt, statistic: &Statistic) -> EncodedProblem;

    /// Emite a forma textual nativa do back-end.
    fn write_to(&self, lexelt: &Lexelt, statistic: &Statistic, wtr: &mut dyn Write)
        -> Result<()>;
}

/// Back-end LibLinear: vetores esparsos com linha de viés opcional.
#[derive(Debug, Clone, Copy)]
pub struct LibLinearEncoder {
    /// Viés anexado em `max_index` quando não-negativo.
    pub bias: f64,
}

impl LibLinearEncoder {
    pub fn new(bias: f64) -> Self {
        LibLinearEncoder { bias }
    }
}

impl Default for LibLinearEncoder {
    /// Viés desabilitado (−1), como na biblioteca de destino.
    fn default() -> Self {
        LibLinearEncoder { bias: -1.0 }
    }
}

impl LexeltEncoder for LibLinearEncoder {
    fn name(&self) -> &'static str {
        "liblinear"
    }

    fn encode(&self, lexelt: &Lexelt, statistic: &Statistic) -> EncodedProblem {
        let assignment = IndexAssignment::build(statistic);
        let mut rows = encode_rows(lexelt, statistic, &assignment);
        let bias = if self.bias >= 0.0 {
            for row in &mut rows {
                row.features.push((assignment.max_index(), self.bias));
            }
            Some(self.bias)
        } else {
            None
        };
        EncodedProblem {
            lexelt_id: lexelt.id().to_string(),
            classes: statistic.tags().to_vec(),
            rows,
            max_index: assignment.max_index(),
            bias,
        }
    }

    fn write_to(
        &self,
        lexelt: &Lexelt,
        statistic: &Statistic,
        wtr: &mut dyn Write,
    ) -> Result<()> {
        let problem = self.encode(lexelt, statistic);
        for row in &problem.rows {
            write!(wtr, "{}", row.class_id)?;
            for (index, value) in &row.features {
                write!(wtr, " {}:{}", index, value)?;
            }
            writeln!(wtr)?;
        }
        Ok(())
    }
}

/// Back-end LibSVM: nunca anexa viés; instâncias sem rótulo saem com a
/// classe sintética 0 explícita.
#[derive(Debug, Clone, Copy, Default)]
pub struct LibSvmEncoder;

impl LexeltEncoder for LibSvmEncoder {
    fn name(&self) -> &'static str {
        "libsvm"
    }

    fn encode(&self, lexelt: &Lexelt, statistic: &Statistic) -> EncodedProblem {
        let assignment = IndexAssignment::build(statistic);
        let rows = encode_rows(lexelt, statistic, &assignment);
        EncodedProblem {
            lexelt_id: lexelt.id().to_string(),
            classes: statistic.tags().to_vec(),
            rows,
            max_index: assignment.max_index(),
            bias: None,
        }
    }

    fn write_to(
        &self,
        lexelt: &Lexelt,
        statistic: &Statistic,
        wtr: &mut dyn Write,
    ) -> Result<()> {
        let problem = self.encode(lexelt, statistic);
        for row in &problem.rows {
            write!(wtr, "{}", row.class_id)?;
            for (index, value) in &row.features {
                write!(wtr, " {}:{}", index, value)?;
            }
            writeln!(wtr)?;
        }
        Ok(())
    }
}

/// Back-end Weka (ARFF): forma densa com larguras fixas ou esparsa com
/// pares `{posição valor}`; ambas carregam os atributos `#ID` (string) e
/// `#TAG` (nominal).
#[derive(Debug, Clone, Copy)]
pub struct WekaEncoder {
    sparse: bool,
}

impl WekaEncoder {
    pub fn dense() -> Self {
        WekaEncoder { sparse: false }
    }

    pub fn sparse() -> Self {
        WekaEncoder { sparse: true }
    }

    /// Atributos de feature na ordem de índice global, junto com as
    /// posições ocupadas por tokens padrão de features Categorical (essas
    /// posições são omitidas na forma esparsa).
    fn attributes(statistic: &Statistic) -> (Vec<(String, FeatureKind)>, Vec<bool>) {
        let mut attributes = Vec::new();
        let mut is_default = Vec::new();
        for key_index in 0..statistic.len() {
            let (Some(key), Some(kind)) =
                (statistic.key_at(key_index), statistic.kind_at(key_index))
            else {
                continue;
            };
            match kind {
                FeatureKind::Numeric | FeatureKind::Binary => {
                    attributes.push((key.to_string(), kind));
                    is_default.push(false);
                }
                FeatureKind::Categorical => {
                    if let Some(values) = statistic.values_at(key_index) {
                        for value in values {
                            attributes.push((format!("{key}={value}"), kind));
                            is_default.push(value == DEFAULT_VALUE);
                        }
                    }
                }
            }
        }
        (attributes, is_default)
    }
}

impl LexeltEncoder for WekaEncoder {
    fn name(&self) -> &'static str {
        if self.sparse {
            "weka-sparse"
        } else {
            "weka"
        }
    }

    fn encode(&self, lexelt: &Lexelt, statistic: &Statistic) -> EncodedProblem {
        let assignment = IndexAssignment::build(statistic);
        let rows = encode_rows(lexelt, statistic, &assignment);
        EncodedProblem {
            lexelt_id: lexelt.id().to_string(),
            classes: statistic.tags().to_vec(),
            rows,
            max_index: assignment.max_index(),
            bias: None,
        }
    }

    fn write_to(
        &self,
        lexelt: &Lexelt,
        statistic: &Statistic,
        wtr: &mut dyn Write,
    ) -> Result<()> {
        let problem = self.encode(lexelt, statistic);
        let (attributes, is_default) = Self::attributes(statistic);
        let feature_count = attributes.len();

        writeln!(wtr, "@relation '{}'", problem.lexelt_id)?;
        writeln!(wtr)?;
        for (name, kind) in &attributes {
            match kind {
                FeatureKind::Numeric => writeln!(wtr, "@attribute '{}' numeric", name)?,
                _ => writeln!(wtr, "@attribute '{}' {{0,1}}", name)?,
            }
        }
        writeln!(wtr, "@attribute '#ID' string")?;
        writeln!(wtr, "@attribute '#TAG' {{{}}}", problem.classes.join(","))?;
        writeln!(wtr)?;
        writeln!(wtr, "@data")?;

        for row in &problem.rows {
            let tag = row.tag.as_deref().unwrap_or("?");
            if self.sparse {
                let mut parts = Vec::new();
                for (index, value) in &row.features {
                    let position = (*index - 1) as usize;
                    if is_default.get(position).copied().unwrap_or(false) {
                        continue;
                    }
                    parts.push(format!("{} {}", position, value));
                }
                parts.push(format!("{} '{}'", feature_count, row.instance_id));
                parts.push(format!("{} {}", feature_count + 1, tag));
                writeln!(wtr, "{{{}}}", parts.join(", "))?;
            } else {
                let mut dense = vec!["0".to_string(); feature_count];
                for (index, value) in &row.features {
                    let position = (*index - 1) as usize;
                    if position < dense.len() {
                        dense[position] = value.to_string();
                    }
                }
                dense.push(format!("'{}'", row.instance_id));
                dense.push(tag.to_string());
                writeln!(wtr, "{}", dense.join(","))?;
            }
        }
        Ok(())
    }
}

/// Back-end de texto estilo MaxEnt: uma linha por par (instância,
/// etiqueta), predicados esparsos `índice:valor` seguidos da etiqueta
/// (`?` quando ausente).
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxEntEncoder;

impl LexeltEncoder for MaxEntEncoder {
    fn name(&self) -> &'static str {
        "maxent"
    }

    fn encode(&self, lexelt: &Lexelt, statistic: &Statistic) -> EncodedProblem {
        let assignment = IndexAssignment::build(statistic);
        let rows = encode_rows(lexelt, statistic, &assignment);
        EncodedProblem {
            lexelt_id: lexelt.id().to_string(),
            classes: statistic.tags().to_vec(),
            rows,
            max_index: assignment.max_index(),
            bias: None,
        }
    }

    fn write_to(
        &self,
        lexelt: &Lexelt,
        statistic: &Statistic,
        wtr: &mut dyn Write,
    ) -> Result<()> {
        let problem = self.encode(lexelt, statistic);
        for row in &problem.rows {
            for (index, value) in &row.features {
                write!(wtr, "{}:{} ", index, value)?;
            }
            writeln!(wtr, "{}", row.tag.as_deref().unwrap_or("?"))?;
        }
        Ok(())
    }
}

/// Registro de back-ends por nome, no lugar de carga dinâmica de classes.
pub fn encoder_by_name(name: &str) -> Option<Box<dyn LexeltEncoder>> {
    match name {
        "liblinear" => Some(Box::new(LibLinearEncoder::default())),
        "libsvm" => Some(Box::new(LibSvmEncoder)),
        "weka" => Some(Box::new(WekaEncoder::dense())),
        "weka-sparse" => Some(Box::new(WekaEncoder::sparse())),
        "maxent" => Some(Box::new(MaxEntEncoder)),
        _ => None,
    }
}
