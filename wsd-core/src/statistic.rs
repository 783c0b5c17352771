//! # Estatística de Features por Lexelt
//!
//! A [`Statistic`] é a tabela de frequências de um lexelt: para cada chave
//! de feature registra o tipo, o vocabulário de valores (com índices
//! estáveis em ordem de registro) e as contagens por valor e por
//! (valor, etiqueta). É construída uma única vez sobre as instâncias de
//! treinamento via [`add_instance`](Statistic::add_instance), podendo depois
//! ser recortada por [`select`](Statistic::select) e usada para atribuir os
//! índices de codificação.
//!
//! ## Invariantes
//!
//! - Ordem de registro = ordem de índice; chaves, valores e etiquetas nunca
//!   são reordenados.
//! - Features Binary nascem com os valores `"0"` (índice 0) e `"1"`
//!   (índice 1).
//! - Features Categorical nascem com o token [`DEFAULT_VALUE`] no índice 0.
//! - A contagem de `"0"` de uma feature Binary é respondida pela identidade
//!   complementar `total − contagem("1")`, nunca pelo valor armazenado.
//!
//! ## Formato de Arquivo
//!
//! Apenas o vocabulário é persistido (as contagens não sobrevivem ao
//! round-trip):
//!
//! ```text
//! etiqueta1 \t etiqueta2 ...
//! tipo_qualificado1 \t tipo_qualificado2 ...
//! chave \t índice_do_tipo \t valor0 \t valor1 ...
//! ```
//!
//! Texto puro ou gzip, escolhido pelo sufixo `.gz` do nome do arquivo.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Result, WsdError};
use crate::instance::{FeatureKind, Instance, DEFAULT_VALUE};
use crate::selector::{Decision, FeatureSelector};

/// Resultado de uma consulta de contagem.
///
/// Distingue explicitamente "chave desconhecida" de "valor desconhecido",
/// no lugar das sentinelas numéricas (-1/0) que tornavam as duas situações
/// indistinguíveis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountLookup {
    /// A chave de feature nunca foi registrada.
    MissingKey,
    /// A chave existe, mas o valor não pertence ao vocabulário dela.
    MissingValue,
    /// Contagem registrada.
    Count(u32),
}

impl CountLookup {
    /// Contagem numérica, tratando chave/valor desconhecidos como zero.
    pub fn or_zero(self) -> u32 {
        match self {
            CountLookup::Count(n) => n,
            _ => 0,
        }
    }
}

/// Registro interno de uma chave de feature.
#[derive(Debug, Clone)]
struct KeyEntry {
    key: String,
    kind: FeatureKind,
    values: Vec<String>,
    value_index: HashMap<String, usize>,
    value_counts: Vec<u32>,
    /// Contagem por valor e por etiqueta; cada vetor interno cresce sob
    /// demanda até o número de etiquetas conhecidas.
    value_tag_counts: Vec<Vec<u32>>,
}

impl KeyEntry {
    fn new(key: String, kind: FeatureKind) -> Self {
        let mut entry = KeyEntry {
            key,
            kind,
            values: Vec::new(),
            value_index: HashMap::new(),
            value_counts: Vec::new(),
            value_tag_counts: Vec::new(),
        };
        match kind {
            FeatureKind::Binary => {
                entry.push_value("0");
                entry.push_value("1");
            }
            FeatureKind::Categorical => {
                entry.push_value(DEFAULT_VALUE);
            }
            FeatureKind::Numeric => {}
        }
        entry
    }

    fn push_value(&mut self, value: &str) -> usize {
        let idx = self.values.len();
        self.values.push(value.to_string());
        self.value_index.insert(value.to_string(), idx);
        self.value_counts.push(0);
        self.value_tag_counts.push(Vec::new());
        idx
    }

    fn ensure_value(&mut self, value: &str) -> usize {
        match self.value_index.get(value) {
            Some(&idx) => idx,
            None => self.push_value(value),
        }
    }
}

/// Tabela de frequências feature/valor/etiqueta de um lexelt.
#[derive(Debug, Clone, Default)]
pub struct Statistic {
    entries: Vec<KeyEntry>,
    key_index: HashMap<String, usize>,
    tags: Vec<String>,
    tag_index: HashMap<String, usize>,
    tag_counts: Vec<u32>,
    /// Total de pares (instância, etiqueta) acumulados.
    total: u32,
}

impl Statistic {
    pub fn new() -> Self {
        Statistic::default()
    }

    /// Número de chaves registradas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Chaves em ordem de registro.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    /// Chave na posição `index`.
    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.key.as_str())
    }

    /// Posição de registro de uma chave.
    pub fn key_position(&self, key: &str) -> Option<usize> {
        self.key_index.get(key).copied()
    }

    /// Tipo da chave, se registrada.
    pub fn kind_of(&self, key: &str) -> Option<FeatureKind> {
        self.key_position(key).and_then(|i| self.kind_at(i))
    }

    /// Tipo da chave na posição `index`.
    pub fn kind_at(&self, index: usize) -> Option<FeatureKind> {
        self.entries.get(index).map(|e| e.kind)
    }

    /// Vocabulário de valores da chave, em ordem de índice.
    pub fn values(&self, key: &str) -> Option<&[String]> {
        self.key_position(key).and_then(|i| self.values_at(i))
    }

    /// Vocabulário de valores da chave na posição `index`.
    pub fn values_at(&self, index: usize) -> Option<&[String]> {
        self.entries.get(index).map(|e| e.values.as_slice())
    }

    /// Posição do valor no vocabulário da chave.
    pub fn value_position(&self, key: &str, value: &str) -> Option<usize> {
        let entry = &self.entries[self.key_position(key)?];
        entry.value_index.get(value).copied()
    }

    /// Contagem armazenada do valor na posição (`key_index`, `value_index`);
    /// zero fora do intervalo.
    pub fn value_count_at(&self, key_index: usize, value_index: usize) -> u32 {
        self.entries
            .get(key_index)
            .and_then(|e| e.value_counts.get(value_index))
            .copied()
            .unwrap_or(0)
    }

    /// Etiquetas em ordem de registro.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Posição de registro de uma etiqueta.
    pub fn tag_position(&self, tag: &str) -> Option<usize> {
        self.tag_index.get(tag).copied()
    }

    /// Contagem de pares (instância, etiqueta) para a etiqueta dada.
    pub fn tag_count(&self, tag: &str) -> u32 {
        self.tag_position(tag)
            .and_then(|i| self.tag_counts.get(i))
            .copied()
            .unwrap_or(0)
    }

    /// Total de pares (instância, etiqueta) acumulados.
    pub fn total(&self) -> u32 {
        self.total
    }

    fn ensure_tag(&mut self, tag: &str) -> usize {
        match self.tag_index.get(tag) {
            Some(&idx) => idx,
            None => {
                let idx = self.tags.len();
                self.tags.push(tag.to_string());
                self.tag_index.insert(tag.to_string(), idx);
                self.tag_counts.push(0);
                idx
            }
        }
    }

    fn ensure_key(&mut self, key: &str, kind: FeatureKind) -> usize {
        match self.key_index.get(key) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.entries.push(KeyEntry::new(key.to_string(), kind));
                self.key_index.insert(key.to_string(), idx);
                idx
            }
        }
    }

    /// Acumula uma instância na tabela.
    ///
    /// Cada etiqueta da instância incrementa a contagem da etiqueta e o
    /// total; cada feature registra chave/tipo quando inéditos e incrementa
    /// a contagem do valor resolvido uma vez, mais uma vez por etiqueta nos
    /// contadores por (valor, etiqueta). Features Numeric registram apenas
    /// chave e tipo.
    pub fn add_instance(&mut self, instance: &dyn Instance) {
        let mut tag_ids = Vec::with_capacity(instance.tags().len());
        for tag in instance.tags() {
            let idx = self.ensure_tag(tag);
            self.tag_counts[idx] += 1;
            self.total += 1;
            tag_ids.push(idx);
        }

        let n_tags = self.tags.len();
        for i in 0..instance.len() {
            let Some(feature) = instance.feature(i) else {
                continue;
            };
            let entry_idx = self.ensure_key(&feature.key, feature.kind);
            if self.entries[entry_idx].kind == FeatureKind::Numeric {
                continue;
            }
            let value = feature.resolved_value().to_string();
            let entry = &mut self.entries[entry_idx];
            let value_idx = entry.ensure_value(&value);
            entry.value_counts[value_idx] += 1;
            let per_tag = &mut entry.value_tag_counts[value_idx];
            if per_tag.len() < n_tags {
                per_tag.resize(n_tags, 0);
            }
            for &t in &tag_ids {
                per_tag[t] += 1;
            }
        }
    }

    /// Contagem do valor para a chave dada.
    pub fn count(&self, key: &str, value: &str) -> CountLookup {
        match self.key_position(key) {
            Some(idx) => self.count_at(idx, value),
            None => CountLookup::MissingKey,
        }
    }

    /// Contagem do valor para a chave na posição `key_index`.
    ///
    /// Numeric responde sempre `Count(0)` (contagens não fazem sentido);
    /// Binary consultada por `"0"` responde a identidade complementar
    /// `total − contagem("1")`.
    pub fn count_at(&self, key_index: usize, value: &str) -> CountLookup {
        let Some(entry) = self.entries.get(key_index) else {
            return CountLookup::MissingKey;
        };
        match entry.kind {
            FeatureKind::Numeric => CountLookup::Count(0),
            FeatureKind::Binary if value == "0" => {
                let ones = entry
                    .value_index
                    .get("1")
                    .and_then(|&i| entry.value_counts.get(i))
                    .copied()
                    .unwrap_or(0);
                CountLookup::Count(self.total.saturating_sub(ones))
            }
            _ => match entry.value_index.get(value) {
                Some(&i) => CountLookup::Count(entry.value_counts[i]),
                None => CountLookup::MissingValue,
            },
        }
    }

    /// Contagem armazenada do par (valor, etiqueta).
    ///
    /// Responde sempre o valor armazenado; a identidade complementar de
    /// Binary não se aplica por etiqueta. Etiqueta desconhecida conta zero.
    pub fn count_for_tag(&self, key: &str, value: &str, tag: &str) -> CountLookup {
        let Some(key_idx) = self.key_position(key) else {
            return CountLookup::MissingKey;
        };
        let entry = &self.entries[key_idx];
        if entry.kind == FeatureKind::Numeric {
            return CountLookup::Count(0);
        }
        let Some(&value_idx) = entry.value_index.get(value) else {
            return CountLookup::MissingValue;
        };
        let count = self
            .tag_position(tag)
            .and_then(|t| entry.value_tag_counts[value_idx].get(t))
            .copied()
            .unwrap_or(0);
        CountLookup::Count(count)
    }

    /// Recorta o vocabulário segundo o seletor, produzindo uma nova tabela.
    ///
    /// A tabela original permanece intacta. Features com decisão `Filter`
    /// são descartadas inteiras; em features `Part`, cada valor com decisão
    /// `Filter` é descartado, exceto o token padrão de features Categorical
    /// e os valores fixos `"0"`/`"1"` de features Binary, que sobrevivem
    /// sempre. Índices são compactados preservando a ordem relativa.
    pub fn select(&self, selector: &dyn FeatureSelector) -> Statistic {
        let mut out = Statistic {
            entries: Vec::new(),
            key_index: HashMap::new(),
            tags: self.tags.clone(),
            tag_index: self.tag_index.clone(),
            tag_counts: self.tag_counts.clone(),
            total: self.total,
        };

        for (key_idx, entry) in self.entries.iter().enumerate() {
            match selector.feature_decision(self, key_idx) {
                Decision::Filter => continue,
                Decision::Accept => out.push_entry(entry.clone()),
                Decision::Part => {
                    if entry.kind != FeatureKind::Categorical {
                        // Binary tem vocabulário fixo; Numeric não tem valores
                        out.push_entry(entry.clone());
                        continue;
                    }
                    let mut kept = KeyEntry {
                        key: entry.key.clone(),
                        kind: entry.kind,
                        values: Vec::new(),
                        value_index: HashMap::new(),
                        value_counts: Vec::new(),
                        value_tag_counts: Vec::new(),
                    };
                    for (value_idx, value) in entry.values.iter().enumerate() {
                        let survives = value == DEFAULT_VALUE
                            || selector.value_decision(self, key_idx, value_idx) != Decision::Filter;
                        if survives {
                            let idx = kept.push_value(value);
                            kept.value_counts[idx] = entry.value_counts[value_idx];
                            kept.value_tag_counts[idx] = entry.value_tag_counts[value_idx].clone();
                        }
                    }
                    out.push_entry(kept);
                }
            }
        }
        out
    }

    fn push_entry(&mut self, entry: KeyEntry) {
        self.key_index.insert(entry.key.clone(), self.entries.len());
        self.entries.push(entry);
    }

    /// Grava o vocabulário no formato texto descrito no módulo.
    ///
    /// A saída é determinística byte a byte: apenas vetores ordenados são
    /// percorridos, nunca mapas.
    pub fn write_to<W: Write>(&self, wtr: &mut W) -> Result<()> {
        writeln!(wtr, "{}", self.tags.join("\t"))?;

        let mut kind_names: Vec<&'static str> = Vec::new();
        for entry in &self.entries {
            let name = entry.kind.qualified_name();
            if !kind_names.contains(&name) {
                kind_names.push(name);
            }
        }
        writeln!(wtr, "{}", kind_names.join("\t"))?;

        for entry in &self.entries {
            let kind_pos = kind_names
                .iter()
                .position(|n| *n == entry.kind.qualified_name())
                .unwrap_or(0);
            write!(wtr, "{}\t{}", entry.key, kind_pos)?;
            for value in &entry.values {
                write!(wtr, "\t{}", value)?;
            }
            writeln!(wtr)?;
        }
        Ok(())
    }

    /// Lê um vocabulário gravado por [`write_to`](Self::write_to).
    ///
    /// O round-trip reproduz chaves, tipos e vocabulários exatamente; as
    /// contagens voltam zeradas (serialização com perda, por projeto do
    /// formato).
    pub fn read_from<R: BufRead>(rdr: R) -> Result<Self> {
        let mut lines = rdr.lines();
        let tag_line = lines
            .next()
            .transpose()?
            .ok_or_else(|| WsdError::invalid_statistic_file(1, "linha de etiquetas ausente"))?;
        let kind_line = lines
            .next()
            .transpose()?
            .ok_or_else(|| WsdError::invalid_statistic_file(2, "linha de tipos ausente"))?;

        let mut st = Statistic::new();
        if !tag_line.is_empty() {
            for tag in tag_line.split('\t') {
                st.ensure_tag(tag);
            }
        }

        let kinds = if kind_line.is_empty() {
            Vec::new()
        } else {
            kind_line
                .split('\t')
                .map(|name| {
                    FeatureKind::from_qualified_name(name).ok_or_else(|| {
                        WsdError::invalid_statistic_file(
                            2,
                            format!("tipo de feature desconhecido: {name}"),
                        )
                    })
                })
                .collect::<Result<Vec<_>>>()?
        };

        for (offset, line) in lines.enumerate() {
            let line = line?;
            let line_no = offset + 3;
            let mut parts = line.split('\t');
            let key = parts.next().unwrap_or("");
            if key.is_empty() {
                return Err(WsdError::invalid_statistic_file(line_no, "chave vazia"));
            }
            let kind_pos: usize = parts
                .next()
                .ok_or_else(|| {
                    WsdError::invalid_statistic_file(line_no, "índice de tipo ausente")
                })?
                .parse()
                .map_err(|_| {
                    WsdError::invalid_statistic_file(line_no, "índice de tipo não numérico")
                })?;
            let kind = kinds.get(kind_pos).copied().ok_or_else(|| {
                WsdError::invalid_statistic_file(line_no, "índice de tipo fora do intervalo")
            })?;
            let entry_idx = st.ensure_key(key, kind);
            for value in parts {
                st.entries[entry_idx].ensure_value(value);
            }
        }
        Ok(st)
    }

    /// Grava em arquivo; gzip quando o nome termina em `.gz`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let mut wtr = BufWriter::new(file);
        if is_gz(path) {
            let mut enc = GzEncoder::new(wtr, Compression::default());
            self.write_to(&mut enc)?;
            enc.finish()?.flush()?;
        } else {
            self.write_to(&mut wtr)?;
            wtr.flush()?;
        }
        debug!("Estatística gravada em {}", path.display());
        Ok(())
    }

    /// Lê de arquivo; gzip quando o nome termina em `.gz`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let st = if is_gz(path) {
            Self::read_from(BufReader::new(GzDecoder::new(BufReader::new(file))))?
        } else {
            Self::read_from(BufReader::new(file))?
        };
        debug!("Estatística carregada de {}", path.display());
        Ok(st)
    }
}

fn is_gz(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Feature, SimpleInstance};
    use crate::selector::CutoffSelector;

    fn inst(id: &str, tags: &[&str], features: Vec<Feature>) -> SimpleInstance {
        let mut s = SimpleInstance::new(id, "doc");
        for f in features {
            s.push(f);
        }
        s.with_tags(tags.iter().map(|t| t.to_string()).collect())
    }

    fn pos_statistic() -> Statistic {
        // POS observado: NOUN 3 vezes, VERB 1 vez (exemplo canônico)
        let mut st = Statistic::new();
        for (i, v) in ["NOUN", "NOUN", "NOUN", "VERB"].iter().enumerate() {
            st.add_instance(&inst(
                &format!("i{i}"),
                &["s1"],
                vec![Feature::categorical("POS", *v)],
            ));
        }
        st
    }

    #[test]
    fn test_binary_complement_identity() {
        // 5 instâncias com etiqueta única, 3 com a feature ligada
        let mut st = Statistic::new();
        for (i, on) in [true, true, true, false, false].iter().enumerate() {
            st.add_instance(&inst(&format!("i{i}"), &["s1"], vec![Feature::binary("cap", *on)]));
        }
        assert_eq!(st.count("cap", "1"), CountLookup::Count(3));
        assert_eq!(st.count("cap", "0"), CountLookup::Count(2));
        let total = st.count("cap", "0").or_zero() + st.count("cap", "1").or_zero();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_binary_preseeded_value_order() {
        let mut st = Statistic::new();
        st.add_instance(&inst("i0", &["s1"], vec![Feature::binary("cap", true)]));
        assert_eq!(st.values("cap").unwrap(), &["0", "1"]);
    }

    #[test]
    fn test_categorical_counts_sum_to_carriers() {
        let mut st = Statistic::new();
        // 4 instâncias carregam POS (uma com valor ausente → token padrão);
        // uma quinta não carrega a feature
        st.add_instance(&inst("i0", &["s1"], vec![Feature::categorical("POS", "NOUN")]));
        st.add_instance(&inst("i1", &["s1"], vec![Feature::categorical("POS", "NOUN")]));
        st.add_instance(&inst("i2", &["s1"], vec![Feature::categorical("POS", "VERB")]));
        st.add_instance(&inst(
            "i3",
            &["s1"],
            vec![Feature {
                key: "POS".into(),
                value: None,
                kind: FeatureKind::Categorical,
            }],
        ));
        st.add_instance(&inst("i4", &["s1"], vec![]));

        let sum: u32 = st
            .values("POS")
            .unwrap()
            .iter()
            .map(|v| st.count("POS", v).or_zero())
            .sum();
        assert_eq!(sum, 4);
        assert_eq!(st.count("POS", DEFAULT_VALUE), CountLookup::Count(1));
    }

    #[test]
    fn test_count_distinguishes_missing_key_and_value() {
        let st = pos_statistic();
        assert_eq!(st.count("inexistente", "NOUN"), CountLookup::MissingKey);
        assert_eq!(st.count("POS", "ADJ"), CountLookup::MissingValue);
        assert_eq!(st.count("POS", "VERB"), CountLookup::Count(1));
    }

    #[test]
    fn test_numeric_counts_are_zero() {
        let mut st = Statistic::new();
        st.add_instance(&inst("i0", &["s1"], vec![Feature::numeric("ctx", 4.0)]));
        assert_eq!(st.kind_of("ctx"), Some(FeatureKind::Numeric));
        assert_eq!(st.values("ctx").unwrap().len(), 0);
        assert_eq!(st.count("ctx", "4"), CountLookup::Count(0));
    }

    #[test]
    fn test_multi_tag_instance_counts() {
        let mut st = Statistic::new();
        st.add_instance(&inst(
            "i0",
            &["a", "b"],
            vec![Feature::categorical("w-1", "do")],
        ));
        // total conta pares (instância, etiqueta); a contagem do valor conta
        // a instância uma única vez
        assert_eq!(st.total(), 2);
        assert_eq!(st.tag_count("a"), 1);
        assert_eq!(st.tag_count("b"), 1);
        assert_eq!(st.count("w-1", "do"), CountLookup::Count(1));
        assert_eq!(st.count_for_tag("w-1", "do", "a"), CountLookup::Count(1));
        assert_eq!(st.count_for_tag("w-1", "do", "b"), CountLookup::Count(1));
        assert_eq!(st.count_for_tag("w-1", "do", "c"), CountLookup::Count(0));
    }

    #[test]
    fn test_tag_registration_order() {
        let mut st = Statistic::new();
        st.add_instance(&inst("i0", &["b"], vec![]));
        st.add_instance(&inst("i1", &["a"], vec![]));
        st.add_instance(&inst("i2", &["b"], vec![]));
        assert_eq!(st.tags(), &["b".to_string(), "a".to_string()]);
        assert_eq!(st.tag_position("b"), Some(0));
        assert_eq!(st.tag_count("b"), 2);
    }

    #[test]
    fn test_select_cutoff_zero_is_noop() {
        let st = pos_statistic();
        let pruned = st.select(&CutoffSelector::new(FeatureKind::Categorical, 0));
        assert_eq!(pruned.keys(), st.keys());
        assert_eq!(pruned.values("POS"), st.values("POS"));
    }

    #[test]
    fn test_select_cutoff_above_max_keeps_only_default() {
        let st = pos_statistic();
        let pruned = st.select(&CutoffSelector::new(FeatureKind::Categorical, 100));
        assert_eq!(pruned.values("POS").unwrap(), &[DEFAULT_VALUE]);
    }

    #[test]
    fn test_select_pos_example_cutoff_two() {
        let st = pos_statistic();
        let pruned = st.select(&CutoffSelector::new(FeatureKind::Categorical, 2));
        let values = pruned.values("POS").unwrap();
        assert_eq!(values, &[DEFAULT_VALUE, "NOUN"]);
        // contagens dos sobreviventes são preservadas
        assert_eq!(pruned.count("POS", "NOUN"), CountLookup::Count(3));
        assert_eq!(pruned.count("POS", "VERB"), CountLookup::MissingValue);
    }

    #[test]
    fn test_select_leaves_source_untouched() {
        let st = pos_statistic();
        let _pruned = st.select(&CutoffSelector::new(FeatureKind::Categorical, 100));
        assert_eq!(st.values("POS").unwrap().len(), 3);
        assert_eq!(st.count("POS", "VERB"), CountLookup::Count(1));
    }

    #[test]
    fn test_select_reindexes_surviving_keys() {
        let mut st = Statistic::new();
        st.add_instance(&inst(
            "i0",
            &["s1"],
            vec![
                Feature::categorical("raro", "x"),
                Feature::categorical("comum", "y"),
            ],
        ));
        st.add_instance(&inst("i1", &["s1"], vec![Feature::categorical("comum", "y")]));
        // Derruba valores com contagem < 2: "raro" vira só o token padrão,
        // "comum" mantém "y"; ambas as chaves sobrevivem com índices compactos
        let pruned = st.select(&CutoffSelector::new(FeatureKind::Categorical, 2));
        assert_eq!(pruned.keys(), vec!["raro", "comum"]);
        assert_eq!(pruned.key_position("comum"), Some(1));
        assert_eq!(pruned.values("raro").unwrap(), &[DEFAULT_VALUE]);
        assert_eq!(pruned.values("comum").unwrap(), &[DEFAULT_VALUE, "y"]);
    }

    #[test]
    fn test_write_is_deterministic() {
        let st = pos_statistic();
        let mut a = Vec::new();
        let mut b = Vec::new();
        st.write_to(&mut a).unwrap();
        st.write_to(&mut b).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_roundtrip_in_memory() {
        let mut st = Statistic::new();
        st.add_instance(&inst(
            "i0",
            &["s1", "s2"],
            vec![
                Feature::categorical("w-1", "do"),
                Feature::binary("cap", true),
                Feature::numeric("ctx", 4.0),
            ],
        ));
        let mut buf = Vec::new();
        st.write_to(&mut buf).unwrap();
        let loaded = Statistic::read_from(&buf[..]).unwrap();

        assert_eq!(loaded.keys(), st.keys());
        assert_eq!(loaded.tags(), st.tags());
        for key in st.keys() {
            assert_eq!(loaded.values(key), st.values(key), "vocabulário de {key}");
            assert_eq!(loaded.kind_of(key), st.kind_of(key));
        }
        // contagens não sobrevivem (formato com perda)
        assert_eq!(loaded.total(), 0);
        assert_eq!(loaded.count("w-1", "do"), CountLookup::Count(0));
    }

    #[test]
    fn test_roundtrip_plain_and_gzip_files() {
        let st = pos_statistic();
        let dir = tempfile::tempdir().unwrap();

        for name in ["estatistica.txt", "estatistica.txt.gz"] {
            let path = dir.path().join(name);
            st.save(&path).unwrap();
            let loaded = Statistic::load(&path).unwrap();
            assert_eq!(loaded.keys(), st.keys(), "{name}");
            for key in st.keys() {
                assert_eq!(loaded.values(key), st.values(key), "{name}: {key}");
            }
        }
    }

    #[test]
    fn test_load_rejects_unknown_kind_name() {
        let data = "s1\ntipo::Inexistente\nPOS\t0\t<NIL>\tNOUN\n";
        let err = Statistic::read_from(data.as_bytes()).unwrap_err();
        assert!(matches!(err, WsdError::InvalidStatisticFile { line: 2, .. }));
    }

    #[test]
    fn test_load_rejects_truncated_key_line() {
        let data = "s1\nwsd_core::instance::FeatureKind::Categorical\nPOS\n";
        let err = Statistic::read_from(data.as_bytes()).unwrap_err();
        assert!(matches!(err, WsdError::InvalidStatisticFile { line: 3, .. }));
    }
}
