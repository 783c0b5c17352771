//! # Lexelt — o Balde de Instâncias de uma Palavra-Alvo
//!
//! Um lexelt ("elemento lexical", ex.: `banco.n`) agrupa todas as
//! instâncias de treinamento ou teste de uma palavra-alvo, junto com a
//! [`Statistic`] exclusiva delas. Instâncias são acrescentadas ao fim e
//! nunca reordenadas.

use crate::instance::InstanceRef;
use crate::statistic::Statistic;

/// Todas as instâncias de uma palavra-alvo e sua estatística própria.
pub struct Lexelt {
    id: String,
    instances: Vec<InstanceRef>,
    statistic: Statistic,
}

impl Lexelt {
    pub fn new<I: Into<String>>(id: I) -> Self {
        Lexelt {
            id: id.into(),
            instances: Vec::new(),
            statistic: Statistic::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Número de instâncias no balde.
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Acrescenta uma instância ao fim do balde.
    ///
    /// Devolve `false` (sem inserir) quando já existe instância com o mesmo
    /// id; quem chama decide o que fazer.
    pub fn add(&mut self, instance: InstanceRef) -> bool {
        if self.find(instance.id()).is_some() {
            return false;
        }
        self.instances.push(instance);
        true
    }

    /// Instância na posição `index`.
    pub fn instance(&self, index: usize) -> Option<&InstanceRef> {
        self.instances.get(index)
    }

    /// Instâncias em ordem de inserção.
    pub fn instances(&self) -> &[InstanceRef] {
        &self.instances
    }

    /// Posição da instância com o id dado.
    pub fn find(&self, id: &str) -> Option<usize> {
        self.instances.iter().position(|i| i.id() == id)
    }

    /// Remove e devolve a instância na posição `index`.
    ///
    /// Entra em pânico quando `index` está fora do intervalo (violação de
    /// contrato de programação). A remoção não corrige retroativamente as
    /// contagens já acumuladas na estatística; assimetria documentada do
    /// ciclo de vida.
    pub fn remove(&mut self, index: usize) -> InstanceRef {
        self.instances.remove(index)
    }

    /// Remove a instância com o id dado, se existir.
    ///
    /// Mesma assimetria de [`remove`](Self::remove): a estatística não é
    /// corrigida.
    pub fn remove_by_id(&mut self, id: &str) -> Option<InstanceRef> {
        let index = self.find(id)?;
        Some(self.instances.remove(index))
    }

    /// Reconstrói a estatística acumulando todas as instâncias atuais.
    pub fn train(&mut self) {
        let mut statistic = Statistic::new();
        for instance in &self.instances {
            statistic.add_instance(instance.as_ref());
        }
        self.statistic = statistic;
    }

    pub fn statistic(&self) -> &Statistic {
        &self.statistic
    }

    /// Substitui a estatística, tipicamente pelo recorte devolvido por
    /// [`Statistic::select`].
    pub fn set_statistic(&mut self, statistic: Statistic) {
        self.statistic = statistic;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Feature, InstanceRef, SimpleInstance};
    use crate::statistic::CountLookup;
    use std::sync::Arc;

    fn inst(id: &str, tag: &str) -> InstanceRef {
        let mut s = SimpleInstance::new(id, "doc");
        s.push(Feature::categorical("w-1", "do"));
        Arc::new(s.with_tags(vec![tag.to_string()]))
    }

    #[test]
    fn test_add_preserves_order() {
        let mut lexelt = Lexelt::new("banco.n");
        assert!(lexelt.add(inst("b", "s1")));
        assert!(lexelt.add(inst("a", "s1")));
        assert_eq!(lexelt.len(), 2);
        assert_eq!(lexelt.instance(0).unwrap().id(), "b");
        assert_eq!(lexelt.find("a"), Some(1));
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut lexelt = Lexelt::new("banco.n");
        assert!(lexelt.add(inst("i0", "s1")));
        assert!(!lexelt.add(inst("i0", "s2")));
        assert_eq!(lexelt.len(), 1);
    }

    #[test]
    fn test_remove_by_id() {
        let mut lexelt = Lexelt::new("banco.n");
        lexelt.add(inst("i0", "s1"));
        lexelt.add(inst("i1", "s1"));
        let removed = lexelt.remove_by_id("i0").unwrap();
        assert_eq!(removed.id(), "i0");
        assert_eq!(lexelt.len(), 1);
        assert!(lexelt.remove_by_id("i0").is_none());
    }

    #[test]
    #[should_panic]
    fn test_remove_out_of_range_panics() {
        let mut lexelt = Lexelt::new("banco.n");
        lexelt.add(inst("i0", "s1"));
        lexelt.remove(3);
    }

    #[test]
    fn test_train_builds_statistic() {
        let mut lexelt = Lexelt::new("banco.n");
        lexelt.add(inst("i0", "financeiro"));
        lexelt.add(inst("i1", "assento"));
        assert!(lexelt.statistic().is_empty());

        lexelt.train();
        assert_eq!(lexelt.statistic().total(), 2);
        assert_eq!(
            lexelt.statistic().count("w-1", "do"),
            CountLookup::Count(2)
        );
    }

    #[test]
    fn test_removal_does_not_correct_counts() {
        let mut lexelt = Lexelt::new("banco.n");
        lexelt.add(inst("i0", "s1"));
        lexelt.add(inst("i1", "s1"));
        lexelt.train();
        lexelt.remove_by_id("i0");
        // estatística segue refletindo o estado do treinamento
        assert_eq!(lexelt.statistic().total(), 2);
        assert_eq!(lexelt.len(), 1);
    }
}
