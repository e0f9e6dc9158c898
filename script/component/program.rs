use std::collections::HashMap;

use crate::inst::Inst;

/// An assembled, immutable instruction sequence. Threads share one
/// program through an `Rc`, each with its own instruction pointer.
#[derive(Debug)]
pub struct Program {
    name: String,
    insts: Box<[Inst]>,
    labels: HashMap<String, usize>,
}

impl Program {
    pub fn new(name: &str, insts: Vec<Inst>, labels: HashMap<String, usize>) -> Self {
        Program {
            name: name.to_string(),
            insts: insts.into(),
            labels,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn get(&self, addr: usize) -> Option<&Inst> {
        self.insts.get(addr)
    }

    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    pub fn label(&self, name: &str) -> Option<usize> {
        self.labels.get(name).copied()
    }
}

#[cfg(test)]
mod program_test {
    use super::*;

    #[test]
    fn addresses_and_labels_resolve() {
        let labels = HashMap::from([("top".to_string(), 1)]);
        let program = Program::new("p", vec![Inst::Label("top".to_string()), Inst::Nop], labels);

        assert_eq!(program.name(), "p");
        assert_eq!(program.len(), 2);
        assert_eq!(program.get(1), Some(&Inst::Nop));
        assert_eq!(program.get(2), None);
        assert_eq!(program.label("top"), Some(1));
        assert_eq!(program.label("nowhere"), None);
    }

    #[test]
    fn empty_programs_are_legal() {
        let program = Program::new("empty", vec![], HashMap::new());
        assert!(program.is_empty());
        assert_eq!(program.get(0), None);
    }
}
