//! Class- and subroutine-scoped symbol tables.
//!
//! The class scope holds `static` and `field` declarations for the whole
//! class; the subroutine scope holds `arg` and `var` entries and is cleared
//! when a new subroutine starts. Indices are dense per-kind counters, which
//! is exactly what the VM segments need.

use crate::vm_writer::Segment;
use std::collections::HashMap;

/// Declaration kind of a Jack variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Static,
    Field,
    Arg,
    Var,
}

impl Kind {
    /// VM segment holding variables of this kind.
    #[must_use]
    pub fn segment(self) -> Segment {
        match self {
            Self::Static => Segment::Static,
            Self::Field => Segment::This,
            Self::Arg => Segment::Argument,
            Self::Var => Segment::Local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub var_type: String,
    pub kind: Kind,
    pub index: u16,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    class_scope: HashMap<String, Entry>,
    subroutine_scope: HashMap<String, Entry>,
    static_index: u16,
    field_index: u16,
    arg_index: u16,
    var_index: u16,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the subroutine scope and its counters; the class scope stays.
    pub fn start_subroutine(&mut self) {
        self.subroutine_scope.clear();
        self.arg_index = 0;
        self.var_index = 0;
    }

    /// Declares a variable, assigning it the next index of its kind.
    pub fn define(&mut self, name: &str, var_type: &str, kind: Kind) {
        let counter = match kind {
            Kind::Static => &mut self.static_index,
            Kind::Field => &mut self.field_index,
            Kind::Arg => &mut self.arg_index,
            Kind::Var => &mut self.var_index,
        };
        let scope = match kind {
            Kind::Static | Kind::Field => &mut self.class_scope,
            Kind::Arg | Kind::Var => &mut self.subroutine_scope,
        };
        if scope.contains_key(name) {
            return;
        }
        let entry = Entry {
            var_type: var_type.to_string(),
            kind,
            index: *counter,
        };
        *counter += 1;
        scope.insert(name.to_string(), entry);
    }

    /// Declared variables of a kind so far.
    #[must_use]
    pub fn var_count(&self, kind: Kind) -> u16 {
        match kind {
            Kind::Static => self.static_index,
            Kind::Field => self.field_index,
            Kind::Arg => self.arg_index,
            Kind::Var => self.var_index,
        }
    }

    /// Looks a name up, subroutine scope first. `None` means the name is
    /// not a variable; callers treat it as a class name or an error
    /// depending on context.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Entry> {
        self.subroutine_scope
            .get(name)
            .or_else(|| self.class_scope.get(name))
    }
}
