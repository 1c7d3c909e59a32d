//! Schema arena.

use rustc_hash::FxHashMap;

use pmatch_ir::{Name, PrimitiveKind, StringInterner};

use crate::{Schema, SchemaId, SchemaKind};

/// Structural keys for schemas synthesized by the compiler rather than
/// extracted from a descriptor.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
enum SyntheticKey {
    Primitive(PrimitiveKind),
    SequenceOf(SchemaId),
    Opaque,
}

/// Arena of schemas addressed by [`SchemaId`].
///
/// Slots are append-only. A slot may be reserved before its schema is known
/// (cycle breaking during extraction) and filled exactly once afterwards.
#[derive(Clone, Debug, Default)]
pub struct SchemaPool {
    schemas: Vec<Schema>,
    synthetic: FxHashMap<SyntheticKey, SchemaId>,
}

impl SchemaPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, schema: Schema) -> SchemaId {
        let id = SchemaId::from_raw(u32::try_from(self.schemas.len()).unwrap_or(u32::MAX));
        self.schemas.push(schema);
        id
    }

    /// Reserve a slot. It reads as an opaque schema named `name` until filled.
    pub(crate) fn reserve(&mut self, name: Name) -> SchemaId {
        self.push(Schema::opaque(name))
    }

    pub(crate) fn fill(&mut self, id: SchemaId, schema: Schema) {
        if let Some(slot) = self.schemas.get_mut(id.index()) {
            *slot = schema;
        }
    }

    pub fn get(&self, id: SchemaId) -> &Schema {
        &self.schemas[id.index()]
    }

    pub fn try_get(&self, id: SchemaId) -> Option<&Schema> {
        self.schemas.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Follow alias targets to the schema the alias names.
    pub fn canonical(&self, mut id: SchemaId) -> SchemaId {
        // Alias chains are acyclic: an alias slot is filled from its target.
        for _ in 0..self.schemas.len() {
            let schema = self.get(id);
            match schema.target {
                Some(target) if schema.alias_name.is_some() && target != id => id = target,
                _ => break,
            }
        }
        id
    }

    /// Canonical schema with indirections unwrapped to their pointee.
    pub fn unwrap_indirections(&self, id: SchemaId) -> SchemaId {
        let mut id = self.canonical(id);
        for _ in 0..self.schemas.len() {
            let schema = self.get(id);
            match schema.target {
                Some(target) if schema.kind == SchemaKind::Indirection && target != id => {
                    id = self.canonical(target);
                }
                _ => break,
            }
        }
        id
    }

    fn intern_synthetic(&mut self, key: SyntheticKey, build: impl FnOnce() -> Schema) -> SchemaId {
        if let Some(&id) = self.synthetic.get(&key) {
            return id;
        }
        let id = self.push(build());
        self.synthetic.insert(key, id);
        id
    }

    pub fn primitive(&mut self, kind: PrimitiveKind, interner: &StringInterner) -> SchemaId {
        self.intern_synthetic(SyntheticKey::Primitive(kind), || {
            Schema::primitive(kind, interner.intern(kind.as_str()))
        })
    }

    /// `seq[elem]`, e.g. the type of a spread binding over a fixed array.
    pub fn sequence_of(&mut self, elem: SchemaId, interner: &StringInterner) -> SchemaId {
        let elem_name = interner.lookup(self.get(elem).display_name());
        self.intern_synthetic(SyntheticKey::SequenceOf(elem), || {
            let mut schema = Schema::new(SchemaKind::Sequence, interner.intern(&format!("seq[{elem_name}]")));
            schema.element = Some(elem);
            schema
        })
    }

    /// The shared opaque schema for unresolvable references.
    pub fn opaque(&mut self, interner: &StringInterner) -> SchemaId {
        self.intern_synthetic(SyntheticKey::Opaque, || Schema::opaque(interner.intern("<unknown>")))
    }
}
