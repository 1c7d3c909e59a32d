//! Descriptor to schema extraction with a session cache.
//!
//! The cache maps `(descriptor, generic arguments)` to a schema id. Generic
//! arguments are only part of the key for descriptors that mention a
//! template parameter somewhere below them; everything else is cached by
//! descriptor alone.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::{debug, trace};

use pmatch_ir::{ensure_sufficient_stack, Name, StringInterner};

use crate::descriptor::{BranchSelector, ContainerKind, ObjectShape, Origin, Shape, TypeRef};
use crate::{
    Discriminator, DescriptorId, EnumMember, FieldDescriptor, Schema, SchemaFlags, SchemaId, SchemaKind,
    SchemaPool, TypeDescriptor, TypeTable, VariantBranch,
};

type CacheKey = (DescriptorId, SmallVec<[SchemaId; 2]>);

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ExtractOptions {
    /// Character separating a label's prefix from its case name
    /// (`k` in `nkIdent`).
    pub branch_marker: char,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions { branch_marker: 'k' }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Session-scoped schema store: the pool plus the extraction cache.
///
/// Entries are never invalidated; descriptors are immutable for the
/// lifetime of a session.
#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    pool: SchemaPool,
    cache: FxHashMap<CacheKey, SchemaId>,
    parametric: FxHashMap<DescriptorId, bool>,
    stats: CacheStats,
    options: ExtractOptions,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ExtractOptions) -> Self {
        SchemaRegistry {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> ExtractOptions {
        self.options
    }

    pub fn pool(&self) -> &SchemaPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut SchemaPool {
        &mut self.pool
    }

    pub fn get(&self, id: SchemaId) -> &Schema {
        self.pool.get(id)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Schema of a descriptor. Total: unknown or dangling descriptors yield
    /// an opaque schema.
    pub fn schema_of(&mut self, table: &TypeTable, interner: &StringInterner, id: DescriptorId) -> SchemaId {
        debug!(descriptor = ?id, "extract schema");
        let mut extractor = Extractor {
            registry: self,
            table,
            interner,
            pending: FxHashSet::default(),
            views: Vec::new(),
        };
        let schema = extractor.extract(id, &[]);
        extractor.complete_views();
        schema
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum ViewKind {
    Alias,
    Indirection,
}

/// An alias or indirection whose source was still being extracted when the
/// view was built.
#[derive(Copy, Clone, Debug)]
struct DeferredView {
    view: SchemaId,
    source: SchemaId,
    kind: ViewKind,
    name: Name,
    descriptor: DescriptorId,
}

struct Extractor<'r> {
    registry: &'r mut SchemaRegistry,
    table: &'r TypeTable,
    interner: &'r StringInterner,
    /// Reserved slots not yet filled.
    pending: FxHashSet<SchemaId>,
    views: Vec<DeferredView>,
}

impl Extractor<'_> {
    fn extract(&mut self, id: DescriptorId, env: &[SchemaId]) -> SchemaId {
        ensure_sufficient_stack(|| self.extract_inner(id, env))
    }

    fn extract_inner(&mut self, id: DescriptorId, env: &[SchemaId]) -> SchemaId {
        let table = self.table;
        let Some(desc) = table.get(id) else {
            return self.registry.pool.opaque(self.interner);
        };

        let env_key: SmallVec<[SchemaId; 2]> = if self.is_parametric(id) {
            env.iter().copied().collect()
        } else {
            SmallVec::new()
        };
        let key = (id, env_key);

        if let Some(&cached) = self.registry.cache.get(&key) {
            self.registry.stats.hits += 1;
            trace!(descriptor = ?id, schema = ?cached, "schema cache hit");
            return cached;
        }
        self.registry.stats.misses += 1;
        trace!(descriptor = ?id, "schema cache miss");

        // Instances share the template's slot for the same arguments.
        if let Shape::Instance { template, args } = &desc.shape {
            let args: SmallVec<[SchemaId; 2]> = args.iter().map(|arg| self.resolve(*arg, env)).collect();
            let schema = self.extract(*template, &args);
            self.registry.cache.insert(key, schema);
            return schema;
        }

        let slot = self.registry.pool.reserve(desc.name);
        self.registry.cache.insert(key, slot);
        self.pending.insert(slot);

        let schema = self.build(id, desc, slot, env);
        self.registry.pool.fill(slot, schema);
        self.pending.remove(&slot);
        slot
    }

    fn resolve(&mut self, ty: TypeRef, env: &[SchemaId]) -> SchemaId {
        match ty {
            TypeRef::Desc(id) => self.extract(id, env),
            TypeRef::Param(index) => match env.get(index as usize) {
                Some(&arg) => arg,
                None => self.registry.pool.opaque(self.interner),
            },
        }
    }

    /// Whether the descriptor mentions a template parameter anywhere below
    /// it, so its schema depends on the generic arguments in scope.
    fn is_parametric(&mut self, id: DescriptorId) -> bool {
        if let Some(&known) = self.registry.parametric.get(&id) {
            return known;
        }
        let mut visited = FxHashSet::default();
        let result = mentions_params(self.table, id, &mut visited);
        self.registry.parametric.insert(id, result);
        result
    }

    fn build(&mut self, id: DescriptorId, desc: &TypeDescriptor, slot: SchemaId, env: &[SchemaId]) -> Schema {
        let name = self.instance_name(desc, env);
        let mut schema = match &desc.shape {
            Shape::Primitive(kind) => Schema::primitive(*kind, name),
            Shape::Alias(target) => {
                let source = self.resolve(*target, env);
                self.view(ViewKind::Alias, slot, source, name, id)
            }
            Shape::Indirection(target) => {
                let source = self.resolve(*target, env);
                self.view(ViewKind::Indirection, slot, source, name, id)
            }
            Shape::Container { kind, args } => self.build_container(*kind, args, env, name),
            Shape::Object(obj) => self.build_object(desc.origin, obj, env, name),
            Shape::Tuple(elems) => {
                let mut schema = Schema::new(SchemaKind::Tuple, name);
                for (position, (field_name, ty)) in (0u32..).zip(elems) {
                    let field_name = field_name.unwrap_or_else(|| self.interner.intern(&position.to_string()));
                    let field_schema = self.resolve(*ty, env);
                    schema.fields.push(FieldDescriptor {
                        name: field_name,
                        schema: field_schema,
                        position,
                        visibility: crate::Visibility::Public,
                    });
                }
                schema
            }
            Shape::Enum(members) => {
                let mut schema = Schema::new(SchemaKind::Enumeration, name);
                schema.members = members
                    .iter()
                    .map(|&(name, ordinal)| EnumMember { name, ordinal })
                    .collect();
                schema
            }
            // Handled before reserving a slot.
            Shape::Instance { .. } | Shape::Unknown => Schema::opaque(name),
        };
        schema.descriptor = Some(id);
        schema
    }

    /// `Name[Arg, ...]` for a template extracted under arguments.
    fn instance_name(&self, desc: &TypeDescriptor, env: &[SchemaId]) -> Name {
        if desc.params == 0 || env.is_empty() {
            return desc.name;
        }
        let args: Vec<&str> = env
            .iter()
            .map(|arg| self.interner.lookup(self.registry.pool.get(*arg).display_name()))
            .collect();
        let base = self.interner.lookup(desc.name);
        self.interner.intern(&format!("{base}[{}]", args.join(", ")))
    }

    fn build_container(&mut self, kind: ContainerKind, args: &[TypeRef], env: &[SchemaId], name: Name) -> Schema {
        if args.len() != kind.arity() {
            debug!(?kind, args = args.len(), "container arity mismatch, extracting as opaque");
            return Schema::opaque(name);
        }
        let resolved: SmallVec<[SchemaId; 2]> = args.iter().map(|arg| self.resolve(*arg, env)).collect();
        let schema_kind = match kind {
            ContainerKind::Seq => SchemaKind::Sequence,
            ContainerKind::Array(_) => SchemaKind::Array,
            ContainerKind::Map => SchemaKind::Map,
            ContainerKind::Set => SchemaKind::Set,
            ContainerKind::Optional => SchemaKind::Optional,
        };
        let mut schema = Schema::new(schema_kind, name);
        match kind {
            ContainerKind::Map => {
                schema.key = Some(resolved[0]);
                schema.value = Some(resolved[1]);
            }
            ContainerKind::Array(len) => {
                schema.element = Some(resolved[0]);
                schema.array_len = Some(len);
            }
            ContainerKind::Seq | ContainerKind::Set | ContainerKind::Optional => {
                schema.element = Some(resolved[0]);
            }
        }
        schema
    }

    fn build_object(&mut self, origin: Origin, obj: &ObjectShape, env: &[SchemaId], name: Name) -> Schema {
        let mut schema = Schema::new(SchemaKind::Record, name);

        if let Some(base) = obj.base {
            let base = self.resolve(base, env);
            let base_id = self.registry.pool.unwrap_indirections(base);
            let base_schema = self.registry.pool.get(base_id);
            schema.fields.clone_from(&base_schema.fields);
            schema.ancestors.push(base_id);
            schema.ancestors.extend(base_schema.ancestors.iter().copied());
            if obj.variant.is_none() {
                schema.branches.clone_from(&base_schema.branches);
                schema.discriminator = base_schema.discriminator;
            }
            schema.flags |= SchemaFlags::SUPPORTS_OPEN_EXTENSION;
        }
        if obj.inheritable {
            schema.flags |= SchemaFlags::SUPPORTS_OPEN_EXTENSION;
        }

        for decl in &obj.fields {
            let field_schema = self.resolve(decl.ty, env);
            push_field(&mut schema.fields, decl.name, field_schema, decl.visibility);
        }

        if let Some(variant) = &obj.variant {
            let disc_schema = self.resolve(variant.discriminator.ty, env);
            push_field(
                &mut schema.fields,
                variant.discriminator.name,
                disc_schema,
                variant.discriminator.visibility,
            );
            schema.discriminator = Some(Discriminator {
                field: variant.discriminator.name,
                schema: disc_schema,
            });

            let domain = self.label_domain(disc_schema, &variant.branches);
            let shared = schema.fields.len();
            let mut branches: Vec<VariantBranch> = domain
                .iter()
                .map(|&(label, ordinal)| VariantBranch {
                    label,
                    ordinal,
                    fields: Vec::new(),
                })
                .collect();

            let named: FxHashSet<Name> = variant
                .branches
                .iter()
                .filter_map(|b| match &b.selector {
                    BranchSelector::Labels(labels) => Some(labels.iter().copied()),
                    BranchSelector::Else => None,
                })
                .flatten()
                .collect();

            for decl in &variant.branches {
                let mut fields = Vec::with_capacity(decl.fields.len());
                let mut position = u32::try_from(shared).unwrap_or(u32::MAX);
                for field in &decl.fields {
                    let field_schema = self.resolve(field.ty, env);
                    fields.push(FieldDescriptor {
                        name: field.name,
                        schema: field_schema,
                        position,
                        visibility: field.visibility,
                    });
                    position = position.saturating_add(1);
                }
                for branch in &mut branches {
                    let selected = match &decl.selector {
                        BranchSelector::Labels(labels) => labels.contains(&branch.label),
                        BranchSelector::Else => !named.contains(&branch.label),
                    };
                    if selected {
                        branch.fields.clone_from(&fields);
                    }
                }
            }

            if origin == Origin::TaggedUnionGenerator
                && !branches.is_empty()
                && branches
                    .iter()
                    .all(|b| marker_split(self.interner.lookup(b.label), self.registry.options.branch_marker).is_some())
            {
                schema.flags |= SchemaFlags::TAGGED_UNION;
            }
            schema.branches = branches;
        }

        if schema.discriminator.is_some() {
            schema.kind = SchemaKind::Union;
        }
        schema
    }

    /// Every `(label, ordinal)` the discriminator can take.
    ///
    /// Enumerations and bools enumerate their own domain; any other
    /// discriminator type falls back to the declared labels in order.
    fn label_domain(&self, disc: SchemaId, decls: &[crate::VariantDecl]) -> Vec<(Name, i64)> {
        let pool = &self.registry.pool;
        let disc_schema = pool.get(pool.unwrap_indirections(disc));
        match disc_schema.kind {
            SchemaKind::Enumeration => disc_schema.members.iter().map(|m| (m.name, m.ordinal)).collect(),
            SchemaKind::Primitive if disc_schema.primitive == Some(pmatch_ir::PrimitiveKind::Bool) => vec![
                (self.interner.intern("false"), 0),
                (self.interner.intern("true"), 1),
            ],
            _ => {
                let mut labels: Vec<Name> = Vec::new();
                for decl in decls {
                    if let BranchSelector::Labels(declared) = &decl.selector {
                        for label in declared {
                            if !labels.contains(label) {
                                labels.push(*label);
                            }
                        }
                    }
                }
                (0i64..).zip(labels).map(|(ordinal, label)| (label, ordinal)).collect()
            }
        }
    }

    fn view(&mut self, kind: ViewKind, slot: SchemaId, source: SchemaId, name: Name, id: DescriptorId) -> Schema {
        if self.pending.contains(&source) || self.views.iter().any(|v| v.view == source) {
            trace!(view = ?slot, source = ?source, ?kind, "deferring view of incomplete schema");
            self.views.push(DeferredView {
                view: slot,
                source,
                kind,
                name,
                descriptor: id,
            });
        }
        make_view(&self.registry.pool, kind, source, name)
    }

    /// Rebuild every deferred view now that all sources are filled. A view
    /// of another deferred view is rebuilt after its source.
    fn complete_views(&mut self) {
        let mut done = vec![false; self.views.len()];
        for index in 0..self.views.len() {
            self.complete_view(index, &mut done);
        }
        self.views.clear();
    }

    fn complete_view(&mut self, index: usize, done: &mut [bool]) {
        if done[index] {
            return;
        }
        done[index] = true;
        let deferred = self.views[index];
        if let Some(source_index) = self.views.iter().position(|v| v.view == deferred.source) {
            self.complete_view(source_index, done);
        }
        let mut schema = make_view(&self.registry.pool, deferred.kind, deferred.source, deferred.name);
        schema.descriptor = Some(deferred.descriptor);
        self.registry.pool.fill(deferred.view, schema);
    }
}

fn push_field(
    fields: &mut Vec<FieldDescriptor>,
    name: Name,
    schema: SchemaId,
    visibility: crate::Visibility,
) {
    let position = u32::try_from(fields.len()).unwrap_or(u32::MAX);
    fields.push(FieldDescriptor {
        name,
        schema,
        position,
        visibility,
    });
}

fn make_view(pool: &SchemaPool, kind: ViewKind, source: SchemaId, name: Name) -> Schema {
    let src = pool.get(source);
    match kind {
        ViewKind::Alias => {
            let mut schema = src.clone();
            schema.alias_name = Some(name);
            schema.flags |= SchemaFlags::ALIASED;
            schema.target = Some(source);
            schema
        }
        ViewKind::Indirection => {
            let mut schema = Schema::new(SchemaKind::Indirection, name);
            schema.flags = SchemaFlags::IS_INDIRECTION | (src.flags & SchemaFlags::INHERITED);
            schema.fields.clone_from(&src.fields);
            schema.branches.clone_from(&src.branches);
            schema.discriminator = src.discriminator;
            schema.ancestors.clone_from(&src.ancestors);
            schema.target = Some(source);
            schema
        }
    }
}

fn mentions_params(table: &TypeTable, id: DescriptorId, visited: &mut FxHashSet<DescriptorId>) -> bool {
    if !visited.insert(id) {
        return false;
    }
    let Some(desc) = table.get(id) else {
        return false;
    };
    if desc.params > 0 {
        return true;
    }
    let refs = match &desc.shape {
        // The template's own parameters are bound by the arguments.
        Shape::Instance { args, .. } => args.clone(),
        shape => shape.refs(),
    };
    refs.into_iter().any(|ty| match ty {
        TypeRef::Param(_) => true,
        TypeRef::Desc(inner) => mentions_params(table, inner, visited),
    })
}

/// Split a label at its branch marker: `nkIdent` with marker `k` gives
/// `("nk", "Ident")`. The marker must be followed by an uppercase letter and
/// preceded by a non-empty prefix.
pub(crate) fn marker_split(label: &str, marker: char) -> Option<(&str, &str)> {
    label.char_indices().find_map(|(index, c)| {
        if c != marker || index == 0 {
            return None;
        }
        let rest = &label[index + c.len_utf8()..];
        rest.chars()
            .next()
            .filter(char::is_ascii_uppercase)
            .map(|_| (&label[..index + c.len_utf8()], rest))
    })
}

#[cfg(test)]
mod tests;
