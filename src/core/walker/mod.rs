//! Schema-directed traversal of a document tree.
//!
//! The same walk serves two purposes. Extraction visits every node and
//! collects the resources its schema marks as localizable. Localization
//! visits the same nodes and builds a copy of the tree in which every
//! localizable value is replaced by its translation, a pseudo-localized
//! form, or the source text.
//!
//! A localizable node starts a [`PendingResource`]. The nodes below it
//! either contribute to that resource (satellite fields, plural forms,
//! array elements) or, when they are plain strings, become resources of
//! their own. Anomalies such as unresolved references, shape mismatches
//! and `anyOf` values no alternative accepts skip the subtree they occur
//! in and are reported as [`Issue`]s; the walk itself never fails.
//!
//! Localizing a resource takes two passes over its subtree: one gathers
//! the source text, the other writes the resolved value back piece by
//! piece. A translated plural whose schema carries a plural template is
//! built from the template instead.

mod fallback;
mod pending;
mod plural;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{
    core::{
        locale::normalize_locale,
        mapping::OutputMode,
        pointer::{ROOT_REF, child_ref, index_ref},
        pseudo::PseudoProvider,
        resource::{Resource, ResourceKind, ResourceSet, ResourceState, ResourceValue},
        schema::{BindingSource, ScalarKind, SchemaDocument, SchemaNode, SchemaShape},
    },
    issues::{
        Issue, IssueLocation, NoMatchingAlternativeIssue, Report, ShapeMismatchIssue,
        UnresolvedRefIssue,
    },
};

pub use fallback::{Fallback, Resolution, Resolved};
pub use pending::{BindingInput, PendingResource};
pub use plural::PluralFields;

pub const DEFAULT_PROJECT_ID: &str = "project";
pub const DEFAULT_DATATYPE: &str = "json";
pub const DEFAULT_SOURCE_LOCALE: &str = "en-US";
pub const DEFAULT_PSEUDO_LOCALE: &str = "zxx-XX";

/// Member holding element attributes. Never matched by `additionalProperties`.
const ATTRIBUTES: &str = "_attributes";

/// Project-wide values stamped on every resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSettings {
    pub project_id: String,
    pub datatype: String,
    pub source_locale: String,
    /// Locale reserved for pseudo-localization testing.
    pub pseudo_locale: String,
    /// Disable every pseudo generator.
    pub nopseudo: bool,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            project_id: DEFAULT_PROJECT_ID.to_string(),
            datatype: DEFAULT_DATATYPE.to_string(),
            source_locale: DEFAULT_SOURCE_LOCALE.to_string(),
            pseudo_locale: DEFAULT_PSEUDO_LOCALE.to_string(),
            nopseudo: false,
        }
    }
}

/// Everything a walk over one document needs to know.
#[derive(Clone, Copy)]
pub struct WalkContext<'a> {
    pub schema: &'a SchemaDocument,
    /// Path of the document, recorded on resources and issues.
    pub document_path: &'a str,
    pub method: OutputMode,
    pub settings: &'a ProjectSettings,
    pub pseudos: &'a dyn PseudoProvider,
}

#[derive(Debug, Default)]
pub struct Extraction {
    pub resources: ResourceSet,
    pub issues: Vec<Issue>,
}

#[derive(Debug)]
pub struct Localization {
    pub tree: Value,
    /// Resources that had no translation in the target locale.
    pub new_resources: ResourceSet,
    pub issues: Vec<Issue>,
}

/// Collect the localizable resources of `tree`, in document order.
pub fn extract(tree: &Value, ctx: &WalkContext) -> Extraction {
    let mut walker = Walker::new(ctx, None);
    if walker
        .walk(tree, &ctx.schema.root, ROOT_REF, "", false, None)
        .is_err()
    {
        tracing::debug!(path = ctx.document_path, "document root skipped");
    }
    walker.log_issues();

    Extraction {
        resources: walker.resources.into_iter().collect(),
        issues: walker.issues,
    }
}

/// Build the `locale` version of `tree`.
///
/// An empty result (nothing survived a sparse walk, or the root was
/// skipped) is returned as an empty object.
pub fn localize(
    tree: &Value,
    ctx: &WalkContext,
    locale: &str,
    translations: &ResourceSet,
) -> Localization {
    let locale = normalize_locale(locale);
    let fallback = Fallback {
        settings: ctx.settings,
        locale: &locale,
        translations,
        pseudos: ctx.pseudos,
    };

    let mut walker = Walker::new(ctx, Some(&fallback));
    let tree = walker
        .walk(tree, &ctx.schema.root, ROOT_REF, "", false, None)
        .ok()
        .flatten()
        .unwrap_or_else(|| Value::Object(Map::new()));
    walker.log_issues();

    Localization {
        tree,
        new_resources: walker.new_resources.into_iter().collect(),
        issues: walker.issues,
    }
}

/// A subtree was left out; the reason is already recorded as an issue.
#[derive(Debug)]
struct Skipped;

/// Output of visiting one node: the value to write (localization only),
/// or `None` when nothing is written for it.
type Visit = Result<Option<Value>, Skipped>;

/// Walker state to return to when an `anyOf` alternative fails.
struct Mark {
    resources: usize,
    new_resources: usize,
    issues: usize,
    index: u32,
    localized: usize,
}

struct Walker<'w> {
    ctx: &'w WalkContext<'w>,
    /// Present when localizing.
    fallback: Option<&'w Fallback<'w>>,
    resources: Vec<Resource>,
    new_resources: Vec<Resource>,
    issues: Vec<Issue>,
    index: u32,
    /// Number of localized values written so far.
    localized: usize,
}

impl<'w> Walker<'w> {
    fn new(ctx: &'w WalkContext<'w>, fallback: Option<&'w Fallback<'w>>) -> Self {
        Self {
            ctx,
            fallback,
            resources: Vec::new(),
            new_resources: Vec::new(),
            issues: Vec::new(),
            index: 0,
            localized: 0,
        }
    }

    fn rewriting(&self) -> bool {
        self.fallback.is_some()
    }

    fn sparse(&self) -> bool {
        self.ctx.method.is_sparse()
    }

    fn walk(
        &mut self,
        node: &Value,
        schema: &'w SchemaNode,
        ptr: &str,
        name: &str,
        localizable: bool,
        pending: Option<&mut PendingResource>,
    ) -> Visit {
        let resolved = self.follow(schema, ptr)?;
        let starts = schema.localizable || resolved.localizable;
        if !starts {
            return self.dispatch(node, resolved, ptr, name, localizable, pending);
        }

        let spec = resolved
            .localizable_type
            .as_ref()
            .or(schema.localizable_type.as_ref());
        let mut own = PendingResource::new(spec.map(|s| s.kind).unwrap_or_default(), name, ptr);
        // scalars bind their own fields when visited, with their text at hand
        if let Some(spec) = spec
            && !matches!(resolved.shape, SchemaShape::Scalar(_))
        {
            let input = BindingInput {
                text: "",
                element: name,
                pointer: ptr,
                document_path: self.ctx.document_path,
            };
            own.hydrate(&spec.bindings, &input, false);
        }

        let Some(fallback) = self.fallback else {
            let visit = self.dispatch(node, resolved, ptr, name, true, Some(&mut own));
            if visit.is_ok() {
                self.emit(own);
            }
            return visit;
        };

        let mut own = self.harvest(node, resolved, ptr, name, own)?;
        own.resolution = self.resolve(&own, fallback);
        let localized = own.resolution.as_ref().is_some_and(|r| r.localized);

        if let Some(value) = self.expand_plural(&own, name, fallback) {
            self.localized += 1;
            return Ok(Some(value));
        }

        let before = self.localized;
        let value = self.dispatch(node, resolved, ptr, name, true, Some(&mut own))?;
        // sparse output keeps a resource only when something in it changed
        let keep = !self.sparse() || localized || self.localized > before;
        Ok(value.filter(|_| keep))
    }

    fn dispatch(
        &mut self,
        node: &Value,
        schema: &'w SchemaNode,
        ptr: &str,
        name: &str,
        localizable: bool,
        pending: Option<&mut PendingResource>,
    ) -> Visit {
        match &schema.shape {
            SchemaShape::Scalar(kind) => {
                self.walk_scalar(node, schema, *kind, ptr, name, localizable, pending)
            }
            SchemaShape::Object {
                properties,
                additional_properties,
                required,
            } => self.walk_object(
                node,
                ObjectSchema {
                    properties,
                    additional: additional_properties.as_deref(),
                    required,
                },
                ptr,
                localizable,
                pending,
            ),
            SchemaShape::Array { items } => {
                self.walk_array(node, items.as_deref(), ptr, name, localizable, pending)
            }
            SchemaShape::AnyOf(alternatives) => {
                self.walk_any_of(node, alternatives, ptr, name, localizable, pending)
            }
            SchemaShape::Ref(_) => self.walk(node, schema, ptr, name, localizable, pending),
            SchemaShape::Uninterpreted(keyword) => {
                tracing::trace!(pointer = ptr, keyword = %keyword, "schema keyword not interpreted");
                Ok(self.pass_through(node, pending.is_some()))
            }
            SchemaShape::Untyped => Ok(self.pass_through(node, pending.is_some())),
        }
    }

    /// Try each alternative in order; the first one that does not skip wins.
    /// A scalar alternative of another kind than the value is passed over.
    /// Whatever a failed alternative recorded is rolled back.
    fn walk_any_of(
        &mut self,
        node: &Value,
        alternatives: &'w [SchemaNode],
        ptr: &str,
        name: &str,
        localizable: bool,
        mut pending: Option<&mut PendingResource>,
    ) -> Visit {
        for alternative in alternatives {
            if let Ok(resolved) = self.ctx.schema.follow(alternative)
                && let SchemaShape::Scalar(kind) = resolved.shape
                && !kind.accepts(node)
            {
                continue;
            }

            let mark = self.mark();
            let saved = pending.as_deref().cloned();
            match self.walk(node, alternative, ptr, name, localizable, pending.as_deref_mut()) {
                Ok(value) => return Ok(value),
                Err(Skipped) => {
                    self.rollback(mark);
                    if let (Some(pending), Some(saved)) = (pending.as_deref_mut(), saved) {
                        *pending = saved;
                    }
                }
            }
        }

        tracing::debug!(pointer = ptr, "no anyOf alternative matched");
        let location = self.location(ptr);
        self.issues.push(
            NoMatchingAlternativeIssue {
                location,
                alternatives: alternatives.len(),
            }
            .into(),
        );
        Err(Skipped)
    }

    #[allow(clippy::too_many_arguments)]
    fn walk_scalar(
        &mut self,
        node: &Value,
        schema: &'w SchemaNode,
        kind: ScalarKind,
        ptr: &str,
        name: &str,
        localizable: bool,
        pending: Option<&mut PendingResource>,
    ) -> Visit {
        // a scalar of another kind is taken as it is
        if node.is_object() || node.is_array() {
            return self.mismatch(ptr, kind.name(), node);
        }
        if !localizable {
            return Ok(self.pass_through(node, pending.is_some()));
        }

        let text = value_text(node);
        let bindings = schema.bindings();

        match pending {
            Some(pending)
                if bindings.is_some()
                    || pending.started_at(ptr)
                    || pending.kind != ResourceKind::String =>
            {
                let carries_source = match bindings {
                    Some(bindings) => {
                        let input = BindingInput {
                            text: &text,
                            element: name,
                            pointer: ptr,
                            document_path: self.ctx.document_path,
                        };
                        pending.hydrate(bindings, &input, true);
                        if bindings.source.is_none() && pending.started_at(ptr) {
                            pending.add_source(&text);
                            true
                        } else {
                            bindings.source == Some(BindingSource::Value)
                        }
                    }
                    None => {
                        // an unbound plural form is named by its member
                        if pending.kind == ResourceKind::Plural && !pending.started_at(ptr) {
                            pending.category = Some(name.to_string());
                        }
                        pending.add_source(&text);
                        true
                    }
                };
                Ok(self.rewrite_piece(node, pending, carries_source))
            }
            _ => {
                let mut leaf = PendingResource::new(ResourceKind::String, name, ptr);
                leaf.add_source(&text);
                self.complete_leaf(node, leaf)
            }
        }
    }

    fn walk_object(
        &mut self,
        node: &Value,
        object: ObjectSchema<'w>,
        ptr: &str,
        localizable: bool,
        mut pending: Option<&mut PendingResource>,
    ) -> Visit {
        let Value::Object(members) = node else {
            return self.mismatch(ptr, "object", node);
        };

        let inside = pending.is_some();
        let mut out = Map::new();
        for (prop, child) in members {
            let schema = object
                .properties
                .get(prop)
                .or_else(|| object.additional.filter(|_| prop != ATTRIBUTES));
            let value = match schema {
                Some(schema) => self
                    .walk(
                        child,
                        schema,
                        &child_ref(ptr, prop),
                        prop,
                        localizable,
                        pending.as_deref_mut(),
                    )
                    .ok()
                    .flatten(),
                None if prop == ATTRIBUTES => self.rewriting().then(|| child.clone()),
                None => self.pass_through(child, inside),
            };
            if let Some(value) = value {
                out.insert(prop.clone(), value);
            }
        }

        if !self.rewriting() {
            return Ok(None);
        }

        // Required members missing from the source are walked from an empty
        // value and written when that produces something, a translation
        // looked up by key for instance.
        for prop in object.required {
            if members.contains_key(prop) {
                continue;
            }
            let Some(schema) = object.properties.get(prop) else {
                continue;
            };
            let Some(empty) = self.ctx.schema.follow(schema).ok().and_then(empty_value) else {
                continue;
            };
            let value = self
                .walk(
                    &empty,
                    schema,
                    &child_ref(ptr, prop),
                    prop,
                    localizable,
                    pending.as_deref_mut(),
                )
                .ok()
                .flatten();
            if let Some(value) = value.filter(has_content) {
                out.insert(prop.clone(), value);
            }
        }

        if self.sparse() && !inside && out.keys().all(|prop| prop == ATTRIBUTES) {
            return Ok(None);
        }
        Ok(Some(Value::Object(out)))
    }

    fn walk_array(
        &mut self,
        node: &Value,
        items: Option<&'w SchemaNode>,
        ptr: &str,
        name: &str,
        localizable: bool,
        pending: Option<&mut PendingResource>,
    ) -> Visit {
        let Value::Array(elements) = node else {
            return self.mismatch(ptr, "array", node);
        };

        // Elements are visited one by one when they have structure of their
        // own; an array of plain strings is a single value.
        let element_schema = match items {
            Some(items) => {
                let resolved = self.follow(items, ptr)?;
                let structured = items.localizable
                    || resolved.localizable
                    || resolved.has_bindings()
                    || !matches!(
                        resolved.shape,
                        SchemaShape::Scalar(_) | SchemaShape::Untyped | SchemaShape::Uninterpreted(_)
                    );
                structured.then_some(items)
            }
            None => None,
        };
        if let Some(items) = element_schema {
            return Ok(self.walk_elements(elements, items, ptr, name, localizable, pending));
        }

        if !localizable {
            return Ok(self.pass_through(node, pending.is_some()));
        }

        let texts: Vec<String> = elements.iter().map(value_text).collect();
        match pending {
            Some(pending) if pending.started_at(ptr) => {
                pending.set_kind(ResourceKind::Array);
                pending.source = ResourceValue::Array(texts);
                if !self.rewriting() {
                    return Ok(None);
                }
                Ok(Some(match &pending.resolution {
                    Some(resolution) if resolution.localized => {
                        self.localized += 1;
                        to_json(&resolution.value)
                    }
                    _ => node.clone(),
                }))
            }
            _ => {
                let mut leaf = PendingResource::new(ResourceKind::Array, name, ptr);
                leaf.source = ResourceValue::Array(texts);
                self.complete_leaf(node, leaf)
            }
        }
    }

    fn walk_elements(
        &mut self,
        elements: &[Value],
        items: &'w SchemaNode,
        ptr: &str,
        name: &str,
        localizable: bool,
        mut pending: Option<&mut PendingResource>,
    ) -> Option<Value> {
        let inside = pending.is_some();
        let outer_index = pending.as_deref().and_then(|p| p.index);

        let mut out = Vec::with_capacity(elements.len());
        for (i, element) in elements.iter().enumerate() {
            if let Some(pending) = pending.as_deref_mut() {
                pending.index = Some(i);
            }
            let visit = self.walk(
                element,
                items,
                &index_ref(ptr, i),
                name,
                localizable,
                pending.as_deref_mut(),
            );
            if let Ok(Some(value)) = visit {
                out.push(value);
            }
        }
        if let Some(pending) = pending {
            pending.index = outer_index;
        }

        if !self.rewriting() || (self.sparse() && !inside && out.is_empty()) {
            return None;
        }
        Some(Value::Array(out))
    }

    /// Finish a resource that lives entirely at one node.
    fn complete_leaf(&mut self, node: &Value, leaf: PendingResource) -> Visit {
        let Some(fallback) = self.fallback else {
            self.emit(leaf);
            return Ok(None);
        };
        let Some(resolution) = self.resolve(&leaf, fallback) else {
            return Ok(self.pass_through(node, false));
        };

        if resolution.localized {
            self.localized += 1;
            Ok(Some(to_json(&resolution.value)))
        } else {
            Ok(self.pass_through(node, false))
        }
    }

    /// Value written for a node that contributes to an enclosing resource.
    fn rewrite_piece(
        &mut self,
        node: &Value,
        pending: &PendingResource,
        carries_source: bool,
    ) -> Option<Value> {
        if !self.rewriting() {
            return None;
        }
        if carries_source
            && let Some((piece, true)) = pending.resolved_piece(pending.category.as_deref())
        {
            self.localized += 1;
            return Some(Value::String(piece.to_string()));
        }
        Some(node.clone())
    }

    /// Gather the source of a resource before its subtree is rewritten.
    ///
    /// When the subtree is skipped here, the rewriting pass never runs, so
    /// the issues explaining why are kept from this pass.
    fn harvest(
        &mut self,
        node: &Value,
        schema: &'w SchemaNode,
        ptr: &str,
        name: &str,
        mut pending: PendingResource,
    ) -> Result<PendingResource, Skipped> {
        let mut scratch = Walker::new(self.ctx, None);
        match scratch.dispatch(node, schema, ptr, name, true, Some(&mut pending)) {
            Ok(_) => Ok(pending),
            Err(Skipped) => {
                self.issues.append(&mut scratch.issues);
                Err(Skipped)
            }
        }
    }

    /// Output of a translated plural built from the schema's plural template.
    fn expand_plural(
        &self,
        pending: &PendingResource,
        name: &str,
        fallback: &Fallback,
    ) -> Option<Value> {
        let resolution = pending.resolution.as_ref().filter(|r| r.localized)?;
        let ResourceValue::Plural(forms) = &resolution.value else {
            return None;
        };
        let template = self.ctx.schema.plural_template(name)?;

        let key = pending.key();
        let fields = PluralFields {
            forms,
            key: &key,
            comment: pending.comment.as_deref(),
            locale: pending.locale_override.as_deref().unwrap_or(fallback.locale),
        };
        Some(fields.expand(template))
    }

    fn resolve(&mut self, pending: &PendingResource, fallback: &Fallback) -> Option<Resolution> {
        // nothing to extract: only an existing translation can fill it
        if pending.source.is_empty() {
            return fallback.resolve_empty(&pending.key(), &pending.source);
        }
        let resolved = fallback.resolve(&pending.key(), &pending.source);
        if resolved.is_new {
            let mut resource = self.to_resource(pending);
            resource.target = Some(pending.source.clone());
            resource.target_locale = Some(fallback.locale.to_string());
            self.new_resources.push(resource);
        }
        Some(resolved.resolution)
    }

    fn emit(&mut self, pending: PendingResource) {
        if pending.source.is_empty() {
            tracing::trace!(pointer = %pending.pointer, "empty resource not extracted");
            return;
        }
        let resource = self.to_resource(&pending);
        self.resources.push(resource);
    }

    fn to_resource(&mut self, pending: &PendingResource) -> Resource {
        let settings = self.ctx.settings;
        let index = self.index;
        self.index += 1;

        Resource {
            key: pending.key(),
            source: pending.source.clone(),
            source_locale: pending
                .locale_override
                .clone()
                .unwrap_or_else(|| settings.source_locale.clone()),
            target: None,
            target_locale: None,
            project: settings.project_id.clone(),
            datatype: settings.datatype.clone(),
            path: self.ctx.document_path.to_string(),
            state: ResourceState::New,
            index,
            comment: pending.comment.clone(),
        }
    }

    fn follow(&mut self, schema: &'w SchemaNode, ptr: &str) -> Result<&'w SchemaNode, Skipped> {
        let document = self.ctx.schema;
        match document.follow(schema) {
            Ok(resolved) => Ok(resolved),
            Err(reference) => {
                tracing::debug!(pointer = ptr, reference = %reference, "unresolved reference");
                let location = self.location(ptr);
                self.issues
                    .push(UnresolvedRefIssue { location, reference }.into());
                Err(Skipped)
            }
        }
    }

    fn mismatch(&mut self, ptr: &str, expected: &str, node: &Value) -> Visit {
        let found = json_type(node);
        tracing::debug!(pointer = ptr, expected, found, "shape mismatch");
        let location = self.location(ptr);
        self.issues.push(
            ShapeMismatchIssue {
                location,
                expected: expected.to_string(),
                found: found.to_string(),
            }
            .into(),
        );
        Err(Skipped)
    }

    /// A node the schema does not make localizable. Sparse output drops it
    /// unless it belongs to a resource.
    fn pass_through(&self, node: &Value, inside_resource: bool) -> Option<Value> {
        (self.rewriting() && (inside_resource || !self.sparse())).then(|| node.clone())
    }

    fn location(&self, ptr: &str) -> IssueLocation {
        IssueLocation::new(self.ctx.document_path, Some(ptr))
    }

    fn mark(&self) -> Mark {
        Mark {
            resources: self.resources.len(),
            new_resources: self.new_resources.len(),
            issues: self.issues.len(),
            index: self.index,
            localized: self.localized,
        }
    }

    fn rollback(&mut self, mark: Mark) {
        self.resources.truncate(mark.resources);
        self.new_resources.truncate(mark.new_resources);
        self.issues.truncate(mark.issues);
        self.index = mark.index;
        self.localized = mark.localized;
    }

    fn log_issues(&self) {
        for issue in &self.issues {
            tracing::debug!(
                location = %issue.location(),
                rule = %issue.rule(),
                "{}",
                issue.message()
            );
        }
    }
}

/// Schema parts of an object node.
#[derive(Clone, Copy)]
struct ObjectSchema<'a> {
    properties: &'a IndexMap<String, SchemaNode>,
    additional: Option<&'a SchemaNode>,
    required: &'a [String],
}

/// Starting value for a required member absent from the source.
fn empty_value(schema: &SchemaNode) -> Option<Value> {
    match schema.shape {
        SchemaShape::Object { .. } => Some(Value::Object(Map::new())),
        SchemaShape::Array { .. } => Some(Value::Array(Vec::new())),
        SchemaShape::Scalar(_) => Some(Value::String(String::new())),
        _ => None,
    }
}

/// False for null, empty strings and containers holding nothing else.
fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(_) | Value::Number(_) => true,
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(members) => members.values().any(has_content),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Text of a value as stored in a resource.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn to_json(value: &ResourceValue) -> Value {
    match value {
        ResourceValue::String(text) => Value::String(text.clone()),
        ResourceValue::Array(items) => items.iter().cloned().map(Value::String).collect(),
        ResourceValue::Plural(forms) => Value::Object(
            forms
                .iter()
                .map(|(category, text)| (category.clone(), Value::String(text.clone())))
                .collect(),
        ),
    }
}
