//! Cycle-safe, memoizing mock-value synthesizer.
//!
//! Walks a type's field graph and produces an example value tree:
//! - scalars come from a fixed default table;
//! - arrays and collections become single-element lists;
//! - generic parameters are substituted structurally at every level;
//! - a type seen again while it is still being expanded yields a
//!   circular-reference placeholder instead of recursing forever.
//!
//! Cycles are caught by the memo; the depth limit only guards against
//! type graphs that keep producing *new* keys (`A<T>` holding `A<List<T>>`).
pub mod bindings;
pub mod classify;
pub mod memo;
pub mod scalar;
pub mod value;

use std::rc::Rc;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, trace};

use crate::types::{TypeDecl, TypeRef, TypeSource};

pub use bindings::Bindings;
pub use classify::{Category, Classifier, Element};
pub use memo::{Memo, Visit};
pub use value::MockValue;

// ------------------------------- Policy ---------------------------------- //

/// Maximum composite nesting; the top-level type sits at depth 1.
pub const MAX_DEPTH: usize = 50;

/// Namespaces treated as black boxes unless a type is listed in the scalar table.
pub const DEFAULT_OPAQUE_PREFIXES: &[&str] = &["java.", "javax.", "jakarta."];

// ------------------------------- Errors ---------------------------------- //

/// Failures that abort the whole synthesis. Unresolvable types and cycles
/// are not errors: they end up as placeholder strings in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    #[error("type reference `{0}` denotes no value")]
    FatalInput(String),
    #[error("nesting depth exceeded the limit of {limit} while expanding `{key}`")]
    DepthExceeded { limit: usize, key: String },
}

// ------------------------------ Synthesizer ------------------------------ //

/// Immutable synthesis context. Every top-level [`Synthesizer::mock`] call
/// allocates its own [`Memo`], so one synthesizer may serve many threads.
pub struct Synthesizer<'s, S: TypeSource + ?Sized> {
    classifier: Classifier<'s, S>,
}

impl<'s, S: TypeSource + ?Sized> Synthesizer<'s, S> {
    pub fn new(source: &'s S) -> Self {
        let prefixes = DEFAULT_OPAQUE_PREFIXES.iter().map(|p| p.to_string()).collect();
        Self::with_opaque_prefixes(source, prefixes)
    }

    pub fn with_opaque_prefixes(source: &'s S, opaque_prefixes: Vec<String>) -> Self {
        Self { classifier: Classifier::new(source, opaque_prefixes) }
    }

    pub fn classifier(&self) -> &Classifier<'s, S> {
        &self.classifier
    }

    /// Synthesize one top-level type with a fresh memo.
    pub fn mock(&self, ty: &TypeRef) -> Result<Rc<MockValue>, SynthError> {
        let mut memo = Memo::new();
        let value = self.synthesize(ty, &Bindings::new(), &mut memo, 1)?;
        debug!(ty = %ty, keys = memo.len(), "synthesized mock");
        Ok(value)
    }

    pub fn synthesize(
        &self,
        ty: &TypeRef,
        bindings: &Bindings,
        memo: &mut Memo,
        depth: usize,
    ) -> Result<Rc<MockValue>, SynthError> {
        let ty = bindings::effective(ty, bindings);
        if ty.is_void() {
            return Err(SynthError::FatalInput(ty.canonical_text()));
        }

        let key = bindings::key_for(ty, bindings);
        if let Some(visit) = memo.get(&key) {
            return Ok(match visit {
                Visit::Building => {
                    trace!(%key, "circular reference");
                    Rc::new(MockValue::circular(&key))
                }
                Visit::Built(value) => Rc::clone(value),
            });
        }
        memo.begin(&key);

        let value = self.dispatch(ty, &key, bindings, memo, depth)?;
        memo.finish(key, Rc::clone(&value));
        Ok(value)
    }

    fn dispatch(
        &self,
        ty: &TypeRef,
        key: &str,
        bindings: &Bindings,
        memo: &mut Memo,
        depth: usize,
    ) -> Result<Rc<MockValue>, SynthError> {
        let value = match self.classifier.classify(ty, bindings) {
            Category::Primitive(p) => scalar::primitive_default(p),
            Category::Scalar(name) => scalar::default_for(&name)
                .unwrap_or_else(|| MockValue::undeterminable(&name)),
            Category::Array(elem) => {
                MockValue::singleton(self.synthesize(elem, bindings, memo, depth)?)
            }
            Category::Collection(Element::Of(elem)) => {
                MockValue::singleton(self.synthesize(&elem, bindings, memo, depth)?)
            }
            Category::Collection(Element::Unbounded) => MockValue::List(Vec::new()),
            Category::Collection(Element::Unknown) => MockValue::undeterminable(&ty.presentable_text()),
            Category::Placeholder | Category::Opaque => MockValue::empty_object(),
            Category::Enum(decl) => MockValue::Str(decl.enum_constants.join(" | ")),
            Category::Unresolvable => MockValue::unresolvable(&ty.presentable_text()),
            Category::Composite(decl) => {
                if depth > MAX_DEPTH {
                    return Err(SynthError::DepthExceeded { limit: MAX_DEPTH, key: key.to_string() });
                }
                self.compose(ty, decl, bindings, memo, depth)?
            }
        };
        Ok(Rc::new(value))
    }

    fn compose(
        &self,
        ty: &TypeRef,
        decl: &TypeDecl,
        bindings: &Bindings,
        memo: &mut Memo,
        depth: usize,
    ) -> Result<MockValue, SynthError> {
        let concrete = bindings::substitute(ty, bindings);
        let scope = Bindings::merge(
            &bindings.without(&decl.type_params),
            &bindings::resolve_bindings(&concrete, self.classifier.source()),
        );
        let mut fields = IndexMap::new();
        let mut lineage = vec![decl.name.clone()];
        self.collect_fields(decl, &scope, memo, depth, &mut lineage, &mut fields)?;
        Ok(MockValue::Object(fields))
    }

    /// Superclass fields first, then the declaration's own, in source order.
    fn collect_fields(
        &self,
        decl: &TypeDecl,
        scope: &Bindings,
        memo: &mut Memo,
        depth: usize,
        lineage: &mut Vec<String>,
        out: &mut IndexMap<String, Rc<MockValue>>,
    ) -> Result<(), SynthError> {
        if let Some(superclass) = &decl.superclass {
            let superclass = bindings::substitute(superclass, scope);
            let parent = superclass.class_name()
                .filter(|name| !self.classifier.is_opaque(name) && !lineage.iter().any(|l| l == name))
                .and_then(|name| self.classifier.source().declaration(name));
            if let Some(parent) = parent {
                let parent_scope = Bindings::merge(
                    &scope.without(&parent.type_params),
                    &bindings::resolve_bindings(&superclass, self.classifier.source()),
                );
                lineage.push(parent.name.clone());
                self.collect_fields(parent, &parent_scope, memo, depth, lineage, out)?;
            }
        }
        for field in decl.fields.iter().filter(|f| f.is_serialized()) {
            let value = self.field_value(&field.ty, scope, memo, depth)?;
            out.insert(field.name.clone(), value);
        }
        Ok(())
    }

    fn field_value(
        &self,
        field_ty: &TypeRef,
        scope: &Bindings,
        memo: &mut Memo,
        depth: usize,
    ) -> Result<Rc<MockValue>, SynthError> {
        // (a) bare placeholder with a binding: the bound type is already concrete
        if let TypeRef::Param(name) = field_ty {
            if let Some(bound) = scope.get(name) {
                return self.synthesize(bound, &Bindings::new(), memo, depth + 1);
            }
        }
        // (b) placeholders nested inside: rewrite before descending
        if field_ty.contains_param() {
            let concrete = bindings::substitute(field_ty, scope);
            return self.synthesize(&concrete, scope, memo, depth + 1);
        }
        // (c) fully concrete
        self.synthesize(field_ty, scope, memo, depth + 1)
    }
}

/// One-shot convenience over [`Synthesizer::mock`] returning plain JSON.
pub fn mock_json<S: TypeSource + ?Sized>(source: &S, ty: &TypeRef) -> Result<serde_json::Value, SynthError> {
    Synthesizer::new(source).mock(ty).map(|v| v.to_json())
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::java::SourceIndex;

    fn index(sources: &[(&str, &str)]) -> SourceIndex {
        SourceIndex::from_sources(sources.iter().copied()).expect("sources parse")
    }

    fn mock_text(index: &SourceIndex, ty: &str) -> Result<serde_json::Value, SynthError> {
        let ty = index.resolve_type_text(ty).expect("type resolves");
        mock_json(index, &ty)
    }

    const MODELS: &str = r#"
        package com.acme.model;

        import java.io.Serializable;
        import java.math.BigDecimal;
        import java.util.List;
        import java.util.Map;

        public class User implements Serializable {
            private static final long serialVersionUID = 1L;
            private Integer id;
            private String name;
            private List<String> tags;
            private transient String cache;
        }

        class Pair<K, V> {
            private K first;
            private V second;
        }

        class Box<T> {
            private T value;
        }

        class Node {
            private String label;
            private List<Node> children;
        }

        enum Level { A, B, C }

        class Order {
            private Level level;
            private int[] counts;
            private BigDecimal total;
            private Map<String, Object> extra;
            private Customer customer;
            private User buyer;
            private User seller;
        }
    "#;

    #[test]
    fn user_scenario() {
        let index = index(&[("model.java", MODELS)]);
        let value = mock_text(&index, "User").unwrap();
        assert_eq!(value, json!({"id": 0, "name": "", "tags": [""]}));
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["id", "name", "tags"]);
    }

    #[test]
    fn pair_scenario_binds_each_parameter() {
        let index = index(&[("model.java", MODELS)]);
        let value = mock_text(&index, "Pair<String, Integer>").unwrap();
        assert_eq!(value, json!({"first": "", "second": 0}));
    }

    #[test]
    fn generic_box_resolves_per_binding() {
        let index = index(&[("model.java", MODELS)]);
        let user_box = mock_text(&index, "Box<User>").unwrap();
        assert_eq!(user_box, json!({"value": {"id": 0, "name": "", "tags": [""]}}));
        let string_box = mock_text(&index, "Box<String>").unwrap();
        assert_eq!(string_box, json!({"value": ""}));
    }

    #[test]
    fn distinct_instantiations_use_distinct_keys_within_one_call() {
        let src = r#"
            package com.acme;
            class Box<T> { T value; }
            class User { String name; }
            class Both { Box<User> users; Box<String> text; }
        "#;
        let index = index(&[("both.java", src)]);
        let value = mock_text(&index, "Both").unwrap();
        assert_eq!(value, json!({"users": {"value": {"name": ""}}, "text": {"value": ""}}));
    }

    #[test]
    fn raw_generic_fields_never_borrow_the_enclosing_binding() {
        let src = r#"
            package com.acme;
            class Box<T> { T value; }
            class Holder<T> { T item; Box raw; }
            class User { String name; }
            class Both { Holder<User> a; Holder<String> b; Box plain; }
        "#;
        let index = index(&[("raw.java", src)]);
        let value = mock_text(&index, "Both").unwrap();
        assert_eq!(value, json!({
            "a": {"item": {"name": ""}, "raw": {"value": {}}},
            "b": {"item": "", "raw": {"value": {}}},
            "plain": {"value": {}}
        }));
    }

    #[test]
    fn raw_superclass_does_not_inherit_the_subclass_binding() {
        let src = r#"
            package com.acme;
            class Base<T> { T base; }
            class Sub<T> extends Base { T own; }
        "#;
        let index = index(&[("sub.java", src)]);
        let value = mock_text(&index, "Sub<String>").unwrap();
        assert_eq!(value, json!({"base": {}, "own": ""}));
    }

    #[test]
    fn array_argument_binds_the_whole_array() {
        let src = r#"
            package com.acme;
            class Box<T> { T value; }
            class User { String name; }
        "#;
        let index = index(&[("box.java", src)]);
        assert_eq!(mock_text(&index, "Box<User[]>").unwrap(), json!({"value": [{"name": ""}]}));
        assert_eq!(mock_text(&index, "Box<int[][]>").unwrap(), json!({"value": [0]}));
    }

    #[test]
    fn platform_collections_and_on_demand_imports() {
        let src = r#"
            package com.acme;
            import java.util.*;
            import java.time.*;
            import java.util.concurrent.CopyOnWriteArrayList;
            class User { String name; }
            class Feeds {
                Vector<User> v;
                CopyOnWriteArrayList<User> cow;
                PriorityQueue<User> pq;
                ZonedDateTime zdt;
                Iterator<User> it;
                Spliterator<User> split;
            }
        "#;
        let index = index(&[("feeds.java", src)]);
        let value = mock_text(&index, "Feeds").unwrap();
        assert_eq!(value, json!({
            "v": [{"name": ""}],
            "cow": [{"name": ""}],
            "pq": [{"name": ""}],
            "zdt": {},
            "it": {},
            "split": {}
        }));
    }

    #[test]
    fn self_reference_yields_circular_placeholder() {
        let index = index(&[("model.java", MODELS)]);
        let value = mock_text(&index, "Node").unwrap();
        let children = value["children"].as_array().unwrap();
        assert_eq!(children.len(), 1);
        let marker = children[0].as_str().expect("placeholder string");
        assert!(marker.contains("circular reference"));
        assert!(marker.contains("com.acme.model.Node"));
    }

    #[test]
    fn transitive_cycle_through_generic_terminates() {
        let src = r#"
            package com.acme;
            import java.util.List;
            class Tree<T> { T value; List<Tree<T>> children; Parent<T> parent; }
            class Parent<T> { Tree<T> root; }
            class User { String name; }
        "#;
        let index = index(&[("tree.java", src)]);
        let value = mock_text(&index, "Tree<User>").unwrap();
        assert_eq!(value["value"], json!({"name": ""}));
        let child = value["children"][0].as_str().unwrap();
        assert!(child.ends_with("com.acme.Tree<com.acme.User>"), "{child}");
        assert!(value["parent"]["root"].as_str().unwrap().contains("circular reference"));
    }

    #[test]
    fn enums_arrays_opaque_and_missing_types() {
        let index = index(&[("model.java", MODELS)]);
        let value = mock_text(&index, "Order").unwrap();
        assert_eq!(value["level"], json!("A | B | C"));
        assert_eq!(value["counts"], json!([0]));
        assert_eq!(value["total"], json!(0));
        assert_eq!(value["extra"], json!({}));
        assert_eq!(value["customer"], json!("[ERROR] cannot find declaration for type [Customer]"));
        // second sighting of an already built type is reused, not flagged
        assert_eq!(value["buyer"], value["seller"]);
        assert!(value["seller"].is_object());
    }

    #[test]
    fn scalars_and_collections_at_top_level() {
        let index = index(&[("model.java", MODELS)]);
        assert_eq!(mock_text(&index, "long").unwrap(), json!(0));
        assert_eq!(mock_text(&index, "boolean").unwrap(), json!(false));
        assert_eq!(mock_text(&index, "Double").unwrap(), json!(0.0));
        assert_eq!(mock_text(&index, "List<Level>").unwrap(), json!(["A | B | C"]));
        assert_eq!(mock_text(&index, "Set<?>").unwrap(), json!([]));
        assert_eq!(mock_text(&index, "User[][]").unwrap(), json!([{"id": 0, "name": "", "tags": [""]}]));
    }

    #[test]
    fn void_is_fatal() {
        let index = index(&[("model.java", MODELS)]);
        assert_eq!(mock_text(&index, "void"), Err(SynthError::FatalInput("void".into())));
    }

    #[test]
    fn nested_generic_fields_substitute_through_every_level() {
        let src = r#"
            package com.acme;
            import java.util.*;
            class Pair<A, B> { A left; B right; }
            class Page<T> { List<T> rows; long total; }
            class Result<T> { int code; T data; }
            class Wrapper<X, Y> { Result<Page<Pair<X, List<Y>>>> payload; }
            class User { String name; }
        "#;
        let index = index(&[("g.java", src)]);
        let value = mock_text(&index, "Wrapper<User, Integer>").unwrap();
        assert_eq!(value, json!({
            "payload": {
                "code": 0,
                "data": {"rows": [{"left": {"name": ""}, "right": [0]}], "total": 0}
            }
        }));
    }

    #[test]
    fn inherited_fields_come_first_with_superclass_bindings() {
        let src = r#"
            package com.acme;
            import java.util.List;
            class Page<T> { List<T> rows; int total; }
            class User { String name; }
            class UserPage extends Page<User> { String cursor; }
        "#;
        let index = index(&[("p.java", src)]);
        let value = mock_text(&index, "UserPage").unwrap();
        assert_eq!(value, json!({"rows": [{"name": ""}], "total": 0, "cursor": ""}));
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["rows", "total", "cursor"]);
    }

    #[test]
    fn unbound_placeholder_is_empty_object() {
        let index = index(&[("model.java", MODELS)]);
        assert_eq!(mock_text(&index, "Box").unwrap(), json!({"value": {}}));
    }

    fn chain(len: usize) -> String {
        let mut src = String::from("package com.deep;\n");
        for i in 1..len {
            src.push_str(&format!("class T{i} {{ int n; T{} next; }}\n", i + 1));
        }
        src.push_str(&format!("class T{len} {{ int n; }}\n"));
        src
    }

    #[test]
    fn chain_of_fifty_composites_succeeds() {
        let src = chain(MAX_DEPTH);
        let index = index(&[("chain.java", src.as_str())]);
        let value = mock_text(&index, "T1").unwrap();
        let mut cursor = &value;
        for _ in 1..MAX_DEPTH {
            cursor = &cursor["next"];
        }
        assert_eq!(cursor, &json!({"n": 0}));
    }

    #[test]
    fn chain_of_fifty_one_composites_exceeds_depth() {
        let src = chain(MAX_DEPTH + 1);
        let index = index(&[("chain.java", src.as_str())]);
        let err = mock_text(&index, "T1").unwrap_err();
        assert_eq!(err, SynthError::DepthExceeded { limit: MAX_DEPTH, key: "com.deep.T51".into() });
    }

    #[test]
    fn ever_growing_generic_keys_hit_the_depth_limit() {
        let src = r#"
            package com.acme;
            import java.util.List;
            class Grow<T> { T value; Grow<List<T>> next; }
        "#;
        let index = index(&[("grow.java", src)]);
        assert!(matches!(mock_text(&index, "Grow<String>"), Err(SynthError::DepthExceeded { .. })));
    }

    #[test]
    fn memo_is_fresh_per_call() {
        let index = index(&[("model.java", MODELS)]);
        let synth = Synthesizer::new(&index);
        let node = index.resolve_type_text("Node").unwrap();
        let first = synth.mock(&node).unwrap();
        let second = synth.mock(&node).unwrap();
        assert_eq!(first, second);
        assert_eq!(*first.as_object().unwrap()["label"], MockValue::Str(String::new()));
    }

    #[test]
    fn explicit_memo_leaves_nothing_building() {
        let index = index(&[("model.java", MODELS)]);
        let synth = Synthesizer::new(&index);
        let mut memo = Memo::new();
        let ty = index.resolve_type_text("Order").unwrap();
        synth.synthesize(&ty, &Bindings::new(), &mut memo, 1).unwrap();
        assert_eq!(memo.building_count(), 0);
        assert!(matches!(memo.get("com.acme.model.Order"), Some(Visit::Built(_))));
    }
}
