//! Schema-governed merging across layer chains.

use std::rc::Rc;

use anyhow::Result;
use overlay_config::{MergeContext, Merger, Overlay, OverlayError, Schema};
use rstest::rstest;
use serde_json::{Value, json};

/// Root schema with an object member `k1` carrying an array member `k2`.
fn array_schema() -> Rc<Schema> {
    let schema = Schema::new();
    let section = schema.set("object", "k1").unwrap();
    section.set("array", "k2").unwrap();
    schema
}

#[rstest]
fn array_fields_distinguish_null_from_absent_across_layers() -> Result<()> {
    let schema = array_schema();
    let first = Overlay::create(schema.create(json!(null), json!({})));
    let second = Overlay::create_with_parent(json!({"k1": {"k2": ["test"]}}), &first);
    let third = Overlay::create_with_parent(json!({}), &second);
    let fourth = Overlay::create_with_parent(json!({"k1": {"k2": null}}), &third);
    let fifth = Overlay::create_with_parent(json!({"k1": {}}), &fourth);

    assert_eq!(first.at("k1").get("k2")?, None);
    assert_eq!(second.at("k1").get("k2")?, Some(json!(["test"])));
    // Absent values inherit the parent's resolved view...
    assert_eq!(third.at("k1").get("k2")?, Some(json!(["test"])));
    // ...`null` empties the array...
    assert_eq!(fourth.at("k1").get("k2")?, Some(json!([])));
    // ...and a later absent layer inherits the nulled value, not the original.
    assert_eq!(fifth.at("k1").get("k2")?, Some(json!([])));

    assert_eq!(second.to_json()?, json!({"k1": {"k2": ["test"]}}));
    assert_eq!(fourth.to_json()?, json!({"k1": {"k2": []}}));
    assert_eq!(fifth.to_json()?, json!({"k1": {"k2": []}}));
    Ok(())
}

#[rstest]
fn concrete_arrays_replace_wholesale() -> Result<()> {
    let schema = array_schema();
    let base = Overlay::create(schema.create(json!(null), json!({"k1": {"k2": ["a", "b"]}})));
    let over = Overlay::create_with_parent(json!({"k1": {"k2": ["c"]}}), &base);
    assert_eq!(over.at("k1").get("k2")?, Some(json!(["c"])));
    Ok(())
}

#[rstest]
#[case::number("number", json!(1), json!(2), json!(2))]
#[case::string("string", json!("a"), json!("b"), json!("b"))]
#[case::boolean_coerces("boolean", json!(true), json!(0), json!(false))]
#[case::boolean_truthy("boolean", json!(false), json!("yes"), json!(true))]
fn primitive_kinds_replace_with_the_layer_value(
    #[case] kind: &str,
    #[case] base_value: Value,
    #[case] layer_value: Value,
    #[case] expected: Value,
) -> Result<()> {
    let schema = Schema::new();
    schema.set(kind, "field")?;
    let base = Overlay::create(schema.create(json!(null), json!({"field": base_value})));
    let over = Overlay::create_with_parent(json!({"field": layer_value}), &base);
    assert_eq!(over.get("field")?, Some(expected));
    Ok(())
}

#[rstest]
#[case::number("number", json!(7))]
#[case::string("string", json!("base"))]
#[case::boolean("boolean", json!(true))]
fn primitive_kinds_inherit_when_the_layer_is_silent(
    #[case] kind: &str,
    #[case] base_value: Value,
) -> Result<()> {
    let schema = Schema::new();
    schema.set(kind, "field")?;
    let base = Overlay::create(schema.create(json!(null), json!({"field": base_value.clone()})));
    let over = Overlay::create_with_parent(json!({}), &base);
    assert_eq!(over.get("field")?, Some(base_value));
    Ok(())
}

#[rstest]
fn enum_fields_validate_on_read() -> Result<()> {
    let schema = Schema::new();
    schema.set_enum("mode", vec![json!("a"), json!("b")]);
    let base = Overlay::create(schema.create(json!(null), json!({})));
    let over = Overlay::create_with_parent(json!({}), &base);

    over.set("mode", json!("a"));
    assert_eq!(over.get("mode")?, Some(json!("a")));

    over.set("mode", json!("c"));
    let err = over.get("mode").unwrap_err();
    assert!(matches!(
        err.as_ref(),
        OverlayError::Validation { key, .. } if key == "mode"
    ));
    assert!(over.to_json().is_err());

    // Writing a valid value again recovers the field.
    over.set("mode", json!("b"));
    assert_eq!(over.get("mode")?, Some(json!("b")));
    Ok(())
}

#[rstest]
fn custom_mergers_compose_over_the_default() -> Result<()> {
    let prefixing: Merger = Rc::new(|ctx: MergeContext<'_>| {
        let mut merged = ctx.merge(ctx.current, ctx.next)?;
        if let Some(Value::Array(items)) = merged.as_mut() {
            if let Some(first) = items.first_mut() {
                let text = first.as_str().unwrap_or_default().to_owned();
                *first = Value::String(format!("test:{text}"));
            }
        }
        Ok(merged)
    });

    let schema = Schema::new();
    let section = schema.set("object", "k1")?;
    section.set_with("array", "k2", prefixing)?;

    let first = Overlay::create(schema.create(json!(null), json!({"k1": {}})));
    let second = Overlay::create_with_parent(json!({"k1": {"k2": ["test"]}}), &first);
    let third = Overlay::create_with_parent(json!({}), &second);
    let fourth = Overlay::create_with_parent(json!({"k1": {"k2": ["test4", "test5"]}}), &third);

    second.at("k1").set("k2", json!(["test2", "test3"]));
    assert_eq!(
        second.at("k1").get("k2")?,
        Some(json!(["test:test2", "test3"]))
    );
    assert_eq!(
        second.to_json()?,
        json!({"k1": {"k2": ["test:test2", "test3"]}})
    );
    // The raw store keeps the unmerged write.
    assert_eq!(second.raw(), Some(json!({"k1": {"k2": ["test2", "test3"]}})));

    // Silent layers inherit the composed result; overriding layers get the
    // prefix applied to their own first element.
    assert_eq!(third.to_json()?, json!({"k1": {"k2": ["test:test2", "test3"]}}));
    assert_eq!(
        fourth.at("k1").get("k2")?,
        Some(json!(["test:test4", "test5"]))
    );

    // A rewrite re-applies the prefix to the new first element, not the old.
    second.at("k1").set("k2", json!(["test6", "test7"]));
    assert_eq!(
        second.to_json()?,
        json!({"k1": {"k2": ["test:test6", "test7"]}})
    );
    Ok(())
}

#[rstest]
fn merge_context_threads_through_child_layers() -> Result<()> {
    let tagging: Merger = Rc::new(|ctx: MergeContext<'_>| {
        let merged = ctx.merge(ctx.current, ctx.next)?;
        Ok(merged.map(|v| json!({"value": v, "tenant": ctx.context.clone()})))
    });

    let schema = Schema::new();
    schema.set_with("string", "name", tagging)?;
    let base = Overlay::create(schema.create(json!("acme"), json!({})));
    let over = Overlay::create_with_parent(json!({"name": "prod"}), &base);

    assert_eq!(
        over.get("name")?,
        Some(json!({"value": "prod", "tenant": "acme"}))
    );
    Ok(())
}

#[rstest]
fn unknown_kind_tags_fail_at_declaration_time() {
    let schema = Schema::new();
    let err = schema.set("instant", "field").unwrap_err();
    assert!(matches!(
        err.as_ref(),
        OverlayError::UnsupportedKind { kind } if kind == "instant"
    ));
}

#[rstest]
fn object_fields_union_undeclared_keys_from_ancestors() -> Result<()> {
    let schema = array_schema();
    let base = Overlay::create(schema.create(
        json!(null),
        json!({"k1": {"k2": ["base"], "extra": 1}}),
    ));
    let over = Overlay::create_with_parent(json!({"k1": {"k2": null}}), &base);

    assert_eq!(
        over.get("k1")?,
        Some(json!({"k2": [], "extra": 1}))
    );
    Ok(())
}
