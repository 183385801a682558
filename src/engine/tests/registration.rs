use super::*;

#[test]
fn test_add_entity_opens_all_bucket() {
    let (engine, _) = registered_engine(EngineConfig::default());

    assert!(engine.routing_tree().has_bucket(Method::All, "user"));
    assert!(engine.routing_tree().bucket(Method::All, "user").is_empty());
    assert_eq!(
        engine.paths().map(EntityPath::as_str).collect::<Vec<_>>(),
        ["user"]
    );
}

#[test]
fn test_add_entity_derives_kebab_path() {
    let schema = EntitySchema::builder("UserProfile")
        .undefined_field("bio")
        .build()
        .unwrap();
    let mut engine = RestEngine::default();
    engine.add_entity(Computed::new(schema)).unwrap();

    assert!(engine.entity_prototype("user-profile").is_some());
    assert!(engine.entity_prototype("userProfile").is_none());
}

#[test]
fn test_duplicate_registration_fails_without_side_effects() {
    let (mut engine, entity) = registered_engine(EngineConfig::default());
    let t = trace();
    engine.attach_rules(&entity, &[Method::All], &[recorder(&t, "guard", 5)]);

    let other = EntitySchema::builder("User")
        .undefined_field("nickname")
        .build()
        .unwrap();
    let err = engine.add_entity(Computed::new(other)).unwrap_err();

    assert_eq!(err, RestError::PathExists("user".into()));
    assert_eq!(err.to_string(), "Path `user` already exist.");

    let prototype = engine.entity_prototype("user").unwrap();
    assert!(prototype.schema().contains("name"));
    assert!(!prototype.schema().contains("nickname"));
    assert_eq!(engine.routing_tree().bucket(Method::All, "user").len(), 1);
}

#[test]
fn test_attach_rules_is_a_cross_product() {
    let (mut engine, entity) = registered_engine(EngineConfig::default());
    let t = trace();
    engine.attach_rules(
        &entity,
        &[Method::Get, Method::Delete],
        &[recorder(&t, "first", 20), recorder(&t, "second", 10)],
    );

    for method in [Method::Get, Method::Delete] {
        let names: Vec<_> = engine
            .routing_tree()
            .bucket(method, "user")
            .iter()
            .map(PrioritizedHandler::name)
            .collect();
        assert_eq!(names, ["first", "second"], "bucket {method}");
    }
    assert!(engine.routing_tree().bucket(Method::Post, "user").is_empty());
}

#[test]
fn test_add_middleware_bucket_snapshot() {
    let (mut engine, entity) = registered_engine(EngineConfig::default());
    let t = trace();
    engine
        .add_middleware(&entity, Method::Put, recorder(&t, "audit", 90))
        .add_middleware(
            &entity,
            Method::Put,
            PrioritizedHandler::with_default_priority(handler_fn(
                "guard",
                |_: &mut RequestContext| Ok(()),
            )),
        );

    insta::assert_debug_snapshot!(engine.routing_tree().bucket(Method::Put, "user"), @r###"
    [
        PrioritizedHandler {
            name: "audit",
            priority: 90,
        },
        PrioritizedHandler {
            name: "guard",
            priority: 10,
        },
    ]
    "###);
    assert_eq!(DEFAULT_PRIORITY, 10);
}

#[test]
fn test_prototype_copies_are_private() {
    let (engine, _) = registered_engine(EngineConfig::default());

    let mut copy = engine.entity_prototype("user").unwrap();
    copy.set_props(&Properties::from([(
        "name".to_string(),
        AttrValue::from("Ada"),
    )]));
    assert_eq!(copy.get("name").and_then(AttrValue::as_str), Some("Ada"));

    let fresh = engine.entity_prototype("user").unwrap();
    assert!(fresh.get("name").is_some_and(AttrValue::is_undefined));
}

#[test]
fn test_unknown_prototype() {
    let engine = RestEngine::default();
    assert!(engine.entity_prototype("ghost").is_none());
    assert_eq!(engine.paths().count(), 0);
}

#[test]
fn test_debug_lists_registered_paths() {
    let (engine, _) = registered_engine(EngineConfig::default());

    let rendered = format!("{engine:?}");
    assert!(rendered.starts_with("RestEngine {"));
    assert!(rendered.contains(r#"paths: ["user"]"#));
}
