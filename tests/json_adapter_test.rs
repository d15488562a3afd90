//! End-to-end tests: JSON records in, JSON forest out

use serde_json::{json, Value};

use rstree::domain::{forest_to_json, DomainError, JsonAdapter, JsonWeight, TreeBuilder, TreeConfig};
use rstree::util::testing::init_test_setup;

fn menu_config() -> TreeConfig {
    TreeConfig::builder()
        .id_field("code")
        .parent_id_field("parent")
        .name_field("title")
        .weight_field("sort")
        .children_field("items")
        .build()
        .unwrap()
}

fn menu_records() -> Vec<Value> {
    vec![
        json!({"code": "sys", "parent": "", "sort": 2, "title": "System"}),
        json!({"code": "home", "parent": "", "sort": 1, "title": "Home"}),
        json!({"code": "sys.users", "parent": "sys", "sort": 1, "title": "Users"}),
        json!({"code": "sys.roles", "parent": "sys", "sort": 0, "title": "Roles"}),
        json!({"code": "tmp", "parent": "gone", "title": "Orphan"}),
    ]
}

#[test]
fn given_menu_records_when_building_then_renders_with_configured_names() {
    // Arrange
    init_test_setup();
    let config = menu_config();
    let builder = TreeBuilder::new(&config, JsonAdapter::<String, i64>::new(&config));

    // Act
    let forest = builder.build(&menu_records(), &String::new()).unwrap();
    let rendered = forest_to_json(&forest, &config).unwrap();

    // Assert
    assert_eq!(
        rendered,
        json!([
            {"code": "home", "parent": "", "sort": 1, "title": "Home"},
            {
                "code": "sys", "parent": "", "sort": 2, "title": "System",
                "items": [
                    {"code": "sys.roles", "parent": "sys", "sort": 0, "title": "Roles"},
                    {"code": "sys.users", "parent": "sys", "sort": 1, "title": "Users"}
                ]
            }
        ])
    );
    assert_eq!(forest[1].name(&config), Some("System"));
}

#[test]
fn given_record_missing_id_field_when_building_then_invalid_record() {
    init_test_setup();
    let config = menu_config();
    let mut records = menu_records();
    records.insert(1, json!({"parent": "", "title": "No code"}));

    let result = TreeBuilder::new(&config, JsonAdapter::<String, i64>::new(&config))
        .build(&records, &String::new());

    assert_eq!(
        result,
        Err(DomainError::InvalidRecord {
            index: Some(1),
            reason: "missing 'code' field".to_string()
        })
    );
}

#[test]
fn given_mixed_numeric_ids_when_building_with_value_keys_then_matches_exact_json() {
    init_test_setup();
    let config = TreeConfig::default();
    let records = vec![
        json!({"id": 1, "parentId": 0}),
        json!({"id": 2, "parentId": 1}),
        json!({"id": "1", "parentId": 0}),
    ];

    let forest = TreeBuilder::new(&config, JsonAdapter::<Value, i64>::new(&config))
        .build(&records, &json!(0))
        .unwrap();

    // "1" is a string and does not adopt node 2
    assert_eq!(forest.len(), 2);
    assert_eq!(forest[0].children.len(), 1);
    assert!(forest[1].children.is_empty());
}

#[test]
fn given_float_and_string_weights_when_building_then_sorted_by_json_order() {
    init_test_setup();
    let config = TreeConfig::default();
    let records = vec![
        json!({"id": 1, "parentId": 0, "weight": 1.5}),
        json!({"id": 2, "parentId": 0, "weight": 1}),
        json!({"id": 3, "parentId": 0, "weight": -0.5}),
        json!({"id": 4, "parentId": 0}),
        json!({"id": 10, "parentId": 1, "weight": "b"}),
        json!({"id": 11, "parentId": 1, "weight": "a"}),
        json!({"id": 12, "parentId": 1, "weight": "b"}),
    ];

    let forest = TreeBuilder::new(&config, JsonAdapter::<Value, JsonWeight>::new(&config))
        .build(&records, &json!(0))
        .unwrap();

    let root_ids: Vec<Value> = forest.iter().map(|n| n.id.clone()).collect();
    assert_eq!(root_ids, vec![json!(3), json!(4), json!(2), json!(1)]);
    let child_ids: Vec<Value> = forest[3].children.iter().map(|n| n.id.clone()).collect();
    assert_eq!(child_ids, vec![json!(11), json!(10), json!(12)]);
    // Weights are written back as given
    assert_eq!(
        forest_to_json(&forest[3..], &config).unwrap()[0]["weight"],
        json!(1.5)
    );
}

#[test]
fn given_integer_weight_type_when_weight_is_fractional_then_invalid_record() {
    init_test_setup();
    let config = TreeConfig::default();
    let records = vec![json!({"id": 1, "parentId": 0, "weight": 1.5})];

    let result = TreeBuilder::new(&config, JsonAdapter::<Value, i64>::new(&config))
        .build(&records, &json!(0));

    assert!(matches!(
        result,
        Err(DomainError::InvalidRecord { index: Some(0), .. })
    ));
}
