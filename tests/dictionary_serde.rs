//! Loading and saving dictionaries through serde.

use stg_core::dictionary::{Dictionary, MergePolicy, Value};
use stg_core::StgError;

const INPUT: &str = r#"{
    "maxTimeSteps": 10,
    "gravity": 9.81,
    "outputPath": "./output",
    "checkpoint": true,
    "plugins": ["Erosion", {"Type": "Tracers"}],
    "components": {
        "mesh": {"Type": "Regular", "Category": "Mesh", "size": [32, 32, 16]},
        "stokes": {"Type": "Stokes", "Category": "Solver", "Mesh": "mesh"}
    }
}"#;

#[test]
fn json_loads_with_key_order_and_kinds() {
    let dict: Dictionary = serde_json::from_str(INPUT).unwrap();
    assert_eq!(
        dict.keys().collect::<Vec<_>>(),
        ["maxTimeSteps", "gravity", "outputPath", "checkpoint", "plugins", "components"]
    );
    assert_eq!(dict.get_uint("maxTimeSteps").unwrap(), 10);
    assert_eq!(dict.get_double("gravity").unwrap(), 9.81);
    // doubles truncate when read as integers
    assert_eq!(dict.get_int("gravity").unwrap(), 9);
    assert!(dict.get_bool("checkpoint").unwrap());
    assert_eq!(dict.get_string("outputPath").unwrap(), "./output");

    let components = dict.get_struct("components").unwrap();
    assert_eq!(components.keys().collect::<Vec<_>>(), ["mesh", "stokes"]);
    assert_eq!(
        dict.get_path("components.mesh.size.2"),
        Some(&Value::Int(16))
    );
    assert_eq!(dict.get_list("plugins").unwrap().len(), 2);
}

#[test]
fn round_trip_preserves_structure() {
    let dict: Dictionary = serde_json::from_str(INPUT).unwrap();
    let text = serde_json::to_string(&dict).unwrap();
    let back: Dictionary = serde_json::from_str(&text).unwrap();
    assert_eq!(back, dict);
}

#[test]
fn missing_and_mismatched_keys() {
    let dict: Dictionary = serde_json::from_str(INPUT).unwrap();
    assert_eq!(
        dict.get_double("viscosity"),
        Err(StgError::MissingKey("viscosity".into()))
    );
    assert_eq!(dict.get_double_or("viscosity", 1e21), 1e21);
    assert!(matches!(
        dict.get_double("outputPath"),
        Err(StgError::TypeMismatch { .. })
    ));
    assert!(dict.get_struct("gravity").is_err());
}

#[test]
fn command_line_overrides_merge_into_the_base() {
    let mut base: Dictionary = serde_json::from_str(INPUT).unwrap();
    let overrides: Dictionary =
        serde_json::from_str(r#"{"maxTimeSteps": 2, "components": {"mesh": {"Type": "Irregular"}}}"#)
            .unwrap();
    base.merge(overrides, MergePolicy::Merge);
    assert_eq!(base.get_uint("maxTimeSteps").unwrap(), 2);
    assert_eq!(
        base.get_path("components.mesh.Type").and_then(Value::as_str),
        Some("Irregular")
    );
    // untouched members survive a Merge
    assert_eq!(
        base.get_path("components.mesh.Category").and_then(Value::as_str),
        Some("Mesh")
    );
}

#[test]
fn integers_load_as_the_narrowest_kind() {
    let mut dict = Dictionary::new();
    dict.add("steps", Value::UInt(5));
    dict.add("cells", Value::ULong(3_000_000_000));
    dict.add("seed", Value::ULong(1 << 40));
    let back: Dictionary = serde_json::from_str(&serde_json::to_string(&dict).unwrap()).unwrap();

    assert_eq!(back.get_opt("steps"), Some(&Value::Int(5)));
    assert_eq!(back.get_opt("cells"), Some(&Value::UInt(3_000_000_000)));
    assert_eq!(back.get_opt("seed"), Some(&Value::ULong(1 << 40)));
    // the getters do not care which kind came back
    assert_eq!(back.get_uint("steps").unwrap(), 5);
    assert_eq!(back.get_ulong("cells").unwrap(), 3_000_000_000);
}
