//! Integration test for structured extraction through the tool bridge.
//!
//! The scripted core stands in for a model that performs the extraction
//! correctly; the assertions cover the tool wiring, not inference quality.

use serde_json::json;
use toolbridge::{Agent, Extractor, FieldType, ParameterSchema, StubCore, TypedSchema};

#[tokio::test]
async fn extracts_a_validated_value_from_free_text() {
    let core = StubCore::new(vec![json!({
        "action": "call_tool",
        "name": "extractor",
        "arguments": {"name": "Alice", "age": 18},
    })
    .to_string()]);

    let agent = Agent::new(core, "test-model").with_name("extract-agent");
    let schema = ParameterSchema::Typed(
        TypedSchema::object()
            .field("name", FieldType::String)
            .field("age", FieldType::Number),
    );

    let extractor = Extractor::new(&agent, schema);
    let value = extractor.extract("Alice is 18 years old!").await.unwrap();
    assert_eq!(value, json!({"name": "Alice", "age": 18}));
}

#[tokio::test]
async fn synthesizes_defaults_for_unsupplied_positional_arguments() {
    // The core only supplies the first positional argument; the second is
    // filled with the declared type's zero value.
    let core = StubCore::new(vec![json!({
        "action": "call_tool",
        "name": "extractor",
        "arguments": {"name": "Bob"},
    })
    .to_string()]);

    let agent = Agent::new(core, "test-model");
    let schema = ParameterSchema::Typed(
        TypedSchema::object()
            .field("name", FieldType::String)
            .field("age", FieldType::Number),
    );

    let extractor = Extractor::new(&agent, schema);
    let value = extractor.extract("Bob!").await.unwrap();
    assert_eq!(value, json!({"name": "Bob", "age": 0}));
}
