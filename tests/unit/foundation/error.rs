use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CaError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        CaError::duplicate_id("abc")
            .to_string()
            .contains("duplicate layer id: abc")
    );
    assert!(
        CaError::unsupported_shape("sphere")
            .to_string()
            .contains("unsupported emitter shape: sphere")
    );
    assert!(
        CaError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CaError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn serde_json_errors_map_to_serde_variant() {
    let err: CaError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, CaError::Serde(_)));
}
